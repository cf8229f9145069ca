use std::collections::HashMap;

use crate::error::TableError;
use crate::models::{FieldBinding, Record};
use crate::table::AttributeTable;

#[derive(Debug, Clone)]
pub(crate) enum Row {
    Valid {
        oid: i64,
        values: Vec<Option<String>>,
    },
    /// A row that could not be parsed; its raw cells are kept so it survives a rewrite.
    Malformed {
        row: u64,
        reason: String,
        raw: Vec<Vec<u8>>,
    },
}

/// Attribute table held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryTable {
    oid_field: String,
    fields: Vec<String>,
    // lower-cased field name -> max characters, for text fields with a known width
    widths: HashMap<String, usize>,
    rows: Vec<Row>,
    // oid -> index into rows
    index: HashMap<i64, usize>,
}

impl MemoryTable {
    /// Create an empty table. If `fields` contains `oid_field` its values are the row
    /// OIDs; otherwise rows are numbered from 1 in insertion order.
    pub fn new<S: Into<String>>(oid_field: S, fields: &[&str]) -> Self {
        Self {
            oid_field: oid_field.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            widths: HashMap::new(),
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.eq_ignore_ascii_case(name))
    }

    fn require_field(&self, name: &str) -> Result<usize, TableError> {
        self.field_index(name)
            .ok_or_else(|| TableError::UnknownField(name.to_string()))
    }

    /// Append a row; returns its OID.
    pub fn push_row(&mut self, values: Vec<Option<String>>) -> Result<i64, TableError> {
        let row_num = self.rows.len() as u64 + 1;
        if values.len() != self.fields.len() {
            return Err(TableError::MalformedRow {
                row: row_num,
                reason: format!(
                    "{} values for {} fields",
                    values.len(),
                    self.fields.len()
                ),
            });
        }
        let oid = match self.field_index(&self.oid_field) {
            Some(i) => {
                let raw = values[i].as_deref().unwrap_or("").trim();
                raw.parse::<i64>().map_err(|_| TableError::MalformedRow {
                    row: row_num,
                    reason: format!("{} \"{}\" is not an integer", self.oid_field, raw),
                })?
            }
            None => row_num as i64,
        };
        if self.index.contains_key(&oid) {
            return Err(TableError::MalformedRow {
                row: row_num,
                reason: format!("duplicate {} {}", self.oid_field, oid),
            });
        }
        self.index.insert(oid, self.rows.len());
        self.rows.push(Row::Valid { oid, values });
        Ok(oid)
    }

    /// Append a row that could not be parsed.
    pub(crate) fn push_malformed(&mut self, reason: String, raw: Vec<Vec<u8>>) {
        let row = self.rows.len() as u64 + 1;
        self.rows.push(Row::Malformed { row, reason, raw });
    }

    /// Declare the maximum text width of an existing field.
    pub fn set_field_width(&mut self, name: &str, width: usize) -> Result<(), TableError> {
        self.require_field(name)?;
        self.widths.insert(name.to_lowercase(), width);
        Ok(())
    }

    /// Current value of `field` in the row with `oid`.
    pub fn value(&self, oid: i64, field: &str) -> Option<&str> {
        let fi = self.field_index(field)?;
        match self.rows.get(*self.index.get(&oid)?)? {
            Row::Valid { values, .. } => values[fi].as_deref(),
            Row::Malformed { .. } => None,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn fields(&self) -> &[String] {
        &self.fields
    }

    pub(crate) fn rows(&self) -> &[Row] {
        &self.rows
    }

    fn check_width(&self, field: &str, value: Option<&str>) -> Result<(), TableError> {
        if let (Some(width), Some(v)) = (self.widths.get(&field.to_lowercase()), value) {
            let len = v.chars().count();
            if len > *width {
                return Err(TableError::ValueTooLong {
                    field: field.to_string(),
                    width: *width,
                    len,
                });
            }
        }
        Ok(())
    }
}

impl AttributeTable for MemoryTable {
    fn oid_field_name(&self) -> &str {
        &self.oid_field
    }

    fn field_names(&self) -> Vec<String> {
        self.fields.clone()
    }

    fn add_text_field(&mut self, name: &str, width: usize) -> Result<(), TableError> {
        if self.field_index(name).is_some() {
            return Err(TableError::FieldExists(name.to_string()));
        }
        self.fields.push(name.to_string());
        self.widths.insert(name.to_lowercase(), width);
        for row in &mut self.rows {
            if let Row::Valid { values, .. } = row {
                values.push(None);
            }
        }
        Ok(())
    }

    fn read_all(
        &self,
        binding: &FieldBinding,
    ) -> Result<Vec<Result<Record, TableError>>, TableError> {
        let ii = self.require_field(&binding.input)?;
        let oi = self.require_field(&binding.output)?;
        Ok(self
            .rows
            .iter()
            .map(|row| match row {
                Row::Valid { oid, values } => Ok(Record {
                    oid: *oid,
                    input: values[ii].clone(),
                    output: values[oi].clone(),
                }),
                Row::Malformed { row, reason, .. } => Err(TableError::MalformedRow {
                    row: *row,
                    reason: reason.clone(),
                }),
            })
            .collect())
    }

    fn write(&mut self, binding: &FieldBinding, record: &Record) -> Result<(), TableError> {
        let ii = self.require_field(&binding.input)?;
        let oi = self.require_field(&binding.output)?;
        self.check_width(&binding.input, record.input.as_deref())?;
        self.check_width(&binding.output, record.output.as_deref())?;
        let pos = *self
            .index
            .get(&record.oid)
            .ok_or(TableError::UnknownOid(record.oid))?;
        match &mut self.rows[pos] {
            Row::Valid { values, .. } => {
                values[ii] = record.input.clone();
                values[oi] = record.output.clone();
                Ok(())
            }
            Row::Malformed { .. } => Err(TableError::UnknownOid(record.oid)),
        }
    }

    fn flush(&mut self) -> Result<(), TableError> {
        Ok(())
    }
}
