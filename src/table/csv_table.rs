use csv::{ByteRecord, ReaderBuilder, StringRecord, WriterBuilder};
use log::{debug, info, warn};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::TableError;
use crate::models::{FieldBinding, Record};
use crate::table::AttributeTable;
use crate::table::memory::{MemoryTable, Row};

/// A headered CSV file used as an attribute table. Empty cells are nulls.
///
/// Writes land in memory; `flush` rewrites the file atomically.
#[derive(Debug)]
pub struct CsvTable {
    path: PathBuf,
    inner: MemoryTable,
    dirty: bool,
}

impl CsvTable {
    pub fn open<P: AsRef<Path>>(path: P, oid_field: &str) -> Result<Self, TableError> {
        let path = path.as_ref().to_path_buf();
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&path)?;
        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
        let mut inner = MemoryTable::new(oid_field, &header_refs);

        for result in rdr.byte_records() {
            let record = match StringRecord::from_byte_record(result?) {
                Ok(record) => record,
                Err(e) => {
                    let reason = format!("not valid UTF-8 ({})", e.utf8_error());
                    warn!("{}: row {}: {}", path.display(), inner.len() + 1, reason);
                    inner.push_malformed(reason, raw_cells(&e.into_byte_record()));
                    continue;
                }
            };
            let values: Vec<Option<String>> = record
                .iter()
                .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
                .collect();
            if let Err(e) = inner.push_row(values) {
                warn!("{}: {}", path.display(), e);
                let reason = match e {
                    TableError::MalformedRow { reason, .. } => reason,
                    other => other.to_string(),
                };
                inner.push_malformed(reason, raw_cells(record.as_byte_record()));
            }
        }

        info!(
            "Opened table {} ({} rows, {} fields)",
            path.display(),
            inner.len(),
            headers.len()
        );
        Ok(Self {
            path,
            inner,
            dirty: false,
        })
    }

    /// Current value of `field` in the row with `oid`.
    pub fn value(&self, oid: i64, field: &str) -> Option<&str> {
        self.inner.value(oid, field)
    }

    fn write_file(&self, target: &Path) -> Result<(), TableError> {
        let mut w = WriterBuilder::new().flexible(true).from_path(target)?;
        w.write_record(self.inner.fields())?;
        for row in self.inner.rows() {
            match row {
                Row::Valid { values, .. } => {
                    w.write_record(values.iter().map(|v| v.as_deref().unwrap_or("")))?;
                }
                Row::Malformed { raw, .. } => w.write_record(raw)?,
            }
        }
        w.flush()?;
        Ok(())
    }
}

fn raw_cells(record: &ByteRecord) -> Vec<Vec<u8>> {
    record.iter().map(<[u8]>::to_vec).collect()
}

impl AttributeTable for CsvTable {
    fn oid_field_name(&self) -> &str {
        self.inner.oid_field_name()
    }

    fn field_names(&self) -> Vec<String> {
        self.inner.field_names()
    }

    fn add_text_field(&mut self, name: &str, width: usize) -> Result<(), TableError> {
        self.inner.add_text_field(name, width)?;
        self.dirty = true;
        Ok(())
    }

    fn read_all(
        &self,
        binding: &FieldBinding,
    ) -> Result<Vec<Result<Record, TableError>>, TableError> {
        self.inner.read_all(binding)
    }

    fn write(&mut self, binding: &FieldBinding, record: &Record) -> Result<(), TableError> {
        self.inner.write(binding, record)?;
        self.dirty = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TableError> {
        if !self.dirty {
            debug!("{} unchanged; nothing to flush", self.path.display());
            return Ok(());
        }
        let mut tmp = OsString::from(self.path.as_os_str());
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        self.write_file(&tmp)?;
        fs::rename(&tmp, &self.path)?;
        self.dirty = false;
        info!("Saved {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_table(dir: &Path, content: &str) -> PathBuf {
        let p = dir.join("trees.csv");
        fs::write(&p, content).unwrap();
        p
    }

    #[test]
    fn open_reads_rows_and_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_table(dir.path(), "OBJECTID,Species,Common\n1,df,\n2,ra,Red alder\n");
        let t = CsvTable::open(&p, "OBJECTID").unwrap();
        assert_eq!(t.value(1, "Species"), Some("df"));
        assert_eq!(t.value(1, "Common"), None);
        assert_eq!(t.value(2, "Common"), Some("Red alder"));
    }

    #[test]
    fn flush_rewrites_file_with_new_field() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_table(dir.path(), "OBJECTID,Species\n1,df\n2,ra\n");
        let mut t = CsvTable::open(&p, "OBJECTID").unwrap();
        t.add_text_field("Common", 80).unwrap();
        let b = FieldBinding {
            input: "Species".into(),
            output: "Common".into(),
        };
        t.write(
            &b,
            &Record {
                oid: 1,
                input: Some("DF".into()),
                output: Some("Douglas-fir".into()),
            },
        )
        .unwrap();
        t.flush().unwrap();
        let text = fs::read_to_string(&p).unwrap();
        assert_eq!(text, "OBJECTID,Species,Common\n1,DF,Douglas-fir\n2,ra,\n");
        assert!(!dir.path().join("trees.csv.tmp").exists());
    }

    #[test]
    fn malformed_rows_survive_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_table(dir.path(), "OBJECTID,Species,Common\n1,df,\nx,ra,\n3,wrc\n");
        let mut t = CsvTable::open(&p, "OBJECTID").unwrap();
        let b = FieldBinding {
            input: "Species".into(),
            output: "Common".into(),
        };
        let rows = t.read_all(&b).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_ok());
        assert!(rows[1].is_err());
        assert!(rows[2].is_err());
        t.write(
            &b,
            &Record {
                oid: 1,
                input: Some("DF".into()),
                output: Some("Douglas-fir".into()),
            },
        )
        .unwrap();
        t.flush().unwrap();
        let text = fs::read_to_string(&p).unwrap();
        assert_eq!(text, "OBJECTID,Species,Common\n1,DF,Douglas-fir\nx,ra,\n3,wrc\n");
    }

    #[test]
    fn undecodable_row_is_skipped_and_kept_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("trees.csv");
        fs::write(&p, b"OBJECTID,Code\n1,df\n2,\xE9\n3,df\n").unwrap();
        let mut t = CsvTable::open(&p, "OBJECTID").unwrap();
        t.add_text_field("Common", 80).unwrap();
        let b = FieldBinding {
            input: "Code".into(),
            output: "Common".into(),
        };

        let rows = t.read_all(&b).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[1], Err(TableError::MalformedRow { row: 2, .. })));
        for rec in rows.into_iter().filter_map(Result::ok) {
            let rec = Record {
                input: Some("DF".into()),
                output: Some("Douglas-fir".into()),
                ..rec
            };
            t.write(&b, &rec).unwrap();
        }
        t.flush().unwrap();

        assert_eq!(
            fs::read(&p).unwrap(),
            b"OBJECTID,Code,Common\n1,DF,Douglas-fir\n2,\xE9\n3,DF,Douglas-fir\n".to_vec()
        );
    }

    #[test]
    fn open_missing_file_keeps_cause_as_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvTable::open(dir.path().join("nope.csv"), "OBJECTID").unwrap_err();
        assert_eq!(err.to_string(), "table csv error");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn missing_oid_column_uses_row_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_table(dir.path(), "Species,Common\ndf,\nra,\n");
        let t = CsvTable::open(&p, "OBJECTID").unwrap();
        assert_eq!(t.value(2, "Species"), Some("ra"));
        assert_eq!(t.oid_field_name(), "OBJECTID");
    }
}
