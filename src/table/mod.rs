//! Attribute-table access.
//!
//! The converter only needs a cursor-like view of the target table: list and
//! add fields, read every row projected onto the input/output fields, and
//! write a row back. `AttributeTable` is that seam; `MemoryTable` and
//! `CsvTable` are the two stores shipped with the crate.

pub mod csv_table;
pub mod memory;

pub use csv_table::CsvTable;
pub use memory::MemoryTable;

use crate::error::TableError;
use crate::models::{FieldBinding, Record};

/// Default name of the object-id field.
pub const DEFAULT_OID_FIELD: &str = "OBJECTID";

pub trait AttributeTable {
    /// Name of the object-id field, used in messages.
    fn oid_field_name(&self) -> &str;

    fn field_names(&self) -> Vec<String>;

    /// Field names compare case-insensitively.
    fn has_field(&self, name: &str) -> bool {
        self.field_names()
            .iter()
            .any(|f| f.eq_ignore_ascii_case(name))
    }

    /// Add a text field of `width` characters; every existing row gets a null value.
    fn add_text_field(&mut self, name: &str, width: usize) -> Result<(), TableError>;

    /// Read every row. The outer error means the table cannot be read at all;
    /// inner errors belong to individual rows.
    fn read_all(
        &self,
        binding: &FieldBinding,
    ) -> Result<Vec<Result<Record, TableError>>, TableError>;

    /// Write the bound fields of `record` back to the row with the same OID.
    fn write(&mut self, binding: &FieldBinding, record: &Record) -> Result<(), TableError>;

    /// Persist pending writes.
    fn flush(&mut self) -> Result<(), TableError>;
}
