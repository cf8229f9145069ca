use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("tree .CSV file was not found: {path} (check the .CSV file path)")]
    NotFound { path: String },
    #[error("reference row {line} has {columns} columns; expected acronym, scientific, common")]
    MalformedRow { line: u64, columns: usize },
    #[error("reference csv error")]
    Csv(#[from] csv::Error),
    #[error("reference io error")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("field not found: {0}")]
    UnknownField(String),
    #[error("field already exists: {0}")]
    FieldExists(String),
    #[error("no row with OID {0}")]
    UnknownOid(i64),
    #[error("value for {field} is {len} characters; field width is {width}")]
    ValueTooLong {
        field: String,
        width: usize,
        len: usize,
    },
    #[error("malformed row {row}: {reason}")]
    MalformedRow { row: u64, reason: String },
    #[error("table csv error")]
    Csv(#[from] csv::Error),
    #[error("table io error")]
    Io(#[from] std::io::Error),
}

impl TableError {
    /// Short name of the error variant, used when reporting per-record failures.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownField(_) => "UnknownField",
            Self::FieldExists(_) => "FieldExists",
            Self::UnknownOid(_) => "UnknownOid",
            Self::ValueTooLong { .. } => "ValueTooLong",
            Self::MalformedRow { .. } => "MalformedRow",
            Self::Csv(_) => "Csv",
            Self::Io(_) => "Io",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("\"{field}\" field already exists")]
    OutputFieldExists { field: String },
    #[error("an output field name is required unless the field is created")]
    OutputFieldRequired,
    #[error("{role} field \"{field}\" does not exist in the table")]
    MissingField { role: &'static str, field: String },
    #[error(transparent)]
    Table(#[from] TableError),
}
