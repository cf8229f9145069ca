use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::models::NameFormat;
use crate::table::DEFAULT_OID_FIELD;

/// Everything one conversion run needs.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct RunConfig {
    /// Target attribute table (headered CSV).
    pub table: PathBuf,
    #[serde(default = "default_oid_field")]
    pub oid_field: String,
    pub input_format: NameFormat,
    pub input_field: String,
    pub output_format: NameFormat,
    /// Required unless `create_field` is set; then it defaults to the output format label.
    #[serde(default)]
    pub output_field: Option<String>,
    #[serde(default)]
    pub create_field: bool,
    #[serde(default)]
    pub mark_unfound: bool,
    /// Reference CSV of (acronym, scientific, common) rows.
    pub reference: PathBuf,
    /// Optional per-record outcome report.
    #[serde(default)]
    pub report: Option<PathBuf>,
    /// Optional Key,Value run summary.
    #[serde(default)]
    pub summary: Option<PathBuf>,
}

fn default_oid_field() -> String {
    DEFAULT_OID_FIELD.to_string()
}

impl RunConfig {
    /// Name the output field will have once the destination is prepared.
    pub fn output_field_name(&self) -> &str {
        self.output_field
            .as_deref()
            .unwrap_or(self.output_format.as_str())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table.as_os_str().is_empty() {
            return Err(ConfigError::MissingField { field: "table" });
        }
        if self.reference.as_os_str().is_empty() {
            return Err(ConfigError::MissingField { field: "reference" });
        }
        if self.oid_field.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "oid_field" });
        }
        if self.input_field.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "input_field",
            });
        }
        match self.output_field.as_deref().map(str::trim) {
            None if !self.create_field => {
                return Err(ConfigError::MissingField {
                    field: "output_field",
                });
            }
            Some("") => {
                return Err(ConfigError::InvalidValue {
                    field: "output_field",
                    reason: "must not be blank".into(),
                });
            }
            _ => {}
        }
        if self
            .input_field
            .eq_ignore_ascii_case(self.output_field_name())
        {
            return Err(ConfigError::InvalidValue {
                field: "output_field",
                reason: format!("same as input field {}", self.input_field),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> RunConfig {
        RunConfig {
            table: "trees.csv".into(),
            oid_field: DEFAULT_OID_FIELD.into(),
            input_format: NameFormat::Acronym,
            input_field: "Code".into(),
            output_format: NameFormat::Common,
            output_field: None,
            create_field: true,
            mark_unfound: false,
            reference: "names.csv".into(),
            report: None,
            summary: None,
        }
    }

    #[test]
    fn created_field_defaults_to_format_label() {
        let c = cfg();
        assert!(c.validate().is_ok());
        assert_eq!(c.output_field_name(), "Common");
    }

    #[test]
    fn output_field_required_without_create() {
        let mut c = cfg();
        c.create_field = false;
        assert!(matches!(
            c.validate(),
            Err(ConfigError::MissingField {
                field: "output_field"
            })
        ));
        c.output_field = Some("CommonName".into());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn output_must_differ_from_input() {
        let mut c = cfg();
        c.output_field = Some("code".into());
        assert!(matches!(
            c.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
