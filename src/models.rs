use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigError;

/// Text written to the output field when no mapping exists and marking is enabled.
pub const UNFOUND_SENTINEL: &str = "*NOT FOUND*";

/// Width of the text field added when the destination field is created.
pub const OUTPUT_FIELD_WIDTH: usize = 80;

/// The three tree naming conventions, in reference-CSV column order.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, ValueEnum, Serialize, Deserialize)]
pub enum NameFormat {
    Acronym,
    Scientific,
    Common,
}

impl NameFormat {
    pub fn column(&self) -> usize {
        match self {
            Self::Acronym => 0,
            Self::Scientific => 1,
            Self::Common => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acronym => "Acronym",
            Self::Scientific => "Scientific",
            Self::Common => "Common",
        }
    }
}

impl std::fmt::Display for NameFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NameFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "acronym" => Ok(Self::Acronym),
            "scientific" => Ok(Self::Scientific),
            "common" => Ok(Self::Common),
            other => Err(ConfigError::InvalidValue {
                field: "name format",
                reason: format!("unsupported: {} (expected Acronym, Scientific or Common)", other),
            }),
        }
    }
}

/// One row of the target table, projected onto the OID and the two bound fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub oid: i64,
    pub input: Option<String>,
    pub output: Option<String>,
}

/// Names of the input and output fields a conversion reads and writes.
#[derive(Debug, Clone)]
pub struct FieldBinding {
    pub input: String,
    pub output: String,
}

/// Result of looking up one record's input value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Mapping found: input is rewritten to `display_input`, output gets `output`.
    Matched {
        display_input: String,
        output: String,
    },
    /// No mapping, marking disabled: the record is left untouched.
    UnmatchedSilent,
    /// No mapping, marking enabled: output gets the sentinel.
    UnmatchedMarked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Matched,
    UnmatchedSilent,
    UnmatchedMarked,
    Failed,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::UnmatchedSilent => "not found",
            Self::UnmatchedMarked => "not found (marked)",
            Self::Failed => "failed",
        }
    }
}

/// What happened to one record during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Matched {
        oid: i64,
        input: String,
        output: String,
    },
    UnmatchedSilent {
        oid: i64,
        input: Option<String>,
    },
    UnmatchedMarked {
        oid: i64,
        input: Option<String>,
    },
    Failed {
        oid: Option<i64>,
        reason: String,
    },
}

impl RecordOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Matched { .. } => OutcomeKind::Matched,
            Self::UnmatchedSilent { .. } => OutcomeKind::UnmatchedSilent,
            Self::UnmatchedMarked { .. } => OutcomeKind::UnmatchedMarked,
            Self::Failed { .. } => OutcomeKind::Failed,
        }
    }

    pub fn oid(&self) -> Option<i64> {
        match self {
            Self::Matched { oid, .. }
            | Self::UnmatchedSilent { oid, .. }
            | Self::UnmatchedMarked { oid, .. } => Some(*oid),
            Self::Failed { oid, .. } => *oid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("ACRONYM".parse::<NameFormat>().unwrap(), NameFormat::Acronym);
        assert_eq!(" common ".parse::<NameFormat>().unwrap(), NameFormat::Common);
        assert!("latin".parse::<NameFormat>().is_err());
    }

    #[test]
    fn format_columns_follow_reference_order() {
        assert_eq!(NameFormat::Acronym.column(), 0);
        assert_eq!(NameFormat::Scientific.column(), 1);
        assert_eq!(NameFormat::Common.column(), 2);
    }

    #[test]
    fn outcome_reports_oid() {
        let o = RecordOutcome::Failed {
            oid: None,
            reason: "bad row".into(),
        };
        assert_eq!(o.oid(), None);
        assert_eq!(o.kind(), OutcomeKind::Failed);
    }
}
