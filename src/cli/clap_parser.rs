use clap::Parser;
use std::path::PathBuf;

use crate::config::RunConfig;
use crate::error::ConfigError;
use crate::models::NameFormat;
use crate::table::DEFAULT_OID_FIELD;

#[derive(Parser, Debug)]
#[command(
    name = "tree_names",
    version,
    about = "Convert tree names between acronym, scientific and common conventions",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Target attribute table, a headered CSV (env: TREE_NAMES_TABLE)
    #[arg(long, value_name = "TABLE", env = "TREE_NAMES_TABLE")]
    pub table: PathBuf,
    /// Object-id field of the table; rows are numbered when it is absent
    #[arg(
        long = "oid-field",
        value_name = "FIELD",
        env = "TREE_NAMES_OID_FIELD",
        default_value = DEFAULT_OID_FIELD
    )]
    pub oid_field: String,
    /// Naming convention of the input field
    #[arg(
        long = "input-format",
        value_name = "FORMAT",
        env = "TREE_NAMES_INPUT_FORMAT",
        value_enum,
        ignore_case = true
    )]
    pub input_format: NameFormat,
    /// Field holding the names to convert
    #[arg(long = "input-field", value_name = "FIELD", env = "TREE_NAMES_INPUT_FIELD")]
    pub input_field: String,
    /// Naming convention to write
    #[arg(
        long = "output-format",
        value_name = "FORMAT",
        env = "TREE_NAMES_OUTPUT_FORMAT",
        value_enum,
        ignore_case = true
    )]
    pub output_format: NameFormat,
    /// Field receiving converted names (defaults to the output format name with --create-field)
    #[arg(long = "output-field", value_name = "FIELD", env = "TREE_NAMES_OUTPUT_FIELD")]
    pub output_field: Option<String>,
    /// Add the output field (text, width 80); fails if it already exists
    #[arg(long = "create-field", env = "TREE_NAMES_CREATE_FIELD")]
    pub create_field: bool,
    /// Write "*NOT FOUND*" to the output field of unmatched records
    #[arg(long = "mark-unfound", env = "TREE_NAMES_MARK_UNFOUND")]
    pub mark_unfound: bool,
    /// Reference CSV: acronym,scientific,common rows without a header
    #[arg(long, value_name = "CSV", env = "TREE_NAMES_REFERENCE")]
    pub reference: PathBuf,
    /// Write a per-record outcome report to this CSV
    #[arg(long, value_name = "PATH", env = "TREE_NAMES_REPORT")]
    pub report: Option<PathBuf>,
    /// Write a Key,Value run summary to this CSV
    #[arg(long, value_name = "PATH", env = "TREE_NAMES_SUMMARY")]
    pub summary: Option<PathBuf>,
}

impl Cli {
    pub fn to_run_config(&self) -> Result<RunConfig, ConfigError> {
        let cfg = RunConfig {
            table: self.table.clone(),
            oid_field: self.oid_field.clone(),
            input_format: self.input_format,
            input_field: self.input_field.clone(),
            output_format: self.output_format,
            output_field: self.output_field.clone(),
            create_field: self.create_field,
            mark_unfound: self.mark_unfound,
            reference: self.reference.clone(),
            report: self.report.clone(),
            summary: self.summary.clone(),
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

pub fn parse_cli_to_run_config() -> Result<RunConfig, ConfigError> {
    let cli = Cli::parse();
    cli.to_run_config()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_invocation() {
        let cli = Cli::try_parse_from([
            "tree_names",
            "--table",
            "trees.csv",
            "--input-format",
            "Acronym",
            "--input-field",
            "Code",
            "--output-format",
            "common",
            "--create-field",
            "--mark-unfound",
            "--reference",
            "names.csv",
        ])
        .unwrap();
        let cfg = cli.to_run_config().unwrap();
        assert_eq!(cfg.input_format, NameFormat::Acronym);
        assert_eq!(cfg.output_format, NameFormat::Common);
        assert_eq!(cfg.output_field_name(), "Common");
        assert_eq!(cfg.oid_field, DEFAULT_OID_FIELD);
        assert!(cfg.create_field && cfg.mark_unfound);
    }

    #[test]
    fn output_field_needed_without_create() {
        let cli = Cli::try_parse_from([
            "tree_names",
            "--table",
            "trees.csv",
            "--input-format",
            "scientific",
            "--input-field",
            "Species",
            "--output-format",
            "acronym",
            "--reference",
            "names.csv",
        ])
        .unwrap();
        assert!(cli.to_run_config().is_err());
    }

    #[test]
    fn rejects_unknown_format() {
        let res = Cli::try_parse_from([
            "tree_names",
            "--table",
            "t.csv",
            "--input-format",
            "latin",
            "--input-field",
            "Code",
            "--output-format",
            "common",
            "--reference",
            "r.csv",
        ]);
        assert!(res.is_err());
    }
}
