//! Orchestrator: validate configuration, load the reference names, prepare
//! the destination field, convert every record and report the outcome.

pub mod summary;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::RunConfig;
use crate::convert::{ConvertOptions, OutputTarget, convert_table, prepare_output_field};
use crate::export::csv_export::{export_outcomes_csv, export_summary_csv};
use crate::reference::{NameLookup, load_reference};
use crate::table::{AttributeTable, CsvTable};
use summary::{RunSummary, SummaryBuilder};

/// Run a conversion against the CSV table named in `config`.
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    config.validate()?;
    let lookup = load_lookup(config)?;
    let mut table = CsvTable::open(&config.table, &config.oid_field)
        .with_context(|| format!("Failed to open table {}", config.table.display()))?;
    convert_with_lookup(config, &lookup, &mut table)
}

/// Run a conversion against any attribute table; `config.table` is only used as a label.
pub fn run_with_table<T: AttributeTable + ?Sized>(
    config: &RunConfig,
    table: &mut T,
) -> Result<RunSummary> {
    config.validate()?;
    let lookup = load_lookup(config)?;
    convert_with_lookup(config, &lookup, table)
}

fn load_lookup(config: &RunConfig) -> Result<NameLookup> {
    let lookup = load_reference(&config.reference, config.input_format, config.output_format)
        .with_context(|| {
            format!(
                "Failed to load reference names from {}",
                config.reference.display()
            )
        })?;
    if lookup.is_empty() {
        warn!(
            "Reference file {} contains no names; every record will be unmatched",
            config.reference.display()
        );
    }
    Ok(lookup)
}

/// Prepare the output field and convert every record with an already loaded lookup.
pub fn convert_with_lookup<T: AttributeTable + ?Sized>(
    config: &RunConfig,
    lookup: &NameLookup,
    table: &mut T,
) -> Result<RunSummary> {
    let started = chrono::Utc::now();
    let binding = prepare_output_field(
        table,
        &config.input_field,
        &OutputTarget {
            format: config.output_format,
            field: config.output_field.as_deref(),
            create: config.create_field,
        },
    )?;

    info!(
        "Converting {} to {}...",
        config.input_format, config.output_format
    );
    let options = ConvertOptions {
        input_format: config.input_format,
        mark_unfound: config.mark_unfound,
    };
    let outcomes = convert_table(table, &binding, lookup, &options)
        .with_context(|| format!("Failed to convert {}", config.table.display()))?;

    let summary = SummaryBuilder::new(
        &config.table.display().to_string(),
        config.input_format,
        config.output_format,
    )
    .with_fields(&binding.input, &binding.output, config.create_field)
    .with_reference_entries(lookup.len())
    .with_outcomes(outcomes)
    .with_timestamps(started, chrono::Utc::now())
    .build();

    log_summary(&summary);

    if let Some(path) = &config.report {
        export_outcomes_csv(&summary, table.oid_field_name(), path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("Wrote report {}", path.display());
    }
    if let Some(path) = &config.summary {
        export_summary_csv(path, &summary)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
    }
    Ok(summary)
}

fn log_summary(s: &RunSummary) {
    info!(
        "{} records: {} converted, {} not found ({} marked), {} failed in {:.2}s",
        s.total,
        s.matched,
        s.unmatched(),
        s.unmatched_marked,
        s.failed,
        s.duration_secs
    );
    if s.failed > 0 {
        warn!(
            "{} records could not be processed; see warnings above",
            s.failed
        );
    }
}
