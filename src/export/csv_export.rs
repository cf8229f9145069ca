use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::models::RecordOutcome;
use crate::orchestrator::summary::RunSummary;

#[derive(Serialize)]
struct OutcomeRow<'a> {
    oid: Option<i64>,
    outcome: &'a str,
    input: Option<&'a str>,
    output: Option<&'a str>,
    reason: Option<&'a str>,
}

impl<'a> OutcomeRow<'a> {
    fn from_outcome(o: &'a RecordOutcome) -> Self {
        let (input, output, reason) = match o {
            RecordOutcome::Matched { input, output, .. } => {
                (Some(input.as_str()), Some(output.as_str()), None)
            }
            RecordOutcome::UnmatchedSilent { input, .. } => (input.as_deref(), None, None),
            RecordOutcome::UnmatchedMarked { input, .. } => (
                input.as_deref(),
                Some(crate::models::UNFOUND_SENTINEL),
                None,
            ),
            RecordOutcome::Failed { reason, .. } => (None, None, Some(reason.as_str())),
        };
        Self {
            oid: o.oid(),
            outcome: o.kind().as_str(),
            input,
            output,
            reason,
        }
    }
}

/// Write one row per processed record: OID, outcome, input, output, failure reason.
pub fn export_outcomes_csv(summary: &RunSummary, oid_field: &str, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let buf_writer = BufWriter::with_capacity(64 * 1024, file);
    let mut w = WriterBuilder::new()
        .has_headers(false)
        .from_writer(buf_writer);
    w.write_record([oid_field, "Outcome", "Input", "Output", "Reason"])?;
    for o in &summary.outcomes {
        w.serialize(OutcomeRow::from_outcome(o))?;
    }
    w.flush()?;
    Ok(())
}

/// Write the run summary as Key,Value rows.
pub fn export_summary_csv(path: &Path, s: &RunSummary) -> Result<()> {
    let file = File::create(path)?;
    let mut w = WriterBuilder::new().from_writer(BufWriter::new(file));
    w.write_record(["Key", "Value"])?;

    let mut write_kv = |k: &str, v: String| -> Result<()> {
        w.write_record([k, v.as_str()])?;
        Ok(())
    };

    write_kv("Table", s.table.clone())?;
    write_kv(
        "Conversion",
        format!("{} -> {}", s.input_format, s.output_format),
    )?;
    write_kv("Input field", s.input_field.clone())?;
    write_kv("Output field", s.output_field.clone())?;
    write_kv("Output field created", s.field_created.to_string())?;
    write_kv("Reference names", s.reference_entries.to_string())?;
    write_kv("Total records", s.total.to_string())?;
    write_kv("Converted", s.matched.to_string())?;
    write_kv("Not found", s.unmatched_silent.to_string())?;
    write_kv("Not found (marked)", s.unmatched_marked.to_string())?;
    write_kv("Failed", s.failed.to_string())?;
    write_kv("Started (UTC)", s.started_utc.to_rfc3339())?;
    write_kv("Ended (UTC)", s.ended_utc.to_rfc3339())?;
    write_kv("Duration (s)", format!("{:.3}", s.duration_secs))?;

    w.flush()?;
    Ok(())
}
