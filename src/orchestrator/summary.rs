//! Run summary: per-outcome counts and timing for one conversion run.

use crate::models::{NameFormat, OutcomeKind, RecordOutcome};

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub table: String,
    pub input_format: NameFormat,
    pub output_format: NameFormat,
    pub input_field: String,
    pub output_field: String,
    pub field_created: bool,
    pub reference_entries: usize,
    pub total: usize,
    pub matched: usize,
    pub unmatched_silent: usize,
    pub unmatched_marked: usize,
    pub failed: usize,
    pub started_utc: chrono::DateTime<chrono::Utc>,
    pub ended_utc: chrono::DateTime<chrono::Utc>,
    pub duration_secs: f64,
    pub outcomes: Vec<RecordOutcome>,
}

impl RunSummary {
    pub fn unmatched(&self) -> usize {
        self.unmatched_silent + self.unmatched_marked
    }
}

/// Builder for RunSummary.
#[derive(Debug, Clone)]
pub struct SummaryBuilder {
    pub table: String,
    pub input_format: NameFormat,
    pub output_format: NameFormat,
    pub input_field: String,
    pub output_field: String,
    pub field_created: bool,
    pub reference_entries: usize,
    pub started_utc: chrono::DateTime<chrono::Utc>,
    pub ended_utc: chrono::DateTime<chrono::Utc>,
    pub outcomes: Vec<RecordOutcome>,
}

impl SummaryBuilder {
    pub fn new(table: &str, input_format: NameFormat, output_format: NameFormat) -> Self {
        let now = chrono::Utc::now();
        Self {
            table: table.to_string(),
            input_format,
            output_format,
            input_field: String::new(),
            output_field: String::new(),
            field_created: false,
            reference_entries: 0,
            started_utc: now,
            ended_utc: now,
            outcomes: Vec::new(),
        }
    }

    /// Set the bound field names.
    pub fn with_fields(mut self, input: &str, output: &str, created: bool) -> Self {
        self.input_field = input.to_string();
        self.output_field = output.to_string();
        self.field_created = created;
        self
    }

    pub fn with_reference_entries(mut self, n: usize) -> Self {
        self.reference_entries = n;
        self
    }

    /// Set run timestamps.
    pub fn with_timestamps(
        mut self,
        started: chrono::DateTime<chrono::Utc>,
        ended: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        self.started_utc = started;
        self.ended_utc = ended;
        self
    }

    pub fn with_outcomes(mut self, outcomes: Vec<RecordOutcome>) -> Self {
        self.outcomes = outcomes;
        self
    }

    pub fn build(self) -> RunSummary {
        let count = |kind: OutcomeKind| self.outcomes.iter().filter(|o| o.kind() == kind).count();
        let matched = count(OutcomeKind::Matched);
        let unmatched_silent = count(OutcomeKind::UnmatchedSilent);
        let unmatched_marked = count(OutcomeKind::UnmatchedMarked);
        let failed = count(OutcomeKind::Failed);
        let duration_secs = (self.ended_utc - self.started_utc).num_milliseconds() as f64 / 1000.0;
        RunSummary {
            table: self.table,
            input_format: self.input_format,
            output_format: self.output_format,
            input_field: self.input_field,
            output_field: self.output_field,
            field_created: self.field_created,
            reference_entries: self.reference_entries,
            total: self.outcomes.len(),
            matched,
            unmatched_silent,
            unmatched_marked,
            failed,
            started_utc: self.started_utc,
            ended_utc: self.ended_utc,
            duration_secs,
            outcomes: self.outcomes,
        }
    }
}
