//! Record conversion: resolve each record's name through the lookup and write the result back.

use log::{debug, info, warn};

use crate::error::{ConvertError, TableError};
use crate::models::{
    FieldBinding, NameFormat, OUTPUT_FIELD_WIDTH, Record, RecordOutcome, Resolution,
    UNFOUND_SENTINEL,
};
use crate::normalize::{format_display, normalize_key};
use crate::reference::NameLookup;
use crate::table::AttributeTable;

#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// Convention of the input field; decides how a matched input is rewritten.
    pub input_format: NameFormat,
    /// Write the sentinel to the output field of unmatched records.
    pub mark_unfound: bool,
}

/// Where the converted names go.
#[derive(Debug, Clone)]
pub struct OutputTarget<'a> {
    pub format: NameFormat,
    /// Explicit output field name; required unless the field is created.
    pub field: Option<&'a str>,
    /// Add the field before converting; fails if it already exists.
    pub create: bool,
}

/// Validate the input field and resolve (and possibly create) the output field.
///
/// Runs before any record is touched, so a collision leaves the table unchanged.
pub fn prepare_output_field<T: AttributeTable + ?Sized>(
    table: &mut T,
    input_field: &str,
    target: &OutputTarget<'_>,
) -> Result<FieldBinding, ConvertError> {
    if !table.has_field(input_field) {
        return Err(ConvertError::MissingField {
            role: "input",
            field: input_field.to_string(),
        });
    }

    let output = if target.create {
        let name = target.field.unwrap_or(target.format.as_str()).to_string();
        if table.has_field(&name) {
            return Err(ConvertError::OutputFieldExists { field: name });
        }
        table.add_text_field(&name, OUTPUT_FIELD_WIDTH)?;
        info!("Adding {} field...", name);
        name
    } else {
        let name = target.field.ok_or(ConvertError::OutputFieldRequired)?;
        if !table.has_field(name) {
            return Err(ConvertError::MissingField {
                role: "output",
                field: name.to_string(),
            });
        }
        name.to_string()
    };

    Ok(FieldBinding {
        input: input_field.to_string(),
        output,
    })
}

/// Look up one input value.
pub fn resolve(input: Option<&str>, lookup: &NameLookup, options: &ConvertOptions) -> Resolution {
    let key = normalize_key(input.unwrap_or(""));
    match lookup.get_normalized(&key) {
        Some(found) => Resolution::Matched {
            display_input: format_display(&key, options.input_format),
            output: found.to_string(),
        },
        None if options.mark_unfound => Resolution::UnmatchedMarked,
        None => Resolution::UnmatchedSilent,
    }
}

/// Apply a resolution to a record. Returns whether the record changed and must be written.
pub fn apply(record: &mut Record, resolution: &Resolution) -> bool {
    match resolution {
        Resolution::Matched {
            display_input,
            output,
        } => {
            record.input = Some(display_input.clone());
            record.output = Some(output.clone());
            true
        }
        Resolution::UnmatchedMarked => {
            record.output = Some(UNFOUND_SENTINEL.to_string());
            true
        }
        Resolution::UnmatchedSilent => false,
    }
}

fn show(v: Option<&str>) -> &str {
    v.unwrap_or("None")
}

fn failure(oid_field: &str, oid: Option<i64>, err: TableError) -> RecordOutcome {
    let kind = err.kind();
    let err = match oid {
        Some(oid) => anyhow::Error::new(err).context(format!("writing {} {}", oid_field, oid)),
        None => anyhow::Error::new(err).context("reading row"),
    };
    warn!("{}: {:?}", kind, err);
    RecordOutcome::Failed {
        oid,
        reason: format!("{}: {:#}", kind, err),
    }
}

/// Convert every record of `table`. Per-record failures are returned as
/// `RecordOutcome::Failed` and do not stop the run; the table is flushed once at the end.
pub fn convert_table<T: AttributeTable + ?Sized>(
    table: &mut T,
    binding: &FieldBinding,
    lookup: &NameLookup,
    options: &ConvertOptions,
) -> Result<Vec<RecordOutcome>, ConvertError> {
    let oid_field = table.oid_field_name().to_string();
    let rows = table.read_all(binding)?;
    let mut outcomes = Vec::with_capacity(rows.len());

    for row in rows {
        let mut record = match row {
            Ok(r) => r,
            Err(e) => {
                outcomes.push(failure(&oid_field, None, e));
                continue;
            }
        };
        debug!(
            "{}, {}",
            show(record.input.as_deref()),
            show(record.output.as_deref())
        );

        let original_input = record.input.clone();
        let resolution = resolve(record.input.as_deref(), lookup, options);
        match &resolution {
            Resolution::UnmatchedSilent => {
                warn!(
                    "No matching record for {} {}: \"{}\".",
                    oid_field,
                    record.oid,
                    show(record.input.as_deref())
                );
            }
            Resolution::UnmatchedMarked => {
                warn!(
                    "{} populated for {} {}: \"{}\".",
                    UNFOUND_SENTINEL,
                    oid_field,
                    record.oid,
                    show(record.input.as_deref())
                );
            }
            Resolution::Matched { .. } => {}
        }

        if apply(&mut record, &resolution) {
            if let Err(e) = table.write(binding, &record) {
                outcomes.push(failure(&oid_field, Some(record.oid), e));
                continue;
            }
        }

        outcomes.push(match resolution {
            Resolution::Matched {
                display_input,
                output,
            } => RecordOutcome::Matched {
                oid: record.oid,
                input: display_input,
                output,
            },
            Resolution::UnmatchedSilent => RecordOutcome::UnmatchedSilent {
                oid: record.oid,
                input: original_input,
            },
            Resolution::UnmatchedMarked => RecordOutcome::UnmatchedMarked {
                oid: record.oid,
                input: original_input,
            },
        });
    }

    table.flush()?;
    Ok(outcomes)
}
