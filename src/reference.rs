//! Reference name table: loads the acronym/scientific/common CSV into a lookup map.

use csv::ReaderBuilder;
use log::{debug, info, warn};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use crate::error::ReferenceError;
use crate::models::NameFormat;
use crate::normalize::normalize_key;

/// Key → value mapping from one naming convention to another.
#[derive(Debug, Clone)]
pub struct NameLookup {
    from: NameFormat,
    to: NameFormat,
    entries: HashMap<String, String>,
    overwritten: usize,
}

impl NameLookup {
    pub fn new(from: NameFormat, to: NameFormat) -> Self {
        Self {
            from,
            to,
            entries: HashMap::new(),
            overwritten: 0,
        }
    }

    /// Build from in-memory (acronym, scientific, common) triples.
    pub fn from_rows<'a, I>(from: NameFormat, to: NameFormat, rows: I) -> Self
    where
        I: IntoIterator<Item = [&'a str; 3]>,
    {
        let mut lookup = Self::new(from, to);
        for row in rows {
            lookup.insert_row(&row);
        }
        lookup
    }

    /// Insert one reference row. A later row with the same key replaces the earlier one.
    pub fn insert_row<S: AsRef<str>>(&mut self, row: &[S; 3]) {
        let key = normalize_key(row[self.from.column()].as_ref());
        let value = row[self.to.column()].as_ref().to_string();
        if let Some(prev) = self.entries.insert(key.clone(), value) {
            self.overwritten += 1;
            debug!("Duplicate reference key \"{}\" replaces \"{}\"", key, prev);
        }
    }

    /// Normalize `raw` and look it up.
    pub fn get(&self, raw: &str) -> Option<&str> {
        self.get_normalized(&normalize_key(raw))
    }

    /// Look up an already-normalized key.
    pub fn get_normalized(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn input_format(&self) -> NameFormat {
        self.from
    }

    pub fn output_format(&self) -> NameFormat {
        self.to
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of rows whose key replaced an earlier row's key.
    pub fn overwritten(&self) -> usize {
        self.overwritten
    }
}

/// Fail if the reference CSV does not exist.
pub fn check_reference_exists(path: &Path) -> Result<(), ReferenceError> {
    if !path.exists() {
        return Err(ReferenceError::NotFound {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

/// Load the unheadered three-column reference CSV, keyed by the `from` column.
pub fn load_reference(
    path: &Path,
    from: NameFormat,
    to: NameFormat,
) -> Result<NameLookup, ReferenceError> {
    check_reference_exists(path)?;
    info!("Constructing tree name dictionary...");

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut lookup = NameLookup::new(from, to);
    for (idx, result) in rdr.byte_records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 1);
        if record.len() != 3 {
            return Err(ReferenceError::MalformedRow {
                line,
                columns: record.len(),
            });
        }
        let cells: Vec<Cow<'_, str>> = record.iter().map(String::from_utf8_lossy).collect();
        if cells.iter().any(|c| matches!(c, Cow::Owned(_))) {
            warn!(
                "Reference row {} is not valid UTF-8; undecodable bytes were replaced",
                line
            );
        }
        let mut row = [&*cells[0], &*cells[1], &*cells[2]];
        if idx == 0 {
            row[0] = row[0].trim_start_matches('\u{feff}');
        }
        lookup.insert_row(&row);
    }

    info!(
        "Loaded {} {} → {} names from {}",
        lookup.len(),
        from,
        to,
        path.display()
    );
    if lookup.overwritten() > 0 {
        warn!(
            "{} reference rows repeated an earlier {} key; the last occurrence was kept",
            lookup.overwritten(),
            from
        );
    }
    Ok(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ROWS: [[&str; 3]; 3] = [
        ["DF", "Pseudotsuga menziesii", "Douglas-fir"],
        ["RA", "Alnus rubra", "Red alder"],
        ["WRC", "Thuja plicata", "Western redcedar"],
    ];

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn every_key_resolves_to_target_column() {
        for from in [NameFormat::Acronym, NameFormat::Scientific, NameFormat::Common] {
            for to in [NameFormat::Acronym, NameFormat::Scientific, NameFormat::Common] {
                let lookup = NameLookup::from_rows(from, to, ROWS);
                for row in ROWS {
                    let key = row[from.column()];
                    assert_eq!(lookup.get(key), Some(row[to.column()]));
                    assert_eq!(lookup.get(&key.to_uppercase()), Some(row[to.column()]));
                    assert_eq!(lookup.get(&format!("  {}  ", key.to_lowercase())), Some(row[to.column()]));
                }
            }
        }
    }

    #[test]
    fn duplicate_keys_keep_last_row() {
        let lookup = NameLookup::from_rows(
            NameFormat::Acronym,
            NameFormat::Common,
            [
                ["DF", "Pseudotsuga menziesii", "Douglas-fir"],
                ["df", "Pseudotsuga menziesii", "Coast Douglas-fir"],
            ],
        );
        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup.overwritten(), 1);
        assert_eq!(lookup.get("DF"), Some("Coast Douglas-fir"));
    }

    #[test]
    fn load_reference_from_csv() {
        let f = write_csv(
            "DF,Pseudotsuga menziesii,Douglas-fir\nRA,Alnus rubra,Red alder\n\"BM\",\"Acer macrophyllum\",\"Bigleaf maple, Oregon\"\n",
        );
        let lookup = load_reference(f.path(), NameFormat::Acronym, NameFormat::Common).unwrap();
        assert_eq!(lookup.len(), 3);
        assert_eq!(lookup.get("df"), Some("Douglas-fir"));
        assert_eq!(lookup.get("bm"), Some("Bigleaf maple, Oregon"));
        assert_eq!(lookup.input_format(), NameFormat::Acronym);
        assert_eq!(lookup.output_format(), NameFormat::Common);
    }

    #[test]
    fn load_reference_value_kept_verbatim() {
        let f = write_csv("df,PSEUDOTSUGA menziesii,douglas-FIR\n");
        let lookup = load_reference(f.path(), NameFormat::Acronym, NameFormat::Common).unwrap();
        assert_eq!(lookup.get("DF"), Some("douglas-FIR"));
    }

    #[test]
    fn load_reference_strips_bom() {
        let f = write_csv("\u{feff}DF,Pseudotsuga menziesii,Douglas-fir\n");
        let lookup = load_reference(f.path(), NameFormat::Acronym, NameFormat::Scientific).unwrap();
        assert_eq!(lookup.get("DF"), Some("Pseudotsuga menziesii"));
    }

    #[test]
    fn load_reference_tolerates_undecodable_bytes() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"DF,Pseudotsuga menziesii,Douglas-fir\nGF,Abies grandis,Sapin grandissime \xE9\nRA,Alnus rubra,Red alder\n")
            .unwrap();
        f.flush().unwrap();
        let lookup = load_reference(f.path(), NameFormat::Acronym, NameFormat::Common).unwrap();
        assert_eq!(lookup.len(), 3);
        assert_eq!(lookup.get("ra"), Some("Red alder"));
        assert_eq!(lookup.get("gf"), Some("Sapin grandissime \u{fffd}"));
    }

    #[test]
    fn load_reference_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv");
        let err = load_reference(&missing, NameFormat::Acronym, NameFormat::Common).unwrap_err();
        assert!(matches!(err, ReferenceError::NotFound { .. }));
    }

    #[test]
    fn load_reference_rejects_short_row() {
        let f = write_csv("DF,Pseudotsuga menziesii,Douglas-fir\nRA,Alnus rubra\n");
        let err = load_reference(f.path(), NameFormat::Acronym, NameFormat::Common).unwrap_err();
        match err {
            ReferenceError::MalformedRow { line, columns } => {
                assert_eq!(line, 2);
                assert_eq!(columns, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
