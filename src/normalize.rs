use crate::models::NameFormat;

/// Canonical lookup key: trimmed, internal whitespace runs collapsed to one space, lower-cased.
pub fn normalize_key(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Display form written back to the input field.
///
/// Acronyms are upper-cased; scientific and common names get their first
/// character upper-cased and keep the rest as given.
pub fn format_display(canonical: &str, format: NameFormat) -> String {
    match format {
        NameFormat::Acronym => canonical.to_uppercase(),
        NameFormat::Scientific | NameFormat::Common => capitalize_first(canonical),
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(s.len());
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}
