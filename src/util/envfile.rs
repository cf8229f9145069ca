use anyhow::Result;
use log::warn;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Parse `KEY=value` lines. Blank lines and `#` comments are skipped; surrounding quotes are removed.
pub fn parse_env_str(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for (idx, line) in content.lines().enumerate() {
        let s = line.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        if let Some((key, val)) = s.split_once('=') {
            let key = key.trim();
            let mut val = val.trim().to_string();
            if val.len() >= 2
                && ((val.starts_with('"') && val.ends_with('"'))
                    || (val.starts_with('\'') && val.ends_with('\'')))
            {
                val = val[1..val.len() - 1].to_string();
            }
            map.insert(key.to_string(), val);
        } else {
            warn!("Ignoring .env line {} without '=': {}", idx + 1, line);
        }
    }
    map
}

/// Parse a .env file at `path`; a missing file yields an empty map.
pub fn parse_env_file(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = fs::read_to_string(path)?;
    Ok(parse_env_str(&content))
}

/// Load `.env` from the current working directory into the process environment
/// without overriding variables that are already set.
pub fn load_dotenv_if_present() -> Result<()> {
    for (k, v) in parse_env_file(Path::new(".env"))? {
        if std::env::var_os(&k).is_none() {
            unsafe {
                std::env::set_var(&k, &v);
            }
        }
    }
    Ok(())
}

/// Generate a .env.template file with placeholder values and comments.
pub fn write_env_template(path: &str) -> Result<()> {
    let mut f = fs::File::create(path)?;
    let template = r#"# tree_names environment configuration template
# Copy this file to .env and fill in the values for your run.
# Command-line flags take precedence over these variables.

# Attribute table to update (headered CSV) and its object-id field
TREE_NAMES_TABLE=trees.csv
#TREE_NAMES_OID_FIELD=OBJECTID

# Conversion: Acronym | Scientific | Common
TREE_NAMES_INPUT_FORMAT=Acronym
TREE_NAMES_INPUT_FIELD=Species
TREE_NAMES_OUTPUT_FORMAT=Common
#TREE_NAMES_OUTPUT_FIELD=CommonName

# Add the output field (text, width 80); the run fails if it already exists
#TREE_NAMES_CREATE_FIELD=true
# Write *NOT FOUND* to unmatched records
#TREE_NAMES_MARK_UNFOUND=true

# Reference names: acronym,scientific,common rows without a header
TREE_NAMES_REFERENCE=Master_Tree_List.csv

# Optional outputs
#TREE_NAMES_REPORT=conversion_report.csv
#TREE_NAMES_SUMMARY=conversion_summary.csv
"#;
    f.write_all(template.as_bytes())?;
    Ok(())
}
