//! Option dictionary files
//!
//! A YAML (or JSON) mapping of option name to value. Scalar values are
//! taken as text; the translator interprets them.

use anyhow::{bail, Context, Result};
use serde_yaml::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

pub fn load(path: &Path) -> Result<HashMap<String, String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read option file {}", path.display()))?;
    parse(&contents).with_context(|| format!("Invalid option file {}", path.display()))
}

pub fn parse(contents: &str) -> Result<HashMap<String, String>> {
    let raw: BTreeMap<String, Value> = serde_yaml::from_str(contents)?;

    let mut options = HashMap::with_capacity(raw.len());
    for (key, value) in raw {
        let text = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => bail!("option '{}' must be a scalar, got {:?}", key, other),
        };
        options.insert(key, text);
    }
    Ok(options)
}
