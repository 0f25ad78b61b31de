//! JSON/YAML rendering of command results.

use std::io::Read;
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;

use crate::error::TpieError;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Renders a value; JSON is always pretty printed.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, TpieError> {
    match format {
        OutputFormat::Json => {
            let mut text = serde_json::to_string_pretty(value)?;
            text.push('\n');
            Ok(text)
        }
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
    }
}

/// Reads a JSON document from a file, or from stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> Result<Value, TpieError> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_json() {
        let text = render(&json!({ "name": "Roy", "tasks": ["1"] }), OutputFormat::Json).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), json!({ "name": "Roy", "tasks": ["1"] }));
    }

    #[test]
    fn render_yaml() {
        let text = render(&json!({ "name": "Roy", "total_count": 25 }), OutputFormat::Yaml).unwrap();
        assert_eq!(text, "name: Roy\ntotal_count: 25\n");
    }
}
