//! Output formatters

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

/// JSON formatter
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format a value as pretty JSON
    pub fn format<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }
}

/// Plain text formatter: indented `key: value` lines
pub struct PlainFormatter;

impl PlainFormatter {
    /// Format any serializable value as indented text
    pub fn format<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        let json = serde_json::to_value(value)?;
        let mut out = Vec::new();
        Self::write_value(&json, 0, &mut out);
        Ok(out.join("\n"))
    }

    fn scalar(value: &Value) -> Option<String> {
        match value {
            Value::Null => Some("-".to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn write_value(value: &Value, indent: usize, out: &mut Vec<String>) {
        let pad = "  ".repeat(indent);
        match value {
            Value::Object(obj) => {
                for (key, v) in obj {
                    match Self::scalar(v) {
                        Some(s) => out.push(format!("{pad}{key}: {s}")),
                        None => {
                            out.push(format!("{pad}{key}:"));
                            Self::write_value(v, indent + 1, out);
                        }
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    match Self::scalar(item) {
                        Some(s) => out.push(format!("{pad}- {s}")),
                        None => {
                            out.push(format!("{pad}-"));
                            Self::write_value(item, indent + 1, out);
                        }
                    }
                }
            }
            scalar => out.push(format!("{pad}{}", Self::scalar(scalar).unwrap_or_default())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestData {
        name: String,
        count: i32,
        tags: Vec<String>,
    }

    fn data() -> TestData {
        TestData {
            name: "test".to_string(),
            count: 42,
            tags: vec!["a".to_string(), "b".to_string()],
        }
    }

    #[test]
    fn test_json_formatter() {
        let result = JsonFormatter::format(&data()).unwrap();
        assert!(result.contains("\"name\": \"test\""));
    }

    #[test]
    fn test_plain_formatter() {
        let result = PlainFormatter::format(&data()).unwrap();
        // keys come out sorted
        assert_eq!(result, "count: 42\nname: test\ntags:\n  - a\n  - b");
    }
}
