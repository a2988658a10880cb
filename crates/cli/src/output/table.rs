//! Table formatting utilities

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, *};

/// Table formatter
pub struct TableFormatter;

impl TableFormatter {
    /// Create a new table with default styling
    pub fn new() -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }

    /// Create a simple table with headers and rows
    pub fn simple(headers: Vec<&str>, rows: Vec<Vec<String>>) -> String {
        let mut table = Self::new();
        table.set_header(headers);

        for row in rows {
            table.add_row(row);
        }

        table.to_string()
    }

    /// Create a key-value table
    pub fn key_value(items: Vec<(&str, String)>) -> String {
        let mut table = Self::new();

        for (key, value) in items {
            table.add_row(vec![key, &value]);
        }

        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_table() {
        let headers = vec!["Candidate", "Score"];
        let rows = vec![
            vec!["org/a".to_string(), "0.3000".to_string()],
            vec!["org/b".to_string(), "0.9000".to_string()],
        ];

        let rendered = TableFormatter::simple(headers, rows);

        assert!(rendered.contains("Candidate"));
        assert!(rendered.contains("org/b"));
    }

    #[test]
    fn test_key_value_table() {
        let items = vec![("Competition", "finetune-1".to_string()), ("Tasks", "50".to_string())];

        let rendered = TableFormatter::key_value(items);

        assert!(rendered.contains("finetune-1"));
    }
}
