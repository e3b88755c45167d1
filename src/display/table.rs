use crate::utils::text::truncate_cell;
use comfy_table::{presets, Cell, ContentArrangement, Table};
use crossterm::terminal;
use serde_json::Value;

/// One rendered row, keyed by column name. Kept as a JSON object so JSON
/// mode can emit it unchanged.
pub type Row = serde_json::Map<String, Value>;

/// Column-aligned plain-text table rendering.
pub struct TableDisplay {
    max_width: Option<u16>,
}

impl TableDisplay {
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
        }
    }

    /// Fixed-width rendering for tests and non-terminal output.
    pub fn unconstrained() -> Self {
        Self { max_width: None }
    }

    fn detect_terminal_width() -> Option<u16> {
        if atty::is(atty::Stream::Stdout) {
            terminal::size().ok().map(|(width, _)| width)
        } else {
            None
        }
    }

    pub fn render(&self, columns: &[&str], rows: &[Row]) -> String {
        if rows.is_empty() {
            return "(no results)".to_string();
        }

        let mut table = Table::new();
        table.load_preset(presets::NOTHING);
        if let Some(width) = self.max_width {
            table.set_width(width);
            table.set_content_arrangement(ContentArrangement::Dynamic);
        }
        table.set_header(columns.iter().map(|c| Cell::new(c.to_uppercase())));

        for row in rows {
            table.add_row(
                columns
                    .iter()
                    .map(|c| Cell::new(truncate_cell(&cell_text(row.get(*c))))),
            );
        }

        table.to_string()
    }

    pub fn print(&self, columns: &[&str], rows: &[Row]) {
        println!("{}", self.render(columns, rows));
    }
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}

/// Missing and null cells render empty; strings render bare, everything
/// else via its JSON form.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Build a row from column/value pairs.
pub fn row(pairs: Vec<(&str, Value)>) -> Row {
    let mut row = Row::new();
    for (key, value) in pairs {
        row.insert(key.to_string(), value);
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_rows_placeholder() {
        let display = TableDisplay::unconstrained();
        assert_eq!(display.render(&["id", "name"], &[]), "(no results)");
    }

    #[test]
    fn test_render_headers_and_cells() {
        let display = TableDisplay::unconstrained();
        let rows = vec![
            row(vec![("id", json!(1)), ("name", json!("Web"))]),
            row(vec![("id", json!(2)), ("name", json!("Mobile"))]),
        ];
        let out = display.render(&["id", "name"], &rows);
        assert!(out.contains("ID"));
        assert!(out.contains("NAME"));
        assert!(out.contains("Web"));
        assert!(out.contains("Mobile"));
    }

    #[test]
    fn test_missing_column_renders_empty() {
        let display = TableDisplay::unconstrained();
        let rows = vec![row(vec![("id", json!(1))])];
        let out = display.render(&["id", "name"], &rows);
        assert!(out.contains('1'));
    }

    #[test]
    fn test_cell_text_forms() {
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&Value::Null)), "");
        assert_eq!(cell_text(Some(&json!("plain"))), "plain");
        assert_eq!(cell_text(Some(&json!(42))), "42");
        assert_eq!(cell_text(Some(&json!(true))), "true");
    }

    #[test]
    fn test_long_cells_truncated() {
        let display = TableDisplay::unconstrained();
        let long = "y".repeat(120);
        let rows = vec![row(vec![("name", json!(long))])];
        let out = display.render(&["name"], &rows);
        assert!(out.contains('…'));
        assert!(!out.contains(&"y".repeat(60)));
    }
}
