//! Tokenizing CSV reader.
//!
//! A single left-to-right scan over the whole file. Quoted fields may contain
//! commas, newlines and doubled quotes (`""` decodes to one `"`). The scanner
//! never fails: malformed quoting is consumed as best it can be, because a
//! partially readable file is still worth importing.

use serde::Serialize;
use tracing::debug;

/// A tokenized file: one header row plus data rows.
///
/// Rows are not required to match the header width. Use [`cell`] to read a
/// column so that missing cells read as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawTable {
    /// The first non-blank row.
    pub headers: Vec<String>,
    /// Every non-blank row after the header.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Number of data rows (the header is not counted).
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the file had no header row.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Read a cell, treating a missing column as empty.
#[must_use]
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map_or("", String::as_str)
}

/// Read an optional column, treating an unmapped or missing column as empty.
#[must_use]
pub fn opt_cell(row: &[String], index: Option<usize>) -> &str {
    index.map_or("", |i| cell(row, i))
}

/// Tokenize raw file content into a [`RawTable`].
///
/// - A comma outside quotes ends a field; fields are trimmed.
/// - `\n` or `\r\n` outside quotes ends a row; inside quotes it is content.
/// - Rows made only of empty fields are dropped.
/// - A leading UTF-8 byte order mark is ignored.
#[must_use]
pub fn parse(content: &str) -> RawTable {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut scanner = Scanner::default();
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if scanner.in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                scanner.field.push('"');
            }
            '"' => scanner.in_quotes = !scanner.in_quotes,
            ',' if !scanner.in_quotes => scanner.end_field(),
            '\r' if !scanner.in_quotes && chars.peek() == Some(&'\n') => {
                chars.next();
                scanner.end_row();
            }
            '\n' if !scanner.in_quotes => scanner.end_row(),
            _ => scanner.field.push(c),
        }
    }
    scanner.end_row();

    let mut rows = scanner.rows.into_iter();
    let headers = rows.next().unwrap_or_default();
    let table = RawTable {
        headers,
        rows: rows.collect(),
    };

    debug!(
        columns = table.headers.len(),
        rows = table.row_count(),
        "Tokenized CSV content"
    );

    table
}

#[derive(Default)]
struct Scanner {
    in_quotes: bool,
    field: String,
    row: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Scanner {
    fn end_field(&mut self) {
        let field = std::mem::take(&mut self.field);
        self.row.push(field.trim().to_string());
    }

    fn end_row(&mut self) {
        self.end_field();
        let row = std::mem::take(&mut self.row);
        if row.iter().any(|f| !f.is_empty()) {
            self.rows.push(row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_headers_and_rows() {
        let table = parse("name,price\nWidget,19.99\nGadget,5\n");
        assert_eq!(table.headers, strings(&["name", "price"]));
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], strings(&["Gadget", "5"]));
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_quoted_comma_is_one_field() {
        let table = parse("name,images\nWidget,\"a,b\"");
        assert_eq!(table.rows[0], strings(&["Widget", "a,b"]));
    }

    #[test]
    fn test_escaped_quote() {
        let table = parse("quote\n\"He said \"\"hi\"\"\"");
        assert_eq!(table.rows[0], strings(&["He said \"hi\""]));
    }

    #[test]
    fn test_embedded_newline_inside_quotes() {
        let table = parse("name,description\nMug,\"line one\nline two\"\nCup,plain");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][1], "line one\nline two");
        assert_eq!(table.rows[1][0], "Cup");
    }

    #[test]
    fn test_crlf_line_endings() {
        let table = parse("a,b\r\n1,2\r\n3,4\r\n");
        assert_eq!(table.headers, strings(&["a", "b"]));
        assert_eq!(table.rows, vec![strings(&["1", "2"]), strings(&["3", "4"])]);
    }

    #[test]
    fn test_blank_rows_dropped() {
        let table = parse("\n\na,b\n,\n1,2\n\n , \n");
        assert_eq!(table.headers, strings(&["a", "b"]));
        assert_eq!(table.rows, vec![strings(&["1", "2"])]);
    }

    #[test]
    fn test_fields_trimmed() {
        let table = parse("  name ,  price\n  Widget  , 1 ");
        assert_eq!(table.headers, strings(&["name", "price"]));
        assert_eq!(table.rows[0], strings(&["Widget", "1"]));
    }

    #[test]
    fn test_no_trailing_newline_flushes_last_row() {
        let table = parse("a\nlast");
        assert_eq!(table.rows, vec![strings(&["last"])]);
    }

    #[test]
    fn test_empty_input() {
        let table = parse("");
        assert!(table.is_empty());
        assert!(table.rows.is_empty());
        assert_eq!(table.row_count(), 0);

        let table = parse("\n\r\n,,\n");
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_unterminated_quote_is_permissive() {
        let table = parse("a,b\n\"open,1\n2,3");
        assert_eq!(table.headers, strings(&["a", "b"]));
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0], strings(&["open,1\n2,3"]));
    }

    #[test]
    fn test_byte_order_mark_ignored() {
        let table = parse("\u{feff}Handle,Title\nmug,Mug");
        assert_eq!(table.headers[0], "Handle");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let content = "name,price\n\"A, B\",1\nC,\"2\"\"\"";
        assert_eq!(parse(content), parse(content));
    }

    #[test]
    fn test_cell_reads_missing_as_empty() {
        let row = strings(&["only"]);
        assert_eq!(cell(&row, 0), "only");
        assert_eq!(cell(&row, 5), "");
        assert_eq!(opt_cell(&row, None), "");
        assert_eq!(opt_cell(&row, Some(0)), "only");
    }
}
