//! CSV import/export functionality

use neurosheets_engine::engine::{Cell, CellRef, CellValue};

use crate::error::{NeuroSheetsError, Result};

/// Split CSV text into records.
///
/// Quoted fields may contain commas, doubled quotes and line breaks.
/// Unquoted fields are trimmed; quoted fields are kept exactly.
pub fn parse_csv(content: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut field_was_quoted = false;
    let mut line = 1;
    let mut quote_line = 0;
    let mut chars = content.chars().peekable();

    let finish_field = |record: &mut Vec<String>, current: &mut String, quoted: bool| {
        let field = std::mem::take(current);
        if quoted {
            record.push(field);
        } else {
            record.push(field.trim().to_string());
        }
    };

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    current.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => {
                    if c == '\n' {
                        line += 1;
                    }
                    current.push(c);
                }
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                field_was_quoted = true;
                quote_line = line;
            }
            ',' => {
                finish_field(&mut record, &mut current, field_was_quoted);
                field_was_quoted = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                finish_field(&mut record, &mut current, field_was_quoted);
                field_was_quoted = false;
                records.push(std::mem::take(&mut record));
                line += 1;
            }
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err(NeuroSheetsError::Parse {
            line: quote_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if !current.is_empty() || field_was_quoted || !record.is_empty() {
        finish_field(&mut record, &mut current, field_was_quoted);
        records.push(record);
    }
    Ok(records)
}

/// Turn CSV records into cells, keeping only the first `max_rows` rows and
/// `max_cols` columns. Empty fields produce no cell.
pub fn records_to_cells(
    records: &[Vec<String>],
    max_cols: usize,
    max_rows: usize,
) -> Vec<(CellRef, Cell)> {
    let mut cells = Vec::new();
    for (row, record) in records.iter().take(max_rows).enumerate() {
        for (col, field) in record.iter().take(max_cols).enumerate() {
            if field.is_empty() {
                continue;
            }
            cells.push((CellRef::new(col, row), parse_csv_field(field)));
        }
    }
    cells
}

/// Parse a CSV field into a literal cell.
/// - Valid number -> Number (unless it has leading zeros like "007")
/// - Otherwise -> Text, including anything that looks like a formula
pub(crate) fn parse_csv_field(field: &str) -> Cell {
    // Surrounding whitespace only survives in quoted fields; keep it as text.
    let trimmed = field.trim();
    if field != trimmed {
        return Cell::new_text(field);
    }

    // Preserve strings that look like numbers but have leading zeros (e.g., "007", "00123")
    // unless they're just "0" or start with "0."
    if trimmed.starts_with('0')
        && trimmed.len() > 1
        && !trimmed.starts_with("0.")
        && trimmed.chars().nth(1).is_some_and(|c| c.is_ascii_digit())
    {
        return Cell::new_text(trimmed);
    }

    match Cell::literal_value(trimmed) {
        CellValue::Number(n) => Cell::new_number(n),
        _ => Cell::new_text(trimmed),
    }
}

/// Quote a field if it contains a comma, quote or line break.
pub fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render rows of display strings as CSV, one line per row.
pub fn write_csv(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        let line: Vec<String> = row.iter().map(|f| escape_csv_field(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_quotes() {
        let records = parse_csv("a, b ,\"c,d\"\n\"say \"\"hi\"\"\",2\r\n").unwrap();
        assert_eq!(
            records,
            vec![
                vec!["a".to_string(), "b".to_string(), "c,d".to_string()],
                vec!["say \"hi\"".to_string(), "2".to_string()],
            ]
        );
    }

    #[test]
    fn test_parse_csv_multiline_field() {
        let records = parse_csv("\"line1\nline2\",x").unwrap();
        assert_eq!(records, vec![vec!["line1\nline2".to_string(), "x".to_string()]]);
    }

    #[test]
    fn test_parse_csv_unterminated_quote() {
        let err = parse_csv("a,b\nc,\"oops\n").unwrap_err();
        assert!(matches!(err, NeuroSheetsError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_parse_csv_field() {
        assert_eq!(parse_csv_field("42"), Cell::new_number(42.0));
        assert_eq!(parse_csv_field("-1.5"), Cell::new_number(-1.5));
        assert_eq!(parse_csv_field("007"), Cell::new_text("007"));
        assert_eq!(parse_csv_field("0.5"), Cell::new_number(0.5));
        assert_eq!(parse_csv_field("  hi  "), Cell::new_text("  hi  "));
        assert_eq!(parse_csv_field("=SUM(A1:A2)"), Cell::new_text("=SUM(A1:A2)"));
        assert_eq!(parse_csv_field("inf"), Cell::new_text("inf"));
    }

    #[test]
    fn test_records_to_cells_bounds_and_skips_empty() {
        let records = parse_csv("1,,3\n4,5,6\n7,8,9").unwrap();
        let cells = records_to_cells(&records, 2, 2);
        let refs: Vec<String> = cells.iter().map(|(r, _)| r.to_string()).collect();
        assert_eq!(refs, vec!["A1", "A2", "B2"]);
    }

    #[test]
    fn test_write_csv_escapes() {
        let rows = vec![
            vec!["a,b".to_string(), "plain".to_string()],
            vec!["he said \"x\"".to_string(), String::new()],
        ];
        assert_eq!(
            write_csv(&rows),
            "\"a,b\",plain\n\"he said \"\"x\"\"\",\n"
        );
    }
}
