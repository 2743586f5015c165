//! Excel-compatible HTML table export (`.xls`).
//!
//! Excel opens an HTML table saved with an `.xls` extension, which is as
//! much of the format as the export needs.

const HEAD: &str = "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" \
xmlns:x=\"urn:schemas-microsoft-com:office:excel\"><head><meta charset=\"utf-8\"></head><body><table>";
const TAIL: &str = "</table></body></html>";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render rows of display strings as an Excel-readable HTML table.
pub fn write_excel_html(rows: &[Vec<String>]) -> String {
    let mut html = String::from(HEAD);
    for row in rows {
        html.push_str("<tr>");
        for field in row {
            html.push_str("<td>");
            html.push_str(&escape_html(field));
            html.push_str("</td>");
        }
        html.push_str("</tr>");
    }
    html.push_str(TAIL);
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"A&B\"</b>"),
            "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_write_excel_html() {
        let html = write_excel_html(&[vec!["1".to_string(), "<x>".to_string()]]);
        assert!(html.starts_with("<html"));
        assert!(html.contains("<tr><td>1</td><td>&lt;x&gt;</td></tr>"));
        assert!(html.ends_with("</table></body></html>"));
    }
}
