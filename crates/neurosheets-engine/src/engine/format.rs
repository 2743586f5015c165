//! Display formatting for cell values.

use super::cell::{CellValue, NumberFormat};
use super::eval::EvalError;

/// Shown for cells caught in a circular reference.
pub const CIRCULAR_DISPLAY: &str = "#CIRC!";

/// Format a number in its natural form.
///
/// Integral values print without a fractional part, everything else uses the
/// shortest representation that round-trips.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n == 0.0 {
        // Also folds -0.
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// Format a number according to an optional format tag.
/// - `Currency`: `$` prefix, two decimals
/// - `Percent`: multiplied by 100, one decimal, `%` suffix
/// - anything else: natural form
pub fn format_with(n: f64, format: Option<NumberFormat>) -> String {
    match format {
        Some(NumberFormat::Currency) => format!("${:.2}", n),
        Some(NumberFormat::Percent) => format!("{:.1}%", n * 100.0),
        _ => format_number(n),
    }
}

/// Format a literal cell value. Text is shown exactly as stored.
pub fn format_value(value: &CellValue, format: Option<NumberFormat>) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Number(n) => format_with(*n, format),
        CellValue::Text(s) => s.clone(),
    }
}

/// Format the outcome of evaluating a formula cell.
///
/// Circular references get their own marker; every other failure falls back
/// to a formatted zero.
pub fn format_result(result: &Result<f64, EvalError>, format: Option<NumberFormat>) -> String {
    match result {
        Ok(n) => format_with(*n, format),
        Err(EvalError::Circular) => CIRCULAR_DISPLAY.to_string(),
        Err(_) => format_with(0.0, format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_number_form() {
        assert_eq!(format_number(60.0), "60");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn test_currency_and_percent() {
        assert_eq!(format_with(1234.5, Some(NumberFormat::Currency)), "$1234.50");
        assert_eq!(format_with(-5.0, Some(NumberFormat::Currency)), "$-5.00");
        assert_eq!(format_with(0.25, Some(NumberFormat::Percent)), "25.0%");
        assert_eq!(format_with(2.0, Some(NumberFormat::Date)), "2");
    }

    #[test]
    fn test_text_ignores_numeric_format() {
        let text = CellValue::Text("n/a".to_string());
        assert_eq!(format_value(&text, Some(NumberFormat::Currency)), "n/a");
        assert_eq!(format_value(&CellValue::Empty, None), "");
    }

    #[test]
    fn test_result_states() {
        assert_eq!(format_result(&Err(EvalError::Circular), None), "#CIRC!");
        assert_eq!(
            format_result(&Err(EvalError::NonFinite), Some(NumberFormat::Currency)),
            "$0.00"
        );
    }
}
