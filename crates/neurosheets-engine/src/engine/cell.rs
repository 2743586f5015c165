//! Cell data structures for the spreadsheet grid.
//!
//! - [`CellValue`] - explicit empty / number / text state of a cell
//! - [`Cell`] - a cell record: value, optional formula, optional style
//! - [`CellStyle`], [`Align`], [`NumberFormat`] - display metadata
//!
//! The serde shape matches the persisted sheet format: a value is a JSON
//! number or string (`""` for empty) and style keys are camelCase.

use serde::{Deserialize, Serialize};

/// The value held by a cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawValue", into = "RawValue")]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

/// Wire form of [`CellValue`]: `string | number`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
}

impl From<RawValue> for CellValue {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Number(n) => CellValue::Number(n),
            RawValue::Text(s) if s.is_empty() => CellValue::Empty,
            RawValue::Text(s) => CellValue::Text(s),
        }
    }
}

impl From<CellValue> for RawValue {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Empty => RawValue::Text(String::new()),
            CellValue::Number(n) => RawValue::Number(n),
            CellValue::Text(s) => RawValue::Text(s),
        }
    }
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Numeric view of the value: numbers as-is, text when it parses as a
    /// finite float, otherwise None.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Empty => None,
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_number(s),
        }
    }

    /// Raw text form used for editing and plain display.
    pub fn to_input_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => super::format::format_number(*n),
            CellValue::Text(s) => s.clone(),
        }
    }
}

/// Parse user text as a finite number.
///
/// Surrounding whitespace is ignored. Spellings Rust accepts but a
/// spreadsheet user would not mean as numbers (`inf`, `NaN`, overflow to
/// infinity) are rejected.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'+' | b'-' | b'e' | b'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Horizontal alignment of a cell's display text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    pub fn parse(name: &str) -> Option<Align> {
        match name.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Some(Align::Left),
            "center" | "centre" | "c" => Some(Align::Center),
            "right" | "r" => Some(Align::Right),
            _ => None,
        }
    }
}

/// Display format tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    Number,
    Currency,
    Percent,
    Date,
    Text,
}

impl NumberFormat {
    pub fn parse(name: &str) -> Option<NumberFormat> {
        match name.trim().to_ascii_lowercase().as_str() {
            "number" | "plain" => Some(NumberFormat::Number),
            "currency" | "$" => Some(NumberFormat::Currency),
            "percent" | "%" => Some(NumberFormat::Percent),
            "date" => Some(NumberFormat::Date),
            "text" => Some(NumberFormat::Text),
            _ => None,
        }
    }
}

/// Optional formatting metadata attached to a cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<NumberFormat>,
}

impl CellStyle {
    pub fn is_bold(&self) -> bool {
        self.bold.unwrap_or(false)
    }

    pub fn is_italic(&self) -> bool {
        self.italic.unwrap_or(false)
    }
}

/// A cell in the spreadsheet grid.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Literal value, or the last evaluated result for formula cells.
    pub value: CellValue,
    /// Original input (starting with '=') when the cell holds a formula.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
}

impl Cell {
    pub fn new_empty() -> Cell {
        Cell::default()
    }

    pub fn new_text(text: &str) -> Cell {
        Cell {
            value: CellValue::Text(text.to_string()),
            ..Cell::default()
        }
    }

    pub fn new_number(n: f64) -> Cell {
        Cell {
            value: CellValue::Number(n),
            ..Cell::default()
        }
    }

    /// Create a formula cell. The formula is stored verbatim (including '=');
    /// `value` starts at zero until the store evaluates it.
    pub fn new_formula(formula: &str) -> Cell {
        Cell {
            value: CellValue::Number(0.0),
            formula: Some(formula.to_string()),
            style: None,
        }
    }

    /// Classify literal (non-formula) input.
    /// - Empty string -> Empty
    /// - Finite number -> Number
    /// - Anything else -> Text, kept exactly as typed
    pub fn literal_value(input: &str) -> CellValue {
        if input.is_empty() {
            CellValue::Empty
        } else if let Some(n) = parse_number(input) {
            CellValue::Number(n)
        } else {
            CellValue::Text(input.to_string())
        }
    }

    pub fn is_formula(&self) -> bool {
        self.formula.is_some()
    }

    /// A cell with no value, no formula and no style carries no information.
    pub fn is_blank(&self) -> bool {
        self.formula.is_none() && self.value.is_empty()
    }

    /// Get the string a user would edit: the formula, or the literal value.
    pub fn to_input_string(&self) -> String {
        match &self.formula {
            Some(formula) => formula.clone(),
            None => self.value.to_input_string(),
        }
    }

    pub fn format(&self) -> Option<NumberFormat> {
        self.style.as_ref().and_then(|s| s.format)
    }
}
