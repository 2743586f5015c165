//! Persistence and file formats.
//!
//! - [`kv`] - key/value backends ([`FileStore`], [`MemoryStore`])
//! - [`json`] - the persisted sheet document
//! - [`repository`] - id-keyed sheet CRUD over a key/value store
//! - [`csv`], [`html`] - import/export of display values

pub mod csv;
pub mod html;
pub mod json;
pub mod kv;
pub mod repository;

pub use csv::{parse_csv, records_to_cells, write_csv};
pub use html::write_excel_html;
pub use json::{SheetFile, parse_sheet, write_sheet};
pub use kv::{FileStore, KeyValueStore, MemoryStore, validate_key};
pub use repository::{INDEX_KEY, SheetRepository, SheetSummary, sheet_key};

/// Key of the single current-sheet slot.
pub const CURRENT_SHEET_KEY: &str = "neuroadapt-sheets-current";

/// Export formats, picked by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    ExcelHtml,
}

impl ExportFormat {
    pub fn from_path(path: &std::path::Path) -> Option<ExportFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(ExportFormat::Csv),
            "xls" => Some(ExportFormat::ExcelHtml),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::ExcelHtml => "xls",
        }
    }
}

/// Default file name for an export: the title with whitespace runs turned
/// into underscores.
pub fn export_file_name(title: &str, format: ExportFormat) -> String {
    let stem = title.split_whitespace().collect::<Vec<_>>().join("_");
    let stem = if stem.is_empty() { "sheet".to_string() } else { stem };
    format!("{}.{}", stem, format.extension())
}
