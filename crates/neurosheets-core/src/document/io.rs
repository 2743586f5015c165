use super::Document;
use super::state::{EXPORT_COLS, EXPORT_ROWS, GRID_COLS, GRID_ROWS};
use crate::error::{NeuroSheetsError, Result};
use crate::storage::{
    ExportFormat, KeyValueStore, SheetFile, parse_csv, parse_sheet, records_to_cells, write_csv,
    write_excel_html, write_sheet,
};
use chrono::Utc;
use neurosheets_engine::engine::{CellRange, CellRef, CellStore};
use std::path::Path;
use tracing::info;

const MAX_CSV_BYTES: u64 = 16 * 1_048_576; // 16 MiB

/// Default export window, A1:T50.
pub fn default_export_range() -> CellRange {
    CellRange::new(
        CellRef::new(0, 0),
        CellRef::new(EXPORT_COLS - 1, EXPORT_ROWS - 1),
    )
}

fn read_csv_file(path: &Path) -> Result<String> {
    let meta = std::fs::metadata(path)?;
    if meta.len() > MAX_CSV_BYTES {
        return Err(NeuroSheetsError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Refusing to read {}: CSV file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CSV_BYTES
            ),
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}

impl Document {
    /// Snapshot the document for persistence. Formula values are refreshed
    /// first and the save time is stamped.
    pub fn to_sheet_file(&mut self) -> SheetFile {
        self.evaluate_all_cells();
        let now = Utc::now();
        self.updated_at = Some(now);
        SheetFile {
            title: self.title.clone(),
            data: self.cells.clone(),
            updated_at: now,
        }
    }

    /// Serialize to the persisted JSON form.
    pub fn serialize(&mut self) -> Result<String> {
        write_sheet(&self.to_sheet_file())
    }

    /// Restore from the persisted JSON form.
    pub fn deserialize(json: &str) -> Result<Self> {
        Ok(Self::from_sheet(parse_sheet(json)?))
    }

    /// Save under `key` and clear the modified flag.
    pub fn save_to<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, key: &str) -> Result<()> {
        let json = self.serialize()?;
        store.set(key, &json)?;
        self.modified = false;
        info!(key, title = %self.title, cells = self.cells.len(), "saved sheet");
        Ok(())
    }

    /// Load the sheet stored under `key`, if there is one.
    pub fn load_from<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<Option<Self>> {
        let Some(json) = store.get(key)? else {
            return Ok(None);
        };
        let doc = Self::deserialize(&json)?;
        info!(key, title = %doc.title, cells = doc.cells.len(), "loaded sheet");
        Ok(Some(doc))
    }

    /// Replace the sheet's cells with the contents of a CSV file.
    /// Returns the number of cells imported.
    pub fn import_csv(&mut self, path: &Path) -> Result<usize> {
        let content = read_csv_file(path)?;
        let count = self.import_csv_str(&content)?;
        info!(path = %path.display(), count, "imported CSV");
        Ok(count)
    }

    /// Replace the sheet's cells with CSV text, clipped to the grid
    /// (26 columns x 100 rows). Empty fields are skipped.
    pub fn import_csv_str(&mut self, content: &str) -> Result<usize> {
        let records = parse_csv(content)?;
        let cells = records_to_cells(&records, GRID_COLS, GRID_ROWS);
        if cells.is_empty() {
            return Err(NeuroSheetsError::EmptyCsv);
        }

        let count = cells.len();
        self.cells = cells.into_iter().collect::<CellStore>();
        self.rebuild_graph();
        self.modified = true;
        Ok(count)
    }

    pub fn export_csv_string(&mut self, range: &CellRange) -> String {
        write_csv(&self.display_rows(range))
    }

    pub fn export_html_string(&mut self, range: &CellRange) -> String {
        write_excel_html(&self.display_rows(range))
    }

    /// Export display values of `range` to `path`; the format follows the
    /// extension (`.csv` or `.xls`).
    pub fn export(&mut self, path: &Path, range: &CellRange) -> Result<ExportFormat> {
        let format = ExportFormat::from_path(path)
            .ok_or_else(|| NeuroSheetsError::UnsupportedExport(path.display().to_string()))?;
        let content = match format {
            ExportFormat::Csv => self.export_csv_string(range),
            ExportFormat::ExcelHtml => self.export_html_string(range),
        };
        std::fs::write(path, content)?;
        info!(path = %path.display(), range = %range, "exported sheet");
        Ok(format)
    }
}
