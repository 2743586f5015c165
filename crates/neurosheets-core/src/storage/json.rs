//! The persisted sheet format.
//!
//! ```json
//! { "title": "Book1",
//!   "data": { "A1": { "value": 10 }, "A2": { "value": 0, "formula": "=A1*2" } },
//!   "updatedAt": "2024-05-01T10:00:00Z" }
//! ```

use chrono::{DateTime, Utc};
use neurosheets_engine::engine::CellStore;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetFile {
    pub title: String,
    pub data: CellStore,
    pub updated_at: DateTime<Utc>,
}

pub fn write_sheet(sheet: &SheetFile) -> Result<String> {
    Ok(serde_json::to_string(sheet)?)
}

pub fn parse_sheet(json: &str) -> Result<SheetFile> {
    Ok(serde_json::from_str(json)?)
}
