//! Id-keyed sheet repository.
//!
//! Each sheet lives under `sheet-<uuid>`; an index under
//! [`INDEX_KEY`] lists summaries, newest first, so listing never has to
//! open every sheet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::json::{SheetFile, parse_sheet, write_sheet};
use super::kv::KeyValueStore;
use crate::error::{NeuroSheetsError, Result};
use neurosheets_engine::engine::CellStore;

pub const INDEX_KEY: &str = "neurosheets-index";

const SHEET_KEY_PREFIX: &str = "sheet-";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn sheet_key(id: &str) -> String {
    format!("{}{}", SHEET_KEY_PREFIX, id)
}

pub struct SheetRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SheetRepository<S> {
    pub fn new(store: S) -> Self {
        SheetRepository { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Summaries of every sheet, newest first.
    pub fn list(&self) -> Result<Vec<SheetSummary>> {
        match self.store.get(INDEX_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_index(&mut self, index: &[SheetSummary]) -> Result<()> {
        let json = serde_json::to_string(index)?;
        self.store.set(INDEX_KEY, &json)
    }

    /// Create an empty sheet and return its summary.
    pub fn create(&mut self, title: &str) -> Result<SheetSummary> {
        let now = Utc::now();
        let summary = SheetSummary {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        let sheet = SheetFile {
            title: title.to_string(),
            data: CellStore::new(),
            updated_at: now,
        };
        self.store.set(&sheet_key(&summary.id), &write_sheet(&sheet)?)?;

        let mut index = self.list()?;
        index.insert(0, summary.clone());
        self.write_index(&index)?;

        info!(id = %summary.id, title, "created sheet");
        Ok(summary)
    }

    pub fn get(&self, id: &str) -> Result<SheetFile> {
        let json = self
            .store
            .get(&sheet_key(id))?
            .ok_or_else(|| NeuroSheetsError::NotFound(id.to_string()))?;
        parse_sheet(&json)
    }

    /// Replace a stored sheet. The index entry keeps its position and picks
    /// up the new title and timestamp.
    pub fn update(&mut self, id: &str, sheet: &SheetFile) -> Result<()> {
        let mut index = self.list()?;
        let Some(entry) = index.iter_mut().find(|s| s.id == id) else {
            return Err(NeuroSheetsError::NotFound(id.to_string()));
        };
        entry.title = sheet.title.clone();
        entry.updated_at = sheet.updated_at;

        self.store.set(&sheet_key(id), &write_sheet(sheet)?)?;
        self.write_index(&index)?;
        info!(id, "updated sheet");
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        let mut index = self.list()?;
        let before = index.len();
        index.retain(|s| s.id != id);
        if index.len() == before {
            return Err(NeuroSheetsError::NotFound(id.to_string()));
        }
        self.store.remove(&sheet_key(id))?;
        self.write_index(&index)?;
        info!(id, "deleted sheet");
        Ok(())
    }
}
