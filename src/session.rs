//! Where the open sheet is loaded from and saved to.

use anyhow::{Context, Result};
use neurosheets_core::Document;
use neurosheets_core::storage::{
    CURRENT_SHEET_KEY, FileStore, KeyValueStore, SheetRepository, SheetSummary,
};
use std::fmt;
use std::path::Path;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetLocation {
    /// The single current-sheet slot.
    Slot,
    /// A repository sheet, by id.
    Sheet(String),
}

impl fmt::Display for SheetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetLocation::Slot => write!(f, "current sheet"),
            SheetLocation::Sheet(id) => write!(f, "sheet {}", id),
        }
    }
}

pub struct Session<S: KeyValueStore = FileStore> {
    repo: SheetRepository<S>,
    location: SheetLocation,
}

impl Session<FileStore> {
    pub fn open(dir: &Path, location: SheetLocation) -> Result<Self> {
        let store = FileStore::open(dir)
            .with_context(|| format!("Failed to open store {}", dir.display()))?;
        Ok(Session::new(store, location))
    }

    pub fn store_dir(&self) -> &Path {
        self.repo.store().dir()
    }
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(store: S, location: SheetLocation) -> Self {
        Session {
            repo: SheetRepository::new(store),
            location,
        }
    }

    pub fn location(&self) -> &SheetLocation {
        &self.location
    }

    /// Load the sheet at the current location. An empty slot gives a new
    /// document; a missing repository sheet is an error.
    pub fn load(&self) -> Result<Document> {
        match &self.location {
            SheetLocation::Slot => Ok(Document::load_from(self.repo.store(), CURRENT_SHEET_KEY)
                .context("Failed to load the current sheet")?
                .unwrap_or_default()),
            SheetLocation::Sheet(id) => {
                let sheet = self
                    .repo
                    .get(id)
                    .with_context(|| format!("Failed to load sheet {}", id))?;
                Ok(Document::from_sheet(sheet))
            }
        }
    }

    /// Save the document to the current location and clear its modified flag.
    pub fn save(&mut self, doc: &mut Document) -> Result<()> {
        match &self.location {
            SheetLocation::Slot => doc.save_to(self.repo.store_mut(), CURRENT_SHEET_KEY)?,
            SheetLocation::Sheet(id) => {
                let sheet = doc.to_sheet_file();
                self.repo.update(id, &sheet)?;
                doc.modified = false;
            }
        }
        Ok(())
    }

    /// Create a repository sheet and make it the current location.
    pub fn create(&mut self, title: &str) -> Result<SheetSummary> {
        let summary = self.repo.create(title)?;
        info!(id = %summary.id, "switched to new sheet");
        self.location = SheetLocation::Sheet(summary.id.clone());
        Ok(summary)
    }

    pub fn list(&self) -> Result<Vec<SheetSummary>> {
        Ok(self.repo.list()?)
    }
}
