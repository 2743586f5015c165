//! neurosheets-core - UI-agnostic document model + storage.

pub mod document;
pub mod error;
pub mod storage;

pub use document::{DEFAULT_TITLE, Document};
pub use error::{NeuroSheetsError, Result};

pub use neurosheets_engine::engine::CellRef;
