//! Document state and logic (UI-agnostic).

mod eval;
mod io;
mod ops;
mod state;

pub use io::default_export_range;
pub use state::{DEFAULT_TITLE, Document, EXPORT_COLS, EXPORT_ROWS, GRID_COLS, GRID_ROWS};
