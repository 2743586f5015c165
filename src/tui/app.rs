//! Application state for the terminal grid.

use anyhow::Result;
use neurosheets_core::document::{GRID_COLS, GRID_ROWS, default_export_range};
use neurosheets_core::storage::{ExportFormat, export_file_name};
use neurosheets_core::{DEFAULT_TITLE, Document};
use neurosheets_engine::engine::{Align, CellRange, CellRef, NumberFormat};
use std::collections::HashMap;
use std::path::Path;

use super::ui::parse_hex_color;
use crate::config::Config;
use crate::session::Session;

/// Application mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Edit,
    Command,
}

pub struct App {
    pub doc: Document,
    /// Where `:w` saves to; None for a scratch sheet
    pub session: Option<Session>,
    pub mode: Mode,
    pub cursor_col: usize,
    pub cursor_row: usize,
    pub viewport_col: usize,
    pub viewport_row: usize,
    pub visible_cols: usize,
    pub visible_rows: usize,
    pub max_cols: usize,
    pub max_rows: usize,
    pub edit_buffer: String,
    /// Byte offset into `edit_buffer`
    pub edit_cursor: usize,
    pub command_buffer: String,
    pub command_cursor: usize,
    pub status_message: String,
    pub col_width: usize,
    pub column_widths: HashMap<usize, usize>,
    /// Window written by `:export`
    pub export_range: CellRange,
    pub help_modal: bool,
}

impl App {
    /// A scratch sheet with default settings and nowhere to save.
    pub fn new() -> Self {
        App {
            doc: Document::new(),
            session: None,
            mode: Mode::Normal,
            cursor_col: 0,
            cursor_row: 0,
            viewport_col: 0,
            viewport_row: 0,
            visible_cols: 8,
            visible_rows: 20,
            max_cols: GRID_COLS,
            max_rows: GRID_ROWS,
            edit_buffer: String::new(),
            edit_cursor: 0,
            command_buffer: String::new(),
            command_cursor: 0,
            status_message: String::new(),
            col_width: 12,
            column_widths: HashMap::new(),
            export_range: default_export_range(),
            help_modal: false,
        }
    }

    /// Open the sheet a session points at, sized by the config.
    pub fn with_session(session: Session, config: &Config) -> Result<Self> {
        let doc = session.load()?;
        let mut app = App::new();
        app.status_message = format!("Opened {} ({})", doc.title, session.location());
        app.doc = doc;
        app.session = Some(session);
        app.max_cols = config.max_cols;
        app.max_rows = config.max_rows;
        app.col_width = config.col_width;
        app.export_range = config.export_range();
        Ok(app)
    }

    pub fn current_cell_ref(&self) -> CellRef {
        CellRef::new(self.cursor_col, self.cursor_row)
    }

    /// Move cursor by delta, clamping to valid range
    pub fn move_cursor(&mut self, dx: i32, dy: i32) {
        self.cursor_col = (self.cursor_col as i32 + dx)
            .max(0)
            .min(self.max_cols as i32 - 1) as usize;
        self.cursor_row = (self.cursor_row as i32 + dy)
            .max(0)
            .min(self.max_rows as i32 - 1) as usize;
        self.update_viewport();
    }

    /// Update viewport to keep cursor visible
    pub fn update_viewport(&mut self) {
        if self.cursor_col < self.viewport_col {
            self.viewport_col = self.cursor_col;
        } else if self.cursor_col >= self.viewport_col + self.visible_cols {
            self.viewport_col = self.cursor_col - self.visible_cols + 1;
        }

        if self.cursor_row < self.viewport_row {
            self.viewport_row = self.cursor_row;
        } else if self.cursor_row >= self.viewport_row + self.visible_rows {
            self.viewport_row = self.cursor_row - self.visible_rows + 1;
        }
    }

    /// Enter edit mode for current cell
    pub fn enter_edit_mode(&mut self) {
        let cell_ref = self.current_cell_ref();
        self.edit_buffer = match self.doc.cells.get(&cell_ref) {
            Some(cell) => cell.to_input_string(),
            None => String::new(),
        };
        self.edit_cursor = self.edit_buffer.len();
        self.mode = Mode::Edit;
    }

    /// Start editing with a fresh formula.
    pub fn start_formula(&mut self) {
        self.edit_buffer = "=".to_string();
        self.edit_cursor = 1;
        self.mode = Mode::Edit;
    }

    pub fn cancel_edit(&mut self) {
        self.mode = Mode::Normal;
        self.edit_buffer.clear();
        self.edit_cursor = 0;
    }

    /// Commit the current edit
    pub fn commit_edit(&mut self) {
        let cell_ref = self.current_cell_ref();
        let input = std::mem::take(&mut self.edit_buffer);
        let cycle = self.doc.set_cell_from_input(&cell_ref, &input);

        self.mode = Mode::Normal;
        self.edit_cursor = 0;
        self.status_message = match cycle {
            Some(path) => format!(
                "Circular reference: {}",
                path.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" -> ")
            ),
            None => String::new(),
        };
    }

    /// Commit, then move the cursor (Enter goes down, Tab goes right).
    pub fn commit_edit_and_move(&mut self, dx: i32, dy: i32) {
        self.commit_edit();
        self.move_cursor(dx, dy);
    }

    /// Clear the current cell
    pub fn clear_current_cell(&mut self) {
        let cell_ref = self.current_cell_ref();
        self.doc.clear_cell(&cell_ref);
    }

    /// Click on a grid cell: the first click selects it, clicking the
    /// selected cell again starts editing.
    pub fn click_cell(&mut self, col: usize, row: usize) {
        if col == self.cursor_col && row == self.cursor_row {
            self.enter_edit_mode();
            return;
        }
        self.cursor_col = col;
        self.cursor_row = row;
        self.update_viewport();
    }

    pub fn toggle_bold(&mut self) {
        let cell_ref = self.current_cell_ref();
        self.doc.toggle_bold(&cell_ref);
    }

    pub fn toggle_italic(&mut self) {
        let cell_ref = self.current_cell_ref();
        self.doc.toggle_italic(&cell_ref);
    }

    pub fn set_format(&mut self, format: Option<NumberFormat>) {
        let cell_ref = self.current_cell_ref();
        self.doc.set_format(&cell_ref, format);
    }

    pub fn get_column_width(&self, col: usize) -> usize {
        *self.column_widths.get(&col).unwrap_or(&self.col_width)
    }

    /// Set width for current column
    pub fn set_column_width(&mut self, width: usize) {
        let width = width.clamp(4, 50);
        self.column_widths.insert(self.cursor_col, width);
    }

    pub fn increase_column_width(&mut self) {
        let current = self.get_column_width(self.cursor_col);
        self.set_column_width(current + 2);
    }

    pub fn decrease_column_width(&mut self) {
        let current = self.get_column_width(self.cursor_col);
        self.set_column_width(current.saturating_sub(2));
    }

    /// Jump to a specific cell reference
    pub fn goto_cell(&mut self, cell_ref_str: &str) {
        if let Some(cr) = CellRef::from_str(cell_ref_str) {
            if cr.col < self.max_cols && cr.row < self.max_rows {
                self.cursor_col = cr.col;
                self.cursor_row = cr.row;
                self.update_viewport();
                self.status_message = format!("Jumped to {}", cr);
            } else {
                self.status_message = "Error: Cell out of range".to_string();
            }
        } else {
            self.status_message = format!("Error: Invalid cell reference: {}", cell_ref_str);
        }
    }

    pub fn goto_first(&mut self) {
        self.cursor_col = 0;
        self.cursor_row = 0;
        self.update_viewport();
    }

    /// Go to the last row holding a value or formula
    pub fn goto_last(&mut self) {
        let last_row = self
            .doc
            .cells
            .iter()
            .filter(|(_, cell)| !cell.is_blank())
            .map(|(cell_ref, _)| cell_ref.row)
            .max()
            .unwrap_or(0);
        self.cursor_row = last_row.min(self.max_rows.saturating_sub(1));
        self.update_viewport();
    }

    /// Execute the command in the command buffer.
    ///
    /// Returns true if the app should quit.
    pub fn execute_command(&mut self) -> bool {
        let cmd = self.command_buffer.trim().to_string();
        self.mode = Mode::Normal;
        self.command_buffer.clear();
        self.command_cursor = 0;

        let mut parts = cmd.splitn(2, ' ');
        let command = parts.next().unwrap_or("");
        let arg = parts.next().unwrap_or("").trim();

        match command {
            "q" => {
                if self.doc.modified {
                    self.status_message =
                        "Unsaved changes! Use :q! to force quit or :wq to save and quit"
                            .to_string();
                } else {
                    return true;
                }
            }
            "q!" => return true,
            "w" => self.save_file(),
            "wq" | "x" => {
                self.save_file();
                if !self.doc.modified {
                    return true;
                }
            }
            "title" => {
                if arg.is_empty() {
                    self.status_message = format!("Title: {}", self.doc.title);
                } else {
                    self.doc.set_title(arg);
                    self.status_message = format!("Title set to {}", arg);
                }
            }
            "goto" | "g" => self.goto_cell(arg),
            "format" => self.format_command(arg),
            "align" => self.align_command(arg),
            "bg" | "fg" => self.color_command(command, arg),
            "export" => self.export_file(arg),
            "import" => {
                if arg.is_empty() {
                    self.status_message = "Error: :import requires a file path".to_string();
                } else {
                    self.import_csv(arg);
                }
            }
            "new" => self.new_sheet(arg),
            "help" | "h" => self.help_modal = true,
            _ => {
                self.status_message = format!("Unknown command: {}", command);
            }
        }
        false
    }

    fn format_command(&mut self, arg: &str) {
        let format = match arg {
            "" | "none" | "general" => None,
            name => match NumberFormat::parse(name) {
                Some(format) => Some(format),
                None => {
                    self.status_message = format!("Error: Unknown format: {}", name);
                    return;
                }
            },
        };
        self.set_format(format);
        self.status_message.clear();
    }

    fn align_command(&mut self, arg: &str) {
        let align = match arg {
            "" | "none" => None,
            name => match Align::parse(name) {
                Some(align) => Some(align),
                None => {
                    self.status_message = format!("Error: Unknown alignment: {}", name);
                    return;
                }
            },
        };
        let cell_ref = self.current_cell_ref();
        self.doc.set_align(&cell_ref, align);
        self.status_message.clear();
    }

    /// `:bg #rrggbb` / `:fg #rrggbb`; `none` or no argument removes the color.
    fn color_command(&mut self, which: &str, arg: &str) {
        let color = match arg {
            "" | "none" => None,
            hex if parse_hex_color(hex).is_some() => Some(hex.to_ascii_lowercase()),
            other => {
                self.status_message = format!("Error: Invalid color: {} (expected #rrggbb)", other);
                return;
            }
        };
        let cell_ref = self.current_cell_ref();
        if which == "bg" {
            self.doc.set_background_color(&cell_ref, color);
        } else {
            self.doc.set_text_color(&cell_ref, color);
        }
        self.status_message.clear();
    }

    /// Save to the session's location
    pub fn save_file(&mut self) {
        let Some(session) = self.session.as_mut() else {
            self.status_message = "Error: No store to save to".to_string();
            return;
        };

        match session.save(&mut self.doc) {
            Ok(()) => {
                self.status_message =
                    format!("Saved {} to {}", self.doc.title, session.location());
            }
            Err(e) => {
                self.status_message = format!("Error saving: {:#}", e);
            }
        }
    }

    /// Export the export window; the format follows the extension. Without a
    /// path the file is named after the title.
    fn export_file(&mut self, path: &str) {
        let path = if path.is_empty() {
            export_file_name(&self.doc.title, ExportFormat::Csv)
        } else {
            path.to_string()
        };
        match self.doc.export(Path::new(&path), &self.export_range) {
            Ok(_) => {
                self.status_message = format!("Exported to {}", path);
            }
            Err(e) => {
                self.status_message = format!("Error: Export failed: {}", e);
            }
        }
    }

    /// Replace the sheet's cells with a CSV file
    fn import_csv(&mut self, path: &str) {
        match self.doc.import_csv(Path::new(path)) {
            Ok(count) => {
                self.status_message = format!("Imported {} cells from {}", count, path);
            }
            Err(e) => {
                self.status_message = format!("Error: Import failed: {}", e);
            }
        }
    }

    /// Create a repository sheet and switch to it.
    fn new_sheet(&mut self, title: &str) {
        if self.doc.modified {
            self.status_message = "Unsaved changes! Use :w before :new".to_string();
            return;
        }
        let Some(session) = self.session.as_mut() else {
            self.status_message = "Error: No store to create sheets in".to_string();
            return;
        };

        let title = if title.is_empty() { DEFAULT_TITLE } else { title };
        let loaded = session.create(title).and_then(|summary| {
            let doc = session.load()?;
            Ok((summary, doc))
        });
        match loaded {
            Ok((summary, doc)) => {
                self.doc = doc;
                self.goto_first();
                self.status_message = format!("Created {} ({})", summary.title, summary.id);
            }
            Err(e) => {
                self.status_message = format!("Error: {:#}", e);
            }
        }
    }

    pub fn close_help_modal(&mut self) {
        self.help_modal = false;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
