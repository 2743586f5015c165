use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::prelude::*;
use std::io;

use super::actions::{ApplyResult, apply_action, handle_command_text, handle_edit_text};
use super::app::{App, Mode};
use super::keymap::translate;
use super::ui;

fn handle_mouse_event(app: &mut App, terminal_area: Rect, mouse: MouseEvent) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    if app.help_modal || app.mode != Mode::Normal {
        return;
    }

    let [_formula_area, grid_area, _status_area] = ui::split_main_chunks(terminal_area);
    if let Some((col, row)) = ui::grid_cell_at(app, grid_area, mouse.column, mouse.row) {
        app.click_cell(col, row);
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        match event::read()? {
            Event::Key(key) => {
                // Only process key press events (Windows reports Press + Release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Help modal takes over input
                if app.help_modal {
                    if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
                        app.close_help_modal();
                    }
                    continue;
                }

                if let Some(action) = translate(app.mode, key) {
                    if apply_action(app, action) == ApplyResult::Quit {
                        return Ok(());
                    }
                    continue;
                }

                // Text entry fallbacks (not bound in the keymap).
                match app.mode {
                    Mode::Edit => handle_edit_text(app, key),
                    Mode::Command => handle_command_text(app, key),
                    Mode::Normal => {}
                }
            }
            Event::Mouse(mouse) => {
                let size = terminal.size()?;
                let terminal_area = Rect::new(0, 0, size.width, size.height);
                handle_mouse_event(app, terminal_area, mouse);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn left_click(col: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: col,
            row,
            modifiers: KeyModifiers::empty(),
        }
    }

    fn first_body_cell_point(grid_area: Rect) -> (u16, u16) {
        (
            grid_area.x + 1 + ui::ROW_HEADER_WIDTH + ui::GRID_COLUMN_SPACING,
            grid_area.y + 2,
        )
    }

    #[test]
    fn handle_mouse_event_selects_then_edits() {
        let mut app = App::new();
        app.cursor_col = 3;
        app.cursor_row = 4;

        let terminal_area = Rect::new(0, 0, 80, 24);
        let [_formula, grid_area, _status] = ui::split_main_chunks(terminal_area);
        let (x, y) = first_body_cell_point(grid_area);

        handle_mouse_event(&mut app, terminal_area, left_click(x, y));
        assert_eq!((app.cursor_col, app.cursor_row), (0, 0));
        assert_eq!(app.mode, Mode::Normal);

        handle_mouse_event(&mut app, terminal_area, left_click(x, y));
        assert_eq!(app.mode, Mode::Edit);
    }

    #[test]
    fn handle_mouse_event_ignores_clicks_outside_normal_mode() {
        let mut app = App::new();
        app.mode = Mode::Command;
        app.cursor_col = 3;
        app.cursor_row = 4;

        let terminal_area = Rect::new(0, 0, 80, 24);
        let [_formula, grid_area, _status] = ui::split_main_chunks(terminal_area);
        let (x, y) = first_body_cell_point(grid_area);

        handle_mouse_event(&mut app, terminal_area, left_click(x, y));

        assert_eq!((app.cursor_col, app.cursor_row), (3, 4));
    }

    #[test]
    fn handle_mouse_event_ignores_clicks_when_help_open() {
        let mut app = App::new();
        app.help_modal = true;
        app.cursor_col = 2;
        app.cursor_row = 2;

        let terminal_area = Rect::new(0, 0, 80, 24);
        let [_formula, grid_area, _status] = ui::split_main_chunks(terminal_area);
        let (x, y) = first_body_cell_point(grid_area);

        handle_mouse_event(&mut app, terminal_area, left_click(x, y));

        assert_eq!((app.cursor_col, app.cursor_row), (2, 2));
    }

    #[test]
    fn handle_mouse_event_ignores_other_buttons_and_row_headers() {
        let mut app = App::new();
        app.cursor_col = 1;
        app.cursor_row = 1;

        let terminal_area = Rect::new(0, 0, 80, 24);
        let [_formula, grid_area, _status] = ui::split_main_chunks(terminal_area);
        let (x, y) = first_body_cell_point(grid_area);

        let mut right_click = left_click(x, y);
        right_click.kind = MouseEventKind::Down(MouseButton::Right);
        handle_mouse_event(&mut app, terminal_area, right_click);
        handle_mouse_event(&mut app, terminal_area, left_click(grid_area.x + 2, y));

        assert_eq!((app.cursor_col, app.cursor_row), (1, 1));
    }
}
