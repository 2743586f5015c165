//! UI rendering

use super::app::{App, Mode};
use super::help::{get_commands_help, get_help_text};
use neurosheets_engine::engine::{Align, CIRCULAR_DISPLAY, CellRef, CellStyle};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

pub(crate) const FORMULA_BAR_HEIGHT: u16 = 3;
pub(crate) const GRID_MIN_HEIGHT: u16 = 10;
pub(crate) const STATUS_BAR_HEIGHT: u16 = 1;
pub(crate) const ROW_HEADER_WIDTH: u16 = 4;
pub(crate) const GRID_COLUMN_SPACING: u16 = 1;

pub(crate) fn split_main_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FORMULA_BAR_HEIGHT),
            Constraint::Min(GRID_MIN_HEIGHT),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Parse a `#rrggbb` color.
pub(crate) fn parse_hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

pub(crate) fn grid_cell_at(
    app: &App,
    grid_area: Rect,
    mouse_col: u16,
    mouse_row: u16,
) -> Option<(usize, usize)> {
    if grid_area.width < 3 || grid_area.height < 4 {
        return None;
    }

    let inner_x = grid_area.x.saturating_add(1);
    let inner_y = grid_area.y.saturating_add(1);
    let inner_right = inner_x.saturating_add(grid_area.width.saturating_sub(2));
    let inner_bottom = inner_y.saturating_add(grid_area.height.saturating_sub(2));

    if mouse_col < inner_x
        || mouse_col >= inner_right
        || mouse_row < inner_y
        || mouse_row >= inner_bottom
    {
        return None;
    }

    // Header row contains column letters, not data cells.
    if mouse_row == inner_y {
        return None;
    }

    let rel_row = (mouse_row - inner_y - 1) as usize;
    if rel_row >= app.visible_rows {
        return None;
    }
    let row = app.viewport_row.saturating_add(rel_row);
    if row >= app.max_rows {
        return None;
    }

    // Skip the row header and the spacing after it.
    let mut x = inner_x.saturating_add(ROW_HEADER_WIDTH + GRID_COLUMN_SPACING);
    if mouse_col < x {
        return None;
    }

    for offset in 0..app.visible_cols {
        let col = app.viewport_col + offset;
        if col >= app.max_cols || x >= inner_right {
            break;
        }

        let cell_end = x.saturating_add(app.get_column_width(col) as u16);
        if mouse_col < cell_end {
            return (mouse_col >= x).then_some((col, row));
        }
        x = cell_end.saturating_add(GRID_COLUMN_SPACING);
    }

    None
}

/// Draw the application UI
pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = split_main_chunks(f.area());

    // Update visible dimensions based on actual size
    let grid_area = chunks[1];
    let available_width = grid_area.width.saturating_sub(ROW_HEADER_WIDTH + 2) as usize;
    let available_height = grid_area.height.saturating_sub(3) as usize; // header + borders

    app.visible_cols = (available_width / (app.col_width + 1)).max(1);
    app.visible_rows = available_height.max(1);
    app.update_viewport();

    draw_formula_bar(f, app, chunks[0]);
    draw_grid(f, app, chunks[1]);
    draw_status_bar(f, app, chunks[2]);

    if app.help_modal {
        draw_help_modal(f);
    }
}

fn draw_formula_bar(f: &mut Frame, app: &App, area: Rect) {
    let cell_ref = app.current_cell_ref();

    let content = match app.mode {
        Mode::Edit => {
            let (before, after) = app.edit_buffer.split_at(app.edit_cursor);
            format!("{}: {}│{}", cell_ref, before, after)
        }
        Mode::Command => {
            let (before, after) = app.command_buffer.split_at(app.command_cursor);
            format!(":{}│{}", before, after)
        }
        Mode::Normal => match app.doc.cells.get(&cell_ref) {
            Some(cell) if !cell.is_blank() => format!("{}: {}", cell_ref, cell.to_input_string()),
            _ => format!("{}: (empty)", cell_ref),
        },
    };

    let (title, color) = match app.mode {
        Mode::Edit => (" Edit ", Color::Yellow),
        Mode::Command => (" Command ", Color::Cyan),
        Mode::Normal => (" Cell ", Color::White),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(color));

    f.render_widget(Paragraph::new(content).block(block), area);
}

/// Style for a cell that is not under the cursor.
fn cell_style(style: Option<&CellStyle>, display: &str) -> Style {
    let mut out = Style::default();
    if display == CIRCULAR_DISPLAY {
        out = out.fg(Color::Red);
    }
    let Some(style) = style else {
        return out;
    };

    if style.is_bold() {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.is_italic() {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if let Some(color) = style.text_color.as_deref().and_then(parse_hex_color) {
        out = out.fg(color);
    }
    if let Some(color) = style.background_color.as_deref().and_then(parse_hex_color) {
        out = out.bg(color);
    }
    out
}

fn alignment(style: Option<&CellStyle>) -> Alignment {
    match style.and_then(|s| s.align) {
        Some(Align::Center) => Alignment::Center,
        Some(Align::Right) => Alignment::Right,
        Some(Align::Left) | None => Alignment::Left,
    }
}

fn draw_grid(f: &mut Frame, app: &mut App, area: Rect) {
    let last_col = (app.viewport_col + app.visible_cols).min(app.max_cols);
    let last_row = (app.viewport_row + app.visible_rows).min(app.max_rows);

    let header_style = |active: bool| {
        if active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    // Build header row
    let mut header_cells = vec![Cell::from(" ")]; // Corner
    for col in app.viewport_col..last_col {
        header_cells.push(
            Cell::from(CellRef::col_to_letters(col)).style(header_style(col == app.cursor_col)),
        );
    }
    let header = Row::new(header_cells).height(1);

    // Build data rows
    let mut rows = Vec::new();
    for row in app.viewport_row..last_row {
        let mut cells =
            vec![Cell::from(format!("{}", row + 1)).style(header_style(row == app.cursor_row))];

        for col in app.viewport_col..last_col {
            let cell_ref = CellRef::new(col, row);
            let display = app.doc.get_cell_display(&cell_ref);
            let style = app.doc.cells.get(&cell_ref).and_then(|c| c.style.as_ref());

            let is_cursor = row == app.cursor_row && col == app.cursor_col;
            let look = if is_cursor {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                cell_style(style, &display)
            };
            let line = Line::from(display).alignment(alignment(style));
            cells.push(Cell::from(line).style(look));
        }

        rows.push(Row::new(cells));
    }

    let mut widths = vec![Constraint::Length(ROW_HEADER_WIDTH)]; // Row header
    for col in app.viewport_col..last_col {
        widths.push(Constraint::Length(app.get_column_width(col) as u16));
    }

    let title = format!(" {} ", app.doc.title);
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(GRID_COLUMN_SPACING);

    f.render_widget(table, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let location = match &app.session {
        Some(session) => session.location().to_string(),
        None => "[Scratch]".to_string(),
    };
    let modified_indicator = if app.doc.modified { " [+]" } else { "" };

    let status = if !app.status_message.is_empty() {
        app.status_message.clone()
    } else {
        format!(
            "{}{}  |  hjkl:move  i:edit  =:formula  x:clear  b/I:style  :w save  :q quit  ?:help",
            location, modified_indicator
        )
    };

    let style = if app.status_message.starts_with("Error") {
        Style::default().fg(Color::Red)
    } else if !app.status_message.is_empty() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    f.render_widget(Paragraph::new(Line::from(Span::styled(status, style))), area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn draw_help_modal(f: &mut Frame) {
    let area = centered_rect(80, 85, f.area());

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help (Esc to close) ")
        .border_style(Style::default().fg(Color::Green))
        .style(Style::default().fg(Color::White).bg(Color::Black));

    let mut lines: Vec<Line> = Vec::new();
    let mut sections = get_help_text();
    sections.push(String::new());
    sections.extend(get_commands_help());
    for text in sections {
        let style = if text.starts_with("  ") {
            Style::default().fg(Color::White)
        } else {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    fn first_body_cell_point(grid_area: Rect) -> (u16, u16) {
        (
            grid_area.x + 1 + ROW_HEADER_WIDTH + GRID_COLUMN_SPACING,
            grid_area.y + 2,
        )
    }

    fn render(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn parse_hex_color_accepts_rrggbb_only() {
        assert_eq!(parse_hex_color("#ff8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(parse_hex_color("#FF8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(parse_hex_color("ff8000"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }

    #[test]
    fn cell_style_applies_formatting() {
        let style = CellStyle {
            bold: Some(true),
            italic: Some(true),
            text_color: Some("#000000".to_string()),
            background_color: Some("#ffffff".to_string()),
            ..CellStyle::default()
        };
        let out = cell_style(Some(&style), "x");
        assert!(out.add_modifier.contains(Modifier::BOLD | Modifier::ITALIC));
        assert_eq!(out.fg, Some(Color::Rgb(0, 0, 0)));
        assert_eq!(out.bg, Some(Color::Rgb(255, 255, 255)));

        assert_eq!(cell_style(None, CIRCULAR_DISPLAY).fg, Some(Color::Red));
        assert_eq!(alignment(Some(&style)), Alignment::Left);
    }

    #[test]
    fn draw_renders_values_and_circular_marker() {
        let mut app = App::new();
        app.doc.set_cell_from_input(&CellRef::new(0, 0), "=SUM(B1:B2)");
        app.doc.set_cell_from_input(&CellRef::new(1, 0), "70");
        app.doc.set_cell_from_input(&CellRef::new(1, 1), "8");
        app.doc.set_cell_from_input(&CellRef::new(0, 2), "=A3");

        let screen = render(&mut app, 80, 24);
        assert!(screen.contains("A1: =SUM(B1:B2)"));
        assert!(screen.contains("78"));
        assert!(screen.contains(CIRCULAR_DISPLAY));
        assert!(screen.contains(" Book1 "));
        assert!(app.visible_rows > 0);
    }

    #[test]
    fn grid_cell_at_maps_first_visible_cell_to_viewport_origin() {
        let mut app = App::new();
        app.viewport_col = 5;
        app.viewport_row = 7;
        app.visible_cols = 4;
        app.visible_rows = 4;

        let grid_area = Rect::new(0, 0, 80, 20);
        let (x, y) = first_body_cell_point(grid_area);

        assert_eq!(grid_cell_at(&app, grid_area, x, y), Some((5, 7)));
    }

    #[test]
    fn grid_cell_at_maps_second_column_with_custom_width_and_spacing() {
        let mut app = App::new();
        app.viewport_col = 3;
        app.viewport_row = 2;
        app.visible_cols = 3;
        app.visible_rows = 3;
        app.column_widths.insert(3, 10);
        app.column_widths.insert(4, 8);

        let grid_area = Rect::new(0, 0, 80, 20);
        let (first_x, y) = first_body_cell_point(grid_area);
        let second_col_start = first_x + app.get_column_width(3) as u16 + GRID_COLUMN_SPACING;

        assert_eq!(
            grid_cell_at(&app, grid_area, second_col_start + 1, y),
            Some((4, 2))
        );
    }

    #[test]
    fn grid_cell_at_ignores_headers_and_spacing() {
        let mut app = App::new();
        app.visible_cols = 4;
        app.visible_rows = 4;

        let grid_area = Rect::new(0, 0, 80, 20);
        let (first_x, y) = first_body_cell_point(grid_area);
        let spacing_x = first_x + app.get_column_width(0) as u16;

        assert_eq!(grid_cell_at(&app, grid_area, grid_area.x + 2, y), None);
        assert_eq!(grid_cell_at(&app, grid_area, first_x, grid_area.y + 1), None);
        assert_eq!(grid_cell_at(&app, grid_area, spacing_x, y), None);
        assert_eq!(grid_cell_at(&app, grid_area, 200, y), None);
    }
}
