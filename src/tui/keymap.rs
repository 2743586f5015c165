//! Key translation layer.
//!
//! Keeps key handling separate from app behavior: keys become [`Action`]s,
//! and [`super::actions::apply_action`] applies them.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use neurosheets_engine::engine::NumberFormat;

use super::app::Mode;

/// Actions that can be triggered by key presses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Cancel the current edit or command and return to Normal mode.
    Cancel,
    /// Edit the current cell, starting from its input text.
    EnterEdit,
    /// Start a new formula in the current cell.
    StartFormula,
    /// Commit the edit and move down a row.
    CommitEdit,
    /// Commit the edit and move right a column.
    CommitEditRight,
    /// Enter Command mode (`:` prompt).
    EnterCommand,
    /// Execute the command in the command buffer.
    ExecuteCommand,
    ClearCell,

    /// Move cursor by (dx, dy).
    Move(i32, i32),
    /// Page up (-1) or down (+1).
    Page(i32),
    HomeCol,
    EndCol,
    GotoFirst,
    /// Jump to the last row with data.
    GotoLast,
    /// Open the goto cell prompt.
    OpenGotoPrompt,

    ToggleBold,
    ToggleItalic,
    SetFormat(NumberFormat),

    IncColWidth,
    DecColWidth,
    Save,
    OpenHelp,
}

/// Translate a key event to an action for the current mode.
///
/// Returns `None` if the key has no binding; in Edit and Command mode such
/// keys go to the text buffer.
pub fn translate(mode: Mode, key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match mode {
        Mode::Normal => match key.code {
            KeyCode::Char('s') if ctrl => Some(Action::Save),

            KeyCode::Up | KeyCode::Char('k') => Some(Action::Move(0, -1)),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::Move(0, 1)),
            KeyCode::Left | KeyCode::Char('h') => Some(Action::Move(-1, 0)),
            KeyCode::Right | KeyCode::Char('l') => Some(Action::Move(1, 0)),
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                Some(Action::Move(-1, 0))
            }
            KeyCode::Tab => Some(Action::Move(1, 0)),
            KeyCode::BackTab => Some(Action::Move(-1, 0)),

            KeyCode::PageUp => Some(Action::Page(-1)),
            KeyCode::PageDown => Some(Action::Page(1)),
            KeyCode::Home if ctrl => Some(Action::GotoFirst),
            KeyCode::End if ctrl => Some(Action::GotoLast),
            KeyCode::Home => Some(Action::HomeCol),
            KeyCode::End => Some(Action::EndCol),
            KeyCode::Char('G') => Some(Action::GotoLast),
            KeyCode::Char('g') => Some(Action::OpenGotoPrompt),

            KeyCode::Enter | KeyCode::F(2) | KeyCode::Char('i') => Some(Action::EnterEdit),
            KeyCode::Char('=') => Some(Action::StartFormula),
            KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace => Some(Action::ClearCell),
            KeyCode::Char(':') => Some(Action::EnterCommand),

            KeyCode::Char('b') => Some(Action::ToggleBold),
            KeyCode::Char('I') => Some(Action::ToggleItalic),
            KeyCode::Char('$') => Some(Action::SetFormat(NumberFormat::Currency)),
            KeyCode::Char('%') => Some(Action::SetFormat(NumberFormat::Percent)),
            KeyCode::Char('#') => Some(Action::SetFormat(NumberFormat::Number)),

            KeyCode::Char('+') | KeyCode::Char('>') => Some(Action::IncColWidth),
            KeyCode::Char('-') | KeyCode::Char('<') => Some(Action::DecColWidth),
            KeyCode::Char('?') => Some(Action::OpenHelp),
            _ => None,
        },

        Mode::Edit => match key.code {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::CommitEdit),
            KeyCode::Tab => Some(Action::CommitEditRight),
            _ => None,
        },

        Mode::Command => match key.code {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::ExecuteCommand),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    #[test]
    fn test_normal_mode_bindings() {
        assert_eq!(translate(Mode::Normal, key(KeyCode::Char('j'))), Some(Action::Move(0, 1)));
        assert_eq!(translate(Mode::Normal, key(KeyCode::F(2))), Some(Action::EnterEdit));
        assert_eq!(translate(Mode::Normal, key(KeyCode::Char('='))), Some(Action::StartFormula));
        assert_eq!(translate(Mode::Normal, key(KeyCode::Delete)), Some(Action::ClearCell));
        assert_eq!(
            translate(Mode::Normal, key(KeyCode::Char('%'))),
            Some(Action::SetFormat(NumberFormat::Percent))
        );
        assert_eq!(
            translate(
                Mode::Normal,
                KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)
            ),
            Some(Action::Save)
        );
    }

    #[test]
    fn test_edit_mode_leaves_text_keys_unbound() {
        assert_eq!(translate(Mode::Edit, key(KeyCode::Char('j'))), None);
        assert_eq!(translate(Mode::Edit, key(KeyCode::Tab)), Some(Action::CommitEditRight));
        assert_eq!(translate(Mode::Edit, key(KeyCode::Esc)), Some(Action::Cancel));
        assert_eq!(translate(Mode::Command, key(KeyCode::Char('q'))), None);
        assert_eq!(
            translate(Mode::Command, key(KeyCode::Enter)),
            Some(Action::ExecuteCommand)
        );
    }
}
