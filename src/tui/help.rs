//! Help text content for the help modal

use neurosheets_engine::engine::FUNCTIONS;

/// Get keybinding help text
pub fn get_help_text() -> Vec<String> {
    [
        "Navigation:",
        "  h/j/k/l      Move left/down/up/right",
        "  Arrow keys   Move cursor",
        "  Tab          Move right",
        "  PageUp/Down  Scroll by page",
        "  Home/End     First/last column",
        "  G            Go to last row with data",
        "  g            Open goto prompt",
        "  Click        Select cell (click again to edit)",
        "",
        "Editing:",
        "  i/Enter/F2   Edit cell",
        "  =            Start a formula",
        "  Enter        Commit and move down",
        "  Tab          Commit and move right",
        "  Esc          Cancel edit",
        "  x/Delete     Clear cell",
        "",
        "Style:",
        "  b / I        Toggle bold / italic",
        "  $ / % / #    Currency / percent / plain number",
        "  +/-          Adjust column width",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Get command help text
pub fn get_commands_help() -> Vec<String> {
    let mut lines: Vec<String> = [
        "Commands:",
        "  :w              Save",
        "  :q              Quit",
        "  :q!             Force quit",
        "  :wq             Save and quit",
        "  :title [name]   Show or set the sheet title",
        "  :new [title]    Create a new sheet and switch to it",
        "  :goto A1        Jump to cell",
        "  :format <f>     currency, percent, number, none",
        "  :align <a>      left, center, right, none",
        "  :bg / :fg <c>   Background / text color (#rrggbb or none)",
        "  :export [file]  Export display values (.csv or .xls)",
        "  :import <file>  Replace cells with a CSV file",
        "  :help           Show this help",
        "",
        "Formulas:",
        "  =A1+B2*2        Arithmetic on cell references",
    ]
    .into_iter()
    .map(str::to_string)
    .collect();

    for info in FUNCTIONS {
        let call = format!("{}(A1:A10)", info.name);
        lines.push(format!("  ={:<14} {}", call, info.description));
    }
    lines
}
