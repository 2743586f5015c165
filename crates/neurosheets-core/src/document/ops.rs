use super::Document;
use neurosheets_engine::engine::{Align, CellRef, CellStyle, NumberFormat, detect_cycle};
use tracing::debug;

impl Document {
    /// Drop the cached results of a changed cell and of every formula that
    /// reads it, directly or transitively.
    fn invalidate_dependents(&mut self, changed_cell: &CellRef) {
        self.results.remove(changed_cell);
        let dependents = self.graph.transitive_dependents(changed_cell);
        for dep in &dependents {
            self.results.remove(dep);
        }
        debug!(cell = %changed_cell, dependents = dependents.len(), "invalidated cached results");
    }

    /// Store raw input in a cell: a formula when it starts with '=', otherwise
    /// a number, text or empty value.
    ///
    /// Returns the cycle the new formula closes, if any. The write happens
    /// either way; cells on the cycle display `#CIRC!`.
    pub fn set_cell_from_input(&mut self, cell_ref: &CellRef, input: &str) -> Option<Vec<CellRef>> {
        let formula = self.cells.write(cell_ref, input).formula.clone();
        self.graph.set_formula(cell_ref, formula.as_deref());
        self.invalidate_dependents(cell_ref);
        self.modified = true;

        if formula.is_none() {
            return None;
        }
        detect_cycle(cell_ref, &self.graph)
    }

    /// Clear a cell's value and formula, keeping its style.
    pub fn clear_cell(&mut self, cell_ref: &CellRef) {
        if self.cells.get(cell_ref).is_some() {
            self.set_cell_from_input(cell_ref, "");
        }
    }

    fn update_style(&mut self, cell_ref: &CellRef, edit: impl FnOnce(&mut CellStyle)) {
        self.cells.update_style(cell_ref, edit);
        self.modified = true;
    }

    pub fn toggle_bold(&mut self, cell_ref: &CellRef) {
        self.update_style(cell_ref, |s| s.bold = Some(!s.is_bold()));
    }

    pub fn toggle_italic(&mut self, cell_ref: &CellRef) {
        self.update_style(cell_ref, |s| s.italic = Some(!s.is_italic()));
    }

    pub fn set_align(&mut self, cell_ref: &CellRef, align: Option<Align>) {
        self.update_style(cell_ref, |s| s.align = align);
    }

    /// Set the number format; `None` goes back to the natural form.
    pub fn set_format(&mut self, cell_ref: &CellRef, format: Option<NumberFormat>) {
        self.update_style(cell_ref, |s| s.format = format);
    }

    pub fn set_background_color(&mut self, cell_ref: &CellRef, color: Option<String>) {
        self.update_style(cell_ref, |s| s.background_color = color);
    }

    pub fn set_text_color(&mut self, cell_ref: &CellRef, color: Option<String>) {
        self.update_style(cell_ref, |s| s.text_color = color);
    }

    pub fn set_title(&mut self, title: &str) {
        if self.title != title {
            self.title = title.to_string();
            self.modified = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurosheets_engine::engine::CellValue;

    fn r(name: &str) -> CellRef {
        CellRef::from_str(name).unwrap()
    }

    #[test]
    fn test_set_cell_marks_modified() {
        let mut doc = Document::new();
        assert!(!doc.modified);
        assert_eq!(doc.set_cell_from_input(&r("A1"), "5"), None);
        assert!(doc.modified);
        assert_eq!(doc.cells.read(&r("A1")).value, CellValue::Number(5.0));
    }

    #[test]
    fn test_set_cell_reports_cycle() {
        let mut doc = Document::new();
        assert_eq!(doc.set_cell_from_input(&r("A1"), "=B1+1"), None);
        let cycle = doc.set_cell_from_input(&r("B1"), "=A1*2").unwrap();
        assert_eq!(cycle, vec![r("B1"), r("A1"), r("B1")]);

        // Breaking the loop clears the report.
        assert_eq!(doc.set_cell_from_input(&r("B1"), "3"), None);
        assert_eq!(doc.set_cell_from_input(&r("A1"), "=B1+1"), None);
    }

    #[test]
    fn test_clear_cell_keeps_record_and_style() {
        let mut doc = Document::new();
        doc.set_cell_from_input(&r("A1"), "=1+1");
        doc.toggle_bold(&r("A1"));
        doc.clear_cell(&r("A1"));

        let cell = doc.cells.get(&r("A1")).unwrap();
        assert_eq!(cell.value, CellValue::Empty);
        assert!(cell.formula.is_none());
        assert!(cell.style.as_ref().unwrap().is_bold());
        assert!(!doc.graph.is_formula(&r("A1")));

        doc.clear_cell(&r("Z9"));
        assert!(doc.cells.get(&r("Z9")).is_none());
    }

    #[test]
    fn test_style_edits() {
        let mut doc = Document::new();
        let at = r("C3");
        doc.toggle_bold(&at);
        doc.toggle_bold(&at);
        doc.toggle_italic(&at);
        doc.set_align(&at, Some(Align::Center));
        doc.set_format(&at, Some(NumberFormat::Currency));
        doc.set_background_color(&at, Some("#ffee00".to_string()));
        doc.set_text_color(&at, Some("#000000".to_string()));

        let style = doc.cells.read(&at).style.unwrap();
        assert!(!style.is_bold());
        assert!(style.is_italic());
        assert_eq!(style.align, Some(Align::Center));
        assert_eq!(style.format, Some(NumberFormat::Currency));
        assert_eq!(style.background_color.as_deref(), Some("#ffee00"));
        assert_eq!(style.text_color.as_deref(), Some("#000000"));
        assert!(doc.cells.read(&at).is_blank());
    }

    #[test]
    fn test_set_title() {
        let mut doc = Document::new();
        doc.set_title("Book1");
        assert!(!doc.modified);
        doc.set_title("Budget");
        assert_eq!(doc.title, "Budget");
        assert!(doc.modified);
    }
}
