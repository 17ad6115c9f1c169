//! The raw shape tree read from a page document.
//!
//! A [`RawShape`] captures everything the markup declares about one shape,
//! before it is classified into a line or an area. Parents own their children;
//! [`RawShape::preorder`] walks the whole tree in encounter order.

use crate::cell::{Cell, Section, find_cell};

/// The dimension-type attribute value that marks a shape as one-dimensional.
pub const LINE_DIMENSION_TYPE: &str = "1";

/// A shape as declared in a page document.
#[derive(Debug, Clone, PartialEq)]
pub struct RawShape {
    id: Option<String>,
    name: Option<String>,
    dimension_type: Option<String>,
    master: Option<String>,
    text: Option<String>,
    page_name: String,
    depth: usize,
    cells: Vec<Cell>,
    sections: Vec<Section>,
    children: Vec<RawShape>,
}

impl RawShape {
    /// Creates a shape with the given identifier on the given page.
    ///
    /// Every other attribute starts unset; use the `with_*` methods to fill
    /// them in.
    pub fn new(id: Option<String>, page_name: impl Into<String>) -> Self {
        Self {
            id,
            name: None,
            dimension_type: None,
            master: None,
            text: None,
            page_name: page_name.into(),
            depth: 0,
            cells: Vec::new(),
            sections: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Sets the shape name.
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Sets the declared dimension-type attribute.
    pub fn with_dimension_type(mut self, dimension_type: Option<String>) -> Self {
        self.dimension_type = dimension_type;
        self
    }

    /// Sets the master reference.
    pub fn with_master(mut self, master: Option<String>) -> Self {
        self.master = master;
        self
    }

    /// Sets the text content.
    ///
    /// The text is trimmed; text that is empty after trimming is stored as
    /// unset.
    pub fn with_text(mut self, text: Option<&str>) -> Self {
        self.text = text
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        self
    }

    /// Sets the nesting depth (0 for top-level shapes).
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Appends a flat cell.
    pub fn with_cell(mut self, cell: Cell) -> Self {
        self.cells.push(cell);
        self
    }

    /// Appends a named section.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Appends a child shape.
    pub fn with_child(mut self, child: RawShape) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child shape in place.
    pub fn push_child(&mut self, child: RawShape) {
        self.children.push(child);
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the declared dimension-type attribute, verbatim.
    pub fn dimension_type(&self) -> Option<&str> {
        self.dimension_type.as_deref()
    }

    pub fn master(&self) -> Option<&str> {
        self.master.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn page_name(&self) -> &str {
        &self.page_name
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn children(&self) -> &[RawShape] {
        &self.children
    }

    /// Returns `true` when the dimension-type attribute declares a 1D shape.
    pub fn declares_line(&self) -> bool {
        self.dimension_type() == Some(LINE_DIMENSION_TYPE)
    }

    /// Returns the first flat cell with the given name.
    pub fn cell(&self, name: &str) -> Option<&Cell> {
        find_cell(&self.cells, name)
    }

    /// Returns the numeric value of the flat cell with the given name.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.cell(name).and_then(Cell::number)
    }

    /// Returns every section with the given name, in declaration order.
    pub fn sections_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Section> {
        self.sections
            .iter()
            .filter(move |section| section.name() == Some(name))
    }

    /// Returns an iterator over this shape and all its descendants in
    /// pre-order.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }
}

/// Pre-order iterator over a [`RawShape`] tree.
///
/// Created by [`RawShape::preorder`].
#[derive(Debug)]
pub struct Preorder<'a> {
    stack: Vec<&'a RawShape>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a RawShape;

    fn next(&mut self) -> Option<Self::Item> {
        let shape = self.stack.pop()?;
        self.stack.extend(shape.children.iter().rev());
        Some(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Row;

    fn shape(id: &str) -> RawShape {
        RawShape::new(Some(id.to_string()), "Page-1")
    }

    #[test]
    fn test_text_is_trimmed_and_empty_is_unset() {
        assert_eq!(shape("1").with_text(Some("  Server \n")).text(), Some("Server"));
        assert_eq!(shape("1").with_text(Some(" \n\t")).text(), None);
        assert_eq!(shape("1").with_text(None).text(), None);
    }

    #[test]
    fn test_declares_line() {
        assert!(shape("1").with_dimension_type(Some("1".into())).declares_line());
        assert!(!shape("1").with_dimension_type(Some("2".into())).declares_line());
        assert!(!shape("1").declares_line());
    }

    #[test]
    fn test_preorder_visits_parents_before_children() {
        let tree = shape("1")
            .with_child(shape("2").with_child(shape("3")))
            .with_child(shape("4"));

        let ids: Vec<_> = tree.preorder().filter_map(RawShape::id).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_sections_with_same_name_are_kept_apart() {
        let connects = |sheet: &str| {
            Section::new(
                Some("Connects".to_string()),
                vec![Row::new(None, None, vec![Cell::named("ToSheet", sheet)])],
            )
        };
        let raw = shape("1")
            .with_section(connects("5"))
            .with_section(Section::new(Some("User".to_string()), Vec::new()))
            .with_section(connects("6"));

        let sheets: Vec<_> = raw
            .sections_named("Connects")
            .flat_map(Section::rows)
            .filter_map(|row| row.cell("ToSheet").and_then(Cell::value))
            .collect();
        assert_eq!(sheets, vec!["5", "6"]);
    }

    #[test]
    fn test_number_lookup() {
        let raw = shape("1")
            .with_cell(Cell::named("PinX", "2.5"))
            .with_cell(Cell::named("PinY", "oops"));

        assert_eq!(raw.number("PinX"), Some(2.5));
        assert_eq!(raw.number("PinY"), None);
        assert_eq!(raw.number("Width"), None);
    }
}
