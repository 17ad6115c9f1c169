//! Flat attribute cells and named attribute sections.
//!
//! A shape carries two kinds of attributes:
//! - [`Cell`]s directly under the shape: an unordered bag of named values
//!   such as `PinX` or `BeginX`.
//! - [`Section`]s: named groups of ordered [`Row`]s, each row holding its own
//!   ordered cells (connection points, geometry rows, user data, ...).
//!
//! All attributes are kept verbatim as optional strings. Numeric
//! interpretation happens on demand through [`Cell::number`].

/// A single named attribute value.
///
/// Mirrors the `N`, `V`, `U` and `F` attributes of a markup `Cell` element.
/// Absent attributes stay `None`; nothing is replaced by a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    name: Option<String>,
    value: Option<String>,
    unit: Option<String>,
    formula: Option<String>,
}

impl Cell {
    /// Creates a new cell from its raw attributes.
    ///
    /// # Arguments
    ///
    /// * `name` - The cell name (`N`).
    /// * `value` - The cell value (`V`).
    /// * `unit` - The unit of the value (`U`).
    /// * `formula` - The formula the value was computed from (`F`).
    pub fn new(
        name: Option<String>,
        value: Option<String>,
        unit: Option<String>,
        formula: Option<String>,
    ) -> Self {
        Self {
            name,
            value,
            unit,
            formula,
        }
    }

    /// Creates a cell carrying only a name and a value.
    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(Some(name.into()), Some(value.into()), None, None)
    }

    /// Returns the cell name, if declared.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the raw cell value, if declared.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns the unit of the value, if declared.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Returns the formula of the cell, if declared.
    pub fn formula(&self) -> Option<&str> {
        self.formula.as_deref()
    }

    /// Interprets the cell value as a floating point number.
    ///
    /// Parsing is locale-invariant (`.` as decimal separator). A missing,
    /// unparsable or non-finite value yields `None`.
    pub fn number(&self) -> Option<f64> {
        parse_number(self.value.as_deref()?)
    }
}

/// Parses a locale-invariant floating point number.
///
/// Surrounding whitespace is ignored. Returns `None` for unparsable input
/// and for `NaN`/infinite values.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Returns the first cell with the given name.
pub fn find_cell<'a>(cells: &'a [Cell], name: &str) -> Option<&'a Cell> {
    cells.iter().find(|cell| cell.name() == Some(name))
}

/// A single row of a [`Section`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    ix: Option<String>,
    name: Option<String>,
    cells: Vec<Cell>,
}

impl Row {
    /// Creates a new row.
    ///
    /// # Arguments
    ///
    /// * `ix` - The row index attribute (`IX`), if declared.
    /// * `name` - The row name attribute (`N`), if declared.
    /// * `cells` - The row cells, in declaration order.
    pub fn new(ix: Option<String>, name: Option<String>, cells: Vec<Cell>) -> Self {
        Self { ix, name, cells }
    }

    /// Returns the row index attribute.
    pub fn ix(&self) -> Option<&str> {
        self.ix.as_deref()
    }

    /// Returns the row name attribute.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the row cells in declaration order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Returns the first cell of this row with the given name.
    pub fn cell(&self, name: &str) -> Option<&Cell> {
        find_cell(&self.cells, name)
    }
}

/// A named, ordered group of rows.
///
/// Sections are never merged: a shape may declare several sections with the
/// same name and each keeps its own rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    name: Option<String>,
    rows: Vec<Row>,
}

impl Section {
    /// Creates a new section with the given rows.
    pub fn new(name: Option<String>, rows: Vec<Row>) -> Self {
        Self { name, rows }
    }

    /// Returns the section name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the rows in declaration order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}
