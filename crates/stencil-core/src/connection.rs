//! Connection declarations and resolved connection records.
//!
//! Pages declare connections independently of the shapes they link: each
//! [`ConnectDeclaration`] names a source sheet (the connector), a target
//! sheet and the role codes of both ends. Declarations with both endpoints
//! present become [`ConnectionRecord`]s. A shape may also declare its own
//! connections as rows of a [`CONNECTS_SECTION`] section.

use serde::Serialize;

/// Name of the shape-local section whose rows declare connections.
pub const CONNECTS_SECTION: &str = "Connects";

/// A connection exactly as declared in a page document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectDeclaration {
    pub from_sheet: Option<String>,
    pub to_sheet: Option<String>,
    pub from_part: Option<String>,
    pub to_part: Option<String>,
    pub from_cell: Option<String>,
    pub to_cell: Option<String>,
}

/// Which end of a connector a role code designates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointRole {
    /// Role codes 3 and 9.
    Begin,
    /// Role codes 6 and 12.
    End,
    /// Any other code, including missing or non-numeric ones.
    Other,
}

impl EndpointRole {
    /// Classifies a raw role code.
    pub fn from_code(code: Option<&str>) -> Self {
        match code.and_then(|code| code.trim().parse::<u32>().ok()) {
            Some(3 | 9) => Self::Begin,
            Some(6 | 12) => Self::End,
            _ => Self::Other,
        }
    }
}

/// Position and direction of the connection point a record lands on.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConnectionPoint {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub dir_x: Option<f64>,
    pub dir_y: Option<f64>,
}

/// A resolved link from a source shape to a target shape.
///
/// Records are built once per declaration and never mutated afterwards;
/// name resolution produces a new record through [`ConnectionRecord::with_names`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConnectionRecord {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    from_sheet: String,
    to_sheet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    from_part: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_part: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_cell: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from_shape_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_shape_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dir_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dir_y: Option<f64>,
}

impl ConnectionRecord {
    /// Creates a record between two sheets.
    ///
    /// The record id is `<from_sheet>-<to_sheet>`.
    pub fn new(
        from_sheet: impl Into<String>,
        to_sheet: impl Into<String>,
        from_part: Option<String>,
        to_part: Option<String>,
    ) -> Self {
        let from_sheet = from_sheet.into();
        let to_sheet = to_sheet.into();
        Self {
            id: format!("{from_sheet}-{to_sheet}"),
            name: None,
            from_sheet,
            to_sheet,
            from_part,
            to_part,
            to_cell: None,
            from_shape_name: None,
            to_shape_name: None,
            x: None,
            y: None,
            dir_x: None,
            dir_y: None,
        }
    }

    /// Builds a record from a page declaration.
    ///
    /// Returns `None` when either endpoint is missing or empty.
    pub fn from_declaration(declaration: &ConnectDeclaration) -> Option<Self> {
        let from_sheet = non_empty(declaration.from_sheet.as_deref())?;
        let to_sheet = non_empty(declaration.to_sheet.as_deref())?;

        let mut record = Self::new(
            from_sheet,
            to_sheet,
            declaration.from_part.clone(),
            declaration.to_part.clone(),
        );
        record.name = declaration.from_cell.clone();
        record.to_cell = declaration.to_cell.clone();
        Some(record)
    }

    /// Returns a copy of this record with the connection point geometry set.
    pub fn with_point(mut self, point: ConnectionPoint) -> Self {
        self.x = point.x;
        self.y = point.y;
        self.dir_x = point.dir_x;
        self.dir_y = point.dir_y;
        self
    }

    /// Returns a copy of this record with the endpoint shape names set.
    pub fn with_names(mut self, from_shape_name: Option<String>, to_shape_name: Option<String>) -> Self {
        self.from_shape_name = from_shape_name;
        self.to_shape_name = to_shape_name;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the source cell name, when the declaration named one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn from_sheet(&self) -> &str {
        &self.from_sheet
    }

    pub fn to_sheet(&self) -> &str {
        &self.to_sheet
    }

    pub fn from_part(&self) -> Option<&str> {
        self.from_part.as_deref()
    }

    pub fn to_part(&self) -> Option<&str> {
        self.to_part.as_deref()
    }

    /// Returns the target cell this record lands on (e.g. `Connections.X2`).
    pub fn to_cell(&self) -> Option<&str> {
        self.to_cell.as_deref()
    }

    pub fn from_shape_name(&self) -> Option<&str> {
        self.from_shape_name.as_deref()
    }

    pub fn to_shape_name(&self) -> Option<&str> {
        self.to_shape_name.as_deref()
    }

    /// Returns the connection point geometry.
    pub fn point(&self) -> ConnectionPoint {
        ConnectionPoint {
            x: self.x,
            y: self.y,
            dir_x: self.dir_x,
            dir_y: self.dir_y,
        }
    }

    /// Returns which end of the connector this record attaches.
    pub fn role(&self) -> EndpointRole {
        EndpointRole::from_code(self.from_part())
    }

    /// Encodes the record in the deprecated `Name:Value;...` form.
    pub fn legacy_encoding(&self) -> String {
        let mut pairs = vec![
            format!("FromSheet:{}", self.from_sheet),
            format!("ToSheet:{}", self.to_sheet),
        ];
        if let Some(part) = &self.from_part {
            pairs.push(format!("FromPart:{part}"));
        }
        if let Some(part) = &self.to_part {
            pairs.push(format!("ToPart:{part}"));
        }
        pairs.join(";")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
