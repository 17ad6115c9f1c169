//! Classified shapes.
//!
//! Every raw shape becomes exactly one [`Shape`]: either a [`LineShape`]
//! (a connector, "1D") or an [`AreaShape`] (a node-like shape, "2D").
//! Connection records are shared through [`Rc`]: a record owned by the
//! line that declared it may also appear in the incoming list of the area
//! it lands on.

use std::rc::Rc;

use serde::Serialize;

use crate::connection::ConnectionRecord;

/// Descriptive attributes common to both shape kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShapeInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_name: Option<String>,
}

impl ShapeInfo {
    /// Returns the text when it is non-empty after trimming.
    pub fn visible_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Returns the display label used when another shape refers to this one:
    /// the name, followed by ` (<text>)` when the shape has text. A shape
    /// without a name is labelled by its text alone.
    pub fn label(&self) -> Option<String> {
        match (self.name.as_deref(), self.visible_text()) {
            (Some(name), Some(text)) => Some(format!("{name} ({text})")),
            (Some(name), None) => Some(name.to_string()),
            (None, text) => text.map(str::to_string),
        }
    }
}

/// Begin and end points of a connector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineGeometry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_y: Option<f64>,
}

/// Pin position and size of an area shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AreaGeometry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Connection state of a connector.
///
/// `connections` is the structured list, in declaration order. The
/// `begin_*`/`end_*`/`*_part` fields are the legacy single-endpoint view
/// derived from role codes; both are kept side by side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_connected_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_connected_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_points: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_connected_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_connected_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_part: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_part: Option<String>,
    pub connections: Vec<Rc<ConnectionRecord>>,
}

/// A one-dimensional shape (connector).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineShape {
    #[serde(rename = "ID")]
    id: String,
    #[serde(flatten)]
    info: ShapeInfo,
    #[serde(flatten)]
    geometry: LineGeometry,
    #[serde(flatten)]
    links: LineLinks,
}

impl LineShape {
    /// Creates an unconnected line shape.
    pub fn new(id: impl Into<String>, info: ShapeInfo, geometry: LineGeometry) -> Self {
        Self {
            id: id.into(),
            info,
            geometry,
            links: LineLinks::default(),
        }
    }

    /// Returns this shape with its connection state replaced.
    pub fn with_links(mut self, links: LineLinks) -> Self {
        self.links = links;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn info(&self) -> &ShapeInfo {
        &self.info
    }

    pub fn geometry(&self) -> &LineGeometry {
        &self.geometry
    }

    pub fn links(&self) -> &LineLinks {
        &self.links
    }

    /// Returns the owned connection records in declaration order.
    pub fn connections(&self) -> &[Rc<ConnectionRecord>] {
        &self.links.connections
    }
}

/// A two-dimensional shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaShape {
    #[serde(rename = "ID")]
    id: String,
    #[serde(flatten)]
    info: ShapeInfo,
    #[serde(flatten)]
    geometry: AreaGeometry,
    #[serde(rename = "IncomingConnections", skip_serializing_if = "Option::is_none")]
    incoming: Option<Vec<Rc<ConnectionRecord>>>,
}

impl AreaShape {
    /// Creates an area shape with no incoming connections.
    pub fn new(id: impl Into<String>, info: ShapeInfo, geometry: AreaGeometry) -> Self {
        Self {
            id: id.into(),
            info,
            geometry,
            incoming: None,
        }
    }

    /// Returns this shape with the given incoming connections.
    ///
    /// An empty list leaves the incoming connections unset.
    pub fn with_incoming(mut self, incoming: Vec<Rc<ConnectionRecord>>) -> Self {
        self.incoming = (!incoming.is_empty()).then_some(incoming);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn info(&self) -> &ShapeInfo {
        &self.info
    }

    pub fn geometry(&self) -> &AreaGeometry {
        &self.geometry
    }

    /// Returns the records whose target is this shape, if any.
    pub fn incoming(&self) -> Option<&[Rc<ConnectionRecord>]> {
        self.incoming.as_deref()
    }
}

/// A classified shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line(LineShape),
    Area(AreaShape),
}

impl Shape {
    pub fn id(&self) -> &str {
        match self {
            Shape::Line(line) => line.id(),
            Shape::Area(area) => area.id(),
        }
    }

    pub fn info(&self) -> &ShapeInfo {
        match self {
            Shape::Line(line) => line.info(),
            Shape::Area(area) => area.info(),
        }
    }

    /// Returns `true` for one-dimensional shapes.
    pub fn is_line(&self) -> bool {
        matches!(self, Shape::Line(_))
    }
}
