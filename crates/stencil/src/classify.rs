//! Line/area classification of raw shapes.
//!
//! The decision looks at the shape alone, never at its children:
//! 1. a dimension-type attribute equal to the 1D sentinel makes a line;
//! 2. otherwise a shape without a `BeginX` cell is an area;
//! 3. otherwise (a `BeginX` cell without the 1D attribute) it is a line,
//!    since producers may omit or mis-tag the attribute.

use stencil_core::{
    raw::RawShape,
    shape::{AreaGeometry, AreaShape, LineGeometry, LineShape, Shape, ShapeInfo},
};

/// The dimension a raw shape is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// A connector ("1D").
    Line,
    /// A node-like shape ("2D").
    Area,
}

/// Decides the dimension of a raw shape.
pub fn dimension(raw: &RawShape) -> Dimension {
    if raw.declares_line() || raw.cell("BeginX").is_some() {
        Dimension::Line
    } else {
        Dimension::Area
    }
}

/// Classifies a raw shape into a [`LineShape`] or an [`AreaShape`].
///
/// Geometry is read from the named flat cells; missing or unparsable values
/// stay unset. Returns `None` only for shapes without an identifier, which
/// cannot be registered or referenced.
pub fn classify(raw: &RawShape) -> Option<Shape> {
    let id = raw.id()?;
    let info = ShapeInfo {
        name: raw.name().map(str::to_string),
        text: raw.text().map(str::to_string),
        master: raw.master().map(str::to_string),
        page_name: Some(raw.page_name().to_string()),
    };

    let shape = match dimension(raw) {
        Dimension::Line => Shape::Line(LineShape::new(
            id,
            info,
            LineGeometry {
                begin_x: raw.number("BeginX"),
                begin_y: raw.number("BeginY"),
                end_x: raw.number("EndX"),
                end_y: raw.number("EndY"),
            },
        )),
        Dimension::Area => Shape::Area(AreaShape::new(
            id,
            info,
            AreaGeometry {
                pin_x: raw.number("PinX"),
                pin_y: raw.number("PinY"),
                width: raw.number("Width"),
                height: raw.number("Height"),
            },
        )),
    };
    Some(shape)
}
