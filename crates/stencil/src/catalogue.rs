//! The shape catalogue document of one input file.

use serde::Serialize;

use stencil_core::shape::{AreaShape, LineShape};

use crate::registry::ShapeRegistry;

/// Every classified shape of one input file, split by kind.
///
/// Lists keep registration order and are always present, even when empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeCatalogue {
    #[serde(rename = "Filename")]
    filename: String,
    #[serde(rename = "Shape2DList")]
    areas: Vec<AreaShape>,
    #[serde(rename = "Shape1DList")]
    lines: Vec<LineShape>,
}

impl ShapeCatalogue {
    /// Snapshots a resolved registry under the given input file name.
    pub fn from_registry(filename: impl Into<String>, registry: &ShapeRegistry) -> Self {
        Self {
            filename: filename.into(),
            areas: registry.areas().cloned().collect(),
            lines: registry.lines().cloned().collect(),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn areas(&self) -> &[AreaShape] {
        &self.areas
    }

    pub fn lines(&self) -> &[LineShape] {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use stencil_core::shape::{AreaGeometry, LineGeometry, Shape, ShapeInfo};

    use super::*;

    #[test]
    fn test_empty_registry_keeps_both_lists() {
        let catalogue = ShapeCatalogue::from_registry("empty", &ShapeRegistry::new());
        let json = serde_json::to_value(&catalogue).unwrap();

        assert_eq!(json["Filename"], "empty");
        assert_eq!(json["Shape2DList"], serde_json::json!([]));
        assert_eq!(json["Shape1DList"], serde_json::json!([]));
    }

    #[test]
    fn test_shapes_are_split_by_kind() {
        let mut registry = ShapeRegistry::new();
        registry.insert(Shape::Area(AreaShape::new(
            "1",
            ShapeInfo::default(),
            AreaGeometry::default(),
        )));
        registry.insert(Shape::Line(LineShape::new(
            "2",
            ShapeInfo::default(),
            LineGeometry::default(),
        )));
        registry.insert(Shape::Area(AreaShape::new(
            "3",
            ShapeInfo::default(),
            AreaGeometry::default(),
        )));

        let catalogue = ShapeCatalogue::from_registry("drawing", &registry);
        let area_ids: Vec<_> = catalogue.areas().iter().map(AreaShape::id).collect();
        let line_ids: Vec<_> = catalogue.lines().iter().map(LineShape::id).collect();

        assert_eq!(catalogue.filename(), "drawing");
        assert_eq!(area_ids, vec!["1", "3"]);
        assert_eq!(line_ids, vec!["2"]);
    }
}
