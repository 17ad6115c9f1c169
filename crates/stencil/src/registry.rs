//! Per-file shape registry.
//!
//! The registry is the keyed store of classified shapes for one input file.
//! A fresh registry is built for every file and handed from stage to stage,
//! so nothing leaks between files and files can be processed independently.
//!
//! Iteration follows first-insertion order, which keeps the output
//! documents deterministic.

use indexmap::IndexMap;
use log::debug;

use stencil_core::shape::{AreaShape, LineShape, Shape};

/// Classified shapes of one input file, keyed by shape id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeRegistry {
    lines: IndexMap<String, LineShape>,
    areas: IndexMap<String, AreaShape>,
}

impl ShapeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a shape under its id.
    ///
    /// Ids are unique across both shape kinds: a later shape replaces any
    /// earlier one with the same id, whatever its kind. Returns the replaced
    /// shape, if any.
    pub fn insert(&mut self, shape: Shape) -> Option<Shape> {
        let id = shape.id().to_string();
        let replaced = match shape {
            Shape::Line(line) => {
                let previous_area = self.areas.shift_remove(&id).map(Shape::Area);
                self.lines
                    .insert(id.clone(), line)
                    .map(Shape::Line)
                    .or(previous_area)
            }
            Shape::Area(area) => {
                let previous_line = self.lines.shift_remove(&id).map(Shape::Line);
                self.areas
                    .insert(id.clone(), area)
                    .map(Shape::Area)
                    .or(previous_line)
            }
        };

        if replaced.is_some() {
            debug!(id; "Shape id registered twice, keeping the later shape");
        }
        replaced
    }

    /// Returns the line shape with the given id.
    pub fn line(&self, id: &str) -> Option<&LineShape> {
        self.lines.get(id)
    }

    /// Returns the area shape with the given id.
    pub fn area(&self, id: &str) -> Option<&AreaShape> {
        self.areas.get(id)
    }

    /// Returns all line shapes in registration order.
    pub fn lines(&self) -> impl Iterator<Item = &LineShape> {
        self.lines.values()
    }

    /// Returns all area shapes in registration order.
    pub fn areas(&self) -> impl Iterator<Item = &AreaShape> {
        self.areas.values()
    }

    pub fn lines_count(&self) -> usize {
        self.lines.len()
    }

    pub fn areas_count(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.areas.is_empty()
    }

    /// Splits the registry into its line and area maps.
    pub(crate) fn into_parts(self) -> (IndexMap<String, LineShape>, IndexMap<String, AreaShape>) {
        (self.lines, self.areas)
    }

    /// Reassembles a registry from maps produced by [`ShapeRegistry::into_parts`].
    pub(crate) fn from_parts(
        lines: IndexMap<String, LineShape>,
        areas: IndexMap<String, AreaShape>,
    ) -> Self {
        Self { lines, areas }
    }
}

#[cfg(test)]
mod tests {
    use stencil_core::shape::{AreaGeometry, LineGeometry, ShapeInfo};

    use super::*;

    fn line(id: &str, name: &str) -> Shape {
        Shape::Line(LineShape::new(
            id,
            ShapeInfo {
                name: Some(name.to_string()),
                ..Default::default()
            },
            LineGeometry::default(),
        ))
    }

    fn area(id: &str, name: &str) -> Shape {
        Shape::Area(AreaShape::new(
            id,
            ShapeInfo {
                name: Some(name.to_string()),
                ..Default::default()
            },
            AreaGeometry::default(),
        ))
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = ShapeRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.lines().count(), 0);
        assert_eq!(registry.areas().count(), 0);
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut registry = ShapeRegistry::new();
        assert!(registry.insert(line("1", "connector")).is_none());
        assert!(registry.insert(area("2", "box")).is_none());

        assert_eq!(registry.lines_count(), 1);
        assert_eq!(registry.areas_count(), 1);
        assert!(registry.line("1").is_some());
        assert!(registry.area("2").is_some());
        assert!(registry.line("2").is_none());
        assert!(registry.area("1").is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let mut registry = ShapeRegistry::new();
        registry.insert(area("1", "first"));
        let replaced = registry.insert(area("1", "second"));

        assert_eq!(replaced.map(|shape| shape.info().name.clone()), Some(Some("first".into())));
        assert_eq!(registry.areas_count(), 1);
        assert_eq!(registry.area("1").unwrap().info().name.as_deref(), Some("second"));
    }

    #[test]
    fn test_id_moves_between_kinds() {
        let mut registry = ShapeRegistry::new();
        registry.insert(area("1", "box"));
        let replaced = registry.insert(line("1", "connector"));

        assert!(matches!(replaced, Some(Shape::Area(_))));
        assert!(registry.area("1").is_none());
        assert!(registry.line("1").is_some());
    }

    #[test]
    fn test_iteration_follows_registration_order() {
        let mut registry = ShapeRegistry::new();
        for id in ["5", "2", "9"] {
            registry.insert(area(id, id));
        }

        let ids: Vec<_> = registry.areas().map(AreaShape::id).collect();
        assert_eq!(ids, vec!["5", "2", "9"]);
    }
}
