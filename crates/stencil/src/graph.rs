//! Node/edge graph derived from a resolved registry.
//!
//! Area shapes with text become [`Node`]s and line shapes with text and at
//! least one connection become [`Edge`]s. Edges refer to nodes by id only:
//! an endpoint may name a shape that did not become a node (for instance an
//! area without text), and such edges are kept as they are.
//!
//! [`Graph::to_digraph`] offers a `petgraph` view for consumers that want to
//! run graph algorithms; that view only contains edges whose endpoints are
//! both nodes.

use std::collections::HashMap;

use log::debug;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use stencil_core::shape::{AreaShape, LineShape};

use crate::registry::ShapeRegistry;

/// A graph node, built from an area shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Node {
    #[serde(rename = "ID")]
    id: String,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pin_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pin_y: Option<f64>,
}

impl Node {
    /// Builds a node from an area shape; `None` when the shape has no text.
    fn from_area(area: &AreaShape) -> Option<Self> {
        let text = area.info().visible_text()?;
        Some(Self {
            id: area.id().to_string(),
            text: text.to_string(),
            pin_x: area.geometry().pin_x,
            pin_y: area.geometry().pin_y,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn pin_x(&self) -> Option<f64> {
        self.pin_x
    }

    pub fn pin_y(&self) -> Option<f64> {
        self.pin_y
    }
}

/// A graph edge, built from a line shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Edge {
    #[serde(rename = "ID")]
    id: String,
    text: String,
    #[serde(rename = "FromNodeID", skip_serializing_if = "Option::is_none")]
    from_node_id: Option<String>,
    #[serde(rename = "ToNodeID", skip_serializing_if = "Option::is_none")]
    to_node_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from_node_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_node_text: Option<String>,
}

impl Edge {
    /// Builds an edge from a line shape.
    ///
    /// Returns `None` for lines without text or without connections.
    ///
    /// Endpoints are chosen as follows:
    /// 1. the source is the target sheet of the first record with one;
    /// 2. the destination is the target sheet of the last record with one,
    ///    provided it is not the record chosen for the source;
    /// 3. an endpoint still missing falls back to the legacy
    ///    `begin_connected_to`/`end_connected_to` field.
    ///
    /// With more than two records only the first and the last count.
    fn from_line(line: &LineShape, registry: &ShapeRegistry) -> Option<Self> {
        let text = line.info().visible_text()?;
        let records = line.connections();
        if records.is_empty() {
            return None;
        }

        let first = records.iter().position(|record| !record.to_sheet().is_empty());
        let last = records
            .iter()
            .rposition(|record| !record.to_sheet().is_empty())
            .filter(|&last| Some(last) != first);

        let from_node_id = first
            .map(|index| records[index].to_sheet().to_string())
            .or_else(|| line.links().begin_connected_to.clone());
        let to_node_id = last
            .map(|index| records[index].to_sheet().to_string())
            .or_else(|| line.links().end_connected_to.clone());

        let node_text = |id: Option<&str>| {
            id.and_then(|id| registry.area(id))
                .and_then(|area| area.info().visible_text())
                .map(str::to_string)
        };

        Some(Self {
            id: line.id().to_string(),
            text: text.to_string(),
            from_node_text: node_text(from_node_id.as_deref()),
            to_node_text: node_text(to_node_id.as_deref()),
            from_node_id,
            to_node_id,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn from_node_id(&self) -> Option<&str> {
        self.from_node_id.as_deref()
    }

    pub fn to_node_id(&self) -> Option<&str> {
        self.to_node_id.as_deref()
    }

    pub fn from_node_text(&self) -> Option<&str> {
        self.from_node_text.as_deref()
    }

    pub fn to_node_text(&self) -> Option<&str> {
        self.to_node_text.as_deref()
    }
}

/// The node/edge graph of one input file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    /// Derives the graph from a resolved registry, in registration order.
    pub fn build(registry: &ShapeRegistry) -> Self {
        let nodes: Vec<Node> = registry.areas().filter_map(Node::from_area).collect();
        let edges: Vec<Edge> = registry
            .lines()
            .filter_map(|line| Edge::from_line(line, registry))
            .collect();

        debug!(nodes = nodes.len(), edges = edges.len(); "Graph built");
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Returns edges with an endpoint that is not a node of this graph.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|edge| {
            [edge.from_node_id(), edge.to_node_id()]
                .into_iter()
                .flatten()
                .any(|id| self.node(id).is_none())
        })
    }

    /// Builds a `petgraph` view of this graph.
    ///
    /// Only edges with both endpoints among the nodes are included.
    pub fn to_digraph(&self) -> DiGraph<&Node, &Edge> {
        let mut digraph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let indices: HashMap<&str, NodeIndex> = self
            .nodes
            .iter()
            .map(|node| (node.id(), digraph.add_node(node)))
            .collect();

        for edge in &self.edges {
            let source = edge.from_node_id().and_then(|id| indices.get(id));
            let target = edge.to_node_id().and_then(|id| indices.get(id));
            if let (Some(&source), Some(&target)) = (source, target) {
                digraph.add_edge(source, target, edge);
            }
        }
        digraph
    }

    /// Returns the number of weakly connected components among the nodes.
    pub fn component_count(&self) -> usize {
        petgraph::algo::connected_components(&self.to_digraph())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use stencil_core::{
        connection::ConnectionRecord,
        shape::{AreaGeometry, LineGeometry, LineLinks, Shape, ShapeInfo},
    };

    use super::*;

    fn info(text: Option<&str>) -> ShapeInfo {
        ShapeInfo {
            text: text.map(str::to_string),
            ..Default::default()
        }
    }

    fn area(id: &str, text: Option<&str>) -> Shape {
        Shape::Area(AreaShape::new(
            id,
            info(text),
            AreaGeometry {
                pin_x: Some(1.0),
                pin_y: Some(2.0),
                ..Default::default()
            },
        ))
    }

    fn line(id: &str, text: Option<&str>, targets: &[&str], links: LineLinks) -> Shape {
        let connections = targets
            .iter()
            .map(|target| Rc::new(ConnectionRecord::new(id, *target, None, None)))
            .collect();
        Shape::Line(
            LineShape::new(id, info(text), LineGeometry::default()).with_links(LineLinks {
                connections,
                ..links
            }),
        )
    }

    fn registry(shapes: Vec<Shape>) -> ShapeRegistry {
        let mut registry = ShapeRegistry::new();
        for shape in shapes {
            registry.insert(shape);
        }
        registry
    }

    #[test]
    fn test_two_connections_make_a_directed_edge() {
        let graph = Graph::build(&registry(vec![
            area("a1", Some("A")),
            area("b1", Some("B")),
            line("c1", Some("flows"), &["a1", "b1"], LineLinks::default()),
        ]));

        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.edges().len(), 1);
        let edge = &graph.edges()[0];
        assert_eq!(edge.from_node_id(), Some("a1"));
        assert_eq!(edge.to_node_id(), Some("b1"));
        assert_eq!(edge.from_node_text(), Some("A"));
        assert_eq!(edge.to_node_text(), Some("B"));
    }

    #[test]
    fn test_single_connection_leaves_destination_unset() {
        let graph = Graph::build(&registry(vec![
            area("a1", Some("A")),
            line("c1", Some("flows"), &["a1"], LineLinks::default()),
        ]));

        let edge = &graph.edges()[0];
        assert_eq!(edge.from_node_id(), Some("a1"));
        assert_eq!(edge.to_node_id(), None);
    }

    #[test]
    fn test_single_connection_with_legacy_end() {
        let links = LineLinks {
            end_connected_to: Some("b1".into()),
            ..Default::default()
        };
        let graph = Graph::build(&registry(vec![line("c1", Some("flows"), &["a1"], links)]));

        let edge = &graph.edges()[0];
        assert_eq!(edge.from_node_id(), Some("a1"));
        assert_eq!(edge.to_node_id(), Some("b1"));
    }

    #[test]
    fn test_empty_targets_fall_back_to_legacy_fields() {
        let links = LineLinks {
            begin_connected_to: Some("x".into()),
            end_connected_to: Some("y".into()),
            ..Default::default()
        };
        let graph = Graph::build(&registry(vec![line("c1", Some("flows"), &[""], links)]));

        let edge = &graph.edges()[0];
        assert_eq!(edge.from_node_id(), Some("x"));
        assert_eq!(edge.to_node_id(), Some("y"));
    }

    #[test]
    fn test_middle_connections_are_ignored() {
        let graph = Graph::build(&registry(vec![line(
            "c1",
            Some("flows"),
            &["a", "b", "c"],
            LineLinks::default(),
        )]));

        let edge = &graph.edges()[0];
        assert_eq!(edge.from_node_id(), Some("a"));
        assert_eq!(edge.to_node_id(), Some("c"));
    }

    #[test]
    fn test_text_filters() {
        let graph = Graph::build(&registry(vec![
            area("a1", Some("A")),
            area("b1", None),
            area("d1", Some("   ")),
            line("c1", None, &["a1", "b1"], LineLinks::default()),
            line("c2", Some("kept"), &["a1", "b1"], LineLinks::default()),
            line("c3", Some("unconnected"), &[], LineLinks::default()),
        ]));

        let node_ids: Vec<_> = graph.nodes().iter().map(Node::id).collect();
        assert_eq!(node_ids, vec!["a1"]);
        let edge_ids: Vec<_> = graph.edges().iter().map(Edge::id).collect();
        assert_eq!(edge_ids, vec!["c2"]);
    }

    #[test]
    fn test_dangling_edges_are_kept() {
        let graph = Graph::build(&registry(vec![
            area("a1", Some("A")),
            area("b1", None),
            line("c1", Some("flows"), &["a1", "b1"], LineLinks::default()),
        ]));

        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edges()[0].to_node_id(), Some("b1"));
        assert_eq!(graph.edges()[0].to_node_text(), None);
        assert!(graph.node("b1").is_none());
        assert_eq!(graph.dangling_edges().count(), 1);
    }

    #[test]
    fn test_digraph_view_skips_dangling_edges() {
        let graph = Graph::build(&registry(vec![
            area("a1", Some("A")),
            area("b1", Some("B")),
            area("z1", Some("Z")),
            line("c1", Some("flows"), &["a1", "b1"], LineLinks::default()),
            line("c2", Some("lost"), &["a1", "missing"], LineLinks::default()),
        ]));

        let digraph = graph.to_digraph();
        assert_eq!(digraph.node_count(), 3);
        assert_eq!(digraph.edge_count(), 1);
        assert_eq!(graph.component_count(), 2);
    }

    #[test]
    fn test_serialization_field_names() {
        let graph = Graph::build(&registry(vec![
            area("a1", Some("A")),
            line("c1", Some("flows"), &["a1"], LineLinks::default()),
        ]));
        let json = serde_json::to_value(&graph).unwrap();

        assert_eq!(json["Nodes"][0]["ID"], "a1");
        assert_eq!(json["Nodes"][0]["PinX"], 1.0);
        assert_eq!(json["Edges"][0]["FromNodeID"], "a1");
        assert!(json["Edges"][0].get("ToNodeID").is_none());
    }
}
