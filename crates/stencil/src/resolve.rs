//! Connection resolution.
//!
//! Connections are declared per page, independently of the shapes they
//! link, and may span pages. Resolution runs in three steps:
//!
//! 1. [`ConnectionIndex::from_pages`] collects every declaration with both
//!    endpoints into an immutable adjacency index keyed by source sheet.
//! 2. [`attach`] produces a new [`LineShape`] carrying its records and the
//!    legacy begin/end fields derived from role codes.
//!    [`apply_connect_cells`] fills ends still unset from the shape's flat
//!    `BeginConnect`/`EndConnect` cells.
//! 3. [`resolve_names`], run once the registry is complete, fills in the
//!    endpoint labels and shares each record with the area it lands on.

use std::rc::Rc;

use indexmap::IndexMap;
use log::trace;
use thiserror::Error;

use stencil_core::{
    cell::{Cell, Row},
    connection::{
        CONNECTS_SECTION, ConnectDeclaration, ConnectionPoint, ConnectionRecord, EndpointRole,
    },
    raw::RawShape,
    shape::{AreaShape, LineLinks, LineShape},
};
use stencil_parser::ParsedPage;

use crate::registry::ShapeRegistry;

/// Name of the section listing a shape's connection points.
const CONNECTION_SECTION: &str = "Connection";

/// Flat cells naming the shape the begin of a connector is glued to.
const BEGIN_CONNECT_CELLS: [&str; 2] = ["BeginConnect", "BeginConnectTo"];

/// Flat cells naming the shape the end of a connector is glued to.
const END_CONNECT_CELLS: [&str; 2] = ["EndConnect", "EndConnectTo"];

/// Failure to derive the connection state of a single shape.
///
/// Never aborts processing: the caller logs it and leaves the shape's
/// connection fields unset.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("connection {record} does not start at shape {shape}")]
    ForeignRecord { shape: String, record: String },
}

/// Options for [`attach`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Also fill in the deprecated `ConnectionPoints` string.
    pub legacy_connection_points: bool,
}

/// Raw shapes of a package keyed by id, used to look up connection targets.
pub type RawShapes<'a> = IndexMap<&'a str, &'a RawShape>;

/// Indexes every raw shape with an id across all pages; later pages win.
pub fn raw_shapes(pages: &[ParsedPage]) -> RawShapes<'_> {
    pages
        .iter()
        .flat_map(ParsedPage::all_shapes)
        .filter_map(|shape| Some((shape.id()?, shape)))
        .collect()
}

/// Adjacency index from source sheet to its connection records.
#[derive(Debug, Clone, Default)]
pub struct ConnectionIndex {
    by_source: IndexMap<String, Vec<ConnectionRecord>>,
}

impl ConnectionIndex {
    /// Collects connection declarations into an index.
    ///
    /// Declarations with an empty endpoint on either side are skipped.
    /// Records keep declaration order per source sheet.
    pub fn collect<'a>(declarations: impl IntoIterator<Item = &'a ConnectDeclaration>) -> Self {
        let mut by_source: IndexMap<String, Vec<ConnectionRecord>> = IndexMap::new();
        for record in declarations
            .into_iter()
            .filter_map(ConnectionRecord::from_declaration)
        {
            by_source
                .entry(record.from_sheet().to_string())
                .or_default()
                .push(record);
        }
        Self { by_source }
    }

    /// Collects the declarations of every page, in page order.
    pub fn from_pages(pages: &[ParsedPage]) -> Self {
        Self::collect(pages.iter().flat_map(ParsedPage::connects))
    }

    /// Returns the records declared for the given source sheet.
    pub fn records(&self, source: &str) -> &[ConnectionRecord] {
        self.by_source
            .get(source)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns `true` when records were declared for the given source sheet.
    pub fn contains(&self, source: &str) -> bool {
        self.by_source.contains_key(source)
    }

    /// Returns the number of distinct source sheets.
    pub fn len(&self) -> usize {
        self.by_source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }

    /// Returns the total number of records.
    pub fn records_count(&self) -> usize {
        self.by_source.values().map(Vec::len).sum()
    }
}

/// Attaches connection records to a line shape.
///
/// Every record lands in the structured list, in declaration order. Records
/// whose role code designates the begin (3, 9) or end (6, 12) of the
/// connector also set the legacy `begin_connected_to`/`from_part` or
/// `end_connected_to`/`to_part` fields; a later record overrides an earlier
/// one for the same end.
///
/// # Errors
///
/// Returns [`ResolveError::ForeignRecord`] when a record does not start at
/// this shape.
pub fn attach(
    line: LineShape,
    records: &[ConnectionRecord],
    raw_shapes: &RawShapes,
    options: ResolveOptions,
) -> Result<LineShape, ResolveError> {
    let mut links = LineLinks::default();

    for record in records {
        if record.from_sheet() != line.id() {
            return Err(ResolveError::ForeignRecord {
                shape: line.id().to_string(),
                record: record.id().to_string(),
            });
        }

        let point = raw_shapes
            .get(record.to_sheet())
            .zip(record.to_cell())
            .and_then(|(target, to_cell)| connection_point(target, to_cell))
            .unwrap_or_default();

        match record.role() {
            EndpointRole::Begin => {
                links.begin_connected_to = Some(record.to_sheet().to_string());
                links.from_part = record.from_part().map(str::to_string);
            }
            EndpointRole::End => {
                links.end_connected_to = Some(record.to_sheet().to_string());
                links.to_part = record.from_part().map(str::to_string);
            }
            EndpointRole::Other => {
                trace!(record = record.id(), from_part = record.from_part(); "Role code marks neither end");
            }
        }

        links
            .connections
            .push(Rc::new(record.clone().with_point(point)));
    }

    if options.legacy_connection_points && !links.connections.is_empty() {
        let encoded: Vec<String> = links
            .connections
            .iter()
            .map(|record| record.legacy_encoding())
            .collect();
        links.connection_points = Some(encoded.join("|"));
    }

    Ok(line.with_links(links))
}

/// Fills unset legacy endpoints from the connector's flat connect cells.
///
/// Only applies when the raw shape has no `Connects` section. The first cell
/// named `BeginConnect` or `BeginConnectTo` gives `begin_connected_to`, and
/// likewise for the end; empty values are ignored. Endpoints already set by
/// connection records are kept.
pub fn apply_connect_cells(line: LineShape, raw: &RawShape) -> LineShape {
    if raw.sections_named(CONNECTS_SECTION).next().is_some() {
        return line;
    }

    let target = |names: &[&str]| {
        raw.cells()
            .iter()
            .find(|cell| {
                cell.name()
                    .is_some_and(|name| names.iter().any(|candidate| *candidate == name))
            })
            .and_then(Cell::value)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };
    let begin = target(&BEGIN_CONNECT_CELLS);
    let end = target(&END_CONNECT_CELLS);
    if begin.is_none() && end.is_none() {
        return line;
    }

    let mut links = line.links().clone();
    if links.begin_connected_to.is_none() {
        links.begin_connected_to = begin;
    }
    if links.end_connected_to.is_none() {
        links.end_connected_to = end;
    }
    trace!(id = line.id(); "Connect cells applied");
    line.with_links(links)
}

/// Resolves endpoint names and incoming connections over a complete registry.
///
/// For every line:
/// - `begin_connected_name`/`end_connected_name` are set to the label of the
///   area the legacy endpoint refers to;
/// - each record is replaced by a copy with `from_shape_name`/`to_shape_name`
///   set from the areas its sheets refer to.
///
/// Each record landing on an area is shared, not copied, into that area's
/// incoming connections. References to unknown shapes stay unresolved.
pub fn resolve_names(registry: ShapeRegistry) -> ShapeRegistry {
    let (lines, areas) = registry.into_parts();
    let label = |id: Option<&str>| id.and_then(|id| areas.get(id)).and_then(|area| area.info().label());

    let mut incoming: IndexMap<String, Vec<Rc<ConnectionRecord>>> = IndexMap::new();
    let lines: IndexMap<String, LineShape> = lines
        .into_iter()
        .map(|(id, line)| {
            let mut links = line.links().clone();
            links.begin_connected_name = label(links.begin_connected_to.as_deref());
            links.end_connected_name = label(links.end_connected_to.as_deref());
            links.connections = links
                .connections
                .iter()
                .map(|record| {
                    let named = Rc::new(ConnectionRecord::clone(record).with_names(
                        label(Some(record.from_sheet())),
                        label(Some(record.to_sheet())),
                    ));
                    if areas.contains_key(named.to_sheet()) {
                        incoming
                            .entry(named.to_sheet().to_string())
                            .or_default()
                            .push(Rc::clone(&named));
                    }
                    named
                })
                .collect();
            (id, line.with_links(links))
        })
        .collect();

    let areas: IndexMap<String, AreaShape> = areas
        .into_iter()
        .map(|(id, area)| {
            let records = incoming.shift_remove(&id).unwrap_or_default();
            (id, area.with_incoming(records))
        })
        .collect();

    ShapeRegistry::from_parts(lines, areas)
}

/// Where a target cell reference points within the connection section.
#[derive(Debug, Clone, Copy)]
enum RowRef<'a> {
    Index(usize),
    Name(&'a str),
}

/// Parses `Connections.X<n>` (row `n - 1`) or `Connections.<Row>.X`.
fn parse_row_ref(to_cell: &str) -> Option<RowRef<'_>> {
    let rest = to_cell.strip_prefix("Connections.")?;
    if let Some((name, _)) = rest.split_once('.') {
        return Some(RowRef::Name(name));
    }
    let number: usize = rest
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .ok()?;
    number.checked_sub(1).map(RowRef::Index)
}

/// Looks up the connection point a target cell reference designates.
fn connection_point(target: &RawShape, to_cell: &str) -> Option<ConnectionPoint> {
    let row_ref = parse_row_ref(to_cell)?;
    let matches = |row: &&Row| match row_ref {
        RowRef::Index(index) => row.ix().and_then(|ix| ix.trim().parse::<usize>().ok()) == Some(index),
        RowRef::Name(name) => row.name() == Some(name),
    };

    let row = target
        .sections_named(CONNECTION_SECTION)
        .flat_map(|section| section.rows())
        .find(matches)?;
    let number = |name: &str| row.cell(name).and_then(Cell::number);

    Some(ConnectionPoint {
        x: number("X"),
        y: number("Y"),
        dir_x: number("DirX"),
        dir_y: number("DirY"),
    })
}

#[cfg(test)]
mod tests {
    use stencil_core::{
        cell::Section,
        shape::{AreaGeometry, LineGeometry, Shape, ShapeInfo},
    };

    use super::*;

    fn declaration(from: &str, to: &str, from_part: &str) -> ConnectDeclaration {
        ConnectDeclaration {
            from_sheet: Some(from.to_string()),
            to_sheet: Some(to.to_string()),
            from_part: Some(from_part.to_string()),
            ..Default::default()
        }
    }

    fn line(id: &str) -> LineShape {
        LineShape::new(id, ShapeInfo::default(), LineGeometry::default())
    }

    fn area(id: &str, name: &str, text: Option<&str>) -> AreaShape {
        AreaShape::new(
            id,
            ShapeInfo {
                name: Some(name.to_string()),
                text: text.map(str::to_string),
                ..Default::default()
            },
            AreaGeometry::default(),
        )
    }

    #[test]
    fn test_index_skips_empty_endpoints() {
        let declarations = vec![
            declaration("3", "1", "9"),
            declaration("3", "", "12"),
            declaration("", "1", "9"),
            declaration("4", "2", "9"),
        ];
        let index = ConnectionIndex::collect(&declarations);

        assert_eq!(index.len(), 2);
        assert_eq!(index.records_count(), 2);
        assert_eq!(index.records("3").len(), 1);
        assert!(index.contains("4"));
        assert!(index.records("1").is_empty());
    }

    #[test]
    fn test_attach_sets_structured_and_legacy_fields() {
        let declarations = vec![
            declaration("3", "1", "9"),
            declaration("3", "2", "12"),
            declaration("3", "5", "4"),
        ];
        let index = ConnectionIndex::collect(&declarations);

        let attached = attach(line("3"), index.records("3"), &RawShapes::new(), ResolveOptions::default())
            .expect("records start at the shape");
        let links = attached.links();

        assert_eq!(links.connections.len(), 3);
        assert_eq!(links.begin_connected_to.as_deref(), Some("1"));
        assert_eq!(links.from_part.as_deref(), Some("9"));
        assert_eq!(links.end_connected_to.as_deref(), Some("2"));
        assert_eq!(links.to_part.as_deref(), Some("12"));
        assert_eq!(links.connection_points, None);
    }

    #[test]
    fn test_attach_other_role_only_adds_record() {
        let declarations = vec![declaration("3", "1", "7")];
        let index = ConnectionIndex::collect(&declarations);

        let attached = attach(line("3"), index.records("3"), &RawShapes::new(), ResolveOptions::default())
            .unwrap();

        assert_eq!(attached.connections().len(), 1);
        assert_eq!(attached.links().begin_connected_to, None);
        assert_eq!(attached.links().end_connected_to, None);
    }

    #[test]
    fn test_attach_rejects_foreign_records() {
        let declarations = vec![declaration("8", "1", "9")];
        let index = ConnectionIndex::collect(&declarations);

        let result = attach(line("3"), index.records("8"), &RawShapes::new(), ResolveOptions::default());
        assert!(matches!(
            result,
            Err(ResolveError::ForeignRecord { ref shape, ref record }) if shape == "3" && record == "8-1"
        ));
    }

    #[test]
    fn test_attach_legacy_connection_points() {
        let declarations = vec![declaration("3", "1", "9"), declaration("3", "2", "12")];
        let index = ConnectionIndex::collect(&declarations);
        let options = ResolveOptions {
            legacy_connection_points: true,
        };

        let attached = attach(line("3"), index.records("3"), &RawShapes::new(), options).unwrap();
        assert_eq!(
            attached.links().connection_points.as_deref(),
            Some("FromSheet:3;ToSheet:1;FromPart:9|FromSheet:3;ToSheet:2;FromPart:12")
        );
    }

    #[test]
    fn test_attach_fills_connection_point_geometry() {
        let target = RawShape::new(Some("1".into()), "Page-1").with_section(Section::new(
            Some(CONNECTION_SECTION.to_string()),
            vec![
                Row::new(Some("0".into()), None, vec![Cell::named("X", "0"), Cell::named("Y", "0.5")]),
                Row::new(
                    Some("1".into()),
                    Some("Right".into()),
                    vec![
                        Cell::named("X", "1"),
                        Cell::named("Y", "0.25"),
                        Cell::named("DirX", "-1"),
                        Cell::named("DirY", "0"),
                    ],
                ),
            ],
        ));
        let raw_shapes: RawShapes = [("1", &target)].into_iter().collect();

        let by_index = ConnectDeclaration {
            to_cell: Some("Connections.X2".into()),
            ..declaration("3", "1", "9")
        };
        let by_name = ConnectDeclaration {
            to_cell: Some("Connections.Right.X".into()),
            ..declaration("4", "1", "9")
        };
        let unknown = ConnectDeclaration {
            to_cell: Some("PinX".into()),
            ..declaration("5", "1", "9")
        };
        let index = ConnectionIndex::collect([&by_index, &by_name, &unknown]);

        let first = attach(line("3"), index.records("3"), &raw_shapes, ResolveOptions::default()).unwrap();
        let point = first.connections()[0].point();
        assert_eq!(point.x, Some(1.0));
        assert_eq!(point.y, Some(0.25));
        assert_eq!(point.dir_x, Some(-1.0));
        assert_eq!(point.dir_y, Some(0.0));

        let second = attach(line("4"), index.records("4"), &raw_shapes, ResolveOptions::default()).unwrap();
        assert_eq!(second.connections()[0].point(), point);

        let third = attach(line("5"), index.records("5"), &raw_shapes, ResolveOptions::default()).unwrap();
        assert_eq!(third.connections()[0].point(), ConnectionPoint::default());
    }

    #[test]
    fn test_connect_cells_fill_unset_ends() {
        let raw = RawShape::new(Some("4".into()), "Page-1")
            .with_cell(Cell::named("BeginConnectTo", "1"))
            .with_cell(Cell::named("EndConnect", " "));

        let applied = apply_connect_cells(line("4"), &raw);
        assert_eq!(applied.links().begin_connected_to.as_deref(), Some("1"));
        assert_eq!(applied.links().end_connected_to, None);
        assert!(applied.connections().is_empty());
    }

    #[test]
    fn test_connect_cells_keep_record_endpoints() {
        let declarations = vec![declaration("4", "2", "9")];
        let index = ConnectionIndex::collect(&declarations);
        let attached = attach(line("4"), index.records("4"), &RawShapes::new(), ResolveOptions::default())
            .unwrap();
        let raw = RawShape::new(Some("4".into()), "Page-1")
            .with_cell(Cell::named("BeginConnect", "1"))
            .with_cell(Cell::named("EndConnectTo", "5"));

        let applied = apply_connect_cells(attached, &raw);
        assert_eq!(applied.links().begin_connected_to.as_deref(), Some("2"));
        assert_eq!(applied.links().end_connected_to.as_deref(), Some("5"));
    }

    #[test]
    fn test_connect_cells_ignored_with_connects_section() {
        let raw = RawShape::new(Some("4".into()), "Page-1")
            .with_cell(Cell::named("BeginConnectTo", "1"))
            .with_section(Section::new(Some(CONNECTS_SECTION.to_string()), Vec::new()));

        let applied = apply_connect_cells(line("4"), &raw);
        assert_eq!(applied.links(), &LineLinks::default());
    }

    #[test]
    fn test_parse_row_ref() {
        assert!(matches!(parse_row_ref("Connections.X1"), Some(RowRef::Index(0))));
        assert!(matches!(parse_row_ref("Connections.Y12"), Some(RowRef::Index(11))));
        assert!(matches!(parse_row_ref("Connections.Top.X"), Some(RowRef::Name("Top"))));
        assert!(parse_row_ref("Connections.X0").is_none());
        assert!(parse_row_ref("PinX").is_none());
    }

    #[test]
    fn test_resolve_names_and_incoming() {
        let declarations = vec![
            declaration("3", "1", "9"),
            declaration("3", "2", "12"),
            declaration("3", "99", "5"),
        ];
        let index = ConnectionIndex::collect(&declarations);
        let attached = attach(line("3"), index.records("3"), &RawShapes::new(), ResolveOptions::default())
            .unwrap();

        let mut registry = ShapeRegistry::new();
        registry.insert(Shape::Area(area("1", "Start", Some("Begin here"))));
        registry.insert(Shape::Area(area("2", "Stop", None)));
        registry.insert(Shape::Line(attached));

        let registry = resolve_names(registry);
        let line = registry.line("3").unwrap();

        assert_eq!(line.links().begin_connected_name.as_deref(), Some("Start (Begin here)"));
        assert_eq!(line.links().end_connected_name.as_deref(), Some("Stop"));

        let records = line.connections();
        assert_eq!(records[0].to_shape_name(), Some("Start (Begin here)"));
        assert_eq!(records[0].from_shape_name(), None);
        assert_eq!(records[1].to_shape_name(), Some("Stop"));
        assert_eq!(records[2].to_shape_name(), None);

        let start_incoming = registry.area("1").unwrap().incoming().unwrap();
        assert_eq!(start_incoming.len(), 1);
        assert!(Rc::ptr_eq(&start_incoming[0], &records[0]));

        let stop_incoming = registry.area("2").unwrap().incoming().unwrap();
        assert!(Rc::ptr_eq(&stop_incoming[0], &records[1]));
    }

    #[test]
    fn test_resolve_names_labels_unnamed_target_by_text() {
        let declarations = vec![declaration("3", "1", "9")];
        let index = ConnectionIndex::collect(&declarations);
        let attached = attach(line("3"), index.records("3"), &RawShapes::new(), ResolveOptions::default())
            .unwrap();
        let unnamed = AreaShape::new(
            "1",
            ShapeInfo {
                text: Some("Server".to_string()),
                ..Default::default()
            },
            AreaGeometry::default(),
        );

        let mut registry = ShapeRegistry::new();
        registry.insert(Shape::Area(unnamed));
        registry.insert(Shape::Line(attached));

        let registry = resolve_names(registry);
        let line = registry.line("3").unwrap();
        assert_eq!(line.links().begin_connected_name.as_deref(), Some("Server"));
        assert_eq!(line.connections()[0].to_shape_name(), Some("Server"));
    }

    #[test]
    fn test_resolve_names_without_connections_leaves_incoming_unset() {
        let mut registry = ShapeRegistry::new();
        registry.insert(Shape::Area(area("1", "Lonely", None)));
        registry.insert(Shape::Line(line("2")));

        let registry = resolve_names(registry);
        assert!(registry.area("1").unwrap().incoming().is_none());
        assert_eq!(registry.line("2").unwrap().links(), &LineLinks::default());
    }
}
