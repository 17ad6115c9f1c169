//! Shape tree extraction from a single page document.
//!
//! A page document holds a top-level `Shapes` container of `Shape`
//! elements. Each shape may carry:
//! - a `Text` child,
//! - any number of `Cell` children (`N`, `V`, `U`, `F` attributes),
//! - any number of `Section` children, each holding `Row`s of `Cell`s,
//! - a nested `Shapes` container with child shapes.
//!
//! Connection declarations live elsewhere in the page (typically a
//! `Connects` container) as elements carrying `FromSheet`/`ToSheet`
//! attributes; they are collected separately from the shape tree. Rows of a
//! shape's own `Connects` section are declarations too, sourced at that
//! shape unless the row names another `FromSheet`.
//!
//! Elements are matched by local name, so the markup namespace does not
//! matter.

use log::trace;
use roxmltree::{Document, Node};

use stencil_core::{
    cell::{Cell, Row, Section},
    connection::{CONNECTS_SECTION, ConnectDeclaration},
    raw::RawShape,
};

use crate::{error::ParseError, package::LocalName};

/// Page name used when nothing better is known.
pub const UNKNOWN_PAGE: &str = "Unknown";

/// Naming context of a page within its package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    declared_name: Option<String>,
    number: Option<usize>,
}

impl PageContext {
    /// Creates an empty context; pages parsed with it are named `Unknown`
    /// unless the markup itself names them.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name declared for the page in the package index.
    pub fn with_declared_name(mut self, name: Option<String>) -> Self {
        self.declared_name = name;
        self
    }

    /// Sets the 1-based page number within the package.
    pub fn with_number(mut self, number: Option<usize>) -> Self {
        self.number = number;
        self
    }

    /// Resolves the page name used when no enclosing `Page` element names
    /// the shape: declared name, then `Page<N>`, then `Unknown`.
    pub fn fallback_name(&self) -> String {
        match (&self.declared_name, self.number) {
            (Some(name), _) => name.clone(),
            (None, Some(number)) => format!("Page{number}"),
            (None, None) => UNKNOWN_PAGE.to_string(),
        }
    }
}

/// The parsed content of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    name: String,
    shapes: Vec<RawShape>,
    connects: Vec<ConnectDeclaration>,
}

impl ParsedPage {
    /// Returns the page name resolved from the package context.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the top-level shapes of the page.
    pub fn shapes(&self) -> &[RawShape] {
        &self.shapes
    }

    /// Returns every shape of the page, nested ones included, in pre-order.
    pub fn all_shapes(&self) -> impl Iterator<Item = &RawShape> {
        self.shapes.iter().flat_map(RawShape::preorder)
    }

    /// Returns the connection declarations of the page in document order.
    pub fn connects(&self) -> &[ConnectDeclaration] {
        &self.connects
    }
}

/// Parse a page document into its shape tree and connection declarations.
///
/// # Arguments
///
/// * `xml` - The page markup.
/// * `part` - The part name, used in error reports.
/// * `context` - Naming context of the page.
///
/// # Errors
///
/// Returns [`ParseError::Xml`] when the markup is not well-formed. Missing
/// containers, attributes or cells are never errors.
pub fn parse_page(xml: &str, part: &str, context: &PageContext) -> Result<ParsedPage, ParseError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let document =
        Document::parse(xml).map_err(|source| ParseError::new_xml_error(part, source, xml))?;
    let fallback = context.fallback_name();

    // The first container in document order is the top-level one; nested
    // containers always follow their enclosing shape.
    let shapes: Vec<RawShape> = document
        .descendants()
        .find(|node| node.has_tag_name_local("Shapes"))
        .map(|container| {
            child_elements(container, "Shape")
                .map(|node| parse_shape(node, 0, &fallback))
                .collect()
        })
        .unwrap_or_default();

    let mut connects: Vec<ConnectDeclaration> = document
        .descendants()
        .filter(|node| {
            node.is_element() && (node.has_attribute("FromSheet") || node.has_attribute("ToSheet"))
        })
        .map(parse_connect)
        .collect();

    // Shape-local rows often repeat a page-level declaration.
    for declaration in shapes.iter().flat_map(RawShape::preorder).flat_map(section_connects) {
        if !connects.contains(&declaration) {
            connects.push(declaration);
        }
    }

    Ok(ParsedPage {
        name: fallback,
        shapes,
        connects,
    })
}

fn parse_shape(node: Node, depth: usize, fallback_page: &str) -> RawShape {
    let mut shape = RawShape::new(attribute(node, "ID"), page_name(node, fallback_page))
        .with_name(attribute(node, "Name"))
        .with_dimension_type(attribute(node, "Type"))
        .with_master(attribute(node, "Master"))
        .with_text(text_content(node).as_deref())
        .with_depth(depth);

    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "Cell" => shape = shape.with_cell(parse_cell(child)),
            "Section" => shape = shape.with_section(parse_section(child)),
            _ => {}
        }
    }

    if let Some(container) = child_elements(node, "Shapes").next() {
        for child in child_elements(container, "Shape") {
            shape.push_child(parse_shape(child, depth + 1, fallback_page));
        }
    }

    trace!(
        id = shape.id(),
        depth,
        cells = shape.cells().len(),
        sections = shape.sections().len(),
        children = shape.children().len();
        "Parsed shape"
    );
    shape
}

fn parse_cell(node: Node) -> Cell {
    Cell::new(
        attribute(node, "N"),
        attribute(node, "V"),
        attribute(node, "U"),
        attribute(node, "F"),
    )
}

fn parse_section(node: Node) -> Section {
    let rows = child_elements(node, "Row")
        .map(|row| {
            Row::new(
                attribute(row, "IX"),
                attribute(row, "N"),
                child_elements(row, "Cell").map(parse_cell).collect(),
            )
        })
        .collect();
    Section::new(attribute(node, "N"), rows)
}

fn parse_connect(node: Node) -> ConnectDeclaration {
    ConnectDeclaration {
        from_sheet: attribute(node, "FromSheet"),
        to_sheet: attribute(node, "ToSheet"),
        from_part: attribute(node, "FromPart"),
        to_part: attribute(node, "ToPart"),
        from_cell: attribute(node, "FromCell"),
        to_cell: attribute(node, "ToCell"),
    }
}

/// Declarations listed in the shape's own `Connects` section rows.
fn section_connects(shape: &RawShape) -> impl Iterator<Item = ConnectDeclaration> + '_ {
    shape
        .sections_named(CONNECTS_SECTION)
        .flat_map(Section::rows)
        .map(move |row| {
            let value = |name: &str| row.cell(name).and_then(Cell::value).map(str::to_string);
            ConnectDeclaration {
                from_sheet: value("FromSheet").or_else(|| shape.id().map(str::to_string)),
                to_sheet: value("ToSheet"),
                from_part: value("FromPart"),
                to_part: value("ToPart"),
                from_cell: value("FromCell"),
                to_cell: value("ToCell"),
            }
        })
}

/// Nearest enclosing `Page` element name, or the context fallback.
fn page_name(node: Node, fallback: &str) -> String {
    node.ancestors()
        .find(|ancestor| ancestor.has_tag_name_local("Page"))
        .and_then(|page| page.attribute("Name"))
        .unwrap_or(fallback)
        .to_string()
}

/// Concatenated text of the `Text` child; inline markers contribute nothing.
fn text_content(node: Node) -> Option<String> {
    let text = child_elements(node, "Text").next()?;
    Some(
        text.descendants()
            .filter(Node::is_text)
            .filter_map(|node| node.text())
            .collect(),
    )
}

fn attribute(node: Node, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

fn child_elements<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.has_tag_name_local(name))
}
