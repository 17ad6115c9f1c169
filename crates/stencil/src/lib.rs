//! Stencil - shape catalogues and connection graphs from drawing packages.
//!
//! Reads the page documents of a drawing package, classifies every shape as a
//! line ("1D") or an area ("2D"), resolves the package's connection
//! declarations across pages and derives two documents per input file: a
//! shape catalogue and a node/edge graph.

pub mod catalogue;
pub mod classify;
pub mod config;
pub mod graph;
pub mod registry;
pub mod resolve;

mod error;
mod export;

pub use stencil_core::{cell, connection, raw, shape};
pub use stencil_parser::{Package, ParseError, ParsedPage};

pub use error::StencilError;

use std::path::Path;

use log::{debug, info, trace, warn};

use stencil_core::shape::Shape;

use catalogue::ShapeCatalogue;
use config::AppConfig;
use graph::Graph;
use registry::ShapeRegistry;
use resolve::{ConnectionIndex, ResolveOptions};

/// The documents derived from one input file.
#[derive(Debug, Clone)]
pub struct Drawing {
    catalogue: ShapeCatalogue,
    graph: Graph,
    registry: ShapeRegistry,
}

impl Drawing {
    pub fn catalogue(&self) -> &ShapeCatalogue {
        &self.catalogue
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The resolved registry both documents were derived from.
    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }
}

/// Pipeline for turning drawing packages into catalogues and graphs.
///
/// Every call builds its own registry, so a processor can be reused across
/// files without any state carrying over.
///
/// # Examples
///
/// ```rust
/// use stencil::{DrawingProcessor, Package, config::AppConfig};
///
/// let package = Package::from_parts([(
///     "visio/pages/page1.xml",
///     r#"<PageContents><Shapes><Shape ID="1"><Text>Start</Text></Shape></Shapes></PageContents>"#,
/// )]);
///
/// let processor = DrawingProcessor::new(AppConfig::default());
/// let drawing = processor
///     .process_package("start", &package)
///     .expect("Failed to process");
///
/// assert_eq!(drawing.graph().nodes().len(), 1);
///
/// let json = processor
///     .render_graph(&drawing)
///     .expect("Failed to render");
/// assert!(json.contains("\"Start\""));
/// ```
#[derive(Debug, Default)]
pub struct DrawingProcessor {
    config: AppConfig,
}

impl DrawingProcessor {
    /// Create a new processor with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Read and process a package file.
    ///
    /// The catalogue is named after the file stem.
    ///
    /// # Errors
    ///
    /// Returns `StencilError` when the file cannot be read, is not a valid
    /// package, or contains a malformed page document.
    pub fn process_file(&self, path: impl AsRef<Path>) -> Result<Drawing, StencilError> {
        let path = path.as_ref();
        info!(path:? = path; "Processing drawing");

        let filename = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let package = Package::open(path)?;
        self.process_package(filename, &package)
    }

    /// Parse and process an already opened package.
    ///
    /// # Errors
    ///
    /// Returns `StencilError::Parse` for a malformed page document.
    pub fn process_package(
        &self,
        filename: impl Into<String>,
        package: &Package,
    ) -> Result<Drawing, StencilError> {
        let pages = stencil_parser::parse_package(package)?;
        info!(pages = pages.len(); "Package parsed");
        Ok(self.process_pages(filename, &pages))
    }

    /// Run the classification, resolution and graph stages over parsed pages.
    ///
    /// This stage never fails: per-shape resolution problems are logged and
    /// leave that shape's connection fields unset.
    pub fn process_pages(&self, filename: impl Into<String>, pages: &[ParsedPage]) -> Drawing {
        let index = ConnectionIndex::from_pages(pages);
        let raw_shapes = resolve::raw_shapes(pages);
        let options = ResolveOptions {
            legacy_connection_points: self.config.output().legacy_connection_points(),
        };
        debug!(
            sources = index.len(),
            records = index.records_count();
            "Connection index built"
        );

        let mut registry = ShapeRegistry::new();
        for raw in pages.iter().flat_map(ParsedPage::all_shapes) {
            let Some(shape) = classify::classify(raw) else {
                debug!(page = raw.page_name(), depth = raw.depth(); "Skipping shape without id");
                continue;
            };
            trace!(id = shape.id(), line = shape.is_line(), depth = raw.depth(); "Shape classified");

            let shape = match shape {
                Shape::Line(line) => {
                    let records = index.records(line.id());
                    let line = if records.is_empty() {
                        line
                    } else {
                        match resolve::attach(line.clone(), records, &raw_shapes, options) {
                            Ok(attached) => attached,
                            Err(err) => {
                                warn!(id = line.id(), err:%; "Failed to resolve connections");
                                line
                            }
                        }
                    };
                    Shape::Line(resolve::apply_connect_cells(line, raw))
                }
                Shape::Area(area) => {
                    if index.contains(area.id()) {
                        debug!(id = area.id(); "Ignoring connections declared by an area shape");
                    }
                    Shape::Area(area)
                }
            };
            registry.insert(shape);
        }

        let registry = resolve::resolve_names(registry);
        info!(
            lines = registry.lines_count(),
            areas = registry.areas_count();
            "Shapes registered"
        );

        let catalogue = ShapeCatalogue::from_registry(filename, &registry);
        let graph = Graph::build(&registry);
        info!(
            nodes = graph.nodes().len(),
            edges = graph.edges().len();
            "Graph derived"
        );

        Drawing {
            catalogue,
            graph,
            registry,
        }
    }

    /// Render the shape catalogue of a drawing as JSON.
    ///
    /// # Errors
    ///
    /// Returns `StencilError::Export` when serialization fails.
    pub fn render_catalogue(&self, drawing: &Drawing) -> Result<String, StencilError> {
        export::render_json(drawing.catalogue(), self.config.output().pretty())
    }

    /// Render the graph of a drawing as JSON.
    ///
    /// # Errors
    ///
    /// Returns `StencilError::Export` when serialization fails.
    pub fn render_graph(&self, drawing: &Drawing) -> Result<String, StencilError> {
        export::render_json(drawing.graph(), self.config.output().pretty())
    }
}
