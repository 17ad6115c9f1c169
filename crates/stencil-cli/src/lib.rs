//! CLI logic for the Stencil drawing extractor.
//!
//! This module contains the core CLI logic: input enumeration, running each
//! package through the [`DrawingProcessor`] pipeline and writing the output
//! documents.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use stencil::{DrawingProcessor, StencilError, config::AppConfig};

/// Outcome of a run over one or more input files.
#[derive(Debug, Default)]
pub struct Summary {
    written: Vec<PathBuf>,
    failed: Vec<(PathBuf, StencilError)>,
}

impl Summary {
    /// Output documents written, in processing order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Input files that could not be processed, with their error.
    pub fn failed(&self) -> &[(PathBuf, StencilError)] {
        &self.failed
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run the Stencil CLI application
///
/// Every input package is processed independently: a failure is recorded in
/// the returned [`Summary`] and the remaining files are still processed.
///
/// # Errors
///
/// Returns `StencilError` when the configuration cannot be loaded or the
/// input path cannot be read.
pub fn run(args: &Args) -> Result<Summary, StencilError> {
    info!(
        input_path = args.input,
        output_dir = args.output_dir;
        "Processing drawings"
    );

    let app_config = config::load_config(args.config.as_ref(), Path::new(&args.input))?;
    let inputs = collect_inputs(Path::new(&args.input), &app_config)?;
    info!(count = inputs.len(); "Input files collected");

    let processor = DrawingProcessor::new(app_config);
    let output_dir = Path::new(&args.output_dir);

    let mut summary = Summary::default();
    for input in inputs {
        match process_one(&processor, &input, output_dir) {
            Ok(written) => summary.written.extend(written),
            Err(err) => {
                warn!(path:? = input, err:%; "Failed to process drawing");
                summary.failed.push((input, err));
            }
        }
    }

    info!(
        written = summary.written.len(),
        failed = summary.failed.len();
        "Run finished"
    );
    Ok(summary)
}

/// Lists the packages to process.
///
/// A directory yields every file with the configured extension, sorted by
/// name. Any other existing path is taken as a single package.
fn collect_inputs(input: &Path, config: &AppConfig) -> Result<Vec<PathBuf>, StencilError> {
    if !input.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("input path {} does not exist", input.display()),
        )
        .into());
    }
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    let extension = config.input().extension().trim_start_matches('.');
    let mut files = Vec::new();
    for entry in fs::read_dir(input)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if path.is_file() && matches {
            files.push(path);
        } else {
            debug!(path:? = path; "Skipping non-package entry");
        }
    }

    files.sort();
    Ok(files)
}

/// Processes one package and writes its documents under
/// `<output_dir>/<stem>/`.
fn process_one(
    processor: &DrawingProcessor,
    input: &Path,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, StencilError> {
    let drawing = processor.process_file(input)?;
    let stem = drawing.catalogue().filename();

    let target_dir = output_dir.join(stem);
    fs::create_dir_all(&target_dir)?;

    let mut written = Vec::new();

    let catalogue_path = target_dir.join(format!("{stem}.json"));
    fs::write(&catalogue_path, processor.render_catalogue(&drawing)?)?;
    info!(output_file:? = catalogue_path; "Shape catalogue written");
    written.push(catalogue_path);

    if processor.config().output().graph() {
        let graph_path = target_dir.join(format!("{stem}.graph.json"));
        fs::write(&graph_path, processor.render_graph(&drawing)?)?;
        info!(
            output_file:? = graph_path,
            components = drawing.graph().component_count(),
            dangling_edges = drawing.graph().dangling_edges().count();
            "Graph written"
        );
        written.push(graph_path);
    }

    Ok(written)
}
