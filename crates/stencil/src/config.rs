//! Configuration types for Stencil drawing processing.
//!
//! This module provides configuration structures that control which input
//! files are picked up and how the output documents are written. All types
//! implement [`serde::Deserialize`] for flexible loading from external
//! sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration combining input and output settings.
//! - [`InputConfig`] - Controls which files are enumerated from an input directory.
//! - [`OutputConfig`] - Controls JSON formatting and optional output content.
//!
//! # Example
//!
//! ```
//! # use stencil::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert_eq!(config.input().extension(), "vsdx");
//! assert!(config.output().pretty());
//! ```

use serde::Deserialize;

/// Top-level application configuration combining input and output settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Input configuration section.
    #[serde(default)]
    input: InputConfig,

    /// Output configuration section.
    #[serde(default)]
    output: OutputConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified input and output configurations.
    ///
    /// # Arguments
    ///
    /// * `input` - Input file selection settings.
    /// * `output` - Output document settings.
    pub fn new(input: InputConfig, output: OutputConfig) -> Self {
        Self { input, output }
    }

    /// Returns the input configuration.
    pub fn input(&self) -> &InputConfig {
        &self.input
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }
}

/// Input file selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// File extension, without the dot, of packages picked up from a directory.
    extension: String,
}

impl InputConfig {
    /// Creates a new [`InputConfig`] selecting files with the given extension.
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Returns the package file extension, without the dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self::new("vsdx")
    }
}

/// Output document settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Indent the JSON documents.
    pretty: bool,

    /// Write the graph document next to the shape catalogue.
    graph: bool,

    /// Emit the deprecated `ConnectionPoints` string on line shapes.
    legacy_connection_points: bool,
}

impl OutputConfig {
    /// Creates a new [`OutputConfig`].
    ///
    /// # Arguments
    ///
    /// * `pretty` - Indent the JSON documents.
    /// * `graph` - Write the graph document.
    /// * `legacy_connection_points` - Emit the deprecated `ConnectionPoints` string.
    pub fn new(pretty: bool, graph: bool, legacy_connection_points: bool) -> Self {
        Self {
            pretty,
            graph,
            legacy_connection_points,
        }
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }

    pub fn graph(&self) -> bool {
        self.graph
    }

    pub fn legacy_connection_points(&self) -> bool {
        self.legacy_connection_points
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new(true, true, false)
    }
}
