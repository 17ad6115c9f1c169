//! Error adapter for converting StencilError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! Malformed page markup is rendered with a labelled snippet of the offending
//! part; every other error is rendered as a plain message with a code.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use stencil::StencilError;
use stencil_parser::ParseError;

/// Adapter for a markup error inside a page document.
///
/// This adapter wraps a [`ParseError::Xml`] and implements
/// [`MietteDiagnostic`] so the error position is shown in context.
pub struct MarkupAdapter<'a> {
    /// The wrapped error
    err: &'a ParseError,
    /// Markup of the part the error was raised for
    src: &'a str,
    /// Byte span of the error position
    span: SourceSpan,
}

impl<'a> MarkupAdapter<'a> {
    /// Create a new markup adapter.
    ///
    /// Returns `None` for errors that carry no markup or no usable position.
    pub fn new(err: &'a ParseError) -> Option<Self> {
        let ParseError::Xml { src, .. } = err else {
            return None;
        };
        let offset = err.xml_offset()?;
        let len = src
            .get(offset..)
            .and_then(|rest| rest.chars().next())
            .map_or(0, char::len_utf8);

        Some(Self {
            err,
            src: src.as_str(),
            span: SourceSpan::new(offset.into(), len),
        })
    }
}

impl fmt::Debug for MarkupAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkupAdapter")
            .field("err", &self.err)
            .field("span", &self.span)
            .finish()
    }
}

impl fmt::Display for MarkupAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.err, f)
    }
}

impl std::error::Error for MarkupAdapter<'_> {}

impl MietteDiagnostic for MarkupAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("stencil::xml"))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let ParseError::Xml { source, .. } = self.err else {
            return None;
        };
        let label = LabeledSpan::new_primary_with_span(Some(source.to_string()), self.span);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Adapter for [`StencilError`] variants without source information.
pub struct ErrorAdapter<'a>(pub &'a StencilError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            StencilError::Io(_) | StencilError::Parse(ParseError::Io(_)) => "stencil::io",
            StencilError::Parse(ParseError::Archive(_)) => "stencil::archive",
            StencilError::Parse(ParseError::Encoding { .. }) => "stencil::encoding",
            StencilError::Parse(ParseError::Xml { .. }) => "stencil::xml",
            StencilError::Export(_) => "stencil::export",
            StencilError::Config(_) => "stencil::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            StencilError::Parse(ParseError::Archive(_)) => Some(Box::new(
                "the input is expected to be a zip-based drawing package",
            ) as Box<dyn fmt::Display>),
            _ => None,
        }
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A markup error with its position in the page document.
    Markup(MarkupAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Markup(m) => fmt::Display::fmt(m, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Markup(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Markup(m) => m.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Markup(m) => m.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Markup(m) => m.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Markup(m) => m.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`StencilError`] into a reportable error.
pub fn to_reportable(err: &StencilError) -> Reportable<'_> {
    match err {
        StencilError::Parse(parse_err) => MarkupAdapter::new(parse_err)
            .map(Reportable::Markup)
            .unwrap_or(Reportable::Error(ErrorAdapter(err))),
        _ => Reportable::Error(ErrorAdapter(err)),
    }
}

/// Render a [`StencilError`] as a graphical miette report.
pub fn render(err: &StencilError) -> String {
    let reporter = miette::GraphicalReportHandler::new();
    let mut writer = String::new();
    if reporter
        .render_report(&mut writer, &to_reportable(err))
        .is_err()
    {
        return err.to_string();
    }
    writer
}
