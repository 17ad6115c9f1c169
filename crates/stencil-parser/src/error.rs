//! Error types for reading packages and page documents.

use std::{io, string::FromUtf8Error};

use thiserror::Error;

/// Errors raised while reading a package or parsing one of its parts.
///
/// Only structural failures of the container or of the markup itself are
/// errors. Missing attributes, cells or sections are tolerated by the parser
/// and never produce a `ParseError`.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid package archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Package part {part} is not valid UTF-8")]
    Encoding {
        part: String,
        #[source]
        source: FromUtf8Error,
    },

    #[error("Malformed markup in {part}: {source}")]
    Xml {
        part: String,
        #[source]
        source: roxmltree::Error,
        src: String,
    },
}

impl ParseError {
    /// Create a new `Xml` error with the markup it was raised for.
    pub fn new_xml_error(part: impl Into<String>, source: roxmltree::Error, src: impl Into<String>) -> Self {
        Self::Xml {
            part: part.into(),
            source,
            src: src.into(),
        }
    }

    /// Returns the byte offset of a markup error inside its source text.
    ///
    /// Rows and columns reported by the XML reader are 1-based and count
    /// characters, not bytes.
    pub fn xml_offset(&self) -> Option<usize> {
        let Self::Xml { source, src, .. } = self else {
            return None;
        };
        let pos = source.pos();
        let row = usize::try_from(pos.row).ok()?.checked_sub(1)?;
        let col = usize::try_from(pos.col).ok()?.saturating_sub(1);

        let line_start: usize = src
            .split_inclusive('\n')
            .take(row)
            .map(str::len)
            .sum();
        let line = src.get(line_start..)?;
        let within = line
            .char_indices()
            .nth(col)
            .map_or(line.len(), |(offset, _)| offset);
        Some(line_start + within)
    }
}
