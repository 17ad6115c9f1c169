//! # Stencil Parser
//!
//! Reads drawing packages and turns their page documents into raw shape
//! trees. This crate provides:
//!
//! - [`Package`]: the zip container, materialised in memory
//! - [`parse_page`]: shape tree and connection declaration extraction for a
//!   single page document
//! - [`parse_package`]: the same for every page of a package
//!
//! ## Usage
//!
//! ```
//! # use stencil_parser::{Package, ParseError, parse_package};
//!
//! fn main() -> Result<(), ParseError> {
//!     let package = Package::from_parts([(
//!         "visio/pages/page1.xml",
//!         r#"<PageContents><Shapes><Shape ID="1"><Text>Start</Text></Shape></Shapes></PageContents>"#,
//!     )]);
//!
//!     let pages = parse_package(&package)?;
//!     assert_eq!(pages[0].shapes()[0].text(), Some("Start"));
//!     Ok(())
//! }
//! ```

mod error;
mod package;
mod page;

pub use error::ParseError;
pub use package::{PAGES_DIR, Package, PagePart};
pub use page::{PageContext, ParsedPage, UNKNOWN_PAGE, parse_page};

use log::debug;

/// Parse every page of a package, in page order.
///
/// # Errors
///
/// Returns the first [`ParseError`] raised by a malformed page document.
pub fn parse_package(package: &Package) -> Result<Vec<ParsedPage>, ParseError> {
    package
        .pages()
        .iter()
        .map(|part| {
            let page = parse_page(part.xml(), part.name(), &part.context())?;
            debug!(
                part = part.name(),
                page = page.name(),
                shapes = page.all_shapes().count(),
                connects = page.connects().len();
                "Page parsed"
            );
            Ok(page)
        })
        .collect()
}
