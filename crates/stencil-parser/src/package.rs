//! Package container access.
//!
//! A drawing package is a zip container. Only the parts under
//! `visio/pages/` matter here: the page documents themselves
//! (`page<N>.xml`), the page index (`pages.xml`) and its relationships
//! (`_rels/pages.xml.rels`), which together give each page its declared
//! name.
//!
//! Everything is read into memory when the package is opened; later stages
//! never touch the container again.

use std::{
    fs::File,
    io::{BufReader, Read, Seek},
    path::Path,
};

use indexmap::IndexMap;
use log::debug;
use roxmltree::{Document, Node};
use zip::ZipArchive;

use crate::{error::ParseError, page::PageContext};

/// Directory holding the page parts.
pub const PAGES_DIR: &str = "visio/pages/";

const PAGE_INDEX_PART: &str = "visio/pages/pages.xml";
const PAGE_RELS_PART: &str = "visio/pages/_rels/pages.xml.rels";

/// A single page document of a package.
#[derive(Debug, Clone)]
pub struct PagePart {
    name: String,
    number: usize,
    declared_name: Option<String>,
    xml: String,
}

impl PagePart {
    /// Returns the part name, e.g. `visio/pages/page2.xml`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the 1-based page number.
    ///
    /// Taken from the part name when it carries one, otherwise from the
    /// position of the page in the package.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Returns the page name declared in the page index, if any.
    pub fn declared_name(&self) -> Option<&str> {
        self.declared_name.as_deref()
    }

    /// Returns the raw markup of the page.
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Returns the naming context used while parsing this page.
    pub fn context(&self) -> PageContext {
        PageContext::new()
            .with_declared_name(self.declared_name.clone())
            .with_number(Some(self.number))
    }
}

/// An opened drawing package.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pages: Vec<PagePart>,
}

impl Package {
    /// Open a package file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the file cannot be read, is not a valid
    /// zip container, or holds a page part that is not UTF-8.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read a package from any seekable reader.
    ///
    /// # Errors
    ///
    /// See [`Package::open`].
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, ParseError> {
        let mut archive = ZipArchive::new(reader)?;
        let mut parts = Vec::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if !entry.is_file() {
                continue;
            }

            let name = entry.name().trim_start_matches('/').to_string();
            if !name.starts_with(PAGES_DIR) {
                continue;
            }

            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes)?;
            let xml = String::from_utf8(bytes).map_err(|source| ParseError::Encoding {
                part: name.clone(),
                source,
            })?;
            parts.push((name, xml));
        }

        Ok(Self::from_parts(parts))
    }

    /// Build a package from in-memory `(part name, markup)` pairs.
    ///
    /// Part names are relative to the package root (`visio/pages/page1.xml`).
    /// Parts outside `visio/pages/` are ignored.
    pub fn from_parts<I, N, X>(parts: I) -> Self
    where
        I: IntoIterator<Item = (N, X)>,
        N: Into<String>,
        X: Into<String>,
    {
        let mut parts: IndexMap<String, String> = parts
            .into_iter()
            .map(|(name, xml)| (name.into().trim_start_matches('/').to_string(), xml.into()))
            .collect();

        let declared_names = match (parts.get(PAGE_INDEX_PART), parts.get(PAGE_RELS_PART)) {
            (Some(index), Some(rels)) => declared_page_names(index, rels),
            _ => IndexMap::new(),
        };

        let mut pages: Vec<(Option<usize>, String, String)> = parts
            .drain(..)
            .filter_map(|(name, xml)| {
                let file_name = name.strip_prefix(PAGES_DIR)?;
                let keep = is_page_file(file_name);
                let number = page_number(file_name);
                keep.then(|| (number, name, xml))
            })
            .collect();
        pages.sort_by(|(a_number, a_name, _), (b_number, b_name, _)| {
            (a_number.is_none(), a_number, a_name).cmp(&(b_number.is_none(), b_number, b_name))
        });

        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(position, (number, name, xml))| PagePart {
                declared_name: declared_names.get(&name).cloned(),
                number: number.unwrap_or(position + 1),
                name,
                xml,
            })
            .collect::<Vec<_>>();

        debug!(pages = pages.len(); "Package pages collected");
        Self { pages }
    }

    /// Returns the page parts ordered by page number.
    pub fn pages(&self) -> &[PagePart] {
        &self.pages
    }

    /// Returns the page part with the given name.
    pub fn page(&self, name: &str) -> Option<&PagePart> {
        self.pages.iter().find(|page| page.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Page documents are `page<N>.xml` directly under the pages directory.
fn is_page_file(file_name: &str) -> bool {
    !file_name.contains('/')
        && file_name.starts_with("page")
        && file_name.ends_with(".xml")
        && file_name != "pages.xml"
}

fn page_number(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix("page")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Maps page part names to the names declared in the page index.
///
/// The index lists `Page` elements carrying a `Name` and a `Rel` child whose
/// relationship id resolves, through the relationships part, to the page
/// part. Unreadable index parts yield no names; they never fail the package.
fn declared_page_names(index: &str, rels: &str) -> IndexMap<String, String> {
    let (Ok(index), Ok(rels)) = (Document::parse(index), Document::parse(rels)) else {
        debug!("Page index is not readable, page names fall back to page numbers");
        return IndexMap::new();
    };

    let targets: IndexMap<&str, String> = rels
        .descendants()
        .filter(|node| node.has_tag_name_local("Relationship"))
        .filter_map(|node| {
            let id = node.attribute("Id")?;
            let target = node.attribute("Target")?;
            Some((id, resolve_target(target)))
        })
        .collect();

    index
        .descendants()
        .filter(|node| node.has_tag_name_local("Page"))
        .filter_map(|page| {
            let name = page.attribute("Name").or_else(|| page.attribute("NameU"))?;
            let rel_id = page
                .children()
                .find(|child| child.has_tag_name_local("Rel"))?
                .attributes()
                .find(|attr| attr.name() == "id")?
                .value();
            let target = targets.get(rel_id)?;
            Some((target.clone(), name.to_string()))
        })
        .collect()
}

fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("{PAGES_DIR}{target}"),
    }
}

/// Local-name matching, independent of the markup namespace.
pub(crate) trait LocalName {
    fn has_tag_name_local(&self, name: &str) -> bool;
}

impl LocalName for Node<'_, '_> {
    fn has_tag_name_local(&self, name: &str) -> bool {
        self.is_element() && self.tag_name().name() == name
    }
}
