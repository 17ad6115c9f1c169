//! JSON rendering of output documents.

use log::trace;
use serde::Serialize;

use crate::error::StencilError;

/// Renders a document as JSON text, indented when `pretty` is set.
pub fn render_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, StencilError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    trace!(bytes = json.len(), pretty; "Document rendered");
    Ok(json)
}
