//! Events emitted by the XML reader

use indexmap::IndexMap;

/// One token of the flat, depth-first XML event stream
///
/// Attribute values and character data arrive with entities already decoded.
/// A self-closing tag is reported as `Start` immediately followed by `End`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Start tag with its attribute mapping in source order
    Start {
        name: String,
        attributes: IndexMap<String, String>,
    },
    /// Run of character data between tags (never whitespace-only)
    Text(String),
    /// End tag
    End { name: String },
}
