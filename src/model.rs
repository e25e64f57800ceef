//! OPML document model
//!
//! Immutable value types for one OPML document: the header metadata and the
//! ordered tree of outline nodes. Instances come out of [`crate::Parser`] or
//! are built directly by callers; the writer consumes them unchanged.
//!
//! <https://opml.org/spec2.opml>

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

/// One named XML attribute on an outline node
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One node in the outline tree
///
/// `attributes` carries every XML attribute present on the source node,
/// including `text` and `title`, so nothing is lost even though those two are
/// promoted to named fields. Both `attributes` and `children` are `None`
/// rather than empty when the node has none; the distinction decides whether
/// the writer emits a self-closing tag.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Outline {
    pub text: String,
    pub title: String,
    pub attributes: Option<Vec<Attribute>>,
    pub children: Option<Vec<Outline>>,
}

impl Outline {
    /// Create a leaf outline with no attributes and no children
    pub fn new(text: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            title: title.into(),
            attributes: None,
            children: None,
        }
    }

    /// Look up an attribute value by name (first match in list order)
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .as_deref()?
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.value.as_str())
    }

    /// The feed URL, parsed from the `xmlUrl` attribute
    pub fn feed_url(&self) -> Option<Url> {
        self.attribute("xmlUrl").and_then(|value| Url::parse(value).ok())
    }

    /// The site URL, parsed from the `htmlUrl` attribute
    pub fn site_url(&self) -> Option<Url> {
        self.attribute("htmlUrl").and_then(|value| Url::parse(value).ok())
    }
}

/// One OPML document: header metadata plus the top-level outline list
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Opml {
    /// Version string of the form "x.y"
    pub version: String,
    /// `<title>`, the title of the document
    pub title: Option<String>,
    /// `<dateCreated>`, when the document was created
    pub date_created: Option<OffsetDateTime>,
    /// `<dateModified>`, when the document was last modified
    pub date_modified: Option<OffsetDateTime>,
    /// `<ownerName>`, the owner of the document
    pub owner_name: Option<String>,
    /// `<ownerEmail>`, the email address of the owner
    pub owner_email: Option<String>,
    /// `<ownerId>`, the http address identifying the author
    pub owner_id: Option<Url>,
    /// `<docs>`, the http address of documentation for the format
    pub docs: Option<Url>,
    /// Top-level outlines in document order
    pub outlines: Vec<Outline>,
}

impl Default for Opml {
    fn default() -> Self {
        Self {
            version: "2.0".to_string(),
            title: None,
            date_created: None,
            date_modified: None,
            owner_name: None,
            owner_email: None,
            owner_id: None,
            docs: None,
            outlines: Vec::new(),
        }
    }
}
