//! zopml - OPML 2.0 parsing and writing
//!
//! Reads OPML subscription lists into an immutable document tree and writes
//! them back out as escaped, indented XML. Parse and serialize calls are
//! independent and side-effect-free; documents may be processed concurrently
//! on separate threads without coordination.
//!
//! # Quick Start
//!
//! ```
//! use zopml::from_str;
//! # fn main() -> Result<(), zopml::Error> {
//! let opml = from_str(
//!     r#"<opml version="2.0">
//!          <head><title>Feeds</title></head>
//!          <body>
//!            <outline text="Example" xmlUrl="https://example.com/feed.xml" />
//!          </body>
//!        </opml>"#,
//! )?;
//! assert_eq!(opml.title.as_deref(), Some("Feeds"));
//! assert_eq!(opml.outlines[0].title, "Example");
//! let xml = opml.to_xml();
//! assert!(xml.contains("xmlUrl=\"https://example.com/feed.xml\""));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

use std::path::Path;

use tracing::debug;

pub mod error;
pub use error::{Error, Pos, Result, XmlError, XmlErrorKind};

pub mod model;
pub use model::{Attribute, Opml, Outline};

pub mod parser;
pub use parser::Parser;

pub mod writer;
pub use writer::to_xml;

pub mod xml;
pub use xml::{Event as XmlEvent, Reader as XmlReader};

/// Parse an OPML document from a string
pub fn from_str(s: &str) -> Result<Opml> {
    let mut parser = Parser::new(s.as_bytes());
    parser.parse()
}

/// Parse an OPML document from bytes
pub fn from_bytes(bytes: &[u8]) -> Result<Opml> {
    let mut parser = Parser::new(bytes);
    parser.parse()
}

/// Parse an OPML document from a file
///
/// Fails with [`Error::UnableToOpen`] before any parsing when the file
/// cannot be read.
pub fn from_file(path: impl AsRef<Path>) -> Result<Opml> {
    let path = path.as_ref();
    debug!("reading opml document from {}", path.display());

    let bytes = std::fs::read(path).map_err(|source| Error::UnableToOpen {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("read {} bytes, parsing", bytes.len());
    from_bytes(&bytes)
}
