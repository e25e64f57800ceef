//! OPML document parser
//!
//! Consumes the flat event stream from [`crate::xml::Reader`] and rebuilds
//! the nested outline tree with an explicit stack of builder frames: each
//! start-of-`outline` pushes a frame, each end-of-`outline` seals the frame
//! into an immutable [`Outline`] and attaches it to the parent frame, or to
//! the top-level list when the stack empties. Header fields accumulate
//! independently of the body; a malformed header field never aborts the
//! parse.

use indexmap::IndexMap;
use time::format_description::well_known::Rfc2822;
use time::OffsetDateTime;
use url::Url;

use crate::error::{Error, Result};
use crate::model::{Attribute, Opml, Outline};
use crate::xml::{Event, Reader};

/// An outline still being assembled while its children are read
#[derive(Debug)]
struct Frame {
    text: String,
    title: String,
    attributes: Option<Vec<Attribute>>,
    children: Vec<Outline>,
}

impl Frame {
    fn seal(self) -> Outline {
        Outline {
            text: self.text,
            title: self.title,
            attributes: self.attributes,
            children: if self.children.is_empty() {
                None
            } else {
                Some(self.children)
            },
        }
    }
}

/// OPML parser over raw XML bytes
#[derive(Debug)]
pub struct Parser<'a> {
    reader: Reader<'a>,
    version: String,
    title: Option<String>,
    date_created: Option<OffsetDateTime>,
    date_modified: Option<OffsetDateTime>,
    owner_name: Option<String>,
    owner_email: Option<String>,
    owner_id: Option<Url>,
    docs: Option<Url>,
    outlines: Vec<Outline>,
    stack: Vec<Frame>,
    characters: String,
    in_head: bool,
    in_body: bool,
    document: Option<Opml>,
}

impl<'a> Parser<'a> {
    /// Create a parser over raw OPML bytes
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            reader: Reader::new(input),
            version: String::new(),
            title: None,
            date_created: None,
            date_modified: None,
            owner_name: None,
            owner_email: None,
            owner_id: None,
            docs: None,
            outlines: Vec::new(),
            stack: Vec::new(),
            characters: String::new(),
            in_head: false,
            in_body: false,
            document: None,
        }
    }

    /// Parse the input into a complete document
    ///
    /// Returns [`Error::Parse`] when the XML itself is malformed and
    /// [`Error::InvalidDocument`] when the events run out before an `opml`
    /// element has closed (empty input, unrelated XML).
    pub fn parse(&mut self) -> Result<Opml> {
        loop {
            if let Some(document) = self.document.take() {
                return Ok(document);
            }
            match self.reader.next_event()? {
                Some(Event::Start { name, attributes }) => self.handle_start(&name, attributes),
                Some(Event::Text(text)) => self.characters.push_str(text.trim()),
                Some(Event::End { name }) => self.handle_end(&name),
                None => return Err(Error::InvalidDocument),
            }
        }
    }

    fn handle_start(&mut self, name: &str, attrs: IndexMap<String, String>) {
        self.characters.clear();

        match name {
            "opml" => {
                self.version = attrs
                    .get("version")
                    .cloned()
                    .unwrap_or_else(|| "2.0".to_string());
            }
            "head" if self.stack.is_empty() => self.in_head = true,
            "body" if self.stack.is_empty() => self.in_body = true,
            "outline" if self.in_body => {
                let text = attrs.get("text").cloned().unwrap_or_default();
                let title = attrs
                    .get("title")
                    .or_else(|| attrs.get("text"))
                    .cloned()
                    .unwrap_or_default();
                let attributes = if attrs.is_empty() {
                    None
                } else {
                    Some(
                        attrs
                            .into_iter()
                            .map(|(name, value)| Attribute { name, value })
                            .collect(),
                    )
                };
                self.stack.push(Frame {
                    text,
                    title,
                    attributes,
                    children: Vec::new(),
                });
            }
            _ => {}
        }
    }

    fn handle_end(&mut self, name: &str) {
        match name {
            "opml" => self.document = Some(self.take_document()),
            "head" => self.in_head = false,
            "body" => self.in_body = false,
            "outline" if self.in_body => {
                if let Some(frame) = self.stack.pop() {
                    let outline = frame.seal();
                    match self.stack.last_mut() {
                        Some(parent) => parent.children.push(outline),
                        None => self.outlines.push(outline),
                    }
                }
            }
            "title" if self.header_position() => self.title = self.take_text(),
            "dateCreated" if self.header_position() => self.date_created = self.take_date(),
            "dateModified" if self.header_position() => self.date_modified = self.take_date(),
            "ownerName" if self.header_position() => self.owner_name = self.take_text(),
            "ownerEmail" if self.header_position() => self.owner_email = self.take_text(),
            "ownerId" if self.header_position() => self.owner_id = self.take_url(),
            "docs" if self.header_position() => self.docs = self.take_url(),
            _ => {}
        }
        self.characters.clear();
    }

    /// Header fields are only recognized inside `head`; an element of the
    /// same name anywhere in the body is ignored.
    const fn header_position(&self) -> bool {
        self.in_head
    }

    fn take_text(&mut self) -> Option<String> {
        let text = std::mem::take(&mut self.characters);
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn take_date(&mut self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(&self.characters, &Rfc2822).ok()
    }

    fn take_url(&mut self) -> Option<Url> {
        Url::parse(&self.characters).ok()
    }

    fn take_document(&mut self) -> Opml {
        Opml {
            version: if self.version.is_empty() {
                "2.0".to_string()
            } else {
                std::mem::take(&mut self.version)
            },
            title: self.title.take(),
            date_created: self.date_created.take(),
            date_modified: self.date_modified.take(),
            owner_name: self.owner_name.take(),
            owner_email: self.owner_email.take(),
            owner_id: self.owner_id.take(),
            docs: self.docs.take(),
            outlines: std::mem::take(&mut self.outlines),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use super::*;

    fn parse(input: &str) -> Result<Opml> {
        Parser::new(input.as_bytes()).parse()
    }

    #[test]
    fn test_minimal_document() {
        let opml = parse("<opml version=\"2.0\"><head/><body/></opml>").unwrap();
        assert_eq!(opml.version, "2.0");
        assert!(opml.outlines.is_empty());
    }

    #[test]
    fn test_version_defaults_when_absent() {
        let opml = parse("<opml><head/><body/></opml>").unwrap();
        assert_eq!(opml.version, "2.0");
    }

    #[test]
    fn test_header_fields() {
        let opml = parse(
            "<opml version=\"2.0\"><head>\
             <title>My Feeds</title>\
             <dateCreated>Tue, 16 Dec 2025 10:30:00 +0000</dateCreated>\
             <ownerName>Someone</ownerName>\
             <ownerEmail>someone@example.com</ownerEmail>\
             <ownerId>https://example.com/owner</ownerId>\
             <docs>https://opml.org/spec2.opml</docs>\
             </head><body/></opml>",
        )
        .unwrap();
        assert_eq!(opml.title.as_deref(), Some("My Feeds"));
        assert_eq!(opml.owner_name.as_deref(), Some("Someone"));
        assert_eq!(opml.owner_email.as_deref(), Some("someone@example.com"));
        assert_eq!(
            opml.owner_id.unwrap().as_str(),
            "https://example.com/owner"
        );
        assert_eq!(opml.docs.unwrap().as_str(), "https://opml.org/spec2.opml");
        let created = opml.date_created.unwrap();
        assert_eq!(created.year(), 2025);
        assert_eq!(u8::from(created.month()), 12);
        assert_eq!(created.day(), 16);
    }

    #[test]
    fn test_malformed_date_left_absent() {
        let opml = parse(
            "<opml version=\"2.0\"><head>\
             <title>T</title>\
             <dateCreated>not a date</dateCreated>\
             </head><body/></opml>",
        )
        .unwrap();
        assert!(opml.date_created.is_none());
        assert_eq!(opml.title.as_deref(), Some("T"));
    }

    #[test]
    fn test_malformed_uri_left_absent() {
        let opml = parse(
            "<opml version=\"2.0\"><head><ownerId>::</ownerId></head><body/></opml>",
        )
        .unwrap();
        assert!(opml.owner_id.is_none());
    }

    #[test]
    fn test_empty_header_text_left_absent() {
        let opml = parse(
            "<opml version=\"2.0\"><head><title>   </title></head><body/></opml>",
        )
        .unwrap();
        assert!(opml.title.is_none());
    }

    #[test]
    fn test_title_defaults_to_text() {
        let opml = parse(
            "<opml version=\"2.0\"><head/><body><outline text=\"Foo\" /></body></opml>",
        )
        .unwrap();
        assert_eq!(opml.outlines[0].text, "Foo");
        assert_eq!(opml.outlines[0].title, "Foo");
    }

    #[test]
    fn test_text_defaults_to_empty() {
        let opml = parse(
            "<opml version=\"2.0\"><head/><body><outline type=\"rss\" /></body></opml>",
        )
        .unwrap();
        assert_eq!(opml.outlines[0].text, "");
        assert_eq!(opml.outlines[0].title, "");
    }

    #[test]
    fn test_attributes_keep_text_and_title() {
        let opml = parse(
            "<opml version=\"2.0\"><head/><body>\
             <outline text=\"Foo\" title=\"Bar\" type=\"rss\" />\
             </body></opml>",
        )
        .unwrap();
        let outline = &opml.outlines[0];
        assert_eq!(outline.attribute("text"), Some("Foo"));
        assert_eq!(outline.attribute("title"), Some("Bar"));
        assert_eq!(outline.attribute("type"), Some("rss"));
    }

    #[test]
    fn test_outline_without_attributes_has_none() {
        let opml =
            parse("<opml version=\"2.0\"><head/><body><outline /></body></opml>").unwrap();
        assert!(opml.outlines[0].attributes.is_none());
    }

    #[test]
    fn test_nested_reconstruction() {
        let opml = parse(
            "<opml version=\"2.0\"><head/><body>\
             <outline text=\"Parent\">\
             <outline text=\"A\" /><outline text=\"B\" />\
             </outline>\
             </body></opml>",
        )
        .unwrap();
        assert_eq!(opml.outlines.len(), 1);
        let children = opml.outlines[0].children.as_ref().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].text, "A");
        assert_eq!(children[1].text, "B");
        assert!(children[0].children.is_none());
        assert!(children[1].children.is_none());
    }

    #[test]
    fn test_childless_outline_never_has_empty_children() {
        let opml = parse(
            "<opml version=\"2.0\"><head/><body><outline text=\"X\"></outline></body></opml>",
        )
        .unwrap();
        assert!(opml.outlines[0].children.is_none());
    }

    #[test]
    fn test_sibling_order_preserved() {
        let opml = parse(
            "<opml version=\"2.0\"><head/><body>\
             <outline text=\"1\" /><outline text=\"2\" /><outline text=\"3\" />\
             </body></opml>",
        )
        .unwrap();
        let texts: Vec<&str> = opml.outlines.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_unknown_elements_ignored() {
        let opml = parse(
            "<opml version=\"2.0\"><head><expansionState>1,2</expansionState>\
             <title>T</title></head>\
             <body><junk>stuff</junk><outline text=\"X\" /></body></opml>",
        )
        .unwrap();
        assert_eq!(opml.title.as_deref(), Some("T"));
        assert_eq!(opml.outlines.len(), 1);
    }

    #[test]
    fn test_header_names_in_body_ignored() {
        let opml = parse(
            "<opml version=\"2.0\"><head><title>Real</title></head>\
             <body><title>Fake</title><outline text=\"X\" /></body></opml>",
        )
        .unwrap();
        assert_eq!(opml.title.as_deref(), Some("Real"));
    }

    #[test]
    fn test_stray_text_not_attributed_to_header() {
        // character data sitting between outline tags must not leak anywhere
        let opml = parse(
            "<opml version=\"2.0\"><head><title>T</title></head>\
             <body><outline text=\"P\">noise<outline text=\"C\" />more</outline></body></opml>",
        )
        .unwrap();
        assert_eq!(opml.title.as_deref(), Some("T"));
        assert_eq!(opml.outlines[0].children.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_input_is_invalid_document() {
        assert!(matches!(parse(""), Err(Error::InvalidDocument)));
    }

    #[test]
    fn test_unrelated_xml_is_invalid_document() {
        assert!(matches!(
            parse("<rss version=\"2.0\"></rss>"),
            Err(Error::InvalidDocument)
        ));
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        assert!(matches!(
            parse("<opml version=\"2.0\"><head>"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_duplicate_attribute_last_wins() {
        let opml = parse(
            "<opml version=\"2.0\"><head/><body>\
             <outline text=\"first\" text=\"second\" />\
             </body></opml>",
        )
        .unwrap();
        assert_eq!(opml.outlines[0].text, "second");
    }

    #[test]
    fn test_content_after_closing_root_ignored() {
        let opml = parse(
            "<opml version=\"2.0\"><head/><body/></opml><!-- trailing -->",
        )
        .unwrap();
        assert_eq!(opml.version, "2.0");
    }
}
