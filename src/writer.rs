//! OPML document writer
//!
//! Walks an [`Opml`] and emits the complete XML string: declaration, header
//! fields in fixed order, then the outline tree depth-first with two-space
//! indentation. Total over any well-formed document; never fails.

use std::fmt::Write as _;

use time::format_description::well_known::Rfc2822;
use time::OffsetDateTime;

use crate::model::{Opml, Outline};

/// Serialize a document to an XML string
pub fn to_xml(opml: &Opml) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(out, "<opml version=\"{}\">", opml.version);

    out.push_str("  <head>\n");
    if let Some(title) = &opml.title {
        write_head_field(&mut out, "title", title);
    }
    if let Some(date) = &opml.date_created {
        write_head_date(&mut out, "dateCreated", date);
    }
    if let Some(date) = &opml.date_modified {
        write_head_date(&mut out, "dateModified", date);
    }
    if let Some(owner_name) = &opml.owner_name {
        write_head_field(&mut out, "ownerName", owner_name);
    }
    if let Some(owner_email) = &opml.owner_email {
        write_head_field(&mut out, "ownerEmail", owner_email);
    }
    if let Some(owner_id) = &opml.owner_id {
        write_head_field(&mut out, "ownerId", owner_id.as_str());
    }
    if let Some(docs) = &opml.docs {
        write_head_field(&mut out, "docs", docs.as_str());
    }
    out.push_str("  </head>\n");

    out.push_str("  <body>\n");
    for outline in &opml.outlines {
        write_outline(&mut out, outline, 1);
    }
    out.push_str("  </body>\n");
    out.push_str("</opml>\n");
    out
}

impl Opml {
    /// Serialize this document to an XML string
    pub fn to_xml(&self) -> String {
        to_xml(self)
    }
}

fn write_head_field(out: &mut String, tag: &str, value: &str) {
    let _ = writeln!(out, "    <{tag}>{}</{tag}>", escape_xml(value));
}

fn write_head_date(out: &mut String, tag: &str, date: &OffsetDateTime) {
    if let Ok(formatted) = date.format(&Rfc2822) {
        let _ = writeln!(out, "    <{tag}>{formatted}</{tag}>");
    }
}

fn write_outline(out: &mut String, outline: &Outline, depth: usize) {
    let indent = "  ".repeat(depth);
    out.push_str(&indent);
    out.push_str("<outline");

    // text and title are always written as named attributes, even when the
    // attribute list below carries its own copies; readers take the last
    // occurrence, so re-parsing yields the same values.
    write_attr(out, "text", &outline.text);
    write_attr(out, "title", &outline.title);
    if let Some(attributes) = &outline.attributes {
        for attribute in attributes {
            write_attr(out, &attribute.name, &attribute.value);
        }
    }

    match &outline.children {
        Some(children) if !children.is_empty() => {
            out.push_str(">\n");
            for child in children {
                write_outline(out, child, depth + 1);
            }
            out.push_str(&indent);
            out.push_str("</outline>\n");
        }
        _ => out.push_str(" />\n"),
    }
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, " {name}=\"{}\"", escape_xml(value));
}

/// Escape the five XML special characters, ampersand first so already
/// produced escapes are not escaped again
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
