//! Shared sitemap document framing on top of `quick_xml::Writer`.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::Result;

pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

pub(crate) const URLSET: &str = "urlset";
pub(crate) const SITEMAPINDEX: &str = "sitemapindex";

const INDENT_WIDTH: usize = 2;

pub(crate) fn xml_writer<W: Write>(inner: W, indented: bool) -> Writer<W> {
    if indented {
        Writer::new_with_indent(inner, b' ', INDENT_WIDTH)
    } else {
        Writer::new(inner)
    }
}

/// Writes the XML declaration and opens `root` with the sitemap namespace.
pub(crate) fn write_prologue<W: Write>(xml: &mut Writer<W>, root: &str) -> Result<()> {
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut start = BytesStart::new(root);
    start.push_attribute(("xmlns", SITEMAP_NS));
    xml.write_event(Event::Start(start))?;
    Ok(())
}

pub(crate) fn write_epilogue<W: Write>(xml: &mut Writer<W>, root: &str) -> Result<()> {
    xml.write_event(Event::End(BytesEnd::new(root)))?;
    Ok(())
}

pub(crate) fn start_element<W: Write>(xml: &mut Writer<W>, name: &str) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

pub(crate) fn end_element<W: Write>(xml: &mut Writer<W>, name: &str) -> Result<()> {
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// `<name>text</name>`, with `text` escaped.
pub(crate) fn text_element<W: Write>(xml: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    start_element(xml, name)?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    end_element(xml, name)
}
