//! Reading generated sitemap documents back.
//!
//! Used to verify output and to re-index existing parts. Parsing is strict
//! about document shape: exactly one root element, balanced tags and the
//! sitemap namespace on the root.

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::fs_util::parse_date;
use crate::index::IndexEntry;
use crate::location::Location;
use crate::xml::{SITEMAPINDEX, SITEMAP_NS, URLSET};
use crate::{Error, Result};

/// Parse a part file (`urlset` root) into its locations, in document order.
pub fn read_part(path: &Path) -> Result<Vec<Location>> {
    let body = fs::read_to_string(path).map_err(|err| Error::io_at(path, err))?;
    parse_part(&body)
}

/// Parse an index file (`sitemapindex` root) into its entries, in document order.
pub fn read_index(path: &Path) -> Result<Vec<IndexEntry>> {
    let body = fs::read_to_string(path).map_err(|err| Error::io_at(path, err))?;
    parse_entries(&body, SITEMAPINDEX, "sitemap")
}

/// Parse a flat gzip listing (`urlset` root, `loc` + `lastmod` only).
pub fn read_listing(path: &Path) -> Result<Vec<IndexEntry>> {
    let body = fs::read_to_string(path).map_err(|err| Error::io_at(path, err))?;
    parse_entries(&body, URLSET, "url")
}

pub fn parse_part(xml: &str) -> Result<Vec<Location>> {
    let mut locations = Vec::new();
    for fields in parse_records(xml, URLSET, "url")? {
        let loc = fields
            .get("loc")
            .ok_or_else(|| Error::Xml("url entry without loc".to_string()))?;
        let mut location = Location::new(loc.clone())?;
        if let Some(raw) = fields.get("lastmod") {
            location = location.with_last_modified(parse_date(raw)?);
        }
        if let Some(raw) = fields.get("changefreq") {
            location = location.with_change_frequency(raw.parse()?);
        }
        if let Some(raw) = fields.get("priority") {
            let priority = raw
                .trim()
                .parse::<f64>()
                .map_err(|err| Error::Xml(format!("invalid priority {raw:?}: {err}")))?;
            location = location.with_priority(priority)?;
        }
        locations.push(location);
    }
    Ok(locations)
}

fn parse_entries(xml: &str, root: &str, entry: &str) -> Result<Vec<IndexEntry>> {
    parse_records(xml, root, entry)?
        .into_iter()
        .map(|mut fields| {
            let loc = fields
                .remove("loc")
                .ok_or_else(|| Error::Xml(format!("{entry} entry without loc")))?;
            Ok(IndexEntry {
                loc,
                lastmod: fields.remove("lastmod"),
            })
        })
        .collect()
}

type Record = std::collections::HashMap<String, String>;

/// Collect `<entry><field>text</field>...</entry>` records under `root`.
fn parse_records(xml: &str, root: &str, entry: &str) -> Result<Vec<Record>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut saw_root = false;
    let mut current: Option<Record> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let name = element_name(e);
                match stack.len() {
                    0 => {
                        if saw_root {
                            return Err(Error::Xml("multiple root elements".to_string()));
                        }
                        if name != root {
                            return Err(Error::Xml(format!("expected <{root}> root, found <{name}>")));
                        }
                        check_namespace(e)?;
                        saw_root = true;
                    }
                    1 if name == entry => current = Some(Record::new()),
                    _ => {}
                }
                stack.push(name);
            }
            Event::Empty(ref e) => {
                if stack.is_empty() {
                    return Err(Error::Xml("empty root element".to_string()));
                }
                let name = element_name(e);
                if stack.len() == 1 && name == entry {
                    records.push(Record::new());
                }
            }
            Event::Text(ref e) => {
                if stack.len() == 3 {
                    if let Some(record) = current.as_mut() {
                        let text = e.unescape()?.into_owned();
                        record.insert(stack[2].clone(), text);
                    }
                }
            }
            Event::End(ref e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match stack.pop() {
                    Some(open) if open == name => {}
                    _ => return Err(Error::Xml(format!("unbalanced </{name}>"))),
                }
                if stack.len() == 1 && name == entry {
                    if let Some(record) = current.take() {
                        records.push(record);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(Error::Xml(format!("missing <{root}> root")));
    }
    if !stack.is_empty() {
        return Err(Error::Xml(format!("unclosed <{}>", stack.join("><"))));
    }
    Ok(records)
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn check_namespace(e: &BytesStart<'_>) -> Result<()> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::Xml(err.to_string()))?;
        if attr.key.as_ref() == b"xmlns" {
            return if attr.value.as_ref() == SITEMAP_NS.as_bytes() {
                Ok(())
            } else {
                Err(Error::Xml(format!(
                    "unexpected namespace {}",
                    String::from_utf8_lossy(&attr.value)
                )))
            };
        }
    }
    Err(Error::Xml("root element has no xmlns".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::ChangeFrequency;

    #[test]
    fn parses_part_document() {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="{SITEMAP_NS}">
  <url>
    <loc>https://example.com/?q=a&amp;b</loc>
    <lastmod>2024-01-05</lastmod>
    <changefreq>daily</changefreq>
    <priority>0.7</priority>
  </url>
  <url><loc>/plain</loc></url>
</urlset>"#
        );
        let locations = parse_part(&xml).unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].url(), "https://example.com/?q=a&b");
        assert_eq!(locations[0].change_frequency(), Some(ChangeFrequency::Daily));
        assert_eq!(locations[0].priority(), Some(0.7));
        assert_eq!(locations[1].url(), "/plain");
        assert_eq!(locations[1].last_modified(), None);
    }

    #[test]
    fn rejects_unclosed_root() {
        let xml = format!(r#"<urlset xmlns="{SITEMAP_NS}"><url><loc>/a</loc></url>"#);
        assert!(matches!(parse_part(&xml), Err(Error::Xml(_))));
    }

    #[test]
    fn rejects_wrong_namespace_and_root() {
        let xml = r#"<urlset xmlns="urn:other"></urlset>"#;
        assert!(parse_part(xml).is_err());
        let xml = format!(r#"<sitemapindex xmlns="{SITEMAP_NS}"></sitemapindex>"#);
        assert!(parse_part(&xml).is_err());
    }

    #[test]
    fn rejects_url_without_loc() {
        let xml = format!(r#"<urlset xmlns="{SITEMAP_NS}"><url><lastmod>2024-01-01</lastmod></url></urlset>"#);
        assert!(parse_part(&xml).is_err());
    }
}
