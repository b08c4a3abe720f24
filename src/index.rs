//! Sitemap index generation.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::debug;

use crate::fs_util::{self, format_timestamp, GZ_EXT};
use crate::writer::SITEMAP_FILE_EXT;
use crate::xml::{self, SITEMAPINDEX, URLSET};
use crate::{Error, Result};

/// One `<sitemap>` (or `<url>`, for a gzip listing) entry of an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub loc: String,
    pub lastmod: Option<String>,
}

/// Writes index documents pointing at the public URLs of sitemap parts.
#[derive(Debug, Clone)]
pub struct SitemapIndexBuilder {
    root_url: String,
    sitemaps_path: String,
}

impl SitemapIndexBuilder {
    /// `root_url` and `sitemaps_path` are each normalized to end in exactly one `/`.
    pub fn new(root_url: &str, sitemaps_path: &str) -> Self {
        let segment = sitemaps_path.trim_start_matches('/');
        Self {
            root_url: with_trailing_slash(root_url),
            sitemaps_path: if segment.trim_end_matches('/').is_empty() {
                String::new()
            } else {
                with_trailing_slash(segment)
            },
        }
    }

    /// Public base URL the part files are served under.
    pub fn base_url(&self) -> String {
        format!("{}{}", self.root_url, self.sitemaps_path)
    }

    /// Public URL of a part given its stem.
    pub fn part_url(&self, file: &str, gzip: bool) -> String {
        let mut url = format!("{}{file}{SITEMAP_FILE_EXT}", self.base_url());
        if gzip {
            url.push('.');
            url.push_str(GZ_EXT);
        }
        url
    }

    /// Write `{index_name}.xml` (spaces stripped) into `dir`, listing `files` in order.
    ///
    /// Every entry's `lastmod` is the time the index is generated.
    pub fn build<S: AsRef<str>>(
        &self,
        dir: &Path,
        index_name: &str,
        files: &[S],
        gzip: bool,
    ) -> Result<PathBuf> {
        let generated = format_timestamp(SystemTime::now());
        let entries: Vec<IndexEntry> = files
            .iter()
            .map(|file| IndexEntry {
                loc: self.part_url(file.as_ref(), gzip),
                lastmod: Some(generated.clone()),
            })
            .collect();

        let path = index_path(dir, index_name);
        write_document(&path, SITEMAPINDEX, "sitemap", &entries)?;
        debug!("wrote sitemap index {} ({} parts)", path.display(), entries.len());
        Ok(path)
    }

    /// Re-index whatever `.gz` files already sit in `dir`, without touching the parts.
    ///
    /// Writes a `urlset` document with one `<url>` per non-hidden `.gz` file,
    /// dated by the file's modification time.
    pub fn build_from_existing_gzips(&self, dir: &Path, index_name: &str) -> Result<PathBuf> {
        let base = self.base_url();
        let mut entries = Vec::new();
        for (path, meta) in fs_util::visible_files(dir)? {
            if !fs_util::has_extension(&path, GZ_EXT) {
                continue;
            }
            let Some(name) = fs_util::file_name(&path) else {
                continue;
            };
            let modified = meta.modified().map_err(|err| Error::io_at(&path, err))?;
            entries.push(IndexEntry {
                loc: format!("{base}{name}"),
                lastmod: Some(format_timestamp(modified)),
            });
        }

        let path = index_path(dir, index_name);
        write_document(&path, URLSET, "url", &entries)?;
        debug!("wrote gzip listing {} ({} files)", path.display(), entries.len());
        Ok(path)
    }
}

/// Path of the index file for `index_name`, spaces stripped.
pub fn index_path(dir: &Path, index_name: &str) -> PathBuf {
    let stem: String = index_name.chars().filter(|c| *c != ' ').collect();
    dir.join(format!("{stem}{SITEMAP_FILE_EXT}"))
}

fn write_document(path: &Path, root: &str, entry: &str, entries: &[IndexEntry]) -> Result<()> {
    let file = File::create(path).map_err(|err| Error::io_at(path, err))?;
    let mut xml = xml::xml_writer(BufWriter::new(file), false);
    xml::write_prologue(&mut xml, root)?;
    for item in entries {
        xml::start_element(&mut xml, entry)?;
        xml::text_element(&mut xml, "loc", &item.loc)?;
        if let Some(lastmod) = &item.lastmod {
            xml::text_element(&mut xml, "lastmod", lastmod)?;
        }
        xml::end_element(&mut xml, entry)?;
    }
    xml::write_epilogue(&mut xml, root)?;
    xml.into_inner()
        .flush()
        .map_err(|err| Error::io_at(path, err))?;
    Ok(())
}

fn with_trailing_slash(s: &str) -> String {
    format!("{}/", s.trim_end_matches('/'))
}
