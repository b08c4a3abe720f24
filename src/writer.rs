//! Size-bounded sitemap part writer.
//!
//! Streams `Location`s into `{base}{n}.xml` documents, rolling to the next
//! part when the open one has reached the byte ceiling.
//!
//! # Design
//!
//! - Exactly one part is open at any time, opened eagerly at construction
//! - The size check runs *before* an entry is written: a part is rolled once
//!   it has already reached `max_bytes`, so a part may overshoot the ceiling
//!   by at most one `<url>` element
//! - Rolling only happens between entries; a `<url>` is never split
//! - Every part is closed with `</urlset>` on `finish()` or on drop

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use quick_xml::Writer;

use crate::fs_util::format_date;
use crate::location::Location;
use crate::xml::{self, URLSET};
use crate::{Error, Result};

/// Default part ceiling in bytes, below the 50 MB sitemap protocol limit.
pub const MAX_PART_BYTES: u64 = 500_000;

pub const SITEMAP_FILE_EXT: &str = ".xml";

/// One finalized (or currently open) part file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapPart {
    /// 1-based, assigned in creation order.
    pub sequence: u32,
    /// File stem, `{base}{sequence}`.
    pub file_name: String,
    pub path: PathBuf,
    /// Bytes handed to the file so far.
    pub bytes: u64,
    pub url_count: usize,
}

/// Counts bytes on their way to the underlying sink.
struct CountingWriter<W> {
    inner: W,
    bytes: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct OpenPart {
    part: SitemapPart,
    xml: Writer<CountingWriter<BufWriter<File>>>,
}

impl OpenPart {
    fn bytes(&self) -> u64 {
        self.xml.get_ref().bytes
    }
}

/// Writer for a sequence of sitemap part files.
///
/// ```text
/// 1. create()           -> part 1 open, prologue written
/// 2. add_location() * N -> rolls to part n+1 when part n is full
/// 3. finish()           -> last part closed, all parts returned
/// ```
pub struct SitemapWriter {
    dir: PathBuf,
    base_name: String,
    indented: bool,
    max_bytes: u64,
    /// Sequence of the most recently opened part.
    sequence: u32,
    current: Option<OpenPart>,
    closed: Vec<SitemapPart>,
}

impl SitemapWriter {
    /// Open part 1 in `dir` with the default byte ceiling.
    ///
    /// # Errors
    ///
    /// `Error::IoAt` if the part file cannot be created.
    pub fn create(dir: impl Into<PathBuf>, base_name: impl Into<String>, indented: bool) -> Result<Self> {
        Self::with_max_bytes(dir, base_name, indented, MAX_PART_BYTES)
    }

    /// Open part 1 in `dir`, rolling parts once they reach `max_bytes`.
    pub fn with_max_bytes(
        dir: impl Into<PathBuf>,
        base_name: impl Into<String>,
        indented: bool,
        max_bytes: u64,
    ) -> Result<Self> {
        let mut writer = Self {
            dir: dir.into(),
            base_name: base_name.into(),
            indented,
            max_bytes,
            sequence: 0,
            current: None,
            closed: Vec::new(),
        };
        writer.open_next()?;
        Ok(writer)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Sequence number of the open part.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Bytes written to the open part so far.
    pub fn current_bytes(&self) -> u64 {
        self.current.as_ref().map(OpenPart::bytes).unwrap_or(0)
    }

    /// True once the open part has reached the ceiling; the next entry goes to a new part.
    pub fn needs_roll(&self) -> bool {
        match &self.current {
            Some(open) => open.bytes() >= self.max_bytes,
            None => true,
        }
    }

    /// Stems of every part created so far, in creation order.
    pub fn sitemap_files(&self) -> Vec<String> {
        self.closed
            .iter()
            .chain(self.current.as_ref().map(|open| &open.part))
            .map(|part| part.file_name.clone())
            .collect()
    }

    /// Parts already closed by a roll.
    pub fn closed_parts(&self) -> &[SitemapPart] {
        &self.closed
    }

    /// Snapshot of the open part, with its live byte count.
    pub fn current_part(&self) -> Option<SitemapPart> {
        self.current.as_ref().map(|open| SitemapPart {
            bytes: open.bytes(),
            ..open.part.clone()
        })
    }

    /// Append one `<url>` entry, rolling first if the open part is full.
    pub fn add_location(&mut self, location: &Location) -> Result<()> {
        if self.needs_roll() {
            self.roll()?;
        }
        let open = self
            .current
            .as_mut()
            .ok_or_else(|| Error::Io(io::Error::new(io::ErrorKind::Other, "no open sitemap part")))?;

        let xml = &mut open.xml;
        xml::start_element(xml, "url")?;
        xml::text_element(xml, "loc", location.url())?;
        if let Some(date) = location.last_modified() {
            xml::text_element(xml, "lastmod", &format_date(date))?;
        }
        if let Some(freq) = location.change_frequency() {
            xml::text_element(xml, "changefreq", freq.as_str())?;
        }
        if let Some(priority) = location.priority() {
            xml::text_element(xml, "priority", &priority.to_string())?;
        }
        xml::end_element(xml, "url")?;
        open.part.url_count += 1;
        Ok(())
    }

    /// Close the open part and return every part in creation order.
    pub fn finish(mut self) -> Result<Vec<SitemapPart>> {
        self.close_current()?;
        Ok(std::mem::take(&mut self.closed))
    }

    fn roll(&mut self) -> Result<()> {
        self.close_current()?;
        self.open_next()
    }

    fn open_next(&mut self) -> Result<()> {
        let sequence = self.sequence + 1;
        let file_name = format!("{}{}", self.base_name, sequence);
        let path = self.dir.join(format!("{file_name}{SITEMAP_FILE_EXT}"));
        let file = File::create(&path).map_err(|err| Error::io_at(&path, err))?;

        let sink = CountingWriter {
            inner: BufWriter::new(file),
            bytes: 0,
        };
        let mut xml = xml::xml_writer(sink, self.indented);
        xml::write_prologue(&mut xml, URLSET)?;

        debug!("opened sitemap part {}", path.display());
        self.sequence = sequence;
        self.current = Some(OpenPart {
            part: SitemapPart {
                sequence,
                file_name,
                path,
                bytes: 0,
                url_count: 0,
            },
            xml,
        });
        Ok(())
    }

    /// Write `</urlset>`, flush and sync the open part.
    fn close_current(&mut self) -> Result<()> {
        let Some(OpenPart { mut part, mut xml }) = self.current.take() else {
            return Ok(());
        };
        xml::write_epilogue(&mut xml, URLSET)?;
        let sink = xml.into_inner();
        part.bytes = sink.bytes;
        let file = sink
            .inner
            .into_inner()
            .map_err(|err| Error::io_at(&part.path, err.into_error()))?;
        file.sync_all().map_err(|err| Error::io_at(&part.path, err))?;

        debug!(
            "closed sitemap part {} ({} urls, {} bytes)",
            part.path.display(),
            part.url_count,
            part.bytes
        );
        self.closed.push(part);
        Ok(())
    }
}

impl Drop for SitemapWriter {
    fn drop(&mut self) {
        if let Err(err) = self.close_current() {
            warn!("failed to finalize sitemap part: {err}");
        }
    }
}
