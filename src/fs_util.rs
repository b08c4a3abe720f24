//! Small filesystem and date helpers shared by the writer, index, cleanup and compressor.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::{Error, Result};

pub(crate) const XML_EXT: &str = "xml";
pub(crate) const GZ_EXT: &str = "gz";

/// Formats a date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month() as u8,
        date.day()
    )
}

/// Parses a `YYYY-MM-DD` date. A full RFC 3339 timestamp is accepted too and
/// truncated to its date.
pub fn parse_date(raw: &str) -> Result<Date> {
    let raw = raw.trim();
    let short = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(raw, &short) {
        return Ok(date);
    }
    OffsetDateTime::parse(raw, &Rfc3339)
        .map(|dt| dt.date())
        .map_err(|err| Error::MalformedInput(format!("invalid date {raw:?}: {err}")))
}

/// Formats a timestamp as RFC 3339 in UTC, e.g. `2024-03-09T10:15:00Z`.
pub fn format_timestamp(at: SystemTime) -> String {
    let dt = OffsetDateTime::from(at).replace_nanosecond(0).unwrap_or_else(|_| at.into());
    // Rfc3339 only fails for years outside 0..=9999.
    dt.format(&Rfc3339)
        .unwrap_or_else(|_| format_date(dt.date()))
}

/// Whether the platform considers this file hidden.
///
/// Windows reports the hidden attribute; elsewhere the leading-dot
/// convention is the platform's notion of hidden.
pub(crate) fn is_hidden(path: &Path, meta: &fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
        let _ = path;
        meta.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0
    }
    #[cfg(not(windows))]
    {
        let _ = meta;
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
    }
}

/// Non-hidden regular files directly inside `dir`, sorted by path.
pub(crate) fn visible_files(dir: &Path) -> Result<Vec<(PathBuf, fs::Metadata)>> {
    let mut files = Vec::new();
    let entries = fs::read_dir(dir).map_err(|err| Error::io_at(dir, err))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let meta = entry.metadata()?;
        if !meta.is_file() || is_hidden(&path, &meta) {
            continue;
        }
        files.push((path, meta));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

pub(crate) fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ext)
}

pub(crate) fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}
