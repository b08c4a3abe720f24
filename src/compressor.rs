//! Gzip compression of sitemap output.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;

use crate::fs_util::{self, GZ_EXT};
use crate::{Error, Result};

/// Outcome of a compression pass.
#[derive(Debug, Clone, Default)]
pub struct CompressionStats {
    /// `.gz` files written, in name order.
    pub written: Vec<PathBuf>,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
}

impl CompressionStats {
    fn record(&mut self, path: PathBuf, original_size: u64, compressed_size: u64) {
        self.written.push(path);
        self.original_bytes += original_size;
        self.compressed_bytes += compressed_size;
    }

    pub fn bytes_saved(&self) -> u64 {
        self.original_bytes.saturating_sub(self.compressed_bytes)
    }
}

/// Gzip every non-hidden file in `dir` that is not already a `.gz`.
///
/// Originals stay in place; an existing `{name}.gz` is overwritten. Stale
/// `.gz` files whose source is gone are left alone.
pub fn compress_directory(dir: &Path) -> Result<CompressionStats> {
    let mut stats = CompressionStats::default();
    for (path, meta) in fs_util::visible_files(dir)? {
        if fs_util::has_extension(&path, GZ_EXT) || is_temp(&path) {
            continue;
        }
        let gz_path = compress_file(&path)?;
        let compressed = fs::metadata(&gz_path)
            .map_err(|err| Error::io_at(&gz_path, err))?
            .len();
        stats.record(gz_path, meta.len(), compressed);
    }
    debug!(
        "compressed {} files in {} ({} -> {} bytes)",
        stats.written.len(),
        dir.display(),
        stats.original_bytes,
        stats.compressed_bytes
    );
    Ok(stats)
}

/// Gzip `path` into a `{name}.gz` sibling.
///
/// Output goes to `{name}.gz.tmp` first and is renamed into place once
/// complete, so the final name never holds a truncated archive.
pub fn compress_file(path: &Path) -> Result<PathBuf> {
    let gz_path = sibling_with_suffix(path, ".gz")?;
    let tmp_path = sibling_with_suffix(path, ".gz.tmp")?;
    let _ = fs::remove_file(&tmp_path);

    let result = write_gzip(path, &tmp_path);
    if let Err(err) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    fs::rename(&tmp_path, &gz_path).map_err(|err| Error::io_at(&gz_path, err))?;
    debug!("compressed {} -> {}", path.display(), gz_path.display());
    Ok(gz_path)
}

/// Copy every non-hidden `.gz` file from `src_dir` into `dest_dir`, overwriting.
pub fn publish_compressed(src_dir: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dest_dir).map_err(|err| Error::io_at(dest_dir, err))?;
    let mut published = Vec::new();
    for (path, _) in fs_util::visible_files(src_dir)? {
        if !fs_util::has_extension(&path, GZ_EXT) {
            continue;
        }
        let Some(name) = path.file_name() else {
            continue;
        };
        let dest = dest_dir.join(name);
        fs::copy(&path, &dest).map_err(|err| Error::io_at(&dest, err))?;
        published.push(dest);
    }
    debug!("published {} archives to {}", published.len(), dest_dir.display());
    Ok(published)
}

fn write_gzip(src: &Path, dest: &Path) -> Result<()> {
    let input = File::open(src).map_err(|err| Error::io_at(src, err))?;
    let output = File::create(dest).map_err(|err| Error::io_at(dest, err))?;

    let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::default());
    io::copy(&mut BufReader::new(input), &mut encoder).map_err(|err| Error::io_at(src, err))?;
    let mut out = encoder.finish().map_err(|err| Error::io_at(dest, err))?;
    out.flush().map_err(|err| Error::io_at(dest, err))?;
    Ok(())
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| Error::MalformedInput(format!("missing filename for {}", path.display())))?
        .to_string_lossy();
    Ok(path.with_file_name(format!("{name}{suffix}")))
}

fn is_temp(path: &Path) -> bool {
    fs_util::file_name(path)
        .map(|name| name.ends_with(".gz.tmp"))
        .unwrap_or(false)
}
