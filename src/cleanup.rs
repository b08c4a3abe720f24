use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::fs_util::{self, GZ_EXT, XML_EXT};
use crate::{Error, Result};

/// Remove sitemap output for `base_name` from `dir` ahead of a build.
///
/// Only the names a build for `base_name` produces are deleted: parts
/// `{base}{n}.xml`, the index `{compact}.xml` (`base_name` without spaces)
/// and the `.gz` archives of both. Hidden files and output of other builds
/// sharing the prefix, such as `sitemap-news1.xml`, are left alone. A missing
/// `dir` is created. Returns the deleted paths, sorted.
pub fn clean_output_dir(dir: &Path, base_name: &str) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|err| Error::io_at(dir, err))?;
        debug!("created output directory {}", dir.display());
        return Ok(Vec::new());
    }

    let compact: String = base_name.chars().filter(|c| *c != ' ').collect();
    let mut deleted = Vec::new();
    for (path, _) in fs_util::visible_files(dir)? {
        let Some(name) = fs_util::file_name(&path) else {
            continue;
        };
        if !is_build_output(name, base_name, &compact) {
            continue;
        }
        fs::remove_file(&path).map_err(|err| Error::io_at(&path, err))?;
        debug!("removed {}", path.display());
        deleted.push(path);
    }

    Ok(deleted)
}

fn is_build_output(name: &str, base_name: &str, compact: &str) -> bool {
    let xml_suffix = format!(".{XML_EXT}");
    let gz_suffix = format!(".{XML_EXT}.{GZ_EXT}");
    let Some(stem) = name
        .strip_suffix(&gz_suffix)
        .or_else(|| name.strip_suffix(&xml_suffix))
    else {
        return false;
    };
    if stem == compact {
        return true;
    }
    stem.strip_prefix(base_name)
        .is_some_and(|seq| !seq.is_empty() && seq.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_missing_dir() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("a").join("sitemaps");
        assert!(clean_output_dir(&out, "sitemap").unwrap().is_empty());
        assert!(out.is_dir());
    }

    #[test]
    fn keeps_other_base_names_and_extensions() {
        let dir = TempDir::new().unwrap();
        for name in ["sitemap1.xml", "sitemap.xml", "news1.xml", "sitemap1.txt", "sitemap2.xml.gz"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let deleted = clean_output_dir(dir.path(), "sitemap").unwrap();
        assert_eq!(
            deleted,
            vec![
                dir.path().join("sitemap.xml"),
                dir.path().join("sitemap1.xml"),
                dir.path().join("sitemap2.xml.gz"),
            ]
        );
        assert!(dir.path().join("news1.xml").exists());
        assert!(dir.path().join("sitemap1.txt").exists());
    }

    #[test]
    fn removes_compacted_index_name() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("mysite.xml"), b"x").unwrap();
        fs::write(dir.path().join("my site1.xml"), b"x").unwrap();
        let deleted = clean_output_dir(dir.path(), "my site").unwrap();
        assert_eq!(deleted.len(), 2);
    }

    #[test]
    fn keeps_other_builds_sharing_the_prefix() {
        let dir = TempDir::new().unwrap();
        let keep = [
            "sitemap-news1.xml",
            "sitemap-news1.xml.gz",
            "sitemap-news.xml",
            "sitemaps-index.xml",
            "sitemap1a.xml",
            "sitemap1.gz",
        ];
        for name in keep.iter().chain(&["sitemap12.xml", "sitemap.xml.gz"]) {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let deleted = clean_output_dir(dir.path(), "sitemap").unwrap();
        assert_eq!(
            deleted,
            vec![dir.path().join("sitemap.xml.gz"), dir.path().join("sitemap12.xml")]
        );
        for name in keep {
            assert!(dir.path().join(name).exists(), "{name} was removed");
        }
    }

    #[test]
    fn matches_only_part_and_index_names() {
        assert!(is_build_output("sitemap.xml", "sitemap", "sitemap"));
        assert!(is_build_output("sitemap3.xml.gz", "sitemap", "sitemap"));
        assert!(!is_build_output("sitemap.gz", "sitemap", "sitemap"));
        assert!(!is_build_output("sitemap.xml.gz.tmp", "sitemap", "sitemap"));
        assert!(is_build_output("my site2.xml", "my site", "mysite"));
        assert!(!is_build_output("my site.xml", "my site", "mysite"));
    }

    #[cfg(unix)]
    #[test]
    fn skips_hidden_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".sitemap1.xml"), b"x").unwrap();
        let deleted = clean_output_dir(dir.path(), ".sitemap").unwrap();
        assert!(deleted.is_empty());
        assert!(dir.path().join(".sitemap1.xml").exists());
    }
}
