use sitemap_forge::{read_part, Location, SitemapWriter, SITEMAP_NS};
use tempfile::tempdir;

fn prologue_len() -> u64 {
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="{SITEMAP_NS}">"#).len() as u64
}

fn urls(parts: &[Vec<Location>]) -> Vec<Vec<String>> {
    parts
        .iter()
        .map(|part| part.iter().map(|l| l.url().to_string()).collect())
        .collect()
}

#[test]
fn three_locations_fit_in_one_part() {
    let dir = tempdir().expect("tempdir");
    let mut writer = SitemapWriter::create(dir.path(), "sitemap", false).expect("writer");
    for url in ["/a", "/b", "/c"] {
        writer
            .add_location(&Location::new(url).expect("location"))
            .expect("add");
    }
    let parts = writer.finish().expect("finish");

    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].file_name, "sitemap1");
    let read = read_part(&dir.path().join("sitemap1.xml")).expect("read part");
    assert_eq!(urls(&[read]), vec![vec!["/a", "/b", "/c"]]);
}

#[test]
fn rolls_after_second_entry_reaches_ceiling() {
    let dir = tempdir().expect("tempdir");
    // `<url><loc>/a</loc></url>` is 24 bytes; two of them land exactly on the ceiling.
    let entry_len = "<url><loc>/a</loc></url>".len() as u64;
    let ceiling = prologue_len() + 2 * entry_len;

    let mut writer =
        SitemapWriter::with_max_bytes(dir.path(), "sitemap", false, ceiling).expect("writer");
    for url in ["/a", "/b", "/c"] {
        writer
            .add_location(&Location::new(url).expect("location"))
            .expect("add");
    }
    assert_eq!(writer.sitemap_files(), vec!["sitemap1", "sitemap2"]);
    let parts = writer.finish().expect("finish");

    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].url_count, 2);
    assert_eq!(parts[1].url_count, 1);
    // The check happens before writing, so the first part closed at the ceiling plus `</urlset>`.
    assert_eq!(parts[0].bytes, ceiling + "</urlset>".len() as u64);

    let first = read_part(&dir.path().join("sitemap1.xml")).expect("read 1");
    let second = read_part(&dir.path().join("sitemap2.xml")).expect("read 2");
    assert_eq!(urls(&[first, second]), vec![vec!["/a", "/b"], vec!["/c"]]);
}

#[test]
fn one_byte_under_ceiling_does_not_roll() {
    let dir = tempdir().expect("tempdir");
    let entry_len = "<url><loc>/a</loc></url>".len() as u64;
    let ceiling = prologue_len() + 2 * entry_len + 1;

    let mut writer =
        SitemapWriter::with_max_bytes(dir.path(), "sitemap", false, ceiling).expect("writer");
    for url in ["/a", "/b", "/c"] {
        writer
            .add_location(&Location::new(url).expect("location"))
            .expect("add");
    }
    let parts = writer.finish().expect("finish");

    // Part 1 may overshoot the ceiling by one entry.
    assert_eq!(parts.len(), 1);
    assert!(parts[0].bytes > ceiling);
}

#[test]
fn zero_locations_still_produce_one_part() {
    let dir = tempdir().expect("tempdir");
    let writer = SitemapWriter::create(dir.path(), "sitemap", true).expect("writer");
    let parts = writer.finish().expect("finish");

    assert_eq!(parts.len(), 1);
    let read = read_part(&parts[0].path).expect("well-formed empty part");
    assert!(read.is_empty());
}
