use sitemap_forge::{read_part, Location, SitemapWriter};
use tempfile::tempdir;

/// Every location lands in exactly one part, in input order, for a spread of
/// input sizes and ceilings.
#[test]
fn parts_partition_input_in_order() {
    for count in [0usize, 1, 2, 7, 50, 333] {
        for max_bytes in [1u64, 150, 1_000, 10_000, 500_000] {
            let dir = tempdir().expect("tempdir");
            let input: Vec<String> = (0..count)
                .map(|i| format!("https://example.com/page/{i}"))
                .collect();

            let mut writer =
                SitemapWriter::with_max_bytes(dir.path(), "sitemap", false, max_bytes).expect("writer");
            for url in &input {
                writer
                    .add_location(&Location::new(url.as_str()).expect("location"))
                    .expect("add");
            }
            let parts = writer.finish().expect("finish");

            let mut seen = Vec::new();
            for (idx, part) in parts.iter().enumerate() {
                assert_eq!(part.sequence as usize, idx + 1);
                assert_eq!(part.file_name, format!("sitemap{}", idx + 1));
                // Each part parses on its own: one urlset root, balanced tags, namespace.
                let locations = read_part(&part.path).expect("well-formed part");
                assert_eq!(locations.len(), part.url_count);
                seen.extend(locations.into_iter().map(|l| l.url().to_string()));
            }
            assert_eq!(seen, input, "count={count} max_bytes={max_bytes}");
        }
    }
}

/// A part is only rolled once it has reached the ceiling, so every part but
/// the last closed at or above it, and never grew by more than one entry past it.
#[test]
fn rolled_parts_reached_ceiling() {
    let dir = tempdir().expect("tempdir");
    let max_bytes = 1_000;
    let mut writer =
        SitemapWriter::with_max_bytes(dir.path(), "sitemap", true, max_bytes).expect("writer");
    for i in 0..200 {
        writer
            .add_location(&Location::new(format!("https://example.com/p/{i}")).expect("location"))
            .expect("add");
    }
    let parts = writer.finish().expect("finish");
    assert!(parts.len() > 2);

    let longest_entry = 200;
    for part in &parts[..parts.len() - 1] {
        assert!(part.bytes >= max_bytes, "{} closed early", part.file_name);
        assert!(part.bytes < max_bytes + longest_entry, "{} overshot", part.file_name);
    }
}
