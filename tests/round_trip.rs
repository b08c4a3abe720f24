use std::fs;
use std::path::Path;

use sitemap_forge::{read_part, ChangeFrequency, Location, SitemapWriter};
use tempfile::tempdir;
use time::{Date, Month};

const FREQUENCIES: [ChangeFrequency; 7] = [
    ChangeFrequency::Always,
    ChangeFrequency::Hourly,
    ChangeFrequency::Daily,
    ChangeFrequency::Weekly,
    ChangeFrequency::Monthly,
    ChangeFrequency::Yearly,
    ChangeFrequency::Never,
];

fn sample(count: usize) -> Vec<Location> {
    (0..count)
        .map(|i| {
            let mut location =
                Location::new(format!("https://example.com/items/{i}?ref=a&b=\"{i}\"")).expect("location");
            if i % 2 == 0 {
                let day = (i % 28) as u8 + 1;
                location = location
                    .with_last_modified(Date::from_calendar_date(2024, Month::June, day).expect("date"));
            }
            if i % 3 == 0 {
                location = location.with_change_frequency(FREQUENCIES[i % FREQUENCIES.len()]);
            }
            if i % 5 == 0 {
                location = location
                    .with_priority((i % 10) as f64 / 10.0)
                    .expect("priority");
            }
            location
        })
        .collect()
}

fn write_all(dir: &Path, locations: &[Location], indented: bool, max_bytes: u64) -> Vec<String> {
    let mut writer =
        SitemapWriter::with_max_bytes(dir, "sitemap", indented, max_bytes).expect("writer");
    for location in locations {
        writer.add_location(location).expect("add");
    }
    writer
        .finish()
        .expect("finish")
        .into_iter()
        .map(|part| part.file_name)
        .collect()
}

#[test]
fn parsed_parts_rewrite_byte_identical() {
    for indented in [false, true] {
        let first = tempdir().expect("tempdir");
        let second = tempdir().expect("tempdir");
        let locations = sample(120);

        let names = write_all(first.path(), &locations, indented, 2_000);
        assert!(names.len() > 1, "expected several parts");

        let mut parsed = Vec::new();
        for name in &names {
            parsed.extend(read_part(&first.path().join(format!("{name}.xml"))).expect("read part"));
        }
        assert_eq!(parsed, locations);

        let rewritten = write_all(second.path(), &parsed, indented, 2_000);
        assert_eq!(rewritten, names);
        for name in &names {
            let a = fs::read(first.path().join(format!("{name}.xml"))).expect("read a");
            let b = fs::read(second.path().join(format!("{name}.xml"))).expect("read b");
            assert_eq!(a, b, "{name} differs (indented = {indented})");
        }
    }
}
