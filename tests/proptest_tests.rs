//! Property-based tests using proptest.
//!
//! Randomized round-trip and invariant checks for the writer, the path
//! rules, and the split sink.

mod common;

use common::TestArchive;
use proptest::prelude::*;
use splitzip::codec::CompressionMethod;
use splitzip::write::{EntryOptions, ZipWriter};
use splitzip::{ArchivePath, Timestamp, MIN_SPLIT_LENGTH};
use tempfile::TempDir;

/// Strategy for archive path strings the writer accepts: 1-3 segments
/// of word characters, no traversal or empty segments.
fn valid_path_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-zA-Z0-9][a-zA-Z0-9_.-]{0,9}", 1..3)
        .prop_map(|parts| parts.join("/"))
        .prop_filter("no dot segments", |s| {
            !s.split('/').any(|seg| seg == "." || seg == "..")
        })
}

proptest! {
    /// Valid paths parse and keep their string form.
    #[test]
    fn valid_paths_parse(path in valid_path_strategy()) {
        let parsed = ArchivePath::new(&path);
        prop_assert!(parsed.is_ok(), "'{}' rejected: {:?}", path, parsed);
        let parsed = parsed.unwrap();
        prop_assert_eq!(parsed.as_str(), path.as_str());
    }

    /// Backslashes normalize to the same path as forward slashes.
    #[test]
    fn backslash_normalization(path in valid_path_strategy()) {
        let swapped = path.replace('/', "\\");
        let a = ArchivePath::new(&path).unwrap();
        let b = ArchivePath::new(&swapped).unwrap();
        prop_assert_eq!(a, b);
    }

    /// NUL bytes are always rejected.
    #[test]
    fn nul_bytes_rejected(prefix in "[a-zA-Z0-9]{0,5}", suffix in "[a-zA-Z0-9]{0,5}") {
        let path = format!("{prefix}\0{suffix}");
        prop_assert!(ArchivePath::new(&path).is_err());
    }

    /// DOS timestamps stay within the representable range.
    #[test]
    fn timestamps_clamp_to_dos_range(
        year in 1900u16..2200,
        month in 0u8..15,
        day in 0u8..35,
        hour in 0u8..30,
        minute in 0u8..70,
        second in 0u8..70,
    ) {
        let ts = Timestamp::from_parts(year, month, day, hour, minute, second);
        let date = ts.dos_date();
        let time = ts.dos_time();
        let y = (date >> 9) + 1980;
        prop_assert!((1980..=2107).contains(&y));
        prop_assert!((1..=12).contains(&((date >> 5) & 0x0F)));
        prop_assert!((1..=31).contains(&(date & 0x1F)));
        prop_assert!((time >> 11) <= 23);
        prop_assert!(((time >> 5) & 0x3F) <= 59);
        prop_assert!((time & 0x1F) * 2 <= 58);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Any payload survives a write/extract cycle with both methods.
    #[test]
    fn content_round_trips(
        content in proptest::collection::vec(any::<u8>(), 0..20_000),
        store in any::<bool>(),
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prop.zip");

        let method = if store { CompressionMethod::Store } else { CompressionMethod::Deflate };
        let mut writer = ZipWriter::create_path(&path).unwrap();
        writer
            .add_bytes("data.bin", &content, &EntryOptions::new().compression(method))
            .unwrap();
        writer.finish().unwrap();

        let archive = TestArchive::open(&path);
        let extracted = archive.extract(archive.entry("data.bin"), None).unwrap();
        prop_assert_eq!(extracted, content);
    }

    /// Unique names each produce a record; the last duplicate wins.
    #[test]
    fn duplicate_names_collapse(names in proptest::collection::vec(valid_path_strategy(), 1..8)) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("names.zip");

        let mut writer = ZipWriter::create_path(&path).unwrap();
        for (i, name) in names.iter().enumerate() {
            writer
                .add_bytes(name, format!("v{i}").as_bytes(), &EntryOptions::new())
                .unwrap();
        }
        writer.finish().unwrap();

        let unique: std::collections::HashSet<_> = names.iter().collect();
        prop_assert_eq!(writer.entries().len(), unique.len());

        let archive = TestArchive::open(&path);
        prop_assert_eq!(archive.entries.len(), unique.len());

        // Whatever was added last under each name is what extracts
        let last = names.len() - 1;
        let extracted = archive.extract(archive.entry(&names[last]), None).unwrap();
        prop_assert_eq!(extracted, format!("v{last}").into_bytes());
    }

    /// Split volumes never exceed the limit and always reassemble.
    #[test]
    fn split_volumes_bounded(
        payload_len in 1_000usize..300_000,
        seed in any::<u32>(),
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("split.zip");

        let mut state = seed;
        let content: Vec<u8> = (0..payload_len)
            .map(|_| {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                (state >> 24) as u8
            })
            .collect();

        let mut writer = ZipWriter::create_split_path(&path, MIN_SPLIT_LENGTH).unwrap();
        writer
            .add_bytes(
                "blob.bin",
                &content,
                &EntryOptions::new().compression(CompressionMethod::Store),
            )
            .unwrap();
        let result = writer.finish().unwrap();

        for size in &result.volume_sizes {
            prop_assert!(*size <= MIN_SPLIT_LENGTH);
        }

        let archive = TestArchive::open(&path);
        prop_assert_eq!(archive.volume_sizes.len(), result.volume_sizes.len());
        let extracted = archive.extract(archive.entry("blob.bin"), None).unwrap();
        prop_assert_eq!(extracted, content);
    }
}
