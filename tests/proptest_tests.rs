//! Property-based tests: byte accounting and record structure hold for
//! arbitrary manifests.

mod common;

use common::{drain, inflate, parse_archive};
use proptest::prelude::*;
use zipflow::checksum::Crc32;
use zipflow::{ArchivePath, BytesSource, Entry, Manifest, StreamOptions, Timestamp, ZipStream};

fn arb_entries() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..20_000), 1..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn archive_structure_holds_for_arbitrary_content(contents in arb_entries()) {
        let manifest: Manifest = contents
            .iter()
            .enumerate()
            .map(|(i, data)| {
                Entry::new(
                    ArchivePath::new(&format!("entry_{i}.bin")).unwrap(),
                    Timestamp::from_unix_secs(946_684_800),
                    BytesSource::new(data.clone()),
                )
            })
            .collect();

        let mut stream = ZipStream::start(manifest, StreamOptions::new()).unwrap();
        let out = drain(&mut stream).unwrap();
        prop_assert!(stream.is_done());
        prop_assert_eq!(stream.bytes_emitted(), out.len() as u64);

        let parsed = parse_archive(&out);
        prop_assert_eq!(parsed.end_count as usize, contents.len());

        let mut expected_offset = 0u64;
        for (i, data) in contents.iter().enumerate() {
            let local = &parsed.locals[i];
            let central = &parsed.central[i];

            // Directory lists entries in manifest order
            let expected_name = format!("entry_{i}.bin");
            prop_assert_eq!(central.name.as_str(), expected_name.as_str());

            // Offsets are exact and records contiguous
            prop_assert_eq!(local.offset, expected_offset);
            expected_offset = local.end;

            // Checksums and sizes cover exactly the source bytes
            prop_assert_eq!(local.descriptor_crc, Crc32::compute(data));
            prop_assert_eq!(local.descriptor_size, data.len() as u64);
            prop_assert_eq!(local.descriptor_compressed, local.payload.len() as u64);
            prop_assert_eq!(central.crc, local.descriptor_crc);
            prop_assert_eq!(central.size, local.descriptor_size);
            prop_assert_eq!(central.compressed, local.descriptor_compressed);

            // Payload inflates back to the original bytes
            prop_assert_eq!(&inflate(&local.payload), data);
        }

        // Directory begins where payload records end
        prop_assert_eq!(parsed.end_offset, expected_offset);
    }

    #[test]
    fn compression_level_never_changes_content(level in 0u32..=9) {
        let data: Vec<u8> = (0..10_000u32).flat_map(|i| (i % 97).to_le_bytes()).collect();
        let manifest: Manifest = [Entry::new(
            ArchivePath::new("leveled.bin").unwrap(),
            Timestamp::from_unix_secs(946_684_800),
            BytesSource::new(data.clone()),
        )]
        .into_iter()
        .collect();

        let mut stream =
            ZipStream::start(manifest, StreamOptions::new().level(level)).unwrap();
        let parsed = parse_archive(&drain(&mut stream).unwrap());
        prop_assert_eq!(&inflate(&parsed.locals[0].payload), &data);
        prop_assert_eq!(parsed.locals[0].descriptor_crc, Crc32::compute(&data));
    }
}
