//! Tests for malicious, corrupted and unsupported inputs.
//!
//! Extraction must never write outside the destination, and every failure
//! must surface with the right error kind.

mod common;

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use xarc::{Error, ErrorKind, ExtractOptions, StatisticsProgress};

use common::{TarEntry, list_tree, tar_bytes, zip_bytes};

fn extract_to(archive: &Path, dest: &Path) -> xarc::Result<xarc::ExtractResult> {
    xarc::extract(archive, Some(dest), ExtractOptions::new())
}

#[test]
fn test_tar_parent_traversal_is_rejected() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("evil.tar");
    fs::write(
        &archive,
        tar_bytes(&[TarEntry::File("../../escaped.txt", b"gotcha")]),
    )
    .unwrap();

    let dest = dir.path().join("a/b/dest");
    fs::create_dir_all(dest.parent().unwrap()).unwrap();

    let err = extract_to(&archive, &dest).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Traversal);
    match err {
        Error::PathTraversal { entry_index, path } => {
            assert_eq!(entry_index, 0);
            assert_eq!(path, "../../escaped.txt");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert!(!dir.path().join("escaped.txt").exists());
    assert!(!dir.path().join("a/escaped.txt").exists());
    assert!(list_tree(&dest).is_empty());
}

#[test]
fn test_tar_absolute_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("abs.tar");
    fs::write(&archive, tar_bytes(&[TarEntry::File("/abs.txt", b"x")])).unwrap();

    let err = extract_to(&archive, &dir.path().join("dest")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Traversal);
}

#[test]
fn test_tar_inner_dotdot_that_stays_inside_is_accepted() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("inner.tar");
    fs::write(
        &archive,
        tar_bytes(&[
            TarEntry::Dir("a/"),
            TarEntry::File("a/../b.txt", b"fine"),
        ]),
    )
    .unwrap();

    let dest = dir.path().join("dest");
    extract_to(&archive, &dest).unwrap();
    assert_eq!(list_tree(&dest), ["a/", "b.txt"]);
}

#[test]
fn test_zip_traversal_is_rejected() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("evil.zip");
    fs::write(&archive, zip_bytes(&[("../evil.txt", b"gotcha")])).unwrap();

    let dest = dir.path().join("dest");
    let err = extract_to(&archive, &dest).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Traversal);
    assert!(!dir.path().join("evil.txt").exists());
}

#[test]
fn test_entries_before_traversal_stay_on_disk() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("partial.tar");
    fs::write(
        &archive,
        tar_bytes(&[
            TarEntry::File("one.txt", b"1"),
            TarEntry::File("two.txt", b"2"),
            TarEntry::File("three.txt", b"3"),
            TarEntry::File("../four.txt", b"4"),
            TarEntry::File("five.txt", b"5"),
        ]),
    )
    .unwrap();

    let dest = dir.path().join("dest");
    let stats = StatisticsProgress::new();
    let options = ExtractOptions::new().progress(stats.clone());
    let err = xarc::extract(&archive, Some(&dest), options).unwrap_err();
    assert!(matches!(err, Error::PathTraversal { entry_index: 3, .. }));

    let stats = stats.snapshot();
    assert_eq!(stats.completed, ["one.txt", "two.txt", "three.txt"]);
    assert_eq!(stats.failed, ["../four.txt"]);

    assert_eq!(list_tree(&dest), ["one.txt", "three.txt", "two.txt"]);
    assert!(!dir.path().join("four.txt").exists());
    assert!(!dest.join("five.txt").exists());
}

#[test]
fn test_symlink_entry_is_skipped() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("links.tar");
    fs::write(
        &archive,
        tar_bytes(&[
            TarEntry::File("real.txt", b"data"),
            TarEntry::Symlink("link.txt", "/etc/passwd"),
        ]),
    )
    .unwrap();

    let dest = dir.path().join("dest");
    let stats = StatisticsProgress::new();
    let options = ExtractOptions::new().progress(stats.clone());
    let result = xarc::extract(&archive, Some(&dest), options).unwrap();
    assert_eq!(result.entries_extracted, 1);
    assert_eq!(result.entries_skipped, 1);
    assert!(fs::symlink_metadata(dest.join("link.txt")).is_err());

    let stats = stats.snapshot();
    assert_eq!(stats.completed, ["real.txt", "link.txt"]);
    assert_eq!(stats.warnings.len(), 1);
    assert!(stats.warnings[0].contains("link.txt"));
}

#[test]
fn test_root_directory_entry_is_skipped() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("dot.tar");
    fs::write(
        &archive,
        tar_bytes(&[TarEntry::Dir("./"), TarEntry::File("./a.txt", b"a")]),
    )
    .unwrap();

    let dest = dir.path().join("dest");
    let result = extract_to(&archive, &dest).unwrap();
    assert_eq!(result.entries_skipped, 1);
    assert_eq!(result.directories_created, 0);
    assert_eq!(list_tree(&dest), ["a.txt"]);
}

#[test]
fn test_unknown_format() {
    let dir = TempDir::new().unwrap();
    let blob = dir.path().join("blob.dat");
    fs::write(&blob, b"just some bytes that are not an archive at all").unwrap();

    let err = xarc::extract(&blob, None, ExtractOptions::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Identify);
    assert!(matches!(err, Error::UnknownFormat { .. }));
}

#[test]
fn test_seven_zip_is_unsupported_for_extraction() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("archive.7z");
    let mut bytes = vec![b'7', b'z', 0xBC, 0xAF, 0x27, 0x1C];
    bytes.resize(64, 0);
    fs::write(&archive, bytes).unwrap();

    let dest = dir.path().join("dest");
    let err = extract_to(&archive, &dest).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedCapability);
    assert!(!dest.exists());
}

#[cfg(feature = "gzip")]
#[test]
fn test_truncated_compressed_tar() {
    use std::io::Write;
    use xarc::codec::{Codec, build_encoder};

    // Incompressible content keeps the compressed stream long enough to cut.
    let mut state = 0x2545_f491_u32;
    let noise: Vec<u8> = (0..64 * 1024)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect();
    let tar = tar_bytes(&[TarEntry::File("noise.bin", &noise)]);

    let mut encoder = build_encoder(Codec::Gzip, Vec::new(), None).unwrap();
    encoder.write_all(&tar).unwrap();
    let compressed = encoder.finish().unwrap();

    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("cut.tar.gz");
    fs::write(&archive, &compressed[..compressed.len() / 2]).unwrap();

    let err = extract_to(&archive, &dir.path().join("dest")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_garbage_zip_is_reported() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("broken.zip");
    let mut bytes = b"PK\x03\x04".to_vec();
    bytes.extend_from_slice(&[0xFF; 60]);
    fs::write(&archive, bytes).unwrap();

    let err = extract_to(&archive, &dir.path().join("dest")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_destination_holding_the_input_is_refused() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("dest");
    fs::create_dir(&dest).unwrap();
    let archive = dest.join("inside.tar");
    fs::write(&archive, tar_bytes(&[TarEntry::File("a.txt", b"a")])).unwrap();

    let err = extract_to(&archive, &dest).unwrap_err();
    assert!(matches!(err, Error::UnsafeDestination { .. }));
    assert!(archive.exists());
}
