//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::fs;
use std::path::{Component, Path, PathBuf};

/// One entry of a hand-built tar archive.
pub enum TarEntry<'a> {
    /// Regular file with content.
    File(&'a str, &'a [u8]),
    /// Directory.
    Dir(&'a str),
    /// Symbolic link pointing at a target.
    Symlink(&'a str, &'a str),
}

/// Builds a tar archive with raw, unvalidated entry names.
///
/// `tar::Builder::append_data` refuses names containing `..`, so names are
/// written straight into the old-style header field (at most 100 bytes).
pub fn tar_bytes(entries: &[TarEntry<'_>]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());

    for entry in entries {
        let mut header = tar::Header::new_gnu();
        let (name, data): (&str, &[u8]) = match entry {
            TarEntry::File(name, data) => {
                header.set_entry_type(tar::EntryType::Regular);
                header.set_mode(0o644);
                (name, data)
            }
            TarEntry::Dir(name) => {
                header.set_entry_type(tar::EntryType::Directory);
                header.set_mode(0o755);
                (name, &[])
            }
            TarEntry::Symlink(name, target) => {
                header.set_entry_type(tar::EntryType::Symlink);
                header.set_mode(0o777);
                header.set_link_name(target).expect("link name");
                (name, &[])
            }
        };

        let raw = name.as_bytes();
        assert!(raw.len() < 100, "test entry name too long: {}", name);
        header.as_old_mut().name[..raw.len()].copy_from_slice(raw);
        header.set_size(data.len() as u64);
        header.set_mtime(1_600_000_000);
        header.set_cksum();
        builder.append(&header, data).expect("append tar entry");
    }

    builder.into_inner().expect("finish tar")
}

/// Builds a zip archive with raw entry names.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    use std::io::Write;

    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default().unix_permissions(0o644);
    for (name, data) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).expect("add directory");
        } else {
            zip.start_file(*name, options).expect("start file");
            zip.write_all(data).expect("write file");
        }
    }
    zip.finish().expect("finish zip").into_inner()
}

/// Writes `files` below `root`, creating parent directories.
pub fn write_tree(root: &Path, files: &[(&str, &[u8])]) {
    for (name, data) in files {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, data).expect("write file");
    }
}

/// Returns where an input path ends up inside an archive.
///
/// Absolute input paths lose their root component when archived.
pub fn stored_name(path: &Path) -> PathBuf {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// Lists all files and directories below `root`, relative and sorted.
pub fn list_tree(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|e| e.expect("walk"))
        .map(|e| {
            let rel = e.path().strip_prefix(root).expect("prefix");
            let name = rel.to_string_lossy().replace('\\', "/");
            if e.file_type().is_dir() {
                format!("{}/", name)
            } else {
                name
            }
        })
        .collect();
    names.sort();
    names
}
