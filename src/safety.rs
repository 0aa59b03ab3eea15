//! Path sanitization for archive extraction.
//!
//! Entry names inside an archive are untrusted. Before anything is written
//! for an entry, its name is lexically cleaned and checked to resolve to a
//! location strictly inside the destination root.
//!
//! # Security
//!
//! Path traversal attacks occur when an archive contains entries with names
//! like `../../../etc/passwd` or `/etc/passwd` that could escape the intended
//! extraction directory. [`sanitize_entry_path`] is the only gate between an
//! entry name and the filesystem.
//!
//! # Examples
//!
//! ```rust
//! use std::path::Path;
//! use xarc::safety::sanitize_entry_path;
//!
//! let dest = Path::new("/tmp/out");
//! let ok = sanitize_entry_path(dest, "docs/./readme.txt", 0).unwrap();
//! assert_eq!(ok.relative(), Path::new("docs/readme.txt"));
//!
//! assert!(sanitize_entry_path(dest, "../../etc/passwd", 1).is_err());
//! assert!(sanitize_entry_path(dest, "/etc/passwd", 2).is_err());
//! ```

use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// An entry name that was cleaned and verified to stay inside a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedPath {
    relative: PathBuf,
    full: PathBuf,
}

impl SanitizedPath {
    /// The cleaned path relative to the destination root.
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    /// The destination root joined with the cleaned path.
    pub fn full(&self) -> &Path {
        &self.full
    }

    /// Returns true if the name cleans to the root itself (e.g. `./`).
    pub fn is_root(&self) -> bool {
        self.relative.as_os_str().is_empty()
    }
}

/// Cleans `name` lexically and verifies it stays inside `dest_root`.
///
/// Rejects:
/// - empty names and names containing NUL bytes
/// - absolute names (a root or drive prefix component)
/// - `..` components that would climb above the root
///
/// `.` components are dropped and `..` components pop the preceding
/// component, so `a/../b` is accepted as `b`. The filesystem is not consulted.
///
/// `entry_index` is only used for error reporting.
pub fn sanitize_entry_path(dest_root: &Path, name: &str, entry_index: usize) -> Result<SanitizedPath> {
    let reject = || Error::PathTraversal {
        entry_index,
        path: name.to_string(),
    };

    if name.is_empty() || name.contains('\0') {
        return Err(reject());
    }

    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for component in Path::new(name).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => return Err(reject()),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(reject());
                }
            }
            Component::Normal(part) => parts.push(part),
        }
    }

    let relative: PathBuf = parts.iter().collect();
    let full = dest_root.join(&relative);

    // Normal components only; the result must still start with the root.
    if !full.starts_with(dest_root) {
        return Err(reject());
    }

    Ok(SanitizedPath { relative, full })
}
