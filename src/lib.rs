//! # xarc
//!
//! Create and safely extract tar, zip and compressed files.
//!
//! The crate identifies the format of a file from its name and leading
//! bytes, selects the role that can process it (archiver, compressor,
//! extractor or decompressor) and streams the data through the matching
//! container and codec crates. Extraction never writes outside the
//! destination directory.
//!
//! ## Quick Start
//!
//! ### Creating an Archive
//!
//! ```rust,no_run
//! use xarc::{CreateOptions, Result};
//!
//! fn main() -> Result<()> {
//!     // The output name selects the format: tar inside zstd.
//!     let result = xarc::create("backup.tar.zst", &["src", "Cargo.toml"], CreateOptions::new())?;
//!     println!("Wrote {} entries", result.entries_written);
//!
//!     // Single-stream formats take exactly one regular file.
//!     xarc::create("notes.txt.gz", &["notes.txt"], CreateOptions::new().level(9))?;
//!     Ok(())
//! }
//! ```
//!
//! ### Extracting an Archive
//!
//! ```rust,no_run
//! use std::path::Path;
//! use xarc::{ExtractOptions, Result};
//!
//! fn main() -> Result<()> {
//!     // Output derived from the input name: `backup/`.
//!     let result = xarc::extract("backup.tar.zst", None, ExtractOptions::new())?;
//!     println!("{} files in {}", result.entries_extracted, result.output.display());
//!
//!     // Explicit output for a compressed stream.
//!     xarc::extract("notes.txt.gz", Some(Path::new("notes.txt")), ExtractOptions::new())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Formats
//!
//! | Format | Extensions | Create | Extract |
//! |--------|------------|--------|---------|
//! | tar | `.tar` | archive | extract |
//! | zip | `.zip` | archive | extract |
//! | compressed tar | `.tar.gz` `.tgz` `.tar.bz2` `.tbz2` `.tar.xz` `.txz` `.tar.zst` `.tzst` `.tar.lz4` `.tar.br` | archive | extract |
//! | compressed file | `.gz` `.bz2` `.xz` `.zst` `.lz4` `.br` | compress | decompress |
//! | 7z, RAR | `.7z` `.rar` | no | no |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `gzip` | Yes | gzip support via `flate2` |
//! | `bzip2` | Yes | bzip2 support |
//! | `xz` | Yes | XZ support via `xz2` |
//! | `zstd` | Yes | Zstandard support |
//! | `lz4` | Yes | LZ4 frame support via `lz4_flex` |
//! | `brotli` | No | Brotli support |
//! | `cli` | No | Command-line interface tool |
//!
//! A codec whose feature is disabled is still recognised, and fails with
//! [`Error::CodecUnavailable`] when used.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`]. [`Error::kind`] classifies every
//! failure into an [`ErrorKind`]; the first failure aborts the operation.
//!
//! ## Safety
//!
//! - **Path traversal protection**: entry names are sanitized by
//!   [`safety::sanitize_entry_path`] before anything is written
//! - **No links**: symbolic links, hard links and devices in archives are skipped
//! - **Destination guard**: the extraction directory is never one that holds
//!   the input archive or the current directory
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod codec;
pub mod copy;
pub mod create;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod format;
pub mod progress;
pub mod safety;

pub use codec::Codec;
pub use create::{CreateOptions, CreateResult, InputFile, InputFileSet, create};
pub use dispatch::{Direction, Role, select_role};
pub use error::{ArityError, Error, ErrorKind, Result};
pub use extract::{ExtractOptions, ExtractResult, ExtractionSession, derive_output_path, extract};
pub use format::{Format, identify};
pub use progress::{CancelFlag, NoProgress, ProgressReporter, StatisticsProgress};
