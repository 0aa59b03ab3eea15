//! Error types for archive creation and extraction.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes of the `create` and `extract` operations, along with a
//! convenient [`Result<T>`] type alias and the coarse [`ErrorKind`] taxonomy
//! used by callers that only care about the category of a failure.
//!
//! # Error Handling
//!
//! Every error is terminal: the first failure aborts the remaining work of
//! the operation and is returned to the caller unchanged.
//!
//! ```rust,no_run
//! use xarc::{Error, ErrorKind, ExtractOptions};
//!
//! fn run(path: &str) -> xarc::Result<()> {
//!     match xarc::extract(path, None, ExtractOptions::default()) {
//!         Ok(_) => Ok(()),
//!         Err(e) if e.kind() == ErrorKind::Traversal => {
//!             eprintln!("refusing to extract a malicious archive: {}", e);
//!             Err(e)
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! # fn main() {}
//! ```

use std::io;
use std::path::PathBuf;

use crate::dispatch::Direction;
use crate::format::Format;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input enumeration failed.
    Discovery,
    /// The format or the output path could not be determined.
    Identify,
    /// The format lacks the role needed for the requested direction.
    UnsupportedCapability,
    /// Wrong input count for a single-stream format.
    Arity,
    /// An entry name escapes the destination root.
    Traversal,
    /// An open/read/write/remove/close failure.
    Io,
    /// The operation was cancelled between two steps.
    Cancelled,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Discovery => "discovery",
            Self::Identify => "identify",
            Self::UnsupportedCapability => "unsupported capability",
            Self::Arity => "arity",
            Self::Traversal => "traversal",
            Self::Io => "I/O",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Why a single-stream format rejected its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArityError {
    /// No input file was provided.
    NoInput,
    /// More than one input file was provided.
    MultipleInputs {
        /// Number of discovered inputs.
        count: usize,
    },
    /// The only input is a directory.
    DirectoryInput {
        /// The offending directory.
        path: PathBuf,
    },
}

impl std::fmt::Display for ArityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoInput => write!(f, "no input file was provided"),
            Self::MultipleInputs { count } => {
                write!(f, "{} input files were provided, expected exactly one", count)
            }
            Self::DirectoryInput { path } => {
                write!(f, "input '{}' is a directory", path.display())
            }
        }
    }
}

/// Which side of a stream copy failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopySide {
    /// Reading from the source failed.
    Read,
    /// Writing to the sink failed.
    Write,
}

impl std::fmt::Display for CopySide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => f.write_str("read from source"),
            Self::Write => f.write_str("write to sink"),
        }
    }
}

/// The main error type for archive operations.
///
/// # Error Categories
///
/// | Kind | Variants |
/// |------|----------|
/// | Discovery | [`Discovery`][Self::Discovery] |
/// | Identify | [`UnknownFormat`][Self::UnknownFormat], [`OutputPath`][Self::OutputPath] |
/// | Unsupported capability | [`UnsupportedCapability`][Self::UnsupportedCapability] |
/// | Arity | [`Arity`][Self::Arity] |
/// | Traversal | [`PathTraversal`][Self::PathTraversal] |
/// | I/O | [`Io`][Self::Io], [`IoAt`][Self::IoAt], [`Copy`][Self::Copy], [`InvalidArchive`][Self::InvalidArchive], [`UnsafeDestination`][Self::UnsafeDestination], [`CodecUnavailable`][Self::CodecUnavailable] |
/// | Cancelled | [`Cancelled`][Self::Cancelled] |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error without further context.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An I/O error while performing `action` on `path`.
    #[error("failed to {action} '{}': {source}", path.display())]
    IoAt {
        /// What was being attempted, e.g. "create output file".
        action: &'static str,
        /// The path involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// An input path could not be discovered.
    ///
    /// Returned when an input is missing or cannot be inspected while
    /// building the input file set.
    #[error("failed to discover files: '{}': {source}", path.display())]
    Discovery {
        /// The input that failed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// Neither the name nor the leading bytes identify a known format.
    #[error("failed to identify format of '{}'", name.display())]
    UnknownFormat {
        /// The path that was inspected.
        name: PathBuf,
    },

    /// No output path could be derived for an extraction.
    #[error(
        "cannot derive output path from '{}' (format {format}), please specify it manually",
        input.display()
    )]
    OutputPath {
        /// The input path.
        input: PathBuf,
        /// The identified format.
        format: Format,
    },

    /// The format supports no role for the requested direction.
    #[error("{format} does not support {direction}")]
    UnsupportedCapability {
        /// The identified format.
        format: Format,
        /// The requested direction.
        direction: Direction,
    },

    /// A single-stream format received the wrong number of inputs.
    #[error("{format} only supports compressing a single file, but {reason}")]
    Arity {
        /// The identified format.
        format: Format,
        /// What was wrong with the inputs.
        reason: ArityError,
    },

    /// Path traversal attack detected in an archive entry.
    ///
    /// This is a **security error**: the archive contains an entry such as
    /// `../../etc/passwd` or `/etc/passwd` that would land outside the
    /// extraction directory. Extraction stops at the offending entry.
    #[error("path traversal detected in entry {entry_index}: '{path}' escapes the destination")]
    PathTraversal {
        /// The index of the offending entry.
        entry_index: usize,
        /// The raw entry name.
        path: String,
    },

    /// A stream copy failed on one of its sides.
    #[error("failed to {side}: {source}")]
    Copy {
        /// The side that failed.
        side: CopySide,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The container could not be parsed.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// The destination would be removed together with something that must survive.
    #[error("refusing to replace '{}': it contains {reason}", path.display())]
    UnsafeDestination {
        /// The destination directory.
        path: PathBuf,
        /// What the destination contains.
        reason: &'static str,
    },

    /// The codec was not compiled in.
    #[error("{codec} support is not enabled in this build")]
    CodecUnavailable {
        /// The codec name.
        codec: &'static str,
    },

    /// The operation was cancelled.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Returns the coarse category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Discovery { .. } => ErrorKind::Discovery,
            Self::UnknownFormat { .. } | Self::OutputPath { .. } => ErrorKind::Identify,
            Self::UnsupportedCapability { .. } => ErrorKind::UnsupportedCapability,
            Self::Arity { .. } => ErrorKind::Arity,
            Self::PathTraversal { .. } => ErrorKind::Traversal,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Io(_)
            | Self::IoAt { .. }
            | Self::Copy { .. }
            | Self::InvalidArchive(_)
            | Self::UnsafeDestination { .. }
            | Self::CodecUnavailable { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io_at(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::IoAt {
            action,
            path: path.into(),
            source,
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        match e {
            zip::result::ZipError::Io(e) => Self::Io(e),
            other => Self::InvalidArchive(other.to_string()),
        }
    }
}

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;
