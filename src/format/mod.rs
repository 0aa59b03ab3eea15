//! Format descriptors and extension-based identification.
//!
//! A [`Format`] names one concrete archive or compression variant. It is
//! produced by [`Format::from_path`] (creation) or by
//! [`detect::identify`] (extraction, with content sniffing) and is immutable
//! afterwards.

pub mod detect;

use std::path::Path;

use crate::codec::Codec;
use crate::{Error, Result};

pub use detect::{SNIFF_LEN, SniffReader, identify};

/// A multi-entry container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// TAR archive.
    Tar,
    /// ZIP archive.
    Zip,
}

impl ArchiveKind {
    /// Returns the canonical extension, including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveKind::Tar => ".tar",
            ArchiveKind::Zip => ".zip",
        }
    }
}

/// A format that is recognised but supported by no role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForeignKind {
    /// 7z archive.
    SevenZip,
    /// RAR archive (v4 or v5).
    Rar,
}

impl ForeignKind {
    /// Returns the canonical extension, including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ForeignKind::SevenZip => ".7z",
            ForeignKind::Rar => ".rar",
        }
    }
}

/// What a format can do, independent of direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Bundles multiple named entries with metadata (archive/extract).
    pub bundle: bool,
    /// Transforms a single byte stream (compress/decompress).
    pub stream: bool,
}

/// A concrete archive or compression format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// An uncompressed container.
    Archive(ArchiveKind),
    /// A TAR archive wrapped in a compression codec.
    CompressedArchive(Codec),
    /// A single compressed stream.
    Compressed(Codec),
    /// A recognised format this tool cannot process.
    Foreign(ForeignKind),
}

/// Known extensions, longest first so that `.tar.gz` wins over `.gz`.
const EXTENSIONS: &[(&str, Format)] = &[
    (".tar.zst", Format::CompressedArchive(Codec::Zstd)),
    (".tar.bz2", Format::CompressedArchive(Codec::Bzip2)),
    (".tar.lz4", Format::CompressedArchive(Codec::Lz4)),
    (".tar.gz", Format::CompressedArchive(Codec::Gzip)),
    (".tar.xz", Format::CompressedArchive(Codec::Xz)),
    (".tar.br", Format::CompressedArchive(Codec::Brotli)),
    (".tzst", Format::CompressedArchive(Codec::Zstd)),
    (".tbz2", Format::CompressedArchive(Codec::Bzip2)),
    (".tbz", Format::CompressedArchive(Codec::Bzip2)),
    (".tgz", Format::CompressedArchive(Codec::Gzip)),
    (".txz", Format::CompressedArchive(Codec::Xz)),
    (".tar", Format::Archive(ArchiveKind::Tar)),
    (".zip", Format::Archive(ArchiveKind::Zip)),
    (".bz2", Format::Compressed(Codec::Bzip2)),
    (".zst", Format::Compressed(Codec::Zstd)),
    (".lz4", Format::Compressed(Codec::Lz4)),
    (".rar", Format::Foreign(ForeignKind::Rar)),
    (".gz", Format::Compressed(Codec::Gzip)),
    (".xz", Format::Compressed(Codec::Xz)),
    (".br", Format::Compressed(Codec::Brotli)),
    (".7z", Format::Foreign(ForeignKind::SevenZip)),
];

impl Format {
    /// Identifies a format from the extension of `path`.
    ///
    /// Matching is case-insensitive and prefers the longest known suffix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use xarc::codec::Codec;
    /// use xarc::format::Format;
    ///
    /// assert_eq!(
    ///     Format::from_path("backup.TAR.GZ").unwrap(),
    ///     Format::CompressedArchive(Codec::Gzip)
    /// );
    /// assert_eq!(Format::from_path("notes.gz").unwrap(), Format::Compressed(Codec::Gzip));
    /// assert!(Format::from_path("notes.txt").is_err());
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<Format> {
        let path = path.as_ref();
        Self::match_extension(path).ok_or_else(|| Error::UnknownFormat {
            name: path.to_path_buf(),
        })
    }

    /// Matches the extension table against the file name of `path`.
    pub(crate) fn match_extension(path: &Path) -> Option<Format> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(ext, _)| name.len() > ext.len() && name.ends_with(ext))
            .map(|(_, format)| *format)
    }

    /// Returns the canonical extension, including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Archive(kind) => kind.extension(),
            Format::CompressedArchive(Codec::Gzip) => ".tar.gz",
            Format::CompressedArchive(Codec::Bzip2) => ".tar.bz2",
            Format::CompressedArchive(Codec::Xz) => ".tar.xz",
            Format::CompressedArchive(Codec::Zstd) => ".tar.zst",
            Format::CompressedArchive(Codec::Lz4) => ".tar.lz4",
            Format::CompressedArchive(Codec::Brotli) => ".tar.br",
            Format::Compressed(codec) => codec.extension(),
            Format::Foreign(kind) => kind.extension(),
        }
    }

    /// Returns the roles this format can fill.
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Format::Archive(_) => Capabilities {
                bundle: true,
                stream: false,
            },
            Format::CompressedArchive(_) => Capabilities {
                bundle: true,
                stream: true,
            },
            Format::Compressed(_) => Capabilities {
                bundle: false,
                stream: true,
            },
            Format::Foreign(_) => Capabilities::default(),
        }
    }

    /// Returns the compression codec, if the format has one.
    pub fn codec(&self) -> Option<Codec> {
        match self {
            Format::CompressedArchive(codec) | Format::Compressed(codec) => Some(*codec),
            Format::Archive(_) | Format::Foreign(_) => None,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Archive(ArchiveKind::Tar) => f.write_str("TAR"),
            Format::Archive(ArchiveKind::Zip) => f.write_str("ZIP"),
            Format::CompressedArchive(codec) => write!(f, "TAR+{}", codec),
            Format::Compressed(codec) => f.write_str(codec.name()),
            Format::Foreign(ForeignKind::SevenZip) => f.write_str("7-Zip"),
            Format::Foreign(ForeignKind::Rar) => f.write_str("RAR"),
        }
    }
}
