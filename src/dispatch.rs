//! Mapping from a [`Format`] to the role that processes it.
//!
//! Every format resolves to exactly one [`Role`] per [`Direction`]. Bundling
//! (archiving/extracting) is preferred over streaming (compressing/
//! decompressing) when a format supports both, which is the case for
//! compressed tar archives.

use crate::codec::Codec;
use crate::format::{ArchiveKind, Format};

/// Whether files are being packed or unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Archiving or compression.
    Create,
    /// Extraction or decompression.
    Read,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Create => f.write_str("archiving or compression"),
            Direction::Read => f.write_str("extraction or decompression"),
        }
    }
}

/// A multi-entry container, optionally wrapped in a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Archival {
    /// The container.
    pub kind: ArchiveKind,
    /// Codec wrapping the container, if any.
    pub compression: Option<Codec>,
}

/// The processing role selected for a format and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Bundles inputs into a container.
    Archiver(Archival),
    /// Compresses a single input stream.
    Compressor(Codec),
    /// Unpacks a container's entries.
    Extractor(Archival),
    /// Decompresses a single stream.
    Decompressor(Codec),
    /// The format supports no role for the direction.
    Unsupported,
}

impl Role {
    /// Returns a short lowercase name, e.g. `"archiver"`.
    pub fn name(&self) -> &'static str {
        match self {
            Role::Archiver(_) => "archiver",
            Role::Compressor(_) => "compressor",
            Role::Extractor(_) => "extractor",
            Role::Decompressor(_) => "decompressor",
            Role::Unsupported => "unsupported",
        }
    }
}

/// Selects the role for `format` in `direction`.
///
/// # Example
///
/// ```rust
/// use xarc::codec::Codec;
/// use xarc::dispatch::{Direction, Role, select_role};
/// use xarc::format::Format;
///
/// let role = select_role(Format::Compressed(Codec::Gzip), Direction::Read);
/// assert_eq!(role, Role::Decompressor(Codec::Gzip));
/// ```
pub fn select_role(format: Format, direction: Direction) -> Role {
    let archival = match format {
        Format::Archive(kind) => Some(Archival {
            kind,
            compression: None,
        }),
        Format::CompressedArchive(codec) => Some(Archival {
            kind: ArchiveKind::Tar,
            compression: Some(codec),
        }),
        Format::Compressed(_) | Format::Foreign(_) => None,
    };

    match (archival, format.codec(), direction) {
        (Some(archival), _, Direction::Create) => Role::Archiver(archival),
        (Some(archival), _, Direction::Read) => Role::Extractor(archival),
        (None, Some(codec), Direction::Create) => Role::Compressor(codec),
        (None, Some(codec), Direction::Read) => Role::Decompressor(codec),
        (None, None, _) => Role::Unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ForeignKind;

    #[test]
    fn test_archive_roles() {
        let zip = Format::Archive(ArchiveKind::Zip);
        let expected = Archival {
            kind: ArchiveKind::Zip,
            compression: None,
        };
        assert_eq!(select_role(zip, Direction::Create), Role::Archiver(expected));
        assert_eq!(select_role(zip, Direction::Read), Role::Extractor(expected));
    }

    #[test]
    fn test_compressed_archive_prefers_bundling() {
        let format = Format::CompressedArchive(Codec::Zstd);
        let expected = Archival {
            kind: ArchiveKind::Tar,
            compression: Some(Codec::Zstd),
        };
        assert_eq!(select_role(format, Direction::Create), Role::Archiver(expected));
        assert_eq!(select_role(format, Direction::Read), Role::Extractor(expected));
    }

    #[test]
    fn test_stream_roles() {
        let format = Format::Compressed(Codec::Xz);
        assert_eq!(select_role(format, Direction::Create), Role::Compressor(Codec::Xz));
        assert_eq!(select_role(format, Direction::Read), Role::Decompressor(Codec::Xz));
    }

    #[test]
    fn test_foreign_is_unsupported() {
        for kind in [ForeignKind::SevenZip, ForeignKind::Rar] {
            for direction in [Direction::Create, Direction::Read] {
                assert_eq!(select_role(Format::Foreign(kind), direction), Role::Unsupported);
            }
        }
    }

    #[test]
    fn test_role_matches_capabilities() {
        let formats = [
            Format::Archive(ArchiveKind::Tar),
            Format::CompressedArchive(Codec::Gzip),
            Format::Compressed(Codec::Lz4),
            Format::Foreign(ForeignKind::Rar),
        ];
        for format in formats {
            let caps = format.capabilities();
            let role = select_role(format, Direction::Create);
            match role {
                Role::Archiver(_) => assert!(caps.bundle),
                Role::Compressor(_) => assert!(!caps.bundle && caps.stream),
                Role::Unsupported => assert!(!caps.bundle && !caps.stream),
                other => panic!("create selected {other:?}"),
            }
        }
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Read.to_string(), "extraction or decompression");
    }
}
