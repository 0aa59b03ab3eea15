//! Content-based format identification.
//!
//! [`identify`] combines the extension table from [`Format::from_path`] with
//! the leading bytes of the stream. The bytes consumed while sniffing are kept
//! in a [`SniffReader`] and replayed to whoever processes the stream next, so
//! identification works on non-seekable inputs too.

use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use super::{ArchiveKind, ForeignKind, Format};
use crate::codec::{self, Codec};
use crate::{Error, Result};

/// Number of leading bytes inspected by [`identify`] (8 KiB).
pub const SNIFF_LEN: usize = 8 * 1024;

/// Container signatures, checked before codec signatures.
const SIGNATURES: &[(&[u8], Format)] = &[
    // ZIP: 'P' 'K' 0x03 0x04 (local file header)
    (&[0x50, 0x4B, 0x03, 0x04], Format::Archive(ArchiveKind::Zip)),
    // ZIP: 'P' 'K' 0x05 0x06 (empty archive)
    (&[0x50, 0x4B, 0x05, 0x06], Format::Archive(ArchiveKind::Zip)),
    // 7z: '7' 'z' 0xBC 0xAF 0x27 0x1C
    (
        &[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C],
        Format::Foreign(ForeignKind::SevenZip),
    ),
    // RAR4 and RAR5 share this prefix
    (
        &[0x52, 0x61, 0x72, 0x21, 0x1A, 0x07],
        Format::Foreign(ForeignKind::Rar),
    ),
];

/// TAR USTAR signature at offset 257.
const TAR_USTAR_OFFSET: usize = 257;
const TAR_USTAR_SIGNATURE: &[u8] = b"ustar";

/// A reader that replays a sniffed prefix before reading from the inner reader.
///
/// Implements [`Seek`] when the inner reader does; seeking discards whatever
/// is left of the prefix and repositions the inner reader directly.
#[derive(Debug)]
pub struct SniffReader<R> {
    inner: R,
    prefix: Vec<u8>,
    pos: usize,
}

impl<R> SniffReader<R> {
    fn new(inner: R, prefix: Vec<u8>) -> Self {
        Self {
            inner,
            prefix,
            pos: 0,
        }
    }

    /// Returns the bytes that were read while sniffing.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Consumes the wrapper and returns the inner reader.
    ///
    /// Any prefix bytes not yet replayed are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn buffered(&self) -> usize {
        self.prefix.len() - self.pos
    }
}

impl<R: Read> Read for SniffReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.prefix.len() {
            let n = buf.len().min(self.buffered());
            buf[..n].copy_from_slice(&self.prefix[self.pos..self.pos + n]);
            self.pos += n;
            return Ok(n);
        }
        self.inner.read(buf)
    }
}

impl<R: Seek> Seek for SniffReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        // The inner reader is ahead of the logical position by the
        // unreplayed part of the prefix.
        let pos = match pos {
            SeekFrom::Current(offset) => SeekFrom::Current(offset - self.buffered() as i64),
            other => other,
        };
        let new_pos = self.inner.seek(pos)?;
        self.pos = self.prefix.len();
        Ok(new_pos)
    }
}

/// Identifies the format of `reader`, whose name is `path`.
///
/// Up to [`SNIFF_LEN`] leading bytes are read and matched against known
/// signatures:
///
/// - zip, 7z, rar and ustar signatures win over the extension;
/// - a codec signature selects the codec; the result is a compressed tar when
///   the extension names a tar container or the decoded prefix starts with a
///   ustar header, and a plain compressed stream otherwise;
/// - without a signature the extension decides.
///
/// Returns [`Error::UnknownFormat`] if neither identifies a format. The
/// returned [`SniffReader`] yields the complete stream, prefix included.
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// use xarc::format::{ArchiveKind, Format, identify};
///
/// // An empty zip archive, misnamed.
/// let data = [0x50, 0x4B, 0x05, 0x06, 0, 0, 0, 0];
/// let (format, _reader) = identify("archive.bin", Cursor::new(data)).unwrap();
/// assert_eq!(format, Format::Archive(ArchiveKind::Zip));
/// ```
pub fn identify<R: Read>(path: impl AsRef<Path>, mut reader: R) -> Result<(Format, SniffReader<R>)> {
    let path = path.as_ref();
    let prefix = read_prefix(&mut reader).map_err(|e| Error::io_at("read", path, e))?;
    let by_name = Format::match_extension(path);

    let format = match_signature(&prefix, by_name).or(by_name);
    log::debug!(
        "identified '{}' as {:?} (extension: {:?})",
        path.display(),
        format,
        by_name
    );

    match format {
        Some(format) => Ok((format, SniffReader::new(reader, prefix))),
        None => Err(Error::UnknownFormat {
            name: path.to_path_buf(),
        }),
    }
}

fn match_signature(prefix: &[u8], by_name: Option<Format>) -> Option<Format> {
    for (signature, format) in SIGNATURES {
        if prefix.starts_with(signature) {
            return Some(*format);
        }
    }

    if has_ustar_header(prefix) {
        return Some(Format::Archive(ArchiveKind::Tar));
    }

    let codec = Codec::ALL
        .into_iter()
        .find(|codec| codec.magic().is_some_and(|magic| prefix.starts_with(magic)))?;

    let named_tar = matches!(
        by_name,
        Some(Format::CompressedArchive(_)) | Some(Format::Archive(ArchiveKind::Tar))
    );
    if named_tar || decodes_to_tar(codec, prefix) {
        Some(Format::CompressedArchive(codec))
    } else {
        Some(Format::Compressed(codec))
    }
}

fn has_ustar_header(data: &[u8]) -> bool {
    data.get(TAR_USTAR_OFFSET..TAR_USTAR_OFFSET + TAR_USTAR_SIGNATURE.len())
        == Some(TAR_USTAR_SIGNATURE)
}

/// Decodes the start of a compressed prefix and checks for a ustar header.
///
/// The prefix is usually a truncated stream, so decoder errors simply mean
/// "not enough data" and yield `false`.
fn decodes_to_tar(codec: Codec, prefix: &[u8]) -> bool {
    let Ok(mut decoder) = codec::build_decoder(codec, Cursor::new(prefix.to_vec())) else {
        return false;
    };
    let mut header = [0u8; 512];
    let mut filled = 0;
    while filled < header.len() {
        match decoder.read(&mut header[filled..]) {
            Ok(0) | Err(_) => break,
            Ok(n) => filled += n,
        }
    }
    has_ustar_header(&header[..filled])
}

fn read_prefix<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut prefix = vec![0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < SNIFF_LEN {
        match reader.read(&mut prefix[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    prefix.truncate(filled);
    Ok(prefix)
}
