//! Single-stream compression codecs.
//!
//! The byte-level algorithms are provided by external crates; this module
//! names them ([`Codec`]) and builds boxed encoders and decoders for them, so
//! the rest of the crate can treat every codec uniformly.
//!
//! Codecs whose Cargo feature is disabled stay in the [`Codec`] enum and fail
//! with [`Error::CodecUnavailable`] when an encoder or decoder is requested.

use std::io::{self, Read, Write};

use crate::{Error, Result};

/// A single-stream compression codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// gzip (deflate with gzip framing).
    Gzip,
    /// bzip2.
    Bzip2,
    /// XZ (LZMA2 with xz framing).
    Xz,
    /// Zstandard.
    Zstd,
    /// LZ4 frame format.
    Lz4,
    /// Brotli. Has no magic bytes and is identified by extension only.
    Brotli,
}

impl Codec {
    /// All codecs, in detection order.
    pub const ALL: [Codec; 6] = [
        Codec::Gzip,
        Codec::Bzip2,
        Codec::Xz,
        Codec::Zstd,
        Codec::Lz4,
        Codec::Brotli,
    ];

    /// Returns the canonical extension, including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Codec::Gzip => ".gz",
            Codec::Bzip2 => ".bz2",
            Codec::Xz => ".xz",
            Codec::Zstd => ".zst",
            Codec::Lz4 => ".lz4",
            Codec::Brotli => ".br",
        }
    }

    /// Returns a human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Codec::Gzip => "gzip",
            Codec::Bzip2 => "bzip2",
            Codec::Xz => "XZ",
            Codec::Zstd => "Zstandard",
            Codec::Lz4 => "LZ4",
            Codec::Brotli => "Brotli",
        }
    }

    /// Returns the leading bytes of a stream produced by this codec, if any.
    pub fn magic(self) -> Option<&'static [u8]> {
        match self {
            // gzip: 0x1F 0x8B
            Codec::Gzip => Some(&[0x1F, 0x8B]),
            // bzip2: 'B' 'Z' 'h'
            Codec::Bzip2 => Some(&[0x42, 0x5A, 0x68]),
            // XZ: 0xFD '7' 'z' 'X' 'Z' 0x00
            Codec::Xz => Some(&[0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00]),
            // Zstd: 0x28 0xB5 0x2F 0xFD
            Codec::Zstd => Some(&[0x28, 0xB5, 0x2F, 0xFD]),
            // LZ4: 0x04 0x22 0x4D 0x18 (frame format)
            Codec::Lz4 => Some(&[0x04, 0x22, 0x4D, 0x18]),
            Codec::Brotli => None,
        }
    }

    /// Returns whether support for this codec was compiled in.
    pub fn is_available(self) -> bool {
        match self {
            Codec::Gzip => cfg!(feature = "gzip"),
            Codec::Bzip2 => cfg!(feature = "bzip2"),
            Codec::Xz => cfg!(feature = "xz"),
            Codec::Zstd => cfg!(feature = "zstd"),
            Codec::Lz4 => cfg!(feature = "lz4"),
            Codec::Brotli => cfg!(feature = "brotli"),
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A streaming encoder that must be finished explicitly.
///
/// Dropping an encoder may silently lose the stream trailer; call
/// [`finish`](Encoder::finish) to write it and observe errors.
pub trait Encoder<W: Write>: Write {
    /// Writes the stream trailer and returns the inner writer.
    fn finish(self: Box<Self>) -> io::Result<W>;
}

#[cfg(feature = "gzip")]
impl<W: Write> Encoder<W> for flate2::write::GzEncoder<W> {
    fn finish(self: Box<Self>) -> io::Result<W> {
        (*self).finish()
    }
}

#[cfg(feature = "bzip2")]
impl<W: Write> Encoder<W> for bzip2::write::BzEncoder<W> {
    fn finish(self: Box<Self>) -> io::Result<W> {
        (*self).finish()
    }
}

#[cfg(feature = "xz")]
impl<W: Write> Encoder<W> for xz2::write::XzEncoder<W> {
    fn finish(self: Box<Self>) -> io::Result<W> {
        (*self).finish()
    }
}

#[cfg(feature = "zstd")]
impl<W: Write> Encoder<W> for zstd::stream::write::Encoder<'static, W> {
    fn finish(self: Box<Self>) -> io::Result<W> {
        (*self).finish()
    }
}

#[cfg(feature = "lz4")]
impl<W: Write> Encoder<W> for lz4_flex::frame::FrameEncoder<W> {
    fn finish(self: Box<Self>) -> io::Result<W> {
        (*self).finish().map_err(io::Error::other)
    }
}

#[cfg(feature = "brotli")]
impl<W: Write> Encoder<W> for brotli::CompressorWriter<W> {
    fn finish(mut self: Box<Self>) -> io::Result<W> {
        self.flush()?;
        Ok((*self).into_inner())
    }
}

#[cfg(feature = "brotli")]
const BROTLI_BUFFER_SIZE: usize = 4096;
#[cfg(feature = "brotli")]
const BROTLI_WINDOW_BITS: u32 = 22;

/// Builds an encoder for `codec` writing into `writer`.
///
/// `level` is codec specific and clamped to the codec's range; `None` selects
/// the codec's default level.
#[allow(unused_variables)]
pub fn build_encoder<W: Write + 'static>(
    codec: Codec,
    writer: W,
    level: Option<u32>,
) -> Result<Box<dyn Encoder<W>>> {
    match codec {
        #[cfg(feature = "gzip")]
        Codec::Gzip => {
            let level = level
                .map(|l| flate2::Compression::new(l.min(9)))
                .unwrap_or_default();
            Ok(Box::new(flate2::write::GzEncoder::new(writer, level)))
        }
        #[cfg(feature = "bzip2")]
        Codec::Bzip2 => {
            let level = level
                .map(|l| bzip2::Compression::new(l.clamp(1, 9)))
                .unwrap_or_default();
            Ok(Box::new(bzip2::write::BzEncoder::new(writer, level)))
        }
        #[cfg(feature = "xz")]
        Codec::Xz => Ok(Box::new(xz2::write::XzEncoder::new(
            writer,
            level.unwrap_or(6).min(9),
        ))),
        #[cfg(feature = "zstd")]
        Codec::Zstd => {
            // Level 0 selects the zstd default.
            let level = level.map(|l| l.min(22) as i32).unwrap_or(0);
            Ok(Box::new(zstd::stream::write::Encoder::new(writer, level)?))
        }
        #[cfg(feature = "lz4")]
        Codec::Lz4 => Ok(Box::new(lz4_flex::frame::FrameEncoder::new(writer))),
        #[cfg(feature = "brotli")]
        Codec::Brotli => Ok(Box::new(brotli::CompressorWriter::new(
            writer,
            BROTLI_BUFFER_SIZE,
            level.unwrap_or(9).min(11),
            BROTLI_WINDOW_BITS,
        ))),
        #[allow(unreachable_patterns)]
        other => Err(Error::CodecUnavailable {
            codec: other.name(),
        }),
    }
}

/// Builds a decoder for `codec` reading from `reader`.
///
/// Multi-member gzip, bzip2 and xz streams are decoded as one stream.
#[allow(unused_variables)]
pub fn build_decoder<R: Read + 'static>(codec: Codec, reader: R) -> Result<Box<dyn Read>> {
    match codec {
        #[cfg(feature = "gzip")]
        Codec::Gzip => Ok(Box::new(flate2::read::MultiGzDecoder::new(reader))),
        #[cfg(feature = "bzip2")]
        Codec::Bzip2 => Ok(Box::new(bzip2::read::MultiBzDecoder::new(reader))),
        #[cfg(feature = "xz")]
        Codec::Xz => Ok(Box::new(xz2::read::XzDecoder::new_multi_decoder(reader))),
        #[cfg(feature = "zstd")]
        Codec::Zstd => Ok(Box::new(zstd::stream::read::Decoder::new(reader)?)),
        #[cfg(feature = "lz4")]
        Codec::Lz4 => Ok(Box::new(lz4_flex::frame::FrameDecoder::new(reader))),
        #[cfg(feature = "brotli")]
        Codec::Brotli => Ok(Box::new(brotli::Decompressor::new(
            reader,
            BROTLI_BUFFER_SIZE,
        ))),
        #[allow(unreachable_patterns)]
        other => Err(Error::CodecUnavailable {
            codec: other.name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(codec: Codec, data: &[u8]) -> Vec<u8> {
        let mut encoder = build_encoder(codec, Vec::new(), None).unwrap();
        encoder.write_all(data).unwrap();
        let compressed = encoder.finish().unwrap();

        if let Some(magic) = codec.magic() {
            assert!(compressed.starts_with(magic), "{} output lacks magic", codec);
        }

        let mut decoder = build_decoder(codec, Cursor::new(compressed)).unwrap();
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_available_codecs_roundtrip() {
        let data = b"The quick brown fox jumps over the lazy dog. ".repeat(50);
        for codec in Codec::ALL {
            if codec.is_available() {
                assert_eq!(roundtrip(codec, &data), data, "{} roundtrip", codec);
            }
        }
    }

    #[test]
    fn test_level_is_clamped() {
        for codec in Codec::ALL {
            if codec.is_available() {
                let mut encoder = build_encoder(codec, Vec::new(), Some(1000)).unwrap();
                encoder.write_all(b"level").unwrap();
                assert!(!encoder.finish().unwrap().is_empty());
            }
        }
    }

    #[test]
    fn test_unavailable_codec_reports_name() {
        for codec in Codec::ALL {
            if !codec.is_available() {
                let err = build_decoder(codec, Cursor::new(Vec::new())).err().unwrap();
                assert!(matches!(err, Error::CodecUnavailable { .. }));
            }
        }
    }

    #[test]
    fn test_extensions_have_leading_dot() {
        for codec in Codec::ALL {
            assert!(codec.extension().starts_with('.'));
        }
    }
}
