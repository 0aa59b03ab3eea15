//! Bounded-memory stream copying.

use std::io::{self, Read, Write};

use crate::error::CopySide;
use crate::{Error, Result};

/// Size of the intermediate buffer used by [`copy_stream`] (64 KiB).
pub const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Copies all bytes from `reader` to `writer` through a fixed-size buffer.
///
/// Returns the number of bytes copied. A failure on either side is returned
/// immediately as [`Error::Copy`] naming the side that failed; only
/// [`io::ErrorKind::Interrupted`] reads are retried.
///
/// The writer is not flushed.
pub fn copy_stream<R, W>(reader: &mut R, writer: &mut W) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(Error::Copy {
                    side: CopySide::Read,
                    source,
                });
            }
        };

        writer.write_all(&buf[..n]).map_err(|source| Error::Copy {
            side: CopySide::Write,
            source,
        })?;
        total += n as u64;
    }
}
