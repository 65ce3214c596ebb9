//! Zlib framing for loose objects and packfile payloads.
//!
//! Three operations: whole-buffer compress, whole-buffer decompress, and a
//! bounded streaming inflate used by the pack ingester. The streaming
//! variant must leave the source positioned immediately after the zlib
//! trailer, since the next pack entry starts at the following byte.

use std::io::{BufRead, Read, Write};

use flate2::bufread::ZlibDecoder as BufZlibDecoder;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Errors from the zlib wrapper.
#[derive(Debug, thiserror::Error)]
pub enum ZlibError {
    #[error("short inflate: expected {expected} bytes, got {actual}")]
    ShortInflate { expected: usize, actual: usize },

    #[error("zlib stream error: {0}")]
    Codec(#[source] std::io::Error),
}

/// Deflate `data` with zlib framing at the given level.
pub fn compress(data: &[u8], level: Compression) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), level);
    // Writing to a Vec cannot fail.
    encoder.write_all(data).expect("write to Vec");
    encoder.finish().expect("finish to Vec")
}

/// Inflate an entire in-memory buffer.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, ZlibError> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).map_err(ZlibError::Codec)?;
    Ok(out)
}

/// Inflate exactly `expected` bytes from a buffered stream.
///
/// On success the reader is positioned at the first byte after the zlib
/// trailer; the deflate stream must decode to exactly `expected` bytes.
pub fn inflate_exact<R: BufRead>(reader: &mut R, expected: usize) -> Result<Vec<u8>, ZlibError> {
    let mut decoder = BufZlibDecoder::new(reader);
    let mut out = vec![0u8; expected];
    let mut filled = 0;

    while filled < expected {
        let n = decoder.read(&mut out[filled..]).map_err(ZlibError::Codec)?;
        if n == 0 {
            return Err(ZlibError::ShortInflate {
                expected,
                actual: filled,
            });
        }
        filled += n;
    }

    // Drive the decoder to end-of-stream so the trailer is consumed and the
    // underlying reader stops at the next byte after it.
    let mut probe = [0u8; 1];
    match decoder.read(&mut probe) {
        Ok(0) => Ok(out),
        Ok(_) => Err(ZlibError::Codec(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("deflate stream longer than the declared {expected} bytes"),
        ))),
        Err(e) => Err(ZlibError::Codec(e)),
    }
}
