//! FlateDecode (zlib/deflate) implementation.

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};
use flate2::read::{DeflateDecoder, ZlibDecoder};
use std::io::Read;

/// FlateDecode filter implementation.
///
/// Tries zlib first, then raw deflate for streams with a damaged header.
/// Output decoded before a corruption point is kept rather than discarded.
pub struct FlateDecoder;

impl StreamDecoder for FlateDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let zlib_err = match ZlibDecoder::new(input).read_to_end(&mut output) {
            Ok(_) => return Ok(output),
            Err(e) if !output.is_empty() => {
                log::warn!(
                    "FlateDecode partial recovery: {} bytes before corruption: {}",
                    output.len(),
                    e
                );
                return Ok(output);
            },
            Err(e) => e,
        };

        log::info!("Zlib decode failed ({}), trying raw deflate", zlib_err);
        output.clear();
        match DeflateDecoder::new(input).read_to_end(&mut output) {
            Ok(_) if !output.is_empty() => Ok(output),
            Err(_) if !output.is_empty() => {
                log::warn!("Raw deflate partial recovery: {} bytes", output.len());
                Ok(output)
            },
            _ => Err(Error::Decode(format!("FlateDecode failed: {}", zlib_err))),
        }
    }

    fn name(&self) -> &str {
        "FlateDecode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::{DeflateEncoder, ZlibEncoder};
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_zlib_stream() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"BT /F1 12 Tf (Hello) Tj ET").unwrap();
        let compressed = encoder.finish().unwrap();
        assert_eq!(FlateDecoder.decode(&compressed).unwrap(), b"BT /F1 12 Tf (Hello) Tj ET");
    }

    #[test]
    fn test_raw_deflate_fallback() {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"q 1 0 0 1 0 0 cm Q").unwrap();
        let compressed = encoder.finish().unwrap();
        assert_eq!(FlateDecoder.decode(&compressed).unwrap(), b"q 1 0 0 1 0 0 cm Q");
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(FlateDecoder.decode(b"\x00\x01\x02 not deflate").is_err());
    }
}
