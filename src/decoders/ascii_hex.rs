//! ASCIIHexDecode implementation.

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};

/// ASCIIHexDecode filter implementation.
///
/// Whitespace is ignored, `>` ends the data, and an odd final digit is
/// padded with `0`.
pub struct AsciiHexDecoder;

impl StreamDecoder for AsciiHexDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let data = input.split(|&b| b == b'>').next().unwrap_or(input);
        let nibbles = data
            .iter()
            .filter(|b| !b.is_ascii_whitespace())
            .map(|&b| {
                char::from(b).to_digit(16).map(|d| d as u8).ok_or_else(|| {
                    Error::Decode(format!("ASCIIHexDecode: invalid hex digit '{}'", char::from(b)))
                })
            })
            .collect::<Result<Vec<u8>>>()?;

        Ok(nibbles
            .chunks(2)
            .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
            .collect())
    }

    fn name(&self) -> &str {
        "ASCIIHexDecode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_whitespace_and_eod() {
        assert_eq!(AsciiHexDecoder.decode(b"48 65\n6C 6C 6F>trailing").unwrap(), b"Hello");
    }

    #[test]
    fn test_odd_length_padded() {
        assert_eq!(AsciiHexDecoder.decode(b"486").unwrap(), b"H`");
    }

    #[test]
    fn test_invalid_digit() {
        assert!(AsciiHexDecoder.decode(b"4G").is_err());
    }
}
