//! Stream filters for raw content stream bytes.
//!
//! Page content streams are almost always `FlateDecode` compressed; a few
//! generators wrap them in `ASCIIHexDecode` as well. Filters are applied in
//! the order they are listed in the stream dictionary.

use crate::error::{Error, Result};

mod ascii_hex;
mod flate;

pub use ascii_hex::AsciiHexDecoder;
pub use flate::FlateDecoder;

/// Upper bound on decoded stream size (decompression bomb protection).
pub const MAX_DECODED_SIZE: usize = 64 * 1024 * 1024;

/// Trait for stream filter implementations.
pub trait StreamDecoder {
    /// Decode the input data.
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Filter name as written in the stream dictionary (e.g. "FlateDecode").
    fn name(&self) -> &str;
}

/// Look up a filter by name, accepting the inline-image abbreviations.
pub fn decoder_for(filter: &str) -> Result<Box<dyn StreamDecoder>> {
    match filter.trim_start_matches('/') {
        "FlateDecode" | "Fl" => Ok(Box::new(FlateDecoder)),
        "ASCIIHexDecode" | "AHx" => Ok(Box::new(AsciiHexDecoder)),
        other => Err(Error::UnsupportedFilter(other.to_string())),
    }
}

/// Apply a filter chain to raw stream bytes.
///
/// # Examples
///
/// ```
/// use pdf_template_diff::decoders::decode_stream;
///
/// let decoded = decode_stream(b"42 54 20 45 54>", &["ASCIIHexDecode".to_string()]).unwrap();
/// assert_eq!(decoded, b"BT ET");
/// ```
pub fn decode_stream(data: &[u8], filters: &[String]) -> Result<Vec<u8>> {
    let mut current = data.to_vec();

    for name in filters {
        let decoder = decoder_for(name)?;
        current = decoder.decode(&current)?;

        if current.len() > MAX_DECODED_SIZE {
            return Err(Error::Decode(format!(
                "{} output of {} bytes exceeds limit of {} bytes",
                decoder.name(),
                current.len(),
                MAX_DECODED_SIZE
            )));
        }
    }

    Ok(current)
}

/// True if `data` starts with a plausible zlib header.
///
/// Used to accept dumped content streams that may or may not still be
/// compressed.
pub fn looks_like_zlib(data: &[u8]) -> bool {
    match data {
        [cmf, flg, ..] => cmf & 0x0F == 8 && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_filter_chain() {
        let compressed = zlib(b"BT (Hi) Tj ET");
        let hex: String = compressed.iter().map(|b| format!("{:02X}", b)).collect();
        let filters = vec!["ASCIIHexDecode".to_string(), "FlateDecode".to_string()];
        let decoded = decode_stream(hex.as_bytes(), &filters).unwrap();
        assert_eq!(decoded, b"BT (Hi) Tj ET");
    }

    #[test]
    fn test_unsupported_filter() {
        let err = decode_stream(b"", &["DCTDecode".to_string()]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFilter(name) if name == "DCTDecode"));
    }

    #[test]
    fn test_abbreviated_names() {
        assert_eq!(decoder_for("/Fl").unwrap().name(), "FlateDecode");
        assert_eq!(decoder_for("AHx").unwrap().name(), "ASCIIHexDecode");
    }

    #[test]
    fn test_looks_like_zlib() {
        assert!(looks_like_zlib(&zlib(b"q Q")));
        assert!(!looks_like_zlib(b"BT ET"));
        assert!(!looks_like_zlib(b"x"));
    }
}
