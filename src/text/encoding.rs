//! Byte-to-Unicode decoding for string operands.
//!
//! Generated documents overwhelmingly use simple fonts with the standard
//! WinAnsi (Windows-1252) encoding, which is Latin-1 except for the
//! 0x80-0x9F block. Strings starting with the UTF-16BE byte order mark are
//! decoded as UTF-16.

/// WinAnsi (Windows-1252) decoding table for the range 0x80-0x9F.
///
/// Undefined slots (0x81, 0x8D, 0x8F, 0x90, 0x9D) return `None`.
pub fn winansi_to_unicode(byte: u8) -> Option<char> {
    if byte < 0x80 || byte >= 0xA0 {
        return Some(char::from(byte));
    }

    let codepoint = match byte {
        0x80 => 0x20AC, // Euro sign
        0x82 => 0x201A, // Single low-9 quotation mark
        0x83 => 0x0192, // Latin small letter f with hook
        0x84 => 0x201E, // Double low-9 quotation mark
        0x85 => 0x2026, // Horizontal ellipsis
        0x86 => 0x2020, // Dagger
        0x87 => 0x2021, // Double dagger
        0x88 => 0x02C6, // Modifier letter circumflex accent
        0x89 => 0x2030, // Per mille sign
        0x8A => 0x0160, // Latin capital letter S with caron
        0x8B => 0x2039, // Single left-pointing angle quotation mark
        0x8C => 0x0152, // Latin capital ligature OE
        0x8E => 0x017D, // Latin capital letter Z with caron
        0x91 => 0x2018, // Left single quotation mark
        0x92 => 0x2019, // Right single quotation mark
        0x93 => 0x201C, // Left double quotation mark
        0x94 => 0x201D, // Right double quotation mark
        0x95 => 0x2022, // Bullet
        0x96 => 0x2013, // En dash
        0x97 => 0x2014, // Em dash
        0x98 => 0x02DC, // Small tilde
        0x99 => 0x2122, // Trade mark sign
        0x9A => 0x0161, // Latin small letter s with caron
        0x9B => 0x203A, // Single right-pointing angle quotation mark
        0x9C => 0x0153, // Latin small ligature oe
        0x9E => 0x017E, // Latin small letter z with caron
        0x9F => 0x0178, // Latin capital letter Y with diaeresis
        _ => return None,
    };
    char::from_u32(codepoint)
}

/// Decode a byte string through the WinAnsi table.
///
/// Undefined bytes become U+FFFD.
pub fn decode_winansi(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| winansi_to_unicode(b).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Decode UTF-16BE bytes (BOM already stripped).
///
/// A trailing odd byte is ignored; unpaired surrogates become U+FFFD.
pub fn decode_utf16be(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winansi_mapping() {
        assert_eq!(winansi_to_unicode(b'A'), Some('A'));
        assert_eq!(winansi_to_unicode(0x80), Some('\u{20AC}')); // Euro
        assert_eq!(winansi_to_unicode(0x96), Some('\u{2013}')); // En dash
        assert_eq!(winansi_to_unicode(0xE7), Some('ç'));
        assert_eq!(winansi_to_unicode(0x81), None);
    }

    #[test]
    fn test_decode_winansi_portuguese() {
        assert_eq!(decode_winansi(b"Execu\xe7\xe3o"), "Execução");
        assert_eq!(decode_winansi(b"a\x81b"), "a\u{FFFD}b");
    }

    #[test]
    fn test_decode_utf16be() {
        assert_eq!(decode_utf16be(&[0x00, 0x41, 0x00, 0xE9]), "Aé");
        assert_eq!(decode_utf16be(&[0xD8, 0x3D, 0xDE, 0x00]), "\u{1F600}");
        assert_eq!(decode_utf16be(&[0x00, 0x41, 0x00]), "A");
    }
}
