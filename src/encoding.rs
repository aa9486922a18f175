//! Byte-to-text mapping for settings files.
//!
//! Files are read as UTF-8 when they are valid UTF-8 and as Windows-1252
//! otherwise. Windows-1252 assigns a character to every byte, so a file in
//! any single-byte encoding still parses, renders and writes back unchanged.

use encoding_rs::WINDOWS_1252;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    #[default]
    Utf8,
    Windows1252,
}

impl TextEncoding {
    /// Decode `bytes`, picking the encoding that accepts them.
    pub fn decode(bytes: Vec<u8>) -> (String, TextEncoding) {
        match String::from_utf8(bytes) {
            Ok(text) => (text, TextEncoding::Utf8),
            Err(err) => {
                let (text, _) = WINDOWS_1252.decode_without_bom_handling(err.as_bytes());
                (text.into_owned(), TextEncoding::Windows1252)
            }
        }
    }

    /// Encode `text`, or `None` when it holds characters this encoding lacks.
    pub fn encode(self, text: &str) -> Option<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Some(text.as_bytes().to_vec()),
            TextEncoding::Windows1252 => {
                let (bytes, _, unmappable) = WINDOWS_1252.encode(text);
                (!unmappable).then(|| bytes.into_owned())
            }
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => f.write_str("UTF-8"),
            TextEncoding::Windows1252 => f.write_str("Windows-1252"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_is_preferred() {
        let (text, encoding) = TextEncoding::decode("Descrição = 1;\n".as_bytes().to_vec());
        assert_eq!(encoding, TextEncoding::Utf8);
        assert_eq!(text, "Descrição = 1;\n");
    }

    #[test]
    fn test_latin1_bytes_round_trip() {
        let bytes = b"// Descri\xe7\xe3o\n".to_vec();
        let (text, encoding) = TextEncoding::decode(bytes.clone());
        assert_eq!(encoding, TextEncoding::Windows1252);
        assert_eq!(text, "// Descrição\n");
        assert_eq!(encoding.encode(&text), Some(bytes));
    }

    #[test]
    fn test_every_byte_round_trips() {
        // 0x80 alone is never valid UTF-8, so the whole range decodes as Windows-1252.
        let bytes: Vec<u8> = (0x80..=0xff).chain(0x00..0x80).collect();
        let (text, encoding) = TextEncoding::decode(bytes.clone());
        assert_eq!(encoding, TextEncoding::Windows1252);
        assert_eq!(encoding.encode(&text), Some(bytes));
    }

    #[test]
    fn test_unmappable_character() {
        assert_eq!(TextEncoding::Windows1252.encode("水"), None);
        assert!(TextEncoding::Utf8.encode("水").is_some());
    }
}
