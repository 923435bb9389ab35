//! Text encodings for loading and saving line stores.

use crate::error::{Error, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Encoding of a text file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// UTF-8 without byte order mark.
    #[default]
    Utf8,
    /// UTF-8 with a leading byte order mark.
    Utf8Bom,
    /// UTF-16 little endian with byte order mark.
    Utf16Le,
    /// UTF-16 big endian with byte order mark.
    Utf16Be,
}

impl TextEncoding {
    /// Guess the encoding from a byte order mark, falling back to UTF-8.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(UTF8_BOM) {
            Self::Utf8Bom
        } else if bytes.starts_with(UTF16LE_BOM) {
            Self::Utf16Le
        } else if bytes.starts_with(UTF16BE_BOM) {
            Self::Utf16Be
        } else {
            Self::Utf8
        }
    }

    fn bom(self) -> &'static [u8] {
        match self {
            Self::Utf8 => &[],
            Self::Utf8Bom => UTF8_BOM,
            Self::Utf16Le => UTF16LE_BOM,
            Self::Utf16Be => UTF16BE_BOM,
        }
    }

    /// Decode bytes, skipping this encoding's byte order mark when present.
    pub fn decode(self, bytes: &[u8]) -> Result<String> {
        let body = bytes.strip_prefix(self.bom()).unwrap_or(bytes);
        match self {
            Self::Utf8 | Self::Utf8Bom => {
                String::from_utf8(body.to_vec()).map_err(|_| Error::Decode { encoding: self })
            }
            Self::Utf16Le | Self::Utf16Be => {
                if body.len() % 2 != 0 {
                    return Err(Error::Decode { encoding: self });
                }
                let units: Vec<u16> = body
                    .chunks_exact(2)
                    .map(|pair| {
                        let pair = [pair[0], pair[1]];
                        if self == Self::Utf16Le {
                            u16::from_le_bytes(pair)
                        } else {
                            u16::from_be_bytes(pair)
                        }
                    })
                    .collect();
                String::from_utf16(&units).map_err(|_| Error::Decode { encoding: self })
            }
        }
    }

    /// Encode text, prefixed with this encoding's byte order mark.
    #[must_use]
    pub fn encode(self, text: &str) -> Vec<u8> {
        let mut out = self.bom().to_vec();
        match self {
            Self::Utf8 | Self::Utf8Bom => out.extend_from_slice(text.as_bytes()),
            Self::Utf16Le => {
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
            }
            Self::Utf16Be => {
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_be_bytes());
                }
            }
        }
        out
    }
}
