//! Charset encoding and byte order marks
//!
//! Log files are written in a configurable charset. The closed set below
//! covers the encodings log consumers actually ask for; each knows how to
//! encode text and which byte order mark (if any) identifies a fresh file.

use crate::error::Error;

/// Text encodings supported for log file output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// UTF-8 (default, no byte order mark)
    Utf8,
    /// 7-bit ASCII; unmappable characters become '?'
    Ascii,
    /// ISO-8859-1; unmappable characters become '?'
    Latin1,
    /// UTF-16 big endian
    Utf16Be,
    /// UTF-16 little endian
    Utf16Le,
}

impl Charset {
    /// Look up a charset by name, case-insensitively
    ///
    /// Accepts the common aliases: "UTF-8"/"utf8", "US-ASCII"/"ascii",
    /// "ISO-8859-1"/"latin1", "UTF-16" (big endian), "UTF-16BE", "UTF-16LE".
    pub fn from_name(name: &str) -> Result<Self, Error> {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "utf8" => Ok(Self::Utf8),
            "ascii" | "usascii" => Ok(Self::Ascii),
            "latin1" | "iso88591" => Ok(Self::Latin1),
            "utf16" | "utf16be" => Ok(Self::Utf16Be),
            "utf16le" => Ok(Self::Utf16Le),
            _ => Err(Error::UnknownCharset(name.into())),
        }
    }

    /// Canonical name of the charset
    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Ascii => "US-ASCII",
            Self::Latin1 => "ISO-8859-1",
            Self::Utf16Be => "UTF-16BE",
            Self::Utf16Le => "UTF-16LE",
        }
    }

    /// Leading bytes that identify this encoding at the start of a fresh file
    ///
    /// Empty for the 8-bit charsets, which have no byte order to mark.
    pub fn byte_order_mark(&self) -> &'static [u8] {
        match self {
            Self::Utf16Be => &[0xFE, 0xFF],
            Self::Utf16Le => &[0xFF, 0xFE],
            Self::Utf8 | Self::Ascii | Self::Latin1 => &[],
        }
    }

    /// Encode text into this charset, without any byte order mark
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
            Self::Latin1 => text
                .chars()
                .map(|c| {
                    let code = c as u32;
                    if code < 0x100 {
                        code as u8
                    } else {
                        b'?'
                    }
                })
                .collect(),
            Self::Utf16Be => text
                .encode_utf16()
                .flat_map(|unit| unit.to_be_bytes())
                .collect(),
            Self::Utf16Le => text
                .encode_utf16()
                .flat_map(|unit| unit.to_le_bytes())
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "encoding_test.rs"]
mod encoding_test;
