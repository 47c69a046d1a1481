//! # uar-encoding
//!
//! **Tier 1 (Ingestion)**
//!
//! Sniffs the encoding of a raw CSV byte slice and normalizes it to
//! UTF-8 (spec.md §4.1). Never fails on nonempty input: unrecognized
//! content without a BOM and that is not valid UTF-8 falls back to a
//! byte-for-byte Latin-1 (ISO-8859-1) expansion.

#![forbid(unsafe_code)]

use encoding_rs::{UTF_16BE, UTF_16LE};

/// The encoding that was detected for a given input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedEncoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    Latin1,
}

impl DetectedEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            DetectedEncoding::Utf8 => "utf-8",
            DetectedEncoding::Utf8Bom => "utf-8-bom",
            DetectedEncoding::Utf16Le => "utf-16-le",
            DetectedEncoding::Utf16Be => "utf-16-be",
            DetectedEncoding::Latin1 => "latin-1",
        }
    }
}

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Detects the encoding of `bytes` and returns a normalized UTF-8
/// `String` alongside the encoding that was detected. Infallible on
/// nonempty input per the component contract; empty input decodes to
/// an empty string tagged `Utf8`.
pub fn decode_to_utf8(bytes: &[u8]) -> (String, DetectedEncoding) {
    if bytes.starts_with(&UTF8_BOM) {
        let rest = &bytes[UTF8_BOM.len()..];
        let text = match std::str::from_utf8(rest) {
            Ok(s) => s.to_string(),
            Err(_) => latin1_expand(rest),
        };
        return (text, DetectedEncoding::Utf8Bom);
    }

    if bytes.starts_with(&UTF16LE_BOM) {
        let rest = &bytes[UTF16LE_BOM.len()..];
        return (decode_utf16(rest, UTF_16LE), DetectedEncoding::Utf16Le);
    }

    if bytes.starts_with(&UTF16BE_BOM) {
        let rest = &bytes[UTF16BE_BOM.len()..];
        return (decode_utf16(rest, UTF_16BE), DetectedEncoding::Utf16Be);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return (s.to_string(), DetectedEncoding::Utf8);
    }

    (latin1_expand(bytes), DetectedEncoding::Latin1)
}

/// Decodes a BOM-stripped UTF-16 byte slice. A trailing odd byte is
/// discarded; lone/isolated surrogates become U+FFFD via `encoding_rs`'s
/// replacement-on-decode behavior.
fn decode_utf16(bytes: &[u8], encoding: &'static encoding_rs::Encoding) -> String {
    let even_len = bytes.len() - (bytes.len() % 2);
    let (cow, _, _) = encoding.decode(&bytes[..even_len]);
    cow.into_owned()
}

/// Expands each input byte to the Unicode code point of the same
/// ordinal value (true Latin-1 / ISO-8859-1, not Windows-1252): bytes
/// below 0x80 pass through as ASCII, 0x80–0xFF become the two-byte
/// UTF-8 encoding of U+0080–U+00FF.
fn latin1_expand(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
