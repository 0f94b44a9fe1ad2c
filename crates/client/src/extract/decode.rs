//! Byte-to-text decoding for text sources.

/// Bytes inspected for NUL when sniffing binary content.
const SNIFF_LEN: usize = 8192;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("binary content (NUL byte at offset {0})")]
    Binary(usize),
}

/// Decode file bytes as text.
///
/// UTF-8 is tried first with any BOM removed. Bytes that are not valid
/// UTF-8 are read as Latin-1, which maps every byte to a char.
pub fn decode_text(bytes: &[u8]) -> Result<String, DecodeError> {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    if let Some(pos) = head.iter().position(|b| *b == 0) {
        return Err(DecodeError::Binary(pos));
    }

    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(body) {
        Ok(text) => Ok(text.to_string()),
        Err(_) => {
            tracing::debug!("input is not valid UTF-8, decoding as Latin-1");
            Ok(body.iter().map(|&b| b as char).collect())
        }
    }
}
