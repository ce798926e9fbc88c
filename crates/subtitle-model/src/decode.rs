//! Byte-level decoding of uploaded documents.

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Input bytes could not be decoded as UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("document is not valid UTF-8 (invalid byte sequence at offset {offset})")]
    InvalidUtf8 { offset: usize },

    #[error("document looks UTF-16 encoded; only UTF-8 is supported")]
    Utf16,
}

impl From<DecodeError> for cueframe_common::CueframeError {
    fn from(err: DecodeError) -> Self {
        Self::encoding(err.to_string())
    }
}

/// Decode a document as UTF-8, dropping a leading byte-order mark.
///
/// The reported offset is relative to the original bytes, BOM included.
pub fn decode_document(bytes: &[u8]) -> Result<&str, DecodeError> {
    if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(DecodeError::Utf16);
    }

    let (skipped, body) = match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => (UTF8_BOM.len(), rest),
        None => (0, bytes),
    };

    std::str::from_utf8(body).map_err(|e| DecodeError::InvalidUtf8 {
        offset: skipped + e.valid_up_to(),
    })
}
