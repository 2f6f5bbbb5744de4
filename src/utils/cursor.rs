use base64::{engine::general_purpose, Engine as _};

/// Cursor helpers: the cursor is the base64 of the last-seen record id.
pub fn encode(id: &str) -> String {
    general_purpose::STANDARD.encode(id)
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    #[error("invalid cursor: base64 decode error: {0}")]
    Base64(String),
    #[error("invalid cursor: utf8 error: {0}")]
    Utf8(String),
    #[error("invalid cursor: empty id")]
    Empty,
}

pub fn decode(cursor: &str) -> Result<String, CursorError> {
    let decoded = general_purpose::STANDARD
        .decode(cursor)
        .map_err(|e| CursorError::Base64(e.to_string()))?;
    let id = String::from_utf8(decoded).map_err(|e| CursorError::Utf8(e.to_string()))?;
    if id.is_empty() {
        return Err(CursorError::Empty);
    }
    Ok(id)
}
