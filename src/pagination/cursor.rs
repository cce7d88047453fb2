use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

// ============================================================================
// Pagination Cursor
// ============================================================================
//
// A cursor is the last-seen key wrapped as `{"orderId": "<key>"}` and
// encoded with unpadded URL-safe base64. The alphabet is [A-Za-z0-9_-],
// so it can travel as a plain JSON string or a query parameter.
//
// Keys must be non-empty; store keys always are, and an empty key is
// rejected on decode.
//
// Clients must treat it as opaque. Anything handed back is untrusted input.
//
// ============================================================================

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CursorKey {
    order_id: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CursorError {
    #[error("cursor is not valid base64: {0}")]
    Encoding(String),

    #[error("cursor payload is malformed: {0}")]
    Payload(String),

    #[error("cursor carries an empty key")]
    EmptyKey,
}

/// Encode the resume point of a scan.
pub fn encode(last_key: &str) -> String {
    let payload = serde_json::json!({ "orderId": last_key }).to_string();
    URL_SAFE_NO_PAD.encode(payload.as_bytes())
}

/// Recover the key from a cursor produced by [`encode`].
pub fn decode(cursor: &str) -> Result<String, CursorError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(cursor.as_bytes())
        .map_err(|e| CursorError::Encoding(e.to_string()))?;

    let key: CursorKey =
        serde_json::from_slice(&bytes).map_err(|e| CursorError::Payload(e.to_string()))?;

    if key.order_id.is_empty() {
        return Err(CursorError::EmptyKey);
    }

    Ok(key.order_id)
}
