//! Opaque seek-pagination cursor.
//!
//! A cursor is the sort key of the last row of a page, serialized as compact
//! JSON and then URL-safe base64. Tokens are produced without padding; the
//! decoder accepts padded and unpadded input.
//!
//! Cursors are never persisted, so the only compatibility concern is tokens
//! held by clients across a deploy: unknown fields are ignored and the older
//! `createdAt` field name is still accepted.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::ItemId;

use crate::error::QueryError;

const CURSOR_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Upper bound on accepted token length; anything longer is not one of ours.
const MAX_TOKEN_LEN: usize = 512;

/// Resume position for `(createdAt DESC, id DESC)` seek pagination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPayload {
    #[serde(alias = "createdAt")]
    pub sort_timestamp: DateTime<Utc>,
    pub id: ItemId,
}

impl CursorPayload {
    pub fn new(sort_timestamp: DateTime<Utc>, id: ItemId) -> Self {
        Self { sort_timestamp, id }
    }

    /// Whether a row with the given key lies strictly after this cursor in
    /// `(createdAt DESC, id DESC)` order.
    ///
    /// Ids compare bytewise, matching the `COLLATE "C"` ordering used in SQL.
    pub fn admits(&self, created_at: &DateTime<Utc>, id: &ItemId) -> bool {
        *created_at < self.sort_timestamp
            || (*created_at == self.sort_timestamp && id.as_str() < self.id.as_str())
    }
}

/// Encode a payload into an opaque token.
pub fn encode(payload: &CursorPayload) -> String {
    // Serializing a struct of a timestamp and a string cannot fail.
    let json = serde_json::to_vec(payload).unwrap_or_default();
    CURSOR_ENGINE.encode(json)
}

/// Decode an opaque token produced by [`encode`].
pub fn decode(token: &str) -> Result<CursorPayload, QueryError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(QueryError::cursor("cursor is empty"));
    }
    if token.len() > MAX_TOKEN_LEN {
        return Err(QueryError::cursor("cursor is too long"));
    }

    let bytes = CURSOR_ENGINE
        .decode(token)
        .map_err(|e| QueryError::cursor(format!("not url-safe base64: {e}")))?;

    serde_json::from_slice::<CursorPayload>(&bytes)
        .map_err(|e| QueryError::cursor(format!("malformed payload: {e}")))
}
