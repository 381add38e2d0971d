//! Enhancement request value object.

use uuid::Uuid;

/// One logical enhancement request, created per settled-text event.
///
/// A request is superseded (discarded, never completed) when a newer settled
/// text arrives before it finishes; the id exists so logs can correlate the
/// two halves of that race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancementRequest {
    pub id: Uuid,
    pub source_text: String,
    pub requested_at_ms: i64,
}

impl EnhancementRequest {
    pub fn new(source_text: impl Into<String>, requested_at_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_text: source_text.into(),
            requested_at_ms,
        }
    }
}
