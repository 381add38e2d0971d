//! Single-slot result cache.

use super::EnhancementResult;

/// Memo of the last successful enhancement, keyed by exact source text.
///
/// Invariant: the slot is only meaningful while its `source_text` equals the
/// bound surface's current settled text. Any user edit invalidates it
/// unconditionally — a later revert to the same text re-fetches rather than
/// trusting a slot that was already declared stale.
#[derive(Debug, Default)]
pub struct CacheSlot {
    slot: Option<EnhancementResult>,
}

impl CacheSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot wholesale with a fresh result.
    pub fn store(&mut self, result: EnhancementResult) {
        self.slot = Some(result);
    }

    /// Whether the slot holds a result produced from exactly `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.slot
            .as_ref()
            .is_some_and(|cached| cached.source_text == text)
    }

    /// The cached result for `text`, if the slot matches it exactly.
    pub fn lookup(&self, text: &str) -> Option<&EnhancementResult> {
        self.slot.as_ref().filter(|cached| cached.source_text == text)
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}
