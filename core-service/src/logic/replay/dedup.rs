//! Consecutive duplicate suppression
//!
//! Only the immediately preceding *emitted* timestamp is remembered, and
//! comparison is on the raw string. `[t1, t1, t2, t1]` lets three through.

#[derive(Debug, Clone, Default)]
pub struct ConsecutiveDedup {
    last: Option<String>,
}

impl ConsecutiveDedup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_duplicate(&self, ts: &str) -> bool {
        self.last.as_deref() == Some(ts)
    }

    /// Record `ts` as the last emitted timestamp
    pub fn mark_emitted(&mut self, ts: impl Into<String>) {
        self.last = Some(ts.into());
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_consecutive_duplicates_are_caught() {
        let mut dedup = ConsecutiveDedup::new();
        let mut emitted = Vec::new();

        for ts in ["t1", "t1", "t2", "t1"] {
            if !dedup.is_duplicate(ts) {
                dedup.mark_emitted(ts);
                emitted.push(ts);
            }
        }

        assert_eq!(emitted, vec!["t1", "t2", "t1"]);
    }

    #[test]
    fn test_comparison_is_textual() {
        let mut dedup = ConsecutiveDedup::new();
        dedup.mark_emitted("2023-07-01T00:00:00Z");

        // Same instant, different spelling
        assert!(!dedup.is_duplicate("2023-07-01T00:00:00+00:00"));
        assert!(dedup.is_duplicate("2023-07-01T00:00:00Z"));
        assert_eq!(dedup.last(), Some("2023-07-01T00:00:00Z"));
    }
}
