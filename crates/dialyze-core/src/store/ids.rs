//! Patient ID generation.

/// Issues creation-timestamp IDs (milliseconds since the epoch).
///
/// Two patients created within the same millisecond, or after the clock
/// stepped backwards, still get distinct increasing IDs: each ID is at least
/// one past the previous one.
#[derive(Debug, Default)]
pub(crate) struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub(crate) fn next_id(&mut self) -> String {
        self.next_at(chrono::Utc::now().timestamp_millis())
    }

    fn next_at(&mut self, now_millis: i64) -> String {
        let id = now_millis.max(self.last + 1);
        self.last = id;
        id.to_string()
    }

    /// Make sure future IDs sort after an externally supplied one.
    pub(crate) fn observe(&mut self, id: &str) {
        if let Ok(n) = id.parse::<i64>() {
            self.last = self.last.max(n);
        }
    }
}
