use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Strictly increasing id source seeded from wall-clock milliseconds.
///
/// Ids track the current time in milliseconds, but two ids handed out in the
/// same millisecond (or after the clock steps backwards) still differ: each id
/// is at least one greater than the previous one.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    /// Create a generator with no ids handed out yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next id: `max(now_ms, last + 1)`.
    ///
    /// Returns `None` once `u64::MAX` has been handed out or observed.
    pub fn next_id(&self) -> Option<u64> {
        let now = now_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                last.checked_add(1).map(|next| now.max(next))
            })
            .ok()?;

        Some(now.max(previous + 1))
    }

    /// Make sure every id handed out from now on is greater than `id`.
    pub fn observe(&self, id: u64) {
        self.last.fetch_max(id, Ordering::SeqCst);
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
