/// Drops input events that arrive closer together than `min_interval_ms`.
/// Dropped events are gone; nothing is queued for later.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputThrottle {
    min_interval_ms: u64,
    last_accepted_ms: Option<u64>,
}

impl InputThrottle {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            last_accepted_ms: None,
        }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn admit(&mut self, now_ms: u64) -> bool {
        if self.min_interval_ms == 0 {
            return true;
        }
        match self.last_accepted_ms {
            Some(last) if now_ms.saturating_sub(last) < self.min_interval_ms => false,
            _ => {
                self.last_accepted_ms = Some(now_ms);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_accepted_ms = None;
    }
}
