use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};

use once_cell::sync::Lazy;

static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Nanoseconds elapsed since the first call in this process. Never
/// decreases.
pub fn now_nanos() -> u64 {
    EPOCH.elapsed().as_nanos() as u64
}

/// The last time a frame was touched, read by the eviction policy to
/// approximate recency.
///
/// Concurrent touches race freely, the value ends up being one of them.
#[derive(Default)]
pub struct AccessTime {
    nanos: AtomicU64,
}

impl AccessTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch(&self) {
        self.nanos.store(now_nanos(), Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.nanos.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use super::*;

    #[test]
    fn test_now_is_monotonic() {
        let a = now_nanos();
        let b = now_nanos();
        assert!(b >= a);
    }

    #[test]
    fn test_touch() {
        let t = AccessTime::new();
        assert_eq!(t.get(), 0);

        t.touch();
        let first = t.get();

        thread::sleep(Duration::from_millis(2));
        t.touch();
        assert!(t.get() > first);
    }
}
