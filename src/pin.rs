use std::sync::atomic::{AtomicI32, Ordering};

/// Reference count of a frame. A frame may only be reclaimed by the
/// buffer pool while nobody holds a pin on it.
///
/// The counter itself never checks anything, the latch tracker of the
/// owning frame validates its use.
#[derive(Default)]
pub struct PinCounter {
    count: AtomicI32,
}

impl PinCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the count after the increment.
    pub fn pin(&self) -> i32 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Return the count after the decrement.
    pub fn unpin(&self) -> i32 {
        self.count.fetch_sub(1, Ordering::SeqCst) - 1
    }

    pub fn get(&self) -> i32 {
        self.count.load(Ordering::SeqCst)
    }

    pub fn can_purge(&self) -> bool {
        self.get() == 0
    }
}
