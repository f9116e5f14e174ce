use parking_lot::lock_api;

/// The lock that really arbitrates access to a frame's bytes.
///
/// Unlike `std` locks it is not tied to a guard: a frame acquires it in
/// one call and releases it in another, the guard types in this crate
/// are built on top of it.
pub trait LatchPrimitive: Send + Sync {
    fn new() -> Self;

    fn lock_shared(&self);

    fn try_lock_shared(&self) -> bool;

    /// # Safety
    ///
    /// The latch must be held in shared mode by the current context.
    unsafe fn unlock_shared(&self);

    fn lock_exclusive(&self);

    fn try_lock_exclusive(&self) -> bool;

    /// # Safety
    ///
    /// The latch must be held in exclusive mode by the current context.
    unsafe fn unlock_exclusive(&self);
}

/// Shared holders run concurrently, an exclusive holder runs alone.
pub struct RwLatch {
    raw: parking_lot::RawRwLock,
}

impl LatchPrimitive for RwLatch {
    fn new() -> Self {
        Self {
            raw: <parking_lot::RawRwLock as lock_api::RawRwLock>::INIT,
        }
    }

    fn lock_shared(&self) {
        lock_api::RawRwLock::lock_shared(&self.raw);
    }

    fn try_lock_shared(&self) -> bool {
        lock_api::RawRwLock::try_lock_shared(&self.raw)
    }

    unsafe fn unlock_shared(&self) {
        lock_api::RawRwLock::unlock_shared(&self.raw);
    }

    fn lock_exclusive(&self) {
        lock_api::RawRwLock::lock_exclusive(&self.raw);
    }

    fn try_lock_exclusive(&self) -> bool {
        lock_api::RawRwLock::try_lock_exclusive(&self.raw)
    }

    unsafe fn unlock_exclusive(&self) {
        lock_api::RawRwLock::unlock_exclusive(&self.raw);
    }
}

/// Every holder runs alone, shared or not: a shared latch is taken as a
/// plain mutex. The owner bookkeeping still tells shared and exclusive
/// holders apart.
pub struct SerialLatch {
    raw: parking_lot::RawMutex,
}

impl LatchPrimitive for SerialLatch {
    fn new() -> Self {
        Self {
            raw: <parking_lot::RawMutex as lock_api::RawMutex>::INIT,
        }
    }

    fn lock_shared(&self) {
        lock_api::RawMutex::lock(&self.raw);
    }

    fn try_lock_shared(&self) -> bool {
        lock_api::RawMutex::try_lock(&self.raw)
    }

    unsafe fn unlock_shared(&self) {
        lock_api::RawMutex::unlock(&self.raw);
    }

    fn lock_exclusive(&self) {
        lock_api::RawMutex::lock(&self.raw);
    }

    fn try_lock_exclusive(&self) -> bool {
        lock_api::RawMutex::try_lock(&self.raw)
    }

    unsafe fn unlock_exclusive(&self) {
        lock_api::RawMutex::unlock(&self.raw);
    }
}

#[cfg(not(feature = "serial_latch"))]
pub type DefaultLatch = RwLatch;

#[cfg(feature = "serial_latch")]
pub type DefaultLatch = SerialLatch;
