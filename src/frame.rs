use std::{
    fmt,
    sync::atomic::{AtomicBool, AtomicI32, Ordering},
};

use log::debug;

use crate::{
    clock::AccessTime,
    frame_id::FrameId,
    latch::{
        DefaultLatch, DefaultTracker, FrameReadGuard, FrameWriteGuard,
        LatchOwners, LatchPrimitive, LatchTracker, Probe,
    },
    page::Page,
    pin::PinCounter,
    types::{FileDesc, Lsn, PageNum, INVALID_FILE_DESC},
    xid::Xid,
};

/// A slot of the buffer pool: one cached page plus what is needed to
/// share it between threads.
///
/// Usage protocol:
/// 1. the pool pins the frame before handing it out;
/// 2. the caller latches it (shared to read, exclusive to write),
///    touches the bytes, and unlatches it;
/// 3. the caller unpins it.
///
/// The pool may reuse the frame for another page once `can_purge`
/// holds.
///
/// `T` decides whether the latch discipline is checked, `L` is the lock
/// that actually guards the bytes. Both default to what the build
/// features select.
pub struct Frame<T: LatchTracker = DefaultTracker, L: LatchPrimitive = DefaultLatch> {
    dirty: AtomicBool,
    pin_count: PinCounter,
    acc_time: AccessTime,
    file_desc: AtomicI32,
    page: Page,

    latch: L,
    tracker: T,
}

impl Frame {
    /// Create a frame not assigned to any page yet.
    pub fn new() -> Self {
        Self::unassigned()
    }

    pub fn with_id(frame_id: FrameId) -> Self {
        Self::assigned(frame_id)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: LatchTracker, L: LatchPrimitive> Frame<T, L> {
    pub fn unassigned() -> Self {
        Self {
            dirty: AtomicBool::new(false),
            pin_count: PinCounter::new(),
            acc_time: AccessTime::new(),
            file_desc: AtomicI32::new(INVALID_FILE_DESC),
            page: Page::new(),
            latch: L::new(),
            tracker: T::default(),
        }
    }

    pub fn assigned(frame_id: FrameId) -> Self {
        let frame = Self::unassigned();
        frame.set_file_desc(frame_id.file_desc());
        frame.set_page_num(frame_id.page_num());
        frame
    }

    fn probe(&self) -> Probe<'_> {
        Probe {
            file_desc: &self.file_desc,
            page: &self.page,
            pin: &self.pin_count,
        }
    }

    pub fn frame_id(&self) -> FrameId {
        FrameId::new(self.file_desc(), self.page_num())
    }

    pub fn file_desc(&self) -> FileDesc {
        self.file_desc.load(Ordering::Acquire)
    }

    pub fn set_file_desc(&self, file_desc: FileDesc) {
        self.file_desc.store(file_desc, Ordering::Release);
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_num(&self) -> PageNum {
        self.page.page_num()
    }

    pub fn set_page_num(&self, page_num: PageNum) {
        self.page.set_page_num(page_num);
    }

    pub fn lsn(&self) -> Lsn {
        self.page.lsn()
    }

    pub fn set_lsn(&self, lsn: Lsn) {
        self.page.set_lsn(lsn);
    }

    /// Refresh the access time.
    pub fn access(&self) {
        self.acc_time.touch();
    }

    pub fn last_access(&self) -> u64 {
        self.acc_time.get()
    }

    /// Mark the page as "dirty". Call it after modifying the page
    /// content, so the new content is written back to the disk when the
    /// page is evicted from the buffer pool.
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Called by the write-back path once the page reached the disk.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::Release);
    }

    pub fn dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn pin_count(&self) -> i32 {
        self.pin_count.get()
    }

    pub fn can_purge(&self) -> bool {
        self.pin_count.can_purge()
    }

    /// Add a reference to the frame. Usually called by the pool while
    /// holding its own lock.
    pub fn pin(&self) {
        let xid = Xid::current();
        let pin_count = self.tracker.on_pin(&self.probe(), xid, || self.pin_count.pin());

        debug!(
            "after frame pin. frame={}, pin={} -> {}, xid={}",
            self.frame_id(),
            pin_count - 1,
            pin_count,
            xid
        );
    }

    /// Drop a reference to the frame, return the remaining count.
    ///
    /// The last unpin must come after every latch on the frame has been
    /// released.
    pub fn unpin(&self) -> i32 {
        let xid = Xid::current();
        let pin_count = self
            .tracker
            .on_unpin(&self.probe(), xid, || self.pin_count.unpin());

        debug!(
            "after frame unpin. frame={}, pin={} -> {}, xid={}",
            self.frame_id(),
            pin_count + 1,
            pin_count,
            xid
        );
        pin_count
    }

    pub fn write_latch(&self) {
        self.write_latch_with(Xid::current());
    }

    /// Block until the exclusive latch is acquired on behalf of `xid`.
    pub fn write_latch_with(&self, xid: Xid) {
        self.tracker.before_write_latch(&self.probe(), xid);

        self.latch.lock_exclusive();
        self.tracker.after_write_latch(&self.probe(), xid);

        debug!(
            "frame write latch success. frame={}, pin={}, xid={}",
            self.frame_id(),
            self.pin_count(),
            xid
        );
    }

    /// # Safety
    ///
    /// The current thread must hold the exclusive latch, acquired with the
    /// ambient identity.
    pub unsafe fn write_unlatch(&self) {
        self.write_unlatch_with(Xid::current());
    }

    /// # Safety
    ///
    /// The current thread must hold the exclusive latch on behalf of
    /// `xid`, and no reference obtained from `data_unchecked` or
    /// `data_mut_unchecked` may outlive this call.
    pub unsafe fn write_unlatch_with(&self, xid: Xid) {
        self.tracker.before_write_unlatch(&self.probe(), xid);

        debug!(
            "frame write unlatch success. frame={}, pin={}, xid={}",
            self.frame_id(),
            self.pin_count(),
            xid
        );

        self.latch.unlock_exclusive();
    }

    pub fn read_latch(&self) {
        self.read_latch_with(Xid::current());
    }

    /// Block until a shared latch is acquired on behalf of `xid`.
    ///
    /// `xid` is recorded as a reader before waiting.
    pub fn read_latch_with(&self, xid: Xid) {
        self.tracker.before_read_latch(&self.probe(), xid);

        self.latch.lock_shared();

        debug!(
            "frame read latch success. frame={}, pin={}, xid={}",
            self.frame_id(),
            self.pin_count(),
            xid
        );
    }

    /// Take a shared latch if it is free right now, never blocks.
    pub fn try_read_latch(&self) -> bool {
        self.try_read_latch_with(Xid::current())
    }

    pub fn try_read_latch_with(&self, xid: Xid) -> bool {
        self.tracker.before_try_read_latch(&self.probe(), xid);

        if !self.latch.try_lock_shared() {
            return false;
        }

        self.tracker.after_try_read_latch(&self.probe(), xid);
        debug!(
            "frame try read latch success. frame={}, pin={}, xid={}",
            self.frame_id(),
            self.pin_count(),
            xid
        );
        true
    }

    /// # Safety
    ///
    /// The current thread must hold a shared latch, acquired with the
    /// ambient identity.
    pub unsafe fn read_unlatch(&self) {
        self.read_unlatch_with(Xid::current());
    }

    /// # Safety
    ///
    /// The current thread must hold a shared latch on behalf of `xid`,
    /// and no reference obtained from `data_unchecked` for it may outlive
    /// this call.
    pub unsafe fn read_unlatch_with(&self, xid: Xid) {
        self.tracker.before_read_unlatch(&self.probe(), xid);

        debug!(
            "frame read unlatch success. frame={}, pin={}, xid={}",
            self.frame_id(),
            self.pin_count(),
            xid
        );

        self.latch.unlock_shared();
    }

    /// Release a latch held by a guard whose thread is unwinding. The
    /// bookkeeping forgets `xid` but nothing is checked, a second
    /// violation would abort the process.
    ///
    /// # Safety
    ///
    /// `xid` must hold the latch in the given mode.
    pub(crate) unsafe fn unlatch_unwinding(&self, xid: Xid, exclusive: bool) {
        if exclusive {
            self.tracker.forget_write(xid);
            self.latch.unlock_exclusive();
        } else {
            self.tracker.forget_read(xid);
            self.latch.unlock_shared();
        }
    }

    /// The page content, for callers that latched the frame by hand.
    ///
    /// # Safety
    ///
    /// The latch must be held (shared or exclusive) for as long as the
    /// slice lives.
    pub unsafe fn data_unchecked(&self) -> &[u8] {
        self.page.data()
    }

    /// # Safety
    ///
    /// The exclusive latch must be held for as long as the slice lives,
    /// and no other slice of the content may be alive.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn data_mut_unchecked(&self) -> &mut [u8] {
        self.page.data_mut()
    }

    pub fn read(&self) -> FrameReadGuard<'_, T, L> {
        self.read_with(Xid::current())
    }

    pub fn read_with(&self, xid: Xid) -> FrameReadGuard<'_, T, L> {
        self.read_latch_with(xid);
        // Safety: `xid` just took the shared latch.
        unsafe { FrameReadGuard::new(self, xid) }
    }

    pub fn try_read(&self) -> Option<FrameReadGuard<'_, T, L>> {
        self.try_read_with(Xid::current())
    }

    pub fn try_read_with(&self, xid: Xid) -> Option<FrameReadGuard<'_, T, L>> {
        if self.try_read_latch_with(xid) {
            // Safety: `xid` just took the shared latch.
            Some(unsafe { FrameReadGuard::new(self, xid) })
        } else {
            None
        }
    }

    pub fn write(&self) -> FrameWriteGuard<'_, T, L> {
        self.write_with(Xid::current())
    }

    pub fn write_with(&self, xid: Xid) -> FrameWriteGuard<'_, T, L> {
        self.write_latch_with(xid);
        // Safety: `xid` just took the exclusive latch.
        unsafe { FrameWriteGuard::new(self, xid) }
    }

    /// Repurpose the frame for another page: zero the content and the
    /// lsn, clear the dirty flag and take the new identity.
    ///
    /// Only an unpinned, unlatched frame can be reset. Return false when
    /// the latch could not be taken without waiting.
    pub fn reset(&self, frame_id: FrameId) -> bool {
        self.tracker.before_purge(&self.probe());

        if !self.can_purge() || !self.latch.try_lock_exclusive() {
            return false;
        }

        // Safety: we hold the exclusive latch.
        unsafe { self.page.data_mut().fill(0) };
        self.page.set_lsn(0);
        self.set_file_desc(frame_id.file_desc());
        self.set_page_num(frame_id.page_num());
        self.clear_dirty();

        // Safety: taken above, no reference to the content is left.
        unsafe { self.latch.unlock_exclusive() };

        debug!("frame reset. frame={}", frame_id);
        true
    }

    /// A snapshot of the latch bookkeeping, `None` when the discipline is
    /// not checked.
    pub fn latch_owners(&self) -> Option<LatchOwners> {
        self.tracker.owners()
    }
}

impl<T: LatchTracker, L: LatchPrimitive> fmt::Display for Frame<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "frame id:{}, dirty={}, pin={}, fd={}, page num={}, lsn={}",
            self.frame_id(),
            self.dirty(),
            self.pin_count(),
            self.file_desc(),
            self.page_num(),
            self.lsn()
        )
    }
}

impl<T: LatchTracker, L: LatchPrimitive> fmt::Debug for Frame<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut s = f.debug_struct("Frame");
        s.field("frame_id", &self.frame_id())
            .field("dirty", &self.dirty())
            .field("pin", &self.pin_count())
            .field("lsn", &self.lsn())
            .field("last_access", &self.last_access());
        if let Some(owners) = self.latch_owners() {
            s.field("owners", &owners);
        }
        s.finish()
    }
}
