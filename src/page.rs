use std::{
    cell::UnsafeCell,
    mem,
    sync::atomic::{AtomicI32, AtomicI64, Ordering},
};

use crate::types::{Lsn, PageNum, INVALID_PAGE_NUM};

/// Size of a page on disk.
pub const PAGE_SIZE: usize = 1 << 13;

/// Bytes left for the content once the page header (page number and
/// lsn) is accounted for.
pub const PAGE_DATA_SIZE: usize =
    PAGE_SIZE - mem::size_of::<PageNum>() - mem::size_of::<Lsn>();

/// One disk page held in memory: a small header and the content bytes.
///
/// The header fields are atomics so the buffer pool can read a frame's
/// identity and lsn without latching it. The content bytes are only
/// reachable through the owning frame's latch.
pub struct Page {
    page_num: AtomicI32,
    lsn: AtomicI64,
    data: UnsafeCell<[u8; PAGE_DATA_SIZE]>,
}

// Safety: `data` is only dereferenced by `Frame`, which holds its latch
// (shared for reads, exclusive for writes) for as long as the returned
// reference lives.
unsafe impl Sync for Page {}

impl Page {
    pub fn new() -> Self {
        Self::with_page_num(INVALID_PAGE_NUM)
    }

    pub fn with_page_num(page_num: PageNum) -> Self {
        Self {
            page_num: AtomicI32::new(page_num),
            lsn: AtomicI64::new(0),
            data: UnsafeCell::new([0; PAGE_DATA_SIZE]),
        }
    }

    pub fn page_num(&self) -> PageNum {
        self.page_num.load(Ordering::Acquire)
    }

    pub(crate) fn set_page_num(&self, page_num: PageNum) {
        self.page_num.store(page_num, Ordering::Release);
    }

    pub fn lsn(&self) -> Lsn {
        self.lsn.load(Ordering::Acquire)
    }

    pub(crate) fn set_lsn(&self, lsn: Lsn) {
        self.lsn.store(lsn, Ordering::Release);
    }

    /// # Safety
    ///
    /// The caller must hold the owning frame's latch in shared or
    /// exclusive mode until the slice is dropped.
    pub(crate) unsafe fn data(&self) -> &[u8] {
        &*self.data.get()
    }

    /// # Safety
    ///
    /// The caller must hold the owning frame's latch in exclusive mode
    /// until the slice is dropped.
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn data_mut(&self) -> &mut [u8] {
        &mut *self.data.get()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}
