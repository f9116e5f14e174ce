use std::{
    fmt,
    marker::PhantomData,
    ops::{Deref, DerefMut},
    thread,
};

use super::{primitive::LatchPrimitive, tracker::LatchTracker};
use crate::{
    frame::Frame,
    types::{Lsn, PageNum},
    xid::Xid,
};

// bytes shown by the Debug impls of the guards
const PEEK_LEN: usize = 16;

/// RAII structure used to release a shared latch of a frame when
/// dropped. Gives read access to the page content.
pub struct FrameReadGuard<'a, T: LatchTracker, L: LatchPrimitive> {
    frame: &'a Frame<T, L>,
    xid: Xid,
    // the latch is released on the thread that acquired it
    _not_send: PhantomData<*const ()>,
}

impl<'a, T: LatchTracker, L: LatchPrimitive> FrameReadGuard<'a, T, L> {
    /// # Safety
    ///
    /// `xid` must hold the shared latch of `frame`, and the latch must not
    /// be released by anyone but the returned guard.
    pub(crate) unsafe fn new(frame: &'a Frame<T, L>, xid: Xid) -> Self {
        Self {
            frame,
            xid,
            _not_send: PhantomData,
        }
    }

    pub fn xid(&self) -> Xid {
        self.xid
    }

    pub fn frame(&self) -> &'a Frame<T, L> {
        self.frame
    }
}

impl<T: LatchTracker, L: LatchPrimitive> Deref for FrameReadGuard<'_, T, L> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        // Safety: the guard holds the shared latch.
        unsafe { self.frame.data_unchecked() }
    }
}

impl<T: LatchTracker, L: LatchPrimitive> Drop for FrameReadGuard<'_, T, L> {
    fn drop(&mut self) {
        // Safety: the guard holds the shared latch on behalf of `xid`.
        unsafe {
            if thread::panicking() {
                self.frame.unlatch_unwinding(self.xid, false);
            } else {
                self.frame.read_unlatch_with(self.xid);
            }
        }
    }
}

impl<T: LatchTracker, L: LatchPrimitive> fmt::Debug for FrameReadGuard<'_, T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameReadGuard")
            .field("frame_id", &self.frame.frame_id())
            .field("xid", &self.xid)
            .field("data", &hex::encode(&self[..PEEK_LEN]))
            .finish()
    }
}

/// RAII structure used to release the exclusive latch of a frame when
/// dropped. Gives read-write access to the page content.
///
/// Writing through the guard does not mark the frame dirty by itself,
/// call `mark_dirty` once the change is meant to reach the disk.
pub struct FrameWriteGuard<'a, T: LatchTracker, L: LatchPrimitive> {
    frame: &'a Frame<T, L>,
    xid: Xid,
    _not_send: PhantomData<*const ()>,
}

impl<'a, T: LatchTracker, L: LatchPrimitive> FrameWriteGuard<'a, T, L> {
    /// # Safety
    ///
    /// `xid` must hold the exclusive latch of `frame`, and the latch must
    /// not be released by anyone but the returned guard.
    pub(crate) unsafe fn new(frame: &'a Frame<T, L>, xid: Xid) -> Self {
        Self {
            frame,
            xid,
            _not_send: PhantomData,
        }
    }

    pub fn xid(&self) -> Xid {
        self.xid
    }

    pub fn frame(&self) -> &'a Frame<T, L> {
        self.frame
    }

    pub fn mark_dirty(&self) {
        self.frame.mark_dirty();
    }

    pub fn set_lsn(&self, lsn: Lsn) {
        self.frame.set_lsn(lsn);
    }

    pub fn set_page_num(&self, page_num: PageNum) {
        self.frame.set_page_num(page_num);
    }

    /// Zero the page content and its lsn.
    pub fn clear(&mut self) {
        self.fill(0);
        self.frame.set_lsn(0);
    }
}

impl<T: LatchTracker, L: LatchPrimitive> Deref for FrameWriteGuard<'_, T, L> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        // Safety: the guard holds the exclusive latch.
        unsafe { self.frame.data_unchecked() }
    }
}

impl<T: LatchTracker, L: LatchPrimitive> DerefMut for FrameWriteGuard<'_, T, L> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // Safety: the guard holds the exclusive latch, and `&mut self`
        // keeps this the only live reference handed out by it.
        unsafe { self.frame.data_mut_unchecked() }
    }
}

impl<T: LatchTracker, L: LatchPrimitive> Drop for FrameWriteGuard<'_, T, L> {
    fn drop(&mut self) {
        // Safety: the guard holds the exclusive latch on behalf of `xid`.
        unsafe {
            if thread::panicking() {
                self.frame.unlatch_unwinding(self.xid, true);
            } else {
                self.frame.write_unlatch_with(self.xid);
            }
        }
    }
}

impl<T: LatchTracker, L: LatchPrimitive> fmt::Debug for FrameWriteGuard<'_, T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameWriteGuard")
            .field("frame_id", &self.frame.frame_id())
            .field("xid", &self.xid)
            .field("dirty", &self.frame.dirty())
            .field("data", &hex::encode(&self[..PEEK_LEN]))
            .finish()
    }
}
