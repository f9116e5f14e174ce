use std::{
    collections::BTreeSet,
    fmt,
    sync::atomic::{AtomicI32, Ordering},
};

use itertools::Itertools;
use parking_lot::Mutex;

use crate::{
    error::{LatchViolation, ViolationKind},
    frame_id::FrameId,
    page::Page,
    pin::PinCounter,
    xid::Xid,
};

/// A read-only view of the frame state a tracker needs to report on.
///
/// Building it costs nothing, fields are only read when a tracker
/// actually checks something.
pub struct Probe<'a> {
    pub(crate) file_desc: &'a AtomicI32,
    pub(crate) page: &'a Page,
    pub(crate) pin: &'a PinCounter,
}

impl Probe<'_> {
    pub fn frame_id(&self) -> FrameId {
        FrameId::new(self.file_desc.load(Ordering::Acquire), self.page.page_num())
    }

    pub fn pin_count(&self) -> i32 {
        self.pin.get()
    }
}

/// Who holds the latch of a frame, as far as the bookkeeping knows.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LatchOwners {
    write_owner: Option<Xid>,
    read_owners: BTreeSet<Xid>,
}

impl LatchOwners {
    pub fn write_owner(&self) -> Option<Xid> {
        self.write_owner
    }

    pub fn read_owners(&self) -> &BTreeSet<Xid> {
        &self.read_owners
    }

    pub fn is_empty(&self) -> bool {
        self.write_owner.is_none() && self.read_owners.is_empty()
    }
}

impl fmt::Display for LatchOwners {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let w = match self.write_owner {
            Some(xid) => xid.to_string(),
            None => "none".to_string(),
        };
        write!(f, "w: {}, r: [{}]", w, self.read_owners.iter().join(", "))
    }
}

impl fmt::Debug for LatchOwners {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Hooks a frame calls around every pin and latch transition.
///
/// The real concurrency control never depends on a tracker, it only
/// records intent and reports discipline violations.
pub trait LatchTracker: Default + Send + Sync {
    /// Run the pin count increment `pin` and return its result.
    fn on_pin<F: FnOnce() -> i32>(&self, probe: &Probe<'_>, xid: Xid, pin: F) -> i32;

    /// Run the pin count decrement `unpin` and return its result.
    fn on_unpin<F: FnOnce() -> i32>(&self, probe: &Probe<'_>, xid: Xid, unpin: F) -> i32;

    fn before_write_latch(&self, probe: &Probe<'_>, xid: Xid);

    fn after_write_latch(&self, probe: &Probe<'_>, xid: Xid);

    fn before_write_unlatch(&self, probe: &Probe<'_>, xid: Xid);

    /// Records `xid` as a reader before the real latch is requested.
    fn before_read_latch(&self, probe: &Probe<'_>, xid: Xid);

    fn before_try_read_latch(&self, probe: &Probe<'_>, xid: Xid);

    /// Only called when the non-blocking attempt succeeded.
    fn after_try_read_latch(&self, probe: &Probe<'_>, xid: Xid);

    fn before_read_unlatch(&self, probe: &Probe<'_>, xid: Xid);

    fn before_purge(&self, probe: &Probe<'_>);

    /// Drop `xid` as the write owner without checking anything. Used when
    /// a guard is released while its thread unwinds.
    fn forget_write(&self, xid: Xid);

    /// Drop `xid` from the readers without checking anything.
    fn forget_read(&self, xid: Xid);

    /// `None` when the tracker keeps no bookkeeping.
    fn owners(&self) -> Option<LatchOwners>;
}

/// Trusts the caller, every hook compiles down to nothing.
#[derive(Default)]
pub struct NoopTracker;

impl LatchTracker for NoopTracker {
    #[inline(always)]
    fn on_pin<F: FnOnce() -> i32>(&self, _: &Probe<'_>, _: Xid, pin: F) -> i32 {
        pin()
    }

    #[inline(always)]
    fn on_unpin<F: FnOnce() -> i32>(&self, _: &Probe<'_>, _: Xid, unpin: F) -> i32 {
        unpin()
    }

    #[inline(always)]
    fn before_write_latch(&self, _: &Probe<'_>, _: Xid) {}

    #[inline(always)]
    fn after_write_latch(&self, _: &Probe<'_>, _: Xid) {}

    #[inline(always)]
    fn before_write_unlatch(&self, _: &Probe<'_>, _: Xid) {}

    #[inline(always)]
    fn before_read_latch(&self, _: &Probe<'_>, _: Xid) {}

    #[inline(always)]
    fn before_try_read_latch(&self, _: &Probe<'_>, _: Xid) {}

    #[inline(always)]
    fn after_try_read_latch(&self, _: &Probe<'_>, _: Xid) {}

    #[inline(always)]
    fn before_read_unlatch(&self, _: &Probe<'_>, _: Xid) {}

    #[inline(always)]
    fn before_purge(&self, _: &Probe<'_>) {}

    #[inline(always)]
    fn forget_write(&self, _: Xid) {}

    #[inline(always)]
    fn forget_read(&self, _: Xid) {}

    fn owners(&self) -> Option<LatchOwners> {
        None
    }
}

/// Records the latch owners of a frame and panics on the first
/// discipline violation.
///
/// The owners live behind their own mutex, so inspecting them never
/// needs the frame's real latch.
#[derive(Default)]
pub struct CheckedTracker {
    owners: Mutex<LatchOwners>,
}

impl CheckedTracker {
    fn violate(&self, kind: ViolationKind, probe: &Probe<'_>, xid: Xid, owners: &LatchOwners) -> ! {
        let violation = LatchViolation::new(
            kind,
            &probe.frame_id().to_string(),
            probe.pin_count(),
            xid,
            &owners.to_string(),
        );
        violation.show_backtrace();
        panic!("{}", violation);
    }

    fn check_pinned(&self, probe: &Probe<'_>, xid: Xid, owners: &LatchOwners) {
        if probe.pin_count() <= 0 {
            self.violate(ViolationKind::LatchWithoutPin, probe, xid, owners);
        }
    }

    fn check_read(&self, probe: &Probe<'_>, xid: Xid, owners: &LatchOwners) {
        self.check_pinned(probe, xid, owners);

        if owners.read_owners.contains(&xid) {
            self.violate(ViolationKind::ReadTwice, probe, xid, owners);
        }

        if owners.write_owner == Some(xid) {
            self.violate(ViolationKind::ReadWhileWriting, probe, xid, owners);
        }
    }
}

impl LatchTracker for CheckedTracker {
    fn on_pin<F: FnOnce() -> i32>(&self, _: &Probe<'_>, _: Xid, pin: F) -> i32 {
        let _owners = self.owners.lock();
        pin()
    }

    fn on_unpin<F: FnOnce() -> i32>(&self, probe: &Probe<'_>, xid: Xid, unpin: F) -> i32 {
        let owners = self.owners.lock();

        if probe.pin_count() <= 0 {
            self.violate(ViolationKind::UnpinUnderflow, probe, xid, &owners);
        }

        let pin_count = unpin();

        if pin_count == 0 {
            if owners.write_owner.is_some() {
                self.violate(ViolationKind::UnpinWhileWriteLatched, probe, xid, &owners);
            }
            if !owners.read_owners.is_empty() {
                self.violate(ViolationKind::UnpinWhileReadLatched, probe, xid, &owners);
            }
        }

        pin_count
    }

    fn before_write_latch(&self, probe: &Probe<'_>, xid: Xid) {
        let owners = self.owners.lock();
        self.check_pinned(probe, xid, &owners);

        if owners.write_owner == Some(xid) {
            self.violate(ViolationKind::WriteTwice, probe, xid, &owners);
        }

        if owners.read_owners.contains(&xid) {
            self.violate(ViolationKind::WriteWhileReading, probe, xid, &owners);
        }
    }

    fn after_write_latch(&self, _: &Probe<'_>, xid: Xid) {
        self.owners.lock().write_owner = Some(xid);
    }

    fn before_write_unlatch(&self, probe: &Probe<'_>, xid: Xid) {
        let mut owners = self.owners.lock();
        self.check_pinned(probe, xid, &owners);

        if owners.write_owner != Some(xid) {
            self.violate(ViolationKind::WriteUnlatchNotOwner, probe, xid, &owners);
        }

        owners.write_owner = None;
    }

    fn before_read_latch(&self, probe: &Probe<'_>, xid: Xid) {
        let mut owners = self.owners.lock();
        self.check_read(probe, xid, &owners);
        owners.read_owners.insert(xid);
    }

    fn before_try_read_latch(&self, probe: &Probe<'_>, xid: Xid) {
        let owners = self.owners.lock();
        self.check_read(probe, xid, &owners);
    }

    fn after_try_read_latch(&self, _: &Probe<'_>, xid: Xid) {
        self.owners.lock().read_owners.insert(xid);
    }

    fn before_read_unlatch(&self, probe: &Probe<'_>, xid: Xid) {
        let mut owners = self.owners.lock();
        self.check_pinned(probe, xid, &owners);

        if !owners.read_owners.remove(&xid) {
            self.violate(ViolationKind::ReadUnlatchNotOwner, probe, xid, &owners);
        }
    }

    fn before_purge(&self, probe: &Probe<'_>) {
        let owners = self.owners.lock();
        if probe.pin_count() != 0 || !owners.is_empty() {
            self.violate(ViolationKind::PurgeInUse, probe, Xid::current(), &owners);
        }
    }

    fn forget_write(&self, xid: Xid) {
        let mut owners = self.owners.lock();
        if owners.write_owner == Some(xid) {
            owners.write_owner = None;
        }
    }

    fn forget_read(&self, xid: Xid) {
        self.owners.lock().read_owners.remove(&xid);
    }

    fn owners(&self) -> Option<LatchOwners> {
        Some(self.owners.lock().clone())
    }
}

#[cfg(any(debug_assertions, feature = "latch_check"))]
pub type DefaultTracker = CheckedTracker;

#[cfg(not(any(debug_assertions, feature = "latch_check")))]
pub type DefaultTracker = NoopTracker;
