use std::{error::Error, fmt};

use backtrace::Backtrace;
use log::error;

use crate::xid::Xid;

/// The latch/pin discipline rules a caller can break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Latch or unlatch a frame nobody has pinned.
    LatchWithoutPin,
    /// Unpin a frame whose pin count is already 0.
    UnpinUnderflow,
    WriteTwice,
    WriteWhileReading,
    ReadTwice,
    ReadWhileWriting,
    WriteUnlatchNotOwner,
    ReadUnlatchNotOwner,
    /// The last pin went away while the write latch is still held.
    UnpinWhileWriteLatched,
    /// The last pin went away while read latches are still held.
    UnpinWhileReadLatched,
    /// Reuse a frame that is still pinned or latched.
    PurgeInUse,
}

impl ViolationKind {
    pub fn describe(&self) -> &'static str {
        match self {
            ViolationKind::LatchWithoutPin => {
                "frame latch operation while pin count is invalid"
            }
            ViolationKind::UnpinUnderflow => {
                "try to unpin a frame that pin count <= 0"
            }
            ViolationKind::WriteTwice => "frame write latched twice",
            ViolationKind::WriteWhileReading => {
                "frame write latch while holding the read latch"
            }
            ViolationKind::ReadTwice => "frame read latched twice",
            ViolationKind::ReadWhileWriting => {
                "frame read latch while holding the write latch"
            }
            ViolationKind::WriteUnlatchNotOwner => {
                "frame write unlatch while not the owner"
            }
            ViolationKind::ReadUnlatchNotOwner => {
                "frame read unlatch while not holding the read latch"
            }
            ViolationKind::UnpinWhileWriteLatched => {
                "frame unpin to 0 while someone holds the write latch"
            }
            ViolationKind::UnpinWhileReadLatched => {
                "frame unpin to 0 while someone holds the read latch"
            }
            ViolationKind::PurgeInUse => {
                "frame purged while pinned or latched"
            }
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// A broken latch/pin rule, with everything needed to find the culprit.
///
/// Violations are programming errors of the caller. The checking latch
/// tracker reports them by panicking, they are never handed back as an
/// ordinary `Result`.
pub struct LatchViolation {
    kind: ViolationKind,
    details: String,
    backtrace: Backtrace,
}

impl LatchViolation {
    pub fn new(kind: ViolationKind, frame: &str, pin: i32, xid: Xid, owners: &str) -> Self {
        let details = format!(
            "{}. frame={}, pin={}, xid={}, owners={}",
            kind, frame, pin, xid, owners
        );

        LatchViolation {
            kind,
            details,
            backtrace: Backtrace::new(),
        }
    }

    pub fn kind(&self) -> ViolationKind {
        self.kind
    }

    pub fn show_backtrace(&self) {
        error!("{}, backtrace: {:?}", self.details, self.backtrace);
    }
}

impl fmt::Display for LatchViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl fmt::Debug for LatchViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\n{:?}", self.details, self.backtrace)
    }
}

impl Error for LatchViolation {}
