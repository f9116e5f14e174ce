pub mod clock;
pub mod error;
pub mod frame;
pub mod frame_id;
pub mod latch;
pub mod page;
pub mod pin;
pub mod types;
pub mod utils;
pub mod xid;

mod log;

pub use error::{LatchViolation, ViolationKind};
pub use frame::Frame;
pub use frame_id::FrameId;
pub use latch::{
    CheckedTracker, FrameReadGuard, FrameWriteGuard, LatchOwners, NoopTracker, RwLatch,
    SerialLatch,
};
pub use page::{Page, PAGE_DATA_SIZE, PAGE_SIZE};
pub use xid::{SessionScope, Xid};
