mod guard;
mod primitive;
mod tracker;

pub use guard::{FrameReadGuard, FrameWriteGuard};
pub use primitive::{DefaultLatch, LatchPrimitive, RwLatch, SerialLatch};
pub use tracker::{
    CheckedTracker, DefaultTracker, LatchOwners, LatchTracker, NoopTracker, Probe,
};
