#![allow(dead_code)]

use std::{thread, time::Duration};

use framelatch::{
    utils, CheckedTracker, Frame, FrameId, NoopTracker, RwLatch, SerialLatch, Xid,
};

pub type CheckedFrame = Frame<CheckedTracker, RwLatch>;
pub type SerialFrame = Frame<CheckedTracker, SerialLatch>;
pub type UncheckedFrame = Frame<NoopTracker, RwLatch>;

/// # Conduct the initialization
///
/// - Setting up log configurations.
/// - Log the latch features of this build.
pub fn setup() {
    utils::init_log();
    utils::print_features();
}

pub fn checked_frame(file_desc: i32, page_num: i32) -> CheckedFrame {
    Frame::assigned(FrameId::new(file_desc, page_num))
}

pub fn serial_frame(file_desc: i32, page_num: i32) -> SerialFrame {
    Frame::assigned(FrameId::new(file_desc, page_num))
}

pub fn unchecked_frame(file_desc: i32, page_num: i32) -> UncheckedFrame {
    Frame::assigned(FrameId::new(file_desc, page_num))
}

/// Wait until `xid` shows up as a reader of `frame`, give up after
/// roughly a second.
pub fn wait_for_reader(frame: &CheckedFrame, xid: Xid) -> bool {
    for _ in 0..1000 {
        let owners = frame.latch_owners().unwrap();
        if owners.read_owners().contains(&xid) {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

pub fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}

pub fn write_u64(bytes: &mut [u8], value: u64) {
    bytes[..8].copy_from_slice(&value.to_le_bytes());
}
