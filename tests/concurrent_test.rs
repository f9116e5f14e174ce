mod test_utils;

use std::sync::atomic::{AtomicUsize, Ordering};

use framelatch::Xid;
use rand::prelude::*;

use crate::test_utils::{checked_frame, read_u64, serial_frame, setup, write_u64, CheckedFrame};

// Each worker pins the frame, bumps a counter stored in the page under the
// exclusive latch, and unpins it.
fn incrementer(frame: &CheckedFrame, rounds: usize) {
    for _ in 0..rounds {
        frame.pin();
        {
            let mut page = frame.write();
            let v = read_u64(&page);
            write_u64(&mut page, v + 1);
            page.mark_dirty();
        }
        frame.access();
        frame.unpin();
    }
}

/// Writers never lose an update, and once everybody is gone the frame is
/// unpinned and unlatched.
#[test]
fn test_concurrent_writers() {
    setup();

    let frame = checked_frame(1, 1);
    let workers = 8;
    let rounds = 500;

    crossbeam::thread::scope(|s| {
        for _ in 0..workers {
            s.spawn(|_| incrementer(&frame, rounds));
        }
    })
    .unwrap();

    assert!(frame.can_purge());
    assert!(frame.dirty());
    assert!(frame.latch_owners().unwrap().is_empty());

    frame.pin();
    assert_eq!(read_u64(&frame.read()), (workers * rounds) as u64);
    frame.unpin();
}

/// Readers and writers mixed: a reader only ever sees a page where the two
/// halves written together agree.
#[test]
fn test_readers_see_whole_writes() {
    setup();

    let frame = checked_frame(1, 1);
    let torn = AtomicUsize::new(0);

    crossbeam::thread::scope(|s| {
        for w in 0..4u64 {
            let frame = &frame;
            s.spawn(move |_| {
                for i in 0..200 {
                    frame.pin();
                    {
                        let mut page = frame.write();
                        let v = w * 1000 + i;
                        write_u64(&mut page[..8], v);
                        write_u64(&mut page[8..16], v);
                    }
                    frame.unpin();
                }
            });
        }

        for _ in 0..4 {
            let (frame, torn) = (&frame, &torn);
            s.spawn(move |_| {
                for _ in 0..200 {
                    frame.pin();
                    {
                        let page = frame.read();
                        if read_u64(&page[..8]) != read_u64(&page[8..16]) {
                            torn.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    frame.unpin();
                }
            });
        }
    })
    .unwrap();

    assert_eq!(torn.load(Ordering::Relaxed), 0);
    assert!(frame.can_purge());
}

/// `try_read_latch` gives up at once while a writer on another thread
/// holds the latch.
#[test]
fn test_try_read_never_blocks() {
    setup();

    let frame = checked_frame(1, 1);
    frame.pin();

    let (held_tx, held_rx) = crossbeam::channel::bounded(0);
    let (done_tx, done_rx) = crossbeam::channel::bounded::<()>(0);

    crossbeam::thread::scope(|s| {
        s.spawn(|_| {
            let _page = frame.write();
            held_tx.send(()).unwrap();
            done_rx.recv().unwrap();
        });

        held_rx.recv().unwrap();
        assert!(!frame.try_read_latch());
        assert!(frame.try_read().is_none());
        done_tx.send(()).unwrap();
    })
    .unwrap();

    assert!(frame.try_read_latch());
    unsafe { frame.read_unlatch() };
    assert_eq!(frame.unpin(), 0);
}

/// The serial latch still gives every caller the latch eventually, one
/// at a time.
#[test]
fn test_serial_latch_progress() {
    setup();

    let frame = serial_frame(1, 1);
    let inside = AtomicUsize::new(0);
    let overlap = AtomicUsize::new(0);

    crossbeam::thread::scope(|s| {
        for _ in 0..8 {
            let (frame, inside, overlap) = (&frame, &inside, &overlap);
            s.spawn(move |_| {
                let mut rng = rand::thread_rng();
                for _ in 0..100 {
                    frame.pin();
                    let xid = Xid::next();
                    if rng.gen::<bool>() {
                        let _page = frame.read_with(xid);
                        if inside.fetch_add(1, Ordering::SeqCst) != 0 {
                            overlap.fetch_add(1, Ordering::SeqCst);
                        }
                        inside.fetch_sub(1, Ordering::SeqCst);
                    } else {
                        let _page = frame.write_with(xid);
                        if inside.fetch_add(1, Ordering::SeqCst) != 0 {
                            overlap.fetch_add(1, Ordering::SeqCst);
                        }
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                    frame.unpin();
                }
            });
        }
    })
    .unwrap();

    assert_eq!(overlap.load(Ordering::SeqCst), 0);
    assert!(frame.can_purge());
}

/// Lots of threads hammering one frame.
#[test]
#[cfg(feature = "benchmark")]
fn test_concurrent_writers_heavy() {
    setup();

    let frame = checked_frame(1, 1);
    let workers = 64;
    let rounds = 10_000;

    crossbeam::thread::scope(|s| {
        for _ in 0..workers {
            s.spawn(|_| incrementer(&frame, rounds));
        }
    })
    .unwrap();

    frame.pin();
    assert_eq!(read_u64(&frame.read()), (workers * rounds) as u64);
    frame.unpin();
}
