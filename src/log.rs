use std::{io::Write, thread};

use env_logger::Builder;

/// Install the logger, configured by `RUST_LOG`.
///
/// Latch problems are about interleavings, so every line carries the
/// name of the thread that wrote it. Calling it again is harmless.
pub fn init_log() {
    let mut builder = Builder::from_default_env();
    let _ = builder
        .format_timestamp_secs()
        .format(|buf, record| {
            let current = thread::current();
            writeln!(
                buf,
                "[{}] [{}] [{}:{}] {}",
                record.level(),
                current.name().unwrap_or("-"),
                record.file().unwrap_or("?"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init();
}
