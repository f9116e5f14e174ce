pub use crate::log::init_log;

/// Log which latch strategies this build was compiled with.
pub fn print_features() {
    if cfg!(feature = "serial_latch") {
        log::debug!("latch strategy: serial");
    } else {
        log::debug!("latch strategy: shared/exclusive");
    }

    if cfg!(any(debug_assertions, feature = "latch_check")) {
        log::debug!("latch discipline check enabled");
    } else {
        log::debug!("--- latch discipline check disabled ---");
    }

    if cfg!(feature = "benchmark") {
        log::debug!("benchmark enabled");
    }
}
