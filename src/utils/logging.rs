//! Logging macros gated by a module-level `ENABLE_LOGS` flag.
//!
//! Usage:
//! ```ignore
//! // In the pipeline module, define the flag first:
//! const ENABLE_LOGS: bool = true;
//!
//! // The macros are exported at the crate root:
//! use crate::{log_error, log_info, log_warn};
//!
//! log_info!("INSERTED_DB device={}", device_id);
//! ```

/// Info line, emitted only when the calling module sets `ENABLE_LOGS = true`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    fn bump(calls: &Cell<u32>) -> u32 {
        calls.set(calls.get() + 1);
        calls.get()
    }

    #[test]
    fn disabled_module_emits_nothing() {
        const ENABLE_LOGS: bool = false;
        log::set_max_level(log::LevelFilter::Trace);
        let calls = Cell::new(0);

        crate::log_info!("info {}", bump(&calls));
        crate::log_warn!("warn {}", bump(&calls));
        crate::log_error!("error {}", bump(&calls));

        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn enabled_module_emits_every_level() {
        const ENABLE_LOGS: bool = true;
        log::set_max_level(log::LevelFilter::Trace);
        let calls = Cell::new(0);

        crate::log_info!("info {}", bump(&calls));
        crate::log_warn!("warn {}", bump(&calls));
        crate::log_error!("error {}", bump(&calls));

        assert_eq!(calls.get(), 3);
    }
}
