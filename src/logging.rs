//! Library log macros.
//!
//! Every level forwards to the matching `tracing` macro when the `logging`
//! feature is on and expands to nothing otherwise, so the compiler, codec
//! and dispatch paths build without `tracing` at all.
//!
//! ```rust,ignore
//! use crate::logging::{debug, warn};
//!
//! debug!(module = name, bytes = contents.len(), "emitted module");
//! warn!(servant = %request.servant_name, error = %e, "dispatch failed");
//! ```

#[cfg(feature = "logging")]
macro_rules! log_at {
    ($level:ident, $($arg:tt)*) => { tracing::$level!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_at {
    ($level:ident, $($arg:tt)*) => {};
}

/// Per-field codec and resolution detail.
macro_rules! log_trace {
    ($($arg:tt)*) => { $crate::logging::log_at!(trace, $($arg)*) };
}

/// One line per compiled file, emitted module or routed call.
macro_rules! log_debug {
    ($($arg:tt)*) => { $crate::logging::log_at!(debug, $($arg)*) };
}

/// Run summaries.
macro_rules! log_info {
    ($($arg:tt)*) => { $crate::logging::log_at!(info, $($arg)*) };
}

/// Handled failures: rejected requests, failed one-way handlers.
macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::logging::log_at!(warn, $($arg)*) };
}

/// Failures that leave a caller without a response.
macro_rules! log_error {
    ($($arg:tt)*) => { $crate::logging::log_at!(error, $($arg)*) };
}

pub(crate) use log_at;
pub(crate) use log_debug as debug;
pub(crate) use log_error as error;
pub(crate) use log_info as info;
pub(crate) use log_trace as trace;
pub(crate) use log_warn as warn;

#[cfg(test)]
mod tests {
    use super::{debug, error, info, trace, warn};

    #[test]
    #[allow(unused_variables)]
    fn test_every_level_expands() {
        let module = "Demo";
        trace!(module, tag = 3, "field");
        debug!(module, bytes = 10, "emitted module");
        info!(files = 2, root = %module, "emitted rust sources");
        warn!(function = "notify", error = %"boom", "one-way handler failed");
        error!(module, "no response");
    }
}
