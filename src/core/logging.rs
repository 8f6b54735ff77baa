//! Logging initialization and utilities

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable.
///
/// # Example
/// ```
/// tg_procgen::core::logging::init();
/// log::info!("Terrain editor started");
/// ```
pub fn init() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}

/// Report a failed precondition.
///
/// Debug builds log the failure loudly; release builds stay silent and the
/// caller simply skips the operation.
#[macro_export]
macro_rules! fail_cond {
    ($cond:expr) => {
        if $cond {
            if cfg!(debug_assertions) {
                log::error!("condition \"{}\" is true, skipping", stringify!($cond));
            }
            return;
        }
    };
    ($cond:expr, $ret:expr) => {
        if $cond {
            if cfg!(debug_assertions) {
                log::error!("condition \"{}\" is true, returning {}", stringify!($cond), stringify!($ret));
            }
            return $ret;
        }
    };
}
