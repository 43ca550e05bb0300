//! Feature-gated development tracing, one macro per pipeline phase, after the
//! teacher's `compiler_dev_logging.rs`. Each macro compiles away to nothing
//! unless its `show_*` feature is enabled, so normal builds pay zero cost.

#[macro_export]
#[cfg(feature = "show_tokens")]
macro_rules! token_log {
    ($($arg:tt)*) => { saying::say!($($arg)*); };
}
#[macro_export]
#[cfg(not(feature = "show_tokens"))]
macro_rules! token_log {
    ($($arg:tt)*) => {};
}

#[macro_export]
#[cfg(feature = "show_headers")]
macro_rules! header_log {
    ($($arg:tt)*) => { saying::say!($($arg)*); };
}
#[macro_export]
#[cfg(not(feature = "show_headers"))]
macro_rules! header_log {
    ($($arg:tt)*) => {};
}

#[macro_export]
#[cfg(feature = "show_ast")]
macro_rules! ast_log {
    ($($arg:tt)*) => { saying::say!($($arg)*); };
}
#[macro_export]
#[cfg(not(feature = "show_ast"))]
macro_rules! ast_log {
    ($($arg:tt)*) => {};
}

#[macro_export]
#[cfg(feature = "show_eval")]
macro_rules! eval_log {
    ($($arg:tt)*) => { saying::say!($($arg)*); };
}
#[macro_export]
#[cfg(not(feature = "show_eval"))]
macro_rules! eval_log {
    ($($arg:tt)*) => {};
}

#[macro_export]
#[cfg(feature = "show_emit")]
macro_rules! emit_log {
    ($($arg:tt)*) => { saying::say!($($arg)*); };
}
#[macro_export]
#[cfg(not(feature = "show_emit"))]
macro_rules! emit_log {
    ($($arg:tt)*) => {};
}

#[macro_export]
#[cfg(feature = "detailed_timers")]
macro_rules! timer_log {
    ($time:expr, $msg:expr) => { saying::say!($msg, Green #$time.elapsed()); };
}
#[macro_export]
#[cfg(not(feature = "detailed_timers"))]
macro_rules! timer_log {
    ($time:expr, $msg:expr) => {};
}
