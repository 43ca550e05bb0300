//! Structured diagnostic payloads (§2 "Position & diagnostics", §7 error handling design).

mod display;
mod errors;
#[macro_use]
mod dev_logging;
mod warnings;

pub use display::{format_error, print_messages};
pub use errors::{CompilerError, CompilerMessages, ErrorType};
pub use warnings::CompilerWarning;
