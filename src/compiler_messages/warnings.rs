use crate::position::SourceSpan;
use serde::{Deserialize, Serialize};

/// Non-fatal diagnostics. No compile warning is *required* by the spec, but
/// the channel exists alongside `CompilerError` the way the teacher's
/// `CompilerMessages { errors, warnings }` keeps both, so builders can extend
/// it (e.g. an unused `import` alias that isn't an outright `Rule` error).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompilerWarning {
    pub message: String,
    pub location: SourceSpan,
}

impl CompilerWarning {
    pub fn new(message: impl Into<String>, location: SourceSpan) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}
