use crate::position::SourceSpan;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Distinguishes the two error kinds from §7: language compile errors (syntax,
/// type, rule violations the user can fix) vs. compiler bugs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorType {
    Syntax,
    Type,
    Rule,
    /// An internal invariant was violated (empty evaluation stack popped, a
    /// symbol lookup without a guard, …). Carries the detecting Rust
    /// file/line rather than a source span.
    Compiler,
    File,
    Config,
}

/// A single structured diagnostic. `location` is `None` only for `Compiler`
/// and some `File`/`Config` errors that have no source span to point at.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompilerError {
    pub error_type: ErrorType,
    pub message: String,
    pub location: Option<SourceSpan>,
    /// Where in the *compiler's own* source the error was raised; populated
    /// for `ErrorType::Compiler` via `#[track_caller]` at the raise site.
    #[serde(skip)]
    pub detected_at: Option<(&'static str, u32)>,
}

impl CompilerError {
    pub fn new(error_type: ErrorType, message: impl Into<String>, location: SourceSpan) -> Self {
        Self {
            error_type,
            message: message.into(),
            location: Some(location),
            detected_at: None,
        }
    }

    pub fn syntax(message: impl Into<String>, location: SourceSpan) -> Self {
        Self::new(ErrorType::Syntax, message, location)
    }

    pub fn type_error(message: impl Into<String>, location: SourceSpan) -> Self {
        Self::new(ErrorType::Type, message, location)
    }

    pub fn rule(message: impl Into<String>, location: SourceSpan) -> Self {
        Self::new(ErrorType::Rule, message, location)
    }

    /// A system error: internal invariant violation or I/O/toolchain failure.
    /// Always records the Rust call site so it can be traced back during
    /// development, matching the teacher's `RaiseSystemError`/`runtime.Caller`
    /// pattern in `original_source/compiler/error.go`.
    #[track_caller]
    pub fn system(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            error_type: ErrorType::Compiler,
            message: message.into(),
            location: None,
            detected_at: Some((location.file(), location.line())),
        }
    }

    pub fn file(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            error_type: ErrorType::File,
            message: message.into(),
            location: Some(SourceSpan::new(path.into(), crate::position::Position::default())),
            detected_at: None,
        }
    }

    pub fn config(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            error_type: ErrorType::Config,
            message: message.into(),
            location: Some(SourceSpan::new(path.into(), crate::position::Position::default())),
            detected_at: None,
        }
    }
}

/// Errors and warnings collected over the course of a single compilation run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CompilerMessages {
    pub errors: Vec<CompilerError>,
    pub warnings: Vec<super::CompilerWarning>,
}

impl CompilerMessages {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

impl From<CompilerError> for CompilerMessages {
    fn from(error: CompilerError) -> Self {
        CompilerMessages {
            errors: vec![error],
            warnings: Vec::new(),
        }
    }
}
