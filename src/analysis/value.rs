use crate::types::Ty;

/// `(type, emitted text)` — the analyzer's evaluation-stack entry (§3
/// "Value"). The distilled spec models expression walking as values pushed
/// to and popped from an explicit stack; here the Rust call stack plays
/// that role directly: `walk_expr` returns the `EvalValue` a stack push
/// would have produced, and its caller is the corresponding pop. No literal
/// `Vec`-backed stack exists, matching the idiom of the teacher's own
/// recursive-descent passes rather than the original's explicit
/// `TEvaluationStack`.
#[derive(Clone, Debug)]
pub struct EvalValue {
    pub ty: Ty,
    pub text: String,
}

impl EvalValue {
    pub fn new(ty: Ty, text: impl Into<String>) -> Self {
        EvalValue { ty, text: text.into() }
    }
}
