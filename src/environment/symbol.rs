use crate::position::SourceSpan;
use crate::types::Ty;

/// `(name, emitted namespace, host module, type, declaration position, flags)` — §3.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    /// The absolute name this symbol is emitted under in the Go output.
    pub namespace: String,
    /// Non-empty when the symbol came from a `host:<pkg>` import.
    pub host_module: String,
    pub ty: Ty,
    pub declared_at: SourceSpan,
    pub is_global: bool,
    pub is_const: bool,
    pub is_used: bool,
    pub is_initialized: bool,
}

impl Symbol {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, ty: Ty, declared_at: SourceSpan) -> Self {
        Symbol {
            name: name.into(),
            namespace: namespace.into(),
            host_module: String::new(),
            ty,
            declared_at,
            is_global: false,
            is_const: false,
            is_used: false,
            is_initialized: false,
        }
    }

    pub fn global(mut self) -> Self {
        self.is_global = true;
        self
    }

    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn initialized(mut self) -> Self {
        self.is_initialized = true;
        self
    }

    /// Parameters are pre-marked used at scope entry (§4.4).
    pub fn used(mut self) -> Self {
        self.is_used = true;
        self
    }

    pub fn with_host_module(mut self, module: impl Into<String>) -> Self {
        self.host_module = module.into();
        self
    }
}
