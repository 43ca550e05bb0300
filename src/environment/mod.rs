//! Nested symbol tables and scope kinds (§3 "Environment", "Scope", "Symbol").

mod env;
mod scope;
mod symbol;

pub use env::Env;
pub use scope::{Scope, ScopeKind};
pub use symbol::Symbol;
