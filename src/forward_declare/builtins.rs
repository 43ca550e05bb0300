//! The minimal built-in bindings (§1 Non-goals: "no standard library beyond
//! `print`, `println`, `panic`"). Ported from `original_source/compiler/loader.go`'s
//! `Load`. The original also defines `append` as a plain global bound
//! directly to Go's builtin `append`, but that only works against a bare
//! slice; every array value here is a `*ArrayWrapper` pointer (§4.7), so
//! `append` is handled as call-site sugar for the wrapper's `Push` method in
//! `analysis::analyzer::walk_append_call` instead of being registered here.

use crate::environment::{Env, Symbol};
use crate::position::{Position, SourceSpan};
use crate::types::TypeRegistry;
use std::path::PathBuf;

fn builtin_span() -> SourceSpan {
    SourceSpan::new(PathBuf::from("<builtin>"), Position::default())
}

pub fn register_builtins(env: &Env, types: &mut TypeRegistry) {
    let println_ty = types.func(true, vec![types.any.clone()], types.void.clone(), false);
    env.insert(
        Symbol::new("println", "fmt.Println", println_ty, builtin_span())
            .global()
            .used()
            .with_host_module("fmt"),
    );

    let print_ty = types.func(true, vec![types.any.clone()], types.void.clone(), false);
    env.insert(
        Symbol::new("print", "fmt.Print", print_ty, builtin_span())
            .global()
            .used()
            .with_host_module("fmt"),
    );

    let panic_ty = types.func(true, vec![types.any.clone()], types.void.clone(), true);
    env.insert(
        Symbol::new("panic", "panic", panic_ty, builtin_span())
            .global()
            .used(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_the_three_bindings() {
        let env = Env::new(None);
        let mut types = TypeRegistry::new();
        register_builtins(&env, &mut types);
        for name in ["println", "print", "panic"] {
            assert!(env.has(name), "missing builtin {name}");
        }
    }
}
