use super::env::Env;
use crate::types::Ty;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Scope kinds (§3): global, local, struct, function, loop, single.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Local,
    Struct,
    Function,
    Loop,
    /// A scope that may not introduce new bindings (§4.4's `:=` restriction
    /// on "global and single scopes" — a single-statement body such as a
    /// bodyless `if`/`for` arm).
    Single,
}

/// `(kind, parent, environment, panics declared flag, panics observed flag,
/// captured return type)` — §3.
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<Rc<Scope>>,
    pub env: Env,
    pub panics_declared: bool,
    pub panics_observed: Cell<bool>,
    pub return_type: RefCell<Option<Ty>>,
}

impl Scope {
    pub fn root(kind: ScopeKind) -> Rc<Scope> {
        Rc::new(Scope {
            kind,
            parent: None,
            env: Env::new(None),
            panics_declared: false,
            panics_observed: Cell::new(false),
            return_type: RefCell::new(None),
        })
    }

    pub fn child(parent: &Rc<Scope>, kind: ScopeKind) -> Rc<Scope> {
        Rc::new(Scope {
            kind,
            parent: Some(parent.clone()),
            env: Env::new(Some(parent.env.clone())),
            panics_declared: false,
            panics_observed: Cell::new(false),
            return_type: RefCell::new(None),
        })
    }

    /// Wraps an already-populated environment (a file's global scope, built
    /// up over the forward-declaration pass) as the root of a scope chain,
    /// rather than starting from an empty one like `root` does.
    pub fn from_env(kind: ScopeKind, env: Env) -> Rc<Scope> {
        Rc::new(Scope {
            kind,
            parent: None,
            env,
            panics_declared: false,
            panics_observed: Cell::new(false),
            return_type: RefCell::new(None),
        })
    }

    pub fn child_with_panics(parent: &Rc<Scope>, kind: ScopeKind, panics_declared: bool) -> Rc<Scope> {
        Rc::new(Scope {
            kind,
            parent: Some(parent.clone()),
            env: Env::new(Some(parent.env.clone())),
            panics_declared,
            panics_observed: Cell::new(false),
            return_type: RefCell::new(None),
        })
    }

    pub fn in_global(&self) -> bool {
        self.kind == ScopeKind::Global
    }

    pub fn in_local(&self) -> bool {
        self.walk_has_kind(ScopeKind::Local)
    }

    pub fn in_struct(&self) -> bool {
        self.walk_has_kind(ScopeKind::Struct)
    }

    pub fn in_loop(&self) -> bool {
        self.walk_has_kind(ScopeKind::Loop)
    }

    pub fn in_single(&self) -> bool {
        self.kind == ScopeKind::Single
    }

    fn walk_has_kind(&self, kind: ScopeKind) -> bool {
        let mut current = Some(self);
        while let Some(scope) = current {
            if scope.kind == kind {
                return true;
            }
            current = scope.parent.as_deref();
        }
        false
    }

    /// The nearest enclosing function scope, where returns are aggregated
    /// and the `panics` effect is tracked (§3, §4.4).
    pub fn enclosing_function(self: &Rc<Self>) -> Option<Rc<Scope>> {
        let mut current = Some(self.clone());
        while let Some(scope) = current {
            if scope.kind == ScopeKind::Function {
                return Some(scope);
            }
            current = scope.parent.clone();
        }
        None
    }
}
