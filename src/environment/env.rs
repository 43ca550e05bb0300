use super::symbol::Symbol;
use std::cell::RefCell;
use std::rc::Rc;

struct EnvInner {
    parent: Option<Env>,
    symbols: Vec<Symbol>,
}

/// A chain of symbol tables with a parent link (§3 "Environment"). Lookup
/// walks parents; insertion affects only the current scope, after
/// `original_source/compiler/env.go`.
#[derive(Clone)]
pub struct Env(Rc<RefCell<EnvInner>>);

impl Env {
    pub fn new(parent: Option<Env>) -> Self {
        Env(Rc::new(RefCell::new(EnvInner {
            parent,
            symbols: Vec::new(),
        })))
    }

    pub fn has_local(&self, name: &str) -> bool {
        self.0.borrow().symbols.iter().any(|s| s.name == name)
    }

    pub fn has(&self, name: &str) -> bool {
        if self.has_local(name) {
            return true;
        }
        match &self.0.borrow().parent {
            Some(parent) => parent.has(name),
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<Symbol> {
        let inner = self.0.borrow();
        if let Some(sym) = inner.symbols.iter().rev().find(|s| s.name == name) {
            return Some(sym.clone());
        }
        inner.parent.as_ref().and_then(|p| p.get(name))
    }

    /// Inserting into a scope that already contains `symbol.name` is an
    /// error; callers must check `has_local` first (§3).
    pub fn insert(&self, symbol: Symbol) {
        self.0.borrow_mut().symbols.push(symbol);
    }

    /// Marks a name used, walking up the parent chain to find it, the way a
    /// read of an outer-scope variable marks the *declaring* scope's entry.
    pub fn mark_used(&self, name: &str) {
        let mut inner = self.0.borrow_mut();
        if let Some(sym) = inner.symbols.iter_mut().rev().find(|s| s.name == name) {
            sym.is_used = true;
            return;
        }
        if let Some(parent) = inner.parent.clone() {
            drop(inner);
            parent.mark_used(name);
        }
    }

    /// Marks a name initialized (used by `:=` / assignment tracking).
    pub fn mark_initialized(&self, name: &str) {
        let mut inner = self.0.borrow_mut();
        if let Some(sym) = inner.symbols.iter_mut().rev().find(|s| s.name == name) {
            sym.is_initialized = true;
        }
    }

    /// Every symbol declared directly in this scope, in declaration order —
    /// used for the unused-symbol sweep (§4.4).
    pub fn local_symbols(&self) -> Vec<Symbol> {
        self.0.borrow().symbols.clone()
    }
}
