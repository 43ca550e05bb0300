//! The host-package bridge (§4.8): resolves `host:<pkg>` imports to symbols,
//! caching each package's snapshot so a package imported from several files
//! is only looked up once.

use super::index::{export_func_ty, HostExport, HostPackageIndex, StaticHostIndex};
use crate::environment::Symbol;
use crate::position::{Position, SourceSpan};
use crate::types::TypeRegistry;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::path::PathBuf;

fn host_span(package: &str) -> SourceSpan {
    SourceSpan::new(PathBuf::from(format!("host:{package}")), Position::default())
}

/// One resolved package: every export available, by its exported name.
pub type HostSnapshot = FxHashMap<String, Symbol>;

pub struct HostBridge {
    index: Box<dyn HostPackageIndex>,
    cache: RefCell<FxHashMap<String, HostSnapshot>>,
}

impl Default for HostBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl HostBridge {
    pub fn new() -> Self {
        HostBridge {
            index: Box::new(StaticHostIndex),
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Resolves `package`, building and caching its snapshot on first use.
    /// `Err` names the package when it isn't in the index at all; a snapshot
    /// with a missing name is the caller's problem (unknown export), not
    /// this function's.
    pub fn resolve(&self, package: &str, types: &mut TypeRegistry) -> Result<HostSnapshot, String> {
        if let Some(existing) = self.cache.borrow().get(package) {
            return Ok(existing.clone());
        }
        let exports: &'static [HostExport] = self
            .index
            .exports(package)
            .ok_or_else(|| format!("unknown host package 'host:{package}'"))?;

        let mut snapshot = HostSnapshot::default();
        for export in exports {
            let ty = export_func_ty(export, types);
            snapshot.insert(
                export.name.to_string(),
                Symbol::new(export.name, export.selector, ty, host_span(package))
                    .global()
                    .used()
                    .with_host_module(package.to_string()),
            );
        }
        self.cache.borrow_mut().insert(package.to_string(), snapshot.clone());
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_package_export() {
        let bridge = HostBridge::new();
        let mut types = TypeRegistry::new();
        let snapshot = bridge.resolve("strings", &mut types).unwrap();
        assert!(snapshot.contains_key("ToUpper"));
        assert_eq!(snapshot["ToUpper"].host_module, "strings");
    }

    #[test]
    fn rejects_unknown_package() {
        let bridge = HostBridge::new();
        let mut types = TypeRegistry::new();
        assert!(bridge.resolve("not_a_real_pkg", &mut types).is_err());
    }

    #[test]
    fn caches_repeat_lookups() {
        let bridge = HostBridge::new();
        let mut types = TypeRegistry::new();
        let first = bridge.resolve("fmt", &mut types).unwrap();
        let second = bridge.resolve("fmt", &mut types).unwrap();
        assert_eq!(first["Println"].namespace, second["Println"].namespace);
    }
}
