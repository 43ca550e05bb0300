//! A package's exported surface as seen from `host:<pkg>` (§4.8).
//!
//! Grounded on `original_source/compiler/pkg.go`'s `PackagesHasName` /
//! `PackagesGetName`, which query `go/packages` for a symbol by name. That
//! query shells out to the Go toolchain (`go list`), which §1's Non-goals
//! puts out of scope for the core ("invocation of the external
//! target-language toolchain"). `StaticHostIndex` keeps the bridge's
//! contract (lookup by package + name, `Any`-substitution on failure,
//! caching) real while sourcing export data from a small built-in table
//! instead of a live toolchain call.

use crate::types::{Ty, TypeRegistry};

/// One exported binding as the host package surface describes it: its Go
/// selector (e.g. `"strings.ToUpper"`) and the function shape to assign it.
pub struct HostExport {
    pub name: &'static str,
    pub selector: &'static str,
    pub variadic: bool,
    pub arity: usize,
    pub returns_void: bool,
    pub panics: bool,
}

/// Looks up the exports of a package by name. `StaticHostIndex` is the only
/// implementation; the trait exists so a future live-toolchain index could
/// replace it without touching `HostBridge`.
pub trait HostPackageIndex {
    fn exports(&self, package: &str) -> Option<&'static [HostExport]>;
}

pub struct StaticHostIndex;

const FMT: &[HostExport] = &[
    HostExport { name: "Println", selector: "fmt.Println", variadic: true, arity: 0, returns_void: true, panics: false },
    HostExport { name: "Print", selector: "fmt.Print", variadic: true, arity: 0, returns_void: true, panics: false },
    HostExport { name: "Sprintf", selector: "fmt.Sprintf", variadic: true, arity: 1, returns_void: false, panics: false },
];

const STRINGS: &[HostExport] = &[
    HostExport { name: "ToUpper", selector: "strings.ToUpper", variadic: false, arity: 1, returns_void: false, panics: false },
    HostExport { name: "ToLower", selector: "strings.ToLower", variadic: false, arity: 1, returns_void: false, panics: false },
    HostExport { name: "Contains", selector: "strings.Contains", variadic: false, arity: 2, returns_void: false, panics: false },
    HostExport { name: "TrimSpace", selector: "strings.TrimSpace", variadic: false, arity: 1, returns_void: false, panics: false },
];

const OS: &[HostExport] = &[
    HostExport { name: "Exit", selector: "os.Exit", variadic: false, arity: 1, returns_void: true, panics: false },
];

const MATH: &[HostExport] = &[
    HostExport { name: "Sqrt", selector: "math.Sqrt", variadic: false, arity: 1, returns_void: false, panics: false },
    HostExport { name: "Abs", selector: "math.Abs", variadic: false, arity: 1, returns_void: false, panics: false },
];

impl HostPackageIndex for StaticHostIndex {
    fn exports(&self, package: &str) -> Option<&'static [HostExport]> {
        match package {
            "fmt" => Some(FMT),
            "strings" => Some(STRINGS),
            "os" => Some(OS),
            "math" => Some(MATH),
            _ => None,
        }
    }
}

/// `host:<pkg>` values are always modeled as `any`-typed parameters and
/// `any` returns: without a real type checker for the target language, the
/// bridge cannot know a Go function's true signature, so it substitutes
/// `Any` everywhere a host type would go (§4.8's cycle-breaking rule,
/// generalized from "package cycle" to "package whose real types we can't
/// see").
pub fn export_func_ty(export: &HostExport, types: &mut TypeRegistry) -> Ty {
    let params = vec![types.any.clone(); export.arity];
    let ret = if export.returns_void {
        types.void.clone()
    } else {
        types.any.clone()
    };
    types.func(export.variadic, params, ret, export.panics)
}
