//! The forward-declaration pass (§4.3): walks every reachable file's
//! top-level declarations twice — once shape-only, then again once imports
//! and cross-references have had a chance to settle — so that a function
//! may call another declared later in the same file, or in a file that
//! imports it back.
//!
//! `original_source/compiler/forward.go` turns out to be a stub (every
//! `forward*` method has an empty body); the five-queue fixed-point loop
//! below is this compiler's own design, built against the queues spec'd in
//! §4.3 directly. Two of those queues collapse into one here: "missing
//! types" and "delayed function signatures" are the same failure mode (a
//! type expression names something not yet registered), so both live in
//! `pending_decls`. "Pending imports" and "later imports" stay distinct
//! queues, matching their distinct failure modes (file not loaded yet vs.
//! name not exported yet). "Delayed imports" (a `host:` import whose
//! package index lookup itself would need to be retried) is folded into
//! the same immediate-or-error handling as other host imports, since
//! `HostBridge::resolve` is synchronous here — there is nothing to queue.
//! This simplification is recorded in DESIGN.md.
//!
//! Discovery and shape registration are two separate passes.
//! `discover_and_parse_all` walks the import graph breadth-first and parses
//! each round's newly found files concurrently, since parsing one file never
//! depends on another's; `scheduled` then tracks which discovered files have
//! been pushed onto `pending_imports` so each is shape-registered exactly
//! once. The fixed-point loop over those queues stays on a single thread,
//! since it mutates `Env`/`TypeRegistry`/`ContainerUses` shared across files.

use crate::ast::{self, Program, Stmt, TypeExpr};
use crate::compiler_messages::CompilerError;
use crate::environment::{Env, Symbol};
use crate::host_bridge::HostBridge;
use crate::position::{Position, SourceSpan};
use crate::types::{Ty, TypeKind, TypeRegistry};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use super::cycle::contains_by_value;
use super::file_job::FileJob;
use super::path_resolve::{classify_import, ImportTarget};

/// Array-element and hash-map key/value types seen while realizing type
/// expressions, collected for the container-template module (§4.7) to
/// generate wrappers for.
#[derive(Default)]
pub struct ContainerUses {
    pub array_elements: Vec<Ty>,
    pub map_pairs: Vec<(Ty, Ty)>,
}

impl ContainerUses {
    pub fn note_array(&mut self, element: &Ty) {
        if !self.array_elements.iter().any(|t| std::rc::Rc::ptr_eq(t, element)) {
            self.array_elements.push(element.clone());
        }
    }

    pub fn note_map(&mut self, key: &Ty, value: &Ty) {
        if !self
            .map_pairs
            .iter()
            .any(|(k, v)| std::rc::Rc::ptr_eq(k, key) && std::rc::Rc::ptr_eq(v, value))
        {
            self.map_pairs.push((key.clone(), value.clone()));
        }
    }
}

/// Everything downstream phases need once resolution reaches a fixed point.
pub struct CompilerState {
    pub types: TypeRegistry,
    pub containers: ContainerUses,
}

struct LaterImport {
    importer: PathBuf,
    target: PathBuf,
    name: String,
    position: Position,
}

pub struct Resolver {
    pub jobs: FxHashMap<PathBuf, FileJob>,
    pub order: Vec<PathBuf>,
    pub state: CompilerState,
    builtins_env: Env,
    host_bridge: HostBridge,
    pending_imports: VecDeque<PathBuf>,
    pending_decls: FxHashMap<PathBuf, Vec<Stmt>>,
    later_imports: VecDeque<LaterImport>,
    /// Files already pushed onto `pending_imports` at least once, so a file
    /// imported from several other files is only shape-registered once.
    scheduled: FxHashSet<PathBuf>,
}

/// A type expression names something not yet registered anywhere visible.
use super::type_realize::Unresolved;

impl Resolver {
    /// Loads `entry_path` and resolves the whole reachable file graph,
    /// returning the job table and type/container state for the analyzer.
    pub fn resolve_entry(entry_path: &Path) -> Result<(FxHashMap<PathBuf, FileJob>, CompilerState), CompilerError> {
        let mut resolver = Resolver::new();
        let entry_path = entry_path
            .canonicalize()
            .unwrap_or_else(|_| entry_path.to_path_buf());
        resolver.discover_and_parse_all(&entry_path)?;
        resolver.scheduled.insert(entry_path.clone());
        resolver.register_file_shapes(&entry_path, false)?;
        resolver.run()?;
        Ok((resolver.jobs, resolver.state))
    }

    fn new() -> Self {
        let builtins_env = Env::new(None);
        let mut types = TypeRegistry::new();
        super::builtins::register_builtins(&builtins_env, &mut types);
        Resolver {
            jobs: FxHashMap::default(),
            order: Vec::new(),
            state: CompilerState {
                types,
                containers: ContainerUses::default(),
            },
            builtins_env,
            host_bridge: HostBridge::new(),
            pending_imports: VecDeque::new(),
            pending_decls: FxHashMap::default(),
            later_imports: VecDeque::new(),
            scheduled: FxHashSet::default(),
        }
    }

    /// Parses every file transitively reachable from `entry_path` through
    /// `import` statements, breadth-first, parsing each round's newly
    /// discovered files concurrently over `rayon`'s work-stealing pool
    /// (§4.3: tokenizing and parsing one file doesn't depend on another's
    /// until the fixed-point shape registration below needs the result).
    /// Shape registration itself stays on the driving thread (§5).
    fn discover_and_parse_all(&mut self, entry_path: &Path) -> Result<(), CompilerError> {
        let mut frontier = vec![entry_path.to_path_buf()];
        let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
        seen.insert(entry_path.to_path_buf());

        while !frontier.is_empty() {
            let parsed: Vec<Result<(PathBuf, String, Program), CompilerError>> = frontier.par_iter().map(|path| parse_file(path)).collect();

            let mut next_frontier = Vec::new();
            for result in parsed {
                let (path, source, program) = result?;
                let is_main = path == entry_path;
                for target in import_targets(&path, &program) {
                    if seen.insert(target.clone()) {
                        next_frontier.push(target);
                    }
                }
                let env = Env::new(Some(self.builtins_env.clone()));
                self.jobs.insert(path.clone(), FileJob::new(path.clone(), source, program, env, is_main));
                self.order.push(path);
            }
            frontier = next_frontier;
        }
        Ok(())
    }

    fn run(&mut self) -> Result<(), CompilerError> {
        loop {
            let mut changed = false;
            while let Some(path) = self.pending_imports.pop_front() {
                self.register_file_shapes(&path, false)?;
                changed = true;
            }
            if self.retry_pending_decls(false)? {
                changed = true;
            }
            if self.retry_later_imports(false)? {
                changed = true;
            }
            if !changed {
                break;
            }
        }
        // Fixed point reached with leftovers: escalate to hard errors.
        self.retry_pending_decls(true)?;
        self.retry_later_imports(true)?;
        Ok(())
    }

    /// First-sight walk of one file's top-level declarations (§4.3): structs,
    /// functions, global `var`/`const`, and imports get shape-registered;
    /// anything else at top level (a stray `local`, an expression statement)
    /// is left for the analyzer's scoping check to reject.
    fn register_file_shapes(&mut self, path: &Path, strict: bool) -> Result<bool, CompilerError> {
        let env = self.jobs.get(path).expect("job registered before shapes walked").env.clone();
        let decls = self.jobs.get(path).unwrap().program.declarations.clone();
        let mut changed = false;
        let mut deferred = Vec::new();
        for decl in decls {
            match self.try_register_decl(path, &env, &decl, strict)? {
                true => changed = true,
                false => deferred.push(decl),
            }
        }
        if !deferred.is_empty() {
            self.pending_decls.entry(path.to_path_buf()).or_default().extend(deferred);
        }
        Ok(changed)
    }

    fn retry_pending_decls(&mut self, strict: bool) -> Result<bool, CompilerError> {
        let paths: Vec<PathBuf> = self.pending_decls.keys().cloned().collect();
        let mut changed = false;
        for path in paths {
            let env = self.jobs.get(&path).expect("pending decl file still loaded").env.clone();
            let decls = self.pending_decls.remove(&path).unwrap_or_default();
            let mut still_pending = Vec::new();
            for decl in decls {
                match self.try_register_decl(&path, &env, &decl, strict)? {
                    true => changed = true,
                    false => still_pending.push(decl),
                }
            }
            if !still_pending.is_empty() {
                self.pending_decls.insert(path, still_pending);
            }
        }
        Ok(changed)
    }

    fn retry_later_imports(&mut self, strict: bool) -> Result<bool, CompilerError> {
        let items: Vec<LaterImport> = self.later_imports.drain(..).collect();
        let mut changed = false;
        let mut still_pending = VecDeque::new();
        for item in items {
            let target_env = self.jobs.get(&item.target).map(|j| j.env.clone());
            let importer_env = self.jobs.get(&item.importer).map(|j| j.env.clone());
            match (target_env, importer_env) {
                (Some(target_env), Some(importer_env)) if target_env.has_local(&item.name) => {
                    if importer_env.has_local(&item.name) {
                        return Err(CompilerError::rule(
                            format!("'{}' is already declared in this file", item.name),
                            SourceSpan::new(item.importer.clone(), item.position),
                        ));
                    }
                    let sym = target_env.get(&item.name).expect("has_local implies get succeeds");
                    importer_env.insert(sym);
                    changed = true;
                }
                _ if strict => {
                    return Err(CompilerError::rule(
                        format!("'{}' is not exported by the imported file", item.name),
                        SourceSpan::new(item.importer.clone(), item.position),
                    ));
                }
                _ => still_pending.push_back(item),
            }
        }
        self.later_imports = still_pending;
        Ok(changed)
    }

    /// Attempts to register one top-level declaration. `Ok(true)` means it
    /// is fully registered (or, for imports, fully processed — an import
    /// never itself defers; only the names it requests can). `Ok(false)`
    /// means a named type isn't visible yet and the whole declaration
    /// should be retried later.
    fn try_register_decl(&mut self, path: &Path, env: &Env, decl: &Stmt, strict: bool) -> Result<bool, CompilerError> {
        match decl {
            Stmt::Struct { name, fields, position } => {
                self.register_struct(path, env, name, fields, *position, strict)
            }
            Stmt::Function(func) => self.register_function(path, env, func, strict),
            Stmt::VarDecl { kind, bindings, position } if !matches!(kind, crate::ast::VarKind::Local) => {
                self.register_globals(path, env, *kind, bindings, *position, strict)
            }
            Stmt::Import { path: raw, names, position } => {
                self.handle_import(path, raw, names, *position)?;
                Ok(true)
            }
            _ => Ok(true),
        }
    }

    fn register_struct(
        &mut self,
        path: &Path,
        env: &Env,
        name: &str,
        fields: &[crate::ast::Param],
        position: Position,
        strict: bool,
    ) -> Result<bool, CompilerError> {
        let struct_ty = self.state.types.declare_struct(name);
        // A struct's own name must be visible while resolving its fields, so
        // a by-value self-reference realizes to `StructInstance(self)`
        // rather than an "unknown type" error — only then can the cycle
        // check below tell it apart from a pointer-mediated one. The name
        // is bound up front; a retry of this same deferred declaration sees
        // its own stub here and must not be treated as a duplicate.
        match env.local_symbols().into_iter().find(|s| s.name == name) {
            Some(existing) if std::rc::Rc::ptr_eq(&existing.ty, &struct_ty) => {}
            Some(_) => {
                return Err(CompilerError::rule(
                    format!("'{name}' is already declared in this file"),
                    SourceSpan::new(path, position),
                ))
            }
            None => {
                let namespace = namespace_for(path, name);
                *struct_ty.go_name.borrow_mut() = namespace.clone();
                env.insert(Symbol::new(name, namespace, struct_ty.clone(), SourceSpan::new(path, position)).global());
            }
        }

        let mut members = Vec::with_capacity(fields.len());
        for field in fields {
            match self.realize_type(env, &field.ty) {
                Ok(ty) => members.push(crate::types::Member { name: field.name.clone(), ty }),
                Err(Unresolved(missing)) => {
                    if strict {
                        return Err(CompilerError::type_error(
                            format!("unknown type '{missing}' in field '{}' of struct '{name}'", field.name),
                            SourceSpan::new(path, position),
                        ));
                    }
                    return Ok(false);
                }
            }
        }
        for member in &members {
            if contains_by_value(&struct_ty, &member.ty) {
                return Err(CompilerError::rule(
                    format!("struct '{name}' contains itself by value through field '{}'", member.name),
                    SourceSpan::new(path, position),
                ));
            }
        }
        *struct_ty.members.borrow_mut() = members;
        Ok(true)
    }

    fn register_function(&mut self, path: &Path, env: &Env, func: &crate::ast::FunctionDecl, strict: bool) -> Result<bool, CompilerError> {
        let mut param_tys = Vec::with_capacity(func.params.len());
        for param in &func.params {
            match self.realize_type(env, &param.ty) {
                Ok(ty) => param_tys.push(ty),
                Err(Unresolved(missing)) => {
                    if strict {
                        return Err(CompilerError::type_error(
                            format!("unknown type '{missing}' in parameter '{}' of '{}'", param.name, func.name),
                            SourceSpan::new(path, func.position),
                        ));
                    }
                    return Ok(false);
                }
            }
        }
        let ret = match self.realize_type(env, &func.ret) {
            Ok(ty) => ty,
            Err(Unresolved(missing)) => {
                if strict {
                    return Err(CompilerError::type_error(
                        format!("unknown return type '{missing}' of '{}'", func.name),
                        SourceSpan::new(path, func.position),
                    ));
                }
                return Ok(false);
            }
        };

        if let Some(receiver) = &func.receiver {
            let receiver_ty = match self.realize_type(env, &receiver.ty) {
                Ok(ty) => ty,
                Err(Unresolved(missing)) => {
                    if strict {
                        return Err(CompilerError::type_error(
                            format!("unknown receiver type '{missing}' for method '{}'", func.name),
                            SourceSpan::new(path, func.position),
                        ));
                    }
                    return Ok(false);
                }
            };
            let struct_ty = match &receiver_ty.kind {
                TypeKind::StructInstance(of) => of.clone(),
                _ => {
                    return Err(CompilerError::rule(
                        format!("method '{}' receiver must be a struct instance", func.name),
                        SourceSpan::new(path, func.position),
                    ))
                }
            };
            if struct_ty.methods.borrow().iter().any(|m| m.name == func.name) {
                return Err(CompilerError::rule(
                    format!("'{}' already has a method named '{}'", struct_ty.name, func.name),
                    SourceSpan::new(path, func.position),
                ));
            }
            let func_ty = self.state.types.func(func.variadic, param_tys, ret, func.panics);
            struct_ty.methods.borrow_mut().push(crate::types::MethodEntry {
                name: func.name.clone(),
                namespace: namespace_for(path, &format!("{}_{}", struct_ty.name, func.name)),
                func_ty,
            });
            return Ok(true);
        }

        if env.has_local(&func.name) {
            return Err(CompilerError::rule(
                format!("'{}' is already declared in this file", func.name),
                SourceSpan::new(path, func.position),
            ));
        }
        let func_ty = self.state.types.func(func.variadic, param_tys, ret, func.panics);
        let namespace = namespace_for(path, &func.name);
        env.insert(Symbol::new(&func.name, namespace, func_ty, SourceSpan::new(path, func.position)).global());
        Ok(true)
    }

    fn register_globals(
        &mut self,
        path: &Path,
        env: &Env,
        kind: crate::ast::VarKind,
        bindings: &[crate::ast::Binding],
        position: Position,
        strict: bool,
    ) -> Result<bool, CompilerError> {
        let mut resolved = Vec::with_capacity(bindings.len());
        for binding in bindings {
            match self.realize_type(env, &binding.ty) {
                Ok(ty) => resolved.push(ty),
                Err(Unresolved(missing)) => {
                    if strict {
                        return Err(CompilerError::type_error(
                            format!("unknown type '{missing}' for '{}'", binding.name),
                            SourceSpan::new(path, position),
                        ));
                    }
                    return Ok(false);
                }
            }
        }
        for (binding, ty) in bindings.iter().zip(resolved) {
            if env.has_local(&binding.name) {
                return Err(CompilerError::rule(
                    format!("'{}' is already declared in this file", binding.name),
                    SourceSpan::new(path, position),
                ));
            }
            let namespace = namespace_for(path, &binding.name);
            let mut symbol = Symbol::new(&binding.name, namespace, ty, SourceSpan::new(path, position)).global();
            if matches!(kind, crate::ast::VarKind::Const) {
                symbol = symbol.constant();
            }
            if binding.value.is_some() {
                symbol = symbol.initialized();
            }
            env.insert(symbol);
        }
        Ok(true)
    }

    fn handle_import(&mut self, importer: &Path, raw: &str, names: &[String], position: Position) -> Result<(), CompilerError> {
        let importer_dir = importer.parent().unwrap_or_else(|| Path::new("."));
        let target = classify_import(importer_dir, raw).map_err(|msg| CompilerError::syntax(msg, SourceSpan::new(importer, position)))?;
        let importer_env = self.jobs.get(importer).expect("importer job loaded").env.clone();

        match target {
            ImportTarget::Host(package) => {
                let snapshot = self
                    .host_bridge
                    .resolve(&package, &mut self.state.types)
                    .map_err(|msg| CompilerError::rule(msg, SourceSpan::new(importer, position)))?;
                for name in names {
                    if importer_env.has_local(name) {
                        return Err(CompilerError::rule(
                            format!("'{name}' is already declared in this file"),
                            SourceSpan::new(importer, position),
                        ));
                    }
                    let symbol = snapshot.get(name).ok_or_else(|| {
                        CompilerError::rule(
                            format!("host package '{package}' has no export '{name}'"),
                            SourceSpan::new(importer, position),
                        )
                    })?;
                    importer_env.insert(symbol.clone());
                }
            }
            ImportTarget::Relative(target_path) => {
                if self.scheduled.insert(target_path.clone()) {
                    self.pending_imports.push_back(target_path.clone());
                }
                for name in names {
                    if importer_env.has_local(name) {
                        return Err(CompilerError::rule(
                            format!("'{name}' is already declared in this file"),
                            SourceSpan::new(importer, position),
                        ));
                    }
                    self.later_imports.push_back(LaterImport {
                        importer: importer.to_path_buf(),
                        target: target_path.clone(),
                        name: name.clone(),
                        position,
                    });
                }
            }
        }
        Ok(())
    }

    /// Turns a parsed type expression into a `Ty`, returning `Unresolved`
    /// when a named type isn't visible in `env` yet (§4.3's "missing types"
    /// / "delayed function signatures" queues, merged).
    fn realize_type(&mut self, env: &Env, expr: &TypeExpr) -> Result<Ty, Unresolved> {
        super::type_realize::realize_type(env, expr, &mut self.state.types, &mut self.state.containers)
    }
}

/// Reads and parses one file. Pure and side-effect-free on `Resolver` state
/// so a batch of these can run concurrently in `discover_and_parse_all`.
fn parse_file(path: &Path) -> Result<(PathBuf, String, Program), CompilerError> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| CompilerError::file(format!("cannot read '{}': {e}", path.display()), path))?;
    let mut parser = ast::Parser::new(&source, path)?;
    let program = parser.parse_program()?;
    Ok((path.to_path_buf(), source, program))
}

/// Raw scan of `program`'s top-level `import` statements for `./`/`../`
/// targets, without registering anything — used only to grow the discovery
/// frontier before any shape registration happens.
fn import_targets(importer: &Path, program: &Program) -> Vec<PathBuf> {
    let importer_dir = importer.parent().unwrap_or_else(|| Path::new("."));
    program
        .declarations
        .iter()
        .filter_map(|decl| match decl {
            Stmt::Import { path: raw, .. } => match classify_import(importer_dir, raw) {
                Ok(ImportTarget::Relative(target)) => Some(target),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

/// A deterministic emitted namespace for a top-level name: the file's stem
/// (sanitized to identifier-safe characters) joined with the source name,
/// so two files may each declare a `total` without colliding in the
/// generated Go source (§3's "unique absolute name derived from file +
/// source identifier").
fn namespace_for(path: &Path, name: &str) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>();
    format!("{stem}_{name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::is_int;
    use tempfile::tempdir;

    #[test]
    fn resolves_forward_reference_within_one_file() {
        let dir = tempdir().unwrap();
        let entry = dir.path().join("main.juno");
        std::fs::write(
            &entry,
            "function main() void { println(double(3)); }\n\
             function double(x i32) i32 { return x * 2; }",
        )
        .unwrap();

        let (jobs, _state) = Resolver::resolve_entry(&entry).unwrap();
        let job = &jobs[&entry];
        assert!(job.env.has("main"));
        assert!(job.env.has("double"));
    }

    #[test]
    fn resolves_cross_file_import_after_target_loads() {
        let dir = tempdir().unwrap();
        let helper = dir.path().join("greet.juno");
        let entry = dir.path().join("main.juno");
        std::fs::write(&helper, "function greet() str { return \"hi\"; }").unwrap();
        std::fs::write(&entry, "import (greet) from \"./greet.juno\";\nfunction main() void { println(greet()); }").unwrap();

        let (jobs, _state) = Resolver::resolve_entry(&entry).unwrap();
        let entry_env = &jobs[&entry].env;
        assert!(entry_env.has_local("greet"));
    }

    #[test]
    fn struct_field_type_resolves_once_struct_is_declared_later_in_file() {
        let dir = tempdir().unwrap();
        let entry = dir.path().join("main.juno");
        std::fs::write(
            &entry,
            "struct Pair { first Leaf; second i32; }\n\
             struct Leaf { value i32; }",
        )
        .unwrap();

        let (_jobs, state) = Resolver::resolve_entry(&entry).unwrap();
        let pair = state.types.lookup_struct("Pair").unwrap();
        assert_eq!(pair.members.borrow().len(), 2);
        assert!(is_int(&state.types.lookup_struct("Leaf").unwrap().members.borrow()[0].ty));
    }

    #[test]
    fn rejects_struct_self_reference_by_value() {
        let dir = tempdir().unwrap();
        let entry = dir.path().join("main.juno");
        std::fs::write(&entry, "struct Node { next Node; }").unwrap();

        let err = match Resolver::resolve_entry(&entry) {
            Err(e) => e,
            Ok(_) => panic!("expected a cycle error"),
        };
        assert!(err.message.contains("itself by value"));
    }

    #[test]
    fn rejects_missing_symbol_in_imported_file() {
        let dir = tempdir().unwrap();
        let helper = dir.path().join("greet.juno");
        let entry = dir.path().join("main.juno");
        std::fs::write(&helper, "function greet() str { return \"hi\"; }").unwrap();
        std::fs::write(&entry, "import (farewell) from \"./greet.juno\";\nfunction main() void { farewell(); }").unwrap();

        let err = match Resolver::resolve_entry(&entry) {
            Err(e) => e,
            Ok(_) => panic!("expected a missing-symbol error"),
        };
        assert!(err.message.contains("not exported"));
    }

    #[test]
    fn rejects_unresolvable_type_name() {
        let dir = tempdir().unwrap();
        let entry = dir.path().join("main.juno");
        std::fs::write(&entry, "function main() Nope { return 0; }").unwrap();

        let err = match Resolver::resolve_entry(&entry) {
            Err(e) => e,
            Ok(_) => panic!("expected an unresolved-type error"),
        };
        assert!(err.message.contains("Nope"));
    }
}
