//! The type model (§3 "Type"). Every value recognized by the analyzer has a
//! type drawn from this closed set; types are deduplicated by structural
//! identity so two occurrences of, say, `Array<I32>` are the same `Ty` handle.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A field (struct member) or parameter (function member). A type's member
/// table holds fields *or* parameters, never both (§3 invariant).
#[derive(Clone, Debug)]
pub struct Member {
    pub name: String,
    pub ty: Ty,
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Rc::ptr_eq(&self.ty, &other.ty)
    }
}
impl Eq for Member {}

/// `(method name, emitted namespace, function type)` as specified in §3.
#[derive(Clone, Debug)]
pub struct MethodEntry {
    pub name: String,
    pub namespace: String,
    pub func_ty: Ty,
}

#[derive(Clone, Debug)]
pub enum TypeKind {
    Any,
    I8,
    I16,
    I32,
    I64,
    Num,
    Str,
    Bool,
    Void,
    Error,
    Pointer(Ty),
    Array(Ty),
    HashMap(Ty, Ty),
    Tuple(Vec<Ty>),
    Func {
        variadic: bool,
        params: Vec<Ty>,
        ret: Ty,
        panics: bool,
    },
    /// A struct *definition*. Its fields live in `TypeData::members`.
    Struct,
    /// An instance of the struct named by `.0` (itself a `Struct` type).
    StructInstance(Ty),
}

pub struct TypeData {
    pub kind: TypeKind,
    pub name: String,
    pub methods: RefCell<Vec<MethodEntry>>,
    pub members: RefCell<Vec<Member>>,
    pub has_constructor: std::cell::Cell<bool>,
    pointer_cache: RefCell<Option<Ty>>,
    instance_cache: RefCell<Option<Ty>>,
    /// The absolute Go identifier this struct is emitted under (§3's
    /// "unique absolute name derived from file + source identifier").
    /// Empty for every non-`Struct` kind; set once by the forward-declare
    /// pass when a struct is first registered.
    pub go_name: RefCell<String>,
}

impl fmt::Debug for TypeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeData({})", self.name)
    }
}

/// A handle to an interned type. Cheap to clone; structural identity is
/// `Rc` pointer identity once a type has gone through `TypeRegistry`.
pub type Ty = Rc<TypeData>;

impl TypeData {
    fn leaf(kind: TypeKind, name: &str) -> Ty {
        Rc::new(TypeData {
            kind,
            name: name.to_string(),
            methods: RefCell::new(Vec::new()),
            members: RefCell::new(Vec::new()),
            has_constructor: std::cell::Cell::new(false),
            pointer_cache: RefCell::new(None),
            instance_cache: RefCell::new(None),
            go_name: RefCell::new(String::new()),
        })
    }
}

/// A structural key used to dedup compound types. Nested types are keyed by
/// `Rc` pointer address rather than deep recursion, so a self-referential
/// struct (through a pointer field) never causes an infinite key to be built.
#[derive(Clone, PartialEq, Eq, Hash)]
enum TypeKey {
    Any,
    I8,
    I16,
    I32,
    I64,
    Num,
    Str,
    Bool,
    Void,
    Error,
    Pointer(usize),
    Array(usize),
    HashMap(usize, usize),
    Tuple(Vec<usize>),
    Func {
        variadic: bool,
        params: Vec<usize>,
        ret: usize,
        panics: bool,
    },
    Struct(String),
    StructInstance(usize),
}

fn addr(ty: &Ty) -> usize {
    Rc::as_ptr(ty) as usize
}

fn key_of(kind: &TypeKind, name: &str) -> TypeKey {
    match kind {
        TypeKind::Any => TypeKey::Any,
        TypeKind::I8 => TypeKey::I8,
        TypeKind::I16 => TypeKey::I16,
        TypeKind::I32 => TypeKey::I32,
        TypeKind::I64 => TypeKey::I64,
        TypeKind::Num => TypeKey::Num,
        TypeKind::Str => TypeKey::Str,
        TypeKind::Bool => TypeKey::Bool,
        TypeKind::Void => TypeKey::Void,
        TypeKind::Error => TypeKey::Error,
        TypeKind::Pointer(t) => TypeKey::Pointer(addr(t)),
        TypeKind::Array(t) => TypeKey::Array(addr(t)),
        TypeKind::HashMap(k, v) => TypeKey::HashMap(addr(k), addr(v)),
        TypeKind::Tuple(ts) => TypeKey::Tuple(ts.iter().map(addr).collect()),
        TypeKind::Func {
            variadic,
            params,
            ret,
            panics,
        } => TypeKey::Func {
            variadic: *variadic,
            params: params.iter().map(addr).collect(),
            ret: addr(ret),
            panics: *panics,
        },
        TypeKind::Struct => TypeKey::Struct(name.to_string()),
        TypeKind::StructInstance(of) => TypeKey::StructInstance(addr(of)),
    }
}

/// Owns every type value produced in a compilation run; the only place `Ty`
/// handles are minted, so structural identity (§3) holds for the run's
/// lifetime. Scoped to one compilation the way the teacher's `StringTable`
/// is scoped to one compilation rather than kept as a global singleton.
pub struct TypeRegistry {
    interned: FxHashMap<TypeKey, Ty>,
    structs_by_name: FxHashMap<String, Ty>,
    pub any: Ty,
    pub i8: Ty,
    pub i16: Ty,
    pub i32: Ty,
    pub i64: Ty,
    pub num: Ty,
    pub str: Ty,
    pub bool: Ty,
    pub void: Ty,
    pub error: Ty,
    /// `Pointer<Void>`, the universal `null` type (§4.4).
    pub null_ptr: Ty,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        let any = TypeData::leaf(TypeKind::Any, "any");
        let i8 = TypeData::leaf(TypeKind::I8, "i8");
        let i16 = TypeData::leaf(TypeKind::I16, "i16");
        let i32 = TypeData::leaf(TypeKind::I32, "i32");
        let i64 = TypeData::leaf(TypeKind::I64, "i64");
        let num = TypeData::leaf(TypeKind::Num, "num");
        let str_ = TypeData::leaf(TypeKind::Str, "str");
        let bool_ = TypeData::leaf(TypeKind::Bool, "bool");
        let void = TypeData::leaf(TypeKind::Void, "void");
        let error = TypeData::leaf(TypeKind::Error, "error");

        let mut interned = FxHashMap::default();
        interned.insert(key_of(&TypeKind::Any, ""), any.clone());
        interned.insert(key_of(&TypeKind::I8, ""), i8.clone());
        interned.insert(key_of(&TypeKind::I16, ""), i16.clone());
        interned.insert(key_of(&TypeKind::I32, ""), i32.clone());
        interned.insert(key_of(&TypeKind::I64, ""), i64.clone());
        interned.insert(key_of(&TypeKind::Num, ""), num.clone());
        interned.insert(key_of(&TypeKind::Str, ""), str_.clone());
        interned.insert(key_of(&TypeKind::Bool, ""), bool_.clone());
        interned.insert(key_of(&TypeKind::Void, ""), void.clone());
        interned.insert(key_of(&TypeKind::Error, ""), error.clone());

        let mut registry = TypeRegistry {
            interned,
            structs_by_name: FxHashMap::default(),
            any,
            i8,
            i16,
            i32,
            i64,
            num,
            str: str_,
            bool: bool_,
            void: void.clone(),
            error,
            null_ptr: void, // placeholder, fixed up below
        };
        registry.null_ptr = registry.to_pointer(&registry.void.clone());
        registry
    }

    fn intern(&mut self, kind: TypeKind, name: String) -> Ty {
        let key = key_of(&kind, &name);
        if let Some(existing) = self.interned.get(&key) {
            return existing.clone();
        }
        let ty = TypeData::leaf(kind, &name);
        self.interned.insert(key, ty.clone());
        ty
    }

    pub fn to_pointer(&mut self, inner: &Ty) -> Ty {
        if let Some(cached) = inner.pointer_cache.borrow().clone() {
            return cached;
        }
        let name = format!("*{}", inner.name);
        let pointer = self.intern(TypeKind::Pointer(inner.clone()), name);
        *inner.pointer_cache.borrow_mut() = Some(pointer.clone());
        pointer
    }

    /// `StructInstance(of struct)`; idempotent per struct (§3).
    pub fn to_instance(&mut self, struct_ty: &Ty) -> Ty {
        if let Some(cached) = struct_ty.instance_cache.borrow().clone() {
            return cached;
        }
        let name = struct_ty.name.clone();
        let instance = self.intern(TypeKind::StructInstance(struct_ty.clone()), name);
        *struct_ty.instance_cache.borrow_mut() = Some(instance.clone());
        instance
    }

    pub fn array(&mut self, element: &Ty) -> Ty {
        let name = format!("[{}]", element.name);
        self.intern(TypeKind::Array(element.clone()), name)
    }

    pub fn hash_map(&mut self, key: &Ty, value: &Ty) -> Ty {
        let name = format!("{{{}:{}}}", key.name, value.name);
        self.intern(TypeKind::HashMap(key.clone(), value.clone()), name)
    }

    pub fn tuple(&mut self, elements: Vec<Ty>) -> Ty {
        let name = format!(
            "({})",
            elements
                .iter()
                .map(|t| t.name.clone())
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.intern(TypeKind::Tuple(elements), name)
    }

    pub fn func(&mut self, variadic: bool, params: Vec<Ty>, ret: Ty, panics: bool) -> Ty {
        let name = format!(
            "function({}){}{}",
            params
                .iter()
                .map(|t| t.name.clone())
                .collect::<Vec<_>>()
                .join(", "),
            if ret.name == "void" {
                String::new()
            } else {
                format!(" {}", ret.name)
            },
            if panics { " panics" } else { "" }
        );
        self.intern(
            TypeKind::Func {
                variadic,
                params,
                ret,
                panics,
            },
            name,
        )
    }

    /// Registers a new, empty struct type named `name`. Returns the existing
    /// type if the name is already registered (forward-declaration handles
    /// the duplicate-name error itself; this just hands back the handle so a
    /// `Pointer<Self>` field can be realized before fields are populated).
    pub fn declare_struct(&mut self, name: &str) -> Ty {
        if let Some(existing) = self.structs_by_name.get(name) {
            return existing.clone();
        }
        let ty = self.intern(TypeKind::Struct, name.to_string());
        self.structs_by_name.insert(name.to_string(), ty.clone());
        ty
    }

    pub fn lookup_struct(&self, name: &str) -> Option<Ty> {
        self.structs_by_name.get(name).cloned()
    }

    /// The smallest signed integer type that contains `value` (§4.4, §8).
    pub fn smallest_int_for(&self, value: i64) -> Ty {
        if (i8::MIN as i64..=i8::MAX as i64).contains(&value) {
            self.i8.clone()
        } else if (i16::MIN as i64..=i16::MAX as i64).contains(&value) {
            self.i16.clone()
        } else if (i32::MIN as i64..=i32::MAX as i64).contains(&value) {
            self.i32.clone()
        } else {
            self.i64.clone()
        }
    }
}

// --- type predicates (used throughout the analyzer and the relation rules) ---

pub fn is_any(t: &Ty) -> bool {
    matches!(t.kind, TypeKind::Any)
}
pub fn is_int(t: &Ty) -> bool {
    matches!(
        t.kind,
        TypeKind::I8 | TypeKind::I16 | TypeKind::I32 | TypeKind::I64
    )
}
pub fn is_number(t: &Ty) -> bool {
    is_int(t) || matches!(t.kind, TypeKind::Num)
}
pub fn is_str(t: &Ty) -> bool {
    matches!(t.kind, TypeKind::Str)
}
pub fn is_bool(t: &Ty) -> bool {
    matches!(t.kind, TypeKind::Bool)
}
pub fn is_void(t: &Ty) -> bool {
    matches!(t.kind, TypeKind::Void)
}
pub fn is_error(t: &Ty) -> bool {
    matches!(t.kind, TypeKind::Error)
}
pub fn is_pointer(t: &Ty) -> bool {
    matches!(t.kind, TypeKind::Pointer(_))
}
pub fn is_void_pointer(t: &Ty) -> bool {
    matches!(&t.kind, TypeKind::Pointer(inner) if is_void(inner))
}
pub fn is_array(t: &Ty) -> bool {
    matches!(t.kind, TypeKind::Array(_))
}
pub fn is_hash_map(t: &Ty) -> bool {
    matches!(t.kind, TypeKind::HashMap(_, _))
}
pub fn is_tuple(t: &Ty) -> bool {
    matches!(t.kind, TypeKind::Tuple(_))
}
pub fn is_func(t: &Ty) -> bool {
    matches!(t.kind, TypeKind::Func { .. })
}
pub fn is_struct(t: &Ty) -> bool {
    matches!(t.kind, TypeKind::Struct)
}
pub fn is_struct_instance(t: &Ty) -> bool {
    matches!(t.kind, TypeKind::StructInstance(_))
}

/// Same structural identity, i.e. the same interned `Ty` (§4.5 `IsTheSameInstance`).
pub fn is_same_instance(a: &Ty, b: &Ty) -> bool {
    Rc::ptr_eq(a, b)
}

/// A valid hash-map key type (§4.4): numeric, string, or bool.
pub fn is_valid_key(t: &Ty) -> bool {
    is_number(t) || is_str(t) || is_bool(t)
}

/// Numeric rank for `which_bigger` (§4.5): `I8 < I16 < I32 < I64 < Num`.
pub fn numeric_rank(t: &Ty) -> Option<u8> {
    match t.kind {
        TypeKind::I8 => Some(0),
        TypeKind::I16 => Some(1),
        TypeKind::I32 => Some(2),
        TypeKind::I64 => Some(3),
        TypeKind::Num => Some(4),
        _ => None,
    }
}
