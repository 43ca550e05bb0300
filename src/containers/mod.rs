//! Container template instantiation (§4.7): arrays and hash-maps are emitted
//! as per-element-type Go wrapper structs rather than using Go generics, the
//! way `original_source/compiler/{array,map}.go` does it — a format-string
//! template substituted with the concrete element type's Go name at emission
//! time. This module owns `go_type_name` too, since the wrapper names and the
//! emitter's own type-to-Go-text mapping are the same recursive function.

use crate::forward_declare::ContainerUses;
use crate::types::{Ty, TypeKind};

/// The Go source text a value of `ty` is referred to by — used both for
/// emitted declarations and for naming container wrappers.
pub fn go_type_name(ty: &Ty) -> String {
    match &ty.kind {
        TypeKind::Any => "interface{}".to_string(),
        TypeKind::I8 => "int8".to_string(),
        TypeKind::I16 => "int16".to_string(),
        TypeKind::I32 => "int32".to_string(),
        TypeKind::I64 => "int64".to_string(),
        TypeKind::Num => "float64".to_string(),
        TypeKind::Str => "string".to_string(),
        TypeKind::Bool => "bool".to_string(),
        TypeKind::Void => "".to_string(),
        TypeKind::Error => "error".to_string(),
        TypeKind::Pointer(inner) => format!("*{}", go_type_name(inner)),
        TypeKind::Array(elem) => format!("*{}", array_wrapper_name(elem)),
        TypeKind::HashMap(key, value) => format!("*{}", map_wrapper_name(key, value)),
        TypeKind::Tuple(elements) => {
            let fields: Vec<String> = elements
                .iter()
                .enumerate()
                .map(|(i, t)| format!("F{i} {}", go_type_name(t)))
                .collect();
            format!("struct{{ {} }}", fields.join("; "))
        }
        TypeKind::Func { variadic, params, ret, .. } => {
            let mut parts: Vec<String> = params.iter().map(go_type_name).collect();
            if *variadic {
                if let Some(last) = parts.last_mut() {
                    *last = format!("...{}", last.trim_start_matches("..."));
                }
            }
            let ret_text = go_type_name(ret);
            if ret_text.is_empty() {
                format!("func({})", parts.join(", "))
            } else {
                format!("func({}) {}", parts.join(", "), ret_text)
            }
        }
        TypeKind::Struct => ty.go_name.borrow().clone(),
        TypeKind::StructInstance(of) => of.go_name.borrow().clone(),
    }
}

/// An identifier-safe fragment naming `ty`, used to build wrapper names
/// (`ArrayI32`, `MapStrBool`, …) — distinct from `go_type_name` because a
/// wrapper name can't contain `*`, `[`, spaces, or punctuation.
fn ident_fragment(ty: &Ty) -> String {
    match &ty.kind {
        TypeKind::Any => "Any".to_string(),
        TypeKind::I8 => "I8".to_string(),
        TypeKind::I16 => "I16".to_string(),
        TypeKind::I32 => "I32".to_string(),
        TypeKind::I64 => "I64".to_string(),
        TypeKind::Num => "Num".to_string(),
        TypeKind::Str => "Str".to_string(),
        TypeKind::Bool => "Bool".to_string(),
        TypeKind::Void => "Void".to_string(),
        TypeKind::Error => "Error".to_string(),
        TypeKind::Pointer(inner) => format!("Ptr{}", ident_fragment(inner)),
        TypeKind::Array(elem) => format!("Arr{}", ident_fragment(elem)),
        TypeKind::HashMap(key, value) => format!("Map{}{}", ident_fragment(key), ident_fragment(value)),
        TypeKind::Tuple(elements) => {
            let mut s = "Tuple".to_string();
            for e in elements {
                s.push_str(&ident_fragment(e));
            }
            s
        }
        TypeKind::Func { .. } => "Func".to_string(),
        TypeKind::Struct => ty.go_name.borrow().clone(),
        TypeKind::StructInstance(of) => of.go_name.borrow().clone(),
    }
}

pub fn array_wrapper_name(element: &Ty) -> String {
    format!("Array{}", ident_fragment(element))
}

pub fn map_wrapper_name(key: &Ty, value: &Ty) -> String {
    format!("Map{}{}", ident_fragment(key), ident_fragment(value))
}

const ARRAY_TEMPLATE: &str = "\
type {{Name}} struct {
\telements []{{Type}}
\tlength   int32
}

func New{{Name}}(elements []{{Type}}) *{{Name}} {
\tarr := new({{Name}})
\tarr.elements = make([]{{Type}}, len(elements))
\tcopy(arr.elements, elements)
\tarr.length = int32(len(elements))
\treturn arr
}

func (arr *{{Name}}) Length() int32 {
\treturn arr.length
}

func (arr *{{Name}}) Get(index int32) {{Type}} {
\treturn arr.elements[index]
}

func (arr *{{Name}}) Set(index int32, value {{Type}}) {
\tarr.elements[index] = value
}

func (arr *{{Name}}) Push(value {{Type}}) {
\tarr.elements = append(arr.elements, value)
\tarr.length++
}

func (arr *{{Name}}) Pop() {{Type}} {
\tlast := arr.elements[arr.length-1]
\tarr.elements = arr.elements[:arr.length-1]
\tarr.length--
\treturn last
}

func (arr *{{Name}}) Each(f func({{Type}})) {
\tfor _, v := range arr.elements {
\t\tf(v)
\t}
}

func (arr *{{Name}}) Some(f func({{Type}}) bool) bool {
\tfor _, v := range arr.elements {
\t\tif f(v) {
\t\t\treturn true
\t\t}
\t}
\treturn false
}

func (arr *{{Name}}) String() string {
\treturn fmt.Sprintf(\"%v\", arr.elements)
}
";

const MAP_TEMPLATE: &str = "\
type {{Name}} struct {
\telements map[{{Key}}]{{Value}}
}

func New{{Name}}(elements map[{{Key}}]{{Value}}) *{{Name}} {
\tmp := new({{Name}})
\tmp.elements = make(map[{{Key}}]{{Value}})
\tfor key, value := range elements {
\t\tmp.elements[key] = value
\t}
\treturn mp
}

func (mp *{{Name}}) Get(key {{Key}}) {{Value}} {
\treturn mp.elements[key]
}

func (mp *{{Name}}) Set(key {{Key}}, value {{Value}}) {
\tmp.elements[key] = value
}

func (mp *{{Name}}) Delete(key {{Key}}) {
\tdelete(mp.elements, key)
}

func (mp *{{Name}}) String() string {
\treturn fmt.Sprintf(\"%v\", mp.elements)
}
";

pub fn generate_array_wrapper(element: &Ty) -> String {
    let name = array_wrapper_name(element);
    let ty = go_type_name(element);
    ARRAY_TEMPLATE.replace("{{Name}}", &name).replace("{{Type}}", &ty)
}

pub fn generate_map_wrapper(key: &Ty, value: &Ty) -> String {
    let name = map_wrapper_name(key, value);
    MAP_TEMPLATE
        .replace("{{Name}}", &name)
        .replace("{{Key}}", &go_type_name(key))
        .replace("{{Value}}", &go_type_name(value))
}

/// Renders every distinct array/map instantiation the analyzer recorded
/// into the single generated container file (§4.7, §6).
pub fn render_container_file(containers: &ContainerUses) -> String {
    let mut out = String::from("package main\n\nimport \"fmt\"\n\n");
    for elem in &containers.array_elements {
        out.push_str(&generate_array_wrapper(elem));
        out.push('\n');
    }
    for (key, value) in &containers.map_pairs {
        out.push_str(&generate_map_wrapper(key, value));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeRegistry;

    #[test]
    fn array_wrapper_names_and_bodies_are_per_element_type() {
        let mut reg = TypeRegistry::new();
        let arr = reg.array(&reg.i32.clone());
        let TypeKind::Array(elem) = &arr.kind else { panic!() };
        assert_eq!(array_wrapper_name(elem), "ArrayI32");
        let body = generate_array_wrapper(elem);
        assert!(body.contains("type ArrayI32 struct"));
        assert!(body.contains("func (arr *ArrayI32) Push(value int32)"));
    }

    #[test]
    fn map_wrapper_names_combine_key_and_value() {
        let mut reg = TypeRegistry::new();
        let map = reg.hash_map(&reg.str.clone(), &reg.bool.clone());
        let TypeKind::HashMap(k, v) = &map.kind else { panic!() };
        assert_eq!(map_wrapper_name(k, v), "MapStrBool");
        let body = generate_map_wrapper(k, v);
        assert!(body.contains("type MapStrBool struct"));
        assert!(body.contains("map[string]bool"));
    }

    #[test]
    fn go_type_name_maps_primitives_and_pointers() {
        let mut reg = TypeRegistry::new();
        assert_eq!(go_type_name(&reg.i64.clone()), "int64");
        let ptr = reg.to_pointer(&reg.i64.clone());
        assert_eq!(go_type_name(&ptr), "*int64");
    }
}
