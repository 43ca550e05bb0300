//! Type-expression realization, shared by the resolver (top-level shapes)
//! and the analyzer (local declarations, function-literal signatures):
//! turns a parsed `TypeExpr` into a canonical `Ty`, recording every array
//! element / hash-map key-value pair it touches for the container module.

use crate::ast::TypeExpr;
use crate::environment::Env;
use crate::types::{Ty, TypeKind, TypeRegistry};

use super::resolver::ContainerUses;

/// A named type wasn't visible in the given scope when it was looked up.
pub struct Unresolved(pub String);

pub fn realize_type(
    env: &Env,
    expr: &TypeExpr,
    types: &mut TypeRegistry,
    containers: &mut ContainerUses,
) -> Result<Ty, Unresolved> {
    match expr {
        TypeExpr::Named(name) => match name.as_str() {
            "i8" => Ok(types.i8.clone()),
            "i16" => Ok(types.i16.clone()),
            "i32" => Ok(types.i32.clone()),
            "i64" => Ok(types.i64.clone()),
            "num" => Ok(types.num.clone()),
            "str" => Ok(types.str.clone()),
            "bool" => Ok(types.bool.clone()),
            "void" => Ok(types.void.clone()),
            "error" => Ok(types.error.clone()),
            "any" => Ok(types.any.clone()),
            other => match env.get(other) {
                Some(symbol) if matches!(symbol.ty.kind, TypeKind::Struct) => Ok(types.to_instance(&symbol.ty)),
                _ => Err(Unresolved(other.to_string())),
            },
        },
        TypeExpr::Pointer(inner) => {
            let inner = realize_type(env, inner, types, containers)?;
            Ok(types.to_pointer(&inner))
        }
        TypeExpr::Array(inner) => {
            let inner = realize_type(env, inner, types, containers)?;
            let ty = types.array(&inner);
            containers.note_array(&inner);
            Ok(ty)
        }
        TypeExpr::HashMap(key, value) => {
            let key = realize_type(env, key, types, containers)?;
            let value = realize_type(env, value, types, containers)?;
            let ty = types.hash_map(&key, &value);
            containers.note_map(&key, &value);
            Ok(ty)
        }
        TypeExpr::Tuple(elements) => {
            let tys = elements
                .iter()
                .map(|e| realize_type(env, e, types, containers))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(types.tuple(tys))
        }
        TypeExpr::Func { variadic, params, ret, panics } => {
            let param_tys = params
                .iter()
                .map(|p| realize_type(env, p, types, containers))
                .collect::<Result<Vec<_>, _>>()?;
            let ret_ty = realize_type(env, ret, types, containers)?;
            Ok(types.func(*variadic, param_tys, ret_ty, *panics))
        }
    }
}
