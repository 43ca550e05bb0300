//! Type relations (§4.5): storability, arithmetic compatibility, widening.
//! Ported directly from `original_source/types/checker.go`'s `CanStore` /
//! `CanDoArithmetic`, which is what this spec's §4.5 was distilled from.

use super::model::*;

/// `is_storable(dst, src)`: true when a value of type `src` may be assigned
/// to a location of type `dst`.
pub fn is_storable(dst: &Ty, src: &Ty) -> bool {
    if is_void_pointer(src) {
        // null is storable into any pointer, error, or function type.
        return is_pointer(dst) || is_func(dst) || is_error(dst);
    }
    if is_any(dst) {
        return true;
    }
    if is_same_instance(dst, src) {
        return true;
    }

    // numeric widening: an N-bit signed int accepts narrower signed ints;
    // Num accepts any integer and itself.
    if let (Some(dst_rank), Some(src_rank)) = (numeric_rank(dst), numeric_rank(src)) {
        if is_int(dst) && is_int(src) {
            return src_rank <= dst_rank;
        }
        if matches!(dst.kind, TypeKind::Num) {
            return true;
        }
        let _ = (dst_rank, src_rank);
    }

    if is_str(dst) && is_str(src) {
        return true;
    }
    if is_bool(dst) && is_bool(src) {
        return true;
    }
    if is_void(dst) && is_void(src) {
        return true;
    }
    if is_error(dst) && (is_pointer(src) || is_error(src)) {
        return true;
    }

    match (&dst.kind, &src.kind) {
        (TypeKind::Pointer(d), TypeKind::Pointer(s)) => is_storable(d, s),
        (TypeKind::Array(d), TypeKind::Array(s)) => is_storable(d, s),
        (TypeKind::HashMap(dk, dv), TypeKind::HashMap(sk, sv)) => {
            is_storable(dk, sk) && is_storable(dv, sv)
        }
        (TypeKind::Tuple(ds), TypeKind::Tuple(ss)) => {
            ds.len() == ss.len() && ds.iter().zip(ss).all(|(d, s)| is_storable(d, s))
        }
        (
            TypeKind::Func {
                params: dp, ret: dr, ..
            },
            TypeKind::Func {
                params: sp, ret: sr, ..
            },
        ) => dp.len() == sp.len() && dp.iter().zip(sp).all(|(d, s)| is_storable(d, s)) && is_storable(dr, sr),
        _ => false,
    }
}

/// `can_do_arithmetic(op, A, B)` (§4.5), exhaustive per operator.
pub fn can_do_arithmetic(op: &str, a: &Ty, b: &Ty) -> bool {
    match op {
        "*" | "/" | "%" | "-" => is_number(a) && is_number(b),
        "+" => (is_number(a) && is_number(b)) || (is_str(a) && is_str(b)),
        "<<" | ">>" | "&" | "|" | "^" => is_int(a) && is_int(b),
        "<" | "<=" | ">" | ">=" => {
            (is_number(a) && is_number(b)) || (is_str(a) && is_str(b))
        }
        "&&" | "||" => is_bool(a) && is_bool(b),
        "==" | "!=" => equality_comparable(a, b),
        _ => false,
    }
}

fn equality_comparable(a: &Ty, b: &Ty) -> bool {
    if (is_number(a) && is_number(b)) || (is_str(a) && is_str(b)) || (is_bool(a) && is_bool(b)) {
        return true;
    }
    if is_same_instance(a, b) {
        return true;
    }
    if is_void_pointer(a) || is_void_pointer(b) {
        // null compares against any pointer, function, or error value.
        return (is_pointer(a) || is_func(a) || is_error(a))
            || (is_pointer(b) || is_func(b) || is_error(b));
    }
    match (&a.kind, &b.kind) {
        (TypeKind::Pointer(pa), TypeKind::Pointer(pb)) => {
            // Tightened per §9's resolved open question: distinct pointee
            // structs no longer compare equal just because both are pointers.
            if is_struct_instance(pa) && is_struct_instance(pb) {
                is_same_instance(pa, pb)
            } else {
                true
            }
        }
        (TypeKind::Func { .. }, TypeKind::Func { .. }) => true,
        (TypeKind::Error, TypeKind::Error) => true,
        (TypeKind::Array(ea), TypeKind::Array(eb)) => is_storable(ea, eb) || is_storable(eb, ea),
        (TypeKind::HashMap(ka, va), TypeKind::HashMap(kb, vb)) => {
            (is_storable(ka, kb) || is_storable(kb, ka)) && (is_storable(va, vb) || is_storable(vb, va))
        }
        _ => false,
    }
}

/// `which_bigger(A, B)`: for numerics, the greater-rank type; otherwise `A`.
pub fn which_bigger(a: &Ty, b: &Ty) -> Ty {
    match (numeric_rank(a), numeric_rank(b)) {
        (Some(ra), Some(rb)) => {
            if rb > ra {
                b.clone()
            } else {
                a.clone()
            }
        }
        _ => a.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::model::TypeRegistry;

    #[test]
    fn widening_accepts_narrower_ints_but_not_wider() {
        let reg = TypeRegistry::new();
        assert!(is_storable(&reg.i32.clone(), &reg.i8.clone()));
        assert!(!is_storable(&reg.i8.clone(), &reg.i32.clone()));
        assert!(is_storable(&reg.num.clone(), &reg.i64.clone()));
    }

    #[test]
    fn null_storable_into_pointer_error_func() {
        let mut reg = TypeRegistry::new();
        let ptr = reg.to_pointer(&reg.i32.clone());
        assert!(is_storable(&ptr, &reg.null_ptr.clone()));
        assert!(is_storable(&reg.error.clone(), &reg.null_ptr.clone()));
    }

    #[test]
    fn arithmetic_plus_accepts_numbers_and_strings_only() {
        let reg = TypeRegistry::new();
        assert!(can_do_arithmetic("+", &reg.i32.clone(), &reg.i32.clone()));
        assert!(can_do_arithmetic("+", &reg.str.clone(), &reg.str.clone()));
        assert!(!can_do_arithmetic("+", &reg.str.clone(), &reg.i32.clone()));
    }

    #[test]
    fn which_bigger_widens_to_higher_rank() {
        let reg = TypeRegistry::new();
        let bigger = which_bigger(&reg.i8.clone(), &reg.i64.clone());
        assert!(is_same_instance(&bigger, &reg.i64.clone()));
    }
}
