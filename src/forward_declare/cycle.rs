//! Struct cycle detection (§4.3, §3 invariant): a struct may not contain
//! itself by value, directly or transitively; self-reference through a
//! pointer field terminates the walk and is permitted.

use crate::types::{Ty, TypeKind};
use std::collections::HashSet;

/// Breadth-first walk over `field_ty`'s transitive by-value struct members,
/// looking for `struct_ty`. Returns `true` if found (a cycle).
pub fn contains_by_value(struct_ty: &Ty, field_ty: &Ty) -> bool {
    let mut seen: HashSet<*const ()> = HashSet::new();
    let mut queue = vec![field_ty.clone()];

    while let Some(current) = queue.pop() {
        let addr = std::rc::Rc::as_ptr(&current) as *const ();
        if !seen.insert(addr) {
            continue;
        }
        match &current.kind {
            TypeKind::StructInstance(of) => {
                if std::rc::Rc::ptr_eq(of, struct_ty) {
                    return true;
                }
                for member in of.members.borrow().iter() {
                    queue.push(member.ty.clone());
                }
            }
            // A pointer field terminates the walk: self-reference through a
            // pointer is allowed (§4.3).
            TypeKind::Pointer(_) => {}
            TypeKind::Array(elem) => queue.push(elem.clone()),
            TypeKind::HashMap(key, value) => {
                queue.push(key.clone());
                queue.push(value.clone());
            }
            TypeKind::Tuple(elements) => queue.extend(elements.iter().cloned()),
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Member, TypeRegistry};

    #[test]
    fn direct_by_value_self_reference_is_a_cycle() {
        let mut types = TypeRegistry::new();
        let node = types.declare_struct("Node");
        let instance = types.to_instance(&node);
        node.members.borrow_mut().push(Member {
            name: "next".to_string(),
            ty: instance.clone(),
        });
        assert!(contains_by_value(&node, &instance));
    }

    #[test]
    fn self_reference_through_pointer_is_not_a_cycle() {
        let mut types = TypeRegistry::new();
        let node = types.declare_struct("Node");
        let instance = types.to_instance(&node);
        let ptr_to_self = types.to_pointer(&instance);
        node.members.borrow_mut().push(Member {
            name: "next".to_string(),
            ty: ptr_to_self.clone(),
        });
        assert!(!contains_by_value(&node, &ptr_to_self));
    }

    #[test]
    fn transitive_by_value_reference_is_a_cycle() {
        let mut types = TypeRegistry::new();
        let a = types.declare_struct("A");
        let b = types.declare_struct("B");
        let a_instance = types.to_instance(&a);
        let b_instance = types.to_instance(&b);
        b.members.borrow_mut().push(Member {
            name: "a".to_string(),
            ty: a_instance.clone(),
        });
        assert!(contains_by_value(&a, &b_instance));
    }
}
