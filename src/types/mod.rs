//! The type model (§3 "Type") and type relations (§4.5).

mod model;
mod relations;

pub use model::{
    is_any, is_array, is_bool, is_error, is_func, is_hash_map, is_int, is_number, is_pointer,
    is_same_instance, is_str, is_struct, is_struct_instance, is_tuple, is_valid_key, is_void,
    is_void_pointer, numeric_rank, Member, MethodEntry, Ty, TypeData, TypeKind, TypeRegistry,
};
pub use relations::{can_do_arithmetic, is_storable, which_bigger};
