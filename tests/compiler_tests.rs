//! End-to-end scenarios (§8): whole sources through the public
//! resolve → analyze pipeline, asserting on the emitted Go text and on the
//! diagnostics carried by rejected ones.

use junoc::analysis::analyze_file;
use junoc::compiler_messages::CompilerError;
use junoc::forward_declare::Resolver;
use proptest::prelude::*;
use tempfile::tempdir;

fn compile(source: &str) -> Result<String, CompilerError> {
    let dir = tempdir().unwrap();
    let entry = dir.path().join("main.juno");
    std::fs::write(&entry, source).unwrap();
    let (jobs, mut state) = Resolver::resolve_entry(&entry)?;
    let job = &jobs[&entry];
    analyze_file(job, &mut state.types, &mut state.containers)
}

#[test]
fn scenario_1_hello_world() {
    let out = compile(r#"function main(args [str]) void { println("hello"); return; }"#).unwrap();
    assert!(out.contains("fmt.Println(\"hello\")"));
    assert!(out.contains("func main() {"));
}

#[test]
fn scenario_2_integer_widening_accepts_a_narrower_literal() {
    let out = compile(
        "function main(args [str]) void { \
             local x i32 = 127; \
             x = 40000; \
             println(x); \
             return; \
         }",
    )
    .unwrap();
    assert!(out.contains("x = 40000"));
}

#[test]
fn scenario_2_integer_widening_rejects_a_wider_literal() {
    let err = compile("function main(args [str]) void { local x i8 = 200; return; }").unwrap_err();
    assert!(err.message.contains("cannot store"));
}

#[test]
fn scenario_3_struct_with_method() {
    let out = compile(
        "struct Point { X i32; Y i32; } \
         function(p Point) Magnitude() i32 { return p.X * p.X + p.Y * p.Y; } \
         function main(args [str]) void { \
             local pt Point = Point{ X: 3, Y: 4 }; \
             println(pt.Magnitude()); \
             return; \
         }",
    )
    .unwrap();
    assert!(out.contains("func (p main_Point) main_Point_Magnitude() int32"));
    assert!(out.contains("((p.X * p.X) + (p.Y * p.Y))"));
    assert!(out.contains("pt.main_Point_Magnitude()"));
}

#[test]
fn scenario_4_cross_file_import() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a.juno"), "function greet(name str) str { return name; }").unwrap();
    let entry = dir.path().join("b.juno");
    std::fs::write(
        &entry,
        "import (greet) from \"./a.juno\"; \
         function main(args [str]) void { \
             println(greet(\"world\")); \
             return; \
         }",
    )
    .unwrap();

    let (jobs, mut state) = Resolver::resolve_entry(&entry).unwrap();
    let job = &jobs[&entry];
    let out = analyze_file(job, &mut state.types, &mut state.containers).unwrap();
    assert!(out.contains("greet(\"world\")"));
}

#[test]
fn scenario_5_panics_propagation_is_rejected() {
    let err = compile(
        "function danger() void panics { panic(\"boom\"); } \
         function safe() void { danger(); } \
         function main(args [str]) void { safe(); return; }",
    )
    .unwrap_err();
    assert!(err.message.contains("panics"));
}

#[test]
fn scenario_6_array_literal_inference_accepts_a_uniform_array() {
    let out = compile("function main(args [str]) void { local xs [i32] = [1, 40000, 3]; println(xs.Length()); return; }").unwrap();
    assert!(out.contains("NewArrayI32"));
}

#[test]
fn scenario_6_array_literal_inference_rejects_a_mixed_array() {
    let err = compile("function main(args [str]) void { local xs [i32] = [1, \"two\"]; return; }").unwrap_err();
    assert!(!err.message.is_empty());
}

proptest! {
    /// §8 round-trip law: `merge(p, q).start = p.start`, `merge(p, q).end = q.end`.
    #[test]
    fn position_merge_keeps_the_outer_start_and_end(
        a_start_line in 1u32..10_000, a_start_col in 1u32..10_000,
        a_end_line in 1u32..10_000, a_end_col in 1u32..10_000,
        b_start_line in 1u32..10_000, b_start_col in 1u32..10_000,
        b_end_line in 1u32..10_000, b_end_col in 1u32..10_000,
    ) {
        use junoc::position::Position;
        let a = Position::new(a_start_line, a_start_col, a_end_line, a_end_col);
        let b = Position::new(b_start_line, b_start_col, b_end_line, b_end_col);
        let merged = a.merge(b);
        prop_assert_eq!(merged.start_line, a.start_line);
        prop_assert_eq!(merged.start_col, a.start_col);
        prop_assert_eq!(merged.end_line, b.end_line);
        prop_assert_eq!(merged.end_col, b.end_col);
    }

    /// §8 universal property: for every `i64`, the analyzer infers the
    /// smallest signed width whose range contains it.
    #[test]
    fn smallest_int_for_picks_the_narrowest_containing_width(value in any::<i64>()) {
        use junoc::types::TypeKind;
        let types = junoc::types::TypeRegistry::new();
        let ty = types.smallest_int_for(value);
        match ty.kind {
            TypeKind::I8 => prop_assert!((i8::MIN as i64..=i8::MAX as i64).contains(&value)),
            TypeKind::I16 => prop_assert!(
                (i16::MIN as i64..=i16::MAX as i64).contains(&value) && !(i8::MIN as i64..=i8::MAX as i64).contains(&value)
            ),
            TypeKind::I32 => prop_assert!(
                (i32::MIN as i64..=i32::MAX as i64).contains(&value) && !(i16::MIN as i64..=i16::MAX as i64).contains(&value)
            ),
            TypeKind::I64 => prop_assert!(!(i32::MIN as i64..=i32::MAX as i64).contains(&value)),
            _ => prop_assert!(false, "smallest_int_for must return an integer type"),
        }
    }
}
