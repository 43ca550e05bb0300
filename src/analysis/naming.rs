//! Naming-convention enforcement (§4.4): struct names/attributes, globals,
//! and methods use PascalCase; locals, parameters, and function/method
//! identifiers use camelCase. `original_source/compiler/analyzer.go` never
//! enforces this (it only checks node shapes); this check has no direct
//! precedent and is built fresh against the distilled spec's wording.

pub fn is_pascal_case(name: &str) -> bool {
    matches!(name.chars().next(), Some(c) if c.is_ascii_uppercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn is_camel_case(name: &str) -> bool {
    matches!(name.chars().next(), Some(c) if c.is_ascii_lowercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_pascal_and_camel_case() {
        assert!(is_pascal_case("Point"));
        assert!(!is_pascal_case("point"));
        assert!(is_camel_case("total"));
        assert!(!is_camel_case("Total"));
        assert!(!is_camel_case("2fast"));
    }
}
