//! Naming rules for services, methods and their value types.
//!
//! Only "exported" names are reachable over the wire: a name is exported
//! when it starts with an upper-case letter and is otherwise made of
//! identifier characters. Value types must be exported or builtin.

const PRIMITIVES: &[&str] = &[
    "bool", "char", "str", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32",
    "u64", "u128", "usize", "f32", "f64",
];

/// Returns true if `name` is an exported identifier.
pub fn is_exported(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

/// Returns true if a Rust type name (as produced by [`std::any::type_name`])
/// denotes an exported nominal type or a builtin.
///
/// Tuples, arrays, slices, references, pointers, function types and
/// closures are opaque to the registry and rejected. The unit type is
/// accepted so methods may declare "no reply".
pub fn is_exported_or_builtin(type_name: &str) -> bool {
    if type_name == "()" {
        return true;
    }
    if type_name.starts_with(&['(', '[', '&', '*'][..])
        || type_name.starts_with("fn(")
        || type_name.starts_with("dyn ")
        || type_name.starts_with("impl ")
    {
        return false;
    }

    let base = strip_generics(type_name);
    if base.contains("{{") {
        return false;
    }
    if !base.contains("::") && PRIMITIVES.contains(&base) {
        return true;
    }
    is_exported(last_segment(base))
}

/// Name inferred for a service registered without an explicit one.
///
/// `my_crate::api::Arith<u8>` becomes `Arith`.
pub fn inferred_name(type_name: &str) -> &str {
    last_segment(strip_generics(type_name))
}

fn strip_generics(type_name: &str) -> &str {
    type_name.split('<').next().unwrap_or(type_name)
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_exported() {
        assert!(is_exported("Multiply"));
        assert!(is_exported("Service1"));
        assert!(is_exported("Über_Service"));
        assert!(!is_exported("multiply"));
        assert!(!is_exported("_Hidden"));
        assert!(!is_exported(""));
        assert!(!is_exported("Arith.Multiply"));
        assert!(!is_exported("Has Space"));
    }

    #[test]
    fn test_value_type_visibility() {
        assert!(is_exported_or_builtin("my_crate::Args"));
        assert!(is_exported_or_builtin("alloc::string::String"));
        assert!(is_exported_or_builtin("alloc::vec::Vec<u8>"));
        assert!(is_exported_or_builtin("i64"));
        assert!(is_exported_or_builtin("()"));

        assert!(!is_exported_or_builtin("(i32, i32)"));
        assert!(!is_exported_or_builtin("[u8; 4]"));
        assert!(!is_exported_or_builtin("&str"));
        assert!(!is_exported_or_builtin("my_crate::main::{{closure}}"));
        assert!(!is_exported_or_builtin("my_crate::private_args"));
    }

    #[test]
    fn test_inferred_name() {
        assert_eq!(inferred_name("my_crate::api::Arith"), "Arith");
        assert_eq!(inferred_name("my_crate::Wrapper<my_crate::Inner>"), "Wrapper");
        assert_eq!(inferred_name("Plain"), "Plain");
    }
}
