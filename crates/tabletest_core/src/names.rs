//! Short type names for element labels.

/// Strip module paths from a fully qualified type name.
///
/// `std::any::type_name` returns paths such as `alloc::vec::Vec<my_crate::tests::Case>`. Element labels only
/// need the last segment of every path, so this returns `Vec<Case>`.
///
/// ## Parameters
/// - `full`: a type name as produced by `std::any::type_name`.
///
/// ## Returns
/// - (`String`): the same type with every path reduced to its final segment.
///
/// ## Examples
/// ```rust
/// use tabletest_core::short_type_name;
/// assert_eq!(short_type_name("my_crate::tests::Case"), "Case");
/// assert_eq!(short_type_name("alloc::vec::Vec<my_crate::Case>"), "Vec<Case>");
/// assert_eq!(short_type_name("&dyn core::any::Any"), "&dyn Any");
/// ```
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(segment_start);
            continue;
        }
        out.push(c);
        if !is_path_char(c) {
            segment_start = out.len();
        }
    }

    out
}

// Closure and async-block names (`{{closure}}`) keep their braces as part of the segment.
fn is_path_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '{' || c == '}'
}
