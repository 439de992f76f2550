use crate::Value;
use std::collections::BTreeMap;

/// Attribute values keyed by column name.
pub type Attributes = BTreeMap<String, Value>;

/// Converts a type name into the snake case table name.
///
/// An underscore is inserted between an acronym and the word that follows it and
/// between a lowercase letter or digit and an uppercase letter. `::` becomes `/` and
/// `-` becomes `_`.
///
/// ```rust
/// use rivet_core::to_snake_case;
/// assert_eq!(to_snake_case("BookAuthor"), "book_author");
/// assert_eq!(to_snake_case("HTTPServer"), "http_server");
/// assert_eq!(to_snake_case("book_author"), "book_author");
/// ```
pub fn to_snake_case(name: &str) -> String {
    let name = name.replace("::", "/");
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let after_word = prev.is_ascii_lowercase() || prev.is_ascii_digit();
            let ends_acronym =
                prev.is_ascii_uppercase() && next.is_some_and(|n| n.is_ascii_lowercase());
            if after_word || ends_acronym {
                result.push('_');
            }
        }
        result.push(if c == '-' { '_' } else { c.to_ascii_lowercase() });
    }
    result
}

/// Builds [`Attributes`] out of key value pairs, the last value wins on duplicated keys.
pub fn normalize_keys<K, V, It>(pairs: It) -> Attributes
where
    K: AsRef<str>,
    V: Into<Value>,
    It: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.into()))
        .collect()
}

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Attribute map literal, keys can be identifiers or string literals.
///
/// ```rust
/// use rivet_core::{Value, attrs};
/// let attrs = attrs! { first_name: "David", "age": 30, age: 31 };
/// assert_eq!(attrs.len(), 2);
/// assert_eq!(attrs["age"], Value::Int64(Some(31)));
/// ```
#[macro_export]
macro_rules! attrs {
    (@key $key:ident) => { stringify!($key) };
    (@key $key:literal) => { $key };
    ($($key:tt : $value:expr),* $(,)?) => {
        $crate::normalize_keys::<&str, $crate::Value, _>([
            $(($crate::attrs!(@key $key), $crate::Value::from($value))),*
        ])
    };
}

/// Longest prefix of `value` within `max` bytes that ends on a char boundary.
#[doc(hidden)]
pub fn truncated(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {{
        let query: &str = &$query;
        format!(
            "{}{}",
            $crate::truncated(query, 497).trim_end(),
            if query.len() > 497 { "..." } else { "" },
        )
    }};
}

#[macro_export]
macro_rules! possibly_parenthesized {
    ($buff:ident, $cond:expr, $v:expr) => {
        if $cond {
            $buff.push('(');
            $v;
            $buff.push(')');
        } else {
            $v;
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case() {
        assert_eq!(to_snake_case("Person"), "person");
        assert_eq!(to_snake_case("AddressBook"), "address_book");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("Version2Update"), "version2_update");
        assert_eq!(to_snake_case("Admin::UserRole"), "admin/user_role");
        assert_eq!(to_snake_case("book-author"), "book_author");
        assert_eq!(to_snake_case("aBC"), "a_bc");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn snake_case_idempotent() {
        for name in ["BookAuthor", "XMLHttpRequest", "already_snake", "A", "ABCDef9G"] {
            let once = to_snake_case(name);
            assert_eq!(to_snake_case(&once), once);
        }
    }

    #[test]
    fn normalize_last_write_wins() {
        let attrs = normalize_keys([("age", 30), ("name", 1), ("age", 31)]);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs["age"], Value::Int64(Some(31)));
        let attrs = crate::attrs! { first_name: "David", "first_name": "Dave" };
        assert_eq!(attrs["first_name"], Value::Varchar(Some("Dave".into())));
    }

    #[test]
    fn truncate() {
        assert_eq!(truncated("abc", 5), "abc");
        assert_eq!(truncated("aé", 2), "a");
        let long = "x".repeat(600);
        assert_eq!(crate::truncate_long!(long).len(), 500);
    }

    #[test]
    fn separated() {
        let mut out = String::from("(");
        separated_by(&mut out, ["a", "", "b"], |out, v| out.push_str(v), ", ");
        assert_eq!(out, "(a, b");
    }
}
