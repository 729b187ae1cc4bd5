//! Named single-character predicates
//!
//!     A CharPredicate is the smallest building block of the pattern engine: a test on one
//!     character plus a human readable name. The name is what shows up in error messages
//!     when a scanner built from the predicate fails ("[0-9] expected"), so predicates built
//!     by composition also compose their names.

use std::fmt;
use std::sync::Arc;

/// A single-character test with a display name.
#[derive(Clone)]
pub struct CharPredicate {
    name: Arc<str>,
    test: Arc<dyn Fn(char) -> bool + Send + Sync>,
}

impl CharPredicate {
    pub fn new<F>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(char) -> bool + Send + Sync + 'static,
    {
        CharPredicate {
            name: Arc::from(name.into()),
            test: Arc::new(test),
        }
    }

    pub fn test(&self, c: char) -> bool {
        (self.test)(c)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the predicate without changing what it accepts.
    pub fn named(self, name: impl Into<String>) -> Self {
        CharPredicate {
            name: Arc::from(name.into()),
            test: self.test,
        }
    }

    pub fn and(&self, other: &CharPredicate) -> CharPredicate {
        let (a, b) = (self.clone(), other.clone());
        CharPredicate::new(format!("{} and {}", self.name, other.name), move |c| {
            a.test(c) && b.test(c)
        })
    }

    pub fn or(&self, other: &CharPredicate) -> CharPredicate {
        let (a, b) = (self.clone(), other.clone());
        CharPredicate::new(format!("{} | {}", self.name, other.name), move |c| {
            a.test(c) || b.test(c)
        })
    }

    pub fn not(&self) -> CharPredicate {
        let a = self.clone();
        CharPredicate::new(format!("^{}", self.name), move |c| !a.test(c))
    }
}

impl fmt::Debug for CharPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CharPredicate({})", self.name)
    }
}

impl fmt::Display for CharPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

pub fn is(expected: char) -> CharPredicate {
    CharPredicate::new(expected.to_string(), move |c| c == expected)
}

pub fn not_char(excluded: char) -> CharPredicate {
    CharPredicate::new(format!("^{excluded}"), move |c| c != excluded)
}

/// Inclusive character range, named like a regex class.
pub fn range(from: char, to: char) -> CharPredicate {
    CharPredicate::new(format!("[{from}-{to}]"), move |c| (from..=to).contains(&c))
}

pub fn among(chars: &str) -> CharPredicate {
    let set: Vec<char> = chars.chars().collect();
    match set.as_slice() {
        [] => never(),
        [single] => is(*single),
        _ => CharPredicate::new(format!("[{chars}]"), move |c| set.contains(&c)),
    }
}

pub fn not_among(chars: &str) -> CharPredicate {
    let set: Vec<char> = chars.chars().collect();
    match set.as_slice() {
        [] => always(),
        [single] => not_char(*single),
        _ => CharPredicate::new(format!("^[{chars}]"), move |c| !set.contains(&c)),
    }
}

pub fn is_digit() -> CharPredicate {
    CharPredicate::new("[0-9]", |c| c.is_ascii_digit())
}

pub fn is_hex_digit() -> CharPredicate {
    CharPredicate::new("[0-9a-fA-F]", |c| c.is_ascii_hexdigit())
}

/// Any unicode letter.
pub fn is_letter() -> CharPredicate {
    CharPredicate::new("letter", char::is_alphabetic)
}

pub fn is_lower() -> CharPredicate {
    CharPredicate::new("[a-z]", |c| c.is_ascii_lowercase())
}

pub fn is_upper() -> CharPredicate {
    CharPredicate::new("[A-Z]", |c| c.is_ascii_uppercase())
}

pub fn is_alpha() -> CharPredicate {
    CharPredicate::new("[a-zA-Z]", |c| c.is_ascii_alphabetic())
}

/// ASCII letter or underscore: the first character of a word.
pub fn is_alpha_() -> CharPredicate {
    CharPredicate::new("[a-zA-Z_]", |c| c.is_ascii_alphabetic() || c == '_')
}

/// ASCII letter, digit or underscore: the trailing characters of a word.
pub fn is_alpha_numeric() -> CharPredicate {
    CharPredicate::new("[0-9a-zA-Z_]", |c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn is_whitespace() -> CharPredicate {
    CharPredicate::new("whitespace", char::is_whitespace)
}

pub fn always() -> CharPredicate {
    CharPredicate::new("any character", |_| true)
}

pub fn never() -> CharPredicate {
    CharPredicate::new("none", |_| false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_and_name() {
        let p = range('a', 'f');
        assert!(p.test('a'));
        assert!(p.test('f'));
        assert!(!p.test('g'));
        assert_eq!(p.name(), "[a-f]");
    }

    #[test]
    fn test_among_single_char_collapses_to_is() {
        assert_eq!(among("x").name(), "x");
        assert_eq!(among("xy").name(), "[xy]");
        assert!(!among("").test('x'));
        assert!(not_among("").test('x'));
    }

    #[test]
    fn test_composition() {
        let p = is_alpha().or(&is('_'));
        assert!(p.test('_'));
        assert!(p.test('Q'));
        assert!(!p.test('1'));
        assert_eq!(p.name(), "[a-zA-Z] | _");

        let vowel_free = is_lower().and(&not_among("aeiou"));
        assert!(vowel_free.test('z'));
        assert!(!vowel_free.test('e'));

        assert!(is_digit().not().test('x'));
        assert_eq!(is_digit().not().name(), "^[0-9]");
    }

    #[test]
    fn test_word_classes() {
        assert!(is_alpha_().test('_'));
        assert!(!is_alpha_().test('9'));
        assert!(is_alpha_numeric().test('9'));
        assert!(is_hex_digit().test('F'));
        assert!(!is_hex_digit().test('g'));
        assert!(is_letter().test('é'));
    }
}
