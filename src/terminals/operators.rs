//! Operator ordering
//!
//!     Operators are tried in order and the first match wins, so an operator must never be
//!     tried before a longer operator it is a prefix of ("+" before "+=" would split "+="
//!     into two tokens). [sort] arranges them into suites: each suite starts with a long
//!     operator and collects the shorter operators that are its prefixes right behind the
//!     longest one they prefix. Operators unrelated to anything longer start suites of
//!     their own.

/// Orders `names` so that no operator comes before a longer operator it is a prefix of.
/// Empty names and duplicates are dropped.
pub fn sort<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut sorted: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()));
    let mut suites: Vec<Vec<String>> = Vec::new();
    for name in sorted {
        if name.is_empty() {
            continue;
        }
        if !suites.iter_mut().any(|suite| insert_into(suite, name)) {
            suites.push(vec![name.to_string()]);
        }
    }
    suites.into_iter().rev().flatten().collect()
}

/// Places `name` right after the last member it is a prefix of. Returns false when it
/// prefixes nothing in the suite.
fn insert_into(suite: &mut Vec<String>, name: &str) -> bool {
    for i in (0..suite.len()).rev() {
        if suite[i].starts_with(name) {
            if suite[i].len() != name.len() {
                suite.insert(i + 1, name.to_string());
            }
            return true;
        }
    }
    false
}
