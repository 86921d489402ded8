//! PCache Identifiers
//!
//! Grammars for namespace names, structure names, structure definitions and
//! structure-instance strings.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use regex::Regex;
use std::sync::OnceLock;

/// Namespace and structure names.
const NAME_PATTERN: &str = r"^[A-Za-z0-9_]+$";

/// One key of a structure definition.
const KEY_TOKEN_PATTERN: &str = r"^\s*[A-Za-z0-9_]+\s*$";

/// One `key=value` pair of an instance string. Values are any run of
/// characters other than `,` and `=` with at least one non-blank.
const PAIR_TOKEN_PATTERN: &str = r"^\s*[A-Za-z0-9_]+\s*=[^,=]*[^,=\s][^,=]*$";

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("identifier pattern compiles"))
}

fn name_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compiled(&CELL, NAME_PATTERN)
}

fn key_token_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compiled(&CELL, KEY_TOKEN_PATTERN)
}

fn pair_token_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compiled(&CELL, PAIR_TOKEN_PATTERN)
}

// =============================================================================
// Grammar Checks
// =============================================================================

/// `^[A-Za-z0-9_]+$`
pub fn is_valid_name(name: &str) -> bool {
    name_regex().is_match(name)
}

/// Comma-separated keys, each a valid name. Blanks around keys are allowed.
pub fn is_valid_key_list(definition: &str) -> bool {
    !definition.trim().is_empty() && definition.split(',').all(|t| key_token_regex().is_match(t))
}

/// Comma-separated `key=value` pairs.
pub fn is_valid_instance(instance: &str) -> bool {
    !instance.trim().is_empty() && instance.split(',').all(|t| pair_token_regex().is_match(t))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert!(is_valid_name("foo"));
        assert!(is_valid_name("foo_Bar_42"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("asdf!@#$"));
        assert!(!is_valid_name("foo bar"));
        assert!(!is_valid_name(" foo"));
        assert!(!is_valid_name("foo-bar"));
    }

    #[test]
    fn test_key_lists() {
        assert!(is_valid_key_list("baz,boo"));
        assert!(is_valid_key_list("sensor_type, sensor_name"));
        assert!(is_valid_key_list("single"));
        assert!(!is_valid_key_list(""));
        assert!(!is_valid_key_list("!!baz,boo"));
        assert!(!is_valid_key_list("baz,,boo"));
        assert!(!is_valid_key_list("baz,boo,"));
        assert!(!is_valid_key_list("baz=1"));
    }

    #[test]
    fn test_instances() {
        assert!(is_valid_instance("baz=1,boo=2"));
        assert!(is_valid_instance("tid=1, sid=1"));
        assert!(is_valid_instance("sensor_type=heat,sensor_name=S451 north"));
        assert!(!is_valid_instance(""));
        assert!(!is_valid_instance("baz=1,boo!=2"));
        assert!(!is_valid_instance("baz=1,boo"));
        assert!(!is_valid_instance("baz="));
        assert!(!is_valid_instance("baz= "));
        assert!(!is_valid_instance("baz=1=2"));
        assert!(!is_valid_instance("baz=1,"));
        assert!(!is_valid_instance("=1"));
    }
}
