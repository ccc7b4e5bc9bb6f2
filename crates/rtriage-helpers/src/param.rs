//! Helper parameters: literal values and `$`-prefixed event references.

use std::fmt;

/// Convert a field name into a JSON pointer path.
///
/// Dotted names (`user.login.name`) become `/user/login/name`; names that
/// already start with `/` are kept as-is.
pub fn to_pointer(field: &str) -> String {
    if field.is_empty() || field.starts_with('/') {
        field.to_string()
    } else {
        format!("/{}", field.replace('.', "/"))
    }
}

/// A helper parameter, immutable after parse.
///
/// A reference carries the pointer path it resolves against the event; a
/// value carries the raw literal string, which individual operators may
/// coerce (e.g. `i_calc` parses integer literals at build time).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    Value(String),
    Reference(String),
}

impl Parameter {
    /// Classify a raw parameter by its leading `$` sigil.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('$') {
            Some(field) => Parameter::Reference(to_pointer(field)),
            None => Parameter::Value(raw.to_string()),
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Parameter::Reference(_))
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Parameter::Value(_))
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::Value(v) => write!(f, "{v}"),
            Parameter::Reference(path) => write!(f, "${path}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pointer() {
        assert_eq!(to_pointer("a"), "/a");
        assert_eq!(to_pointer("user.login.name"), "/user/login/name");
        assert_eq!(to_pointer("/already/pointer"), "/already/pointer");
        assert_eq!(to_pointer(""), "");
    }

    #[test]
    fn test_parse_classification() {
        assert_eq!(
            Parameter::parse("$src.ip"),
            Parameter::Reference("/src/ip".to_string())
        );
        assert_eq!(
            Parameter::parse("$/src/ip"),
            Parameter::Reference("/src/ip".to_string())
        );
        assert_eq!(
            Parameter::parse("literal"),
            Parameter::Value("literal".to_string())
        );
        // Only the leading sigil counts.
        assert_eq!(
            Parameter::parse("pre$fix"),
            Parameter::Value("pre$fix".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Parameter::parse("$a.b").to_string(), "$/a/b");
        assert_eq!(Parameter::parse("plain").to_string(), "plain");
    }
}
