//! Node name validation.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validates one node name.
///
/// Accepted: an ASCII lowercase letter followed by ASCII letters, digits,
/// `_` or `-`. Names are used verbatim as grammar type names.
pub fn validate_node_name(name: &str) -> Result<(), NodeNameError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(NodeNameError::Empty);
    };
    if !first.is_ascii_lowercase() {
        return Err(NodeNameError::Invalid(name.to_string()));
    }
    if chars.any(|c| !(c.is_ascii_alphanumeric() || c == '_' || c == '-')) {
        return Err(NodeNameError::Invalid(name.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeNameError {
    Empty,
    Invalid(String),
}

impl Display for NodeNameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "node name must not be empty"),
            Self::Invalid(value) => write!(f, "node name is invalid: {value}"),
        }
    }
}

impl Error for NodeNameError {}

#[cfg(test)]
mod tests {
    use super::{validate_node_name, NodeNameError};

    #[test]
    fn accepts_grammar_style_names() {
        for name in ["doc", "paragraph", "code_block", "listItem", "h-rule", "table2"] {
            assert!(validate_node_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_empty_name() {
        assert_eq!(validate_node_name(""), Err(NodeNameError::Empty));
    }

    #[test]
    fn rejects_bad_leading_or_inner_characters() {
        for name in ["Paragraph", "1st", "_doc", "code block", "doc.v2", " doc"] {
            assert_eq!(
                validate_node_name(name),
                Err(NodeNameError::Invalid(name.to_string())),
                "{name} should be rejected"
            );
        }
    }
}
