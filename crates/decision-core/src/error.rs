use std::fmt;

use thiserror::Error;

/// A value outside one of the closed decision enumerations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unreachable variant for {enumeration}: {value}")]
pub struct InvalidVariant {
    pub enumeration: &'static str,
    pub value: String,
}

impl InvalidVariant {
    pub fn new(enumeration: &'static str, value: impl fmt::Display) -> Self {
        Self {
            enumeration,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("unsupported pattern flag: {0}")]
    UnsupportedFlag(char),
    #[error("invalid pattern: {0}")]
    Syntax(#[from] regex::Error),
}
