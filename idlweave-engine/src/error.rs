//! Error types for the engine
//!
//! A failed lookup never aborts a document build: it is logged and the name renders
//! unlinked. A block whose markup cannot be serialized fails the build.

use std::fmt;
use std::time::Duration;

/// Error from a cross-reference provider.
#[derive(Debug, Clone, PartialEq)]
pub enum XrefError {
    /// The provider could not be reached or refused the query
    Unavailable(String),
    /// The lookup did not settle within the configured timeout
    Timeout(Duration),
    /// The provider answered with data that could not be read
    Malformed(String),
}

impl fmt::Display for XrefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XrefError::Unavailable(msg) => write!(f, "Cross-reference provider unavailable: {msg}"),
            XrefError::Timeout(after) => {
                write!(f, "Cross-reference lookup timed out after {}ms", after.as_millis())
            }
            XrefError::Malformed(msg) => write!(f, "Malformed cross-reference data: {msg}"),
        }
    }
}

impl std::error::Error for XrefError {}

impl From<serde_json::Error> for XrefError {
    fn from(err: serde_json::Error) -> Self {
        XrefError::Malformed(err.to_string())
    }
}

/// Error while turning rendered markup into HTML text.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    SerializationError(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {}
