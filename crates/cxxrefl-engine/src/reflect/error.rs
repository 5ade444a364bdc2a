//! Extraction faults
//!
//! An extraction fault never aborts a file: the offending argument is
//! logged and skipped.

use thiserror::Error;

/// Errors converting an annotation argument to a number
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtractError {
    /// Integer literal that does not fit or has invalid digits
    #[error("invalid integer literal '{text}'")]
    InvalidInteger {
        /// Literal as written
        text: String,
    },

    /// Floating literal that does not parse
    #[error("invalid floating literal '{text}'")]
    InvalidFloat {
        /// Literal as written
        text: String,
    },

    /// Floating literal whose value is not representable as a finite `f64`
    #[error("floating literal '{text}' is out of range")]
    OutOfRange {
        /// Literal as written
        text: String,
    },

    /// Hexadecimal floating literal
    #[error("hexadecimal floating literal '{text}' has no decimal form")]
    HexFloat {
        /// Literal as written
        text: String,
    },

    /// Argument is an expression rather than a literal
    #[error("'{text}' is not a numeric literal")]
    NotNumeric {
        /// Expression as written
        text: String,
    },
}
