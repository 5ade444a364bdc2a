//! Parse error types

use crate::parser::token::{Span, Token};
use std::fmt;

/// A parse error with location and contextual information.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The kind of error that occurred
    pub kind: ParseErrorKind,

    /// Source location of the error
    pub span: Span,

    /// Human-readable error message
    pub message: String,

    /// Optional suggestion for fixing the error
    pub suggestion: Option<String>,
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token found
    UnexpectedToken { expected: Vec<Token>, found: Token },

    /// Unexpected end of file
    UnexpectedEof { expected: Vec<Token> },

    /// Invalid syntax
    InvalidSyntax { reason: String },

    /// Malformed annotation (e.g. `annotate` without a string name)
    InvalidAnnotation { reason: String },

    /// Missing closing delimiter
    UnclosedDelimiter { open: Token, expected_close: Token },

    /// Parser exceeded iteration/depth limit
    ParserLimitExceeded { message: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parse error at {}:{}: {}",
            self.span.line, self.span.column, self.message
        )?;

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  suggestion: {}", suggestion)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    /// Create an "unexpected token" error.
    pub fn unexpected_token(expected: Vec<Token>, found: Token, span: Span) -> Self {
        let message = match expected.as_slice() {
            [single] => format!("expected `{}`, found `{}`", single, found),
            _ => format!("expected one of {}, found `{}`", join_tokens(&expected), found),
        };

        Self {
            kind: ParseErrorKind::UnexpectedToken { expected, found },
            span,
            message,
            suggestion: None,
        }
    }

    /// Create an "unexpected EOF" error.
    pub fn unexpected_eof(expected: Vec<Token>, span: Span) -> Self {
        let message = match expected.as_slice() {
            [single] => format!("unexpected end of file, expected `{}`", single),
            _ => format!(
                "unexpected end of file, expected one of {}",
                join_tokens(&expected)
            ),
        };

        Self {
            kind: ParseErrorKind::UnexpectedEof { expected },
            span,
            message,
            suggestion: None,
        }
    }

    /// Create an "invalid syntax" error.
    pub fn invalid_syntax(reason: impl Into<String>, span: Span) -> Self {
        let reason = reason.into();
        Self {
            message: format!("invalid syntax: {}", reason),
            kind: ParseErrorKind::InvalidSyntax { reason },
            span,
            suggestion: None,
        }
    }

    /// Create an "invalid annotation" error.
    pub fn invalid_annotation(reason: impl Into<String>, span: Span) -> Self {
        let reason = reason.into();
        Self {
            message: format!("invalid annotation: {}", reason),
            kind: ParseErrorKind::InvalidAnnotation { reason },
            span,
            suggestion: None,
        }
    }

    /// Create an "unclosed delimiter" error.
    pub fn unclosed_delimiter(open: Token, expected_close: Token, span: Span) -> Self {
        Self {
            message: format!("unclosed `{}`, expected `{}`", open, expected_close),
            kind: ParseErrorKind::UnclosedDelimiter {
                open,
                expected_close,
            },
            span,
            suggestion: None,
        }
    }

    /// Create a "parser limit exceeded" error.
    pub fn parser_limit_exceeded(message: impl Into<String>, span: Span) -> Self {
        let message = message.into();
        Self {
            kind: ParseErrorKind::ParserLimitExceeded {
                message: message.clone(),
            },
            span,
            message: format!("parser limit exceeded: {}", message),
            suggestion: None,
        }
    }

    /// Add a suggestion to this error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| format!("`{}`", t))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_token_message() {
        let err = ParseError::unexpected_token(
            vec![Token::Semicolon],
            Token::RightBrace,
            Span::new(4, 5, 2, 3),
        );
        assert_eq!(err.message, "expected `;`, found `}`");
        assert_eq!(err.to_string(), "parse error at 2:3: expected `;`, found `}`");
    }

    #[test]
    fn test_suggestion_is_displayed() {
        let err = ParseError::invalid_annotation("missing name", Span::new(0, 1, 1, 1))
            .with_suggestion("write annotate(\"name\", ...)");
        let text = err.to_string();
        assert!(text.contains("invalid annotation: missing name"));
        assert!(text.contains("suggestion: write annotate"));
    }
}
