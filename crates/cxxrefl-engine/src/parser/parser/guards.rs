//! Parser guards against runaway loops and unbounded nesting

use super::ParseError;
use crate::parser::token::Span;

/// Maximum iterations for any parser loop
const MAX_LOOP_ITERATIONS: usize = 1_000_000;

/// Maximum nesting depth of scopes (namespaces, records, linkage blocks,
/// template heads)
pub const MAX_PARSE_DEPTH: usize = 64;

/// Guard against infinite loops in the parser.
///
/// ```ignore
/// let mut guard = LoopGuard::new("record_body");
/// while !parser.check(&Token::RightBrace) {
///     guard.check()?;
///     // ...
/// }
/// ```
pub struct LoopGuard {
    name: &'static str,
    count: usize,
    max: usize,
}

impl LoopGuard {
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self::with_limit(name, MAX_LOOP_ITERATIONS)
    }

    #[inline]
    pub fn with_limit(name: &'static str, max: usize) -> Self {
        Self {
            name,
            count: 0,
            max,
        }
    }

    /// Count one iteration; fails once the limit is passed.
    #[inline]
    pub fn check(&mut self) -> Result<(), ParseError> {
        self.count += 1;
        if self.count > self.max {
            return Err(ParseError::parser_limit_exceeded(
                format!("loop '{}' exceeded {} iterations", self.name, self.max),
                Span::default(),
            ));
        }
        Ok(())
    }
}

/// Fail if entering one more scope would pass [`MAX_PARSE_DEPTH`].
#[inline]
pub fn check_depth(depth: usize, name: &'static str, span: Span) -> Result<(), ParseError> {
    if depth >= MAX_PARSE_DEPTH {
        return Err(ParseError::parser_limit_exceeded(
            format!(
                "maximum nesting depth ({}) exceeded in {}",
                MAX_PARSE_DEPTH, name
            ),
            span,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_guard_limit() {
        let mut guard = LoopGuard::with_limit("test", 3);
        for _ in 0..3 {
            assert!(guard.check().is_ok());
        }
        assert!(guard.check().is_err());
    }

    #[test]
    fn test_check_depth() {
        assert!(check_depth(0, "test", Span::default()).is_ok());
        assert!(check_depth(MAX_PARSE_DEPTH - 1, "test", Span::default()).is_ok());
        assert!(check_depth(MAX_PARSE_DEPTH, "test", Span::default()).is_err());
    }
}
