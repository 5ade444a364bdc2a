//! Attribute specifier parsing
//!
//! Recognized annotation spellings:
//!
//! - `[[clang::annotate("name", args...)]]`
//! - `[[using clang: annotate("name", args...)]]`
//! - `__attribute__((annotate("name", args...)))`
//! - the reflection macros inside `[[ ]]`: `META`, `INFO(text)`,
//!   `RANGE(a, b, ...)` and `STEP(x)`
//!
//! Every other attribute is parsed and discarded.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::guards::LoopGuard;
use super::{ParseError, Parser};
use crate::parser::ast::{Annotation, AnnotationArg};
use crate::parser::token::{Span, Token};

/// Annotation name each reflection macro expands to.
static ANNOTATION_MACROS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("META", "meta"),
        ("INFO", "info"),
        ("RANGE", "range"),
        ("STEP", "step"),
    ])
});

/// Annotation name a reflection macro expands to, if `name` is one.
pub fn macro_annotation_name(name: &str) -> Option<&'static str> {
    ANNOTATION_MACROS.get(name).copied()
}

/// Specifiers that look like a call and are skipped with their arguments.
fn is_call_like_specifier(name: &str) -> bool {
    matches!(name, "alignas" | "__declspec" | "_Alignas")
}

/// True if the current token starts an attribute specifier.
pub fn at_attribute_specifier(parser: &Parser) -> bool {
    match parser.current() {
        Token::LeftBracket => matches!(parser.peek(), Token::LeftBracket),
        Token::GnuAttribute => true,
        Token::Identifier(name) => {
            is_call_like_specifier(name) && matches!(parser.peek(), Token::LeftParen)
        }
        _ => false,
    }
}

/// Parse a run of attribute specifiers, returning the annotations found.
pub fn parse_attribute_specifiers(parser: &mut Parser) -> Result<Vec<Annotation>, ParseError> {
    let mut annotations = Vec::new();
    let mut guard = LoopGuard::new("attribute_specifiers");

    while at_attribute_specifier(parser) {
        guard.check()?;
        match parser.current() {
            Token::LeftBracket => parse_standard_attribute(parser, &mut annotations)?,
            Token::GnuAttribute => parse_gnu_attribute(parser, &mut annotations)?,
            _ => {
                parser.advance();
                parser.skip_balanced()?;
            }
        }
    }

    Ok(annotations)
}

/// `[[ (using ns:)? attribute (, attribute)* ]]`
fn parse_standard_attribute(
    parser: &mut Parser,
    annotations: &mut Vec<Annotation>,
) -> Result<(), ParseError> {
    parser.expect(Token::LeftBracket)?;
    parser.expect(Token::LeftBracket)?;

    let mut using_ns = None;
    if parser.consume(&Token::Using) {
        using_ns = Some(expect_identifier(parser)?);
        parser.expect(Token::Colon)?;
    }

    let mut guard = LoopGuard::new("attribute_list");
    loop {
        guard.check()?;
        match parser.current() {
            Token::RightBracket => break,
            Token::Comma => {
                parser.advance();
                continue;
            }
            _ => {}
        }

        let span = parser.current_span();
        let first = expect_identifier(parser)?;
        let (namespace, name) = if parser.consume(&Token::ColonColon) {
            (Some(first), expect_identifier(parser)?)
        } else {
            (using_ns.clone(), first)
        };

        let is_annotate = namespace.as_deref() == Some("clang") && name == "annotate";
        let macro_name = if namespace.is_none() {
            macro_annotation_name(&name)
        } else {
            None
        };

        if is_annotate {
            if let Some(annotation) = parse_annotate_call(parser, span)? {
                annotations.push(annotation);
            }
        } else if let Some(annotation_name) = macro_name {
            let args = if parser.check(&Token::LeftParen) {
                parse_annotation_args(parser)?
            } else {
                Vec::new()
            };
            annotations.push(Annotation::new(annotation_name, args, parser.span_from(span)));
        } else {
            parser.skip_balanced()?;
        }

        parser.consume(&Token::Ellipsis);
    }

    parser.expect(Token::RightBracket)?;
    parser.expect(Token::RightBracket)?;
    Ok(())
}

/// `__attribute__(( attribute (, attribute)* ))`
fn parse_gnu_attribute(
    parser: &mut Parser,
    annotations: &mut Vec<Annotation>,
) -> Result<(), ParseError> {
    parser.expect(Token::GnuAttribute)?;
    parser.expect(Token::LeftParen)?;
    parser.expect(Token::LeftParen)?;

    let mut guard = LoopGuard::new("gnu_attribute_list");
    loop {
        guard.check()?;
        match parser.current() {
            Token::RightParen => break,
            Token::Comma => {
                parser.advance();
                continue;
            }
            _ => {}
        }

        let span = parser.current_span();
        let name = expect_identifier(parser)?;
        if name == "annotate" || name == "__annotate__" {
            if let Some(annotation) = parse_annotate_call(parser, span)? {
                annotations.push(annotation);
            }
        } else {
            parser.skip_balanced()?;
        }
    }

    parser.expect(Token::RightParen)?;
    parser.expect(Token::RightParen)?;
    Ok(())
}

/// `( "name" (, arg)* )` following `annotate`.
///
/// A call whose first argument is not a string literal is reported and
/// dropped; parsing continues after it.
fn parse_annotate_call(parser: &mut Parser, span: Span) -> Result<Option<Annotation>, ParseError> {
    if !parser.check(&Token::LeftParen) {
        parser.record_error(
            ParseError::invalid_annotation("`annotate` requires arguments", span)
                .with_suggestion("write annotate(\"name\", ...)"),
        );
        return Ok(None);
    }

    let mut args = parse_annotation_args(parser)?.into_iter();
    match args.next() {
        Some(AnnotationArg::Str(name)) => Ok(Some(Annotation::new(
            name,
            args.collect(),
            parser.span_from(span),
        ))),
        _ => {
            parser.record_error(
                ParseError::invalid_annotation(
                    "first argument of `annotate` must be a string literal",
                    span,
                )
                .with_suggestion("write annotate(\"name\", ...)"),
            );
            Ok(None)
        }
    }
}

/// Parse a parenthesized, comma separated argument list.
pub fn parse_annotation_args(parser: &mut Parser) -> Result<Vec<AnnotationArg>, ParseError> {
    let open_span = parser.expect(Token::LeftParen)?;
    let mut args = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut start = parser.position();
    let mut depth = 0usize;
    let mut guard = LoopGuard::new("annotation_args");

    loop {
        guard.check()?;
        match parser.current() {
            Token::Eof => {
                return Err(ParseError::unclosed_delimiter(
                    Token::LeftParen,
                    Token::RightParen,
                    open_span,
                ));
            }
            Token::RightParen if depth == 0 => {
                let text = parser.text_between(start, parser.position());
                args.extend(classify_argument(&current, text));
                parser.advance();
                break;
            }
            Token::Comma if depth == 0 => {
                let text = parser.text_between(start, parser.position());
                args.extend(classify_argument(&current, text));
                current.clear();
                parser.advance();
                start = parser.position();
                continue;
            }
            Token::LeftParen | Token::LeftBracket | Token::LeftBrace => depth += 1,
            Token::RightParen | Token::RightBracket | Token::RightBrace => {
                depth = depth.saturating_sub(1)
            }
            _ => {}
        }
        current.push(parser.advance());
    }

    Ok(args)
}

/// Classify one argument's tokens as a literal, or keep it as an expression.
fn classify_argument(tokens: &[Token], text: String) -> Option<AnnotationArg> {
    if tokens.is_empty() {
        return None;
    }

    if let Some(value) = string_literal_sequence(tokens) {
        return Some(AnnotationArg::Str(value));
    }

    let (sign, rest) = match tokens {
        [Token::Minus, rest @ ..] => ("-", rest),
        [Token::Plus, rest @ ..] => ("", rest),
        _ => ("", tokens),
    };

    let arg = match rest {
        [Token::IntLiteral(digits)] => AnnotationArg::Int(format!("{}{}", sign, digits)),
        [Token::FloatLiteral(digits)] => AnnotationArg::Float(format!("{}{}", sign, digits)),
        _ => AnnotationArg::Expr(text),
    };
    Some(arg)
}

/// Concatenate adjacent string literals, accepting encoding prefixes.
fn string_literal_sequence(tokens: &[Token]) -> Option<String> {
    let mut value = String::new();
    let mut iter = tokens.iter().peekable();
    let mut saw_literal = false;

    while let Some(tok) = iter.next() {
        match tok {
            Token::StringLiteral(text) => {
                value.push_str(text);
                saw_literal = true;
            }
            Token::Identifier(prefix)
                if matches!(prefix.as_str(), "u8" | "u" | "U" | "L")
                    && matches!(iter.peek(), Some(Token::StringLiteral(_))) => {}
            _ => return None,
        }
    }

    saw_literal.then_some(value)
}

fn expect_identifier(parser: &mut Parser) -> Result<String, ParseError> {
    match parser.current() {
        Token::Identifier(name) => {
            let name = name.clone();
            parser.advance();
            Ok(name)
        }
        _ => Err(parser.unexpected_token(vec![Token::Identifier("identifier".to_string())])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotations(source: &str) -> Vec<Annotation> {
        let mut parser = Parser::new(source).unwrap();
        parse_attribute_specifiers(&mut parser).unwrap()
    }

    fn names(annotations: &[Annotation]) -> Vec<&str> {
        annotations.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_clang_annotate() {
        let found = annotations(r#"[[clang::annotate("range", 1, -2.5, 0x10)]]"#);
        assert_eq!(names(&found), vec!["range"]);
        assert_eq!(
            found[0].args,
            vec![
                AnnotationArg::Int("1".to_string()),
                AnnotationArg::Float("-2.5".to_string()),
                AnnotationArg::Int("0x10".to_string()),
            ]
        );
    }

    #[test]
    fn test_using_prefix_and_other_attributes() {
        let found = annotations(r#"[[nodiscard, gnu::cold, noreturn]]"#);
        assert!(found.is_empty());

        let found = annotations(r#"[[using clang: annotate("meta"), annotate("info", "x")]]"#);
        assert_eq!(names(&found), vec!["meta", "info"]);
    }

    #[test]
    fn test_macro_spellings() {
        let found = annotations(r#"[[META, INFO("speed"), RANGE(0, 10), STEP(0.5)]]"#);
        assert_eq!(names(&found), vec!["meta", "info", "range", "step"]);
        assert!(found[0].args.is_empty());
        assert_eq!(found[1].args, vec![AnnotationArg::Str("speed".to_string())]);
        assert_eq!(found[3].args, vec![AnnotationArg::Float("0.5".to_string())]);
    }

    #[test]
    fn test_gnu_attribute() {
        let found = annotations(
            r#"__attribute__((aligned(8), annotate("info", "a" "b"))) alignas(16) [[deprecated("x")]]"#,
        );
        assert_eq!(names(&found), vec!["info"]);
        assert_eq!(found[0].args, vec![AnnotationArg::Str("ab".to_string())]);
    }

    #[test]
    fn test_expression_argument_kept_as_text() {
        let found = annotations(r#"[[clang::annotate("step", 1 + 2, (3), u8"s")]]"#);
        assert_eq!(
            found[0].args,
            vec![
                AnnotationArg::Expr("1+2".to_string()),
                AnnotationArg::Expr("(3)".to_string()),
                AnnotationArg::Str("s".to_string()),
            ]
        );
    }

    #[test]
    fn test_annotate_without_string_name_is_recorded() {
        let mut parser = Parser::new("[[clang::annotate(42)]] int x;").unwrap();
        let found = parse_attribute_specifiers(&mut parser).unwrap();
        assert!(found.is_empty());
        let (_, errors) = parser.parse_lenient();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_macro_table() {
        assert_eq!(macro_annotation_name("RANGE"), Some("range"));
        assert_eq!(macro_annotation_name("range"), None);
    }
}
