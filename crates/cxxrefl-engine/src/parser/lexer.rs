//! Lexer for C++ declarations.
//!
//! This module implements the lexer using the logos library. It converts
//! source text into a stream of tokens with line/column information.
//! Comments and preprocessor directives are dropped here, so the parser only
//! ever sees declaration tokens.

use crate::parser::token::{Span, Token};
use logos::Logos;

/// Logos-based token enum for lexing.
///
/// This enum is used internally by logos for efficient tokenization.
/// It's converted to our main Token enum after lexing.
#[derive(Logos, Debug, Clone, PartialEq)]
enum LogosToken {
    // Whitespace (skip)
    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    Whitespace,

    // Comments (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*", lex_block_comment)]
    BlockComment,

    // Preprocessor directives (skip, honouring line continuations)
    #[token("#", lex_directive)]
    Directive,

    // Keywords (must come before identifiers)
    #[token("namespace")]
    Namespace,

    #[token("class")]
    Class,

    #[token("struct")]
    Struct,

    #[token("union")]
    Union,

    #[token("enum")]
    Enum,

    #[token("template")]
    Template,

    #[token("typename")]
    Typename,

    #[token("using")]
    Using,

    #[token("typedef")]
    Typedef,

    #[token("friend")]
    Friend,

    #[token("extern")]
    Extern,

    #[token("inline")]
    Inline,

    #[token("static")]
    Static,

    #[token("virtual")]
    Virtual,

    #[token("operator")]
    Operator,

    #[token("static_assert")]
    #[token("_Static_assert")]
    StaticAssert,

    #[token("public")]
    Public,

    #[token("protected")]
    Protected,

    #[token("private")]
    Private,

    #[token("__attribute__")]
    #[token("__attribute")]
    GnuAttribute,

    // Identifiers (must come after keywords)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Numbers keep their spelling; conversion happens during extraction
    // Separator placement is checked during extraction
    #[regex(r"0[xX][0-9a-fA-F][0-9a-fA-F']*[uUlLzZ]*", |lex| lex.slice().to_string())]
    #[regex(r"0[bB][01][01']*[uUlLzZ]*", |lex| lex.slice().to_string())]
    #[regex(r"[0-9][0-9']*[uUlLzZ]*", |lex| lex.slice().to_string())]
    IntLiteral(String),

    #[regex(r"[0-9][0-9']*\.[0-9']*([eE][+-]?[0-9]+)?[fFlL]?", |lex| lex.slice().to_string())]
    #[regex(r"\.[0-9][0-9']*([eE][+-]?[0-9]+)?[fFlL]?", |lex| lex.slice().to_string())]
    #[regex(r"[0-9][0-9']*[eE][+-]?[0-9]+[fFlL]?", |lex| lex.slice().to_string())]
    #[regex(r"0[xX][0-9a-fA-F']*(\.[0-9a-fA-F']*)?[pP][+-]?[0-9]+[fFlL]?", |lex| lex.slice().to_string())]
    FloatLiteral(String),

    // Strings keep their escapes verbatim
    #[regex(r#""([^"\\\n]|\\.)*""#, parse_quoted)]
    StringLiteral(String),

    #[regex(r#""([^"\\\n]|\\.)*"#)]
    UnterminatedString,

    #[regex(r"'([^'\\\n]|\\.)*'", parse_quoted)]
    CharLiteral(String),

    // Operators (multi-char before single-char)
    #[token("::")]
    ColonColon,

    #[token("...")]
    Ellipsis,

    #[token("->")]
    Arrow,

    #[token("&&")]
    AmpAmp,

    // Single-character tokens
    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    #[token("[")]
    LeftBracket,

    #[token("]")]
    RightBracket,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("=")]
    Equal,

    #[token("*")]
    Star,

    #[token("&")]
    Amp,

    #[token("~")]
    Tilde,

    #[token("-")]
    Minus,

    #[token("+")]
    Plus,

    #[token(".")]
    Dot,

    #[regex(r"[!%^|?/@$\\]", |lex| lex.slice().chars().next())]
    Punct(char),
}

// Helper parsing functions
fn lex_block_comment(lex: &mut logos::Lexer<'_, LogosToken>) -> logos::Skip {
    // We've already consumed "/*", now find "*/"
    let remainder = lex.remainder();

    if let Some(end) = remainder.find("*/") {
        lex.bump(end + 2);
    } else {
        // Unterminated comment - consume to end
        lex.bump(remainder.len());
    }

    logos::Skip
}

fn lex_directive(lex: &mut logos::Lexer<'_, LogosToken>) -> logos::Skip {
    let bytes = lex.remainder().as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if bytes.get(pos + 1) == Some(&b'\n') => pos += 2,
            b'\\' if bytes.get(pos + 1) == Some(&b'\r') && bytes.get(pos + 2) == Some(&b'\n') => {
                pos += 3
            }
            b'\n' => break,
            _ => pos += 1,
        }
    }

    lex.bump(pos);
    logos::Skip
}

fn parse_quoted(lex: &mut logos::Lexer<'_, LogosToken>) -> Option<String> {
    let s = lex.slice();
    Some(s[1..s.len() - 1].to_string())
}

/// Main lexer structure.
pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<(Token, Span)>,
    errors: Vec<LexError>,
}

/// Lexer error types.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    UnexpectedCharacter { char: char, span: Span },
    UnterminatedString { span: Span },
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Format all errors with source context
    pub fn format_errors(errors: &[LexError], source: &str) -> String {
        errors
            .iter()
            .map(|e| e.format_with_source(source))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn tokenize(mut self) -> Result<Vec<(Token, Span)>, Vec<LexError>> {
        let mut logos_lexer = LogosToken::lexer(self.source);
        let mut line = 1u32;
        let mut column = 1u32;
        let mut cursor = 0usize;

        while let Some(token_result) = logos_lexer.next() {
            let range = logos_lexer.span();

            // Advance line/column over skipped text up to the token start
            for c in self.source[cursor..range.start].chars() {
                if c == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
            }
            cursor = range.start;

            let span = Span::new(range.start, range.end, line, column);

            match token_result {
                Ok(LogosToken::UnterminatedString) => {
                    self.errors.push(LexError::UnterminatedString { span });
                }
                Ok(logos_token) => {
                    if let Some(token) = convert_token(logos_token) {
                        self.tokens.push((token, span));
                    }
                }
                Err(_) => {
                    let char = self.source[range.start..].chars().next().unwrap_or('\0');
                    self.errors.push(LexError::UnexpectedCharacter { char, span });
                }
            }
        }

        for c in self.source[cursor..].chars() {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        let eof_span = Span::new(self.source.len(), self.source.len(), line, column);
        self.tokens.push((Token::Eof, eof_span));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }
}

fn convert_token(logos_token: LogosToken) -> Option<Token> {
    let token = match logos_token {
        LogosToken::Whitespace
        | LogosToken::LineComment
        | LogosToken::BlockComment
        | LogosToken::Directive
        | LogosToken::UnterminatedString => return None,
        LogosToken::Namespace => Token::Namespace,
        LogosToken::Class => Token::Class,
        LogosToken::Struct => Token::Struct,
        LogosToken::Union => Token::Union,
        LogosToken::Enum => Token::Enum,
        LogosToken::Template => Token::Template,
        LogosToken::Typename => Token::Typename,
        LogosToken::Using => Token::Using,
        LogosToken::Typedef => Token::Typedef,
        LogosToken::Friend => Token::Friend,
        LogosToken::Extern => Token::Extern,
        LogosToken::Inline => Token::Inline,
        LogosToken::Static => Token::Static,
        LogosToken::Virtual => Token::Virtual,
        LogosToken::Operator => Token::Operator,
        LogosToken::StaticAssert => Token::StaticAssert,
        LogosToken::Public => Token::Public,
        LogosToken::Protected => Token::Protected,
        LogosToken::Private => Token::Private,
        LogosToken::GnuAttribute => Token::GnuAttribute,
        LogosToken::Identifier(name) => Token::Identifier(name),
        LogosToken::IntLiteral(text) => Token::IntLiteral(text),
        LogosToken::FloatLiteral(text) => Token::FloatLiteral(text),
        LogosToken::StringLiteral(text) => Token::StringLiteral(text),
        LogosToken::CharLiteral(text) => Token::CharLiteral(text),
        LogosToken::ColonColon => Token::ColonColon,
        LogosToken::Ellipsis => Token::Ellipsis,
        LogosToken::Arrow => Token::Arrow,
        LogosToken::AmpAmp => Token::AmpAmp,
        LogosToken::Colon => Token::Colon,
        LogosToken::Semicolon => Token::Semicolon,
        LogosToken::Comma => Token::Comma,
        LogosToken::LeftParen => Token::LeftParen,
        LogosToken::RightParen => Token::RightParen,
        LogosToken::LeftBrace => Token::LeftBrace,
        LogosToken::RightBrace => Token::RightBrace,
        LogosToken::LeftBracket => Token::LeftBracket,
        LogosToken::RightBracket => Token::RightBracket,
        LogosToken::Less => Token::Less,
        LogosToken::Greater => Token::Greater,
        LogosToken::Equal => Token::Equal,
        LogosToken::Star => Token::Star,
        LogosToken::Amp => Token::Amp,
        LogosToken::Tilde => Token::Tilde,
        LogosToken::Minus => Token::Minus,
        LogosToken::Plus => Token::Plus,
        LogosToken::Dot => Token::Dot,
        LogosToken::Punct(c) => Token::Punct(c),
    };
    Some(token)
}

impl LexError {
    /// Get the span of this error
    pub fn span(&self) -> &Span {
        match self {
            LexError::UnexpectedCharacter { span, .. } | LexError::UnterminatedString { span } => {
                span
            }
        }
    }

    /// Get a description of this error
    pub fn description(&self) -> String {
        match self {
            LexError::UnexpectedCharacter { char, .. } => {
                format!("Unexpected character '{}'", char)
            }
            LexError::UnterminatedString { .. } => "Unterminated string literal".to_string(),
        }
    }

    /// Get a hint for fixing this error
    pub fn hint(&self) -> Option<String> {
        match self {
            LexError::UnterminatedString { .. } => {
                Some("Add a closing quote to terminate the string".to_string())
            }
            _ => None,
        }
    }

    /// Format the error with source context
    pub fn format_with_source(&self, source: &str) -> String {
        let span = self.span();
        let mut result = String::new();

        result.push_str(&format!(
            "Error at {}:{}: {}\n",
            span.line,
            span.column,
            self.description()
        ));

        if let Some(error_line) = source.lines().nth(span.line.saturating_sub(1) as usize) {
            result.push_str("  |\n");
            result.push_str(&format!("{:3} | {}\n", span.line, error_line));
            result.push_str(&format!(
                "  | {}^\n",
                " ".repeat(span.column.saturating_sub(1) as usize)
            ));
        }

        if let Some(hint) = self.hint() {
            result.push_str(&format!("\nHint: {}\n", hint));
        }

        result
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}:{}",
            self.description(),
            self.span().line,
            self.span().column
        )
    }
}

impl std::error::Error for LexError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source)
            .tokenize()
            .expect("should lex")
            .into_iter()
            .map(|(tok, _)| tok)
            .collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let tokens = lex("struct Foo { int x; };");
        assert_eq!(tokens[0], Token::Struct);
        assert_eq!(tokens[1], Token::Identifier("Foo".to_string()));
        assert_eq!(tokens[2], Token::LeftBrace);
        assert_eq!(tokens[3], Token::Identifier("int".to_string()));
        assert_eq!(tokens.last(), Some(&Token::Eof));
    }

    #[test]
    fn test_numbers_keep_spelling() {
        let tokens = lex("0x1F 1'000 10u 1.5f .25 1e3 0x1p4");
        assert_eq!(tokens[0], Token::IntLiteral("0x1F".to_string()));
        assert_eq!(tokens[1], Token::IntLiteral("1'000".to_string()));
        assert_eq!(tokens[2], Token::IntLiteral("10u".to_string()));
        assert_eq!(tokens[3], Token::FloatLiteral("1.5f".to_string()));
        assert_eq!(tokens[4], Token::FloatLiteral(".25".to_string()));
        assert_eq!(tokens[5], Token::FloatLiteral("1e3".to_string()));
        assert_eq!(tokens[6], Token::FloatLiteral("0x1p4".to_string()));
    }

    #[test]
    fn test_multi_digit_fractions_and_binary() {
        let tokens = lex("0.25 3.14159f .125 12.75e2 1'000.000'5 0b1010 0b1'0 42.");
        assert_eq!(tokens[0], Token::FloatLiteral("0.25".to_string()));
        assert_eq!(tokens[1], Token::FloatLiteral("3.14159f".to_string()));
        assert_eq!(tokens[2], Token::FloatLiteral(".125".to_string()));
        assert_eq!(tokens[3], Token::FloatLiteral("12.75e2".to_string()));
        assert_eq!(tokens[4], Token::FloatLiteral("1'000.000'5".to_string()));
        assert_eq!(tokens[5], Token::IntLiteral("0b1010".to_string()));
        assert_eq!(tokens[6], Token::IntLiteral("0b1'0".to_string()));
        assert_eq!(tokens[7], Token::FloatLiteral("42.".to_string()));
        assert_eq!(tokens[8], Token::Eof);
    }

    #[test]
    fn test_float_member_initializer_lexes() {
        let tokens = lex("float x = 0.25f;");
        assert_eq!(tokens[3], Token::FloatLiteral("0.25f".to_string()));
        assert_eq!(tokens[4], Token::Semicolon);
    }

    #[test]
    fn test_string_escapes_are_verbatim() {
        let tokens = lex(r#""say \"hi\"""#);
        assert_eq!(tokens[0], Token::StringLiteral(r#"say \"hi\""#.to_string()));
    }

    #[test]
    fn test_directives_and_comments_skipped() {
        let source = "#pragma once\n#define META \\\n  clang::annotate(\"meta\")\n// note\n/* block */ struct A;";
        let tokens = lex(source);
        assert_eq!(tokens[0], Token::Struct);
        assert_eq!(tokens[1], Token::Identifier("A".to_string()));
    }

    #[test]
    fn test_scope_and_attribute_tokens() {
        let tokens = lex("[[clang::annotate(\"x\")]] __attribute__((annotate(\"y\")))");
        assert_eq!(tokens[0], Token::LeftBracket);
        assert_eq!(tokens[1], Token::LeftBracket);
        assert_eq!(tokens[3], Token::ColonColon);
        assert!(tokens.contains(&Token::GnuAttribute));
    }

    #[test]
    fn test_line_and_column_tracking() {
        let tokens = Lexer::new("struct A;\n  int b;").tokenize().expect("should lex");
        let (_, span) = &tokens[3];
        assert_eq!(span.line, 2);
        assert_eq!(span.column, 3);
    }

    #[test]
    fn test_unterminated_string() {
        let errors = Lexer::new("INFO(\"oops)\n").tokenize().unwrap_err();
        assert!(matches!(errors[0], LexError::UnterminatedString { .. }));
        assert!(errors[0].hint().is_some());
    }
}
