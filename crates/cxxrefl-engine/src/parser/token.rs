//! Token definitions for the C++ declaration subset.
//!
//! Only the keywords that change the shape of a declaration are modeled as
//! dedicated tokens. Type keywords (`int`, `unsigned`, `const`, ...) lex as
//! identifiers because the parser never needs to interpret them.

use std::fmt;

/// A token in a C++ source file.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Declaration keywords
    Namespace,
    Class,
    Struct,
    Union,
    Enum,
    Template,
    Typename,
    Using,
    Typedef,
    Friend,
    Extern,
    Inline,
    Static,
    Virtual,
    Operator,
    StaticAssert,

    // Access keywords
    Public,
    Protected,
    Private,

    // GNU attribute keyword
    GnuAttribute,

    // Literals (numeric literals keep their source text)
    IntLiteral(String),
    FloatLiteral(String),
    StringLiteral(String),
    CharLiteral(String),

    // Identifiers
    Identifier(String),

    // Punctuation
    ColonColon,
    Colon,
    Semicolon,
    Comma,
    Ellipsis,
    Arrow,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Less,
    Greater,
    Equal,
    Star,
    Amp,
    AmpAmp,
    Tilde,
    Minus,
    Plus,
    Dot,

    /// Any other operator character
    Punct(char),

    // Special
    Eof,
}

impl Token {
    /// `public`, `protected` or `private`.
    pub fn is_access_keyword(&self) -> bool {
        matches!(self, Token::Public | Token::Protected | Token::Private)
    }

    /// Class-key tokens.
    pub fn is_class_key(&self) -> bool {
        matches!(self, Token::Class | Token::Struct | Token::Union)
    }
}

/// Source location information for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line.min(other.line),
            column: if self.line <= other.line {
                self.column
            } else {
                other.column
            },
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Namespace => write!(f, "namespace"),
            Token::Class => write!(f, "class"),
            Token::Struct => write!(f, "struct"),
            Token::Union => write!(f, "union"),
            Token::Enum => write!(f, "enum"),
            Token::Template => write!(f, "template"),
            Token::Typename => write!(f, "typename"),
            Token::Using => write!(f, "using"),
            Token::Typedef => write!(f, "typedef"),
            Token::Friend => write!(f, "friend"),
            Token::Extern => write!(f, "extern"),
            Token::Inline => write!(f, "inline"),
            Token::Static => write!(f, "static"),
            Token::Virtual => write!(f, "virtual"),
            Token::Operator => write!(f, "operator"),
            Token::StaticAssert => write!(f, "static_assert"),
            Token::Public => write!(f, "public"),
            Token::Protected => write!(f, "protected"),
            Token::Private => write!(f, "private"),
            Token::GnuAttribute => write!(f, "__attribute__"),
            Token::IntLiteral(text) | Token::FloatLiteral(text) => write!(f, "{}", text),
            Token::StringLiteral(text) => write!(f, "\"{}\"", text),
            Token::CharLiteral(text) => write!(f, "'{}'", text),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::ColonColon => write!(f, "::"),
            Token::Colon => write!(f, ":"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Ellipsis => write!(f, "..."),
            Token::Arrow => write!(f, "->"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Less => write!(f, "<"),
            Token::Greater => write!(f, ">"),
            Token::Equal => write!(f, "="),
            Token::Star => write!(f, "*"),
            Token::Amp => write!(f, "&"),
            Token::AmpAmp => write!(f, "&&"),
            Token::Tilde => write!(f, "~"),
            Token::Minus => write!(f, "-"),
            Token::Plus => write!(f, "+"),
            Token::Dot => write!(f, "."),
            Token::Punct(c) => write!(f, "{}", c),
            Token::Eof => write!(f, "<eof>"),
        }
    }
}
