//! Recursive descent parser for the declaration subset of C++.
//!
//! The parser understands enough of the language to build a faithful
//! declaration tree: namespaces, class/struct/union definitions with base
//! clauses and access specifiers, template heads, data members, variables
//! and annotations. Function bodies, initializers and other expressions are
//! skipped as balanced token groups.
//!
//! Parsing is error tolerant: a malformed declaration is recorded and the
//! parser resynchronizes at the next `;` or closing brace.

pub mod attrs;
pub mod decl;
pub mod error;
pub mod guards;
pub mod recovery;

use crate::parser::ast::{Decl, DeclKind, RecordTag};
use crate::parser::lexer::{LexError, Lexer};
use crate::parser::token::{Span, Token};

pub use error::{ParseError, ParseErrorKind};

/// Kind of scope whose member list is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Translation unit, namespace body or linkage block
    Namespace,

    /// Body of a class, struct or union
    Record(RecordTag),
}

/// Parser state.
pub struct Parser {
    /// Pre-tokenized input, always terminated by `Token::Eof`
    tokens: Vec<(Token, Span)>,

    /// Current position in token stream
    pos: usize,

    /// Accumulated parse errors
    errors: Vec<ParseError>,

    /// Current scope nesting depth
    depth: usize,
}

impl Parser {
    /// Create a new parser from source code.
    pub fn new(source: &str) -> Result<Self, Vec<LexError>> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self::from_tokens(tokens))
    }

    /// Create a parser over an already tokenized input.
    pub fn from_tokens(mut tokens: Vec<(Token, Span)>) -> Self {
        if !matches!(tokens.last(), Some((Token::Eof, _))) {
            let eof_span = match tokens.last() {
                Some((_, last)) => Span::new(last.end, last.end, last.line, last.column),
                None => Span::new(0, 0, 1, 1),
            };
            tokens.push((Token::Eof, eof_span));
        }

        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            depth: 0,
        }
    }

    /// Parse the whole input into a translation unit.
    ///
    /// Returns all accumulated errors if any declaration failed to parse.
    pub fn parse(self) -> Result<Decl, Vec<ParseError>> {
        let (unit, errors) = self.parse_lenient();
        if errors.is_empty() {
            Ok(unit)
        } else {
            Err(errors)
        }
    }

    /// Parse the whole input, keeping every declaration that parsed even if
    /// others did not.
    pub fn parse_lenient(mut self) -> (Decl, Vec<ParseError>) {
        let start = self.current_span();
        let children = decl::parse_translation_unit(&mut self);
        let end = self.current_span();

        let unit = Decl::new(DeclKind::TranslationUnit, "", start.merge(&end))
            .with_children(children);
        (unit, self.errors)
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.tokens[self.pos].1
    }

    /// Look `n` tokens ahead of the current one (`peek_nth(0)` is current).
    #[inline]
    pub fn peek_nth(&self, n: usize) -> &Token {
        let index = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[index].0
    }

    /// Peek at the next token.
    #[inline]
    pub fn peek(&self) -> &Token {
        self.peek_nth(1)
    }

    /// Advance to the next token, returning the previous current token.
    pub fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].0.clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    /// Current position in the token stream.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Check if the current token has the same kind as `expected`.
    #[inline]
    pub fn check(&self, expected: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(expected)
    }

    /// Check if the current token is the identifier `word`.
    #[inline]
    pub fn check_ident(&self, word: &str) -> bool {
        matches!(self.current(), Token::Identifier(name) if name == word)
    }

    #[inline]
    pub fn at_eof(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    /// Consume the current token if it matches the expected kind.
    pub fn consume(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the current token if it matches the expected kind, or fail.
    pub fn expect(&mut self, expected: Token) -> Result<Span, ParseError> {
        if self.check(&expected) {
            let span = self.current_span();
            self.advance();
            Ok(span)
        } else {
            Err(self.unexpected_token(vec![expected]))
        }
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    /// Record a non-fatal error and keep parsing.
    pub fn record_error(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Build an "unexpected token" error at the current position.
    pub fn unexpected_token(&self, expected: Vec<Token>) -> ParseError {
        let span = self.current_span();
        if self.at_eof() {
            ParseError::unexpected_eof(expected, span)
        } else {
            ParseError::unexpected_token(expected, self.current().clone(), span)
        }
    }

    // ========================================================================
    // Scope Depth
    // ========================================================================

    /// Enter a nested scope, failing past the nesting limit.
    pub fn enter_scope(&mut self, name: &'static str) -> Result<(), ParseError> {
        guards::check_depth(self.depth, name, self.current_span())?;
        self.depth += 1;
        Ok(())
    }

    pub fn exit_scope(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // ========================================================================
    // Skipping
    // ========================================================================

    /// Skip a balanced `(...)`, `[...]` or `{...}` group starting at the
    /// current token. Does nothing if the current token opens no group.
    pub fn skip_balanced(&mut self) -> Result<(), ParseError> {
        let open = self.current().clone();
        let open_span = self.current_span();
        let close = match closer_for(&open) {
            Some(close) => close,
            None => return Ok(()),
        };

        let mut stack = vec![close];
        self.advance();
        let mut guard = guards::LoopGuard::new("skip_balanced");

        while let Some(expected) = stack.last() {
            guard.check()?;
            if self.at_eof() {
                return Err(ParseError::unclosed_delimiter(open, expected.clone(), open_span));
            }
            let tok = self.current().clone();
            if let Some(close) = closer_for(&tok) {
                stack.push(close);
            } else if matches!(tok, Token::RightParen | Token::RightBracket | Token::RightBrace) {
                // A mismatched closer ends every group it could close.
                while let Some(top) = stack.pop() {
                    if top == tok {
                        break;
                    }
                }
            }
            self.advance();
        }
        Ok(())
    }

    /// Skip a template argument list starting at the current `<`.
    pub fn skip_angle_group(&mut self) -> Result<(), ParseError> {
        let open_span = self.current_span();
        if !self.consume(&Token::Less) {
            return Ok(());
        }

        let mut depth = 1usize;
        let mut guard = guards::LoopGuard::new("skip_angle_group");
        while depth > 0 {
            guard.check()?;
            match self.current() {
                Token::Less => {
                    depth += 1;
                    self.advance();
                }
                Token::Greater => {
                    depth -= 1;
                    self.advance();
                }
                Token::LeftParen | Token::LeftBracket | Token::LeftBrace => self.skip_balanced()?,
                Token::Semicolon | Token::RightBrace | Token::Eof => {
                    return Err(ParseError::unclosed_delimiter(
                        Token::Less,
                        Token::Greater,
                        open_span,
                    ));
                }
                _ => {
                    self.advance();
                }
            }
        }
        Ok(())
    }

    /// Source text of the tokens in `[start, end)`, re-spaced so that
    /// adjacent words are separated and every comma is followed by a space.
    pub fn text_between(&self, start: usize, end: usize) -> String {
        let end = end.min(self.tokens.len());
        let mut text = String::new();
        let mut prev_word = false;
        for (tok, _) in &self.tokens[start.min(end)..end] {
            if matches!(tok, Token::Eof) {
                break;
            }
            let word = is_word(tok);
            if word && prev_word {
                text.push(' ');
            }
            text.push_str(&tok.to_string());
            if matches!(tok, Token::Comma) {
                text.push(' ');
            }
            prev_word = word;
        }
        text.truncate(text.trim_end().len());
        text
    }

    /// Span covering the tokens from `start` up to the current position.
    pub fn span_from(&self, start: Span) -> Span {
        let end = if self.pos > 0 {
            self.tokens[self.pos - 1].1
        } else {
            start
        };
        start.merge(&end)
    }
}

fn closer_for(token: &Token) -> Option<Token> {
    match token {
        Token::LeftParen => Some(Token::RightParen),
        Token::LeftBracket => Some(Token::RightBracket),
        Token::LeftBrace => Some(Token::RightBrace),
        _ => None,
    }
}

fn is_word(token: &Token) -> bool {
    !matches!(
        token,
        Token::ColonColon
            | Token::Colon
            | Token::Semicolon
            | Token::Comma
            | Token::Ellipsis
            | Token::Arrow
            | Token::LeftParen
            | Token::RightParen
            | Token::LeftBrace
            | Token::RightBrace
            | Token::LeftBracket
            | Token::RightBracket
            | Token::Less
            | Token::Greater
            | Token::Equal
            | Token::Star
            | Token::Amp
            | Token::AmpAmp
            | Token::Tilde
            | Token::Minus
            | Token::Plus
            | Token::Dot
            | Token::Punct(_)
            | Token::Eof
    )
}
