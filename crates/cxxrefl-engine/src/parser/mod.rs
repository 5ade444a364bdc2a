//! C++ declaration front-end
//!
//! Lexes and parses a header into a [`Decl`] tree carrying the annotations
//! written on each declaration.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{
    AccessSpecifier, Annotation, AnnotationArg, BaseSpecifier, Decl, DeclKind, RecordDecl,
    RecordTag, Visitor,
};
pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, ParseErrorKind, Parser};
pub use token::{Span, Token};
