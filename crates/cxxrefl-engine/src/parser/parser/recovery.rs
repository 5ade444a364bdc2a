//! Error recovery for the declaration parser.
//!
//! After a malformed declaration the parser skips ahead to a point where
//! member parsing can resume, so one bad declaration does not hide the
//! rest of the file.

use super::guards::LoopGuard;
use super::Parser;
use crate::parser::token::Token;

/// Synchronize to the next declaration boundary.
///
/// Balanced groups are skipped whole. Stops after a `;`, or before a `}`
/// that closes the enclosing scope.
pub fn sync_to_declaration_boundary(parser: &mut Parser) {
    let mut guard = LoopGuard::new("declaration_recovery");

    while !parser.at_eof() {
        if guard.check().is_err() {
            return;
        }

        match parser.current() {
            Token::Semicolon => {
                parser.advance();
                return;
            }
            Token::RightBrace => return,
            Token::LeftParen | Token::LeftBracket | Token::LeftBrace => {
                if parser.skip_balanced().is_err() {
                    return;
                }
            }
            _ => {
                parser.advance();
            }
        }
    }
}
