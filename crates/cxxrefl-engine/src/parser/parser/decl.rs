//! Declaration parsing
//!
//! Member declarations are parsed with a single left-to-right pass over
//! decl-specifiers and declarators. The last plain identifier before a
//! declarator boundary is the declared name; `(` after a name makes the
//! declarator a function unless it introduces a parenthesized pointer
//! declarator. Initializers, bit-field widths, parameter lists and bodies
//! are skipped as balanced groups.

use super::attrs::{at_attribute_specifier, parse_attribute_specifiers};
use super::guards::LoopGuard;
use super::recovery::sync_to_declaration_boundary;
use super::{ParseError, Parser, Scope};
use crate::parser::ast::{
    AccessSpecifier, Annotation, BaseSpecifier, Decl, DeclKind, RecordDecl, RecordTag,
};
use crate::parser::token::{Span, Token};

/// Parse top-level declarations until EOF, reporting unmatched `}`.
pub fn parse_translation_unit(parser: &mut Parser) -> Vec<Decl> {
    let mut members = Vec::new();
    loop {
        members.extend(parse_members(parser, Scope::Namespace));
        if parser.at_eof() {
            break;
        }
        parser.record_error(
            ParseError::invalid_syntax("unmatched `}`", parser.current_span())
                .with_suggestion("remove the extra closing brace"),
        );
        parser.advance();
    }
    members
}

/// Parse declarations until EOF or the `}` closing the current scope.
///
/// The closing brace itself is left for the caller.
pub fn parse_members(parser: &mut Parser, scope: Scope) -> Vec<Decl> {
    let mut members = Vec::new();
    let mut guard = LoopGuard::new("members");

    while !parser.at_eof() && !parser.check(&Token::RightBrace) {
        if let Err(err) = guard.check() {
            parser.record_error(err);
            break;
        }

        let before = parser.position();
        match parse_declaration(parser, scope) {
            Ok(decls) => members.extend(decls),
            Err(err) => {
                parser.record_error(err);
                sync_to_declaration_boundary(parser);
            }
        }

        if parser.position() == before && !parser.check(&Token::RightBrace) {
            parser.advance();
        }
    }

    members
}

/// Parse one declaration. A single declaration can yield several nodes,
/// e.g. `struct S { } a, b;` yields the record followed by two variables.
pub fn parse_declaration(parser: &mut Parser, scope: Scope) -> Result<Vec<Decl>, ParseError> {
    let start = parser.current_span();

    if parser.current().is_access_keyword() && matches!(parser.peek(), Token::Colon) {
        return parse_access_spec(parser, scope, start).map(|decl| vec![decl]);
    }

    let leading = parse_attribute_specifiers(parser)?;

    match parser.current() {
        Token::Semicolon => {
            parser.advance();
            Ok(Vec::new())
        }
        Token::Namespace => parse_namespace(parser, start).map(|decl| vec![decl]),
        Token::Inline if matches!(parser.peek(), Token::Namespace) => {
            parser.advance();
            parse_namespace(parser, start).map(|decl| vec![decl])
        }
        Token::Template => parse_template(parser, scope, start).map(|decl| vec![decl]),
        Token::Extern if matches!(parser.peek(), Token::StringLiteral(_)) => {
            parse_linkage_spec(parser, scope, start).map(|decl| vec![decl])
        }
        Token::Extern if matches!(parser.peek(), Token::Template) => {
            skip_to_semicolon(parser)?;
            Ok(vec![Decl::new(DeclKind::Other, "", parser.span_from(start))])
        }
        Token::Using => parse_using(parser, start).map(|decl| vec![decl]),
        Token::Typedef => {
            parser.advance();
            parse_simple_declaration(parser, scope, leading, Flavor::Typedef, start)
        }
        Token::Friend => {
            parser.advance();
            parse_simple_declaration(parser, scope, Vec::new(), Flavor::Friend, start)
        }
        Token::StaticAssert => {
            parser.advance();
            parser.skip_balanced()?;
            parser.expect(Token::Semicolon)?;
            Ok(vec![Decl::new(
                DeclKind::Other,
                "static_assert",
                parser.span_from(start),
            )])
        }
        _ => parse_simple_declaration(parser, scope, leading, Flavor::Plain, start),
    }
}

fn parse_access_spec(parser: &mut Parser, scope: Scope, start: Span) -> Result<Decl, ParseError> {
    if scope == Scope::Namespace {
        return Err(ParseError::invalid_syntax(
            "access specifier outside of a class body",
            start,
        ));
    }

    let access = match parser.advance() {
        Token::Public => AccessSpecifier::Public,
        Token::Protected => AccessSpecifier::Protected,
        _ => AccessSpecifier::Private,
    };
    parser.expect(Token::Colon)?;
    Ok(Decl::new(
        DeclKind::AccessSpec(access),
        "",
        parser.span_from(start),
    ))
}

/// `namespace a::b { ... }`, `namespace { ... }` or `namespace x = y;`
fn parse_namespace(parser: &mut Parser, start: Span) -> Result<Decl, ParseError> {
    parser.expect(Token::Namespace)?;
    parse_attribute_specifiers(parser)?;

    let mut path = Vec::new();
    while let Token::Identifier(name) = parser.current() {
        path.push(name.clone());
        parser.advance();
        if !parser.consume(&Token::ColonColon) {
            break;
        }
        parser.consume(&Token::Inline);
    }
    parse_attribute_specifiers(parser)?;

    if parser.consume(&Token::Equal) {
        skip_to_semicolon(parser)?;
        let name = path.pop().unwrap_or_default();
        return Ok(Decl::new(DeclKind::TypeAlias, name, parser.span_from(start)));
    }

    parser.expect(Token::LeftBrace)?;
    parser.enter_scope("namespace")?;
    let members = parse_members(parser, Scope::Namespace);
    parser.exit_scope();
    if !parser.consume(&Token::RightBrace) {
        parser.record_error(parser.unexpected_token(vec![Token::RightBrace]));
    }

    let span = parser.span_from(start);
    if path.is_empty() {
        path.push(String::new());
    }

    // `namespace a::b { }` is `namespace a { namespace b { } }`
    let mut names = path.into_iter().rev();
    let innermost = names.next().unwrap_or_default();
    let mut decl = Decl::new(DeclKind::Namespace, innermost, span).with_children(members);
    for name in names {
        decl = Decl::new(DeclKind::Namespace, name, span).with_children(vec![decl]);
    }
    Ok(decl)
}

/// `template <params> declaration`, or an explicit instantiation.
fn parse_template(parser: &mut Parser, scope: Scope, start: Span) -> Result<Decl, ParseError> {
    parser.expect(Token::Template)?;

    if !parser.check(&Token::Less) {
        // explicit instantiation: `template class X<int>;`
        skip_to_semicolon(parser)?;
        return Ok(Decl::new(DeclKind::Other, "", parser.span_from(start)));
    }

    let params = parse_template_params(parser)?;
    if parser.check_ident("requires") {
        skip_requires_clause(parser)?;
    }

    parser.enter_scope("template")?;
    let inner = parse_declaration(parser, scope);
    parser.exit_scope();
    let inner = inner?;

    let name = inner
        .first()
        .map(|decl| decl.name().to_string())
        .unwrap_or_default();
    let mut children = params;
    children.extend(inner);
    Ok(Decl::new(DeclKind::Template, name, parser.span_from(start)).with_children(children))
}

/// Parse `<...>` of a template head into parameter nodes.
fn parse_template_params(parser: &mut Parser) -> Result<Vec<Decl>, ParseError> {
    let open_span = parser.expect(Token::Less)?;
    let mut params = Vec::new();
    let mut tokens: Vec<(Token, Span)> = Vec::new();
    let mut depth = 0usize;
    let mut guard = LoopGuard::new("template_params");

    loop {
        guard.check()?;
        match parser.current() {
            Token::Greater if depth == 0 => {
                params.extend(template_param(&tokens));
                parser.advance();
                break;
            }
            Token::Comma if depth == 0 => {
                params.extend(template_param(&tokens));
                tokens.clear();
                parser.advance();
                continue;
            }
            Token::Less => depth += 1,
            Token::Greater => depth -= 1,
            Token::LeftParen | Token::LeftBracket | Token::LeftBrace => {
                let span = parser.current_span();
                parser.skip_balanced()?;
                tokens.push((Token::Punct('#'), span));
                continue;
            }
            Token::Semicolon | Token::RightBrace | Token::Eof => {
                return Err(ParseError::unclosed_delimiter(
                    Token::Less,
                    Token::Greater,
                    open_span,
                ));
            }
            _ => {}
        }
        let span = parser.current_span();
        tokens.push((parser.advance(), span));
    }

    Ok(params)
}

/// Build the node for one template parameter from its tokens.
fn template_param(tokens: &[(Token, Span)]) -> Option<Decl> {
    let (first, span) = tokens.first()?;

    // Only the part before a default argument names the parameter.
    let head_len = tokens
        .iter()
        .position(|(tok, _)| matches!(tok, Token::Equal))
        .unwrap_or(tokens.len());
    let head = &tokens[..head_len];

    let last_identifier = || {
        head.iter()
            .rev()
            .find_map(|(tok, _)| match tok {
                Token::Identifier(name) if !is_specifier_word(name) => Some(name.clone()),
                _ => None,
            })
            .unwrap_or_default()
    };

    let kind = match first {
        Token::Typename | Token::Class => DeclKind::TemplateTypeParam,
        _ => DeclKind::TemplateParam,
    };

    let name = match kind {
        DeclKind::TemplateTypeParam => head
            .iter()
            .skip(1)
            .find_map(|(tok, _)| match tok {
                Token::Identifier(name) => Some(name.clone()),
                _ => None,
            })
            .unwrap_or_default(),
        _ => last_identifier(),
    };

    Some(Decl::new(kind, name, *span))
}

/// Skip a `requires` clause: primaries joined by `&&` or `||`.
fn skip_requires_clause(parser: &mut Parser) -> Result<(), ParseError> {
    parser.advance();
    let mut guard = LoopGuard::new("requires_clause");
    loop {
        guard.check()?;
        match parser.current() {
            Token::LeftParen => parser.skip_balanced()?,
            Token::Identifier(_) | Token::ColonColon | Token::Typename => {
                parser.advance();
                if parser.check(&Token::Less) {
                    parser.skip_angle_group()?;
                }
                continue;
            }
            Token::Punct('!') => {
                parser.advance();
                continue;
            }
            _ => {}
        }

        let or = matches!(parser.current(), Token::Punct('|'))
            && matches!(parser.peek(), Token::Punct('|'));
        if or {
            parser.advance();
            parser.advance();
        } else if !parser.consume(&Token::AmpAmp) {
            return Ok(());
        }
    }
}

/// `extern "C" { ... }` or `extern "C" declaration`
fn parse_linkage_spec(parser: &mut Parser, scope: Scope, start: Span) -> Result<Decl, ParseError> {
    parser.expect(Token::Extern)?;
    let language = match parser.advance() {
        Token::StringLiteral(language) => language,
        _ => String::new(),
    };

    let children = if parser.consume(&Token::LeftBrace) {
        parser.enter_scope("linkage specification")?;
        let members = parse_members(parser, scope);
        parser.exit_scope();
        if !parser.consume(&Token::RightBrace) {
            parser.record_error(parser.unexpected_token(vec![Token::RightBrace]));
        }
        members
    } else {
        parse_declaration(parser, scope)?
    };

    Ok(Decl::new(DeclKind::LinkageSpec, language, parser.span_from(start)).with_children(children))
}

/// `using namespace x;`, `using X = type;` or `using Base::member;`
fn parse_using(parser: &mut Parser, start: Span) -> Result<Decl, ParseError> {
    parser.expect(Token::Using)?;
    let mut name = String::new();
    let mut guard = LoopGuard::new("using");

    loop {
        guard.check()?;
        if at_attribute_specifier(parser) {
            parse_attribute_specifiers(parser)?;
            continue;
        }
        match parser.current() {
            Token::Identifier(id) => {
                name = id.clone();
                parser.advance();
            }
            Token::Equal => {
                parser.advance();
                skip_to_semicolon(parser)?;
                break;
            }
            Token::Semicolon => {
                parser.advance();
                break;
            }
            Token::Less => parser.skip_angle_group()?,
            Token::LeftParen | Token::LeftBracket | Token::LeftBrace => parser.skip_balanced()?,
            Token::RightBrace | Token::Eof => {
                return Err(parser.unexpected_token(vec![Token::Semicolon]));
            }
            _ => {
                parser.advance();
            }
        }
    }

    Ok(Decl::new(DeclKind::TypeAlias, name, parser.span_from(start)))
}

/// Skip to and past the next `;`, skipping balanced groups.
fn skip_to_semicolon(parser: &mut Parser) -> Result<(), ParseError> {
    let mut guard = LoopGuard::new("skip_to_semicolon");
    loop {
        guard.check()?;
        match parser.current() {
            Token::Semicolon => {
                parser.advance();
                return Ok(());
            }
            Token::LeftParen | Token::LeftBracket | Token::LeftBrace => parser.skip_balanced()?,
            Token::RightBrace | Token::Eof => {
                return Err(parser.unexpected_token(vec![Token::Semicolon]));
            }
            _ => {
                parser.advance();
            }
        }
    }
}

/// Skip an initializer or bit-field width.
///
/// Stops before `,`, `;` or `}` at nesting depth zero; with
/// `stop_at_initializer` also before `=` and `{` (a bit-field may be
/// followed by a default member initializer).
fn skip_expression(parser: &mut Parser, stop_at_initializer: bool) -> Result<(), ParseError> {
    let mut guard = LoopGuard::new("skip_expression");
    loop {
        guard.check()?;
        match parser.current() {
            Token::Comma | Token::Semicolon | Token::RightBrace | Token::Eof => return Ok(()),
            Token::Equal | Token::LeftBrace if stop_at_initializer => return Ok(()),
            Token::LeftParen | Token::LeftBracket | Token::LeftBrace => parser.skip_balanced()?,
            _ => {
                parser.advance();
            }
        }
    }
}

/// Skip `a(x), b{y}, Base<T>(z)` after the `:` of a constructor.
fn skip_ctor_initializers(parser: &mut Parser) -> Result<(), ParseError> {
    let mut guard = LoopGuard::new("ctor_initializers");
    loop {
        guard.check()?;
        match parser.current() {
            Token::Identifier(_) | Token::ColonColon | Token::Template | Token::Typename => {
                parser.advance();
            }
            Token::Less => parser.skip_angle_group()?,
            Token::LeftParen | Token::LeftBrace => {
                parser.skip_balanced()?;
                parser.consume(&Token::Ellipsis);
                if !parser.consume(&Token::Comma) {
                    return Ok(());
                }
            }
            _ => return Ok(()),
        }
    }
}

/// Words that never name the declared entity.
fn is_specifier_word(word: &str) -> bool {
    matches!(
        word,
        "const"
            | "volatile"
            | "mutable"
            | "constexpr"
            | "consteval"
            | "constinit"
            | "thread_local"
            | "register"
            | "explicit"
            | "auto"
            | "void"
            | "bool"
            | "char"
            | "char8_t"
            | "char16_t"
            | "char32_t"
            | "wchar_t"
            | "short"
            | "int"
            | "long"
            | "signed"
            | "unsigned"
            | "float"
            | "double"
            | "__int128"
            | "restrict"
            | "__restrict"
            | "__restrict__"
    )
}

/// Words allowed between a function's parameter list and its end.
fn is_function_trailer(word: &str) -> bool {
    matches!(
        word,
        "const" | "volatile" | "noexcept" | "override" | "final" | "throw" | "requires" | "try"
    )
}

/// Call-like type specifiers whose argument is skipped.
fn is_call_like_type(word: &str) -> bool {
    matches!(
        word,
        "decltype" | "typeof" | "__typeof__" | "__typeof" | "_Atomic" | "__underlying_type"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Plain,
    Typedef,
    Friend,
}

/// How a declaration ended.
enum End {
    /// `;`, or the closing brace of a function body
    Complete,

    /// Ran into a token that starts another declaration (macro invocations
    /// without a trailing `;`)
    Abrupt,
}

/// Declarator under construction.
#[derive(Default)]
struct Declarator {
    name: Option<(String, Span)>,
    annotations: Vec<Annotation>,
    is_function: bool,
    pointer: bool,
    skipping_trailer: bool,
}

impl Declarator {
    fn into_decl(
        self,
        scope: Scope,
        flavor: Flavor,
        is_static: bool,
        leading: &[Annotation],
    ) -> Option<Decl> {
        let (name, span) = self.name?;
        let kind = match flavor {
            Flavor::Typedef => DeclKind::TypeAlias,
            Flavor::Friend => DeclKind::Other,
            Flavor::Plain if self.is_function => DeclKind::Function,
            Flavor::Plain => match scope {
                Scope::Record(_) if !is_static => DeclKind::Field,
                _ => DeclKind::Var { is_static },
            },
        };

        let mut annotations = leading.to_vec();
        annotations.extend(self.annotations);
        Some(Decl::new(kind, name, span).with_annotations(annotations))
    }
}

enum TypeSpecifier {
    /// A class or enum body was defined here
    Definition(Decl),

    /// Only the name was used (`struct S;`, `struct S *p;`)
    Elaborated(String),
}

fn parse_simple_declaration(
    parser: &mut Parser,
    scope: Scope,
    leading: Vec<Annotation>,
    flavor: Flavor,
    start: Span,
) -> Result<Vec<Decl>, ParseError> {
    let mut is_static = false;
    let mut embedded = Vec::new();
    let mut elaborated = None;
    let mut declarators = Vec::new();
    let mut current = Declarator::default();
    let mut guard = LoopGuard::new("declaration");

    let end = loop {
        guard.check()?;

        if at_attribute_specifier(parser) {
            let found = parse_attribute_specifiers(parser)?;
            current.annotations.extend(found);
            continue;
        }

        match parser.current().clone() {
            Token::Semicolon => {
                parser.advance();
                break End::Complete;
            }
            Token::Comma if !current.skipping_trailer => {
                parser.advance();
                let finished = std::mem::take(&mut current);
                declarators.extend(finished.into_decl(scope, flavor, is_static, &leading));
            }
            Token::Eof => return Err(parser.unexpected_token(vec![Token::Semicolon])),
            Token::RightBrace
            | Token::Namespace
            | Token::Using
            | Token::Typedef
            | Token::StaticAssert => break End::Abrupt,
            tok if tok.is_access_keyword() && matches!(parser.peek(), Token::Colon) => {
                break End::Abrupt;
            }
            Token::Static => {
                is_static = true;
                parser.advance();
            }
            Token::Class | Token::Struct | Token::Union
                if current.name.is_none() && !current.is_function =>
            {
                match parse_class_specifier(parser)? {
                    TypeSpecifier::Definition(decl) => embedded.push(decl),
                    TypeSpecifier::Elaborated(name) => elaborated = Some(name),
                }
            }
            Token::Enum if current.name.is_none() && !current.is_function => {
                match parse_enum_specifier(parser)? {
                    TypeSpecifier::Definition(decl) => embedded.push(decl),
                    TypeSpecifier::Elaborated(name) => elaborated = Some(name),
                }
            }
            Token::Identifier(word) => {
                if current.skipping_trailer {
                    parser.advance();
                } else if current.is_function {
                    if !is_function_trailer(&word) {
                        break End::Abrupt;
                    }
                    parser.advance();
                    if word == "requires" {
                        current.skipping_trailer = true;
                    } else if parser.check(&Token::LeftParen) {
                        parser.skip_balanced()?;
                    }
                } else if is_call_like_type(&word) {
                    parser.advance();
                    parser.skip_balanced()?;
                } else if is_specifier_word(&word) {
                    parser.advance();
                } else {
                    let span = parser.current_span();
                    parser.advance();
                    current.name = Some((word, span));
                    if parser.check(&Token::Less) {
                        parser.skip_angle_group()?;
                    }
                }
            }
            Token::Operator if !current.is_function => {
                let span = parser.current_span();
                let name = parse_operator_name(parser)?;
                current.name = Some((name, span));
            }
            Token::Tilde
                if !current.is_function && matches!(parser.peek(), Token::Identifier(_)) =>
            {
                let span = parser.current_span();
                parser.advance();
                if let Token::Identifier(class_name) = parser.advance() {
                    current.name = Some((format!("~{}", class_name), span));
                }
            }
            Token::Less => parser.skip_angle_group()?,
            Token::LeftParen => {
                if current.skipping_trailer || current.is_function || current.pointer {
                    parser.skip_balanced()?;
                } else if current.name.is_none() || paren_declarator_ahead(parser) {
                    parse_paren_declarator(parser, &mut current)?;
                } else {
                    parser.skip_balanced()?;
                    current.is_function = true;
                }
            }
            Token::LeftBracket => parser.skip_balanced()?,
            Token::Colon => {
                parser.advance();
                if current.is_function {
                    skip_ctor_initializers(parser)?;
                } else {
                    skip_expression(parser, true)?;
                }
            }
            Token::Equal => {
                parser.advance();
                skip_expression(parser, false)?;
            }
            Token::LeftBrace => {
                parser.skip_balanced()?;
                if current.is_function {
                    break End::Complete;
                }
            }
            Token::Arrow => {
                if current.is_function {
                    current.skipping_trailer = true;
                }
                parser.advance();
            }
            _ => {
                parser.advance();
            }
        }
    };

    match end {
        End::Complete => {
            declarators.extend(current.into_decl(scope, flavor, is_static, &leading));
        }
        End::Abrupt => {
            if let Some((name, span)) = current.name {
                declarators.push(Decl::new(DeclKind::Other, name, span));
            }
        }
    }

    let mut decls = embedded;
    decls.extend(declarators);
    if decls.is_empty() {
        if let Some(name) = elaborated {
            // forward declaration or elaborated use
            decls.push(Decl::new(DeclKind::Other, name, parser.span_from(start)));
        }
    }
    Ok(decls)
}

/// `(*name)`, `(&name)` or `(Class::*name)` ahead of the current `(`.
fn paren_declarator_ahead(parser: &Parser) -> bool {
    match parser.peek() {
        Token::Star | Token::Amp | Token::AmpAmp | Token::Punct('^') => true,
        Token::Identifier(_) => {
            matches!(parser.peek_nth(2), Token::ColonColon)
                && matches!(parser.peek_nth(3), Token::Star)
        }
        _ => false,
    }
}

/// Parse a parenthesized declarator, taking its name from the outermost
/// parentheses.
fn parse_paren_declarator(parser: &mut Parser, current: &mut Declarator) -> Result<(), ParseError> {
    let open_span = parser.expect(Token::LeftParen)?;
    let mut depth = 1usize;
    let mut guard = LoopGuard::new("paren_declarator");

    while depth > 0 {
        guard.check()?;
        match parser.current().clone() {
            Token::LeftParen => depth += 1,
            Token::RightParen => depth -= 1,
            Token::Star | Token::Amp | Token::AmpAmp | Token::Punct('^') if depth == 1 => {
                current.pointer = true;
            }
            Token::Identifier(word) if depth == 1 && !is_specifier_word(&word) => {
                current.name = Some((word, parser.current_span()));
            }
            Token::LeftBracket => {
                parser.skip_balanced()?;
                continue;
            }
            Token::Semicolon | Token::RightBrace | Token::Eof => {
                return Err(ParseError::unclosed_delimiter(
                    Token::LeftParen,
                    Token::RightParen,
                    open_span,
                ));
            }
            _ => {}
        }
        parser.advance();
    }
    Ok(())
}

/// `operator+`, `operator()`, `operator bool`, `operator new[]`
fn parse_operator_name(parser: &mut Parser) -> Result<String, ParseError> {
    parser.expect(Token::Operator)?;
    let mut name = String::from("operator");

    if parser.check(&Token::LeftParen) && matches!(parser.peek(), Token::RightParen) {
        parser.advance();
        parser.advance();
        name.push_str("()");
        return Ok(name);
    }

    let from = parser.position();
    let mut guard = LoopGuard::new("operator_name");
    while !matches!(
        parser.current(),
        Token::LeftParen | Token::Semicolon | Token::LeftBrace | Token::RightBrace | Token::Eof
    ) {
        guard.check()?;
        parser.advance();
    }

    let symbol = parser.text_between(from, parser.position());
    if symbol.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
        name.push(' ');
    }
    name.push_str(&symbol);
    Ok(name)
}

/// `class-key attrs name bases { members }`, or just `class-key name`.
fn parse_class_specifier(parser: &mut Parser) -> Result<TypeSpecifier, ParseError> {
    let start = parser.current_span();
    let tag = match parser.advance() {
        Token::Class => RecordTag::Class,
        Token::Struct => RecordTag::Struct,
        _ => RecordTag::Union,
    };

    let mut annotations = parse_attribute_specifiers(parser)?;
    let name = parse_qualified_name(parser)?;
    if parser.check_ident("final") {
        parser.advance();
    }
    annotations.extend(parse_attribute_specifiers(parser)?);

    let bases = if parser.consume(&Token::Colon) {
        parse_base_clause(parser, tag)?
    } else {
        Vec::new()
    };

    if !parser.check(&Token::LeftBrace) {
        if !bases.is_empty() {
            return Err(parser.unexpected_token(vec![Token::LeftBrace]));
        }
        return Ok(TypeSpecifier::Elaborated(name));
    }
    parser.advance();

    parser.enter_scope("record")?;
    let mut members = Vec::new();
    if !name.is_empty() {
        // injected-class-name
        members.push(
            Decl::new(
                DeclKind::Record(RecordDecl {
                    tag,
                    bases: Vec::new(),
                }),
                name.clone(),
                start,
            )
            .implicit(),
        );
    }
    members.extend(parse_members(parser, Scope::Record(tag)));
    parser.exit_scope();

    if !parser.consume(&Token::RightBrace) {
        parser.record_error(parser.unexpected_token(vec![Token::RightBrace]));
    }

    let decl = Decl::new(
        DeclKind::Record(RecordDecl { tag, bases }),
        name,
        parser.span_from(start),
    )
    .with_annotations(annotations)
    .with_children(members);
    Ok(TypeSpecifier::Definition(decl))
}

/// `enum (class)? attrs name (: type)? ({ enumerators })?`
fn parse_enum_specifier(parser: &mut Parser) -> Result<TypeSpecifier, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::Enum)?;
    if !parser.consume(&Token::Class) {
        parser.consume(&Token::Struct);
    }
    parse_attribute_specifiers(parser)?;
    let name = parse_qualified_name(parser)?;

    if parser.consume(&Token::Colon) {
        let mut guard = LoopGuard::new("enum_base");
        while !matches!(
            parser.current(),
            Token::LeftBrace | Token::Semicolon | Token::RightBrace | Token::Eof
        ) {
            guard.check()?;
            if parser.check(&Token::Less) {
                parser.skip_angle_group()?;
            } else {
                parser.advance();
            }
        }
    }

    if !parser.check(&Token::LeftBrace) {
        return Ok(TypeSpecifier::Elaborated(name));
    }
    parser.skip_balanced()?;
    Ok(TypeSpecifier::Definition(Decl::new(
        DeclKind::Enum,
        name,
        parser.span_from(start),
    )))
}

/// Parse `::a::b<T>::c`, returning the last component (empty if absent).
fn parse_qualified_name(parser: &mut Parser) -> Result<String, ParseError> {
    let mut name = String::new();
    let mut guard = LoopGuard::new("qualified_name");
    loop {
        guard.check()?;
        match parser.current() {
            Token::ColonColon => {
                parser.advance();
            }
            Token::Identifier(id) => {
                name = id.clone();
                parser.advance();
                if parser.check(&Token::Less) {
                    parser.skip_angle_group()?;
                }
                if !parser.consume(&Token::ColonColon) {
                    return Ok(name);
                }
            }
            _ => return Ok(name),
        }
    }
}

/// `: public A, virtual protected ns::B<int>, C`
fn parse_base_clause(parser: &mut Parser, tag: RecordTag) -> Result<Vec<BaseSpecifier>, ParseError> {
    let mut bases = Vec::new();
    let mut guard = LoopGuard::new("base_clause");

    loop {
        guard.check()?;
        let mut access = None;
        let mut is_virtual = false;
        loop {
            match parser.current() {
                Token::Public => access = Some(AccessSpecifier::Public),
                Token::Protected => access = Some(AccessSpecifier::Protected),
                Token::Private => access = Some(AccessSpecifier::Private),
                Token::Virtual => is_virtual = true,
                _ => break,
            }
            parser.advance();
        }
        parse_attribute_specifiers(parser)?;

        let from = parser.position();
        let mut depth = 0usize;
        loop {
            guard.check()?;
            match parser.current() {
                Token::Comma | Token::LeftBrace if depth == 0 => break,
                Token::Less => depth += 1,
                Token::Greater => depth = depth.saturating_sub(1),
                Token::LeftParen | Token::LeftBracket => {
                    parser.skip_balanced()?;
                    continue;
                }
                Token::Semicolon | Token::RightBrace | Token::Eof => {
                    return Err(parser.unexpected_token(vec![Token::LeftBrace]));
                }
                _ => {}
            }
            parser.advance();
        }

        let name = parser.text_between(from, parser.position());
        if name.is_empty() {
            return Err(ParseError::invalid_syntax(
                "expected a base class name",
                parser.current_span(),
            ));
        }
        bases.push(BaseSpecifier {
            access: access.unwrap_or_else(|| tag.default_access()),
            is_virtual,
            name,
        });

        if !parser.consume(&Token::Comma) {
            return Ok(bases);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Decl {
        Parser::new(source).unwrap().parse().unwrap()
    }

    fn kinds(decl: &Decl) -> Vec<(String, String)> {
        decl.children()
            .iter()
            .filter(|d| !d.is_implicit())
            .map(|d| {
                let kind = match d.kind() {
                    DeclKind::Record(_) => "record",
                    DeclKind::Field => "field",
                    DeclKind::Var { .. } => "var",
                    DeclKind::Function => "function",
                    DeclKind::AccessSpec(_) => "access",
                    DeclKind::Enum => "enum",
                    DeclKind::TypeAlias => "alias",
                    DeclKind::Template => "template",
                    _ => "other",
                };
                (kind.to_string(), d.name().to_string())
            })
            .collect()
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(k, n)| (k.to_string(), n.to_string()))
            .collect()
    }

    #[test]
    fn test_member_kinds() {
        let unit = parse(
            r#"
            struct S {
                int a, *b, c[4];
                unsigned flags : 3 = 1;
                static const int k = 4;
                void (*callback)(int);
                std::map<int, std::string> table{};
                S() : a(0), table{} {}
                virtual ~S() = default;
                bool operator==(const S&) const;
                enum class Mode : unsigned char { On, Off } mode;
                using Alias = int;
                friend class Other;
                static_assert(sizeof(int) == 4, "int");
            private:
                auto size() const -> std::size_t { return 0; }
            };
            "#,
        );
        let record = &unit.children()[0];
        assert_eq!(
            kinds(record),
            pairs(&[
                ("field", "a"),
                ("field", "b"),
                ("field", "c"),
                ("field", "flags"),
                ("var", "k"),
                ("field", "callback"),
                ("field", "table"),
                ("function", "S"),
                ("function", "~S"),
                ("function", "operator=="),
                ("enum", "Mode"),
                ("field", "mode"),
                ("alias", "Alias"),
                ("other", "Other"),
                ("other", "static_assert"),
                ("access", ""),
                ("function", "size"),
            ])
        );
    }

    #[test]
    fn test_class_specifier_bases() {
        let unit = parse("class D final : public ns::A<int, 2>, B, protected virtual C {};");
        let record = unit.children()[0].as_record().unwrap();
        let bases: Vec<_> = record
            .bases
            .iter()
            .map(|b| (b.name.as_str(), b.access, b.is_virtual))
            .collect();
        assert_eq!(
            bases,
            vec![
                ("ns::A<int, 2>", AccessSpecifier::Public, false),
                ("B", AccessSpecifier::Private, false),
                ("C", AccessSpecifier::Protected, true),
            ]
        );
    }

    #[test]
    fn test_forward_declaration_is_not_a_record() {
        let unit = parse("struct Fwd; class Other *ptr;");
        assert_eq!(
            kinds(&unit),
            pairs(&[("other", "Fwd"), ("var", "ptr")])
        );
    }

    #[test]
    fn test_nested_namespace_path() {
        let unit = parse("namespace a::b { struct S {}; } namespace { int x; }");
        let outer = &unit.children()[0];
        assert_eq!(outer.name(), "a");
        assert_eq!(outer.children()[0].name(), "b");
        assert_eq!(outer.children()[0].children()[0].name(), "S");
        assert_eq!(unit.children()[1].name(), "");
    }

    #[test]
    fn test_template_head() {
        let unit = parse(
            "template <typename T, class U = std::vector<int>, int N = (1 > 0), typename... Ts> struct X {};",
        );
        let template = &unit.children()[0];
        assert!(matches!(template.kind(), DeclKind::Template));
        let params: Vec<_> = template
            .children()
            .iter()
            .map(|d| (matches!(d.kind(), DeclKind::TemplateTypeParam), d.name()))
            .collect();
        assert_eq!(
            params,
            vec![(true, "T"), (true, "U"), (false, "N"), (true, "Ts"), (false, "X")]
        );
    }

    #[test]
    fn test_macro_invocation_without_semicolon() {
        let unit = parse("struct S { DECLARE_THING(S) int x; Q_OBJECT public: int y; };");
        assert_eq!(
            kinds(&unit.children()[0]),
            pairs(&[
                ("other", "DECLARE_THING"),
                ("field", "x"),
                ("other", "Q_OBJECT"),
                ("access", ""),
                ("field", "y"),
            ])
        );
    }
}
