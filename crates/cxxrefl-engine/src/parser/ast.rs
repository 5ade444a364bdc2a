//! Declaration tree for a C++ translation unit.
//!
//! The tree is deliberately flat: every node is a [`Decl`] with a
//! [`DeclKind`] discriminator, an ordered list of children and the
//! annotations written on it. This is the query surface the reflection
//! walker consumes; nodes the walker never interprets (functions, enums,
//! aliases, ...) still appear so that scope bookkeeping sees them.

use crate::parser::token::Span;

pub mod visitor;

pub use visitor::*;

/// A single declaration node.
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    /// What kind of declaration this is
    pub kind: DeclKind,

    /// Declared name (empty for anonymous declarations)
    pub name: String,

    /// True for compiler-synthesized nodes that the author did not write
    pub implicit: bool,

    /// Annotations attached to the declaration, in source order
    pub annotations: Vec<Annotation>,

    /// Nested declarations, in source order
    pub children: Vec<Decl>,

    /// Source location of the declaration
    pub span: Span,
}

/// Declaration discriminator.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    /// Root of the tree
    TranslationUnit,

    /// `namespace name { ... }`
    Namespace,

    /// `class`, `struct` or `union` definition
    Record(RecordDecl),

    /// `typename T` / `class T` inside a template head
    TemplateTypeParam,

    /// Non-type or template-template parameter inside a template head
    TemplateParam,

    /// `template <...>` wrapper; children are the parameters followed by the
    /// templated declaration
    Template,

    /// `public:`, `protected:` or `private:` inside a record body
    AccessSpec(AccessSpecifier),

    /// Non-static data member
    Field,

    /// Variable: static data member inside a record, or a namespace-scope
    /// variable
    Var {
        /// Declared with `static`
        is_static: bool,
    },

    /// Function, method, constructor, destructor or operator
    Function,

    /// `enum` / `enum class` definition
    Enum,

    /// `using`/`typedef` alias, using-directive or namespace alias
    TypeAlias,

    /// `extern "C" { ... }`
    LinkageSpec,

    /// Anything else (friend declarations, static assertions, forward
    /// declarations, macro invocations)
    Other,
}

/// Record-specific data.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDecl {
    /// `class`, `struct` or `union`
    pub tag: RecordTag,

    /// Base specifiers, in source order
    pub bases: Vec<BaseSpecifier>,
}

/// Class-key of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordTag {
    Class,
    Struct,
    Union,
}

impl RecordTag {
    /// Access level in effect before any access specifier appears, both for
    /// members and for base specifiers.
    pub fn default_access(self) -> AccessSpecifier {
        match self {
            RecordTag::Struct | RecordTag::Union => AccessSpecifier::Public,
            RecordTag::Class => AccessSpecifier::Private,
        }
    }
}

/// C++ access specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessSpecifier {
    Public,
    Protected,
    Private,
}

/// One entry of a base clause.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseSpecifier {
    /// Effective access (defaults resolved from the class-key)
    pub access: AccessSpecifier,

    /// Declared `virtual`
    pub is_virtual: bool,

    /// Base type as written, e.g. `ns::Base<int>`
    pub name: String,
}

/// An annotation: `clang::annotate("name", args...)` or one of its macro
/// spellings.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Annotation name (the first string argument of `annotate`)
    pub name: String,

    /// Remaining arguments, in source order
    pub args: Vec<AnnotationArg>,

    pub span: Span,
}

/// A literal argument of an annotation.
///
/// Numeric literals keep their source spelling so that conversion to a
/// number happens in one place and can report failures.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationArg {
    /// String literal contents, escapes kept verbatim
    Str(String),

    /// Integer literal spelling, including an optional sign
    Int(String),

    /// Floating literal spelling, including an optional sign
    Float(String),

    /// Any other constant expression, as written
    Expr(String),
}

impl Annotation {
    pub fn new(name: impl Into<String>, args: Vec<AnnotationArg>, span: Span) -> Self {
        Self {
            name: name.into(),
            args,
            span,
        }
    }
}

impl Decl {
    /// Create a node with no annotations or children.
    pub fn new(kind: DeclKind, name: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            name: name.into(),
            implicit: false,
            annotations: Vec::new(),
            children: Vec::new(),
            span,
        }
    }

    /// Builder-style helper to attach annotations.
    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Builder-style helper to attach children.
    pub fn with_children(mut self, children: Vec<Decl>) -> Self {
        self.children = children;
        self
    }

    /// Builder-style helper to mark a node as compiler-synthesized.
    pub fn implicit(mut self) -> Self {
        self.implicit = true;
        self
    }

    pub fn kind(&self) -> &DeclKind {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    pub fn children(&self) -> &[Decl] {
        &self.children
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Record data, if this node is a class, struct or union.
    pub fn as_record(&self) -> Option<&RecordDecl> {
        match &self.kind {
            DeclKind::Record(record) => Some(record),
            _ => None,
        }
    }

    /// True if any annotation on this node has the given name.
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a.name == name)
    }

    /// Names of publicly inherited bases, in declaration order.
    pub fn public_base_names(&self) -> Vec<&str> {
        self.as_record()
            .map(|record| {
                record
                    .bases
                    .iter()
                    .filter(|base| base.access == AccessSpecifier::Public)
                    .map(|base| base.name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Decl::node_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tag: RecordTag, bases: Vec<BaseSpecifier>) -> Decl {
        Decl::new(
            DeclKind::Record(RecordDecl { tag, bases }),
            "R",
            Span::default(),
        )
    }

    #[test]
    fn test_public_base_names_filters_access() {
        let decl = record(
            RecordTag::Class,
            vec![
                BaseSpecifier {
                    access: AccessSpecifier::Public,
                    is_virtual: false,
                    name: "A".to_string(),
                },
                BaseSpecifier {
                    access: AccessSpecifier::Private,
                    is_virtual: false,
                    name: "B".to_string(),
                },
                BaseSpecifier {
                    access: AccessSpecifier::Public,
                    is_virtual: true,
                    name: "ns::C<int>".to_string(),
                },
            ],
        );
        assert_eq!(decl.public_base_names(), vec!["A", "ns::C<int>"]);
    }

    #[test]
    fn test_non_record_has_no_bases() {
        let decl = Decl::new(DeclKind::Namespace, "ns", Span::default());
        assert!(decl.as_record().is_none());
        assert!(decl.public_base_names().is_empty());
    }

    #[test]
    fn test_default_access_by_tag() {
        assert_eq!(RecordTag::Struct.default_access(), AccessSpecifier::Public);
        assert_eq!(RecordTag::Class.default_access(), AccessSpecifier::Private);
    }

    #[test]
    fn test_node_count() {
        let decl = Decl::new(DeclKind::TranslationUnit, "", Span::default()).with_children(vec![
            record(RecordTag::Struct, vec![]),
            Decl::new(DeclKind::Namespace, "a", Span::default())
                .with_children(vec![record(RecordTag::Class, vec![])]),
        ]);
        assert_eq!(decl.node_count(), 4);
    }
}
