//! Visitor for walking the declaration tree
//!
//! `visit_decl` dispatches on [`DeclKind`] to a per-kind method. Every
//! per-kind method defaults to [`walk_decl`], which visits the children in
//! source order. Override a method to intercept a kind; call `walk_decl`
//! from the override to keep descending.
//!
//! # Example
//!
//! ```rust
//! use cxxrefl_engine::parser::ast::*;
//!
//! struct CountRecords {
//!     count: usize,
//! }
//!
//! impl Visitor for CountRecords {
//!     fn visit_record(&mut self, decl: &Decl, _record: &RecordDecl) {
//!         self.count += 1;
//!         walk_decl(self, decl);
//!     }
//! }
//! ```

use super::*;

/// Declaration tree visitor.
pub trait Visitor: Sized {
    /// Entry point for a single node. Implicit nodes are skipped.
    fn visit_decl(&mut self, decl: &Decl) {
        if decl.is_implicit() {
            return;
        }
        dispatch_decl(self, decl);
    }

    fn visit_translation_unit(&mut self, decl: &Decl) {
        walk_decl(self, decl);
    }

    fn visit_namespace(&mut self, decl: &Decl) {
        walk_decl(self, decl);
    }

    fn visit_record(&mut self, decl: &Decl, _record: &RecordDecl) {
        walk_decl(self, decl);
    }

    fn visit_template(&mut self, decl: &Decl) {
        walk_decl(self, decl);
    }

    fn visit_template_type_param(&mut self, decl: &Decl) {
        walk_decl(self, decl);
    }

    fn visit_access_spec(&mut self, _decl: &Decl, _access: AccessSpecifier) {}

    fn visit_field(&mut self, decl: &Decl) {
        walk_decl(self, decl);
    }

    fn visit_var(&mut self, decl: &Decl) {
        walk_decl(self, decl);
    }

    /// Every remaining kind: template parameters other than type
    /// parameters, functions, enums, aliases, linkage blocks and `Other`.
    fn visit_other(&mut self, decl: &Decl) {
        walk_decl(self, decl);
    }
}

/// Route a node to the matching `visit_*` method.
pub fn dispatch_decl<V: Visitor>(visitor: &mut V, decl: &Decl) {
    match decl.kind() {
        DeclKind::TranslationUnit => visitor.visit_translation_unit(decl),
        DeclKind::Namespace => visitor.visit_namespace(decl),
        DeclKind::Record(record) => visitor.visit_record(decl, record),
        DeclKind::Template => visitor.visit_template(decl),
        DeclKind::TemplateTypeParam => visitor.visit_template_type_param(decl),
        DeclKind::AccessSpec(access) => visitor.visit_access_spec(decl, *access),
        DeclKind::Field => visitor.visit_field(decl),
        DeclKind::Var { .. } => visitor.visit_var(decl),
        DeclKind::TemplateParam
        | DeclKind::Function
        | DeclKind::Enum
        | DeclKind::TypeAlias
        | DeclKind::LinkageSpec
        | DeclKind::Other => visitor.visit_other(decl),
    }
}

/// Visit every child of `decl` in source order.
pub fn walk_decl<V: Visitor>(visitor: &mut V, decl: &Decl) {
    for child in decl.children() {
        visitor.visit_decl(child);
    }
}
