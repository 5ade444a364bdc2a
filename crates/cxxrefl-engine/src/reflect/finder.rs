//! Declaration tree walker
//!
//! Walks a translation unit depth-first, tracking the namespace path and
//! the pending template parameters, and builds one [`Record`] per class,
//! struct or union definition. Each record's fields come from a single
//! [`FieldScanner`] pass over its declaration. Finished records that carry
//! the `meta` marker are handed to a [`RecordSink`].
//!
//! Nested records are finished before their enclosing record, so a sink
//! receives inner types first.

use tracing::{debug, trace, warn};

use super::attribute::META;
use super::record::{Record, RecordKind};
use super::scanner::FieldScanner;
use crate::parser::ast::{walk_decl, AccessSpecifier, Decl, DeclKind, RecordDecl, Visitor};

/// Receiver of finished, opted-in records.
pub trait RecordSink {
    fn push(&mut self, record: Record);
}

impl RecordSink for Vec<Record> {
    fn push(&mut self, record: Record) {
        Vec::push(self, record);
    }
}

/// Walks declarations and reports reflected records.
pub struct RecordFinder<'s> {
    sink: &'s mut dyn RecordSink,

    /// Enclosing namespace and record names
    namespaces: Vec<String>,

    /// Template type parameters waiting for the next record
    templates: Vec<String>,

    /// Records whose subtree is still being walked
    records: Vec<Record>,
}

impl<'s> RecordFinder<'s> {
    pub fn new(sink: &'s mut dyn RecordSink) -> Self {
        Self {
            sink,
            namespaces: Vec::new(),
            templates: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Walk `decl` and everything below it.
    pub fn walk(&mut self, decl: &Decl) {
        self.visit_decl(decl);
    }

    /// Run `f` with `name` pushed on the namespace path.
    fn with_scope(&mut self, name: &str, f: impl FnOnce(&mut Self)) {
        self.namespaces.push(name.to_string());
        f(self);
        self.namespaces.pop();
    }

    fn open_record(&mut self, decl: &Decl, record_decl: &RecordDecl) -> Record {
        let kind = RecordKind::from_tag(record_decl.tag);
        let mut record = Record::new(
            decl.name(),
            self.namespaces.clone(),
            std::mem::take(&mut self.templates),
            decl.has_annotation(META),
            kind,
        );
        for base in decl.public_base_names() {
            record.add_base(base);
        }

        FieldScanner::new(&mut record).scan(decl);
        debug!(
            record = %record.qualified_name(),
            opted_in = record.opted_in,
            fields = record.fields.len(),
            "scanned record"
        );
        record
    }

    fn close_record(&mut self, record: Record) {
        if !record.is_opted_in() {
            return;
        }
        if record.kind == RecordKind::Unsupported {
            warn!(
                record = %record.qualified_name(),
                "unions are not reflected, skipping"
            );
            return;
        }
        self.sink.push(record);
    }

    /// Walk children of an uninterpreted declaration, then drop pending
    /// template parameters.
    fn walk_other(&mut self, decl: &Decl) {
        walk_decl(self, decl);
        self.templates.clear();
    }
}

impl Visitor for RecordFinder<'_> {
    fn visit_record(&mut self, decl: &Decl, record_decl: &RecordDecl) {
        let enclosing = self.records.last().map(|open| open.name.clone());
        if let Some(name) = &enclosing {
            self.namespaces.push(name.clone());
        }

        let record = self.open_record(decl, record_decl);
        self.records.push(record);
        walk_decl(self, decl);
        if let Some(record) = self.records.pop() {
            self.close_record(record);
        }

        if enclosing.is_some() {
            self.namespaces.pop();
        }
        self.templates.clear();
    }

    fn visit_namespace(&mut self, decl: &Decl) {
        self.with_scope(decl.name(), |finder| walk_decl(finder, decl));
    }

    fn visit_template_type_param(&mut self, decl: &Decl) {
        trace!(parameter = decl.name(), "pending template parameter");
        self.templates.push(decl.name().to_string());
    }

    fn visit_translation_unit(&mut self, decl: &Decl) {
        self.walk_other(decl);
    }

    fn visit_template(&mut self, decl: &Decl) {
        self.walk_other(decl);
    }

    fn visit_access_spec(&mut self, _decl: &Decl, _access: AccessSpecifier) {
        self.templates.clear();
    }

    fn visit_field(&mut self, decl: &Decl) {
        self.walk_other(decl);
    }

    fn visit_var(&mut self, decl: &Decl) {
        self.walk_other(decl);
    }

    fn visit_other(&mut self, decl: &Decl) {
        // Non-type parameters sit between type parameters of the same head.
        if matches!(decl.kind(), DeclKind::TemplateParam) {
            return;
        }
        self.walk_other(decl);
    }
}

/// Collect every reflected record under `root`, in finishing order.
pub fn find_records(root: &Decl) -> Vec<Record> {
    let mut records = Vec::new();
    RecordFinder::new(&mut records).walk(root);
    records
}
