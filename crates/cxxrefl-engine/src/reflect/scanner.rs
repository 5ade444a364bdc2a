//! Record field scanner
//!
//! Walks the immediate scope of one record declaration and collects its
//! reflected fields. The first record node visited is the target itself;
//! any record met after that is a nested type and is not entered, so its
//! members never leak into the target.

use tracing::{debug, trace};

use super::attribute::META;
use super::extract::extract_attributes;
use super::record::{Access, Field, Record};
use crate::parser::ast::{walk_decl, AccessSpecifier, Decl, RecordDecl, Visitor};

/// Whether the scanner has entered the target record yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    NotYetEntered,
    InTargetScope,
}

/// Collects the fields of one record.
pub struct FieldScanner<'r> {
    record: &'r mut Record,
    mode: ScanMode,
    access: Access,
}

impl<'r> FieldScanner<'r> {
    pub fn new(record: &'r mut Record) -> Self {
        let access = record.kind.initial_access();
        Self {
            record,
            mode: ScanMode::NotYetEntered,
            access,
        }
    }

    /// Scan `decl`, which should be the record's own declaration.
    pub fn scan(mut self, decl: &Decl) {
        self.visit_decl(decl);
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn access(&self) -> Access {
        self.access
    }

    fn member(&mut self, decl: &Decl) {
        if self.mode == ScanMode::NotYetEntered {
            debug!(member = decl.name(), "member outside of a record, ignoring");
            return;
        }
        if !decl.has_annotation(META) {
            trace!(member = decl.name(), "member not marked for reflection");
            return;
        }
        if self.access != Access::Public {
            trace!(member = decl.name(), access = ?self.access, "marked member is not public");
            return;
        }

        let attrs = extract_attributes(decl.annotations());
        trace!(
            record = %self.record.name,
            field = decl.name(),
            attributes = attrs.len(),
            "reflecting field"
        );
        self.record.add_field(Field::new(decl.name(), attrs));
    }
}

impl Visitor for FieldScanner<'_> {
    fn visit_record(&mut self, decl: &Decl, _record: &RecordDecl) {
        match self.mode {
            ScanMode::NotYetEntered => {
                self.mode = ScanMode::InTargetScope;
                walk_decl(self, decl);
            }
            ScanMode::InTargetScope => {
                trace!(nested = decl.name(), "skipping nested record");
            }
        }
    }

    fn visit_namespace(&mut self, _decl: &Decl) {}

    fn visit_template_type_param(&mut self, _decl: &Decl) {}

    fn visit_access_spec(&mut self, _decl: &Decl, access: AccessSpecifier) {
        if self.mode == ScanMode::NotYetEntered {
            debug!("access specifier outside of a record, ignoring");
            return;
        }
        self.access = access.into();
    }

    fn visit_field(&mut self, decl: &Decl) {
        self.member(decl);
    }

    fn visit_var(&mut self, decl: &Decl) {
        self.member(decl);
    }
}
