//! Metadata model: reflected records and their fields

use super::attribute::Attribute;
use crate::parser::ast::{AccessSpecifier, RecordTag};

/// Kind of a reflected record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Class,
    Struct,

    /// Unions: scanned for scope bookkeeping, never emitted
    Unsupported,
}

impl RecordKind {
    pub fn from_tag(tag: RecordTag) -> Self {
        match tag {
            RecordTag::Class => RecordKind::Class,
            RecordTag::Struct => RecordKind::Struct,
            RecordTag::Union => RecordKind::Unsupported,
        }
    }

    /// Access level before the first access specifier.
    pub fn initial_access(self) -> Access {
        match self {
            RecordKind::Struct => Access::Public,
            RecordKind::Class | RecordKind::Unsupported => Access::Private,
        }
    }
}

/// Member access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Access {
    Public,
    Protected,
    #[default]
    Private,
}

impl From<AccessSpecifier> for Access {
    fn from(access: AccessSpecifier) -> Self {
        match access {
            AccessSpecifier::Public => Access::Public,
            AccessSpecifier::Protected => Access::Protected,
            AccessSpecifier::Private => Access::Private,
        }
    }
}

/// A reflected data member.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,

    /// Attributes in annotation order
    pub attrs: Vec<Attribute>,
}

impl Field {
    pub fn new(name: impl Into<String>, attrs: Vec<Attribute>) -> Self {
        Self {
            name: name.into(),
            attrs,
        }
    }
}

/// A reflected class or struct.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,

    /// Enclosing namespace and record names, outermost first
    pub namespaces: Vec<String>,

    /// Template type-parameter names
    pub templates: Vec<String>,

    /// Publicly inherited base names
    pub bases: Vec<String>,

    pub kind: RecordKind,

    /// The declaration carries the `meta` marker
    pub opted_in: bool,

    /// Qualifying fields in declaration order
    pub fields: Vec<Field>,
}

impl Record {
    pub fn new(
        name: impl Into<String>,
        namespaces: Vec<String>,
        templates: Vec<String>,
        opted_in: bool,
        kind: RecordKind,
    ) -> Self {
        Self {
            name: name.into(),
            namespaces,
            templates,
            bases: Vec::new(),
            kind,
            opted_in,
            fields: Vec::new(),
        }
    }

    pub fn is_opted_in(&self) -> bool {
        self.opted_in
    }

    pub fn add_base(&mut self, base: impl Into<String>) {
        self.bases.push(base.into());
    }

    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// `a::b::Name` built from the namespace path.
    pub fn qualified_name(&self) -> String {
        let mut parts: Vec<&str> = self.namespaces.iter().map(String::as_str).collect();
        parts.push(&self.name);
        parts.join("::")
    }
}
