//! Reflection metadata extraction
//!
//! [`RecordFinder`] walks a declaration tree, [`FieldScanner`] collects the
//! reflected fields of each record, and the extractor turns annotations into
//! typed [`Attribute`]s.

pub mod attribute;
pub mod error;
pub mod extract;
pub mod finder;
pub mod record;
pub mod scanner;

pub use attribute::{Attribute, AttributeKind, Range};
pub use error::ExtractError;
pub use extract::{extract_attribute, extract_attributes};
pub use finder::{find_records, RecordFinder, RecordSink};
pub use record::{Access, Field, Record, RecordKind};
pub use scanner::{FieldScanner, ScanMode};
