//! cxxrefl engine
//!
//! Build-time reflection for annotated C++ headers:
//! - **Parser**: lexer and declaration parser producing a [`Decl`] tree (`parser` module)
//! - **Reflect**: record walker, field scanner and attribute extraction (`reflect` module)
//! - **Generator**: staleness check and descriptor emission (`generator` module)
//! - **Tool**: per-file driver tying the above together (`tool` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use cxxrefl_engine::{find_records, Parser};
//!
//! let source = r#"
//!     struct [[META]] Player {
//!         [[META, INFO("Speed in m/s"), RANGE(0, 10)]] float speed;
//!     };
//! "#;
//!
//! let unit = Parser::new(source).unwrap().parse().unwrap();
//! let records = find_records(&unit);
//! assert_eq!(records[0].fields[0].name, "speed");
//! ```

#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Declaration front-end: lexer, parser and declaration tree
pub mod parser;

/// Reflection metadata extraction
pub mod reflect;

/// Descriptor generation
pub mod generator;

/// `cxxrefl.toml` configuration
pub mod config;

/// Per-file driver
pub mod tool;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{Config, ConfigError, OutputConfig, CONFIG_FILE_NAME};
pub use generator::{GenerateError, GenerateOutcome, Generator, Staleness};
pub use parser::{Decl, DeclKind, LexError, ParseError, Parser, Visitor};
pub use reflect::{find_records, Attribute, Field, Range, Record, RecordFinder, RecordKind, RecordSink};
pub use tool::{FileOutcome, ReflectTool, ToolError};
