//! Descriptor generation
//!
//! Accumulates the reflected records of one source file and serializes them
//! into the output artifact when it is stale.

pub mod emit;
pub mod error;
#[allow(clippy::module_inception)]
pub mod generator;

pub use emit::{Artifact, RecordBlock};
pub use error::GenerateError;
pub use generator::{GenerateOutcome, Generator, GeneratorState, Staleness};
