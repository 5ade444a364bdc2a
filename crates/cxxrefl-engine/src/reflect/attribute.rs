//! Attribute model
//!
//! The four annotations the reflection runtime understands, with the text
//! form each one is emitted as:
//!
//! ```text
//! Attribute{ Name<"meta">{} }
//! Attribute{ Name<"info">{}, "text" }
//! Attribute{ Name<"range">{}, (min, max) }
//! Attribute{ Name<"step">{}, step }
//! ```

use std::fmt;

/// Tag of the opt-in marker
pub const META: &str = "meta";

/// Tag of the documentation string
pub const INFO: &str = "info";

/// Tag of the numeric range
pub const RANGE: &str = "range";

/// Tag of the numeric step
pub const STEP: &str = "step";

/// Which annotation an attribute came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Meta,
    Info,
    Range,
    Step,
}

impl AttributeKind {
    pub const ALL: [AttributeKind; 4] = [
        AttributeKind::Meta,
        AttributeKind::Info,
        AttributeKind::Range,
        AttributeKind::Step,
    ];

    /// Annotation name, as written in `annotate("<tag>", ...)`.
    pub fn tag(self) -> &'static str {
        match self {
            AttributeKind::Meta => META,
            AttributeKind::Info => INFO,
            AttributeKind::Range => RANGE,
            AttributeKind::Step => STEP,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Macro spelling that expands to this annotation.
    pub fn macro_name(self) -> &'static str {
        match self {
            AttributeKind::Meta => "META",
            AttributeKind::Info => "INFO",
            AttributeKind::Range => "RANGE",
            AttributeKind::Step => "STEP",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Numeric range accumulated from samples.
///
/// The first sample sets `min`, the second sets `max` (swapping the two if
/// they arrive out of order), and every later sample widens the bounds.
/// After two or more samples `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Range {
    min: f64,
    max: f64,
    samples: usize,
}

impl Range {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a range from samples in order.
    pub fn from_samples(samples: impl IntoIterator<Item = f64>) -> Self {
        let mut range = Self::new();
        for value in samples {
            range.push_sample(value);
        }
        range
    }

    pub fn push_sample(&mut self, value: f64) {
        match self.samples {
            0 => self.min = value,
            1 => {
                self.max = value;
                if self.min > self.max {
                    std::mem::swap(&mut self.min, &mut self.max);
                }
            }
            _ => {
                self.min = self.min.min(value);
                self.max = self.max.max(value);
            }
        }
        self.samples += 1;
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Number of samples pushed so far.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// True once both bounds have been set.
    pub fn is_complete(&self) -> bool {
        self.samples >= 2
    }
}

/// A typed attribute attached to a reflected field.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// Opt-in marker
    Meta,

    /// Documentation string, kept verbatim
    Info(String),

    /// Numeric range
    Range(Range),

    /// Numeric step size
    Step(f64),
}

impl Attribute {
    pub fn kind(&self) -> AttributeKind {
        match self {
            Attribute::Meta => AttributeKind::Meta,
            Attribute::Info(_) => AttributeKind::Info,
            Attribute::Range(_) => AttributeKind::Range,
            Attribute::Step(_) => AttributeKind::Step,
        }
    }

    pub fn tag(&self) -> &'static str {
        self.kind().tag()
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attribute{{ Name<\"{}\">{{}}", self.tag())?;
        match self {
            Attribute::Meta => {}
            Attribute::Info(text) => write!(f, ", \"{}\"", text)?,
            Attribute::Range(range) => write!(f, ", ({}, {})", range.min(), range.max())?,
            Attribute::Step(step) => write!(f, ", {}", step)?,
        }
        f.write_str(" }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parser::attrs::macro_annotation_name;

    #[test]
    fn test_tags_round_trip() {
        for kind in AttributeKind::ALL {
            assert_eq!(AttributeKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(AttributeKind::from_tag("color"), None);
    }

    #[test]
    fn test_macro_spellings_expand_to_tags() {
        for kind in AttributeKind::ALL {
            assert_eq!(macro_annotation_name(kind.macro_name()), Some(kind.tag()));
        }
    }

    #[test]
    fn test_range_state_machine() {
        let mut range = Range::new();
        range.push_sample(5.0);
        assert_eq!((range.min(), range.samples()), (5.0, 1));
        assert!(!range.is_complete());

        range.push_sample(1.0);
        assert_eq!((range.min(), range.max()), (1.0, 5.0));

        range.push_sample(3.0);
        assert_eq!((range.min(), range.max()), (1.0, 5.0));

        range.push_sample(-2.0);
        range.push_sample(9.5);
        assert_eq!((range.min(), range.max()), (-2.0, 9.5));
        assert_eq!(range.samples(), 5);
    }

    #[test]
    fn test_display() {
        assert_eq!(Attribute::Meta.to_string(), r#"Attribute{ Name<"meta">{} }"#);
        assert_eq!(
            Attribute::Info("Speed in m/s".to_string()).to_string(),
            r#"Attribute{ Name<"info">{}, "Speed in m/s" }"#
        );
        assert_eq!(
            Attribute::Range(Range::from_samples([5.0, 1.0])).to_string(),
            r#"Attribute{ Name<"range">{}, (1, 5) }"#
        );
        assert_eq!(
            Attribute::Step(0.25).to_string(),
            r#"Attribute{ Name<"step">{}, 0.25 }"#
        );
    }
}
