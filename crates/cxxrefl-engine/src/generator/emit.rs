//! Descriptor text emission
//!
//! ```text
//! // Generated by cxxrefl from player.h. Do not edit.
//! #pragma once
//!
//! #include "../player.h"
//!
//! Record{ Name<"Player">, Namespaces<"game">, Templates<>, Bases<"Actor">,
//!   Field{ Name<"speed">,
//!     Attribute{ Name<"info">{}, "Speed in m/s" },
//!     Attribute{ Name<"range">{}, (0, 10) }
//!   },
//!   Field{ Name<"id"> }
//! }
//! ```

use std::fmt;

use crate::reflect::{Field, Record};

/// A whole output artifact.
pub struct Artifact<'a> {
    /// Source file name, shown in the banner
    pub source_name: &'a str,

    /// Path written into the companion `#include`, if any
    pub include: Option<&'a str>,

    pub records: &'a [Record],
}

impl fmt::Display for Artifact<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "// Generated by cxxrefl from {}. Do not edit.",
            self.source_name
        )?;
        writeln!(f, "#pragma once")?;
        if let Some(include) = self.include {
            writeln!(f)?;
            writeln!(f, "#include \"{}\"", include)?;
        }
        for record in self.records {
            writeln!(f)?;
            writeln!(f, "{}", RecordBlock(record))?;
        }
        Ok(())
    }
}

/// One `Record{ ... }` block.
pub struct RecordBlock<'a>(pub &'a Record);

impl fmt::Display for RecordBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.0;
        write!(
            f,
            "Record{{ Name<\"{}\">, Namespaces<{}>, Templates<{}>, Bases<{}>",
            record.name,
            NameList(&record.namespaces),
            NameList(&record.templates),
            NameList(&record.bases),
        )?;

        if record.fields.is_empty() {
            return f.write_str(" }");
        }

        f.write_str(",\n")?;
        for (i, field) in record.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",\n")?;
            }
            write_field(f, field)?;
        }
        f.write_str("\n}")
    }
}

fn write_field(f: &mut fmt::Formatter<'_>, field: &Field) -> fmt::Result {
    write!(f, "  Field{{ Name<\"{}\">", field.name)?;
    if field.attrs.is_empty() {
        return f.write_str(" }");
    }

    f.write_str(",\n")?;
    for (i, attr) in field.attrs.iter().enumerate() {
        if i > 0 {
            f.write_str(",\n")?;
        }
        write!(f, "    {}", attr)?;
    }
    f.write_str("\n  }")
}

/// `"a", "b"`
struct NameList<'a>(&'a [String]);

impl fmt::Display for NameList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "\"{}\"", name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{Attribute, Range, RecordKind};

    fn record(name: &str) -> Record {
        Record::new(name, vec![], vec![], true, RecordKind::Struct)
    }

    #[test]
    fn test_empty_record() {
        assert_eq!(
            RecordBlock(&record("Empty")).to_string(),
            r#"Record{ Name<"Empty">, Namespaces<>, Templates<>, Bases<> }"#
        );
    }

    #[test]
    fn test_record_with_context_and_fields() {
        let mut rec = Record::new(
            "Box",
            vec!["game".to_string(), "items".to_string()],
            vec!["T".to_string()],
            true,
            RecordKind::Class,
        );
        rec.add_base("Item");
        rec.add_field(Field::new(
            "weight",
            vec![
                Attribute::Info("kg".to_string()),
                Attribute::Range(Range::from_samples([0.0, 50.0])),
            ],
        ));
        rec.add_field(Field::new("id", vec![]));

        let expected = "\
Record{ Name<\"Box\">, Namespaces<\"game\", \"items\">, Templates<\"T\">, Bases<\"Item\">,
  Field{ Name<\"weight\">,
    Attribute{ Name<\"info\">{}, \"kg\" },
    Attribute{ Name<\"range\">{}, (0, 50) }
  },
  Field{ Name<\"id\"> }
}";
        assert_eq!(RecordBlock(&rec).to_string(), expected);
    }

    #[test]
    fn test_artifact_header() {
        let records = [record("A"), record("B")];
        let text = Artifact {
            source_name: "a.h",
            include: Some("../a.h"),
            records: &records,
        }
        .to_string();

        assert!(text.starts_with("// Generated by cxxrefl from a.h. Do not edit.\n#pragma once\n"));
        assert!(text.contains("\n#include \"../a.h\"\n"));
        assert!(text.contains("Bases<> }\n\nRecord{ Name<\"B\">"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_artifact_without_records_or_include() {
        let text = Artifact {
            source_name: "empty.h",
            include: None,
            records: &[],
        }
        .to_string();
        assert_eq!(
            text,
            "// Generated by cxxrefl from empty.h. Do not edit.\n#pragma once\n"
        );
    }
}
