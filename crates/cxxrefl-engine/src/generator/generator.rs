//! Incremental descriptor generator
//!
//! A [`Generator`] is bound to one source file. Records are pushed into it
//! while the source is walked; [`Generator::generate`] then writes every
//! accumulated record to the output artifact, unless the artifact is
//! already newer than the source.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info};

use super::emit::Artifact;
use super::error::GenerateError;
use crate::config::OutputConfig;
use crate::reflect::{Record, RecordSink};

/// Whether the output artifact has to be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// The artifact exists and is at least as new as the source
    UpToDate,
    MustGenerate,
}

/// Lifecycle of a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    Idle,
    Accumulating,
    Skipped,
    Emitted,
}

/// Result of [`Generator::generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Nothing written, the artifact was up to date
    Skipped { path: PathBuf },

    /// The artifact was written with this many records
    Emitted { path: PathBuf, records: usize },
}

/// Collects the reflected records of one source file and writes them out.
#[derive(Debug)]
pub struct Generator {
    source: PathBuf,
    output: PathBuf,

    /// `#include` path of the source as seen from the output directory
    include: Option<String>,

    records: Vec<Record>,
    force: bool,
    state: GeneratorState,
}

impl Generator {
    pub fn new(source: impl Into<PathBuf>, config: &OutputConfig) -> Self {
        let source = source.into();
        let output = output_path(&source, config);
        let include = config
            .include_source
            .then(|| include_path(&source, &config.dir));

        Self {
            source,
            output,
            include,
            records: Vec::new(),
            force: false,
            state: GeneratorState::Idle,
        }
    }

    /// Regenerate regardless of modification times.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    /// Compare the artifact's modification time against the source's.
    ///
    /// A missing or unreadable timestamp on either side means the artifact
    /// must be generated.
    pub fn check_staleness(&self) -> Staleness {
        if self.force {
            return Staleness::MustGenerate;
        }

        let (Some(output_mtime), Some(source_mtime)) =
            (modified(&self.output), modified(&self.source))
        else {
            return Staleness::MustGenerate;
        };

        if output_mtime >= source_mtime {
            Staleness::UpToDate
        } else {
            Staleness::MustGenerate
        }
    }

    /// Write the artifact if it is stale.
    ///
    /// Zero accumulated records still produce an artifact.
    pub fn generate(&mut self) -> Result<GenerateOutcome, GenerateError> {
        if self.check_staleness() == Staleness::UpToDate {
            debug!(output = %self.output.display(), "artifact is up to date");
            self.state = GeneratorState::Skipped;
            return Ok(GenerateOutcome::Skipped {
                path: self.output.clone(),
            });
        }

        if let Some(dir) = self.output.parent() {
            fs::create_dir_all(dir).map_err(|source| GenerateError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        fs::write(&self.output, self.render()).map_err(|source| GenerateError::Write {
            path: self.output.clone(),
            source,
        })?;
        self.stamp()?;

        info!(
            output = %self.output.display(),
            records = self.records.len(),
            "generated reflection descriptors"
        );
        self.state = GeneratorState::Emitted;
        Ok(GenerateOutcome::Emitted {
            path: self.output.clone(),
            records: self.records.len(),
        })
    }

    /// Artifact text for the accumulated records.
    pub fn render(&self) -> String {
        let source_name = self
            .source
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();

        Artifact {
            source_name: &source_name,
            include: self.include.as_deref(),
            records: &self.records,
        }
        .to_string()
    }

    /// Set the artifact's modification time to `max(now, source mtime)` so
    /// the next staleness check skips even when the source carries a future
    /// timestamp.
    fn stamp(&self) -> Result<(), GenerateError> {
        let now = SystemTime::now();
        let mtime = match modified(&self.source) {
            Some(source_mtime) if source_mtime > now => source_mtime,
            _ => now,
        };

        fs::File::options()
            .write(true)
            .open(&self.output)
            .and_then(|file| file.set_modified(mtime))
            .map_err(|source| GenerateError::Timestamp {
                path: self.output.clone(),
                source,
            })
    }
}

impl RecordSink for Generator {
    fn push(&mut self, record: Record) {
        debug!(record = %record.qualified_name(), "accumulated record");
        self.records.push(record);
        self.state = GeneratorState::Accumulating;
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// `<source dir>/<output dir>/<stem>.<extension>`
fn output_path(source: &Path, config: &OutputConfig) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    let dir = source.parent().unwrap_or(Path::new(""));
    dir.join(&config.dir)
        .join(format!("{}.{}", stem, config.extension))
}

/// Path of the source relative to the output directory, with `/`
/// separators. Falls back to the source path itself when the output
/// directory is absolute or climbs out with `..`.
fn include_path(source: &Path, dir: &Path) -> String {
    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut up = String::new();
    for component in dir.components() {
        match component {
            Component::Normal(_) => up.push_str("../"),
            Component::CurDir => {}
            _ => return source.to_string_lossy().replace('\\', "/"),
        }
    }
    up + &file_name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::RecordKind;
    use std::time::Duration;
    use tempfile::TempDir;

    fn set_mtime(path: &Path, mtime: SystemTime) {
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
    }

    fn setup() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("player.h");
        fs::write(&source, "struct [[META]] Player {};\n").unwrap();
        (temp, source)
    }

    #[test]
    fn test_output_and_include_paths() {
        let config = OutputConfig::default();
        let generator = Generator::new("src/player.h", &config);
        assert_eq!(
            generator.output_path(),
            Path::new("src/generated/player.refl.hpp")
        );
        assert_eq!(generator.include.as_deref(), Some("../player.h"));

        let config = OutputConfig {
            dir: PathBuf::from("out/meta"),
            extension: "gen.h".to_string(),
            include_source: true,
        };
        let generator = Generator::new("player.h", &config);
        assert_eq!(generator.output_path(), Path::new("out/meta/player.gen.h"));
        assert_eq!(generator.include.as_deref(), Some("../../player.h"));

        let config = OutputConfig {
            include_source: false,
            ..OutputConfig::default()
        };
        assert_eq!(Generator::new("player.h", &config).include, None);
    }

    #[test]
    fn test_missing_output_must_generate() {
        let (_temp, source) = setup();
        let generator = Generator::new(&source, &OutputConfig::default());
        assert_eq!(generator.check_staleness(), Staleness::MustGenerate);
    }

    #[test]
    fn test_staleness_follows_mtimes() {
        let (_temp, source) = setup();
        let mut generator = Generator::new(&source, &OutputConfig::default());
        generator.generate().unwrap();
        assert_eq!(generator.check_staleness(), Staleness::UpToDate);

        let later = SystemTime::now() + Duration::from_secs(3600);
        set_mtime(&source, later);
        assert_eq!(generator.check_staleness(), Staleness::MustGenerate);

        set_mtime(generator.output_path(), later);
        assert_eq!(generator.check_staleness(), Staleness::UpToDate);
    }

    #[test]
    fn test_force_ignores_mtimes() {
        let (_temp, source) = setup();
        let mut generator = Generator::new(&source, &OutputConfig::default());
        generator.generate().unwrap();

        let generator = Generator::new(&source, &OutputConfig::default()).force(true);
        assert_eq!(generator.check_staleness(), Staleness::MustGenerate);
    }

    #[test]
    fn test_generate_writes_records_and_skips_when_fresh() {
        let (_temp, source) = setup();
        let mut generator = Generator::new(&source, &OutputConfig::default());
        assert_eq!(generator.state(), GeneratorState::Idle);
        generator.push(Record::new("Player", vec![], vec![], true, RecordKind::Struct));
        assert_eq!(generator.state(), GeneratorState::Accumulating);

        let outcome = generator.generate().unwrap();
        assert_eq!(
            outcome,
            GenerateOutcome::Emitted {
                path: generator.output_path().to_path_buf(),
                records: 1,
            }
        );
        assert_eq!(generator.state(), GeneratorState::Emitted);

        let text = fs::read_to_string(generator.output_path()).unwrap();
        assert!(text.contains("#include \"../player.h\""));
        assert!(text.contains(r#"Record{ Name<"Player">, Namespaces<>, Templates<>, Bases<> }"#));

        let mut again = Generator::new(&source, &OutputConfig::default());
        assert!(matches!(again.generate().unwrap(), GenerateOutcome::Skipped { .. }));
        assert_eq!(again.state(), GeneratorState::Skipped);
    }

    #[test]
    fn test_future_source_mtime_still_skips_after_generation() {
        let (_temp, source) = setup();
        set_mtime(&source, SystemTime::now() + Duration::from_secs(86_400));

        let mut generator = Generator::new(&source, &OutputConfig::default());
        generator.generate().unwrap();
        assert_eq!(generator.check_staleness(), Staleness::UpToDate);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let (temp, source) = setup();
        // A file where the output directory should be.
        fs::write(temp.path().join("generated"), "").unwrap();

        let mut generator = Generator::new(&source, &OutputConfig::default());
        let err = generator.generate().unwrap_err();
        assert!(matches!(err, GenerateError::CreateDir { .. }));
        assert_eq!(err.path(), temp.path().join("generated").as_path());
    }
}
