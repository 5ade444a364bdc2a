//! Per-file driver
//!
//! Runs one source file through staleness check, parse, record walk and
//! generation. Files are independent: a failure in one never affects
//! another.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigError};
use crate::generator::{GenerateError, GenerateOutcome, Generator, Staleness};
use crate::parser::{LexError, Lexer, Parser};
use crate::reflect::RecordFinder;

/// Errors that stop processing of one file.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The source path does not exist
    #[error("{} does not exist", path.display())]
    MissingSource { path: PathBuf },

    /// The nearest configuration file is invalid
    #[error("configuration for {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    /// The source could not be read
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source could not be tokenized
    #[error("{} could not be tokenized:\n{details}", path.display())]
    Lex {
        path: PathBuf,
        errors: Vec<LexError>,
        /// Errors rendered with source context
        details: String,
    },

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The artifact was newer than the source; nothing was parsed
    UpToDate { output: PathBuf },

    /// The artifact was (re)written
    Generated { output: PathBuf, records: usize },
}

impl FileOutcome {
    pub fn output(&self) -> &Path {
        match self {
            FileOutcome::UpToDate { output } | FileOutcome::Generated { output, .. } => output,
        }
    }
}

/// Reflection tool: turns annotated headers into descriptor artifacts.
#[derive(Debug, Clone, Default)]
pub struct ReflectTool {
    /// Used for every file instead of discovering `cxxrefl.toml`
    config: Option<Config>,

    /// Overrides `output.dir`
    out_dir: Option<PathBuf>,

    force: bool,
}

impl ReflectTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` for every file instead of discovering one per file.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// Regenerate regardless of modification times.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Effective configuration for `source`.
    pub fn config_for(&self, source: &Path) -> Result<Config, ToolError> {
        let mut config = match &self.config {
            Some(config) => config.clone(),
            None => {
                let start = source.parent().unwrap_or(Path::new("."));
                let start = if start.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    start
                };
                Config::discover(start).map_err(|source_err| ToolError::Config {
                    path: source.to_path_buf(),
                    source: source_err,
                })?
            }
        };
        if let Some(dir) = &self.out_dir {
            config.output.dir = dir.clone();
        }
        Ok(config)
    }

    /// Process one source file.
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub fn process_file(&self, path: &Path) -> Result<FileOutcome, ToolError> {
        if !path.exists() {
            return Err(ToolError::MissingSource {
                path: path.to_path_buf(),
            });
        }

        let config = self.config_for(path)?;
        let mut generator = Generator::new(path, &config.output).force(self.force);

        if generator.check_staleness() == Staleness::UpToDate {
            info!("reflection file does not need to be regenerated");
            return Ok(FileOutcome::UpToDate {
                output: generator.output_path().to_path_buf(),
            });
        }

        let source = std::fs::read_to_string(path).map_err(|err| ToolError::Read {
            path: path.to_path_buf(),
            source: err,
        })?;

        let parser = Parser::new(&source).map_err(|errors| ToolError::Lex {
            path: path.to_path_buf(),
            details: Lexer::format_errors(&errors, &source),
            errors,
        })?;

        let (unit, errors) = parser.parse_lenient();
        for error in &errors {
            warn!(%error, "parse error, continuing");
        }
        debug!(declarations = unit.node_count(), "parsed translation unit");

        RecordFinder::new(&mut generator).walk(&unit);

        match generator.generate()? {
            GenerateOutcome::Emitted { path, records } => Ok(FileOutcome::Generated {
                output: path,
                records,
            }),
            GenerateOutcome::Skipped { path } => Ok(FileOutcome::UpToDate { output: path }),
        }
    }

    /// Process files in order, one result per path.
    pub fn process_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> Vec<(PathBuf, Result<FileOutcome, ToolError>)> {
        paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                let result = self.process_file(path);
                if let Err(err) = &result {
                    warn!(path = %path.display(), error = %err, "file failed");
                }
                (path.to_path_buf(), result)
            })
            .collect()
    }
}
