//! Colored status output.
//!
//! Uses `termcolor` for cross-platform colored terminal output.
//! Respects the `NO_COLOR` environment variable and the `--color` flag.

use std::io::Write;
use std::path::Path;

use clap::ValueEnum;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// `--color` flag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Resolve `ColorChoice` from the CLI flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(mode: ColorMode) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match mode {
        ColorMode::Always => ColorChoice::Always,
        ColorMode::Never => ColorChoice::Never,
        ColorMode::Auto => ColorChoice::Auto,
    }
}

/// Per-run tallies for the summary line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub generated: usize,
    pub up_to_date: usize,
    pub failed: usize,
}

impl Summary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Styled output writer for terminal.
pub struct StyledOutput {
    stdout: StandardStream,
    stderr: StandardStream,
}

impl StyledOutput {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
            stderr: StandardStream::stderr(choice),
        }
    }

    fn write_styled(&mut self, text: &str, color: Option<Color>, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        let _ = self.stdout.set_color(&spec);
        let _ = write!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }

    /// `   Generated player.h -> generated/player.refl.hpp (2 records)`
    pub fn generated(&mut self, source: &Path, output: &Path, records: usize) {
        self.write_styled(&format!("{:>12} ", "Generated"), Some(Color::Green), true);
        let noun = if records == 1 { "record" } else { "records" };
        let _ = writeln!(
            self.stdout,
            "{} -> {} ({} {})",
            source.display(),
            output.display(),
            records,
            noun
        );
    }

    /// `  Up to date player.h`
    pub fn up_to_date(&mut self, source: &Path) {
        self.write_styled(&format!("{:>12} ", "Up to date"), Some(Color::Cyan), true);
        let _ = writeln!(
            self.stdout,
            "{} (reflection file does not need to be regenerated)",
            source.display()
        );
    }

    /// Failure line on stderr.
    pub fn failed(&mut self, source: &Path, error: &dyn std::error::Error) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Red)).set_bold(true);
        let _ = self.stderr.set_color(&spec);
        let _ = write!(self.stderr, "{:>12} ", "Error");
        let _ = self.stderr.reset();
        let _ = writeln!(self.stderr, "{}: {}", source.display(), error);

        let mut cause = error.source();
        while let Some(err) = cause {
            let _ = writeln!(self.stderr, "{:>12} {}", "caused by:", err);
            cause = err.source();
        }
    }

    pub fn summary(&mut self, summary: &Summary) {
        let _ = writeln!(self.stdout);
        let color = if summary.has_failures() {
            Color::Red
        } else {
            Color::Green
        };
        self.write_styled("Done:", Some(color), true);
        let _ = writeln!(
            self.stdout,
            " {} generated, {} up to date, {} failed",
            summary.generated, summary.up_to_date, summary.failed
        );
        let _ = self.stdout.flush();
    }

    pub fn plain(&mut self, text: &str) {
        let _ = writeln!(self.stdout, "{}", text);
    }
}
