//! cxxrefl command-line tool
//!
//! Generates reflection descriptor headers for annotated C++ sources:
//!
//! ```text
//! cxxrefl src/player.h src/world.h
//! cxxrefl --force --out-dir meta src/*.h
//! ```

mod output;
mod telemetry;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use cxxrefl_engine::{Config, FileOutcome, ReflectTool};

use crate::output::{resolve_color_choice, ColorMode, StyledOutput, Summary};

#[derive(Parser)]
#[command(name = "cxxrefl")]
#[command(about = "Generate reflection descriptors for annotated C++ headers", long_about = None)]
#[command(version)]
struct Cli {
    /// Source files to process
    files: Vec<PathBuf>,

    /// Configuration file (default: nearest cxxrefl.toml above each source)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Regenerate even if the output is newer than the source
    #[arg(short, long)]
    force: bool,

    /// Output directory, relative to each source file
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// When to use colored output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.verbose)?;

    let mut out = StyledOutput::new(resolve_color_choice(cli.color));
    if cli.files.is_empty() {
        out.plain("Please input target files.");
        return Ok(());
    }

    let mut tool = ReflectTool::new().force(cli.force);
    if let Some(path) = &cli.config {
        let config = Config::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        tool = tool.with_config(config);
    }
    if let Some(dir) = &cli.out_dir {
        tool = tool.with_out_dir(dir);
    }

    let mut summary = Summary::default();
    for (path, result) in tool.process_files(cli.files.as_slice()) {
        match result {
            Ok(FileOutcome::Generated { output, records }) => {
                summary.generated += 1;
                out.generated(&path, &output, records);
            }
            Ok(FileOutcome::UpToDate { .. }) => {
                summary.up_to_date += 1;
                out.up_to_date(&path);
            }
            Err(err) => {
                summary.failed += 1;
                out.failed(&path, &err);
            }
        }
    }
    out.summary(&summary);

    if summary.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
