//! Log output setup.

use std::sync::OnceLock;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

#[derive(Debug, Error)]
pub enum TelemetryInitError {
    #[error("invalid tracing filter directive `{directive}`: {source}")]
    InvalidFilter {
        directive: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("failed to install tracing subscriber: {0}")]
    SetGlobalDefault(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Filter used when `RUST_LOG` is unset, by `-v` count.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "cxxrefl=warn,cxxrefl_engine=warn",
        1 => "cxxrefl=info,cxxrefl_engine=info",
        2 => "cxxrefl=debug,cxxrefl_engine=debug",
        _ => "cxxrefl=trace,cxxrefl_engine=trace",
    }
}

/// Install compact log output on stderr.
///
/// `RUST_LOG` wins over `verbosity` when set. Repeated calls are no-ops.
pub fn init_tracing(verbosity: u8) -> Result<(), TelemetryInitError> {
    if TRACING_INITIALIZED.get().is_some() {
        return Ok(());
    }

    let filter = resolve_filter(verbosity)?;
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    let _ = TRACING_INITIALIZED.set(());
    Ok(())
}

fn resolve_filter(verbosity: u8) -> Result<EnvFilter, TelemetryInitError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => {
            let directive = default_directive(verbosity);
            EnvFilter::try_new(directive).map_err(|source| TelemetryInitError::InvalidFilter {
                directive: directive.to_string(),
                source,
            })
        }
    }
}
