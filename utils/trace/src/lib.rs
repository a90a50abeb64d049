use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Output layout of the console logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceFormat {
    #[default]
    Compact,
    Pretty,
}

impl FromStr for TraceFormat {
    type Err = TracingInitError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            other => Err(TracingInitError::UnknownFormat { format: other.to_string() }),
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `level` when set.
pub fn init(level: &str, format: TraceFormat) -> Result<(), TracingInitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|source| TracingInitError::InvalidFilter { source })?;

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        TraceFormat::Compact => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().compact().with_target(false)),
        ),
        TraceFormat::Pretty => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().pretty()))
        }
    }
    .map_err(|source| TracingInitError::SetGlobalDefault { source })?;

    Ok(())
}

#[derive(Debug, Error)]
pub enum TracingInitError {
    #[error("Invalid filter config")]
    InvalidFilter {
        #[from]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to set global default subscriber")]
    SetGlobalDefault {
        #[from]
        source: tracing::subscriber::SetGlobalDefaultError,
    },

    #[error("Unknown log format: {format}")]
    UnknownFormat {
        format: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parses_case_insensitively() {
        assert_eq!("Pretty".parse::<TraceFormat>().unwrap(), TraceFormat::Pretty);
        assert_eq!(" compact ".parse::<TraceFormat>().unwrap(), TraceFormat::Compact);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let err = "json".parse::<TraceFormat>().unwrap_err();
        assert!(matches!(err, TracingInitError::UnknownFormat { ref format } if format == "json"));
    }
}
