//! Subscriber setup for the `checkconf` binary.

use tracing_subscriber::EnvFilter;

use crate::error::{CheckConfError, Result};

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `default_directive`. Records emitted
/// through the `log` facade are forwarded to the subscriber. Fails if a
/// subscriber or logger is already installed.
pub fn init(default_directive: &str) -> Result<()> {
    let filter = build_filter(default_directive)?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CheckConfError::Logging(e.to_string()))?;

    tracing_log::LogTracer::init().map_err(|e| CheckConfError::Logging(e.to_string()))
}

fn build_filter(default_directive: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|e| CheckConfError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_directive_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(matches!(
            build_filter("checkconf=notalevel"),
            Err(CheckConfError::Logging(_))
        ));
    }

    #[test]
    fn test_valid_directive_is_accepted() {
        assert!(build_filter("checkconf=debug,warn").is_ok());
    }
}
