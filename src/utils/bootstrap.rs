//! Bootstrap utilities for the ordermgmt binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LOG_ENV_VAR;

/// Initialize tracing with the ORDERMGMT_LOG environment variable.
///
/// Defaults to "info" level if ORDERMGMT_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Value of a `--config <path>` (or `--config=<path>`) argument, if any.
pub fn parse_config_path<I>(args: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            return args.next();
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(path.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_config_path() {
        assert_eq!(
            parse_config_path(args(&["ordermgmt", "--config", "prod.yaml"])),
            Some("prod.yaml".to_string())
        );
        assert_eq!(
            parse_config_path(args(&["ordermgmt", "--config=dev.yaml"])),
            Some("dev.yaml".to_string())
        );
        assert_eq!(
            parse_config_path(args(&["ordermgmt", "-c", "x.yaml"])),
            Some("x.yaml".to_string())
        );
    }

    #[test]
    fn test_parse_config_path_absent() {
        assert_eq!(parse_config_path(args(&["ordermgmt"])), None);
        assert_eq!(parse_config_path(args(&["ordermgmt", "--config"])), None);
    }
}
