//! callflow worker binary: runs the consent-gated member-services call.
//!
//! `callflow-worker [start|console] [config-path]`
//!
//! `start` (the default) creates the configured LiveKit room, joins it over
//! a simulated media path and takes caller turns from stdin. `console` runs
//! the same flow over stdin/stdout without a room.

mod config;
mod entrypoint;

use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Start,
    Console,
}

/// Splits `args` (without the program name) into a mode and an optional
/// config path. An unrecognised first argument is treated as the path.
fn parse_args(args: &[String]) -> (Mode, Option<String>) {
    let mut rest = args.iter().filter(|a| !a.trim().is_empty());
    match rest.next().map(String::as_str) {
        Some("console") => (Mode::Console, rest.next().cloned()),
        Some("start") => (Mode::Start, rest.next().cloned()),
        Some(path) => (Mode::Start, Some(path.to_string())),
        None => (Mode::Start, None),
    }
}

fn resolve_config_path(cli: Option<String>) -> (String, &'static str) {
    if let Some(path) = cli {
        return (path, "cli-arg");
    }

    if let Ok(path) = std::env::var("CALLFLOW_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (path, "env-var");
        }
    }

    ("callflow.toml".to_string(), "default")
}

#[tokio::main]
async fn main() -> ExitCode {
    // Credentials usually come from a local .env during development.
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (mode, cli_path) = parse_args(&args);
    let (config_path, config_source) = resolve_config_path(cli_path);

    let config = match config::load_config(Some(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration from {config_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = %config_path,
        mode = ?mode,
        "resolved startup configuration"
    );

    let result = match mode {
        Mode::Start => entrypoint::run_room(config).await,
        Mode::Console => entrypoint::run_console(config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "call failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_to_start_mode() {
        assert_eq!(parse_args(&[]), (Mode::Start, None));
    }

    #[test]
    fn console_mode_with_path() {
        assert_eq!(
            parse_args(&args(&["console", "dev.toml"])),
            (Mode::Console, Some("dev.toml".to_string()))
        );
    }

    #[test]
    fn bare_path_implies_start() {
        assert_eq!(
            parse_args(&args(&["prod.toml"])),
            (Mode::Start, Some("prod.toml".to_string()))
        );
    }

    #[test]
    fn cli_path_wins_over_default() {
        let (path, source) = resolve_config_path(Some("x.toml".to_string()));
        assert_eq!(path, "x.toml");
        assert_eq!(source, "cli-arg");
    }
}
