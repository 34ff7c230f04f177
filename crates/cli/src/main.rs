//! refeed entry point.
//!
//! Loads configuration once, then runs the selected command. Logs go to
//! stderr so `cache stats` output on stdout stays machine-readable.

use std::process::ExitCode;

use clap::Parser;
use refeed_core::{AppConfig, ConfigError, Error};
use tracing_subscriber::EnvFilter;

mod args;
mod commands;

use args::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let command = cli.command.unwrap_or(Command::Run);
    let result: anyhow::Result<()> = async {
        let config = AppConfig::load(cli.config.as_deref(), &cli.overrides)?;
        commands::dispatch(&config, command).await
    }
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "refeed failed");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Configuration problems exit 2; pipeline errors use their own status.
fn exit_code(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<ConfigError>().is_some() {
        2
    } else if let Some(e) = err.downcast_ref::<Error>() {
        e.exit_code()
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_mapping() {
        let err = anyhow::Error::from(ConfigError::Missing { field: "selector".into(), hint: "h".into() });
        assert_eq!(exit_code(&err), 2);

        let err = anyhow::Error::from(Error::CacheInconsistency("u".into()));
        assert_eq!(exit_code(&err), 4);

        let err = anyhow::Error::from(Error::Output("disk".into()));
        assert_eq!(exit_code(&err), 6);

        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }
}
