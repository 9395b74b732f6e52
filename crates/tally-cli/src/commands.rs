use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use tally_server::{ServerConfig, TallyServer};
use tracing_subscriber::EnvFilter;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args, cli.verbose),
        Command::Config(args) => cmd_config(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(p) => ServerConfig::load(p)
            .with_context(|| format!("failed to load config from {}", p.display())),
        None => Ok(ServerConfig::default()),
    }
}

/// `RUST_LOG` wins; otherwise the configured level, or `debug` with `--verbose`.
fn init_tracing(config: &ServerConfig, verbose: bool) {
    let fallback = if verbose { "debug" } else { config.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn cmd_serve(args: ServeArgs, verbose: bool) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if args.no_cache {
        config.service.cache_enabled = false;
    }
    init_tracing(&config, verbose);
    tracing::info!(
        source = ?args.config,
        bind = %config.bind_addr,
        cache_enabled = config.service.cache_enabled,
        max_cached_lists = config.service.max_cached_lists,
        "configuration loaded"
    );

    println!(
        "{} Tally server on {} (cache {})",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        if config.service.cache_enabled { "on".green() } else { "off".yellow() },
    );

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(TallyServer::new(config).serve())?;
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_reports_path() {
        let err = load_config(Some(Path::new("/nonexistent/tally.toml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tally.toml"));
    }

    #[test]
    fn no_path_gives_defaults() {
        assert_eq!(load_config(None).unwrap(), ServerConfig::default());
    }
}
