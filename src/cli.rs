use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};

use crate::config::Config;
use crate::runner::{backtest_jobs, jobs_for, project_jobs};
use crate::source::{JsonFileSource, PriceSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Project,
    Backtest,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub command: Command,
    /// Overrides the configured watchlist when non-empty.
    pub symbols: Vec<String>,
}

pub fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut config_path = None;
    let mut command = None;
    let mut symbols = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter
                    .next()
                    .ok_or_else(|| anyhow!("`{}` requires a path argument", arg))?;
                config_path = Some(PathBuf::from(path));
            }
            "help" | "--help" | "-h" => command = Some(Command::Help),
            "project" if command.is_none() => command = Some(Command::Project),
            "backtest" if command.is_none() => command = Some(Command::Backtest),
            other if other.starts_with('-') => bail!("unknown option `{}`", other),
            other if command.is_none() => bail!(
                "unknown subcommand `{}`. expected one of: project|backtest|help",
                other
            ),
            other => symbols.push(other.to_string()),
        }
    }

    Ok(CliArgs {
        config_path,
        command: command.unwrap_or(Command::Project),
        symbols,
    })
}

pub fn print_usage() {
    println!("pattern-projector [--config PATH] <project|backtest|help> [SYMBOL|@GROUP...]");
    println!();
    println!("  project   replay what followed past repeats of the latest up/down pattern");
    println!("  backtest  project from truncated history and compare with realized closes");
    println!("  help      show this message");
    println!();
    println!("Symbols default to the configured watchlist; @GROUP expands a configured group.");
}

pub async fn run(cli: &CliArgs, config: &Config) -> Result<()> {
    let symbols = config.resolve_symbols(&cli.symbols)?;
    if symbols.is_empty() {
        bail!("no symbols given and the watchlist is empty");
    }
    let jobs = jobs_for(&symbols, &config.projection.intervals);
    let source: Arc<dyn PriceSource> = Arc::new(JsonFileSource::new(&config.data.dir));
    let params = config.projection.params();

    tracing::info!(
        command = ?cli.command,
        jobs = jobs.len(),
        data_dir = %config.data.dir.display(),
        "Running"
    );

    let out = match cli.command {
        Command::Project => {
            let reports = project_jobs(
                source,
                jobs,
                params,
                config.projection.recent_changes_window,
            )
            .await;
            serde_json::to_string_pretty(&reports)
        }
        Command::Backtest => {
            let reports = backtest_jobs(
                source,
                jobs,
                config.backtest.offsets.clone(),
                config.backtest.future_points,
                params,
            )
            .await;
            serde_json::to_string_pretty(&reports)
        }
        Command::Help => {
            print_usage();
            return Ok(());
        }
    }
    .context("failed to serialize report")?;

    println!("{}", out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_to_project() {
        let cli = parse_args(&[]).unwrap();
        assert_eq!(cli.command, Command::Project);
        assert!(cli.symbols.is_empty());
        assert!(cli.config_path.is_none());
    }

    #[test]
    fn parses_config_command_and_symbols() {
        let cli = parse_args(&args(&["--config", "c.toml", "backtest", "AAPL", "^NDX"])).unwrap();
        assert_eq!(cli.config_path, Some(PathBuf::from("c.toml")));
        assert_eq!(cli.command, Command::Backtest);
        assert_eq!(cli.symbols, args(&["AAPL", "^NDX"]));
    }

    #[test]
    fn rejects_unknown_subcommand_and_dangling_option() {
        assert!(parse_args(&args(&["predict"])).is_err());
        assert!(parse_args(&args(&["--config"])).is_err());
        assert!(parse_args(&args(&["project", "--verbose"])).is_err());
    }
}
