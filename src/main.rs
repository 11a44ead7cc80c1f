use anyhow::Result;

use pattern_projector::cli::{self, Command};
use pattern_projector::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli_args = match cli::parse_args(&args) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{:#}", e);
            cli::print_usage();
            std::process::exit(2);
        }
    };
    if cli_args.command == Command::Help {
        cli::print_usage();
        return Ok(());
    }

    // Load config
    let config = match Config::load(cli_args.config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Set PROJECTOR_CONFIG or pass --config with a valid TOML file");
            std::process::exit(1);
        }
    };

    // Init tracing (stderr, so stdout stays a clean JSON report)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                config
                    .logging
                    .level
                    .parse()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            }),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .json()
        .init();

    tracing::info!(
        data_dir = %config.data.dir.display(),
        watchlist = config.watchlist.len(),
        "Starting pattern-projector"
    );

    cli::run(&cli_args, &config).await?;

    tracing::info!("Done");
    Ok(())
}
