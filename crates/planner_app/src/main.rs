use clap::Parser;
use planner_app::{cli::Cli, config::AppConfig, run};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    config.apply_overrides(cli.store, cli.limit);
    let mut stdout = std::io::stdout().lock();
    if let Err(err) = run(cli.command, &config, &mut stdout) {
        tracing::debug!(error = ?err, "command failed");
        eprintln!("planner: {err:#}");
        std::process::exit(1);
    }
}
