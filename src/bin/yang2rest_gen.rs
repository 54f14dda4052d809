use clap::Parser;
use yang2rest::cli::{run_cli, Cli};
use yang2rest::logging::{init_logging, LogConfig};

fn main() -> anyhow::Result<()> {
    init_logging(&LogConfig::from_env())?;
    let cli = Cli::parse();
    run_cli(cli)
}
