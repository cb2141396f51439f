use clap::Parser;
use tracing_subscriber::EnvFilter;

use ec_check::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag; stdout is reserved for the summary
    let filter = if cli.verbose {
        EnvFilter::new("ec_check=debug,info")
    } else {
        EnvFilter::new("ec_check=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Quant(args) => {
            cli::quant::run(args, cli.verbose)?;
        }
        cli::Commands::Validate(args) => {
            cli::validate::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
