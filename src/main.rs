use clap::Parser;
use simple_logger::SimpleLogger;

use jackc::cli::Cli;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    SimpleLogger::new()
        .with_level(args.log_level())
        .init()
        .map_err(|e| anyhow::anyhow!("Initialising logger: {e}"))?;

    jackc::run(&args)
}
