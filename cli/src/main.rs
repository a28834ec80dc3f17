mod commands;
mod server;
mod terminal;

use commands::{CommandLine, Commands, scan, serve, watch};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let quiet = commands.quiet;

    logging::init_logging(commands.verbose, quiet)?;
    print::banner(quiet);

    match commands.command {
        Commands::Scan { opts, json } => scan::scan(opts.to_config()?, json, quiet).await,
        Commands::Watch { opts } => watch::watch(opts.to_config()?, quiet).await,
        Commands::Serve { opts, listen } => serve::serve(opts.to_config()?, listen, quiet).await,
    }
}
