use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    credkeeper::util::logging::init();
    let cli = credkeeper::cli::Cli::parse();
    cli.run()
}
