mod platform;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = platform::cli::CliArgs::parse();
    platform::run_app(args)
}
