//! CLI entry point for rendering animated tile mosaics

use clap::Parser;
use tilemosaic::io::cli::{Cli, SessionRunner};

fn main() -> tilemosaic::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    SessionRunner::new(cli).run()
}
