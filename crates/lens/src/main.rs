use std::io::{self, Write as _};

use anyhow::Error;
use clap::Parser as _;
use tokio::runtime::Runtime;

use crate::cli::Cli;

mod cli;
mod commands;

fn main() -> Result<(), Error> {
    env_logger::init();

    let cli = Cli::parse();
    let runtime = Runtime::new()?;
    let mut stdout = io::stdout().lock();
    runtime.block_on(commands::run(cli, &mut stdout))?;
    stdout.flush()?;
    Ok(())
}
