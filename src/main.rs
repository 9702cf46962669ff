use std::io;
use std::process;

use clap::Parser;
use env_logger::Env;
use log::Level;

use task_cli::{Cli, TaskError};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    if let Err(err) = cli.run(&mut stdout.lock()) {
        fatal(&err);
    }
}

// RUST_LOG may silence the logger, but a failed command always says why.
fn fatal(err: &TaskError) -> ! {
    if log::log_enabled!(Level::Error) {
        log::error!("{err}");
    } else {
        eprintln!("error: {err}");
    }
    process::exit(1);
}
