mod adapters;
mod cli;
mod config;
mod core;

use std::ffi::OsString;

use clap::Parser;

use cli::output::Console;
use cli::{Cli, Commands};

use crate::core::errors::{EXIT_ERROR, EXIT_USAGE};

fn main() {
    let raw: Vec<OsString> = std::env::args_os().collect();
    if raw.len() < 2 {
        eprintln!("{}", cli::usage());
        std::process::exit(EXIT_ERROR);
    }

    let console = Console::new(cli::wants_verbose(&raw));
    let argv = match cli::prepare_args(raw) {
        Ok(argv) => argv,
        Err(e) => {
            console.error(&format!("Error: {e}"));
            console.usage(&cli::usage());
            std::process::exit(e.exit_code());
        }
    };

    let args = Cli::parse_from(argv);

    let code = match &args.command {
        Commands::Encrypt { args: rest } => {
            console.trace("Command: encrypt");
            cli::commands::encrypt::execute(rest, &args.engine, console)
        }
    };

    if code == EXIT_USAGE {
        console.usage(&cli::usage());
    }
    std::process::exit(code);
}
