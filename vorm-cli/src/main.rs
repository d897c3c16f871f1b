//! vorm CLI - Command-line interface for the vorm vector ORM.

use clap::Parser;

use vorm_cli::cli::{Cli, Command};
use vorm_cli::commands;
use vorm_cli::error::CliResult;
use vorm_cli::{logging, output};

fn main() {
    if let Err(e) = run() {
        output::newline();
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    match cli.command {
        Command::Init(args) => commands::init::run(args),
        Command::Migrate(args) => commands::migrate::run(&cli.global, args),
        Command::Version => commands::version::run(),
    }
}
