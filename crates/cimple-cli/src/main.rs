mod cli;
mod commands;

use clap::Parser;

use cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.filter_directive())),
        )
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match cli.command {
        Command::Compile(args) => commands::run_compile(args),
    };

    std::process::exit(exit_code as i32);
}
