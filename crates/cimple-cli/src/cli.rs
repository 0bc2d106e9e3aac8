//! Argument surface: a single `compile` subcommand, plus the `-v`/`-vv`
//! verbosity flags that drive the `tracing` subscriber.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cimple", bin_name = "cimple")]
#[command(about = "Compiler for the Cimple teaching language")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v for info, -vv for debug).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile a Cimple source file to assembly, optionally also to C.
    Compile(CompileArgs),
}

#[derive(clap::Args)]
pub struct CompileArgs {
    /// Path to the Cimple source file.
    pub source_file: PathBuf,

    /// Also emit a restricted C translation (rejected if the program
    /// declares any function or procedure).
    #[arg(long = "gen-c")]
    pub gen_c: bool,
}

impl Cli {
    pub fn filter_directive(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
