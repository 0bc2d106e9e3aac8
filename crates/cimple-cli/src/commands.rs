//! The `compile` subcommand's implementation: read the source file, run the
//! pipeline, and write the listing(s) next to it.

use std::path::Path;

use tracing::{debug, info};

use crate::cli::CompileArgs;

/// Process exit codes per the external interface contract: `0` success,
/// `2` a `CompilationError`, `1` any other failure (I/O).
pub enum ExitCode {
    Success = 0,
    Failure = 1,
    CompilationError = 2,
}

pub fn run_compile(args: CompileArgs) -> ExitCode {
    let source = match std::fs::read_to_string(&args.source_file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: failed to read {}: {e}", args.source_file.display());
            return ExitCode::Failure;
        }
    };
    info!(path = %args.source_file.display(), "read source file");

    let result = match cimple_compiler::compile(&source, args.gen_c) {
        Ok(result) => result,
        Err(err) => {
            println!("{err}");
            return ExitCode::CompilationError;
        }
    };
    debug!(bytes = result.assembly.len(), "assembly generated");

    let asm_path = with_extension(&args.source_file, "asm");
    if let Err(e) = std::fs::write(&asm_path, &result.assembly) {
        eprintln!("error: failed to write {}: {e}", asm_path.display());
        return ExitCode::Failure;
    }
    info!(path = %asm_path.display(), "wrote assembly listing");

    if let Some(c) = result.c {
        let c_path = with_extension(&args.source_file, "c");
        if let Err(e) = std::fs::write(&c_path, &c) {
            eprintln!("error: failed to write {}: {e}", c_path.display());
            return ExitCode::Failure;
        }
        info!(path = %c_path.display(), "wrote C translation");
    }

    ExitCode::Success
}

/// `<source-file>.<ext>`, appending rather than replacing any extension
/// `source_file` already has.
fn with_extension(source_file: &Path, ext: &str) -> std::path::PathBuf {
    let mut name = source_file.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    std::path::PathBuf::from(name)
}
