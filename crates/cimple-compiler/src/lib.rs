//! Cimple compiler: lexer, symbol table, parser, and code generators.
//!
//! - `lexer` — lexical analysis: source text to lexeme sequence.
//! - `analyze` — the symbol table: a stack of lexical scopes.
//! - `parser` — single-pass recursive descent, driving `analyze` and
//!   `cimple_ir` to build quads with backpatched control flow.
//! - `emit` — the assembly generator and restricted C emitter.
//! - `diagnostics` — the single structured `CompilationError`.

pub mod analyze;
pub mod diagnostics;
pub mod emit;
pub mod lexer;
pub mod parser;

use diagnostics::Result;

pub use parser::CompileOutput;

/// Everything [`compile`] can hand back: the assembly listing and,
/// when requested, its restricted C translation.
pub struct CompileResult {
    pub assembly: String,
    pub c: Option<String>,
}

/// Compile `source` end to end.
///
/// Runs the full pipeline — lex, parse (with integrated semantic checks,
/// quad emission and backpatching), and per-block assembly generation —
/// and, if `gen_c` is set, the restricted C emitter over the resulting
/// quads. A single [`diagnostics::CompilationError`] covers failure at any
/// stage, including the C emitter's function-free restriction.
pub fn compile(source: &str, gen_c: bool) -> Result<CompileResult> {
    tracing::info!(bytes = source.len(), gen_c, "compiling");

    let mut parser = parser::Parser::new(source)?;
    parser.parse_program()?;
    let output = parser.into_output();
    tracing::info!(quads = output.quads.len(), "parse complete");

    let c = gen_c.then(|| emit::c_emitter::generate(output.quads.as_slice())).transpose()?;

    Ok(CompileResult { assembly: output.assembly, c })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn compiles_a_minimal_program_to_assembly() {
        let source = indoc! {"
            program demo
            {
                declare a;
                a := 1;
                print(a)
            }.
        "};
        let result = compile(source, false).unwrap();
        assert!(result.assembly.starts_with(".data"));
        assert!(result.c.is_none());
    }

    #[test]
    fn gen_c_is_rejected_when_the_program_declares_a_procedure() {
        let source = indoc! {"
            program demo
            {
                declare a;
                procedure p()
                {
                    a := 1
                }
                a := 0;
                call p()
            }.
        "};
        let err = compile(source, true).unwrap_err();
        assert!(err.to_string().contains("Cannot generate C code"));
    }

    #[test]
    fn gen_c_succeeds_for_a_function_free_program() {
        let source = indoc! {"
            program demo
            {
                declare a, b;
                a := 1;
                b := a + 2;
                print(b)
            }.
        "};
        let result = compile(source, true).unwrap();
        assert!(result.c.unwrap().contains("printf"));
    }

    #[test]
    fn reports_undeclared_variable() {
        let source = indoc! {"
            program demo
            {
                a := 1
            }.
        "};
        let err = compile(source, false).unwrap_err();
        assert!(err.to_string().contains("does not belong to"));
    }
}
