//! Single-pass recursive-descent parser: consumes the lexeme sequence,
//! drives the symbol table, emits quads, and invokes the assembly
//! generator at the end of every block.

pub mod grammar;

use cimple_ir::{Label, Op, Operand, QuadList};

use crate::analyze::{ErrorSite, SymbolTable};
use crate::diagnostics::{CompilationError, ErrorKind, Position, Result};
use crate::emit::AssemblyGenerator;
use crate::lexer::{self, Lexeme};

pub struct Parser {
    tokens: Vec<Lexeme>,
    idx: usize,
    source_lines: Vec<String>,
    quads: QuadList,
    temp_seq: u32,
    st: SymbolTable,
    asm: AssemblyGenerator,
}

/// What a completed parse produced: the lowered listing plus the quads it
/// was derived from, kept around for an optional, separate C translation.
pub struct CompileOutput {
    pub assembly: String,
    pub quads: QuadList,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self> {
        let tokens = lexer::tokenize(source)?;
        Ok(Self {
            tokens,
            idx: 0,
            source_lines: source.split('\n').map(str::to_string).collect(),
            quads: QuadList::new(),
            temp_seq: 0,
            st: SymbolTable::new(),
            asm: AssemblyGenerator::new(),
        })
    }

    pub fn into_output(self) -> CompileOutput {
        CompileOutput { assembly: self.asm.into_asm(), quads: self.quads }
    }

    pub fn quads(&self) -> &QuadList {
        &self.quads
    }

    // ---- token stream -----------------------------------------------

    fn current(&self) -> Result<&Lexeme> {
        self.tokens.get(self.idx).ok_or_else(|| CompilationError::new(ErrorKind::UnexpectedEof))
    }

    fn peek(&self) -> Result<&Lexeme> {
        self.current()
    }

    fn advance(&mut self) -> Result<Lexeme> {
        let t = self.current()?.clone();
        self.idx += 1;
        Ok(t)
    }

    fn site_at(&self, position: Position) -> ErrorSite {
        let line = self.source_lines.get(position.line as usize - 1).map(String::as_str);
        ErrorSite::new(position, line)
    }

    fn site_here(&self) -> ErrorSite {
        match self.current() {
            Ok(t) => self.site_at(t.position),
            Err(_) => ErrorSite::new(Position::new(0, 0), None),
        }
    }

    fn assert_value_is(&mut self, value: &str) -> Result<Lexeme> {
        let t = self.advance()?;
        if t.value != value {
            let site = self.site_at(t.position);
            return Err(site.error(ErrorKind::UnexpectedToken { got: t.value, want: value.to_string() }));
        }
        Ok(t)
    }

    fn assert_value_in(&mut self, values: &[&str]) -> Result<Lexeme> {
        let t = self.advance()?;
        if !t.is_one_of(values) {
            let site = self.site_at(t.position);
            return Err(site.error(ErrorKind::UnexpectedTokenOneOf {
                got: t.value,
                want: values.join(", "),
            }));
        }
        Ok(t)
    }

    fn assert_is_identifier(&mut self) -> Result<Lexeme> {
        let t = self.advance()?;
        let site = self.site_at(t.position);
        if !t.is_alnum() || t.is_digits() {
            return Err(site.error(ErrorKind::ExpectedIdentifier(t.value)));
        }
        if lexer::RESERVED_WORDS.contains(&t.value.as_str()) {
            return Err(site.error(ErrorKind::ReservedWordAsIdentifier(t.value)));
        }
        Ok(t)
    }

    // ---- quads ---------------------------------------------------------

    fn next_quad_label(&self) -> Label {
        self.quads.next_label()
    }

    fn new_quad(&mut self, op: Op, x: Operand, y: Operand, z: Operand) -> usize {
        let idx = self.quads.push(op, x, y, z);
        tracing::trace!(idx, %op, "emit quad");
        idx
    }

    fn backpatch(&mut self, indices: &[usize], target: Label) {
        tracing::trace!(?indices, %target, "backpatch");
        self.quads.backpatch(indices, target);
    }

    fn new_temp(&mut self) -> Result<String> {
        self.temp_seq += 1;
        let name = format!("T_{}", self.temp_seq);
        self.st.add(cimple_ir::Category::TmpVariable, &name, self.site_here())?;
        Ok(name)
    }

    /// Lower `block_name`'s quads to assembly. Called right after its
    /// `end_block` quad is emitted, while its scope is still on top of the
    /// stack — the generator needs it to resolve offsets.
    pub(crate) fn compile_finished_block(&mut self, block_name: &str) {
        self.asm.compile_block(self.quads.as_slice(), &self.st, block_name);
    }
}
