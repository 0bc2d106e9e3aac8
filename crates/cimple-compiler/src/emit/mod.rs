//! Lowers quads belonging to one block into RISC-style target assembly.

pub mod c_emitter;

use cimple_ir::{Category, Mode, Op, Operand, PassMode, Quad};

use crate::analyze::SymbolTable;

const DATA_PREAMBLE: &[&str] = &[".data", "str_nl: .asciiz \"\\n\"", ".text", ".global __start", "__start:", "j Lmain"];

/// Accumulates assembly lines across successive `compile_block` calls, one
/// per block as the parser finishes it (innermost-first, matching the
/// nesting order parsing naturally unwinds in).
#[derive(Default)]
pub struct AssemblyGenerator {
    lines: Vec<String>,
}

impl AssemblyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `quads` for the sub-sequence belonging to `block_name` (from its
    /// `begin_block` to its `end_block`) and lower each quad in turn. `st`
    /// must still have the block's own scope on top — callers invoke this
    /// before popping it.
    pub fn compile_block(&mut self, quads: &[Quad], st: &SymbolTable, block_name: &str) {
        let mut inside = false;

        for q in quads {
            if q.op == Op::BeginBlock && q.x.as_ident() == Some(block_name) {
                inside = true;
            }
            if inside {
                let asm = self.quad_to_asm(q, st);
                self.lines.extend(asm);
            }
            if q.op == Op::EndBlock && q.x.as_ident() == Some(block_name) {
                break;
            }
        }
    }

    /// Render the accumulated listing with the fixed `.data`/`.text`
    /// preamble, tab-indenting every instruction and leaving labels
    /// flush-left.
    pub fn into_asm(self) -> String {
        DATA_PREAMBLE
            .iter()
            .map(|s| s.to_string())
            .chain(self.lines)
            .map(|line| if line.ends_with(':') { line } else { format!("\t{line}") })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn quad_to_asm(&mut self, q: &Quad, st: &SymbolTable) -> Vec<String> {
        let mut asm = vec![format!("{}:", q.label)];
        let framelength = st.current_scope().offset;

        match q.op {
            Op::BeginBlock => {
                if matches!(&q.z, Operand::Ident(s) if s == "main") {
                    asm.push("Lmain:".into());
                    asm.push(format!("addi sp,sp,{framelength}"));
                    asm.push("mv gp,sp".into());
                } else {
                    asm.push(format!("addi sp,sp,{framelength}"));
                    asm.push("sw ra,(sp)".into());
                }
                asm
            }
            Op::EndBlock => asm,
            Op::Assign => {
                asm.extend(self.loadvr(&q.x, "t1", st));
                asm.extend(self.storerv("t1", &q.z, st));
                asm
            }
            op if op.is_arithmetic() => {
                let mnemonic = match op {
                    Op::Add => "add",
                    Op::Sub => "sub",
                    Op::Mul => "mul",
                    Op::Div => "div",
                    _ => unreachable!(),
                };
                asm.extend(self.loadvr(&q.x, "t1", st));
                asm.extend(self.loadvr(&q.y, "t2", st));
                asm.push(format!("{mnemonic} t1,t1,t2"));
                asm.extend(self.storerv("t1", &q.z, st));
                asm
            }
            Op::Jump => {
                asm.push(format!("j {}", q.z));
                asm
            }
            op if op.is_relational() => {
                let mnemonic = match op {
                    Op::Eq => "beq",
                    Op::Ne => "bne",
                    Op::Gt => "bgt",
                    Op::Lt => "blt",
                    Op::Ge => "bge",
                    Op::Le => "ble",
                    _ => unreachable!(),
                };
                asm.extend(self.loadvr(&q.x, "t1", st));
                asm.extend(self.loadvr(&q.y, "t2", st));
                asm.push(format!("{mnemonic} t1,t2,{}", q.label));
                asm
            }
            Op::Retv => {
                asm.extend(self.loadvr(&q.x, "t1", st));
                asm.push("lw t0,-8(sp)".into());
                asm.push("sw t1,(t0)".into());
                asm
            }
            Op::Call => {
                let name = q.x.as_ident().expect("call target is an identifier");
                let ent = st
                    .find(name, &[Category::Function, Category::Procedure], None)
                    .expect("call target is declared");

                if ent.scope() == st.current_depth() {
                    asm.push("lw t0,-4(sp)".into());
                    asm.push("sw t0,-4(fp)".into());
                } else {
                    asm.push("sw sp,-4(fp)".into());
                }
                // The caller steps over its own frame (not the callee's) to
                // place the callee's activation record, then steps back by
                // the same amount once the callee returns.
                asm.push(format!("addi sp,sp,{framelength}"));
                asm.push(format!("jal {name}"));
                asm.push(format!("addi sp,sp,-{framelength}"));
                asm
            }
            Op::Out => {
                asm.extend(self.loadvr(&q.x, "t1", st));
                asm.push("mv a0,t1".into());
                asm.push("li a7,1".into());
                asm.push("ecall".into());
                asm.push("la a0,str_nl".into());
                asm.push("li a7,4".into());
                asm.push("ecall".into());
                asm
            }
            Op::Inp => {
                asm.push("li a7,5".into());
                asm.push("ecall".into());
                asm.extend(self.storerv("a0", &q.x, st));
                asm
            }
            Op::Par => {
                asm.extend(self.par_to_asm(q, st));
                asm
            }
            Op::Halt => {
                asm.push("li a0,0".into());
                asm.push("li a7,93".into());
                asm.push("ecall".into());
                asm
            }
        }
    }

    /// Lower one `par` quad. A `CV`/`REF` parameter occupies a fixed,
    /// positional slot in the callee's about-to-be-active frame
    /// (`12 + 4 * index`) — the same layout every callee's own formal
    /// parameters were assigned by the symbol table. The index is the one
    /// the parser planted in the quad's `z` field at emission time, not
    /// reconstructed here by counting quads: a nested function call inside
    /// one of this call's own actual expressions emits and closes out its
    /// *own* complete `par`/`call` group first, so a flat forward count
    /// across the whole quad stream can't tell the two calls' parameters
    /// apart.
    fn par_to_asm(&self, q: &Quad, st: &SymbolTable) -> Vec<String> {
        let mode = match &q.y {
            Operand::Mode(m) => *m,
            _ => unreachable!("par's y operand is always a pass mode"),
        };

        match mode {
            PassMode::Cv => {
                let index = match q.z {
                    Operand::IntLit(n) => n,
                    _ => unreachable!("CV par's z operand is always the actual's positional index"),
                };
                let slot = 12 + 4 * index;
                let mut asm = self.loadvr(&q.x, "t0", st);
                asm.push(format!("sw t0,-{slot}(fp)"));
                asm
            }
            PassMode::Ref => {
                let index = match q.z {
                    Operand::IntLit(n) => n,
                    _ => unreachable!("REF par's z operand is always the actual's positional index"),
                };
                let slot = 12 + 4 * index;
                let mut asm = self.addr_of(q.x.as_ident().expect("REF par source is always a declared identifier"), st);
                asm.push(format!("sw t0,-{slot}(fp)"));
                asm
            }
            PassMode::Ret => {
                let name = q.x.as_ident().expect("RET par source is always a declared temporary");
                let ent = st
                    .find(name, &[Category::TmpVariable], None)
                    .unwrap_or_else(|| panic!("{name} must be declared wherever it is referenced"));
                vec![
                    format!("addi t0,sp,-{}", ent.offset().expect("storage entity has an offset")),
                    "sw t0,-8(fp)".into(),
                ]
            }
        }
    }

    fn loadvr(&self, operand: &Operand, reg: &str, st: &SymbolTable) -> Vec<String> {
        match operand {
            Operand::IntLit(n) => vec![format!("li {reg},{n}")],
            Operand::Ident(name) => self.sl_vr(name, reg, false, st),
            _ => unreachable!("loadvr operand must be a literal or identifier"),
        }
    }

    fn storerv(&self, reg: &str, operand: &Operand, st: &SymbolTable) -> Vec<String> {
        match operand {
            Operand::Ident(name) => self.sl_vr(name, reg, true, st),
            _ => unreachable!("storerv target must be an identifier"),
        }
    }

    /// Load (`store=false`) or store (`store=true`) a variable/parameter/
    /// temporary through `reg`.
    fn sl_vr(&self, name: &str, reg: &str, store: bool, st: &SymbolTable) -> Vec<String> {
        let ent = st
            .find(name, &[Category::Variable, Category::Parameter, Category::TmpVariable], None)
            .unwrap_or_else(|| panic!("{name} must be declared wherever it is referenced"));
        let stmt = if store { "sw" } else { "lw" };
        let offset = ent.offset().expect("storage entity has an offset");

        if ent.scope() == 0 {
            vec![format!("{stmt} {reg},-{offset}(gp)")]
        } else if ent.scope() == st.current_depth() {
            if ent.mode() == Some(Mode::Inout) {
                vec![format!("lw t0,-{offset}(sp)"), format!("{stmt} {reg},(t0)")]
            } else {
                vec![format!("{stmt} {reg},-{offset}(sp)")]
            }
        } else {
            let mut asm = self.gnvlcode(name, st);
            if ent.mode() == Some(Mode::Inout) {
                asm.push("lw t0,(t0)".into());
            }
            asm.push(format!("{stmt} {reg},(t0)"));
            asm
        }
    }

    /// `t0 = &name`, for passing `name` on as a `REF`/`inout` actual.
    ///
    /// For an ordinary variable/parameter this is the same address
    /// `sl_vr` would load/store through. For an `inout` parameter, though,
    /// that slot already *holds* the address of the variable it refers
    /// to — forwarding the reference means loading that stored pointer,
    /// not computing the address of the slot itself.
    fn addr_of(&self, name: &str, st: &SymbolTable) -> Vec<String> {
        let ent = st
            .find(name, &[Category::Variable, Category::Parameter, Category::TmpVariable], None)
            .unwrap_or_else(|| panic!("{name} must be declared wherever it is referenced"));
        let offset = ent.offset().expect("storage entity has an offset");

        if ent.scope() == 0 {
            vec![format!("addi t0,gp,-{offset}")]
        } else if ent.scope() == st.current_depth() {
            if ent.mode() == Some(Mode::Inout) {
                vec![format!("lw t0,-{offset}(sp)")]
            } else {
                vec![format!("addi t0,sp,-{offset}")]
            }
        } else {
            let mut asm = self.gnvlcode(name, st);
            if ent.mode() == Some(Mode::Inout) {
                asm.push("lw t0,(t0)".into());
            }
            asm
        }
    }

    /// `t0 = &name`, chasing the static/access-link chain from the current
    /// frame's `sp` out to the scope that declared `name`.
    fn gnvlcode(&self, name: &str, st: &SymbolTable) -> Vec<String> {
        let ent = st
            .find(name, &[Category::Variable, Category::TmpVariable, Category::Parameter], None)
            .unwrap_or_else(|| panic!("{name} must be declared wherever it is referenced"));
        let hops = st.current_depth() - ent.scope();

        let mut asm = vec!["lw t0,-4(sp)".to_string()];
        asm.extend(std::iter::repeat("lw t0,-4(t0)".to_string()).take(hops));
        asm.push(format!("addi t0,t0,-{}", ent.offset().expect("storage entity has an offset")));
        asm
    }
}
