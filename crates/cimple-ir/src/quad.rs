use std::fmt;

use crate::label::Label;

/// Parameter-passing marker carried on `par` quads: call-by-value,
/// call-by-reference, or function-return-slot binding.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PassMode {
    Cv,
    Ref,
    Ret,
}

impl fmt::Display for PassMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassMode::Cv => write!(f, "CV"),
            PassMode::Ref => write!(f, "REF"),
            PassMode::Ret => write!(f, "RET"),
        }
    }
}

/// The tagged quad operator. A systems-language stand-in for the source's
/// stringly-typed `op` field (see spec Design Notes).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Op {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Jump,
    Call,
    Retv,
    Inp,
    Out,
    Par,
    BeginBlock,
    EndBlock,
    Halt,
}

impl Op {
    /// `true` for the six relational operators, which branch-if-true to `z`.
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            Op::Eq | Op::Ne | Op::Lt | Op::Le | Op::Gt | Op::Ge
        )
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, Op::Add | Op::Sub | Op::Mul | Op::Div)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Op::Assign => ":=",
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Jump => "jump",
            Op::Call => "call",
            Op::Retv => "retv",
            Op::Inp => "inp",
            Op::Out => "out",
            Op::Par => "par",
            Op::BeginBlock => "begin_block",
            Op::EndBlock => "end_block",
            Op::Halt => "halt",
        };
        write!(f, "{s}")
    }
}

/// One operand slot of a quad. Replaces the source's shared string-typed
/// `x`/`y`/`z` fields with a variant that records what kind of value is
/// actually being held.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Operand {
    Empty,
    Ident(String),
    IntLit(u32),
    Label(Label),
    Mode(PassMode),
}

impl Operand {
    pub fn is_empty(&self) -> bool {
        matches!(self, Operand::Empty)
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Operand::Ident(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<Label> {
        match self {
            Operand::Label(l) => Some(*l),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Empty => write!(f, "_"),
            Operand::Ident(s) => write!(f, "{s}"),
            Operand::IntLit(n) => write!(f, "{n}"),
            Operand::Label(l) => write!(f, "{l}"),
            Operand::Mode(m) => write!(f, "{m}"),
        }
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::Ident(s.to_string())
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::Ident(s)
    }
}

/// One three-address instruction `(label, op, x, y, z)`.
///
/// Quads become immutable once every backpatchable field has been set; up
/// to that point `backpatch` may overwrite an `Operand::Empty` `z` exactly
/// once (data model invariant: "a quad's `z` is written at most twice").
#[derive(Clone, Debug)]
pub struct Quad {
    pub label: Label,
    pub op: Op,
    pub x: Operand,
    pub y: Operand,
    pub z: Operand,
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:\t{}, {}, {}, {}", self.label, self.op, self.x, self.y, self.z)
    }
}

/// Append-only quad store with backpatching.
///
/// Labels are assigned densely in insertion order (`L_1..L_N`); stored
/// indices into the backing `Vec` stay valid for the list's entire
/// lifetime, which is what makes backpatching via index lists sound.
#[derive(Default, Debug)]
pub struct QuadList {
    quads: Vec<Quad>,
}

impl QuadList {
    pub fn new() -> Self {
        Self { quads: Vec::new() }
    }

    /// The label the *next* pushed quad will receive, without pushing one.
    /// Used pervasively by the parser to record jump targets before the
    /// target quad itself exists.
    pub fn next_label(&self) -> Label {
        Label::new(self.quads.len() as u32 + 1)
    }

    /// Append a new quad and return its index (stable for the list's
    /// lifetime; usable in a `TrueFalseList`).
    pub fn push(&mut self, op: Op, x: Operand, y: Operand, z: Operand) -> usize {
        let label = self.next_label();
        self.quads.push(Quad { label, op, x, y, z });
        self.quads.len() - 1
    }

    /// Patch the `z` field of every quad at the given indices to `target`,
    /// but only if it is still `Operand::Empty`. Indices whose `z` was
    /// already patched are silently skipped (idempotence, testable
    /// property #5).
    pub fn backpatch(&mut self, indices: &[usize], target: Label) {
        for &idx in indices {
            if let Some(q) = self.quads.get_mut(idx)
                && q.z.is_empty()
            {
                q.z = Operand::Label(target);
            }
        }
    }

    pub fn get(&self, idx: usize) -> &Quad {
        &self.quads[idx]
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Quad> {
        self.quads.iter()
    }

    pub fn as_slice(&self) -> &[Quad] {
        &self.quads
    }
}
