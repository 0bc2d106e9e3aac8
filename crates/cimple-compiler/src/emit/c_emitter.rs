//! Restricted one-to-one C translation, valid only for function-free
//! programs (no static links to synthesize).

use indexmap::IndexSet;

use cimple_ir::{Label, Op, Operand, Quad};

use crate::diagnostics::{CompilationError, ErrorKind, Result};

/// Translate every quad to an equivalent labeled C statement inside a single
/// `main()`. Fails with [`ErrorKind::CNotSupported`] if any `begin_block`
/// other than the program's own appears in `quads`.
pub fn generate(quads: &[Quad]) -> Result<String> {
    let mut variables = IndexSet::new();

    for q in quads {
        if q.op == Op::BeginBlock && q.label != Label::new(1) {
            return Err(CompilationError::new(ErrorKind::CNotSupported));
        }
        for operand in [&q.x, &q.y, &q.z] {
            if let Operand::Ident(name) = operand {
                variables.insert(name.clone());
            }
        }
    }

    let declarations = format!("int {};\n", variables.into_iter().collect::<Vec<_>>().join(", "));
    let body: String = quads
        .iter()
        .map(|q| format!("// {q}\n{}:\t {};\n", q.label, to_c(q)))
        .collect();

    Ok(format!("#include <stdlib.h>\n#include <stdio.h>\nint main() {{\n{declarations}{body}\nreturn 0;\n}}"))
}

fn to_c(q: &Quad) -> String {
    match q.op {
        Op::Add | Op::Sub | Op::Mul | Op::Div => format!("{} = {} {} {}", q.z, q.x, q.op, q.y),
        Op::Eq | Op::Ne | Op::Lt | Op::Le | Op::Gt | Op::Ge => {
            let op = match q.op {
                Op::Ne => "!=",
                Op::Eq => "==",
                other => return format!("if ({} {other} {}) goto {}", q.x, q.y, q.z),
            };
            format!("if ({} {op} {}) goto {}", q.x, q.y, q.z)
        }
        Op::Jump => format!("goto {}", q.z),
        Op::Assign => format!("{} = {}", q.z, q.x),
        Op::Out => format!("printf(\"%d\\n\", {})", q.x),
        Op::Inp => format!("scanf(\"%d\", &{})", q.x),
        Op::BeginBlock | Op::Halt | Op::EndBlock => String::new(),
        Op::Call | Op::Retv | Op::Par => {
            unreachable!("function-free programs never emit call/retv/par quads")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cimple_ir::{Op, Operand, QuadList};

    #[test]
    fn maps_ne_and_eq_operators() {
        let mut quads = QuadList::new();
        quads.push(Op::Ne, Operand::from("a"), Operand::from("b"), Operand::Empty);
        quads.push(Op::Eq, Operand::from("a"), Operand::from("b"), Operand::Empty);
        let c = generate(quads.as_slice()).unwrap();
        assert!(c.contains("a != b"));
        assert!(c.contains("a == b"));
    }

    #[test]
    fn rejects_programs_with_a_second_block() {
        let mut quads = QuadList::new();
        quads.push(Op::BeginBlock, Operand::from("main"), Operand::Empty, Operand::from("main"));
        quads.push(Op::EndBlock, Operand::from("main"), Operand::Empty, Operand::Empty);
        quads.push(Op::BeginBlock, Operand::from("f"), Operand::Empty, Operand::Empty);
        let err = generate(quads.as_slice()).unwrap_err();
        assert!(err.to_string().contains("Cannot generate C code"));
    }

    #[test]
    fn declares_every_referenced_identifier_once() {
        let mut quads = QuadList::new();
        quads.push(Op::Assign, Operand::IntLit(1), Operand::Empty, Operand::from("x"));
        quads.push(Op::Add, Operand::from("x"), Operand::from("x"), Operand::from("x"));
        let c = generate(quads.as_slice()).unwrap();
        assert_eq!(c.matches("int x;").count(), 1);
    }
}
