//! Core data structures for the Cimple compiler: quads, labels, entities and
//! the true/false patch-list pair used for short-circuit boolean codegen.
//!
//! This crate holds pure data only: no lexing, parsing or I/O lives here.

mod entity;
mod label;
mod quad;
mod truefalselist;

pub use entity::{CallableInfo, Category, Entity, Mode};
pub use label::Label;
pub use quad::{Op, Operand, PassMode, Quad, QuadList};
pub use truefalselist::TrueFalseList;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_dense_and_sequential() {
        let mut quads = QuadList::new();
        quads.push(Op::Assign, Operand::IntLit(1), Operand::Empty, "x".into());
        quads.push(Op::Assign, Operand::IntLit(2), Operand::Empty, "y".into());
        assert_eq!(quads.get(0).label, Label::new(1));
        assert_eq!(quads.get(1).label, Label::new(2));
        assert_eq!(quads.next_label(), Label::new(3));
    }

    #[test]
    fn backpatch_only_fills_empty_z() {
        let mut quads = QuadList::new();
        let idx = quads.push(Op::Jump, Operand::Empty, Operand::Empty, Operand::Empty);
        quads.backpatch(&[idx], Label::new(5));
        assert_eq!(quads.get(idx).z, Operand::Label(Label::new(5)));

        // A second backpatch call targeting the same index is a no-op.
        quads.backpatch(&[idx], Label::new(9));
        assert_eq!(quads.get(idx).z, Operand::Label(Label::new(5)));
    }

    #[test]
    fn truefalselist_append_concatenates_elementwise() {
        let mut a = TrueFalseList::with_true(vec![1, 2]);
        let b = TrueFalseList { t: vec![3], f: vec![4, 5] };
        a.append(b);
        assert_eq!(a.t, vec![1, 2, 3]);
        assert_eq!(a.f, vec![4, 5]);
    }

    #[test]
    fn truefalselist_negate_swaps_lists() {
        let tf = TrueFalseList { t: vec![1], f: vec![2, 3] };
        let negated = tf.negate();
        assert_eq!(negated.t, vec![2, 3]);
        assert_eq!(negated.f, vec![1]);
    }

    #[test]
    fn entity_offsets_start_at_12_and_step_by_4() {
        let e1 = Entity::Variable { scope: 0, offset: 12 };
        let e2 = Entity::Variable { scope: 0, offset: 16 };
        assert_eq!(e1.offset(), Some(12));
        assert_eq!(e2.offset(), Some(16));
        assert_eq!(e1.category(), Category::Variable);
    }
}
