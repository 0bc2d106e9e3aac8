//! `condition`, `boolterm`, `boolfactor`, `expression`, `term`, `factor` and
//! the `par`/`call` quad emission shared by call-statements and function-call
//! factors.

use cimple_ir::{Category, Op, Operand, PassMode, TrueFalseList};

use crate::diagnostics::{ErrorKind, Result};
use crate::lexer::Lexeme;
use crate::parser::Parser;

impl Parser {
    /// `condition ::= boolterm { 'or' boolterm }`.
    ///
    /// Standard two-list short-circuit scheme: before parsing the next
    /// boolterm, the left side's false list is patched to it (if the left
    /// side was false, fall through and try the right side); the combined
    /// true list is the union of both sides', the combined false list is
    /// whatever the rightmost boolterm left unresolved.
    pub(crate) fn parse_condition(&mut self) -> Result<TrueFalseList> {
        let mut left = self.parse_boolterm()?;
        while self.peek()?.is("or") {
            self.advance()?;
            self.backpatch(&left.f, self.next_quad_label());
            let right = self.parse_boolterm()?;
            let mut t = left.t;
            t.extend(right.t);
            left = TrueFalseList { t, f: right.f };
        }
        Ok(left)
    }

    /// `boolterm ::= boolfactor { 'and' boolfactor }`, symmetric to
    /// [`Self::parse_condition`]: the left side's true list is patched to
    /// the next boolfactor, and false lists accumulate.
    fn parse_boolterm(&mut self) -> Result<TrueFalseList> {
        let mut left = self.parse_boolfactor()?;
        while self.peek()?.is("and") {
            self.advance()?;
            self.backpatch(&left.t, self.next_quad_label());
            let right = self.parse_boolfactor()?;
            let mut f = left.f;
            f.extend(right.f);
            left = TrueFalseList { t: right.t, f };
        }
        Ok(left)
    }

    /// `boolfactor ::= 'not' '[' condition ']' | '[' condition ']' | expression RELOP expression`.
    fn parse_boolfactor(&mut self) -> Result<TrueFalseList> {
        if self.peek()?.is("not") {
            self.advance()?;
            self.assert_value_is("[")?;
            let tf = self.parse_condition()?;
            self.assert_value_is("]")?;
            return Ok(tf.negate());
        }

        if self.peek()?.is("[") {
            self.advance()?;
            let tf = self.parse_condition()?;
            self.assert_value_is("]")?;
            return Ok(tf);
        }

        let lhs = self.parse_expression()?;
        let relop = self.assert_value_in(&["=", "<>", "<", "<=", ">", ">="])?;
        let rhs = self.parse_expression()?;
        let op = match relop.value.as_str() {
            "=" => Op::Eq,
            "<>" => Op::Ne,
            "<" => Op::Lt,
            "<=" => Op::Le,
            ">" => Op::Gt,
            ">=" => Op::Ge,
            _ => unreachable!("assert_value_in restricted the relop set"),
        };
        // The relop quad itself is the branch-if-true placeholder (its `z`
        // joins the true list); a jump immediately after it is the
        // fallthrough-false path (its `z` joins the false list).
        let true_idx = self.new_quad(op, lhs, rhs, Operand::Empty);
        let false_idx = self.new_quad(Op::Jump, Operand::Empty, Operand::Empty, Operand::Empty);
        Ok(TrueFalseList { t: vec![true_idx], f: vec![false_idx] })
    }

    /// `expression ::= [ '+' | '-' ] term { ADDOP term }`.
    pub(crate) fn parse_expression(&mut self) -> Result<Operand> {
        let negate_first = if self.peek()?.is("+") {
            self.advance()?;
            false
        } else if self.peek()?.is("-") {
            self.advance()?;
            true
        } else {
            false
        };

        let mut value = self.parse_term()?;
        if negate_first {
            let temp = self.new_temp()?;
            self.new_quad(Op::Sub, Operand::IntLit(0), value, Operand::from(temp.clone()));
            value = Operand::from(temp);
        }

        loop {
            let op = if self.peek()?.is("+") {
                Op::Add
            } else if self.peek()?.is("-") {
                Op::Sub
            } else {
                return Ok(value);
            };
            self.advance()?;
            let rhs = self.parse_term()?;
            let temp = self.new_temp()?;
            self.new_quad(op, value, rhs, Operand::from(temp.clone()));
            value = Operand::from(temp);
        }
    }

    /// `term ::= factor { MULOP factor }`.
    fn parse_term(&mut self) -> Result<Operand> {
        let mut value = self.parse_factor()?;
        loop {
            let op = if self.peek()?.is("*") {
                Op::Mul
            } else if self.peek()?.is("/") {
                Op::Div
            } else {
                return Ok(value);
            };
            self.advance()?;
            let rhs = self.parse_factor()?;
            let temp = self.new_temp()?;
            self.new_quad(op, value, rhs, Operand::from(temp.clone()));
            value = Operand::from(temp);
        }
    }

    /// `factor ::= '(' expression ')' | INTCONST | IDENT [ '(' actualpars ')' ]`.
    fn parse_factor(&mut self) -> Result<Operand> {
        let t = self.peek()?.clone();

        if t.is("(") {
            self.advance()?;
            let value = self.parse_expression()?;
            self.assert_value_is(")")?;
            return Ok(value);
        }

        if t.is_digits() {
            self.advance()?;
            let n: u32 = t.value.parse().expect("lexer only accepts digit runs that fit u32");
            return Ok(Operand::IntLit(n));
        }

        if t.is_identifier() {
            self.advance()?;
            if self.peek()?.is("(") {
                return self.parse_function_call(t);
            }
            let site = self.site_at(t.position);
            self.st.assert_declared(&t.value, &[Category::Variable, Category::Parameter], site)?;
            return Ok(Operand::from(t.value));
        }

        let site = self.site_at(t.position);
        Err(site.error(ErrorKind::UnexpectedToken { got: t.value, want: "expression".to_string() }))
    }

    /// A factor that names a function: resolve it, emit its `par`/`call`
    /// quads, and plant a fresh `RET`-mode temporary whose name becomes the
    /// call's value.
    fn parse_function_call(&mut self, ident: Lexeme) -> Result<Operand> {
        let site = self.site_at(ident.position);
        self.st.assert_declared(&ident.value, &[Category::Function], site)?;
        self.parse_call_arguments()?;

        let temp = self.new_temp()?;
        self.new_quad(Op::Par, Operand::from(temp.clone()), Operand::Mode(PassMode::Ret), Operand::Empty);
        self.new_quad(Op::Call, Operand::from(ident.value), Operand::Empty, Operand::Empty);
        Ok(Operand::from(temp))
    }

    /// `'(' actualpars ')'`, emitting one `par` quad per actual in source
    /// order. Shared by call-statements and function-call factors; callers
    /// are responsible for the `call` quad (and, for functions, the `RET`
    /// temporary) that follows.
    ///
    /// Each actual's `par` quad carries its own 0-based positional index in
    /// its otherwise-unused `z` field, rather than leaving the assembly
    /// generator to reconstruct it by counting `par` quads since the last
    /// `call` — a flat forward scan can't tell a call's own actuals apart
    /// from a *nested* call's, since evaluating one actual (e.g. `in f(5)`)
    /// may itself emit and close out another call's complete `par`/`call`
    /// group first. Rust's own call stack nests `parse_one_actual` calls
    /// correctly where a linear quad scan can't.
    pub(crate) fn parse_call_arguments(&mut self) -> Result<()> {
        self.assert_value_is("(")?;
        let mut index = 0u32;
        if !self.peek()?.is(")") {
            loop {
                self.parse_one_actual(index)?;
                index += 1;
                if !self.peek()?.is(",") {
                    break;
                }
                self.advance()?;
            }
        }
        self.assert_value_is(")")?;
        Ok(())
    }

    /// `('in' expression | 'inout' IDENT)`.
    fn parse_one_actual(&mut self, index: u32) -> Result<()> {
        if self.peek()?.is("in") {
            self.advance()?;
            let value = self.parse_expression()?;
            self.new_quad(Op::Par, value, Operand::Mode(PassMode::Cv), Operand::IntLit(index));
            return Ok(());
        }

        self.assert_value_is("inout")?;
        let ident = self.assert_is_identifier()?;
        let site = self.site_at(ident.position);
        self.st.assert_declared(&ident.value, &[Category::Variable, Category::Parameter], site)?;
        self.new_quad(Op::Par, Operand::from(ident.value), Operand::Mode(PassMode::Ref), Operand::IntLit(index));
        Ok(())
    }
}
