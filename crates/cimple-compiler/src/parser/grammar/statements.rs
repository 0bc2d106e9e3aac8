//! `statements`, `blockstmts`, `statement` and its ten alternatives
//! (assignment, the five control-flow forms, `call`, `return`, `input`,
//! `print`), plus the empty-statement production.

use cimple_ir::{Category, Op, Operand};

use crate::diagnostics::{ErrorKind, Result};
use crate::parser::Parser;

impl Parser {
    /// `block`'s body: `blockstmts` without the surrounding braces, which
    /// the caller (`parse_block`) has already consumed.
    pub(crate) fn parse_block_statements(&mut self) -> Result<()> {
        self.parse_statement()?;
        while self.peek()?.is(";") {
            self.advance()?;
            self.parse_statement()?;
        }
        Ok(())
    }

    /// `statements ::= '{' blockstmts '}' | statement ';'`.
    fn parse_statements(&mut self) -> Result<()> {
        if self.peek()?.is("{") {
            self.advance()?;
            self.parse_block_statements()?;
            self.assert_value_is("}")?;
        } else {
            self.parse_statement()?;
            self.assert_value_is(";")?;
        }
        Ok(())
    }

    /// `statement ::= assign | if | while | switchcase | forcase | incase
    /// | call | return | input | print | ε`.
    fn parse_statement(&mut self) -> Result<()> {
        let t = self.peek()?.clone();
        match t.value.as_str() {
            "if" => self.parse_if(),
            "while" => self.parse_while(),
            "switchcase" => self.parse_switchcase(),
            "forcase" => self.parse_forcase(),
            "incase" => self.parse_incase(),
            "call" => self.parse_call_statement(),
            "return" => self.parse_return(),
            "input" => self.parse_input(),
            "print" => self.parse_print(),
            _ if t.is_identifier() => self.parse_assign(),
            _ if t.is(";") || t.is("}") => Ok(()),
            _ => {
                let site = self.site_at(t.position);
                Err(site.error(ErrorKind::UnexpectedToken { got: t.value, want: "statement".to_string() }))
            }
        }
    }

    /// `assign ::= IDENT ':=' expression`.
    fn parse_assign(&mut self) -> Result<()> {
        let ident = self.assert_is_identifier()?;
        let site = self.site_at(ident.position);
        self.st.assert_declared(&ident.value, &[Category::Variable, Category::Parameter], site)?;
        self.assert_value_is(":=")?;
        let value = self.parse_expression()?;
        self.new_quad(Op::Assign, value, Operand::Empty, Operand::from(ident.value));
        Ok(())
    }

    /// `if ::= 'if' '(' condition ')' statements [ 'else' statements ]`.
    fn parse_if(&mut self) -> Result<()> {
        self.assert_value_is("if")?;
        self.assert_value_is("(")?;
        let cond = self.parse_condition()?;
        self.assert_value_is(")")?;

        self.backpatch(&cond.t, self.next_quad_label());
        self.parse_statements()?;
        let exit_jump = self.new_quad(Op::Jump, Operand::Empty, Operand::Empty, Operand::Empty);
        self.backpatch(&cond.f, self.next_quad_label());

        if self.peek()?.is("else") {
            self.advance()?;
            self.parse_statements()?;
        }
        self.backpatch(&[exit_jump], self.next_quad_label());
        Ok(())
    }

    /// `while ::= 'while' '(' condition ')' statements`.
    fn parse_while(&mut self) -> Result<()> {
        self.assert_value_is("while")?;
        let cond_label = self.next_quad_label();
        self.assert_value_is("(")?;
        let cond = self.parse_condition()?;
        self.assert_value_is(")")?;

        self.backpatch(&cond.t, self.next_quad_label());
        self.parse_statements()?;
        self.new_quad(Op::Jump, Operand::Empty, Operand::Empty, Operand::Label(cond_label));
        self.backpatch(&cond.f, self.next_quad_label());
        Ok(())
    }

    /// `switchcase ::= 'switchcase' { 'case' '(' condition ')' statements } 'default' statements`.
    ///
    /// Each case's exit jump is independent; all of them are patched to the
    /// label following the `default` body.
    fn parse_switchcase(&mut self) -> Result<()> {
        self.assert_value_is("switchcase")?;
        let mut exit_jumps = Vec::new();

        while self.peek()?.is("case") {
            self.advance()?;
            self.assert_value_is("(")?;
            let cond = self.parse_condition()?;
            self.assert_value_is(")")?;
            self.backpatch(&cond.t, self.next_quad_label());
            self.parse_statements()?;
            exit_jumps.push(self.new_quad(Op::Jump, Operand::Empty, Operand::Empty, Operand::Empty));
            self.backpatch(&cond.f, self.next_quad_label());
        }

        self.assert_value_is("default")?;
        self.parse_statements()?;
        self.backpatch(&exit_jumps, self.next_quad_label());
        Ok(())
    }

    /// `forcase ::= 'forcase' { 'case' '(' condition ')' statements } 'default' statements`.
    ///
    /// Structurally identical to `switchcase`, except each case's exit jump
    /// targets the label before the first case, so the whole case chain is
    /// retried until a pass through it fires nothing.
    fn parse_forcase(&mut self) -> Result<()> {
        self.assert_value_is("forcase")?;
        let first_case_label = self.next_quad_label();

        while self.peek()?.is("case") {
            self.advance()?;
            self.assert_value_is("(")?;
            let cond = self.parse_condition()?;
            self.assert_value_is(")")?;
            self.backpatch(&cond.t, self.next_quad_label());
            self.parse_statements()?;
            self.new_quad(Op::Jump, Operand::Empty, Operand::Empty, Operand::Label(first_case_label));
            self.backpatch(&cond.f, self.next_quad_label());
        }

        self.assert_value_is("default")?;
        self.parse_statements()?;
        Ok(())
    }

    /// `incase ::= 'incase' { 'case' '(' condition ')' statements }`.
    ///
    /// No `default`. A fresh `flag` temporary starts at 0; each case body
    /// sets it to 1 when it fires. After one pass through every case, a
    /// final check jumps back to the first case if `flag = 1`, repeating
    /// the whole chain until a pass fires nothing.
    fn parse_incase(&mut self) -> Result<()> {
        self.assert_value_is("incase")?;
        let flag = self.new_temp()?;
        self.new_quad(Op::Assign, Operand::IntLit(0), Operand::Empty, Operand::from(flag.clone()));
        let first_case_label = self.next_quad_label();

        while self.peek()?.is("case") {
            self.advance()?;
            self.assert_value_is("(")?;
            let cond = self.parse_condition()?;
            self.assert_value_is(")")?;
            self.backpatch(&cond.t, self.next_quad_label());
            self.parse_statements()?;
            self.new_quad(Op::Assign, Operand::IntLit(1), Operand::Empty, Operand::from(flag.clone()));
            self.backpatch(&cond.f, self.next_quad_label());
        }

        self.new_quad(Op::Eq, Operand::from(flag), Operand::IntLit(1), Operand::Label(first_case_label));
        Ok(())
    }

    /// `call ::= 'call' IDENT '(' actualpars ')'`.
    fn parse_call_statement(&mut self) -> Result<()> {
        self.assert_value_is("call")?;
        let ident = self.assert_is_identifier()?;
        let site = self.site_at(ident.position);
        self.st.assert_declared(&ident.value, &[Category::Procedure], site)?;
        self.parse_call_arguments()?;
        self.new_quad(Op::Call, Operand::from(ident.value), Operand::Empty, Operand::Empty);
        Ok(())
    }

    /// `return ::= 'return' '(' expression ')'`.
    fn parse_return(&mut self) -> Result<()> {
        self.assert_value_is("return")?;
        self.assert_value_is("(")?;
        let value = self.parse_expression()?;
        self.assert_value_is(")")?;
        self.new_quad(Op::Retv, value, Operand::Empty, Operand::Empty);
        Ok(())
    }

    /// `input ::= 'input' '(' IDENT ')'`.
    fn parse_input(&mut self) -> Result<()> {
        self.assert_value_is("input")?;
        self.assert_value_is("(")?;
        let ident = self.assert_is_identifier()?;
        let site = self.site_at(ident.position);
        self.st.assert_declared(&ident.value, &[Category::Variable, Category::Parameter], site)?;
        self.assert_value_is(")")?;
        self.new_quad(Op::Inp, Operand::from(ident.value), Operand::Empty, Operand::Empty);
        Ok(())
    }

    /// `print ::= 'print' '(' expression ')'`.
    fn parse_print(&mut self) -> Result<()> {
        self.assert_value_is("print")?;
        self.assert_value_is("(")?;
        let value = self.parse_expression()?;
        self.assert_value_is(")")?;
        self.new_quad(Op::Out, value, Operand::Empty, Operand::Empty);
        Ok(())
    }
}
