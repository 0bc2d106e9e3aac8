//! `program`, `block`, `declarations` and `subprograms`.

use cimple_ir::{CallableInfo, Category, Mode, Op, Operand};

use crate::diagnostics::{Position, Result};
use crate::parser::Parser;

struct FormalPar {
    name: String,
    mode: Mode,
    position: Position,
}

impl Parser {
    pub fn parse_program(&mut self) -> Result<()> {
        self.assert_value_is("program")?;
        let ident = self.assert_is_identifier()?;
        self.st.create_scope(ident.value.clone());
        self.parse_block(&ident.value, true)?;
        self.st.pop_scope();
        self.assert_value_is(".")?;
        Ok(())
    }

    pub(crate) fn parse_block(&mut self, name: &str, is_main: bool) -> Result<()> {
        self.assert_value_is("{")?;
        self.parse_declarations()?;
        self.parse_subprograms()?;

        let z = if is_main { Operand::from("main") } else { Operand::Empty };
        self.new_quad(Op::BeginBlock, Operand::from(name), Operand::Empty, z);

        self.parse_block_statements()?;

        if is_main {
            self.new_quad(Op::Halt, Operand::Empty, Operand::Empty, Operand::Empty);
        }
        self.new_quad(Op::EndBlock, Operand::from(name), Operand::Empty, Operand::Empty);
        self.assert_value_is("}")?;

        tracing::debug!(block = name, "block parsed, lowering to assembly");
        self.compile_finished_block(name);
        Ok(())
    }

    fn parse_declarations(&mut self) -> Result<()> {
        loop {
            if !self.peek()?.is("declare") {
                return Ok(());
            }
            self.advance()?;
            self.parse_varlist()?;
            self.assert_value_is(";")?;
        }
    }

    fn parse_varlist(&mut self) -> Result<()> {
        if !self.peek()?.is_identifier() {
            return Ok(());
        }

        loop {
            let ident = self.assert_is_identifier()?;
            let site = self.site_at(ident.position);
            self.st.add(Category::Variable, &ident.value, site)?;

            if !self.peek()?.is(",") {
                return Ok(());
            }
            self.advance()?;
        }
    }

    fn parse_subprograms(&mut self) -> Result<()> {
        loop {
            if !self.peek()?.is_one_of(&["function", "procedure"]) {
                return Ok(());
            }
            self.parse_subprogram()?;
        }
    }

    fn parse_subprogram(&mut self) -> Result<()> {
        let typ = self.assert_value_in(&["function", "procedure"])?;
        let ident = self.assert_is_identifier()?;
        self.assert_value_is("(")?;
        let params = self.parse_formalparlist()?;
        self.assert_value_is(")")?;

        let category = if typ.value == "function" { Category::Function } else { Category::Procedure };
        let info = CallableInfo {
            start_label: self.next_quad_label(),
            signature: params.iter().map(|p| p.mode).collect(),
            frame_length: None,
        };
        let decl_site = self.site_at(ident.position);
        self.st.add_callable(category, &ident.value, info, decl_site)?;

        self.st.create_scope(ident.value.clone());
        for p in &params {
            let param_site = self.site_at(p.position);
            self.st.add_parameter(&p.name, p.mode, param_site)?;
        }

        self.parse_block(&ident.value, false)?;

        let frame_length = self.st.current_scope().offset;
        if let Some(entity) = self.st.find_mut(&ident.value, &[Category::Function, Category::Procedure])
            && let Some(info) = entity.callable_info_mut()
        {
            info.frame_length = Some(frame_length);
        }
        self.st.pop_scope();
        Ok(())
    }

    fn parse_formalparlist(&mut self) -> Result<Vec<FormalPar>> {
        let mut params = Vec::new();
        if !self.peek()?.is_one_of(&["in", "inout"]) {
            return Ok(params);
        }

        loop {
            let mode_tok = self.assert_value_in(&["in", "inout"])?;
            let ident = self.assert_is_identifier()?;
            let mode = if mode_tok.value == "in" { Mode::In } else { Mode::Inout };
            params.push(FormalPar { name: ident.value, mode, position: ident.position });

            if !self.peek()?.is(",") {
                return Ok(params);
            }
            self.advance()?;
        }
    }
}
