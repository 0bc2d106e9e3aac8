//! Symbol table: a stack of lexical scopes with categorized entity maps.

use indexmap::IndexMap;

use cimple_ir::{Category, Entity};

use crate::diagnostics::{CompilationError, ErrorKind, Position, Result};

/// One lexical scope: five categorized name tables plus the running frame
/// offset cursor, which starts at 12 to reserve the saved return address,
/// access link and return-value pointer slots.
pub struct Scope {
    pub name: String,
    pub offset: u32,
    variables: IndexMap<String, Entity>,
    parameters: IndexMap<String, Entity>,
    tmp_variables: IndexMap<String, Entity>,
    functions: IndexMap<String, Entity>,
    procedures: IndexMap<String, Entity>,
}

impl Scope {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            offset: 12,
            variables: IndexMap::new(),
            parameters: IndexMap::new(),
            tmp_variables: IndexMap::new(),
            functions: IndexMap::new(),
            procedures: IndexMap::new(),
        }
    }

    fn table(&self, category: Category) -> &IndexMap<String, Entity> {
        match category {
            Category::Variable => &self.variables,
            Category::Parameter => &self.parameters,
            Category::TmpVariable => &self.tmp_variables,
            Category::Function => &self.functions,
            Category::Procedure => &self.procedures,
        }
    }

    fn table_mut(&mut self, category: Category) -> &mut IndexMap<String, Entity> {
        match category {
            Category::Variable => &mut self.variables,
            Category::Parameter => &mut self.parameters,
            Category::TmpVariable => &mut self.tmp_variables,
            Category::Function => &mut self.functions,
            Category::Procedure => &mut self.procedures,
        }
    }

    fn contains_any_category(&self, name: &str) -> bool {
        Category::ALL.iter().any(|&cat| self.table(cat).contains_key(name))
    }
}

/// A stack of [`Scope`]s, index 0 being the program-global scope.
///
/// Mirrors the source compiler's scope-stack symbol table one-to-one:
/// entities are looked up from the innermost scope outward, restricted to
/// a caller-chosen set of categories.
#[derive(Default)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn create_scope(&mut self, name: impl Into<String>) {
        let scope = Scope::new(name);
        tracing::trace!(scope = %scope.name, depth = self.scopes.len(), "push scope");
        self.scopes.push(scope);
    }

    pub fn pop_scope(&mut self) -> Scope {
        let scope = self.scopes.pop().expect("create_scope/pop_scope must be balanced");
        tracing::trace!(scope = %scope.name, frame_length = scope.offset, "pop scope");
        scope
    }

    pub fn current_depth(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn current_scope(&self) -> &Scope {
        self.scopes.last().expect("at least one scope must be active while parsing")
    }

    /// Bind a `variable` or `tmp_variable` in the innermost scope, assigning
    /// it the scope's current frame offset.
    ///
    /// Fails with [`ErrorKind::AlreadyDeclared`] if `name` is already bound
    /// under *any* category in that same scope — categories don't shadow
    /// each other within one scope, only across scopes. Parameters and
    /// callables carry extra fields and go through [`Self::add_parameter`]
    /// / [`Self::add_callable`] instead.
    pub fn add(&mut self, category: Category, name: &str, at: ErrorSite) -> Result<()> {
        debug_assert!(matches!(category, Category::Variable | Category::TmpVariable));

        if self.current_scope().contains_any_category(name) {
            return Err(at.error(ErrorKind::AlreadyDeclared(name.to_string())));
        }

        let scope_idx = self.current_depth();
        let scope = self.scopes.last_mut().expect("scope stack is non-empty");
        let offset = scope.offset;
        scope.offset += 4;

        let entity = match category {
            Category::Variable => Entity::Variable { scope: scope_idx, offset },
            Category::TmpVariable => Entity::TmpVariable { scope: scope_idx, offset },
            _ => unreachable!("add is only used for variable/tmp_variable"),
        };

        scope.table_mut(category).insert(name.to_string(), entity);
        Ok(())
    }

    pub fn add_parameter(
        &mut self,
        name: &str,
        mode: cimple_ir::Mode,
        at: ErrorSite,
    ) -> Result<()> {
        if self.current_scope().contains_any_category(name) {
            return Err(at.error(ErrorKind::AlreadyDeclared(name.to_string())));
        }

        let scope_idx = self.current_depth();
        let scope = self.scopes.last_mut().expect("scope stack is non-empty");
        let offset = scope.offset;
        scope.offset += 4;
        scope.parameters.insert(name.to_string(), Entity::Parameter { scope: scope_idx, offset, mode });
        Ok(())
    }

    pub fn add_callable(
        &mut self,
        category: Category,
        name: &str,
        info: cimple_ir::CallableInfo,
        at: ErrorSite,
    ) -> Result<()> {
        if self.current_scope().contains_any_category(name) {
            return Err(at.error(ErrorKind::AlreadyDeclared(name.to_string())));
        }

        let scope_idx = self.current_depth();
        let entity = match category {
            Category::Function => Entity::Function { scope: scope_idx, info },
            Category::Procedure => Entity::Procedure { scope: scope_idx, info },
            _ => unreachable!("add_callable is only used for functions/procedures"),
        };
        self.scopes.last_mut().unwrap().table_mut(category).insert(name.to_string(), entity);
        Ok(())
    }

    /// Walk the scope stack from innermost outward, restricted to
    /// `categories`, optionally limited to the top `max_depth` scopes.
    pub fn find(&self, name: &str, categories: &[Category], max_depth: Option<usize>) -> Option<&Entity> {
        let take = max_depth.unwrap_or(self.scopes.len());
        for scope in self.scopes.iter().rev().take(take) {
            for &cat in categories {
                if let Some(entity) = scope.table(cat).get(name) {
                    return Some(entity);
                }
            }
        }
        None
    }

    pub fn find_mut(&mut self, name: &str, categories: &[Category]) -> Option<&mut Entity> {
        for scope in self.scopes.iter_mut().rev() {
            for &cat in categories {
                if scope.table(cat).contains_key(name) {
                    return scope.table_mut(cat).get_mut(name);
                }
            }
        }
        None
    }

    /// Fails with [`ErrorKind::Undeclared`] when `find` comes up empty.
    /// This single path is how "wrong category" (function called as
    /// procedure, etc.) and "truly undeclared" both surface.
    pub fn assert_declared(&self, name: &str, categories: &[Category], at: ErrorSite) -> Result<&Entity> {
        self.find(name, categories, None).ok_or_else(|| {
            let cats = categories.iter().map(|c| c.name()).collect::<Vec<_>>().join(" or ");
            at.error(ErrorKind::Undeclared { name: name.to_string(), categories: cats })
        })
    }
}

/// The position/source-line pair an error raised while consuming a lexeme
/// should carry. Threaded through symbol-table calls so diagnostics point
/// at the offending token rather than the table's internals.
///
/// Owns its source line rather than borrowing it: the parser otherwise
/// can't build one from `&self` and hand it to a `&mut self.st` call in the
/// same expression.
#[derive(Clone)]
pub struct ErrorSite {
    pub position: Position,
    pub source_line: Option<String>,
}

impl ErrorSite {
    pub fn new(position: Position, source_line: Option<&str>) -> Self {
        Self { position, source_line: source_line.map(str::to_string) }
    }

    pub(crate) fn error(&self, kind: ErrorKind) -> CompilationError {
        match &self.source_line {
            Some(line) => CompilationError::at(kind, self.position, line.clone()),
            None => CompilationError::new(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cimple_ir::Mode;

    fn site() -> ErrorSite {
        ErrorSite::new(Position::new(1, 1), None)
    }

    #[test]
    fn redeclaring_in_same_scope_fails_regardless_of_category() {
        let mut st = SymbolTable::new();
        st.create_scope("p");
        st.add(Category::Variable, "a", site()).unwrap();
        let err = st.add_parameter("a", Mode::In, site()).unwrap_err();
        assert!(err.to_string().contains("'a' is already declared"));
    }

    #[test]
    fn shadowing_across_scopes_is_accepted() {
        let mut st = SymbolTable::new();
        st.create_scope("outer");
        st.add(Category::Variable, "a", site()).unwrap();
        st.create_scope("inner");
        st.add(Category::Variable, "a", site()).unwrap();
        assert!(st.find("a", &[Category::Variable], None).is_some());
    }

    #[test]
    fn offsets_start_at_12_and_step_by_4() {
        let mut st = SymbolTable::new();
        st.create_scope("p");
        st.add(Category::Variable, "a", site()).unwrap();
        st.add(Category::Variable, "b", site()).unwrap();
        assert_eq!(st.current_scope().offset, 20);
    }

    #[test]
    fn find_restricted_to_max_depth_skips_outer_scopes() {
        let mut st = SymbolTable::new();
        st.create_scope("outer");
        st.add(Category::Variable, "a", site()).unwrap();
        st.create_scope("inner");
        assert!(st.find("a", &[Category::Variable], Some(1)).is_none());
        assert!(st.find("a", &[Category::Variable], None).is_some());
    }

    #[test]
    fn undeclared_lists_requested_categories() {
        let mut st = SymbolTable::new();
        st.create_scope("p");
        let err = st.assert_declared("x", &[Category::Variable, Category::Parameter], site()).unwrap_err();
        assert!(err.to_string().contains("does not belong to variables or parameters"));
    }
}
