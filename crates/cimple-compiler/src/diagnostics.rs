//! The compiler's single structured error type and its taxonomy of causes.

use std::fmt;

/// 1-based source position, as produced by the lexer's cursor.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.line, self.column)
    }
}

/// The taxonomy of compile-time failures, matched by the test suite via
/// substring of the rendered message.
#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("Invalid character '{0}'")]
    InvalidCharacter(char),

    #[error("Variable name cannot be more than 30 chars.")]
    IdentifierTooLong,

    #[error("Variable name cannot start with a number.")]
    IdentifierStartsWithDigit,

    #[error("Constant max value is 2^32-1 ({}).", u32::MAX)]
    ConstantTooLarge,

    #[error("Invalid assignment operator")]
    InvalidAssignOp,

    #[error("Unterminated comment at the end of the program.")]
    UnterminatedComment,

    #[error("Unexpected: '{got}', closest expected value: '{want}'.")]
    UnexpectedToken { got: String, want: String },

    #[error("Unexpected: '{got}', expected one of: '{want}'.")]
    UnexpectedTokenOneOf { got: String, want: String },

    #[error("Expected an identifier, got: '{0}'.")]
    ExpectedIdentifier(String),

    #[error("Cannot use '{0}' for a variable name.")]
    ReservedWordAsIdentifier(String),

    #[error("Symbol '{name}' does not belong to {categories}.")]
    Undeclared { name: String, categories: String },

    #[error("Symbol '{0}' is already declared in the same scope.")]
    AlreadyDeclared(String),

    #[error("Program should end with a dot (.)")]
    UnexpectedEof,

    #[error(
        "Cannot generate C code for a program that declares functions or procedures."
    )]
    CNotSupported,
}

/// The single structured error value the compiler signals failure with.
///
/// Carries the underlying [`ErrorKind`], an optional source position, and
/// an optional preview of the source line the position falls on. Position
/// and preview are omitted from the rendered message when unavailable, per
/// the external interface contract.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{}", render(.kind, .position, .source_line.as_deref()))]
pub struct CompilationError {
    pub kind: ErrorKind,
    pub position: Option<Position>,
    pub source_line: Option<String>,
}

impl CompilationError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, position: None, source_line: None }
    }

    pub fn at(kind: ErrorKind, position: Position, source_line: impl Into<String>) -> Self {
        Self { kind, position: Some(position), source_line: Some(source_line.into()) }
    }
}

/// Renders `ERROR: <message>` followed by a `(line:col)  near: \`...window...\``
/// line when position/preview information is available.
fn render(kind: &ErrorKind, position: &Option<Position>, source_line: Option<&str>) -> String {
    let mut s = format!("ERROR: {kind}");

    if let Some(pos) = position {
        s.push('\n');
        s.push_str(&pos.to_string());

        if let Some(line) = source_line {
            let col0 = pos.column.saturating_sub(1) as usize;
            let start = col0.saturating_sub(10);
            let end = (col0 + 10).min(line.chars().count());
            let window: String = line.chars().skip(start).take(end.saturating_sub(start)).collect();
            s.push_str(&format!("\t near: `...{window}...`"));
        }
    }

    s
}

pub type Result<T> = std::result::Result<T, CompilationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_message_only_without_position() {
        let err = CompilationError::new(ErrorKind::AlreadyDeclared("a".into()));
        assert_eq!(
            err.to_string(),
            "ERROR: Symbol 'a' is already declared in the same scope."
        );
    }

    #[test]
    fn renders_position_and_preview() {
        let err = CompilationError::at(
            ErrorKind::InvalidCharacter('^'),
            Position::new(3, 16),
            "x := 15 ^ 4;",
        );
        let rendered = err.to_string();
        assert!(rendered.starts_with("ERROR: Invalid character '^'"));
        assert!(rendered.contains("(3:16)"));
        assert!(rendered.contains("near: `"));
    }
}
