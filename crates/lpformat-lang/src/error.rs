use std::path::PathBuf;

use thiserror::Error;

use crate::model::VarKind;

/// What went wrong inside a single statement.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    #[error("comment marker '{0}' is not closed on the same line")]
    MalformedComment(String),
    #[error("statement is not terminated by ';'")]
    MissingTerminator,
    #[error("first statement must start with \"max:\" or \"min:\"")]
    MissingObjectiveDirection,
    #[error("objective function is already defined")]
    DuplicateObjective,
    #[error("constraint must contain exactly one relational operator, found {0}")]
    InvalidConstraintShape(usize),
    #[error("too many signs in front of '{0}'")]
    TooManySigns(String),
    #[error("sign '{0}' is not followed by a term")]
    DanglingSign(String),
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    #[error("invalid variable name: \"{0}\"")]
    InvalidVariableName(String),
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    #[error("expression is empty")]
    EmptyExpression,
    #[error("declaration lists no variables")]
    EmptyDeclaration,
    #[error("no variable present")]
    NoVariables,
    #[error("variable \"{name}\" already declared {existing}, cannot redeclare it {requested}")]
    ConflictingDeclaration {
        name: String,
        existing: VarKind,
        requested: VarKind,
    },
}

/// A parse failure, located at the statement that caused it.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("statement {index} (line {line}): {kind}")]
pub struct ParseError {
    /// 1-based position among the non-blank statements.
    pub index: usize,
    /// Physical line the statement starts on.
    pub line: usize,
    pub statement: String,
    #[source]
    pub kind: ErrorKind,
}

impl ParseError {
    pub fn new(index: usize, line: usize, statement: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            index,
            line,
            statement: statement.into(),
            kind,
        }
    }
}

/// Failure while reading and parsing an LP source.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read input: {0}")]
    Read(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
