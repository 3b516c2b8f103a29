pub mod adapter;
pub mod builder;
pub mod error;
pub mod lexer;
pub mod model;
pub mod parser;
#[cfg(feature = "serde")]
pub mod serde_bounds;
pub mod source;
pub mod statement;
pub mod terms;

pub use adapter::{Loaded, SolverAdapter};
pub use builder::ModelBuilder;
pub use error::{ErrorKind, LoadError, ParseError};
pub use lexer::{Keyword, Lexer, Span, Token, TokenKind, is_valid_variable_name};
pub use model::{
    Constraint, ConstraintOp, Direction, LinearExpression, Model, Objective, Term, VarKind,
    VariableDeclaration,
};
pub use parser::{Parser, parse, parse_file, parse_reader};
pub use source::{RawStatement, Statements};
pub use statement::{Statement, classify};
