use crate::error::ErrorKind;
use crate::lexer::{is_valid_variable_name, Keyword, Lexer};
use crate::model::{ConstraintOp, Direction, LinearExpression, VarKind};
use crate::terms::parse_expression;

/// A classified statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Objective {
        direction: Direction,
        expression: LinearExpression,
    },
    Declaration {
        kind: VarKind,
        names: Vec<String>,
    },
    Constraint {
        lhs: LinearExpression,
        op: ConstraintOp,
        rhs: LinearExpression,
    },
}

impl Statement {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Objective { .. } => "objective",
            Statement::Declaration { .. } => "declaration",
            Statement::Constraint { .. } => "constraint",
        }
    }
}

/// Classify one statement (without its `;`) and parse its contents.
pub fn classify(text: &str) -> Result<Statement, ErrorKind> {
    let text = text.trim();

    if let Some((direction, body)) = objective_prefix(text) {
        let tokens = Lexer::tokenize(body)?;
        let expression = parse_expression(&tokens)?;
        return Ok(Statement::Objective {
            direction,
            expression,
        });
    }

    if let Some((kind, body)) = declaration_prefix(text) {
        return Ok(Statement::Declaration {
            kind,
            names: parse_name_list(body)?,
        });
    }

    parse_constraint(text)
}

pub fn is_objective(text: &str) -> bool {
    objective_prefix(text.trim()).is_some()
}

/// `max:` / `min:` exactly, colon directly after the keyword.
fn objective_prefix(text: &str) -> Option<(Direction, &str)> {
    let (head, body) = text.split_once(':')?;
    match Keyword::lookup(head) {
        Some(Keyword::Max) => Some((Direction::Maximize, body)),
        Some(Keyword::Min) => Some((Direction::Minimize, body)),
        _ => None,
    }
}

/// `int`, `bin` or `free` as the first word of a statement without relational
/// operators. `int >= 3` is a bound on a variable called `int`.
fn declaration_prefix(text: &str) -> Option<(VarKind, &str)> {
    if text.contains(['<', '>', '=']) {
        return None;
    }
    let split = text.find(char::is_whitespace).unwrap_or(text.len());
    let (word, body) = text.split_at(split);
    let kind = match Keyword::lookup(word)? {
        Keyword::Int => VarKind::Integer,
        Keyword::Bin => VarKind::Binary,
        Keyword::Free => VarKind::Free,
        Keyword::Max | Keyword::Min => return None,
    };
    Some((kind, body))
}

/// Names separated by commas and/or whitespace. Every comma must sit between
/// two names, so `a,,b` and `, a` are rejected.
fn parse_name_list(body: &str) -> Result<Vec<String>, ErrorKind> {
    if body.trim().is_empty() {
        return Err(ErrorKind::EmptyDeclaration);
    }
    let mut names = Vec::new();
    for slot in body.split(',') {
        let slot = slot.trim();
        if slot.is_empty() {
            return Err(ErrorKind::InvalidVariableName(String::new()));
        }
        for name in slot.split_whitespace() {
            if !is_valid_variable_name(name) {
                return Err(ErrorKind::InvalidVariableName(name.to_string()));
            }
            names.push(name.to_string());
        }
    }
    Ok(names)
}

fn parse_constraint(text: &str) -> Result<Statement, ErrorKind> {
    // The label is discarded.
    let body = match text.split_once(':') {
        Some((_, body)) => body,
        None => text,
    };

    let tokens = Lexer::tokenize(body)?;
    let relational: Vec<(usize, ConstraintOp)> = tokens
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.kind.relational().map(|op| (i, op)))
        .collect();

    let [(at, op)] = relational.as_slice() else {
        return Err(ErrorKind::InvalidConstraintShape(relational.len()));
    };

    let (left, right) = tokens.split_at(*at);
    let lhs = parse_expression(left)?;
    let rhs = parse_expression(&right[1..])?;
    Ok(Statement::Constraint { lhs, op: *op, rhs })
}
