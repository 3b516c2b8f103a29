use std::io::Read;
use std::path::Path;

use crate::builder::ModelBuilder;
use crate::error::{ErrorKind, LoadError, ParseError};
use crate::model::Model;
use crate::source::Statements;
use crate::statement::{classify, is_objective};

/// Parses LP sources into [`Model`]s.
#[derive(Debug, Clone)]
pub struct Parser {
    /// Lower bound given to variables that never receive one.
    default_lower_bound: f64,
    /// Turn `x >= c` style constraints into variable bounds.
    bound_tightening: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            default_lower_bound: 0.0,
            bound_tightening: true,
        }
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_lower_bound(mut self, bound: f64) -> Self {
        self.default_lower_bound = bound;
        self
    }

    pub fn with_bound_tightening(mut self, enabled: bool) -> Self {
        self.bound_tightening = enabled;
        self
    }

    pub fn parse(&self, source: &str) -> Result<Model, ParseError> {
        let mut builder = ModelBuilder::new(self.default_lower_bound)
            .with_bound_tightening(self.bound_tightening);
        let mut statements = Statements::new(source);

        for raw in statements.by_ref() {
            let raw = raw.inspect_err(|err| log_failure(err))?;
            let at = |kind: ErrorKind| {
                let err = ParseError::new(raw.index, raw.line, raw.text.as_str(), kind);
                log_failure(&err);
                err
            };

            // Objective ordering is decided by the prefix alone, before the
            // body is parsed.
            match (builder.has_objective(), is_objective(&raw.text)) {
                (false, false) => return Err(at(ErrorKind::MissingObjectiveDirection)),
                (true, true) => return Err(at(ErrorKind::DuplicateObjective)),
                _ => {}
            }
            let statement = classify(&raw.text).map_err(at)?;
            tracing::debug!(
                component = "parser",
                operation = "classify",
                statement = raw.index,
                line = raw.line,
                kind = statement.kind_name(),
                "Classified statement"
            );
            builder.apply(statement).map_err(at)?;
        }

        let line = statements.lines_read().max(1);
        let model = builder
            .finish()
            .map_err(|kind| ParseError::new(1, line, "", kind))
            .inspect_err(log_failure)?;

        tracing::info!(
            component = "parser",
            operation = "parse",
            status = "success",
            variables = model.num_variables(),
            constraints = model.num_constraints(),
            "Parsed LP model"
        );
        Ok(model)
    }

    pub fn parse_reader<R: Read>(&self, mut reader: R) -> Result<Model, LoadError> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        Ok(self.parse(&source)?)
    }

    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Model, LoadError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            component = "parser",
            operation = "read_file",
            path = %path.display(),
            bytes = source.len(),
            "Read LP file"
        );
        Ok(self.parse(&source)?)
    }
}

fn log_failure(err: &ParseError) {
    tracing::debug!(
        component = "parser",
        operation = "parse",
        status = "error",
        statement = err.index,
        line = err.line,
        error = %err.kind,
        "Failed to parse LP model"
    );
}

/// Parse with the default settings.
pub fn parse(source: &str) -> Result<Model, ParseError> {
    Parser::new().parse(source)
}

pub fn parse_reader<R: Read>(reader: R) -> Result<Model, LoadError> {
    Parser::new().parse_reader(reader)
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<Model, LoadError> {
    Parser::new().parse_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Direction, VarKind};

    #[test]
    fn test_readme_example() {
        let source = "max: x1 - x2;\nx1 >= 0.3;\nx1 <= 30.6;\nx2 >= 24.9;\nx2 <= 50.1;\n";
        let model = parse(source).unwrap();

        assert_eq!(model.objective.direction, Direction::Maximize);
        assert_eq!(model.objective.expression.coefficient("x1"), Some(1.0));
        assert_eq!(model.objective.expression.coefficient("x2"), Some(-1.0));
        assert!(model.constraints.is_empty());
        assert_eq!(model.variable_names(), vec!["x1", "x2"]);

        let x1 = model.variable("x1").unwrap();
        assert_eq!((x1.lower_bound, x1.upper_bound, x1.kind), (0.3, 30.6, VarKind::Continuous));
        let x2 = model.variable("x2").unwrap();
        assert_eq!((x2.lower_bound, x2.upper_bound, x2.kind), (24.9, 50.1, VarKind::Continuous));
    }

    #[test]
    fn test_error_location() {
        let source = "max: x1 + x2;\nx1 >= 3;\n\nx1 <= 30.44.44;\n";
        let err = parse(source).unwrap_err();
        assert_eq!(err.index, 3);
        assert_eq!(err.line, 4);
        assert_eq!(err.statement, "x1 <= 30.44.44");
        assert_eq!(err.kind, ErrorKind::InvalidNumber("30.44.44".into()));
    }

    #[test]
    fn test_missing_objective_reported_before_syntax() {
        let err = parse("x1 >= 30.44.44;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingObjectiveDirection);

        let err = parse("abc: x1 + x2;\nx1 >= 3;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingObjectiveDirection);
        assert_eq!(err.index, 1);
    }

    #[test]
    fn test_duplicate_objective_reported_before_syntax() {
        let err = parse("max: x1;\nmin: x1 >= 3;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateObjective);
        assert_eq!(err.index, 2);

        let err = parse("max: x1;\nmin: ;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateObjective);
    }

    #[test]
    fn test_objective_syntax_error() {
        let err = parse("max: 33.33.33x1 + x2;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidNumber("33.33.33".into()));
    }

    #[test]
    fn test_empty_input() {
        let err = parse("  // nothing here\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingObjectiveDirection);
    }

    #[test]
    fn test_configured_parser() {
        let parser = Parser::new()
            .with_default_lower_bound(f64::NEG_INFINITY)
            .with_bound_tightening(false);
        let model = parser.parse("min: x + y;\nx >= 2;").unwrap();
        assert_eq!(model.constraints.len(), 1);
        assert_eq!(model.variable("y").unwrap().lower_bound, f64::NEG_INFINITY);
    }

    #[test]
    fn test_parse_reader() {
        let model = parse_reader("max: 2a + b;\na + b <= 4;".as_bytes()).unwrap();
        assert_eq!(model.num_constraints(), 1);
    }
}
