use std::collections::{HashMap, HashSet};
use std::fmt;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Maximize,
    Minimize,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Maximize => write!(f, "max"),
            Direction::Minimize => write!(f, "min"),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl ConstraintOp {
    /// The operator that holds after swapping both sides.
    pub fn flipped(self) -> Self {
        match self {
            ConstraintOp::Le => ConstraintOp::Ge,
            ConstraintOp::Ge => ConstraintOp::Le,
            ConstraintOp::Eq => ConstraintOp::Eq,
        }
    }
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintOp::Le => write!(f, "<="),
            ConstraintOp::Ge => write!(f, ">="),
            ConstraintOp::Eq => write!(f, "="),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VarKind {
    #[default]
    Continuous,
    Integer,
    Binary,
    Free,
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarKind::Continuous => write!(f, "continuous"),
            VarKind::Integer => write!(f, "int"),
            VarKind::Binary => write!(f, "bin"),
            VarKind::Free => write!(f, "free"),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub variable: String,
    pub coefficient: f64,
}

/// Variable coefficients in first-seen order plus a constant.
///
/// A variable appears at most once; repeated mentions are summed.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct LinearExpression {
    terms: Vec<Term>,
    pub constant: f64,
    /// Position of each variable in `terms`.
    #[cfg_attr(feature = "serde", serde(skip))]
    index: HashMap<String, usize>,
}

impl PartialEq for LinearExpression {
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms && self.constant == other.constant
    }
}

impl LinearExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn add_term(&mut self, variable: &str, coefficient: f64) {
        // A deserialized expression arrives without its index.
        if self.index.len() != self.terms.len() {
            self.reindex();
        }
        match self.index.get(variable) {
            Some(&i) => self.terms[i].coefficient += coefficient,
            None => {
                self.index.insert(variable.to_string(), self.terms.len());
                self.terms.push(Term {
                    variable: variable.to_string(),
                    coefficient,
                });
            }
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.variable.clone(), i))
            .collect();
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Subtract `other` term by term, keeping first-seen order.
    pub fn subtract(&mut self, other: &LinearExpression) {
        for term in &other.terms {
            self.add_term(&term.variable, -term.coefficient);
        }
        self.constant -= other.constant;
    }

    pub fn coefficient(&self, variable: &str) -> Option<f64> {
        if self.index.len() == self.terms.len() {
            return self.index.get(variable).map(|&i| self.terms[i].coefficient);
        }
        self.terms
            .iter()
            .find(|t| t.variable == variable)
            .map(|t| t.coefficient)
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.variable.as_str())
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// The variable name when the expression is exactly `1 * name`.
    pub fn as_single_variable(&self) -> Option<&str> {
        match self.terms.as_slice() {
            [term] if term.coefficient == 1.0 && self.constant == 0.0 => Some(&term.variable),
            _ => None,
        }
    }
}

impl fmt::Display for LinearExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            let c = term.coefficient;
            let magnitude = c.abs();
            match (i, c < 0.0) {
                (0, true) => write!(f, "-")?,
                (0, false) => {}
                (_, true) => write!(f, " - ")?,
                (_, false) => write!(f, " + ")?,
            }
            if magnitude != 1.0 {
                write!(f, "{} ", magnitude)?;
            }
            write!(f, "{}", term.variable)?;
        }
        if self.terms.is_empty() {
            write!(f, "{}", self.constant)?;
        } else if self.constant < 0.0 {
            write!(f, " - {}", -self.constant)?;
        } else if self.constant > 0.0 {
            write!(f, " + {}", self.constant)?;
        }
        Ok(())
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub direction: Direction,
    /// The constant part is the objective offset.
    pub expression: LinearExpression,
}

/// A normalized row: `expression <op> rhs`, with no constant in `expression`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub expression: LinearExpression,
    pub op: ConstraintOp,
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_bounds::lower"))]
    pub lower_bound: f64,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_bounds::upper"))]
    pub upper_bound: f64,
    pub kind: VarKind,
}

impl VariableDeclaration {
    pub fn new(name: impl Into<String>, lower_bound: f64) -> Self {
        Self {
            name: name.into(),
            lower_bound,
            upper_bound: f64::INFINITY,
            kind: VarKind::Continuous,
        }
    }

    pub fn is_integral(&self) -> bool {
        matches!(self.kind, VarKind::Integer | VarKind::Binary)
    }
}

/// A fully parsed linear program.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub objective: Objective,
    /// Rows in statement order.
    pub constraints: Vec<Constraint>,
    /// Variables in order of first appearance.
    pub variables: Vec<VariableDeclaration>,
}

impl Model {
    pub fn variable(&self, name: &str) -> Option<&VariableDeclaration> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_mixed_integer(&self) -> bool {
        self.variables.iter().any(VariableDeclaration::is_integral)
    }
}

impl fmt::Display for Model {
    /// Renders the model back into LP statements.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {};", self.objective.direction, self.objective.expression)?;

        let mut mentioned: HashSet<&str> = self.objective.expression.variables().collect();
        for (i, c) in self.constraints.iter().enumerate() {
            writeln!(f, "R{}: {} {} {};", i + 1, c.expression, c.op, c.rhs)?;
            mentioned.extend(c.expression.variables());
        }

        for var in &self.variables {
            if var.kind != VarKind::Continuous {
                writeln!(f, "{} {};", var.kind, var.name)?;
                mentioned.insert(&var.name);
            }
        }

        for var in &self.variables {
            let (default_lower, default_upper) = match var.kind {
                VarKind::Binary => (0.0, 1.0),
                VarKind::Free => (f64::NEG_INFINITY, f64::INFINITY),
                _ => (0.0, f64::INFINITY),
            };
            if var.lower_bound == var.upper_bound {
                writeln!(f, "{} = {};", var.name, var.lower_bound)?;
                continue;
            }
            let anchor = !mentioned.contains(var.name.as_str());
            if var.lower_bound.is_finite() && (var.lower_bound != default_lower || anchor) {
                writeln!(f, "{} >= {};", var.name, var.lower_bound)?;
            }
            if var.upper_bound.is_finite() && var.upper_bound != default_upper {
                writeln!(f, "{} <= {};", var.name, var.upper_bound)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_term_accumulates() {
        let mut expr = LinearExpression::new();
        expr.add_term("x1", 1.0);
        expr.add_term("x2", 2.0);
        expr.add_term("x1", 1.0);
        assert_eq!(expr.terms().len(), 2);
        assert_eq!(expr.coefficient("x1"), Some(2.0));
        assert_eq!(expr.variables().collect::<Vec<_>>(), vec!["x1", "x2"]);
    }

    #[test]
    fn test_subtract_moves_terms() {
        let mut lhs = LinearExpression::new();
        lhs.add_term("x", 3.0);
        lhs.add_constant(2.0);
        let mut rhs = LinearExpression::new();
        rhs.add_term("y", 1.0);
        rhs.add_term("x", 1.0);
        rhs.add_constant(5.0);

        lhs.subtract(&rhs);
        assert_eq!(lhs.coefficient("x"), Some(2.0));
        assert_eq!(lhs.coefficient("y"), Some(-1.0));
        assert_eq!(lhs.constant, -3.0);
    }

    #[test]
    fn test_single_variable() {
        let mut expr = LinearExpression::new();
        expr.add_term("x1", 1.0);
        assert_eq!(expr.as_single_variable(), Some("x1"));

        expr.add_constant(1.0);
        assert_eq!(expr.as_single_variable(), None);

        let mut scaled = LinearExpression::new();
        scaled.add_term("x1", 2.0);
        assert_eq!(scaled.as_single_variable(), None);
    }

    #[test]
    fn test_expression_display() {
        let mut expr = LinearExpression::new();
        expr.add_term("x1", -1.0);
        expr.add_term("x2", 2.5);
        expr.add_term("x3", -3.0);
        expr.add_constant(-4.0);
        assert_eq!(expr.to_string(), "-x1 + 2.5 x2 - 3 x3 - 4");
    }

    #[test]
    fn test_many_terms_keep_order() {
        let mut expr = LinearExpression::new();
        for i in 0..20_000 {
            expr.add_term(&format!("x{i}"), 1.0);
        }
        expr.add_term("x7", 2.0);
        assert_eq!(expr.terms().len(), 20_000);
        assert_eq!(expr.coefficient("x7"), Some(3.0));
        assert_eq!(expr.coefficient("x19999"), Some(1.0));
        assert_eq!(expr.variables().next(), Some("x0"));

        let mut other = LinearExpression::new();
        other.add_term("x7", 3.0);
        expr.subtract(&other);
        assert_eq!(expr.coefficient("x7"), Some(0.0));
    }

    #[test]
    fn test_equality_ignores_lookup() {
        let mut summed = LinearExpression::new();
        summed.add_term("a", 1.0);
        summed.add_term("a", 1.0);
        let mut direct = LinearExpression::new();
        direct.add_term("a", 2.0);
        assert_eq!(summed, direct);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_bounds_round_trip() {
        let mut free = VariableDeclaration::new("y", f64::NEG_INFINITY);
        free.kind = VarKind::Free;
        let bounded = VariableDeclaration {
            upper_bound: 4.0,
            ..VariableDeclaration::new("x", 1.5)
        };

        let json = serde_json::to_string(&free).unwrap();
        assert!(json.contains("\"lower_bound\":null"));
        assert!(json.contains("\"upper_bound\":null"));
        let back: VariableDeclaration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, free);

        let json = serde_json::to_string(&bounded).unwrap();
        let back: VariableDeclaration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bounded);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialized_expression_accumulates() {
        let mut expr = LinearExpression::new();
        expr.add_term("x", 1.0);
        expr.add_term("y", 2.0);
        let json = serde_json::to_string(&expr).unwrap();
        assert!(!json.contains("index"));

        let mut back: LinearExpression = serde_json::from_str(&json).unwrap();
        assert_eq!(back.coefficient("y"), Some(2.0));
        back.add_term("x", 1.0);
        assert_eq!(back.terms().len(), 2);
        assert_eq!(back.coefficient("x"), Some(2.0));
    }

    #[test]
    fn test_flipped() {
        assert_eq!(ConstraintOp::Le.flipped(), ConstraintOp::Ge);
        assert_eq!(ConstraintOp::Ge.flipped(), ConstraintOp::Le);
        assert_eq!(ConstraintOp::Eq.flipped(), ConstraintOp::Eq);
    }
}
