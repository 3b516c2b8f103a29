use std::fmt;

use lpformat_lang::{ConstraintOp, Direction, Model, SolverAdapter, VarKind, VariableDeclaration};

use crate::error::DenseError;

/// Represents a linear programming problem with a dense coefficient matrix
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LpProblem {
    /// Variable names
    pub variables: Vec<String>,
    #[cfg_attr(feature = "serde", serde(with = "lpformat_lang::serde_bounds::lower_seq"))]
    pub lower_bounds: Vec<f64>,
    #[cfg_attr(feature = "serde", serde(with = "lpformat_lang::serde_bounds::upper_seq"))]
    pub upper_bounds: Vec<f64>,
    /// Integrality flag per variable
    pub integer: Vec<bool>,
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub minimize: bool,
    /// Constant added to the objective value
    pub offset: f64,
}

impl Default for Objective {
    fn default() -> Self {
        Self {
            coefficients: Vec::new(),
            minimize: true,
            offset: 0.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Generated row name (R1, R2, ...)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

impl LpProblem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the dense form of a parsed model.
    pub fn from_model(model: &Model) -> Result<Self, DenseError> {
        let mut problem = Self::new();
        model.load_into(&mut problem)?;
        tracing::debug!(
            component = "dense",
            operation = "from_model",
            status = "success",
            columns = problem.num_variables(),
            rows = problem.num_constraints(),
            "Built dense problem"
        );
        Ok(problem)
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_mixed_integer(&self) -> bool {
        self.integer.iter().any(|&i| i)
    }

    /// Objective value at `values`, including the offset.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        dot(&self.objective.coefficients, values) + self.objective.offset
    }

    /// Whether `values` satisfies every bound and row within `tolerance`.
    pub fn is_feasible(&self, values: &[f64], tolerance: f64) -> bool {
        if values.len() != self.num_variables() {
            return false;
        }
        let in_bounds = values.iter().enumerate().all(|(j, &v)| {
            v >= self.lower_bounds[j] - tolerance
                && v <= self.upper_bounds[j] + tolerance
                && (!self.integer[j] || (v - v.round()).abs() <= tolerance)
        });
        in_bounds
            && self.constraints.iter().all(|c| {
                let lhs = dot(&c.coefficients, values);
                match c.op {
                    ConstraintOp::Le => lhs <= c.rhs + tolerance,
                    ConstraintOp::Ge => lhs >= c.rhs - tolerance,
                    ConstraintOp::Eq => (lhs - c.rhs).abs() <= tolerance,
                }
            })
    }

    fn dense_row(&self, terms: &[(usize, f64)]) -> Result<Vec<f64>, DenseError> {
        let mut coefficients = vec![0.0; self.num_variables()];
        for &(j, coef) in terms {
            if !coef.is_finite() {
                return Err(DenseError::InvalidCoefficient { coefficient: coef });
            }
            let slot = coefficients
                .get_mut(j)
                .ok_or(DenseError::UnknownVariable(j))?;
            *slot += coef;
        }
        Ok(coefficients)
    }
}

fn dot(coefficients: &[f64], values: &[f64]) -> f64 {
    coefficients.iter().zip(values).map(|(c, v)| c * v).sum()
}

impl SolverAdapter for LpProblem {
    type Variable = usize;
    type Error = DenseError;

    fn add_variable(&mut self, declaration: &VariableDeclaration) -> Result<usize, DenseError> {
        let (lower, upper) = (declaration.lower_bound, declaration.upper_bound);
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(DenseError::InvalidVariableBounds {
                name: declaration.name.clone(),
                lower,
                upper,
            });
        }

        let j = self.variables.len();
        self.variables.push(declaration.name.clone());
        self.lower_bounds.push(lower);
        self.upper_bounds.push(upper);
        self.integer.push(matches!(declaration.kind, VarKind::Integer | VarKind::Binary));

        // Columns added after rows start at zero everywhere.
        self.objective.coefficients.resize(j + 1, 0.0);
        for c in &mut self.constraints {
            c.coefficients.resize(j + 1, 0.0);
        }
        Ok(j)
    }

    fn set_objective(
        &mut self,
        direction: Direction,
        terms: &[(usize, f64)],
        offset: f64,
    ) -> Result<(), DenseError> {
        self.objective = Objective {
            coefficients: self.dense_row(terms)?,
            minimize: direction == Direction::Minimize,
            offset,
        };
        Ok(())
    }

    fn add_row(&mut self, terms: &[(usize, f64)], op: ConstraintOp, rhs: f64) -> Result<(), DenseError> {
        let coefficients = self.dense_row(terms)?;
        self.constraints.push(Constraint {
            name: format!("R{}", self.constraints.len() + 1),
            coefficients,
            op,
            rhs,
        });
        Ok(())
    }
}

impl fmt::Display for LpProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sense = if self.objective.minimize { "min" } else { "max" };
        write!(f, "{:>8}", "")?;
        for name in &self.variables {
            write!(f, " {:>10}", name)?;
        }
        writeln!(f)?;

        write!(f, "{:>8}", sense)?;
        for c in &self.objective.coefficients {
            write!(f, " {:>10}", c)?;
        }
        writeln!(f, "   + {}", self.objective.offset)?;

        for row in &self.constraints {
            write!(f, "{:>8}", row.name)?;
            for c in &row.coefficients {
                write!(f, " {:>10}", c)?;
            }
            writeln!(f, "   {} {}", row.op, row.rhs)?;
        }

        write!(f, "{:>8}", "lower")?;
        for b in &self.lower_bounds {
            write!(f, " {:>10}", b)?;
        }
        writeln!(f)?;
        write!(f, "{:>8}", "upper")?;
        for b in &self.upper_bounds {
            write!(f, " {:>10}", b)?;
        }
        writeln!(f)?;
        write!(f, "{:>8}", "int")?;
        for &i in &self.integer {
            write!(f, " {:>10}", if i { "yes" } else { "no" })?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpformat_lang::parse;

    #[test]
    fn test_from_model() {
        let model = parse(
            "max: 3x + 2y + 1;\nc1: x + y <= 4;\nc2: x + 3y - 2 <= 4;\nx <= 3;\nint y;",
        )
        .unwrap();
        let problem = LpProblem::from_model(&model).unwrap();

        assert_eq!(problem.variables, vec!["x", "y"]);
        assert!(!problem.objective.minimize);
        assert_eq!(problem.objective.coefficients, vec![3.0, 2.0]);
        assert_eq!(problem.objective.offset, 1.0);
        assert_eq!(problem.upper_bounds, vec![3.0, f64::INFINITY]);
        assert_eq!(problem.integer, vec![false, true]);
        assert!(problem.is_mixed_integer());

        assert_eq!(problem.num_constraints(), 2);
        assert_eq!(problem.constraints[0].name, "R1");
        assert_eq!(problem.constraints[1].coefficients, vec![1.0, 3.0]);
        assert_eq!(problem.constraints[1].rhs, 6.0);
    }

    #[test]
    fn test_feasibility() {
        let model = parse("max: 3x + 2y;\nc1: x + y <= 4;\nc2: x + 3y <= 6;\nx <= 3;").unwrap();
        let problem = LpProblem::from_model(&model).unwrap();

        assert!(problem.is_feasible(&[3.0, 1.0], 1e-9));
        assert_eq!(problem.objective_value(&[3.0, 1.0]), 11.0);
        assert!(!problem.is_feasible(&[3.5, 0.0], 1e-9));
        assert!(!problem.is_feasible(&[2.0, 2.0, 0.0], 1e-9));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let model = parse("max: x1;\nx1 >= 10;\nx1 <= 5;").unwrap();
        let err = LpProblem::from_model(&model).unwrap_err();
        assert_eq!(
            err,
            DenseError::InvalidVariableBounds {
                name: "x1".into(),
                lower: 10.0,
                upper: 5.0,
            }
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_keeps_infinite_bounds() {
        let model = parse("max: x + y;\nx <= 3;\nfree y;").unwrap();
        let problem = LpProblem::from_model(&model).unwrap();

        let json = serde_json::to_string(&problem).unwrap();
        assert!(json.contains("\"lower_bounds\":[0.0,null]"));
        assert!(json.contains("\"upper_bounds\":[3.0,null]"));
        let back: LpProblem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, problem);
    }

    #[test]
    fn test_late_variable_widens_rows() {
        let mut problem = LpProblem::new();
        let x = problem
            .add_variable(&VariableDeclaration::new("x", 0.0))
            .unwrap();
        problem.add_row(&[(x, 2.0)], ConstraintOp::Le, 4.0).unwrap();
        problem
            .add_variable(&VariableDeclaration::new("y", 0.0))
            .unwrap();
        assert_eq!(problem.constraints[0].coefficients, vec![2.0, 0.0]);
        assert_eq!(
            problem.add_row(&[(7, 1.0)], ConstraintOp::Ge, 0.0),
            Err(DenseError::UnknownVariable(7))
        );
    }
}
