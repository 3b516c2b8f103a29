//! Accumulating classified statements into a [`Model`].

use std::collections::HashMap;

use crate::error::ErrorKind;
use crate::model::{
    Constraint, ConstraintOp, LinearExpression, Model, Objective, VarKind, VariableDeclaration,
};
use crate::statement::Statement;

pub struct ModelBuilder {
    default_lower_bound: f64,
    bound_tightening: bool,
    objective: Option<Objective>,
    constraints: Vec<Constraint>,
    variables: Vec<VariableDeclaration>,
    index: HashMap<String, usize>,
}

impl ModelBuilder {
    pub fn new(default_lower_bound: f64) -> Self {
        Self {
            default_lower_bound,
            bound_tightening: true,
            objective: None,
            constraints: Vec::new(),
            variables: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// When disabled, single-variable constraints are kept as rows.
    pub fn with_bound_tightening(mut self, enabled: bool) -> Self {
        self.bound_tightening = enabled;
        self
    }

    pub fn has_objective(&self) -> bool {
        self.objective.is_some()
    }

    /// The declaration for `name`, registering it with defaults on first sight.
    fn entry(&mut self, name: &str) -> &mut VariableDeclaration {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                let idx = self.variables.len();
                self.variables
                    .push(VariableDeclaration::new(name, self.default_lower_bound));
                self.index.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.variables[idx]
    }

    fn register(&mut self, expr: &LinearExpression) {
        for name in expr.variables() {
            self.entry(name);
        }
    }

    pub fn apply(&mut self, statement: Statement) -> Result<(), ErrorKind> {
        match statement {
            Statement::Objective {
                direction,
                expression,
            } => {
                if self.objective.is_some() {
                    return Err(ErrorKind::DuplicateObjective);
                }
                if expression.is_constant() {
                    return Err(ErrorKind::NoVariables);
                }
                self.register(&expression);
                self.objective = Some(Objective {
                    direction,
                    expression,
                });
                Ok(())
            }
            _ if self.objective.is_none() => Err(ErrorKind::MissingObjectiveDirection),
            Statement::Declaration { kind, names } => {
                for name in &names {
                    self.declare(name, kind)?;
                }
                Ok(())
            }
            Statement::Constraint { lhs, op, rhs } => self.add_constraint(lhs, op, rhs),
        }
    }

    fn declare(&mut self, name: &str, kind: VarKind) -> Result<(), ErrorKind> {
        let var = self.entry(name);
        if var.kind != VarKind::Continuous && var.kind != kind {
            return Err(ErrorKind::ConflictingDeclaration {
                name: name.to_string(),
                existing: var.kind,
                requested: kind,
            });
        }
        var.kind = kind;
        match kind {
            VarKind::Binary => {
                var.lower_bound = 0.0;
                var.upper_bound = 1.0;
            }
            VarKind::Free => var.lower_bound = f64::NEG_INFINITY,
            VarKind::Integer | VarKind::Continuous => {}
        }
        Ok(())
    }

    fn add_constraint(
        &mut self,
        lhs: LinearExpression,
        op: ConstraintOp,
        rhs: LinearExpression,
    ) -> Result<(), ErrorKind> {
        if lhs.is_constant() && rhs.is_constant() {
            return Err(ErrorKind::NoVariables);
        }
        self.register(&lhs);
        self.register(&rhs);

        if self.bound_tightening {
            let bound = match (lhs.as_single_variable(), rhs.as_single_variable()) {
                (Some(name), _) if rhs.is_constant() => Some((name, op, rhs.constant)),
                (_, Some(name)) if lhs.is_constant() => Some((name, op.flipped(), lhs.constant)),
                _ => None,
            };
            if let Some((name, op, value)) = bound {
                self.tighten(name, op, value);
                return Ok(());
            }
        }

        let mut expression = lhs;
        expression.subtract(&rhs);
        let rhs = 0.0 - expression.constant;
        expression.constant = 0.0;
        self.constraints.push(Constraint {
            expression,
            op,
            rhs,
        });
        Ok(())
    }

    /// Last write wins for each bound direction.
    fn tighten(&mut self, name: &str, op: ConstraintOp, value: f64) {
        let var = self.entry(name);
        match op {
            ConstraintOp::Ge => var.lower_bound = value,
            ConstraintOp::Le => var.upper_bound = value,
            ConstraintOp::Eq => {
                var.lower_bound = value;
                var.upper_bound = value;
            }
        }
        tracing::debug!(
            component = "builder",
            operation = "tighten_bound",
            variable = name,
            op = %op,
            value,
            "Tightened variable bound"
        );
    }

    pub fn finish(self) -> Result<Model, ErrorKind> {
        let objective = self.objective.ok_or(ErrorKind::MissingObjectiveDirection)?;
        Ok(Model {
            objective,
            constraints: self.constraints,
            variables: self.variables,
        })
    }
}
