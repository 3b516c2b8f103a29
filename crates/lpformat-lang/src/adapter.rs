//! The narrow interface a solver integration implements to receive a [`Model`].

use std::collections::HashMap;

use crate::model::{ConstraintOp, Direction, LinearExpression, Model, VariableDeclaration};

pub trait SolverAdapter {
    /// Solver-side handle for a variable.
    type Variable: Copy;
    type Error;

    /// Create a variable with the declaration's bounds and kind.
    fn add_variable(&mut self, declaration: &VariableDeclaration)
        -> Result<Self::Variable, Self::Error>;

    fn set_objective(
        &mut self,
        direction: Direction,
        terms: &[(Self::Variable, f64)],
        offset: f64,
    ) -> Result<(), Self::Error>;

    fn add_row(
        &mut self,
        terms: &[(Self::Variable, f64)],
        op: ConstraintOp,
        rhs: f64,
    ) -> Result<(), Self::Error>;
}

/// Handles created by [`Model::load_into`], aligned with the variable names.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<V> {
    pub names: Vec<String>,
    pub handles: Vec<V>,
}

impl<V: Copy> Loaded<V> {
    pub fn handle(&self, name: &str) -> Option<V> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.handles[i])
    }
}

impl Model {
    /// Create every variable, set the objective, then add each row in order.
    pub fn load_into<A: SolverAdapter>(&self, adapter: &mut A) -> Result<Loaded<A::Variable>, A::Error> {
        let mut names = Vec::with_capacity(self.variables.len());
        let mut handles = Vec::with_capacity(self.variables.len());
        for declaration in &self.variables {
            handles.push(adapter.add_variable(declaration)?);
            names.push(declaration.name.clone());
        }
        let lookup: HashMap<&str, A::Variable> = names
            .iter()
            .map(String::as_str)
            .zip(handles.iter().copied())
            .collect();

        let terms = resolve(&lookup, &self.objective.expression);
        adapter.set_objective(
            self.objective.direction,
            &terms,
            self.objective.expression.constant,
        )?;

        for constraint in &self.constraints {
            let terms = resolve(&lookup, &constraint.expression);
            adapter.add_row(&terms, constraint.op, constraint.rhs)?;
        }

        tracing::debug!(
            component = "adapter",
            operation = "load_into",
            status = "success",
            variables = handles.len(),
            rows = self.constraints.len(),
            "Loaded model into solver adapter"
        );
        Ok(Loaded { names, handles })
    }
}

/// Every variable of a built model has a declaration, so lookups never miss.
fn resolve<V: Copy>(lookup: &HashMap<&str, V>, expr: &LinearExpression) -> Vec<(V, f64)> {
    expr.terms()
        .iter()
        .filter_map(|t| lookup.get(t.variable.as_str()).map(|&h| (h, t.coefficient)))
        .collect()
}
