//! A generic named linear program.
//!
//! The builder appends named variables and named rows; the solver adapter
//! reads them out as matrices; [`LinearProgram::write_lp`] renders the
//! whole thing in CPLEX-LP text for offline inspection. Rows keep their
//! declared sense (`=`, `<=`, `>=`) so dual signs can be restored after the
//! backend's cone normalisation.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use crate::error::DispatchResult;

/// Sense of a constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowSense {
    Eq,
    Le,
    Ge,
}

#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub name: String,
    /// (variable index, coefficient), deduplicated by construction.
    pub coeffs: Vec<(usize, f64)>,
    pub sense: RowSense,
    pub rhs: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct VarDef {
    pub name: String,
    /// true: x >= 0, false: free.
    pub nonneg: bool,
}

/// One LP spanning every instance of a sweep.
///
/// Per-instance subproblems share no variables, so the matrix is
/// block-diagonal; building a single program is purely a batch-solve
/// convenience. Rows are streamed in as they are formulated; there is
/// never an intermediate per-instance program.
#[derive(Debug, Clone, Default)]
pub struct LinearProgram {
    pub(crate) vars: Vec<VarDef>,
    pub(crate) rows: Vec<Row>,
    pub(crate) objective: Vec<f64>,
    var_index: HashMap<String, usize>,
    row_index: HashMap<String, usize>,
}

impl LinearProgram {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a variable; panics on a duplicate name, which can only be a
    /// formulation bug since all names are derived deterministically.
    pub(crate) fn add_var(&mut self, name: String, nonneg: bool) -> usize {
        let index = self.vars.len();
        let previous = self.var_index.insert(name.clone(), index);
        assert!(previous.is_none(), "duplicate variable '{}'", name);
        self.vars.push(VarDef { name, nonneg });
        self.objective.push(0.0);
        index
    }

    /// Set a variable's objective coefficient (minimisation).
    pub(crate) fn set_cost(&mut self, var: usize, cost: f64) {
        self.objective[var] = cost;
    }

    pub(crate) fn add_row(
        &mut self,
        name: String,
        coeffs: Vec<(usize, f64)>,
        sense: RowSense,
        rhs: f64,
    ) {
        let index = self.rows.len();
        let previous = self.row_index.insert(name.clone(), index);
        assert!(previous.is_none(), "duplicate constraint '{}'", name);
        self.rows.push(Row {
            name,
            coeffs,
            sense,
            rhs,
        });
    }

    pub(crate) fn var_id(&self, name: &str) -> Option<usize> {
        self.var_index.get(name).copied()
    }

    pub(crate) fn row_id(&self, name: &str) -> Option<usize> {
        self.row_index.get(name).copied()
    }

    /// Number of decision variables.
    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// Number of constraint rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Variable names in declaration order.
    pub fn var_names(&self) -> impl Iterator<Item = &str> {
        self.vars.iter().map(|v| v.name.as_str())
    }

    /// Row names in declaration order.
    pub fn row_names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.name.as_str())
    }

    /// Write the program in CPLEX-LP text format, for debugging.
    pub fn write_lp(&self, path: &Path) -> DispatchResult<()> {
        let mut file = std::fs::File::create(path)?;
        writeln!(file, "\\ Co-optimised energy and reserve dispatch")?;
        writeln!(file, "Minimize")?;
        writeln!(file, " obj: {}", self.render_objective())?;
        writeln!(file, "Subject To")?;
        for row in &self.rows {
            let sense = match row.sense {
                RowSense::Eq => "=",
                RowSense::Le => "<=",
                RowSense::Ge => ">=",
            };
            writeln!(
                file,
                " {}: {} {} {}",
                row.name,
                self.render_terms(&row.coeffs),
                sense,
                row.rhs
            )?;
        }
        writeln!(file, "Bounds")?;
        for var in &self.vars {
            if !var.nonneg {
                writeln!(file, " {} free", var.name)?;
            }
        }
        writeln!(file, "End")?;
        Ok(())
    }

    fn render_objective(&self) -> String {
        let terms: Vec<(usize, f64)> = self
            .objective
            .iter()
            .enumerate()
            .filter(|(_, &c)| c != 0.0)
            .map(|(i, &c)| (i, c))
            .collect();
        self.render_terms(&terms)
    }

    fn render_terms(&self, coeffs: &[(usize, f64)]) -> String {
        let mut out = String::new();
        for (k, &(var, coeff)) in coeffs.iter().enumerate() {
            if k == 0 {
                if coeff < 0.0 {
                    out.push_str("- ");
                }
            } else if coeff < 0.0 {
                out.push_str(" - ");
            } else {
                out.push_str(" + ");
            }
            out.push_str(&format!("{} {}", coeff.abs(), self.vars[var].name));
        }
        if out.is_empty() {
            out.push('0');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tiny_program() -> LinearProgram {
        let mut lp = LinearProgram::new();
        let x = lp.add_var("x".into(), true);
        let y = lp.add_var("y".into(), false);
        lp.set_cost(x, 2.0);
        lp.set_cost(y, -1.0);
        lp.add_row(
            "cap".into(),
            vec![(x, 1.0), (y, 1.0)],
            RowSense::Le,
            10.0,
        );
        lp.add_row("floor".into(), vec![(y, 1.0)], RowSense::Ge, -5.0);
        lp
    }

    #[test]
    fn test_indices_round_trip() {
        let lp = tiny_program();
        assert_eq!(lp.num_vars(), 2);
        assert_eq!(lp.num_rows(), 2);
        assert_eq!(lp.var_id("x"), Some(0));
        assert_eq!(lp.row_id("floor"), Some(1));
        assert_eq!(lp.var_id("z"), None);
    }

    #[test]
    fn test_write_lp_format() {
        let lp = tiny_program();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.lp");
        lp.write_lp(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("\\ "));
        assert!(text.contains("Minimize"));
        assert!(text.contains("obj: 2 x - 1 y"));
        assert!(text.contains(" cap: 1 x + 1 y <= 10"));
        assert!(text.contains(" floor: 1 y >= -5"));
        assert!(text.contains(" y free"));
        assert!(text.trim_end().ends_with("End"));
    }

    #[test]
    #[should_panic(expected = "duplicate variable")]
    fn test_duplicate_variable_panics() {
        let mut lp = LinearProgram::new();
        lp.add_var("x".into(), true);
        lp.add_var("x".into(), true);
    }
}
