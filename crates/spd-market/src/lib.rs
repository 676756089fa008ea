//! # spd-market: Co-optimised Energy and Reserve Dispatch
//!
//! Formulates and solves the scheduling, pricing and dispatch problem for
//! a market held in a [`spd_core::Market`]: a linear program minimising the
//! combined cost of energy and reserve procurement subject to nodal
//! balance, transmission limits, offer caps, spinning-reserve coupling and
//! zonal risk cover.
//!
//! ## Pipeline
//!
//! | Stage | What it does |
//! |-------|--------------|
//! | sweep expansion | one immutable parameter snapshot per instance |
//! | formulation | one block-diagonal LP spanning all instances |
//! | solve | Clarabel interior-point, primals and duals recovered |
//! | assembly | prices from duals, dispatch from primals, wide table |
//!
//! Prices are shadow prices: the nodal energy price is the dual of that
//! node's balance row, the zonal reserve price the dual of the zone's
//! cover row. A parametric sweep multiplexes many scenarios into one
//! program by prefixing every symbol with its instance label, so a whole
//! price/quantity curve comes back from a single solve.
//!
//! ## Example
//!
//! ```rust
//! use spd_core::{Actor, Attribute, Market};
//! use spd_market::{DispatchSolver, Sweep};
//!
//! let mut market = Market::new();
//! let zone = market.add_zone("NI").unwrap();
//! let node = market.add_node("HAY", zone, 100.0).unwrap();
//! let company = market.add_company("GenCo").unwrap();
//! let station = market.add_station("HAY_GEN", node, company, 200.0).unwrap();
//! market.set_energy_offer(station, 50.0, 200.0).unwrap();
//!
//! let solution = DispatchSolver::new()
//!     .solve(&market, &Sweep::single())
//!     .unwrap();
//! let price = solution.outcomes[0].energy_price["HAY"];
//! assert!((price - 50.0).abs() < 1e-2);
//! ```

mod build;
mod error;
mod instance;
mod program;
mod results;
mod solver;
mod sweep;
mod symbols;

pub use error::{DispatchError, DispatchResult};
pub use program::LinearProgram;
pub use results::{InstanceOutcome, ResultTable, SweepSolution};
pub use solver::{SolveReport, SolveStatus};
pub use sweep::Sweep;

use std::path::Path;

use spd_core::Market;
use sweep::SweepKind;

/// Facade over the build → solve → assemble pipeline.
#[derive(Debug, Clone, Default)]
pub struct DispatchSolver;

impl DispatchSolver {
    pub fn new() -> Self {
        Self
    }

    /// Expand, formulate, solve and assemble in one call.
    ///
    /// Any failure along the way aborts the run; partial results are never
    /// returned.
    pub fn solve(&self, market: &Market, sweep: &Sweep) -> DispatchResult<SweepSolution> {
        let instances = instance::expand(market, sweep)?;
        let lp = build::build_program(&instances);
        let report = solver::solve_program(&lp)?;
        results::assemble(&instances, axis_label(market, sweep), &lp, &report)
    }

    /// Formulate without solving, for inspection or export.
    pub fn build(&self, market: &Market, sweep: &Sweep) -> DispatchResult<LinearProgram> {
        let instances = instance::expand(market, sweep)?;
        Ok(build::build_program(&instances))
    }

    /// Solve an already-formulated program, exposing raw primals and duals
    /// by canonical name.
    pub fn solve_program(&self, lp: &LinearProgram) -> DispatchResult<SolveReport> {
        solver::solve_program(lp)
    }

    /// Write the formulated program in CPLEX-LP text format.
    pub fn write_lp(&self, market: &Market, sweep: &Sweep, path: &Path) -> DispatchResult<()> {
        self.build(market, sweep)?.write_lp(path)
    }
}

fn axis_label(market: &Market, sweep: &Sweep) -> Option<String> {
    match &sweep.kind {
        SweepKind::Single => None,
        SweepKind::Parametric {
            actor, attribute, ..
        } => Some(format!(
            "{} {}",
            market.actor_name(*actor),
            results::title_words(attribute.as_str())
        )),
    }
}
