//! Result assembly: from a solved program back to participants.
//!
//! The assembler walks the instance tables and queries the solved program
//! through the same canonical-name helpers the builder used; a name it
//! cannot find is a formulation bug and is reported as an extraction error
//! carrying the offending symbol. Nothing here parses names back apart,
//! since the (instance, participant, quantity) tuples were never lost.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::error::{DispatchError, DispatchResult};
use crate::instance::InstanceData;
use crate::program::LinearProgram;
use crate::solver::{SolveReport, SolveStatus};
use crate::symbols;

/// Everything extracted from one instance of the sweep.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceOutcome {
    pub label: String,
    /// The swept value this instance realised (0.0 for a single run).
    pub value: f64,
    /// Nodal energy price by node name ($/MWh).
    pub energy_price: HashMap<String, f64>,
    /// Zonal reserve price by zone name ($/MWh).
    pub reserve_price: HashMap<String, f64>,
    /// Cleared energy by station name (MW).
    pub energy_dispatch: HashMap<String, f64>,
    /// Cleared reserve by unit name, stations and ILs alike (MW).
    pub reserve_dispatch: HashMap<String, f64>,
    /// Signed flow by branch name (MW, positive from sending to receiving).
    pub branch_flow: HashMap<String, f64>,
    /// Procured reserve requirement by zone name (MW).
    pub reserve_risk: HashMap<String, f64>,
}

/// The master table: one row per instance, sorted ascending by the swept
/// value, one column per (participant, quantity) pair.
#[derive(Debug, Clone, Serialize)]
pub struct ResultTable {
    /// What the row index means, e.g. `IL1 Reserve Price`.
    pub index_label: String,
    /// Row index: the swept values, ascending.
    pub index: Vec<f64>,
    pub columns: Vec<String>,
    /// Row-major values, aligned with `index` × `columns`.
    pub values: Vec<Vec<f64>>,
}

impl ResultTable {
    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// A whole column by name, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let col = self.columns.iter().position(|c| c == name)?;
        Some(self.values.iter().map(|row| row[col]).collect())
    }

    /// A single cell by row position and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.values.get(row).map(|r| r[col])
    }

    /// Write the table as pretty-printed JSON, for downstream analytics.
    pub fn to_json(&self, path: &Path) -> DispatchResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// A completed run: per-instance outcomes, the master table and solver
/// metadata.
#[derive(Debug, Clone, Serialize)]
pub struct SweepSolution {
    pub status: SolveStatus,
    /// Total objective across all instances ($).
    pub objective: f64,
    /// Wall-clock of the solve step (seconds).
    pub solution_time_sec: f64,
    pub outcomes: Vec<InstanceOutcome>,
    pub master: ResultTable,
}

/// Join solved primals and duals back to participants.
pub(crate) fn assemble(
    instances: &[InstanceData],
    axis_label: Option<String>,
    lp: &LinearProgram,
    report: &SolveReport,
) -> DispatchResult<SweepSolution> {
    let mut outcomes = Vec::with_capacity(instances.len());
    for inst in instances {
        outcomes.push(extract_instance(inst, lp, report)?);
    }
    outcomes.sort_by(|a, b| a.value.total_cmp(&b.value));

    let master = tabulate(instances, &outcomes, axis_label);

    Ok(SweepSolution {
        status: report.status,
        objective: report.objective,
        solution_time_sec: report.solve_time.as_secs_f64(),
        outcomes,
        master,
    })
}

fn extract_instance(
    inst: &InstanceData,
    lp: &LinearProgram,
    report: &SolveReport,
) -> DispatchResult<InstanceOutcome> {
    let primal = |name: String| -> DispatchResult<f64> {
        report
            .primal(lp, &name)
            .ok_or(DispatchError::MissingPrimal(name))
    };
    let dual = |name: String| -> DispatchResult<f64> {
        report
            .dual(lp, &name)
            .ok_or(DispatchError::MissingDual(name))
    };

    let mut outcome = InstanceOutcome {
        label: inst.label.clone(),
        value: inst.value,
        energy_price: HashMap::new(),
        reserve_price: HashMap::new(),
        energy_dispatch: HashMap::new(),
        reserve_dispatch: HashMap::new(),
        branch_flow: HashMap::new(),
        reserve_risk: HashMap::new(),
    };

    for node in &inst.nodes {
        let fq = symbols::fq(&inst.label, &node.name);
        // The balance row is written as injection minus generation, so the
        // backend's marginal comes out negated.
        let price = -dual(symbols::energy_price_row(&fq))?;
        outcome.energy_price.insert(node.name.clone(), price);
    }

    for zone in &inst.zones {
        let fq = symbols::fq(&inst.label, &zone.name);
        let price = if zone.reserve_units.is_empty() {
            // No cover row was formulated; there is no one to pay.
            0.0
        } else {
            dual(symbols::reserve_price_row(&fq))?
        };
        outcome.reserve_price.insert(zone.name.clone(), price);
        outcome
            .reserve_risk
            .insert(zone.name.clone(), primal(symbols::risk_var(&fq))?);
    }

    for station in &inst.stations {
        let fq = symbols::fq(&inst.label, &station.name);
        outcome
            .energy_dispatch
            .insert(station.name.clone(), primal(symbols::energy_var(&fq))?);
        if station.reserve.is_some() {
            outcome
                .reserve_dispatch
                .insert(station.name.clone(), primal(symbols::reserve_var(&fq))?);
        }
    }

    for load in &inst.loads {
        let fq = symbols::fq(&inst.label, &load.name);
        outcome
            .reserve_dispatch
            .insert(load.name.clone(), primal(symbols::reserve_var(&fq))?);
    }

    for branch in &inst.branches {
        let fq = symbols::fq(&inst.label, &branch.name);
        outcome
            .branch_flow
            .insert(branch.name.clone(), primal(symbols::flow_var(&fq))?);
    }

    Ok(outcome)
}

/// Reshape per-instance outcomes into the wide master table. Participants
/// are identical across instances (they all come from one registry), so the
/// first instance fixes the column set.
fn tabulate(
    instances: &[InstanceData],
    outcomes: &[InstanceOutcome],
    axis_label: Option<String>,
) -> ResultTable {
    let template = &instances[0];

    let mut columns: Vec<(String, Quantity)> = Vec::new();
    for node in &template.nodes {
        columns.push((format!("{} Energy Price", node.name), Quantity::EnergyPrice));
    }
    for zone in &template.zones {
        columns.push((
            format!("{} Reserve Price", zone.name),
            Quantity::ReservePrice,
        ));
    }
    for station in &template.stations {
        columns.push((
            format!("{} Energy Total", station.name),
            Quantity::EnergyDispatch,
        ));
    }
    for station in &template.stations {
        if station.reserve.is_some() {
            columns.push((
                format!("{} Reserve Total", station.name),
                Quantity::ReserveDispatch,
            ));
        }
    }
    for load in &template.loads {
        columns.push((
            format!("{} Reserve Total", load.name),
            Quantity::ReserveDispatch,
        ));
    }
    for branch in &template.branches {
        columns.push((
            format!("{} Transmission Total", branch.name),
            Quantity::BranchFlow,
        ));
    }
    for zone in &template.zones {
        columns.push((format!("{} Reserve Risk", zone.name), Quantity::ReserveRisk));
    }

    let mut index = Vec::with_capacity(outcomes.len());
    let mut values = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        index.push(outcome.value);
        let row: Vec<f64> = columns
            .iter()
            .map(|(name, quantity)| {
                let participant = name
                    .rsplitn(3, ' ')
                    .nth(2)
                    .expect("column names are '{participant} {two-word quantity}'");
                let table = match quantity {
                    Quantity::EnergyPrice => &outcome.energy_price,
                    Quantity::ReservePrice => &outcome.reserve_price,
                    Quantity::EnergyDispatch => &outcome.energy_dispatch,
                    Quantity::ReserveDispatch => &outcome.reserve_dispatch,
                    Quantity::BranchFlow => &outcome.branch_flow,
                    Quantity::ReserveRisk => &outcome.reserve_risk,
                };
                table[participant]
            })
            .collect();
        values.push(row);
    }

    ResultTable {
        index_label: axis_label.unwrap_or_else(|| "Run".to_string()),
        index,
        columns: columns.into_iter().map(|(name, _)| name).collect(),
        values,
    }
}

#[derive(Clone, Copy)]
enum Quantity {
    EnergyPrice,
    ReservePrice,
    EnergyDispatch,
    ReserveDispatch,
    BranchFlow,
    ReserveRisk,
}

/// `reserve_price` → `Reserve Price`, for the table's index label.
pub(crate) fn title_words(snake: &str) -> String {
    snake
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
