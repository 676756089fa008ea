//! Canonical symbol names at the solver boundary.
//!
//! Internally the pipeline carries typed (instance, participant) tuples;
//! strings exist only because the LP backend and the LP text format key
//! variables and rows by name. Both the builder and the assembler derive
//! names through these helpers, so the two sides can never drift apart.

use std::fmt::Display;

/// Fully-qualified participant symbol: `{instance label}_{participant}`.
pub(crate) fn fq(label: &str, name: impl Display) -> String {
    format!("{}_{}", label, name)
}

// === Decision variables ===

pub(crate) fn energy_var(fq: &str) -> String {
    format!("Energy_Total_{}", fq)
}

pub(crate) fn reserve_var(fq: &str) -> String {
    format!("Reserve_Total_{}", fq)
}

pub(crate) fn flow_var(fq: &str) -> String {
    format!("Transmission_Total_{}", fq)
}

pub(crate) fn injection_var(fq: &str) -> String {
    format!("Nodal_Injection_{}", fq)
}

pub(crate) fn risk_var(fq: &str) -> String {
    format!("Reserve_Risk_{}", fq)
}

// === Constraint rows ===

/// Nodal balance; its dual is the local marginal price of energy.
pub(crate) fn energy_price_row(fq_node: &str) -> String {
    format!("{}_Energy_Price", fq_node)
}

pub(crate) fn nodal_transmission_row(fq_node: &str) -> String {
    format!("{}_Nodal_Transmission", fq_node)
}

pub(crate) fn total_energy_row(fq_station: &str) -> String {
    format!("{}_Total_Energy", fq_station)
}

pub(crate) fn total_reserve_row(fq_unit: &str) -> String {
    format!("{}_Total_Reserve", fq_unit)
}

pub(crate) fn pos_flow_row(fq_branch: &str) -> String {
    format!("{}_Pos_flow", fq_branch)
}

pub(crate) fn neg_flow_row(fq_branch: &str) -> String {
    format!("{}_Neg_flow", fq_branch)
}

pub(crate) fn reserve_proportion_row(fq_station: &str) -> String {
    format!("{}_Reserve_Proportion", fq_station)
}

pub(crate) fn total_capacity_row(fq_station: &str) -> String {
    format!("{}_Total_Capacity", fq_station)
}

pub(crate) fn generator_risk_row(fq_zone: &str, fq_station: &str) -> String {
    format!("{}_{}_Generator_Risk", fq_zone, fq_station)
}

pub(crate) fn transmission_risk_row(fq_zone: &str, fq_branch: &str) -> String {
    format!("{}_{}_Transmission_Risk", fq_zone, fq_branch)
}

/// Zonal reserve cover; its dual is the zonal price of reserve.
pub(crate) fn reserve_price_row(fq_zone: &str) -> String {
    format!("{}_Reserve_Price", fq_zone)
}
