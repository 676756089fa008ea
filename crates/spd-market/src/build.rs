//! Formulation: from instance tables to one linear program.
//!
//! The program minimises energy plus reserve procurement cost subject to
//! nodal balance, offer caps, transmission limits, spinning-reserve
//! coupling and zonal risk cover. Every symbol is prefixed with its
//! instance label, so instances coexist in one program without sharing
//! variables.

use tracing::debug;

use crate::instance::{InstanceData, ReserveUnit};
use crate::program::{LinearProgram, RowSense};
use crate::symbols;

/// Perturbation added to inequalities whose duals are read back; it breaks
/// degeneracy so binding rows carry clean shadow prices in the optimal
/// basis. Small enough to vanish at every reporting tolerance.
pub(crate) const EPSILON: f64 = 1e-8;

/// Vanishing objective weight on the zonal requirement variables. Where a
/// zone procures no reserve the requirement has no cost pressure of its
/// own; the weight settles it onto the binding contingency instead of an
/// arbitrary point of the optimal face. Sized to stay below reporting
/// tolerances while remaining visible to the solver's termination gap.
pub(crate) const RISK_WEIGHT: f64 = 1e-4;

/// Build the dispatch program spanning all instances.
pub(crate) fn build_program(instances: &[InstanceData]) -> LinearProgram {
    let mut lp = LinearProgram::new();
    for instance in instances {
        add_instance(&mut lp, instance);
    }
    debug!(
        instances = instances.len(),
        vars = lp.num_vars(),
        rows = lp.num_rows(),
        "assembled dispatch program"
    );
    lp
}

fn add_instance(lp: &mut LinearProgram, inst: &InstanceData) {
    let station_fq: Vec<String> = inst
        .stations
        .iter()
        .map(|s| symbols::fq(&inst.label, &s.name))
        .collect();
    let load_fq: Vec<String> = inst
        .loads
        .iter()
        .map(|l| symbols::fq(&inst.label, &l.name))
        .collect();
    let node_fq: Vec<String> = inst
        .nodes
        .iter()
        .map(|n| symbols::fq(&inst.label, &n.name))
        .collect();
    let branch_fq: Vec<String> = inst
        .branches
        .iter()
        .map(|b| symbols::fq(&inst.label, &b.name))
        .collect();
    let zone_fq: Vec<String> = inst
        .zones
        .iter()
        .map(|z| symbols::fq(&inst.label, &z.name))
        .collect();

    // === Decision variables ===

    let energy: Vec<usize> = inst
        .stations
        .iter()
        .enumerate()
        .map(|(i, station)| {
            let var = lp.add_var(symbols::energy_var(&station_fq[i]), true);
            lp.set_cost(var, station.energy_price);
            var
        })
        .collect();

    let station_reserve: Vec<Option<usize>> = inst
        .stations
        .iter()
        .enumerate()
        .map(|(i, station)| {
            station.reserve.as_ref().map(|reserve| {
                let var = lp.add_var(symbols::reserve_var(&station_fq[i]), true);
                lp.set_cost(var, reserve.price);
                var
            })
        })
        .collect();

    let load_reserve: Vec<usize> = inst
        .loads
        .iter()
        .enumerate()
        .map(|(i, load)| {
            let var = lp.add_var(symbols::reserve_var(&load_fq[i]), true);
            lp.set_cost(var, load.price);
            var
        })
        .collect();

    let flow: Vec<usize> = branch_fq
        .iter()
        .map(|fq| lp.add_var(symbols::flow_var(fq), false))
        .collect();

    let injection: Vec<usize> = node_fq
        .iter()
        .map(|fq| lp.add_var(symbols::injection_var(fq), false))
        .collect();

    let risk: Vec<usize> = zone_fq
        .iter()
        .map(|fq| {
            let var = lp.add_var(symbols::risk_var(fq), true);
            lp.set_cost(var, RISK_WEIGHT);
            var
        })
        .collect();

    let reserve_unit_var = |unit: &ReserveUnit| -> usize {
        match unit {
            ReserveUnit::Station(i) => {
                station_reserve[*i].expect("spinning stations always carry a reserve variable")
            }
            ReserveUnit::Load(i) => load_reserve[*i],
        }
    };

    // === Nodal balance ===
    //
    // Two rows per node: injection defined against generation and demand
    // (the price-discovery row), and injection defined against signed
    // branch flows.
    for (n, node) in inst.nodes.iter().enumerate() {
        let mut coeffs = vec![(injection[n], 1.0)];
        coeffs.extend(node.stations.iter().map(|&s| (energy[s], -1.0)));
        lp.add_row(
            symbols::energy_price_row(&node_fq[n]),
            coeffs,
            RowSense::Eq,
            -node.demand_mw - EPSILON,
        );

        let mut coeffs = vec![(injection[n], 1.0)];
        coeffs.extend(node.flows.iter().map(|&(b, dir)| (flow[b], -dir)));
        lp.add_row(
            symbols::nodal_transmission_row(&node_fq[n]),
            coeffs,
            RowSense::Eq,
            0.0,
        );
    }

    // === Offer caps ===
    for (s, station) in inst.stations.iter().enumerate() {
        lp.add_row(
            symbols::total_energy_row(&station_fq[s]),
            vec![(energy[s], 1.0)],
            RowSense::Le,
            station.energy_quantity_mw + EPSILON,
        );
    }
    for (s, station) in inst.stations.iter().enumerate() {
        if let (Some(reserve), Some(var)) = (&station.reserve, station_reserve[s]) {
            lp.add_row(
                symbols::total_reserve_row(&station_fq[s]),
                vec![(var, 1.0)],
                RowSense::Le,
                reserve.quantity_mw + EPSILON,
            );
        }
    }
    for (l, load) in inst.loads.iter().enumerate() {
        lp.add_row(
            symbols::total_reserve_row(&load_fq[l]),
            vec![(load_reserve[l], 1.0)],
            RowSense::Le,
            load.quantity_mw + EPSILON,
        );
    }

    // === Transmission capacity ===
    for (b, branch) in inst.branches.iter().enumerate() {
        lp.add_row(
            symbols::pos_flow_row(&branch_fq[b]),
            vec![(flow[b], 1.0)],
            RowSense::Le,
            branch.capacity_mw,
        );
        lp.add_row(
            symbols::neg_flow_row(&branch_fq[b]),
            vec![(flow[b], 1.0)],
            RowSense::Ge,
            -branch.capacity_mw,
        );
    }

    // === Spinning-reserve coupling and combined capacity ===
    //
    // The proportion row is an exact coupling, not a priced constraint;
    // it carries no perturbation.
    for (s, station) in inst.stations.iter().enumerate() {
        if let (Some(reserve), Some(var)) = (&station.reserve, station_reserve[s]) {
            lp.add_row(
                symbols::reserve_proportion_row(&station_fq[s]),
                vec![(var, 1.0), (energy[s], -reserve.proportion)],
                RowSense::Le,
                0.0,
            );
            lp.add_row(
                symbols::total_capacity_row(&station_fq[s]),
                vec![(var, 1.0), (energy[s], 1.0)],
                RowSense::Le,
                station.capacity_mw + EPSILON,
            );
        }
    }

    // === Zonal risk and reserve cover ===
    for (z, zone) in inst.zones.iter().enumerate() {
        for &s in &zone.spinning {
            lp.add_row(
                symbols::generator_risk_row(&zone_fq[z], &station_fq[s]),
                vec![(risk[z], 1.0), (energy[s], -1.0)],
                RowSense::Ge,
                EPSILON,
            );
        }
        for &(b, dir) in &zone.risk_flows {
            lp.add_row(
                symbols::transmission_risk_row(&zone_fq[z], &branch_fq[b]),
                vec![(risk[z], 1.0), (flow[b], -dir)],
                RowSense::Ge,
                EPSILON,
            );
        }
        if !zone.reserve_units.is_empty() {
            let mut coeffs: Vec<(usize, f64)> = zone
                .reserve_units
                .iter()
                .map(|unit| (reserve_unit_var(unit), 1.0))
                .collect();
            coeffs.push((risk[z], -1.0));
            lp.add_row(
                symbols::reserve_price_row(&zone_fq[z]),
                coeffs,
                RowSense::Ge,
                EPSILON,
            );
        } else if zone.spinning.is_empty() && zone.risk_flows.is_empty() {
            // Degenerate cover: no contingencies and nobody to buy from,
            // so the requirement is identically zero. The perturbation is
            // omitted here; it would flip a trivially satisfied row into
            // an infeasible one.
            lp.add_row(
                symbols::reserve_price_row(&zone_fq[z]),
                vec![(risk[z], -1.0)],
                RowSense::Ge,
                0.0,
            );
        }
        // A zone with contingencies but no reserve providers gets no cover
        // row at all: an empty sum could never exceed a positive
        // requirement. The requirement itself is still formulated and
        // reported.
    }
}
