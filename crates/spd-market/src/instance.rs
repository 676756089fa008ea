//! Sweep expansion: from a market and a sweep specification to the
//! per-instance parameter tables the formulation consumes.
//!
//! Expansion never mutates the registry. Each instance is a snapshot of
//! every participant's current attributes with the single swept value
//! overridden in place, so two sweeps over the same market cannot tread on
//! each other and the registry stays frozen for the whole run.

use spd_core::{Actor, Attribute, Market};

use crate::error::{DispatchError, DispatchResult};
use crate::sweep::{value_token, Sweep, SweepKind};

/// Snapshot of one station's offer stack. Co-location lives on the node
/// records; zone membership on the zone records.
#[derive(Debug, Clone)]
pub(crate) struct StationRecord {
    pub name: String,
    pub energy_price: f64,
    pub energy_quantity_mw: f64,
    pub reserve: Option<SpinningRecord>,
    /// Nameplate capacity bounding energy + reserve combined.
    pub capacity_mw: f64,
}

/// Spinning-reserve part of a station snapshot.
#[derive(Debug, Clone)]
pub(crate) struct SpinningRecord {
    pub price: f64,
    pub quantity_mw: f64,
    pub proportion: f64,
}

/// Snapshot of one interruptible load's reserve offer.
#[derive(Debug, Clone)]
pub(crate) struct LoadRecord {
    pub name: String,
    pub price: f64,
    pub quantity_mw: f64,
}

/// Snapshot of one node: demand, co-located stations, branch incidence.
#[derive(Debug, Clone)]
pub(crate) struct NodeRecord {
    pub name: String,
    pub demand_mw: f64,
    pub stations: Vec<usize>,
    /// (branch index, direction): +1 at the sending end, -1 at the
    /// receiving end, so that summed signed flows equal the net outflow.
    pub flows: Vec<(usize, f64)>,
}

#[derive(Debug, Clone)]
pub(crate) struct BranchRecord {
    pub name: String,
    pub capacity_mw: f64,
}

/// A unit clearing through the reserve market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReserveUnit {
    Station(usize),
    Load(usize),
}

/// Snapshot of one reserve zone's risk sources and cover providers.
#[derive(Debug, Clone)]
pub(crate) struct ZoneRecord {
    pub name: String,
    /// Stations whose outage the zone must cover: the spinning units.
    pub spinning: Vec<usize>,
    /// Units able to provide cover, spinning stations and ILs alike.
    pub reserve_units: Vec<ReserveUnit>,
    /// (branch index, direction) for inter-zone risk branches: +1 at the
    /// receiving-side zone, -1 at the sending-side zone, so the signed flow
    /// is the import this zone loses if the branch trips.
    pub risk_flows: Vec<(usize, f64)>,
}

/// One scenario of a sweep: a label, the swept value and a full snapshot of
/// the market's parameter tables.
#[derive(Debug, Clone)]
pub struct InstanceData {
    pub label: String,
    /// The swept value this instance realises (0.0 for a single run).
    pub value: f64,
    pub(crate) stations: Vec<StationRecord>,
    pub(crate) loads: Vec<LoadRecord>,
    pub(crate) nodes: Vec<NodeRecord>,
    pub(crate) branches: Vec<BranchRecord>,
    pub(crate) zones: Vec<ZoneRecord>,
}

#[derive(Clone, Copy)]
struct SweepOverride {
    actor: Actor,
    attribute: Attribute,
    value: f64,
}

impl SweepOverride {
    fn applies(&self, actor: Actor, attribute: Attribute) -> Option<f64> {
        (self.actor == actor && self.attribute == attribute).then_some(self.value)
    }
}

/// Expand a sweep against a market into its instances.
pub(crate) fn expand(market: &Market, sweep: &Sweep) -> DispatchResult<Vec<InstanceData>> {
    match &sweep.kind {
        SweepKind::Single => Ok(vec![snapshot(market, "Single".to_string(), 0.0, None)?]),
        SweepKind::Parametric {
            actor,
            attribute,
            values,
        } => {
            if values.is_empty() {
                return Err(DispatchError::Build("sweep has no values".into()));
            }
            let mut instances = Vec::with_capacity(values.len());
            let mut labels = std::collections::HashSet::new();
            for &value in values {
                market.validate_attribute(*actor, *attribute, value)?;
                let label = format!(
                    "{}_{}_{}",
                    market.actor_name(*actor),
                    attribute,
                    value_token(value)
                );
                if !labels.insert(label.clone()) {
                    return Err(DispatchError::Build(format!(
                        "duplicate sweep value {} (instance '{}')",
                        value, label
                    )));
                }
                instances.push(snapshot(
                    market,
                    label,
                    value,
                    Some(SweepOverride {
                        actor: *actor,
                        attribute: *attribute,
                        value,
                    }),
                )?);
            }
            Ok(instances)
        }
    }
}

fn snapshot(
    market: &Market,
    label: String,
    value: f64,
    overlay: Option<SweepOverride>,
) -> DispatchResult<InstanceData> {
    let pick = |actor: Actor, attribute: Attribute, base: f64| -> f64 {
        overlay
            .and_then(|o| o.applies(actor, attribute))
            .unwrap_or(base)
    };

    let mut stations = Vec::with_capacity(market.stations().len());
    for station in market.stations() {
        let actor = Actor::Station(station.id);
        let energy = station.energy.ok_or_else(|| {
            DispatchError::Build(format!(
                "station '{}' is enrolled in the energy market but has no energy offer",
                station.name
            ))
        })?;
        let reserve = station.reserve.map(|offer| SpinningRecord {
            price: pick(actor, Attribute::ReservePrice, offer.price),
            quantity_mw: pick(actor, Attribute::ReserveOffer, offer.quantity_mw),
            proportion: pick(actor, Attribute::ReserveProportion, offer.proportion),
        });
        stations.push(StationRecord {
            name: station.name.clone(),
            energy_price: pick(actor, Attribute::EnergyPrice, energy.price),
            energy_quantity_mw: pick(actor, Attribute::EnergyOffer, energy.quantity_mw),
            reserve,
            capacity_mw: pick(actor, Attribute::Capacity, station.capacity_mw),
        });
    }

    let mut loads = Vec::with_capacity(market.interruptible_loads().len());
    for load in market.interruptible_loads() {
        let actor = Actor::InterruptibleLoad(load.id);
        let offer = load.reserve.ok_or_else(|| {
            DispatchError::Build(format!(
                "interruptible load '{}' is enrolled in the reserve market but has no reserve offer",
                load.name
            ))
        })?;
        loads.push(LoadRecord {
            name: load.name.clone(),
            price: pick(actor, Attribute::ReservePrice, offer.price),
            quantity_mw: pick(actor, Attribute::ReserveOffer, offer.quantity_mw),
        });
    }

    let branches: Vec<BranchRecord> = market
        .branches()
        .iter()
        .map(|branch| BranchRecord {
            name: branch.name.clone(),
            capacity_mw: branch.capacity_mw,
        })
        .collect();

    let mut nodes = Vec::with_capacity(market.nodes().len());
    for node in market.nodes() {
        let mut flows = Vec::with_capacity(node.branches.len());
        for &branch_id in &node.branches {
            let branch = market.branch(branch_id);
            let direction = if branch.sending == node.id { 1.0 } else { -1.0 };
            flows.push((branch_id.value(), direction));
        }
        nodes.push(NodeRecord {
            name: node.name.clone(),
            demand_mw: pick(Actor::Node(node.id), Attribute::Demand, node.demand_mw),
            stations: node.stations.iter().map(|s| s.value()).collect(),
            flows,
        });
    }

    let mut zones = Vec::with_capacity(market.zones().len());
    for zone in market.zones() {
        let spinning: Vec<usize> = zone
            .stations
            .iter()
            .map(|s| s.value())
            .filter(|&s| stations[s].reserve.is_some())
            .collect();
        let mut reserve_units: Vec<ReserveUnit> =
            spinning.iter().map(|&s| ReserveUnit::Station(s)).collect();
        reserve_units.extend(
            zone.interruptible_loads
                .iter()
                .map(|l| ReserveUnit::Load(l.value())),
        );
        zones.push(ZoneRecord {
            name: zone.name.clone(),
            spinning,
            reserve_units,
            risk_flows: Vec::new(),
        });
    }

    // Inter-zone risk branches register with both endpoint zones, signed so
    // that dir * flow is the import the zone loses on contingency.
    for branch in market.branches() {
        if !branch.risk {
            continue;
        }
        let sending_zone = market.node(branch.sending).zone.value();
        let receiving_zone = market.node(branch.receiving).zone.value();
        zones[receiving_zone]
            .risk_flows
            .push((branch.id.value(), 1.0));
        zones[sending_zone]
            .risk_flows
            .push((branch.id.value(), -1.0));
    }

    Ok(InstanceData {
        label,
        value,
        stations,
        loads,
        nodes,
        branches,
        zones,
    })
}
