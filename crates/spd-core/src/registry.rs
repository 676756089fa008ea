//! The market container: indexed entity storage and registration.

use std::collections::HashMap;

use crate::error::{MarketError, MarketResult};
use crate::{
    Actor, Attribute, Branch, BranchId, Company, CompanyId, InterruptibleLoad, LoadId, Node,
    NodeId, Offer, ReserveOffer, ReserveZone, Station, StationId, ZoneId,
};

/// The topology registry: exclusive owner of every market participant.
///
/// Entities are appended to indexed arrays and never removed; IDs are plain
/// positions, so lookups are O(1) and iteration order equals insertion
/// order, which makes everything downstream deterministic.
///
/// Names are unique per category, with one twist: stations and
/// interruptible loads share a single namespace because both clear through
/// the reserve market and therefore share a symbol space in the
/// formulation.
#[derive(Debug, Clone, Default)]
pub struct Market {
    zones: Vec<ReserveZone>,
    nodes: Vec<Node>,
    stations: Vec<Station>,
    interruptible_loads: Vec<InterruptibleLoad>,
    branches: Vec<Branch>,
    companies: Vec<Company>,

    zone_names: HashMap<String, ZoneId>,
    node_names: HashMap<String, NodeId>,
    // Shared between stations and interruptible loads.
    unit_names: HashMap<String, Actor>,
    branch_names: HashMap<String, BranchId>,
    company_names: HashMap<String, CompanyId>,
}

impl Market {
    pub fn new() -> Self {
        Self::default()
    }

    // === Construction ===

    /// Create a reserve zone.
    pub fn add_zone(&mut self, name: impl Into<String>) -> MarketResult<ZoneId> {
        let name = name.into();
        check_name(&name, "zone")?;
        if self.zone_names.contains_key(&name) {
            return Err(MarketError::Topology(format!("duplicate zone '{}'", name)));
        }
        let id = ZoneId::new(self.zones.len());
        self.zones.push(ReserveZone {
            id,
            name: name.clone(),
            nodes: Vec::new(),
            stations: Vec::new(),
            interruptible_loads: Vec::new(),
        });
        self.zone_names.insert(name, id);
        Ok(id)
    }

    /// Create a node inside a zone and register it there.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        zone: ZoneId,
        demand_mw: f64,
    ) -> MarketResult<NodeId> {
        let name = name.into();
        check_name(&name, "node")?;
        if self.node_names.contains_key(&name) {
            return Err(MarketError::Topology(format!("duplicate node '{}'", name)));
        }
        if demand_mw < 0.0 || !demand_mw.is_finite() {
            return Err(MarketError::Attribute(format!(
                "node '{}': demand must be finite and non-negative, got {}",
                name, demand_mw
            )));
        }
        self.zone_checked(zone)?;

        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node {
            id,
            name: name.clone(),
            zone,
            demand_mw,
            stations: Vec::new(),
            interruptible_loads: Vec::new(),
            branches: Vec::new(),
        });
        self.zones[zone.value()].nodes.push(id);
        self.node_names.insert(name, id);
        Ok(id)
    }

    /// Create a company.
    pub fn add_company(&mut self, name: impl Into<String>) -> MarketResult<CompanyId> {
        let name = name.into();
        check_name(&name, "company")?;
        if self.company_names.contains_key(&name) {
            return Err(MarketError::Topology(format!(
                "duplicate company '{}'",
                name
            )));
        }
        let id = CompanyId::new(self.companies.len());
        self.companies.push(Company {
            id,
            name: name.clone(),
            stations: Vec::new(),
            interruptible_loads: Vec::new(),
        });
        self.company_names.insert(name, id);
        Ok(id)
    }

    /// Create a station on a node, owned by a company.
    ///
    /// The station is registered with its node, the node's zone and the
    /// company in this one call; there is no other registration path.
    pub fn add_station(
        &mut self,
        name: impl Into<String>,
        node: NodeId,
        company: CompanyId,
        capacity_mw: f64,
    ) -> MarketResult<StationId> {
        let name = name.into();
        check_name(&name, "station")?;
        if self.unit_names.contains_key(&name) {
            return Err(MarketError::Topology(format!(
                "duplicate unit name '{}' (stations and interruptible loads share a namespace)",
                name
            )));
        }
        if capacity_mw < 0.0 || !capacity_mw.is_finite() {
            return Err(MarketError::Attribute(format!(
                "station '{}': capacity must be finite and non-negative, got {}",
                name, capacity_mw
            )));
        }
        self.node_checked(node)?;
        self.company_checked(company)?;

        let id = StationId::new(self.stations.len());
        let zone = self.nodes[node.value()].zone;
        self.stations.push(Station {
            id,
            name: name.clone(),
            node,
            company,
            capacity_mw,
            energy: None,
            reserve: None,
        });
        self.nodes[node.value()].stations.push(id);
        self.zones[zone.value()].stations.push(id);
        self.companies[company.value()].stations.push(id);
        self.unit_names.insert(name, Actor::Station(id));
        Ok(id)
    }

    /// Create an interruptible load on a node, owned by a company.
    pub fn add_interruptible_load(
        &mut self,
        name: impl Into<String>,
        node: NodeId,
        company: CompanyId,
    ) -> MarketResult<LoadId> {
        let name = name.into();
        check_name(&name, "interruptible load")?;
        if self.unit_names.contains_key(&name) {
            return Err(MarketError::Topology(format!(
                "duplicate unit name '{}' (stations and interruptible loads share a namespace)",
                name
            )));
        }
        self.node_checked(node)?;
        self.company_checked(company)?;

        let id = LoadId::new(self.interruptible_loads.len());
        let zone = self.nodes[node.value()].zone;
        self.interruptible_loads.push(InterruptibleLoad {
            id,
            name: name.clone(),
            node,
            company,
            reserve: None,
        });
        self.nodes[node.value()].interruptible_loads.push(id);
        self.zones[zone.value()].interruptible_loads.push(id);
        self.companies[company.value()].interruptible_loads.push(id);
        self.unit_names.insert(name, Actor::InterruptibleLoad(id));
        Ok(id)
    }

    /// Create a branch between two nodes. The name is always derived as
    /// `{sending}_{receiving}`.
    pub fn add_branch(
        &mut self,
        sending: NodeId,
        receiving: NodeId,
        capacity_mw: f64,
        risk: bool,
    ) -> MarketResult<BranchId> {
        self.node_checked(sending)?;
        self.node_checked(receiving)?;
        if sending == receiving {
            return Err(MarketError::Topology(format!(
                "branch endpoints must differ, got '{}' twice",
                self.nodes[sending.value()].name
            )));
        }
        if capacity_mw < 0.0 || !capacity_mw.is_finite() {
            return Err(MarketError::Attribute(format!(
                "branch capacity must be finite and non-negative, got {}",
                capacity_mw
            )));
        }
        let snd_zone = self.nodes[sending.value()].zone;
        let rcv_zone = self.nodes[receiving.value()].zone;
        if risk && snd_zone == rcv_zone {
            return Err(MarketError::Topology(format!(
                "risk branch '{}_{}' lies inside zone '{}'; a credible line loss must span two zones",
                self.nodes[sending.value()].name,
                self.nodes[receiving.value()].name,
                self.zones[snd_zone.value()].name
            )));
        }

        let name = format!(
            "{}_{}",
            self.nodes[sending.value()].name,
            self.nodes[receiving.value()].name
        );
        if self.branch_names.contains_key(&name) {
            return Err(MarketError::Topology(format!(
                "duplicate branch '{}'",
                name
            )));
        }

        let id = BranchId::new(self.branches.len());
        self.branches.push(Branch {
            id,
            name: name.clone(),
            sending,
            receiving,
            capacity_mw,
            risk,
        });
        self.nodes[sending.value()].branches.push(id);
        self.nodes[receiving.value()].branches.push(id);
        self.branch_names.insert(name, id);
        Ok(id)
    }

    // === Offers ===

    /// Attach or replace a station's energy offer.
    pub fn set_energy_offer(
        &mut self,
        station: StationId,
        price: f64,
        quantity_mw: f64,
    ) -> MarketResult<()> {
        self.station_checked(station)?;
        let capacity = self.stations[station.value()].capacity_mw;
        check_offer_quantity(quantity_mw, capacity, &self.stations[station.value()].name)?;
        check_price(price)?;
        self.stations[station.value()].energy = Some(Offer { price, quantity_mw });
        Ok(())
    }

    /// Attach or replace a station's spinning-reserve offer.
    pub fn set_reserve_offer(
        &mut self,
        station: StationId,
        price: f64,
        quantity_mw: f64,
        proportion: f64,
    ) -> MarketResult<()> {
        self.station_checked(station)?;
        check_price(price)?;
        check_quantity(quantity_mw)?;
        check_proportion(proportion)?;
        self.stations[station.value()].reserve = Some(ReserveOffer {
            price,
            quantity_mw,
            proportion,
        });
        Ok(())
    }

    /// Attach or replace an interruptible load's reserve offer.
    pub fn set_load_reserve_offer(
        &mut self,
        load: LoadId,
        price: f64,
        quantity_mw: f64,
    ) -> MarketResult<()> {
        self.load_checked(load)?;
        check_price(price)?;
        check_quantity(quantity_mw)?;
        self.interruptible_loads[load.value()].reserve = Some(Offer { price, quantity_mw });
        Ok(())
    }

    // === Attribute mutation ===

    /// Check that `value` is acceptable for `attribute` on `actor` without
    /// applying it. Shared by [`set_attribute`](Self::set_attribute) and by
    /// sweep expansion, which overrides values per instance instead of
    /// mutating the registry.
    pub fn validate_attribute(
        &self,
        actor: Actor,
        attribute: Attribute,
        value: f64,
    ) -> MarketResult<()> {
        if !value.is_finite() {
            return Err(MarketError::Attribute(format!(
                "{} must be finite, got {}",
                attribute, value
            )));
        }
        match actor {
            Actor::Station(id) => {
                self.station_checked(id)?;
                let station = &self.stations[id.value()];
                match attribute {
                    Attribute::Capacity => check_quantity(value),
                    Attribute::EnergyPrice | Attribute::EnergyOffer => {
                        if station.energy.is_none() {
                            return Err(MarketError::Attribute(format!(
                                "station '{}' has no energy offer to mutate",
                                station.name
                            )));
                        }
                        if attribute == Attribute::EnergyOffer {
                            check_offer_quantity(value, station.capacity_mw, &station.name)
                        } else {
                            Ok(())
                        }
                    }
                    Attribute::ReservePrice
                    | Attribute::ReserveOffer
                    | Attribute::ReserveProportion => {
                        if station.reserve.is_none() {
                            return Err(MarketError::Attribute(format!(
                                "station '{}' has no reserve offer to mutate",
                                station.name
                            )));
                        }
                        match attribute {
                            Attribute::ReserveOffer => check_quantity(value),
                            Attribute::ReserveProportion => check_proportion(value),
                            _ => Ok(()),
                        }
                    }
                    Attribute::Demand => Err(MarketError::Attribute(format!(
                        "attribute '{}' does not apply to station '{}'",
                        attribute, station.name
                    ))),
                }
            }
            Actor::InterruptibleLoad(id) => {
                self.load_checked(id)?;
                let load = &self.interruptible_loads[id.value()];
                match attribute {
                    Attribute::ReservePrice | Attribute::ReserveOffer => {
                        if load.reserve.is_none() {
                            return Err(MarketError::Attribute(format!(
                                "interruptible load '{}' has no reserve offer to mutate",
                                load.name
                            )));
                        }
                        if attribute == Attribute::ReserveOffer {
                            check_quantity(value)
                        } else {
                            Ok(())
                        }
                    }
                    _ => Err(MarketError::Attribute(format!(
                        "attribute '{}' does not apply to interruptible load '{}'",
                        attribute, load.name
                    ))),
                }
            }
            Actor::Node(id) => {
                self.node_checked(id)?;
                match attribute {
                    Attribute::Demand => check_quantity(value),
                    _ => Err(MarketError::Attribute(format!(
                        "attribute '{}' does not apply to node '{}'",
                        attribute,
                        self.nodes[id.value()].name
                    ))),
                }
            }
        }
    }

    /// Mutate one attribute of one actor, validating the domain first.
    pub fn set_attribute(
        &mut self,
        actor: Actor,
        attribute: Attribute,
        value: f64,
    ) -> MarketResult<()> {
        self.validate_attribute(actor, attribute, value)?;
        match actor {
            Actor::Station(id) => {
                let station = &mut self.stations[id.value()];
                match attribute {
                    Attribute::Capacity => station.capacity_mw = value,
                    Attribute::EnergyPrice => {
                        station.energy.as_mut().expect("validated").price = value
                    }
                    Attribute::EnergyOffer => {
                        station.energy.as_mut().expect("validated").quantity_mw = value
                    }
                    Attribute::ReservePrice => {
                        station.reserve.as_mut().expect("validated").price = value
                    }
                    Attribute::ReserveOffer => {
                        station.reserve.as_mut().expect("validated").quantity_mw = value
                    }
                    Attribute::ReserveProportion => {
                        station.reserve.as_mut().expect("validated").proportion = value
                    }
                    Attribute::Demand => unreachable!("rejected by validate_attribute"),
                }
            }
            Actor::InterruptibleLoad(id) => {
                let load = &mut self.interruptible_loads[id.value()];
                match attribute {
                    Attribute::ReservePrice => {
                        load.reserve.as_mut().expect("validated").price = value
                    }
                    Attribute::ReserveOffer => {
                        load.reserve.as_mut().expect("validated").quantity_mw = value
                    }
                    _ => unreachable!("rejected by validate_attribute"),
                }
            }
            Actor::Node(id) => {
                self.nodes[id.value()].demand_mw = value;
            }
        }
        Ok(())
    }

    // === Access ===

    pub fn zones(&self) -> &[ReserveZone] {
        &self.zones
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn interruptible_loads(&self) -> &[InterruptibleLoad] {
        &self.interruptible_loads
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn zone(&self, id: ZoneId) -> &ReserveZone {
        &self.zones[id.value()]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.value()]
    }

    pub fn station(&self, id: StationId) -> &Station {
        &self.stations[id.value()]
    }

    pub fn interruptible_load(&self, id: LoadId) -> &InterruptibleLoad {
        &self.interruptible_loads[id.value()]
    }

    pub fn branch(&self, id: BranchId) -> &Branch {
        &self.branches[id.value()]
    }

    pub fn company(&self, id: CompanyId) -> &Company {
        &self.companies[id.value()]
    }

    /// The display name of a mutable actor.
    pub fn actor_name(&self, actor: Actor) -> &str {
        match actor {
            Actor::Station(id) => &self.stations[id.value()].name,
            Actor::InterruptibleLoad(id) => &self.interruptible_loads[id.value()].name,
            Actor::Node(id) => &self.nodes[id.value()].name,
        }
    }

    // === Internal ID validation ===

    fn zone_checked(&self, id: ZoneId) -> MarketResult<()> {
        if id.value() >= self.zones.len() {
            return Err(MarketError::Topology(format!(
                "unknown zone id {}",
                id.value()
            )));
        }
        Ok(())
    }

    fn node_checked(&self, id: NodeId) -> MarketResult<()> {
        if id.value() >= self.nodes.len() {
            return Err(MarketError::Topology(format!(
                "unknown node id {}",
                id.value()
            )));
        }
        Ok(())
    }

    fn station_checked(&self, id: StationId) -> MarketResult<()> {
        if id.value() >= self.stations.len() {
            return Err(MarketError::Topology(format!(
                "unknown station id {}",
                id.value()
            )));
        }
        Ok(())
    }

    fn load_checked(&self, id: LoadId) -> MarketResult<()> {
        if id.value() >= self.interruptible_loads.len() {
            return Err(MarketError::Topology(format!(
                "unknown interruptible load id {}",
                id.value()
            )));
        }
        Ok(())
    }

    fn company_checked(&self, id: CompanyId) -> MarketResult<()> {
        if id.value() >= self.companies.len() {
            return Err(MarketError::Topology(format!(
                "unknown company id {}",
                id.value()
            )));
        }
        Ok(())
    }
}

fn check_name(name: &str, kind: &str) -> MarketResult<()> {
    if name.is_empty() {
        return Err(MarketError::Topology(format!("{} with empty name", kind)));
    }
    // Names become `_`-joined LP symbols; an embedded underscore would make
    // branch names and constraint names ambiguous to a human reader, but
    // only whitespace actually breaks the LP text format.
    if name.contains(char::is_whitespace) {
        return Err(MarketError::Topology(format!(
            "{} name '{}' contains whitespace",
            kind, name
        )));
    }
    Ok(())
}

fn check_price(price: f64) -> MarketResult<()> {
    if !price.is_finite() {
        return Err(MarketError::Attribute(format!(
            "offer price must be finite, got {}",
            price
        )));
    }
    Ok(())
}

fn check_quantity(quantity_mw: f64) -> MarketResult<()> {
    if quantity_mw < 0.0 || !quantity_mw.is_finite() {
        return Err(MarketError::Attribute(format!(
            "quantity must be finite and non-negative, got {}",
            quantity_mw
        )));
    }
    Ok(())
}

fn check_offer_quantity(quantity_mw: f64, capacity_mw: f64, station: &str) -> MarketResult<()> {
    check_quantity(quantity_mw)?;
    if quantity_mw > capacity_mw {
        return Err(MarketError::Attribute(format!(
            "station '{}': offered quantity {} MW exceeds capacity {} MW",
            station, quantity_mw, capacity_mw
        )));
    }
    Ok(())
}

fn check_proportion(proportion: f64) -> MarketResult<()> {
    if !(0.0..=1.0).contains(&proportion) || !proportion.is_finite() {
        return Err(MarketError::Attribute(format!(
            "reserve proportion must lie in [0, 1], got {}",
            proportion
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> (Market, ZoneId, NodeId, CompanyId) {
        let mut market = Market::new();
        let zone = market.add_zone("RZ").unwrap();
        let node = market.add_node("node", zone, 154.0).unwrap();
        let company = market.add_company("company").unwrap();
        (market, zone, node, company)
    }

    #[test]
    fn test_zone_creation() {
        let mut market = Market::new();
        let zone = market.add_zone("RZ").unwrap();

        let rz = market.zone(zone);
        assert_eq!(rz.name, "RZ");
        assert!(rz.nodes.is_empty());
        assert!(rz.stations.is_empty());
        assert!(rz.interruptible_loads.is_empty());
    }

    #[test]
    fn test_node_creation_registers_with_zone() {
        let (market, zone, node, _) = base();

        let n = market.node(node);
        assert_eq!(n.name, "node");
        assert_eq!(n.zone, zone);
        assert_eq!(n.demand_mw, 154.0);
        assert_eq!(market.zone(zone).nodes, vec![node]);
    }

    #[test]
    fn test_station_creation_registers_everywhere() {
        let (mut market, zone, node, company) = base();
        let station = market.add_station("station", node, company, 500.0).unwrap();

        assert_eq!(market.station(station).name, "station");
        assert_eq!(market.station(station).capacity_mw, 500.0);
        assert_eq!(market.node(node).stations, vec![station]);
        assert_eq!(market.zone(zone).stations, vec![station]);
        assert_eq!(market.company(company).stations, vec![station]);
    }

    #[test]
    fn test_il_creation_registers_everywhere() {
        let (mut market, zone, node, company) = base();
        let il = market.add_interruptible_load("IL", node, company).unwrap();

        assert_eq!(market.interruptible_load(il).name, "IL");
        assert_eq!(market.node(node).interruptible_loads, vec![il]);
        assert_eq!(market.zone(zone).interruptible_loads, vec![il]);
        assert_eq!(market.company(company).interruptible_loads, vec![il]);
    }

    #[test]
    fn test_branch_name_is_derived() {
        let (mut market, zone, node1, _) = base();
        let node2 = market.add_node("node2", zone, 154.0).unwrap();

        let branch = market.add_branch(node1, node2, 500.0, false).unwrap();
        let b = market.branch(branch);
        assert_eq!(b.name, "node_node2");
        assert_eq!(b.sending, node1);
        assert_eq!(b.receiving, node2);
        assert_eq!(b.capacity_mw, 500.0);
        assert!(!b.risk);
        assert_eq!(market.node(node1).branches, vec![branch]);
        assert_eq!(market.node(node2).branches, vec![branch]);
    }

    #[test]
    fn test_station_offers() {
        let (mut market, _, node, company) = base();
        let station = market.add_station("station", node, company, 300.0).unwrap();

        market.set_energy_offer(station, 50.0, 100.0).unwrap();
        market.set_reserve_offer(station, 25.0, 300.0, 0.3).unwrap();

        let s = market.station(station);
        let energy = s.energy.unwrap();
        let reserve = s.reserve.unwrap();
        assert_eq!(energy.price, 50.0);
        assert_eq!(energy.quantity_mw, 100.0);
        assert_eq!(reserve.price, 25.0);
        assert_eq!(reserve.quantity_mw, 300.0);
        assert_eq!(reserve.proportion, 0.3);
    }

    #[test]
    fn test_il_offer() {
        let (mut market, _, node, company) = base();
        let il = market.add_interruptible_load("il", node, company).unwrap();

        market.set_load_reserve_offer(il, 100.0, 200.0).unwrap();

        let offer = market.interruptible_load(il).reserve.unwrap();
        assert_eq!(offer.price, 100.0);
        assert_eq!(offer.quantity_mw, 200.0);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let (mut market, zone, node, company) = base();
        assert!(market.add_zone("RZ").is_err());
        assert!(market.add_node("node", zone, 0.0).is_err());
        assert!(market.add_company("company").is_err());

        market.add_station("unit", node, company, 100.0).unwrap();
        // Stations and ILs share the reserve symbol namespace.
        assert!(market.add_interruptible_load("unit", node, company).is_err());
    }

    #[test]
    fn test_branch_identical_endpoints_rejected() {
        let (mut market, _, node, _) = base();
        let err = market.add_branch(node, node, 100.0, false).unwrap_err();
        assert!(matches!(err, MarketError::Topology(_)));
    }

    #[test]
    fn test_risk_branch_must_span_zones() {
        let (mut market, zone, node1, _) = base();
        let node2 = market.add_node("node2", zone, 0.0).unwrap();
        assert!(market.add_branch(node1, node2, 100.0, true).is_err());

        let zone2 = market.add_zone("RZ2").unwrap();
        let node3 = market.add_node("node3", zone2, 0.0).unwrap();
        assert!(market.add_branch(node1, node3, 100.0, true).is_ok());
    }

    #[test]
    fn test_offer_exceeding_capacity_rejected() {
        let (mut market, _, node, company) = base();
        let station = market.add_station("station", node, company, 100.0).unwrap();
        let err = market.set_energy_offer(station, 50.0, 150.0).unwrap_err();
        assert!(matches!(err, MarketError::Attribute(_)));
    }

    #[test]
    fn test_set_attribute_demand() {
        let (mut market, _, node, _) = base();
        market
            .set_attribute(Actor::Node(node), Attribute::Demand, 200.0)
            .unwrap();
        assert_eq!(market.node(node).demand_mw, 200.0);

        assert!(market
            .set_attribute(Actor::Node(node), Attribute::Demand, -1.0)
            .is_err());
        assert!(market
            .set_attribute(Actor::Node(node), Attribute::EnergyPrice, 10.0)
            .is_err());
    }

    #[test]
    fn test_set_attribute_station_offers() {
        let (mut market, _, node, company) = base();
        let station = market.add_station("station", node, company, 300.0).unwrap();
        let actor = Actor::Station(station);

        // No offer yet: price mutation is an error rather than a silent default.
        assert!(market
            .set_attribute(actor, Attribute::ReservePrice, 30.0)
            .is_err());

        market.set_energy_offer(station, 50.0, 100.0).unwrap();
        market.set_reserve_offer(station, 25.0, 300.0, 0.3).unwrap();

        market
            .set_attribute(actor, Attribute::ReservePrice, 30.0)
            .unwrap();
        market
            .set_attribute(actor, Attribute::ReserveProportion, 0.6)
            .unwrap();
        let reserve = market.station(station).reserve.unwrap();
        assert_eq!(reserve.price, 30.0);
        assert_eq!(reserve.proportion, 0.6);

        assert!(market
            .set_attribute(actor, Attribute::ReserveProportion, 1.5)
            .is_err());
        assert!(market
            .set_attribute(actor, Attribute::EnergyOffer, 400.0)
            .is_err());
    }

    #[test]
    fn test_set_attribute_il() {
        let (mut market, _, node, company) = base();
        let il = market.add_interruptible_load("il", node, company).unwrap();
        let actor = Actor::InterruptibleLoad(il);

        assert!(market
            .set_attribute(actor, Attribute::ReservePrice, 10.0)
            .is_err());

        market.set_load_reserve_offer(il, 100.0, 200.0).unwrap();
        market
            .set_attribute(actor, Attribute::ReserveOffer, 250.0)
            .unwrap();
        assert_eq!(
            market.interruptible_load(il).reserve.unwrap().quantity_mw,
            250.0
        );

        assert!(market
            .set_attribute(actor, Attribute::Demand, 10.0)
            .is_err());
    }
}
