//! # spd-core: Market Topology Registry
//!
//! Data structures for an energy-and-reserve market: the participants
//! (stations, interruptible loads, companies), the grid they sit on
//! (nodes, reserve zones, branches) and their price/quantity offers.
//!
//! ## Design
//!
//! All entities live in indexed arrays inside a [`Market`]; relationships
//! are held as typed integer indices rather than back-pointers, which keeps
//! the zone ↔ node ↔ station ↔ company cycle trivially ownable. Creating a
//! participant registers it with every related entity in one place: a
//! station is linked into its node, its node's zone and its company at
//! `add_station` time.
//!
//! ## Quick Start
//!
//! ```rust
//! use spd_core::Market;
//!
//! let mut market = Market::new();
//!
//! let zone = market.add_zone("NI").unwrap();
//! let node = market.add_node("HAY", zone, 100.0).unwrap();
//! let company = market.add_company("GenCo").unwrap();
//!
//! let station = market.add_station("HAY_GEN", node, company, 200.0).unwrap();
//! market.set_energy_offer(station, 50.0, 200.0).unwrap();
//! market.set_reserve_offer(station, 25.0, 300.0, 0.3).unwrap();
//! ```
//!
//! ## ID System
//!
//! Every entity has a typed ID (newtype wrapper around `usize`):
//! [`ZoneId`], [`NodeId`], [`StationId`], [`LoadId`], [`BranchId`],
//! [`CompanyId`]. The wrappers prevent a node index from being used where a
//! station index is expected, and double as stable join keys for the solve
//! pipeline.
//!
//! ## Attribute mutation
//!
//! Parameter studies mutate one attribute of one actor at a time.
//! [`Market::set_attribute`] exposes the closed set of mutable attributes
//! ([`Attribute`]) and validates the value domain; anything outside the set
//! is rejected rather than silently absorbed.

use serde::{Deserialize, Serialize};

pub mod error;
mod registry;

pub use error::{MarketError, MarketResult};
pub use registry::Market;

// Newtype wrappers for IDs for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(usize);

macro_rules! impl_id {
    ($($name:ident),*) => {
        $(
            impl $name {
                #[inline]
                pub fn new(value: usize) -> Self {
                    $name(value)
                }

                #[inline]
                pub fn value(&self) -> usize {
                    self.0
                }
            }
        )*
    };
}

impl_id!(ZoneId, NodeId, StationId, LoadId, BranchId, CompanyId);

/// A price/quantity band: an amount of energy or reserve offered at a price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Offer price ($/MWh)
    pub price: f64,
    /// Offered quantity (MW)
    pub quantity_mw: f64,
}

/// A spinning-reserve offer from a generator.
///
/// Unlike an interruptible load, a generator can only sustain reserve in
/// proportion to its synchronised energy output; `proportion` is that
/// coupling coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReserveOffer {
    /// Offer price ($/MWh)
    pub price: f64,
    /// Offered quantity (MW)
    pub quantity_mw: f64,
    /// Fraction of energy dispatch sustainable as reserve, in [0, 1]
    pub proportion: f64,
}

/// An island within which reserve cover must be procured locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveZone {
    pub id: ZoneId,
    pub name: String,
    pub nodes: Vec<NodeId>,
    pub stations: Vec<StationId>,
    pub interruptible_loads: Vec<LoadId>,
}

/// An electrical bus with demand and co-located units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub zone: ZoneId,
    /// Firm demand at this node (MW)
    pub demand_mw: f64,
    pub stations: Vec<StationId>,
    pub interruptible_loads: Vec<LoadId>,
    pub branches: Vec<BranchId>,
}

/// A generating station with optional energy and reserve offers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub node: NodeId,
    pub company: CompanyId,
    /// Nameplate capacity (MW); bounds energy + reserve combined
    pub capacity_mw: f64,
    pub energy: Option<Offer>,
    pub reserve: Option<ReserveOffer>,
}

/// A consumer whose load can be shed on command, offering reserve without
/// generating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterruptibleLoad {
    pub id: LoadId,
    pub name: String,
    pub node: NodeId,
    pub company: CompanyId,
    pub reserve: Option<Offer>,
}

/// A transmission branch between two nodes.
///
/// Branch names are derived, not chosen: `{sending}_{receiving}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    pub sending: NodeId,
    pub receiving: NodeId,
    /// Thermal limit on |flow| (MW)
    pub capacity_mw: f64,
    /// Whether losing this branch is a credible contingency. Risk branches
    /// must span two reserve zones.
    pub risk: bool,
}

/// A market participant owning stations and interruptible loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub stations: Vec<StationId>,
    pub interruptible_loads: Vec<LoadId>,
}

/// A participant whose attribute can be mutated, as the target of
/// [`Market::set_attribute`] or of a parameter sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    Station(StationId),
    InterruptibleLoad(LoadId),
    Node(NodeId),
}

/// The closed set of mutable attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    EnergyPrice,
    EnergyOffer,
    ReservePrice,
    ReserveOffer,
    ReserveProportion,
    Demand,
    Capacity,
}

impl Attribute {
    /// The snake_case name used in sweep specifications and symbol names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::EnergyPrice => "energy_price",
            Attribute::EnergyOffer => "energy_offer",
            Attribute::ReservePrice => "reserve_price",
            Attribute::ReserveOffer => "reserve_offer",
            Attribute::ReserveProportion => "reserve_proportion",
            Attribute::Demand => "demand",
            Attribute::Capacity => "capacity",
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Attribute {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "energy_price" => Ok(Attribute::EnergyPrice),
            "energy_offer" => Ok(Attribute::EnergyOffer),
            "reserve_price" => Ok(Attribute::ReservePrice),
            "reserve_offer" => Ok(Attribute::ReserveOffer),
            "reserve_proportion" => Ok(Attribute::ReserveProportion),
            "demand" => Ok(Attribute::Demand),
            "capacity" => Ok(Attribute::Capacity),
            _ => Err(MarketError::Attribute(format!(
                "unrecognised attribute '{}'",
                s
            ))),
        }
    }
}
