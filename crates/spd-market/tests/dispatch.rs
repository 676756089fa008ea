//! End-to-end dispatch tests over small reference markets.

use spd_core::{Actor, Attribute, Market};
use spd_market::{DispatchError, DispatchSolver, SolveStatus, Sweep};

/// Single node, one station, no reserve.
/// Node N1: demand 100 MW; station S1: capacity 200, energy offer $50/200 MW.
fn single_node_market() -> Market {
    let mut market = Market::new();
    let zone = market.add_zone("RZ").unwrap();
    let node = market.add_node("N1", zone, 100.0).unwrap();
    let company = market.add_company("Co").unwrap();
    let station = market.add_station("S1", node, company, 200.0).unwrap();
    market.set_energy_offer(station, 50.0, 200.0).unwrap();
    market
}

/// Single-node market plus a station reserve offer ($25/300 MW, k=0.3),
/// making the station its zone's risk setter.
fn coupled_reserve_market() -> Market {
    let mut market = single_node_market();
    let station = market.stations()[0].id;
    market.set_reserve_offer(station, 25.0, 300.0, 0.3).unwrap();
    market
}

/// Coupled market plus an interruptible load able to cover the generator
/// risk ($75/500 MW).
fn il_covered_market() -> Market {
    let mut market = coupled_reserve_market();
    let node = market.nodes()[0].id;
    let company = market.companies()[0].id;
    let il = market.add_interruptible_load("IL1", node, company).unwrap();
    market.set_load_reserve_offer(il, 75.0, 500.0).unwrap();
    market
}

/// Two zones joined by a risk branch N1 -> N2.
/// S1 at N1: $10/300 MW; S2 at N2: $20/300 MW; demand 200 MW at N2.
fn two_zone_market(branch_capacity: f64) -> Market {
    let mut market = Market::new();
    let z1 = market.add_zone("Z1").unwrap();
    let z2 = market.add_zone("Z2").unwrap();
    let n1 = market.add_node("N1", z1, 0.0).unwrap();
    let n2 = market.add_node("N2", z2, 200.0).unwrap();
    let company = market.add_company("Co").unwrap();
    let s1 = market.add_station("S1", n1, company, 300.0).unwrap();
    market.set_energy_offer(s1, 10.0, 300.0).unwrap();
    let s2 = market.add_station("S2", n2, company, 300.0).unwrap();
    market.set_energy_offer(s2, 20.0, 300.0).unwrap();
    market.add_branch(n1, n2, branch_capacity, true).unwrap();
    market
}

#[test]
fn test_single_node_dispatch_and_price() {
    let market = single_node_market();
    let solution = DispatchSolver::new()
        .solve(&market, &Sweep::single())
        .expect("single-node dispatch should solve");

    assert_eq!(solution.status, SolveStatus::Optimal);
    let outcome = &solution.outcomes[0];

    let dispatch = outcome.energy_dispatch["S1"];
    assert!(
        (dispatch - 100.0).abs() < 1e-3,
        "S1 should clear the full 100 MW demand, got {}",
        dispatch
    );

    let price = outcome.energy_price["N1"];
    assert!(
        (price - 50.0).abs() < 1e-2,
        "N1 price should be the marginal offer $50, got {}",
        price
    );

    let reserve_price = outcome.reserve_price["RZ"];
    assert!(
        reserve_price.abs() < 1e-3,
        "no reserve market, price should be 0, got {}",
        reserve_price
    );
    let risk = outcome.reserve_risk["RZ"];
    assert!(
        risk.abs() < 1e-3,
        "an energy-only station carries no zone risk, got {}",
        risk
    );

    assert!(
        (solution.objective - 5000.0).abs() < 0.1,
        "objective should be 100 MW x $50, got {}",
        solution.objective
    );
    assert!(solution.solution_time_sec >= 0.0);
}

#[test]
fn test_self_risk_coupling_is_infeasible() {
    // The station's own reserve is capped at k * dispatch = 30 MW, which
    // cannot cover its own 100 MW outage risk.
    let market = coupled_reserve_market();
    let err = DispatchSolver::new()
        .solve(&market, &Sweep::single())
        .unwrap_err();
    assert!(
        matches!(err, DispatchError::Infeasible(_)),
        "expected infeasibility, got {:?}",
        err
    );
}

#[test]
fn test_il_covers_generator_risk() {
    let market = il_covered_market();
    let solution = DispatchSolver::new()
        .solve(&market, &Sweep::single())
        .expect("IL cover should make the market feasible");
    let outcome = &solution.outcomes[0];

    let risk = outcome.reserve_risk["RZ"];
    assert!(
        (risk - 100.0).abs() < 1e-2,
        "zone risk should equal the station's dispatch, got {}",
        risk
    );

    let station_reserve = outcome.reserve_dispatch["S1"];
    let il_reserve = outcome.reserve_dispatch["IL1"];
    assert!(
        (station_reserve - 30.0).abs() < 1e-2,
        "station reserve should sit at its proportion cap, got {}",
        station_reserve
    );
    assert!(
        (il_reserve - 70.0).abs() < 1e-2,
        "IL should supply the remainder, got {}",
        il_reserve
    );
    assert!(
        (station_reserve + il_reserve - risk).abs() < 1e-2,
        "cover should meet the requirement exactly"
    );

    let reserve_price = outcome.reserve_price["RZ"];
    assert!(
        (reserve_price - 75.0).abs() < 0.1,
        "marginal reserve comes from the IL at $75, got {}",
        reserve_price
    );

    // An extra MW of demand costs $50 energy plus a rebalanced MW of
    // cover: 0.3 at $25 through the proportion cap, 0.7 at $75.
    let price = outcome.energy_price["N1"];
    assert!(
        (price - 110.0).abs() < 0.1,
        "energy price should carry the reserve coupling, got {}",
        price
    );
}

#[test]
fn test_two_zone_risk_branch() {
    let market = two_zone_market(500.0);
    let solution = DispatchSolver::new()
        .solve(&market, &Sweep::single())
        .expect("two-zone market should solve");
    let outcome = &solution.outcomes[0];

    let flow = outcome.branch_flow["N1_N2"];
    assert!(
        (flow - 200.0).abs() < 1e-2,
        "cheap energy should flow N1 -> N2, got {}",
        flow
    );

    // The branch is slack, so the cheap station is marginal at both ends.
    let p1 = outcome.energy_price["N1"];
    let p2 = outcome.energy_price["N2"];
    assert!((p1 - 10.0).abs() < 1e-2, "N1 price should be 10, got {}", p1);
    assert!((p2 - 10.0).abs() < 1e-2, "N2 price should be 10, got {}", p2);

    // The importing zone carries the branch-loss risk.
    let risk_importing = outcome.reserve_risk["Z2"];
    let risk_exporting = outcome.reserve_risk["Z1"];
    assert!(
        risk_importing >= flow - 1e-2,
        "Z2 must be covered against losing its {} MW import, got {}",
        flow,
        risk_importing
    );
    assert!(
        (risk_importing - 200.0).abs() < 0.5,
        "Z2 requirement should settle on the import, got {}",
        risk_importing
    );
    assert!(
        risk_exporting.abs() < 0.5,
        "the exporting zone carries no risk, got {}",
        risk_exporting
    );
}

#[test]
fn test_transmission_cap_binds() {
    let market = two_zone_market(100.0);
    let solution = DispatchSolver::new()
        .solve(&market, &Sweep::single())
        .expect("capped two-zone market should solve");
    let outcome = &solution.outcomes[0];

    let flow = outcome.branch_flow["N1_N2"];
    assert!(
        (flow - 100.0).abs() < 1e-2,
        "flow should bind at the 100 MW cap, got {}",
        flow
    );
    assert!(flow.abs() <= 100.0 + 1e-4, "flow must respect the cap");

    let local = outcome.energy_dispatch["S2"];
    assert!(
        (local - 100.0).abs() < 1e-2,
        "the remaining 100 MW should come from the local station, got {}",
        local
    );

    let p1 = outcome.energy_price["N1"];
    let p2 = outcome.energy_price["N2"];
    assert!((p1 - 10.0).abs() < 1e-2, "N1 price should stay 10, got {}", p1);
    assert!(
        (p2 - 20.0).abs() < 1e-2,
        "congestion should lift N2 to the local offer, got {}",
        p2
    );
}

#[test]
fn test_reserve_price_sweep() {
    let market = il_covered_market();
    let il = Actor::InterruptibleLoad(market.interruptible_loads()[0].id);
    let values: Vec<f64> = (1..=10).map(|k| (k * 10) as f64).collect();
    let sweep = Sweep::over(il, Attribute::ReservePrice, values.clone());

    let solution = DispatchSolver::new()
        .solve(&market, &sweep)
        .expect("sweep should solve");

    let master = &solution.master;
    assert_eq!(master.num_rows(), 10);
    assert_eq!(master.index, values);
    assert_eq!(master.index_label, "IL1 Reserve Price");

    let il_reserve = master.column("IL1 Reserve Total").unwrap();
    let station_reserve = master.column("S1 Reserve Total").unwrap();

    for pair in il_reserve.windows(2) {
        assert!(
            pair[1] <= pair[0] + 1e-3,
            "IL clearance must not increase with its price: {:?}",
            il_reserve
        );
    }
    for pair in station_reserve.windows(2) {
        assert!(
            pair[0] <= pair[1] + 1e-3,
            "station clearance must not decrease: {:?}",
            station_reserve
        );
    }

    // Below the station's $25 the IL takes the whole requirement; above it
    // the station runs to its 30 MW coupling cap.
    assert!((il_reserve[0] - 100.0).abs() < 1e-2);
    assert!(station_reserve[0].abs() < 1e-2);
    assert!((il_reserve[9] - 70.0).abs() < 1e-2);
    assert!((station_reserve[9] - 30.0).abs() < 1e-2);

    // Every cell corresponds to a participant present in every instance.
    for row in &master.values {
        for cell in row {
            assert!(cell.is_finite(), "master table must not contain NaNs");
        }
    }
}

#[test]
fn test_sweep_objective_decomposes_per_instance() {
    let market = il_covered_market();
    let il = Actor::InterruptibleLoad(market.interruptible_loads()[0].id);
    let values = vec![10.0, 50.0, 90.0];

    let swept = DispatchSolver::new()
        .solve(&market, &Sweep::over(il, Attribute::ReservePrice, values.clone()))
        .expect("sweep should solve");

    let mut isolated_total = 0.0;
    for &value in &values {
        let mut copy = market.clone();
        copy.set_attribute(il, Attribute::ReservePrice, value).unwrap();
        let single = DispatchSolver::new()
            .solve(&copy, &Sweep::single())
            .expect("isolated instance should solve");
        isolated_total += single.objective;
    }

    assert!(
        (swept.objective - isolated_total).abs() < 1e-2,
        "instances are uncoupled, so optima must add: {} vs {}",
        swept.objective,
        isolated_total
    );
}

#[test]
fn test_energy_prices_are_nonnegative() {
    for market in [
        single_node_market(),
        il_covered_market(),
        two_zone_market(500.0),
        two_zone_market(100.0),
    ] {
        let solution = DispatchSolver::new()
            .solve(&market, &Sweep::single())
            .unwrap();
        for (node, price) in &solution.outcomes[0].energy_price {
            assert!(
                *price >= -1e-6,
                "positive-priced offers cannot produce a negative price at {}: {}",
                node,
                price
            );
        }
    }
}

#[test]
fn test_reserve_price_bounded_by_cleared_offers() {
    let market = il_covered_market();
    let solution = DispatchSolver::new()
        .solve(&market, &Sweep::single())
        .unwrap();
    let outcome = &solution.outcomes[0];

    let most_expensive_cleared = outcome
        .reserve_dispatch
        .iter()
        .filter(|(_, &mw)| mw > 1e-3)
        .map(|(unit, _)| match unit.as_str() {
            "S1" => 25.0,
            "IL1" => 75.0,
            other => panic!("unexpected unit {}", other),
        })
        .fold(0.0_f64, f64::max);
    assert!(
        outcome.reserve_price["RZ"] <= most_expensive_cleared + 1e-3,
        "reserve price {} exceeds the most expensive cleared offer {}",
        outcome.reserve_price["RZ"],
        most_expensive_cleared
    );
}

#[test]
fn test_risk_dominates_generator_dispatch() {
    let market = il_covered_market();
    let solution = DispatchSolver::new()
        .solve(&market, &Sweep::single())
        .unwrap();
    let outcome = &solution.outcomes[0];
    assert!(
        outcome.reserve_risk["RZ"] >= outcome.energy_dispatch["S1"] - 1e-3,
        "zone requirement must cover its largest generator"
    );
}

#[test]
fn test_single_run_master_shape() {
    let market = single_node_market();
    let solution = DispatchSolver::new()
        .solve(&market, &Sweep::single())
        .unwrap();

    let master = &solution.master;
    assert_eq!(master.num_rows(), 1);
    assert_eq!(master.index_label, "Run");
    assert!((master.value(0, "N1 Energy Price").unwrap() - 50.0).abs() < 1e-2);
    assert!((master.value(0, "S1 Energy Total").unwrap() - 100.0).abs() < 1e-3);
}

#[test]
fn test_write_lp_round_trip() -> anyhow::Result<()> {
    let market = il_covered_market();
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("dispatch.lp");

    DispatchSolver::new().write_lp(&market, &Sweep::single(), &path)?;

    let text = std::fs::read_to_string(&path)?;
    assert!(text.contains("Minimize"));
    assert!(text.contains("Subject To"));
    assert!(text.contains("Energy_Total_Single_S1"));
    assert!(text.contains("Single_N1_Energy_Price:"));
    assert!(text.contains("Single_RZ_Reserve_Price:"));
    assert!(text.contains("Nodal_Injection_Single_N1 free"));
    assert!(text.trim_end().ends_with("End"));
    Ok(())
}

#[test]
fn test_results_serialize_to_json() -> anyhow::Result<()> {
    let market = single_node_market();
    let solution = DispatchSolver::new().solve(&market, &Sweep::single())?;

    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("master.json");
    solution.master.to_json(&path)?;

    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(value["index_label"], "Run");
    assert!(value["columns"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c == "N1 Energy Price"));
    Ok(())
}
