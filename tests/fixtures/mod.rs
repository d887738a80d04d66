//! Test fixtures for flp-planner.
//!
//! Small geometric instances with distance tables computed from
//! coordinates, and a cost model with easy round numbers.

use flp_planner::instance::{Client, CostModel, Instance, Site};

/// Base capacity 100, automation bonus 50 (full capacity 150), round-number
/// costs so expected totals stay readable.
pub fn default_costs() -> CostModel {
    CostModel {
        production_build: 1000.0,
        automation_build_penalty: 500.0,
        distribution_build: 300.0,
        production_unit: 10.0,
        automation_unit_bonus: 3.0,
        distribution_unit: 2.0,
        primary_routing_unit: 1.0,
        secondary_routing_unit: 1.0,
        capacity_overflow_unit: 50.0,
        base_capacity: 100,
        automation_capacity_bonus: 50,
    }
}

/// Build a validated instance from `(x, y)` sites and `(demand, x, y)`
/// clients.
pub fn instance(sites: &[(f64, f64)], clients: &[(u32, f64, f64)]) -> Instance {
    let sites = sites.iter().map(|&(x, y)| Site { x, y }).collect();
    let clients = clients
        .iter()
        .map(|&(demand, x, y)| Client { demand, x, y })
        .collect();
    Instance::from_coordinates(sites, clients, default_costs())
        .expect("fixture instances must be valid")
}
