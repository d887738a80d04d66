//! Cost evaluation from first principles.
//!
//! Recomputes the total cost of a completed solution from the instance and
//! the solution alone, deliberately ignoring any totals the construction
//! phases may have accumulated, so bookkeeping drift shows up as a cost
//! mismatch instead of going unnoticed.

use crate::instance::Instance;
use crate::solution::{SiteRole, Solution};

/// Total building + production + routing + overflow cost of a solution.
///
/// Pure function of its inputs; invalid solutions still get a cost (terms
/// whose references are unset or dangling contribute what they can), so a
/// failed validation can be inspected alongside a number.
pub fn evaluate(instance: &Instance, solution: &Solution) -> f64 {
    let costs = &instance.costs;
    let mut total = 0.0;

    // Demand served through each production center: direct clients plus
    // clients of the distribution centers it parents.
    let mut served = vec![0u64; instance.sites.len()];
    for (client, supplier) in solution.supplier.iter().enumerate() {
        let Some(site) = *supplier else { continue };
        let demand = u64::from(instance.clients[client].demand);
        match solution.roles.get(site) {
            Some(SiteRole::Production { .. }) => served[site] += demand,
            Some(SiteRole::Distribution {
                parent: Some(parent),
            }) => {
                if let Some(slot) = served.get_mut(*parent) {
                    *slot += demand;
                }
            }
            _ => {}
        }
    }

    // Building and overflow.
    for (site, role) in solution.roles.iter().enumerate() {
        match role {
            SiteRole::Production { automated } => {
                total += costs.production_build;
                if *automated {
                    total += costs.automation_build_penalty;
                }
                let capacity = costs.capacity(*automated) as f64;
                total += costs.capacity_overflow_unit * (served[site] as f64 - capacity).max(0.0);
            }
            SiteRole::Distribution { .. } => total += costs.distribution_build,
            SiteRole::Unassigned => {}
        }
    }

    // Per-client production and routing.
    for (client, supplier) in solution.supplier.iter().enumerate() {
        let Some(site) = *supplier else { continue };
        let demand = f64::from(instance.clients[client].demand);
        match solution.roles.get(site) {
            Some(SiteRole::Production { automated }) => {
                total += demand * production_unit(instance, *automated);
                total += demand
                    * costs.secondary_routing_unit
                    * instance.distances.site_to_client(site, client);
            }
            Some(SiteRole::Distribution { parent }) => {
                if let Some(parent) = parent {
                    if let Some(SiteRole::Production { automated }) = solution.roles.get(*parent) {
                        total += demand * production_unit(instance, *automated);
                        total += demand
                            * costs.primary_routing_unit
                            * instance.distances.site_to_site(*parent, site);
                    }
                }
                total += demand * costs.distribution_unit;
                total += demand
                    * costs.secondary_routing_unit
                    * instance.distances.site_to_client(site, client);
            }
            _ => {}
        }
    }

    total
}

fn production_unit(instance: &Instance, automated: bool) -> f64 {
    let costs = &instance.costs;
    if automated {
        costs.production_unit - costs.automation_unit_bonus
    } else {
        costs.production_unit
    }
}
