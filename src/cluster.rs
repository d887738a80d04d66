//! Phase 2: cluster distribution centers under production centers.
//!
//! Distribution centers opened in phase 1 are grouped into proximity
//! clusters whose aggregate demand fits one production center, and one new
//! production center is opened per cluster, nearest the cluster's centroid.

use tracing::debug;

use crate::instance::Instance;
use crate::solution::{SiteRole, Solution};
use crate::solver::{nearest_unopened_site, SolveError};

/// Open one production center per cluster of distribution centers and link
/// every member's parent to it.
///
/// `demand_at[site]` is the demand accumulated at each opened center during
/// phase 1. Seeds are taken in index order; clusters grow by nearest
/// site-to-site distance until the next member would overflow the full
/// capacity.
pub fn open_production_centers(
    instance: &Instance,
    demand_at: &[u64],
    solution: &mut Solution,
) -> Result<(), SolveError> {
    let full_capacity = instance.costs.full_capacity();
    let mut unclustered: Vec<usize> = solution
        .roles
        .iter()
        .enumerate()
        .filter(|(_, role)| role.is_distribution())
        .map(|(site, _)| site)
        .collect();

    while let Some(&seed) = unclustered.first() {
        let mut members = vec![seed];
        let mut aggregate = demand_at[seed];

        let mut rest: Vec<usize> = unclustered[1..].to_vec();
        rest.sort_by(|&a, &b| {
            instance
                .distances
                .site_to_site(seed, a)
                .total_cmp(&instance.distances.site_to_site(seed, b))
                .then(a.cmp(&b))
        });
        for site in rest {
            if aggregate + demand_at[site] > full_capacity {
                break;
            }
            aggregate += demand_at[site];
            members.push(site);
        }

        let centroid = site_centroid(instance, &members);
        let Some(producer) = nearest_unopened_site(instance, solution, centroid) else {
            return Err(SolveError::SitesExhausted);
        };

        let automated = aggregate > instance.costs.base_capacity;
        solution.roles[producer] = SiteRole::Production { automated };
        for &member in &members {
            solution.roles[member] = SiteRole::Distribution {
                parent: Some(producer),
            };
        }

        debug!(
            producer,
            automated,
            members = members.len(),
            demand = aggregate,
            "opened production center for cluster"
        );
        unclustered.retain(|site| !members.contains(site));
    }

    Ok(())
}

/// Unweighted centroid of a set of sites.
fn site_centroid(instance: &Instance, sites: &[usize]) -> (f64, f64) {
    let n = sites.len() as f64;
    let (sx, sy) = sites.iter().fold((0.0, 0.0), |(sx, sy), &s| {
        (sx + instance.sites[s].x, sy + instance.sites[s].y)
    });
    (sx / n, sy / n)
}
