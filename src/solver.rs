//! Two-phase constructive heuristic (phase 1: greedy client assignment).
//!
//! Opens one center per round. While the remaining demand is more than a
//! single site can carry, every unopened site is scored by asking the
//! bounded selector for its cheapest capacity-windowed client subset, and
//! the best site opens as a distribution center (promoted to production in
//! place when it accumulates enough demand). Once the remaining demand fits
//! a single site, the site nearest the remaining clients' centroid opens as
//! the final production center. Phase 2 (see [`crate::cluster`]) then hangs
//! the distribution centers under newly opened production centers.

use std::collections::HashSet;
use std::fmt;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::cluster;
use crate::instance::Instance;
use crate::selector::{BoundedSelector, Candidate, Selection, SelectorError};
use crate::solution::{SiteRole, Solution};

/// Heuristic parameters.
///
/// The promote threshold and the floor-relaxation shape are inherited
/// heuristic constants; they are exposed here rather than hard-coded.
#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// How many nearest clients a site offers to the selector per round.
    pub candidate_cap: usize,
    /// Fraction of full capacity above which a freshly opened distribution
    /// center is reclassified as a production center.
    pub promote_threshold: f64,
    /// Fraction of full capacity used as the selection window floor
    /// (before per-round relaxation).
    pub capacity_floor: f64,
    /// Strength of the early-round floor relaxation: the effective floor is
    /// scaled by `1 - floor_relaxation / (round + 1)`.
    pub floor_relaxation: f64,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            candidate_cap: 256,
            promote_threshold: 0.2,
            capacity_floor: 0.75,
            floor_relaxation: 0.5,
        }
    }
}

impl SolveOptions {
    /// Window floor for a given round, in demand units.
    fn window_floor(&self, round: usize, full_capacity: u64) -> u64 {
        let relax = 1.0 - self.floor_relaxation / (round as f64 + 1.0);
        let floor = self.capacity_floor * relax * full_capacity as f64;
        (floor as u64).max(1)
    }
}

#[derive(Debug)]
pub enum SolveError {
    /// Clients (or clusters) remain but every site is already open.
    SitesExhausted,
    /// The selector failed in a way the window-relaxation fallback could
    /// not recover from.
    Selector(SelectorError),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::SitesExhausted => {
                write!(f, "no unopened site left to place a center on")
            }
            SolveError::Selector(err) => write!(f, "bounded selection failed: {}", err),
        }
    }
}

impl std::error::Error for SolveError {}

impl From<SelectorError> for SolveError {
    fn from(err: SelectorError) -> Self {
        SolveError::Selector(err)
    }
}

/// A complete solving strategy over a problem instance.
///
/// The constructive heuristic implements this; an exact solver (e.g. a MILP
/// formulation of the whole problem) can implement the same trait and the
/// two are interchangeable.
pub trait SolveStrategy {
    fn solve(&self, instance: &Instance) -> Result<Solution, SolveError>;
}

/// The two-phase constructive heuristic as a [`SolveStrategy`].
#[derive(Debug, Clone, Default)]
pub struct ConstructiveHeuristic<S> {
    pub selector: S,
    pub options: SolveOptions,
}

impl<S: BoundedSelector + Sync> SolveStrategy for ConstructiveHeuristic<S> {
    fn solve(&self, instance: &Instance) -> Result<Solution, SolveError> {
        solve(instance, &self.selector, &self.options)
    }
}

/// Run both construction phases and return the completed solution.
pub fn solve<S: BoundedSelector + Sync>(
    instance: &Instance,
    selector: &S,
    options: &SolveOptions,
) -> Result<Solution, SolveError> {
    let mut solution = Solution::empty(instance.sites.len(), instance.clients.len());

    let demand_at = assign_clients(instance, selector, options, &mut solution)?;
    info!(
        centers = solution.roles.iter().filter(|r| r.is_open()).count(),
        "client assignment complete"
    );

    cluster::open_production_centers(instance, &demand_at, &mut solution)?;
    info!(
        production = solution.production_centers().count(),
        distribution = solution.distribution_centers().count(),
        "construction complete"
    );

    Ok(solution)
}

/// Phase 1: open centers greedily until every client has a supplier.
///
/// Returns the demand accumulated at each opened site; the clusterer needs
/// it to size production centers.
fn assign_clients<S: BoundedSelector + Sync>(
    instance: &Instance,
    selector: &S,
    options: &SolveOptions,
    solution: &mut Solution,
) -> Result<Vec<u64>, SolveError> {
    let full_capacity = instance.costs.full_capacity();
    let mut unassigned: Vec<usize> = (0..instance.clients.len()).collect();
    let mut remaining = instance.total_demand();
    let mut demand_at = vec![0u64; instance.sites.len()];
    let mut round = 0;

    while !unassigned.is_empty() {
        if remaining > full_capacity {
            let unopened: Vec<usize> = (0..instance.sites.len())
                .filter(|&s| solution.roles[s] == SiteRole::Unassigned)
                .collect();
            if unopened.is_empty() {
                return Err(SolveError::SitesExhausted);
            }

            let window_lo = options.window_floor(round, full_capacity);

            // Independent per-site subproblems; merged by a deterministic
            // (objective, index) minimum so parallelism cannot change the
            // outcome.
            let evaluated: Vec<Option<(usize, Selection)>> = unopened
                .par_iter()
                .map(|&site| {
                    select_for_site(
                        instance,
                        selector,
                        &unassigned,
                        site,
                        window_lo,
                        full_capacity,
                        options.candidate_cap,
                    )
                    .map(|selection| selection.map(|s| (site, s)))
                })
                .collect::<Result<_, SelectorError>>()?;

            let Some((site, selection)) = evaluated
                .into_iter()
                .flatten()
                .min_by(|a, b| a.1.score.total_cmp(&b.1.score).then(a.0.cmp(&b.0)))
            else {
                return Err(SolveError::SitesExhausted);
            };

            let selected: HashSet<usize> = selection.items.iter().copied().collect();
            for &client in &selection.items {
                solution.supplier[client] = Some(site);
            }
            unassigned.retain(|client| !selected.contains(client));
            remaining -= selection.weight;
            demand_at[site] = selection.weight;

            let promoted =
                selection.weight as f64 > options.promote_threshold * full_capacity as f64;
            solution.roles[site] = if promoted {
                SiteRole::Production {
                    automated: selection.weight > instance.costs.base_capacity,
                }
            } else {
                SiteRole::Distribution { parent: None }
            };

            debug!(
                round,
                site,
                clients = selection.items.len(),
                demand = selection.weight,
                promoted,
                "opened center"
            );
            round += 1;
        } else {
            // Remaining demand fits one site: place a production center at
            // the site nearest the centroid of what is left.
            let centroid = client_centroid(instance, &unassigned);
            let Some(site) = nearest_unopened_site(instance, solution, centroid) else {
                return Err(SolveError::SitesExhausted);
            };

            let automated = remaining > instance.costs.base_capacity;
            solution.roles[site] = SiteRole::Production { automated };
            for &client in &unassigned {
                solution.supplier[client] = Some(site);
            }
            demand_at[site] = remaining;

            debug!(
                round,
                site,
                clients = unassigned.len(),
                demand = remaining,
                automated,
                "opened final production center"
            );
            unassigned.clear();
        }
    }

    Ok(demand_at)
}

/// Best capacity-windowed client subset for one candidate site, or `None`
/// when the site has nothing selectable.
///
/// Clients are ranked by distance to the site and capped before selection.
/// Zero-demand clients are dropped first: the selector can never pick them,
/// and under a small cap they would crowd real candidates out of the
/// shortlist. An unreachable window is retried with a progressively halved
/// floor; a floor of 1 always succeeds because instance validation bounds
/// every single demand by the full capacity.
fn select_for_site<S: BoundedSelector>(
    instance: &Instance,
    selector: &S,
    unassigned: &[usize],
    site: usize,
    window_lo: u64,
    window_hi: u64,
    candidate_cap: usize,
) -> Result<Option<Selection>, SelectorError> {
    let mut ranked: Vec<usize> = unassigned
        .iter()
        .copied()
        .filter(|&client| instance.clients[client].demand > 0)
        .collect();
    ranked.sort_by(|&a, &b| {
        instance
            .distances
            .site_to_client(site, a)
            .total_cmp(&instance.distances.site_to_client(site, b))
            .then(a.cmp(&b))
    });
    ranked.truncate(candidate_cap);
    if ranked.is_empty() {
        return Ok(None);
    }

    let candidates: Vec<Candidate> = ranked
        .iter()
        .map(|&client| Candidate {
            item: client,
            weight: u64::from(instance.clients[client].demand),
            score: f64::from(instance.clients[client].demand)
                * instance.distances.site_to_client(site, client),
        })
        .collect();

    let mut lo = window_lo.max(1);
    loop {
        match selector.select(&candidates, lo, window_hi) {
            Ok(selection) => return Ok(Some(selection)),
            Err(SelectorError::WindowUnreachable { .. }) if lo > 1 => {
                lo /= 2;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Unweighted centroid of a set of clients.
fn client_centroid(instance: &Instance, clients: &[usize]) -> (f64, f64) {
    let n = clients.len() as f64;
    let (sx, sy) = clients.iter().fold((0.0, 0.0), |(sx, sy), &c| {
        (sx + instance.clients[c].x, sy + instance.clients[c].y)
    });
    (sx / n, sy / n)
}

/// Unopened site with minimum squared distance to a point, lowest index on
/// ties. Shared with the clusterer.
pub(crate) fn nearest_unopened_site(
    instance: &Instance,
    solution: &Solution,
    point: (f64, f64),
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (site, role) in solution.roles.iter().enumerate() {
        if *role != SiteRole::Unassigned {
            continue;
        }
        let dx = instance.sites[site].x - point.0;
        let dy = instance.sites[site].y - point.1;
        let d2 = dx * dx + dy * dy;
        if best.is_none_or(|(_, best_d2)| d2 < best_d2) {
            best = Some((site, d2));
        }
    }
    best.map(|(site, _)| site)
}
