//! Problem data: sites, clients, cost parameters, distance tables.
//!
//! Everything here is immutable once an [`Instance`] has been built.
//! Construction validates table shapes and per-client feasibility so the
//! solver can assume a well-formed problem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A candidate site for a production or distribution center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    pub x: f64,
    pub y: f64,
}

/// A client with an integer demand to be served by exactly one center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Client {
    pub demand: u32,
    pub x: f64,
    pub y: f64,
}

/// Scalar cost and capacity parameters of the problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostModel {
    /// Build cost of a production center.
    pub production_build: f64,
    /// Extra build cost when a production center is automated.
    pub automation_build_penalty: f64,
    /// Build cost of a distribution center.
    pub distribution_build: f64,
    /// Per-unit production cost.
    pub production_unit: f64,
    /// Per-unit production discount at an automated center.
    pub automation_unit_bonus: f64,
    /// Per-unit handling cost at a distribution center.
    pub distribution_unit: f64,
    /// Per-unit, per-distance cost on site-to-site (primary) legs.
    pub primary_routing_unit: f64,
    /// Per-unit, per-distance cost on site-to-client (secondary) legs.
    pub secondary_routing_unit: f64,
    /// Per-unit penalty for demand served beyond a center's capacity.
    pub capacity_overflow_unit: f64,
    /// Capacity of a non-automated production center.
    pub base_capacity: u64,
    /// Additional capacity granted by automation.
    pub automation_capacity_bonus: u64,
}

impl CostModel {
    /// Capacity of a production center given its automation state.
    pub fn capacity(&self, automated: bool) -> u64 {
        if automated {
            self.base_capacity + self.automation_capacity_bonus
        } else {
            self.base_capacity
        }
    }

    /// Capacity of an automated production center (the maximum a single
    /// site can ever serve without overflow).
    pub fn full_capacity(&self) -> u64 {
        self.base_capacity + self.automation_capacity_bonus
    }
}

/// Dense Euclidean distance tables, aligned with site/client indices.
#[derive(Debug, Clone)]
pub struct DistanceMatrices {
    site_site: Vec<Vec<f64>>,
    site_client: Vec<Vec<f64>>,
}

impl DistanceMatrices {
    pub fn new(site_site: Vec<Vec<f64>>, site_client: Vec<Vec<f64>>) -> Self {
        Self {
            site_site,
            site_client,
        }
    }

    /// Compute both tables from coordinates.
    pub fn from_coordinates(sites: &[Site], clients: &[Client]) -> Self {
        let site_site = sites
            .iter()
            .map(|a| {
                sites
                    .iter()
                    .map(|b| euclidean(a.x, a.y, b.x, b.y))
                    .collect()
            })
            .collect();
        let site_client = sites
            .iter()
            .map(|s| {
                clients
                    .iter()
                    .map(|c| euclidean(s.x, s.y, c.x, c.y))
                    .collect()
            })
            .collect();
        Self {
            site_site,
            site_client,
        }
    }

    pub fn site_to_site(&self, from: usize, to: usize) -> f64 {
        self.site_site[from][to]
    }

    pub fn site_to_client(&self, site: usize, client: usize) -> f64 {
        self.site_client[site][client]
    }

    fn check_shape(&self, num_sites: usize, num_clients: usize) -> Result<(), InstanceError> {
        if self.site_site.len() != num_sites
            || self.site_site.iter().any(|row| row.len() != num_sites)
        {
            return Err(InstanceError::MalformedInput(
                "site-to-site distance table does not match the site count".to_string(),
            ));
        }
        if self.site_client.len() != num_sites
            || self.site_client.iter().any(|row| row.len() != num_clients)
        {
            return Err(InstanceError::MalformedInput(
                "site-to-client distance table does not match the site/client counts".to_string(),
            ));
        }
        Ok(())
    }
}

fn euclidean(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let dx = ax - bx;
    let dy = ay - by;
    (dx * dx + dy * dy).sqrt()
}

#[derive(Debug)]
pub enum InstanceError {
    /// Tables misaligned or required data missing.
    MalformedInput(String),
    /// A single client's demand exceeds what any one site can serve.
    Infeasible { client: usize, demand: u32 },
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceError::MalformedInput(msg) => write!(f, "malformed input: {}", msg),
            InstanceError::Infeasible { client, demand } => write!(
                f,
                "client {} has demand {} exceeding full site capacity",
                client, demand
            ),
        }
    }
}

impl std::error::Error for InstanceError {}

/// A validated, immutable problem instance.
#[derive(Debug, Clone)]
pub struct Instance {
    pub sites: Vec<Site>,
    pub clients: Vec<Client>,
    pub costs: CostModel,
    pub distances: DistanceMatrices,
}

impl Instance {
    /// Build an instance, rejecting misaligned tables and clients whose
    /// demand no single site could ever serve.
    pub fn new(
        sites: Vec<Site>,
        clients: Vec<Client>,
        costs: CostModel,
        distances: DistanceMatrices,
    ) -> Result<Self, InstanceError> {
        distances.check_shape(sites.len(), clients.len())?;
        let full = costs.full_capacity();
        for (i, client) in clients.iter().enumerate() {
            if u64::from(client.demand) > full {
                return Err(InstanceError::Infeasible {
                    client: i,
                    demand: client.demand,
                });
            }
        }
        Ok(Self {
            sites,
            clients,
            costs,
            distances,
        })
    }

    /// Convenience constructor computing distance tables from coordinates.
    pub fn from_coordinates(
        sites: Vec<Site>,
        clients: Vec<Client>,
        costs: CostModel,
    ) -> Result<Self, InstanceError> {
        let distances = DistanceMatrices::from_coordinates(&sites, &clients);
        Self::new(sites, clients, costs, distances)
    }

    /// Sum of all client demands.
    pub fn total_demand(&self) -> u64 {
        self.clients.iter().map(|c| u64::from(c.demand)).sum()
    }
}
