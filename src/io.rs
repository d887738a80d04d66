//! Instance and solution JSON formats.
//!
//! The instance file carries the cost parameters, client and site lists,
//! and both dense distance tables. Solution files report three lists
//! (production centers, distribution centers, clients); all ids are 1-based
//! externally while everything internal stays 0-based.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::instance::{Client, CostModel, DistanceMatrices, Instance, InstanceError, Site};
use crate::solution::{SiteRole, Solution};

#[derive(Debug)]
pub enum IoError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Instance(InstanceError),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::Io(err) => write!(f, "i/o error: {}", err),
            IoError::Json(err) => write!(f, "invalid json: {}", err),
            IoError::Instance(err) => write!(f, "invalid instance: {}", err),
        }
    }
}

impl std::error::Error for IoError {}

impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        IoError::Io(err)
    }
}

impl From<serde_json::Error> for IoError {
    fn from(err: serde_json::Error) -> Self {
        IoError::Json(err)
    }
}

impl From<InstanceError> for IoError {
    fn from(err: InstanceError) -> Self {
        IoError::Instance(err)
    }
}

#[derive(Debug, Deserialize)]
struct InstanceFile {
    parameters: Parameters,
    clients: Vec<ClientRecord>,
    sites: Vec<SiteRecord>,
    #[serde(rename = "siteSiteDistances")]
    site_site_distances: Vec<Vec<f64>>,
    #[serde(rename = "siteClientDistances")]
    site_client_distances: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    building_costs: BuildingCosts,
    production_costs: ProductionCosts,
    routing_costs: RoutingCosts,
    capacity_cost: f64,
    capacities: Capacities,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildingCosts {
    production_center: f64,
    automation_penalty: f64,
    distribution_center: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductionCosts {
    production_center: f64,
    automation_bonus: f64,
    distribution_center: f64,
}

#[derive(Debug, Deserialize)]
struct RoutingCosts {
    primary: f64,
    secondary: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Capacities {
    production_center: u64,
    automation_bonus: u64,
}

#[derive(Debug, Deserialize)]
struct ClientRecord {
    demand: u32,
    coordinates: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct SiteRecord {
    coordinates: [f64; 2],
}

/// External form of a completed solution, 1-based ids.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SolutionFile {
    #[serde(rename = "productionCenters")]
    pub production_centers: Vec<ProductionRecord>,
    #[serde(rename = "distributionCenters")]
    pub distribution_centers: Vec<DistributionRecord>,
    pub clients: Vec<ClientAssignmentRecord>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductionRecord {
    pub id: usize,
    pub automation: u8,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistributionRecord {
    pub id: usize,
    pub parent: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientAssignmentRecord {
    pub id: usize,
    pub parent: usize,
}

/// Parse an instance from its JSON text and validate it.
pub fn parse_instance(json: &str) -> Result<Instance, IoError> {
    let file: InstanceFile = serde_json::from_str(json)?;
    instance_from_file(file)
}

/// Read and validate an instance file.
pub fn read_instance(path: impl AsRef<Path>) -> Result<Instance, IoError> {
    let reader = BufReader::new(File::open(path)?);
    let file: InstanceFile = serde_json::from_reader(reader)?;
    instance_from_file(file)
}

fn instance_from_file(file: InstanceFile) -> Result<Instance, IoError> {
    let costs = CostModel {
        production_build: file.parameters.building_costs.production_center,
        automation_build_penalty: file.parameters.building_costs.automation_penalty,
        distribution_build: file.parameters.building_costs.distribution_center,
        production_unit: file.parameters.production_costs.production_center,
        automation_unit_bonus: file.parameters.production_costs.automation_bonus,
        distribution_unit: file.parameters.production_costs.distribution_center,
        primary_routing_unit: file.parameters.routing_costs.primary,
        secondary_routing_unit: file.parameters.routing_costs.secondary,
        capacity_overflow_unit: file.parameters.capacity_cost,
        base_capacity: file.parameters.capacities.production_center,
        automation_capacity_bonus: file.parameters.capacities.automation_bonus,
    };
    let sites = file
        .sites
        .into_iter()
        .map(|s| Site {
            x: s.coordinates[0],
            y: s.coordinates[1],
        })
        .collect();
    let clients = file
        .clients
        .into_iter()
        .map(|c| Client {
            demand: c.demand,
            x: c.coordinates[0],
            y: c.coordinates[1],
        })
        .collect();
    let distances = DistanceMatrices::new(file.site_site_distances, file.site_client_distances);
    Ok(Instance::new(sites, clients, costs, distances)?)
}

/// Convert a completed solution to its external 1-based form.
///
/// Unset suppliers or parents are skipped; an invalid solution serializes
/// to whatever it does define.
pub fn solution_to_file(solution: &Solution) -> SolutionFile {
    let mut production_centers = Vec::new();
    let mut distribution_centers = Vec::new();
    for (site, role) in solution.roles.iter().enumerate() {
        match role {
            SiteRole::Production { automated } => production_centers.push(ProductionRecord {
                id: site + 1,
                automation: u8::from(*automated),
            }),
            SiteRole::Distribution {
                parent: Some(parent),
            } => distribution_centers.push(DistributionRecord {
                id: site + 1,
                parent: parent + 1,
            }),
            _ => {}
        }
    }
    let clients = solution
        .supplier
        .iter()
        .enumerate()
        .filter_map(|(client, supplier)| {
            supplier.map(|site| ClientAssignmentRecord {
                id: client + 1,
                parent: site + 1,
            })
        })
        .collect();
    SolutionFile {
        production_centers,
        distribution_centers,
        clients,
    }
}

/// Write a solution file.
pub fn write_solution(path: impl AsRef<Path>, solution: &Solution) -> Result<(), IoError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(writer, &solution_to_file(solution))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "parameters": {
            "buildingCosts": {
                "productionCenter": 1000.0,
                "automationPenalty": 500.0,
                "distributionCenter": 300.0
            },
            "productionCosts": {
                "productionCenter": 10.0,
                "automationBonus": 3.0,
                "distributionCenter": 2.0
            },
            "routingCosts": { "primary": 1.0, "secondary": 1.5 },
            "capacityCost": 50.0,
            "capacities": { "productionCenter": 100, "automationBonus": 50 }
        },
        "clients": [
            { "demand": 40, "coordinates": [0.0, 1.0] },
            { "demand": 60, "coordinates": [2.0, 1.0] }
        ],
        "sites": [
            { "coordinates": [0.0, 0.0] },
            { "coordinates": [2.0, 0.0] }
        ],
        "siteSiteDistances": [[0.0, 2.0], [2.0, 0.0]],
        "siteClientDistances": [[1.0, 2.236], [2.236, 1.0]]
    }"#;

    #[test]
    fn parses_the_instance_format() {
        let instance = parse_instance(SAMPLE).unwrap();
        assert_eq!(instance.sites.len(), 2);
        assert_eq!(instance.clients.len(), 2);
        assert_eq!(instance.clients[1].demand, 60);
        assert_eq!(instance.costs.base_capacity, 100);
        assert_eq!(instance.costs.secondary_routing_unit, 1.5);
        assert_eq!(instance.distances.site_to_site(0, 1), 2.0);
        assert_eq!(instance.distances.site_to_client(1, 0), 2.236);
    }

    #[test]
    fn rejects_misaligned_tables_at_parse_time() {
        let broken = SAMPLE.replace(
            "\"siteSiteDistances\": [[0.0, 2.0], [2.0, 0.0]]",
            "\"siteSiteDistances\": [[0.0, 2.0]]",
        );
        let err = parse_instance(&broken).unwrap_err();
        assert!(matches!(err, IoError::Instance(_)));
    }

    #[test]
    fn solution_ids_are_one_based() {
        let mut solution = Solution::empty(3, 2);
        solution.roles[0] = SiteRole::Production { automated: true };
        solution.roles[2] = SiteRole::Distribution { parent: Some(0) };
        solution.supplier[0] = Some(2);
        solution.supplier[1] = Some(0);

        let file = solution_to_file(&solution);
        assert_eq!(
            file.production_centers,
            vec![ProductionRecord {
                id: 1,
                automation: 1
            }]
        );
        assert_eq!(
            file.distribution_centers,
            vec![DistributionRecord { id: 3, parent: 1 }]
        );
        assert_eq!(
            file.clients,
            vec![
                ClientAssignmentRecord { id: 1, parent: 3 },
                ClientAssignmentRecord { id: 2, parent: 1 },
            ]
        );

        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["productionCenters"][0]["id"], 1);
        assert_eq!(json["distributionCenters"][0]["parent"], 1);
    }
}
