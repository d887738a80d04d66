//! Solution representation and structural validation.

use std::fmt;

/// Role of a site in a solution.
///
/// A site is either unopened, a production center, or a distribution
/// center; the "both production and distribution" state cannot be
/// represented. A distribution center's parent stays `None` between the
/// assignment phase and the clustering phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteRole {
    Unassigned,
    Production { automated: bool },
    Distribution { parent: Option<usize> },
}

impl SiteRole {
    pub fn is_open(&self) -> bool {
        !matches!(self, SiteRole::Unassigned)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, SiteRole::Production { .. })
    }

    pub fn is_distribution(&self) -> bool {
        matches!(self, SiteRole::Distribution { .. })
    }
}

/// A (possibly partial) assignment of roles to sites and suppliers to
/// clients. Built by the solver phases, read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Role per site, indexed like `Instance::sites`.
    pub roles: Vec<SiteRole>,
    /// Serving center per client, indexed like `Instance::clients`.
    pub supplier: Vec<Option<usize>>,
}

impl Solution {
    /// Everything unopened and unassigned.
    pub fn empty(num_sites: usize, num_clients: usize) -> Self {
        Self {
            roles: vec![SiteRole::Unassigned; num_sites],
            supplier: vec![None; num_clients],
        }
    }

    pub fn production_centers(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.roles.iter().enumerate().filter_map(|(i, role)| {
            if let SiteRole::Production { automated } = role {
                Some((i, *automated))
            } else {
                None
            }
        })
    }

    pub fn distribution_centers(&self) -> impl Iterator<Item = (usize, Option<usize>)> + '_ {
        self.roles.iter().enumerate().filter_map(|(i, role)| {
            if let SiteRole::Distribution { parent } = role {
                Some((i, *parent))
            } else {
                None
            }
        })
    }
}

/// A structural invariant broken by a solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A client has no supplier.
    MissingSupplier { client: usize },
    /// A client's supplier is not an open center.
    SupplierNotOpen { client: usize, site: usize },
    /// A distribution center was never linked to a production center.
    MissingParent { site: usize },
    /// A distribution center's parent is not a production center.
    ParentNotProduction { site: usize, parent: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingSupplier { client } => {
                write!(f, "client {} has no supplier", client)
            }
            Violation::SupplierNotOpen { client, site } => {
                write!(f, "client {} is served by unopened site {}", client, site)
            }
            Violation::MissingParent { site } => {
                write!(f, "distribution center {} has no production parent", site)
            }
            Violation::ParentNotProduction { site, parent } => write!(
                f,
                "distribution center {} has non-production parent {}",
                site, parent
            ),
        }
    }
}

/// Check the structural invariants of a completed solution.
///
/// Pass/fail: a valid solution returns `Ok(())`, an invalid one returns
/// every violation found. Validation failure is a diagnostic, not a panic;
/// the cost evaluator still accepts the solution for inspection.
pub fn validate(solution: &Solution) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    for (site, role) in solution.roles.iter().enumerate() {
        if let SiteRole::Distribution { parent } = role {
            match parent {
                None => violations.push(Violation::MissingParent { site }),
                Some(p) => {
                    let parent_is_production = solution
                        .roles
                        .get(*p)
                        .is_some_and(|role| role.is_production());
                    if !parent_is_production {
                        violations.push(Violation::ParentNotProduction { site, parent: *p });
                    }
                }
            }
        }
    }

    for (client, supplier) in solution.supplier.iter().enumerate() {
        match supplier {
            None => violations.push(Violation::MissingSupplier { client }),
            Some(site) => {
                let open = solution.roles.get(*site).is_some_and(|role| role.is_open());
                if !open {
                    violations.push(Violation::SupplierNotOpen {
                        client,
                        site: *site,
                    });
                }
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_solution_reports_missing_suppliers() {
        let solution = Solution::empty(2, 2);
        let violations = validate(&solution).unwrap_err();
        assert_eq!(
            violations,
            vec![
                Violation::MissingSupplier { client: 0 },
                Violation::MissingSupplier { client: 1 },
            ]
        );
    }

    #[test]
    fn valid_two_echelon_solution_passes() {
        let mut solution = Solution::empty(3, 2);
        solution.roles[0] = SiteRole::Production { automated: true };
        solution.roles[1] = SiteRole::Distribution { parent: Some(0) };
        solution.supplier[0] = Some(0);
        solution.supplier[1] = Some(1);
        assert!(validate(&solution).is_ok());
    }

    #[test]
    fn rejects_unlinked_distribution_center() {
        let mut solution = Solution::empty(2, 1);
        solution.roles[0] = SiteRole::Distribution { parent: None };
        solution.supplier[0] = Some(0);
        let violations = validate(&solution).unwrap_err();
        assert_eq!(violations, vec![Violation::MissingParent { site: 0 }]);
    }

    #[test]
    fn rejects_distribution_parented_to_distribution() {
        let mut solution = Solution::empty(3, 1);
        solution.roles[0] = SiteRole::Production { automated: false };
        solution.roles[1] = SiteRole::Distribution { parent: Some(0) };
        solution.roles[2] = SiteRole::Distribution { parent: Some(1) };
        solution.supplier[0] = Some(2);
        let violations = validate(&solution).unwrap_err();
        assert_eq!(
            violations,
            vec![Violation::ParentNotProduction { site: 2, parent: 1 }]
        );
    }

    #[test]
    fn rejects_supplier_pointing_at_unopened_site() {
        let mut solution = Solution::empty(2, 1);
        solution.roles[0] = SiteRole::Production { automated: false };
        solution.supplier[0] = Some(1);
        let violations = validate(&solution).unwrap_err();
        assert_eq!(
            violations,
            vec![Violation::SupplierNotOpen { client: 0, site: 1 }]
        );
    }
}
