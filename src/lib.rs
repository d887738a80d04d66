//! flp-planner core
//!
//! Constructive heuristic for the capacitated two-echelon facility-location
//! problem: open production and distribution centers, assign clients.

pub mod instance;
pub mod io;
pub mod selector;
pub mod solver;
pub mod cluster;
pub mod cost;
pub mod solution;
