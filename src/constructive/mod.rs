//! Constructive heuristics for building ride-sharing solutions.
//!
//! - [`grasp_construct`]: Randomized greedy construction with restricted
//!   candidate lists, one vehicle at a time
//! - [`join_routes`]: Chains time-disjoint routes to shrink the fleet

mod grasp;
mod join;

pub use grasp::grasp_construct;
pub use join::join_routes;
