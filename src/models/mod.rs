//! Domain model types for ride-sharing dial-a-ride problems.
//!
//! Provides the core abstractions: trip requests with pickup and dropoff
//! nodes, scheduled stops, routes as feasible stop sequences, vehicles that
//! drive routes, and the problem instance tying a request batch to its
//! travel time matrix.

mod node;
mod problem;
mod request;
mod route;
mod solution;
mod stop;
mod vehicle;

/// Unique positive identifier of a trip request.
pub type TripId = u32;

/// Wall-clock time in whole minutes since midnight.
pub type Minutes = i64;

pub use node::{Endpoint, Node, TimeWindow};
pub use problem::Problem;
pub use request::TripRequest;
pub use route::Route;
pub use solution::{Solution, Violation, ViolationType};
pub use stop::Stop;
pub use vehicle::Vehicle;
