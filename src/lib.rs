//! # u-rideshare
//!
//! Ride-sharing optimization for the dial-a-ride problem: a batch of trip
//! requests, each with a pickup and a dropoff location and a time window,
//! is assigned to capacity-limited vehicles so that every schedule is
//! feasible, riders share vehicles where it saves travel, and the fleet
//! stays small.
//!
//! The solver is a GRASP metaheuristic: randomized greedy construction with
//! restricted candidate lists, followed by inter-vehicle swap local search,
//! restarted many times while the best solution is kept.
//!
//! ## Modules
//!
//! - [`models`]: Domain model types (TripRequest, Stop, Route, Vehicle, Solution, Problem)
//! - [`distance`]: Travel time matrix over trip endpoints
//! - [`evaluation`]: Schedule simulation, feasibility and savings objective
//! - [`insertion`]: Restricted candidate lists for trip insertion
//! - [`constructive`]: GRASP construction and route joining
//! - [`local_search`]: Inter-vehicle trip swap
//! - [`solver`]: Configuration and the restart loop
//! - [`io`]: Request file parsing and itinerary formatting
//!
//! ## Example
//!
//! ```
//! use u_rideshare::models::{Problem, TripRequest};
//! use u_rideshare::{GraspConfig, GraspRunner};
//!
//! let problem = Problem::new(vec![
//!     TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).unwrap(),
//!     TripRequest::new("bob", 2, 485, 540, (25, 0), (100, 0)).unwrap(),
//! ]).unwrap();
//! let config = GraspConfig::default().with_capacity(2).with_iterations(5).with_seed(7);
//!
//! let result = GraspRunner::run(&problem, &config).unwrap();
//! assert!(result.best.violations(&problem).is_empty());
//! ```

pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod insertion;
pub mod io;
pub mod local_search;
pub mod models;
pub mod solver;

pub use error::{Result, RideShareError};
pub use models::Problem;
pub use solver::{GraspConfig, GraspResult, GraspRunner};
