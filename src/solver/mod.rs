//! GRASP solver: configuration and the restart loop.
//!
//! - [`GraspConfig`]: Validated, serializable run parameters
//! - [`GraspRunner`]: Construction restarts plus swap local search,
//!   keeping the best solution by total objective

mod config;
mod runner;

pub use config::{GraspConfig, DEFAULT_ALPHA};
pub use runner::{GraspResult, GraspRunner};
