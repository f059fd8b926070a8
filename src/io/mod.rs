//! Request file input and itinerary output.
//!
//! - [`parse_requests`] / [`read_requests`]: Tab-separated request files
//! - [`format_itinerary`] / [`Itinerary`]: Per-vehicle text schedules
//! - [`SolutionSummary`]: Serializable run outcome

mod itinerary;
mod parser;

pub use itinerary::{format_itinerary, Itinerary, SolutionSummary, StopSummary, VehicleSummary};
pub use parser::{format_clock, parse_clock, parse_requests, read_requests};
