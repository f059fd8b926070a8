//! Local search operators for improving ride-sharing solutions.
//!
//! - [`swap_trips`]: Inter-vehicle exchange of one trip each, reinserted
//!   at the best position

mod swap;

pub use swap::swap_trips;
