//! Insertion candidate generation.
//!
//! - [`CandidateGenerator`]: Restricted candidate list over pickup/dropoff
//!   anchor pairs, with semi-greedy and exhaustive selection
//! - [`greedy_delay`]: Priority of an unserved request for a route

mod candidates;

pub(crate) use candidates::rcl_window;
pub use candidates::{
    dest_delay, greedy_delay, source_delay, CandidateGenerator, InsertionCandidate,
};
