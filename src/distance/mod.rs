//! Travel time matrix.
//!
//! Straight-line distances between trip endpoints, precomputed once per
//! request batch. Distances double as travel minutes.

mod matrix;

pub use matrix::{TravelTimeMatrix, PIXELS_PER_UNIT};
