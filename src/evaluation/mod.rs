//! Route feasibility and objective evaluation.
//!
//! [`RouteEvaluator`] is the one place where a stop sequence is simulated:
//! routes, the candidate generator and solution validation all go through it.

mod evaluator;

pub use evaluator::{savings, Infeasibility, RouteEvaluator};
