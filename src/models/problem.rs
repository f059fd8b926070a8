//! Ride-sharing problem instance.

use std::collections::HashMap;
use std::sync::Arc;

use super::{Solution, TripId, TripRequest, Violation};
use crate::distance::TravelTimeMatrix;
use crate::error::Result;

/// A validated request batch together with its travel time matrix.
///
/// Construction sorts the requests by trip id, builds the matrix, and
/// derives each request's pickup-latest and dropoff-earliest bounds from
/// its direct travel time. Solvers only ever see requests in that state.
///
/// # Examples
///
/// ```
/// use u_rideshare::models::{Problem, TripRequest};
///
/// let problem = Problem::new(vec![
///     TripRequest::new("bob", 2, 485, 540, (25, 0), (100, 0)).unwrap(),
///     TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).unwrap(),
/// ]).unwrap();
/// assert_eq!(problem.len(), 2);
/// assert_eq!(problem.requests()[0].trip_id(), 1);
/// // 100 pixels take 20 minutes
/// assert_eq!(problem.requests()[0].source().latest(), 520);
/// assert_eq!(problem.request(2).unwrap().requester(), "bob");
/// ```
#[derive(Debug, Clone)]
pub struct Problem {
    requests: Vec<Arc<TripRequest>>,
    matrix: TravelTimeMatrix,
    index: HashMap<TripId, usize>,
}

impl Problem {
    /// Validates the batch and prepares it for solving.
    ///
    /// # Errors
    ///
    /// - [`RideShareError::InvalidRequest`](crate::RideShareError::InvalidRequest)
    ///   for a malformed request
    /// - [`RideShareError::DuplicateTrip`](crate::RideShareError::DuplicateTrip)
    ///   if two requests share an id
    /// - [`RideShareError::UnroutableRequest`](crate::RideShareError::UnroutableRequest)
    ///   if a request cannot be driven directly within its window
    pub fn new(mut requests: Vec<TripRequest>) -> Result<Self> {
        for request in &requests {
            request.validate()?;
        }
        requests.sort_by_key(|r| r.trip_id());
        let matrix = TravelTimeMatrix::from_requests(&requests)?;
        for request in &mut requests {
            request.derive_windows(&matrix)?;
        }

        let index = requests
            .iter()
            .enumerate()
            .map(|(i, r)| (r.trip_id(), i))
            .collect();
        let requests = requests.into_iter().map(Arc::new).collect();
        Ok(Self {
            requests,
            matrix,
            index,
        })
    }

    /// Requests sorted by trip id.
    pub fn requests(&self) -> &[Arc<TripRequest>] {
        &self.requests
    }

    /// The shared travel time matrix.
    pub fn matrix(&self) -> &TravelTimeMatrix {
        &self.matrix
    }

    /// Looks up a request by trip id.
    pub fn request(&self, trip_id: TripId) -> Option<&Arc<TripRequest>> {
        self.index.get(&trip_id).map(|&i| &self.requests[i])
    }

    /// Number of requests.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Returns `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Evaluates a solution, returning `(total objective, violations)`.
    ///
    /// A feasible solution has an empty violations list.
    pub fn evaluate(&self, solution: &Solution) -> (f64, Vec<Violation>) {
        (solution.total_objective(), solution.violations(self))
    }
}
