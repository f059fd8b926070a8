//! Inter-vehicle trip swap operator.
//!
//! # Algorithm
//!
//! Picks two distinct vehicles and one trip from each at random, removes
//! both trips, and reinserts each into the other vehicle's route at the
//! position maximizing that route's objective. The move is committed only
//! if both reinsertions are feasible. Time-disjoint routes are joined
//! afterwards.
//!
//! # Complexity
//!
//! O(r³) per move where r = route length (all anchor pairs, each simulated).

use std::sync::Arc;

use rand::Rng;

use crate::constructive::join_routes;
use crate::distance::TravelTimeMatrix;
use crate::insertion::CandidateGenerator;
use crate::models::{Route, Solution, TripId, TripRequest, Vehicle};

/// Attempts one random trip swap between two vehicles.
///
/// Returns the resulting solution. Whenever a swap was attempted, the
/// result is passed through [`join_routes`] once, whether or not the swap
/// was feasible; otherwise the input comes back unchanged. Whether the
/// result is an improvement is left to the caller.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use u_rideshare::local_search::swap_trips;
/// use u_rideshare::models::{Problem, Solution, TripRequest, Vehicle};
///
/// let problem = Problem::new(vec![
///     TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).unwrap(),
///     TripRequest::new("bob", 2, 480, 540, (0, 100), (100, 100)).unwrap(),
/// ]).unwrap();
/// let vehicles = problem
///     .requests()
///     .iter()
///     .enumerate()
///     .map(|(i, r)| Vehicle::seeded(i, r, problem.matrix(), 1, 0.99).unwrap())
///     .collect();
/// let solution = Solution::from_vehicles(vehicles);
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let next = swap_trips(&solution, problem.matrix(), 0.99, &mut rng);
/// assert_eq!(next.num_served(), 2);
/// assert!(next.violations(&problem).is_empty());
/// ```
pub fn swap_trips<R: Rng>(
    solution: &Solution,
    matrix: &TravelTimeMatrix,
    alpha: f64,
    rng: &mut R,
) -> Solution {
    let n = solution.num_vehicles();
    if n < 2 {
        return solution.clone();
    }

    let (a, b) = pick_two(n, rng);
    let vehicles = solution.vehicles();
    let (Some(trip_a), Some(trip_b)) = (
        pick_trip(&vehicles[a], rng),
        pick_trip(&vehicles[b], rng),
    ) else {
        return solution.clone();
    };
    let request_a = Arc::clone(&vehicles[a].servicing()[&trip_a]);
    let request_b = Arc::clone(&vehicles[b].servicing()[&trip_b]);

    let mut route_a = vehicles[a].route().clone();
    let mut route_b = vehicles[b].route().clone();
    route_a.remove_trip(trip_a, matrix);
    route_b.remove_trip(trip_b, matrix);

    let generator = CandidateGenerator::new(matrix, alpha);
    let mut next = solution.clone();
    match (
        generator.best_insertion(&route_b, &request_a),
        generator.best_insertion(&route_a, &request_b),
    ) {
        (Some(new_b), Some(new_a)) => {
            commit(&mut next.vehicles_mut()[a], new_a, trip_a, request_b);
            commit(&mut next.vehicles_mut()[b], new_b, trip_b, request_a);
            tracing::trace!(
                vehicle_a = a,
                vehicle_b = b,
                trip_a,
                trip_b,
                "swap committed"
            );
        }
        _ => tracing::trace!(trip_a, trip_b, "swap infeasible"),
    }

    join_routes(&mut next, matrix, alpha);
    next
}

fn pick_two<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    if n == 2 {
        return (0, 1);
    }
    let a = rng.random_range(0..n);
    let mut b = rng.random_range(0..n);
    while b == a {
        b = rng.random_range(0..n);
    }
    (a, b)
}

fn pick_trip<R: Rng>(vehicle: &Vehicle, rng: &mut R) -> Option<TripId> {
    let ids = vehicle.trip_ids();
    if ids.is_empty() {
        return None;
    }
    Some(ids[rng.random_range(0..ids.len())])
}

fn commit(vehicle: &mut Vehicle, route: Route, released: TripId, served: Arc<TripRequest>) {
    vehicle.set_route(route);
    vehicle.release(released);
    vehicle.serve(served);
}
