//! Randomized greedy construction (one GRASP iteration).
//!
//! # Algorithm
//!
//! Vehicles are filled one at a time. Each new vehicle is seeded with the
//! unserved request whose pickup opens earliest. Then, repeatedly, every
//! unserved request is scored by [`greedy_delay`] against the current
//! route, one is drawn uniformly from the best `gamma` percent, and the
//! candidate generator tries to insert it with the `beta`-bounded
//! restricted candidate list. Requests that do not fit are deferred to the
//! next vehicle. Finally [`join_routes`] chains vehicles whose schedules do
//! not overlap in time.
//!
//! Every new vehicle consumes at least its seed request, so construction
//! always terminates.
//!
//! # Complexity
//!
//! O(n² · r) candidate evaluations per vehicle, where r is the route length.

use rand::Rng;
use std::sync::Arc;

use super::join_routes;
use crate::error::{RideShareError, Result};
use crate::insertion::{greedy_delay, rcl_window, CandidateGenerator};
use crate::models::{Problem, Solution, TripRequest, Vehicle};
use crate::solver::GraspConfig;

/// Builds a complete solution for `problem` with randomized greedy
/// insertion.
///
/// # Errors
///
/// Returns [`RideShareError::UnroutableRequest`] if a request cannot even
/// seed an otherwise empty vehicle.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use u_rideshare::constructive::grasp_construct;
/// use u_rideshare::models::{Problem, TripRequest};
/// use u_rideshare::GraspConfig;
///
/// let problem = Problem::new(vec![
///     TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).unwrap(),
///     TripRequest::new("bob", 2, 485, 540, (25, 0), (100, 0)).unwrap(),
/// ]).unwrap();
/// let config = GraspConfig::default().with_capacity(2);
/// let mut rng = StdRng::seed_from_u64(42);
///
/// let solution = grasp_construct(&problem, &config, &mut rng).unwrap();
/// assert_eq!(solution.num_served(), 2);
/// assert!(solution.violations(&problem).is_empty());
/// ```
pub fn grasp_construct<R: Rng>(
    problem: &Problem,
    config: &GraspConfig,
    rng: &mut R,
) -> Result<Solution> {
    let matrix = problem.matrix();
    let generator = CandidateGenerator::new(matrix, config.alpha);

    // latest pickup first, so the earliest is popped from the back
    let mut unserved: Vec<Arc<TripRequest>> = problem.requests().to_vec();
    sort_by_pickup_desc(&mut unserved);
    let mut deferred: Vec<Arc<TripRequest>> = Vec::new();
    let mut vehicles: Vec<Vehicle> = Vec::new();

    while let Some(seed) = unserved.pop() {
        let mut vehicle = Vehicle::seeded(
            vehicles.len(),
            &seed,
            matrix,
            config.capacity,
            config.alpha,
        )
        .ok_or(RideShareError::UnroutableRequest {
            trip_id: seed.trip_id(),
        })?;

        while !unserved.is_empty() {
            let mut ranked: Vec<(f64, usize)> = unserved
                .iter()
                .enumerate()
                .map(|(i, r)| (greedy_delay(vehicle.route(), r, matrix), i))
                .collect();
            ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
            let window = rcl_window(ranked.len(), config.gamma);
            let (_, picked) = ranked[rng.random_range(0..window)];
            let request = unserved.swap_remove(picked);

            if generator.insert_semi_greedy(vehicle.route_mut(), &request, config.beta, rng) {
                vehicle.serve(request);
            } else {
                deferred.push(request);
            }
        }

        vehicle
            .route_mut()
            .calculate_objective(matrix, config.alpha);
        tracing::trace!(
            vehicle = vehicle.id(),
            trips = vehicle.servicing().len(),
            deferred = deferred.len(),
            "vehicle filled"
        );
        vehicles.push(vehicle);

        unserved.append(&mut deferred);
        sort_by_pickup_desc(&mut unserved);
    }

    let mut solution = Solution::from_vehicles(vehicles);
    join_routes(&mut solution, matrix, config.alpha);
    Ok(solution)
}

fn sort_by_pickup_desc(requests: &mut [Arc<TripRequest>]) {
    requests.sort_by(|a, b| {
        b.source()
            .earliest()
            .cmp(&a.source().earliest())
            .then(b.trip_id().cmp(&a.trip_id()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(capacity: u32) -> GraspConfig {
        GraspConfig::default().with_capacity(capacity)
    }

    #[test]
    fn test_single_request() {
        let p = Problem::new(vec![
            TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).expect("valid"),
        ])
        .expect("problem");
        let mut rng = StdRng::seed_from_u64(1);
        let sol = grasp_construct(&p, &config(1), &mut rng).expect("construct");
        assert_eq!(sol.num_vehicles(), 1);
        let stops = sol.vehicles()[0].route().stops();
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].service_time, 480);
    }

    #[test]
    fn test_empty_problem() {
        let p = Problem::new(Vec::new()).expect("problem");
        let mut rng = StdRng::seed_from_u64(1);
        let sol = grasp_construct(&p, &config(3), &mut rng).expect("construct");
        assert!(sol.is_empty());
    }

    #[test]
    fn test_shared_ride() {
        let p = Problem::new(vec![
            TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).expect("valid"),
            TripRequest::new("bob", 2, 485, 540, (25, 0), (100, 0)).expect("valid"),
        ])
        .expect("problem");
        let mut rng = StdRng::seed_from_u64(3);
        let sol = grasp_construct(&p, &config(2), &mut rng).expect("construct");
        assert_eq!(sol.num_vehicles(), 1);
        assert_eq!(sol.vehicles()[0].route().len(), 4);
        assert!(sol.total_objective() > 0.0);
        assert!(sol.violations(&p).is_empty());
    }

    #[test]
    fn test_conflicting_requests_split() {
        // same place and time, one seat
        let p = Problem::new(vec![
            TripRequest::new("alice", 1, 480, 500, (0, 0), (100, 0)).expect("valid"),
            TripRequest::new("bob", 2, 480, 500, (0, 0), (100, 0)).expect("valid"),
        ])
        .expect("problem");
        let mut rng = StdRng::seed_from_u64(5);
        let sol = grasp_construct(&p, &config(1), &mut rng).expect("construct");
        assert_eq!(sol.num_vehicles(), 2);
        assert!(sol.violations(&p).is_empty());
        let ids: Vec<usize> = sol.vehicles().iter().map(|v| v.id()).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_many_requests_covered() {
        let requests = (1..=12)
            .map(|i| {
                let x = (i as i32 * 37) % 200;
                let y = (i as i32 * 53) % 200;
                let start = 480 + (i as i64 % 4) * 30;
                TripRequest::new(format!("r{i}"), i, start, start + 120, (x, y), (y, x))
                    .expect("valid")
            })
            .collect();
        let p = Problem::new(requests).expect("problem");
        let mut rng = StdRng::seed_from_u64(11);
        let sol = grasp_construct(&p, &config(3), &mut rng).expect("construct");
        assert_eq!(sol.num_served(), 12);
        assert!(sol.violations(&p).is_empty());
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let p = Problem::new(vec![
            TripRequest::new("a", 1, 480, 560, (0, 0), (100, 0)).expect("valid"),
            TripRequest::new("b", 2, 485, 560, (25, 0), (100, 40)).expect("valid"),
            TripRequest::new("c", 3, 490, 600, (50, 50), (0, 100)).expect("valid"),
        ])
        .expect("problem");
        let a = grasp_construct(&p, &config(2), &mut StdRng::seed_from_u64(9)).expect("a");
        let b = grasp_construct(&p, &config(2), &mut StdRng::seed_from_u64(9)).expect("b");
        assert_eq!(a.total_objective(), b.total_objective());
        assert_eq!(a.num_vehicles(), b.num_vehicles());
    }
}
