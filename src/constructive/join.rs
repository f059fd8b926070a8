//! Fleet reduction by chaining time-disjoint routes.

use crate::distance::TravelTimeMatrix;
use crate::models::{Solution, Vehicle};

/// Appends routes onto vehicles that finish before those routes begin.
///
/// Each vehicle is compared against every other surviving vehicle; on the
/// first pair where one route can precede the other (see
/// [`Route::can_precede`](crate::models::Route::can_precede)) the later
/// route is appended to the earlier vehicle and the later vehicle is
/// dropped. Survivors are renumbered `0..n` in their original order and
/// their objectives recomputed.
///
/// Returns the number of vehicles removed.
///
/// # Examples
///
/// ```
/// use u_rideshare::constructive::join_routes;
/// use u_rideshare::models::{Problem, Solution, TripRequest, Vehicle};
///
/// let problem = Problem::new(vec![
///     TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).unwrap(),
///     TripRequest::new("carol", 2, 600, 660, (100, 0), (100, 100)).unwrap(),
/// ]).unwrap();
/// let vehicles = problem
///     .requests()
///     .iter()
///     .enumerate()
///     .map(|(i, r)| Vehicle::seeded(i, r, problem.matrix(), 3, 0.99).unwrap())
///     .collect();
/// let mut solution = Solution::from_vehicles(vehicles);
///
/// assert_eq!(join_routes(&mut solution, problem.matrix(), 0.99), 1);
/// assert_eq!(solution.num_vehicles(), 1);
/// assert_eq!(solution.vehicles()[0].route().len(), 4);
/// ```
pub fn join_routes(solution: &mut Solution, matrix: &TravelTimeMatrix, alpha: f64) -> usize {
    let mut slots: Vec<Option<Vehicle>> = std::mem::take(solution.vehicles_mut())
        .into_iter()
        .map(Some)
        .collect();
    let mut joined = 0;

    for i in 0..slots.len() {
        for j in 0..slots.len() {
            if i == j {
                continue;
            }
            let (Some(vi), Some(vj)) = (&slots[i], &slots[j]) else {
                continue;
            };
            let (into, from) = if vi.route().can_precede(vj.route(), matrix) {
                (i, j)
            } else if vj.route().can_precede(vi.route(), matrix) {
                (j, i)
            } else {
                continue;
            };
            if let Some(absorbed) = slots[from].take() {
                if let Some(vehicle) = slots[into].as_mut() {
                    vehicle.absorb(absorbed, matrix);
                    joined += 1;
                }
            }
            break;
        }
    }

    let mut vehicles: Vec<Vehicle> = slots.into_iter().flatten().collect();
    for (id, vehicle) in vehicles.iter_mut().enumerate() {
        vehicle.set_id(id);
        vehicle.route_mut().calculate_objective(matrix, alpha);
    }
    *solution.vehicles_mut() = vehicles;
    joined
}
