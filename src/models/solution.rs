//! Solution and violation types.

use std::collections::BTreeMap;

use super::{Minutes, Problem, TripId, Vehicle};
use crate::evaluation::{Infeasibility, RouteEvaluator};

/// A type of constraint violation in a route or solution.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationType {
    /// Vehicle capacity exceeded.
    CapacityExceeded {
        /// Vehicle id.
        vehicle: usize,
        /// Stop index after which the load is too high.
        position: usize,
        /// Load that exceeded capacity.
        load: i32,
        /// Vehicle capacity.
        capacity: u32,
    },
    /// Stop serviced after its window closes.
    TimeWindowViolated {
        /// Vehicle id.
        vehicle: usize,
        /// Trip of the late stop.
        trip_id: TripId,
        /// Simulated service time.
        service_time: Minutes,
        /// Latest allowed service time.
        latest: Minutes,
    },
    /// A trip's dropoff is missing, duplicated, or precedes its pickup.
    PrecedenceViolated {
        /// Vehicle id.
        vehicle: usize,
        /// Offending trip.
        trip_id: TripId,
    },
    /// Stored service time or load differs from a fresh simulation.
    InconsistentSchedule {
        /// Vehicle id.
        vehicle: usize,
        /// First stop that disagrees.
        position: usize,
    },
    /// A vehicle without stops.
    EmptyRoute {
        /// Vehicle id.
        vehicle: usize,
    },
    /// A stop whose trip is not in the vehicle's servicing map or not part
    /// of the problem.
    UnlistedStop {
        /// Vehicle id.
        vehicle: usize,
        /// Trip of the stop.
        trip_id: TripId,
    },
    /// A request no vehicle serves.
    UnservedTrip {
        /// Unserved trip.
        trip_id: TripId,
    },
    /// A request served by more than one vehicle.
    DuplicateService {
        /// Trip served twice.
        trip_id: TripId,
    },
}

/// A constraint violation in a solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}

/// A complete assignment of requests to vehicles.
///
/// # Examples
///
/// ```
/// use u_rideshare::models::{Problem, Solution, TripRequest, Vehicle};
///
/// let problem = Problem::new(vec![
///     TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).unwrap(),
/// ]).unwrap();
/// let v = Vehicle::seeded(0, &problem.requests()[0], problem.matrix(), 3, 0.99).unwrap();
/// let sol = Solution::from_vehicles(vec![v]);
/// assert_eq!(sol.num_vehicles(), 1);
/// assert_eq!(sol.num_served(), 1);
/// assert!(sol.violations(&problem).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Solution {
    vehicles: Vec<Vehicle>,
}

impl Solution {
    /// Creates an empty solution.
    pub fn new() -> Self {
        Self {
            vehicles: Vec::new(),
        }
    }

    /// Wraps a vehicle list.
    pub fn from_vehicles(vehicles: Vec<Vehicle>) -> Self {
        Self { vehicles }
    }

    /// Returns the vehicles in this solution.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Returns a mutable reference to the vehicles.
    pub fn vehicles_mut(&mut self) -> &mut Vec<Vehicle> {
        &mut self.vehicles
    }

    /// Consumes the solution, returning its vehicles.
    pub fn into_vehicles(self) -> Vec<Vehicle> {
        self.vehicles
    }

    /// Number of vehicles used.
    pub fn num_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    /// Returns `true` if no vehicle is used.
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Sum of the cached route objectives.
    pub fn total_objective(&self) -> f64 {
        self.vehicles.iter().map(|v| v.objective()).sum()
    }

    /// Number of requests served across all vehicles.
    pub fn num_served(&self) -> usize {
        self.vehicles.iter().map(|v| v.servicing().len()).sum()
    }

    /// Checks every routing invariant against `problem`.
    ///
    /// Covers feasibility (capacity and time windows by re-simulation),
    /// agreement of the stored schedule with that simulation, pickup before
    /// dropoff, consistency between stops and servicing maps, and coverage
    /// of every request by exactly one vehicle.
    pub fn violations(&self, problem: &Problem) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut served: BTreeMap<TripId, usize> = BTreeMap::new();

        for vehicle in &self.vehicles {
            for &trip_id in vehicle.servicing().keys() {
                *served.entry(trip_id).or_default() += 1;
            }
            check_vehicle(vehicle, problem, &mut violations);
        }

        for (&trip_id, &count) in &served {
            if count > 1 {
                violations.push(Violation::new(ViolationType::DuplicateService { trip_id }));
            }
        }
        for request in problem.requests() {
            if !served.contains_key(&request.trip_id()) {
                violations.push(Violation::new(ViolationType::UnservedTrip {
                    trip_id: request.trip_id(),
                }));
            }
        }
        violations
    }
}

fn check_vehicle(vehicle: &Vehicle, problem: &Problem, violations: &mut Vec<Violation>) {
    let id = vehicle.id();
    let route = vehicle.route();
    let stops = route.stops();
    if stops.is_empty() {
        violations.push(Violation::new(ViolationType::EmptyRoute { vehicle: id }));
        return;
    }

    let mut unknown = false;
    for stop in stops {
        let trip_id = stop.trip_id();
        if !vehicle.serves(trip_id) || !problem.matrix().contains(trip_id) {
            violations.push(Violation::new(ViolationType::UnlistedStop {
                vehicle: id,
                trip_id,
            }));
            unknown |= !problem.matrix().contains(trip_id);
        }
    }

    for &trip_id in vehicle.servicing().keys() {
        let pickups = stops
            .iter()
            .filter(|s| s.trip_id() == trip_id && s.is_pickup())
            .count();
        let dropoffs = stops
            .iter()
            .filter(|s| s.trip_id() == trip_id && !s.is_pickup())
            .count();
        if pickups != 1 || dropoffs != 1 || route.positions_of(trip_id).is_none() {
            violations.push(Violation::new(ViolationType::PrecedenceViolated {
                vehicle: id,
                trip_id,
            }));
        }
    }
    if unknown {
        return;
    }

    let evaluator = RouteEvaluator::new(problem.matrix(), route.capacity());
    if let Err(infeasibility) = evaluator.check(stops) {
        let kind = match infeasibility {
            Infeasibility::Empty => ViolationType::EmptyRoute { vehicle: id },
            Infeasibility::CapacityExceeded {
                position,
                load,
                capacity,
            } => ViolationType::CapacityExceeded {
                vehicle: id,
                position,
                load,
                capacity,
            },
            Infeasibility::NegativeLoad { position } => ViolationType::PrecedenceViolated {
                vehicle: id,
                trip_id: stops[position].trip_id(),
            },
            Infeasibility::TimeWindowViolated {
                position,
                service_time,
                latest,
            } => ViolationType::TimeWindowViolated {
                vehicle: id,
                trip_id: stops[position].trip_id(),
                service_time,
                latest,
            },
        };
        violations.push(Violation::new(kind));
        return;
    }

    let mut simulated = stops.to_vec();
    if evaluator.propagate(&mut simulated, 0).is_ok() {
        if let Some(position) = simulated
            .iter()
            .zip(stops)
            .position(|(fresh, stored)| {
                fresh.service_time != stored.service_time || fresh.load != stored.load
            })
        {
            violations.push(Violation::new(ViolationType::InconsistentSchedule {
                vehicle: id,
                position,
            }));
        }
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}
