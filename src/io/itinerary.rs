//! Human-readable itineraries and a serializable run summary.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::format_clock;
use crate::models::{Endpoint, Minutes, Solution, TripId, Vehicle};
use crate::solver::GraspResult;

/// Displays a vehicle's schedule.
///
/// ```text
/// Itinerary for vehicle 0:
/// Objective: 0.01
/// 8:00 Pickup alice from 1_S(Earliest pickup 8:00)
/// 8:20 Dropoff alice at 1_D(Latest arrival 9:00)
/// ```
pub struct Itinerary<'a>(pub &'a Vehicle);

impl fmt::Display for Itinerary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vehicle = self.0;
        writeln!(f, "Itinerary for vehicle {}:", vehicle.id())?;
        writeln!(f, "Objective: {}", vehicle.objective())?;
        for stop in vehicle.route().stops() {
            let requester = vehicle
                .servicing()
                .get(&stop.trip_id())
                .map_or("?", |r| r.requester());
            let time = format_clock(stop.service_time);
            match stop.endpoint() {
                Endpoint::Pickup => writeln!(
                    f,
                    "{time} Pickup {requester} from {}_S(Earliest pickup {})",
                    stop.trip_id(),
                    format_clock(stop.earliest())
                )?,
                Endpoint::Dropoff => writeln!(
                    f,
                    "{time} Dropoff {requester} at {}_D(Latest arrival {})",
                    stop.trip_id(),
                    format_clock(stop.latest())
                )?,
            }
        }
        Ok(())
    }
}

/// Formats every vehicle's itinerary, separated by blank lines.
///
/// # Examples
///
/// ```
/// use u_rideshare::io::format_itinerary;
/// use u_rideshare::models::{Problem, Solution, TripRequest, Vehicle};
///
/// let problem = Problem::new(vec![
///     TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).unwrap(),
/// ]).unwrap();
/// let v = Vehicle::seeded(0, &problem.requests()[0], problem.matrix(), 1, 0.99).unwrap();
/// let text = format_itinerary(&Solution::from_vehicles(vec![v]));
/// assert!(text.starts_with("Itinerary for vehicle 0:\n"));
/// assert!(text.contains("8:00 Pickup alice from 1_S(Earliest pickup 8:00)"));
/// assert!(text.contains("8:20 Dropoff alice at 1_D(Latest arrival 9:00)"));
/// ```
pub fn format_itinerary(solution: &Solution) -> String {
    solution
        .vehicles()
        .iter()
        .map(|v| Itinerary(v).to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// One scheduled stop in a [`SolutionSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopSummary {
    /// Service time as `H:mm`.
    pub time: String,
    /// Service time in minutes since midnight.
    pub minutes: Minutes,
    /// Pickup or dropoff.
    pub kind: Endpoint,
    /// Trip served.
    pub trip_id: TripId,
    /// Rider of the trip.
    pub requester: String,
    /// Passengers aboard after the stop.
    pub load: i32,
}

/// One vehicle in a [`SolutionSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSummary {
    /// Vehicle number.
    pub id: usize,
    /// Route objective.
    pub objective: f64,
    /// Ordered stops.
    pub stops: Vec<StopSummary>,
}

/// Machine-readable outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionSummary {
    /// Total objective.
    pub objective: f64,
    /// Restarts completed.
    pub iterations: usize,
    /// Seed of the run.
    pub seed: u64,
    /// Vehicles used.
    pub vehicles: Vec<VehicleSummary>,
}

impl SolutionSummary {
    /// Summarizes a solver result.
    pub fn from_result(result: &GraspResult) -> Self {
        let vehicles = result
            .best
            .vehicles()
            .iter()
            .map(|v| VehicleSummary {
                id: v.id(),
                objective: v.objective(),
                stops: v
                    .route()
                    .stops()
                    .iter()
                    .map(|s| StopSummary {
                        time: format_clock(s.service_time),
                        minutes: s.service_time,
                        kind: s.endpoint(),
                        trip_id: s.trip_id(),
                        requester: v
                            .servicing()
                            .get(&s.trip_id())
                            .map(|r| r.requester().to_string())
                            .unwrap_or_default(),
                        load: s.load,
                    })
                    .collect(),
            })
            .collect();
        Self {
            objective: result.best_objective,
            iterations: result.iterations,
            seed: result.seed,
            vehicles,
        }
    }
}
