//! Schedule simulation and cost evaluation.

use crate::distance::TravelTimeMatrix;
use crate::models::{Minutes, Node, Stop};

/// Why a stop sequence cannot be traversed.
#[derive(Debug, Clone, PartialEq)]
pub enum Infeasibility {
    /// There are no stops to traverse.
    Empty,
    /// Passengers aboard would exceed the vehicle capacity.
    CapacityExceeded {
        /// Index of the stop after which the load is too high.
        position: usize,
        /// Load after that stop.
        load: i32,
        /// Vehicle capacity.
        capacity: u32,
    },
    /// A dropoff precedes its pickup, driving the load below zero.
    NegativeLoad {
        /// Index of the offending stop.
        position: usize,
    },
    /// The stop would be serviced after its window closes.
    TimeWindowViolated {
        /// Index of the late stop.
        position: usize,
        /// Simulated service time.
        service_time: Minutes,
        /// Latest allowed service time.
        latest: Minutes,
    },
}

/// Simulates stop sequences forward in time and prices them.
///
/// This is the single feasibility oracle for routes: the vehicle starts at
/// the first stop's earliest time with one passenger aboard, travel between
/// stops is rounded up to whole minutes, early arrivals wait for the window
/// to open, and a late service or an over-capacity load rejects the
/// sequence.
///
/// # Examples
///
/// ```
/// use u_rideshare::models::{Problem, Route, TripRequest};
/// use u_rideshare::evaluation::RouteEvaluator;
///
/// let problem = Problem::new(vec![
///     TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).unwrap(),
/// ]).unwrap();
/// let route = Route::seeded(&problem.requests()[0], problem.matrix(), 1).unwrap();
///
/// let evaluator = RouteEvaluator::new(problem.matrix(), 1);
/// assert!(evaluator.can_traverse(route.stops()));
/// // riding alone: 1 - 0.99 * (20 / 20)
/// assert!((evaluator.route_objective(route.stops(), 0.99) - 0.01).abs() < 1e-10);
/// ```
pub struct RouteEvaluator<'a> {
    matrix: &'a TravelTimeMatrix,
    capacity: u32,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates an evaluator for vehicles of the given capacity.
    pub fn new(matrix: &'a TravelTimeMatrix, capacity: u32) -> Self {
        Self { matrix, capacity }
    }

    /// The matrix travel times are read from.
    pub fn matrix(&self) -> &'a TravelTimeMatrix {
        self.matrix
    }

    /// Vehicle capacity used for load checks.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    fn check_load(&self, position: usize, load: i32) -> Result<(), Infeasibility> {
        if load < 0 {
            return Err(Infeasibility::NegativeLoad { position });
        }
        if load > self.capacity as i32 {
            return Err(Infeasibility::CapacityExceeded {
                position,
                load,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Service time and load at the first stop of a sequence.
    fn begin(&self, first: &Node) -> Result<(Minutes, i32), Infeasibility> {
        let load = first.endpoint().load_delta();
        self.check_load(0, load)?;
        Ok((first.earliest(), load))
    }

    /// Service time and load at `to`, reached from `from` serviced at `time`.
    fn step(
        &self,
        position: usize,
        from: &Node,
        time: Minutes,
        load: i32,
        to: &Node,
    ) -> Result<(Minutes, i32), Infeasibility> {
        let load = load + to.endpoint().load_delta();
        self.check_load(position, load)?;
        let arrival = time + self.matrix.travel_minutes(from, to);
        let service_time = arrival.max(to.earliest());
        if service_time > to.latest() {
            return Err(Infeasibility::TimeWindowViolated {
                position,
                service_time,
                latest: to.latest(),
            });
        }
        Ok((service_time, load))
    }

    /// Simulates the whole sequence without modifying it.
    ///
    /// # Errors
    ///
    /// Returns the first [`Infeasibility`] encountered.
    pub fn check(&self, stops: &[Stop]) -> Result<(), Infeasibility> {
        let first = stops.first().ok_or(Infeasibility::Empty)?;
        let (mut time, mut load) = self.begin(&first.node)?;
        for (i, pair) in stops.windows(2).enumerate() {
            (time, load) = self.step(i + 1, &pair[0].node, time, load, &pair[1].node)?;
        }
        Ok(())
    }

    /// Returns `true` if the sequence satisfies every time window and the
    /// capacity.
    pub fn can_traverse(&self, stops: &[Stop]) -> bool {
        self.check(stops).is_ok()
    }

    /// Recomputes `service_time` and `load` for `stops[start..]`.
    ///
    /// Stops before `start` are taken as already scheduled. On error the
    /// stops from `start` up to the failing one have been overwritten, and
    /// the caller is expected to discard or repair the sequence.
    ///
    /// # Errors
    ///
    /// Returns the first [`Infeasibility`] encountered.
    pub fn propagate(&self, stops: &mut [Stop], start: usize) -> Result<(), Infeasibility> {
        if start >= stops.len() {
            return Ok(());
        }
        let (mut time, mut load) = if start == 0 {
            self.begin(&stops[0].node)?
        } else {
            (stops[start - 1].service_time, stops[start - 1].load)
        };
        if start == 0 {
            stops[0].service_time = time;
            stops[0].load = load;
        }
        for i in start.max(1)..stops.len() {
            (time, load) = self.step(i, &stops[i - 1].node, time, load, &stops[i].node)?;
            stops[i].service_time = time;
            stops[i].load = load;
        }
        Ok(())
    }

    /// Sum of edge travel time divided by the load carried on that edge,
    /// over the edges between `from` and `to`.
    ///
    /// Loads must already be scheduled (see [`RouteEvaluator::propagate`]).
    pub fn shared_cost(&self, stops: &[Stop], from: usize, to: usize) -> f64 {
        (from..to)
            .map(|k| {
                let edge = self.matrix.travel_time(&stops[k].node, &stops[k + 1].node);
                edge / f64::from(stops[k].load.max(1))
            })
            .sum()
    }

    /// Savings score of carrying the trip picked up at `pickup` and dropped
    /// off at `dropoff`: `1 - alpha * shared / private`, where `private` is
    /// the direct travel time between the two stops.
    pub fn trip_score(&self, stops: &[Stop], pickup: usize, dropoff: usize, alpha: f64) -> f64 {
        let shared = self.shared_cost(stops, pickup, dropoff);
        let private = self
            .matrix
            .travel_time(&stops[pickup].node, &stops[dropoff].node);
        savings(shared, private, alpha)
    }

    /// Sum of [`RouteEvaluator::trip_score`] over every trip in the sequence.
    ///
    /// Loads must already be scheduled. A pickup whose dropoff is missing
    /// contributes nothing.
    pub fn route_objective(&self, stops: &[Stop], alpha: f64) -> f64 {
        stops
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_pickup())
            .filter_map(|(i, s)| {
                let trip = s.trip_id();
                let j = (i + 1..stops.len()).find(|&j| stops[j].trip_id() == trip)?;
                Some(self.trip_score(stops, i, j, alpha))
            })
            .sum()
    }
}

/// `1 - alpha * shared / private`.
///
/// Co-located endpoints have no private cost; they are priced as if the
/// trip were one unit long.
pub fn savings(shared: f64, private: f64, alpha: f64) -> f64 {
    let private = if private > 0.0 { private } else { 1.0 };
    1.0 - alpha * (shared / private)
}
