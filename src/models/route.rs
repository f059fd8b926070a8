//! Vehicle route type.

use super::{Stop, TripId, TripRequest};
use crate::distance::TravelTimeMatrix;
use crate::evaluation::RouteEvaluator;

/// An ordered stop sequence driven by one vehicle.
///
/// Every accepted mutation leaves the route feasible: each trip appears as a
/// pickup followed later by its dropoff, service times respect every window
/// and never decrease, and the load stays within `0..=capacity`.
///
/// The cached objective is refreshed by [`Route::calculate_objective`];
/// [`Route::insert`], [`Route::remove`] and [`Route::append_route`] leave it
/// stale.
///
/// # Examples
///
/// ```
/// use u_rideshare::models::{Problem, Route, TripRequest};
///
/// let problem = Problem::new(vec![
///     TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).unwrap(),
///     TripRequest::new("bob", 2, 485, 540, (25, 0), (100, 0)).unwrap(),
/// ]).unwrap();
/// let (alice, bob) = (&problem.requests()[0], &problem.requests()[1]);
///
/// let mut route = Route::seeded(alice, problem.matrix(), 2).unwrap();
/// // pick Bob up right after Alice, drop him off right after that
/// assert!(route.insert(1, 1, bob, problem.matrix()));
/// assert_eq!(route.len(), 4);
/// assert!(route.calculate_objective(problem.matrix(), 0.99) > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Route {
    stops: Vec<Stop>,
    capacity: u32,
    objective: f64,
}

impl Route {
    /// Creates an empty route for a vehicle of the given capacity.
    pub fn new(capacity: u32) -> Self {
        Self {
            stops: Vec::new(),
            capacity,
            objective: 0.0,
        }
    }

    /// Creates a route serving a single request directly.
    ///
    /// Returns `None` if even the direct ride violates the request's windows
    /// or the capacity.
    pub fn seeded(request: &TripRequest, matrix: &TravelTimeMatrix, capacity: u32) -> Option<Self> {
        let mut route = Self::new(capacity);
        route.insert(0, 0, request, matrix).then_some(route)
    }

    /// Checks whether `stops` can be driven by a vehicle of `capacity`.
    pub fn can_traverse(stops: &[Stop], matrix: &TravelTimeMatrix, capacity: u32) -> bool {
        RouteEvaluator::new(matrix, capacity).can_traverse(stops)
    }

    /// Returns `true` if this route's own schedule is traversable.
    pub fn is_feasible(&self, matrix: &TravelTimeMatrix) -> bool {
        Self::can_traverse(&self.stops, matrix, self.capacity)
    }

    /// The ordered stops.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Number of stops (two per trip).
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns `true` if the route has no stops.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Passenger limit.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Cached objective from the last [`Route::calculate_objective`].
    pub fn objective(&self) -> f64 {
        self.objective
    }

    #[cfg(test)]
    pub(crate) fn stops_mut(&mut self) -> &mut Vec<Stop> {
        &mut self.stops
    }

    /// First stop, if any.
    pub fn first(&self) -> Option<&Stop> {
        self.stops.first()
    }

    /// Last stop, if any.
    pub fn last(&self) -> Option<&Stop> {
        self.stops.last()
    }

    /// Trip ids in pickup order.
    pub fn trip_ids(&self) -> Vec<TripId> {
        self.stops
            .iter()
            .filter(|s| s.is_pickup())
            .map(|s| s.trip_id())
            .collect()
    }

    /// Indices of the pickup and dropoff of `trip_id`.
    pub fn positions_of(&self, trip_id: TripId) -> Option<(usize, usize)> {
        let pickup = self
            .stops
            .iter()
            .position(|s| s.trip_id() == trip_id && s.is_pickup())?;
        let dropoff = self.stops[pickup + 1..]
            .iter()
            .position(|s| s.trip_id() == trip_id)?;
        Some((pickup, pickup + 1 + dropoff))
    }

    /// Inserts `request` with its pickup at index `a_idx` and its dropoff at
    /// index `b_idx + 1` of the sequence after the pickup went in.
    ///
    /// With `a_idx == b_idx` the dropoff immediately follows the pickup.
    /// Service times and loads are re-simulated from `a_idx`. If any stop
    /// downstream becomes late or the load exceeds capacity, both new stops
    /// are removed again, the schedule is restored, and `false` is returned.
    pub fn insert(
        &mut self,
        a_idx: usize,
        b_idx: usize,
        request: &TripRequest,
        matrix: &TravelTimeMatrix,
    ) -> bool {
        if a_idx > b_idx || b_idx > self.stops.len() {
            return false;
        }
        self.stops.insert(a_idx, Stop::new(request.source().clone()));
        self.stops
            .insert(b_idx + 1, Stop::new(request.destination().clone()));

        let evaluator = RouteEvaluator::new(matrix, self.capacity);
        if evaluator.propagate(&mut self.stops, a_idx).is_err() {
            self.stops.remove(b_idx + 1);
            self.stops.remove(a_idx);
            let restored = evaluator.propagate(&mut self.stops, a_idx);
            debug_assert!(restored.is_ok(), "rollback left an infeasible route");
            return false;
        }
        true
    }

    /// Removes the stops at `src_idx` and `dest_idx` (indices before
    /// removal) and re-simulates the schedule from `src_idx`.
    ///
    /// Removing a trip only makes the remaining stops earlier and lighter,
    /// so this cannot make a feasible route infeasible.
    ///
    /// # Panics
    ///
    /// Panics if `src_idx >= dest_idx` or `dest_idx` is out of bounds.
    pub fn remove(&mut self, src_idx: usize, dest_idx: usize, matrix: &TravelTimeMatrix) {
        assert!(
            src_idx < dest_idx && dest_idx < self.stops.len(),
            "invalid removal positions {src_idx}, {dest_idx} for {} stops",
            self.stops.len()
        );
        self.stops.remove(dest_idx);
        self.stops.remove(src_idx);
        let evaluator = RouteEvaluator::new(matrix, self.capacity);
        let ok = evaluator.propagate(&mut self.stops, src_idx);
        debug_assert!(ok.is_ok(), "removal left an infeasible route");
    }

    /// Removes both stops of `trip_id`. Returns `false` if the trip is not
    /// on this route.
    pub fn remove_trip(&mut self, trip_id: TripId, matrix: &TravelTimeMatrix) -> bool {
        match self.positions_of(trip_id) {
            Some((src, dest)) => {
                self.remove(src, dest, matrix);
                true
            }
            None => false,
        }
    }

    /// Appends `other`'s stops after this route's last stop and re-simulates
    /// the appended part.
    ///
    /// Meant for joining routes whose time spans do not overlap (see
    /// [`Route::can_precede`]); in that case the appended stops keep their
    /// service times.
    pub fn append_route(&mut self, other: &Route, matrix: &TravelTimeMatrix) {
        let start = self.stops.len();
        self.stops.extend(other.stops.iter().cloned());
        let evaluator = RouteEvaluator::new(matrix, self.capacity);
        let ok = evaluator.propagate(&mut self.stops, start);
        debug_assert!(ok.is_ok(), "appended route is not reachable in time");
    }

    /// Returns `true` if `other` can be driven after this route.
    ///
    /// This route must end before `other` begins, and the drive from the
    /// last stop to `other`'s first stop must fit between the last stop's
    /// latest time and `other`'s start. The appended schedule then keeps its
    /// service times even if this route's last stop slips to its latest.
    pub fn can_precede(&self, other: &Route, matrix: &TravelTimeMatrix) -> bool {
        match (self.last(), other.first()) {
            (Some(last), Some(first)) => {
                last.service_time < first.service_time
                    && last.latest() + matrix.travel_minutes(&last.node, &first.node)
                        <= first.service_time
            }
            _ => false,
        }
    }

    /// Recomputes service times and loads, then the savings objective.
    ///
    /// An untraversable schedule scores 0 and is left untouched.
    pub fn calculate_objective(&mut self, matrix: &TravelTimeMatrix, alpha: f64) -> f64 {
        let evaluator = RouteEvaluator::new(matrix, self.capacity);
        if evaluator.check(&self.stops).is_err() {
            self.objective = 0.0;
            return 0.0;
        }
        let ok = evaluator.propagate(&mut self.stops, 0);
        debug_assert!(ok.is_ok());
        self.objective = evaluator.route_objective(&self.stops, alpha);
        self.objective
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Minutes, Problem};

    const ALPHA: f64 = 0.99;

    fn setup() -> Problem {
        Problem::new(vec![
            TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).expect("valid"),
            TripRequest::new("bob", 2, 485, 540, (25, 0), (100, 0)).expect("valid"),
            TripRequest::new("carol", 3, 600, 660, (100, 0), (100, 100)).expect("valid"),
        ])
        .expect("problem")
    }

    fn order(route: &Route) -> Vec<(TripId, bool)> {
        route
            .stops()
            .iter()
            .map(|s| (s.trip_id(), s.is_pickup()))
            .collect()
    }

    fn times(route: &Route) -> Vec<Minutes> {
        route.stops().iter().map(|s| s.service_time).collect()
    }

    #[test]
    fn test_empty_route() {
        let r = Route::new(3);
        assert!(r.is_empty());
        assert_eq!(r.len(), 0);
        assert_eq!(r.capacity(), 3);
        assert_eq!(r.objective(), 0.0);
        assert!(r.first().is_none());
        assert!(r.trip_ids().is_empty());
    }

    #[test]
    fn test_seeded() {
        let p = setup();
        let r = Route::seeded(&p.requests()[0], p.matrix(), 1).expect("seed");
        assert_eq!(order(&r), vec![(1, true), (1, false)]);
        assert_eq!(times(&r), vec![480, 500]);
        assert_eq!(r.stops()[0].load, 1);
        assert_eq!(r.stops()[1].load, 0);
        assert!(r.is_feasible(p.matrix()));
    }

    #[test]
    fn test_insert_shared() {
        let p = setup();
        let mut r = Route::seeded(&p.requests()[0], p.matrix(), 2).expect("seed");
        assert!(r.insert(1, 1, &p.requests()[1], p.matrix()));
        assert_eq!(order(&r), vec![(1, true), (2, true), (2, false), (1, false)]);
        assert_eq!(times(&r), vec![480, 485, 500, 500]);
        let loads: Vec<i32> = r.stops().iter().map(|s| s.load).collect();
        assert_eq!(loads, vec![1, 2, 1, 0]);
        assert_eq!(r.positions_of(2), Some((1, 2)));
        assert_eq!(r.trip_ids(), vec![1, 2]);
    }

    #[test]
    fn test_insert_dropoff_later() {
        let p = setup();
        let mut r = Route::seeded(&p.requests()[0], p.matrix(), 2).expect("seed");
        // pickup after Alice's pickup, dropoff after Alice's dropoff
        assert!(r.insert(1, 2, &p.requests()[1], p.matrix()));
        assert_eq!(order(&r), vec![(1, true), (2, true), (1, false), (2, false)]);
    }

    #[test]
    fn test_insert_rolls_back_on_capacity() {
        let p = setup();
        let mut r = Route::seeded(&p.requests()[0], p.matrix(), 1).expect("seed");
        let before = r.stops().to_vec();
        assert!(!r.insert(1, 1, &p.requests()[1], p.matrix()));
        assert_eq!(r.stops(), &before[..]);
    }

    #[test]
    fn test_insert_rolls_back_on_time() {
        let p = setup();
        let mut r = Route::seeded(&p.requests()[2], p.matrix(), 3).expect("seed");
        let before = r.stops().to_vec();
        // Alice cannot be picked up after Carol's ride ends at 620
        assert!(!r.insert(2, 2, &p.requests()[0], p.matrix()));
        assert_eq!(r.stops(), &before[..]);
    }

    #[test]
    fn test_insert_invalid_positions() {
        let p = setup();
        let mut r = Route::seeded(&p.requests()[0], p.matrix(), 2).expect("seed");
        assert!(!r.insert(2, 1, &p.requests()[1], p.matrix()));
        assert!(!r.insert(0, 3, &p.requests()[1], p.matrix()));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn test_insert_then_remove_round_trip() {
        let p = setup();
        let mut r = Route::seeded(&p.requests()[0], p.matrix(), 2).expect("seed");
        let before = r.stops().to_vec();
        assert!(r.insert(1, 1, &p.requests()[1], p.matrix()));
        assert!(r.remove_trip(2, p.matrix()));
        assert_eq!(r.stops(), &before[..]);
        assert!(!r.remove_trip(2, p.matrix()));
    }

    #[test]
    fn test_remove_first_trip() {
        let p = setup();
        let mut r = Route::seeded(&p.requests()[0], p.matrix(), 2).expect("seed");
        assert!(r.insert(1, 1, &p.requests()[1], p.matrix()));
        r.remove(0, 3, p.matrix());
        assert_eq!(order(&r), vec![(2, true), (2, false)]);
        // Bob is now served directly from his own earliest pickup
        assert_eq!(times(&r), vec![485, 500]);
        assert_eq!(r.stops()[0].load, 1);
        assert!(r.is_feasible(p.matrix()));
    }

    #[test]
    #[should_panic(expected = "invalid removal positions")]
    fn test_remove_invalid_positions() {
        let p = setup();
        let mut r = Route::seeded(&p.requests()[0], p.matrix(), 2).expect("seed");
        r.remove(1, 0, p.matrix());
    }

    #[test]
    fn test_calculate_objective() {
        let p = setup();
        let mut r = Route::seeded(&p.requests()[0], p.matrix(), 2).expect("seed");
        assert!((r.calculate_objective(p.matrix(), ALPHA) - 0.01).abs() < 1e-10);
        assert!(r.insert(1, 1, &p.requests()[1], p.matrix()));
        let expected = (1.0 - ALPHA * (12.5 / 20.0)) + (1.0 - ALPHA * (7.5 / 15.0));
        assert!((r.calculate_objective(p.matrix(), ALPHA) - expected).abs() < 1e-10);
        assert!((r.objective() - expected).abs() < 1e-10);
    }

    #[test]
    fn test_can_precede_and_append() {
        let p = setup();
        let mut first = Route::seeded(&p.requests()[0], p.matrix(), 2).expect("seed");
        let second = Route::seeded(&p.requests()[2], p.matrix(), 2).expect("seed");
        // Alice arrives at (100,0) at 500, Carol starts there at 600
        assert!(first.can_precede(&second, p.matrix()));
        assert!(!second.can_precede(&first, p.matrix()));

        first.append_route(&second, p.matrix());
        assert_eq!(order(&first), vec![(1, true), (1, false), (3, true), (3, false)]);
        assert_eq!(times(&first), vec![480, 500, 600, 620]);
        assert!(first.is_feasible(p.matrix()));
        let objective = first.calculate_objective(p.matrix(), ALPHA);
        assert!((objective - 0.02).abs() < 1e-10);
    }

    #[test]
    fn test_can_traverse_static() {
        let p = setup();
        let r = Route::seeded(&p.requests()[0], p.matrix(), 1).expect("seed");
        assert!(Route::can_traverse(r.stops(), p.matrix(), 1));
        assert!(!Route::can_traverse(&[], p.matrix(), 1));
        let reversed: Vec<Stop> = r.stops().iter().rev().cloned().collect();
        assert!(!Route::can_traverse(&reversed, p.matrix(), 1));
    }
}
