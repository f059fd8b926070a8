//! Vehicle type: a route plus the requests it serves.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Route, TripId, TripRequest};
use crate::distance::TravelTimeMatrix;

/// A vehicle driving one route.
///
/// The servicing map shares the requests with the problem batch; the vehicle
/// owns only its route.
///
/// # Examples
///
/// ```
/// use u_rideshare::models::{Problem, TripRequest, Vehicle};
///
/// let problem = Problem::new(vec![
///     TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).unwrap(),
/// ]).unwrap();
/// let v = Vehicle::seeded(0, &problem.requests()[0], problem.matrix(), 3, 0.99).unwrap();
/// assert_eq!(v.id(), 0);
/// assert!(v.serves(1));
/// assert_eq!(v.route().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Vehicle {
    id: usize,
    route: Route,
    servicing: BTreeMap<TripId, Arc<TripRequest>>,
}

impl Vehicle {
    /// Creates an idle vehicle with an empty route.
    pub fn new(id: usize, capacity: u32) -> Self {
        Self {
            id,
            route: Route::new(capacity),
            servicing: BTreeMap::new(),
        }
    }

    /// Creates a vehicle whose route drives `request` directly, with its
    /// objective computed.
    ///
    /// Returns `None` if the direct ride is infeasible.
    pub fn seeded(
        id: usize,
        request: &Arc<TripRequest>,
        matrix: &TravelTimeMatrix,
        capacity: u32,
        alpha: f64,
    ) -> Option<Self> {
        let mut route = Route::seeded(request, matrix, capacity)?;
        route.calculate_objective(matrix, alpha);
        let mut vehicle = Self::new(id, capacity);
        vehicle.route = route;
        vehicle.serve(Arc::clone(request));
        Some(vehicle)
    }

    /// Vehicle number, sequential within a solution.
    pub fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    /// The route this vehicle drives.
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Mutable access to the route.
    pub fn route_mut(&mut self) -> &mut Route {
        &mut self.route
    }

    /// Replaces the route, e.g. with a modified clone.
    pub fn set_route(&mut self, route: Route) {
        self.route = route;
    }

    /// Requests served, keyed by trip id.
    pub fn servicing(&self) -> &BTreeMap<TripId, Arc<TripRequest>> {
        &self.servicing
    }

    /// Returns `true` if `trip_id` is served by this vehicle.
    pub fn serves(&self, trip_id: TripId) -> bool {
        self.servicing.contains_key(&trip_id)
    }

    /// Served trip ids in ascending order.
    pub fn trip_ids(&self) -> Vec<TripId> {
        self.servicing.keys().copied().collect()
    }

    /// Records `request` as served. Does not touch the route.
    pub fn serve(&mut self, request: Arc<TripRequest>) {
        self.servicing.insert(request.trip_id(), request);
    }

    /// Forgets `trip_id`, returning its request. Does not touch the route.
    pub fn release(&mut self, trip_id: TripId) -> Option<Arc<TripRequest>> {
        self.servicing.remove(&trip_id)
    }

    /// Appends `other`'s route and takes over its requests.
    ///
    /// The caller checks [`Route::can_precede`] first.
    pub fn absorb(&mut self, other: Vehicle, matrix: &TravelTimeMatrix) {
        self.route.append_route(&other.route, matrix);
        self.servicing.extend(other.servicing);
    }

    /// Cached objective of the route.
    pub fn objective(&self) -> f64 {
        self.route.objective()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Problem;

    fn setup() -> Problem {
        Problem::new(vec![
            TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).expect("valid"),
            TripRequest::new("carol", 3, 600, 660, (100, 0), (100, 100)).expect("valid"),
        ])
        .expect("problem")
    }

    #[test]
    fn test_new_vehicle() {
        let v = Vehicle::new(4, 3);
        assert_eq!(v.id(), 4);
        assert!(v.route().is_empty());
        assert_eq!(v.route().capacity(), 3);
        assert!(v.servicing().is_empty());
        assert_eq!(v.objective(), 0.0);
    }

    #[test]
    fn test_seeded_vehicle() {
        let p = setup();
        let v = Vehicle::seeded(0, &p.requests()[0], p.matrix(), 2, 0.99).expect("seed");
        assert_eq!(v.trip_ids(), vec![1]);
        assert!((v.objective() - 0.01).abs() < 1e-10);
        assert_eq!(v.servicing()[&1].requester(), "alice");
    }

    #[test]
    fn test_serve_and_release() {
        let p = setup();
        let mut v = Vehicle::new(0, 2);
        v.serve(Arc::clone(&p.requests()[1]));
        assert!(v.serves(3));
        let released = v.release(3).expect("served");
        assert_eq!(released.trip_id(), 3);
        assert!(!v.serves(3));
        assert!(v.release(3).is_none());
    }

    #[test]
    fn test_absorb() {
        let p = setup();
        let mut first = Vehicle::seeded(0, &p.requests()[0], p.matrix(), 2, 0.99).expect("seed");
        let second = Vehicle::seeded(1, &p.requests()[1], p.matrix(), 2, 0.99).expect("seed");
        assert!(first.route().can_precede(second.route(), p.matrix()));
        first.absorb(second, p.matrix());
        assert_eq!(first.trip_ids(), vec![1, 3]);
        assert_eq!(first.route().len(), 4);
        assert!(first.route().is_feasible(p.matrix()));
    }

    #[test]
    fn test_set_id() {
        let mut v = Vehicle::new(7, 1);
        v.set_id(2);
        assert_eq!(v.id(), 2);
    }
}
