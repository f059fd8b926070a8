//! Dense travel time matrix over trip endpoints.

use std::collections::HashMap;

use crate::error::{RideShareError, Result};
use crate::models::{Endpoint, Minutes, Node, TripId, TripRequest};

/// Pixels per distance unit. One distance unit is also one travel minute.
pub const PIXELS_PER_UNIT: f64 = 5.0;

/// All-pairs travel times between every pickup and dropoff of a request batch.
///
/// Stored as a dense `2N × 2N` row-major table: rows/columns `0..N` are the
/// pickups of the id-sorted requests and `N..2N` their dropoffs, giving the
/// four quadrants pickup–pickup, pickup–dropoff, dropoff–pickup and
/// dropoff–dropoff. The matrix is immutable after construction.
///
/// # Examples
///
/// ```
/// use u_rideshare::models::TripRequest;
/// use u_rideshare::distance::TravelTimeMatrix;
///
/// let requests = vec![
///     TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).unwrap(),
///     TripRequest::new("bob", 2, 480, 540, (0, 50), (30, 90)).unwrap(),
/// ];
/// let m = TravelTimeMatrix::from_requests(&requests).unwrap();
/// assert_eq!(m.size(), 4);
/// let t = m.travel_time(requests[0].source(), requests[0].destination());
/// assert!((t - 20.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct TravelTimeMatrix {
    data: Vec<f64>,
    size: usize,
    index: HashMap<TripId, usize>,
}

impl TravelTimeMatrix {
    /// Builds the matrix from a request batch in O(N²).
    ///
    /// # Errors
    ///
    /// Returns [`RideShareError::DuplicateTrip`] if two requests share an id.
    pub fn from_requests(requests: &[TripRequest]) -> Result<Self> {
        let mut sorted: Vec<&TripRequest> = requests.iter().collect();
        sorted.sort_by_key(|r| r.trip_id());

        let n = sorted.len();
        let mut index = HashMap::with_capacity(n);
        for (i, request) in sorted.iter().enumerate() {
            if index.insert(request.trip_id(), i).is_some() {
                return Err(RideShareError::DuplicateTrip {
                    trip_id: request.trip_id(),
                });
            }
        }

        let nodes: Vec<&Node> = sorted
            .iter()
            .map(|r| r.source())
            .chain(sorted.iter().map(|r| r.destination()))
            .collect();

        let size = 2 * n;
        let mut data = vec![0.0; size * size];
        for i in 0..size {
            for j in (i + 1)..size {
                let d = nodes[i].distance_to(nodes[j]);
                data[i * size + j] = d;
                data[j * size + i] = d;
            }
        }

        Ok(Self { data, size, index })
    }

    fn slot(&self, node: &Node) -> Option<usize> {
        let i = *self.index.get(&node.trip_id())?;
        Some(match node.endpoint() {
            Endpoint::Pickup => i,
            Endpoint::Dropoff => self.size / 2 + i,
        })
    }

    /// Travel time (equivalently distance) from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if either node belongs to a trip that was not part of the batch.
    pub fn travel_time(&self, from: &Node, to: &Node) -> f64 {
        match self.try_travel_time(from, to) {
            Ok(t) => t,
            Err(e) => panic!("{e}"),
        }
    }

    /// Fallible variant of [`TravelTimeMatrix::travel_time`].
    ///
    /// # Errors
    ///
    /// Returns [`RideShareError::UnknownTrip`] for unknown trip ids.
    pub fn try_travel_time(&self, from: &Node, to: &Node) -> Result<f64> {
        let unknown = |node: &Node| RideShareError::UnknownTrip {
            trip_id: node.trip_id(),
        };
        let i = self.slot(from).ok_or_else(|| unknown(from))?;
        let j = self.slot(to).ok_or_else(|| unknown(to))?;
        Ok(self.data[i * self.size + j])
    }

    /// Travel time rounded up to whole minutes.
    ///
    /// # Panics
    ///
    /// Panics on unknown trip ids, like [`TravelTimeMatrix::travel_time`].
    pub fn travel_minutes(&self, from: &Node, to: &Node) -> Minutes {
        self.travel_time(from, to).ceil() as Minutes
    }

    /// Fallible variant of [`TravelTimeMatrix::travel_minutes`].
    pub fn try_travel_minutes(&self, from: &Node, to: &Node) -> Result<Minutes> {
        Ok(self.try_travel_time(from, to)?.ceil() as Minutes)
    }

    /// Returns `true` if the trip was part of the batch.
    pub fn contains(&self, trip_id: TripId) -> bool {
        self.index.contains_key(&trip_id)
    }

    /// Number of trips in the batch.
    pub fn num_trips(&self) -> usize {
        self.size / 2
    }

    /// Side length of the matrix (two endpoints per trip).
    pub fn size(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_requests() -> Vec<TripRequest> {
        vec![
            // listed out of id order on purpose
            TripRequest::new("bob", 9, 0, 100, (0, 50), (150, 250)).expect("valid"),
            TripRequest::new("alice", 2, 0, 100, (0, 0), (100, 0)).expect("valid"),
        ]
    }

    #[test]
    fn test_from_requests_quadrants() {
        let reqs = sample_requests();
        let m = TravelTimeMatrix::from_requests(&reqs).expect("matrix");
        assert_eq!(m.size(), 4);
        assert_eq!(m.num_trips(), 2);
        let (bob, alice) = (&reqs[0], &reqs[1]);

        // pickup–pickup
        assert!((m.travel_time(alice.source(), bob.source()) - 10.0).abs() < 1e-10);
        // pickup–dropoff
        assert!((m.travel_time(alice.source(), alice.destination()) - 20.0).abs() < 1e-10);
        // dropoff–pickup: (100,0) -> (0,50)
        let expected = (100.0f64 * 100.0 + 50.0 * 50.0).sqrt() / PIXELS_PER_UNIT;
        assert!((m.travel_time(alice.destination(), bob.source()) - expected).abs() < 1e-10);
        // dropoff–dropoff: (100,0) -> (150,250)
        let expected = (50.0f64 * 50.0 + 250.0 * 250.0).sqrt() / PIXELS_PER_UNIT;
        assert!((m.travel_time(alice.destination(), bob.destination()) - expected).abs() < 1e-10);
        // diagonal
        assert!(m.travel_time(bob.source(), bob.source()).abs() < 1e-10);
    }

    #[test]
    fn test_symmetric() {
        let reqs = sample_requests();
        let m = TravelTimeMatrix::from_requests(&reqs).expect("matrix");
        let nodes = [
            reqs[0].source(),
            reqs[0].destination(),
            reqs[1].source(),
            reqs[1].destination(),
        ];
        for a in nodes {
            for b in nodes {
                assert!((m.travel_time(a, b) - m.travel_time(b, a)).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_travel_minutes_rounds_up() {
        let reqs =
            vec![TripRequest::new("c", 1, 0, 100, (0, 0), (101, 0)).expect("valid")];
        let m = TravelTimeMatrix::from_requests(&reqs).expect("matrix");
        assert_eq!(m.travel_minutes(reqs[0].source(), reqs[0].destination()), 21);
        assert_eq!(m.travel_minutes(reqs[0].source(), reqs[0].source()), 0);
    }

    #[test]
    fn test_duplicate_trip_rejected() {
        let reqs = vec![
            TripRequest::new("a", 1, 0, 100, (0, 0), (1, 0)).expect("valid"),
            TripRequest::new("b", 1, 0, 100, (5, 0), (6, 0)).expect("valid"),
        ];
        let err = TravelTimeMatrix::from_requests(&reqs).unwrap_err();
        assert!(matches!(err, RideShareError::DuplicateTrip { trip_id: 1 }));
    }

    #[test]
    fn test_unknown_trip() {
        let m = TravelTimeMatrix::from_requests(&sample_requests()).expect("matrix");
        let stranger = TripRequest::new("z", 42, 0, 10, (0, 0), (1, 1)).expect("valid");
        assert!(!m.contains(42));
        assert!(m.contains(9));
        let err = m
            .try_travel_time(stranger.source(), stranger.destination())
            .unwrap_err();
        assert!(matches!(err, RideShareError::UnknownTrip { trip_id: 42 }));
    }

    #[test]
    #[should_panic(expected = "trip 42")]
    fn test_unknown_trip_panics() {
        let m = TravelTimeMatrix::from_requests(&sample_requests()).expect("matrix");
        let stranger = TripRequest::new("z", 42, 0, 10, (0, 0), (1, 1)).expect("valid");
        m.travel_time(stranger.source(), stranger.destination());
    }

    #[test]
    fn test_empty_batch() {
        let m = TravelTimeMatrix::from_requests(&[]).expect("matrix");
        assert_eq!(m.size(), 0);
        assert_eq!(m.num_trips(), 0);
    }
}
