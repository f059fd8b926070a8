//! Trip request type.

use serde::{Deserialize, Serialize};

use super::{Minutes, Node, TimeWindow, TripId};
use crate::distance::TravelTimeMatrix;
use crate::error::{RideShareError, Result};

/// A request to be driven from a pickup point to a dropoff point.
///
/// The rider gives the earliest pickup time and the latest arrival time.
/// Until [`TripRequest::derive_windows`] runs, both nodes carry the loose
/// window `[departs_after, arrives_before]`; afterwards the pickup's latest
/// time and the dropoff's earliest time are tightened by the direct travel
/// time, so that driving the pair alone is always feasible.
///
/// # Examples
///
/// ```
/// use u_rideshare::models::TripRequest;
///
/// let tr = TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).unwrap();
/// assert_eq!(tr.trip_id(), 1);
/// assert_eq!(tr.source().earliest(), 480);
/// assert_eq!(tr.destination().latest(), 540);
/// assert!(TripRequest::new("bob", 2, 600, 540, (0, 0), (1, 1)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    requester: String,
    trip_id: TripId,
    source: Node,
    destination: Node,
}

impl TripRequest {
    /// Creates a trip request.
    ///
    /// # Errors
    ///
    /// Returns [`RideShareError::InvalidRequest`] if `trip_id` is zero or
    /// `departs_after` is later than `arrives_before`.
    pub fn new(
        requester: impl Into<String>,
        trip_id: TripId,
        departs_after: Minutes,
        arrives_before: Minutes,
        origin: (i32, i32),
        destination: (i32, i32),
    ) -> Result<Self> {
        if trip_id == 0 {
            return Err(RideShareError::InvalidRequest {
                trip_id,
                reason: "trip ids must be positive".into(),
            });
        }
        let window = TimeWindow::new(departs_after, arrives_before).ok_or_else(|| {
            RideShareError::InvalidRequest {
                trip_id,
                reason: format!(
                    "pickup after {departs_after} is later than arrival before {arrives_before}"
                ),
            }
        })?;
        Ok(Self {
            requester: requester.into(),
            trip_id,
            source: Node::pickup(trip_id, origin.0, origin.1, window),
            destination: Node::dropoff(trip_id, destination.0, destination.1, window),
        })
    }

    /// Name of the rider.
    pub fn requester(&self) -> &str {
        &self.requester
    }

    /// Unique trip id.
    pub fn trip_id(&self) -> TripId {
        self.trip_id
    }

    /// Pickup node.
    pub fn source(&self) -> &Node {
        &self.source
    }

    /// Dropoff node.
    pub fn destination(&self) -> &Node {
        &self.destination
    }

    /// Travel time when driving this trip alone.
    pub fn direct_travel_time(&self, matrix: &TravelTimeMatrix) -> f64 {
        matrix.travel_time(&self.source, &self.destination)
    }

    /// Tightens the derived bounds of both windows.
    ///
    /// Sets `source.latest = destination.latest - ceil(direct)` and
    /// `destination.earliest = source.earliest + ceil(direct)`. Applying it
    /// twice has no further effect.
    ///
    /// # Errors
    ///
    /// Returns [`RideShareError::UnroutableRequest`] if the trip cannot be
    /// driven directly within its window, and
    /// [`RideShareError::UnknownTrip`] if the matrix does not contain it.
    pub fn derive_windows(&mut self, matrix: &TravelTimeMatrix) -> Result<()> {
        let direct = matrix.try_travel_minutes(&self.source, &self.destination)?;
        let earliest = self.source.earliest();
        let latest = self.destination.latest();
        let unroutable = || RideShareError::UnroutableRequest {
            trip_id: self.trip_id,
        };
        let source = TimeWindow::new(earliest, latest - direct).ok_or_else(unroutable)?;
        let destination = TimeWindow::new(earliest + direct, latest).ok_or_else(unroutable)?;
        self.source.set_window(source);
        self.destination.set_window(destination);
        Ok(())
    }

    /// Re-checks the invariants enforced by [`TripRequest::new`].
    ///
    /// Useful for requests that were deserialized rather than constructed.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| RideShareError::InvalidRequest {
            trip_id: self.trip_id,
            reason: reason.to_string(),
        };
        if self.trip_id == 0 {
            return Err(invalid("trip ids must be positive"));
        }
        if self.source.trip_id() != self.trip_id || self.destination.trip_id() != self.trip_id {
            return Err(invalid("endpoint trip ids do not match the request"));
        }
        if !self.source.is_pickup() || self.destination.is_pickup() {
            return Err(invalid("source must be a pickup and destination a dropoff"));
        }
        if self.source.earliest() > self.destination.latest() {
            return Err(invalid("pickup window opens after the arrival deadline"));
        }
        Ok(())
    }
}
