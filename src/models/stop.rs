//! Scheduled stop type.

use super::{Endpoint, Minutes, Node, TripId};

/// A node placed in a vehicle's schedule.
///
/// `service_time` and `load` only have meaning in the context of the route
/// that owns the stop; they are recomputed whenever the route changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    /// The located time point being serviced.
    pub node: Node,
    /// Clock time at which the vehicle services this stop.
    pub service_time: Minutes,
    /// Passengers aboard immediately after this stop.
    pub load: i32,
}

impl Stop {
    /// Creates an unscheduled stop for a node.
    ///
    /// The derived fields start at the node's earliest time and zero load
    /// until the owning route simulates its schedule.
    pub fn new(node: Node) -> Self {
        let service_time = node.earliest();
        Self {
            node,
            service_time,
            load: 0,
        }
    }

    /// Trip this stop belongs to.
    pub fn trip_id(&self) -> TripId {
        self.node.trip_id()
    }

    /// Pickup or dropoff.
    pub fn endpoint(&self) -> Endpoint {
        self.node.endpoint()
    }

    /// Returns `true` for pickup stops.
    pub fn is_pickup(&self) -> bool {
        self.node.is_pickup()
    }

    /// Earliest allowed service time.
    pub fn earliest(&self) -> Minutes {
        self.node.earliest()
    }

    /// Latest allowed service time.
    pub fn latest(&self) -> Minutes {
        self.node.latest()
    }
}
