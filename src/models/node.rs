//! Located time points and time window types.

use serde::{Deserialize, Serialize};

use super::{Minutes, TripId};
use crate::distance::PIXELS_PER_UNIT;

/// A time window `[earliest, latest]` in minutes since midnight.
///
/// A vehicle may arrive before `earliest` and wait; it must not be serviced
/// after `latest`.
///
/// # Examples
///
/// ```
/// use u_rideshare::models::TimeWindow;
///
/// let tw = TimeWindow::new(480, 540).unwrap();
/// assert!(tw.earliest() <= tw.latest());
/// assert!(tw.contains(500));
/// assert!(!tw.contains(541));
/// assert!(TimeWindow::new(600, 540).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    earliest: Minutes,
    latest: Minutes,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// Returns `None` if `earliest > latest`.
    pub fn new(earliest: Minutes, latest: Minutes) -> Option<Self> {
        if earliest > latest {
            return None;
        }
        Some(Self { earliest, latest })
    }

    /// Earliest allowable service time.
    pub fn earliest(&self) -> Minutes {
        self.earliest
    }

    /// Latest allowable service time.
    pub fn latest(&self) -> Minutes {
        self.latest
    }

    /// Returns `true` if the given time falls within this window.
    pub fn contains(&self, time: Minutes) -> bool {
        time >= self.earliest && time <= self.latest
    }

    /// Minutes spent waiting when arriving at `arrival`.
    pub fn waiting_time(&self, arrival: Minutes) -> Minutes {
        (self.earliest - arrival).max(0)
    }

    /// Width of the window in minutes.
    pub fn width(&self) -> Minutes {
        self.latest - self.earliest
    }
}

/// Whether a node is where a rider boards or leaves the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// The rider boards here.
    Pickup,
    /// The rider leaves here.
    Dropoff,
}

impl Endpoint {
    /// Change in passenger count when this endpoint is serviced.
    pub fn load_delta(self) -> i32 {
        match self {
            Endpoint::Pickup => 1,
            Endpoint::Dropoff => -1,
        }
    }
}

/// A pickup or dropoff location of one trip, with its service time window.
///
/// Coordinates are integer pixels; [`Node::distance_to`] converts to distance
/// units, which double as travel minutes (one unit per minute).
///
/// # Examples
///
/// ```
/// use u_rideshare::models::{Node, TimeWindow};
///
/// let tw = TimeWindow::new(480, 540).unwrap();
/// let a = Node::pickup(1, 0, 0, tw);
/// let b = Node::dropoff(1, 30, 40, tw);
/// assert!(a.is_pickup());
/// assert!((a.distance_to(&b) - 10.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    trip_id: TripId,
    endpoint: Endpoint,
    x: i32,
    y: i32,
    window: TimeWindow,
}

impl Node {
    /// Creates a node.
    pub fn new(trip_id: TripId, endpoint: Endpoint, x: i32, y: i32, window: TimeWindow) -> Self {
        Self {
            trip_id,
            endpoint,
            x,
            y,
            window,
        }
    }

    /// Creates a pickup node.
    pub fn pickup(trip_id: TripId, x: i32, y: i32, window: TimeWindow) -> Self {
        Self::new(trip_id, Endpoint::Pickup, x, y, window)
    }

    /// Creates a dropoff node.
    pub fn dropoff(trip_id: TripId, x: i32, y: i32, window: TimeWindow) -> Self {
        Self::new(trip_id, Endpoint::Dropoff, x, y, window)
    }

    /// Trip this node belongs to.
    pub fn trip_id(&self) -> TripId {
        self.trip_id
    }

    /// Pickup or dropoff.
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Returns `true` for pickup nodes.
    pub fn is_pickup(&self) -> bool {
        self.endpoint == Endpoint::Pickup
    }

    /// X coordinate in pixels.
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Y coordinate in pixels.
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Service time window.
    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// Earliest service time.
    pub fn earliest(&self) -> Minutes {
        self.window.earliest
    }

    /// Latest service time.
    pub fn latest(&self) -> Minutes {
        self.window.latest
    }

    pub(crate) fn set_window(&mut self, window: TimeWindow) {
        self.window = window;
    }

    /// Straight-line distance to another node in distance units.
    pub fn distance_to(&self, other: &Node) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        (dx * dx + dy * dy).sqrt() / PIXELS_PER_UNIT
    }
}
