//! Error type shared by the solver, the problem setup and the request parser.

use std::fmt;

use crate::models::TripId;

/// Errors produced while setting up or solving a ride-sharing problem.
///
/// An infeasible insertion is not an error: it is reported as `false` or
/// `None` by the route and candidate APIs and handled as normal control flow.
#[derive(Debug)]
pub enum RideShareError {
    /// A solver parameter is out of range.
    InvalidConfig {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// A trip request is malformed.
    InvalidRequest {
        /// Trip id of the request.
        trip_id: TripId,
        /// Why the request was rejected.
        reason: String,
    },
    /// Two requests in one batch share a trip id.
    DuplicateTrip {
        /// The repeated trip id.
        trip_id: TripId,
    },
    /// A travel time was requested for a trip that is not in the matrix.
    UnknownTrip {
        /// The unknown trip id.
        trip_id: TripId,
    },
    /// A request cannot be served even alone on an otherwise empty vehicle.
    UnroutableRequest {
        /// Trip id of the request.
        trip_id: TripId,
    },
    /// The request file is malformed.
    Parse {
        /// 1-based line number in the input.
        line: usize,
        /// Description of the problem.
        message: String,
    },
    /// Reading the request file failed.
    Io(std::io::Error),
    /// An operation that must preserve feasibility produced an infeasible
    /// solution.
    Internal(String),
}

impl fmt::Display for RideShareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { parameter, reason } => {
                write!(f, "invalid configuration: {parameter} {reason}")
            }
            Self::InvalidRequest { trip_id, reason } => {
                write!(f, "invalid trip request {trip_id}: {reason}")
            }
            Self::DuplicateTrip { trip_id } => write!(f, "duplicate trip id {trip_id}"),
            Self::UnknownTrip { trip_id } => {
                write!(f, "trip {trip_id} is not part of the travel time matrix")
            }
            Self::UnroutableRequest { trip_id } => write!(
                f,
                "trip {trip_id} cannot be served within its time window even by a dedicated vehicle"
            ),
            Self::Parse { line, message } => write!(f, "line {line}: {message}"),
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for RideShareError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RideShareError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, RideShareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = RideShareError::InvalidConfig {
            parameter: "beta",
            reason: "must be at least 1".into(),
        };
        assert_eq!(e.to_string(), "invalid configuration: beta must be at least 1");

        let e = RideShareError::Parse {
            line: 3,
            message: "expected 8 values".into(),
        };
        assert_eq!(e.to_string(), "line 3: expected 8 values");

        let e = RideShareError::UnknownTrip { trip_id: 7 };
        assert!(e.to_string().contains("trip 7"));
    }

    #[test]
    fn test_io_source() {
        use std::error::Error;
        let e: RideShareError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(e.source().is_some());
        assert!(RideShareError::DuplicateTrip { trip_id: 1 }.source().is_none());
    }
}
