//! Tab-separated request file reader.
//!
//! The first line holds the number of records. Each following line holds
//! eight tab-separated fields:
//!
//! ```text
//! requester  trip-id  depart-after  arrive-before  x1  y1  x2  y2
//! ```
//!
//! Times are `H:mm` wall-clock times; coordinates are integer pixels.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{RideShareError, Result};
use crate::models::{Minutes, TripId, TripRequest};

const FIELDS: usize = 8;

/// Parses an `H:mm` time into minutes since midnight.
///
/// # Examples
///
/// ```
/// use u_rideshare::io::parse_clock;
///
/// assert_eq!(parse_clock("8:05"), Some(485));
/// assert_eq!(parse_clock("17:30"), Some(1050));
/// assert_eq!(parse_clock("8:5"), None);
/// assert_eq!(parse_clock("24:00"), None);
/// ```
pub fn parse_clock(text: &str) -> Option<Minutes> {
    let (hours, minutes) = text.trim().split_once(':')?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hours) || hours.len() > 2 || minutes.len() != 2 || !all_digits(minutes) {
        return None;
    }
    let hours: Minutes = hours.parse().ok()?;
    let minutes: Minutes = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Formats minutes since midnight as `H:mm`. Times past midnight keep
/// counting hours.
///
/// # Examples
///
/// ```
/// use u_rideshare::io::format_clock;
///
/// assert_eq!(format_clock(485), "8:05");
/// assert_eq!(format_clock(0), "0:00");
/// assert_eq!(format_clock(1500), "25:00");
/// ```
pub fn format_clock(minutes: Minutes) -> String {
    format!("{}:{:02}", minutes.div_euclid(60), minutes.rem_euclid(60))
}

fn parse_error(line: usize, message: impl Into<String>) -> RideShareError {
    RideShareError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_record(line: usize, text: &str) -> Result<TripRequest> {
    let values: Vec<&str> = text.split('\t').map(str::trim).collect();
    if values.len() != FIELDS {
        return Err(parse_error(
            line,
            format!("expected {FIELDS} tab-separated values, found {}", values.len()),
        ));
    }

    let trip_id: TripId = values[1]
        .parse()
        .map_err(|_| parse_error(line, "trip id must be a positive integer"))?;
    let depart = parse_clock(values[2])
        .ok_or_else(|| parse_error(line, "depart-after time must be in H:mm format"))?;
    let arrive = parse_clock(values[3])
        .ok_or_else(|| parse_error(line, "arrive-before time must be in H:mm format"))?;
    let coordinate = |i: usize, what: &str| -> Result<i32> {
        values[i]
            .parse()
            .map_err(|_| parse_error(line, format!("{what} coordinates must be integers")))
    };
    let origin = (coordinate(4, "origin")?, coordinate(5, "origin")?);
    let destination = (coordinate(6, "destination")?, coordinate(7, "destination")?);

    TripRequest::new(values[0], trip_id, depart, arrive, origin, destination)
        .map_err(|e| parse_error(line, e.to_string()))
}

/// Reads trip requests from `reader`.
///
/// Reading stops once the announced number of records has been parsed;
/// blank lines are skipped. Error line numbers are 1-based file lines.
///
/// # Errors
///
/// Returns [`RideShareError::Parse`] for a missing or non-numeric record
/// count and for any malformed record, and [`RideShareError::Io`] if
/// reading fails.
///
/// # Examples
///
/// ```
/// use u_rideshare::io::parse_requests;
///
/// let input = "1\nalice\t1\t8:00\t9:00\t0\t0\t100\t0\n";
/// let requests = parse_requests(input.as_bytes()).unwrap();
/// assert_eq!(requests.len(), 1);
/// assert_eq!(requests[0].source().earliest(), 480);
/// ```
pub fn parse_requests<R: BufRead>(reader: R) -> Result<Vec<TripRequest>> {
    let mut lines = reader.lines().enumerate();

    let count: usize = match lines.next() {
        Some((_, header)) => header?
            .trim()
            .parse()
            .map_err(|_| parse_error(1, "expected the number of records on the first line"))?,
        None => return Err(parse_error(1, "input is empty")),
    };

    let mut requests = Vec::with_capacity(count);
    for (index, text) in lines {
        if requests.len() >= count {
            break;
        }
        let text = text?;
        if text.trim().is_empty() {
            continue;
        }
        requests.push(parse_record(index + 1, &text)?);
    }

    if requests.len() < count {
        tracing::warn!(
            announced = count,
            found = requests.len(),
            "request file holds fewer records than announced"
        );
    }
    Ok(requests)
}

/// Opens `path` and reads trip requests from it.
///
/// # Errors
///
/// See [`parse_requests`]; opening the file may also fail with
/// [`RideShareError::Io`].
pub fn read_requests(path: impl AsRef<Path>) -> Result<Vec<TripRequest>> {
    let file = File::open(path)?;
    parse_requests(BufReader::new(file))
}
