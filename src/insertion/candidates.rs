//! Restricted candidate list for pickup/dropoff insertion.
//!
//! # Algorithm
//!
//! Two delay scores rank the stops of a route as anchors for a new trip:
//!
//! - source delay: `max(tt(stop, pickup), pickup.earliest - stop.service_time)`,
//!   the detour to pick up right after the stop including any forced wait
//! - dest delay: `tt(stop, dropoff)` if the dropoff could still be serviced
//!   in time right after the stop, infinite otherwise
//!
//! The `k` best source anchors are paired with every later-or-equal dropoff
//! anchor, and the `k` best dest anchors with every earlier-or-equal pickup
//! anchor. Whenever the first stop is an anchor, the pickup may also board
//! ahead of it, at the head of the route. Each pair is validated by
//! simulation and scored like the route objective, restricted to the
//! inserted trip's own ride.
//!
//! # Reference
//!
//! Feo, T.A. & Resende, M.G.C. (1995). "Greedy Randomized Adaptive Search
//! Procedures", *Journal of Global Optimization* 6, 109-133.

use std::collections::BTreeSet;

use rand::Rng;

use crate::distance::TravelTimeMatrix;
use crate::evaluation::RouteEvaluator;
use crate::models::{Node, Route, Stop, TripRequest};

/// Cost of picking `source` up right after `stop`.
pub fn source_delay(stop: &Stop, source: &Node, matrix: &TravelTimeMatrix) -> f64 {
    let travel = matrix.travel_time(&stop.node, source);
    let wait = (source.earliest() - stop.service_time) as f64;
    travel.max(wait)
}

/// Cost of dropping `destination` off right after `stop`, or infinity if
/// that would be too late.
pub fn dest_delay(stop: &Stop, destination: &Node, matrix: &TravelTimeMatrix) -> f64 {
    let travel = matrix.travel_time(&stop.node, destination);
    if stop.service_time + travel.ceil() as i64 <= destination.latest() {
        travel
    } else {
        f64::INFINITY
    }
}

/// Greedy priority of `request` for `route`: the smallest source delay plus
/// the smallest dest delay over all stops. Lower is more promising; an
/// empty route gives infinity.
pub fn greedy_delay(route: &Route, request: &TripRequest, matrix: &TravelTimeMatrix) -> f64 {
    if route.is_empty() {
        return f64::INFINITY;
    }
    let min_source = route
        .stops()
        .iter()
        .map(|s| source_delay(s, request.source(), matrix))
        .fold(f64::INFINITY, f64::min);
    let min_dest = route
        .stops()
        .iter()
        .map(|s| dest_delay(s, request.destination(), matrix))
        .fold(f64::INFINITY, f64::min);
    min_source + min_dest
}

/// Size of a restricted candidate list holding `percent` percent of `len`
/// candidates: at least one, at most `len`.
pub(crate) fn rcl_window(len: usize, percent: u32) -> usize {
    let window = (len * percent as usize).div_ceil(100);
    window.clamp(1, len.max(1))
}

/// A feasible insertion of a trip into a route.
///
/// `pickup_at` and `dropoff_at` are the arguments of [`Route::insert`]: the
/// pickup lands at index `pickup_at` (0 boards ahead of the current first
/// stop) and the dropoff at `dropoff_at + 1`, right after the new pickup
/// when the two are equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsertionCandidate {
    /// Index the pickup is inserted at.
    pub pickup_at: usize,
    /// Stop index, counted after the pickup went in, that the dropoff
    /// follows.
    pub dropoff_at: usize,
    /// Local savings score of the inserted trip.
    pub score: f64,
}

impl InsertionCandidate {
    /// Arguments for [`Route::insert`].
    pub fn insert_positions(&self) -> (usize, usize) {
        (self.pickup_at, self.dropoff_at)
    }
}

/// Generates and selects insertion candidates.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use u_rideshare::insertion::CandidateGenerator;
/// use u_rideshare::models::{Problem, Route, TripRequest};
///
/// let problem = Problem::new(vec![
///     TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).unwrap(),
///     TripRequest::new("bob", 2, 485, 540, (25, 0), (100, 0)).unwrap(),
/// ]).unwrap();
/// let generator = CandidateGenerator::new(problem.matrix(), 0.99);
/// let mut route = Route::seeded(&problem.requests()[0], problem.matrix(), 2).unwrap();
///
/// let mut rng = StdRng::seed_from_u64(7);
/// assert!(generator.insert_semi_greedy(&mut route, &problem.requests()[1], 5, &mut rng));
/// assert_eq!(route.len(), 4);
/// ```
pub struct CandidateGenerator<'a> {
    matrix: &'a TravelTimeMatrix,
    alpha: f64,
}

impl<'a> CandidateGenerator<'a> {
    /// Creates a generator scoring with the given objective weight.
    pub fn new(matrix: &'a TravelTimeMatrix, alpha: f64) -> Self {
        Self { matrix, alpha }
    }

    /// Raw candidate insert positions `(pickup_at, dropoff_at)` built from
    /// the `k` best source anchors and the `k` best dest anchors.
    ///
    /// An anchor at stop `i` places the pickup or dropoff right after it.
    /// When stop 0 is a source anchor the pickup may also go to the head of
    /// the route with any dropoff slot; every dest anchor additionally pairs
    /// with a head pickup.
    pub fn candidate_pairs(
        &self,
        route: &Route,
        request: &TripRequest,
        k: usize,
    ) -> BTreeSet<(usize, usize)> {
        let stops = route.stops();
        let n = stops.len();
        let mut pairs = BTreeSet::new();
        if n == 0 {
            return pairs;
        }

        let mut by_source: Vec<(f64, usize)> = stops
            .iter()
            .enumerate()
            .map(|(i, s)| (source_delay(s, request.source(), self.matrix), i))
            .collect();
        by_source.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for &(_, s) in by_source.iter().take(k) {
            pairs.extend((s..n).map(|d| (s + 1, d + 1)));
            if s == 0 {
                pairs.extend((0..=n).map(|b| (0, b)));
            }
        }

        let mut by_dest: Vec<(f64, usize)> = stops
            .iter()
            .enumerate()
            .map(|(i, s)| (dest_delay(s, request.destination(), self.matrix), i))
            .filter(|(delay, _)| delay.is_finite())
            .collect();
        by_dest.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for &(_, d) in by_dest.iter().take(k) {
            pairs.extend((0..=d).map(|s| (s + 1, d + 1)));
            pairs.insert((0, d + 1));
        }

        pairs
    }

    /// Validates the candidate pairs and scores the feasible ones.
    ///
    /// Result is sorted best score first.
    pub fn feasible_candidates(
        &self,
        route: &Route,
        request: &TripRequest,
        k: usize,
    ) -> Vec<InsertionCandidate> {
        let evaluator = RouteEvaluator::new(self.matrix, route.capacity());
        let mut candidates: Vec<InsertionCandidate> = self
            .candidate_pairs(route, request, k)
            .into_iter()
            .filter_map(|(pickup_at, dropoff_at)| {
                let mut trial = route.clone();
                if !trial.insert(pickup_at, dropoff_at, request, self.matrix) {
                    return None;
                }
                let score =
                    evaluator.trip_score(trial.stops(), pickup_at, dropoff_at + 1, self.alpha);
                Some(InsertionCandidate {
                    pickup_at,
                    dropoff_at,
                    score,
                })
            })
            .collect();
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates
    }

    /// Semi-greedy insertion used during construction.
    ///
    /// Considers the `beta` best anchors of each kind and draws uniformly
    /// from the best `beta` percent of the feasible candidates. An empty
    /// route is seeded with the request directly. Returns `false`, leaving
    /// the route untouched, if no candidate is feasible.
    pub fn insert_semi_greedy<R: Rng>(
        &self,
        route: &mut Route,
        request: &TripRequest,
        beta: u32,
        rng: &mut R,
    ) -> bool {
        if route.is_empty() {
            return route.insert(0, 0, request, self.matrix);
        }
        let candidates = self.feasible_candidates(route, request, beta as usize);
        if candidates.is_empty() {
            return false;
        }
        let window = rcl_window(candidates.len(), beta);
        let chosen = candidates[rng.random_range(0..window)];
        let (a, b) = chosen.insert_positions();
        route.insert(a, b, request, self.matrix)
    }

    /// Exhaustive insertion used during local search.
    ///
    /// Tries every feasible candidate on a clone and returns the clone with
    /// the strictly highest route objective, or `None` if nothing fits.
    pub fn best_insertion(&self, route: &Route, request: &TripRequest) -> Option<Route> {
        if route.is_empty() {
            let mut seeded = route.clone();
            if !seeded.insert(0, 0, request, self.matrix) {
                return None;
            }
            seeded.calculate_objective(self.matrix, self.alpha);
            return Some(seeded);
        }

        let mut best: Option<Route> = None;
        for candidate in self.feasible_candidates(route, request, route.len()) {
            let mut trial = route.clone();
            let (a, b) = candidate.insert_positions();
            if !trial.insert(a, b, request, self.matrix) {
                continue;
            }
            let objective = trial.calculate_objective(self.matrix, self.alpha);
            if best.as_ref().is_none_or(|r| objective > r.objective()) {
                best = Some(trial);
            }
        }
        best
    }
}
