//! GRASP top-level loop.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::GraspConfig;
use crate::constructive::grasp_construct;
use crate::error::{RideShareError, Result};
use crate::local_search::swap_trips;
use crate::models::{Problem, Solution};

/// Outcome of a GRASP run.
#[derive(Debug, Clone)]
pub struct GraspResult {
    /// Best solution found.
    pub best: Solution,
    /// Total objective of `best`.
    pub best_objective: f64,
    /// Construction restarts completed.
    pub iterations: usize,
    /// Number of times a better solution was adopted.
    pub improvements: usize,
    /// Best objective after each restart and its local search.
    pub history: Vec<f64>,
    /// Seed the run was driven by.
    pub seed: u64,
}

/// Runs the GRASP metaheuristic.
///
/// Each restart builds a fresh solution with [`grasp_construct`] and adopts
/// it if it beats the best so far; then `search_iterations` rounds of
/// [`swap_trips`] are applied to the best, adopting strict improvements.
/// Restarts draw their seeds up front from the run seed, so batched
/// parallel construction returns exactly what a sequential run would.
///
/// # Examples
///
/// ```
/// use u_rideshare::models::{Problem, TripRequest};
/// use u_rideshare::{GraspConfig, GraspRunner};
///
/// let problem = Problem::new(vec![
///     TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).unwrap(),
///     TripRequest::new("bob", 2, 485, 540, (25, 0), (100, 0)).unwrap(),
/// ]).unwrap();
/// let config = GraspConfig::default()
///     .with_capacity(2)
///     .with_iterations(10)
///     .with_search_iterations(5)
///     .with_seed(42);
///
/// let result = GraspRunner::run(&problem, &config).unwrap();
/// assert_eq!(result.best.num_vehicles(), 1);
/// assert!(result.best_objective > 0.0);
/// ```
pub struct GraspRunner;

impl GraspRunner {
    /// Solves `problem` under `config`.
    ///
    /// # Errors
    ///
    /// - [`RideShareError::InvalidConfig`] if `config` does not validate
    /// - [`RideShareError::UnroutableRequest`] if construction cannot place
    ///   a request
    /// - [`RideShareError::Internal`] if an adopted solution breaks a
    ///   routing invariant
    #[tracing::instrument(skip_all, fields(requests = problem.len()))]
    pub fn run(problem: &Problem, config: &GraspConfig) -> Result<GraspResult> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        info!(
            seed,
            iterations = config.iterations,
            search_iterations = config.search_iterations,
            capacity = config.capacity,
            "starting GRASP"
        );

        let mut result = GraspResult {
            best: Solution::new(),
            best_objective: 0.0,
            iterations: 0,
            improvements: 0,
            history: Vec::with_capacity(config.iterations),
            seed,
        };
        if problem.is_empty() {
            return Ok(result);
        }

        let mut master = StdRng::seed_from_u64(seed);
        let seeds: Vec<(u64, u64)> = (0..config.iterations)
            .map(|_| (master.random(), master.random()))
            .collect();
        let deadline = config
            .time_limit_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));
        let batch = if config.parallel {
            rayon::current_num_threads().max(1)
        } else {
            1
        };

        let mut best: Option<Solution> = None;
        let mut best_objective = f64::NEG_INFINITY;

        for chunk in seeds.chunks(batch) {
            if best.is_some() && deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(
                    completed = result.iterations,
                    "time limit reached, stopping early"
                );
                break;
            }

            let constructed: Vec<Result<Solution>> = if config.parallel {
                chunk
                    .par_iter()
                    .map(|&(construct_seed, _)| construct(problem, config, construct_seed))
                    .collect()
            } else {
                chunk
                    .iter()
                    .map(|&(construct_seed, _)| construct(problem, config, construct_seed))
                    .collect()
            };

            for (candidate, &(_, search_seed)) in constructed.into_iter().zip(chunk) {
                let candidate = candidate?;
                result.iterations += 1;
                let objective = candidate.total_objective();
                if objective > best_objective {
                    verify(problem, &candidate)?;
                    debug!(
                        iteration = result.iterations,
                        objective,
                        vehicles = candidate.num_vehicles(),
                        "construction adopted"
                    );
                    best_objective = objective;
                    best = Some(candidate);
                    result.improvements += 1;
                }

                if let Some(current) = best.as_mut() {
                    let mut rng = StdRng::seed_from_u64(search_seed);
                    for _ in 0..config.search_iterations {
                        let next = swap_trips(current, problem.matrix(), config.alpha, &mut rng);
                        let objective = next.total_objective();
                        if objective > best_objective {
                            verify(problem, &next)?;
                            debug!(
                                iteration = result.iterations,
                                objective,
                                vehicles = next.num_vehicles(),
                                "local search adopted"
                            );
                            best_objective = objective;
                            *current = next;
                            result.improvements += 1;
                        }
                    }
                }
                result.history.push(best_objective);
            }
        }

        let best = best.ok_or_else(|| {
            RideShareError::Internal("no construction iteration completed".into())
        })?;
        info!(
            objective = best_objective,
            vehicles = best.num_vehicles(),
            iterations = result.iterations,
            improvements = result.improvements,
            "GRASP finished"
        );
        result.best = best;
        result.best_objective = best_objective;
        Ok(result)
    }
}

fn construct(problem: &Problem, config: &GraspConfig, seed: u64) -> Result<Solution> {
    let mut rng = StdRng::seed_from_u64(seed);
    grasp_construct(problem, config, &mut rng)
}

fn verify(problem: &Problem, solution: &Solution) -> Result<()> {
    let violations = solution.violations(problem);
    match violations.first() {
        None => Ok(()),
        Some(first) => Err(RideShareError::Internal(format!(
            "{} routing invariant(s) broken, first: {:?}",
            violations.len(),
            first.kind
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::RouteEvaluator;
    use crate::solver::DEFAULT_ALPHA;
    use crate::insertion::CandidateGenerator;
    use crate::models::{Route, TripRequest};
    use proptest::prelude::*;

    fn config(capacity: u32) -> GraspConfig {
        GraspConfig::default()
            .with_capacity(capacity)
            .with_iterations(15)
            .with_search_iterations(10)
            .with_seed(42)
    }

    fn grid_problem(n: u32) -> Problem {
        let requests = (1..=n)
            .map(|i| {
                let x = (i as i32 * 37) % 200;
                let y = (i as i32 * 91) % 200;
                let start = 480 + (i as i64 % 5) * 15;
                TripRequest::new(format!("r{i}"), i, start, start + 150, (x, y), (200 - y, x))
                    .expect("valid")
            })
            .collect();
        Problem::new(requests).expect("problem")
    }

    #[test]
    fn test_shared_ride_scenario() {
        let p = Problem::new(vec![
            TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).expect("valid"),
            TripRequest::new("bob", 2, 485, 540, (25, 0), (100, 0)).expect("valid"),
        ])
        .expect("problem");
        let result = GraspRunner::run(&p, &config(2)).expect("run");
        assert_eq!(result.best.num_vehicles(), 1);
        let route = result.best.vehicles()[0].route();
        assert_eq!(route.len(), 4);
        assert!(route.stops()[0].is_pickup() && route.stops()[1].is_pickup());
        assert!(result.best_objective > 0.0);
        assert!(result.best.violations(&p).is_empty());
    }

    #[test]
    fn test_conflicting_scenario() {
        let p = Problem::new(vec![
            TripRequest::new("alice", 1, 480, 500, (0, 0), (100, 0)).expect("valid"),
            TripRequest::new("bob", 2, 480, 500, (0, 0), (100, 0)).expect("valid"),
        ])
        .expect("problem");
        let result = GraspRunner::run(&p, &config(1)).expect("run");
        assert_eq!(result.best.num_vehicles(), 2);
        for v in result.best.vehicles() {
            assert_eq!(v.servicing().len(), 1);
        }
    }

    #[test]
    fn test_boarding_ahead_shares_vehicle() {
        // b's pickup closes at 490, so it can only share by boarding before a
        let p = Problem::new(vec![
            TripRequest::new("a", 1, 480, 540, (100, 0), (200, 0)).expect("valid"),
            TripRequest::new("b", 2, 480, 530, (0, 0), (200, 0)).expect("valid"),
        ])
        .expect("problem");
        let cfg = config(2)
            .with_iterations(20)
            .with_search_iterations(20)
            .with_seed(1);
        let result = GraspRunner::run(&p, &cfg).expect("run");
        assert_eq!(result.best.num_vehicles(), 1);
        let expected = (1.0 - DEFAULT_ALPHA * 0.5) + (1.0 - DEFAULT_ALPHA * 0.75);
        assert!((result.best_objective - expected).abs() < 1e-10);
        assert!(result.best.violations(&p).is_empty());
    }

    #[test]
    fn test_single_request_scenario() {
        let p = Problem::new(vec![
            TripRequest::new("alice", 1, 480, 540, (0, 0), (100, 0)).expect("valid"),
        ])
        .expect("problem");
        let result = GraspRunner::run(&p, &config(1)).expect("run");
        assert_eq!(result.best.num_vehicles(), 1);
        let stops = result.best.vehicles()[0].route().stops();
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].service_time, stops[0].earliest());
        assert_eq!(stops[0].service_time, 480);
    }

    #[test]
    fn test_empty_problem() {
        let p = Problem::new(Vec::new()).expect("problem");
        let result = GraspRunner::run(&p, &config(3)).expect("run");
        assert!(result.best.is_empty());
        assert_eq!(result.iterations, 0);
        assert_eq!(result.seed, 42);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let p = grid_problem(3);
        let err = GraspRunner::run(&p, &config(3).with_beta(0)).unwrap_err();
        assert!(matches!(err, RideShareError::InvalidConfig { parameter: "beta", .. }));
    }

    #[test]
    fn test_history_monotonic() {
        let p = grid_problem(14);
        let result = GraspRunner::run(&p, &config(3)).expect("run");
        assert_eq!(result.iterations, 15);
        assert_eq!(result.history.len(), 15);
        for pair in result.history.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        let last = result.history.last().copied().unwrap_or_default();
        assert!((last - result.best_objective).abs() < 1e-10);
        assert!(result.improvements >= 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let p = grid_problem(12);
        let parallel = GraspRunner::run(&p, &config(3)).expect("parallel");
        let sequential =
            GraspRunner::run(&p, &config(3).with_parallel(false)).expect("sequential");
        assert_eq!(parallel.history, sequential.history);
        assert_eq!(
            parallel.best.num_vehicles(),
            sequential.best.num_vehicles()
        );
    }

    #[test]
    fn test_time_limit_still_returns_solution() {
        let p = grid_problem(10);
        let cfg = config(3)
            .with_iterations(1000)
            .with_time_limit_ms(0)
            .with_parallel(false);
        let result = GraspRunner::run(&p, &cfg).expect("run");
        assert_eq!(result.iterations, 1);
        assert_eq!(result.best.num_served(), 10);
    }

    #[test]
    fn test_unseeded_run_reports_seed() {
        let p = grid_problem(4);
        let mut cfg = config(3).with_iterations(2).with_search_iterations(2);
        cfg.seed = None;
        let result = GraspRunner::run(&p, &cfg).expect("run");
        let replay = GraspRunner::run(&p, &cfg.with_seed(result.seed)).expect("replay");
        assert_eq!(result.history, replay.history);
    }

    fn arb_requests() -> impl Strategy<Value = Vec<TripRequest>> {
        prop::collection::vec(
            (0i32..200, 0i32..200, 0i32..200, 0i32..200, 420i64..600, 0i64..60),
            1..10,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (x1, y1, x2, y2, depart, slack))| {
                    // direct rides never exceed 57 minutes on this grid
                    TripRequest::new(
                        format!("p{i}"),
                        i as u32 + 1,
                        depart,
                        depart + 60 + slack,
                        (x1, y1),
                        (x2, y2),
                    )
                    .expect("valid")
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_solutions_feasible_and_covering(
            requests in arb_requests(),
            capacity in 1u32..4,
            seed in any::<u64>(),
        ) {
            let p = Problem::new(requests).expect("problem");
            let cfg = GraspConfig::default()
                .with_capacity(capacity)
                .with_iterations(3)
                .with_search_iterations(5)
                .with_seed(seed)
                .with_parallel(false);
            let result = GraspRunner::run(&p, &cfg).expect("run");
            prop_assert!(result.best.violations(&p).is_empty());
            prop_assert_eq!(result.best.num_served(), p.len());
            for v in result.best.vehicles() {
                let stops = v.route().stops();
                prop_assert!(Route::can_traverse(stops, p.matrix(), capacity));
                for s in stops {
                    prop_assert!(s.earliest() <= s.service_time);
                    prop_assert!(s.service_time <= s.latest());
                    prop_assert!(s.load >= 0 && s.load <= capacity as i32);
                }
                for pair in stops.windows(2) {
                    prop_assert!(pair[0].service_time <= pair[1].service_time);
                }
            }
        }

        #[test]
        fn prop_removal_legal_and_round_trip(
            requests in arb_requests(),
            seed in any::<u64>(),
        ) {
            let p = Problem::new(requests).expect("problem");
            let cfg = GraspConfig::default()
                .with_capacity(3)
                .with_seed(seed);
            let mut rng = StdRng::seed_from_u64(seed);
            let sol = grasp_construct(&p, &cfg, &mut rng).expect("construct");
            let evaluator = RouteEvaluator::new(p.matrix(), 3);
            let generator = CandidateGenerator::new(p.matrix(), cfg.alpha);

            for v in sol.vehicles() {
                for trip in v.trip_ids() {
                    let mut route = v.route().clone();
                    prop_assert!(route.remove_trip(trip, p.matrix()));
                    if !route.is_empty() {
                        prop_assert!(evaluator.can_traverse(route.stops()));
                    }

                    let before = route.stops().to_vec();
                    let request = &v.servicing()[&trip];
                    for candidate in generator.feasible_candidates(&route, request, route.len()) {
                        let mut trial = route.clone();
                        let (a, b) = candidate.insert_positions();
                        prop_assert!(trial.insert(a, b, request, p.matrix()));
                        prop_assert!(trial.remove_trip(trip, p.matrix()));
                        prop_assert_eq!(trial.stops(), &before[..]);
                    }
                }
            }
        }
    }
}
