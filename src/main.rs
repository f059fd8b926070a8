use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use u_rideshare::io::{format_itinerary, read_requests, SolutionSummary};
use u_rideshare::{GraspConfig, GraspRunner, Problem};

/// Assigns ride requests to shared vehicles.
#[derive(Debug, Parser)]
#[command(name = "u-rideshare", version, about)]
struct Cli {
    /// Tab-separated request file
    input: PathBuf,
    /// Also write the output to this file
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Passengers per vehicle
    #[arg(long, default_value_t = 3)]
    capacity: u32,
    /// Candidate insertion window, percent
    #[arg(long, default_value_t = 5)]
    beta: u32,
    /// Request selection window, percent
    #[arg(long, default_value_t = 25)]
    gamma: u32,
    /// Construction restarts
    #[arg(long, default_value_t = 100)]
    iterations: usize,
    /// Local search rounds per restart
    #[arg(long, default_value_t = 50)]
    search_iterations: usize,
    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
    /// Stop starting restarts after this many milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,
    /// Run construction restarts on a single thread
    #[arg(long)]
    sequential: bool,
    /// Emit a JSON summary instead of itineraries
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> GraspConfig {
        let mut config = GraspConfig::default()
            .with_capacity(self.capacity)
            .with_beta(self.beta)
            .with_gamma(self.gamma)
            .with_iterations(self.iterations)
            .with_search_iterations(self.search_iterations)
            .with_parallel(!self.sequential);
        config.seed = self.seed;
        config.time_limit_ms = self.time_limit_ms;
        config
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    config.validate().context("invalid solver parameters")?;

    let requests = read_requests(&cli.input)
        .with_context(|| format!("failed to read requests from {}", cli.input.display()))?;
    tracing::info!(requests = requests.len(), "requests loaded");
    let problem = Problem::new(requests).context("invalid request batch")?;

    let result = GraspRunner::run(&problem, &config).context("solver failed")?;

    let text = if cli.json {
        serde_json::to_string_pretty(&SolutionSummary::from_result(&result))
            .context("failed to serialize summary")?
    } else {
        format_itinerary(&result.best)
    };
    println!("{text}");

    if let Some(path) = &cli.output {
        fs::write(path, &text)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}
