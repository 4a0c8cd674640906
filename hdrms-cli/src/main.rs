//! hdrms - simulated elicitation runs over a dataset file
//!
//! # Usage
//!
//! ```bash
//! # Default configuration, random seed
//! hdrms data/anti_20d.txt
//!
//! # Fewer questions than the phases need: ends in subset construction
//! hdrms data/anti_20d.txt --budget 4 --rounds 8 --d-hat-2 3
//!
//! # Configuration file and machine-readable output
//! hdrms data/anti_20d.txt --config hdrms.toml --seed 7 --output json
//! ```

mod dataset;
mod report;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hdrms::{Elicitation, ElicitationConfig, FinalSelection, SimulatedUser, UtilityVector};
use hdrms_geometry::{max_regret_ratio, skyline, Point, PointId};
use tracing::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dataset::load_dataset;
use crate::report::{ElapsedMs, OutputFormat, RunReport};

#[derive(Parser, Debug)]
#[command(name = "hdrms")]
#[command(version)]
#[command(about = "Interactive regret-minimizing selection with a simulated user", long_about = None)]
struct Cli {
    /// Dataset file: an `n d` header followed by n rows of d values
    dataset: PathBuf,

    /// Dimensions sampled per subset construction round
    #[arg(long, value_name = "N")]
    d_hat_2: Option<usize>,

    /// Subset construction rounds, also the direct cover size
    #[arg(long, value_name = "K")]
    rounds: Option<usize>,

    /// Questions the simulated user answers
    #[arg(long, value_name = "Q")]
    budget: Option<u32>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", env = "HDRMS_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for the run and the simulated utility
    #[arg(long)]
    seed: Option<u64>,

    /// Non-zero coordinates of the simulated utility (defaults to d_bar)
    #[arg(long, value_name = "D")]
    d_prime: Option<usize>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    output: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "hdrms=debug" } else { "hdrms=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let format: OutputFormat = cli.output.parse().unwrap_or_else(|e| {
        eprintln!("Warning: {}. Using table format.", e);
        OutputFormat::Table
    });

    let report = run(&cli)?;
    println!("{}", report.render(format)?);
    Ok(())
}

fn build_config(cli: &Cli) -> Result<ElicitationConfig> {
    let mut config = match &cli.config {
        Some(path) => ElicitationConfig::from_file(path)
            .with_context(|| format!("Error loading configuration {}", path.display()))?,
        None => ElicitationConfig::default(),
    };
    config
        .apply_env(|key| std::env::var(key).ok())
        .context("Invalid HDRMS_* environment override")?;

    if let Some(d_hat_2) = cli.d_hat_2 {
        config.subset.d_hat_2 = d_hat_2;
    }
    if let Some(rounds) = cli.rounds {
        config.subset.rounds = rounds;
        config.subset.output_size = rounds;
    }
    if let Some(budget) = cli.budget {
        config.budget = budget;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<RunReport> {
    let mut config = build_config(cli)?;
    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    config.seed = Some(seed);

    let data = load_dataset(&cli.dataset)?;
    let dim = data.dim().unwrap_or(0);
    let sky = skyline(&data);
    info!(
        "Loaded {} points in {} dimensions, {} on the skyline",
        data.len(),
        dim,
        sky.len()
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let nonzero = cli.d_prime.unwrap_or(config.splitting.d_bar);
    let utility = UtilityVector::random_sparse(dim, nonzero, &mut rng);
    info!("Simulated utility {}", utility);

    let all_dims: Vec<usize> = (0..dim).collect();
    let ground_truth = top_scoring(sky.iter(), &utility, &all_dims);

    let elicitation = Elicitation::new(config).context("Invalid configuration")?;
    let mut user = SimulatedUser::new(utility.clone());
    let outcome = elicitation.run(&data, &mut user)?;

    let utility_regret = match (
        ground_truth,
        top_scoring(outcome.selected.iter(), &utility, &all_dims),
    ) {
        (Some((_, best)), Some((_, got))) if best > 0.0 => ((best - got) / best).max(0.0),
        _ => 0.0,
    };

    let final_dims = outcome.final_dimensions.to_vec();
    let max_regret = match outcome.selection {
        FinalSelection::Covering { .. } => {
            let sky_projected = sky.project(&final_dims);
            let selected_projected = outcome.selected.project(&final_dims);
            let all: Vec<&Point> = sky_projected.iter().collect();
            let chosen: Vec<&Point> = selected_projected.iter().collect();
            Some(max_regret_ratio(&all, &chosen)?)
        }
        FinalSelection::Interactive { .. } => None,
    };

    Ok(RunReport {
        dataset: cli.dataset.display().to_string(),
        points: data.len(),
        skyline: sky.len(),
        dimensions: dim,
        seed,
        utility: utility.weights().to_vec(),
        final_dimensions: final_dims,
        questions: outcome.questions.clone(),
        selection: outcome.selection.clone(),
        selected: outcome.selected.ids(),
        ground_truth: ground_truth.map(|(id, _)| id),
        utility_regret,
        max_regret_ratio: max_regret,
        elapsed_ms: ElapsedMs {
            narrowing_and_splitting: outcome.timings.narrowing_and_splitting.as_secs_f64() * 1e3,
            final_selection: outcome.timings.final_selection.as_secs_f64() * 1e3,
        },
    })
}

/// Highest scoring point under `utility`, the first one on ties
fn top_scoring<'p>(
    points: impl Iterator<Item = &'p Point>,
    utility: &UtilityVector,
    dims: &[usize],
) -> Option<(PointId, f64)> {
    let mut best: Option<(PointId, f64)> = None;
    for p in points {
        let score = utility.score(p, dims);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((p.id(), score));
        }
    }
    best
}
