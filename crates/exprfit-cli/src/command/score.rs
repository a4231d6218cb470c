use std::path::PathBuf;

use chrono::{DateTime, Utc};
use exprfit_scoring::{
    candidate::CandidateTree as _,
    score::{self, INVALID_LOSS},
};
use serde::Serialize;

use crate::{
    command::{InputArg, Inputs},
    util::Output,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ScoreArg {
    #[clap(flatten)]
    input: InputArg,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct ScoreReport {
    expression: String,
    scored_at: DateTime<Utc>,
    rows: usize,
    batching: bool,
    noisy_nodes: bool,
    baseline_loss: f64,
    complexity: f64,
    loss: f64,
    score: f64,
    valid: bool,
}

pub(crate) fn run(arg: &ScoreArg) -> anyhow::Result<()> {
    let ScoreArg { input, output } = arg;
    let Inputs {
        dataset,
        expr,
        config,
    } = input.load()?;
    let options = config.into_options();

    eprintln!("Scoring {expr}");
    let baseline = score::baseline_loss(&dataset, &options);
    eprintln!("  Baseline loss: {baseline:.6}");
    let fitness = score::score_candidate(&dataset, baseline, &expr, &options);
    let valid = fitness.loss < INVALID_LOSS;
    if !valid {
        eprintln!("  Evaluation did not complete");
    }
    eprintln!("  Loss:  {:.6}", fitness.loss);
    eprintln!("  Score: {:.6}", fitness.score);

    let report = ScoreReport {
        expression: expr.to_string(),
        scored_at: Utc::now(),
        rows: dataset.n_rows(),
        batching: options.batching,
        noisy_nodes: options.noisy_nodes,
        baseline_loss: baseline,
        complexity: expr.complexity(&options),
        loss: fitness.loss,
        score: fitness.score,
        valid,
    };
    Output::save_json(&report, output.clone())?;
    if let Some(path) = output {
        eprintln!("Report saved to {}", path.display());
    }
    Ok(())
}
