use std::path::PathBuf;

use exprfit_scoring::{
    batch,
    score::{self, Fitness},
};
use serde::Serialize;

use crate::{
    command::{InputArg, Inputs},
    util::{Output, Summary},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BatchStatsArg {
    #[clap(flatten)]
    input: InputArg,
    /// Number of batches to draw
    #[arg(long, default_value_t = 100)]
    repeats: usize,
    /// Batch size (overrides the configuration)
    #[arg(long)]
    batch_size: Option<usize>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct BatchStatsReport {
    expression: String,
    batch_size: usize,
    full: FitnessReport,
    invalid_batches: usize,
    batch_loss: Option<Summary>,
    batch_score: Option<Summary>,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct FitnessReport {
    loss: f64,
    score: f64,
}

impl From<Fitness> for FitnessReport {
    fn from(Fitness { score, loss }: Fitness) -> Self {
        Self { loss, score }
    }
}

pub(crate) fn run(arg: &BatchStatsArg) -> anyhow::Result<()> {
    let BatchStatsArg {
        input,
        repeats,
        batch_size,
        output,
    } = arg;
    let Inputs {
        dataset,
        expr,
        mut config,
    } = input.load()?;
    config.batching = true;
    if let Some(batch_size) = batch_size {
        config.batch_size = *batch_size;
    }
    config.validate(&dataset)?;
    let options = config.into_options();

    let baseline = score::baseline_loss(&dataset, &options);
    let full = score::score_func(&dataset, baseline, &expr, &options);
    eprintln!("Scoring {expr}");
    eprintln!("  Full dataset: loss {:.6}, score {:.6}", full.loss, full.score);

    let batches = (0..*repeats)
        .map(|_| batch::score_func_batch(&dataset, baseline, &expr, &options))
        .collect::<Vec<_>>();
    let (valid, invalid): (Vec<_>, Vec<_>) =
        batches.into_iter().partition(|f| *f != Fitness::INVALID);

    let batch_loss = Summary::new(valid.iter().map(|f| f.loss));
    let batch_score = Summary::new(valid.iter().map(|f| f.score));
    eprintln!(
        "  {} batches of {} rows ({} invalid)",
        repeats,
        options.batch_size,
        invalid.len()
    );
    if let Some(s) = &batch_loss {
        eprintln!("  Batch loss:");
        eprintln!("    Min:    {:.6}", s.min);
        eprintln!("    Max:    {:.6}", s.max);
        eprintln!("    Mean:   {:.6}", s.mean);
        eprintln!("    Stddev: {:.6}", s.std_dev);
    }

    let report = BatchStatsReport {
        expression: expr.to_string(),
        batch_size: options.batch_size,
        full: full.into(),
        invalid_batches: invalid.len(),
        batch_loss,
        batch_score,
    };
    Output::save_json(&report, output.clone())
}
