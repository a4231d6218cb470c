use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use exprfit_scoring::{dataset::Dataset, options::ScoringConfig};

use crate::{
    schema::{dataset::DatasetFile, expr::Expr},
    util,
};

use self::{batch_stats::BatchStatsArg, score::ScoreArg};

mod batch_stats;
mod score;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Score an expression against a dataset
    Score(#[clap(flatten)] ScoreArg),
    /// Repeat batch scoring and summarize the sampled losses
    BatchStats(#[clap(flatten)] BatchStatsArg),
}

/// Inputs shared by every subcommand.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct InputArg {
    /// Dataset JSON file
    #[arg(long)]
    dataset: PathBuf,
    /// Expression JSON file
    #[arg(long)]
    expr: PathBuf,
    /// Scoring configuration JSON file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Loaded and validated inputs.
#[derive(Debug)]
pub(crate) struct Inputs {
    dataset: Dataset,
    expr: Expr,
    config: ScoringConfig,
}

impl InputArg {
    fn load(&self) -> anyhow::Result<Inputs> {
        let dataset = util::read_json::<DatasetFile>(&self.dataset)?
            .into_dataset()
            .with_context(|| format!("Invalid dataset: {}", self.dataset.display()))?;
        let expr = util::read_json::<Expr>(&self.expr)?;
        let config = match &self.config {
            Some(path) => util::read_json::<ScoringConfig>(path)?,
            None => ScoringConfig::default(),
        };
        config
            .validate(&dataset)
            .context("Configuration does not fit the dataset")?;
        eprintln!(
            "Loaded {} rows x {} features{}",
            dataset.n_rows(),
            dataset.x().n_features(),
            if dataset.is_weighted() { " (weighted)" } else { "" },
        );
        Ok(Inputs {
            dataset,
            expr,
            config,
        })
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Score(arg) => score::run(&arg)?,
        Mode::BatchStats(arg) => batch_stats::run(&arg)?,
    }
    Ok(())
}
