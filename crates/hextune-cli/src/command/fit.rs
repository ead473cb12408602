use std::{fs, iter, path::PathBuf, sync::atomic::AtomicBool};

use anyhow::Context as _;
use chrono::Utc;
use hextune_evaluator::{
    AggressionCostFunction, CostFunction, PathRankingCostFunction, Weight,
};
use hextune_trajectory::{ActionAndState, LogParser, UnitCatalog};
use hextune_training::optimizer::{Optimizer, OptimizerConfig};
use rand::Rng as _;

use crate::{
    schema::behavior_model::{BehaviorModel, TrainedWeight},
    util,
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum CostFunctionKind {
    #[default]
    Movement,
    Aggression,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct FitArg {
    /// Cost function used to score recorded transitions
    #[arg(long, default_value = "movement")]
    cost_function: CostFunctionKind,
    /// JSON file of unit definitions keyed by "Chassis Model"
    #[arg(long)]
    unit_defs: Option<PathBuf>,
    /// RNG seed; drawn randomly (and printed) when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Override the iteration cap
    #[arg(long)]
    max_iterations: Option<usize>,
    /// Output file path; the model goes to stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
    /// Trajectory log files, concatenated in order
    #[arg(required = true)]
    logs: Vec<PathBuf>,
}

pub(crate) fn run(arg: &FitArg) -> anyhow::Result<()> {
    let catalog = util::load_catalog(arg.unit_defs.as_deref())?;
    let records = load_logs(&arg.logs, catalog.as_ref())?;
    eprintln!(
        "loaded {} trajectory records from {} file(s)",
        records.len(),
        arg.logs.len()
    );

    let cost_function: &dyn CostFunction = match arg.cost_function {
        CostFunctionKind::Movement => &PathRankingCostFunction,
        CostFunctionKind::Aggression => &AggressionCostFunction,
    };

    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    eprintln!("seed: {seed}");

    let mut config = OptimizerConfig::default();
    if let Some(cap) = arg.max_iterations {
        config.max_iterations = cap;
    }

    let mut optimizer = Optimizer::new(config, cost_function, &records, seed);
    let outcome = optimizer.fit(&AtomicBool::new(false))?;

    eprintln!(
        "{:?} after {} iterations, best loss {:.6e}",
        outcome.termination, outcome.iterations, outcome.loss
    );

    let model = BehaviorModel {
        name: format!("{:?}", arg.cost_function).to_lowercase(),
        trained_at: Utc::now(),
        seed,
        final_loss: outcome.loss,
        iterations: outcome.iterations,
        weights: iter::zip(Weight::ALL, outcome.parameters.values())
            .map(|(w, v)| TrainedWeight {
                id: w.id().to_owned(),
                weight: *v,
            })
            .collect(),
    };
    util::save_json(&model, arg.output.as_deref())?;

    if let Some(path) = &arg.output {
        eprintln!("model saved to {}", path.display());
    }
    Ok(())
}

fn load_logs(
    paths: &[PathBuf],
    catalog: &dyn UnitCatalog,
) -> anyhow::Result<Vec<ActionAndState>> {
    let mut parser = LogParser::new(catalog);
    let mut records = Vec::new();
    for path in paths {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read trajectory log: {}", path.display()))?;
        let parsed = parser
            .parse_str(&text)
            .with_context(|| format!("Failed to parse trajectory log: {}", path.display()))?;
        records.extend(parsed);
    }
    Ok(records)
}
