use std::{collections::BTreeSet, fs, path::PathBuf};

use anyhow::Context as _;
use hextune_trajectory::LogParser;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InspectArg {
    /// JSON file of unit definitions keyed by "Chassis Model"
    #[arg(long)]
    unit_defs: Option<PathBuf>,
    /// Trajectory log files to inspect
    #[arg(required = true)]
    logs: Vec<PathBuf>,
}

pub(crate) fn run(arg: &InspectArg) -> anyhow::Result<()> {
    let catalog = util::load_catalog(arg.unit_defs.as_deref())?;
    let mut parser = LogParser::new(catalog.as_ref());

    let mut total = 0;
    for path in &arg.logs {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read trajectory log: {}", path.display()))?;
        let records = parser
            .parse_str(&text)
            .with_context(|| format!("Failed to parse trajectory log: {}", path.display()))?;

        let rounds: BTreeSet<u32> = records.iter().map(|r| r.round).collect();
        let actors: BTreeSet<u32> = records.iter().map(|r| r.action.actor_id).collect();
        let max_units = records.iter().map(|r| r.states.len()).max().unwrap_or(0);

        println!("{}:", path.display());
        println!("  records: {}", records.len());
        match (rounds.first(), rounds.last()) {
            (Some(first), Some(last)) => println!("  rounds:  {first}..={last}"),
            _ => println!("  rounds:  none"),
        }
        println!(
            "  actors:  {}",
            actors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("  units on board (max): {max_units}");
        total += records.len();
    }

    if arg.logs.len() > 1 {
        println!("total records: {total}");
    }
    Ok(())
}
