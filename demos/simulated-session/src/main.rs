//! Full change-detection session against a simulated participant.
//!
//! Loads parameters from an optional JSON file, runs every block with a
//! participant of the given capacity, then prints per-set-size accuracy,
//! a Cowan's K estimate and the raw results as JSON.
//!
//! Run with: RUST_LOG=chdet=debug cargo run -p simulated-session -- [params.json] [capacity]

mod participant;

use chdet::prelude::*;
use participant::SimulatedParticipant;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let mut params = match args.next() {
        Some(path) => ExperimentParams::from_json(&std::fs::read_to_string(path)?)?,
        None => ExperimentParams {
            set_sizes: vec![2, 4, 6, 8],
            number_of_trials_per_block: 40,
            number_of_blocks: 3,
            ..Default::default()
        },
    };
    let capacity = parse_capacity(args.next().as_deref())?;
    let seed = *params.seed.get_or_insert(2024);

    let participant = Arc::new(SimulatedParticipant::new(capacity, params.keys.clone(), seed));
    let sink = Arc::new(MemorySink::new());
    let hooks = HookRegistry::new().with(Arc::new(TracingHook::new()));

    let planned = params.total_trials();
    let mut runner = ExperimentRunner::new(params, participant, sink.clone(), hooks)?;
    let summary = match runner.run().await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, completed = runner.results().len(), "session failed");
            return Err(e.into());
        }
    };

    println!(
        "{} of {} trials, {} correct ({:.1}%), {} timeouts, {}",
        summary.trials,
        planned,
        summary.correct,
        summary.accuracy().unwrap_or(0.0) * 100.0,
        summary.timeouts,
        summary.elapsed,
    );
    for (set_size, k) in cowan_k(runner.results()) {
        println!("set size {set_size}: K = {k:.2}");
    }

    let json = sink.to_json(&runner.params().data_directory).await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// The capacity argument: a finite, non-negative number of items, 3 when absent.
fn parse_capacity(arg: Option<&str>) -> Result<f64, String> {
    let capacity: f64 = match arg {
        Some(k) => k.parse().map_err(|e| format!("invalid capacity {k:?}: {e}"))?,
        None => 3.0,
    };
    if !(capacity.is_finite() && capacity >= 0.0) {
        return Err(format!("capacity must be a non-negative number, got {capacity}"));
    }
    Ok(capacity)
}

/// Cowan's K per set size: `N * (hit rate - false alarm rate)`.
fn cowan_k(results: &[TrialResult]) -> BTreeMap<usize, f64> {
    #[derive(Default)]
    struct Tally {
        hits: usize,
        changes: usize,
        false_alarms: usize,
        sames: usize,
    }

    let mut tallies: BTreeMap<usize, Tally> = BTreeMap::new();
    for r in results.iter().filter(|r| !r.timed_out()) {
        let tally = tallies.entry(r.set_size).or_default();
        let said_change = r.accuracy == Some(r.is_change);
        if r.is_change {
            tally.changes += 1;
            tally.hits += usize::from(said_change);
        } else {
            tally.sames += 1;
            tally.false_alarms += usize::from(said_change);
        }
    }

    tallies
        .into_iter()
        .filter(|(_, t)| t.changes > 0 && t.sames > 0)
        .map(|(n, t)| {
            let hit_rate = t.hits as f64 / t.changes as f64;
            let fa_rate = t.false_alarms as f64 / t.sames as f64;
            (n, n as f64 * (hit_rate - fa_rate))
        })
        .collect()
}
