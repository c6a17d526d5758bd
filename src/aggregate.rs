//! Measurement aggregation
//!
//! Every trial reconstructs an origin TTL by adding the hop count to the
//! observed reply TTL. A target's trials are reduced to an integer mean and a
//! population standard deviation.

use crate::error::{GuessError, GuessResult};
use crate::probe::{count_hops, parse_ttl, Prober};
use serde::{Deserialize, Serialize};

/// One trial's observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub reply_ttl: u32,
    pub hops: u32,
}

impl Measurement {
    pub fn new(reply_ttl: u32, hops: u32) -> Self {
        Self { reply_ttl, hops }
    }

    /// Reconstructed TTL at the origin host
    pub fn origin_ttl(&self) -> u64 {
        u64::from(self.reply_ttl) + u64::from(self.hops)
    }
}

/// Mean and spread of a target's origin TTL estimates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Truncated mean, comparable with the integer signature TTLs
    pub mean: u64,
    /// Population standard deviation around `mean`
    pub std_dev: f64,
    pub samples: usize,
}

/// Reduce origin TTL estimates to mean and standard deviation.
///
/// Returns `None` for an empty slice; there is no aggregate without samples.
pub fn aggregate(values: &[u64]) -> Option<AggregateResult> {
    if values.is_empty() {
        return None;
    }

    let count = values.len() as u64;
    let sum: u64 = values.iter().sum();
    let mean = sum / count;

    let sum_of_squares: f64 = values
        .iter()
        .map(|&value| {
            let deviation = value.abs_diff(mean) as f64;
            deviation * deviation
        })
        .sum();

    Some(AggregateResult {
        mean,
        std_dev: (sum_of_squares / count as f64).sqrt(),
        samples: values.len(),
    })
}

/// Raw output and result of a single trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// 1-based trial number
    pub trial: usize,
    pub trace_output: String,
    pub ping_output: String,
    pub measurement: Measurement,
}

/// All trials of a target together with their aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetMeasurement {
    pub trials: Vec<TrialRecord>,
    pub aggregate: AggregateResult,
}

impl TargetMeasurement {
    pub fn origin_ttls(&self) -> Vec<u64> {
        self.trials
            .iter()
            .map(|record| record.measurement.origin_ttl())
            .collect()
    }
}

/// Run one trial: hop-count probe first, then the TTL probe.
pub async fn run_trial<P: Prober + ?Sized>(
    prober: &P,
    target: &str,
    trial: usize,
) -> GuessResult<TrialRecord> {
    let trace_output = prober.trace(target).await?;
    let hops = count_hops(&trace_output);

    let ping_output = prober.ping(target).await?;
    let reply_ttl = parse_ttl(&ping_output)?;

    log::debug!(
        "{} trial {}: reply ttl {} + {} hops",
        target,
        trial,
        reply_ttl,
        hops
    );

    Ok(TrialRecord {
        trial,
        trace_output,
        ping_output,
        measurement: Measurement::new(reply_ttl, hops),
    })
}

/// Run `trials` sequential trials against a target and aggregate them.
///
/// The first failing trial aborts the target and its error is returned; no
/// aggregate is built from a partial sample. `on_trial` is called with the
/// 1-based trial number before each trial starts.
pub async fn measure_target<P, F>(
    prober: &P,
    target: &str,
    trials: usize,
    mut on_trial: F,
) -> GuessResult<TargetMeasurement>
where
    P: Prober + ?Sized,
    F: FnMut(usize),
{
    if trials == 0 {
        return Err(GuessError::Config(
            "Number of tries must be at least 1".to_string(),
        ));
    }

    let mut records = Vec::with_capacity(trials);
    for trial in 1..=trials {
        on_trial(trial);
        records.push(run_trial(prober, target, trial).await?);
    }

    let origin_ttls: Vec<u64> = records
        .iter()
        .map(|record| record.measurement.origin_ttl())
        .collect();

    let summary = aggregate(&origin_ttls).ok_or_else(|| {
        GuessError::Config("Number of tries must be at least 1".to_string())
    })?;

    Ok(TargetMeasurement {
        trials: records,
        aggregate: summary,
    })
}
