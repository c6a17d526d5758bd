//! Target list input
//!
//! Targets come from the command line or, when none are given there, from a
//! newline-delimited stream (normally stdin). Blank lines and `#` comments
//! are skipped. Order is preserved and duplicates are kept.

use crate::error::{GuessError, GuessResult};
use std::io::BufRead;

/// Counters from reading a target stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetInputStats {
    pub total_lines: usize,
    pub valid_targets: usize,
    pub skipped_lines: usize,
}

/// Read newline-delimited targets until end of stream
pub fn read_targets<R: BufRead>(reader: R) -> GuessResult<(Vec<String>, TargetInputStats)> {
    let mut targets = Vec::new();
    let mut stats = TargetInputStats::default();

    for line in reader.lines() {
        stats.total_lines += 1;

        let line = line?;
        let target = line.trim();

        if target.is_empty() || target.starts_with('#') {
            stats.skipped_lines += 1;
            continue;
        }

        targets.push(target.to_string());
        stats.valid_targets += 1;
    }

    Ok((targets, stats))
}

/// Positional targets when present, otherwise the targets read from `fallback`.
///
/// An empty result is [`GuessError::NoTargets`].
pub fn collect_targets<R: BufRead>(positional: Vec<String>, fallback: R) -> GuessResult<Vec<String>> {
    let positional: Vec<String> = positional
        .into_iter()
        .map(|target| target.trim().to_string())
        .filter(|target| !target.is_empty())
        .collect();

    let targets = if positional.is_empty() {
        let (targets, stats) = read_targets(fallback)?;
        log::debug!(
            "Read {} targets from {} lines ({} skipped)",
            stats.valid_targets,
            stats.total_lines,
            stats.skipped_lines
        );
        targets
    } else {
        positional
    };

    if targets.is_empty() {
        return Err(GuessError::NoTargets);
    }

    Ok(targets)
}
