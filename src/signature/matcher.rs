//! Tolerance matching of an aggregate TTL against the signature table

use super::{SignatureEntry, SignatureTable};
use serde::{Deserialize, Serialize};

/// A signature within tolerance of the measured TTL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guess {
    #[serde(flatten)]
    pub signature: SignatureEntry,
    pub difference: u64,
}

/// Absolute distance between a signature TTL and the measured mean
fn ttl_difference(expected: i64, mean: u64) -> u64 {
    let distance = (i128::from(expected) - i128::from(mean)).unsigned_abs();
    u64::try_from(distance).unwrap_or(u64::MAX)
}

/// All signatures whose TTL is within `tolerance` of `mean`, closest first.
///
/// The sort is stable: signatures at the same distance keep their table order.
pub fn match_signatures(table: &SignatureTable, mean: u64, tolerance: u64) -> Vec<Guess> {
    let mut guesses: Vec<Guess> = table
        .candidates()
        .filter_map(|(entry, expected)| {
            let difference = ttl_difference(expected, mean);
            (difference <= tolerance).then(|| Guess {
                signature: entry.clone(),
                difference,
            })
        })
        .collect();

    guesses.sort_by_key(|guess| guess.difference);
    guesses
}
