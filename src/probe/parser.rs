//! Probe output parsing

use crate::error::{GuessError, GuessResult, ProbeKind};
use regex::Regex;

lazy_static::lazy_static! {
    static ref TTL_PATTERN: Regex = Regex::new(r"ttl=(\d+)").unwrap();
}

/// Extract the reply TTL from ping output.
///
/// Only the first `ttl=<digits>` token counts and the match is case-sensitive,
/// so `TTL=` as printed by Windows ping is not recognised.
pub fn parse_ttl(output: &str) -> GuessResult<u32> {
    let captures = TTL_PATTERN
        .captures(output)
        .ok_or(GuessError::ProbeParse(ProbeKind::Ping))?;

    captures[1]
        .parse::<u32>()
        .map_err(|_| GuessError::ProbeParse(ProbeKind::Ping))
}

/// Count hops in route trace output: newline-separated fields minus one.
///
/// The empty field after the final newline is not a hop. Unix `traceroute`
/// prints its header on stderr, so captured stdout holds one line per hop.
/// Other tracers or locales may print extra lines and are not special-cased.
pub fn count_hops(output: &str) -> u32 {
    let fields = output.split('\n').count();
    u32::try_from(fields.saturating_sub(1)).unwrap_or(u32::MAX)
}
