//! External probes
//!
//! Both signals come from external programs. A [`Prober`] runs them and hands
//! back their raw text; [`parser`] turns that text into numbers.

pub mod command;
pub mod parser;

use crate::error::GuessResult;
use async_trait::async_trait;

pub use crate::error::ProbeKind;
pub use command::SystemProber;
pub use parser::{count_hops, parse_ttl};

/// Source of raw probe output for a target
#[async_trait]
pub trait Prober: Send + Sync {
    /// Route trace output, used for the hop count
    async fn trace(&self, target: &str) -> GuessResult<String>;

    /// ICMP echo output, used for the reply TTL
    async fn ping(&self, target: &str) -> GuessResult<String>;
}
