//! ttlguess - guess a remote host's operating system from TTL arithmetic
//!
//! The reply TTL of an ICMP echo plus the hop count of a route trace gives an
//! estimate of the TTL the host started with. Repeated trials are averaged and
//! the mean is matched against a table of known default TTLs.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod probe;
pub mod signature;
pub mod utils;

// Re-export commonly used types
pub use aggregate::{aggregate, measure_target, AggregateResult, Measurement, TargetMeasurement};
pub use config::GuessConfig;
pub use error::{GuessError, GuessResult, ProbeKind};
pub use orchestrator::{Orchestrator, RunSummary, TargetOutcome, TargetReport, TargetState};
pub use output::{OutputConfig, OutputFormat, OutputManager};
pub use probe::{Prober, SystemProber};
pub use signature::{match_signatures, Guess, SignatureEntry, SignatureTable};

pub type Result<T> = std::result::Result<T, GuessError>;
