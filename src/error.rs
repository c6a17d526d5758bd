//! Error handling for ttlguess
//!
//! Errors fall in two scopes. Probe errors only end the evaluation of the
//! target being probed; the orchestrator reports them and moves on. Signature
//! table, target list and configuration errors end the whole run.

use thiserror::Error;

/// Which external probe an execution error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    /// Route tracing, used for the hop count
    Trace,
    /// ICMP echo, used for the reply TTL
    Ping,
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeKind::Trace => write!(f, "traceroute"),
            ProbeKind::Ping => write!(f, "ping"),
        }
    }
}

/// Main error type
#[derive(Debug, Error)]
pub enum GuessError {
    #[error("Error running {program}: {message}")]
    ProbeExecution {
        probe: ProbeKind,
        program: String,
        message: String,
    },

    #[error("Could not find TTL in {0} output")]
    ProbeParse(ProbeKind),

    #[error("Signature table error: {0}")]
    SignatureLoad(String),

    #[error("Please specify a target")]
    NoTargets,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for ttlguess operations
pub type GuessResult<T> = Result<T, GuessError>;

impl GuessError {
    /// Execution error for the probe's stock program name
    pub fn probe_execution(probe: ProbeKind, message: impl Into<String>) -> Self {
        Self::program_failed(probe, probe.to_string(), message)
    }

    /// Execution error naming the program that was actually run
    pub fn program_failed(
        probe: ProbeKind,
        program: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        GuessError::ProbeExecution {
            probe,
            program: program.into(),
            message: message.into(),
        }
    }

    /// True for errors that only invalidate the current target.
    pub fn target_scoped(&self) -> bool {
        matches!(
            self,
            GuessError::ProbeExecution { .. } | GuessError::ProbeParse(_)
        )
    }

    /// True for errors that must stop the process with a non-zero status.
    pub fn is_fatal(&self) -> bool {
        !self.target_scoped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_errors_are_target_scoped() {
        let exec = GuessError::probe_execution(ProbeKind::Trace, "exit status: 1");
        assert!(exec.target_scoped());
        assert!(!exec.is_fatal());
        assert!(GuessError::ProbeParse(ProbeKind::Ping).target_scoped());
    }

    #[test]
    fn process_errors_are_fatal() {
        assert!(GuessError::NoTargets.is_fatal());
        assert!(GuessError::SignatureLoad("missing".into()).is_fatal());
        assert!(GuessError::Config("retries".into()).is_fatal());
    }

    #[test]
    fn messages_name_the_probe() {
        let err = GuessError::probe_execution(ProbeKind::Ping, "exit status: 2");
        assert_eq!(err.to_string(), "Error running ping: exit status: 2");
        assert_eq!(
            GuessError::ProbeParse(ProbeKind::Ping).to_string(),
            "Could not find TTL in ping output"
        );
    }

    #[test]
    fn messages_name_the_configured_program() {
        let err = GuessError::program_failed(ProbeKind::Trace, "tracepath", "exit status: 1");
        assert_eq!(err.to_string(), "Error running tracepath: exit status: 1");
        assert!(err.target_scoped());
    }
}
