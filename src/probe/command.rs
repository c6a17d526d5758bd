//! Probe runner backed by the system `traceroute` and `ping` programs

use super::Prober;
use crate::config::GuessConfig;
use crate::error::{GuessError, GuessResult, ProbeKind};
use async_trait::async_trait;
use log::debug;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command as AsyncCommand;

/// Runs the external probe programs and returns their stdout
#[derive(Debug, Clone)]
pub struct SystemProber {
    ping_command: String,
    traceroute_command: String,
    max_hops: u32,
    timeout: Option<Duration>,
}

impl Default for SystemProber {
    fn default() -> Self {
        Self::from_config(&GuessConfig::default())
    }
}

impl SystemProber {
    pub fn from_config(config: &GuessConfig) -> Self {
        Self {
            ping_command: config.ping_command.clone(),
            traceroute_command: config.traceroute_command.clone(),
            max_hops: config.max_hops,
            timeout: config.probe_timeout(),
        }
    }

    /// Arguments for a single numeric route trace
    pub fn trace_args(&self, target: &str) -> Vec<String> {
        vec![
            "-n".to_string(),
            "-m".to_string(),
            self.max_hops.to_string(),
            target.to_string(),
        ]
    }

    /// Arguments for a single echo request
    pub fn ping_args(&self, target: &str) -> Vec<String> {
        vec!["-c".to_string(), "1".to_string(), target.to_string()]
    }

    async fn run(&self, probe: ProbeKind, program: &str, args: &[String]) -> GuessResult<String> {
        let start_time = Instant::now();
        debug!("Running {} {}", program, args.join(" "));

        let mut cmd = AsyncCommand::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(GuessError::program_failed(
                        probe,
                        program,
                        format!("timed out after {}ms", limit.as_millis()),
                    ))
                }
            },
            None => cmd.output().await,
        };

        let output = result.map_err(|e| GuessError::program_failed(probe, program, e.to_string()))?;

        debug!(
            "{} finished in {:?} with {}",
            program,
            start_time.elapsed(),
            output.status
        );

        if !output.status.success() {
            return Err(GuessError::program_failed(probe, program, output.status.to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Prober for SystemProber {
    async fn trace(&self, target: &str) -> GuessResult<String> {
        let args = self.trace_args(target);
        self.run(ProbeKind::Trace, &self.traceroute_command, &args).await
    }

    async fn ping(&self, target: &str) -> GuessResult<String> {
        let args = self.ping_args(target);
        self.run(ProbeKind::Ping, &self.ping_command, &args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_follow_config() {
        let prober = SystemProber::from_config(&GuessConfig::default().with_max_hops(30));
        assert_eq!(prober.trace_args("10.0.0.1"), vec!["-n", "-m", "30", "10.0.0.1"]);
        assert_eq!(prober.ping_args("10.0.0.1"), vec!["-c", "1", "10.0.0.1"]);
    }

    #[tokio::test]
    async fn missing_program_is_an_execution_error() {
        let config = GuessConfig {
            ping_command: "ttlguess-no-such-ping-binary".to_string(),
            ..GuessConfig::default()
        };
        let prober = SystemProber::from_config(&config);

        match prober.ping("127.0.0.1").await {
            Err(err @ GuessError::ProbeExecution { probe: ProbeKind::Ping, .. }) => {
                assert!(err.to_string().starts_with("Error running ttlguess-no-such-ping-binary: "));
            }
            other => panic!("expected execution error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_an_execution_error() {
        let config = GuessConfig {
            traceroute_command: "false".to_string(),
            ..GuessConfig::default()
        };
        let prober = SystemProber::from_config(&config);

        match prober.trace("127.0.0.1").await {
            Err(err @ GuessError::ProbeExecution { probe: ProbeKind::Trace, .. }) => {
                assert!(err.to_string().starts_with("Error running false: "));
            }
            other => panic!("expected execution error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stdout_is_returned_on_success() {
        let config = GuessConfig {
            ping_command: "echo".to_string(),
            ..GuessConfig::default()
        };
        let prober = SystemProber::from_config(&config);

        let output = prober.ping("127.0.0.1").await.unwrap();
        assert_eq!(output.trim(), "-c 1 127.0.0.1");
    }
}
