//! Output formatting and management

use crate::error::{GuessError, GuessResult};
use crate::orchestrator::{TargetOutcome, TargetReport};
use chrono::{DateTime, Utc};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

/// Output format options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub file: Option<PathBuf>,
    pub colored: bool,
    pub verbose: bool,
}

/// Serializable view of one target's report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportRecord {
    pub target: String,
    pub status: String,
    pub mean_ttl: Option<u64>,
    pub std_dev: Option<f64>,
    pub measurements: Vec<u64>,
    pub guesses: Vec<GuessRecord>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuessRecord {
    pub device_os: String,
    pub version: String,
    pub protocol: String,
    pub ttl: String,
    pub difference: u64,
}

/// Top-level JSON document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDocument {
    pub generated_at: DateTime<Utc>,
    pub reports: Vec<ReportRecord>,
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    target: &'a str,
    device_os: &'a str,
    version: &'a str,
    protocol: &'a str,
    ttl: &'a str,
    difference: u64,
    mean_ttl: u64,
    std_dev: f64,
}

impl From<&TargetReport> for ReportRecord {
    fn from(report: &TargetReport) -> Self {
        let guesses = report
            .guesses()
            .iter()
            .map(|guess| GuessRecord {
                device_os: guess.signature.device_os.clone(),
                version: guess.signature.version.clone(),
                protocol: guess.signature.protocol.clone(),
                ttl: guess.signature.ttl.clone(),
                difference: guess.difference,
            })
            .collect();

        match &report.outcome {
            TargetOutcome::Classified { measurement, .. } => ReportRecord {
                target: report.target.clone(),
                status: "ok".to_string(),
                mean_ttl: Some(measurement.aggregate.mean),
                std_dev: Some(measurement.aggregate.std_dev),
                measurements: measurement.origin_ttls(),
                guesses,
                error: None,
            },
            TargetOutcome::Failed(error) => ReportRecord {
                target: report.target.clone(),
                status: "failed".to_string(),
                mean_ttl: None,
                std_dev: None,
                measurements: Vec::new(),
                guesses,
                error: Some(error.to_string()),
            },
        }
    }
}

fn output_error(e: impl std::fmt::Display) -> GuessError {
    GuessError::Io(io::Error::new(io::ErrorKind::Other, e.to_string()))
}

/// Main output manager
pub struct OutputManager {
    config: OutputConfig,
}

impl OutputManager {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// Text reports are printed per target as they finish; the other formats
    /// are written once the run is over.
    pub fn is_streaming(&self) -> bool {
        self.config.format == OutputFormat::Text && self.config.file.is_none()
    }

    /// Text lines for a classified target, empty for a failed one.
    ///
    /// Verbose mode adds the raw probe output before the guesses and the
    /// aggregate statistics after them.
    pub fn format_text(&self, report: &TargetReport) -> String {
        let mut output = String::new();
        let TargetOutcome::Classified {
            measurement,
            guesses,
        } = &report.outcome
        else {
            return output;
        };

        if self.config.verbose {
            output.push_str(&format!("Target: {}\n", report.target));
            for record in &measurement.trials {
                output.push_str(&record.trace_output);
                ensure_newline(&mut output);
                output.push_str(&record.ping_output);
                ensure_newline(&mut output);
            }
        }

        for guess in guesses {
            output.push_str(&format!(
                "{} {} diff: {}\n",
                guess.signature.device_os, guess.signature.version, guess.difference
            ));
        }

        if self.config.verbose {
            output.push_str(&format!("Average TTL: {}\n", measurement.aggregate.mean));
            output.push_str(&format!(
                "Standard Deviation: {}\n",
                measurement.aggregate.std_dev
            ));
        }

        output
    }

    /// Error notice for a failed target
    pub fn format_error_notice(&self, report: &TargetReport) -> Option<String> {
        let error = report.error()?;
        let notice = format!("[!] {}: {}", report.target, error);
        if self.config.colored {
            Some(notice.bright_red().to_string())
        } else {
            Some(notice)
        }
    }

    pub fn format_json(&self, reports: &[TargetReport]) -> GuessResult<String> {
        let document = RunDocument {
            generated_at: Utc::now(),
            reports: reports.iter().map(ReportRecord::from).collect(),
        };
        serde_json::to_string_pretty(&document).map_err(output_error)
    }

    /// One row per guess; targets without guesses produce no rows
    pub fn format_csv(&self, reports: &[TargetReport]) -> GuessResult<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for report in reports {
            let Some(measurement) = report.measurement() else {
                continue;
            };
            for guess in report.guesses() {
                writer
                    .serialize(CsvRow {
                        target: &report.target,
                        device_os: &guess.signature.device_os,
                        version: &guess.signature.version,
                        protocol: &guess.signature.protocol,
                        ttl: &guess.signature.ttl,
                        difference: guess.difference,
                        mean_ttl: measurement.aggregate.mean,
                        std_dev: measurement.aggregate.std_dev,
                    })
                    .map_err(output_error)?;
            }
        }
        let bytes = writer.into_inner().map_err(output_error)?;
        String::from_utf8(bytes).map_err(output_error)
    }

    /// Render all reports in the configured format
    pub fn render(&self, reports: &[TargetReport]) -> GuessResult<String> {
        match self.config.format {
            OutputFormat::Text => Ok(reports.iter().map(|r| self.format_text(r)).collect()),
            OutputFormat::Json => self.format_json(reports),
            OutputFormat::Csv => self.format_csv(reports),
        }
    }

    /// Write rendered reports to the configured file or stdout
    pub fn write_results(&self, reports: &[TargetReport]) -> GuessResult<()> {
        let rendered = self.render(reports)?;
        match &self.config.file {
            Some(path) => {
                let mut file = File::create(path)?;
                file.write_all(rendered.as_bytes())?;
                log::info!("Results written to {}", path.display());
            }
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(rendered.as_bytes())?;
                if !rendered.ends_with('\n') && !rendered.is_empty() {
                    handle.write_all(b"\n")?;
                }
            }
        }
        Ok(())
    }
}

fn ensure_newline(output: &mut String) {
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
}
