use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::*;
use std::io;
use std::path::PathBuf;
use std::process;

use ttlguess::{
    config::GuessConfig,
    output::{OutputConfig, OutputFormat, OutputManager},
    signature::SignatureTable,
    utils::collect_targets,
    GuessError, Orchestrator, SystemProber,
};

fn build_cli() -> Command {
    Command::new("ttlguess")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Guess a remote host's operating system from its reply TTL and hop count")
        .arg(
            Arg::new("targets")
                .value_name("TARGET")
                .help("Hostnames or IP addresses. Read from stdin, one per line, when omitted")
                .num_args(0..)
                .index(1),
        )
        .arg(
            Arg::new("retries")
                .short('r')
                .long("retries")
                .value_name("COUNT")
                .help("Number of tries per target [default: 1]")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("tolerance")
                .short('t')
                .long("tolerance")
                .value_name("TTL")
                .help("TTL tolerance [default: 0]")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print raw probe output and the TTL mean and standard deviation")
                .action(ArgAction::SetTrue)
                .overrides_with("no-verbose"),
        )
        .arg(
            Arg::new("no-verbose")
                .long("no-verbose")
                .help("Turn off verbose output enabled in the config file")
                .action(ArgAction::SetTrue)
                .overrides_with("verbose"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("MS")
                .help("Kill a probe that runs longer than this many milliseconds")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("max-hops")
                .short('m')
                .long("max-hops")
                .value_name("HOPS")
                .help("Hop ceiling passed to traceroute [default: 64]")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("signatures")
                .short('s')
                .long("signatures")
                .value_name("FILE")
                .help("Signature table in osinfo.json format instead of the bundled one")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .value_parser(["text", "json", "csv"]),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Write results to a file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (default: ~/.ttlguess.toml)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue),
        )
}

/// Defaults, then the config file, then command line flags
fn resolve_config(matches: &ArgMatches) -> Result<GuessConfig, GuessError> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => GuessConfig::from_toml_file(path)?,
        None => GuessConfig::load_default_config(),
    };

    if let Some(&retries) = matches.get_one::<usize>("retries") {
        config = config.with_retries(retries);
    }
    if let Some(&tolerance) = matches.get_one::<u64>("tolerance") {
        config = config.with_tolerance(tolerance);
    }
    if matches.get_flag("verbose") {
        config = config.with_verbose(true);
    } else if matches.get_flag("no-verbose") {
        config = config.with_verbose(false);
    }
    if let Some(&timeout) = matches.get_one::<u64>("timeout") {
        config = config.with_probe_timeout(timeout);
    }
    if let Some(&max_hops) = matches.get_one::<u32>("max-hops") {
        config = config.with_max_hops(max_hops);
    }
    if let Some(path) = matches.get_one::<PathBuf>("signatures") {
        config = config.with_signatures(path.clone());
    }
    if let Some(format) = matches.get_one::<String>("format") {
        let format: OutputFormat = format.parse().map_err(GuessError::Config)?;
        config = config.with_output_format(format);
    }

    config.validate()?;
    Ok(config)
}

fn exit_with(error: GuessError, colored: bool) -> ! {
    let message = format!("[!] {}", error);
    if colored {
        eprintln!("{}", message.bright_red());
    } else {
        eprintln!("{}", message);
    }
    process::exit(1);
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let matches = build_cli().get_matches();
    let colored = !matches.get_flag("no-color");
    if !colored {
        colored::control::set_override(false);
    }

    let config = resolve_config(&matches).unwrap_or_else(|e| exit_with(e, colored));

    let table = SignatureTable::load(config.signatures.as_deref())
        .unwrap_or_else(|e| exit_with(e, colored));

    let positional: Vec<String> = matches
        .get_many::<String>("targets")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let targets = collect_targets(positional, io::stdin().lock())
        .unwrap_or_else(|e| exit_with(e, colored));

    let output = OutputManager::new(OutputConfig {
        format: config.output_format,
        file: matches.get_one::<PathBuf>("output").cloned(),
        colored,
        verbose: config.verbose,
    });

    let prober = SystemProber::from_config(&config);
    let orchestrator = Orchestrator::new(prober, &table, config.retries, config.tolerance);

    // Per-target failures are reported and never change the exit status
    let mut reports = Vec::new();
    orchestrator
        .run_each(&targets, |report| {
            if let Some(notice) = output.format_error_notice(&report) {
                eprintln!("{}", notice);
            }
            if output.is_streaming() {
                print!("{}", output.format_text(&report));
            } else {
                reports.push(report);
            }
        })
        .await;

    if !output.is_streaming() {
        if let Err(e) = output.write_results(&reports) {
            exit_with(e, colored);
        }
    }
}
