//! Command-line runner.
//!
//! # Usage
//!
//! ```bash
//! # Probe the built-in 2048-bit key until a terminal verdict
//! ctprobe
//!
//! # Ten rounds of the left-pad experiment, JSON reports
//! ctprobe --workload left-pad --rounds 10 --json
//!
//! # Unblinded decryption with the fault check, reproducible inputs
//! ctprobe --no-blinding --check-crt --seed 42
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ctprobe::{output, Config, Detector, Driver, Error, Report, StopCondition, TimerSpec, Workload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum WorkloadKind {
    /// OAEP decryption probed with too-large and valid ciphertexts
    Manger,
    /// Left-padding of full-width and one-byte-short buffers
    LeftPad,
    /// The same left-padding experiment with a masked byte-wise copy
    LeftPadConst,
}

/// Online timing-leak detection for RSA-OAEP decryption
#[derive(Parser, Debug)]
#[command(name = "ctprobe")]
#[command(version)]
struct Args {
    /// Subject routine to measure
    #[arg(short, long, value_enum, default_value = "manger")]
    workload: WorkloadKind,

    /// Stop after this many rounds (default: run until a terminal verdict)
    #[arg(short, long)]
    rounds: Option<u64>,

    /// Inputs per round (overrides the configuration)
    #[arg(short, long)]
    measurements: Option<usize>,

    /// Load settings from a JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report "probably not constant time" from |t| > 5
    #[arg(long)]
    strict: bool,

    /// Decrypt without blinding
    #[arg(long)]
    no_blinding: bool,

    /// Re-encrypt each private-key result and compare
    #[arg(long)]
    check_crt: bool,

    /// Seed every random source
    #[arg(long)]
    seed: Option<u64>,

    /// Clock: monotonic or cycles
    #[arg(long, value_parser = parse_timer)]
    timer: Option<TimerSpec>,

    /// Print reports as JSON lines
    #[arg(long)]
    json: bool,

    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn parse_timer(name: &str) -> Result<TimerSpec, String> {
    TimerSpec::by_name(name).ok_or_else(|| format!("unknown timer '{}'", name))
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(msg) => {
            error!("{}", msg);
            return ExitCode::from(2);
        }
    };

    match run(&args, config) {
        Ok(Some(report)) if report.verdict.is_leak() => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "run failed");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<Config, String> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
            serde_json::from_str(&text).map_err(|e| format!("invalid config: {}", e))?
        }
        None => Config::default(),
    };

    if args.strict {
        config.t_threshold_moderate = Config::strict().t_threshold_moderate;
    }
    if let Some(n) = args.measurements {
        config.measurements_per_round = n;
    }
    if args.no_blinding {
        config.blinding = false;
    }
    if args.check_crt {
        config.check_crt = true;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(timer) = args.timer {
        config.timer = timer;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Args, config: Config) -> Result<Option<Report>, Error> {
    info!(
        workload = ?args.workload,
        measurements_per_round = config.measurements_per_round,
        percentile_count = config.percentile_count,
        timer = %config.timer,
        "starting"
    );

    let stop = match args.rounds {
        Some(n) => StopCondition::Rounds(n),
        None => StopCondition::Forever,
    };

    let detector = Detector::with_config(config);
    match args.workload {
        WorkloadKind::Manger => drive(detector.manger_test_key()?, &stop, args.json),
        WorkloadKind::LeftPad => drive(detector.left_pad(), &stop, args.json),
        WorkloadKind::LeftPadConst => drive(detector.left_pad_const(), &stop, args.json),
    }
}

fn drive<W: Workload>(
    mut driver: Driver<W>,
    stop: &StopCondition,
    json: bool,
) -> Result<Option<Report>, Error> {
    driver.run(stop, |report| {
        if json {
            match output::to_json(report) {
                Ok(line) => println!("{}", line),
                Err(err) => error!(%err, "report serialization failed"),
            }
        } else {
            println!("{}", output::format_report(report));
        }
    })
}
