use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use env_logger::Builder;
use log::{error, warn};

use mobsim_handover::{
    EmulatedProbe, EventLog, HandoverSimulation, LoggedHandover, MetricsSeries, NetemSink, PingProbe, ScenarioConfig,
    PRESETS,
};

const EVENTS_FILE: &str = "handover_events.txt";
const METRICS_FILE: &str = "metrics.csv";
const PING_COUNT: u32 = 3;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProbeKind {
    /// RTT and loss derived from the applied link parameters
    Emulated,
    /// System ping to the candidate ping targets
    Ping,
}

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
/// Walks a station between access points and reports the handovers.
struct Args {
    /// Path to scenario YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in scenario, used when no config file is given
    #[arg(short, long, default_value = "two-ap-linear")]
    preset: String,

    /// Overrides the number of steps
    #[arg(long)]
    steps: Option<u64>,

    /// Overrides the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for the event log and metrics files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Enables the background sampler with the specified interval
    #[arg(long)]
    sample_interval_ms: Option<u64>,

    /// Probes the active link after every step
    #[arg(long, value_enum)]
    probe: Option<ProbeKind>,

    /// Shapes real interfaces with tc netem (requires interfaces in the config)
    #[arg(long)]
    netem: bool,

    /// Prints previous results from the output directory, running the scenario only if they are missing
    #[arg(long)]
    report_only: bool,
}

fn main() {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn load_config(args: &Args) -> Result<ScenarioConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => ScenarioConfig::from_file(path)?,
        None => ScenarioConfig::preset(&args.preset)
            .ok_or_else(|| format!("unknown preset {}, expected one of {}", args.preset, PRESETS.join(", ")))?,
    };
    if let Some(steps) = args.steps {
        config.total_steps = steps;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let events_path = args.output_dir.join(EVENTS_FILE);
    let metrics_path = args.output_dir.join(METRICS_FILE);

    if args.report_only {
        if let Some((events, metrics)) = load_previous(&events_path, &metrics_path) {
            println!("\nResults from {}", args.output_dir.display());
            print_handovers(events.iter().map(|e| (e.elapsed, e.position, e.from.as_str(), e.to.as_str())));
            print_final_link(&metrics);
            return Ok(());
        }
        warn!("no previous results in {}, running the scenario", args.output_dir.display());
    }

    let config = load_config(args)?;
    fs::create_dir_all(&args.output_dir)?;
    let mut sim = HandoverSimulation::new(&config)?.with_event_log(EventLog::with_log_file(&events_path)?);
    if args.netem {
        let interfaces = config.netem_interfaces();
        if interfaces.len() != config.candidates.len() {
            return Err("netem requires an interface for every candidate".into());
        }
        sim = sim.with_sink(NetemSink::new(interfaces));
    }
    sim = match args.probe {
        Some(ProbeKind::Emulated) => sim.with_measurement(EmulatedProbe),
        Some(ProbeKind::Ping) => sim.with_measurement(PingProbe::new(config.ping_targets(), PING_COUNT)),
        None => sim,
    };
    if let Some(interval) = args.sample_interval_ms {
        sim = sim.with_sampler(Duration::from_millis(interval));
    }

    let report = sim.run();
    report.metrics.write_csv(&metrics_path)?;

    println!(
        "\nScenario: {} ({} candidates, {} steps, margin {})",
        scenario_name(args),
        config.candidates.len(),
        config.total_steps,
        config.margin
    );
    print_handovers(
        report
            .events
            .iter()
            .map(|e| (e.elapsed, e.position, e.from.as_str(), e.to.as_str())),
    );
    print_final_link(&report.metrics);
    if report.sink_failures > 0 {
        println!("Rejected parameter updates: {}", report.sink_failures);
    }
    if args.sample_interval_ms.is_some() {
        println!("Sampler snapshots: {}", report.samples.len());
    }
    println!("Event log: {}", events_path.display());
    println!("Metrics: {}", metrics_path.display());
    Ok(())
}

/// Reads back the results of a previous run, `None` if either file is unusable or they disagree.
fn load_previous(events_path: &Path, metrics_path: &Path) -> Option<(Vec<LoggedHandover>, MetricsSeries)> {
    let metrics = MetricsSeries::load_csv(metrics_path);
    if metrics.is_empty() {
        return None;
    }
    let events = EventLog::load(events_path)?;
    // a handover at step 0 leaves no trace in the metrics, so the log may hold more events than switches
    let switches = metrics
        .records()
        .windows(2)
        .filter(|pair| pair[0].active != pair[1].active)
        .count();
    let last_active = metrics.records().last().map(|r| r.active.as_str());
    let last_matches = events.last().map_or(true, |e| Some(e.to.as_str()) == last_active);
    if events.len() < switches || !last_matches {
        warn!(
            "event log {} doesn't match metrics {}",
            events_path.display(),
            metrics_path.display()
        );
        return None;
    }
    Some((events, metrics))
}

fn scenario_name(args: &Args) -> String {
    match &args.config {
        Some(path) => path.display().to_string(),
        None => args.preset.clone(),
    }
}

fn print_handovers<'a>(events: impl Iterator<Item = (f64, f64, &'a str, &'a str)>) {
    println!("{:>10}  {:>10}  handover", "elapsed", "position");
    let mut count = 0;
    for (elapsed, position, from, to) in events {
        println!("{:>10.3}  {:>10.2}  {} -> {}", elapsed, position, from, to);
        count += 1;
    }
    if count == 0 {
        println!("{:>10}  {:>10}  none", "-", "-");
    }
}

fn print_final_link(metrics: &MetricsSeries) {
    if let Some(last) = metrics.records().last() {
        println!("Final link: {} after {} steps", last.active, last.step);
    }
}
