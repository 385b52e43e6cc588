use std::process::ExitCode;

use log::{error, info};
use nalgebra::Vector2;

use lane_sim::config::{self, SessionConfig};
use lane_sim::io::{csv, json, SessionSummary};
use lane_sim::logging;
use lane_sim::sim::event::{BoundaryDetector, SettlingDetector, TargetCrossingDetector};
use lane_sim::sim::{detect_events, EventDetector, EventKind, Session};

const USAGE: &str = "usage: lane-sim [CONFIG.toml] [--csv PATH] [--json PATH]";

#[derive(Debug, Default)]
struct Args {
    config: Option<String>,
    csv: Option<String>,
    json: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--csv" => args.csv = Some(iter.next().ok_or("--csv needs a path")?),
            "--json" => args.json = Some(iter.next().ok_or("--json needs a path")?),
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ if args.config.is_none() && !arg.starts_with('-') => args.config = Some(arg),
            _ => return Err(format!("unexpected argument `{}`\n{}", arg, USAGE)),
        }
    }
    Ok(args)
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(logging::level_from_env()) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> lane_sim::Result<()> {
    let config = match &args.config {
        Some(path) => {
            info!("loading session config from {}", path);
            config::load(path)?
        }
        None => SessionConfig::default(),
    };

    // -----------------------------------------------------------------------
    // Run session
    // -----------------------------------------------------------------------
    let mut session = Session::from_config(&config);
    let result = session.run();

    let Some(summary) = SessionSummary::from_result(&result, config.setpoint) else {
        info!("session recorded no steps, nothing to report");
        return Ok(());
    };

    let band = json::settling_band(config.setpoint, config.initial_position[1]);
    let mut crossing = TargetCrossingDetector { setpoint: config.setpoint };
    let mut settling = SettlingDetector::new(config.setpoint, band, 20);
    let mut boundary = BoundaryDetector::new(config.canvas.width);
    let mut detectors: [&mut dyn EventDetector; 3] = [&mut crossing, &mut settling, &mut boundary];
    let events = detect_events(&result, &mut detectors);

    // -----------------------------------------------------------------------
    // Print results
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  PID LANE CHANGE SIMULATION");
    println!("====================================================================");
    println!();
    println!("  Controller");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Kp: {:>6.3}   Ki: {:>6.3}   Kd: {:>6.3}   windup: {}",
        config.kp,
        config.ki,
        config.kd,
        if config.enable_windup { format!("±{}", config.windup_guard) } else { "off".into() }
    );
    println!(
        "  Start y: {:>7.1}   Setpoint y: {:>7.1}   Speed: {:>5.1}",
        config.initial_position[1], config.setpoint, config.initial_speed
    );
    println!();

    println!("  Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    for e in &events {
        let label = match &e.kind {
            EventKind::TargetCrossed { upward: true } => "CROSS UP".to_string(),
            EventKind::TargetCrossed { upward: false } => "CROSS DOWN".to_string(),
            EventKind::Settled { since } => format!("SETTLED (since {:.1}s)", since),
            EventKind::LeftCanvas => "EDGE".to_string(),
        };
        println!(
            "  {:<24} t={:>6.1}s   x={:>8.1}   y={:>7.2}",
            label, e.time, e.position.x, e.position.y
        );
    }
    println!();

    println!("  Performance Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  Final error:    {:>8.3}", summary.final_error);
    println!("  Max overshoot:  {:>8.3}", summary.max_overshoot);
    println!("  Rise time:      {}", fmt_time(summary.rise_time_s));
    println!("  Settling time:  {}", fmt_time(summary.settling_time_s));
    println!("  Path length:    {:>8.1}", summary.path_length);
    println!();

    // -----------------------------------------------------------------------
    // Trajectory table (sampled)
    // -----------------------------------------------------------------------
    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  {:>7}  {:>9}  {:>9}  {:>9}", "t (s)", "x", "y", "steer");
    println!("  {}", "─".repeat(40));

    let sample_interval = (result.len() / 25).max(1);
    for (i, ((t, p), steer)) in result
        .times
        .iter()
        .zip(&result.trajectory)
        .zip(&result.steering)
        .enumerate()
    {
        if i % sample_interval != 0 && i != result.len() - 1 {
            continue;
        }
        print_row(*t, p, *steer);
    }

    println!();
    println!("  Simulation: {} steps, dt={} s", result.len(), config.time_step);
    println!("====================================================================");
    println!();

    // -----------------------------------------------------------------------
    // Optional output files
    // -----------------------------------------------------------------------
    if let Some(path) = &args.csv {
        csv::write_trajectory_file(path, &result)?;
        info!("trajectory written to {}", path);
    }
    if let Some(path) = &args.json {
        json::write_summary_file(path, &config, &summary)?;
        info!("summary written to {}", path);
    }

    Ok(())
}

fn print_row(t: f64, p: &Vector2<f64>, steer: f64) {
    println!("  {:>7.2}  {:>9.2}  {:>9.2}  {:>9.2}", t, p.x, p.y, steer);
}

fn fmt_time(t: Option<f64>) -> String {
    t.map_or_else(|| "     n/a".to_string(), |t| format!("{:>8.1} s", t))
}
