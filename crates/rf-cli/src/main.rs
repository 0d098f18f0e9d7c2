//! ReelForge Payback Lab
//!
//! Usage:
//!   rf-payback analyze              - Exact payback of the configured tables
//!   rf-payback simulate             - Auto-play simulation vs exact payback
//!   rf-payback spin                 - Normal credit-based spins
//!   rf-payback settings             - Print settings as JSON

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use rf_autoplay::{AutoPlayEvent, ConvergenceReport, SessionState, SlotMachine};
use rf_core::{MachineSettings, TickScale};

/// Highest power of ten selectable with `--runs-tick`
const MAX_RUNS_EXPONENT: u32 = 9;

#[derive(Parser)]
#[command(name = "rf-payback", about = "ReelForge slot payback lab")]
struct Cli {
    /// Machine settings JSON (defaults when omitted)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print per-combination odds and the exact payback
    Analyze {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
    /// Run an auto-play session and compare with the exact payback
    Simulate {
        /// Number of runs
        #[arg(short, long, conflicts_with = "runs_tick")]
        runs: Option<u64>,
        /// Number of runs as a power of ten (0 = 1 run, 6 = 1,000,000)
        #[arg(long)]
        runs_tick: Option<usize>,
        /// Worker threads (0 = one per CPU)
        #[arg(short, long)]
        workers: Option<usize>,
        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Emit the convergence report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Play normal spins
    Spin {
        /// Number of spins
        #[arg(short, long, default_value_t = 1)]
        count: u32,
        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the settings in effect as JSON
    Settings,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_ref())?;

    match cli.command {
        Commands::Analyze { json } => analyze(&settings, json),
        Commands::Simulate {
            runs,
            runs_tick,
            workers,
            seed,
            json,
        } => simulate(settings, runs, runs_tick, workers, seed, json),
        Commands::Spin { count, seed } => spin(settings, count, seed),
        Commands::Settings => {
            println!("{}", settings.to_json()?);
            Ok(())
        }
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<MachineSettings> {
    match path {
        Some(path) => MachineSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Ok(MachineSettings::default()),
    }
}

fn analyze(settings: &MachineSettings, json: bool) -> Result<()> {
    let machine = SlotMachine::new(settings)?;
    let breakdown = machine.payback_breakdown();

    if json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
        return Ok(());
    }

    println!("{:<8} {:>5} {:>8} {:>14} {:>12}", "Symbol", "Count", "Pays", "Probability", "Payback %");
    for row in &breakdown {
        println!(
            "{:<8} {:>5} {:>8} {:>14.8} {:>12.4}",
            row.symbol.name(),
            row.count,
            row.amount,
            row.probability,
            row.contribution
        );
    }
    println!();
    println!("Analytical payback: {:.4}%", machine.analytical_payback());
    Ok(())
}

fn simulate(
    mut settings: MachineSettings,
    runs: Option<u64>,
    runs_tick: Option<usize>,
    workers: Option<usize>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    if let Some(workers) = workers {
        settings.autoplay_workers = workers;
    }
    if seed.is_some() {
        settings.seed = seed;
    }

    let runs = match (runs, runs_tick) {
        (Some(runs), _) => runs,
        (None, Some(tick)) => TickScale::powers_of_ten(MAX_RUNS_EXPONENT).tick_to_scale(tick),
        (None, None) => settings.autoplay_runs,
    };

    let machine = SlotMachine::new(&settings)?;
    let events = machine.start_autoplay(runs)?;

    for event in events {
        match event {
            AutoPlayEvent::Started { runs, workers } => {
                log::info!("Simulating {} runs on {} worker(s)", runs, workers);
            }
            AutoPlayEvent::Progress(percent) => {
                if !json {
                    eprint!("\r{:>3}%", percent);
                    std::io::stderr().flush().ok();
                }
            }
            AutoPlayEvent::Failed(message) => {
                eprintln!();
                bail!("Simulation failed: {}", message);
            }
            AutoPlayEvent::Completed { .. } | AutoPlayEvent::Cancelled { .. } => {
                if !json {
                    eprintln!();
                }
            }
        }
    }

    let state = machine.engine().wait();
    if state != SessionState::Completed {
        bail!("Simulation ended in state {:?}", state);
    }

    let report = machine.convergence_report()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &ConvergenceReport) {
    println!("Runs:               {}", report.runs_completed);
    if let Some(payback) = report.empirical_payback {
        println!("Empirical payback:  {:.4}%", payback);
    }
    println!("Analytical payback: {:.4}%", report.analytical_payback);
    println!();
    println!("{:<8} {:>5} {:>12} {:>14} {:>10}", "Symbol", "Count", "Observed", "Expected", "% of exp.");
    for row in &report.rows {
        let percent = row
            .percent_of_expected
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:>5} {:>12} {:>14.1} {:>10}",
            row.symbol.name(),
            row.count,
            row.observed,
            row.expected,
            percent
        );
    }
}

fn spin(mut settings: MachineSettings, count: u32, seed: Option<u64>) -> Result<()> {
    if seed.is_some() {
        settings.seed = seed;
    }
    let mut machine = SlotMachine::new(&settings)?;
    println!("Credits: {}  Reels: {}", machine.credits(), machine.reels());

    for _ in 0..count {
        if machine.credits() == 0 {
            println!("Out of credits");
            break;
        }
        let spin = machine.spin()?;
        println!(
            "{}  won {:>4}  credits {}",
            spin.outcome,
            spin.credits_won,
            machine.credits()
        );
    }
    Ok(())
}
