//! Rounds-to-certainty experiment CLI.
//!
//! Simulate many battles and report how quickly the tracked character's
//! attack modifier and armor class become certain.
//!
//! Usage:
//!   cargo run --bin simulate -- [OPTIONS]
//!
//! Examples:
//!   cargo run --bin simulate                       # Default: 10,000 trials
//!   cargo run --bin simulate -- -n 500 -s 42       # Reproducible short run
//!   cargo run --bin simulate -- --results out.json # Save per-trial samples

use combat_inference::simulator::{run_experiment, Matchup, SimConfig};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

struct CliOptions {
    config: SimConfig,
    save_json: bool,
    results_path: Option<PathBuf>,
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args);
    let config = &options.config;

    init_logging(config.verbosity);

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              COMBAT INFERENCE SIMULATOR                       ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Configuration:");
    println!("  Trials:         {}", config.num_trials);
    println!("  Max Rounds:     {}", config.max_rounds);
    println!("  Tracked Side:   {}", config.tracked_side);
    println!("  Stop on Resolve: {}", config.track_convergence);
    println!("  Parallel:       {}", config.parallel);
    for character in config.matchup.party(config.tracked_side) {
        println!(
            "  Tracked:        {} (modifier {:+}, AC {})",
            character.name,
            character.attack_modifier(),
            character.armor_class()
        );
    }
    if let Some(seed) = config.seed {
        println!("  Seed:           {}", seed);
    }
    println!();
    println!("Running simulation...");
    println!();

    let report = match run_experiment(config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Simulation failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", report.to_text());

    if let Some(path) = &options.results_path {
        if let Err(e) = report.save_results(path) {
            eprintln!("Failed to write results to {}: {}", path.display(), e);
            std::process::exit(1);
        }
        println!("Per-trial results saved to: {}", path.display());
    }

    if options.save_json {
        let json = report.to_json();
        let filename = format!(
            "sim_report_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        if let Err(e) = std::fs::write(&filename, json) {
            eprintln!("Failed to write JSON report: {}", e);
            std::process::exit(1);
        }
        println!("JSON report saved to: {}", filename);
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::OFF,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_args(args: &[String]) -> CliOptions {
    let mut config = SimConfig::default();
    let mut save_json = false;
    let mut results_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--trials" => {
                if i + 1 < args.len() {
                    config.num_trials = args[i + 1].parse().unwrap_or(10_000);
                    i += 1;
                }
            }
            "-s" | "--seed" => {
                if i + 1 < args.len() {
                    config.seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "-r" | "--max-rounds" => {
                if i + 1 < args.len() {
                    config.max_rounds = args[i + 1].parse().unwrap_or(1_000);
                    i += 1;
                }
            }
            "-m" | "--matchup" => {
                if i + 1 < args.len() {
                    match Matchup::load(&args[i + 1]) {
                        Ok(matchup) => config.matchup = matchup,
                        Err(e) => {
                            eprintln!("Failed to load matchup {}: {}", args[i + 1], e);
                            std::process::exit(2);
                        }
                    }
                    i += 1;
                }
            }
            "--results" => {
                if i + 1 < args.len() {
                    results_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--no-resolve" => {
                config.track_convergence = false;
            }
            "--sequential" => {
                config.parallel = false;
            }
            "--json" => {
                save_json = true;
            }
            "-v" | "--verbose" => {
                config.verbosity = (config.verbosity + 1).min(3);
            }
            "-q" | "--quiet" => {
                config.verbosity = 0;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    CliOptions {
        config,
        save_json,
        results_path,
    }
}

fn print_help() {
    println!("Combat Inference Simulator");
    println!();
    println!("USAGE:");
    println!("    cargo run --bin simulate -- [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -n, --trials <N>      Number of battles to simulate (default: 10000)");
    println!("    -s, --seed <S>        Base random seed for reproducibility");
    println!("    -r, --max-rounds <R>  Round cap per battle (default: 1000)");
    println!("    -m, --matchup <FILE>  Load both parties from a JSON file");
    println!("    --no-resolve          Fight until a party falls, even once certain");
    println!("    --sequential          Run trials on one thread");
    println!("    --results <FILE>      Save per-trial rounds-to-certainty as JSON");
    println!("    --json                Save JSON summary report");
    println!("    -v, --verbose         More log output (repeat for per-attack logs)");
    println!("    -q, --quiet           No log output");
    println!("    -h, --help            Show this help");
    println!();
    println!("EXAMPLES:");
    println!("    cargo run --bin simulate                        # Default run");
    println!("    cargo run --bin simulate -- -n 500 -s 42        # Reproducible");
    println!("    cargo run --bin simulate -- -m party.json -v -v # Custom matchup");
}
