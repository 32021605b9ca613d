//! Kuhn Poker CFR training binary.
//!
//! Usage:
//!   cargo run --release --bin train -- [OPTIONS]
//!
//! Options:
//!   --algorithm <MODE>     CFR variant: standard, chance, external, outcome
//!                          (default: standard)
//!   --iteration <N>        Number of iterations (required)
//!   --seed <N>             Random seed, 32-bit (default: from entropy)
//!   --strategy-dir <DIR>   Artifact root directory (default: strategies)

use std::env;
use std::process;

use cfr_solver::cfr::{Mode, Trainer, TrainerConfig};
use cfr_solver::games::kuhn::KuhnGame;

fn print_help() {
    println!("Kuhn Poker CFR trainer");
    println!();
    println!("Options:");
    println!("  --algorithm, -a <MODE>   CFR variant computing the equilibrium");
    println!("                           (standard, chance, external, outcome; default standard)");
    println!("  --iteration, -i <N>      Number of CFR iterations (required)");
    println!("  --seed, -s <N>           Random seed used to initialize the generator (u32)");
    println!("  --strategy-dir <DIR>     Directory strategy artifacts are written under");
    println!("  --help, -h               Show this help");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut algorithm = "standard".to_string();
    let mut iterations: Option<u64> = None;
    let mut seed: Option<u64> = None;
    let mut strategy_dir = "strategies".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--algorithm" | "-a" => {
                i += 1;
                if i < args.len() {
                    algorithm = args[i].clone();
                }
            }
            "--iteration" | "-i" => {
                i += 1;
                if i < args.len() {
                    iterations = args[i].parse().ok();
                    if iterations.is_none() {
                        eprintln!("--iteration expects a nonnegative integer, got \"{}\"", args[i]);
                        process::exit(2);
                    }
                }
            }
            "--seed" | "-s" => {
                i += 1;
                if i < args.len() {
                    match args[i].parse::<u32>() {
                        Ok(s) => seed = Some(u64::from(s)),
                        Err(_) => {
                            eprintln!("--seed expects a 32-bit unsigned integer, got \"{}\"", args[i]);
                            process::exit(2);
                        }
                    }
                }
            }
            "--strategy-dir" => {
                i += 1;
                if i < args.len() {
                    strategy_dir = args[i].clone();
                }
            }
            "--help" | "-h" => {
                print_help();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                process::exit(2);
            }
        }
        i += 1;
    }

    let mode: Mode = match algorithm.parse() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };
    let iterations = match iterations {
        Some(n) => n,
        None => {
            eprintln!("--iteration is required");
            print_help();
            process::exit(2);
        }
    };

    let mut config = TrainerConfig::default()
        .with_mode(mode)
        .with_strategy_dir(strategy_dir);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    println!("training kuhn with {} CFR for {} iterations", mode, iterations);

    let mut trainer = Trainer::new(KuhnGame::new(), config);
    match trainer.train(iterations) {
        Ok(stats) => {
            println!();
            println!(
                "done: {} iterations in {:.2}s ({:.0} it/s), {} info sets, {} nodes touched",
                stats.iterations,
                stats.elapsed_seconds,
                stats.iterations_per_second,
                stats.info_sets,
                stats.node_touched
            );
        }
        Err(e) => {
            eprintln!("training failed: {}", e);
            process::exit(1);
        }
    }
}
