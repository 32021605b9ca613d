//! Kuhn Poker strategy evaluation binary.
//!
//! Loads one average-strategy artifact per player, prints the expected
//! per-player payoffs under those policies with chance enumerated, then the
//! exploitability of the profile.
//!
//! Usage:
//!   cargo run --release --bin evaluate -- \
//!       --strategy-path-0 <FILE> --strategy-path-1 <FILE> [--seed <N>]

use std::env;
use std::process;

use cfr_solver::agent::CfrAgent;
use cfr_solver::cfr::exploitability::{expected_payoffs, exploitability, StrategyFn};
use cfr_solver::cfr::Game;
use cfr_solver::games::kuhn::KuhnGame;

fn print_help() {
    println!("Kuhn Poker strategy evaluator");
    println!();
    println!("Options:");
    for player in 0..KuhnGame::player_num() {
        println!(
            "  --strategy-path-{} <FILE>  Average-strategy artifact for player {} (required)",
            player, player
        );
    }
    println!("  --seed, -s <N>            Random seed (accepted for interface parity;");
    println!("                            the evaluation itself is deterministic)");
    println!("  --help, -h                Show this help");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let player_num = KuhnGame::player_num();
    let mut strategy_paths: Vec<Option<String>> = vec![None; player_num];

    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        if let Some(index) = arg.strip_prefix("--strategy-path-") {
            let player: usize = match index.parse() {
                Ok(p) if p < player_num => p,
                _ => {
                    eprintln!("{}: player index must be in 0..{}", arg, player_num);
                    process::exit(2);
                }
            };
            i += 1;
            if i < args.len() {
                strategy_paths[player] = Some(args[i].clone());
            }
        } else {
            match arg {
                "--seed" | "-s" => {
                    i += 1;
                    if i < args.len() && args[i].parse::<u32>().is_err() {
                        eprintln!("--seed expects a 32-bit unsigned integer, got \"{}\"", args[i]);
                        process::exit(2);
                    }
                }
                "--help" | "-h" => {
                    print_help();
                    return;
                }
                _ => {
                    eprintln!("Unknown argument: {}", arg);
                    print_help();
                    process::exit(2);
                }
            }
        }
        i += 1;
    }

    let mut agents: Vec<CfrAgent<KuhnGame>> = Vec::with_capacity(player_num);
    for (player, path) in strategy_paths.iter().enumerate() {
        let path = match path {
            Some(path) => path,
            None => {
                eprintln!("--strategy-path-{} is required", player);
                print_help();
                process::exit(2);
            }
        };
        match CfrAgent::from_file(path) {
            Ok(agent) => agents.push(agent),
            Err(e) => {
                eprintln!("failed to load strategy for player {}: {}", player, e);
                process::exit(1);
            }
        }
    }

    let strategies: Vec<StrategyFn<'_, KuhnGame>> = agents
        .iter()
        .map(|agent| {
            Box::new(move |game: &KuhnGame| agent.strategy(game).to_vec())
                as StrategyFn<'_, KuhnGame>
        })
        .collect();

    let game = KuhnGame::new();

    let payoffs = expected_payoffs(&game, &strategies);
    let formatted: Vec<String> = payoffs.iter().map(|p| format!("{}", p)).collect();
    println!("expected player payoffs: ({})", formatted.join(","));

    let value = exploitability(&game, &strategies);
    println!("strategy exploitability: {}", value);
}
