// Standalone replay tool for logged Snake agents
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Options:
//   --all                      Replay the best agent of every generation
//   --generations <g1,g2>      Replay specific generations (comma-separated)
//   --show                     Print every frame of the replayed episodes
//   --verbose                  Show detailed output for each generation

use std::env;
use std::process;

use snake_evolution::replay::{ReplayEngine, ReplayResult};
use snake_evolution::training_log::load_log_file;

fn print_usage() {
    eprintln!("Snake Evolution Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --all                     Replay the best agent of every generation");
    eprintln!("  --generations <G1,G2,...> Replay specific generations (comma-separated)");
    eprintln!("  --show                    Print every frame of the replayed episodes");
    eprintln!("  --verbose                 Show detailed output for each generation");
    eprintln!("  --help                    Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  # Check every logged generation replays identically");
    eprintln!("  replay evolution_log.jsonl --all");
    eprintln!();
    eprintln!("  # Watch the best agent of generation 42");
    eprintln!("  replay evolution_log.jsonl --generations 42 --show");
}

fn parse_generations(s: &str) -> Result<Vec<usize>, String> {
    s.split(',')
        .map(|g| {
            g.trim()
                .parse::<usize>()
                .map_err(|e| format!("Invalid generation number '{}': {}", g, e))
        })
        .collect()
}

fn print_result(result: &ReplayResult, grid_size: i32, show: bool) {
    if show {
        for frame in &result.frames {
            let heading = frame.direction.map(|d| d.as_str()).unwrap_or("-");
            println!(
                "Tick {} ({}) score {}{}",
                frame.tick,
                heading,
                frame.score,
                if frame.alive { "" } else { " DEAD" }
            );
            print!("{}", frame.render(grid_size));
            println!();
        }
    }

    let cause = result.death_cause.map(|c| c.as_str()).unwrap_or("none");
    println!(
        "Generation {:>4}: {} score {} fitness {:.2} ({} ticks, death: {})",
        result.generation,
        if result.matches { "MATCH   " } else { "MISMATCH" },
        result.replayed_score,
        result.replayed_fitness,
        result.frames.len().saturating_sub(1),
        cause
    );
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.iter().any(|a| a == "--help") {
        print_usage();
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let log_file = &args[1];
    let mut replay_all = false;
    let mut generations: Option<Vec<usize>> = None;
    let mut show = false;
    let mut verbose = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--all" => replay_all = true,
            "--show" => show = true,
            "--verbose" => verbose = true,
            "--generations" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("Error: --generations requires a value");
                    process::exit(1);
                };
                match parse_generations(value) {
                    Ok(g) => generations = Some(g),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        process::exit(1);
                    }
                }
            }
            other => {
                eprintln!("Error: unknown option '{}'", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    if verbose && env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let entries = match load_log_file(log_file) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if entries.is_empty() {
        eprintln!("No generations found in: {}", log_file);
        process::exit(1);
    }

    let engine = ReplayEngine::new(verbose);
    let results = match generations {
        Some(g) => match engine.replay_generations(&entries, &g) {
            Ok(results) => results,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None if replay_all => engine.replay_all(&entries),
        // Default: the last logged generation
        None => match entries.last().map(|e| engine.replay_entry(e)) {
            Some(Ok(result)) => vec![result],
            Some(Err(e)) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
            None => Vec::new(),
        },
    };

    for result in &results {
        let grid_size = entries
            .iter()
            .find(|e| e.summary.generation == result.generation)
            .map(|e| e.summary.best_agent.grid_size)
            .unwrap_or(0);
        print_result(result, grid_size, show);
    }

    let stats = engine.generate_stats(&results);
    println!();
    println!(
        "Replayed {} generations: {} match, {} mismatch ({:.1}% match rate)",
        stats.total_generations, stats.matches, stats.mismatches, stats.match_rate
    );

    if stats.mismatches > 0 {
        process::exit(2);
    }
}
