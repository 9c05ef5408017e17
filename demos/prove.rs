use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use eqprover::engine::Engine;
use eqprover::policy::{LinearPolicy, PriorityPolicy};
use eqprover::prover::{Prover, ProverConfig, Strategy};

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// First expression.
    #[arg(value_name = "EXPR")]
    expr1: String,

    /// Second expression.
    #[arg(value_name = "EXPR")]
    expr2: String,

    /// Proof strategy: automatic, direct, contrapositive, absurd or bidirectional.
    #[clap(long, default_value = "automatic")]
    strategy: Strategy,

    /// Iteration budget per strategy.
    #[clap(long, value_name = "INT", default_value = "50")]
    max_iterations: usize,

    /// Random seed.
    #[clap(long, value_name = "INT", default_value = "42")]
    seed: u64,

    /// Pairwise linear policy (JSON with `weights` and `bias`).
    #[clap(long, value_name = "FILE")]
    policy: Option<PathBuf>,

    /// Single-expression linear policy (JSON with `weights` and `bias`).
    #[clap(long, value_name = "FILE")]
    simplify_policy: Option<PathBuf>,

    /// Include the truth table.
    #[clap(long)]
    truth_table: bool,

    /// Search the proof for shortcuts.
    #[clap(long)]
    optimize: bool,

    /// Log every rewrite.
    #[clap(short, long)]
    verbose: bool,

    /// Print the report as JSON.
    #[clap(long)]
    json: bool,

    /// Write the final state of expression 1 as a DOT file.
    #[clap(long, value_name = "FILE")]
    dot: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    log::debug!("args = {:?}", args);

    let mut builder = Engine::builder();
    builder = match &args.policy {
        Some(path) => builder.pair_policy(LinearPolicy::pair_from_json(&std::fs::read_to_string(path)?)?),
        None => builder.pair_policy(PriorityPolicy),
    };
    builder = match &args.simplify_policy {
        Some(path) => builder.simplify_policy(LinearPolicy::simplify_from_json(&std::fs::read_to_string(path)?)?),
        None => builder.simplify_policy(PriorityPolicy),
    };
    let prover = Prover::new(builder.build()?);

    let config = ProverConfig::default()
        .with_strategy(args.strategy)
        .with_max_iterations(args.max_iterations)
        .with_verbose(args.verbose)
        .with_truth_table(args.truth_table)
        .with_optimize(args.optimize);

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let time_total = std::time::Instant::now();
    let report = prover.prove(&args.expr1, &args.expr2, &config, &mut rng)?;
    let elapsed = time_total.elapsed();

    if let Some(path) = &args.dot {
        std::fs::write(path, report.final1.to_dot()?)?;
        println!("Wrote {}", path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} ≡ {} ?", report.initial1, report.initial2);
    for t in &report.transformations {
        let marker = if t.policy_guided { "*" } else { " " };
        println!(
            "{:>4}{} [{}] {:<24} {}   |   {}",
            t.iteration, marker, t.target, t.law.name(), t.expr1, t.expr2
        );
    }

    if let Some(table) = &report.truth_table {
        println!();
        let mut header: Vec<&str> = table.columns.iter().map(String::as_str).collect();
        header.extend(table.subexpressions1.iter().map(String::as_str));
        header.extend(table.subexpressions2.iter().map(String::as_str));
        println!("{} | P1 | P2", header.join(" | "));
        for row in &table.rows {
            let cell = |b: bool| if b { "T" } else { "F" };
            let mut cells: Vec<&str> = table.columns.iter().map(|c| cell(row.values[c])).collect();
            cells.extend(table.subexpressions1.iter().map(|s| cell(row.subvalues1[s])));
            cells.extend(table.subexpressions2.iter().map(|s| cell(row.subvalues2[s])));
            println!("{} | {} | {}", cells.join(" | "), cell(row.value1), cell(row.value2));
        }
    }

    if let Some(opt) = &report.optimization {
        println!();
        match &opt.best {
            Some(best) => println!(
                "Optimized: {} -> {} steps (shortcut {:?} -> step {}, {} shortcuts found)",
                opt.original_steps,
                opt.optimized_steps,
                best.from_step,
                best.to_step,
                opt.shortcuts.len()
            ),
            None => println!("Not optimized: {:?}", opt.reason),
        }
    }

    println!();
    println!("method: {:?}", report.method_used);
    println!("iterations: {} ({} policy-guided)", report.iterations, report.policy_steps);
    println!("{}", report.message);
    println!("Total time: {:.3} s", elapsed.as_secs_f64());

    Ok(())
}
