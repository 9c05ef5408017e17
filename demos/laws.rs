//! Law catalogue: shows where each equivalence law matches an expression and what it rewrites to.
//!
//! Run with:
//! ```bash
//! cargo run --example laws -- "(p ^ q) v (p ^ ~q)"
//! ```

use clap::Parser;

use eqprover::expr::Expr;
use eqprover::features::usefulness;
use eqprover::laws::Law;
use eqprover::paths::subexpr_at;

#[derive(Debug, Parser)]
#[command(author, version, about = "Equivalence law catalogue")]
struct Cli {
    /// Expression to inspect
    #[arg(default_value = "~(p ^ (q v T)) -> ~~r")]
    expr: String,

    /// Only show laws that match somewhere
    #[arg(long)]
    matching: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let expr: Expr = cli.expr.parse()?;

    println!("expression: {}", expr);
    println!("size = {}, depth = {}, leaves = {}", expr.size(), expr.depth(), expr.leaf_count());
    let u = usefulness(&expr);
    println!(
        "useful = {:?}, useless = {:?}, tautology = {}, contradiction = {}",
        u.useful, u.useless, u.is_tautology, u.is_contradiction
    );
    println!();

    println!("{:<24} {:<15} {:>6}  first rewrite", "Law", "Kind", "Sites");
    println!("{}", "-".repeat(80));
    for law in Law::ALL {
        let paths = law.find(&expr);
        if cli.matching && paths.is_empty() {
            continue;
        }
        let first = match paths.first() {
            Some(path) => {
                let site = subexpr_at(&expr, path).map(|e| e.to_string()).unwrap_or_default();
                format!("{}  =>  {}", site, law.apply_at(&expr, path))
            }
            None => "-".to_string(),
        };
        println!("{:<24} {:<15} {:>6}  {}", law.name(), format!("{:?}", law.kind()), paths.len(), first);
    }

    Ok(())
}
