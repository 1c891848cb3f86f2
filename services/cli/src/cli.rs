use crate::commands::{run_explain, run_rules, run_score, ExplainArgs, RulesArgs, ScoreArgs};
use clap::{Parser, Subcommand};
use credit_risk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "credit-risk",
    about = "Score German Credit customers with configurable risk rules",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load, clean, encode and score a dataset, then save the risk report (default command)
    Score(ScoreArgs),
    /// Show the per-field score breakdown for one customer
    Explain(ExplainArgs),
    /// Print the built-in German Credit rule configuration as JSON
    Rules(RulesArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Score(ScoreArgs::default()));

    match command {
        Command::Score(args) => run_score(args),
        Command::Explain(args) => run_explain(args),
        Command::Rules(args) => run_rules(args),
    }
}
