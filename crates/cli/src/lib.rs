pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::resolve::ResolveArgs;

#[derive(Debug, Parser)]
#[command(
    name = "motofleet",
    about = "Motofleet spare-parts pricing CLI",
    long_about = "Operate the spare-parts price resolution engine: migrations, demo catalog, config inspection, readiness checks, and one-off resolutions.",
    after_help = "Examples:\n  motofleet doctor --json\n  motofleet seed\n  motofleet resolve --part 1 --customer 1 --quantity 2"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending catalog migrations and return structured status output")]
    Migrate,
    #[command(about = "Load and verify the deterministic demo catalog (idempotent)")]
    Seed,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, pricing policy, and catalog database readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Resolve the price of one part against the configured catalog")]
    Resolve {
        #[arg(long, help = "Part id to price")]
        part: i64,
        #[arg(long, help = "Customer id; selects the customer's group list and discounts")]
        customer: Option<i64>,
        #[arg(long, help = "Price list code; overrides customer and default list selection")]
        list: Option<String>,
        #[arg(long, default_value_t = 1, help = "Units requested")]
        quantity: u32,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Resolve { part, customer, list, quantity } => {
            commands::resolve::run(ResolveArgs { part, customer, list, quantity })
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
