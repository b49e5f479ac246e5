pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "tally",
    about = "Tally order pricing CLI",
    long_about = "Price a cart against a catalog dataset, applying promotion scopes and rules.",
    after_help = "Examples:\n  tally quote --dataset store.json --cart cart.json\n  tally quote --dataset store.json --cart cart.json --promo COMBO\n  tally check --dataset store.json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Compute a quote for a cart file and print the result as JSON")]
    Quote {
        #[arg(long, help = "Catalog + promotion dataset file (JSON)")]
        dataset: PathBuf,
        #[arg(long, help = "Cart request file (JSON)")]
        cart: PathBuf,
        #[arg(long, help = "Promotion code, overriding the one in the cart file")]
        promo: Option<String>,
        #[arg(long, help = "Engine config file (TOML)")]
        config: Option<PathBuf>,
    },
    #[command(about = "Validate a dataset: malformed promotion rows and unpriceable products")]
    Check {
        #[arg(long, help = "Catalog + promotion dataset file (JSON)")]
        dataset: PathBuf,
    },
}

pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Quote { dataset, cart, promo, config } => {
            commands::quote::run(&dataset, &cart, promo.as_deref(), config.as_deref())
        }
        Command::Check { dataset } => commands::check::run(&dataset),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
