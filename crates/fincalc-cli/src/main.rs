//! fincalc: run the tax, capital-gains and goal calculators on JSON inputs.
//!
//! Usage:
//!   fincalc tax input.json [--strict]
//!   fincalc compare input.json [--strict]
//!   fincalc capital-gains portfolio.json [--tax-input input.json]
//!   fincalc harvest portfolio.json [--csv harvest.csv]
//!   fincalc redeem portfolio.json --target 250000
//!   fincalc summary portfolio.json [--csv summary.csv]
//!   fincalc goals goals.json

mod commands;
mod config;

use anyhow::{bail, Context, Result};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str =
    "fincalc_cli=info,income_tax=warn,tax_optimizer=warn,goal_planner=warn";

fn init_logging(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    // Logs go to stderr so stdout stays valid JSON
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn option_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  fincalc tax <input.json> [--strict]              Income tax for one regime");
    eprintln!("  fincalc compare <input.json> [--strict]          Old vs new regime");
    eprintln!("  fincalc capital-gains <portfolio.json>           Tax on planned redemptions");
    eprintln!("  fincalc harvest <portfolio.json> [--csv PATH]    Loss harvesting opportunities");
    eprintln!("  fincalc redeem <portfolio.json> --target N       Lowest-tax way to raise N");
    eprintln!("  fincalc summary <portfolio.json> [--csv PATH]    Portfolio tax summary");
    eprintln!("  fincalc goals <goals.json>                       Goal funding plans");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --strict             Reject negative amounts instead of clamping");
    eprintln!("  --tax-input PATH     Use the marginal slab rate from a tax input for debt STCG");
    eprintln!();
    eprintln!("Environment: FINCALC_AS_OF, FINCALC_DEBT_SLAB_RATE, RUST_LOG, RUST_LOG_FORMAT");
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    init_logging(config.json_logging);

    let args: Vec<String> = std::env::args().collect();
    let (command, input) = match (args.get(1), args.get(2)) {
        (Some(command), Some(input)) if !input.starts_with("--") => {
            (command.as_str(), PathBuf::from(input))
        }
        _ => {
            print_usage();
            std::process::exit(1);
        }
    };

    let strict = args.iter().any(|a| a == "--strict");
    let tax_input = option_value(&args, "--tax-input").map(PathBuf::from);
    let csv_out = option_value(&args, "--csv").map(PathBuf::from);

    tracing::debug!(command, as_of = %config.as_of, "running");

    let output = match command {
        "tax" => commands::tax(&input, strict)?,
        "compare" => commands::compare(&input, strict)?,
        "capital-gains" => commands::capital_gains(&input, &config, tax_input.as_deref())?,
        "harvest" => {
            commands::harvest(&input, &config, tax_input.as_deref(), csv_out.as_deref())?
        }
        "redeem" => {
            let target: f64 = option_value(&args, "--target")
                .context("redeem needs --target <amount>")?
                .parse()
                .context("--target must be a number")?;
            commands::redeem(&input, target, &config, tax_input.as_deref())?
        }
        "summary" => {
            commands::summary(&input, &config, tax_input.as_deref(), csv_out.as_deref())?
        }
        "goals" => commands::goals(&input)?,
        other => {
            print_usage();
            bail!("Unknown command: {}", other);
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
