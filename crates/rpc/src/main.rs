//! Lendcore CLI - Main entry point

use clap::{Parser, Subcommand};
use lendcore_protocol::{ErrorKind, ProtocolConfig};
use lendcore_rpc::commands::is_business_rejection;
use lendcore_rpc::{load_script, run_script, AppContext};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lendcore")]
#[command(about = "Lendcore - Collateralized lending ledger", long_about = None)]
struct Cli {
    /// Protocol config file (JSON); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a JSON script of operations against a fresh protocol
    Run {
        /// Script file path
        script: PathBuf,
        /// Stop at the first failed step
        #[arg(long)]
        fail_fast: bool,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as JSON
    Config,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            script,
            fail_fast,
            json,
        } => {
            let mut ctx = AppContext::new(cli.config.as_deref())?;
            let steps = load_script(&script)?;
            let report = run_script(&mut ctx, &steps, fail_fast);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for step in &report.steps {
                    match (&step.output, &step.error) {
                        (Some(output), _) => {
                            println!("✅ [{}] {} @{}: {}", step.index, step.op, step.block, output)
                        }
                        (None, Some(error)) => {
                            println!("❌ [{}] {} @{}: {}", step.index, step.op, step.block, error)
                        }
                        (None, None) => println!("❔ [{}] {}", step.index, step.op),
                    }
                }
                println!(
                    "Totals: collateral {}, debt {}, positions {}, paused {}, price {}",
                    report.stats.total_collateral,
                    report.stats.total_debt,
                    report.stats.open_positions,
                    report.stats.paused,
                    report.price
                );
            }

            // Rejections the protocol is designed to make are not script errors
            let unexpected = report
                .error_kinds()
                .into_iter()
                .filter_map(|k| k.parse::<ErrorKind>().ok())
                .filter(|k| !is_business_rejection(*k))
                .count();
            if unexpected > 0 {
                anyhow::bail!("{} step(s) failed unexpectedly", unexpected);
            }
        }

        Commands::Config => {
            let config = match cli.config {
                Some(path) => ProtocolConfig::from_file(&path)?,
                None => ProtocolConfig::default(),
            };
            config.validate()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
