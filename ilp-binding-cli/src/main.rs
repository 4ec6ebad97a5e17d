//! Command-line access to ILP quote commitments.
//!
//! # Usage
//!
//! ```bash
//! # Generate the packet, condition and fulfillment for a quote
//! ILP_SECRET=s3cr3t ilp-binding commit --quote quote.json --response response.json
//!
//! # Inspect a packet
//! ilp-binding decode AQAAAAAAACcQ...
//! ilp-binding transaction AQAAAAAAACcQ...
//!
//! # Check a transfer against the packet it carries
//! ILP_SECRET=s3cr3t ilp-binding check --transfer transfer.json
//! ```
//!
//! # Environment Variables
//!
//! - `ILP_SECRET` - HMAC key for fulfillment derivation
//! - `ILP_ACCOUNT` - Packet account (default: `g.placeholder.payee`)
//! - `RUST_LOG` - Log level filter (default: `info`)
//!
//! A `.env` file in the working directory is loaded first.

#![allow(clippy::print_stdout)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ilp_binding::config::{DEFAULT_ACCOUNT, IlpConfig};
use ilp_binding::{ConditionGenerator, IlpBinding, IlpError, validator};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ilp-binding", version, about = "Generate and check ILP quote commitments")]
struct Cli {
    /// HMAC key used to derive fulfillments.
    #[arg(long, env = "ILP_SECRET", hide_env_values = true, global = true)]
    secret: Option<String>,

    /// ILP address written into generated packets.
    #[arg(long, env = "ILP_ACCOUNT", default_value = DEFAULT_ACCOUNT, global = true)]
    account: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate the commitment for a quote request and partial response.
    Commit {
        /// Path to the quote request JSON.
        #[arg(long)]
        quote: PathBuf,
        /// Path to the partial quote response JSON.
        #[arg(long)]
        response: PathBuf,
    },
    /// Decode a base64 ILP packet.
    Decode {
        /// The packet.
        packet: String,
    },
    /// Print the transaction object embedded in a packet.
    Transaction {
        /// The packet.
        packet: String,
    },
    /// Compute the condition of a fulfillment.
    Condition {
        /// Base64url fulfillment.
        fulfillment: String,
    },
    /// Check that a fulfillment matches a condition.
    Verify {
        /// Base64url fulfillment.
        fulfillment: String,
        /// Base64url condition.
        condition: String,
    },
    /// Check a transfer request against its packet.
    Check {
        /// Path to the transfer request JSON.
        #[arg(long)]
        transfer: PathBuf,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Ilp(#[from] IlpError),
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            if let CliError::Ilp(err) = &e {
                tracing::error!(reason = %err.reason(), "{e}");
            } else {
                tracing::error!("{e}");
            }
            ExitCode::from(2)
        }
    }
}

/// Runs a command, returning whether its check passed.
fn run(cli: Cli) -> Result<bool, CliError> {
    match cli.command {
        Command::Commit { quote, response } => {
            let binding = binding(cli.secret, cli.account)?;
            let quote = read_json(&quote)?;
            let response = read_json(&response)?;
            let commitment = binding.generate_quote_response_commitment(&quote, &response)?;
            tracing::info!(condition = %commitment.condition, "Generated commitment");
            print_json(&json!(commitment));
            Ok(true)
        }
        Command::Decode { packet } => {
            let packet = validator::decode_packet(&packet)?;
            print_json(&json!({
                "amount": packet.amount,
                "account": packet.account,
                "data": String::from_utf8_lossy(&packet.data),
            }));
            Ok(true)
        }
        Command::Transaction { packet } => {
            let transaction = validator::get_transaction_object(&packet)?;
            print_json(&json!(transaction));
            Ok(true)
        }
        Command::Condition { fulfillment } => {
            println!("{}", ConditionGenerator::calculate_condition(&fulfillment)?);
            Ok(true)
        }
        Command::Verify {
            fulfillment,
            condition,
        } => {
            let valid = ConditionGenerator::validate_fulfillment(&fulfillment, &condition);
            println!("{valid}");
            Ok(valid)
        }
        Command::Check { transfer } => {
            let binding = binding(cli.secret, cli.account)?;
            let check = binding.check_transfer(&read_json(&transfer)?)?;
            print_json(&json!({
                "valid": check.is_valid(),
                "conditionMatches": check.condition_matches,
                "mismatch": check.mismatch.map(|m| m.field()),
                "fulfillment": check.fulfillment.to_base64url(),
            }));
            Ok(check.is_valid())
        }
    }
}

fn binding(secret: Option<String>, account: String) -> Result<IlpBinding, CliError> {
    let secret = secret.ok_or(IlpError::MissingSecret)?;
    let config = IlpConfig::new(secret).with_account(account);
    Ok(IlpBinding::from_config(&config)?)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::Json {
        path: path.to_owned(),
        source,
    })
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => tracing::error!("failed to render output: {e}"),
    }
}
