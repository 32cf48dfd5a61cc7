//! Developer CLI for counselkit.
//!
//! `registry verify` is the process-bootstrap precondition: it runs the
//! four-stage trust gate and exits non-zero on any failure, so a wrapping
//! launcher can refuse to start registry consumers. The `vault`
//! subcommands expose the four record-store operations for inspection and
//! scripting.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use counselkit_core::registry::{Ed25519Verifier, RegistryGate, RegistryPaths};
use counselkit_core::vault::RecordStore;
use eyre::{eyre, WrapErr};
use secrecy::SecretString;

#[derive(Parser)]
#[command(name = "counselkit", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Operate on the encrypted record vault.
    Vault {
        #[command(flatten)]
        opts: VaultOpts,
        #[command(subcommand)]
        command: VaultCommand,
    },
    /// Verify the trusted-model registry artifact set.
    Registry {
        #[command(subcommand)]
        command: RegistryCommand,
    },
}

#[derive(Args)]
struct VaultOpts {
    /// Path of the encrypted vault file. Defaults to
    /// `<data dir>/counselkit/vault.bin`.
    #[arg(long, env = "COUNSELKIT_VAULT_PATH")]
    store_path: Option<PathBuf>,

    /// Vault passphrase, minimum 16 characters. Prefer the environment
    /// variable over the flag so the secret stays out of shell history.
    #[arg(long, env = "COUNSELKIT_VAULT_PASSPHRASE", hide_env_values = true)]
    passphrase: String,
}

#[derive(Subcommand)]
enum VaultCommand {
    /// List all records.
    List,
    /// Print the record stored under an id.
    Get {
        /// Record identifier.
        id: String,
    },
    /// Create or update a record. The value is parsed as JSON.
    Put {
        /// Record identifier.
        id: String,
        /// JSON value to store.
        value: String,
    },
    /// Remove a record.
    Delete {
        /// Record identifier.
        id: String,
    },
}

#[derive(Subcommand)]
enum RegistryCommand {
    /// Run the four-stage trust gate. Exits non-zero on any failure.
    Verify {
        /// Deployment root the artifact paths resolve against.
        #[arg(long, env = "COUNSELKIT_REGISTRY_ROOT")]
        root: PathBuf,

        /// Maximum accepted signature age in days.
        #[arg(long, default_value_t = 180)]
        max_age_days: u64,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Command::Vault { opts, command } => run_vault(opts, command).await,
        Command::Registry {
            command: RegistryCommand::Verify { root, max_age_days },
        } => run_registry_verify(root, max_age_days).await,
    }
}

async fn run_vault(opts: VaultOpts, command: VaultCommand) -> eyre::Result<()> {
    let path = match opts.store_path {
        Some(path) => path,
        None => default_store_path()?,
    };
    let store = RecordStore::open(path, SecretString::from(opts.passphrase))
        .await
        .wrap_err("failed to open the record store")?;

    match command {
        VaultCommand::List => {
            let records = store.list().await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        VaultCommand::Get { id } => match store.get(&id).await? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => println!("not found"),
        },
        VaultCommand::Put { id, value } => {
            let value: serde_json::Value = serde_json::from_str(&value)
                .wrap_err("value must be valid JSON")?;
            let record = store.put(&id, value).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        VaultCommand::Delete { id } => {
            let existed = store.delete(&id).await?;
            println!("{}", if existed { "deleted" } else { "not found" });
        }
    }
    Ok(())
}

async fn run_registry_verify(root: PathBuf, max_age_days: u64) -> eyre::Result<()> {
    let gate = RegistryGate::new(RegistryPaths::new(&root), Ed25519Verifier)
        .with_max_signature_age(Duration::from_secs(max_age_days * 24 * 60 * 60));
    gate.verify()
        .await
        .wrap_err("model registry validation failed")?;
    println!("registry verified: {}", root.display());
    Ok(())
}

fn default_store_path() -> eyre::Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("counselkit").join("vault.bin"))
        .ok_or_else(|| eyre!("no platform data directory; pass --store-path"))
}
