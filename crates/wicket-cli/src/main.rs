//! wicket - terminal front end for the invitation gate
//!
//! Usage:
//!   wicket run       Interactive session (/switch, /quit)
//!   wicket codes     Print the activation code whitelist
//!   wicket inspect   Print the persisted slots

mod error;
mod file_store;
mod terminal;

use crate::error::{CliError, Result};
use crate::file_store::FileStore;
use crate::terminal::TerminalPresenter;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wicket_gate::{Gate, GateConfig, LastCredentials, Registry};

fn print_usage() {
    eprintln!("wicket - Invitation gate in your terminal");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  wicket run       Start an interactive session");
    eprintln!("  wicket codes     List valid activation codes");
    eprintln!("  wicket inspect   Show persisted gate state");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  WICKET_STORE          Store file (default: ./wicket-data/store.json)");
    eprintln!("  WICKET_POLICY         strict | sticky | prefill (default: strict)");
    eprintln!("  WICKET_REMEMBER       Remember credentials for prefill (true/false)");
    eprintln!("  WICKET_MAX_ATTEMPTS   Attempts before lockout (default: 3)");
    eprintln!("  WICKET_CODE_COUNT, WICKET_CODE_STEP, WICKET_CODE_PREFIX, WICKET_CODE_YEAR");
    eprintln!("  WICKET_KEY_NAMESPACE  Storage key prefix (default: pfm)");
}

fn get_store_path() -> PathBuf {
    std::env::var("WICKET_STORE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./wicket-data/store.json"))
}

/// Snapshot of the four persisted slots.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Inspection {
    store: PathBuf,
    policy: String,
    locked: bool,
    last_guest: Option<String>,
    last_credentials: Option<LastCredentials>,
    registry: Registry,
}

fn open_gate() -> Result<Gate<FileStore>> {
    let config = GateConfig::from_env()?;
    let store = FileStore::open(get_store_path())?;
    tracing::debug!(path = %store.path().display(), policy = %config.policy, "store opened");
    Ok(Gate::new(config, store))
}

async fn execute(command: &str) -> Result<()> {
    match command {
        "run" => {
            let mut gate = open_gate()?;
            tracing::info!(policy = %gate.config().policy, "starting session");
            let mut presenter = TerminalPresenter::new(std::io::stdout());
            terminal::run(&mut gate, &mut presenter).await
        }
        "codes" => {
            let config = GateConfig::from_env()?;
            let gate = Gate::new(config, wicket_gate::MemoryStore::new());
            for code in gate.whitelist().codes() {
                println!("{}", code);
            }
            Ok(())
        }
        "inspect" => {
            let gate = open_gate()?;
            let store = gate.store();
            let inspection = Inspection {
                store: store.backend().path().to_path_buf(),
                policy: gate.config().policy.to_string(),
                locked: store.is_locked(),
                last_guest: store.last_guest(),
                last_credentials: store.last_credentials(),
                registry: store.load_registry(),
            };
            println!("{}", serde_json::to_string_pretty(&inspection)?);
            Ok(())
        }
        other => Err(CliError::Usage(format!("Unknown command: {}", other))),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wicket=info,wicket_gate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    if matches!(args[1].as_str(), "-h" | "--help" | "help") {
        print_usage();
        return;
    }

    if let Err(e) = execute(&args[1]).await {
        eprintln!("Error: {}", e);
        if matches!(e, CliError::Usage(_)) {
            print_usage();
        }
        std::process::exit(1);
    }
}
