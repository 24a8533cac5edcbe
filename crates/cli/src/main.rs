mod demo;
mod error;

use std::path::PathBuf;

use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use policy::PolicyConfig;
use storage::{Event, EventKind, EventStore, RoleKind};

use error::{Error, Result};

const CONFIG_FILE: &str = "steward.toml";

#[derive(Parser)]
#[command(name = "steward")]
#[command(about = "Policy-gated delegated execution over custodied assets", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a policy configuration file
    Check {
        /// Path to the policy config
        #[arg(short, long, default_value = CONFIG_FILE)]
        config: PathBuf,
    },
    /// Run a scripted scenario against the in-process host
    Demo,
    /// List all vaults
    Vaults {
        /// Show only the last N vaults
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Show the audit log for a vault
    Logs {
        /// Vault ID (prefix match supported)
        #[arg(short, long)]
        vault: String,
        /// Filter by event kind (e.g. spend_recorded, operation_executed)
        #[arg(short, long)]
        kind: Option<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config } => cmd_check(&config),
        Commands::Demo => demo::run(),
        Commands::Vaults { limit } => cmd_vaults(limit),
        Commands::Logs { vault, kind } => cmd_logs(&vault, kind.as_deref()),
    }
}

fn cmd_check(path: &PathBuf) -> Result<()> {
    let config = PolicyConfig::load(path)?;
    let authorize = config.authorize.len();
    let whitelist = config.whitelist.len();
    let limits: Vec<_> = config
        .limits
        .iter()
        .map(|rule| (rule.asset, rule.limit, rule.window))
        .collect();

    let store = config.into_store()?;

    println!("{} is valid", path.display());
    println!("  principal:    {}", store.roles().principal());
    println!("  delegate:     {}", store.roles().delegate());
    println!("  authorized:   {authorize} (target, selector) pair(s)");
    println!("  whitelisted:  {whitelist} spender(s)");
    println!("  tracked:      {} asset(s)", store.tracked().len());
    for (asset, limit, window) in limits {
        println!("  limit:        {limit} per {window}s on {asset}");
    }
    Ok(())
}

fn cmd_vaults(limit: usize) -> Result<()> {
    let store = open_store()?;
    let vaults = store.list_vaults()?;

    if vaults.is_empty() {
        println!("No vaults found.");
        return Ok(());
    }

    println!("{:<36}  {:<20}  {:<8}  LAST ACTIVITY", "VAULT ID", "OPENED", "EVENTS");
    println!("{}", "-".repeat(88));

    for summary in vaults.into_iter().take(limit) {
        let opened = Local
            .from_utc_datetime(&summary.opened_at.naive_utc())
            .format("%Y-%m-%d %H:%M");
        let last = Local
            .from_utc_datetime(&summary.last_activity.naive_utc())
            .format("%Y-%m-%d %H:%M");
        println!(
            "{:<36}  {:<20}  {:<8}  {last}",
            summary.id, opened, summary.event_count
        );
    }

    Ok(())
}

fn cmd_logs(vault_prefix: &str, kind_filter: Option<&str>) -> Result<()> {
    let store = open_store()?;

    // Find the vault by prefix
    let vaults = store.list_vaults()?;
    let matching: Vec<_> = vaults
        .iter()
        .filter(|v| v.id.to_string().starts_with(vault_prefix))
        .collect();

    let vault_id = match matching.len() {
        0 => {
            return Err(Error::VaultNotFound {
                prefix: vault_prefix.to_string(),
            });
        }
        1 => matching[0].id,
        _ => {
            return Err(Error::AmbiguousVault {
                prefix: vault_prefix.to_string(),
                matches: matching.iter().map(|v| v.id.to_string()).collect(),
            });
        }
    };

    let events = store.load_events(vault_id, kind_filter)?;

    if events.is_empty() {
        println!("No events found for vault {vault_id}");
        return Ok(());
    }

    println!("Vault: {vault_id}\n");

    for event in events {
        print_event(&event);
    }

    Ok(())
}

fn print_event(event: &Event) {
    let time = Local
        .from_utc_datetime(&event.timestamp.naive_utc())
        .format("%H:%M:%S");

    match &event.kind {
        EventKind::VaultOpened { principal, delegate } => {
            println!("[{time}] === Vault opened (principal {principal}, delegate {delegate}) ===");
        }
        EventKind::RoleChanged { role, previous, new } => {
            let role_str = match role {
                RoleKind::Principal => "principal",
                RoleKind::Delegate => "delegate",
            };
            println!("[{time}] ROLE: {role_str} {previous} -> {new}");
        }
        EventKind::PrincipalProposed { proposed } => {
            println!("[{time}] ROLE: principal handover proposed to {proposed}");
        }
        EventKind::AuthorizationChanged { target, selector, allowed } => {
            let verb = if *allowed { "allowed" } else { "denied" };
            println!("[{time}] POLICY: {selector} on {target} {verb}");
        }
        EventKind::WhitelistChanged { spender, whitelisted } => {
            let verb = if *whitelisted { "whitelisted" } else { "delisted" };
            println!("[{time}] POLICY: spender {spender} {verb}");
        }
        EventKind::AssetTracked { asset } => {
            println!("[{time}] POLICY: tracking {asset}");
        }
        EventKind::AssetUntracked { asset } => {
            println!("[{time}] POLICY: no longer tracking {asset}");
        }
        EventKind::SpendingLimitSet { asset, limit, window_duration } => {
            println!("[{time}] POLICY: limit {limit} per {window_duration}s on {asset}");
        }
        EventKind::SpendRecorded { asset, amount, spent_in_window } => {
            println!("[{time}] SPEND: {amount} of {asset} ({spent_in_window} in window)");
        }
        EventKind::OperationExecuted { target, value, payload } => {
            // Truncate long payloads for display
            let display_payload = if payload.len() > 64 {
                format!("{}...", &payload[..64])
            } else {
                payload.clone()
            };
            println!("[{time}] EXEC: {target} value {value} payload 0x{display_payload}");
        }
        EventKind::BatchExecuted { operations } => {
            println!("[{time}] EXEC: batch of {operations} operation(s) committed");
        }
        EventKind::DepositReceived { from, amount } => {
            println!("[{time}] CUSTODY: deposit of {amount} from {from}");
        }
        EventKind::WithdrawalExecuted { asset, amount, to } => {
            println!("[{time}] CUSTODY: withdrew {amount} of {asset} to {to}");
        }
    }
}

fn open_store() -> Result<EventStore> {
    let db_path = db_path();

    if !db_path.exists() {
        return Err(Error::DatabaseNotFound { path: db_path });
    }

    Ok(EventStore::open(&db_path)?)
}

fn db_path() -> PathBuf {
    data_dir().join("events.db")
}

/// Where the audit database lives. `STEWARD_DATA_DIR` overrides
/// everything; otherwise XDG conventions apply, falling back to a
/// `.steward` directory next to the working directory when no home is
/// known.
fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("STEWARD_DATA_DIR") {
        return dir.into();
    }
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
        return PathBuf::from(xdg).join("steward");
    }
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".local/share/steward"),
        None => PathBuf::from(".steward"),
    }
}
