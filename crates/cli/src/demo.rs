//! Scripted end-to-end scenario against the in-process host.
//!
//! Opens a vault backed by [`LocalHost`], walks it through configuration,
//! a deposit, gated executions, and a denied over-limit spend, then points
//! at the audit log it produced. Useful as a smoke test and as a worked
//! example of the engine's API.

use gateway::{Behavior, Gateway, LocalHost, calldata};
use policy::{Address, PolicyStore, Selector};
use storage::EventStore;

use crate::error::Result;

const VAULT: Address = Address([0xAA; 20]);
const PRINCIPAL: Address = Address([0x11; 20]);
const DELEGATE: Address = Address([0x22; 20]);
const TOKEN: Address = Address([0x33; 20]);
const MERCHANT: Address = Address([0x44; 20]);

const SIX_HOURS: u64 = 6 * 3600;

pub fn run() -> Result<()> {
    println!("steward v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = crate::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join("events.db");
    let store = EventStore::open(&db_path)?;
    println!("Audit log at: {}", db_path.display());

    let mut host = LocalHost::new();
    host.register(TOKEN, Behavior::Token);
    host.credit_asset(TOKEN, VAULT, 1_000);
    host.credit_native(PRINCIPAL, 5_000);

    let policy = PolicyStore::new(PRINCIPAL, DELEGATE)?;
    let mut vault = Gateway::open(VAULT, policy, store, host)?;
    println!("Vault ID: {}\n", vault.id());

    // Principal configures the policy.
    vault.add_tracked_asset(PRINCIPAL, Address::NATIVE)?;
    vault.add_tracked_asset(PRINCIPAL, TOKEN)?;
    vault.set_call_authorization(PRINCIPAL, TOKEN, Selector::TRANSFER, true)?;
    vault.set_spending_limit(PRINCIPAL, TOKEN, 500, SIX_HOURS)?;
    println!("Configured: transfers on {TOKEN} allowed, limit 500 per 6h");

    // Principal funds the vault.
    vault.deposit(PRINCIPAL, 2_500)?;
    println!("Deposited 2500 native (vault holds {})", vault.native_balance());

    // Delegate executes within the limit.
    vault.manage(
        DELEGATE,
        TOKEN,
        &calldata::encode_transfer(MERCHANT, 200),
        0,
    )?;
    let remaining = vault.remaining_limit(TOKEN).map(|s| s.remaining).unwrap_or(0);
    println!("Delegate sent 200 tokens to {MERCHANT} (remaining limit {remaining})");

    // A batch of two transfers, atomic as one unit.
    vault.manage_batch(
        DELEGATE,
        &[TOKEN, TOKEN],
        &[
            calldata::encode_transfer(MERCHANT, 100),
            calldata::encode_transfer(MERCHANT, 150),
        ],
        &[0, 0],
    )?;
    let remaining = vault.remaining_limit(TOKEN).map(|s| s.remaining).unwrap_or(0);
    println!("Batch of 100 + 150 committed (remaining limit {remaining})");

    // One token over the window's remaining headroom: denied, nothing moves.
    match vault.manage(
        DELEGATE,
        TOKEN,
        &calldata::encode_transfer(MERCHANT, remaining + 1),
        0,
    ) {
        Err(e) => println!("Over-limit spend denied: {e}"),
        Ok(_) => println!("unexpected: over-limit spend committed"),
    }
    println!("Vault still holds {} tokens", vault.asset_balance(TOKEN));

    println!("\nInspect the audit trail with: steward logs --vault {}", vault.id());
    Ok(())
}
