//! Steward execution engine: the gateway between a delegate and the
//! custodied assets it may move.
//!
//! # Overview
//!
//! The engine is organized around these concepts:
//!
//! - **Gateway**: one vault instance. Owns the policy store and the audit
//!   log, and mediates every delegated operation: validate against policy,
//!   snapshot tracked balances, invoke the target, diff, account, and
//!   either commit with events or roll everything back.
//! - **Host**: the one narrow boundary to the external world: a clock,
//!   balance queries, "call with bytes, forward value, get
//!   bytes-or-failure", and transaction framing. [`LocalHost`] is an
//!   in-process implementation for tests and embedders.
//! - **Reentrancy guard**: a single in-flight flag spanning both execution
//!   entry points, released on every exit path.
//!
//! # Example
//!
//! ```ignore
//! use gateway::{Gateway, LocalHost};
//! use policy::{Address, PolicyConfig};
//! use storage::EventStore;
//!
//! let store = EventStore::in_memory()?;
//! let policy = PolicyConfig::load("steward.toml")?.into_store()?;
//! let mut vault = Gateway::open(Address([0xAA; 20]), policy, store, LocalHost::new())?;
//!
//! let result = vault.manage(delegate, target, &payload, 0)?;
//! ```

pub mod calldata;
mod error;
mod gateway;
mod guard;
mod host;

pub use error::{Error, Result};
pub use gateway::Gateway;
pub use guard::{InFlight, ReentryGuard};
pub use host::{Behavior, CallOutcome, Checkpoint, Host, LocalHost};
