//! Persistent audit log for Steward vaults.
//!
//! Nothing the engine does is observable except through events: every
//! policy change the principal makes, every spend the gateway accounts,
//! every delegated execution, deposit, and withdrawal lands here as one
//! row of an append-only SQLite log. The engine buffers events while an
//! atomic unit is open and appends them only when it commits, so a rolled
//! back operation leaves no rows at all; what the log says happened is
//! exactly what happened.
//!
//! [`EventStore`] wraps the database: append an [`Event`], read a vault's
//! history back in insertion order (optionally filtered by kind name), or
//! summarize all known vaults for the CLI. An [`Event`] ties a
//! [`VaultId`] and a timestamp to an [`EventKind`], the tagged enum
//! carrying each event's fields. Rows store the kind twice, once as a
//! short name column for cheap filtering and once as the JSON body that
//! round-trips the full enum.
//!
//! ```no_run
//! use policy::Address;
//! use storage::{Event, EventKind, EventStore, VaultId};
//!
//! let store = EventStore::open("events.db")?;
//! let vault = VaultId::new();
//! store.append(&Event::new(
//!     vault,
//!     EventKind::AssetTracked { asset: Address::NATIVE },
//! ))?;
//!
//! for event in store.load_events(vault, None)? {
//!     println!("{} {:?}", event.timestamp, event.kind);
//! }
//! # Ok::<(), storage::Error>(())
//! ```

mod error;
mod event;
mod store;

pub use error::{Error, Result};
pub use event::{Event, EventKind, RoleKind, VaultId};
pub use store::{EventStore, VaultSummary};
