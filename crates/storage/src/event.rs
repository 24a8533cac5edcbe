//! Audit event types.

use chrono::{DateTime, Utc};
use policy::{Address, Selector};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for a vault instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultId(pub Uuid);

impl VaultId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VaultId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VaultId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which role an identity change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Principal,
    Delegate,
}

/// The kind of event that occurred.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A vault came into existence with its initial roles.
    VaultOpened { principal: Address, delegate: Address },
    /// A role was reassigned.
    RoleChanged {
        role: RoleKind,
        previous: Address,
        new: Address,
    },
    /// A principal handover was staged.
    PrincipalProposed { proposed: Address },
    /// A (target, selector) authorization was toggled.
    AuthorizationChanged {
        target: Address,
        selector: Selector,
        allowed: bool,
    },
    /// A spender's whitelist membership was toggled.
    WhitelistChanged { spender: Address, whitelisted: bool },
    /// An asset joined the tracked set.
    AssetTracked { asset: Address },
    /// An asset left the tracked set.
    AssetUntracked { asset: Address },
    /// A spending limit was configured.
    SpendingLimitSet {
        asset: Address,
        limit: u128,
        window_duration: u64,
    },
    /// A balance decrease was accounted against a limit.
    SpendRecorded {
        asset: Address,
        amount: u128,
        spent_in_window: u128,
    },
    /// A gated operation committed. The payload is hex-encoded.
    OperationExecuted {
        target: Address,
        value: u128,
        payload: String,
    },
    /// A batch of gated operations committed as one unit.
    BatchExecuted { operations: usize },
    /// Native value was deposited into the vault.
    DepositReceived { from: Address, amount: u128 },
    /// Custodied value was returned to the principal.
    WithdrawalExecuted {
        asset: Address,
        amount: u128,
        to: Address,
    },
}

impl EventKind {
    /// Short name used for the filterable kind column, matching the
    /// serde tag of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::VaultOpened { .. } => "vault_opened",
            EventKind::RoleChanged { .. } => "role_changed",
            EventKind::PrincipalProposed { .. } => "principal_proposed",
            EventKind::AuthorizationChanged { .. } => "authorization_changed",
            EventKind::WhitelistChanged { .. } => "whitelist_changed",
            EventKind::AssetTracked { .. } => "asset_tracked",
            EventKind::AssetUntracked { .. } => "asset_untracked",
            EventKind::SpendingLimitSet { .. } => "spending_limit_set",
            EventKind::SpendRecorded { .. } => "spend_recorded",
            EventKind::OperationExecuted { .. } => "operation_executed",
            EventKind::BatchExecuted { .. } => "batch_executed",
            EventKind::DepositReceived { .. } => "deposit_received",
            EventKind::WithdrawalExecuted { .. } => "withdrawal_executed",
        }
    }
}

/// An event in a vault's audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub vault_id: VaultId,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
}

impl Event {
    pub fn new(vault_id: VaultId, kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            vault_id,
            timestamp: Utc::now(),
            kind,
        }
    }
}
