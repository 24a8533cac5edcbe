//! The aggregate policy store.

use crate::{
    Address, CallAuthorization, Result, Roles, SpenderWhitelist, SpendingLimits, TrackedAssets,
};

/// All persistent policy state for one vault, owned exclusively by the
/// gateway instance and passed by reference, never as ambient globals.
///
/// Configuration (roles, authorizations, whitelist, tracked set, limit
/// parameters) is mutated only through the gateway's principal-gated entry
/// points; live spend accounting is mutated only by the gateway itself.
#[derive(Debug, Clone)]
pub struct PolicyStore {
    roles: Roles,
    authorizations: CallAuthorization,
    whitelist: SpenderWhitelist,
    tracked: TrackedAssets,
    limits: SpendingLimits,
}

impl PolicyStore {
    pub fn new(principal: Address, delegate: Address) -> Result<Self> {
        Ok(Self {
            roles: Roles::new(principal, delegate)?,
            authorizations: CallAuthorization::new(),
            whitelist: SpenderWhitelist::new(),
            tracked: TrackedAssets::new(),
            limits: SpendingLimits::new(),
        })
    }

    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    pub fn roles_mut(&mut self) -> &mut Roles {
        &mut self.roles
    }

    pub fn authorizations(&self) -> &CallAuthorization {
        &self.authorizations
    }

    pub fn authorizations_mut(&mut self) -> &mut CallAuthorization {
        &mut self.authorizations
    }

    pub fn whitelist(&self) -> &SpenderWhitelist {
        &self.whitelist
    }

    pub fn whitelist_mut(&mut self) -> &mut SpenderWhitelist {
        &mut self.whitelist
    }

    pub fn tracked(&self) -> &TrackedAssets {
        &self.tracked
    }

    pub fn tracked_mut(&mut self) -> &mut TrackedAssets {
        &mut self.tracked
    }

    pub fn limits(&self) -> &SpendingLimits {
        &self.limits
    }

    pub fn limits_mut(&mut self) -> &mut SpendingLimits {
        &mut self.limits
    }

    /// Copy of the live accounting state, taken before an atomic unit so a
    /// failure can restore it exactly.
    pub fn limits_checkpoint(&self) -> SpendingLimits {
        self.limits.clone()
    }

    pub fn restore_limits(&mut self, checkpoint: SpendingLimits) {
        self.limits = checkpoint;
    }
}
