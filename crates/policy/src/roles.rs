//! The two-role trust model.

use crate::{Address, Error, Result};

/// The principal holds configuration and custody authority; the delegate
/// may trigger gated operations but cannot withdraw or reconfigure. Both
/// identities are non-null at all times.
#[derive(Debug, Clone)]
pub struct Roles {
    principal: Address,
    delegate: Address,
    pending_principal: Option<Address>,
}

impl Roles {
    pub fn new(principal: Address, delegate: Address) -> Result<Self> {
        if principal.is_zero() || delegate.is_zero() {
            return Err(Error::InvalidIdentity);
        }
        Ok(Self {
            principal,
            delegate,
            pending_principal: None,
        })
    }

    pub fn principal(&self) -> Address {
        self.principal
    }

    pub fn delegate(&self) -> Address {
        self.delegate
    }

    pub fn pending_principal(&self) -> Option<Address> {
        self.pending_principal
    }

    pub fn is_principal(&self, id: Address) -> bool {
        id == self.principal
    }

    pub fn is_delegate(&self, id: Address) -> bool {
        id == self.delegate
    }

    /// Replace the delegate in one step. Returns the previous delegate.
    pub fn set_delegate(&mut self, new: Address) -> Result<Address> {
        if new.is_zero() {
            return Err(Error::InvalidIdentity);
        }
        Ok(std::mem::replace(&mut self.delegate, new))
    }

    /// Stage a principal handover; takes effect once the proposed identity
    /// accepts. Proposing again overwrites the staged identity.
    pub fn propose_principal(&mut self, proposed: Address) -> Result<()> {
        if proposed.is_zero() {
            return Err(Error::InvalidIdentity);
        }
        self.pending_principal = Some(proposed);
        Ok(())
    }

    /// Complete a staged handover. Returns the previous principal, or
    /// `None` when `caller` is not the staged identity.
    pub fn accept_principal(&mut self, caller: Address) -> Option<Address> {
        match self.pending_principal {
            Some(proposed) if proposed == caller => {
                self.pending_principal = None;
                Some(std::mem::replace(&mut self.principal, proposed))
            }
            _ => None,
        }
    }
}
