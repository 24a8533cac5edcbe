//! Call authorization table and spender whitelist.
//!
//! Two allow-lists with different keys. The authorization table gates
//! ordinary operations by (target, selector). Allowance-granting operations
//! are instead gated by who *receives* the allowance: they are parameterized
//! by an arbitrary asset target, so the risk concentrates in the grantee,
//! not in which asset grants it.

use crate::{Address, Error, Result, Selector};
use std::collections::HashSet;

/// Principal-configured (target, selector) allow-list. Absent entries are
/// denied.
#[derive(Debug, Clone, Default)]
pub struct CallAuthorization {
    allowed: HashSet<(Address, Selector)>,
}

impl CallAuthorization {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow or deny a (target, selector) pair. Idempotent; toggling off
    /// then on restores exactly the prior explicit state.
    pub fn set(&mut self, target: Address, selector: Selector, allowed: bool) -> Result<()> {
        if target.is_zero() {
            return Err(Error::InvalidIdentity);
        }
        if allowed {
            self.allowed.insert((target, selector));
        } else {
            self.allowed.remove(&(target, selector));
        }
        Ok(())
    }

    pub fn is_allowed(&self, target: Address, selector: Selector) -> bool {
        self.allowed.contains(&(target, selector))
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

/// Principal-configured set of identities approved to receive allowance
/// grants on any asset. Absent entries are not whitelisted.
#[derive(Debug, Clone, Default)]
pub struct SpenderWhitelist {
    spenders: HashSet<Address>,
}

impl SpenderWhitelist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whitelist or delist a spender. Idempotent.
    pub fn set(&mut self, spender: Address, whitelisted: bool) -> Result<()> {
        if spender.is_zero() {
            return Err(Error::InvalidIdentity);
        }
        if whitelisted {
            self.spenders.insert(spender);
        } else {
            self.spenders.remove(&spender);
        }
        Ok(())
    }

    pub fn is_whitelisted(&self, spender: Address) -> bool {
        self.spenders.contains(&spender)
    }

    pub fn len(&self) -> usize {
        self.spenders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spenders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    const SEL: Selector = Selector([0xab, 0xcd, 0xef, 0x01]);

    #[test]
    fn deny_by_default() {
        let auth = CallAuthorization::new();
        assert!(!auth.is_allowed(addr(1), SEL));

        let whitelist = SpenderWhitelist::new();
        assert!(!whitelist.is_whitelisted(addr(1)));
    }

    #[test]
    fn toggle_restores_explicit_state() {
        let mut auth = CallAuthorization::new();
        auth.set(addr(1), SEL, true).unwrap();
        assert!(auth.is_allowed(addr(1), SEL));

        auth.set(addr(1), SEL, false).unwrap();
        assert!(!auth.is_allowed(addr(1), SEL));

        auth.set(addr(1), SEL, true).unwrap();
        assert!(auth.is_allowed(addr(1), SEL));

        // Idempotent: repeating a grant changes nothing.
        auth.set(addr(1), SEL, true).unwrap();
        assert_eq!(auth.len(), 1);
    }

    #[test]
    fn authorization_is_per_pair() {
        let mut auth = CallAuthorization::new();
        auth.set(addr(1), SEL, true).unwrap();
        assert!(!auth.is_allowed(addr(2), SEL));
        assert!(!auth.is_allowed(addr(1), Selector([0; 4])));
    }

    #[test]
    fn null_identities_rejected() {
        let mut auth = CallAuthorization::new();
        assert!(auth.set(Address::ZERO, SEL, true).is_err());

        let mut whitelist = SpenderWhitelist::new();
        assert!(whitelist.set(Address::ZERO, true).is_err());
    }
}
