//! In-process reference host.
//!
//! `LocalHost` gives tests and embedders a deterministic world: native and
//! per-asset balance ledgers, a manual clock, and programmable contract
//! behaviors at chosen addresses. Calls are atomic (a revert applies
//! nothing) and checkpoints stack, so the engine's rollback paths behave
//! exactly as they would against a real transactional host.

use super::{CallOutcome, Checkpoint, Host};
use crate::calldata;
use policy::{Address, Selector};
use std::collections::HashMap;

/// Behavior of a contract registered at an address.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// An asset contract. Understands `transfer(to, amount)` against its
    /// own ledger and `approve(spender, amount)` into the allowance table;
    /// anything else reverts.
    Token,
    /// Takes `take.1` of asset `take.0` from the caller and gives
    /// `give.1` of asset `give.0` back, whatever the payload says.
    Exchange {
        take: (Address, u128),
        give: (Address, u128),
    },
    /// Accepts any payload and does nothing.
    Sink,
    /// Always reverts with a fixed failure payload.
    Reverting(Vec<u8>),
}

#[derive(Debug, Clone, Default)]
struct WorldState {
    native: HashMap<Address, u128>,
    /// (asset, holder) -> balance
    tokens: HashMap<(Address, Address), u128>,
    /// (asset, owner, spender) -> allowance
    allowances: HashMap<(Address, Address, Address), u128>,
}

impl WorldState {
    fn balance(&self, asset: Address, of: Address) -> u128 {
        if asset.is_native() {
            self.native.get(&of).copied().unwrap_or(0)
        } else {
            self.tokens.get(&(asset, of)).copied().unwrap_or(0)
        }
    }

    fn credit(&mut self, asset: Address, of: Address, amount: u128) {
        if asset.is_native() {
            *self.native.entry(of).or_insert(0) += amount;
        } else {
            *self.tokens.entry((asset, of)).or_insert(0) += amount;
        }
    }

    /// Returns false (mutating nothing) when `of` holds less than `amount`.
    fn debit(&mut self, asset: Address, of: Address, amount: u128) -> bool {
        let held = self.balance(asset, of);
        if held < amount {
            return false;
        }
        if asset.is_native() {
            self.native.insert(of, held - amount);
        } else {
            self.tokens.insert((asset, of), held - amount);
        }
        true
    }
}

/// A deterministic in-process [`Host`].
#[derive(Debug, Default)]
pub struct LocalHost {
    now: u64,
    state: WorldState,
    contracts: HashMap<Address, Behavior>,
    frames: Vec<WorldState>,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the clock to an absolute Unix time.
    pub fn set_now(&mut self, now: u64) {
        self.now = now;
    }

    /// Advance the clock.
    pub fn advance(&mut self, seconds: u64) {
        self.now += seconds;
    }

    /// Install a contract behavior at an address.
    pub fn register(&mut self, address: Address, behavior: Behavior) {
        self.contracts.insert(address, behavior);
    }

    /// Mint native value to an account.
    pub fn credit_native(&mut self, of: Address, amount: u128) {
        self.state.credit(Address::NATIVE, of, amount);
    }

    /// Mint asset balance to an account.
    pub fn credit_asset(&mut self, asset: Address, of: Address, amount: u128) {
        self.state.credit(asset, of, amount);
    }

    /// Allowance recorded by an `approve` call, for assertions.
    pub fn allowance(&self, asset: Address, owner: Address, spender: Address) -> u128 {
        self.state
            .allowances
            .get(&(asset, owner, spender))
            .copied()
            .unwrap_or(0)
    }

    fn dispatch(
        &mut self,
        from: Address,
        target: Address,
        payload: &[u8],
        value: u128,
    ) -> CallOutcome {
        if value > 0 {
            if !self.state.debit(Address::NATIVE, from, value) {
                return CallOutcome::Revert(b"insufficient value".to_vec());
            }
            self.state.credit(Address::NATIVE, target, value);
        }

        // An empty payload is a plain value transfer.
        if payload.is_empty() {
            return CallOutcome::Success(Vec::new());
        }

        let Some(behavior) = self.contracts.get(&target).cloned() else {
            return CallOutcome::Revert(b"no contract at target".to_vec());
        };

        match behavior {
            Behavior::Sink => CallOutcome::Success(Vec::new()),
            Behavior::Reverting(data) => CallOutcome::Revert(data),
            Behavior::Token => self.token_call(target, from, payload),
            Behavior::Exchange { take, give } => {
                if !self.state.debit(take.0, from, take.1) {
                    return CallOutcome::Revert(b"insufficient balance".to_vec());
                }
                self.state.credit(give.0, from, give.1);
                CallOutcome::Success(Vec::new())
            }
        }
    }

    fn token_call(&mut self, asset: Address, from: Address, payload: &[u8]) -> CallOutcome {
        let Ok(selector) = calldata::selector_of(payload) else {
            return CallOutcome::Revert(b"malformed payload".to_vec());
        };
        match selector {
            Selector::TRANSFER => {
                let (Ok(to), Ok(amount)) =
                    (calldata::address_at(payload, 0), calldata::amount_at(payload, 1))
                else {
                    return CallOutcome::Revert(b"malformed payload".to_vec());
                };
                if !self.state.debit(asset, from, amount) {
                    return CallOutcome::Revert(b"insufficient balance".to_vec());
                }
                self.state.credit(asset, to, amount);
                CallOutcome::Success(Vec::new())
            }
            Selector::APPROVE => {
                let (Ok(spender), Ok(amount)) =
                    (calldata::address_at(payload, 0), calldata::amount_at(payload, 1))
                else {
                    return CallOutcome::Revert(b"malformed payload".to_vec());
                };
                self.state.allowances.insert((asset, from, spender), amount);
                CallOutcome::Success(Vec::new())
            }
            _ => CallOutcome::Revert(b"unknown selector".to_vec()),
        }
    }
}

impl Host for LocalHost {
    fn now(&self) -> u64 {
        self.now
    }

    fn native_balance(&self, of: Address) -> u128 {
        self.state.balance(Address::NATIVE, of)
    }

    fn asset_balance(&self, asset: Address, of: Address) -> u128 {
        self.state.balance(asset, of)
    }

    fn call(
        &mut self,
        from: Address,
        target: Address,
        payload: &[u8],
        value: u128,
    ) -> CallOutcome {
        // Per-call atomicity: a revert applies nothing.
        let saved = self.state.clone();
        let outcome = self.dispatch(from, target, payload, value);
        if let CallOutcome::Revert(_) = outcome {
            self.state = saved;
        }
        outcome
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.frames.push(self.state.clone());
        Checkpoint(self.frames.len() - 1)
    }

    fn commit(&mut self, checkpoint: Checkpoint) {
        self.frames.truncate(checkpoint.0);
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.state = self.frames[checkpoint.0].clone();
        self.frames.truncate(checkpoint.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VAULT: Address = Address([0xAA; 20]);
    const TOKEN: Address = Address([0x01; 20]);
    const OTHER: Address = Address([0x02; 20]);

    #[test]
    fn token_transfer_moves_balances() {
        let mut host = LocalHost::new();
        host.register(TOKEN, Behavior::Token);
        host.credit_asset(TOKEN, VAULT, 100);

        let payload = calldata::encode_transfer(OTHER, 60);
        assert!(host.call(VAULT, TOKEN, &payload, 0).is_success());
        assert_eq!(host.asset_balance(TOKEN, VAULT), 40);
        assert_eq!(host.asset_balance(TOKEN, OTHER), 60);
    }

    #[test]
    fn reverted_call_applies_nothing() {
        let mut host = LocalHost::new();
        host.register(TOKEN, Behavior::Token);
        host.credit_native(VAULT, 10);

        // Value transfers first, then the transfer reverts for lack of
        // token balance; the forwarded value must come back too.
        let payload = calldata::encode_transfer(OTHER, 60);
        let outcome = host.call(VAULT, TOKEN, &payload, 5);
        assert!(matches!(outcome, CallOutcome::Revert(_)));
        assert_eq!(host.native_balance(VAULT), 10);
        assert_eq!(host.native_balance(TOKEN), 0);
    }

    #[test]
    fn checkpoint_rollback_restores_state() {
        let mut host = LocalHost::new();
        host.credit_native(VAULT, 100);

        let checkpoint = host.checkpoint();
        assert!(host.call(VAULT, OTHER, &[], 70).is_success());
        assert_eq!(host.native_balance(VAULT), 30);

        host.rollback(checkpoint);
        assert_eq!(host.native_balance(VAULT), 100);
        assert_eq!(host.native_balance(OTHER), 0);
    }

    #[test]
    fn exchange_swaps_assets() {
        let mut host = LocalHost::new();
        let pool = Address([0x77; 20]);
        host.register(
            pool,
            Behavior::Exchange {
                take: (TOKEN, 50),
                give: (OTHER, 200),
            },
        );
        host.credit_asset(TOKEN, VAULT, 50);

        assert!(host.call(VAULT, pool, &[0xde, 0xad, 0xbe, 0xef], 0).is_success());
        assert_eq!(host.asset_balance(TOKEN, VAULT), 0);
        assert_eq!(host.asset_balance(OTHER, VAULT), 200);
    }
}
