//! The execution gateway.

use policy::{Address, LimitStatus, PolicyStore, Selector, SpendingLimit};
use storage::{Event, EventKind, EventStore, RoleKind, VaultId};

use crate::guard::ReentryGuard;
use crate::host::{CallOutcome, Host};
use crate::{Error, Result, calldata};

/// One vault instance: custody policy, audit log, and the gated execution
/// paths over a [`Host`].
///
/// Every entry point takes the caller's identity explicitly; the gateway
/// enforces which role it requires. Execution entry points (`manage`,
/// `manage_batch`) are delegate-only and atomic: policy accounting, host
/// effects, and audit events all commit together or not at all.
pub struct Gateway<H: Host> {
    id: VaultId,
    address: Address,
    policy: PolicyStore,
    store: EventStore,
    host: H,
    guard: ReentryGuard,
}

impl<H: Host> Gateway<H> {
    /// Open a vault at `address` with its initial policy, recording the
    /// opening event.
    pub fn open(address: Address, policy: PolicyStore, store: EventStore, host: H) -> Result<Self> {
        if address.is_zero() {
            return Err(Error::InvalidIdentity);
        }
        let id = VaultId::new();
        store.append(&Event::new(
            id,
            EventKind::VaultOpened {
                principal: policy.roles().principal(),
                delegate: policy.roles().delegate(),
            },
        ))?;
        Ok(Self {
            id,
            address,
            policy,
            store,
            host,
            guard: ReentryGuard::new(),
        })
    }

    pub fn id(&self) -> VaultId {
        self.id
    }

    /// The vault's own identity on the host.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // --- queries ---

    pub fn principal(&self) -> Address {
        self.policy.roles().principal()
    }

    pub fn delegate(&self) -> Address {
        self.policy.roles().delegate()
    }

    pub fn is_principal(&self, id: Address) -> bool {
        self.policy.roles().is_principal(id)
    }

    pub fn is_delegate(&self, id: Address) -> bool {
        self.policy.roles().is_delegate(id)
    }

    pub fn native_balance(&self) -> u128 {
        self.host.native_balance(self.address)
    }

    pub fn asset_balance(&self, asset: Address) -> u128 {
        self.balance_of(asset)
    }

    pub fn is_authorized(&self, target: Address, selector: Selector) -> bool {
        self.policy.authorizations().is_allowed(target, selector)
    }

    pub fn is_whitelisted(&self, spender: Address) -> bool {
        self.policy.whitelist().is_whitelisted(spender)
    }

    pub fn tracked_assets(&self) -> &[Address] {
        self.policy.tracked().as_slice()
    }

    /// Raw limit snapshot: limit, window duration, spent, window start.
    pub fn spending_limit(&self, asset: Address) -> Option<SpendingLimit> {
        self.policy.limits().get(asset)
    }

    /// Remaining headroom in the current window plus the window's end
    /// timestamp. `None` when the asset is unlimited or unconfigured.
    pub fn remaining_limit(&self, asset: Address) -> Option<LimitStatus> {
        self.policy.limits().remaining(asset, self.host.now())
    }

    // --- configuration (principal-only) ---

    pub fn set_call_authorization(
        &mut self,
        caller: Address,
        target: Address,
        selector: Selector,
        allowed: bool,
    ) -> Result<()> {
        self.require_principal(caller)?;
        self.policy
            .authorizations_mut()
            .set(target, selector, allowed)?;
        self.record(EventKind::AuthorizationChanged {
            target,
            selector,
            allowed,
        })
    }

    pub fn set_spender_whitelist(
        &mut self,
        caller: Address,
        spender: Address,
        whitelisted: bool,
    ) -> Result<()> {
        self.require_principal(caller)?;
        self.policy.whitelist_mut().set(spender, whitelisted)?;
        self.record(EventKind::WhitelistChanged {
            spender,
            whitelisted,
        })
    }

    pub fn add_tracked_asset(&mut self, caller: Address, asset: Address) -> Result<()> {
        self.require_principal(caller)?;
        self.policy.tracked_mut().add(asset)?;
        self.record(EventKind::AssetTracked { asset })
    }

    pub fn remove_tracked_asset(&mut self, caller: Address, asset: Address) -> Result<()> {
        self.require_principal(caller)?;
        self.policy.tracked_mut().remove(asset)?;
        self.record(EventKind::AssetUntracked { asset })
    }

    pub fn set_spending_limit(
        &mut self,
        caller: Address,
        asset: Address,
        limit: u128,
        window_duration: u64,
    ) -> Result<()> {
        self.require_principal(caller)?;
        self.policy.limits_mut().set(asset, limit, window_duration)?;
        self.record(EventKind::SpendingLimitSet {
            asset,
            limit,
            window_duration,
        })
    }

    // --- role transfer ---

    /// Replace the delegate in one step.
    pub fn set_delegate(&mut self, caller: Address, new: Address) -> Result<()> {
        self.require_principal(caller)?;
        let previous = self.policy.roles_mut().set_delegate(new)?;
        self.record(EventKind::RoleChanged {
            role: RoleKind::Delegate,
            previous,
            new,
        })
    }

    /// Stage a principal handover; `accept_principal` completes it.
    pub fn propose_principal(&mut self, caller: Address, proposed: Address) -> Result<()> {
        self.require_principal(caller)?;
        self.policy.roles_mut().propose_principal(proposed)?;
        self.record(EventKind::PrincipalProposed { proposed })
    }

    /// Complete a staged handover. The caller must be the staged identity.
    pub fn accept_principal(&mut self, caller: Address) -> Result<()> {
        let previous = self
            .policy
            .roles_mut()
            .accept_principal(caller)
            .ok_or(Error::AccessDenied)?;
        self.record(EventKind::RoleChanged {
            role: RoleKind::Principal,
            previous,
            new: caller,
        })
    }

    // --- custody (principal-only) ---

    /// Return an exact amount of a custodied asset to the principal.
    pub fn withdraw(&mut self, caller: Address, asset: Address, amount: u128) -> Result<()> {
        self.require_principal(caller)?;
        if amount == 0 {
            return Err(Error::ZeroAmount);
        }
        let held = self.balance_of(asset);
        if amount > held {
            return Err(Error::InsufficientBalance {
                requested: amount,
                held,
            });
        }
        self.transfer_to_principal(asset, amount)
    }

    /// Return the full held balance of an asset to the principal.
    pub fn withdraw_all(&mut self, caller: Address, asset: Address) -> Result<()> {
        self.require_principal(caller)?;
        let held = self.balance_of(asset);
        if held == 0 {
            return Err(Error::ZeroAmount);
        }
        self.transfer_to_principal(asset, held)
    }

    /// Accept a native deposit from any caller.
    pub fn deposit(&mut self, from: Address, value: u128) -> Result<()> {
        if value == 0 {
            return Err(Error::ZeroAmount);
        }
        match self.host.call(from, self.address, &[], value) {
            CallOutcome::Success(_) => self.record(EventKind::DepositReceived {
                from,
                amount: value,
            }),
            CallOutcome::Revert(data) => Err(Error::OperationFailed(data)),
        }
    }

    // --- execution (delegate-only) ---

    /// Execute one gated operation: validate against policy, snapshot
    /// tracked balances, invoke the target forwarding `value`, diff, and
    /// account every decrease against its spending limit. Returns the raw
    /// invocation result.
    pub fn manage(
        &mut self,
        caller: Address,
        target: Address,
        payload: &[u8],
        value: u128,
    ) -> Result<Vec<u8>> {
        self.require_delegate(caller)?;

        let _in_flight = self.guard.enter()?;
        let checkpoint = self.host.checkpoint();
        let limits = self.policy.limits_checkpoint();
        let mut events = Vec::new();

        let result = self
            .execute(target, payload, value, &mut events)
            .and_then(|data| {
                self.flush(&events)?;
                Ok(data)
            });

        match result {
            Ok(data) => {
                self.host.commit(checkpoint);
                Ok(data)
            }
            Err(e) => {
                self.host.rollback(checkpoint);
                self.policy.restore_limits(limits);
                Err(e)
            }
        }
    }

    /// Execute a sequence of gated operations as one atomic unit.
    ///
    /// Spending accumulates across elements exactly as sequential single
    /// calls would; a failure at any element rolls back the entire batch,
    /// including the accounting of earlier elements. Returns the ordered
    /// raw results only on full success.
    pub fn manage_batch(
        &mut self,
        caller: Address,
        targets: &[Address],
        payloads: &[Vec<u8>],
        values: &[u128],
    ) -> Result<Vec<Vec<u8>>> {
        if targets.len() != payloads.len() || payloads.len() != values.len() {
            return Err(Error::InvalidInput);
        }
        self.require_delegate(caller)?;

        let _in_flight = self.guard.enter()?;
        let checkpoint = self.host.checkpoint();
        let limits = self.policy.limits_checkpoint();
        let mut events = Vec::new();

        let result = self
            .execute_batch(targets, payloads, values, &mut events)
            .and_then(|results| {
                self.flush(&events)?;
                Ok(results)
            });

        match result {
            Ok(results) => {
                self.host.commit(checkpoint);
                Ok(results)
            }
            Err(e) => {
                self.host.rollback(checkpoint);
                self.policy.restore_limits(limits);
                Err(e)
            }
        }
    }

    fn execute_batch(
        &mut self,
        targets: &[Address],
        payloads: &[Vec<u8>],
        values: &[u128],
        events: &mut Vec<EventKind>,
    ) -> Result<Vec<Vec<u8>>> {
        let mut results = Vec::with_capacity(targets.len());
        for ((target, payload), value) in targets.iter().zip(payloads).zip(values) {
            results.push(self.execute(*target, payload, *value, events)?);
        }
        events.push(EventKind::BatchExecuted {
            operations: results.len(),
        });
        Ok(results)
    }

    /// One operation inside an already-open atomic unit. The entry points
    /// have already checked the caller's role and hold the checkpoints
    /// that make failure restore the accounting this mutates.
    fn execute(
        &mut self,
        target: Address,
        payload: &[u8],
        value: u128,
        events: &mut Vec<EventKind>,
    ) -> Result<Vec<u8>> {
        if target.is_zero() {
            return Err(Error::InvalidIdentity);
        }

        let selector = calldata::selector_of(payload)?;
        if selector == Selector::APPROVE {
            // Allowance grants are gated by who receives the allowance,
            // not by (target, selector): the target may be any asset.
            let grantee = calldata::approve_spender(payload)?;
            if !self.policy.whitelist().is_whitelisted(grantee) {
                return Err(Error::SpenderNotWhitelisted(grantee));
            }
        } else if !self.policy.authorizations().is_allowed(target, selector) {
            return Err(Error::OperationNotAuthorized { target, selector });
        }

        let before = self.snapshot_balances();

        let result = match self.host.call(self.address, target, payload, value) {
            CallOutcome::Success(data) => data,
            CallOutcome::Revert(data) => return Err(Error::OperationFailed(data)),
        };

        let now = self.host.now();
        let after = self.snapshot_balances();
        for ((asset, held_before), (_, held_after)) in before.into_iter().zip(after) {
            // Only strict decreases are spends; increases are never
            // credited and never offset a decrease elsewhere.
            if held_after < held_before {
                let spent = held_before - held_after;
                if let Some(spend) = self.policy.limits_mut().record_spend(asset, spent, now)? {
                    events.push(EventKind::SpendRecorded {
                        asset: spend.asset,
                        amount: spend.amount,
                        spent_in_window: spend.spent_in_window,
                    });
                }
            }
        }

        events.push(EventKind::OperationExecuted {
            target,
            value,
            payload: hex::encode(payload),
        });
        Ok(result)
    }

    fn snapshot_balances(&self) -> Vec<(Address, u128)> {
        self.policy
            .tracked()
            .iter()
            .map(|asset| (asset, self.balance_of(asset)))
            .collect()
    }

    fn balance_of(&self, asset: Address) -> u128 {
        if asset.is_native() {
            self.host.native_balance(self.address)
        } else {
            self.host.asset_balance(asset, self.address)
        }
    }

    fn transfer_to_principal(&mut self, asset: Address, amount: u128) -> Result<()> {
        let principal = self.policy.roles().principal();
        let outcome = if asset.is_native() {
            self.host.call(self.address, principal, &[], amount)
        } else {
            let payload = calldata::encode_transfer(principal, amount);
            self.host.call(self.address, asset, &payload, 0)
        };
        match outcome {
            CallOutcome::Success(_) => self.record(EventKind::WithdrawalExecuted {
                asset,
                amount,
                to: principal,
            }),
            CallOutcome::Revert(data) => Err(Error::OperationFailed(data)),
        }
    }

    fn require_principal(&self, caller: Address) -> Result<()> {
        if !self.policy.roles().is_principal(caller) {
            return Err(Error::AccessDenied);
        }
        Ok(())
    }

    fn require_delegate(&self, caller: Address) -> Result<()> {
        if !self.policy.roles().is_delegate(caller) {
            return Err(Error::AccessDenied);
        }
        Ok(())
    }

    fn record(&self, kind: EventKind) -> Result<()> {
        self.store.append(&Event::new(self.id, kind))?;
        Ok(())
    }

    fn flush(&self, events: &[EventKind]) -> Result<()> {
        for kind in events {
            self.store.append(&Event::new(self.id, kind.clone()))?;
        }
        Ok(())
    }
}
