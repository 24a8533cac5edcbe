//! The boundary to the external world.

use policy::Address;

mod local;

pub use local::{Behavior, LocalHost};

/// Opaque marker for a host transaction frame, returned by
/// [`Host::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(pub usize);

/// Outcome of an external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The call fully applied its effects; carries the raw result bytes.
    Success(Vec<u8>),
    /// The call applied nothing; carries the raw failure payload, which
    /// the engine surfaces verbatim.
    Revert(Vec<u8>),
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Everything the engine knows about the world outside its own state.
///
/// The target of a delegated operation has an unknown shape, so dynamic
/// dispatch is one narrow interface: call with bytes, forward native
/// value, get bytes-or-failure. The trait also supplies the clock the
/// spending windows run on, the balance queries the diffing snapshot uses,
/// and the transaction framing that makes the engine's atomic unit span
/// host effects: any engine failure after a successful inner call still
/// unwinds the host to the entry checkpoint.
pub trait Host {
    /// Current time, Unix seconds.
    fn now(&self) -> u64;

    /// Native-asset balance held by `of`.
    fn native_balance(&self, of: Address) -> u128;

    /// Balance of `asset` held by `of`.
    fn asset_balance(&self, asset: Address, of: Address) -> u128;

    /// Invoke `target` with `payload`, forwarding `value` of the native
    /// asset from `from`. Either fully applies or applies nothing.
    fn call(&mut self, from: Address, target: Address, payload: &[u8], value: u128)
    -> CallOutcome;

    /// Open a transaction frame.
    fn checkpoint(&mut self) -> Checkpoint;

    /// Discard the frame, keeping all effects since it was opened.
    fn commit(&mut self, checkpoint: Checkpoint);

    /// Unwind all effects since the frame was opened.
    fn rollback(&mut self, checkpoint: Checkpoint);
}
