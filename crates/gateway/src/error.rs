//! Engine error types.

use policy::{Address, Selector};
use thiserror::Error;

/// Engine errors.
///
/// Every failure is synchronous and atomic: whatever state an invocation
/// (or batch) touched before failing is restored before the error is
/// returned. Retry is the caller's responsibility, as a fresh invocation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller does not hold the role the operation requires.
    #[error("access denied: caller does not hold the required role")]
    AccessDenied,

    /// A null identity was supplied.
    #[error("null identity supplied")]
    InvalidIdentity,

    /// The payload is too short to carry the fields the operation needs.
    #[error("payload too short")]
    InvalidPayload,

    /// The (target, selector) pair is not allow-listed.
    #[error("operation {selector} on {target} is not authorized")]
    OperationNotAuthorized { target: Address, selector: Selector },

    /// An allowance grant named a recipient outside the whitelist.
    #[error("allowance grantee {0} is not whitelisted")]
    SpenderNotWhitelisted(Address),

    /// The invoked operation itself failed; carries the raw failure
    /// payload verbatim.
    #[error("invoked operation failed ({} bytes of failure payload)", .0.len())]
    OperationFailed(Vec<u8>),

    /// Batch input sequences have unequal lengths.
    #[error("batch input sequences must have equal lengths")]
    InvalidInput,

    /// An operation is already in flight on this vault.
    #[error("reentrant invocation: an operation is already in flight")]
    ReentrantInvocation,

    /// A zero amount was supplied where value must move.
    #[error("amount must be nonzero")]
    ZeroAmount,

    /// A withdrawal asked for more than the vault holds.
    #[error("requested {requested} exceeds held balance {held}")]
    InsufficientBalance { requested: u128, held: u128 },

    #[error(transparent)]
    Policy(#[from] policy::Error),

    #[error(transparent)]
    Storage(#[from] storage::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
