//! Policy error types.

use crate::Address;
use thiserror::Error;

/// Policy errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A null identity was supplied where a real one is required.
    #[error("null identity supplied")]
    InvalidIdentity,

    /// The asset is already a member of the tracked set.
    #[error("asset {0} is already tracked")]
    AlreadyTracked(Address),

    /// The asset is not a member of the tracked set.
    #[error("asset {0} is not tracked")]
    NotTracked(Address),

    /// A nonzero limit was configured with a zero window duration.
    #[error("window duration must be nonzero when a limit is set")]
    InvalidWindow,

    /// A spend would push the current window past its limit.
    #[error("spending limit exceeded on {asset}: spend of {amount} against limit {limit}")]
    SpendingLimitExceeded {
        asset: Address,
        amount: u128,
        limit: u128,
    },

    /// Failed to parse a policy config or an address/selector literal.
    #[error("failed to parse policy: {0}")]
    Parse(String),

    /// An I/O error occurred while reading a policy config.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
