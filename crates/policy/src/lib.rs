//! Custody policy state.
//!
//! Core principle: **delegated execution is deny-by-default.** Every
//! operation the delegate may trigger is explicitly allow-listed by the
//! principal, and every tracked asset spends against a windowed limit.

mod assets;
mod authorization;
mod config;
mod error;
mod limits;
mod roles;
mod store;
mod types;

pub use assets::TrackedAssets;
pub use authorization::{CallAuthorization, SpenderWhitelist};
pub use config::{AuthorizeRule, LimitRule, PolicyConfig, RolesConfig};
pub use error::{Error, Result};
pub use limits::{LimitStatus, RecordedSpend, SpendingLimit, SpendingLimits};
pub use roles::Roles;
pub use store::PolicyStore;
pub use types::{Address, Selector};
