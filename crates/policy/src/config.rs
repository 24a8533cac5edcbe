//! Policy configuration loaded from TOML.

use crate::{Address, Error, PolicyStore, Result, Selector};
use serde::Deserialize;
use std::path::Path;

/// Declarative policy configuration, the principal's `steward.toml`.
///
/// ```toml
/// tracked = ["native", "0x3333333333333333333333333333333333333333"]
/// whitelist = ["0x4444444444444444444444444444444444444444"]
///
/// [roles]
/// principal = "0x1111111111111111111111111111111111111111"
/// delegate = "0x2222222222222222222222222222222222222222"
///
/// [[authorize]]
/// target = "0x3333333333333333333333333333333333333333"
/// selector = "0xa9059cbb"
///
/// [[limit]]
/// asset = "native"
/// limit = "250000000000000000000"
/// window = 21600
/// ```
#[derive(Debug, Deserialize)]
pub struct PolicyConfig {
    pub roles: RolesConfig,

    /// Authorized (target, selector) pairs.
    #[serde(default)]
    pub authorize: Vec<AuthorizeRule>,

    /// Identities approved to receive allowance grants.
    #[serde(default)]
    pub whitelist: Vec<Address>,

    /// Assets monitored for spend accounting ("native" for the native
    /// asset).
    #[serde(default)]
    pub tracked: Vec<Address>,

    /// Per-asset windowed limits.
    #[serde(default, rename = "limit")]
    pub limits: Vec<LimitRule>,
}

#[derive(Debug, Deserialize)]
pub struct RolesConfig {
    pub principal: Address,
    pub delegate: Address,
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeRule {
    pub target: Address,
    pub selector: Selector,
}

#[derive(Debug, Deserialize)]
pub struct LimitRule {
    pub asset: Address,
    /// Accepted as an integer or a decimal string, so values beyond TOML's
    /// integer range stay expressible.
    #[serde(deserialize_with = "amount")]
    pub limit: u128,
    /// Window duration in seconds.
    pub window: u64,
}

impl PolicyConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Validate and build the runtime policy store. Surfaces the same
    /// errors the runtime mutators would.
    pub fn into_store(self) -> Result<PolicyStore> {
        let mut store = PolicyStore::new(self.roles.principal, self.roles.delegate)?;
        for rule in &self.authorize {
            store
                .authorizations_mut()
                .set(rule.target, rule.selector, true)?;
        }
        for spender in &self.whitelist {
            store.whitelist_mut().set(*spender, true)?;
        }
        for asset in &self.tracked {
            store.tracked_mut().add(*asset)?;
        }
        for rule in &self.limits {
            store.limits_mut().set(rule.asset, rule.limit, rule.window)?;
        }
        Ok(store)
    }
}

fn amount<'de, D>(deserializer: D) -> std::result::Result<u128, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as _;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(u128::from(n)),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid amount {s:?}"))),
    }
}
