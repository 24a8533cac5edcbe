//! Tracked asset registry.

use crate::{Address, Error, Result};

/// The set of asset identifiers monitored for spend accounting, in
/// insertion order. The native asset appears as [`Address::NATIVE`].
#[derive(Debug, Clone, Default)]
pub struct TrackedAssets {
    assets: Vec<Address>,
}

impl TrackedAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track an asset. Adding an existing member fails.
    pub fn add(&mut self, asset: Address) -> Result<()> {
        if asset.is_zero() {
            return Err(Error::InvalidIdentity);
        }
        if self.contains(asset) {
            return Err(Error::AlreadyTracked(asset));
        }
        self.assets.push(asset);
        Ok(())
    }

    /// Stop tracking an asset. Removing an absent member fails.
    pub fn remove(&mut self, asset: Address) -> Result<()> {
        let index = self
            .assets
            .iter()
            .position(|a| *a == asset)
            .ok_or(Error::NotTracked(asset))?;
        self.assets.remove(index);
        Ok(())
    }

    pub fn contains(&self, asset: Address) -> bool {
        self.assets.contains(&asset)
    }

    pub fn iter(&self) -> impl Iterator<Item = Address> + '_ {
        self.assets.iter().copied()
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    #[test]
    fn add_and_remove() {
        let mut tracked = TrackedAssets::new();
        tracked.add(Address::NATIVE).unwrap();
        tracked.add(addr(1)).unwrap();
        assert!(tracked.contains(Address::NATIVE));
        assert!(tracked.contains(addr(1)));

        tracked.remove(addr(1)).unwrap();
        assert!(!tracked.contains(addr(1)));
        assert_eq!(tracked.len(), 1);
    }

    #[test]
    fn duplicate_add_fails() {
        let mut tracked = TrackedAssets::new();
        tracked.add(addr(1)).unwrap();
        assert!(matches!(
            tracked.add(addr(1)),
            Err(Error::AlreadyTracked(a)) if a == addr(1)
        ));
    }

    #[test]
    fn absent_remove_fails() {
        let mut tracked = TrackedAssets::new();
        assert!(matches!(
            tracked.remove(addr(1)),
            Err(Error::NotTracked(a)) if a == addr(1)
        ));
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut tracked = TrackedAssets::new();
        tracked.add(addr(3)).unwrap();
        tracked.add(addr(1)).unwrap();
        tracked.add(addr(2)).unwrap();
        assert_eq!(tracked.as_slice(), &[addr(3), addr(1), addr(2)]);
    }
}
