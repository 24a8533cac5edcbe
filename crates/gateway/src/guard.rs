//! Reentrancy guard.
//!
//! An invoked operation may call back into the vault before the original
//! invocation returns. One in-flight flag spans both execution entry
//! points: entering while the flag is held fails immediately, and the flag
//! is released by the returned token's `Drop` on every exit path.

use crate::{Error, Result};
use std::cell::Cell;
use std::rc::Rc;

/// The in-flight-operation flag.
#[derive(Debug, Default)]
pub struct ReentryGuard {
    in_flight: Rc<Cell<bool>>,
}

impl ReentryGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the guard. Fails immediately if an operation is in flight.
    pub fn enter(&self) -> Result<InFlight> {
        if self.in_flight.get() {
            return Err(Error::ReentrantInvocation);
        }
        self.in_flight.set(true);
        Ok(InFlight {
            flag: Rc::clone(&self.in_flight),
        })
    }

    pub fn is_held(&self) -> bool {
        self.in_flight.get()
    }
}

/// Releases the guard when dropped.
#[derive(Debug)]
pub struct InFlight {
    flag: Rc<Cell<bool>>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_entry_fails_while_held() {
        let guard = ReentryGuard::new();
        let token = guard.enter().unwrap();
        assert!(guard.is_held());
        assert!(matches!(guard.enter(), Err(Error::ReentrantInvocation)));
        drop(token);
        assert!(!guard.is_held());
        guard.enter().unwrap();
    }

    #[test]
    fn released_on_failure_paths() {
        let guard = ReentryGuard::new();

        let failing: Result<()> = (|| {
            let _token = guard.enter()?;
            Err(Error::InvalidInput)
        })();
        assert!(failing.is_err());

        // The early return dropped the token.
        assert!(!guard.is_held());
        guard.enter().unwrap();
    }
}
