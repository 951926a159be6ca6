//! One-way validity cell shared between an owner and the handles it issues.
//!
//! Remote clients may keep a handle long after the engine object behind it
//! is gone, and the server cannot revoke it. The owner instead flips the
//! shared flag when the object is torn down; every operation reached
//! through a handle checks it first.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared `valid` bit. Starts `true`, can only ever become `false`.
///
/// Clones observe the same cell.
#[derive(Debug, Clone)]
pub struct ValidityFlag(Arc<AtomicBool>);

impl ValidityFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_valid(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark invalid. Returns `true` only for the call that flipped it.
    pub fn invalidate(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

impl Default for ValidityFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_valid() {
        assert!(ValidityFlag::new().is_valid());
    }

    #[test]
    fn invalidate_is_one_way_and_idempotent() {
        let flag = ValidityFlag::new();
        assert!(flag.invalidate());
        assert!(!flag.invalidate());
        assert!(!flag.is_valid());
    }

    #[test]
    fn clones_share_state() {
        let owner = ValidityFlag::new();
        let handle = owner.clone();
        owner.invalidate();
        assert!(!handle.is_valid());
    }
}
