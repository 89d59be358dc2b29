use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use alloy::primitives::Address;

use crate::{Error, Result};

/// Single-flight guard keyed by owner address.
///
/// Two permits built for the same owner before either is redeemed embed the same nonce,
/// and only one of them can ever execute. Operations hold an [`InFlightGuard`] for their
/// owner so a second one is rejected up front instead of failing on-chain.
///
/// Clones share the same set of owners.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    owners: Arc<Mutex<HashSet<Address>>>,
}

impl InFlight {
    /// Marks `owner` busy until the returned guard drops.
    ///
    /// Fails with [`Error::OperationInFlight`] if `owner` is already busy.
    pub fn acquire(&self, owner: Address) -> Result<InFlightGuard> {
        let mut owners = self.owners.lock().unwrap_or_else(PoisonError::into_inner);
        if !owners.insert(owner) {
            log::warn!("rejecting operation for {owner}: another one is in flight");
            return Err(Error::OperationInFlight(owner));
        }

        Ok(InFlightGuard {
            owners: Arc::clone(&self.owners),
            owner,
        })
    }

    pub fn is_in_flight(&self, owner: Address) -> bool {
        self.owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&owner)
    }
}

/// Releases the owner when dropped, whether the operation succeeded or not.
#[derive(Debug)]
pub struct InFlightGuard {
    owners: Arc<Mutex<HashSet<Address>>>,
    owner: Address,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.owner);
    }
}
