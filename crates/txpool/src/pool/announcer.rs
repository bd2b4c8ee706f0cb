// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use keel_core::Transaction;
use std::sync::Arc;

/// Why a transaction left the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// Found in a block of the selected chain.
    Included,
    Expired,
    OnDemand,
}

/// Listener of pool changes, usually the network layer that gossips pending transactions.
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn inserted(&self, tx: Arc<Transaction>);

    /// Transaction came back to pool after its block left the selected chain.
    async fn reinserted(&self, tx: Arc<Transaction>);

    async fn removed(&self, tx: Arc<Transaction>, reason: Reason);
}

#[cfg(any(test, feature = "test_only"))]
pub mod helper {
    use super::*;
    use keel_core::H256;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Event {
        Inserted(H256),
        Reinserted(H256),
        Removed(H256, Reason),
    }

    /// Keeps every announcement in order of arrival.
    #[derive(Default)]
    pub struct RecordingAnnouncer {
        events: Mutex<Vec<Event>>,
    }

    impl RecordingAnnouncer {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn take(&self) -> Vec<Event> {
            std::mem::take(&mut *self.events.lock())
        }
    }

    #[async_trait]
    impl Announcer for RecordingAnnouncer {
        async fn inserted(&self, tx: Arc<Transaction>) {
            self.events.lock().push(Event::Inserted(tx.hash()));
        }

        async fn reinserted(&self, tx: Arc<Transaction>) {
            self.events.lock().push(Event::Reinserted(tx.hash()));
        }

        async fn removed(&self, tx: Arc<Transaction>, reason: Reason) {
            self.events.lock().push(Event::Removed(tx.hash(), reason));
        }
    }
}
