// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use keel_core::{Timestamp, Transaction};
use std::{sync::Arc, vec};

/// Snapshot of pending transactions in arrival order, taken for block assembly.
/// Later pool changes are not visible. Transactions expired at snapshot chain
/// time are skipped.
pub struct TxIterator {
    txs: vec::IntoIter<Arc<Transaction>>,
    chain_time: Timestamp,
}

impl TxIterator {
    pub(crate) fn new(txs: Vec<Arc<Transaction>>, chain_time: Timestamp) -> Self {
        TxIterator {
            txs: txs.into_iter(),
            chain_time,
        }
    }
}

impl Iterator for TxIterator {
    type Item = Arc<Transaction>;

    fn next(&mut self) -> Option<Self::Item> {
        let chain_time = self.chain_time;
        self.txs.find(|tx| tx.expiration() > chain_time)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.txs.len()))
    }
}
