// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use super::{Announcer, Reason, Transactions, TxIterator};
use crate::{config::Config, Error};
use async_trait::async_trait;
use futures::future::join_all;
use interfaces::BlockCacheNode;
use keel_core::{Block, Timestamp, Transaction, H256};
use log::*;
use parking_lot::{Mutex, RwLock, RwLockWriteGuard};
use std::sync::Arc;
use tokio::{runtime::Handle, task::JoinHandle};

/// Where a transaction was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoundTx {
    NotFound,
    Pending,
    /// In the given block or in a block of selected chain.
    InChain,
}

/// Pool of transactions waiting to be included in a block.
#[async_trait]
pub trait TxPool: Send + Sync {
    /// Start periodic eviction of expired transactions. Needs tokio runtime.
    fn start(&self) -> Result<(), Error>;

    fn stop(&self);

    /// New block `linked` entered block cache and `head` is selected chain head.
    /// Transactions included on the selected chain leave the pool, transactions of
    /// abandoned blocks come back.
    async fn add_linked_node(
        &self,
        linked: Arc<BlockCacheNode>,
        head: Arc<BlockCacheNode>,
    ) -> Result<(), Error>;

    async fn add_tx(&self, tx: Arc<Transaction>) -> Result<(), Error>;

    /// Removing unknown transaction is noop.
    async fn del_tx(&self, hash: &H256);

    async fn del_tx_list(&self, txs: &[Arc<Transaction>]);

    /// Pending transactions in arrival order and head they were collected against.
    fn tx_iterator(&self) -> (TxIterator, Arc<BlockCacheNode>);

    /// Pending transaction that is expired at chain time is not reported as
    /// pending, it stays in the pool until next expiry pass.
    fn exist_txs(&self, hash: &H256, chain_block: Option<&Block>) -> FoundTx;

    /// Exclusive access for read-modify sequences. Released on drop.
    fn lock(&self) -> PoolGuard<'_>;

    fn tx_timeout(&self, tx: &Transaction) -> bool;
}

/// Write access to pool. Other pool operations wait until it is dropped.
/// Changes made through guard are not announced.
pub struct PoolGuard<'a> {
    txs: RwLockWriteGuard<'a, Transactions>,
}

impl PoolGuard<'_> {
    pub fn pending(&self) -> Vec<Arc<Transaction>> {
        self.txs.pending()
    }

    pub fn contains(&self, hash: &H256) -> bool {
        self.txs.contains(hash)
    }

    pub fn remove(&mut self, hash: &H256) -> Option<Arc<Transaction>> {
        self.txs.remove(hash)
    }

    pub fn head(&self) -> &Arc<BlockCacheNode> {
        self.txs.head()
    }
}

/// Transaction pool.
pub struct Pool {
    txs: Arc<RwLock<Transactions>>,
    /// configuration of pool
    config: Arc<Config>,
    announcer: Arc<dyn Announcer>,
    housekeeping: Mutex<Option<JoinHandle<()>>>,
}

async fn expire(txs: &RwLock<Transactions>, announcer: &dyn Announcer) -> usize {
    let expired = txs.write().expire();
    let count = expired.len();
    if count > 0 {
        debug!("{} expired transactions removed", count);
    }
    for tx in expired {
        announcer.removed(tx, Reason::Expired).await;
    }
    count
}

impl Pool {
    pub fn new(
        config: Arc<Config>,
        head: Arc<BlockCacheNode>,
        announcer: Arc<dyn Announcer>,
    ) -> Pool {
        Pool {
            txs: Arc::new(RwLock::new(Transactions::new(config.clone(), head))),
            config,
            announcer,
            housekeeping: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn head(&self) -> Arc<BlockCacheNode> {
        self.txs.read().head().clone()
    }

    pub fn chain_time(&self) -> Timestamp {
        self.txs.read().chain_time()
    }

    pub fn pending_len(&self) -> usize {
        self.txs.read().len()
    }

    pub fn find(&self, hash: &H256) -> Option<Arc<Transaction>> {
        self.txs.read().find(hash)
    }

    /// Run one expiry pass now. Returns number of evicted transactions.
    pub async fn expire_now(&self) -> usize {
        expire(&self.txs, &*self.announcer).await
    }

    /// Atomically drop every transaction for which `f` returns false.
    pub async fn retain<F>(&self, f: F) -> usize
    where
        F: FnMut(&Transaction) -> bool,
    {
        let removed = self.txs.write().retain(f);
        let count = removed.len();
        for tx in removed {
            self.announcer.removed(tx, Reason::OnDemand).await;
        }
        count
    }

    /// Admit batch of transactions. Results keep input order.
    pub async fn import(&self, txs: Vec<Arc<Transaction>>) -> Vec<Result<(), Error>> {
        join_all(txs.into_iter().map(|tx| self.add_tx(tx))).await
    }

    /// Admit batch of RLP encoded transactions. Results keep input order.
    pub async fn import_raw(&self, raw: Vec<Vec<u8>>) -> Vec<Result<(), Error>> {
        join_all(raw.into_iter().map(|bytes| async move {
            let tx = Transaction::decode(&bytes)?;
            self.add_tx(Arc::new(tx)).await
        }))
        .await
    }
}

#[async_trait]
impl TxPool for Pool {
    fn start(&self) -> Result<(), Error> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let mut housekeeping = self.housekeeping.lock();
        if housekeeping.is_some() {
            return Ok(());
        }

        // periodic check for timing out tx.
        let txs = self.txs.clone();
        let announcer = self.announcer.clone();
        let period = self.config.housekeeping_interval();
        *housekeeping = Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                expire(&txs, &*announcer).await;
            }
        }));
        info!("Transaction pool housekeeping started, period {:?}", period);
        Ok(())
    }

    fn stop(&self) {
        if let Some(handle) = self.housekeeping.lock().take() {
            handle.abort();
            info!("Transaction pool housekeeping stopped");
        }
    }

    async fn add_linked_node(
        &self,
        linked: Arc<BlockCacheNode>,
        head: Arc<BlockCacheNode>,
    ) -> Result<(), Error> {
        let update = self.txs.write().set_head(&linked, head);
        for tx in update.included {
            self.announcer.removed(tx, Reason::Included).await;
        }
        for tx in update.reinserted {
            self.announcer.reinserted(tx).await;
        }
        Ok(())
    }

    async fn add_tx(&self, tx: Arc<Transaction>) -> Result<(), Error> {
        let inserted = self.txs.write().insert(tx.clone());
        if let Err(err) = inserted {
            trace!("Transaction {:?} not admitted: {}", tx.hash(), err);
            return Err(err);
        }
        self.announcer.inserted(tx).await;
        Ok(())
    }

    async fn del_tx(&self, hash: &H256) {
        let removed = self.txs.write().remove(hash);
        if let Some(tx) = removed {
            self.announcer.removed(tx, Reason::OnDemand).await;
        }
    }

    async fn del_tx_list(&self, txs: &[Arc<Transaction>]) {
        let removed: Vec<Arc<Transaction>> = {
            let mut pool = self.txs.write();
            txs.iter().filter_map(|tx| pool.remove(&tx.hash())).collect()
        };
        for tx in removed {
            self.announcer.removed(tx, Reason::OnDemand).await;
        }
    }

    fn tx_iterator(&self) -> (TxIterator, Arc<BlockCacheNode>) {
        let txs = self.txs.read();
        (
            TxIterator::new(txs.pending(), txs.chain_time()),
            txs.head().clone(),
        )
    }

    fn exist_txs(&self, hash: &H256, chain_block: Option<&Block>) -> FoundTx {
        let txs = self.txs.read();
        if let Some(tx) = txs.find(hash) {
            if !txs.is_expired(&tx) {
                return FoundTx::Pending;
            }
        }
        let in_block = chain_block
            .map(|block| block.transactions.iter().any(|tx| tx.hash() == *hash))
            .unwrap_or(false);
        if in_block || txs.in_chain(hash) {
            FoundTx::InChain
        } else {
            FoundTx::NotFound
        }
    }

    fn lock(&self) -> PoolGuard<'_> {
        PoolGuard {
            txs: self.txs.write(),
        }
    }

    fn tx_timeout(&self, tx: &Transaction) -> bool {
        self.txs.read().is_expired(tx)
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        if let Some(handle) = self.housekeeping.get_mut().take() {
            handle.abort();
        }
    }
}
