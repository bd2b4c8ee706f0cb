// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use crate::{Config, Error};
use interfaces::BlockCacheNode;
use keel_core::{BlockNumber, Timestamp, Transaction, H256};
use log::*;
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

struct Entry {
    tx: Arc<Transaction>,
    received_at: Timestamp,
    seq: u64,
}

/// Result of moving pool to a new head.
#[derive(Default)]
pub struct HeadUpdate {
    /// Pending transactions found in blocks of the new branch.
    pub included: Vec<Arc<Transaction>>,
    /// Transactions of abandoned blocks that are pending again.
    pub reinserted: Vec<Arc<Transaction>>,
}

/// Pending transactions and the chain view they are checked against.
/// Not synchronized, `Pool` wraps it in a lock.
pub struct Transactions {
    /// all pending transactions by hash.
    by_hash: HashMap<H256, Entry>,
    /// arrival order, sequence number to hash.
    by_arrival: BTreeMap<u64, H256>,
    next_seq: u64,
    /// transactions included in selected chain within lookback, with block number.
    included: HashMap<H256, BlockNumber>,
    head: Arc<BlockCacheNode>,
    /// start of head block slot. Expiration is checked against it.
    chain_time: Timestamp,
    config: Arc<Config>,
}

impl Transactions {
    pub fn new(config: Arc<Config>, head: Arc<BlockCacheNode>) -> Self {
        let mut included = HashMap::new();
        for node in head.ancestors().take(config.chain_lookback) {
            for tx in node.block().transactions.iter() {
                included.entry(tx.hash()).or_insert_with(|| node.number());
            }
        }
        Self {
            by_hash: HashMap::new(),
            by_arrival: BTreeMap::new(),
            next_seq: 0,
            included,
            chain_time: head.block().head.time.start(),
            head,
            config,
        }
    }

    pub fn head(&self) -> &Arc<BlockCacheNode> {
        &self.head
    }

    pub fn chain_time(&self) -> Timestamp {
        self.chain_time
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    pub fn contains(&self, hash: &H256) -> bool {
        self.by_hash.contains_key(hash)
    }

    pub fn find(&self, hash: &H256) -> Option<Arc<Transaction>> {
        self.by_hash.get(hash).map(|entry| entry.tx.clone())
    }

    /// Wall clock time at which transaction entered the pool.
    pub fn received_at(&self, hash: &H256) -> Option<Timestamp> {
        self.by_hash.get(hash).map(|entry| entry.received_at)
    }

    /// Transaction is part of selected chain within lookback.
    pub fn in_chain(&self, hash: &H256) -> bool {
        self.included.contains_key(hash)
    }

    pub fn is_expired(&self, tx: &Transaction) -> bool {
        tx.expiration() <= self.chain_time
    }

    /// Pending transactions oldest first.
    pub fn pending(&self) -> Vec<Arc<Transaction>> {
        self.by_arrival
            .values()
            .filter_map(|hash| self.by_hash.get(hash))
            .map(|entry| entry.tx.clone())
            .collect()
    }

    pub fn insert(&mut self, tx: Arc<Transaction>) -> Result<(), Error> {
        let hash = tx.hash();
        if self.by_hash.contains_key(&hash) {
            return Err(Error::Duplicate);
        }
        if self.is_expired(&tx) {
            return Err(Error::Expired);
        }
        if self.in_chain(&hash) {
            return Err(Error::AlreadyIncluded);
        }
        if self.by_hash.len() >= self.config.max {
            return Err(Error::PoolFull);
        }
        self.push(tx);
        Ok(())
    }

    fn push(&mut self, tx: Arc<Transaction>) {
        let hash = tx.hash();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.by_arrival.insert(seq, hash);
        self.by_hash.insert(
            hash,
            Entry {
                tx,
                received_at: Timestamp::now(),
                seq,
            },
        );
    }

    pub fn remove(&mut self, hash: &H256) -> Option<Arc<Transaction>> {
        let entry = self.by_hash.remove(hash)?;
        self.by_arrival.remove(&entry.seq);
        Some(entry.tx)
    }

    /// Keep only transactions for which `f` returns true. Returns removed ones.
    pub fn retain<F>(&mut self, mut f: F) -> Vec<Arc<Transaction>>
    where
        F: FnMut(&Transaction) -> bool,
    {
        let dropped: Vec<H256> = self
            .by_hash
            .iter()
            .filter(|(_, entry)| !f(&entry.tx))
            .map(|(hash, _)| *hash)
            .collect();
        dropped.iter().filter_map(|hash| self.remove(hash)).collect()
    }

    /// Remove every expired pending transaction.
    pub fn expire(&mut self) -> Vec<Arc<Transaction>> {
        let chain_time = self.chain_time;
        self.retain(|tx| tx.expiration() > chain_time)
    }

    /// Switch selected chain to `head`.
    ///
    /// Blocks between old head and fork point are abandoned and their
    /// transactions are pending again, unless expired or also present on the new
    /// branch. Transactions of blocks between fork point and new head are
    /// dropped from pending.
    ///
    /// When old head has no ancestor in common with `head` within lookback the
    /// pool resyncs from `head` as on construction, nothing is reinserted.
    pub fn set_head(&mut self, linked: &BlockCacheNode, head: Arc<BlockCacheNode>) -> HeadUpdate {
        if head.hash() == self.head.hash() {
            trace!(
                "Block #{} {:?} linked outside of selected chain",
                linked.number(),
                linked.hash()
            );
            return HeadUpdate::default();
        }

        let lookback = self.config.chain_lookback;
        // new branch reaches back to the oldest block old head can fork from
        let floor = self.head.number().saturating_sub(lookback as u64);
        let new_branch: Vec<Arc<BlockCacheNode>> = head
            .ancestors()
            .take_while(|node| node.number() >= floor)
            .collect();
        let position: HashMap<H256, usize> = new_branch
            .iter()
            .enumerate()
            .map(|(i, node)| (node.hash(), i))
            .collect();

        let mut abandoned = Vec::new();
        let mut fork = None;
        for node in self.head.ancestors().take(lookback) {
            if let Some(&i) = position.get(&node.hash()) {
                fork = Some(i);
                break;
            }
            abandoned.push(node);
        }
        let fork = match fork {
            Some(fork) => fork,
            None => return self.reset(head),
        };
        let new_branch = &new_branch[..fork];
        if !abandoned.is_empty() {
            debug!(
                "Reorg from #{} to #{}, {} blocks abandoned",
                self.head.number(),
                head.number(),
                abandoned.len()
            );
        }

        self.chain_time = head.block().head.time.start();
        self.head = head;

        let on_new_branch: HashSet<H256> = new_branch
            .iter()
            .flat_map(|node| node.block().transactions.iter().map(|tx| tx.hash()))
            .collect();

        let mut update = HeadUpdate::default();
        for node in abandoned.iter() {
            for tx in node.block().transactions.iter() {
                let hash = tx.hash();
                self.included.remove(&hash);
                if on_new_branch.contains(&hash)
                    || self.by_hash.contains_key(&hash)
                    || self.is_expired(tx)
                    || self.by_hash.len() >= self.config.max
                {
                    continue;
                }
                self.push(tx.clone());
                update.reinserted.push(tx.clone());
            }
        }
        // oldest block first so that earlier inclusion number wins
        for node in new_branch.iter().rev() {
            for tx in node.block().transactions.iter() {
                let hash = tx.hash();
                self.included.entry(hash).or_insert_with(|| node.number());
                if let Some(tx) = self.remove(&hash) {
                    update.included.push(tx);
                }
            }
        }

        let oldest = self.head.number().saturating_sub(lookback as u64);
        self.included.retain(|_, number| *number >= oldest);
        update
    }

    /// Forget chain view and rebuild it from `head`.
    fn reset(&mut self, head: Arc<BlockCacheNode>) -> HeadUpdate {
        warn!(
            "No fork point between #{} {:?} and #{} {:?}, pool resynced to new head",
            self.head.number(),
            self.head.hash(),
            head.number(),
            head.hash()
        );
        let mut update = HeadUpdate::default();
        self.included.clear();
        for node in head.ancestors().take(self.config.chain_lookback) {
            for tx in node.block().transactions.iter() {
                let hash = tx.hash();
                self.included.insert(hash, node.number());
                if let Some(tx) = self.remove(&hash) {
                    update.included.push(tx);
                }
            }
        }
        self.chain_time = head.block().head.time.start();
        self.head = head;
        update
    }
}
