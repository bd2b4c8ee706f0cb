// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use crate::{verify_block_head_at, verify_block_with_vm, Error};
use interfaces::{ExecutionEngine, StateStorage};
use keel_core::{Block, Slot, H256};
use log::*;

/// Label of the state snapshot produced by block with `hash`.
pub fn state_tag(hash: &H256) -> String {
    format!("{:x}", hash)
}

/// Full verification of a received block:
/// 1. header against parent and chain top
/// 2. replay of transactions and receipt comparison
/// 3. commit of resulting state and tag it with block hash
///
/// A rejected block leaves no trace in storage, its pending writes are rolled back.
pub struct BlockVerifier<E, S> {
    engine: E,
    storage: S,
}

impl<E, S> BlockVerifier<E, S>
where
    E: ExecutionEngine,
    S: StateStorage,
{
    pub fn new(engine: E, storage: S) -> Self {
        BlockVerifier { engine, storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Verify `block` at current slot and return its hash.
    pub fn verify(&self, block: &Block, parent: &Block, chain_top: &Block) -> Result<H256, Error> {
        self.verify_at(block, parent, chain_top, Slot::now())
    }

    pub fn verify_at(
        &self,
        block: &Block,
        parent: &Block,
        chain_top: &Block,
        now: Slot,
    ) -> Result<H256, Error> {
        let hash = block.hash();
        let result = verify_block_head_at(block, parent, chain_top, now)
            .map_err(Error::from)
            .and_then(|_| verify_block_with_vm(block, &self.engine, &self.storage));
        if let Err(err) = result {
            warn!("Block #{} {:?} rejected: {}", block.head.number, hash, err);
            // writes of a partially replayed block must not reach the next commit
            self.storage.rollback().map_err(Error::Storage)?;
            return Err(err);
        }

        if let Err(err) = self.storage.commit() {
            error!("Commit of block #{} {:?} failed: {}", block.head.number, hash, err);
            self.storage.rollback().map_err(Error::Storage)?;
            return Err(Error::Storage(err));
        }
        self.storage.tag(&state_tag(&hash)).map_err(Error::Storage)?;
        info!(
            "Block #{} {:?} verified with {} transactions",
            block.head.number,
            hash,
            block.transactions.len()
        );
        Ok(hash)
    }
}
