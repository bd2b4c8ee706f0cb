// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use keel_core::{Block, Slot};
use thiserror::Error;

/// How many slots a block may lag behind current chain top.
pub const MAX_REORG_SLOTS: i64 = 3;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadError {
    #[error("Block is older than its parent or too far behind chain top")]
    OldBlock,
    #[error("Block is from a future slot")]
    FutureBlock,
    #[error("Parent hash does not match parent block")]
    ParentHash,
    #[error("Block number does not follow parent")]
    Number,
    #[error("Transaction hash does not match transactions")]
    TxHash,
}

/// Check header of `block` against its `parent` and current `chain_top`,
/// reading current slot from system clock.
pub fn verify_block_head(block: &Block, parent: &Block, chain_top: &Block) -> Result<(), HeadError> {
    verify_block_head_at(block, parent, chain_top, Slot::now())
}

/// Check header of `block` as seen at slot `now`. First failing check wins:
/// time window, parent hash, number, transaction hash.
pub fn verify_block_head_at(
    block: &Block,
    parent: &Block,
    chain_top: &Block,
    now: Slot,
) -> Result<(), HeadError> {
    let head = &block.head;
    if head.time <= parent.head.time || head.time < chain_top.head.time - MAX_REORG_SLOTS {
        return Err(HeadError::OldBlock);
    }
    if head.time > now {
        return Err(HeadError::FutureBlock);
    }
    if head.parent_hash != parent.head.hash() {
        return Err(HeadError::ParentHash);
    }
    if Some(head.number) != parent.head.number.checked_add(1) {
        return Err(HeadError::Number);
    }
    if head.txs_hash != block.calculate_txs_hash() {
        return Err(HeadError::TxHash);
    }
    Ok(())
}
