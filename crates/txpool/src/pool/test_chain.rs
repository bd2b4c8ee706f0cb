// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

//! Block cache trees for pool tests.

use interfaces::BlockCacheNode;
use keel_core::{transaction::helper::new_tx, Block, BlockHead, Slot, Transaction};
use std::sync::Arc;

/// Slot of root block. Test transactions are created at its start.
pub const ROOT_SLOT: i64 = 100;

pub fn root() -> Arc<BlockCacheNode> {
    root_by("genesis")
}

pub fn root_by(witness: &str) -> Arc<BlockCacheNode> {
    BlockCacheNode::new_root(Arc::new(Block::new(BlockHead {
        number: 0,
        time: Slot(ROOT_SLOT),
        witness: witness.to_string(),
        ..Default::default()
    })))
}

pub fn child(parent: &Arc<BlockCacheNode>, txs: Vec<Arc<Transaction>>) -> Arc<BlockCacheNode> {
    child_by(parent, "witness", txs)
}

/// Next block after `parent`, one slot later. Different witnesses give sibling blocks different hashes.
pub fn child_by(
    parent: &Arc<BlockCacheNode>,
    witness: &str,
    txs: Vec<Arc<Transaction>>,
) -> Arc<BlockCacheNode> {
    let mut block = Block::new(BlockHead {
        parent_hash: parent.hash(),
        number: parent.number() + 1,
        time: parent.block().head.time + 1,
        witness: witness.to_string(),
        ..Default::default()
    });
    block.transactions = txs;
    block.head.txs_hash = block.calculate_txs_hash();
    BlockCacheNode::new_child(Arc::new(block), parent)
}

/// Transaction valid for 100 slots after root.
pub fn tx(nonce: u64) -> Arc<Transaction> {
    Arc::new(new_tx(nonce, Slot(ROOT_SLOT).start(), 100, "alice"))
}
