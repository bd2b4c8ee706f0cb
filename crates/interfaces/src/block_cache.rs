// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use keel_core::{Block, BlockNumber, H256};
use parking_lot::RwLock;
use std::sync::Arc;

/// Position of a linked block in the fork-choice tree. Nodes only keep a link
/// to their parent, children are owned by whoever extends the tree.
///
/// Once a block becomes irreversible its node is [`detach`](Self::detach)ed so
/// everything behind it can be freed.
#[derive(Debug)]
pub struct BlockCacheNode {
    block: Arc<Block>,
    hash: H256,
    parent: RwLock<Option<Arc<BlockCacheNode>>>,
}

impl BlockCacheNode {
    /// Node without known parent, usually last irreversible block.
    pub fn new_root(block: Arc<Block>) -> Arc<BlockCacheNode> {
        Arc::new(BlockCacheNode {
            hash: block.hash(),
            block,
            parent: RwLock::new(None),
        })
    }

    pub fn new_child(block: Arc<Block>, parent: &Arc<BlockCacheNode>) -> Arc<BlockCacheNode> {
        Arc::new(BlockCacheNode {
            hash: block.hash(),
            block,
            parent: RwLock::new(Some(parent.clone())),
        })
    }

    pub fn block(&self) -> &Arc<Block> {
        &self.block
    }

    pub fn hash(&self) -> H256 {
        self.hash
    }

    pub fn number(&self) -> BlockNumber {
        self.block.head.number
    }

    pub fn parent(&self) -> Option<Arc<BlockCacheNode>> {
        self.parent.read().clone()
    }

    /// Cut the link to parent, making this node the new root.
    pub fn detach(&self) {
        self.parent.write().take();
    }

    /// Iterates from this node towards the root, starting with self.
    pub fn ancestors(self: &Arc<Self>) -> Ancestors {
        Ancestors {
            next: Some(self.clone()),
        }
    }
}

pub struct Ancestors {
    next: Option<Arc<BlockCacheNode>>,
}

impl Iterator for Ancestors {
    type Item = Arc<BlockCacheNode>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next.take()?;
        self.next = node.parent();
        Some(node)
    }
}

impl Drop for BlockCacheNode {
    // unlink uniquely owned ancestors one by one, recursive drop of a long chain overflows the stack
    fn drop(&mut self) {
        let mut next = self.parent.get_mut().take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.parent.get_mut().take(),
                Err(_) => break,
            }
        }
    }
}
