// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use crate::{Receipt, Slot, Transaction, H256};
use keccak_hash::keccak;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use std::sync::Arc;

pub type BlockNumber = u64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockHead {
    pub version: u32,
    pub parent_hash: H256,
    pub number: BlockNumber,
    /// account id of the producer.
    pub witness: String,
    pub time: Slot,
    /// commitment to the ordered transaction set.
    pub txs_hash: H256,
    /// commitment to the ordered receipt set.
    pub merkle_hash: H256,
}

impl BlockHead {
    pub fn hash(&self) -> H256 {
        keccak(rlp::encode(self))
    }
}

impl Encodable for BlockHead {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(7);
        s.append(&self.version);
        s.append(&self.parent_hash);
        s.append(&self.number);
        s.append(&self.witness);
        s.append(&self.time);
        s.append(&self.txs_hash);
        s.append(&self.merkle_hash);
    }
}

impl Decodable for BlockHead {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 7 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(BlockHead {
            version: rlp.val_at(0)?,
            parent_hash: rlp.val_at(1)?,
            number: rlp.val_at(2)?,
            witness: rlp.val_at(3)?,
            time: rlp.val_at(4)?,
            txs_hash: rlp.val_at(5)?,
            merkle_hash: rlp.val_at(6)?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub head: BlockHead,
    pub transactions: Vec<Arc<Transaction>>,
    pub receipts: Vec<Receipt>,
}

impl Block {
    pub fn new(head: BlockHead) -> Block {
        Block {
            head,
            transactions: Vec::new(),
            receipts: Vec::new(),
        }
    }

    pub fn hash(&self) -> H256 {
        self.head.hash()
    }

    /// keccak over concatenated transaction hashes. Empty block gives keccak("").
    pub fn calculate_txs_hash(&self) -> H256 {
        let mut buf = Vec::with_capacity(self.transactions.len() * 32);
        for tx in self.transactions.iter() {
            buf.extend_from_slice(tx.hash().as_bytes());
        }
        keccak(buf)
    }

    /// keccak over concatenated receipt hashes.
    pub fn calculate_merkle_hash(&self) -> H256 {
        receipts_hash(&self.receipts)
    }
}

pub fn receipts_hash(receipts: &[Receipt]) -> H256 {
    let mut buf = Vec::with_capacity(receipts.len() * 32);
    for receipt in receipts.iter() {
        buf.extend_from_slice(receipt.hash().as_bytes());
    }
    keccak(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{transaction::helper::new_tx, Timestamp};
    use keccak_hash::KECCAK_EMPTY;

    #[test]
    fn empty_block_commits_to_empty_hash() {
        let block = Block::default();
        assert_eq!(block.calculate_txs_hash(), KECCAK_EMPTY);
        assert_eq!(block.calculate_merkle_hash(), KECCAK_EMPTY);
    }

    #[test]
    fn txs_hash_depends_on_order() {
        let tx1 = Arc::new(new_tx(1, Timestamp(0), 10, "alice"));
        let tx2 = Arc::new(new_tx(2, Timestamp(0), 10, "alice"));
        let mut block = Block::default();
        block.transactions = vec![tx1.clone(), tx2.clone()];
        let forward = block.calculate_txs_hash();
        block.transactions = vec![tx2, tx1];
        assert_ne!(forward, block.calculate_txs_hash());
    }

    #[test]
    fn head_hash_changes_with_every_field() {
        let head = BlockHead {
            number: 4,
            time: Slot(100),
            witness: "w".to_string(),
            ..Default::default()
        };
        let mut other = head.clone();
        other.time = Slot(101);
        assert_ne!(head.hash(), other.hash());
        let decoded: BlockHead = rlp::decode(&rlp::encode(&head)).unwrap();
        assert_eq!(decoded.hash(), head.hash());
    }
}
