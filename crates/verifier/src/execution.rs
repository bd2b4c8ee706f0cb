// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use crate::{Error, HeadError};
use interfaces::{ExecutionEngine, StateStorage};
use keel_core::Block;
use log::*;

/// Re-execute every transaction of `block` in order and compare produced
/// receipts with the ones the block carries.
///
/// Failed receipts are valid outcomes; only a difference between produced and
/// carried receipts, or an engine fault, rejects the block. Writes made by the
/// engine stay pending in `state`, committing them is up to the caller.
pub fn verify_block_with_vm<E>(
    block: &Block,
    engine: &E,
    state: &dyn StateStorage,
) -> Result<(), Error>
where
    E: ExecutionEngine + ?Sized,
{
    if block.transactions.len() != block.receipts.len() {
        return Err(Error::ReceiptCount {
            txs: block.transactions.len(),
            receipts: block.receipts.len(),
        });
    }
    if block.head.txs_hash != block.calculate_txs_hash() {
        return Err(HeadError::TxHash.into());
    }

    for (index, (tx, expected)) in block
        .transactions
        .iter()
        .zip(block.receipts.iter())
        .enumerate()
    {
        let receipt = engine
            .execute(&block.head, state, tx)
            .map_err(|fault| Error::Engine { index, fault })?;
        if receipt != *expected {
            debug!(
                "Block #{} tx {:?} receipt mismatch: got {:?}, block has {:?}",
                block.head.number,
                tx.hash(),
                receipt,
                expected
            );
            return Err(Error::ReceiptMismatch { index });
        }
    }

    if block.head.merkle_hash != block.calculate_merkle_hash() {
        return Err(Error::MerkleHash);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_engine::{build_block, transfer, Fixture};
    use interfaces::state::helper::MemoryState;
    use keel_core::{Action, Receipt, Status, Transaction};
    use std::sync::Arc;

    #[test]
    fn replay_matches_produced_block() {
        let (producer, verifier) = (Fixture::funded(), Fixture::funded());
        let txs = vec![transfer("alice", "bob", 10), transfer("bob", "carol", 5)];
        let block = build_block(&producer, txs);
        assert!(block.receipts.iter().all(|r| r.status.is_success()));

        assert!(verify_block_with_vm(&block, &verifier.engine, &*verifier.state).is_ok());
    }

    #[test]
    fn failed_receipt_is_valid_outcome() {
        let (producer, verifier) = (Fixture::funded(), Fixture::funded());
        // bob does not sign for alice
        let forged = Transaction::new(
            vec![Action::new("token", "transfer", r#"["alice","bob",1]"#)],
            1_000,
            1,
            Default::default(),
            Default::default(),
        )
        .with_signature("bob_key", vec![1]);
        let block = build_block(&producer, vec![Arc::new(forged)]);
        assert!(matches!(block.receipts[0].status, Status::Failed(_)));

        assert!(verify_block_with_vm(&block, &verifier.engine, &*verifier.state).is_ok());
    }

    #[test]
    fn receipt_mismatch_rejects() {
        let (producer, verifier) = (Fixture::funded(), Fixture::funded());
        let mut block = build_block(
            &producer,
            vec![transfer("alice", "bob", 10), transfer("bob", "carol", 5)],
        );
        block.receipts[1] = Receipt::success(block.receipts[1].gas_usage + 1, "");
        block.head.merkle_hash = block.calculate_merkle_hash();

        assert!(matches!(
            verify_block_with_vm(&block, &verifier.engine, &*verifier.state),
            Err(Error::ReceiptMismatch { index: 1 })
        ));
    }

    #[test]
    fn status_mismatch_rejects() {
        let (producer, verifier) = (Fixture::funded(), Fixture::funded());
        let mut block = build_block(&producer, vec![transfer("alice", "bob", 10)]);
        block.receipts[0].status = Status::Failed("claimed".to_string());
        block.head.merkle_hash = block.calculate_merkle_hash();

        assert!(matches!(
            verify_block_with_vm(&block, &verifier.engine, &*verifier.state),
            Err(Error::ReceiptMismatch { index: 0 })
        ));
    }

    #[test]
    fn receipt_count_checked() {
        let verifier = Fixture::funded();
        let mut block = build_block(&Fixture::funded(), vec![transfer("alice", "bob", 1)]);
        block.receipts.clear();
        assert!(matches!(
            verify_block_with_vm(&block, &verifier.engine, &*verifier.state),
            Err(Error::ReceiptCount {
                txs: 1,
                receipts: 0
            })
        ));
    }

    #[test]
    fn merkle_hash_checked() {
        let verifier = Fixture::funded();
        let mut block = build_block(&Fixture::funded(), vec![transfer("alice", "bob", 1)]);
        block.head.merkle_hash = Default::default();
        assert!(matches!(
            verify_block_with_vm(&block, &verifier.engine, &*verifier.state),
            Err(Error::MerkleHash)
        ));
    }

    #[test]
    fn engine_fault_rejects() {
        let verifier = Fixture::funded();
        let unknown = Transaction::new(
            vec![Action::new("nowhere", "call", "[]")],
            1_000,
            1,
            Default::default(),
            Default::default(),
        );
        let mut block = build_block(&Fixture::funded(), vec![]);
        block.transactions.push(Arc::new(unknown));
        block.receipts.push(Receipt::success(0, ""));
        block.head.txs_hash = block.calculate_txs_hash();

        assert!(matches!(
            verify_block_with_vm(&block, &verifier.engine, &*verifier.state),
            Err(Error::Engine { index: 0, .. })
        ));
    }

    #[test]
    fn empty_block_passes() {
        let block = build_block(&Fixture::funded(), vec![]);
        let state = MemoryState::new();
        assert!(verify_block_with_vm(&block, &Fixture::funded().engine, &*state).is_ok());
    }
}
