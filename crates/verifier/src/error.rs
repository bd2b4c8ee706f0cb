// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0
use crate::HeadError;
use interfaces::EngineFault;
use thiserror::Error;

/// Reasons to reject a block. None of them is retried, rejected block is discarded.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Head(#[from] HeadError),
    #[error("Block has {txs} transactions but {receipts} receipts")]
    ReceiptCount { txs: usize, receipts: usize },
    #[error("Receipt of transaction {index} differs from execution")]
    ReceiptMismatch { index: usize },
    #[error("Receipt commitment does not match receipts")]
    MerkleHash,
    #[error("Engine failed on transaction {index}: {fault}")]
    Engine { index: usize, fault: EngineFault },
    #[error("State storage failed: {0}")]
    Storage(anyhow::Error),
}
