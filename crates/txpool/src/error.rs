// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Transaction already present.")]
    Duplicate,
    #[error("Transaction not inserted. It is expired.")]
    Expired,
    #[error("Transaction not inserted. Pool limit reached.")]
    PoolFull,
    #[error("Transaction not inserted. It is already included in chain.")]
    AlreadyIncluded,
    #[error("Transaction not decodable: {0}")]
    Decode(#[from] rlp::DecoderError),
    #[error("Housekeeping needs tokio runtime.")]
    NoRuntime,
}
