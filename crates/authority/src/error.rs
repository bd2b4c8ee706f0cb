// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0
use keel_core::Cost;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Stored account record could not be decoded. `cost` is the work done
    /// up to and including the failed read.
    #[error("Account {id} has corrupt record: {source}")]
    CorruptAccount {
        id: String,
        cost: Cost,
        source: serde_json::Error,
    },
}

impl Error {
    pub fn cost(&self) -> Cost {
        match self {
            Error::CorruptAccount { cost, .. } => *cost,
        }
    }
}
