// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use crate::state::StateStorage;
use auto_impl::auto_impl;
use keel_core::{BlockHead, Receipt, Transaction};
use thiserror::Error;

/// Engine conditions that are not a transaction outcome. A block that triggers
/// any of these can not be verified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineFault {
    #[error("Malformed transaction: {0}")]
    Malformed(String),
    #[error("Unknown contract: {0}")]
    UnknownContract(String),
    #[error("Engine internal error: {0}")]
    Internal(String),
}

/// Executes transactions against state.
///
/// Implementations must be deterministic: the same head, state and transaction
/// always give the same receipt. Failed actions are reported as receipt with
/// failed status, not as `EngineFault`.
#[auto_impl(&, Arc, Box)]
pub trait ExecutionEngine: Send + Sync {
    fn execute(
        &self,
        head: &BlockHead,
        state: &dyn StateStorage,
        tx: &Transaction,
    ) -> Result<Receipt, EngineFault>;
}
