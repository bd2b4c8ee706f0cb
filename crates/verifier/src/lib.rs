// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

mod block;
mod error;
mod execution;
mod head;
mod queue;

#[cfg(test)]
mod test_engine;

pub use block::{state_tag, BlockVerifier};
pub use error::Error;
pub use execution::verify_block_with_vm;
pub use head::{verify_block_head, verify_block_head_at, HeadError, MAX_REORG_SLOTS};
pub use queue::{VerifyQueue, VerifyRequest};
