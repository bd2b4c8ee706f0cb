// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

pub mod block_cache;
pub mod engine;
pub mod state;

pub use block_cache::BlockCacheNode;
pub use engine::{EngineFault, ExecutionEngine};
pub use state::{StateReader, StateStorage, AUTH_TABLE};
