// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

pub mod account;
pub mod block;
pub mod cost;
pub mod receipt;
pub mod slot;
pub mod transaction;

// special purpose hashes
pub use ethereum_types::H256;
pub use keccak_hash::{keccak, KECCAK_EMPTY};

// domain types
pub use account::{Account, Group, Item, Permission, ACTIVE_PERMISSION, OWNER_PERMISSION};
pub use block::{receipts_hash, Block, BlockHead, BlockNumber};
pub use cost::Cost;
pub use receipt::{Receipt, Status};
pub use slot::{Slot, Timestamp, SLOT_DURATION};
pub use transaction::{Action, Signature, Transaction};
