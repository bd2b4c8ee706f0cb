// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use crate::H256;
use keccak_hash::keccak;
use rlp::{Encodable, RlpStream};

/// Outcome of transaction execution. Failed transaction is still a valid
/// consensus result and is recorded in block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success,
    Failed(String),
}

impl Status {
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub status: Status,
    pub gas_usage: u64,
    pub return_value: String,
}

impl Receipt {
    pub fn success(gas_usage: u64, return_value: &str) -> Receipt {
        Receipt {
            status: Status::Success,
            gas_usage,
            return_value: return_value.to_string(),
        }
    }

    pub fn failed(gas_usage: u64, reason: &str) -> Receipt {
        Receipt {
            status: Status::Failed(reason.to_string()),
            gas_usage,
            return_value: String::new(),
        }
    }

    pub fn hash(&self) -> H256 {
        keccak(rlp::encode(self))
    }
}

impl Encodable for Receipt {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(4);
        match self.status {
            Status::Success => {
                s.append(&0u8);
                s.append_empty_data();
            }
            Status::Failed(ref reason) => {
                s.append(&1u8);
                s.append(reason);
            }
        }
        s.append(&self.gas_usage);
        s.append(&self.return_value);
    }
}
