// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use crate::{Timestamp, H256};
use keccak_hash::keccak;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use std::collections::HashSet;

/// Single contract call inside of transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub contract: String,
    pub method: String,
    /// JSON encoded argument array.
    pub args: String,
}

impl Action {
    pub fn new(contract: &str, method: &str, args: &str) -> Action {
        Action {
            contract: contract.to_string(),
            method: method.to_string(),
            args: args.to_string(),
        }
    }
}

impl Encodable for Action {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.contract);
        s.append(&self.method);
        s.append(&self.args);
    }
}

impl Decodable for Action {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Action {
            contract: rlp.val_at(0)?,
            method: rlp.val_at(1)?,
            args: rlp.val_at(2)?,
        })
    }
}

/// Signature over transaction content made by one key pair.
/// Checking `sig` against the key is done by execution engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// id of key pair that signed.
    pub signer: String,
    pub sig: Vec<u8>,
}

impl Encodable for Signature {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.signer);
        s.append(&self.sig);
    }
}

impl Decodable for Signature {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 2 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Signature {
            signer: rlp.val_at(0)?,
            sig: rlp.val_at(1)?,
        })
    }
}

/// Signed transaction. Content is immutable, every constructor recomputes
/// the content hash that identifies transaction in pool and block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    actions: Vec<Action>,
    signatures: Vec<Signature>,
    gas_limit: u64,
    gas_price: u64,
    time: Timestamp,
    expiration: Timestamp,
    hash: H256,
}

impl Transaction {
    pub fn new(
        actions: Vec<Action>,
        gas_limit: u64,
        gas_price: u64,
        time: Timestamp,
        expiration: Timestamp,
    ) -> Transaction {
        let mut tx = Transaction {
            actions,
            signatures: Vec::new(),
            gas_limit,
            gas_price,
            time,
            expiration,
            hash: H256::zero(),
        };
        tx.recompute_hash();
        tx
    }

    /// Attach signature of `signer`. Hash changes with every attached signature.
    pub fn with_signature(mut self, signer: &str, sig: Vec<u8>) -> Transaction {
        self.signatures.push(Signature {
            signer: signer.to_string(),
            sig,
        });
        self.recompute_hash();
        self
    }

    fn recompute_hash(&mut self) {
        self.hash = keccak(self.encode());
    }

    pub fn encode(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    pub fn decode(bytes: &[u8]) -> Result<Transaction, DecoderError> {
        rlp::decode(bytes)
    }

    pub fn hash(&self) -> H256 {
        self.hash
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Key pair ids that signed this transaction.
    pub fn signers(&self) -> HashSet<String> {
        self.signatures.iter().map(|s| s.signer.clone()).collect()
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn gas_price(&self) -> u64 {
        self.gas_price
    }

    pub fn time(&self) -> Timestamp {
        self.time
    }

    pub fn expiration(&self) -> Timestamp {
        self.expiration
    }
}

impl Encodable for Transaction {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(6);
        s.append_list::<Action, _>(&self.actions);
        s.append_list::<Signature, _>(&self.signatures);
        s.append(&self.gas_limit);
        s.append(&self.gas_price);
        s.append(&self.time);
        s.append(&self.expiration);
    }
}

impl Decodable for Transaction {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 6 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let mut tx = Transaction {
            actions: rlp.list_at(0)?,
            signatures: rlp.list_at(1)?,
            gas_limit: rlp.val_at(2)?,
            gas_price: rlp.val_at(3)?,
            time: rlp.val_at(4)?,
            expiration: rlp.val_at(5)?,
            hash: H256::zero(),
        };
        tx.recompute_hash();
        Ok(tx)
    }
}

#[cfg(any(test, feature = "test_only"))]
pub mod helper {
    use super::*;
    use crate::SLOT_DURATION;

    /// Transfer-like transaction created at `time` that lives for `ttl_slots` slots.
    pub fn new_tx(nonce: u64, time: Timestamp, ttl_slots: i64, signer: &str) -> Transaction {
        Transaction::new(
            vec![Action::new(
                "token",
                "transfer",
                &format!(r#"["{}","bob",{}]"#, signer, nonce),
            )],
            1_000,
            1,
            time,
            time + ttl_slots * SLOT_DURATION,
        )
        .with_signature(signer, vec![nonce as u8; 4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_covers_signatures() {
        let tx = Transaction::new(
            vec![Action::new("token", "transfer", "[]")],
            100,
            1,
            Timestamp(10),
            Timestamp(20),
        );
        let unsigned = tx.hash();
        let signed = tx.with_signature("alice", vec![1, 2, 3]);
        assert_ne!(unsigned, signed.hash());
        assert_eq!(signed.signers().len(), 1);
        assert!(signed.signers().contains("alice"));
    }

    #[test]
    fn decode_restores_hash() {
        let tx = helper::new_tx(7, Timestamp(1_000), 10, "alice");
        let decoded = Transaction::decode(&tx.encode()).unwrap();
        assert_eq!(decoded.hash(), tx.hash());
        assert_eq!(decoded, tx);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(Transaction::decode(&[0xc1, 0x80]).is_err());
    }
}
