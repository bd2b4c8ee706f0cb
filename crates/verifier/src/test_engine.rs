// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

//! Small deterministic token engine used to produce and replay blocks in tests.

use authority::Authority;
use interfaces::{
    state::helper::MemoryState, EngineFault, ExecutionEngine, StateReader, StateStorage,
};
use keel_core::{Account, Action, Block, BlockHead, Receipt, Slot, Timestamp, Transaction};
use std::sync::Arc;

pub const ACTION_GAS: u64 = 1_000;
const BALANCE_TABLE: &str = "balance";

pub struct TokenEngine;

fn balance(state: &dyn StateStorage, id: &str) -> u64 {
    state
        .get(BALANCE_TABLE, id)
        .and_then(|raw| String::from_utf8(raw).ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

fn set_balance(state: &dyn StateStorage, id: &str, value: u64) {
    state.put(BALANCE_TABLE, id, value.to_string().into_bytes());
}

impl ExecutionEngine for TokenEngine {
    fn execute(
        &self,
        _head: &BlockHead,
        state: &dyn StateStorage,
        tx: &Transaction,
    ) -> Result<Receipt, EngineFault> {
        let signers = tx.signers();
        let auth = Authority::new(state);
        let mut gas = 0;
        for action in tx.actions() {
            gas += ACTION_GAS;
            match (action.contract.as_str(), action.method.as_str()) {
                ("token", "transfer") => {
                    let (from, to, amount): (String, String, u64) =
                        serde_json::from_str(&action.args)
                            .map_err(|e| EngineFault::Malformed(e.to_string()))?;
                    let (ok, cost) = auth
                        .require_auth(&from, "transfer", &signers)
                        .map_err(|e| EngineFault::Internal(e.to_string()))?;
                    gas += cost.gas();
                    if !ok {
                        return Ok(Receipt::failed(gas, "transfer not authorized"));
                    }
                    let from_balance = balance(state, &from);
                    if from_balance < amount {
                        return Ok(Receipt::failed(gas, "insufficient balance"));
                    }
                    set_balance(state, &from, from_balance - amount);
                    set_balance(state, &to, balance(state, &to) + amount);
                }
                ("sys", "fail") => return Ok(Receipt::failed(gas, "requested failure")),
                (contract, _) => return Err(EngineFault::UnknownContract(contract.to_string())),
            }
        }
        Ok(Receipt::success(gas, ""))
    }
}

pub struct Fixture {
    pub engine: TokenEngine,
    pub state: Arc<MemoryState>,
}

impl Fixture {
    /// alice and bob hold 100 tokens each, carol holds nothing.
    pub fn funded() -> Fixture {
        let state = MemoryState::new();
        for id in ["alice", "bob", "carol"].iter() {
            let key = format!("{}_key", id);
            state.set_account(&Account::new_init(id, &key, &key));
        }
        set_balance(&*state, "alice", 100);
        set_balance(&*state, "bob", 100);
        state.commit().expect("memory commit");
        Fixture {
            engine: TokenEngine,
            state,
        }
    }
}

pub fn transfer(from: &str, to: &str, amount: u64) -> Arc<Transaction> {
    let tx = Transaction::new(
        vec![Action::new(
            "token",
            "transfer",
            &format!(r#"["{}","{}",{}]"#, from, to, amount),
        )],
        10_000,
        1,
        Timestamp(0),
        Timestamp(i64::MAX),
    )
    .with_signature(&format!("{}_key", from), vec![7; 8]);
    Arc::new(tx)
}

/// Execute `txs` on producer state and seal block #1 with their receipts.
pub fn build_block(producer: &Fixture, txs: Vec<Arc<Transaction>>) -> Block {
    let mut block = Block::new(BlockHead {
        number: 1,
        time: Slot(10),
        witness: "producer".to_string(),
        ..Default::default()
    });
    for tx in txs {
        let receipt = producer
            .engine
            .execute(&block.head, &*producer.state, &tx)
            .expect("producer executes");
        block.transactions.push(tx);
        block.receipts.push(receipt);
    }
    block.head.txs_hash = block.calculate_txs_hash();
    block.head.merkle_hash = block.calculate_merkle_hash();
    block
}
