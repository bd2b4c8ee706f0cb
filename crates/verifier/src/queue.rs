// Copyright 2020-2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use crate::{BlockVerifier, Error};
use interfaces::{ExecutionEngine, StateStorage};
use keel_core::{Block, H256};
use parking_lot::{Condvar, Mutex};
use std::{collections::VecDeque, io, sync::Arc, thread};

/// Block waiting for verification together with blocks it is checked against.
pub struct VerifyRequest {
    pub block: Arc<Block>,
    pub parent: Arc<Block>,
    pub chain_top: Arc<Block>,
}

struct Pending {
    // None after queue is ended.
    requests: Mutex<Option<VecDeque<VerifyRequest>>>,
    cvar: Condvar,
    max_items: usize,
}

impl Pending {
    fn wait_for_request(&self) -> Option<VerifyRequest> {
        let mut requests = self.requests.lock();
        loop {
            match requests.as_mut()?.pop_front() {
                Some(request) => return Some(request),
                None => self.cvar.wait(&mut requests),
            }
        }
    }
}

/// Runs block verification on a dedicated thread so that disk bound state reads
/// do not block the caller. Blocks are verified one by one in enqueue order and
/// every outcome is handed to `on_done`.
pub struct VerifyQueue {
    pending: Arc<Pending>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl VerifyQueue {
    pub fn new<E, S, F>(
        verifier: BlockVerifier<E, S>,
        max_items: usize,
        mut on_done: F,
    ) -> io::Result<Self>
    where
        E: ExecutionEngine + 'static,
        S: StateStorage + 'static,
        F: FnMut(H256, Result<H256, Error>) + Send + 'static,
    {
        let pending = Arc::new(Pending {
            requests: Mutex::new(Some(VecDeque::new())),
            cvar: Condvar::new(),
            max_items,
        });

        let worker = pending.clone();
        let handle = thread::Builder::new()
            .name("block-verifier".to_string())
            .spawn(move || {
                while let Some(request) = worker.wait_for_request() {
                    let result =
                        verifier.verify(&request.block, &request.parent, &request.chain_top);
                    on_done(request.block.hash(), result);
                }
            })?;

        Ok(VerifyQueue {
            pending,
            thread_handle: Some(handle),
        })
    }

    /// Queue block for verification. Returns false if queue is full or ended.
    pub fn enqueue(&self, request: VerifyRequest) -> bool {
        let mut requests = self.pending.requests.lock();
        match requests.as_mut() {
            Some(requests) if requests.len() < self.pending.max_items => {
                requests.push_back(request);
                self.pending.cvar.notify_one();
                true
            }
            _ => false,
        }
    }

    /// Blocks waiting, not counting the one being verified.
    pub fn len(&self) -> usize {
        self.pending
            .requests
            .lock()
            .as_ref()
            .map(|r| r.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop the worker. Block currently in verification is finished, queued ones are abandoned.
    pub fn end(&mut self) {
        *self.pending.requests.lock() = None;
        self.pending.cvar.notify_all();
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                log::error!("Block verifier thread panicked");
            }
        }
    }
}

impl Drop for VerifyQueue {
    fn drop(&mut self) {
        self.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_engine::{build_block, transfer, Fixture};
    use keel_core::{BlockHead, Slot};
    use std::{sync::mpsc, time::Duration};

    fn request(producer: &Fixture, number_offset: u64) -> VerifyRequest {
        let now = Slot::now();
        let parent = Block::new(BlockHead {
            number: 0,
            time: now - 1,
            ..Default::default()
        });
        let mut block = build_block(producer, vec![transfer("alice", "bob", 1)]);
        block.head.parent_hash = parent.hash();
        block.head.number += number_offset;
        block.head.time = now;
        let parent = Arc::new(parent);
        VerifyRequest {
            block: Arc::new(block),
            parent: parent.clone(),
            chain_top: parent,
        }
    }

    #[test]
    fn verifies_in_order() {
        let (tx, rx) = mpsc::channel();
        let (producer, replica) = (Fixture::funded(), Fixture::funded());
        let mut queue = VerifyQueue::new(
            BlockVerifier::new(replica.engine, replica.state),
            10,
            move |hash, result| {
                tx.send((hash, result.is_ok())).expect("Expect to work for testing");
            },
        )
        .unwrap();

        let good = request(&producer, 0);
        let bad = request(&producer, 1);
        let (good_hash, bad_hash) = (good.block.hash(), bad.block.hash());
        assert!(queue.enqueue(good));
        assert!(queue.enqueue(bad));

        let first = rx.recv_timeout(Duration::from_secs(3)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(3)).unwrap();
        assert_eq!(first, (good_hash, true));
        assert_eq!(second, (bad_hash, false));
        queue.end();
    }

    #[test]
    fn rejects_after_end() {
        let replica = Fixture::funded();
        let mut queue = VerifyQueue::new(
            BlockVerifier::new(replica.engine, replica.state),
            1,
            |_, _| {},
        )
        .unwrap();
        queue.end();
        assert!(!queue.enqueue(request(&Fixture::funded(), 0)));
        assert!(queue.is_empty());
    }
}
