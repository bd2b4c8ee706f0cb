// Copyright 2020-2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use auto_impl::auto_impl;

/// Table holding JSON encoded accounts keyed by account id.
pub const AUTH_TABLE: &str = "auth";

/// Point in time read access to versioned state.
#[auto_impl(&, Arc)]
pub trait StateReader: Send + Sync {
    /// Value stored under `key` in `table`, including not yet committed writes.
    fn get(&self, table: &str, key: &str) -> Option<Vec<u8>>;
}

/// Versioned key-value state that transactions execute against.
#[auto_impl(&, Arc)]
pub trait StateStorage: StateReader {
    fn put(&self, table: &str, key: &str, value: Vec<u8>);

    fn del(&self, table: &str, key: &str);

    /// Make pending writes part of the current state.
    fn commit(&self) -> anyhow::Result<()>;

    /// Drop pending writes, current state stays as of last commit.
    fn rollback(&self) -> anyhow::Result<()>;

    /// Create named immutable snapshot of current state.
    fn tag(&self, label: &str) -> anyhow::Result<()>;
}

#[cfg(any(test, feature = "test_only"))]
pub mod helper {
    use super::*;
    use keel_core::Account;
    use parking_lot::RwLock;
    use std::{collections::HashMap, sync::Arc};

    type Table = HashMap<(String, String), Vec<u8>>;

    /// In memory state with pending writes, commits and tags.
    #[derive(Default)]
    pub struct MemoryState {
        committed: RwLock<Table>,
        pending: RwLock<HashMap<(String, String), Option<Vec<u8>>>>,
        tags: RwLock<HashMap<String, Table>>,
    }

    impl MemoryState {
        pub fn new() -> Arc<MemoryState> {
            Arc::new(MemoryState::default())
        }

        /// Store account and commit it right away.
        pub fn set_account(&self, account: &Account) {
            let json = account.to_json().expect("account serializes");
            self.put(AUTH_TABLE, &account.id, json.into_bytes());
            self.commit().expect("memory commit");
        }

        /// Store raw record for account id, used to plant corrupt data.
        pub fn set_raw_account(&self, id: &str, raw: &[u8]) {
            self.put(AUTH_TABLE, id, raw.to_vec());
            self.commit().expect("memory commit");
        }

        pub fn has_tag(&self, label: &str) -> bool {
            self.tags.read().contains_key(label)
        }

        pub fn tagged(&self, label: &str, table: &str, key: &str) -> Option<Vec<u8>> {
            self.tags
                .read()
                .get(label)?
                .get(&(table.to_string(), key.to_string()))
                .cloned()
        }

        pub fn pending_len(&self) -> usize {
            self.pending.read().len()
        }
    }

    impl StateReader for MemoryState {
        fn get(&self, table: &str, key: &str) -> Option<Vec<u8>> {
            let id = (table.to_string(), key.to_string());
            if let Some(value) = self.pending.read().get(&id) {
                return value.clone();
            }
            self.committed.read().get(&id).cloned()
        }
    }

    impl StateStorage for MemoryState {
        fn put(&self, table: &str, key: &str, value: Vec<u8>) {
            self.pending
                .write()
                .insert((table.to_string(), key.to_string()), Some(value));
        }

        fn del(&self, table: &str, key: &str) {
            self.pending
                .write()
                .insert((table.to_string(), key.to_string()), None);
        }

        fn commit(&self) -> anyhow::Result<()> {
            let pending = std::mem::take(&mut *self.pending.write());
            let mut committed = self.committed.write();
            for (id, value) in pending {
                match value {
                    Some(value) => committed.insert(id, value),
                    None => committed.remove(&id),
                };
            }
            Ok(())
        }

        fn rollback(&self) -> anyhow::Result<()> {
            self.pending.write().clear();
            Ok(())
        }

        fn tag(&self, label: &str) -> anyhow::Result<()> {
            let snapshot = self.committed.read().clone();
            self.tags.write().insert(label.to_string(), snapshot);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{helper::MemoryState, *};

    #[test]
    fn pending_writes_visible_before_commit() {
        let state = MemoryState::new();
        state.put("t", "k", vec![1]);
        assert_eq!(state.get("t", "k"), Some(vec![1]));
        assert_eq!(state.pending_len(), 1);
        state.commit().unwrap();
        assert_eq!(state.pending_len(), 0);
        state.del("t", "k");
        assert_eq!(state.get("t", "k"), None);
    }

    #[test]
    fn rollback_drops_pending_writes() {
        let state = MemoryState::new();
        state.put("t", "k", vec![1]);
        state.commit().unwrap();
        state.put("t", "k", vec![2]);
        state.del("t", "other");
        state.rollback().unwrap();
        assert_eq!(state.pending_len(), 0);
        assert_eq!(state.get("t", "k"), Some(vec![1]));
    }

    #[test]
    fn tag_is_immutable_snapshot() {
        let state = MemoryState::new();
        state.put("t", "k", vec![1]);
        state.commit().unwrap();
        state.tag("one").unwrap();
        state.put("t", "k", vec![2]);
        state.commit().unwrap();
        assert!(state.has_tag("one"));
        assert_eq!(state.tagged("one", "t", "k"), Some(vec![1]));
        assert_eq!(state.get("t", "k"), Some(vec![2]));
    }
}
