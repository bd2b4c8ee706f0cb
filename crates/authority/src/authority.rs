// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use crate::Error;
use interfaces::{StateReader, AUTH_TABLE};
use keel_core::{Account, Cost, Item};
use log::*;
use std::collections::HashSet;

/// Deepest delegation chain that is followed. Deeper items count as unsatisfied.
pub const MAX_AUTH_DEPTH: usize = 8;

/// Resolves weighted threshold permissions with delegation to other accounts.
/// Only reads state, every read is metered into returned cost.
pub struct Authority<S> {
    state: S,
}

impl<S: StateReader> Authority<S> {
    pub fn new(state: S) -> Self {
        Authority { state }
    }

    /// Read and decode account `id`. Missing account is `None` and still costs a read.
    pub fn read_auth(&self, id: &str) -> Result<(Option<Account>, Cost), Error> {
        let mut cost = Cost::default();
        let account = self.read(id, &mut cost)?;
        Ok((account, cost))
    }

    /// Check that `signers` satisfy `permission` of account `id`. Unknown
    /// permission falls back to `active`.
    ///
    /// Returns cost of all reads done, also when authorization fails. Work
    /// stops as soon as threshold is reached so items after that are not paid for.
    pub fn require_auth(
        &self,
        id: &str,
        permission: &str,
        signers: &HashSet<String>,
    ) -> Result<(bool, Cost), Error> {
        let mut cost = Cost::default();
        let mut path = Vec::new();
        let ok = self.resolve(id, permission, signers, &mut path, &mut cost)?;
        Ok((ok, cost))
    }

    fn read(&self, id: &str, cost: &mut Cost) -> Result<Option<Account>, Error> {
        let raw = match self.state.get(AUTH_TABLE, id) {
            Some(raw) => raw,
            None => {
                *cost += Cost::read(0);
                return Ok(None);
            }
        };
        *cost += Cost::read(raw.len());
        match Account::from_json(&raw) {
            Ok(account) => Ok(Some(account)),
            Err(source) => {
                error!("Account {} has corrupt record: {}", id, source);
                Err(Error::CorruptAccount {
                    id: id.to_string(),
                    cost: *cost,
                    source,
                })
            }
        }
    }

    // `path` holds (account, permission) pairs currently being resolved. Revisiting
    // one of them or going deeper than MAX_AUTH_DEPTH is a plain denial.
    fn resolve(
        &self,
        id: &str,
        permission: &str,
        signers: &HashSet<String>,
        path: &mut Vec<(String, String)>,
        cost: &mut Cost,
    ) -> Result<bool, Error> {
        if path.len() > MAX_AUTH_DEPTH {
            debug!("Delegation of {}@{} is too deep", permission, id);
            return Ok(false);
        }
        if path.iter().any(|(a, p)| a == id && p == permission) {
            debug!("Delegation cycle on {}@{}", permission, id);
            return Ok(false);
        }

        let account = match self.read(id, cost)? {
            Some(account) => account,
            None => return Ok(false),
        };
        let (resolved, perm) = match account.permission_or_active(permission) {
            Some(found) => found,
            None => return Ok(false),
        };
        // fallback to active may land on a permission already being resolved
        if resolved != permission && path.iter().any(|(a, p)| a == id && p == resolved) {
            debug!("Delegation cycle on {}@{} via {}", resolved, id, permission);
            return Ok(false);
        }

        path.push((id.to_string(), resolved.to_string()));
        let mut weight: u64 = 0;
        let mut granted = false;
        for item in perm.flatten() {
            let satisfied = match item {
                Item::KeyPair { id, .. } => signers.contains(id),
                Item::Delegate {
                    account,
                    permission,
                    ..
                } => self.resolve(account, permission, signers, path, cost)?,
            };
            if satisfied {
                weight = weight.saturating_add(item.weight());
                if weight >= perm.threshold {
                    granted = true;
                    break;
                }
            }
        }
        path.pop();

        Ok(granted || weight >= perm.threshold)
    }
}
