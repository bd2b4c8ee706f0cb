// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Permission used when the requested one is not defined on account.
pub const ACTIVE_PERMISSION: &str = "active";
pub const OWNER_PERMISSION: &str = "owner";

/// One weighted entry of a permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    /// Satisfied when key pair `id` signed the transaction.
    KeyPair { id: String, weight: u64 },
    /// Satisfied when `permission` of `account` is satisfied.
    Delegate {
        account: String,
        permission: String,
        weight: u64,
    },
}

impl Item {
    pub fn key(id: &str, weight: u64) -> Item {
        Item::KeyPair {
            id: id.to_string(),
            weight,
        }
    }

    pub fn delegate(account: &str, permission: &str, weight: u64) -> Item {
        Item::Delegate {
            account: account.to_string(),
            permission: permission.to_string(),
            weight,
        }
    }

    pub fn weight(&self) -> u64 {
        match self {
            Item::KeyPair { weight, .. } => *weight,
            Item::Delegate { weight, .. } => *weight,
        }
    }
}

/// Named list of items that is merged into permission users on resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub users: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub threshold: u64,
    #[serde(default)]
    pub users: Vec<Item>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl Permission {
    pub fn new(threshold: u64, users: Vec<Item>) -> Permission {
        Permission {
            threshold,
            users,
            groups: Vec::new(),
        }
    }

    /// users followed by members of every group, in declaration order.
    pub fn flatten(&self) -> impl Iterator<Item = &Item> {
        self.users
            .iter()
            .chain(self.groups.iter().flat_map(|g| g.users.iter()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub permissions: BTreeMap<String, Permission>,
}

impl Account {
    pub fn new(id: &str) -> Account {
        Account {
            id: id.to_string(),
            permissions: BTreeMap::new(),
        }
    }

    /// Account as created at registration: `owner` and `active` permissions
    /// each satisfied by a single key.
    pub fn new_init(id: &str, owner_key: &str, active_key: &str) -> Account {
        Account::new(id)
            .with_permission(
                OWNER_PERMISSION,
                Permission::new(1, vec![Item::key(owner_key, 1)]),
            )
            .with_permission(
                ACTIVE_PERMISSION,
                Permission::new(1, vec![Item::key(active_key, 1)]),
            )
    }

    pub fn with_permission(mut self, name: &str, permission: Permission) -> Account {
        self.permissions.insert(name.to_string(), permission);
        self
    }

    /// Named permission, falling back to `active` when it is not defined.
    /// Returned name is the one that was found.
    pub fn permission_or_active(&self, name: &str) -> Option<(&str, &Permission)> {
        self.permissions
            .get_key_value(name)
            .or_else(|| self.permissions.get_key_value(ACTIVE_PERMISSION))
            .map(|(name, perm)| (name.as_str(), perm))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &[u8]) -> serde_json::Result<Account> {
        serde_json::from_slice(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_active() {
        let acc = Account::new_init("alice", "okey", "akey");
        let (name, perm) = acc.permission_or_active("transfer").unwrap();
        assert_eq!(name, ACTIVE_PERMISSION);
        assert_eq!(perm.users, vec![Item::key("akey", 1)]);
        let (name, perm) = acc.permission_or_active(OWNER_PERMISSION).unwrap();
        assert_eq!(name, OWNER_PERMISSION);
        assert_eq!(perm.users, vec![Item::key("okey", 1)]);
        assert!(Account::new("empty").permission_or_active("x").is_none());
    }

    #[test]
    fn flatten_appends_groups() {
        let mut perm = Permission::new(3, vec![Item::key("a", 1)]);
        perm.groups.push(Group {
            name: "ops".to_string(),
            users: vec![Item::key("b", 1), Item::delegate("bob", "active", 1)],
        });
        let weights: Vec<u64> = perm.flatten().map(|i| i.weight()).collect();
        assert_eq!(weights, vec![1, 1, 1]);
        assert_eq!(perm.flatten().nth(2), Some(&Item::delegate("bob", "active", 1)));
    }

    #[test]
    fn json_round_trip() {
        let acc = Account::new_init("alice", "okey", "akey").with_permission(
            "vote",
            Permission::new(2, vec![Item::delegate("bob", "active", 2)]),
        );
        let json = acc.to_json().unwrap();
        assert_eq!(Account::from_json(json.as_bytes()).unwrap(), acc);
        assert!(Account::from_json(b"{\"id\": 3}").is_err());
    }
}
