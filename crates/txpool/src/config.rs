// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use std::{fs, path::Path, time::Duration};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pending transactions kept before new arrivals are rejected.
    pub max: usize,
    /// Period of expiry sweeps.
    pub housekeeping_interval_ms: u64,
    /// How many blocks back from head are searched for included transactions
    /// and for fork points.
    pub chain_lookback: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            max: 10000,
            housekeeping_interval_ms: 30_000,
            chain_lookback: 1200,
        }
    }
}

impl Config {
    pub fn from_toml_str(raw: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Config> {
        let raw = fs::read_to_string(path)?;
        Ok(Config::from_toml_str(&raw)?)
    }

    pub fn housekeeping_interval(&self) -> Duration {
        Duration::from_millis(self.housekeeping_interval_ms.max(1))
    }
}
