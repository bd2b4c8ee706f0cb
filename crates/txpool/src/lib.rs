// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

pub mod config;
pub mod error;
pub mod pool;

pub use config::*;
pub use error::*;
pub use pool::*;
