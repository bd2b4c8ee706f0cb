// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

pub mod authority;
pub mod error;

pub use authority::{Authority, MAX_AUTH_DEPTH};
pub use error::Error;
