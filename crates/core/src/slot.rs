// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    ops::{Add, Sub},
    time::{SystemTime, UNIX_EPOCH},
};

/// Length of one consensus round in nanoseconds.
pub const SLOT_DURATION: i64 = 3_000_000_000;

/// Index of a consensus round. Block times are expressed in slots so that
/// nodes with slightly skewed clocks still agree on ordering.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Slot(pub i64);

/// Wall-clock instant in unix nanoseconds.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Timestamp {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i64)
            .unwrap_or_default();
        Timestamp(nanos)
    }

    /// Slot that contains this instant.
    pub fn slot(self) -> Slot {
        Slot(self.0.div_euclid(SLOT_DURATION))
    }
}

impl Slot {
    pub fn now() -> Slot {
        Timestamp::now().slot()
    }

    /// First nanosecond of the slot.
    pub fn start(self) -> Timestamp {
        Timestamp(self.0.saturating_mul(SLOT_DURATION))
    }
}

impl Add<i64> for Slot {
    type Output = Slot;

    fn add(self, rhs: i64) -> Slot {
        Slot(self.0.saturating_add(rhs))
    }
}

impl Sub<i64> for Slot {
    type Output = Slot;

    fn sub(self, rhs: i64) -> Slot {
        Slot(self.0.saturating_sub(rhs))
    }
}

impl Add<i64> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: i64) -> Timestamp {
        Timestamp(self.0.saturating_add(rhs))
    }
}

impl Sub<i64> for Timestamp {
    type Output = Timestamp;

    fn sub(self, rhs: i64) -> Timestamp {
        Timestamp(self.0.saturating_sub(rhs))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}

// rlp has no signed integers, the two's complement bit pattern is encoded as u64.
impl Encodable for Slot {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.append(&(self.0 as u64));
    }
}

impl Decodable for Slot {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        Ok(Slot(rlp.as_val::<u64>()? as i64))
    }
}

impl Encodable for Timestamp {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.append(&(self.0 as u64));
    }
}

impl Decodable for Timestamp {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        Ok(Timestamp(rlp.as_val::<u64>()? as i64))
    }
}
