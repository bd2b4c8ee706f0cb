// Copyright 2021 Gnosis Ltd.
// SPDX-License-Identifier: Apache-2.0

use std::ops::{Add, AddAssign};

/// Gas charged for one unit of cpu work.
pub const CPU_GAS: u64 = 100;

/// Metered work done by host functions. Every state read costs one cpu unit
/// and the size of the value it returned.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cost {
    pub cpu: u64,
    pub data: u64,
}

impl Cost {
    pub fn new(cpu: u64, data: u64) -> Cost {
        Cost { cpu, data }
    }

    /// Cost of one state read that returned `bytes` bytes.
    pub fn read(bytes: usize) -> Cost {
        Cost {
            cpu: 1,
            data: bytes as u64,
        }
    }

    pub fn gas(&self) -> u64 {
        self.cpu.saturating_mul(CPU_GAS).saturating_add(self.data)
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, other: Cost) {
        self.cpu = self.cpu.saturating_add(other.cpu);
        self.data = self.data.saturating_add(other.data);
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(mut self, other: Cost) -> Cost {
        self += other;
        self
    }
}
