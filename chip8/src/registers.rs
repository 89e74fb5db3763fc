use std::ops::{Index, IndexMut};

use crate::REGISTER_COUNT;

/// Index of the register that doubles as the carry/borrow/collision flag
pub const FLAG: u8 = 0xF;

/// V0 through VF. Indexing only looks at the low nibble, so every decoded
/// register operand is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers([u8; REGISTER_COUNT]);

impl Index<u8> for Registers {
    type Output = u8;

    fn index(&self, register: u8) -> &Self::Output {
        &self.0[(register & 0xF) as usize]
    }
}

impl IndexMut<u8> for Registers {
    fn index_mut(&mut self, register: u8) -> &mut Self::Output {
        &mut self.0[(register & 0xF) as usize]
    }
}

impl Registers {
    pub fn new() -> Self {
        Self([0; REGISTER_COUNT])
    }

    pub fn flag(&self) -> u8 {
        self.0[FLAG as usize]
    }

    pub fn set_flag(&mut self, value: bool) {
        self.0[FLAG as usize] = value as u8;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0
    }
}
