//! LR35902 condition flags.
//!
//! Byte layout: `Z N H C 0 0 0 0`. The low nibble always reads as 0, which
//! is visible through `PUSH AF` / `POP AF`.

use emu_core::FlagRegister;
use emu_core::bits::{borrowed_into, carried_out_of};

/// Zero flag (bit 7).
pub const ZF: u8 = 0b1000_0000;

/// Subtract flag (bit 6), used by DAA.
pub const NF: u8 = 0b0100_0000;

/// Half carry (bit 5) - carry out of bit 3.
pub const HF: u8 = 0b0010_0000;

/// Carry flag (bit 4).
pub const CF: u8 = 0b0001_0000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Flags {
    pub zero: bool,
    pub subtract: bool,
    pub half_carry: bool,
    pub carry: bool,
}

impl Flags {
    pub fn handle_carry(&mut self, previous: u8, value: u8, carry: bool) {
        self.carry = carried_out_of(7, u16::from(previous), u16::from(value), carry);
    }

    pub fn handle_borrow(&mut self, previous: u8, value: u8, borrow: bool) {
        self.carry = borrowed_into(7, u16::from(previous), u16::from(value), borrow);
    }

    pub fn handle_half_carry(&mut self, previous: u8, value: u8, carry: bool) {
        self.half_carry = carried_out_of(3, u16::from(previous), u16::from(value), carry);
    }

    pub fn handle_half_borrow(&mut self, previous: u8, value: u8, borrow: bool) {
        self.half_carry = borrowed_into(3, u16::from(previous), u16::from(value), borrow);
    }

    pub fn handle_zero(&mut self, value: u8) {
        self.zero = value == 0;
    }
}

impl FlagRegister for Flags {
    fn to_byte(&self) -> u8 {
        let mut f = 0;
        if self.zero {
            f |= ZF;
        }
        if self.subtract {
            f |= NF;
        }
        if self.half_carry {
            f |= HF;
        }
        if self.carry {
            f |= CF;
        }
        f
    }

    fn from_byte(value: u8) -> Self {
        Self {
            zero: value & ZF != 0,
            subtract: value & NF != 0,
            half_carry: value & HF != 0,
            carry: value & CF != 0,
        }
    }
}
