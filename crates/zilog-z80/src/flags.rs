//! Z80 flag register.
//!
//! Byte layout: `S Z Y H X P/V N C`. Y and X are the undocumented copies of
//! result bits 5 and 3; every bit is modelled, so any byte round-trips.

use emu_core::FlagRegister;
use emu_core::bits::{add_overflows, borrowed_into, carried_out_of, parity, sub_overflows};

/// Sign flag (bit 7) - set if result is negative.
pub const SF: u8 = 0b1000_0000;

/// Zero flag (bit 6) - set if result is zero.
pub const ZF: u8 = 0b0100_0000;

/// Undocumented flag (bit 5) - copy of bit 5 of result.
pub const YF: u8 = 0b0010_0000;

/// Half-carry flag (bit 4) - carry from bit 3 to bit 4.
pub const HF: u8 = 0b0001_0000;

/// Undocumented flag (bit 3) - copy of bit 3 of result.
pub const XF: u8 = 0b0000_1000;

/// Parity/Overflow flag (bit 2) - parity or overflow depending on instruction.
pub const PF: u8 = 0b0000_0100;

/// Add/Subtract flag (bit 1) - set if last operation was subtraction.
pub const NF: u8 = 0b0000_0010;

/// Carry flag (bit 0) - carry out of bit 7.
pub const CF: u8 = 0b0000_0001;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Flags {
    pub sign: bool,
    pub zero: bool,
    pub y: bool,
    pub half_carry: bool,
    pub x: bool,
    pub parity_overflow: bool,
    pub subtract: bool,
    pub carry: bool,
}

impl Flags {
    /// Carry out of bit 7 for `previous + value + carry`.
    pub fn handle_carry(&mut self, previous: u8, value: u8, carry: bool) {
        self.carry = carried_out_of(7, u16::from(previous), u16::from(value), carry);
    }

    /// Borrow into bit 7 for `previous - value - borrow`.
    pub fn handle_borrow(&mut self, previous: u8, value: u8, borrow: bool) {
        self.carry = borrowed_into(7, u16::from(previous), u16::from(value), borrow);
    }

    /// Carry out of bit 3 for `previous + value + carry`.
    pub fn handle_half_carry(&mut self, previous: u8, value: u8, carry: bool) {
        self.half_carry = carried_out_of(3, u16::from(previous), u16::from(value), carry);
    }

    /// Borrow into bit 3 for `previous - value - borrow`.
    pub fn handle_half_borrow(&mut self, previous: u8, value: u8, borrow: bool) {
        self.half_carry = borrowed_into(3, u16::from(previous), u16::from(value), borrow);
    }

    /// Signed overflow of `previous + value + carry`.
    pub fn handle_overflow(&mut self, previous: u8, value: u8, carry: bool) {
        let result = previous.wrapping_add(value).wrapping_add(u8::from(carry));
        self.parity_overflow = add_overflows(previous, value, result);
    }

    /// Signed overflow of `previous - value - borrow`.
    pub fn handle_sub_overflow(&mut self, previous: u8, value: u8, borrow: bool) {
        let result = previous.wrapping_sub(value).wrapping_sub(u8::from(borrow));
        self.parity_overflow = sub_overflows(previous, value, result);
    }

    pub fn handle_zero(&mut self, value: u8) {
        self.zero = value == 0;
    }

    pub fn handle_sign(&mut self, value: u8) {
        self.sign = value & 0x80 != 0;
    }

    pub fn handle_parity(&mut self, value: u8) {
        self.parity_overflow = parity(value);
    }

    /// Copy bits 5 and 3 of `value` into the undocumented flags.
    pub fn handle_xy(&mut self, value: u8) {
        self.y = value & YF != 0;
        self.x = value & XF != 0;
    }

    /// Sign, zero and the undocumented bits from a result.
    pub fn handle_szxy(&mut self, value: u8) {
        self.handle_sign(value);
        self.handle_zero(value);
        self.handle_xy(value);
    }

    /// Sign, zero, undocumented bits and parity from a result.
    pub fn handle_szxyp(&mut self, value: u8) {
        self.handle_szxy(value);
        self.handle_parity(value);
    }
}

impl FlagRegister for Flags {
    fn to_byte(&self) -> u8 {
        [
            (self.sign, SF),
            (self.zero, ZF),
            (self.y, YF),
            (self.half_carry, HF),
            (self.x, XF),
            (self.parity_overflow, PF),
            (self.subtract, NF),
            (self.carry, CF),
        ]
        .into_iter()
        .filter(|&(set, _)| set)
        .fold(0, |f, (_, bit)| f | bit)
    }

    fn from_byte(value: u8) -> Self {
        Self {
            sign: value & SF != 0,
            zero: value & ZF != 0,
            y: value & YF != 0,
            half_carry: value & HF != 0,
            x: value & XF != 0,
            parity_overflow: value & PF != 0,
            subtract: value & NF != 0,
            carry: value & CF != 0,
        }
    }
}
