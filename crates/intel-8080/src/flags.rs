//! 8080 condition flags.
//!
//! Byte layout (PSW low byte): `S Z 0 AC 0 P 1 C`. Bits 5 and 3 always read
//! as 0, bit 1 always reads as 1.

use emu_core::FlagRegister;
use emu_core::bits::{borrowed_into, carried_out_of, parity};

/// Sign flag (bit 7) - bit 7 of the result.
pub const SF: u8 = 0b1000_0000;

/// Zero flag (bit 6).
pub const ZF: u8 = 0b0100_0000;

/// Auxiliary carry (bit 4) - carry out of bit 3.
pub const AF: u8 = 0b0001_0000;

/// Parity flag (bit 2) - set on even parity.
pub const PF: u8 = 0b0000_0100;

/// Hard-wired to 1.
pub const ONE: u8 = 0b0000_0010;

/// Carry flag (bit 0).
pub const CF: u8 = 0b0000_0001;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Flags {
    pub sign: bool,
    pub zero: bool,
    pub aux_carry: bool,
    pub parity: bool,
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
    pub fn handle_aux_carry(&mut self, previous: u8, value: u8, carry: bool) {
        self.aux_carry = carried_out_of(3, u16::from(previous), u16::from(value), carry);
    }

    /// The 8080 subtracts by adding the complement, so AC is the carry out
    /// of bit 3 of `previous + !value + !borrow`: set when no borrow occurs.
    pub fn handle_aux_borrow(&mut self, previous: u8, value: u8, borrow: bool) {
        self.aux_carry = !borrowed_into(3, u16::from(previous), u16::from(value), borrow);
    }

    pub fn handle_zero(&mut self, value: u8) {
        self.zero = value == 0;
    }

    pub fn handle_sign(&mut self, value: u8) {
        self.sign = value & 0x80 != 0;
    }

    pub fn handle_parity(&mut self, value: u8) {
        self.parity = parity(value);
    }

    /// Zero, sign and parity from a result.
    pub fn handle_zsp(&mut self, value: u8) {
        self.handle_zero(value);
        self.handle_sign(value);
        self.handle_parity(value);
    }
}

impl FlagRegister for Flags {
    fn to_byte(&self) -> u8 {
        let mut f = ONE;
        if self.sign {
            f |= SF;
        }
        if self.zero {
            f |= ZF;
        }
        if self.aux_carry {
            f |= AF;
        }
        if self.parity {
            f |= PF;
        }
        if self.carry {
            f |= CF;
        }
        f
    }

    fn from_byte(value: u8) -> Self {
        Self {
            sign: value & SF != 0,
            zero: value & ZF != 0,
            aux_carry: value & AF != 0,
            parity: value & PF != 0,
            carry: value & CF != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_layout_forces_fixed_bits() {
        assert_eq!(Flags::default().to_byte(), 0x02);
        assert_eq!(Flags::from_byte(0xFF).to_byte(), 0xD7);
        assert_eq!(Flags::from_byte(0x00).to_byte(), 0x02);
    }

    #[test]
    fn every_byte_round_trips_through_the_layout() {
        for byte in 0..=255u8 {
            let flags = Flags::from_byte(byte);
            assert_eq!(flags.to_byte(), (byte & 0xD5) | ONE, "byte {byte:#04x}");
            assert_eq!(Flags::from_byte(flags.to_byte()), flags);
        }
    }

    #[test]
    fn carry_counts_the_incoming_carry() {
        let mut flags = Flags::default();
        flags.handle_carry(0xFF, 0x00, true);
        assert!(flags.carry);
        flags.handle_carry(0xFE, 0x00, true);
        assert!(!flags.carry);
    }

    #[test]
    fn borrow_is_set_when_subtrahend_is_larger() {
        let mut flags = Flags::default();
        flags.handle_borrow(0x01, 0x02, false);
        assert!(flags.carry);
        flags.handle_borrow(0x02, 0x01, true);
        assert!(!flags.carry);
        flags.handle_borrow(0x01, 0x01, true);
        assert!(flags.carry);
    }

    #[test]
    fn aux_borrow_is_inverted_nibble_borrow() {
        let mut flags = Flags::default();
        // 0x3E - 0x3E: no nibble borrow, AC set.
        flags.handle_aux_borrow(0x3E, 0x3E, false);
        assert!(flags.aux_carry);
        // 0x10 - 0x01 borrows from bit 4, AC clear.
        flags.handle_aux_borrow(0x10, 0x01, false);
        assert!(!flags.aux_carry);
    }

    #[test]
    fn handlers_only_touch_their_own_flag() {
        let mut flags = Flags::from_byte(0xFF);
        flags.handle_zero(1);
        assert_eq!(flags.to_byte(), 0xD7 & !ZF);
        flags.handle_parity(0x01);
        assert_eq!(flags.to_byte(), 0xD7 & !ZF & !PF);
    }
}
