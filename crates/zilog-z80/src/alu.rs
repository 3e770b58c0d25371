//! ALU operations for the Z80.
//!
//! Each function computes a result and sets every flag the instruction
//! defines. Flags an instruction leaves alone are not touched.

use emu_core::bits::{carried_out_of, high};

use crate::flags::Flags;
use crate::instruction::{AluOp, Shift};

/// 8-bit add with optional carry.
pub(crate) fn add8(f: &mut Flags, a: u8, b: u8, carry: bool) -> u8 {
    let result = a.wrapping_add(b).wrapping_add(u8::from(carry));
    f.handle_carry(a, b, carry);
    f.handle_half_carry(a, b, carry);
    f.handle_overflow(a, b, carry);
    f.handle_szxy(result);
    f.subtract = false;
    result
}

/// 8-bit subtract with optional borrow.
pub(crate) fn sub8(f: &mut Flags, a: u8, b: u8, borrow: bool) -> u8 {
    let result = a.wrapping_sub(b).wrapping_sub(u8::from(borrow));
    f.handle_borrow(a, b, borrow);
    f.handle_half_borrow(a, b, borrow);
    f.handle_sub_overflow(a, b, borrow);
    f.handle_szxy(result);
    f.subtract = true;
    result
}

fn logic(f: &mut Flags, result: u8, half_carry: bool) -> u8 {
    f.handle_szxyp(result);
    f.half_carry = half_carry;
    f.subtract = false;
    f.carry = false;
    result
}

/// One accumulator operation. Returns the new accumulator (unchanged for CP).
pub(crate) fn accumulate(f: &mut Flags, op: AluOp, a: u8, b: u8) -> u8 {
    let carry = f.carry;
    match op {
        AluOp::Add => add8(f, a, b, false),
        AluOp::Adc => add8(f, a, b, carry),
        AluOp::Sub => sub8(f, a, b, false),
        AluOp::Sbc => sub8(f, a, b, carry),
        AluOp::And => logic(f, a & b, true),
        AluOp::Xor => logic(f, a ^ b, false),
        AluOp::Or => logic(f, a | b, false),
        AluOp::Cp => {
            sub8(f, a, b, false);
            // CP takes the undocumented bits from the operand
            f.handle_xy(b);
            a
        }
    }
}

/// INC r: carry is preserved.
pub(crate) fn inc8(f: &mut Flags, value: u8) -> u8 {
    let result = value.wrapping_add(1);
    f.handle_half_carry(value, 1, false);
    f.parity_overflow = value == 0x7F;
    f.handle_szxy(result);
    f.subtract = false;
    result
}

/// DEC r: carry is preserved.
pub(crate) fn dec8(f: &mut Flags, value: u8) -> u8 {
    let result = value.wrapping_sub(1);
    f.handle_half_borrow(value, 1, false);
    f.parity_overflow = value == 0x80;
    f.handle_szxy(result);
    f.subtract = true;
    result
}

/// ADD HL/IX/IY,rr: S, Z and P/V are preserved.
pub(crate) fn add16(f: &mut Flags, a: u16, b: u16) -> u16 {
    let result = a.wrapping_add(b);
    f.half_carry = carried_out_of(11, a, b, false);
    f.carry = carried_out_of(15, a, b, false);
    f.handle_xy(high(result));
    f.subtract = false;
    result
}

/// ADC HL,rr.
pub(crate) fn adc16(f: &mut Flags, a: u16, b: u16) -> u16 {
    let carry = f.carry;
    let result = a.wrapping_add(b).wrapping_add(u16::from(carry));
    f.half_carry = carried_out_of(11, a, b, carry);
    f.carry = carried_out_of(15, a, b, carry);
    f.parity_overflow = (a ^ b) & 0x8000 == 0 && (a ^ result) & 0x8000 != 0;
    f.sign = result & 0x8000 != 0;
    f.zero = result == 0;
    f.handle_xy(high(result));
    f.subtract = false;
    result
}

/// SBC HL,rr.
pub(crate) fn sbc16(f: &mut Flags, a: u16, b: u16) -> u16 {
    let borrow = f.carry;
    let result = a.wrapping_sub(b).wrapping_sub(u16::from(borrow));
    f.half_carry = (a & 0x0FFF) < (b & 0x0FFF) + u16::from(borrow);
    f.carry = u32::from(a) < u32::from(b) + u32::from(borrow);
    f.parity_overflow = (a ^ b) & 0x8000 != 0 && (a ^ result) & 0x8000 != 0;
    f.sign = result & 0x8000 != 0;
    f.zero = result == 0;
    f.handle_xy(high(result));
    f.subtract = true;
    result
}

/// CB-table rotate or shift.
pub(crate) fn shift(f: &mut Flags, op: Shift, value: u8) -> u8 {
    let carry_in = u8::from(f.carry);
    let (result, carry) = match op {
        Shift::Rlc => (value.rotate_left(1), value & 0x80 != 0),
        Shift::Rrc => (value.rotate_right(1), value & 0x01 != 0),
        Shift::Rl => ((value << 1) | carry_in, value & 0x80 != 0),
        Shift::Rr => ((value >> 1) | (carry_in << 7), value & 0x01 != 0),
        Shift::Sla => (value << 1, value & 0x80 != 0),
        Shift::Sra => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
        Shift::Sll => ((value << 1) | 0x01, value & 0x80 != 0),
        Shift::Srl => (value >> 1, value & 0x01 != 0),
    };
    f.handle_szxyp(result);
    f.half_carry = false;
    f.subtract = false;
    f.carry = carry;
    result
}

/// RLCA, RRCA, RLA and RRA: like the CB forms but S, Z and P/V are kept.
pub(crate) fn rotate_accumulator(f: &mut Flags, op: Shift, a: u8) -> u8 {
    let (sign, zero, parity) = (f.sign, f.zero, f.parity_overflow);
    let result = shift(f, op, a);
    f.sign = sign;
    f.zero = zero;
    f.parity_overflow = parity;
    result
}

/// BIT b: Z and P/V report the tested bit; carry is preserved.
///
/// `xy_source` supplies the undocumented bits: the operand for register
/// forms, the high byte of the effective address for memory forms.
pub(crate) fn bit(f: &mut Flags, bit: u8, value: u8, xy_source: u8) {
    let set = value & (1 << bit) != 0;
    f.zero = !set;
    f.parity_overflow = !set;
    f.sign = bit == 7 && set;
    f.half_carry = true;
    f.subtract = false;
    f.handle_xy(xy_source);
}

/// Decimal adjust after an add or subtract.
pub(crate) fn daa(f: &mut Flags, a: u8) -> u8 {
    let low_nibble = a & 0x0F;
    let mut correction = 0;
    let mut carry = f.carry;

    if f.half_carry || low_nibble > 9 {
        correction |= 0x06;
    }
    if carry || a > 0x99 {
        correction |= 0x60;
        carry = true;
    }

    let result = if f.subtract {
        f.half_carry = f.half_carry && low_nibble < 6;
        a.wrapping_sub(correction)
    } else {
        f.half_carry = low_nibble > 9;
        a.wrapping_add(correction)
    };
    f.handle_szxyp(result);
    f.carry = carry;
    result
}

#[cfg(test)]
mod tests {
    use emu_core::FlagRegister;

    use super::*;
    use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF};

    fn flags() -> Flags {
        Flags::default()
    }

    #[test]
    fn add_sets_overflow_not_parity() {
        let mut f = flags();
        assert_eq!(add8(&mut f, 0x7F, 0x01, false), 0x80);
        assert_eq!(f.to_byte(), SF | HF | PF);
    }

    #[test]
    fn adc_carry_in_wraps_to_zero() {
        let mut f = flags();
        assert_eq!(add8(&mut f, 0xFF, 0x00, true), 0x00);
        assert_eq!(f.to_byte(), ZF | HF | CF);
    }

    #[test]
    fn sub_borrows_and_sets_n() {
        let mut f = flags();
        assert_eq!(sub8(&mut f, 0x00, 0x01, false), 0xFF);
        assert_eq!(f.to_byte(), SF | YF | HF | XF | NF | CF);
    }

    #[test]
    fn cp_copies_undocumented_bits_from_operand() {
        let mut f = flags();
        assert_eq!(accumulate(&mut f, AluOp::Cp, 0x40, 0x28), 0x40);
        assert!(f.y && f.x);
        assert!(!f.zero && !f.carry && f.subtract);
    }

    #[test]
    fn and_sets_half_carry_and_parity() {
        let mut f = flags();
        f.carry = true;
        assert_eq!(accumulate(&mut f, AluOp::And, 0xF0, 0x30), 0x30);
        assert_eq!(f.to_byte(), YF | HF | PF);
    }

    #[test]
    fn inc_and_dec_report_signed_edges() {
        let mut f = flags();
        f.carry = true;
        assert_eq!(inc8(&mut f, 0x7F), 0x80);
        assert!(f.parity_overflow && f.half_carry && f.sign && f.carry);
        assert_eq!(dec8(&mut f, 0x80), 0x7F);
        assert!(f.parity_overflow && f.half_carry && f.subtract && f.carry);
    }

    #[test]
    fn add16_carries_from_bit_11() {
        let mut f = Flags::from_byte(SF | ZF | PF);
        assert_eq!(add16(&mut f, 0x0FFF, 0x0001), 0x1000);
        assert!(f.half_carry && !f.carry);
        assert!(f.sign && f.zero && f.parity_overflow);
    }

    #[test]
    fn sbc16_sets_zero_and_overflow() {
        let mut f = flags();
        f.carry = true;
        assert_eq!(sbc16(&mut f, 0x8000, 0x0000), 0x7FFF);
        assert!(f.parity_overflow && !f.zero && !f.carry);
        f.carry = false;
        assert_eq!(sbc16(&mut f, 0x1234, 0x1234), 0);
        assert!(f.zero && f.subtract);
    }

    #[test]
    fn adc16_sets_sign_from_bit_15() {
        let mut f = flags();
        assert_eq!(adc16(&mut f, 0x7FFF, 0x0001), 0x8000);
        assert!(f.sign && f.parity_overflow && f.half_carry && !f.carry);
    }

    #[test]
    fn shifts_move_the_right_bit_into_carry() {
        let mut f = flags();
        assert_eq!(shift(&mut f, Shift::Sra, 0x81), 0xC0);
        assert!(f.carry);
        assert_eq!(shift(&mut f, Shift::Rr, 0x00), 0x80);
        assert!(!f.carry);
        assert_eq!(shift(&mut f, Shift::Sll, 0x80), 0x01);
        assert!(f.carry);
        assert_eq!(shift(&mut f, Shift::Srl, 0x01), 0x00);
        assert!(f.zero && f.carry);
    }

    #[test]
    fn accumulator_rotates_keep_sign_zero_and_parity() {
        let mut f = Flags::from_byte(ZF | PF);
        assert_eq!(rotate_accumulator(&mut f, Shift::Rlc, 0x81), 0x03);
        assert_eq!(f.to_byte(), ZF | PF | CF);
    }

    #[test]
    fn bit_test_of_bit_7() {
        let mut f = flags();
        bit(&mut f, 7, 0x80, 0x80);
        assert!(f.sign && !f.zero && f.half_carry);
        bit(&mut f, 0, 0x80, 0x00);
        assert!(f.zero && f.parity_overflow && !f.sign);
    }

    #[test]
    fn daa_after_add_and_subtract() {
        // 0x15 + 0x27 = 0x3C -> 0x42
        let mut f = flags();
        let sum = add8(&mut f, 0x15, 0x27, false);
        assert_eq!(daa(&mut f, sum), 0x42);
        assert!(!f.carry);

        // 0x42 - 0x15 = 0x2D -> 0x27
        let difference = sub8(&mut f, 0x42, 0x15, false);
        assert_eq!(daa(&mut f, difference), 0x27);
        assert!(f.subtract && !f.carry);
    }
}
