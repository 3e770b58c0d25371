//! Z80 register set.

use emu_core::FlagRegister;
use emu_core::bits::{high, low, word};

use crate::flags::Flags;
use crate::instruction::Index;

/// Maskable interrupt response selected by `IM n`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterruptMode {
    /// Execute the instruction the device puts on the bus.
    #[default]
    Zero,
    /// Restart at 0x0038.
    One,
    /// Call through the table entry at `I << 8 | data`.
    Two,
}

impl InterruptMode {
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

/// Z80 registers snapshot for observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registers {
    // Main registers
    pub a: u8,
    pub f: Flags,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,

    // Alternate registers
    pub a_alt: u8,
    pub f_alt: Flags,
    pub b_alt: u8,
    pub c_alt: u8,
    pub d_alt: u8,
    pub e_alt: u8,
    pub h_alt: u8,
    pub l_alt: u8,

    // Index registers
    pub ix: u16,
    pub iy: u16,

    // Other registers
    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    /// Refresh counter. The low seven bits count opcode fetches.
    pub r: u8,

    // Interrupt state
    pub iff1: bool,
    pub iff2: bool,
    pub im: InterruptMode,

    pub halted: bool,
}

impl Registers {
    /// State after /RESET with execution starting at `pc`.
    #[must_use]
    pub fn at_reset(pc: u16) -> Self {
        Self {
            a: 0xFF,
            f: Flags::from_byte(0xFF),
            sp: 0xFFFF,
            pc,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn af(&self) -> u16 {
        word(self.a, self.f.to_byte())
    }

    #[must_use]
    pub const fn bc(&self) -> u16 {
        word(self.b, self.c)
    }

    #[must_use]
    pub const fn de(&self) -> u16 {
        word(self.d, self.e)
    }

    #[must_use]
    pub const fn hl(&self) -> u16 {
        word(self.h, self.l)
    }

    #[must_use]
    pub fn af_alt(&self) -> u16 {
        word(self.a_alt, self.f_alt.to_byte())
    }

    #[must_use]
    pub const fn bc_alt(&self) -> u16 {
        word(self.b_alt, self.c_alt)
    }

    #[must_use]
    pub const fn de_alt(&self) -> u16 {
        word(self.d_alt, self.e_alt)
    }

    #[must_use]
    pub const fn hl_alt(&self) -> u16 {
        word(self.h_alt, self.l_alt)
    }

    pub fn set_af(&mut self, value: u16) {
        self.a = high(value);
        self.f = Flags::from_byte(low(value));
    }

    pub fn set_bc(&mut self, value: u16) {
        self.b = high(value);
        self.c = low(value);
    }

    pub fn set_de(&mut self, value: u16) {
        self.d = high(value);
        self.e = low(value);
    }

    pub fn set_hl(&mut self, value: u16) {
        self.h = high(value);
        self.l = low(value);
    }

    #[must_use]
    pub const fn index(&self, index: Index) -> u16 {
        match index {
            Index::Ix => self.ix,
            Index::Iy => self.iy,
        }
    }

    pub fn set_index(&mut self, index: Index, value: u16) {
        match index {
            Index::Ix => self.ix = value,
            Index::Iy => self.iy = value,
        }
    }

    /// EX AF,AF'
    pub fn exchange_af(&mut self) {
        std::mem::swap(&mut self.a, &mut self.a_alt);
        std::mem::swap(&mut self.f, &mut self.f_alt);
    }

    /// EXX: swap BC, DE and HL with their shadows.
    pub fn exchange_pairs(&mut self) {
        std::mem::swap(&mut self.b, &mut self.b_alt);
        std::mem::swap(&mut self.c, &mut self.c_alt);
        std::mem::swap(&mut self.d, &mut self.d_alt);
        std::mem::swap(&mut self.e, &mut self.e_alt);
        std::mem::swap(&mut self.h, &mut self.h_alt);
        std::mem::swap(&mut self.l, &mut self.l_alt);
    }

    /// Count one opcode fetch. Bit 7 is only changed by `LD R,A`.
    pub fn refresh(&mut self) {
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_state() {
        let regs = Registers::at_reset(0x0100);
        assert_eq!(regs.af(), 0xFFFF);
        assert_eq!(regs.sp, 0xFFFF);
        assert_eq!(regs.pc, 0x0100);
        assert!(!regs.iff1 && !regs.iff2);
        assert_eq!(regs.im, InterruptMode::Zero);
    }

    #[test]
    fn exchanges_swap_with_the_shadow_set() {
        let mut regs = Registers::default();
        regs.set_af(0x1234);
        regs.set_bc(0x5678);
        regs.set_hl(0x9ABC);
        regs.exchange_af();
        regs.exchange_pairs();
        assert_eq!(regs.af(), 0);
        assert_eq!(regs.af_alt(), 0x1234);
        assert_eq!(regs.bc_alt(), 0x5678);
        assert_eq!(regs.hl_alt(), 0x9ABC);
        assert_eq!(regs.hl(), 0);
    }

    #[test]
    fn refresh_keeps_bit_7() {
        let mut regs = Registers {
            r: 0xFF,
            ..Registers::default()
        };
        regs.refresh();
        assert_eq!(regs.r, 0x80);
        regs.r = 0x7F;
        regs.refresh();
        assert_eq!(regs.r, 0x00);
    }
}
