//! 8080 register set.

use emu_core::FlagRegister;
use emu_core::bits::{high, low, word};

use crate::flags::Flags;

/// 8080 registers snapshot for observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub flags: Flags,

    pub sp: u16,
    pub pc: u16,

    /// Interrupt enable flip-flop (INTE).
    pub inte: bool,
    pub halted: bool,
}

impl Registers {
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

    /// Program status word: A in the high byte, flags in the low byte.
    #[must_use]
    pub fn psw(&self) -> u16 {
        word(self.a, self.flags.to_byte())
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

    pub fn set_psw(&mut self, value: u16) {
        self.a = high(value);
        self.flags = Flags::from_byte(low(value));
    }
}
