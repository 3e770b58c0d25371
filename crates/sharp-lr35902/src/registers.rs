//! LR35902 register set.

use emu_core::FlagRegister;
use emu_core::bits::{high, low, word};

use crate::flags::Flags;

/// LR35902 registers snapshot for observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registers {
    pub a: u8,
    pub f: Flags,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,

    pub sp: u16,
    pub pc: u16,

    /// Interrupt master enable.
    pub ime: bool,
    /// Parked by `HALT` or `STOP` until an interrupt is serviced.
    pub halted: bool,
}

impl Registers {
    /// The state the boot ROM hands over to a cartridge.
    #[must_use]
    pub fn at_reset(pc: u16) -> Self {
        Self {
            a: 0x01,
            f: Flags::from_byte(0xB0),
            b: 0x00,
            c: 0x13,
            d: 0x00,
            e: 0xD8,
            h: 0x01,
            l: 0x4D,
            sp: 0xFFFE,
            pc,
            ime: false,
            halted: false,
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
}
