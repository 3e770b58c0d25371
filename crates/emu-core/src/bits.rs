//! Byte and flag arithmetic shared by every ISA.

/// A condition-code register with a fixed byte layout.
///
/// `from_byte(f.to_byte())` must reproduce `f` for every bit the layout
/// models; bits the ISA hard-wires read back at their fixed value.
pub trait FlagRegister: Sized {
    fn to_byte(&self) -> u8;

    fn from_byte(value: u8) -> Self;
}

/// True if adding `a + b + carry` carries out of bit `bit`.
///
/// Ripple-carry definition: the incoming carry counts, so
/// `carried_out_of(7, 0xFF, 0x00, true)` is true.
#[must_use]
pub const fn carried_out_of(bit: u32, a: u16, b: u16, carry: bool) -> bool {
    let mask = (1u32 << (bit + 1)) - 1;
    (a as u32 & mask) + (b as u32 & mask) + carry as u32 > mask
}

/// True if `a - b - borrow` borrows into bit `bit`.
#[must_use]
pub const fn borrowed_into(bit: u32, a: u16, b: u16, borrow: bool) -> bool {
    let mask = (1u32 << (bit + 1)) - 1;
    (a as u32 & mask) < (b as u32 & mask) + borrow as u32
}

/// Even parity of the byte (true when the number of set bits is even).
#[must_use]
pub const fn parity(value: u8) -> bool {
    value.count_ones().is_multiple_of(2)
}

/// Signed overflow of `a + b + carry` in 8 bits.
#[must_use]
pub const fn add_overflows(a: u8, b: u8, result: u8) -> bool {
    (a ^ b) & 0x80 == 0 && (a ^ result) & 0x80 != 0
}

/// Signed overflow of `a - b - borrow` in 8 bits.
#[must_use]
pub const fn sub_overflows(a: u8, b: u8, result: u8) -> bool {
    (a ^ b) & 0x80 != 0 && (a ^ result) & 0x80 != 0
}

#[must_use]
pub const fn word(high: u8, low: u8) -> u16 {
    (high as u16) << 8 | low as u16
}

#[must_use]
pub const fn high(value: u16) -> u8 {
    (value >> 8) as u8
}

#[must_use]
pub const fn low(value: u16) -> u8 {
    value as u8
}
