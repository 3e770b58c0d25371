//! Instruction-stepped Sharp LR35902 (Game Boy) interpreter.
//!
//! The core owns a [`Memory`](emu_core::Memory); the hardware registers in
//! the high page are modelled by the driver through memory mappers and
//! write observers. Interrupts arrive as
//! [`InterruptRequest::Vector`](emu_core::InterruptRequest::Vector) with the
//! handler address and are taken while IME is set.

mod cpu;
mod disassembler;
mod execute;
pub mod flags;
pub mod instruction;
mod registers;

pub use cpu::Lr35902;
pub use disassembler::{DisassembledLine, disassemble};
pub use flags::{CF, Flags, HF, NF, ZF};
pub use instruction::Instruction;
pub use registers::Registers;
