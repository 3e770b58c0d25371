//! Instruction-stepped Intel 8080 interpreter.
//!
//! The CPU owns a [`Memory`](emu_core::Memory) and a 256-port I/O space.
//! Each call to [`Cpu::next_instruction`](emu_core::Cpu::next_instruction)
//! either services a pending interrupt or fetches, decodes and executes one
//! instruction, returning its cycle count.

mod cpu;
mod disassembler;
mod execute;
pub mod flags;
pub mod instruction;
mod registers;

pub use cpu::I8080;
pub use disassembler::{DisassembledLine, disassemble};
pub use flags::Flags;
pub use instruction::Instruction;
pub use registers::Registers;
