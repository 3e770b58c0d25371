//! Instruction-stepped Zilog Z80 interpreter.
//!
//! Covers the full documented instruction set plus the undocumented parts
//! that real software leans on: the X/Y flag bits, the IX/IY halves, `SLL`
//! and the register copy of `DDCB`/`FDCB` results. Maskable interrupts
//! follow the mode set by `IM`, and [`Z80::nmi`] raises a non-maskable one.

mod alu;
mod cpu;
mod disassembler;
mod execute;
pub mod flags;
pub mod instruction;
mod registers;

pub use cpu::Z80;
pub use disassembler::{DisassembledLine, disassemble};
pub use flags::{CF, Flags, HF, NF, PF, SF, XF, YF, ZF};
pub use instruction::Instruction;
pub use registers::{InterruptMode, Registers};
