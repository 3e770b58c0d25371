//! CPU core trait.

use crate::{DecodeError, Memory};

/// What an interrupting device puts on the data bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterruptRequest {
    /// One of the eight restart vectors; executes as `RST n` (opcode `0xC7 | n << 3`).
    Rst(u8),
    /// An arbitrary opcode byte, executed as if it had been fetched. On the
    /// Z80 in interrupt mode 2 this is the low byte of the vector address.
    Opcode(u8),
    /// Call straight to a target address (LR35902 interrupt vectors).
    Vector(u16),
}

impl InterruptRequest {
    /// The byte a device would drive onto the data bus for this request.
    #[must_use]
    pub const fn data_byte(self) -> u8 {
        match self {
            Self::Rst(n) => 0xC7 | ((n & 7) << 3),
            Self::Opcode(op) => op,
            Self::Vector(target) => target as u8,
        }
    }
}

/// An instruction-stepped CPU core.
///
/// A driver calls [`Cpu::next_instruction`] in a loop, summing the returned
/// cycle counts against its frame budget, and injects interrupts between
/// calls. The core owns its [`Memory`].
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Execute one instruction (or service one pending interrupt) and
    /// return the number of clock cycles it took.
    ///
    /// A stopped CPU does nothing and returns 0. A halted CPU burns 4 cycles
    /// per call until an interrupt wakes it.
    fn next_instruction(&mut self) -> Result<u32, DecodeError>;

    /// True while running and the program counter lies inside memory.
    fn can_run_next_instruction(&self) -> bool;

    fn start(&mut self);

    /// Stop running and clear all CPU state.
    fn stop(&mut self);

    /// Reset the CPU to its power-on state. The run state is untouched.
    fn reset(&mut self);

    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Overwrite all registers, e.g. when restoring a snapshot.
    fn set_registers(&mut self, registers: Self::Registers);

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;

    /// The global interrupt-enable flip-flop.
    fn is_interrupt_enabled(&self) -> bool;

    /// Assert a maskable interrupt. A request that has not been serviced yet
    /// is replaced; there is no queue.
    fn interrupt(&mut self, request: InterruptRequest);

    fn memory(&self) -> &Memory;

    fn memory_mut(&mut self) -> &mut Memory;
}
