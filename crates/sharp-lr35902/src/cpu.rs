//! The LR35902 core: run state, fetch and the interrupt latch.
//!
//! There is no port space; the Game Boy's hardware registers live at
//! `FF00-FF7F` and are reached through memory mappers and write observers.

use emu_core::bits::{high, low, word};
use emu_core::{Cpu, DecodeError, FlagRegister, InterruptRequest, Memory, Observable, Value};
use tracing::{debug, trace, warn};

use crate::disassembler;
use crate::instruction::{BitInstruction, Instruction};
use crate::registers::Registers;

/// Cycles burned per `next_instruction` call while halted.
const HALT_CYCLES: u32 = 4;

/// Push the return address and jump to the vector.
const VECTOR_CYCLES: u32 = 20;

/// A Sharp LR35902 with its own memory.
#[derive(Debug)]
pub struct Lr35902 {
    pub(crate) regs: Registers,
    pub(crate) memory: Memory,
    initial_pc: u16,
    pending: Option<InterruptRequest>,
    running: bool,
}

impl Lr35902 {
    /// A stopped CPU in the post-boot-ROM state that will start executing
    /// at `initial_pc`.
    #[must_use]
    pub fn new(memory: Memory, initial_pc: u16) -> Self {
        Self {
            regs: Registers::at_reset(initial_pc),
            memory,
            initial_pc,
            pending: None,
            running: false,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The request waiting for IME, if any.
    #[must_use]
    pub fn pending_interrupt(&self) -> Option<InterruptRequest> {
        self.pending
    }

    pub(crate) fn fetch_byte(&mut self) -> u8 {
        let byte = self.memory.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        byte
    }

    pub(crate) fn fetch_word(&mut self) -> u16 {
        let lo = self.fetch_byte();
        let hi = self.fetch_byte();
        word(hi, lo)
    }

    pub(crate) fn write_word(&mut self, address: u16, value: u16) {
        self.memory.write(address, low(value));
        self.memory.write(address.wrapping_add(1), high(value));
    }

    pub(crate) fn push(&mut self, value: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.memory.write(self.regs.sp, high(value));
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.memory.write(self.regs.sp, low(value));
    }

    pub(crate) fn pop(&mut self) -> u16 {
        let lo = self.memory.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = self.memory.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        word(hi, lo)
    }

    pub(crate) fn call(&mut self, target: u16) {
        self.push(self.regs.pc);
        self.regs.pc = target;
    }

    fn dispatch(&mut self, opcode: u8) -> Result<u32, DecodeError> {
        match Instruction::decode(opcode)? {
            Instruction::Prefix => {
                let opcode = self.fetch_byte();
                Ok(self.execute_bits(BitInstruction::decode(opcode)))
            }
            instruction => Ok(self.execute(instruction)),
        }
    }

    /// Take the pending request if IME is set, acknowledging it.
    fn accept_interrupt(&mut self) -> Option<InterruptRequest> {
        if !self.regs.ime {
            return None;
        }
        let request = self.pending.take()?;
        self.regs.ime = false;
        if self.regs.halted {
            debug!("LR35902 woken by interrupt");
            self.regs.halted = false;
        }
        debug!(?request, pc = self.regs.pc, "LR35902 interrupt accepted");
        Some(request)
    }

    fn clear_state(&mut self) {
        self.regs = Registers::at_reset(self.initial_pc);
        self.pending = None;
    }
}

impl Cpu for Lr35902 {
    type Registers = Registers;

    fn next_instruction(&mut self) -> Result<u32, DecodeError> {
        if !self.running {
            return Ok(0);
        }

        let pc = self.regs.pc;
        if let Some(request) = self.accept_interrupt() {
            let cycles = match request {
                InterruptRequest::Vector(target) => {
                    self.call(target);
                    VECTOR_CYCLES
                }
                request => self.dispatch(request.data_byte()).inspect_err(|error| {
                    warn!(pc = format_args!("{pc:04x}"), %error, "LR35902 decode failed");
                })?,
            };
            trace!(pc = format_args!("{pc:04x}"), ?request, cycles, "LR35902 interrupt serviced");
            return Ok(cycles);
        }
        if self.regs.halted {
            return Ok(HALT_CYCLES);
        }

        let opcode = self.fetch_byte();
        let cycles = self.dispatch(opcode).inspect_err(|error| {
            warn!(pc = format_args!("{pc:04x}"), %error, "LR35902 decode failed");
        })?;
        trace!(
            pc = format_args!("{pc:04x}"),
            opcode = format_args!("{opcode:02x}"),
            instruction = %disassembler::mnemonic_at(&self.memory, pc),
            cycles,
        );
        Ok(cycles)
    }

    fn can_run_next_instruction(&self) -> bool {
        self.running && usize::from(self.regs.pc) < self.memory.len()
    }

    fn start(&mut self) {
        debug!(pc = self.regs.pc, "LR35902 started");
        self.running = true;
    }

    fn stop(&mut self) {
        debug!(pc = self.regs.pc, "LR35902 stopped");
        self.running = false;
        self.clear_state();
    }

    fn reset(&mut self) {
        debug!("LR35902 reset");
        self.clear_state();
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn set_registers(&mut self, registers: Registers) {
        self.regs = registers;
    }

    fn is_halted(&self) -> bool {
        self.regs.halted
    }

    fn is_interrupt_enabled(&self) -> bool {
        self.regs.ime
    }

    fn interrupt(&mut self, request: InterruptRequest) {
        self.pending = Some(request);
    }

    fn memory(&self) -> &Memory {
        &self.memory
    }

    fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }
}

const QUERY_PATHS: &[&str] = &[
    "a", "f", "b", "c", "d", "e", "h", "l", "af", "bc", "de", "hl", "sp", "pc", "ime", "halted",
    "flags.z", "flags.n", "flags.h", "flags.c",
];

impl Observable for Lr35902 {
    fn query(&self, path: &str) -> Option<Value> {
        let r = &self.regs;
        let value = match path {
            "a" => r.a.into(),
            "f" => r.f.to_byte().into(),
            "b" => r.b.into(),
            "c" => r.c.into(),
            "d" => r.d.into(),
            "e" => r.e.into(),
            "h" => r.h.into(),
            "l" => r.l.into(),
            "af" => r.af().into(),
            "bc" => r.bc().into(),
            "de" => r.de().into(),
            "hl" => r.hl().into(),
            "sp" => r.sp.into(),
            "pc" => r.pc.into(),
            "ime" => r.ime.into(),
            "halted" => r.halted.into(),
            "flags.z" => r.f.zero.into(),
            "flags.n" => r.f.subtract.into(),
            "flags.h" => r.f.half_carry.into(),
            "flags.c" => r.f.carry.into(),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
