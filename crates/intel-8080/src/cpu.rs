//! The 8080 core: run state, fetch and the interrupt latch.

use emu_core::bits::{high, low, word};
use emu_core::{
    Cpu, DecodeError, FlagRegister, InObserver, InterruptRequest, Memory, Observable,
    ObserverId, OutObserver, PortIo, Value,
};
use tracing::{debug, trace};

use crate::instruction::Instruction;
use crate::registers::Registers;

/// Cycles burned per `next_instruction` call while halted.
const HALT_CYCLES: u32 = 4;

/// An Intel 8080 with its own memory and port space.
#[derive(Debug)]
pub struct I8080 {
    pub(crate) regs: Registers,
    pub(crate) memory: Memory,
    pub(crate) io: PortIo,
    initial_pc: u16,
    pending: Option<InterruptRequest>,
    running: bool,
}

impl I8080 {
    /// A stopped CPU that will start executing at `initial_pc`.
    #[must_use]
    pub fn new(memory: Memory, initial_pc: u16) -> Self {
        Self {
            regs: Registers {
                pc: initial_pc,
                ..Registers::default()
            },
            memory,
            io: PortIo::new(),
            initial_pc,
            pending: None,
            running: false,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Latch a value for the next `IN` from `port`.
    pub fn input(&mut self, port: u8, value: u8) {
        self.io.input(port, value);
    }

    /// The last value written to `port` by `OUT`.
    #[must_use]
    pub fn output(&self, port: u8) -> u8 {
        self.io.output(port)
    }

    pub fn add_in_observer(&mut self, observer: impl InObserver + 'static) -> ObserverId {
        self.io.add_in_observer(observer)
    }

    pub fn remove_in_observer(&mut self, id: ObserverId) -> bool {
        self.io.remove_in_observer(id)
    }

    pub fn add_out_observer(&mut self, observer: impl OutObserver + 'static) -> ObserverId {
        self.io.add_out_observer(observer)
    }

    pub fn remove_out_observer(&mut self, id: ObserverId) -> bool {
        self.io.remove_out_observer(id)
    }

    /// The request waiting for interrupts to be enabled, if any.
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

    pub(crate) fn read_word(&mut self, address: u16) -> u16 {
        let lo = self.memory.read(address);
        let hi = self.memory.read(address.wrapping_add(1));
        word(hi, lo)
    }

    pub(crate) fn write_word(&mut self, address: u16, value: u16) {
        self.memory.write(address, low(value));
        self.memory.write(address.wrapping_add(1), high(value));
    }

    /// Push high byte first so the low byte ends up at the lower address.
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

    /// Take the pending request if interrupts are enabled, acknowledging it.
    fn accept_interrupt(&mut self) -> Option<InterruptRequest> {
        if !self.regs.inte {
            return None;
        }
        let request = self.pending.take()?;
        self.regs.inte = false;
        if self.regs.halted {
            debug!("8080 woken from HLT by interrupt");
            self.regs.halted = false;
        }
        debug!(?request, pc = self.regs.pc, "8080 interrupt accepted");
        Some(request)
    }

    fn clear_state(&mut self) {
        self.regs = Registers {
            pc: self.initial_pc,
            ..Registers::default()
        };
        self.pending = None;
        self.io.clear();
    }
}

impl Cpu for I8080 {
    type Registers = Registers;

    fn next_instruction(&mut self) -> Result<u32, DecodeError> {
        if !self.running {
            return Ok(0);
        }

        let pc = self.regs.pc;
        let opcode = match self.accept_interrupt() {
            Some(request @ InterruptRequest::Vector(target)) => {
                self.push(self.regs.pc);
                self.regs.pc = target;
                let cycles = Instruction::Rst(0).cycles(true);
                trace!(pc = format_args!("{pc:04x}"), ?request, cycles, "8080 interrupt serviced");
                return Ok(cycles);
            }
            Some(request) => request.data_byte(),
            None if self.regs.halted => return Ok(HALT_CYCLES),
            None => self.fetch_byte(),
        };

        let instruction = Instruction::decode(opcode);
        let cycles = self.execute(instruction);
        trace!(
            pc = format_args!("{pc:04x}"),
            opcode = format_args!("{opcode:02x}"),
            %instruction,
            cycles,
        );
        Ok(cycles)
    }

    fn can_run_next_instruction(&self) -> bool {
        self.running && usize::from(self.regs.pc) < self.memory.len()
    }

    fn start(&mut self) {
        debug!(pc = self.regs.pc, "8080 started");
        self.running = true;
    }

    fn stop(&mut self) {
        debug!(pc = self.regs.pc, "8080 stopped");
        self.running = false;
        self.clear_state();
    }

    fn reset(&mut self) {
        debug!("8080 reset");
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
        self.regs.inte
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
    "a", "b", "c", "d", "e", "h", "l", "f", "bc", "de", "hl", "sp", "pc", "inte", "halted",
    "flags.s", "flags.z", "flags.ac", "flags.p", "flags.c",
];

impl Observable for I8080 {
    fn query(&self, path: &str) -> Option<Value> {
        let r = &self.regs;
        let value = match path {
            "a" => r.a.into(),
            "b" => r.b.into(),
            "c" => r.c.into(),
            "d" => r.d.into(),
            "e" => r.e.into(),
            "h" => r.h.into(),
            "l" => r.l.into(),
            "f" => r.flags.to_byte().into(),
            "bc" => r.bc().into(),
            "de" => r.de().into(),
            "hl" => r.hl().into(),
            "sp" => r.sp.into(),
            "pc" => r.pc.into(),
            "inte" => r.inte.into(),
            "halted" => r.halted.into(),
            "flags.s" => r.flags.sign.into(),
            "flags.z" => r.flags.zero.into(),
            "flags.ac" => r.flags.aux_carry.into(),
            "flags.p" => r.flags.parity.into(),
            "flags.c" => r.flags.carry.into(),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
