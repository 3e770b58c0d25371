//! The Z80 core: run state, prefix dispatch and interrupt acceptance.

use emu_core::bits::{high, low, word};
use emu_core::{
    Cpu, DecodeError, FlagRegister, InObserver, InterruptRequest, Memory, Observable,
    ObserverId, OutObserver, PortIo, Value,
};
use tracing::{debug, trace, warn};

use crate::disassembler;
use crate::execute::Addressing;
use crate::instruction::{BitInstruction, ExtendedInstruction, Index, Instruction, Prefix};
use crate::registers::{InterruptMode, Registers};

/// Cycles burned per `next_instruction` call while halted.
const HALT_CYCLES: u32 = 4;

/// Non-maskable interrupt entry point.
const NMI_VECTOR: u16 = 0x0066;

/// Mode 1 restart address.
const IM1_VECTOR: u16 = 0x0038;

/// A Zilog Z80 with its own memory and port space.
#[derive(Debug)]
pub struct Z80 {
    pub(crate) regs: Registers,
    pub(crate) memory: Memory,
    pub(crate) io: PortIo,
    initial_pc: u16,
    pending: Option<InterruptRequest>,
    nmi_pending: bool,
    running: bool,
}

impl Z80 {
    /// A stopped CPU that will start executing at `initial_pc`.
    #[must_use]
    pub fn new(memory: Memory, initial_pc: u16) -> Self {
        Self {
            regs: Registers::at_reset(initial_pc),
            memory,
            io: PortIo::new(),
            initial_pc,
            pending: None,
            nmi_pending: false,
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

    /// The maskable request waiting for IFF1, if any.
    #[must_use]
    pub fn pending_interrupt(&self) -> Option<InterruptRequest> {
        self.pending
    }

    /// Assert /NMI. It is taken before the next instruction regardless of
    /// IFF1.
    pub fn nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// M1 cycle: fetch an opcode or prefix byte and bump R.
    pub(crate) fn fetch_opcode(&mut self) -> u8 {
        self.regs.refresh();
        self.fetch_byte()
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

    /// Fetch a displacement byte and apply it to `base`.
    pub(crate) fn fetch_displaced(&mut self, base: u16) -> u16 {
        let displacement = self.fetch_byte() as i8;
        base.wrapping_add_signed(i16::from(displacement))
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

    pub(crate) fn call(&mut self, target: u16) {
        self.push(self.regs.pc);
        self.regs.pc = target;
    }

    /// Decode and execute the instruction starting with `opcode`, fetching
    /// any further prefix bytes and operands from PC.
    fn dispatch(&mut self, opcode: u8) -> Result<u32, DecodeError> {
        match Instruction::decode(opcode) {
            Instruction::Prefix(Prefix::Cb) => {
                let opcode = self.fetch_opcode();
                Ok(self.execute_bits(BitInstruction::decode(opcode)))
            }
            Instruction::Prefix(Prefix::Ed) => {
                let opcode = self.fetch_opcode();
                let instruction = ExtendedInstruction::decode(opcode)?;
                Ok(self.execute_extended(instruction))
            }
            Instruction::Prefix(Prefix::Dd) => self.dispatch_indexed(Index::Ix),
            Instruction::Prefix(Prefix::Fd) => self.dispatch_indexed(Index::Iy),
            instruction => Ok(self.execute(instruction, Addressing::unprefixed(self.regs.hl()))),
        }
    }

    /// The byte after a `DD`/`FD` prefix.
    fn dispatch_indexed(&mut self, index: Index) -> Result<u32, DecodeError> {
        let opcode = self.fetch_opcode();
        let base = self.regs.index(index);

        match Instruction::decode(opcode) {
            // DD CB d op: the fourth byte is not an opcode fetch
            Instruction::Prefix(Prefix::Cb) => {
                let address = self.fetch_displaced(base);
                let instruction = BitInstruction::decode(self.fetch_byte());
                Ok(self.execute_indexed_bits(instruction, address))
            }
            Instruction::Prefix(_) => Err(DecodeError::in_table(opcode, index.table())),
            instruction => {
                let addressing = if instruction.uses_memory() {
                    Addressing::displaced(index, self.fetch_displaced(base))
                } else {
                    Addressing::indexed(index, self.regs.hl())
                };
                Ok(self.execute(instruction, addressing) + instruction.index_overhead())
            }
        }
    }

    fn accept_nmi(&mut self) -> u32 {
        self.nmi_pending = false;
        self.regs.iff2 = self.regs.iff1;
        self.regs.iff1 = false;
        self.regs.halted = false;
        self.regs.refresh();
        debug!(pc = self.regs.pc, "Z80 NMI accepted");
        self.call(NMI_VECTOR);
        11
    }

    /// Take the pending maskable request if IFF1 is set, acknowledging it.
    fn accept_interrupt(&mut self) -> Option<InterruptRequest> {
        if !self.regs.iff1 {
            return None;
        }
        let request = self.pending.take()?;
        self.regs.iff1 = false;
        self.regs.iff2 = false;
        if self.regs.halted {
            debug!("Z80 woken from HALT by interrupt");
            self.regs.halted = false;
        }
        self.regs.refresh();
        debug!(?request, pc = self.regs.pc, im = self.regs.im.number(), "Z80 interrupt accepted");
        Some(request)
    }

    fn service_interrupt(&mut self, request: InterruptRequest) -> Result<u32, DecodeError> {
        if let InterruptRequest::Vector(target) = request {
            self.call(target);
            return Ok(13);
        }
        match self.regs.im {
            // The acknowledge cycle adds two wait states to the instruction
            InterruptMode::Zero => Ok(self.dispatch(request.data_byte())? + 2),
            InterruptMode::One => {
                self.call(IM1_VECTOR);
                Ok(13)
            }
            InterruptMode::Two => {
                let table = word(self.regs.i, request.data_byte());
                let target = self.read_word(table);
                self.call(target);
                Ok(19)
            }
        }
    }

    fn clear_state(&mut self) {
        self.regs = Registers::at_reset(self.initial_pc);
        self.pending = None;
        self.nmi_pending = false;
        self.io.clear();
    }
}

impl Cpu for Z80 {
    type Registers = Registers;

    fn next_instruction(&mut self) -> Result<u32, DecodeError> {
        if !self.running {
            return Ok(0);
        }

        let pc = self.regs.pc;
        if self.nmi_pending {
            let cycles = self.accept_nmi();
            trace!(pc = format_args!("{pc:04x}"), cycles, "Z80 NMI serviced");
            return Ok(cycles);
        }
        if let Some(request) = self.accept_interrupt() {
            let cycles = self.service_interrupt(request).inspect_err(|error| {
                warn!(pc = format_args!("{pc:04x}"), %error, "Z80 decode failed");
            })?;
            trace!(pc = format_args!("{pc:04x}"), ?request, cycles, "Z80 interrupt serviced");
            return Ok(cycles);
        }
        if self.regs.halted {
            self.regs.refresh();
            return Ok(HALT_CYCLES);
        }

        let opcode = self.fetch_opcode();
        let cycles = self.dispatch(opcode).inspect_err(|error| {
            warn!(pc = format_args!("{pc:04x}"), %error, "Z80 decode failed");
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
        debug!(pc = self.regs.pc, "Z80 started");
        self.running = true;
    }

    fn stop(&mut self) {
        debug!(pc = self.regs.pc, "Z80 stopped");
        self.running = false;
        self.clear_state();
    }

    fn reset(&mut self) {
        debug!("Z80 reset");
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
        self.regs.iff1
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
    "a", "f", "b", "c", "d", "e", "h", "l", "af", "bc", "de", "hl", "af'", "bc'", "de'", "hl'",
    "ix", "iy", "sp", "pc", "i", "r", "iff1", "iff2", "im", "halted", "flags.s", "flags.z",
    "flags.y", "flags.h", "flags.x", "flags.pv", "flags.n", "flags.c",
];

impl Observable for Z80 {
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
            "af'" => r.af_alt().into(),
            "bc'" => r.bc_alt().into(),
            "de'" => r.de_alt().into(),
            "hl'" => r.hl_alt().into(),
            "ix" => r.ix.into(),
            "iy" => r.iy.into(),
            "sp" => r.sp.into(),
            "pc" => r.pc.into(),
            "i" => r.i.into(),
            "r" => r.r.into(),
            "iff1" => r.iff1.into(),
            "iff2" => r.iff2.into(),
            "im" => r.im.number().into(),
            "halted" => r.halted.into(),
            "flags.s" => r.f.sign.into(),
            "flags.z" => r.f.zero.into(),
            "flags.y" => r.f.y.into(),
            "flags.h" => r.f.half_carry.into(),
            "flags.x" => r.f.x.into(),
            "flags.pv" => r.f.parity_overflow.into(),
            "flags.n" => r.f.subtract.into(),
            "flags.c" => r.f.carry.into(),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
