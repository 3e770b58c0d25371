//! Instruction semantics for all four tables.

use emu_core::bits::{high, low, parity};

use crate::alu;
use crate::cpu::Z80;
use crate::instruction::{
    BitInstruction, BlockOp, Condition, ExtendedInstruction, Index, Instruction, Reg, RegPair,
    Shift, StackPair,
};

/// How HL-based operands resolve for one instruction.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Addressing {
    /// Replaces HL as a 16-bit operand.
    pair: Option<Index>,
    /// Replaces H and L as 8-bit operands.
    halves: Option<Index>,
    /// Effective address of `(HL)`, `(IX+d)` or `(IY+d)`.
    memory: u16,
}

impl Addressing {
    pub(crate) const fn unprefixed(hl: u16) -> Self {
        Self {
            pair: None,
            halves: None,
            memory: hl,
        }
    }

    /// An indexed instruction without a memory operand: HL, H and L all
    /// become the index register.
    pub(crate) const fn indexed(index: Index, hl: u16) -> Self {
        Self {
            pair: Some(index),
            halves: Some(index),
            memory: hl,
        }
    }

    /// An indexed instruction with an `(IX+d)` operand. H and L keep their
    /// usual meaning.
    pub(crate) const fn displaced(index: Index, address: u16) -> Self {
        Self {
            pair: Some(index),
            halves: None,
            memory: address,
        }
    }
}

impl Z80 {
    /// Execute an unprefixed-table instruction whose opcode (and any
    /// displacement) has already been fetched. Returns the cycle count
    /// without index overhead.
    pub(crate) fn execute(&mut self, instruction: Instruction, at: Addressing) -> u32 {
        let mut taken = true;

        match instruction {
            Instruction::Nop => {}
            Instruction::ExAf => self.regs.exchange_af(),
            Instruction::Exx => self.regs.exchange_pairs(),
            Instruction::ExDeHl => {
                let de = self.regs.de();
                self.regs.set_de(self.regs.hl());
                self.regs.set_hl(de);
            }

            // Relative jumps
            Instruction::Djnz => {
                let target = self.fetch_displaced_target();
                self.regs.b = self.regs.b.wrapping_sub(1);
                taken = self.regs.b != 0;
                if taken {
                    self.regs.pc = target;
                }
            }
            Instruction::Jr => self.regs.pc = self.fetch_displaced_target(),
            Instruction::JrIf(cc) => {
                let target = self.fetch_displaced_target();
                taken = self.condition(cc);
                if taken {
                    self.regs.pc = target;
                }
            }

            // 16-bit loads and arithmetic
            Instruction::LdPair(rp) => {
                let value = self.fetch_word();
                self.set_pair(rp, value, at);
            }
            Instruction::AddHl(rp) => {
                let hl = self.pair(RegPair::Hl, at);
                let value = self.pair(rp, at);
                let result = alu::add16(&mut self.regs.f, hl, value);
                self.set_pair(RegPair::Hl, result, at);
            }
            Instruction::IncPair(rp) => {
                let value = self.pair(rp, at).wrapping_add(1);
                self.set_pair(rp, value, at);
            }
            Instruction::DecPair(rp) => {
                let value = self.pair(rp, at).wrapping_sub(1);
                self.set_pair(rp, value, at);
            }
            Instruction::StoreHl => {
                let address = self.fetch_word();
                let value = self.pair(RegPair::Hl, at);
                self.write_word(address, value);
            }
            Instruction::LoadHl => {
                let address = self.fetch_word();
                let value = self.read_word(address);
                self.set_pair(RegPair::Hl, value, at);
            }
            Instruction::LdSpHl => self.regs.sp = self.pair(RegPair::Hl, at),

            // 8-bit loads
            Instruction::StoreA(rp) => {
                let address = self.pair(rp, at);
                self.memory.write(address, self.regs.a);
            }
            Instruction::LoadA(rp) => {
                let address = self.pair(rp, at);
                self.regs.a = self.memory.read(address);
            }
            Instruction::StoreAbsolute => {
                let address = self.fetch_word();
                self.memory.write(address, self.regs.a);
            }
            Instruction::LoadAbsolute => {
                let address = self.fetch_word();
                self.regs.a = self.memory.read(address);
            }
            Instruction::LdImmediate(r) => {
                let value = self.fetch_byte();
                self.set_reg(r, value, at);
            }
            Instruction::Ld(dst, src) => {
                let value = self.reg(src, at);
                self.set_reg(dst, value, at);
            }

            // 8-bit arithmetic
            Instruction::Inc(r) => {
                let value = self.reg(r, at);
                let result = alu::inc8(&mut self.regs.f, value);
                self.set_reg(r, result, at);
            }
            Instruction::Dec(r) => {
                let value = self.reg(r, at);
                let result = alu::dec8(&mut self.regs.f, value);
                self.set_reg(r, result, at);
            }
            Instruction::Alu(op, r) => {
                let value = self.reg(r, at);
                self.regs.a = alu::accumulate(&mut self.regs.f, op, self.regs.a, value);
            }
            Instruction::AluImmediate(op) => {
                let value = self.fetch_byte();
                self.regs.a = alu::accumulate(&mut self.regs.f, op, self.regs.a, value);
            }

            // Accumulator and flag operations
            Instruction::Rlca => self.rotate_accumulator(Shift::Rlc),
            Instruction::Rrca => self.rotate_accumulator(Shift::Rrc),
            Instruction::Rla => self.rotate_accumulator(Shift::Rl),
            Instruction::Rra => self.rotate_accumulator(Shift::Rr),
            Instruction::Daa => self.regs.a = alu::daa(&mut self.regs.f, self.regs.a),
            Instruction::Cpl => {
                self.regs.a = !self.regs.a;
                let f = &mut self.regs.f;
                f.half_carry = true;
                f.subtract = true;
                f.handle_xy(self.regs.a);
            }
            Instruction::Scf => {
                let f = &mut self.regs.f;
                f.carry = true;
                f.half_carry = false;
                f.subtract = false;
                f.handle_xy(self.regs.a);
            }
            Instruction::Ccf => {
                let f = &mut self.regs.f;
                f.half_carry = f.carry;
                f.carry = !f.carry;
                f.subtract = false;
                f.handle_xy(self.regs.a);
            }

            // Jumps, calls and returns
            Instruction::Jp => self.regs.pc = self.fetch_word(),
            Instruction::JpIf(cc) => {
                let target = self.fetch_word();
                if self.condition(cc) {
                    self.regs.pc = target;
                }
            }
            Instruction::JpHl => self.regs.pc = self.pair(RegPair::Hl, at),
            Instruction::Call => {
                let target = self.fetch_word();
                self.call(target);
            }
            Instruction::CallIf(cc) => {
                let target = self.fetch_word();
                taken = self.condition(cc);
                if taken {
                    self.call(target);
                }
            }
            Instruction::Ret => self.regs.pc = self.pop(),
            Instruction::RetIf(cc) => {
                taken = self.condition(cc);
                if taken {
                    self.regs.pc = self.pop();
                }
            }
            Instruction::Rst(n) => self.call(u16::from(n) * 8),

            // Stack
            Instruction::Push(rp) => {
                let value = self.stack_pair(rp, at);
                self.push(value);
            }
            Instruction::Pop(rp) => {
                let value = self.pop();
                self.set_stack_pair(rp, value, at);
            }
            Instruction::ExSpHl => {
                let sp = self.regs.sp;
                let top = self.read_word(sp);
                let value = self.pair(RegPair::Hl, at);
                self.write_word(sp, value);
                self.set_pair(RegPair::Hl, top, at);
            }

            // I/O and machine control
            Instruction::OutImmediate => {
                let port = self.fetch_byte();
                self.io.write(port, self.regs.a);
            }
            Instruction::InImmediate => {
                let port = self.fetch_byte();
                self.regs.a = self.io.read(port);
            }
            Instruction::Di => {
                self.regs.iff1 = false;
                self.regs.iff2 = false;
            }
            Instruction::Ei => {
                self.regs.iff1 = true;
                self.regs.iff2 = true;
            }
            Instruction::Halt => {
                tracing::debug!(pc = self.regs.pc, "Z80 halted");
                self.regs.halted = true;
            }

            // Prefixes are resolved by the dispatcher
            Instruction::Prefix(_) => {}
        }

        instruction.cycles(taken)
    }

    /// Execute a `CB`-table instruction on a register or `(HL)`.
    pub(crate) fn execute_bits(&mut self, instruction: BitInstruction) -> u32 {
        let at = Addressing::unprefixed(self.regs.hl());
        let value = self.reg(instruction.reg(), at);

        match instruction {
            BitInstruction::Shift(op, r) => {
                let result = alu::shift(&mut self.regs.f, op, value);
                self.set_reg(r, result, at);
            }
            BitInstruction::Bit(bit, r) => {
                let xy_source = if r == Reg::Memory { self.regs.h } else { value };
                alu::bit(&mut self.regs.f, bit, value, xy_source);
            }
            BitInstruction::Res(bit, r) => self.set_reg(r, value & !(1 << bit), at),
            BitInstruction::Set(bit, r) => self.set_reg(r, value | (1 << bit), at),
        }

        instruction.cycles()
    }

    /// Execute a `DDCB`/`FDCB` instruction on `address`. Apart from BIT, a
    /// register field other than `(HL)` also receives the result.
    pub(crate) fn execute_indexed_bits(&mut self, instruction: BitInstruction, address: u16) -> u32 {
        let value = self.memory.read(address);

        let result = match instruction {
            BitInstruction::Shift(op, _) => Some(alu::shift(&mut self.regs.f, op, value)),
            BitInstruction::Bit(bit, _) => {
                alu::bit(&mut self.regs.f, bit, value, high(address));
                None
            }
            BitInstruction::Res(bit, _) => Some(value & !(1 << bit)),
            BitInstruction::Set(bit, _) => Some(value | (1 << bit)),
        };

        if let Some(result) = result {
            self.memory.write(address, result);
            let r = instruction.reg();
            if r != Reg::Memory {
                self.set_reg(r, result, Addressing::unprefixed(self.regs.hl()));
            }
        }

        instruction.indexed_cycles()
    }

    /// Execute an `ED`-table instruction.
    pub(crate) fn execute_extended(&mut self, instruction: ExtendedInstruction) -> u32 {
        let at = Addressing::unprefixed(self.regs.hl());
        let mut taken = false;

        match instruction {
            ExtendedInstruction::InC(r) => {
                let value = self.io.read(self.regs.c);
                let f = &mut self.regs.f;
                f.handle_szxyp(value);
                f.half_carry = false;
                f.subtract = false;
                if let Some(r) = r {
                    self.set_reg(r, value, at);
                }
            }
            ExtendedInstruction::OutC(r) => {
                let value = r.map_or(0, |r| self.reg(r, at));
                self.io.write(self.regs.c, value);
            }
            ExtendedInstruction::SbcHl(rp) => {
                let value = self.pair(rp, at);
                let hl = self.regs.hl();
                let result = alu::sbc16(&mut self.regs.f, hl, value);
                self.regs.set_hl(result);
            }
            ExtendedInstruction::AdcHl(rp) => {
                let value = self.pair(rp, at);
                let hl = self.regs.hl();
                let result = alu::adc16(&mut self.regs.f, hl, value);
                self.regs.set_hl(result);
            }
            ExtendedInstruction::StorePair(rp) => {
                let address = self.fetch_word();
                let value = self.pair(rp, at);
                self.write_word(address, value);
            }
            ExtendedInstruction::LoadPair(rp) => {
                let address = self.fetch_word();
                let value = self.read_word(address);
                self.set_pair(rp, value, at);
            }
            ExtendedInstruction::Neg => {
                self.regs.a = alu::sub8(&mut self.regs.f, 0, self.regs.a, false);
            }
            ExtendedInstruction::Retn | ExtendedInstruction::Reti => {
                self.regs.iff1 = self.regs.iff2;
                self.regs.pc = self.pop();
            }
            ExtendedInstruction::Im(mode) => self.regs.im = mode,
            ExtendedInstruction::LdIA => self.regs.i = self.regs.a,
            ExtendedInstruction::LdRA => self.regs.r = self.regs.a,
            ExtendedInstruction::LdAI => self.load_special(self.regs.i),
            ExtendedInstruction::LdAR => self.load_special(self.regs.r),
            ExtendedInstruction::Rrd => {
                let value = self.memory.read(at.memory);
                let a = self.regs.a;
                self.memory.write(at.memory, (a << 4) | (value >> 4));
                self.set_digit_result((a & 0xF0) | (value & 0x0F));
            }
            ExtendedInstruction::Rld => {
                let value = self.memory.read(at.memory);
                let a = self.regs.a;
                self.memory.write(at.memory, (value << 4) | (a & 0x0F));
                self.set_digit_result((a & 0xF0) | (value >> 4));
            }
            ExtendedInstruction::Block(op) => taken = self.block(op),
        }

        instruction.cycles(taken)
    }

    /// One step of a block instruction. Returns true when a repeating form
    /// rewinds PC to run again.
    fn block(&mut self, op: BlockOp) -> bool {
        let step = |value: u16| {
            if op.decrements() {
                value.wrapping_sub(1)
            } else {
                value.wrapping_add(1)
            }
        };
        let hl = self.regs.hl();

        let repeat = match op {
            BlockOp::Ldi | BlockOp::Ldd | BlockOp::Ldir | BlockOp::Lddr => {
                let value = self.memory.read(hl);
                let de = self.regs.de();
                self.memory.write(de, value);
                self.regs.set_hl(step(hl));
                self.regs.set_de(step(de));
                let bc = self.regs.bc().wrapping_sub(1);
                self.regs.set_bc(bc);

                let n = value.wrapping_add(self.regs.a);
                let f = &mut self.regs.f;
                f.half_carry = false;
                f.subtract = false;
                f.parity_overflow = bc != 0;
                f.y = n & 0x02 != 0;
                f.x = n & 0x08 != 0;
                bc != 0
            }
            BlockOp::Cpi | BlockOp::Cpd | BlockOp::Cpir | BlockOp::Cpdr => {
                let value = self.memory.read(hl);
                let a = self.regs.a;
                let result = a.wrapping_sub(value);
                self.regs.set_hl(step(hl));
                let bc = self.regs.bc().wrapping_sub(1);
                self.regs.set_bc(bc);

                let f = &mut self.regs.f;
                f.half_carry = (a & 0x0F) < (value & 0x0F);
                f.handle_sign(result);
                f.handle_zero(result);
                let n = result.wrapping_sub(u8::from(f.half_carry));
                f.y = n & 0x02 != 0;
                f.x = n & 0x08 != 0;
                f.subtract = true;
                f.parity_overflow = bc != 0;
                bc != 0 && result != 0
            }
            BlockOp::Ini | BlockOp::Ind | BlockOp::Inir | BlockOp::Indr => {
                let c = self.regs.c;
                let value = self.io.read(c);
                self.memory.write(hl, value);
                self.regs.set_hl(step(hl));
                self.regs.b = self.regs.b.wrapping_sub(1);

                let c = if op.decrements() {
                    c.wrapping_sub(1)
                } else {
                    c.wrapping_add(1)
                };
                self.block_io_flags(value, u16::from(value) + u16::from(c));
                self.regs.b != 0
            }
            BlockOp::Outi | BlockOp::Outd | BlockOp::Otir | BlockOp::Otdr => {
                let value = self.memory.read(hl);
                self.regs.b = self.regs.b.wrapping_sub(1);
                self.io.write(self.regs.c, value);
                self.regs.set_hl(step(hl));

                self.block_io_flags(value, u16::from(value) + u16::from(self.regs.l));
                self.regs.b != 0
            }
        };

        if repeat && op.repeats() {
            self.regs.pc = self.regs.pc.wrapping_sub(2);
            true
        } else {
            false
        }
    }

    fn block_io_flags(&mut self, value: u8, k: u16) {
        let b = self.regs.b;
        let f = &mut self.regs.f;
        f.handle_szxy(b);
        f.subtract = value & 0x80 != 0;
        f.half_carry = k > 0xFF;
        f.carry = k > 0xFF;
        f.parity_overflow = parity((low(k) & 0x07) ^ b);
    }

    /// LD A,I and LD A,R: P/V reports IFF2.
    fn load_special(&mut self, value: u8) {
        self.regs.a = value;
        let iff2 = self.regs.iff2;
        let f = &mut self.regs.f;
        f.handle_szxy(value);
        f.half_carry = false;
        f.subtract = false;
        f.parity_overflow = iff2;
    }

    /// Flags after RRD/RLD.
    fn set_digit_result(&mut self, a: u8) {
        self.regs.a = a;
        let f = &mut self.regs.f;
        f.handle_szxyp(a);
        f.half_carry = false;
        f.subtract = false;
    }

    fn rotate_accumulator(&mut self, op: Shift) {
        self.regs.a = alu::rotate_accumulator(&mut self.regs.f, op, self.regs.a);
    }

    /// Read a relative displacement and return the jump target.
    fn fetch_displaced_target(&mut self) -> u16 {
        let displacement = self.fetch_byte() as i8;
        self.regs.pc.wrapping_add_signed(i16::from(displacement))
    }

    fn condition(&self, cc: Condition) -> bool {
        let f = &self.regs.f;
        match cc {
            Condition::NonZero => !f.zero,
            Condition::Zero => f.zero,
            Condition::NoCarry => !f.carry,
            Condition::Carry => f.carry,
            Condition::ParityOdd => !f.parity_overflow,
            Condition::ParityEven => f.parity_overflow,
            Condition::Positive => !f.sign,
            Condition::Negative => f.sign,
        }
    }

    fn reg(&mut self, r: Reg, at: Addressing) -> u8 {
        match (r, at.halves) {
            (Reg::H, Some(index)) => high(self.regs.index(index)),
            (Reg::L, Some(index)) => low(self.regs.index(index)),
            (Reg::B, _) => self.regs.b,
            (Reg::C, _) => self.regs.c,
            (Reg::D, _) => self.regs.d,
            (Reg::E, _) => self.regs.e,
            (Reg::H, _) => self.regs.h,
            (Reg::L, _) => self.regs.l,
            (Reg::Memory, _) => self.memory.read(at.memory),
            (Reg::A, _) => self.regs.a,
        }
    }

    fn set_reg(&mut self, r: Reg, value: u8, at: Addressing) {
        match (r, at.halves) {
            (Reg::H, Some(index)) => {
                let pair = self.regs.index(index);
                self.regs.set_index(index, (u16::from(value) << 8) | u16::from(low(pair)));
            }
            (Reg::L, Some(index)) => {
                let pair = self.regs.index(index);
                self.regs.set_index(index, (pair & 0xFF00) | u16::from(value));
            }
            (Reg::B, _) => self.regs.b = value,
            (Reg::C, _) => self.regs.c = value,
            (Reg::D, _) => self.regs.d = value,
            (Reg::E, _) => self.regs.e = value,
            (Reg::H, _) => self.regs.h = value,
            (Reg::L, _) => self.regs.l = value,
            (Reg::Memory, _) => self.memory.write(at.memory, value),
            (Reg::A, _) => self.regs.a = value,
        }
    }

    fn pair(&self, rp: RegPair, at: Addressing) -> u16 {
        match (rp, at.pair) {
            (RegPair::Hl, Some(index)) => self.regs.index(index),
            (RegPair::Bc, _) => self.regs.bc(),
            (RegPair::De, _) => self.regs.de(),
            (RegPair::Hl, None) => self.regs.hl(),
            (RegPair::Sp, _) => self.regs.sp,
        }
    }

    fn set_pair(&mut self, rp: RegPair, value: u16, at: Addressing) {
        match (rp, at.pair) {
            (RegPair::Hl, Some(index)) => self.regs.set_index(index, value),
            (RegPair::Bc, _) => self.regs.set_bc(value),
            (RegPair::De, _) => self.regs.set_de(value),
            (RegPair::Hl, None) => self.regs.set_hl(value),
            (RegPair::Sp, _) => self.regs.sp = value,
        }
    }

    fn stack_pair(&self, rp: StackPair, at: Addressing) -> u16 {
        match rp {
            StackPair::Bc => self.regs.bc(),
            StackPair::De => self.regs.de(),
            StackPair::Hl => self.pair(RegPair::Hl, at),
            StackPair::Af => self.regs.af(),
        }
    }

    fn set_stack_pair(&mut self, rp: StackPair, value: u16, at: Addressing) {
        match rp {
            StackPair::Bc => self.regs.set_bc(value),
            StackPair::De => self.regs.set_de(value),
            StackPair::Hl => self.set_pair(RegPair::Hl, value, at),
            StackPair::Af => self.regs.set_af(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use emu_core::{Cpu, FlagRegister, InterruptRequest, Memory};

    use crate::Z80;
    use crate::flags::{CF, HF, NF, PF, XF, YF, ZF};

    /// A running CPU with `program` at 0x0000 in 64 KiB of RAM.
    fn cpu_with(program: &[u8]) -> Z80 {
        let mut ram = vec![0; 0x1_0000];
        ram[..program.len()].copy_from_slice(program);
        let mut cpu = Z80::new(Memory::from(ram), 0);
        cpu.start();
        cpu
    }

    fn step(cpu: &mut Z80) -> u32 {
        cpu.next_instruction().unwrap()
    }

    #[test]
    fn nop_takes_4_cycles() {
        let mut cpu = cpu_with(&[0x00]);
        assert_eq!(step(&mut cpu), 4);
        assert_eq!(cpu.pc(), 1);
        assert_eq!(cpu.registers().r, 1);
    }

    #[test]
    fn ld_hl_immediate_then_memory_store() {
        // LD HL,2000 / LD (HL),5A
        let mut cpu = cpu_with(&[0x21, 0x00, 0x20, 0x36, 0x5A]);
        assert_eq!(step(&mut cpu), 10);
        assert_eq!(step(&mut cpu), 10);
        assert_eq!(cpu.memory().peek(0x2000), 0x5A);
    }

    #[test]
    fn djnz_loops_until_b_is_zero() {
        // LD B,3 / DJNZ -2
        let mut cpu = cpu_with(&[0x06, 0x03, 0x10, 0xFE]);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 13);
        assert_eq!(cpu.pc(), 2);
        assert_eq!(step(&mut cpu), 13);
        assert_eq!(step(&mut cpu), 8);
        assert_eq!(cpu.pc(), 4);
        assert_eq!(cpu.registers().b, 0);
    }

    #[test]
    fn jr_conditions_cost_differently() {
        // XOR A / JR NZ,+2 / JR Z,+2
        let mut cpu = cpu_with(&[0xAF, 0x20, 0x02, 0x28, 0x02]);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 7);
        assert_eq!(cpu.pc(), 3);
        assert_eq!(step(&mut cpu), 12);
        assert_eq!(cpu.pc(), 7);
    }

    #[test]
    fn exchanges_use_the_shadow_set() {
        // LD BC,1234 / EXX / LD BC,5678 / EXX
        let mut cpu = cpu_with(&[0x01, 0x34, 0x12, 0xD9, 0x01, 0x78, 0x56, 0xD9]);
        for _ in 0..4 {
            step(&mut cpu);
        }
        let regs = cpu.registers();
        assert_eq!(regs.bc(), 0x1234);
        assert_eq!(regs.bc_alt(), 0x5678);
    }

    #[test]
    fn ccf_moves_carry_into_half_carry() {
        // SCF / CCF
        let mut cpu = cpu_with(&[0x37, 0x3F]);
        step(&mut cpu);
        step(&mut cpu);
        let f = cpu.registers().f;
        assert!(f.half_carry && !f.carry && !f.subtract);
    }

    #[test]
    fn cpl_sets_half_carry_and_subtract() {
        // LD A,0F / CPL
        let mut cpu = cpu_with(&[0x3E, 0x0F, 0x2F]);
        step(&mut cpu);
        step(&mut cpu);
        let regs = cpu.registers();
        assert_eq!(regs.a, 0xF0);
        assert_eq!(regs.f.to_byte() & (HF | NF | YF | XF), HF | NF | YF);
    }

    #[test]
    fn push_af_pop_bc() {
        // LD SP,0000 / PUSH AF / POP BC
        let mut cpu = cpu_with(&[0x31, 0x00, 0x00, 0xF5, 0xC1]);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 11);
        assert_eq!(step(&mut cpu), 10);
        assert_eq!(cpu.registers().bc(), 0xFFFF);
        assert_eq!(cpu.registers().sp, 0);
    }

    #[test]
    fn indexed_load_uses_displacement_and_keeps_h() {
        // LD IX,2000 / LD (IX-1),42 / LD H,(IX-1)
        let mut cpu = cpu_with(&[
            0xDD, 0x21, 0x00, 0x20, 0xDD, 0x36, 0xFF, 0x42, 0xDD, 0x66, 0xFF,
        ]);
        assert_eq!(step(&mut cpu), 14);
        assert_eq!(step(&mut cpu), 19);
        assert_eq!(cpu.memory().peek(0x1FFF), 0x42);
        assert_eq!(step(&mut cpu), 19);
        let regs = cpu.registers();
        assert_eq!(regs.h, 0x42);
        assert_eq!(regs.ix, 0x2000);
        assert_eq!(cpu.pc(), 11);
    }

    #[test]
    fn index_halves_replace_h_and_l() {
        // LD IY,1234 / LD IYL,IYH / INC IYH
        let mut cpu = cpu_with(&[0xFD, 0x21, 0x34, 0x12, 0xFD, 0x6C, 0xFD, 0x24]);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 8);
        assert_eq!(step(&mut cpu), 8);
        let regs = cpu.registers();
        assert_eq!(regs.iy, 0x1312);
        assert_eq!(regs.hl(), 0);
    }

    #[test]
    fn ex_de_hl_ignores_the_index_prefix() {
        // LD HL,1111 / LD DE,2222 / DD EX DE,HL
        let mut cpu = cpu_with(&[0x21, 0x11, 0x11, 0x11, 0x22, 0x22, 0xDD, 0xEB]);
        step(&mut cpu);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 8);
        let regs = cpu.registers();
        assert_eq!(regs.hl(), 0x2222);
        assert_eq!(regs.de(), 0x1111);
        assert_eq!(regs.ix, 0);
    }

    #[test]
    fn bit_instructions_on_registers_and_memory() {
        // LD A,80 / BIT 7,A / SET 0,(HL) / RES 7,A
        let mut cpu = cpu_with(&[0x3E, 0x80, 0xCB, 0x7F, 0xCB, 0xC6, 0xCB, 0xBF]);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 8);
        assert!(cpu.registers().f.sign);
        assert!(!cpu.registers().f.zero);
        assert_eq!(step(&mut cpu), 15);
        // HL is 0, so the byte at 0 was LD A,n's opcode
        assert_eq!(cpu.memory().peek(0), 0x3F);
        step(&mut cpu);
        assert_eq!(cpu.registers().a, 0);
    }

    #[test]
    fn indexed_rotate_copies_into_a_register() {
        // LD IX,1000 / LD (IX+2),81 / RLC (IX+2),B
        let mut cpu = cpu_with(&[
            0xDD, 0x21, 0x00, 0x10, 0xDD, 0x36, 0x02, 0x81, 0xDD, 0xCB, 0x02, 0x00,
        ]);
        step(&mut cpu);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 23);
        assert_eq!(cpu.memory().peek(0x1002), 0x03);
        assert_eq!(cpu.registers().b, 0x03);
        assert!(cpu.registers().f.carry);
        // Two opcode fetches per instruction
        assert_eq!(cpu.registers().r, 6);
    }

    #[test]
    fn indexed_bit_test_takes_20_cycles() {
        // LD IY,3000 / BIT 0,(IY+0)
        let mut cpu = cpu_with(&[0xFD, 0x21, 0x00, 0x30, 0xFD, 0xCB, 0x00, 0x46]);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 20);
        let f = cpu.registers().f;
        assert!(f.zero);
        // Undocumented bits from the address high byte
        assert!(f.y && !f.x);
    }

    #[test]
    fn memory_bit_test_copies_xy_from_h() {
        // LD HL,2800 / BIT 0,(HL)
        let mut cpu = cpu_with(&[0x21, 0x00, 0x28, 0xCB, 0x46]);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 12);
        let f = cpu.registers().f;
        assert!(f.zero && f.half_carry);
        assert!(f.y && f.x);
    }

    #[test]
    fn sbc_and_adc_hl() {
        // LD HL,1000 / LD DE,0001 / SCF / SBC HL,DE / ADC HL,DE
        let mut cpu = cpu_with(&[
            0x21, 0x00, 0x10, 0x11, 0x01, 0x00, 0x37, 0xED, 0x52, 0xED, 0x5A,
        ]);
        for _ in 0..3 {
            step(&mut cpu);
        }
        assert_eq!(step(&mut cpu), 15);
        assert_eq!(cpu.registers().hl(), 0x0FFE);
        assert!(cpu.registers().f.subtract && cpu.registers().f.half_carry);
        assert_eq!(step(&mut cpu), 15);
        assert_eq!(cpu.registers().hl(), 0x0FFF);
    }

    #[test]
    fn neg_of_0x80_overflows() {
        // LD A,80 / NEG
        let mut cpu = cpu_with(&[0x3E, 0x80, 0xED, 0x44]);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 8);
        let regs = cpu.registers();
        assert_eq!(regs.a, 0x80);
        assert!(regs.f.parity_overflow && regs.f.carry && regs.f.subtract);
    }

    #[test]
    fn ldir_copies_and_rewinds() {
        // LD HL,0100 / LD DE,0200 / LD BC,0002 / LDIR
        let mut cpu = cpu_with(&[
            0x21, 0x00, 0x01, 0x11, 0x00, 0x02, 0x01, 0x02, 0x00, 0xED, 0xB0,
        ]);
        cpu.memory_mut().write(0x0100, 0xAA);
        cpu.memory_mut().write(0x0101, 0xBB);
        for _ in 0..3 {
            step(&mut cpu);
        }
        assert_eq!(step(&mut cpu), 21);
        assert_eq!(cpu.pc(), 9);
        assert!(cpu.registers().f.parity_overflow);
        assert_eq!(step(&mut cpu), 16);
        assert_eq!(cpu.pc(), 11);
        assert_eq!(cpu.memory().peek(0x0200), 0xAA);
        assert_eq!(cpu.memory().peek(0x0201), 0xBB);
        let regs = cpu.registers();
        assert_eq!(regs.bc(), 0);
        assert_eq!(regs.hl(), 0x0102);
        assert_eq!(regs.de(), 0x0202);
        assert!(!regs.f.parity_overflow);
    }

    #[test]
    fn cpir_stops_on_match() {
        // LD HL,0100 / LD BC,0010 / LD A,BB / CPIR
        let mut cpu = cpu_with(&[
            0x21, 0x00, 0x01, 0x01, 0x10, 0x00, 0x3E, 0xBB, 0xED, 0xB1,
        ]);
        cpu.memory_mut().write(0x0100, 0xAA);
        cpu.memory_mut().write(0x0101, 0xBB);
        for _ in 0..3 {
            step(&mut cpu);
        }
        assert_eq!(step(&mut cpu), 21);
        assert_eq!(step(&mut cpu), 16);
        let regs = cpu.registers();
        assert_eq!(regs.hl(), 0x0102);
        assert_eq!(regs.bc(), 0x000E);
        assert!(regs.f.zero && regs.f.parity_overflow);
    }

    #[test]
    fn rld_rotates_nibbles_through_a() {
        // LD HL,0100 / LD A,12 / RLD
        let mut cpu = cpu_with(&[0x21, 0x00, 0x01, 0x3E, 0x12, 0xED, 0x6F]);
        cpu.memory_mut().write(0x0100, 0x34);
        step(&mut cpu);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 18);
        assert_eq!(cpu.registers().a, 0x13);
        assert_eq!(cpu.memory().peek(0x0100), 0x42);
    }

    #[test]
    fn in_c_sets_parity_and_out_c_writes() {
        // LD C,07 / IN B,(C) / OUT (C),B
        let mut cpu = cpu_with(&[0x0E, 0x07, 0xED, 0x40, 0xED, 0x41]);
        cpu.input(7, 0x03);
        step(&mut cpu);
        assert_eq!(step(&mut cpu), 12);
        let regs = cpu.registers();
        assert_eq!(regs.b, 0x03);
        assert_eq!(regs.f.to_byte() & (PF | ZF | CF), PF | CF);
        step(&mut cpu);
        assert_eq!(cpu.output(7), 0x03);
    }

    #[test]
    fn ld_a_i_reports_iff2() {
        // LD A,55 / LD I,A / EI / LD A,I
        let mut cpu = cpu_with(&[0x3E, 0x55, 0xED, 0x47, 0xFB, 0xED, 0x57]);
        for _ in 0..3 {
            step(&mut cpu);
        }
        assert_eq!(step(&mut cpu), 9);
        let regs = cpu.registers();
        assert_eq!(regs.a, 0x55);
        assert!(regs.f.parity_overflow);
    }

    #[test]
    fn im2_calls_through_the_vector_table() {
        // LD A,12 / LD I,A / IM 2 / EI
        let mut cpu = cpu_with(&[0x3E, 0x12, 0xED, 0x47, 0xED, 0x5E, 0xFB]);
        cpu.memory_mut().write(0x1234, 0x00);
        cpu.memory_mut().write(0x1235, 0x40);
        for _ in 0..4 {
            step(&mut cpu);
        }
        cpu.interrupt(InterruptRequest::Opcode(0x34));
        assert_eq!(step(&mut cpu), 19);
        assert_eq!(cpu.pc(), 0x4000);
        assert!(!cpu.registers().iff1 && !cpu.registers().iff2);
    }
}
