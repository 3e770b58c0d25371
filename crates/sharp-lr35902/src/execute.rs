//! Instruction semantics.

use emu_core::bits::carried_out_of;

use crate::cpu::Lr35902;
use crate::flags::Flags;
use crate::instruction::{
    AluOp, BitInstruction, Condition, Indirect, Instruction, Reg, RegPair, Shift, StackPair,
};

/// Base of the high page reached by `LDH` and `LD (C),A`.
const HIGH_PAGE: u16 = 0xFF00;

impl Lr35902 {
    /// Execute a decoded base-table instruction whose opcode has already
    /// been fetched. Returns the cycle count.
    pub(crate) fn execute(&mut self, instruction: Instruction) -> u32 {
        let mut taken = true;

        match instruction {
            Instruction::Nop => {}

            // 16-bit loads and arithmetic
            Instruction::LdPair(rp) => {
                let value = self.fetch_word();
                self.set_pair(rp, value);
            }
            Instruction::StoreSp => {
                let address = self.fetch_word();
                self.write_word(address, self.regs.sp);
            }
            Instruction::AddHl(rp) => {
                let hl = self.regs.hl();
                let value = self.pair(rp);
                let f = &mut self.regs.f;
                f.subtract = false;
                f.half_carry = carried_out_of(11, hl, value, false);
                f.carry = carried_out_of(15, hl, value, false);
                self.regs.set_hl(hl.wrapping_add(value));
            }
            Instruction::IncPair(rp) => {
                let value = self.pair(rp).wrapping_add(1);
                self.set_pair(rp, value);
            }
            Instruction::DecPair(rp) => {
                let value = self.pair(rp).wrapping_sub(1);
                self.set_pair(rp, value);
            }
            Instruction::AddSp => {
                let offset = self.fetch_byte();
                self.regs.sp = self.offset_sp(offset);
            }
            Instruction::LdHlSp => {
                let offset = self.fetch_byte();
                let value = self.offset_sp(offset);
                self.regs.set_hl(value);
            }
            Instruction::LdSpHl => self.regs.sp = self.regs.hl(),

            // 8-bit loads
            Instruction::StoreA(ind) => {
                let address = self.indirect(ind);
                self.memory.write(address, self.regs.a);
            }
            Instruction::LoadA(ind) => {
                let address = self.indirect(ind);
                self.regs.a = self.memory.read(address);
            }
            Instruction::LdImmediate(r) => {
                let value = self.fetch_byte();
                self.set_reg(r, value);
            }
            Instruction::Ld(dst, src) => {
                let value = self.reg(src);
                self.set_reg(dst, value);
            }
            Instruction::StoreHigh => {
                let offset = self.fetch_byte();
                self.memory.write(HIGH_PAGE | u16::from(offset), self.regs.a);
            }
            Instruction::LoadHigh => {
                let offset = self.fetch_byte();
                self.regs.a = self.memory.read(HIGH_PAGE | u16::from(offset));
            }
            Instruction::StoreHighC => {
                let address = HIGH_PAGE | u16::from(self.regs.c);
                self.memory.write(address, self.regs.a);
            }
            Instruction::LoadHighC => {
                let address = HIGH_PAGE | u16::from(self.regs.c);
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

            // INC/DEC leave carry alone
            Instruction::Inc(r) => {
                let result = self.reg(r).wrapping_add(1);
                self.set_reg(r, result);
                let f = &mut self.regs.f;
                f.handle_zero(result);
                f.subtract = false;
                f.half_carry = result & 0x0F == 0;
            }
            Instruction::Dec(r) => {
                let result = self.reg(r).wrapping_sub(1);
                self.set_reg(r, result);
                let f = &mut self.regs.f;
                f.handle_zero(result);
                f.subtract = true;
                f.half_carry = result & 0x0F == 0x0F;
            }

            // Accumulator rotates always clear Z
            Instruction::Rlca => self.rotate_accumulator(Shift::Rlc),
            Instruction::Rrca => self.rotate_accumulator(Shift::Rrc),
            Instruction::Rla => self.rotate_accumulator(Shift::Rl),
            Instruction::Rra => self.rotate_accumulator(Shift::Rr),
            Instruction::Daa => self.daa(),
            Instruction::Cpl => {
                self.regs.a = !self.regs.a;
                self.regs.f.subtract = true;
                self.regs.f.half_carry = true;
            }
            Instruction::Scf => {
                let f = &mut self.regs.f;
                f.subtract = false;
                f.half_carry = false;
                f.carry = true;
            }
            Instruction::Ccf => {
                let f = &mut self.regs.f;
                f.subtract = false;
                f.half_carry = false;
                f.carry = !f.carry;
            }

            Instruction::Alu(op, r) => {
                let value = self.reg(r);
                self.alu(op, value);
            }
            Instruction::AluImmediate(op) => {
                let value = self.fetch_byte();
                self.alu(op, value);
            }

            // Control flow
            Instruction::Jr => {
                let offset = self.fetch_byte();
                self.jump_relative(offset);
            }
            Instruction::JrIf(cc) => {
                let offset = self.fetch_byte();
                taken = self.condition(cc);
                if taken {
                    self.jump_relative(offset);
                }
            }
            Instruction::Jp => self.regs.pc = self.fetch_word(),
            Instruction::JpIf(cc) => {
                let target = self.fetch_word();
                taken = self.condition(cc);
                if taken {
                    self.regs.pc = target;
                }
            }
            Instruction::JpHl => self.regs.pc = self.regs.hl(),
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
            Instruction::Reti => {
                self.regs.pc = self.pop();
                self.regs.ime = true;
            }
            Instruction::Rst(n) => self.call(u16::from(n) * 8),

            // Stack
            Instruction::Push(rp) => {
                let value = self.stack_pair(rp);
                self.push(value);
            }
            Instruction::Pop(rp) => {
                let value = self.pop();
                self.set_stack_pair(rp, value);
            }

            // Machine control
            Instruction::Di => self.regs.ime = false,
            Instruction::Ei => self.regs.ime = true,
            Instruction::Halt => {
                tracing::debug!(pc = self.regs.pc, "LR35902 halted");
                self.regs.halted = true;
            }
            Instruction::Stop => {
                // The byte after STOP is skipped
                self.fetch_byte();
                tracing::debug!(pc = self.regs.pc, "LR35902 stopped by STOP");
                self.regs.halted = true;
            }

            // Resolved by the dispatcher
            Instruction::Prefix => {}
        }

        instruction.cycles(taken)
    }

    /// Execute an instruction from the `CB` page.
    pub(crate) fn execute_bits(&mut self, instruction: BitInstruction) -> u32 {
        match instruction {
            BitInstruction::Shift(op, r) => {
                let value = self.reg(r);
                let result = self.shift(op, value);
                self.set_reg(r, result);
            }
            BitInstruction::Bit(bit, r) => {
                let value = self.reg(r);
                let f = &mut self.regs.f;
                f.zero = value & (1 << bit) == 0;
                f.subtract = false;
                f.half_carry = true;
            }
            BitInstruction::Res(bit, r) => {
                let value = self.reg(r) & !(1 << bit);
                self.set_reg(r, value);
            }
            BitInstruction::Set(bit, r) => {
                let value = self.reg(r) | (1 << bit);
                self.set_reg(r, value);
            }
        }
        instruction.cycles()
    }

    fn alu(&mut self, op: AluOp, value: u8) {
        let a = self.regs.a;
        let carry = self.regs.f.carry;
        let f = &mut self.regs.f;

        let result = match op {
            AluOp::Add | AluOp::Adc => {
                let carry = op == AluOp::Adc && carry;
                f.handle_carry(a, value, carry);
                f.handle_half_carry(a, value, carry);
                f.subtract = false;
                a.wrapping_add(value).wrapping_add(u8::from(carry))
            }
            AluOp::Sub | AluOp::Sbc | AluOp::Cp => {
                let borrow = op == AluOp::Sbc && carry;
                f.handle_borrow(a, value, borrow);
                f.handle_half_borrow(a, value, borrow);
                f.subtract = true;
                a.wrapping_sub(value).wrapping_sub(u8::from(borrow))
            }
            AluOp::And => {
                *f = Flags {
                    half_carry: true,
                    ..Flags::default()
                };
                a & value
            }
            AluOp::Xor => {
                *f = Flags::default();
                a ^ value
            }
            AluOp::Or => {
                *f = Flags::default();
                a | value
            }
        };

        f.handle_zero(result);
        if op != AluOp::Cp {
            self.regs.a = result;
        }
    }

    /// Rotate or shift `value`, setting Z from the result and C from the
    /// bit shifted out. N and H are cleared.
    fn shift(&mut self, op: Shift, value: u8) -> u8 {
        let carry_in = u8::from(self.regs.f.carry);
        let (result, carry) = match op {
            Shift::Rlc => (value.rotate_left(1), value & 0x80 != 0),
            Shift::Rrc => (value.rotate_right(1), value & 0x01 != 0),
            Shift::Rl => ((value << 1) | carry_in, value & 0x80 != 0),
            Shift::Rr => ((value >> 1) | (carry_in << 7), value & 0x01 != 0),
            Shift::Sla => (value << 1, value & 0x80 != 0),
            Shift::Sra => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
            Shift::Swap => (value.rotate_left(4), false),
            Shift::Srl => (value >> 1, value & 0x01 != 0),
        };
        self.regs.f = Flags {
            zero: result == 0,
            carry,
            ..Flags::default()
        };
        result
    }

    fn rotate_accumulator(&mut self, op: Shift) {
        self.regs.a = self.shift(op, self.regs.a);
        self.regs.f.zero = false;
    }

    /// Decimal adjust after an addition or a subtraction, as recorded by N.
    fn daa(&mut self) {
        let mut a = self.regs.a;
        let f = self.regs.f;
        let mut carry = f.carry;

        if f.subtract {
            if f.carry {
                a = a.wrapping_sub(0x60);
            }
            if f.half_carry {
                a = a.wrapping_sub(0x06);
            }
        } else {
            if f.carry || a > 0x99 {
                a = a.wrapping_add(0x60);
                carry = true;
            }
            if f.half_carry || a & 0x0F > 0x09 {
                a = a.wrapping_add(0x06);
            }
        }

        let f = &mut self.regs.f;
        f.handle_zero(a);
        f.half_carry = false;
        f.carry = carry;
        self.regs.a = a;
    }

    /// SP plus a signed byte. H and C come from the unsigned add of the low
    /// byte; Z and N are cleared.
    fn offset_sp(&mut self, offset: u8) -> u16 {
        let sp = self.regs.sp;
        let value = u16::from(offset);
        self.regs.f = Flags {
            half_carry: carried_out_of(3, sp, value, false),
            carry: carried_out_of(7, sp, value, false),
            ..Flags::default()
        };
        sp.wrapping_add_signed(i16::from(offset as i8))
    }

    fn jump_relative(&mut self, offset: u8) {
        self.regs.pc = self.regs.pc.wrapping_add_signed(i16::from(offset as i8));
    }

    /// The address for an accumulator load or store, stepping HL for the
    /// `(HL+)`/`(HL-)` forms.
    fn indirect(&mut self, ind: Indirect) -> u16 {
        match ind {
            Indirect::Bc => self.regs.bc(),
            Indirect::De => self.regs.de(),
            Indirect::HlIncrement => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                hl
            }
            Indirect::HlDecrement => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                hl
            }
        }
    }

    fn condition(&self, cc: Condition) -> bool {
        let f = &self.regs.f;
        match cc {
            Condition::NotZero => !f.zero,
            Condition::Zero => f.zero,
            Condition::NoCarry => !f.carry,
            Condition::Carry => f.carry,
        }
    }

    fn reg(&mut self, r: Reg) -> u8 {
        match r {
            Reg::B => self.regs.b,
            Reg::C => self.regs.c,
            Reg::D => self.regs.d,
            Reg::E => self.regs.e,
            Reg::H => self.regs.h,
            Reg::L => self.regs.l,
            Reg::Memory => self.memory.read(self.regs.hl()),
            Reg::A => self.regs.a,
        }
    }

    fn set_reg(&mut self, r: Reg, value: u8) {
        match r {
            Reg::B => self.regs.b = value,
            Reg::C => self.regs.c = value,
            Reg::D => self.regs.d = value,
            Reg::E => self.regs.e = value,
            Reg::H => self.regs.h = value,
            Reg::L => self.regs.l = value,
            Reg::Memory => self.memory.write(self.regs.hl(), value),
            Reg::A => self.regs.a = value,
        }
    }

    fn pair(&self, rp: RegPair) -> u16 {
        match rp {
            RegPair::Bc => self.regs.bc(),
            RegPair::De => self.regs.de(),
            RegPair::Hl => self.regs.hl(),
            RegPair::Sp => self.regs.sp,
        }
    }

    fn set_pair(&mut self, rp: RegPair, value: u16) {
        match rp {
            RegPair::Bc => self.regs.set_bc(value),
            RegPair::De => self.regs.set_de(value),
            RegPair::Hl => self.regs.set_hl(value),
            RegPair::Sp => self.regs.sp = value,
        }
    }

    fn stack_pair(&self, rp: StackPair) -> u16 {
        match rp {
            StackPair::Bc => self.regs.bc(),
            StackPair::De => self.regs.de(),
            StackPair::Hl => self.regs.hl(),
            StackPair::Af => self.regs.af(),
        }
    }

    fn set_stack_pair(&mut self, rp: StackPair, value: u16) {
        match rp {
            StackPair::Bc => self.regs.set_bc(value),
            StackPair::De => self.regs.set_de(value),
            StackPair::Hl => self.regs.set_hl(value),
            StackPair::Af => self.regs.set_af(value),
        }
    }
}
