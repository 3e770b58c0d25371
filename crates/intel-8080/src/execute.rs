//! Instruction semantics.

use emu_core::bits::carried_out_of;

use crate::cpu::I8080;
use crate::instruction::{AluOp, Condition, Instruction, Reg, RegPair, StackPair};

impl I8080 {
    /// Execute a decoded instruction whose opcode has already been fetched.
    /// Returns the cycle count.
    pub(crate) fn execute(&mut self, instruction: Instruction) -> u32 {
        let mut taken = true;

        match instruction {
            Instruction::Nop => {}

            // Register pairs
            Instruction::Lxi(rp) => {
                let value = self.fetch_word();
                self.set_pair(rp, value);
            }
            Instruction::Dad(rp) => {
                let hl = self.regs.hl();
                let value = self.pair(rp);
                self.regs.flags.carry = carried_out_of(15, hl, value, false);
                self.regs.set_hl(hl.wrapping_add(value));
            }
            Instruction::Inx(rp) => {
                let value = self.pair(rp).wrapping_add(1);
                self.set_pair(rp, value);
            }
            Instruction::Dcx(rp) => {
                let value = self.pair(rp).wrapping_sub(1);
                self.set_pair(rp, value);
            }

            // Loads and stores
            Instruction::Stax(rp) => {
                let address = self.pair(rp);
                self.memory.write(address, self.regs.a);
            }
            Instruction::Ldax(rp) => {
                let address = self.pair(rp);
                self.regs.a = self.memory.read(address);
            }
            Instruction::Shld => {
                let address = self.fetch_word();
                self.write_word(address, self.regs.hl());
            }
            Instruction::Lhld => {
                let address = self.fetch_word();
                let value = self.read_word(address);
                self.regs.set_hl(value);
            }
            Instruction::Sta => {
                let address = self.fetch_word();
                self.memory.write(address, self.regs.a);
            }
            Instruction::Lda => {
                let address = self.fetch_word();
                self.regs.a = self.memory.read(address);
            }
            Instruction::Mvi(r) => {
                let value = self.fetch_byte();
                self.set_reg(r, value);
            }
            Instruction::Mov(dst, src) => {
                let value = self.reg(src);
                self.set_reg(dst, value);
            }

            // INR/DCR leave carry alone
            Instruction::Inr(r) => {
                let result = self.reg(r).wrapping_add(1);
                self.set_reg(r, result);
                let flags = &mut self.regs.flags;
                flags.handle_zsp(result);
                flags.aux_carry = result & 0x0F == 0;
            }
            Instruction::Dcr(r) => {
                let result = self.reg(r).wrapping_sub(1);
                self.set_reg(r, result);
                let flags = &mut self.regs.flags;
                flags.handle_zsp(result);
                flags.aux_carry = result & 0x0F != 0x0F;
            }

            // Accumulator rotates only touch carry
            Instruction::Rlc => {
                let a = self.regs.a;
                self.regs.flags.carry = a & 0x80 != 0;
                self.regs.a = a.rotate_left(1);
            }
            Instruction::Rrc => {
                let a = self.regs.a;
                self.regs.flags.carry = a & 0x01 != 0;
                self.regs.a = a.rotate_right(1);
            }
            Instruction::Ral => {
                let a = self.regs.a;
                let carry_in = u8::from(self.regs.flags.carry);
                self.regs.flags.carry = a & 0x80 != 0;
                self.regs.a = (a << 1) | carry_in;
            }
            Instruction::Rar => {
                let a = self.regs.a;
                let carry_in = u8::from(self.regs.flags.carry) << 7;
                self.regs.flags.carry = a & 0x01 != 0;
                self.regs.a = (a >> 1) | carry_in;
            }
            Instruction::Daa => self.daa(),
            Instruction::Cma => self.regs.a = !self.regs.a,
            Instruction::Stc => self.regs.flags.carry = true,
            Instruction::Cmc => self.regs.flags.carry = !self.regs.flags.carry,

            // Accumulator arithmetic and logic
            Instruction::Alu(op, r) => {
                let value = self.reg(r);
                self.alu(op, value);
            }
            Instruction::AluImmediate(op) => {
                let value = self.fetch_byte();
                self.alu(op, value);
            }

            // Control flow
            Instruction::Jmp => self.regs.pc = self.fetch_word(),
            Instruction::JmpIf(cc) => {
                let target = self.fetch_word();
                if self.condition(cc) {
                    self.regs.pc = target;
                }
            }
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
            Instruction::Pchl => self.regs.pc = self.regs.hl(),

            // Stack
            Instruction::Push(rp) => {
                let value = self.stack_pair(rp);
                self.push(value);
            }
            Instruction::Pop(rp) => {
                let value = self.pop();
                self.set_stack_pair(rp, value);
            }
            Instruction::Sphl => self.regs.sp = self.regs.hl(),
            Instruction::Xthl => {
                let sp = self.regs.sp;
                let top = self.read_word(sp);
                self.write_word(sp, self.regs.hl());
                self.regs.set_hl(top);
            }
            Instruction::Xchg => {
                let de = self.regs.de();
                self.regs.set_de(self.regs.hl());
                self.regs.set_hl(de);
            }

            // I/O and machine control
            Instruction::Out => {
                let port = self.fetch_byte();
                self.io.write(port, self.regs.a);
            }
            Instruction::In => {
                let port = self.fetch_byte();
                self.regs.a = self.io.read(port);
            }
            Instruction::Ei => self.regs.inte = true,
            Instruction::Di => self.regs.inte = false,
            Instruction::Hlt => {
                tracing::debug!(pc = self.regs.pc, "8080 halted");
                self.regs.halted = true;
            }
        }

        instruction.cycles(taken)
    }

    fn call(&mut self, target: u16) {
        self.push(self.regs.pc);
        self.regs.pc = target;
    }

    fn alu(&mut self, op: AluOp, value: u8) {
        let a = self.regs.a;
        let carry = self.regs.flags.carry;
        let flags = &mut self.regs.flags;

        let result = match op {
            AluOp::Add | AluOp::Adc => {
                let carry = op == AluOp::Adc && carry;
                flags.handle_carry(a, value, carry);
                flags.handle_aux_carry(a, value, carry);
                a.wrapping_add(value).wrapping_add(u8::from(carry))
            }
            AluOp::Sub | AluOp::Sbb | AluOp::Cmp => {
                let borrow = op == AluOp::Sbb && carry;
                flags.handle_borrow(a, value, borrow);
                flags.handle_aux_borrow(a, value, borrow);
                a.wrapping_sub(value).wrapping_sub(u8::from(borrow))
            }
            AluOp::Ana => {
                flags.carry = false;
                flags.aux_carry = (a | value) & 0x08 != 0;
                a & value
            }
            AluOp::Xra => {
                flags.carry = false;
                flags.aux_carry = false;
                a ^ value
            }
            AluOp::Ora => {
                flags.carry = false;
                flags.aux_carry = false;
                a | value
            }
        };

        flags.handle_zsp(result);
        if op != AluOp::Cmp {
            self.regs.a = result;
        }
    }

    fn daa(&mut self) {
        let a = self.regs.a;
        let lsb = a & 0x0F;
        let msb = a >> 4;
        let mut correction = 0;
        let mut carry = self.regs.flags.carry;

        if self.regs.flags.aux_carry || lsb > 9 {
            correction |= 0x06;
        }
        if carry || msb > 9 || (msb >= 9 && lsb > 9) {
            correction |= 0x60;
            carry = true;
        }

        let result = a.wrapping_add(correction);
        let flags = &mut self.regs.flags;
        flags.handle_aux_carry(a, correction, false);
        flags.handle_zsp(result);
        flags.carry = carry;
        self.regs.a = result;
    }

    fn condition(&self, cc: Condition) -> bool {
        let f = &self.regs.flags;
        match cc {
            Condition::NotZero => !f.zero,
            Condition::Zero => f.zero,
            Condition::NoCarry => !f.carry,
            Condition::Carry => f.carry,
            Condition::ParityOdd => !f.parity,
            Condition::ParityEven => f.parity,
            Condition::Plus => !f.sign,
            Condition::Minus => f.sign,
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
            Reg::M => self.memory.read(self.regs.hl()),
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
            Reg::M => self.memory.write(self.regs.hl(), value),
            Reg::A => self.regs.a = value,
        }
    }

    fn pair(&self, rp: RegPair) -> u16 {
        match rp {
            RegPair::B => self.regs.bc(),
            RegPair::D => self.regs.de(),
            RegPair::H => self.regs.hl(),
            RegPair::Sp => self.regs.sp,
        }
    }

    fn set_pair(&mut self, rp: RegPair, value: u16) {
        match rp {
            RegPair::B => self.regs.set_bc(value),
            RegPair::D => self.regs.set_de(value),
            RegPair::H => self.regs.set_hl(value),
            RegPair::Sp => self.regs.sp = value,
        }
    }

    fn stack_pair(&self, rp: StackPair) -> u16 {
        match rp {
            StackPair::B => self.regs.bc(),
            StackPair::D => self.regs.de(),
            StackPair::H => self.regs.hl(),
            StackPair::Psw => self.regs.psw(),
        }
    }

    fn set_stack_pair(&mut self, rp: StackPair, value: u16) {
        match rp {
            StackPair::B => self.regs.set_bc(value),
            StackPair::D => self.regs.set_de(value),
            StackPair::H => self.regs.set_hl(value),
            StackPair::Psw => self.regs.set_psw(value),
        }
    }
}
