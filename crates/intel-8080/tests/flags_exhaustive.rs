//! Accumulator ALU results checked against every operand pair.

use emu_core::{Cpu, FlagRegister, Memory};
use intel_8080::{Flags, I8080};
use proptest::prelude::*;

/// ADD B, ADC B, SUB B, SBB B, ANA B, XRA B, ORA B, CMP B at 0..8.
const ALU_B: [u8; 8] = [0x80, 0x88, 0x90, 0x98, 0xA0, 0xA8, 0xB0, 0xB8];

fn expected(op: usize, a: u8, b: u8, carry: bool) -> (u8, bool) {
    let (a, b) = (u16::from(a), u16::from(b));
    let c = u16::from(carry);
    let wide = match op {
        0 => a + b,
        1 => a + b + c,
        2 | 7 => a.wrapping_sub(b),
        3 => a.wrapping_sub(b).wrapping_sub(c),
        4 => a & b,
        5 => a ^ b,
        _ => a | b,
    };
    (wide as u8, wide > 0xFF)
}

#[test]
fn zero_sign_parity_and_carry_follow_the_result() {
    let mut cpu = I8080::new(Memory::from(ALU_B.to_vec()), 0);
    cpu.start();

    for (op, _) in ALU_B.iter().enumerate() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                for carry in [false, true] {
                    let mut regs = cpu.registers();
                    regs.a = a;
                    regs.b = b;
                    regs.flags = Flags {
                        carry,
                        ..Flags::default()
                    };
                    regs.pc = op as u16;
                    cpu.set_registers(regs);

                    assert_eq!(cpu.next_instruction().unwrap(), 4);

                    let (result, carry_out) = expected(op, a, b, carry);
                    let regs = cpu.registers();
                    let f = regs.flags;
                    let case = format!("op {op} a={a:#04x} b={b:#04x} carry={carry}");
                    if op == 7 {
                        assert_eq!(regs.a, a, "{case}");
                    } else {
                        assert_eq!(regs.a, result, "{case}");
                    }
                    assert_eq!(f.zero, result == 0, "{case}");
                    assert_eq!(f.sign, result & 0x80 != 0, "{case}");
                    assert_eq!(f.parity, result.count_ones() % 2 == 0, "{case}");
                    assert_eq!(f.carry, carry_out, "{case}");
                    assert_eq!(f.to_byte() & 0b0010_1010, 0b0000_0010, "{case}");
                }
            }
        }
    }
}

fn stack_cpu() -> I8080 {
    // PUSH B / POP D / PUSH PSW / POP H
    let mut ram = vec![0; 0x1_0000];
    ram[..4].copy_from_slice(&[0xC5, 0xD1, 0xF5, 0xE1]);
    let mut cpu = I8080::new(Memory::from(ram), 0);
    cpu.start();
    cpu
}

proptest! {
    #[test]
    fn push_then_pop_moves_the_pair(bc: u16, sp in 0x0100u16..=0xFFFF) {
        let mut cpu = stack_cpu();
        let mut regs = cpu.registers();
        regs.set_bc(bc);
        regs.sp = sp;
        cpu.set_registers(regs);

        cpu.next_instruction().unwrap();
        cpu.next_instruction().unwrap();

        let regs = cpu.registers();
        prop_assert_eq!(regs.de(), bc);
        prop_assert_eq!(regs.sp, sp);
    }

    #[test]
    fn psw_goes_through_the_stack_with_fixed_bits(a: u8, f: u8) {
        let mut cpu = stack_cpu();
        let mut regs = cpu.registers();
        regs.pc = 2;
        regs.sp = 0x8000;
        regs.set_psw(u16::from_be_bytes([a, f]));
        cpu.set_registers(regs);

        cpu.next_instruction().unwrap();
        cpu.next_instruction().unwrap();

        let regs = cpu.registers();
        prop_assert_eq!(regs.h, a);
        prop_assert_eq!(regs.l, (f & 0xD5) | 0x02);
    }
}
