//! Accumulator ALU results checked against every operand pair.

use emu_core::{Cpu, FlagRegister, Memory};
use proptest::prelude::*;
use zilog_z80::{Flags, Z80};

/// ADD A,B through CP B at 0..8.
const ALU_B: [u8; 8] = [0x80, 0x88, 0x90, 0x98, 0xA0, 0xA8, 0xB0, 0xB8];

struct Expected {
    result: u8,
    carry: bool,
    half_carry: bool,
    parity_overflow: bool,
    subtract: bool,
}

fn expected(op: usize, a: u8, b: u8, carry: bool) -> Expected {
    let c = i16::from(carry);
    let signed = |v: u8| i16::from(v as i8);
    let (wide, half_carry, overflow) = match op {
        0 | 1 => {
            let c = if op == 1 { c } else { 0 };
            let wide = i16::from(a) + i16::from(b) + c;
            let half = i16::from(a & 0x0F) + i16::from(b & 0x0F) + c > 0x0F;
            let sum = signed(a) + signed(b) + c;
            (wide, half, !(-128..=127).contains(&sum))
        }
        2 | 3 | 7 => {
            let c = if op == 3 { c } else { 0 };
            let wide = i16::from(a) - i16::from(b) - c;
            let half = i16::from(a & 0x0F) - i16::from(b & 0x0F) - c < 0;
            let difference = signed(a) - signed(b) - c;
            (wide, half, !(-128..=127).contains(&difference))
        }
        4 => (i16::from(a & b), true, false),
        5 => (i16::from(a ^ b), false, false),
        _ => (i16::from(a | b), false, false),
    };
    let result = wide as u8;
    let logic = (4..=6).contains(&op);

    Expected {
        result,
        carry: !(0..=0xFF).contains(&wide),
        half_carry,
        parity_overflow: if logic {
            result.count_ones() % 2 == 0
        } else {
            overflow
        },
        subtract: matches!(op, 2 | 3 | 7),
    }
}

#[test]
fn every_flag_follows_the_result() {
    let mut cpu = Z80::new(Memory::from(ALU_B.to_vec()), 0);
    cpu.start();

    for op in 0..ALU_B.len() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                for carry in [false, true] {
                    let mut regs = cpu.registers();
                    regs.a = a;
                    regs.b = b;
                    regs.f = Flags {
                        carry,
                        ..Flags::default()
                    };
                    regs.pc = op as u16;
                    cpu.set_registers(regs);

                    assert_eq!(cpu.next_instruction().unwrap(), 4);

                    let want = expected(op, a, b, carry);
                    let regs = cpu.registers();
                    let f = regs.f;
                    let case = format!("op {op} a={a:#04x} b={b:#04x} carry={carry}");
                    let xy_source = if op == 7 {
                        assert_eq!(regs.a, a, "{case}");
                        b
                    } else {
                        assert_eq!(regs.a, want.result, "{case}");
                        want.result
                    };
                    assert_eq!(f.zero, want.result == 0, "{case}");
                    assert_eq!(f.sign, want.result & 0x80 != 0, "{case}");
                    assert_eq!(f.carry, want.carry, "{case}");
                    assert_eq!(f.half_carry, want.half_carry, "{case}");
                    assert_eq!(f.parity_overflow, want.parity_overflow, "{case}");
                    assert_eq!(f.subtract, want.subtract, "{case}");
                    assert_eq!(f.to_byte() & 0x28, xy_source & 0x28, "{case}");
                }
            }
        }
    }
}

fn cpu_with(program: &[u8]) -> Z80 {
    let mut ram = vec![0; 0x1_0000];
    ram[..program.len()].copy_from_slice(program);
    let mut cpu = Z80::new(Memory::from(ram), 0);
    cpu.start();
    cpu
}

proptest! {
    #[test]
    fn push_then_pop_moves_the_pair(bc in any::<u16>(), sp in 0x1000u16..0xF000) {
        // PUSH BC / POP DE
        let mut cpu = cpu_with(&[0xC5, 0xD1]);
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
    fn every_flag_byte_survives_the_stack(f in any::<u8>()) {
        // PUSH AF / POP HL
        let mut cpu = cpu_with(&[0xF5, 0xE1]);
        let mut regs = cpu.registers();
        regs.f = Flags::from_byte(f);
        regs.sp = 0x8000;
        cpu.set_registers(regs);

        cpu.next_instruction().unwrap();
        cpu.next_instruction().unwrap();

        prop_assert_eq!(cpu.registers().l, f);
    }

    #[test]
    fn ex_af_twice_restores_both_sets(af in any::<u16>(), alt in any::<u16>()) {
        let mut cpu = cpu_with(&[0x08, 0x08]);
        let mut regs = cpu.registers();
        regs.set_af(af);
        regs.a_alt = (alt >> 8) as u8;
        regs.f_alt = Flags::from_byte(alt as u8);
        cpu.set_registers(regs);

        cpu.next_instruction().unwrap();
        prop_assert_eq!(cpu.registers().af(), alt);
        cpu.next_instruction().unwrap();
        prop_assert_eq!(cpu.registers().af(), af);
        prop_assert_eq!(cpu.registers().af_alt(), alt);
    }
}
