//! Single-instruction test vectors in the `SingleStepTests` JSON shape.
//!
//! Each case lists the initial machine state, the state after exactly one
//! instruction, and the expected cycle count. Registers a case leaves out
//! are zero on both sides. Only the RAM cells named in `final` are compared.

use emu_core::{Cpu, FlagRegister, Memory};
use serde::Deserialize;
use zilog_z80::{Flags, Registers, Z80};

#[derive(Deserialize)]
struct TestCase {
    name: String,
    initial: CpuState,
    #[serde(rename = "final")]
    final_state: CpuState,
    cycles: u32,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CpuState {
    pc: u16,
    sp: u16,
    a: u8,
    b: u8,
    c: u8,
    d: u8,
    e: u8,
    f: u8,
    h: u8,
    l: u8,
    i: u8,
    r: u8,
    ix: u16,
    iy: u16,
    iff1: bool,
    iff2: bool,
    ram: Vec<(u16, u8)>,
}

impl CpuState {
    fn registers(&self) -> Registers {
        Registers {
            a: self.a,
            f: Flags::from_byte(self.f),
            b: self.b,
            c: self.c,
            d: self.d,
            e: self.e,
            h: self.h,
            l: self.l,
            ix: self.ix,
            iy: self.iy,
            sp: self.sp,
            pc: self.pc,
            i: self.i,
            r: self.r,
            iff1: self.iff1,
            iff2: self.iff2,
            ..Registers::default()
        }
    }
}

const VECTORS: &str = r#"[
  {
    "name": "80 ADD A,B overflows into the sign bit",
    "initial": { "pc": 256, "a": 127, "b": 1, "r": 127, "ram": [[256, 128]] },
    "final":   { "pc": 257, "a": 128, "b": 1, "f": 148, "r": 0 },
    "cycles": 4
  },
  {
    "name": "ed 44 NEG",
    "initial": { "a": 1, "ram": [[0, 237], [1, 68]] },
    "final":   { "pc": 2, "a": 255, "f": 187, "r": 2 },
    "cycles": 8
  },
  {
    "name": "dd 86 05 ADD A,(IX+5)",
    "initial": { "a": 32, "ix": 4096, "ram": [[0, 221], [1, 134], [2, 5], [4101, 16]] },
    "final":   { "pc": 3, "a": 48, "ix": 4096, "f": 32, "r": 2 },
    "cycles": 19
  },
  {
    "name": "cb 38 SRL B",
    "initial": { "b": 1, "ram": [[0, 203], [1, 56]] },
    "final":   { "pc": 2, "f": 69, "r": 2 },
    "cycles": 8
  },
  {
    "name": "ed b0 LDIR moving its last byte",
    "initial": { "c": 1, "d": 48, "h": 32, "f": 1, "ram": [[0, 237], [1, 176], [8192, 85]] },
    "final":   { "pc": 2, "d": 48, "e": 1, "h": 32, "l": 1, "f": 1, "r": 2, "ram": [[12288, 85]] },
    "cycles": 16
  },
  {
    "name": "ed 52 SBC HL,DE borrows into bit 12",
    "initial": { "h": 16, "e": 1, "f": 1, "ram": [[0, 237], [1, 82]] },
    "final":   { "pc": 2, "h": 15, "l": 254, "e": 1, "f": 26, "r": 2 },
    "cycles": 15
  },
  {
    "name": "ed 4a ADC HL,BC overflows into the sign bit",
    "initial": { "h": 127, "l": 255, "c": 1, "ram": [[0, 237], [1, 74]] },
    "final":   { "pc": 2, "h": 128, "c": 1, "f": 148, "r": 2 },
    "cycles": 15
  },
  {
    "name": "e3 EX (SP),HL",
    "initial": { "sp": 16384, "h": 171, "l": 205, "ram": [[0, 227], [16384, 52], [16385, 18]] },
    "final":   { "pc": 1, "sp": 16384, "h": 18, "l": 52, "r": 1,
                 "ram": [[16384, 205], [16385, 171]] },
    "cycles": 19
  },
  {
    "name": "10 fe DJNZ to itself",
    "initial": { "pc": 256, "b": 2, "ram": [[256, 16], [257, 254]] },
    "final":   { "pc": 256, "b": 1, "r": 1 },
    "cycles": 13
  },
  {
    "name": "ed 5f LD A,R sees both refreshes",
    "initial": { "r": 64, "iff1": true, "iff2": true, "ram": [[0, 237], [1, 95]] },
    "final":   { "pc": 2, "a": 66, "f": 4, "r": 66, "iff1": true, "iff2": true },
    "cycles": 9
  }
]"#;

fn run_case(case: &TestCase) -> Vec<String> {
    let mut ram = vec![0; 0x1_0000];
    for &(address, value) in &case.initial.ram {
        ram[usize::from(address)] = value;
    }
    let mut cpu = Z80::new(Memory::from(ram), case.initial.pc);
    cpu.set_registers(case.initial.registers());
    cpu.start();

    let mut errors = Vec::new();
    let cycles = cpu.next_instruction().unwrap();
    if cycles != case.cycles {
        errors.push(format!("cycles: got {cycles}, want {}", case.cycles));
    }

    let got = cpu.registers();
    let want = case.final_state.registers();
    if got != want {
        errors.push(format!("registers: got {got:?}, want {want:?}"));
    }
    for &(address, value) in &case.final_state.ram {
        let actual = cpu.memory().peek(address);
        if actual != value {
            errors.push(format!(
                "ram[{address:#06x}]: got {actual:#04x}, want {value:#04x}"
            ));
        }
    }
    errors
}

#[test]
fn single_step_vectors() {
    let cases: Vec<TestCase> = serde_json::from_str(VECTORS).unwrap();
    let mut failures = Vec::new();
    for case in &cases {
        let errors = run_case(case);
        if !errors.is_empty() {
            failures.push(format!("{}: {}", case.name, errors.join("; ")));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}
