//! Single-instruction test vectors in the `SingleStepTests` JSON shape.
//!
//! Each case lists the initial machine state, the state after exactly one
//! instruction, and the expected cycle count. Registers a case leaves out
//! are zero on both sides. Only the RAM cells named in `final` are compared.

use emu_core::{Cpu, FlagRegister, Memory};
use serde::Deserialize;
use sharp_lr35902::{Flags, Lr35902, Registers};

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
    ime: bool,
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
            sp: self.sp,
            pc: self.pc,
            ime: self.ime,
            halted: false,
        }
    }
}

const VECTORS: &str = r#"[
  {
    "name": "80 ADD A,B carries out of the low nibble",
    "initial": { "pc": 256, "a": 15, "b": 1, "ram": [[256, 128]] },
    "final":   { "pc": 257, "a": 16, "b": 1, "f": 32 },
    "cycles": 4
  },
  {
    "name": "e8 ff ADD SP,-1",
    "initial": { "sp": 4351, "ram": [[0, 232], [1, 255]] },
    "final":   { "pc": 2, "sp": 4350, "f": 48 },
    "cycles": 16
  },
  {
    "name": "f8 02 LD HL,SP+2 wraps",
    "initial": { "sp": 65534, "f": 128, "ram": [[0, 248], [1, 2]] },
    "final":   { "pc": 2, "sp": 65534, "f": 48 },
    "cycles": 12
  },
  {
    "name": "27 DAA past 99",
    "initial": { "a": 154, "ram": [[0, 39]] },
    "final":   { "pc": 1, "f": 144 },
    "cycles": 4
  },
  {
    "name": "cb 36 SWAP (HL)",
    "initial": { "h": 192, "f": 16, "ram": [[0, 203], [1, 54], [49152, 165]] },
    "final":   { "pc": 2, "h": 192, "ram": [[49152, 90]] },
    "cycles": 16
  },
  {
    "name": "3a LD A,(HL-)",
    "initial": { "h": 192, "ram": [[0, 58], [49152, 66]] },
    "final":   { "pc": 1, "a": 66, "h": 191, "l": 255 },
    "cycles": 8
  },
  {
    "name": "d9 RETI",
    "initial": { "sp": 53248, "ram": [[0, 217], [53248, 52], [53249, 18]] },
    "final":   { "pc": 4660, "sp": 53250, "ime": true },
    "cycles": 16
  },
  {
    "name": "c4 CALL NZ,nn taken",
    "initial": { "sp": 53248, "ram": [[0, 196], [1, 0], [2, 32]] },
    "final":   { "pc": 8192, "sp": 53246, "ram": [[53246, 3], [53247, 0]] },
    "cycles": 24
  }
]"#;

fn run_case(case: &TestCase) -> Vec<String> {
    let mut ram = vec![0; 0x1_0000];
    for &(address, value) in &case.initial.ram {
        ram[usize::from(address)] = value;
    }
    let mut cpu = Lr35902::new(Memory::from(ram), case.initial.pc);
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
