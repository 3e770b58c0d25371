//! Harness for Blargg's `cpu_instrs` ROMs.
//!
//! The ROMs report through the serial port: a byte written to `SB`
//! (`0xFF01`) is sent when `0x81` is written to `SC` (`0xFF02`). Each run
//! ends when the text contains `Passed` or `Failed`. `LY` reads as 0x90 so
//! that the frame-wait loops fall straight through.

use std::cell::RefCell;
use std::rc::Rc;

use emu_core::{Cpu, Memory};
use sharp_lr35902::Lr35902;

const ENTRY: u16 = 0x0100;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn run_rom(name: &str, max_instructions: u64) -> String {
    init_tracing();
    let path = format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"));
    let rom = std::fs::read(&path).unwrap_or_else(|e| panic!("{path}: {e}"));

    let mut ram = vec![0; 0x1_0000];
    let len = rom.len().min(0x8000);
    ram[..len].copy_from_slice(&rom[..len]);
    let mut memory = Memory::from(ram);
    memory
        .attach_memory_mapper_for_read(0xFF44..=0xFF44, |_| Some(0x90))
        .unwrap();

    let serial = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&serial);
    let mut data = 0;
    memory.add_write_observer(move |address: u16, value: u8| match address {
        0xFF01 => data = value,
        0xFF02 if value == 0x81 => sink.borrow_mut().push(char::from(data)),
        _ => {}
    });

    let mut cpu = Lr35902::new(memory, ENTRY);
    cpu.start();
    let mut instructions = 0;
    while instructions < max_instructions && cpu.can_run_next_instruction() {
        cpu.next_instruction().unwrap();
        instructions += 1;
        if instructions % 10_000 == 0 {
            let text = serial.borrow();
            if text.contains("Passed") || text.contains("Failed") {
                break;
            }
        }
    }

    let output = serial.borrow().clone();
    eprintln!("{output}");
    eprintln!("Total: {instructions} instructions");
    output
}

#[test]
#[ignore = "needs tests/data/01-special.gb"]
fn special() {
    let output = run_rom("01-special.gb", 50_000_000);
    assert!(output.contains("Passed"), "{output}");
}

#[test]
#[ignore = "needs tests/data/06-ld r,r.gb"]
fn register_loads() {
    let output = run_rom("06-ld r,r.gb", 50_000_000);
    assert!(output.contains("Passed"), "{output}");
}

#[test]
#[ignore = "needs tests/data/09-op r,r.gb"]
fn register_alu() {
    let output = run_rom("09-op r,r.gb", 50_000_000);
    assert!(output.contains("Passed"), "{output}");
}
