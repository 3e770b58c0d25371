//! Disassembly over the shared instruction catalog.

use std::fmt;

use emu_core::Memory;
use emu_core::bits::word;

use crate::instruction::{BitInstruction, Instruction, Operand};

/// One disassembled instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassembledLine {
    pub address: u16,
    pub bytes: Vec<u8>,
    pub text: String,
}

impl fmt::Display for DisassembledLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}\t\t{}", self.address, self.text)
    }
}

/// Disassemble `code`, which is loaded at `origin`.
///
/// Unassigned bytes come out as `DB xx` so that data mixed into code does
/// not stop the listing. Relative jumps print their resolved target.
#[must_use]
pub fn disassemble(code: &[u8], origin: u16) -> Vec<DisassembledLine> {
    let mut lines = Vec::new();
    let mut offset = 0;

    while offset < code.len() {
        let address = origin.wrapping_add(offset as u16);
        let (size, text) = decode_at(&code[offset..], address);
        let end = (offset + size).min(code.len());
        lines.push(DisassembledLine {
            address,
            bytes: code[offset..end].to_vec(),
            text,
        });
        offset = end;
    }

    lines
}

/// The instruction at `address` as it reads now, without triggering mappers.
pub(crate) fn mnemonic_at(memory: &Memory, address: u16) -> String {
    let bytes: Vec<u8> = (0..3).map(|i| memory.peek(address.wrapping_add(i))).collect();
    decode_at(&bytes, address).1
}

fn decode_at(bytes: &[u8], address: u16) -> (usize, String) {
    let opcode = bytes[0];
    let Ok(instruction) = Instruction::decode(opcode) else {
        return (1, format!("DB {opcode:02x}"));
    };

    if instruction == Instruction::Prefix {
        return match bytes.get(1) {
            Some(&op) => (2, BitInstruction::decode(op).to_string()),
            None => (1, instruction.to_string()),
        };
    }

    let operand = match (instruction.operand_size(), &bytes[1..]) {
        (1, &[e, ..]) if matches!(instruction, Instruction::Jr | Instruction::JrIf(_)) => {
            let next = address.wrapping_add(2);
            Operand::Word(next.wrapping_add_signed(i16::from(e as i8)))
        }
        (1, &[n, ..]) => Operand::Byte(n),
        (2, &[lo, hi, ..]) => Operand::Word(word(hi, lo)),
        _ => Operand::None,
    };
    (usize::from(instruction.size()), instruction.format(operand))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(code: &[u8], origin: u16) -> Vec<String> {
        disassemble(code, origin)
            .into_iter()
            .map(|line| line.text)
            .collect()
    }

    #[test]
    fn lines_print_address_tabs_and_mnemonic() {
        let lines = disassemble(&[0x3E, 0x0F, 0xC3, 0x00, 0x01, 0x76], 0x0100);
        let text: Vec<String> = lines.iter().map(ToString::to_string).collect();
        assert_eq!(text, ["0100\t\tLD A,0f", "0102\t\tJP 0100", "0105\t\tHALT"]);
        assert_eq!(lines[1].bytes, [0xC3, 0x00, 0x01]);
    }

    #[test]
    fn relative_jumps_print_their_target() {
        assert_eq!(texts(&[0x18, 0xFE], 0x0200), ["JR 0200"]);
        assert_eq!(texts(&[0x20, 0x05], 0x0200), ["JR NZ,0207"]);
    }

    #[test]
    fn unassigned_bytes_and_the_bit_page() {
        let code = [0xD3, 0xCB, 0x37, 0xE0, 0x44, 0x10, 0x00, 0xF8, 0xFE];
        let lines = disassemble(&code, 0);
        let text: Vec<&str> = lines.iter().map(|line| line.text.as_str()).collect();
        assert_eq!(text, ["DB d3", "SWAP A", "LDH (44),A", "STOP", "LD HL,SP-02"]);
        assert_eq!(lines[3].bytes, [0x10, 0x00]);
    }

    #[test]
    fn truncated_input_does_not_panic() {
        let lines = disassemble(&[0x00, 0x21, 0x34], 0);
        assert_eq!(lines[1].bytes, [0x21, 0x34]);
        assert_eq!(lines[1].text, "LD HL,nn");
        assert_eq!(texts(&[0xCB], 0), ["DB cb"]);
        assert_eq!(texts(&[0x18], 0), ["JR e"]);
    }

    #[test]
    fn every_opcode_disassembles() {
        let code: Vec<u8> = (0..=255u8).flat_map(|op| [op, 0, 0]).collect();
        let lines = disassemble(&code, 0);
        assert!(lines.iter().all(|line| !line.text.is_empty()));
    }

    #[test]
    fn mnemonic_at_follows_the_bit_page() {
        let memory = Memory::from(vec![0xCB, 0x37, 0xE0, 0x44]);
        assert_eq!(mnemonic_at(&memory, 0), "SWAP A");
        assert_eq!(mnemonic_at(&memory, 2), "LDH (44),A");
    }
}
