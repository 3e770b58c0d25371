//! Disassembly over the instruction catalog, prefixes included.

use std::fmt;

use emu_core::Memory;
use emu_core::bits::word;

use crate::instruction::{
    BitInstruction, ExtendedInstruction, Index, Instruction, OperandKind, Operands, Prefix,
};

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
/// Relative jumps print their absolute target. A prefix that starts no
/// valid instruction, or that is cut off by the end of `code`, is printed
/// as a one-byte `DB` line and decoding resumes at the next byte.
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
    let bytes: Vec<u8> = (0..4).map(|i| memory.peek(address.wrapping_add(i))).collect();
    decode_at(&bytes, address).1
}

fn decode_at(bytes: &[u8], address: u16) -> (usize, String) {
    let data = || (1, format!("DB {:02x}", bytes[0]));

    match Instruction::decode(bytes[0]) {
        Instruction::Prefix(Prefix::Cb) => match bytes.get(1) {
            Some(&opcode) => (2, BitInstruction::decode(opcode).to_string()),
            None => data(),
        },
        Instruction::Prefix(Prefix::Ed) => {
            match bytes.get(1).map(|&opcode| ExtendedInstruction::decode(opcode)) {
                Some(Ok(instruction)) => {
                    let ops = Operands {
                        immediate: word_at(bytes, 2),
                        ..Operands::default()
                    };
                    (usize::from(instruction.size()), instruction.format(&ops))
                }
                Some(Err(_)) | None => data(),
            }
        }
        Instruction::Prefix(Prefix::Dd) => decode_indexed(bytes, address, Index::Ix).unwrap_or_else(data),
        Instruction::Prefix(Prefix::Fd) => decode_indexed(bytes, address, Index::Iy).unwrap_or_else(data),
        instruction => {
            let size = instruction.size();
            let ops = operands(instruction, &bytes[1..], address.wrapping_add(size), Operands::default());
            (usize::from(size), instruction.format(&ops))
        }
    }
}

fn decode_indexed(bytes: &[u8], address: u16, index: Index) -> Option<(usize, String)> {
    let opcode = *bytes.get(1)?;
    let displacement = bytes.get(2).map(|&d| d as i8);

    match Instruction::decode(opcode) {
        Instruction::Prefix(Prefix::Cb) => {
            let ops = Operands {
                index: Some(index),
                displacement,
                ..Operands::default()
            };
            let instruction = BitInstruction::decode(*bytes.get(3)?);
            Some((4, instruction.format(&ops)))
        }
        Instruction::Prefix(_) => None,
        instruction => {
            let ops = Operands {
                index: Some(index),
                displacement: displacement.filter(|_| instruction.uses_memory()),
                ..Operands::default()
            };
            let size = instruction.indexed_size();
            let operand_start = 2 + usize::from(instruction.uses_memory());
            let rest = bytes.get(operand_start..).unwrap_or_default();
            let ops = operands(instruction, rest, address.wrapping_add(size), ops);
            Some((usize::from(size), instruction.format(&ops)))
        }
    }
}

/// Fill in the operand that follows the opcode (and displacement).
fn operands(instruction: Instruction, rest: &[u8], next: u16, ops: Operands) -> Operands {
    match instruction.operand() {
        OperandKind::None => ops,
        OperandKind::Byte => Operands {
            immediate: rest.first().map(|&n| u16::from(n)),
            ..ops
        },
        OperandKind::Word => Operands {
            immediate: word_at(rest, 0),
            ..ops
        },
        OperandKind::Relative => Operands {
            target: rest
                .first()
                .map(|&d| next.wrapping_add_signed(i16::from(d as i8))),
            ..ops
        },
    }
}

fn word_at(bytes: &[u8], at: usize) -> Option<u16> {
    match bytes.get(at..at + 2)? {
        &[lo, hi] => Some(word(hi, lo)),
        _ => None,
    }
}
