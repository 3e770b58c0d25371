//! Disassembly over the shared instruction catalog.

use std::fmt;

use emu_core::bits::word;

use crate::instruction::{Instruction, Operand};

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
/// An instruction cut off by the end of `code` is printed with the operand
/// bytes that are present.
#[must_use]
pub fn disassemble(code: &[u8], origin: u16) -> Vec<DisassembledLine> {
    let mut lines = Vec::new();
    let mut offset = 0;

    while offset < code.len() {
        let instruction = Instruction::decode(code[offset]);
        let end = (offset + usize::from(instruction.size())).min(code.len());
        let bytes = code[offset..end].to_vec();
        let operand = match bytes[1..] {
            [n] if instruction.size() == 2 => Operand::Byte(n),
            [lo, hi] => Operand::Word(word(hi, lo)),
            _ => Operand::None,
        };

        lines.push(DisassembledLine {
            address: origin.wrapping_add(offset as u16),
            text: instruction.format(operand),
            bytes,
        });
        offset = end;
    }

    lines
}
