//! The LR35902 instruction catalog.
//!
//! The base table is the 8080 grid with the Z80's `CB` page bolted on and
//! the 8080's I/O and parity instructions replaced by high-page loads and
//! stack-relative arithmetic. Eleven bytes are unassigned and fail to
//! decode. The interpreter and the disassembler both match on the decoded
//! value; operand bytes are read separately by each.

use std::fmt;

use emu_core::DecodeError;

/// Register operand field. `Memory` is the byte at `(HL)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    B,
    C,
    D,
    E,
    H,
    L,
    Memory,
    A,
}

impl Reg {
    const ALL: [Self; 8] = [
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::H,
        Self::L,
        Self::Memory,
        Self::A,
    ];

    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 7) as usize]
    }
}

/// Register pair field for LD rr,nn / ADD HL,rr / INC rr / DEC rr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegPair {
    Bc,
    De,
    Hl,
    Sp,
}

impl RegPair {
    const fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => Self::Bc,
            1 => Self::De,
            2 => Self::Hl,
            _ => Self::Sp,
        }
    }
}

/// Register pair field for PUSH/POP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackPair {
    Bc,
    De,
    Hl,
    Af,
}

impl StackPair {
    const fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => Self::Bc,
            1 => Self::De,
            2 => Self::Hl,
            _ => Self::Af,
        }
    }
}

/// Address source for the accumulator loads and stores at `x2`/`xA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indirect {
    Bc,
    De,
    /// `(HL+)`: HL is incremented after the access.
    HlIncrement,
    /// `(HL-)`: HL is decremented after the access.
    HlDecrement,
}

impl Indirect {
    const fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => Self::Bc,
            1 => Self::De,
            2 => Self::HlIncrement,
            _ => Self::HlDecrement,
        }
    }
}

/// Branch condition field. Only zero and carry can be tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    NotZero,
    Zero,
    NoCarry,
    Carry,
}

impl Condition {
    const fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => Self::NotZero,
            1 => Self::Zero,
            2 => Self::NoCarry,
            _ => Self::Carry,
        }
    }
}

/// Accumulator operation field, shared by the register and immediate forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    const ALL: [Self; 8] = [
        Self::Add,
        Self::Adc,
        Self::Sub,
        Self::Sbc,
        Self::And,
        Self::Xor,
        Self::Or,
        Self::Cp,
    ];

    const fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 7) as usize]
    }

    const fn prefix(self) -> &'static str {
        match self {
            Self::Add => "ADD A,",
            Self::Adc => "ADC A,",
            Self::Sub => "SUB ",
            Self::Sbc => "SBC A,",
            Self::And => "AND ",
            Self::Xor => "XOR ",
            Self::Or => "OR ",
            Self::Cp => "CP ",
        }
    }
}

/// Rotate and shift group of the `CB` page. `SWAP` sits where the Z80 has
/// its undocumented `SLL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl Shift {
    const ALL: [Self; 8] = [
        Self::Rlc,
        Self::Rrc,
        Self::Rl,
        Self::Rr,
        Self::Sla,
        Self::Sra,
        Self::Swap,
        Self::Srl,
    ];

    const fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 7) as usize]
    }

    const fn mnemonic(self) -> &'static str {
        match self {
            Self::Rlc => "RLC",
            Self::Rrc => "RRC",
            Self::Rl => "RL",
            Self::Rr => "RR",
            Self::Sla => "SLA",
            Self::Sra => "SRA",
            Self::Swap => "SWAP",
            Self::Srl => "SRL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Nop,
    /// LD (nn),SP
    StoreSp,
    Stop,
    Jr,
    JrIf(Condition),
    /// LD rr,nn
    LdPair(RegPair),
    /// ADD HL,rr
    AddHl(RegPair),
    /// LD (BC),A / LD (DE),A / LD (HL+),A / LD (HL-),A
    StoreA(Indirect),
    /// LD A,(BC) / LD A,(DE) / LD A,(HL+) / LD A,(HL-)
    LoadA(Indirect),
    IncPair(RegPair),
    DecPair(RegPair),
    Inc(Reg),
    Dec(Reg),
    /// LD r,n
    LdImmediate(Reg),
    Rlca,
    Rrca,
    Rla,
    Rra,
    Daa,
    Cpl,
    Scf,
    Ccf,
    Ld(Reg, Reg),
    Halt,
    Alu(AluOp, Reg),
    AluImmediate(AluOp),
    RetIf(Condition),
    /// LDH (n),A
    StoreHigh,
    /// ADD SP,e
    AddSp,
    /// LDH A,(n)
    LoadHigh,
    /// LD HL,SP+e
    LdHlSp,
    Pop(StackPair),
    Ret,
    Reti,
    /// JP HL
    JpHl,
    /// LD SP,HL
    LdSpHl,
    JpIf(Condition),
    /// LD (C),A
    StoreHighC,
    /// LD A,(C)
    LoadHighC,
    /// LD (nn),A
    StoreAbsolute,
    /// LD A,(nn)
    LoadAbsolute,
    Jp,
    Di,
    Ei,
    CallIf(Condition),
    Push(StackPair),
    Call,
    Rst(u8),
    /// `CB`: the next byte selects a [`BitInstruction`].
    Prefix,
}

/// An immediate operand as it appears after the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    None,
    Byte(u8),
    Word(u16),
}

impl Operand {
    fn byte(self) -> String {
        match self {
            Self::Byte(n) => format!("{n:02x}"),
            _ => "n".into(),
        }
    }

    fn word(self) -> String {
        match self {
            Self::Word(nn) => format!("{nn:04x}"),
            _ => "nn".into(),
        }
    }

    /// A resolved jump target, or `e` when the displacement is missing.
    fn target(self) -> String {
        match self {
            Self::Word(nn) => format!("{nn:04x}"),
            _ => "e".into(),
        }
    }

    /// A signed stack offset with its sign.
    fn offset(self) -> String {
        match self {
            Self::Byte(e) => {
                let e = e as i8;
                let sign = if e < 0 { '-' } else { '+' };
                format!("{sign}{:02x}", e.unsigned_abs())
            }
            _ => "+e".into(),
        }
    }
}

impl Instruction {
    /// Decode a base-table opcode byte.
    ///
    /// # Errors
    ///
    /// The unassigned bytes `D3 DB DD E3 E4 EB EC ED F4 FC FD` fail.
    pub const fn decode(opcode: u8) -> Result<Self, DecodeError> {
        let y = (opcode >> 3) & 7;
        let z = opcode & 7;
        let p = y >> 1;
        let odd = y & 1 == 1;

        let instruction = match opcode >> 6 {
            0 => match z {
                0 => match y {
                    0 => Self::Nop,
                    1 => Self::StoreSp,
                    2 => Self::Stop,
                    3 => Self::Jr,
                    _ => Self::JrIf(Condition::from_bits(y)),
                },
                1 if odd => Self::AddHl(RegPair::from_bits(p)),
                1 => Self::LdPair(RegPair::from_bits(p)),
                2 if odd => Self::LoadA(Indirect::from_bits(p)),
                2 => Self::StoreA(Indirect::from_bits(p)),
                3 if odd => Self::DecPair(RegPair::from_bits(p)),
                3 => Self::IncPair(RegPair::from_bits(p)),
                4 => Self::Inc(Reg::from_bits(y)),
                5 => Self::Dec(Reg::from_bits(y)),
                6 => Self::LdImmediate(Reg::from_bits(y)),
                _ => match y {
                    0 => Self::Rlca,
                    1 => Self::Rrca,
                    2 => Self::Rla,
                    3 => Self::Rra,
                    4 => Self::Daa,
                    5 => Self::Cpl,
                    6 => Self::Scf,
                    _ => Self::Ccf,
                },
            },
            1 if y == 6 && z == 6 => Self::Halt,
            1 => Self::Ld(Reg::from_bits(y), Reg::from_bits(z)),
            2 => Self::Alu(AluOp::from_bits(y), Reg::from_bits(z)),
            _ => match z {
                0 => match y {
                    0..=3 => Self::RetIf(Condition::from_bits(y)),
                    4 => Self::StoreHigh,
                    5 => Self::AddSp,
                    6 => Self::LoadHigh,
                    _ => Self::LdHlSp,
                },
                1 => match (p, odd) {
                    (_, false) => Self::Pop(StackPair::from_bits(p)),
                    (0, true) => Self::Ret,
                    (1, true) => Self::Reti,
                    (2, true) => Self::JpHl,
                    (_, true) => Self::LdSpHl,
                },
                2 => match y {
                    0..=3 => Self::JpIf(Condition::from_bits(y)),
                    4 => Self::StoreHighC,
                    5 => Self::StoreAbsolute,
                    6 => Self::LoadHighC,
                    _ => Self::LoadAbsolute,
                },
                3 => match y {
                    0 => Self::Jp,
                    1 => Self::Prefix,
                    6 => Self::Di,
                    7 => Self::Ei,
                    _ => return Err(DecodeError::new(opcode)),
                },
                4 => match y {
                    0..=3 => Self::CallIf(Condition::from_bits(y)),
                    _ => return Err(DecodeError::new(opcode)),
                },
                5 => match (p, odd) {
                    (_, false) => Self::Push(StackPair::from_bits(p)),
                    (0, true) => Self::Call,
                    _ => return Err(DecodeError::new(opcode)),
                },
                6 => Self::AluImmediate(AluOp::from_bits(y)),
                _ => Self::Rst(y),
            },
        };
        Ok(instruction)
    }

    /// Instruction length in bytes, opcode included. `STOP` swallows the
    /// byte after it.
    #[must_use]
    pub const fn size(self) -> u16 {
        match self {
            Self::Stop
            | Self::Jr
            | Self::JrIf(_)
            | Self::LdImmediate(_)
            | Self::AluImmediate(_)
            | Self::StoreHigh
            | Self::LoadHigh
            | Self::AddSp
            | Self::LdHlSp
            | Self::Prefix => 2,
            Self::StoreSp
            | Self::LdPair(_)
            | Self::StoreAbsolute
            | Self::LoadAbsolute
            | Self::Jp
            | Self::JpIf(_)
            | Self::Call
            | Self::CallIf(_) => 3,
            _ => 1,
        }
    }

    /// What follows the opcode in the instruction stream.
    #[must_use]
    pub const fn operand_size(self) -> u16 {
        match self {
            Self::Stop | Self::Prefix => 0,
            other => other.size() - 1,
        }
    }

    /// Clock cycles. Conditional branches cost more when taken.
    #[must_use]
    pub const fn cycles(self, taken: bool) -> u32 {
        match self {
            Self::Nop
            | Self::Stop
            | Self::Rlca
            | Self::Rrca
            | Self::Rla
            | Self::Rra
            | Self::Daa
            | Self::Cpl
            | Self::Scf
            | Self::Ccf
            | Self::Halt
            | Self::JpHl
            | Self::Di
            | Self::Ei
            | Self::Prefix => 4,
            Self::Inc(Reg::Memory) | Self::Dec(Reg::Memory) | Self::LdImmediate(Reg::Memory) => 12,
            Self::Inc(_) | Self::Dec(_) => 4,
            Self::Ld(Reg::Memory, _) | Self::Ld(_, Reg::Memory) | Self::Alu(_, Reg::Memory) => 8,
            Self::Ld(_, _) | Self::Alu(_, _) => 4,
            Self::AddHl(_)
            | Self::StoreA(_)
            | Self::LoadA(_)
            | Self::IncPair(_)
            | Self::DecPair(_)
            | Self::LdImmediate(_)
            | Self::AluImmediate(_)
            | Self::LdSpHl
            | Self::StoreHighC
            | Self::LoadHighC => 8,
            Self::LdPair(_)
            | Self::StoreHigh
            | Self::LoadHigh
            | Self::LdHlSp
            | Self::Pop(_)
            | Self::Jr => 12,
            Self::AddSp
            | Self::Ret
            | Self::Reti
            | Self::StoreAbsolute
            | Self::LoadAbsolute
            | Self::Jp
            | Self::Push(_)
            | Self::Rst(_) => 16,
            Self::StoreSp => 20,
            Self::Call => 24,
            Self::JrIf(_) => {
                if taken {
                    12
                } else {
                    8
                }
            }
            Self::RetIf(_) => {
                if taken {
                    20
                } else {
                    8
                }
            }
            Self::JpIf(_) => {
                if taken {
                    16
                } else {
                    12
                }
            }
            Self::CallIf(_) => {
                if taken {
                    24
                } else {
                    12
                }
            }
        }
    }

    /// Mnemonic with operands, as printed by the disassembler. Relative
    /// jumps expect their resolved target as a [`Operand::Word`].
    #[must_use]
    pub fn format(self, operand: Operand) -> String {
        match self {
            Self::Nop => "NOP".into(),
            Self::StoreSp => format!("LD ({}),SP", operand.word()),
            Self::Stop => "STOP".into(),
            Self::Jr => format!("JR {}", operand.target()),
            Self::JrIf(cc) => format!("JR {cc},{}", operand.target()),
            Self::LdPair(rp) => format!("LD {rp},{}", operand.word()),
            Self::AddHl(rp) => format!("ADD HL,{rp}"),
            Self::StoreA(ind) => format!("LD {ind},A"),
            Self::LoadA(ind) => format!("LD A,{ind}"),
            Self::IncPair(rp) => format!("INC {rp}"),
            Self::DecPair(rp) => format!("DEC {rp}"),
            Self::Inc(r) => format!("INC {r}"),
            Self::Dec(r) => format!("DEC {r}"),
            Self::LdImmediate(r) => format!("LD {r},{}", operand.byte()),
            Self::Rlca => "RLCA".into(),
            Self::Rrca => "RRCA".into(),
            Self::Rla => "RLA".into(),
            Self::Rra => "RRA".into(),
            Self::Daa => "DAA".into(),
            Self::Cpl => "CPL".into(),
            Self::Scf => "SCF".into(),
            Self::Ccf => "CCF".into(),
            Self::Ld(dst, src) => format!("LD {dst},{src}"),
            Self::Halt => "HALT".into(),
            Self::Alu(op, r) => format!("{}{r}", op.prefix()),
            Self::AluImmediate(op) => format!("{}{}", op.prefix(), operand.byte()),
            Self::RetIf(cc) => format!("RET {cc}"),
            Self::StoreHigh => format!("LDH ({}),A", operand.byte()),
            Self::AddSp => format!("ADD SP,{}", operand.offset()),
            Self::LoadHigh => format!("LDH A,({})", operand.byte()),
            Self::LdHlSp => format!("LD HL,SP{}", operand.offset()),
            Self::Pop(rp) => format!("POP {rp}"),
            Self::Ret => "RET".into(),
            Self::Reti => "RETI".into(),
            Self::JpHl => "JP HL".into(),
            Self::LdSpHl => "LD SP,HL".into(),
            Self::JpIf(cc) => format!("JP {cc},{}", operand.word()),
            Self::StoreHighC => "LD (C),A".into(),
            Self::LoadHighC => "LD A,(C)".into(),
            Self::StoreAbsolute => format!("LD ({}),A", operand.word()),
            Self::LoadAbsolute => format!("LD A,({})", operand.word()),
            Self::Jp => format!("JP {}", operand.word()),
            Self::Di => "DI".into(),
            Self::Ei => "EI".into(),
            Self::CallIf(cc) => format!("CALL {cc},{}", operand.word()),
            Self::Push(rp) => format!("PUSH {rp}"),
            Self::Call => format!("CALL {}", operand.word()),
            Self::Rst(n) => format!("RST {:02x}", u16::from(n) * 8),
            Self::Prefix => "DB cb".into(),
        }
    }
}

/// The `CB` page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitInstruction {
    Shift(Shift, Reg),
    Bit(u8, Reg),
    Res(u8, Reg),
    Set(u8, Reg),
}

impl BitInstruction {
    /// Decode the byte after `CB`. Total.
    #[must_use]
    pub const fn decode(opcode: u8) -> Self {
        let y = (opcode >> 3) & 7;
        let reg = Reg::from_bits(opcode);
        match opcode >> 6 {
            0 => Self::Shift(Shift::from_bits(y), reg),
            1 => Self::Bit(y, reg),
            2 => Self::Res(y, reg),
            _ => Self::Set(y, reg),
        }
    }

    #[must_use]
    pub const fn reg(self) -> Reg {
        match self {
            Self::Shift(_, reg) | Self::Bit(_, reg) | Self::Res(_, reg) | Self::Set(_, reg) => reg,
        }
    }

    /// Clock cycles, the `CB` prefix included.
    #[must_use]
    pub const fn cycles(self) -> u32 {
        match (self, self.reg()) {
            (Self::Bit(..), Reg::Memory) => 12,
            (_, Reg::Memory) => 16,
            _ => 8,
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::H => "H",
            Self::L => "L",
            Self::Memory => "(HL)",
            Self::A => "A",
        })
    }
}

impl fmt::Display for RegPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bc => "BC",
            Self::De => "DE",
            Self::Hl => "HL",
            Self::Sp => "SP",
        })
    }
}

impl fmt::Display for StackPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bc => "BC",
            Self::De => "DE",
            Self::Hl => "HL",
            Self::Af => "AF",
        })
    }
}

impl fmt::Display for Indirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bc => "(BC)",
            Self::De => "(DE)",
            Self::HlIncrement => "(HL+)",
            Self::HlDecrement => "(HL-)",
        })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotZero => "NZ",
            Self::Zero => "Z",
            Self::NoCarry => "NC",
            Self::Carry => "C",
        })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(Operand::None))
    }
}

impl fmt::Display for BitInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift(op, r) => write!(f, "{} {r}", op.mnemonic()),
            Self::Bit(bit, r) => write!(f, "BIT {bit},{r}"),
            Self::Res(bit, r) => write!(f, "RES {bit},{r}"),
            Self::Set(bit, r) => write!(f, "SET {bit},{r}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(opcode: u8) -> Instruction {
        Instruction::decode(opcode).unwrap()
    }

    #[test]
    fn base_table_decodes() {
        assert_eq!(decode(0x08), Instruction::StoreSp);
        assert_eq!(decode(0x10), Instruction::Stop);
        assert_eq!(decode(0x22), Instruction::StoreA(Indirect::HlIncrement));
        assert_eq!(decode(0x3A), Instruction::LoadA(Indirect::HlDecrement));
        assert_eq!(decode(0x76), Instruction::Halt);
        assert_eq!(decode(0x7E), Instruction::Ld(Reg::A, Reg::Memory));
        assert_eq!(decode(0xD9), Instruction::Reti);
        assert_eq!(decode(0xE0), Instruction::StoreHigh);
        assert_eq!(decode(0xE2), Instruction::StoreHighC);
        assert_eq!(decode(0xE8), Instruction::AddSp);
        assert_eq!(decode(0xEA), Instruction::StoreAbsolute);
        assert_eq!(decode(0xF8), Instruction::LdHlSp);
        assert_eq!(decode(0xF5), Instruction::Push(StackPair::Af));
        assert_eq!(decode(0xCB), Instruction::Prefix);
        assert_eq!(decode(0xFF), Instruction::Rst(7));
    }

    #[test]
    fn unassigned_bytes_fail_to_decode() {
        let holes: Vec<u8> = (0..=255u8)
            .filter(|&op| Instruction::decode(op).is_err())
            .collect();
        assert_eq!(
            holes,
            [0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD]
        );
        assert_eq!(Instruction::decode(0xDD), Err(DecodeError::new(0xDD)));
    }

    #[test]
    fn bit_page_decodes_swap_in_place_of_sll() {
        assert_eq!(
            BitInstruction::decode(0x37),
            BitInstruction::Shift(Shift::Swap, Reg::A)
        );
        assert_eq!(BitInstruction::decode(0x7E), BitInstruction::Bit(7, Reg::Memory));
        assert_eq!(BitInstruction::decode(0x86), BitInstruction::Res(0, Reg::Memory));
        assert_eq!(BitInstruction::decode(0xFF), BitInstruction::Set(7, Reg::A));
    }

    #[test]
    fn cycles_follow_the_memory_operand() {
        assert_eq!(decode(0x34).cycles(true), 12);
        assert_eq!(decode(0x46).cycles(true), 8);
        assert_eq!(decode(0x40).cycles(true), 4);
        assert_eq!(BitInstruction::decode(0x46).cycles(), 12);
        assert_eq!(BitInstruction::decode(0x06).cycles(), 16);
        assert_eq!(BitInstruction::decode(0x00).cycles(), 8);
    }

    #[test]
    fn conditional_cycles_depend_on_the_branch() {
        let pairs: Vec<(u32, u32)> = [0x20, 0xC0, 0xC2, 0xC4]
            .into_iter()
            .map(|op| (decode(op).cycles(true), decode(op).cycles(false)))
            .collect();
        assert_eq!(pairs, [(12, 8), (20, 8), (16, 12), (24, 12)]);
    }

    #[test]
    fn lengths_match_operand_shapes() {
        let lengths: Vec<u16> = [0x00, 0x10, 0x18, 0x01, 0x08, 0xE0, 0xEA, 0xF8, 0xCB]
            .into_iter()
            .map(|op| decode(op).size())
            .collect();
        assert_eq!(lengths, [1, 2, 2, 3, 3, 2, 3, 2, 2]);
        assert_eq!(decode(0x10).operand_size(), 0);
        assert_eq!(decode(0xF8).operand_size(), 1);
    }

    #[test]
    fn formatting_places_operands() {
        assert_eq!(decode(0x06).format(Operand::Byte(0x0F)), "LD B,0f");
        assert_eq!(decode(0x08).format(Operand::Word(0xC000)), "LD (c000),SP");
        assert_eq!(decode(0xE0).format(Operand::Byte(0x40)), "LDH (40),A");
        assert_eq!(decode(0xF8).format(Operand::Byte(0xFD)), "LD HL,SP-03");
        assert_eq!(decode(0xE8).format(Operand::Byte(0x05)), "ADD SP,+05");
        assert_eq!(decode(0x20).format(Operand::Word(0x0150)), "JR NZ,0150");
        assert_eq!(decode(0x32).to_string(), "LD (HL-),A");
        assert_eq!(decode(0x9E).to_string(), "SBC A,(HL)");
        assert_eq!(decode(0xEF).to_string(), "RST 28");
        assert_eq!(BitInstruction::decode(0x36).to_string(), "SWAP (HL)");
    }
}
