//! The Z80 instruction catalog.
//!
//! Four tables share the operand enums below:
//!
//! - the unprefixed table ([`Instruction`]), total over all 256 bytes, in
//!   which `CB`, `DD`, `ED` and `FD` decode to [`Instruction::Prefix`];
//! - the `CB` bit table ([`BitInstruction`]), also total;
//! - the `ED` extended table ([`ExtendedInstruction`]), which has holes;
//! - `DD`/`FD` reuse the unprefixed table with HL redirected to IX/IY, and
//!   `DDCB`/`FDCB` reuse the bit table on `(IX+d)`/`(IY+d)`.
//!
//! Catalog entries carry no operand values. The interpreter reads operands
//! as it executes; the disassembler passes them to `format` through
//! [`Operands`].

use std::fmt;

use emu_core::DecodeError;

use crate::registers::InterruptMode;

/// 8-bit register field. `Memory` is `(HL)`, or `(IX+d)`/`(IY+d)` under an
/// index prefix.
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

/// Register pair field for 16-bit loads and arithmetic.
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    NonZero,
    Zero,
    NoCarry,
    Carry,
    ParityOdd,
    ParityEven,
    Positive,
    Negative,
}

impl Condition {
    const ALL: [Self; 8] = [
        Self::NonZero,
        Self::Zero,
        Self::NoCarry,
        Self::Carry,
        Self::ParityOdd,
        Self::ParityEven,
        Self::Positive,
        Self::Negative,
    ];

    const fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 7) as usize]
    }
}

/// Accumulator operation field.
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

    /// Mnemonic up to the operand, e.g. `"ADD A,"` or `"SUB "`.
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

/// Rotate and shift operations of the `CB` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    /// Undocumented: shift left, setting bit 0.
    Sll,
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
        Self::Sll,
        Self::Srl,
    ];

    const fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 7) as usize]
    }
}

/// Index register selected by a `DD` or `FD` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    Ix,
    Iy,
}

impl Index {
    /// Name of the prefixed table, for decode errors.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Ix => "DD",
            Self::Iy => "FD",
        }
    }

    #[must_use]
    pub const fn bits_table(self) -> &'static str {
        match self {
            Self::Ix => "DDCB",
            Self::Iy => "FDCB",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    Cb,
    Dd,
    Ed,
    Fd,
}

impl Prefix {
    const fn byte(self) -> u8 {
        match self {
            Self::Cb => 0xCB,
            Self::Dd => 0xDD,
            Self::Ed => 0xED,
            Self::Fd => 0xFD,
        }
    }
}

/// Unprefixed opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Nop,
    ExAf,
    Djnz,
    Jr,
    JrIf(Condition),
    /// LD rr,nn
    LdPair(RegPair),
    /// ADD HL,rr
    AddHl(RegPair),
    /// LD (BC),A / LD (DE),A
    StoreA(RegPair),
    /// LD A,(BC) / LD A,(DE)
    LoadA(RegPair),
    /// LD (nn),HL
    StoreHl,
    /// LD HL,(nn)
    LoadHl,
    /// LD (nn),A
    StoreAbsolute,
    /// LD A,(nn)
    LoadAbsolute,
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
    Pop(StackPair),
    Ret,
    Exx,
    /// JP (HL)
    JpHl,
    /// LD SP,HL
    LdSpHl,
    JpIf(Condition),
    Jp,
    /// OUT (n),A
    OutImmediate,
    /// IN A,(n)
    InImmediate,
    /// EX (SP),HL
    ExSpHl,
    /// EX DE,HL (never redirected to IX/IY)
    ExDeHl,
    Di,
    Ei,
    CallIf(Condition),
    Push(StackPair),
    Call,
    Rst(u8),
    Prefix(Prefix),
}

/// What follows the opcode (and displacement) in the instruction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    None,
    Byte,
    Word,
    /// Signed displacement relative to the next instruction.
    Relative,
}

impl Instruction {
    /// Decode an unprefixed opcode byte. Total: prefixes decode to
    /// [`Instruction::Prefix`].
    #[must_use]
    pub const fn decode(opcode: u8) -> Self {
        let y = (opcode >> 3) & 7;
        let z = opcode & 7;
        let p = y >> 1;
        let q = y & 1 == 1;

        match opcode >> 6 {
            0 => match z {
                0 => match y {
                    0 => Self::Nop,
                    1 => Self::ExAf,
                    2 => Self::Djnz,
                    3 => Self::Jr,
                    _ => Self::JrIf(Condition::from_bits(y - 4)),
                },
                1 if q => Self::AddHl(RegPair::from_bits(p)),
                1 => Self::LdPair(RegPair::from_bits(p)),
                2 => match (p, q) {
                    (0 | 1, false) => Self::StoreA(RegPair::from_bits(p)),
                    (0 | 1, true) => Self::LoadA(RegPair::from_bits(p)),
                    (2, false) => Self::StoreHl,
                    (2, true) => Self::LoadHl,
                    (_, false) => Self::StoreAbsolute,
                    (_, true) => Self::LoadAbsolute,
                },
                3 if q => Self::DecPair(RegPair::from_bits(p)),
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
                0 => Self::RetIf(Condition::from_bits(y)),
                1 => match (p, q) {
                    (_, false) => Self::Pop(StackPair::from_bits(p)),
                    (0, true) => Self::Ret,
                    (1, true) => Self::Exx,
                    (2, true) => Self::JpHl,
                    (_, true) => Self::LdSpHl,
                },
                2 => Self::JpIf(Condition::from_bits(y)),
                3 => match y {
                    0 => Self::Jp,
                    1 => Self::Prefix(Prefix::Cb),
                    2 => Self::OutImmediate,
                    3 => Self::InImmediate,
                    4 => Self::ExSpHl,
                    5 => Self::ExDeHl,
                    6 => Self::Di,
                    _ => Self::Ei,
                },
                4 => Self::CallIf(Condition::from_bits(y)),
                5 => match (p, q) {
                    (_, false) => Self::Push(StackPair::from_bits(p)),
                    (0, true) => Self::Call,
                    (1, true) => Self::Prefix(Prefix::Dd),
                    (2, true) => Self::Prefix(Prefix::Ed),
                    (_, true) => Self::Prefix(Prefix::Fd),
                },
                6 => Self::AluImmediate(AluOp::from_bits(y)),
                _ => Self::Rst(y),
            },
        }
    }

    /// True if the instruction has a `(HL)` operand. Under an index prefix
    /// that operand becomes `(IX+d)` and a displacement byte follows the
    /// opcode.
    #[must_use]
    pub const fn uses_memory(self) -> bool {
        matches!(
            self,
            Self::Inc(Reg::Memory)
                | Self::Dec(Reg::Memory)
                | Self::LdImmediate(Reg::Memory)
                | Self::Ld(Reg::Memory, _)
                | Self::Ld(_, Reg::Memory)
                | Self::Alu(_, Reg::Memory)
        )
    }

    #[must_use]
    pub const fn operand(self) -> OperandKind {
        match self {
            Self::Djnz | Self::Jr | Self::JrIf(_) => OperandKind::Relative,
            Self::LdImmediate(_) | Self::AluImmediate(_) | Self::OutImmediate | Self::InImmediate => {
                OperandKind::Byte
            }
            Self::LdPair(_)
            | Self::StoreHl
            | Self::LoadHl
            | Self::StoreAbsolute
            | Self::LoadAbsolute
            | Self::JpIf(_)
            | Self::Jp
            | Self::CallIf(_)
            | Self::Call => OperandKind::Word,
            _ => OperandKind::None,
        }
    }

    /// Instruction length in bytes, opcode included. For a prefix this is
    /// the prefix byte alone.
    #[must_use]
    pub const fn size(self) -> u16 {
        match self.operand() {
            OperandKind::None => 1,
            OperandKind::Byte | OperandKind::Relative => 2,
            OperandKind::Word => 3,
        }
    }

    /// Length under a `DD`/`FD` prefix, prefix and displacement included.
    #[must_use]
    pub const fn indexed_size(self) -> u16 {
        self.size() + 1 + self.uses_memory() as u16
    }

    /// T-states. `taken` selects the branch cost of conditional jumps,
    /// calls, returns and DJNZ.
    #[must_use]
    pub const fn cycles(self, taken: bool) -> u32 {
        match self {
            Self::Nop
            | Self::ExAf
            | Self::Rlca
            | Self::Rrca
            | Self::Rla
            | Self::Rra
            | Self::Daa
            | Self::Cpl
            | Self::Scf
            | Self::Ccf
            | Self::Halt
            | Self::Exx
            | Self::JpHl
            | Self::ExDeHl
            | Self::Di
            | Self::Ei
            | Self::Prefix(_) => 4,
            Self::Inc(Reg::Memory) | Self::Dec(Reg::Memory) => 11,
            Self::Inc(_) | Self::Dec(_) => 4,
            Self::LdImmediate(Reg::Memory) => 10,
            Self::LdImmediate(_) | Self::StoreA(_) | Self::LoadA(_) | Self::AluImmediate(_) => 7,
            Self::Ld(Reg::Memory, _) | Self::Ld(_, Reg::Memory) | Self::Alu(_, Reg::Memory) => 7,
            Self::Ld(_, _) | Self::Alu(_, _) => 4,
            Self::IncPair(_) | Self::DecPair(_) | Self::LdSpHl => 6,
            Self::LdPair(_) | Self::Pop(_) | Self::Ret | Self::JpIf(_) | Self::Jp => 10,
            Self::AddHl(_) | Self::Push(_) | Self::Rst(_) | Self::OutImmediate | Self::InImmediate => 11,
            Self::Jr => 12,
            Self::StoreAbsolute | Self::LoadAbsolute => 13,
            Self::StoreHl | Self::LoadHl => 16,
            Self::Call => 17,
            Self::ExSpHl => 19,
            Self::Djnz => {
                if taken {
                    13
                } else {
                    8
                }
            }
            Self::JrIf(_) => {
                if taken {
                    12
                } else {
                    7
                }
            }
            Self::RetIf(_) => {
                if taken {
                    11
                } else {
                    5
                }
            }
            Self::CallIf(_) => {
                if taken {
                    17
                } else {
                    10
                }
            }
        }
    }

    /// Extra T-states an index prefix adds: the prefix fetch, plus the
    /// displacement add for `(IX+d)` operands.
    #[must_use]
    pub const fn index_overhead(self) -> u32 {
        match self {
            Self::LdImmediate(Reg::Memory) => 9,
            _ if self.uses_memory() => 12,
            _ => 4,
        }
    }

    /// Mnemonic with the given operand values; missing values print as
    /// `n`, `nn`, `d` and `e`.
    #[must_use]
    pub fn format(self, ops: &Operands) -> String {
        let r = |reg| ops.reg(reg, self.uses_memory());
        match self {
            Self::Nop => "NOP".into(),
            Self::ExAf => "EX AF,AF'".into(),
            Self::Djnz => format!("DJNZ {}", ops.relative()),
            Self::Jr => format!("JR {}", ops.relative()),
            Self::JrIf(cc) => format!("JR {cc},{}", ops.relative()),
            Self::LdPair(rp) => format!("LD {},{}", ops.pair(rp), ops.word()),
            Self::AddHl(rp) => format!("ADD {},{}", ops.pair(RegPair::Hl), ops.pair(rp)),
            Self::StoreA(rp) => format!("LD ({rp}),A"),
            Self::LoadA(rp) => format!("LD A,({rp})"),
            Self::StoreHl => format!("LD ({}),{}", ops.word(), ops.pair(RegPair::Hl)),
            Self::LoadHl => format!("LD {},({})", ops.pair(RegPair::Hl), ops.word()),
            Self::StoreAbsolute => format!("LD ({}),A", ops.word()),
            Self::LoadAbsolute => format!("LD A,({})", ops.word()),
            Self::IncPair(rp) => format!("INC {}", ops.pair(rp)),
            Self::DecPair(rp) => format!("DEC {}", ops.pair(rp)),
            Self::Inc(reg) => format!("INC {}", r(reg)),
            Self::Dec(reg) => format!("DEC {}", r(reg)),
            Self::LdImmediate(reg) => format!("LD {},{}", r(reg), ops.byte()),
            Self::Rlca => "RLCA".into(),
            Self::Rrca => "RRCA".into(),
            Self::Rla => "RLA".into(),
            Self::Rra => "RRA".into(),
            Self::Daa => "DAA".into(),
            Self::Cpl => "CPL".into(),
            Self::Scf => "SCF".into(),
            Self::Ccf => "CCF".into(),
            Self::Ld(dst, src) => format!("LD {},{}", r(dst), r(src)),
            Self::Halt => "HALT".into(),
            Self::Alu(op, reg) => format!("{}{}", op.prefix(), r(reg)),
            Self::AluImmediate(op) => format!("{}{}", op.prefix(), ops.byte()),
            Self::RetIf(cc) => format!("RET {cc}"),
            Self::Pop(rp) => format!("POP {}", ops.stack_pair(rp)),
            Self::Ret => "RET".into(),
            Self::Exx => "EXX".into(),
            Self::JpHl => format!("JP ({})", ops.pair(RegPair::Hl)),
            Self::LdSpHl => format!("LD SP,{}", ops.pair(RegPair::Hl)),
            Self::JpIf(cc) => format!("JP {cc},{}", ops.word()),
            Self::Jp => format!("JP {}", ops.word()),
            Self::OutImmediate => format!("OUT ({}),A", ops.byte()),
            Self::InImmediate => format!("IN A,({})", ops.byte()),
            Self::ExSpHl => format!("EX (SP),{}", ops.pair(RegPair::Hl)),
            Self::ExDeHl => "EX DE,HL".into(),
            Self::Di => "DI".into(),
            Self::Ei => "EI".into(),
            Self::CallIf(cc) => format!("CALL {cc},{}", ops.word()),
            Self::Push(rp) => format!("PUSH {}", ops.stack_pair(rp)),
            Self::Call => format!("CALL {}", ops.word()),
            Self::Rst(n) => format!("RST {:02x}", n * 8),
            Self::Prefix(prefix) => format!("DB {:02x}", prefix.byte()),
        }
    }
}

/// `CB`-prefixed opcodes.
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

    #[must_use]
    pub const fn cycles(self) -> u32 {
        match self {
            Self::Bit(_, Reg::Memory) => 12,
            _ if matches!(self.reg(), Reg::Memory) => 15,
            _ => 8,
        }
    }

    /// T-states in the `DDCB`/`FDCB` form.
    #[must_use]
    pub const fn indexed_cycles(self) -> u32 {
        match self {
            Self::Bit(..) => 20,
            _ => 23,
        }
    }

    /// Mnemonic. Under an index prefix the operand is `(IX+d)`, and a
    /// register other than `(HL)` names the undocumented result copy.
    #[must_use]
    pub fn format(self, ops: &Operands) -> String {
        let operand = match (ops.index, self.reg()) {
            (None, reg) => ops.reg(reg, false),
            (Some(_), Reg::Memory) => ops.memory(),
            (Some(_), _) if matches!(self, Self::Bit(..)) => ops.memory(),
            (Some(_), reg) => format!("{},{}", ops.memory(), ops.reg(reg, true)),
        };
        match self {
            Self::Shift(op, _) => format!("{} {operand}", shift_mnemonic(op)),
            Self::Bit(bit, _) => format!("BIT {bit},{operand}"),
            Self::Res(bit, _) => format!("RES {bit},{operand}"),
            Self::Set(bit, _) => format!("SET {bit},{operand}"),
        }
    }
}

const fn shift_mnemonic(op: Shift) -> &'static str {
    match op {
        Shift::Rlc => "RLC",
        Shift::Rrc => "RRC",
        Shift::Rl => "RL",
        Shift::Rr => "RR",
        Shift::Sla => "SLA",
        Shift::Sra => "SRA",
        Shift::Sll => "SLL",
        Shift::Srl => "SRL",
    }
}

/// Block transfer, search and I/O instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOp {
    Ldi,
    Cpi,
    Ini,
    Outi,
    Ldd,
    Cpd,
    Ind,
    Outd,
    Ldir,
    Cpir,
    Inir,
    Otir,
    Lddr,
    Cpdr,
    Indr,
    Otdr,
}

impl BlockOp {
    const ALL: [Self; 16] = [
        Self::Ldi,
        Self::Cpi,
        Self::Ini,
        Self::Outi,
        Self::Ldd,
        Self::Cpd,
        Self::Ind,
        Self::Outd,
        Self::Ldir,
        Self::Cpir,
        Self::Inir,
        Self::Otir,
        Self::Lddr,
        Self::Cpdr,
        Self::Indr,
        Self::Otdr,
    ];

    /// True for the forms that step HL (and DE) downwards.
    #[must_use]
    pub const fn decrements(self) -> bool {
        matches!(
            self,
            Self::Ldd | Self::Cpd | Self::Ind | Self::Outd | Self::Lddr | Self::Cpdr | Self::Indr | Self::Otdr
        )
    }

    #[must_use]
    pub const fn repeats(self) -> bool {
        matches!(
            self,
            Self::Ldir | Self::Cpir | Self::Inir | Self::Otir | Self::Lddr | Self::Cpdr | Self::Indr | Self::Otdr
        )
    }
}

impl fmt::Display for BlockOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = format!("{self:?}");
        f.write_str(&name.to_uppercase())
    }
}

/// `ED`-prefixed opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedInstruction {
    /// IN r,(C). `None` is the undocumented `IN (C)` that only sets flags.
    InC(Option<Reg>),
    /// OUT (C),r. `None` is the undocumented `OUT (C),0`.
    OutC(Option<Reg>),
    SbcHl(RegPair),
    AdcHl(RegPair),
    /// LD (nn),rr
    StorePair(RegPair),
    /// LD rr,(nn)
    LoadPair(RegPair),
    Neg,
    Retn,
    Reti,
    Im(InterruptMode),
    /// LD I,A
    LdIA,
    /// LD R,A
    LdRA,
    /// LD A,I
    LdAI,
    /// LD A,R
    LdAR,
    Rrd,
    Rld,
    Block(BlockOp),
}

impl ExtendedInstruction {
    /// Decode the byte after `ED`. Bytes with no instruction are an error
    /// tagged with the `ED` table.
    pub const fn decode(opcode: u8) -> Result<Self, DecodeError> {
        let y = (opcode >> 3) & 7;
        let z = opcode & 7;
        let p = y >> 1;
        let q = y & 1 == 1;
        let reg = if y == 6 { None } else { Some(Reg::from_bits(y)) };

        let instruction = match opcode >> 6 {
            1 => match z {
                0 => Self::InC(reg),
                1 => Self::OutC(reg),
                2 if q => Self::AdcHl(RegPair::from_bits(p)),
                2 => Self::SbcHl(RegPair::from_bits(p)),
                3 if q => Self::LoadPair(RegPair::from_bits(p)),
                3 => Self::StorePair(RegPair::from_bits(p)),
                4 => Self::Neg,
                5 if y == 1 => Self::Reti,
                5 => Self::Retn,
                6 => Self::Im(match y & 3 {
                    0 | 1 => InterruptMode::Zero,
                    2 => InterruptMode::One,
                    _ => InterruptMode::Two,
                }),
                _ => match y {
                    0 => Self::LdIA,
                    1 => Self::LdRA,
                    2 => Self::LdAI,
                    3 => Self::LdAR,
                    4 => Self::Rrd,
                    5 => Self::Rld,
                    _ => return Err(DecodeError::in_table(opcode, "ED")),
                },
            },
            2 if y >= 4 && z <= 3 => Self::Block(BlockOp::ALL[((y - 4) * 4 + z) as usize]),
            _ => return Err(DecodeError::in_table(opcode, "ED")),
        };
        Ok(instruction)
    }

    /// Length in bytes, `ED` prefix included.
    #[must_use]
    pub const fn size(self) -> u16 {
        match self {
            Self::StorePair(_) | Self::LoadPair(_) => 4,
            _ => 2,
        }
    }

    /// T-states, prefix included. `taken` selects the repeat cost of the
    /// repeating block instructions.
    #[must_use]
    pub const fn cycles(self, taken: bool) -> u32 {
        match self {
            Self::Neg | Self::Im(_) => 8,
            Self::LdIA | Self::LdRA | Self::LdAI | Self::LdAR => 9,
            Self::InC(_) | Self::OutC(_) => 12,
            Self::Retn | Self::Reti => 14,
            Self::SbcHl(_) | Self::AdcHl(_) => 15,
            Self::Rrd | Self::Rld => 18,
            Self::StorePair(_) | Self::LoadPair(_) => 20,
            Self::Block(op) => {
                if op.repeats() && taken {
                    21
                } else {
                    16
                }
            }
        }
    }

    #[must_use]
    pub fn format(self, ops: &Operands) -> String {
        let reg = |reg| ops.reg(reg, false);
        match self {
            Self::InC(Some(r)) => format!("IN {},(C)", reg(r)),
            Self::InC(None) => "IN (C)".into(),
            Self::OutC(Some(r)) => format!("OUT (C),{}", reg(r)),
            Self::OutC(None) => "OUT (C),0".into(),
            Self::SbcHl(rp) => format!("SBC HL,{rp}"),
            Self::AdcHl(rp) => format!("ADC HL,{rp}"),
            Self::StorePair(rp) => format!("LD ({}),{rp}", ops.word()),
            Self::LoadPair(rp) => format!("LD {rp},({})", ops.word()),
            Self::Neg => "NEG".into(),
            Self::Retn => "RETN".into(),
            Self::Reti => "RETI".into(),
            Self::Im(mode) => format!("IM {}", mode.number()),
            Self::LdIA => "LD I,A".into(),
            Self::LdRA => "LD R,A".into(),
            Self::LdAI => "LD A,I".into(),
            Self::LdAR => "LD A,R".into(),
            Self::Rrd => "RRD".into(),
            Self::Rld => "RLD".into(),
            Self::Block(op) => op.to_string(),
        }
    }
}

/// Operand values and prefix context used when printing an instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Operands {
    pub index: Option<Index>,
    pub displacement: Option<i8>,
    pub immediate: Option<u16>,
    /// Resolved target of a relative jump.
    pub target: Option<u16>,
}

impl Operands {
    fn byte(&self) -> String {
        self.immediate
            .map_or_else(|| "n".into(), |n| format!("{:02x}", n & 0xFF))
    }

    fn word(&self) -> String {
        self.immediate
            .map_or_else(|| "nn".into(), |nn| format!("{nn:04x}"))
    }

    fn relative(&self) -> String {
        self.target
            .map_or_else(|| "e".into(), |target| format!("{target:04x}"))
    }

    fn memory(&self) -> String {
        let Some(index) = self.index else {
            return "(HL)".into();
        };
        let name = IndexName(index);
        match self.displacement {
            None => format!("({name}+d)"),
            Some(d) if d < 0 => format!("({name}-{:02x})", d.unsigned_abs()),
            Some(d) => format!("({name}+{d:02x})"),
        }
    }

    /// Register name. H and L become the index halves under a prefix unless
    /// the instruction also has an `(IX+d)` operand.
    fn reg(&self, reg: Reg, uses_memory: bool) -> String {
        match (reg, self.index) {
            (Reg::Memory, _) => self.memory(),
            (Reg::H, Some(index)) if !uses_memory => format!("{}H", IndexName(index)),
            (Reg::L, Some(index)) if !uses_memory => format!("{}L", IndexName(index)),
            (reg, _) => format!("{reg:?}"),
        }
    }

    fn pair(&self, rp: RegPair) -> String {
        match (rp, self.index) {
            (RegPair::Hl, Some(index)) => IndexName(index).to_string(),
            (rp, _) => rp.to_string(),
        }
    }

    fn stack_pair(&self, rp: StackPair) -> String {
        match (rp, self.index) {
            (StackPair::Hl, Some(index)) => IndexName(index).to_string(),
            (rp, _) => rp.to_string(),
        }
    }
}

struct IndexName(Index);

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.0 {
            Index::Ix => "IX",
            Index::Iy => "IY",
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

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NonZero => "NZ",
            Self::Zero => "Z",
            Self::NoCarry => "NC",
            Self::Carry => "C",
            Self::ParityOdd => "PO",
            Self::ParityEven => "PE",
            Self::Positive => "P",
            Self::Negative => "M",
        })
    }
}

/// The mnemonic with operand placeholders.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(&Operands::default()))
    }
}

impl fmt::Display for BitInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(&Operands::default()))
    }
}

impl fmt::Display for ExtendedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(&Operands::default()))
    }
}
