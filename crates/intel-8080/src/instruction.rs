//! The 8080 instruction catalog.
//!
//! Every one of the 256 opcodes decodes to an [`Instruction`], including the
//! undocumented duplicates (`08`-`38` act as NOP, `CB` as JMP, `D9` as RET,
//! `DD`/`ED`/`FD` as CALL). The interpreter and the disassembler both match
//! on the decoded value; operand bytes are read separately by each.

use std::fmt;

/// Register operand field. `M` is the byte at `(HL)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    B,
    C,
    D,
    E,
    H,
    L,
    M,
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
        Self::M,
        Self::A,
    ];

    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 7) as usize]
    }
}

/// Register pair field for LXI/DAD/INX/DCX/STAX/LDAX.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegPair {
    B,
    D,
    H,
    Sp,
}

impl RegPair {
    const fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => Self::B,
            1 => Self::D,
            2 => Self::H,
            _ => Self::Sp,
        }
    }
}

/// Register pair field for PUSH/POP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackPair {
    B,
    D,
    H,
    Psw,
}

impl StackPair {
    const fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => Self::B,
            1 => Self::D,
            2 => Self::H,
            _ => Self::Psw,
        }
    }
}

/// Branch condition field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    NotZero,
    Zero,
    NoCarry,
    Carry,
    ParityOdd,
    ParityEven,
    Plus,
    Minus,
}

impl Condition {
    const ALL: [Self; 8] = [
        Self::NotZero,
        Self::Zero,
        Self::NoCarry,
        Self::Carry,
        Self::ParityOdd,
        Self::ParityEven,
        Self::Plus,
        Self::Minus,
    ];

    const fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 7) as usize]
    }

    const fn suffix(self) -> &'static str {
        match self {
            Self::NotZero => "NZ",
            Self::Zero => "Z",
            Self::NoCarry => "NC",
            Self::Carry => "C",
            Self::ParityOdd => "PO",
            Self::ParityEven => "PE",
            Self::Plus => "P",
            Self::Minus => "M",
        }
    }
}

/// Accumulator operation field, shared by the register and immediate forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbb,
    Ana,
    Xra,
    Ora,
    Cmp,
}

impl AluOp {
    const ALL: [Self; 8] = [
        Self::Add,
        Self::Adc,
        Self::Sub,
        Self::Sbb,
        Self::Ana,
        Self::Xra,
        Self::Ora,
        Self::Cmp,
    ];

    const fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 7) as usize]
    }

    const fn register_mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Adc => "ADC",
            Self::Sub => "SUB",
            Self::Sbb => "SBB",
            Self::Ana => "ANA",
            Self::Xra => "XRA",
            Self::Ora => "ORA",
            Self::Cmp => "CMP",
        }
    }

    const fn immediate_mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADI",
            Self::Adc => "ACI",
            Self::Sub => "SUI",
            Self::Sbb => "SBI",
            Self::Ana => "ANI",
            Self::Xra => "XRI",
            Self::Ora => "ORI",
            Self::Cmp => "CPI",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Nop,
    Lxi(RegPair),
    Dad(RegPair),
    Inx(RegPair),
    Dcx(RegPair),
    Stax(RegPair),
    Ldax(RegPair),
    Shld,
    Lhld,
    Sta,
    Lda,
    Inr(Reg),
    Dcr(Reg),
    Mvi(Reg),
    Rlc,
    Rrc,
    Ral,
    Rar,
    Daa,
    Cma,
    Stc,
    Cmc,
    Mov(Reg, Reg),
    Hlt,
    Alu(AluOp, Reg),
    AluImmediate(AluOp),
    Ret,
    RetIf(Condition),
    Jmp,
    JmpIf(Condition),
    Call,
    CallIf(Condition),
    Rst(u8),
    Push(StackPair),
    Pop(StackPair),
    Pchl,
    Sphl,
    Xthl,
    Xchg,
    Out,
    In,
    Di,
    Ei,
}

/// An immediate operand as it appears after the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    None,
    Byte(u8),
    Word(u16),
}

impl Instruction {
    /// Decode an opcode byte. Total: every byte is an instruction.
    #[must_use]
    pub const fn decode(opcode: u8) -> Self {
        let y = (opcode >> 3) & 7;
        let z = opcode & 7;
        let p = y >> 1;
        let odd = y & 1 == 1;

        match opcode >> 6 {
            0 => match z {
                0 => Self::Nop,
                1 if odd => Self::Dad(RegPair::from_bits(p)),
                1 => Self::Lxi(RegPair::from_bits(p)),
                2 => match (p, odd) {
                    (0 | 1, false) => Self::Stax(RegPair::from_bits(p)),
                    (0 | 1, true) => Self::Ldax(RegPair::from_bits(p)),
                    (2, false) => Self::Shld,
                    (2, true) => Self::Lhld,
                    (_, false) => Self::Sta,
                    (_, true) => Self::Lda,
                },
                3 if odd => Self::Dcx(RegPair::from_bits(p)),
                3 => Self::Inx(RegPair::from_bits(p)),
                4 => Self::Inr(Reg::from_bits(y)),
                5 => Self::Dcr(Reg::from_bits(y)),
                6 => Self::Mvi(Reg::from_bits(y)),
                _ => match y {
                    0 => Self::Rlc,
                    1 => Self::Rrc,
                    2 => Self::Ral,
                    3 => Self::Rar,
                    4 => Self::Daa,
                    5 => Self::Cma,
                    6 => Self::Stc,
                    _ => Self::Cmc,
                },
            },
            1 if y == 6 && z == 6 => Self::Hlt,
            1 => Self::Mov(Reg::from_bits(y), Reg::from_bits(z)),
            2 => Self::Alu(AluOp::from_bits(y), Reg::from_bits(z)),
            _ => match z {
                0 => Self::RetIf(Condition::from_bits(y)),
                1 => match (p, odd) {
                    (_, false) => Self::Pop(StackPair::from_bits(p)),
                    (0 | 1, true) => Self::Ret,
                    (2, true) => Self::Pchl,
                    (_, true) => Self::Sphl,
                },
                2 => Self::JmpIf(Condition::from_bits(y)),
                3 => match y {
                    0 | 1 => Self::Jmp,
                    2 => Self::Out,
                    3 => Self::In,
                    4 => Self::Xthl,
                    5 => Self::Xchg,
                    6 => Self::Di,
                    _ => Self::Ei,
                },
                4 => Self::CallIf(Condition::from_bits(y)),
                5 if odd => Self::Call,
                5 => Self::Push(StackPair::from_bits(p)),
                6 => Self::AluImmediate(AluOp::from_bits(y)),
                _ => Self::Rst(y),
            },
        }
    }

    /// Instruction length in bytes, opcode included.
    #[must_use]
    pub const fn size(self) -> u16 {
        match self {
            Self::Mvi(_) | Self::AluImmediate(_) | Self::Out | Self::In => 2,
            Self::Lxi(_)
            | Self::Shld
            | Self::Lhld
            | Self::Sta
            | Self::Lda
            | Self::Jmp
            | Self::JmpIf(_)
            | Self::Call
            | Self::CallIf(_) => 3,
            _ => 1,
        }
    }

    /// Clock cycles. Conditional calls and returns cost more when taken.
    #[must_use]
    pub const fn cycles(self, taken: bool) -> u32 {
        match self {
            Self::Nop
            | Self::Rlc
            | Self::Rrc
            | Self::Ral
            | Self::Rar
            | Self::Daa
            | Self::Cma
            | Self::Stc
            | Self::Cmc
            | Self::Xchg
            | Self::Di
            | Self::Ei => 4,
            Self::Inx(_) | Self::Dcx(_) | Self::Pchl | Self::Sphl => 5,
            Self::Inr(Reg::M) | Self::Dcr(Reg::M) | Self::Mvi(Reg::M) => 10,
            Self::Inr(_) | Self::Dcr(_) => 5,
            Self::Mvi(_) | Self::Stax(_) | Self::Ldax(_) | Self::Hlt => 7,
            Self::Mov(Reg::M, _) | Self::Mov(_, Reg::M) => 7,
            Self::Mov(_, _) => 5,
            Self::Alu(_, Reg::M) | Self::AluImmediate(_) => 7,
            Self::Alu(_, _) => 4,
            Self::Lxi(_)
            | Self::Dad(_)
            | Self::Jmp
            | Self::JmpIf(_)
            | Self::Ret
            | Self::Pop(_)
            | Self::Out
            | Self::In => 10,
            Self::Push(_) | Self::Rst(_) => 11,
            Self::Sta | Self::Lda => 13,
            Self::Shld | Self::Lhld => 16,
            Self::Call => 17,
            Self::Xthl => 18,
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
                    11
                }
            }
        }
    }

    /// Mnemonic with operands, as printed by the disassembler.
    #[must_use]
    pub fn format(self, operand: Operand) -> String {
        let text = self.to_string();
        match operand {
            Operand::None => text,
            Operand::Byte(n) if text.ends_with(',') => format!("{text}{n:02x}"),
            Operand::Byte(n) => format!("{text} {n:02x}"),
            Operand::Word(nn) if text.ends_with(',') => format!("{text}{nn:04x}"),
            Operand::Word(nn) => format!("{text} {nn:04x}"),
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for RegPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::B => "B",
            Self::D => "D",
            Self::H => "H",
            Self::Sp => "SP",
        })
    }
}

impl fmt::Display for StackPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::B => "B",
            Self::D => "D",
            Self::H => "H",
            Self::Psw => "PSW",
        })
    }
}

/// The mnemonic without immediates. Instructions that take an immediate
/// after a register end with a comma.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nop => f.write_str("NOP"),
            Self::Lxi(rp) => write!(f, "LXI {rp},"),
            Self::Dad(rp) => write!(f, "DAD {rp}"),
            Self::Inx(rp) => write!(f, "INX {rp}"),
            Self::Dcx(rp) => write!(f, "DCX {rp}"),
            Self::Stax(rp) => write!(f, "STAX {rp}"),
            Self::Ldax(rp) => write!(f, "LDAX {rp}"),
            Self::Shld => f.write_str("SHLD"),
            Self::Lhld => f.write_str("LHLD"),
            Self::Sta => f.write_str("STA"),
            Self::Lda => f.write_str("LDA"),
            Self::Inr(r) => write!(f, "INR {r}"),
            Self::Dcr(r) => write!(f, "DCR {r}"),
            Self::Mvi(r) => write!(f, "MVI {r},"),
            Self::Rlc => f.write_str("RLC"),
            Self::Rrc => f.write_str("RRC"),
            Self::Ral => f.write_str("RAL"),
            Self::Rar => f.write_str("RAR"),
            Self::Daa => f.write_str("DAA"),
            Self::Cma => f.write_str("CMA"),
            Self::Stc => f.write_str("STC"),
            Self::Cmc => f.write_str("CMC"),
            Self::Mov(dst, src) => write!(f, "MOV {dst},{src}"),
            Self::Hlt => f.write_str("HLT"),
            Self::Alu(op, r) => write!(f, "{} {r}", op.register_mnemonic()),
            Self::AluImmediate(op) => f.write_str(op.immediate_mnemonic()),
            Self::Ret => f.write_str("RET"),
            Self::RetIf(cc) => write!(f, "R{}", cc.suffix()),
            Self::Jmp => f.write_str("JMP"),
            Self::JmpIf(cc) => write!(f, "J{}", cc.suffix()),
            Self::Call => f.write_str("CALL"),
            Self::CallIf(cc) => write!(f, "C{}", cc.suffix()),
            Self::Rst(n) => write!(f, "RST {n}"),
            Self::Push(rp) => write!(f, "PUSH {rp}"),
            Self::Pop(rp) => write!(f, "POP {rp}"),
            Self::Pchl => f.write_str("PCHL"),
            Self::Sphl => f.write_str("SPHL"),
            Self::Xthl => f.write_str("XTHL"),
            Self::Xchg => f.write_str("XCHG"),
            Self::Out => f.write_str("OUT"),
            Self::In => f.write_str("IN"),
            Self::Di => f.write_str("DI"),
            Self::Ei => f.write_str("EI"),
        }
    }
}
