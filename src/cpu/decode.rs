//! Instruction decoder for the DCPU-16.
//!
//! Every instruction starts with one word laid out as `bbbbbbaaaaaaoooo`:
//! - bits 0-3: opcode
//! - bits 4-9: operand `a` (destination)
//! - bits 10-15: operand `b` (source)
//!
//! Opcode 0 is the non-basic group: the `a` field selects the operation and
//! `b` is its only operand. Some operand modes read one extra word following
//! the instruction.

use crate::cpu::Word;
use crate::cpu::registers::Reg;
use serde::{Serialize, Deserialize};

/// Bias subtracted from short literal operand codes (0x20-0x3F).
pub const SHORT_LITERAL_BASE: u8 = 0x20;

/// A typed operand code, before it is resolved against machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    /// 0x00-0x07 general purpose register, 0x1B SP, 0x1C PC, 0x1D O
    Register(Reg),
    /// 0x08-0x0F `[register]`
    Indirect(Reg),
    /// 0x10-0x17 `[next word + register]`
    Indexed(Reg),
    /// 0x18 `[SP++]`
    Pop,
    /// 0x19 `[SP]`
    Peek,
    /// 0x1A `[--SP]`
    Push,
    /// 0x1E `[next word]`
    IndirectNextWord,
    /// 0x1F next word as a literal
    NextWord,
    /// 0x20-0x3F literal `code - 0x20`
    Literal(Word),
}

impl Operand {
    /// Decode a 6-bit operand code. Higher bits are ignored.
    pub fn from_code(code: u8) -> Self {
        let code = code & 0x3F;
        match code {
            0x00..=0x07 => Operand::Register(Reg::from_index(code)),
            0x08..=0x0F => Operand::Indirect(Reg::from_index(code)),
            0x10..=0x17 => Operand::Indexed(Reg::from_index(code)),
            0x18 => Operand::Pop,
            0x19 => Operand::Peek,
            0x1A => Operand::Push,
            0x1B => Operand::Register(Reg::Sp),
            0x1C => Operand::Register(Reg::Pc),
            0x1D => Operand::Register(Reg::O),
            0x1E => Operand::IndirectNextWord,
            0x1F => Operand::NextWord,
            _ => Operand::Literal(Word::from(code - SHORT_LITERAL_BASE)),
        }
    }

    /// Encode back to a 6-bit operand code.
    ///
    /// `Indirect` and `Indexed` only encode general purpose registers, and
    /// short literals keep their low five bits.
    pub fn code(self) -> u8 {
        match self {
            Operand::Register(Reg::Sp) => 0x1B,
            Operand::Register(Reg::Pc) => 0x1C,
            Operand::Register(Reg::O) => 0x1D,
            Operand::Register(reg) => general_index(reg),
            Operand::Indirect(reg) => 0x08 | general_index(reg),
            Operand::Indexed(reg) => 0x10 | general_index(reg),
            Operand::Pop => 0x18,
            Operand::Peek => 0x19,
            Operand::Push => 0x1A,
            Operand::IndirectNextWord => 0x1E,
            Operand::NextWord => 0x1F,
            Operand::Literal(value) => SHORT_LITERAL_BASE | (value as u8 & 0x1F),
        }
    }

    /// Does resolving this operand consume the next instruction word?
    pub fn uses_next_word(self) -> bool {
        matches!(
            self,
            Operand::Indexed(_) | Operand::IndirectNextWord | Operand::NextWord
        )
    }
}

fn general_index(reg: Reg) -> u8 {
    reg.index().unwrap_or(0)
}

/// Basic opcodes (1-15), taking a destination and a source operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    And,
    Bor,
    Xor,
    Ife,
    Ifn,
    Ifg,
    Ifb,
}

impl BasicOp {
    /// Decode the opcode nibble. Returns `None` for 0 (non-basic).
    pub fn from_nibble(nibble: u8) -> Option<Self> {
        let op = match nibble & 0xF {
            0x1 => BasicOp::Set,
            0x2 => BasicOp::Add,
            0x3 => BasicOp::Sub,
            0x4 => BasicOp::Mul,
            0x5 => BasicOp::Div,
            0x6 => BasicOp::Mod,
            0x7 => BasicOp::Shl,
            0x8 => BasicOp::Shr,
            0x9 => BasicOp::And,
            0xA => BasicOp::Bor,
            0xB => BasicOp::Xor,
            0xC => BasicOp::Ife,
            0xD => BasicOp::Ifn,
            0xE => BasicOp::Ifg,
            0xF => BasicOp::Ifb,
            _ => return None,
        };
        Some(op)
    }

    pub fn nibble(self) -> u8 {
        match self {
            BasicOp::Set => 0x1,
            BasicOp::Add => 0x2,
            BasicOp::Sub => 0x3,
            BasicOp::Mul => 0x4,
            BasicOp::Div => 0x5,
            BasicOp::Mod => 0x6,
            BasicOp::Shl => 0x7,
            BasicOp::Shr => 0x8,
            BasicOp::And => 0x9,
            BasicOp::Bor => 0xA,
            BasicOp::Xor => 0xB,
            BasicOp::Ife => 0xC,
            BasicOp::Ifn => 0xD,
            BasicOp::Ifg => 0xE,
            BasicOp::Ifb => 0xF,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            BasicOp::Set => "SET",
            BasicOp::Add => "ADD",
            BasicOp::Sub => "SUB",
            BasicOp::Mul => "MUL",
            BasicOp::Div => "DIV",
            BasicOp::Mod => "MOD",
            BasicOp::Shl => "SHL",
            BasicOp::Shr => "SHR",
            BasicOp::And => "AND",
            BasicOp::Bor => "BOR",
            BasicOp::Xor => "XOR",
            BasicOp::Ife => "IFE",
            BasicOp::Ifn => "IFN",
            BasicOp::Ifg => "IFG",
            BasicOp::Ifb => "IFB",
        }
    }

    /// IFE, IFN, IFG and IFB only read their operands and may skip the
    /// following instruction.
    pub fn is_conditional(self) -> bool {
        matches!(self, BasicOp::Ife | BasicOp::Ifn | BasicOp::Ifg | BasicOp::Ifb)
    }
}

/// Non-basic opcodes, selected by the `a` field when the opcode is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NonBasicOp {
    /// 0x01: push the return address, jump to the operand
    Jsr,
    /// Any other sub-opcode. Executes as a no-op.
    Reserved(u8),
}

impl NonBasicOp {
    pub fn from_code(code: u8) -> Self {
        match code & 0x3F {
            0x01 => NonBasicOp::Jsr,
            other => NonBasicOp::Reserved(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            NonBasicOp::Jsr => 0x01,
            NonBasicOp::Reserved(code) => code & 0x3F,
        }
    }

    pub fn mnemonic(self) -> String {
        match self {
            NonBasicOp::Jsr => "JSR".to_string(),
            NonBasicOp::Reserved(code) => format!("NB?{:02X}", code),
        }
    }
}

/// Decoded DCPU-16 instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Two-operand instruction: `op dst, src`
    Basic { op: BasicOp, dst: Operand, src: Operand },

    /// Single-operand instruction from the opcode-0 group: `op operand`
    NonBasic { op: NonBasicOp, operand: Operand },
}

impl Instruction {
    /// Length of the instruction in words, including next-word operands.
    pub fn word_count(&self) -> Word {
        let extra = match self {
            Instruction::Basic { dst, src, .. } => {
                Word::from(dst.uses_next_word()) + Word::from(src.uses_next_word())
            }
            Instruction::NonBasic { operand, .. } => Word::from(operand.uses_next_word()),
        };
        1 + extra
    }

    pub fn mnemonic(&self) -> String {
        match self {
            Instruction::Basic { op, .. } => op.mnemonic().to_string(),
            Instruction::NonBasic { op, .. } => op.mnemonic(),
        }
    }
}

/// Split an instruction word into its opcode, `a` and `b` fields.
#[inline]
pub fn fields(word: Word) -> (u8, u8, u8) {
    let opcode = (word & 0xF) as u8;
    let a = ((word >> 4) & 0x3F) as u8;
    let b = ((word >> 10) & 0x3F) as u8;
    (opcode, a, b)
}

/// Decode an instruction word. Every word decodes to some instruction.
pub fn decode(word: Word) -> Instruction {
    let (opcode, a, b) = fields(word);

    match BasicOp::from_nibble(opcode) {
        Some(op) => Instruction::Basic {
            op,
            dst: Operand::from_code(a),
            src: Operand::from_code(b),
        },
        None => Instruction::NonBasic {
            op: NonBasicOp::from_code(a),
            operand: Operand::from_code(b),
        },
    }
}

/// Encode an instruction back to its first word.
/// Next-word operand values are not part of the encoding.
pub fn encode(instr: &Instruction) -> Word {
    let (opcode, a, b) = match instr {
        Instruction::Basic { op, dst, src } => (op.nibble(), dst.code(), src.code()),
        Instruction::NonBasic { op, operand } => (0, op.code(), operand.code()),
    };

    Word::from(opcode) | (Word::from(a) << 4) | (Word::from(b) << 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_set_literal() {
        // SET A, next word
        let instr = decode(0x7C01);
        assert_eq!(
            instr,
            Instruction::Basic {
                op: BasicOp::Set,
                dst: Operand::Register(Reg::A),
                src: Operand::NextWord,
            }
        );
        assert_eq!(instr.word_count(), 2);
    }

    #[test]
    fn test_decode_jsr() {
        // JSR next word
        let instr = decode(0x7C10);
        assert_eq!(
            instr,
            Instruction::NonBasic {
                op: NonBasicOp::Jsr,
                operand: Operand::NextWord,
            }
        );
        assert_eq!(instr.mnemonic(), "JSR");
    }

    #[test]
    fn test_decode_reserved_non_basic() {
        let instr = decode(0x0020);
        assert_eq!(
            instr,
            Instruction::NonBasic {
                op: NonBasicOp::Reserved(0x02),
                operand: Operand::Register(Reg::A),
            }
        );
        assert_eq!(instr.mnemonic(), "NB?02");
    }

    #[test]
    fn test_operand_families() {
        assert_eq!(Operand::from_code(0x03), Operand::Register(Reg::X));
        assert_eq!(Operand::from_code(0x0E), Operand::Indirect(Reg::I));
        assert_eq!(Operand::from_code(0x17), Operand::Indexed(Reg::J));
        assert_eq!(Operand::from_code(0x18), Operand::Pop);
        assert_eq!(Operand::from_code(0x19), Operand::Peek);
        assert_eq!(Operand::from_code(0x1A), Operand::Push);
        assert_eq!(Operand::from_code(0x1B), Operand::Register(Reg::Sp));
        assert_eq!(Operand::from_code(0x1C), Operand::Register(Reg::Pc));
        assert_eq!(Operand::from_code(0x1D), Operand::Register(Reg::O));
        assert_eq!(Operand::from_code(0x1E), Operand::IndirectNextWord);
        assert_eq!(Operand::from_code(0x1F), Operand::NextWord);
        assert_eq!(Operand::from_code(0x20), Operand::Literal(0));
        assert_eq!(Operand::from_code(0x3F), Operand::Literal(0x1F));
    }

    #[test]
    fn test_every_operand_code_roundtrips() {
        for code in 0..0x40u8 {
            assert_eq!(Operand::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_every_word_roundtrips() {
        for word in 0..=Word::MAX {
            assert_eq!(encode(&decode(word)), word);
        }
    }

    #[test]
    fn test_instruction_length() {
        // SET [0x1000+A], 0x1234
        let instr = Instruction::Basic {
            op: BasicOp::Set,
            dst: Operand::Indexed(Reg::A),
            src: Operand::NextWord,
        };
        assert_eq!(instr.word_count(), 3);

        // ADD A, 1
        let instr = Instruction::Basic {
            op: BasicOp::Add,
            dst: Operand::Register(Reg::A),
            src: Operand::Literal(1),
        };
        assert_eq!(instr.word_count(), 1);
    }
}
