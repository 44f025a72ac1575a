//! Disassembler for DCPU-16 programs.
//!
//! Converts instruction words back to readable assembly.

use crate::cpu::Word;
use crate::cpu::decode::{decode, Instruction, Operand};

/// Disassemble the instruction starting at `addr`.
///
/// Next-word operands are read from the following words of `image`; words
/// past the end of the image read as zero. Returns the text and the
/// instruction length in words.
pub fn disassemble_at(image: &[Word], addr: usize) -> (String, usize) {
    let word_at = |offset: usize| image.get(addr + offset).copied().unwrap_or(0);
    let instr = decode(word_at(0));
    let mut next = 1;
    let mut operand = |op: Operand| {
        let value = if op.uses_next_word() {
            let value = word_at(next);
            next += 1;
            value
        } else {
            0
        };
        format_operand(op, value)
    };

    let text = match instr {
        Instruction::Basic { op, dst, src } => {
            let dst = operand(dst);
            let src = operand(src);
            format!("{} {}, {}", op.mnemonic(), dst, src)
        }
        Instruction::NonBasic { op, operand: target } => {
            format!("{} {}", op.mnemonic(), operand(target))
        }
    };

    (text, next)
}

/// Disassemble a whole image, one instruction per line.
pub fn disassemble(image: &[Word]) -> String {
    let mut output = String::new();
    output.push_str("; DCPU-16 Disassembly\n");
    output.push_str("; -------------------\n\n");

    let mut addr = 0;
    while addr < image.len() {
        let (line, len) = disassemble_at(image, addr);
        let end = (addr + len).min(image.len());
        let raw: Vec<String> = image[addr..end]
            .iter()
            .map(|word| format!("{:04x}", word))
            .collect();
        output.push_str(&format!("0x{:04X}: {:<24} ; {}\n", addr, line, raw.join(" ")));
        addr += len;
    }

    output
}

/// Format an operand with its next word, if any.
fn format_operand(operand: Operand, next: Word) -> String {
    match operand {
        Operand::Register(reg) => reg.to_string(),
        Operand::Indirect(reg) => format!("[{}]", reg),
        Operand::Indexed(reg) => format!("[0x{:04X}+{}]", next, reg),
        Operand::Pop => "POP".to_string(),
        Operand::Peek => "PEEK".to_string(),
        Operand::Push => "PUSH".to_string(),
        Operand::IndirectNextWord => format!("[0x{:04X}]", next),
        Operand::NextWord => format!("0x{:04X}", next),
        Operand::Literal(value) => format!("0x{:02X}", value),
    }
}
