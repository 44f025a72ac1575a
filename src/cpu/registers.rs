//! DCPU-16 registers.
//!
//! The DCPU-16 has 11 registers:
//! - A, B, C, X, Y, Z, I, J: general purpose (ids 0-7)
//! - PC: program counter
//! - SP: stack pointer, starts at 0xFFFF and grows downward
//! - O: overflow, receives carry/borrow/high bits of arithmetic

use crate::cpu::Word;
use serde::{Serialize, Deserialize};
use std::fmt;

/// Initial value of the stack pointer.
pub const STACK_TOP: Word = 0xFFFF;

/// Canonical register id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reg {
    A,
    B,
    C,
    X,
    Y,
    Z,
    I,
    J,
    /// Stack pointer
    Sp,
    /// Program counter
    Pc,
    /// Overflow
    O,
}

impl Reg {
    /// The general purpose registers, in encoding order.
    pub const GENERAL: [Reg; 8] = [
        Reg::A, Reg::B, Reg::C, Reg::X, Reg::Y, Reg::Z, Reg::I, Reg::J,
    ];

    /// Get a general purpose register from its 3-bit id.
    ///
    /// Only the low three bits of `index` are used.
    pub const fn from_index(index: u8) -> Self {
        Self::GENERAL[(index & 0x7) as usize]
    }

    /// The 3-bit id of a general purpose register, `None` for PC, SP and O.
    pub const fn index(self) -> Option<u8> {
        match self {
            Reg::A => Some(0),
            Reg::B => Some(1),
            Reg::C => Some(2),
            Reg::X => Some(3),
            Reg::Y => Some(4),
            Reg::Z => Some(5),
            Reg::I => Some(6),
            Reg::J => Some(7),
            Reg::Sp | Reg::Pc | Reg::O => None,
        }
    }

    /// Assembly name of the register.
    pub const fn name(self) -> &'static str {
        match self {
            Reg::A => "A",
            Reg::B => "B",
            Reg::C => "C",
            Reg::X => "X",
            Reg::Y => "Y",
            Reg::Z => "Z",
            Reg::I => "I",
            Reg::J => "J",
            Reg::Sp => "SP",
            Reg::Pc => "PC",
            Reg::O => "O",
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The DCPU-16 register file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// A, B, C, X, Y, Z, I, J
    pub general: [Word; 8],

    /// Program counter
    pub pc: Word,

    /// Stack pointer
    pub sp: Word,

    /// Overflow register
    pub o: Word,
}

impl Registers {
    /// Create a register file in its power-on state.
    pub fn new() -> Self {
        Self {
            general: [0; 8],
            pc: 0,
            sp: STACK_TOP,
            o: 0,
        }
    }

    /// Reset all registers to their power-on state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Read a register.
    #[inline]
    pub fn get(&self, reg: Reg) -> Word {
        match reg {
            Reg::Sp => self.sp,
            Reg::Pc => self.pc,
            Reg::O => self.o,
            general => self.general[Self::slot(general)],
        }
    }

    /// Write a register.
    #[inline]
    pub fn set(&mut self, reg: Reg, value: Word) {
        match reg {
            Reg::Sp => self.sp = value,
            Reg::Pc => self.pc = value,
            Reg::O => self.o = value,
            general => self.general[Self::slot(general)] = value,
        }
    }

    /// Increment the program counter by 1 (wrapping).
    /// Returns the old value.
    pub fn advance_pc(&mut self) -> Word {
        let old = self.pc;
        self.pc = self.pc.wrapping_add(1);
        old
    }

    fn slot(reg: Reg) -> usize {
        reg.index().map_or(0, usize::from)
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_on_state() {
        let regs = Registers::new();
        assert_eq!(regs.sp, 0xFFFF);
        assert_eq!(regs.pc, 0);
        assert_eq!(regs.o, 0);
        assert_eq!(regs.general, [0; 8]);
    }

    #[test]
    fn test_index_roundtrip() {
        for (i, reg) in Reg::GENERAL.iter().enumerate() {
            assert_eq!(Reg::from_index(i as u8), *reg);
            assert_eq!(reg.index(), Some(i as u8));
        }
        assert_eq!(Reg::Pc.index(), None);
    }

    #[test]
    fn test_get_set() {
        let mut regs = Registers::new();
        regs.set(Reg::X, 0x1234);
        regs.set(Reg::Sp, 0xFFF0);
        regs.set(Reg::O, 1);

        assert_eq!(regs.get(Reg::X), 0x1234);
        assert_eq!(regs.general[3], 0x1234);
        assert_eq!(regs.get(Reg::Sp), 0xFFF0);
        assert_eq!(regs.get(Reg::O), 1);
        assert_eq!(regs.get(Reg::A), 0);
    }

    #[test]
    fn test_advance_pc_wraps() {
        let mut regs = Registers::new();
        regs.pc = 0xFFFF;

        let old = regs.advance_pc();
        assert_eq!(old, 0xFFFF);
        assert_eq!(regs.pc, 0);
    }
}
