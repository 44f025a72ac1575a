//! Operand resolution.
//!
//! Resolving an [`Operand`] turns it into a [`Location`] that the execution
//! engine can read and write. Resolution has side effects: next-word modes
//! advance PC, and POP/PUSH move SP.

use crate::cpu::{Cpu, Word};
use crate::cpu::decode::Operand;
use crate::cpu::registers::Reg;
use serde::{Serialize, Deserialize};
use std::fmt;

/// A resolved operand. Only lives for the duration of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    /// A register cell
    Register(Reg),
    /// A memory cell
    Memory(Word),
    /// An immutable value; writes are discarded
    Literal(Word),
}

impl Location {
    pub fn is_literal(self) -> bool {
        matches!(self, Location::Literal(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Register(reg) => write!(f, "{}", reg),
            Location::Memory(addr) => write!(f, "[0x{:04X}]", addr),
            Location::Literal(value) => write!(f, "0x{:04X}", value),
        }
    }
}

impl Cpu {
    /// Read the word at PC and advance PC past it.
    pub(crate) fn next_word(&mut self) -> Word {
        let addr = self.regs.advance_pc();
        self.mem.read(addr)
    }

    /// Resolve an operand against the current machine state.
    ///
    /// Consumes the next instruction word for `[next+reg]`, `[next]` and
    /// `next` operands. POP increments SP after locating the cell, PUSH
    /// decrements SP before.
    pub fn resolve(&mut self, operand: Operand) -> Location {
        let next = if operand.uses_next_word() { self.next_word() } else { 0 };
        let location = self.locate(operand, next);

        match operand {
            Operand::Pop => self.regs.sp = self.regs.sp.wrapping_add(1),
            Operand::Push => self.regs.sp = self.regs.sp.wrapping_sub(1),
            _ => {}
        }

        location
    }

    /// Resolve an operand of a skipped instruction.
    ///
    /// Next words are still consumed so PC lands on the following
    /// instruction, but SP is left alone.
    pub(crate) fn resolve_skipped(&mut self, operand: Operand) -> Location {
        let next = if operand.uses_next_word() { self.next_word() } else { 0 };
        self.locate(operand, next)
    }

    fn locate(&self, operand: Operand, next: Word) -> Location {
        let sp = self.regs.sp;
        match operand {
            Operand::Register(reg) => Location::Register(reg),
            Operand::Indirect(reg) => Location::Memory(self.regs.get(reg)),
            Operand::Indexed(reg) => Location::Memory(self.regs.get(reg).wrapping_add(next)),
            Operand::Pop | Operand::Peek => Location::Memory(sp),
            Operand::Push => Location::Memory(sp.wrapping_sub(1)),
            Operand::IndirectNextWord => Location::Memory(next),
            Operand::NextWord => Location::Literal(next),
            Operand::Literal(value) => Location::Literal(value),
        }
    }

    /// Current value of a location.
    #[inline]
    pub fn read(&self, location: Location) -> Word {
        match location {
            Location::Register(reg) => self.regs.get(reg),
            Location::Memory(addr) => self.mem.read(addr),
            Location::Literal(value) => value,
        }
    }

    /// Store a value into a location. Writes to a literal do nothing.
    #[inline]
    pub fn write(&mut self, location: Location, value: Word) {
        match location {
            Location::Register(reg) => self.regs.set(reg, value),
            Location::Memory(addr) => self.mem.write(addr, value),
            Location::Literal(_) => {}
        }
    }
}
