//! CPU emulation for the DCPU-16.
//!
//! This module implements the complete DCPU-16 architecture:
//! - 0x10000 sixteen-bit memory words
//! - 8 general purpose registers plus PC, SP and O (overflow)
//! - 15 basic two-operand instructions and the non-basic JSR
//! - a one-instruction skip used by the IFx conditionals

pub mod memory;
pub mod registers;
pub mod decode;
pub mod location;
pub mod execute;
pub mod trace;

/// The machine word: all values, addresses and registers are 16 bits.
pub type Word = u16;

pub use memory::{Memory, MEMORY_SIZE};
pub use registers::{Reg, Registers};
pub use decode::{decode, encode, BasicOp, Instruction, NonBasicOp, Operand};
pub use location::Location;
pub use execute::{Cpu, CpuState, Snapshot};
pub use trace::TraceLog;
