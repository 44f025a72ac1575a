//! Program tooling for DCPU-16 images.
//!
//! This module provides a static disassembler (memory image → readable
//! text). Unlike the CPU trace, it renders operands without resolving them
//! against register state.

pub mod disasm;

pub use disasm::{disassemble, disassemble_at};
