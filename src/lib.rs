//! # DCPU-16 Emulator
//!
//! An instruction-set emulator for the DCPU-16, a 16-bit word-addressed
//! processor with eight general purpose registers, a 64K-word address space
//! and an overflow register.
//!
//! ```
//! use dcpu16::{Cpu, Reg};
//!
//! let mut cpu = Cpu::new();
//! // SET A, 5 ; ADD A, 10
//! cpu.load(&[0x7c01, 0x0005, 0x7c02, 0x000a]);
//! let snapshot = cpu.run(2);
//! assert_eq!(snapshot.registers.get(Reg::A), 15);
//! ```

pub mod cpu;
pub mod asm;
pub mod image;

// Re-export commonly used types
pub use cpu::{Cpu, CpuState, Instruction, Location, Memory, Reg, Registers, Snapshot, TraceLog, Word};
pub use asm::{disassemble, disassemble_at};
pub use image::{load_image, ImageError};
