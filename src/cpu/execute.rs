//! CPU execution engine for the DCPU-16.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.
//!
//! One tick executes one instruction:
//! 1. fetch the word at PC and advance PC,
//! 2. resolve the destination operand, then the source operand (each may
//!    consume a further word),
//! 3. dispatch on the opcode.
//!
//! PC already points at the next instruction when the operation runs, so
//! `SET PC, x` lands on `x` and `JSR` pushes the address after itself.
//!
//! A failed IFE/IFN/IFG/IFB puts the CPU in [`CpuState::SkipNext`]. The
//! next tick decodes its instruction and consumes its operand words, then
//! discards every effect.

use crate::cpu::{Memory, Registers, Word};
use crate::cpu::decode::{decode, BasicOp, Instruction, NonBasicOp, Operand};
use crate::cpu::location::Location;
use crate::cpu::trace::TraceLog;
use serde::{Serialize, Deserialize};
use tracing::{debug, trace};

/// Value of O after an ADD that carried.
const CARRY: Word = 0x0001;
/// Value of O after a SUB that borrowed.
const BORROW: Word = 0xFFFF;

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CpuState {
    /// The next instruction executes normally.
    #[default]
    Normal,
    /// The next instruction is decoded but has no effect.
    SkipNext,
}

/// Copy of the machine state returned by [`Cpu::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub registers: Registers,
    pub memory: Memory,
    pub state: CpuState,
    pub ticks: u64,
}

/// The DCPU-16 CPU.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// CPU registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Skip state carried into the next tick.
    pub state: CpuState,
    /// Executed ticks, skipped instructions included.
    pub ticks: u64,
    #[serde(skip)]
    trace: Option<TraceLog>,
}

impl Cpu {
    /// Create a new CPU in its power-on state.
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            state: CpuState::Normal,
            ticks: 0,
            trace: None,
        }
    }

    /// Create a CPU that records an instruction trace.
    pub fn with_trace() -> Self {
        let mut cpu = Self::new();
        cpu.enable_trace();
        cpu
    }

    /// Start recording an instruction trace. Keeps an existing log.
    pub fn enable_trace(&mut self) {
        self.trace.get_or_insert_with(TraceLog::new);
    }

    /// The instruction trace, if enabled.
    pub fn trace(&self) -> Option<&TraceLog> {
        self.trace.as_ref()
    }

    /// Mutable access to the instruction trace, e.g. to drain it with
    /// [`TraceLog::take`].
    pub fn trace_mut(&mut self) -> Option<&mut TraceLog> {
        self.trace.as_mut()
    }

    /// Reset the CPU to its power-on state. Memory and trace are cleared.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.state = CpuState::Normal;
        self.ticks = 0;
        if let Some(log) = self.trace.as_mut() {
            log.clear();
        }
    }

    /// Copy a program image into memory from address 0.
    ///
    /// Images longer than memory are truncated. Returns the number of words
    /// copied.
    pub fn load(&mut self, image: &[Word]) -> usize {
        self.mem.load(image)
    }

    /// Execute exactly `max_ticks` instructions and return the final state.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn run(&mut self, max_ticks: u64) -> Snapshot {
        let start = self.ticks;
        for _ in 0..max_ticks {
            self.tick();
        }
        debug!(executed = self.ticks - start, pc = self.regs.pc, "run finished");
        self.snapshot()
    }

    /// Copy the current registers and memory.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            registers: self.regs.clone(),
            memory: self.mem.clone(),
            state: self.state,
            ticks: self.ticks,
        }
    }

    /// Execute a single instruction.
    ///
    /// Returns the decoded instruction, whether or not it was skipped.
    pub fn tick(&mut self) -> Instruction {
        let addr = self.regs.pc;
        let instr = decode(self.next_word());
        let skipped = self.state == CpuState::SkipNext;
        self.state = CpuState::Normal;

        trace!(
            address = addr,
            mnemonic = %instr.mnemonic(),
            skipped,
            "tick"
        );

        match instr {
            Instruction::Basic { op, dst, src } => {
                let dst = self.operand(dst, skipped);
                let src = self.operand(src, skipped);
                if let Some(log) = self.trace.as_mut() {
                    log.record(addr, op.mnemonic(), Some(dst), src);
                }
                if !skipped {
                    self.execute_basic(op, dst, src);
                }
            }
            Instruction::NonBasic { op, operand } => {
                let target = self.operand(operand, skipped);
                if let Some(log) = self.trace.as_mut() {
                    log.record(addr, &op.mnemonic(), None, target);
                }
                if !skipped {
                    self.execute_non_basic(op, target);
                }
            }
        }

        self.ticks += 1;
        instr
    }

    fn operand(&mut self, operand: Operand, skipped: bool) -> Location {
        if skipped {
            self.resolve_skipped(operand)
        } else {
            self.resolve(operand)
        }
    }

    fn execute_non_basic(&mut self, op: NonBasicOp, target: Location) {
        match op {
            NonBasicOp::Jsr => {
                let target = self.read(target);
                self.regs.sp = self.regs.sp.wrapping_sub(1);
                self.mem.write(self.regs.sp, self.regs.pc);
                self.regs.pc = target;
            }
            NonBasicOp::Reserved(code) => {
                debug!(code, "reserved non-basic opcode, ignoring");
            }
        }
    }

    /// Execute a basic instruction on resolved operands.
    fn execute_basic(&mut self, op: BasicOp, dst: Location, src: Location) {
        // Writes to a literal would be discarded anyway; O must not change
        // either. Conditionals still read it.
        if dst.is_literal() && !op.is_conditional() {
            return;
        }

        let a = u32::from(self.read(dst));
        let b = u32::from(self.read(src));

        match op {
            // ==================== Transfer ====================

            BasicOp::Set => self.write(dst, b as Word),

            // ==================== Arithmetic ====================

            BasicOp::Add => {
                let sum = a + b;
                self.write(dst, sum as Word);
                self.regs.o = if sum > 0xFFFF { CARRY } else { 0 };
            }

            BasicOp::Sub => {
                self.write(dst, a.wrapping_sub(b) as Word);
                self.regs.o = if a < b { BORROW } else { 0 };
            }

            BasicOp::Mul => {
                let product = a * b;
                self.write(dst, product as Word);
                self.regs.o = (product >> 16) as Word;
            }

            BasicOp::Div => {
                if b == 0 {
                    self.write(dst, 0);
                    self.regs.o = 0;
                } else {
                    self.write(dst, (a / b) as Word);
                    self.regs.o = ((a << 16) / b) as Word;
                }
            }

            BasicOp::Mod => {
                if b == 0 {
                    self.write(dst, 0);
                    self.regs.o = 0;
                } else {
                    self.write(dst, (a % b) as Word);
                }
            }

            // ==================== Shift Operations ====================

            BasicOp::Shl => {
                let shifted = a.checked_shl(b).unwrap_or(0);
                self.write(dst, shifted as Word);
                self.regs.o = (shifted >> 16) as Word;
            }

            BasicOp::Shr => {
                let shifted = (a << 16).checked_shr(b).unwrap_or(0);
                self.write(dst, (shifted >> 16) as Word);
                self.regs.o = shifted as Word;
            }

            // ==================== Bitwise ====================

            BasicOp::And => self.write(dst, (a & b) as Word),
            BasicOp::Bor => self.write(dst, (a | b) as Word),
            BasicOp::Xor => self.write(dst, (a ^ b) as Word),

            // ==================== Conditionals ====================

            BasicOp::Ife => self.skip_unless(a == b),
            BasicOp::Ifn => self.skip_unless(a != b),
            BasicOp::Ifg => self.skip_unless(a > b),
            BasicOp::Ifb => self.skip_unless(a & b != 0),
        }
    }

    /// Run the next instruction only if `passed`.
    fn skip_unless(&mut self, passed: bool) {
        if !passed {
            self.state = CpuState::SkipNext;
        }
    }

    /// Check if the next instruction will be skipped.
    pub fn is_skipping(&self) -> bool {
        self.state == CpuState::SkipNext
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("ticks", &self.ticks)
            .field("regs", &self.regs)
            .finish()
    }
}
