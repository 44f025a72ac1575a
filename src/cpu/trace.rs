//! Instruction trace.
//!
//! When enabled, the CPU appends one line per tick to a [`TraceLog`]:
//!
//! ```text
//! 0x0000:	SET	A,	0x0005
//! 0x0002:	JSR	0x0010
//! ```
//!
//! Skipped instructions are traced too. The log only observes; it never
//! influences execution.

use crate::cpu::Word;
use crate::cpu::location::Location;

/// Render one trace line, without the trailing newline.
///
/// Non-basic instructions have no destination and render a single operand.
pub fn format_line(addr: Word, mnemonic: &str, dst: Option<Location>, src: Location) -> String {
    match dst {
        Some(dst) => format!("0x{:04X}:\t{}\t{},\t{}", addr, mnemonic, dst, src),
        None => format!("0x{:04X}:\t{}\t{}", addr, mnemonic, src),
    }
}

/// Append-only trace text owned by one CPU.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceLog {
    text: String,
    lines: usize,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line.
    pub fn record(&mut self, addr: Word, mnemonic: &str, dst: Option<Location>, src: Location) {
        self.text.push_str(&format_line(addr, mnemonic, dst, src));
        self.text.push('\n');
        self.lines += 1;
    }

    /// The accumulated text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of recorded lines.
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.lines = 0;
    }

    /// Hand the accumulated text to the caller and start over.
    pub fn take(&mut self) -> String {
        self.lines = 0;
        std::mem::take(&mut self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::registers::Reg;

    #[test]
    fn test_format_basic_line() {
        let line = format_line(
            0x0A,
            "ADD",
            Some(Location::Memory(0x1000)),
            Location::Register(Reg::B),
        );
        assert_eq!(line, "0x000A:\tADD\t[0x1000],\tB");
    }

    #[test]
    fn test_format_non_basic_line() {
        let line = format_line(0xFFFF, "JSR", None, Location::Literal(0x20));
        assert_eq!(line, "0xFFFF:\tJSR\t0x0020");
    }

    #[test]
    fn test_record_and_take() {
        let mut log = TraceLog::new();
        log.record(0, "SET", Some(Location::Register(Reg::A)), Location::Literal(5));
        log.record(2, "SET", Some(Location::Register(Reg::B)), Location::Literal(6));

        assert_eq!(log.lines(), 2);
        assert_eq!(
            log.as_str(),
            "0x0000:\tSET\tA,\t0x0005\n0x0002:\tSET\tB,\t0x0006\n"
        );

        let text = log.take();
        assert_eq!(text.lines().count(), 2);
        assert!(log.is_empty());
        assert_eq!(log.as_str(), "");
    }

    #[test]
    fn test_clear() {
        let mut log = TraceLog::new();
        log.record(0, "IFE", Some(Location::Register(Reg::A)), Location::Literal(0));
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.as_str(), "");
    }
}
