//! Execution trace: one disassembly line per executed instruction.
//!
//! Lines show the address the instruction ran from, its mnemonic and its
//! operands as they resolved before it executed. Destination operands show
//! the register or `[address]` they name; register sources show the register
//! and its value (`r0=6`). An `out` line also carries the character written.

use crate::instruction::{quote_char, Instruction, Opcode};
use crate::operand::Operand;
use crate::vm::VM;
use std::collections::VecDeque;
use std::fmt::Write;

/// Default number of lines kept
pub const DEFAULT_TRACE_CAPACITY: usize = 1024;

/// Bounded append-only log of executed instructions
#[derive(Debug, Clone)]
pub struct TraceRecorder {
    lines: VecDeque<String>,
    capacity: usize,
    /// Lines recorded over the recorder's lifetime, including evicted ones
    total: u64,
}

impl TraceRecorder {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        TraceRecorder {
            lines: VecDeque::with_capacity(capacity.min(DEFAULT_TRACE_CAPACITY)),
            capacity,
            total: 0,
        }
    }

    /// Append a line, evicting the oldest once full
    pub fn record(&mut self, line: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
        self.total += 1;
    }

    /// Lines oldest first
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|s| s.as_str())
    }

    /// The most recent `n` lines, oldest first
    pub fn last(&self, n: usize) -> Vec<&str> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_recorded(&self) -> u64 {
        self.total
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// Format the trace line for `inst` against the machine state it is about
/// to execute with.
pub fn format_line(vm: &VM, inst: &Instruction) -> String {
    let mut line = String::new();
    write!(line, "{:05}: {}", inst.addr, inst.name()).ok();

    for (i, &raw) in inst.operands.iter().enumerate() {
        line.push(' ');
        if i == 0 && inst.opcode.writes_destination() {
            let _ = match Operand::decode(raw) {
                Ok(Operand::Literal(addr)) => write!(line, "[{}]", addr),
                Ok(Operand::Register(r)) => write!(line, "r{}", r),
                Err(bad) => write!(line, "<bad {}>", bad),
            };
            continue;
        }
        let _ = match Operand::decode(raw) {
            Ok(Operand::Literal(v)) => write!(line, "{}", v),
            Ok(Operand::Register(r)) => write!(line, "r{}={}", r, vm.registers[r]),
            Err(bad) => write!(line, "<bad {}>", bad),
        };
    }

    if inst.opcode == Opcode::Out {
        if let Ok(value) = vm.resolve(inst.operands[0]) {
            write!(line, " {}", quote_char(value)).ok();
        }
    }
    line
}
