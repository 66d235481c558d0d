use crate::disassembler::Disassembler;
use crate::error::VmError;
use crate::interpreter::{decode_text, ExecutionResult, Interpreter, MachineState};
use crate::operand::{MAX_LITERAL, NUM_REGISTERS};
use log::debug;
use std::fmt::Write;

/// Trace lines kept for `history` while debugging
const HISTORY_SIZE: usize = 100;

/// Why `continue_execution` stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Breakpoint(u16),
    Halted,
    AwaitingInput,
    StepLimit,
}

/// A debugger for step-by-step execution and inspection
pub struct Debugger {
    /// Interpreter being debugged
    pub interpreter: Interpreter,
    /// Breakpoints (PC addresses), kept sorted
    breakpoints: Vec<u16>,
}

impl Debugger {
    /// Wrap an interpreter
    pub fn new(interpreter: Interpreter) -> Self {
        Debugger {
            interpreter,
            breakpoints: Vec::new(),
        }
    }

    /// Wrap an interpreter, switching tracing on if it was off so that
    /// `history` has something to show
    pub fn with_history(mut interpreter: Interpreter) -> Self {
        if interpreter.trace().is_none() {
            interpreter.enable_trace(HISTORY_SIZE);
        }
        Debugger::new(interpreter)
    }

    /// Add a breakpoint. Returns false if it already existed.
    pub fn add_breakpoint(&mut self, pc: u16) -> bool {
        match self.breakpoints.binary_search(&pc) {
            Ok(_) => false,
            Err(pos) => {
                self.breakpoints.insert(pos, pc);
                true
            }
        }
    }

    /// Remove a breakpoint. Returns false if there was none.
    pub fn remove_breakpoint(&mut self, pc: u16) -> bool {
        match self.breakpoints.binary_search(&pc) {
            Ok(pos) => {
                self.breakpoints.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn breakpoints(&self) -> &[u16] {
        &self.breakpoints
    }

    /// Execute a single instruction
    pub fn step(&mut self) -> Result<ExecutionResult, VmError> {
        self.interpreter.step()
    }

    /// Run until a breakpoint, halt, input suspension or `max_steps`
    /// instructions. The instruction at the current PC always executes, so
    /// continuing from a breakpoint makes progress.
    pub fn continue_execution(&mut self, max_steps: Option<u64>) -> Result<StopReason, VmError> {
        let mut steps: u64 = 0;
        loop {
            if let Some(limit) = max_steps {
                if steps >= limit {
                    return Ok(StopReason::StepLimit);
                }
            }
            match self.interpreter.step()? {
                ExecutionResult::Halted => return Ok(StopReason::Halted),
                ExecutionResult::AwaitingInput => return Ok(StopReason::AwaitingInput),
                ExecutionResult::Continue | ExecutionResult::Jumped => steps += 1,
            }
            let pc = self.interpreter.vm.pc;
            if self.breakpoints.binary_search(&pc).is_ok() {
                debug!("Hit breakpoint at {:05}", pc);
                return Ok(StopReason::Breakpoint(pc));
            }
        }
    }

    /// Queue a line of input for the program
    pub fn feed_line(&mut self, text: &str) -> Result<(), VmError> {
        self.interpreter.queue_line(text)
    }

    /// Set a register to a 15-bit value
    pub fn set_register(&mut self, index: usize, value: u16) -> Result<(), String> {
        if value > MAX_LITERAL {
            return Err(format!("Value {} does not fit in 15 bits", value));
        }
        if !self.interpreter.vm.set_register(index, value) {
            return Err(format!("No register r{}", index));
        }
        Ok(())
    }

    /// Write a word of memory
    pub fn poke(&mut self, addr: u16, value: u16) -> Result<(), String> {
        if addr > MAX_LITERAL {
            return Err(format!("Address {} outside memory", addr));
        }
        self.interpreter.vm.write_memory(addr, value);
        Ok(())
    }

    /// Read `count` words of memory starting at `addr`
    pub fn peek(&self, addr: u16, count: usize) -> Vec<u16> {
        (0..count)
            .map(|i| self.interpreter.vm.memory.read(addr as usize + i))
            .collect()
    }

    /// Disassemble `count` instructions at `addr`
    pub fn disassemble_at(&self, addr: u16, count: usize) -> Vec<String> {
        Disassembler::new(self.interpreter.vm.memory.words()).disassemble(addr, count)
    }

    /// Output produced since it was last collected
    pub fn take_output(&mut self) -> String {
        decode_text(&self.interpreter.take_output())
    }

    /// Human-readable summary of the machine state
    pub fn state_report(&self) -> String {
        let vm = &self.interpreter.vm;
        let mut out = String::new();
        writeln!(out, "=== VM State ===").ok();
        writeln!(
            out,
            "PC: {:05}  state: {:?}  executed: {}",
            vm.pc,
            self.interpreter.state(),
            self.interpreter.instruction_count()
        )
        .ok();
        if let Some(line) = self.disassemble_at(vm.pc, 1).first() {
            writeln!(out, "Current: {}", line).ok();
        }
        let regs: Vec<String> = vm
            .registers
            .iter()
            .enumerate()
            .map(|(i, v)| format!("r{}={}", i, v))
            .collect();
        writeln!(out, "Registers: {}", regs.join(" ")).ok();
        writeln!(out, "Stack depth: {}", vm.stack.len()).ok();
        for (i, value) in vm.stack.iter().rev().take(5).enumerate() {
            writeln!(out, "  [{}] {}", i, value).ok();
        }
        if let Some(trace) = self.interpreter.trace() {
            let recent = trace.last(5);
            if !recent.is_empty() {
                writeln!(out, "Recent instructions:").ok();
                for line in recent {
                    writeln!(out, "  {}", line).ok();
                }
            }
        }
        out
    }

    /// Run a debugger command and return what it printed
    pub fn execute_command(&mut self, command: &str) -> String {
        let parts: Vec<&str> = command.split_whitespace().collect();
        let result = match parts.as_slice() {
            [] | ["n"] | ["next"] => self.cmd_step(1),
            ["n", count] | ["next", count] => match parse_number(count) {
                Some(n) => self.cmd_step(n as u64),
                None => Err(format!("Invalid count: {}", count)),
            },
            ["c"] | ["continue"] => self.cmd_continue(),
            ["s"] | ["state"] => Ok(self.state_report()),
            ["h"] | ["history"] => Ok(self.history(10)),
            ["d"] | ["disasm"] => Ok(self.disassemble_at(self.interpreter.vm.pc, 5).join("\n")),
            ["d", addr] | ["disasm", addr] => parse_address(addr)
                .map(|a| self.disassemble_at(a, 5).join("\n")),
            ["d", addr, count] | ["disasm", addr, count] => {
                match (parse_address(addr), parse_number(count)) {
                    (Ok(a), Some(n)) => Ok(self.disassemble_at(a, n as usize).join("\n")),
                    (Err(e), _) => Err(e),
                    (_, None) => Err(format!("Invalid count: {}", count)),
                }
            }
            ["b", addr] => parse_address(addr).map(|a| {
                if self.add_breakpoint(a) {
                    format!("Breakpoint added at {:05}", a)
                } else {
                    format!("Breakpoint already exists at {:05}", a)
                }
            }),
            ["rb", addr] => parse_address(addr).map(|a| {
                if self.remove_breakpoint(a) {
                    format!("Breakpoint removed from {:05}", a)
                } else {
                    format!("No breakpoint at {:05}", a)
                }
            }),
            ["bl"] => Ok(if self.breakpoints.is_empty() {
                "No breakpoints set.".to_string()
            } else {
                self.breakpoints
                    .iter()
                    .map(|bp| format!("  {:05}", bp))
                    .collect::<Vec<_>>()
                    .join("\n")
            }),
            ["set", reg, value] => self.cmd_set(reg, value),
            ["poke", addr, value] => match (parse_address(addr), parse_number(value)) {
                (Ok(a), Some(v)) => self.poke(a, v).map(|_| format!("[{}] = {}", a, v)),
                (Err(e), _) => Err(e),
                (_, None) => Err(format!("Invalid value: {}", value)),
            },
            ["peek", addr] => parse_address(addr).map(|a| format!("[{}] = {}", a, self.peek(a, 1)[0])),
            _ => Err(HELP.to_string()),
        };
        match result {
            Ok(text) | Err(text) => text,
        }
    }

    fn history(&self, count: usize) -> String {
        match self.interpreter.trace() {
            Some(trace) if !trace.is_empty() => trace.last(count).join("\n"),
            Some(_) => "No instructions executed yet.".to_string(),
            None => "Tracing is off.".to_string(),
        }
    }

    fn cmd_step(&mut self, count: u64) -> Result<String, String> {
        let mut out = String::new();
        for _ in 0..count {
            match self.step() {
                Ok(ExecutionResult::Halted) => {
                    out.push_str("Machine halted.\n");
                    break;
                }
                Ok(ExecutionResult::AwaitingInput) => {
                    out.push_str("Awaiting input.\n");
                    break;
                }
                Ok(_) => {}
                Err(e) => return Err(format!("{}{}", out, e)),
            }
        }
        let produced = self.take_output();
        out.push_str(&produced);
        if let Some(line) = self.disassemble_at(self.interpreter.vm.pc, 1).first() {
            out.push_str(line);
        }
        Ok(out)
    }

    fn cmd_continue(&mut self) -> Result<String, String> {
        let reason = self.continue_execution(None).map_err(|e| e.to_string())?;
        let mut out = self.take_output();
        match reason {
            StopReason::Breakpoint(pc) => write!(out, "Hit breakpoint at {:05}", pc).ok(),
            StopReason::Halted => write!(out, "Machine halted.").ok(),
            StopReason::AwaitingInput => write!(out, "Awaiting input.").ok(),
            StopReason::StepLimit => write!(out, "Step limit reached.").ok(),
        };
        Ok(out)
    }

    fn cmd_set(&mut self, reg: &str, value: &str) -> Result<String, String> {
        let index = reg
            .strip_prefix('r')
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|&n| n < NUM_REGISTERS)
            .ok_or_else(|| format!("Invalid register: {}", reg))?;
        let value = parse_number(value).ok_or_else(|| format!("Invalid value: {}", value))?;
        self.set_register(index, value)?;
        Ok(format!("r{} = {}", index, value))
    }

    /// True once the machine can no longer run
    pub fn is_halted(&self) -> bool {
        self.interpreter.state() == MachineState::Halted
    }
}

const HELP: &str = "Commands: n(ext) [count], c(ontinue), s(tate), h(istory), d(isasm) [addr] [count]
          b <addr> (breakpoint), rb <addr> (remove), bl (list)
          set r<n> <value>, poke <addr> <value>, peek <addr>";

/// Parse a decimal or 0x-prefixed hex word
fn parse_number(text: &str) -> Option<u16> {
    match text.strip_prefix("0x") {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => text.parse::<u16>().ok(),
    }
}

fn parse_address(text: &str) -> Result<u16, String> {
    parse_number(text)
        .filter(|&a| a <= MAX_LITERAL)
        .ok_or_else(|| format!("Invalid address: {}", text))
}
