use crate::config::MachineConfig;
use crate::error::VmError;
use crate::image::ProgramImage;
use crate::instruction::{Instruction, Opcode};
use crate::operand::MAX_LITERAL;
use crate::trace::{self, TraceRecorder};
use crate::vm::VM;
use log::{debug, info, log_enabled, trace, Level};
use std::collections::VecDeque;
use std::io::{self, Write};

/// Result of executing a single instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionResult {
    /// Advance past the instruction
    Continue,
    /// PC already redirected by a jump, call or return
    Jumped,
    /// `in` found no input; PC left on the instruction
    AwaitingInput,
    /// Machine stopped for good
    Halted,
}

/// Where the machine stands between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    Running,
    AwaitingInput,
    Halted,
}

/// Output drained by one run, plus the state the run ended in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub output: Vec<u16>,
    pub state: MachineState,
}

impl RunOutput {
    /// Decode the output words as characters
    pub fn text(&self) -> String {
        decode_text(&self.output)
    }

    pub fn is_halted(&self) -> bool {
        self.state == MachineState::Halted
    }

    pub fn is_awaiting_input(&self) -> bool {
        self.state == MachineState::AwaitingInput
    }
}

/// Map each word to its character
pub fn decode_text(words: &[u16]) -> String {
    words
        .iter()
        .map(|&w| char::from_u32(w as u32).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// The instruction dispatcher and I/O channel around a VM
pub struct Interpreter {
    /// The VM state
    pub vm: VM,
    state: MachineState,
    /// Pending input character codes
    input: VecDeque<u16>,
    /// Output produced since the last run returned
    output: Vec<u16>,
    /// Execution trace, absent when tracing is off
    trace: Option<TraceRecorder>,
    /// Instructions executed over the machine's lifetime
    instruction_count: u64,
    /// Per-run instruction limit
    max_instructions: Option<u64>,
}

impl Interpreter {
    /// Create a new interpreter
    pub fn new(vm: VM) -> Self {
        Interpreter {
            vm,
            state: MachineState::Running,
            input: VecDeque::new(),
            output: Vec::new(),
            trace: None,
            instruction_count: 0,
            max_instructions: None,
        }
    }

    /// Create an interpreter configured from `config`
    pub fn with_config(vm: VM, config: &MachineConfig) -> Self {
        let mut interpreter = Interpreter::new(vm);
        if config.trace.enabled {
            interpreter.enable_trace(config.trace.capacity);
        }
        interpreter.max_instructions = config.max_instructions;
        interpreter
    }

    /// Convenience constructor straight from an image
    pub fn from_image(image: ProgramImage) -> Self {
        Interpreter::new(VM::new(image))
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    /// Start recording a trace holding at most `capacity` lines
    pub fn enable_trace(&mut self, capacity: usize) {
        self.trace = Some(TraceRecorder::new(capacity));
    }

    pub fn disable_trace(&mut self) {
        self.trace = None;
    }

    pub fn trace(&self) -> Option<&TraceRecorder> {
        self.trace.as_ref()
    }

    pub fn trace_mut(&mut self) -> Option<&mut TraceRecorder> {
        self.trace.as_mut()
    }

    pub fn set_instruction_limit(&mut self, limit: Option<u64>) {
        self.max_instructions = limit;
    }

    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    /// Output produced but not yet returned by a run
    pub fn pending_output(&self) -> &[u16] {
        &self.output
    }

    /// Take the output produced but not yet returned by a run
    pub fn take_output(&mut self) -> Vec<u16> {
        std::mem::take(&mut self.output)
    }

    /// Number of input words still queued
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Queue input words without running.
    ///
    /// Every word must be a 15-bit value; otherwise nothing is queued.
    pub fn queue_input(&mut self, words: &[u16]) -> Result<(), VmError> {
        if self.state == MachineState::Halted {
            debug!("Discarding {} input words for halted machine", words.len());
            return Ok(());
        }
        if let Some(&value) = words.iter().find(|&&w| w > MAX_LITERAL) {
            return Err(VmError::InvalidInput { value });
        }
        self.input.extend(words.iter().copied());
        Ok(())
    }

    /// Queue a line of text followed by a newline
    pub fn queue_line(&mut self, text: &str) -> Result<(), VmError> {
        let words: Vec<u16> = text.encode_utf16().chain(std::iter::once(b'\n' as u16)).collect();
        self.queue_input(&words)
    }

    /// Resume execution with no new input
    pub fn run(&mut self) -> Result<RunOutput, VmError> {
        self.execute()
    }

    /// Queue the given words as input, then execute
    pub fn run_words(&mut self, words: &[u16]) -> Result<RunOutput, VmError> {
        self.queue_input(words)?;
        self.execute()
    }

    /// Queue a line of text plus newline, then execute. With `echo` the
    /// produced output is printed to stdout.
    pub fn run_text(&mut self, text: &str, echo: bool) -> Result<RunOutput, VmError> {
        self.queue_line(text)?;
        let result = self.execute()?;
        if echo {
            print!("{}", result.text());
            io::stdout().flush().ok();
        }
        Ok(result)
    }

    fn execute(&mut self) -> Result<RunOutput, VmError> {
        if self.state == MachineState::Halted {
            return Ok(RunOutput {
                output: Vec::new(),
                state: MachineState::Halted,
            });
        }

        let mut executed: u64 = 0;
        loop {
            if let Some(limit) = self.max_instructions {
                if executed >= limit {
                    return Err(VmError::InstructionLimit { limit });
                }
            }
            match self.step()? {
                ExecutionResult::AwaitingInput | ExecutionResult::Halted => break,
                ExecutionResult::Continue | ExecutionResult::Jumped => executed += 1,
            }
        }

        Ok(RunOutput {
            output: std::mem::take(&mut self.output),
            state: self.state,
        })
    }

    /// Execute one instruction at the current PC
    pub fn step(&mut self) -> Result<ExecutionResult, VmError> {
        match self.state {
            MachineState::Halted => return Ok(ExecutionResult::Halted),
            MachineState::AwaitingInput => self.state = MachineState::Running,
            MachineState::Running => {}
        }

        let pc = self.vm.pc;
        let inst = Instruction::decode(&self.vm.memory, pc)
            .map_err(|opcode| VmError::UnknownOpcode { pc, opcode })?;

        let trace_line = self
            .trace
            .as_ref()
            .map(|_| trace::format_line(&self.vm, &inst));
        if log_enabled!(Level::Trace) {
            trace!("{:05}: {}", pc, inst);
        }

        let result = self.execute_instruction(&inst)?;
        match result {
            ExecutionResult::Continue => self.vm.pc = pc.wrapping_add(inst.size()),
            ExecutionResult::Jumped => {}
            ExecutionResult::AwaitingInput => {
                debug!("Awaiting input at {:05}", pc);
                self.state = MachineState::AwaitingInput;
                return Ok(result);
            }
            ExecutionResult::Halted => {
                info!(
                    "Halted at {:05} after {} instructions",
                    pc,
                    self.instruction_count + 1
                );
                self.state = MachineState::Halted;
            }
        }

        self.instruction_count += 1;
        if let (Some(recorder), Some(line)) = (self.trace.as_mut(), trace_line) {
            recorder.record(line);
        }
        Ok(result)
    }

    /// Dispatch a decoded instruction to its handler
    pub fn execute_instruction(&mut self, inst: &Instruction) -> Result<ExecutionResult, VmError> {
        let ops = &inst.operands;
        match inst.opcode {
            Opcode::Halt => Ok(ExecutionResult::Halted),
            Opcode::Noop => Ok(ExecutionResult::Continue),
            Opcode::Set | Opcode::Push | Opcode::Pop | Opcode::Rmem | Opcode::Wmem => {
                self.execute_memory_op(inst.opcode, ops)
            }
            Opcode::Eq
            | Opcode::Gt
            | Opcode::Add
            | Opcode::Mult
            | Opcode::Mod
            | Opcode::And
            | Opcode::Or
            | Opcode::Not => self.execute_math_op(inst.opcode, ops),
            Opcode::Jmp | Opcode::Jt | Opcode::Jf | Opcode::Call | Opcode::Ret => {
                self.execute_flow_op(inst.opcode, ops)
            }
            Opcode::Out | Opcode::In => self.execute_io_op(inst.opcode, ops),
        }
    }

    /// Take the next input word, if any
    pub(crate) fn next_input(&mut self) -> Option<u16> {
        self.input.pop_front()
    }

    pub(crate) fn emit(&mut self, value: u16) {
        self.output.push(value);
    }
}
