use crate::error::VmError;
use crate::image::ProgramImage;
use crate::operand::{Operand, NUM_REGISTERS};
use log::debug;
use std::fmt;

/// The machine state: memory, registers, stack and instruction pointer
pub struct VM {
    /// Memory image, mutable for the life of the machine
    pub memory: ProgramImage,
    /// General purpose registers
    pub registers: [u16; NUM_REGISTERS],
    /// Value stack, shared by push/pop and call/ret
    pub stack: Vec<u16>,
    /// Instruction pointer. Only changes once an instruction has completed,
    /// so while executing it is the address of the current instruction.
    pub pc: u16,
}

impl VM {
    /// Create a new VM over the given memory image
    pub fn new(memory: ProgramImage) -> Self {
        VM {
            memory,
            registers: [0; NUM_REGISTERS],
            stack: Vec::new(),
            pc: 0,
        }
    }

    /// Push a value onto the stack
    pub fn push(&mut self, value: u16) {
        self.stack.push(value);
    }

    /// Pop a value from the stack
    pub fn pop(&mut self) -> Result<u16, VmError> {
        match self.stack.pop() {
            Some(value) => Ok(value),
            None => {
                debug!("Stack underflow at {:05}", self.pc);
                Err(VmError::StackUnderflow { pc: self.pc })
            }
        }
    }

    /// Peek at the top of the stack without removing it
    pub fn peek(&self) -> Option<u16> {
        self.stack.last().copied()
    }

    /// Read a word of memory
    pub fn read_memory(&self, addr: u16) -> u16 {
        self.memory.read(addr as usize)
    }

    /// Write a word of memory. Addresses outside the address space are dropped.
    pub fn write_memory(&mut self, addr: u16, value: u16) {
        if !self.memory.write(addr as usize, value) {
            debug!(
                "Dropped write of {} to address {} at {:05}",
                value, addr, self.pc
            );
        }
    }

    /// Resolve a raw operand word to the value it denotes.
    ///
    /// Literals are themselves, register references read the register, and
    /// anything else is an invalid operand.
    pub fn resolve(&self, raw: u16) -> Result<u16, VmError> {
        match Operand::decode(raw) {
            Ok(Operand::Literal(value)) => Ok(value),
            Ok(Operand::Register(r)) => Ok(self.registers[r]),
            Err(value) => Err(VmError::InvalidOperand { pc: self.pc, value }),
        }
    }

    /// The write target named by a raw operand word, left unresolved.
    pub fn destination(&self, raw: u16) -> u16 {
        raw
    }

    /// Store a value through a raw destination word.
    ///
    /// Words 0..=32767 address memory, register references address the
    /// register, and invalid encodings are ignored.
    pub fn write_destination(&mut self, dest: u16, value: u16) {
        match Operand::decode(dest) {
            Ok(Operand::Literal(addr)) => self.write_memory(addr, value),
            Ok(Operand::Register(r)) => self.registers[r] = value,
            Err(bad) => debug!("Ignored write of {} to destination {} at {:05}", value, bad, self.pc),
        }
    }

    /// Read a register by index
    pub fn register(&self, index: usize) -> Option<u16> {
        self.registers.get(index).copied()
    }

    /// Set a register by index. Returns false for an out of range index.
    pub fn set_register(&mut self, index: usize, value: u16) -> bool {
        match self.registers.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for VM {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VM")
            .field("pc", &self.pc)
            .field("registers", &self.registers)
            .field("stack_depth", &self.stack.len())
            .field("loaded_words", &self.memory.loaded_len())
            .finish()
    }
}
