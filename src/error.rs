use thiserror::Error;

/// Fatal conditions that abort a run or a program load.
///
/// Runtime variants carry the address of the instruction that faulted. The
/// machine is left exactly as it was before that instruction executed.
#[derive(Error, Debug)]
pub enum VmError {
    #[error("invalid operand {value} at {pc:05}")]
    InvalidOperand { pc: u16, value: u16 },

    #[error("stack underflow at {pc:05}")]
    StackUnderflow { pc: u16 },

    #[error("division by zero at {pc:05}")]
    DivisionByZero { pc: u16 },

    #[error("unknown opcode {opcode} at {pc:05}")]
    UnknownOpcode { pc: u16, opcode: u16 },

    #[error("input word {value} is not a 15-bit value")]
    InvalidInput { value: u16 },

    #[error("instruction limit of {limit} reached")]
    InstructionLimit { limit: u64 },

    #[error("program image of {words} words exceeds the 32768 word address space")]
    ImageTooLarge { words: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl VmError {
    /// Address of the faulting instruction, for runtime errors.
    pub fn pc(&self) -> Option<u16> {
        match self {
            VmError::InvalidOperand { pc, .. }
            | VmError::StackUnderflow { pc }
            | VmError::DivisionByZero { pc }
            | VmError::UnknownOpcode { pc, .. } => Some(*pc),
            _ => None,
        }
    }
}
