#![crate_name = "synacor"]

#[macro_use]
extern crate lazy_static;

pub mod config;
pub mod debugger;
pub mod disassembler;
pub mod error;
pub mod image;
pub mod instruction;
pub mod interpreter;
pub mod opcode_tables;
pub mod opcodes_flow;
pub mod opcodes_io;
pub mod opcodes_math;
pub mod opcodes_memory;
pub mod operand;
pub mod trace;
pub mod vm;

#[cfg(test)]
mod call_tests;
#[cfg(test)]
mod test_utils;

pub use config::MachineConfig;
pub use error::VmError;
pub use image::ProgramImage;
pub use interpreter::{ExecutionResult, Interpreter, MachineState, RunOutput};
pub use vm::VM;

/*
Instruction encoding, one word per slot:

    0  halt              8  jf a b           16  wmem a b
    1  set a b           9  add a b c        17  call a
    2  push a           10  mult a b c       18  ret
    3  pop a            11  mod a b c        19  out a
    4  eq a b c         12  and a b c        20  in a
    5  gt a b c         13  or a b c         21  noop
    6  jmp a            14  not a b
    7  jt a b           15  rmem a b

Operands: 0..=32767 literal, 32768..=32775 registers r0-r7, higher invalid.
*/
