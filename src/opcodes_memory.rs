/// Register, stack and memory opcodes
///
/// - set, push, pop
/// - rmem (indirect read) and wmem (indirect write)
///
/// `wmem` is the one instruction whose first operand is resolved to get the
/// target address. Every other write target is the raw destination word.
use crate::error::VmError;
use crate::instruction::Opcode;
use crate::interpreter::{ExecutionResult, Interpreter};
use log::debug;

impl Interpreter {
    /// Handle set/push/pop/rmem/wmem
    pub fn execute_memory_op(
        &mut self,
        opcode: Opcode,
        operands: &[u16],
    ) -> Result<ExecutionResult, VmError> {
        match opcode {
            Opcode::Set => {
                let value = self.vm.resolve(operands[1])?;
                let dest = self.vm.destination(operands[0]);
                self.vm.write_destination(dest, value);
                Ok(ExecutionResult::Continue)
            }

            Opcode::Push => {
                let value = self.vm.resolve(operands[0])?;
                self.vm.push(value);
                Ok(ExecutionResult::Continue)
            }

            Opcode::Pop => {
                let value = self.vm.pop()?;
                let dest = self.vm.destination(operands[0]);
                self.vm.write_destination(dest, value);
                Ok(ExecutionResult::Continue)
            }

            Opcode::Rmem => {
                let addr = self.vm.resolve(operands[1])?;
                let value = self.vm.read_memory(addr);
                let dest = self.vm.destination(operands[0]);
                self.vm.write_destination(dest, value);
                Ok(ExecutionResult::Continue)
            }

            Opcode::Wmem => {
                let addr = self.vm.resolve(operands[0])?;
                let value = self.vm.resolve(operands[1])?;
                if (addr as usize) < self.vm.memory.loaded_len() {
                    // Writing over the loaded program
                    debug!("wmem {} := {} at {:05}", addr, value, self.vm.pc);
                }
                self.vm.write_memory(addr, value);
                Ok(ExecutionResult::Continue)
            }

            _ => Err(VmError::UnknownOpcode {
                pc: self.vm.pc,
                opcode: opcode as u16,
            }),
        }
    }
}
