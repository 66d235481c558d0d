/// Character I/O opcodes
///
/// `out` appends to the output buffer. `in` takes one word from the input
/// queue; with nothing queued it leaves the PC on itself and the machine
/// suspends until more input arrives.
use crate::error::VmError;
use crate::instruction::Opcode;
use crate::interpreter::{ExecutionResult, Interpreter};

impl Interpreter {
    /// Handle out/in
    pub fn execute_io_op(
        &mut self,
        opcode: Opcode,
        operands: &[u16],
    ) -> Result<ExecutionResult, VmError> {
        match opcode {
            Opcode::Out => {
                let value = self.vm.resolve(operands[0])?;
                self.emit(value);
                Ok(ExecutionResult::Continue)
            }

            Opcode::In => match self.next_input() {
                Some(value) => {
                    let dest = self.vm.destination(operands[0]);
                    self.vm.write_destination(dest, value);
                    Ok(ExecutionResult::Continue)
                }
                None => Ok(ExecutionResult::AwaitingInput),
            },

            _ => Err(VmError::UnknownOpcode {
                pc: self.vm.pc,
                opcode: opcode as u16,
            }),
        }
    }
}
