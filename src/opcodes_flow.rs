/// Control flow opcodes: jmp, jt, jf, call, ret
///
/// Calls push the address of the following instruction onto the same stack
/// used by push/pop. A ret on an empty stack halts the machine.
use crate::error::VmError;
use crate::instruction::Opcode;
use crate::interpreter::{ExecutionResult, Interpreter};
use log::{debug, info};

impl Interpreter {
    /// Handle jumps, calls and returns
    pub fn execute_flow_op(
        &mut self,
        opcode: Opcode,
        operands: &[u16],
    ) -> Result<ExecutionResult, VmError> {
        match opcode {
            Opcode::Jmp => {
                let target = self.vm.resolve(operands[0])?;
                self.vm.pc = target;
                Ok(ExecutionResult::Jumped)
            }

            Opcode::Jt | Opcode::Jf => {
                let cond = self.vm.resolve(operands[0])?;
                let target = self.vm.resolve(operands[1])?;
                let taken = if opcode == Opcode::Jt {
                    cond != 0
                } else {
                    cond == 0
                };
                if taken {
                    self.vm.pc = target;
                    Ok(ExecutionResult::Jumped)
                } else {
                    Ok(ExecutionResult::Continue)
                }
            }

            Opcode::Call => {
                let target = self.vm.resolve(operands[0])?;
                let return_pc = self.vm.pc.wrapping_add(2);
                debug!("call {:05} from {:05}", target, self.vm.pc);
                self.vm.push(return_pc);
                self.vm.pc = target;
                Ok(ExecutionResult::Jumped)
            }

            Opcode::Ret => match self.vm.stack.pop() {
                Some(return_pc) => {
                    self.vm.pc = return_pc;
                    Ok(ExecutionResult::Jumped)
                }
                None => {
                    info!("ret with empty stack at {:05}", self.vm.pc);
                    Ok(ExecutionResult::Halted)
                }
            },

            _ => Err(VmError::UnknownOpcode {
                pc: self.vm.pc,
                opcode: opcode as u16,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::VmError;
    use crate::test_utils::{assemble, interpreter_for};
    use test_log::test;

    #[test]
    fn test_jmp_skips_code() {
        // jmp 4; out 'A'; out 'B'; halt
        let mut interp = interpreter_for(&[6, 4, 19, 65, 19, 66, 0]);
        assert_eq!(interp.run().unwrap().text(), "B");
    }

    #[test]
    fn test_jmp_through_register() {
        let mut interp = interpreter_for(&[1, 32770, 7, 6, 32770, 19, 65, 19, 66, 0]);
        assert_eq!(interp.run().unwrap().text(), "B");
    }

    #[test]
    fn test_jt_and_jf() {
        let mut interp = interpreter_for(&assemble(
            "jt 1 5
             out 65
             out 66
             jf 0 12
             out 67
             out 68
             jt 0 99
             jf 5 99
             halt",
        ));
        assert_eq!(interp.run().unwrap().text(), "BD");
    }

    #[test]
    fn test_jump_to_bad_target_operand() {
        let mut interp = interpreter_for(&[6, 32790]);
        assert!(matches!(
            interp.run(),
            Err(VmError::InvalidOperand { pc: 0, value: 32790 })
        ));
    }

    #[test]
    fn test_countdown_loop() {
        // r0 = 3; loop: out '*'; add r0 r0 32767 (r0 - 1); jt r0 loop; halt
        let mut interp = interpreter_for(&assemble(
            "set r0 3
             out 42
             add r0 r0 32767
             jt r0 3
             halt",
        ));
        let out = interp.run().unwrap();
        assert_eq!(out.text(), "***");
        assert_eq!(interp.vm.registers[0], 0);
    }
}
