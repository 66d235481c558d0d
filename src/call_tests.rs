#[cfg(test)]
mod tests {
    use crate::error::VmError;
    use crate::interpreter::{ExecutionResult, MachineState};
    use crate::test_utils::{assemble, interpreter_for};
    use test_log::test;

    #[test]
    fn test_call_pushes_return_address() {
        // 0: call 5; 2: out 'R'; 4: halt; 5: noop
        let mut interp = interpreter_for(&[17, 5, 19, 82, 0, 21, 18]);
        assert_eq!(interp.step().unwrap(), ExecutionResult::Jumped);
        assert_eq!(interp.vm.pc, 5);
        assert_eq!(interp.vm.stack, vec![2]);
    }

    #[test]
    fn test_call_return_balance() {
        // The routine at 5 pushes and pops its own value before returning
        let mut interp = interpreter_for(&assemble(
            "call 5
             out 'R'
             halt
             push 9
             pop r0
             ret",
        ));
        interp.step().unwrap();
        interp.step().unwrap();
        interp.step().unwrap();
        assert_eq!(interp.step().unwrap(), ExecutionResult::Jumped);
        assert_eq!(interp.vm.pc, 2);
        assert!(interp.vm.stack.is_empty());
        let out = interp.run().unwrap();
        assert_eq!(out.text(), "R");
        assert_eq!(interp.vm.registers[0], 9);
    }

    #[test]
    fn test_call_through_register() {
        let mut interp = interpreter_for(&assemble(
            "set r4 8
             call r4
             out 'B'
             halt
             out 'A'
             ret",
        ));
        assert_eq!(interp.run().unwrap().text(), "AB");
    }

    #[test]
    fn test_nested_calls() {
        // main calls f (out 'f', call g, out 'F'), g prints 'g'
        let mut interp = interpreter_for(&assemble(
            "call 3
             halt
             noop
             out 'f'
             call 11
             out 'F'
             ret
             out 'g'
             ret",
        ));
        let out = interp.run().unwrap();
        assert_eq!(out.text(), "fgF");
        assert!(out.is_halted());
    }

    #[test]
    fn test_ret_on_empty_stack_halts() {
        let mut interp = interpreter_for(&[19, 65, 18, 19, 66]);
        let out = interp.run().unwrap();
        assert_eq!(out.text(), "A");
        assert_eq!(out.state, MachineState::Halted);
    }

    #[test]
    fn test_ret_uses_pushed_value() {
        // push 6; ret jumps to 6
        let mut interp = interpreter_for(&[2, 6, 18, 19, 65, 0, 19, 66, 0]);
        assert_eq!(interp.run().unwrap().text(), "B");
    }

    #[test]
    fn test_call_with_bad_target_leaves_stack_untouched() {
        let mut interp = interpreter_for(&[17, 32800]);
        assert!(matches!(
            interp.run(),
            Err(VmError::InvalidOperand { pc: 0, value: 32800 })
        ));
        assert!(interp.vm.stack.is_empty());
        assert_eq!(interp.vm.pc, 0);
    }

    #[test]
    fn test_unknown_opcode() {
        let mut interp = interpreter_for(&[21, 22]);
        match interp.run() {
            Err(VmError::UnknownOpcode { pc, opcode }) => {
                assert_eq!(pc, 1);
                assert_eq!(opcode, 22);
            }
            other => panic!("expected UnknownOpcode, got {:?}", other),
        }
    }

    #[test]
    fn test_instruction_limit() {
        let mut interp = interpreter_for(&[6, 0]);
        interp.set_instruction_limit(Some(100));
        assert!(matches!(
            interp.run(),
            Err(VmError::InstructionLimit { limit: 100 })
        ));
        assert_eq!(interp.instruction_count(), 100);
    }
}
