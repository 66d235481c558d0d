use synacor::debugger::{Debugger, StopReason};
use synacor::disassembler::Disassembler;
use synacor::{Interpreter, ProgramImage, VM};
use test_log::test;

/// Prints "ab" through a register, then halts
const PROGRAM: [u16; 10] = [
    1, 32768, 97, // 0: set r0 97
    19, 32768, // 3: out r0
    9, 32768, 32768, 1, // 5: add r0 r0 1
    0, // 9: halt, patched below to loop back
];

fn session() -> Debugger {
    let image = ProgramImage::from_words(&PROGRAM).unwrap();
    Debugger::with_history(Interpreter::new(VM::new(image)))
}

#[test]
fn test_breakpoint_then_patch_and_continue() {
    let mut dbg = session();
    assert!(dbg.add_breakpoint(9));
    assert_eq!(dbg.continue_execution(None).unwrap(), StopReason::Breakpoint(9));
    assert_eq!(dbg.take_output(), "a");
    assert_eq!(dbg.interpreter.vm.registers[0], 98);

    // Replace the halt with out r0 and let the program run off into zeros
    dbg.poke(9, 19).unwrap();
    dbg.poke(10, 32768).unwrap();
    assert!(dbg.remove_breakpoint(9));
    assert_eq!(dbg.continue_execution(None).unwrap(), StopReason::Halted);
    assert_eq!(dbg.take_output(), "b");
    assert!(dbg.is_halted());
}

#[test]
fn test_command_session() {
    let mut dbg = session();
    assert_eq!(dbg.execute_command("b 5"), "Breakpoint added at 00005");
    assert_eq!(dbg.execute_command("c"), "aHit breakpoint at 00005");
    assert_eq!(dbg.execute_command("set r0 120"), "r0 = 120");
    assert_eq!(dbg.execute_command("peek 4"), "[4] = 32768");
    let history = dbg.execute_command("h");
    assert_eq!(history, "00000: set r0 97\n00003: out r0=97 'a'");
    let report = dbg.state_report();
    assert!(report.contains("PC: 00005"));
    assert!(report.contains("r0=120"));
}

#[test]
fn test_step_limit() {
    let image = ProgramImage::from_words(&[21, 6, 0]).unwrap();
    let mut dbg = Debugger::new(Interpreter::new(VM::new(image)));
    assert_eq!(dbg.continue_execution(Some(7)).unwrap(), StopReason::StepLimit);
    assert_eq!(dbg.interpreter.instruction_count(), 7);
}

#[test]
fn test_listing_of_program() {
    let image = ProgramImage::from_words(&PROGRAM).unwrap();
    let disasm = Disassembler::new(image.words());
    let lines = disasm.disassemble_range(0, image.loaded_len() as u16);
    assert_eq!(
        lines,
        vec![
            "00000: set r0 97",
            "00003: out r0",
            "00005: add r0 r0 1",
            "00009: halt",
        ]
    );
}

#[test]
fn test_fault_leaves_output_and_report() {
    // out 'A'; out <bad operand>
    let image = ProgramImage::from_words(&[19, 65, 19, 32776]).unwrap();
    let mut dbg = Debugger::with_history(Interpreter::new(VM::new(image)));
    assert!(dbg.interpreter.run().is_err());
    assert_eq!(dbg.take_output(), "A");
    let report = dbg.state_report();
    assert!(report.contains("PC: 00002"));
    assert_eq!(report.matches("00000: out 65 'A'").count(), 1);
}
