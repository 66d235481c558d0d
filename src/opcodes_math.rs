/// Arithmetic, comparison and bitwise opcodes
///
/// All arithmetic is modulo 32768 and every result fits in 15 bits:
/// - eq, gt
/// - add, mult, mod
/// - and, or, not
use crate::error::VmError;
use crate::instruction::Opcode;
use crate::interpreter::{ExecutionResult, Interpreter};
use crate::operand::MAX_LITERAL;

/// Modulus for word arithmetic
pub const MODULUS: u32 = 0x8000;

pub fn add(b: u16, c: u16) -> u16 {
    ((b as u32 + c as u32) % MODULUS) as u16
}

pub fn mult(b: u16, c: u16) -> u16 {
    ((b as u32 * c as u32) % MODULUS) as u16
}

/// 15-bit bitwise complement
pub fn not(b: u16) -> u16 {
    !b & MAX_LITERAL
}

impl Interpreter {
    /// Handle math and comparison opcodes
    pub fn execute_math_op(
        &mut self,
        opcode: Opcode,
        operands: &[u16],
    ) -> Result<ExecutionResult, VmError> {
        let dest = self.vm.destination(operands[0]);

        if opcode == Opcode::Not {
            let b = self.vm.resolve(operands[1])?;
            self.vm.write_destination(dest, not(b));
            return Ok(ExecutionResult::Continue);
        }

        let b = self.vm.resolve(operands[1])?;
        let c = self.vm.resolve(operands[2])?;
        let result = match opcode {
            Opcode::Eq => (b == c) as u16,
            Opcode::Gt => (b > c) as u16,
            Opcode::Add => add(b, c),
            Opcode::Mult => mult(b, c),
            Opcode::Mod => {
                if c == 0 {
                    return Err(VmError::DivisionByZero { pc: self.vm.pc });
                }
                b % c
            }
            Opcode::And => b & c,
            Opcode::Or => b | c,
            _ => {
                return Err(VmError::UnknownOpcode {
                    pc: self.vm.pc,
                    opcode: opcode as u16,
                })
            }
        };
        self.vm.write_destination(dest, result);
        Ok(ExecutionResult::Continue)
    }
}
