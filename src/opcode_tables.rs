use crate::instruction::Opcode;
use std::collections::HashMap;

/// Every opcode in encoding order
pub const ALL_OPCODES: [Opcode; 22] = [
    Opcode::Halt,
    Opcode::Set,
    Opcode::Push,
    Opcode::Pop,
    Opcode::Eq,
    Opcode::Gt,
    Opcode::Jmp,
    Opcode::Jt,
    Opcode::Jf,
    Opcode::Add,
    Opcode::Mult,
    Opcode::Mod,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Rmem,
    Opcode::Wmem,
    Opcode::Call,
    Opcode::Ret,
    Opcode::Out,
    Opcode::In,
    Opcode::Noop,
];

lazy_static! {
    pub static ref MNEMONICS: HashMap<&'static str, Opcode> = {
        let mut m = HashMap::new();
        for op in ALL_OPCODES.iter() {
            m.insert(get_instruction_name(*op), *op);
        }
        m
    };
}

/// Get the mnemonic of an opcode
pub fn get_instruction_name(opcode: Opcode) -> &'static str {
    match opcode {
        Opcode::Halt => "halt",
        Opcode::Set => "set",
        Opcode::Push => "push",
        Opcode::Pop => "pop",
        Opcode::Eq => "eq",
        Opcode::Gt => "gt",
        Opcode::Jmp => "jmp",
        Opcode::Jt => "jt",
        Opcode::Jf => "jf",
        Opcode::Add => "add",
        Opcode::Mult => "mult",
        Opcode::Mod => "mod",
        Opcode::And => "and",
        Opcode::Or => "or",
        Opcode::Not => "not",
        Opcode::Rmem => "rmem",
        Opcode::Wmem => "wmem",
        Opcode::Call => "call",
        Opcode::Ret => "ret",
        Opcode::Out => "out",
        Opcode::In => "in",
        Opcode::Noop => "noop",
    }
}

/// Number of operand words following the opcode
pub fn get_operand_count(opcode: Opcode) -> usize {
    match opcode {
        Opcode::Halt | Opcode::Ret | Opcode::Noop => 0,
        Opcode::Push | Opcode::Pop | Opcode::Jmp | Opcode::Call | Opcode::Out | Opcode::In => 1,
        Opcode::Set | Opcode::Jt | Opcode::Jf | Opcode::Not | Opcode::Rmem | Opcode::Wmem => 2,
        Opcode::Eq
        | Opcode::Gt
        | Opcode::Add
        | Opcode::Mult
        | Opcode::Mod
        | Opcode::And
        | Opcode::Or => 3,
    }
}

/// Whether the first operand is a raw write target rather than a value
pub fn writes_destination(opcode: Opcode) -> bool {
    matches!(
        opcode,
        Opcode::Set
            | Opcode::Pop
            | Opcode::Eq
            | Opcode::Gt
            | Opcode::Add
            | Opcode::Mult
            | Opcode::Mod
            | Opcode::And
            | Opcode::Or
            | Opcode::Not
            | Opcode::Rmem
            | Opcode::In
    )
}
