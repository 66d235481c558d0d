use crate::image::ProgramImage;
use crate::opcode_tables;
use crate::operand::format_raw;
use std::fmt::{Display, Error, Formatter};

/// The machine's opcodes, numbered by their encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Halt = 0,
    Set = 1,
    Push = 2,
    Pop = 3,
    Eq = 4,
    Gt = 5,
    Jmp = 6,
    Jt = 7,
    Jf = 8,
    Add = 9,
    Mult = 10,
    Mod = 11,
    And = 12,
    Or = 13,
    Not = 14,
    Rmem = 15,
    Wmem = 16,
    Call = 17,
    Ret = 18,
    Out = 19,
    In = 20,
    Noop = 21,
}

impl Opcode {
    /// Decode an opcode word
    pub fn from_word(word: u16) -> Option<Self> {
        opcode_tables::ALL_OPCODES.get(word as usize).copied()
    }

    /// Look up an opcode by mnemonic (case insensitive)
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        opcode_tables::MNEMONICS
            .get(name.to_ascii_lowercase().as_str())
            .copied()
    }

    pub fn name(self) -> &'static str {
        opcode_tables::get_instruction_name(self)
    }

    /// Number of operand words
    pub fn arity(self) -> usize {
        opcode_tables::get_operand_count(self)
    }

    /// Whether operand 0 is a raw write target
    pub fn writes_destination(self) -> bool {
        opcode_tables::writes_destination(self)
    }
}

/// A decoded instruction: opcode plus its raw operand words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Address the instruction was decoded from
    pub addr: u16,
    pub opcode: Opcode,
    /// Raw operand words, unresolved
    pub operands: Vec<u16>,
}

impl Instruction {
    /// Decode the instruction at `addr`.
    ///
    /// Returns the offending word when it is not an opcode. Operands past the
    /// end of memory read as zero.
    pub fn decode(memory: &ProgramImage, addr: u16) -> Result<Self, u16> {
        Self::decode_words(memory.words(), addr)
    }

    /// Decode from a plain word slice
    pub fn decode_words(memory: &[u16], addr: u16) -> Result<Self, u16> {
        let word_at = |a: usize| memory.get(a).copied().unwrap_or(0);
        let raw = word_at(addr as usize);
        let opcode = Opcode::from_word(raw).ok_or(raw)?;
        let operands = (1..=opcode.arity())
            .map(|i| word_at(addr as usize + i))
            .collect();
        Ok(Instruction {
            addr,
            opcode,
            operands,
        })
    }

    /// Size of the instruction in words
    pub fn size(&self) -> u16 {
        1 + self.operands.len() as u16
    }

    pub fn name(&self) -> &'static str {
        self.opcode.name()
    }

    /// Character rendering for a literal `out` operand
    pub fn out_char(&self) -> Option<char> {
        match (self.opcode, self.operands.first()) {
            (Opcode::Out, Some(&v)) if v <= 0x7FFF => printable(v),
            _ => None,
        }
    }
}

/// Printable form of a character code, escaping control characters
pub fn printable(code: u16) -> Option<char> {
    char::from_u32(code as u32).filter(|c| !c.is_control() || *c == '\n')
}

/// Quote a character code for listings
pub fn quote_char(code: u16) -> String {
    match printable(code) {
        Some('\n') => "'\\n'".to_string(),
        Some(c) => format!("'{}'", c),
        None => format!("'\\u{{{:x}}}'", code),
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self.name())?;
        for op in &self.operands {
            write!(f, " {}", format_raw(*op))?;
        }
        if self.out_char().is_some() {
            write!(f, " {}", quote_char(self.operands[0]))?;
        }
        Ok(())
    }
}
