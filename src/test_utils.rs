// Test helpers: build interpreters over small hand-written programs
use crate::image::ProgramImage;
use crate::instruction::Opcode;
use crate::interpreter::Interpreter;
use crate::operand::REGISTER_BASE;

/// An interpreter over the given program words
pub fn interpreter_for(program: &[u16]) -> Interpreter {
    Interpreter::from_image(ProgramImage::from_words(program).unwrap())
}

/// Encode words as a little-endian byte image
pub fn image_bytes(program: &[u16]) -> Vec<u8> {
    program.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// Assemble one instruction per line: a mnemonic followed by operands
/// written as `r0`..`r7`, decimal numbers or quoted characters like `'A'`.
/// Panics on malformed input; only for tests.
pub fn assemble(source: &str) -> Vec<u16> {
    let mut words = Vec::new();
    for line in source.lines() {
        let line = line.split(';').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let mnemonic = parts.next().unwrap();
        let opcode = Opcode::from_mnemonic(mnemonic)
            .unwrap_or_else(|| panic!("unknown mnemonic {}", mnemonic));
        words.push(opcode as u16);
        let operands: Vec<u16> = parts.map(parse_operand).collect();
        assert_eq!(
            operands.len(),
            opcode.arity(),
            "wrong operand count in '{}'",
            line
        );
        words.extend(operands);
    }
    words
}

fn parse_operand(text: &str) -> u16 {
    if let Some(reg) = text.strip_prefix('r') {
        return REGISTER_BASE + reg.parse::<u16>().unwrap();
    }
    if text.len() == 3 && text.starts_with('\'') && text.ends_with('\'') {
        return text.as_bytes()[1] as u16;
    }
    text.parse::<u16>()
        .unwrap_or_else(|_| panic!("bad operand {}", text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble() {
        assert_eq!(
            assemble("set r1 5\nout 'K' ; comment\n\nhalt"),
            vec![1, 32769, 5, 19, 75, 0]
        );
    }

    #[test]
    fn test_image_bytes() {
        assert_eq!(image_bytes(&[19, 0x8001]), vec![19, 0, 0x01, 0x80]);
    }
}
