/// Operand decoding for the 15-bit word machine
///
/// Every operand slot holds one raw word:
/// - 0..=32767 is a literal value
/// - 32768..=32775 names one of the eight registers
/// - anything above is invalid
use std::fmt;

/// Largest literal value, also the mask for 15-bit arithmetic.
pub const MAX_LITERAL: u16 = 0x7FFF;

/// First word that encodes a register reference.
pub const REGISTER_BASE: u16 = 0x8000;

/// Number of general purpose registers.
pub const NUM_REGISTERS: usize = 8;

/// A classified operand word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Literal(u16),
    Register(usize),
}

impl Operand {
    /// Classify a raw word. Returns the raw word back as the error when it is
    /// outside both ranges.
    pub fn decode(raw: u16) -> Result<Self, u16> {
        match raw {
            0..=MAX_LITERAL => Ok(Operand::Literal(raw)),
            _ if ((raw - REGISTER_BASE) as usize) < NUM_REGISTERS => {
                Ok(Operand::Register((raw - REGISTER_BASE) as usize))
            }
            _ => Err(raw),
        }
    }

    /// Encode back to the raw word form.
    pub fn encode(self) -> u16 {
        match self {
            Operand::Literal(v) => v,
            Operand::Register(r) => REGISTER_BASE + r as u16,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(v) => write!(f, "{}", v),
            Operand::Register(r) => write!(f, "r{}", r),
        }
    }
}

/// Render a raw operand word, tolerating invalid encodings.
pub fn format_raw(raw: u16) -> String {
    match Operand::decode(raw) {
        Ok(op) => op.to_string(),
        Err(bad) => format!("<bad {}>", bad),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ranges() {
        assert_eq!(Operand::decode(0), Ok(Operand::Literal(0)));
        assert_eq!(Operand::decode(32767), Ok(Operand::Literal(32767)));
        assert_eq!(Operand::decode(32768), Ok(Operand::Register(0)));
        assert_eq!(Operand::decode(32775), Ok(Operand::Register(7)));
        assert_eq!(Operand::decode(32776), Err(32776));
        assert_eq!(Operand::decode(u16::MAX), Err(u16::MAX));
    }

    #[test]
    fn test_encode_inverts_decode() {
        for raw in [0u16, 17, 32767, 32768, 32771, 32775] {
            assert_eq!(Operand::decode(raw).unwrap().encode(), raw);
        }
    }

    #[test]
    fn test_format_raw() {
        assert_eq!(format_raw(42), "42");
        assert_eq!(format_raw(32770), "r2");
        assert_eq!(format_raw(40000), "<bad 40000>");
    }
}
