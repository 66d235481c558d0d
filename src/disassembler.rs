use crate::instruction::{quote_char, Instruction};
use std::fmt::Write;

/// Static disassembler over a word slice
pub struct Disassembler<'a> {
    memory: &'a [u16],
    /// Show the raw words of each instruction
    show_words: bool,
}

impl<'a> Disassembler<'a> {
    pub fn new(memory: &'a [u16]) -> Self {
        Disassembler {
            memory,
            show_words: false,
        }
    }

    /// Include the raw instruction words in each line
    pub fn with_words(mut self, show: bool) -> Self {
        self.show_words = show;
        self
    }

    /// Disassemble up to `count` instructions starting at `start`.
    ///
    /// A word that is not an opcode is listed as data and decoding resumes at
    /// the following word.
    pub fn disassemble(&self, start: u16, count: usize) -> Vec<String> {
        let mut lines = Vec::with_capacity(count);
        let mut addr = start as usize;
        while lines.len() < count && addr < self.memory.len() {
            let (line, size) = self.line_at(addr as u16);
            lines.push(line);
            addr += size;
        }
        lines
    }

    /// Disassemble every instruction starting in `start..end`
    pub fn disassemble_range(&self, start: u16, end: u16) -> Vec<String> {
        let end = (end as usize).min(self.memory.len());
        let mut lines = Vec::new();
        let mut addr = start as usize;
        while addr < end {
            let (line, size) = self.line_at(addr as u16);
            lines.push(line);
            addr += size;
        }
        lines
    }

    /// A listing as one string, one instruction per line
    pub fn listing(&self, start: u16, count: usize) -> String {
        let mut output = String::new();
        for line in self.disassemble(start, count) {
            writeln!(&mut output, "{}", line).ok();
        }
        output
    }

    /// Format one line and report how many words it covered
    fn line_at(&self, addr: u16) -> (String, usize) {
        match Instruction::decode_words(self.memory, addr) {
            Ok(inst) => {
                let size = inst.size() as usize;
                (self.format_instruction(&inst), size)
            }
            Err(word) => {
                let mut line = format!("{:05}: ", addr);
                if self.show_words {
                    write!(line, "{:<24}", format!("{:04x}", word)).ok();
                }
                write!(line, ".word {}", word).ok();
                if word <= 0x7F {
                    write!(line, " {}", quote_char(word)).ok();
                }
                (line, 1)
            }
        }
    }

    fn format_instruction(&self, inst: &Instruction) -> String {
        let mut line = format!("{:05}: ", inst.addr);
        if self.show_words {
            let start = inst.addr as usize;
            let end = (start + inst.size() as usize).min(self.memory.len());
            let words: Vec<String> = self.memory[start..end]
                .iter()
                .map(|w| format!("{:04x}", w))
                .collect();
            write!(line, "{:<24}", words.join(" ")).ok();
        }
        write!(line, "{}", inst).ok();
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassemble_program() {
        let memory = [19, 75, 9, 32768, 4, 2, 0];
        let lines = Disassembler::new(&memory).disassemble(0, 10);
        assert_eq!(
            lines,
            vec!["00000: out 75 'K'", "00002: add r0 4 2", "00006: halt"]
        );
    }

    #[test]
    fn test_data_words_resync() {
        let memory = [22, 65, 21];
        let lines = Disassembler::new(&memory).disassemble(0, 10);
        assert_eq!(
            lines,
            vec!["00000: .word 22 '\\u{16}'", "00001: .word 65 'A'", "00002: noop"]
        );
    }

    #[test]
    fn test_bad_operand_rendered() {
        let memory = [2, 40000];
        let lines = Disassembler::new(&memory).disassemble(0, 1);
        assert_eq!(lines, vec!["00000: push <bad 40000>"]);
    }

    #[test]
    fn test_range_and_words() {
        let memory = [21, 21, 6, 0, 0];
        let dis = Disassembler::new(&memory).with_words(true);
        let lines = dis.disassemble_range(1, 4);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("00002: 0006 0000"));
        assert!(lines[1].ends_with("jmp 0"));
    }

    #[test]
    fn test_listing_count() {
        let memory = [21; 8];
        let listing = Disassembler::new(&memory).listing(2, 3);
        assert_eq!(listing, "00002: noop\n00003: noop\n00004: noop\n");
    }
}
