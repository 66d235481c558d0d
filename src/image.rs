//! Program image loading and the flat word memory it becomes.
//!
//! An image is a stream of little-endian 16-bit words. Word 0 loads at
//! address 0. The machine always sees the full 32768-word address space;
//! anything past the loaded words reads as zero.

use crate::error::VmError;
use log::{debug, info};
use std::io::Read;

/// Number of addressable words.
pub const MEMORY_SIZE: usize = 0x8000;

/// The machine's memory, seeded from a program image.
#[derive(Clone)]
pub struct ProgramImage {
    words: Vec<u16>,
    /// Number of words the image actually supplied
    loaded_len: usize,
}

impl ProgramImage {
    /// Build an image from raw bytes.
    ///
    /// A trailing odd byte becomes the low byte of one final word.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VmError> {
        let words: Vec<u16> = bytes
            .chunks(2)
            .map(|pair| match *pair {
                [lo, hi] => u16::from_le_bytes([lo, hi]),
                [lo] => lo as u16,
                _ => 0,
            })
            .collect();
        if bytes.len() % 2 == 1 {
            debug!("Image has odd length {}, padding final word", bytes.len());
        }
        Self::from_words(&words)
    }

    /// Read an entire image from a byte stream.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, VmError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Build an image from already decoded words.
    pub fn from_words(program: &[u16]) -> Result<Self, VmError> {
        if program.len() > MEMORY_SIZE {
            return Err(VmError::ImageTooLarge {
                words: program.len(),
            });
        }
        let mut words = vec![0u16; MEMORY_SIZE];
        words[..program.len()].copy_from_slice(program);
        info!("Loaded program image: {} words", program.len());
        Ok(ProgramImage {
            words,
            loaded_len: program.len(),
        })
    }

    /// Number of words supplied by the image.
    pub fn loaded_len(&self) -> usize {
        self.loaded_len
    }

    /// Read a word. Addresses outside the address space read as zero.
    pub fn read(&self, addr: usize) -> u16 {
        self.words.get(addr).copied().unwrap_or(0)
    }

    /// Write a word. Returns false when the address is outside memory.
    pub fn write(&mut self, addr: usize, value: u16) -> bool {
        match self.words.get_mut(addr) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// The whole address space as a slice.
    pub fn words(&self) -> &[u16] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::image_bytes;
    use test_log::test;

    #[test]
    fn test_little_endian_words() {
        let image = ProgramImage::from_bytes(&[0x13, 0x00, 0x4b, 0x00, 0x00, 0x80]).unwrap();
        assert_eq!(image.loaded_len(), 3);
        assert_eq!(image.read(0), 19);
        assert_eq!(image.read(1), 75);
        assert_eq!(image.read(2), 0x8000);
    }

    #[test]
    fn test_odd_trailing_byte_is_padded() {
        let image = ProgramImage::from_bytes(&[0x15, 0x00, 0x07]).unwrap();
        assert_eq!(image.loaded_len(), 2);
        assert_eq!(image.read(1), 7);
    }

    #[test]
    fn test_memory_past_image_reads_zero() {
        let mut image = ProgramImage::from_words(&[21, 21]).unwrap();
        assert_eq!(image.read(2), 0);
        assert_eq!(image.read(MEMORY_SIZE - 1), 0);
        assert!(image.write(MEMORY_SIZE - 1, 1234));
        assert_eq!(image.read(MEMORY_SIZE - 1), 1234);
        assert_eq!(image.read(MEMORY_SIZE), 0);
        assert!(!image.write(MEMORY_SIZE, 1));
    }

    #[test]
    fn test_oversized_image_rejected() {
        let program = vec![0u16; MEMORY_SIZE + 1];
        match ProgramImage::from_words(&program) {
            Err(VmError::ImageTooLarge { words }) => assert_eq!(words, MEMORY_SIZE + 1),
            other => panic!("expected ImageTooLarge, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_bytes_and_words_agree() {
        let program = [9, 32768, 4, 2, 19, 32768, 0];
        let from_bytes = ProgramImage::from_bytes(&image_bytes(&program)).unwrap();
        let from_words = ProgramImage::from_words(&program).unwrap();
        assert_eq!(from_bytes.words(), from_words.words());
        assert_eq!(from_bytes.loaded_len(), program.len());
    }

    #[test]
    fn test_from_reader() {
        let bytes: &[u8] = &[0x00, 0x00];
        let image = ProgramImage::from_reader(bytes).unwrap();
        assert_eq!(image.loaded_len(), 1);
    }
}
