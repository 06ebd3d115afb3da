//! Simpletron memory subsystem.
//!
//! The Simpletron has 100 signed decimal words addressed 0-99. Memory
//! holds instructions and data interchangeably (von Neumann model), plus
//! a parallel table of inline source comments kept for redisplay.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The number of memory words in the Simpletron.
pub const MEMORY_SIZE: usize = 100;

/// Smallest value a loaded word may hold.
pub const WORD_MIN: i32 = -9999;

/// Largest value a loaded word may hold.
pub const WORD_MAX: i32 = 9999;

/// Marker that introduces an inline comment in SML source.
pub const COMMENT_MARKER: &str = "//";

/// Simpletron memory: 100 signed words and their source comments.
///
/// Only loading enforces the `[-9999, 9999]` word range. [`Memory::write`]
/// accepts any value, so an out-of-range word delivered by the driver
/// surfaces later as an accumulator overflow, never as a crash here.
#[derive(Clone, Serialize, Deserialize)]
pub struct Memory {
    words: Vec<i32>,
    comments: Vec<String>,
}

impl Memory {
    /// Create a new memory with all words zeroed.
    pub fn new() -> Self {
        Self {
            words: vec![0; MEMORY_SIZE],
            comments: vec![String::new(); MEMORY_SIZE],
        }
    }

    /// Read a word by address (0-99).
    ///
    /// # Panics
    /// Panics if the address is out of range.
    #[inline]
    pub fn read(&self, addr: usize) -> i32 {
        assert!(addr < MEMORY_SIZE, "memory address {} out of range (0-{})", addr, MEMORY_SIZE - 1);
        self.words[addr]
    }

    /// Write a word by address (0-99).
    ///
    /// # Panics
    /// Panics if the address is out of range.
    #[inline]
    pub fn write(&mut self, addr: usize, value: i32) {
        assert!(addr < MEMORY_SIZE, "memory address {} out of range (0-{})", addr, MEMORY_SIZE - 1);
        self.words[addr] = value;
    }

    /// The whole 100-word store, for display.
    pub fn words(&self) -> &[i32] {
        &self.words
    }

    /// The inline comment loaded for an address, or `""`.
    pub fn comment_at(&self, addr: usize) -> &str {
        if addr < MEMORY_SIZE {
            &self.comments[addr]
        } else {
            ""
        }
    }

    /// Clear all words and comments.
    pub fn clear(&mut self) {
        self.words.fill(0);
        for c in &mut self.comments {
            c.clear();
        }
    }

    /// Fill memory from SML source lines, one line per address.
    ///
    /// Expects a cleared memory (the machine resets before loading). Each
    /// line may end with a `//` comment, which is stored for redisplay and
    /// never parsed. A line that is blank after comment stripping leaves
    /// its word at 0. On error memory keeps whatever was written before
    /// the failing line, so the driver can still display the partial load.
    pub fn load_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<(), LoadError> {
        if lines.len() > MEMORY_SIZE {
            return Err(LoadError::ProgramTooLarge { lines: lines.len() });
        }

        for (i, line) in lines.iter().enumerate() {
            let line = line.as_ref().trim();

            let (instruction_part, comment_part) = match line.find(COMMENT_MARKER) {
                Some(idx) => (&line[..idx], line[idx + COMMENT_MARKER.len()..].trim()),
                None => (line, ""),
            };
            self.comments[i] = comment_part.to_string();

            let text = instruction_part.trim();
            if text.is_empty() {
                continue;
            }

            let value: i32 = text.parse().map_err(|_| LoadError::NotNumeric {
                line: i + 1,
                text: line.to_string(),
            })?;

            if !(WORD_MIN..=WORD_MAX).contains(&value) {
                return Err(LoadError::OutOfRange { line: i + 1, value });
            }

            self.words[i] = value;
        }

        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let non_zero = self.words.iter().filter(|w| **w != 0).count();
        f.debug_struct("Memory")
            .field("non_zero_words", &non_zero)
            .field("total_words", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur while loading an SML program.
///
/// The `Display` strings are consumer-facing and stable; drivers show
/// them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("error: the program is too large! A maximum of 100 instructions is allowed.")]
    ProgramTooLarge { lines: usize },

    #[error("error on line {line}: the text '{text}' is not a valid instruction.")]
    NotNumeric { line: usize, text: String },

    #[error("error on line {line}: the instruction '{value}' is outside the allowed range [-9999, 9999].")]
    OutOfRange { line: usize, value: i32 },
}
