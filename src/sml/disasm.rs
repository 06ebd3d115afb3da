//! Mnemonic rendering of SML words for traces and the debugger.

use crate::machine::decode::{decode, Opcode};

/// Render a single raw word as a mnemonic, or as raw data when it does
/// not decode to a legal instruction.
pub fn disassemble_word(word: i32) -> String {
    match decode(word) {
        Ok(instr) if instr.opcode == Opcode::Halt => instr.opcode.mnemonic().to_string(),
        Ok(instr) => format!("{} {:02}", instr.opcode.mnemonic(), instr.operand),
        Err(_) => format!("DATA {:+05}", word),
    }
}

/// Render a whole program as an addressed listing.
pub fn disassemble(words: &[i32]) -> String {
    let mut out = String::new();
    for (addr, word) in words.iter().enumerate() {
        out.push_str(&format!("{:02}: {:+05}  {}\n", addr, word, disassemble_word(*word)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassemble_word() {
        assert_eq!(disassemble_word(1007), "READ 07");
        assert_eq!(disassemble_word(2107), "STORE 07");
        assert_eq!(disassemble_word(4300), "HALT");
        assert_eq!(disassemble_word(42), "DATA +0042");
        assert_eq!(disassemble_word(-17), "DATA -0017");
    }

    #[test]
    fn test_disassemble_listing() {
        let listing = disassemble(&[1007, 4300]);
        assert_eq!(listing, "00: +1007  READ 07\n01: +4300  HALT\n");
    }
}
