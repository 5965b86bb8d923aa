//! The two-pass assembler driver: pass 1 resolves label addresses by
//! replaying pass 2's word-counting logic; pass 2 emits opcodes and
//! immediates, deferring unresolved `@label` references to a fixup list
//! resolved once the label table is complete.
//!
//! Grounded on `original_source/emu101asm/assembler.py`'s `Assembler`, with
//! one structural difference: the original resolves each label's address
//! inline, in the same pass that emits bytes, and only defers the *value*
//! of unresolved `@label` fixups. This assembler instead runs the two
//! passes spec.md describes as genuinely separate steps — pass 1 touches no
//! output buffer at all — which is behaviorally equivalent since nothing in
//! `decode_op` depends on whether a referenced label has resolved yet.

use std::collections::HashMap;

use crate::error::CompileError;
use crate::line::{self, SourceLine};
use crate::opcode::{Immediate, decode_op};

/// Default origin for assembled code — the ROM base of the fixed memory
/// map (spec.md §3).
pub const DEFAULT_PROG_OFFSET: u16 = 0xF000;
/// Default start of the RAM block the linker-as-allocator hands out fresh
/// addresses from for `@label` references that are never defined.
pub const DEFAULT_RAM_OFFSET: u16 = 0x0200;

/// Assembles EMU101 source text into a big-endian word stream.
pub struct Assembler {
    prog_offset: u16,
    ram_offset: u16,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new(DEFAULT_PROG_OFFSET, DEFAULT_RAM_OFFSET)
    }
}

impl Assembler {
    #[must_use]
    pub fn new(prog_offset: u16, ram_offset: u16) -> Self {
        Self { prog_offset, ram_offset }
    }

    /// Run both passes, returning the assembled big-endian byte stream.
    pub fn assemble(&self, source: &str) -> Result<Vec<u8>, CompileError> {
        let lines = line::tokenize(source);
        let labels = self.resolve_labels(&lines)?;
        self.emit(&lines, labels)
    }

    /// Pass 1: walk every line, assigning each label the word address
    /// `prog_offset + k`, where `k` is the running opcode-word count of all
    /// prior lines (an instruction is 1 word, or 2 if it carries an
    /// immediate).
    fn resolve_labels(&self, lines: &[SourceLine]) -> Result<HashMap<String, u16>, CompileError> {
        let mut labels = HashMap::new();
        let mut k: u16 = 0;
        for l in lines {
            for label in &l.labels {
                labels.insert(label.clone(), self.prog_offset.wrapping_add(k));
            }
            let (_, imm) = decode_op(&l.op).map_err(|e| compile_error(l, e.info))?;
            k = k.wrapping_add(if imm.is_some() { 2 } else { 1 });
        }
        Ok(labels)
    }

    /// Pass 2: decode every line into its final bytes, recording unresolved
    /// `@label` immediates as fixups to patch once the label table (as
    /// built by pass 1, extended with fresh RAM allocations here) is final.
    fn emit(&self, lines: &[SourceLine], mut labels: HashMap<String, u16>) -> Result<Vec<u8>, CompileError> {
        let mut bytes = Vec::new();
        let mut fixups = Vec::new();

        for l in lines {
            let (word, imm) = decode_op(&l.op).map_err(|e| compile_error(l, e.info))?;
            bytes.extend_from_slice(&word.to_be_bytes());
            match imm {
                None => {}
                Some(Immediate::Value(v)) => bytes.extend_from_slice(&v.to_be_bytes()),
                Some(Immediate::Label(name)) => {
                    fixups.push((bytes.len(), name));
                    bytes.extend_from_slice(&[0, 0]);
                }
            }
        }

        let mut next_ram = self.ram_offset;
        for (offset, name) in fixups {
            let addr = *labels.entry(name).or_insert_with(|| {
                let addr = next_ram;
                next_ram = next_ram.wrapping_add(1);
                addr
            });
            bytes[offset..offset + 2].copy_from_slice(&addr.to_be_bytes());
        }

        Ok(bytes)
    }
}

fn compile_error(line: &SourceLine, info: &'static str) -> CompileError {
    CompileError { line_no: line.line_no, symbol: line.op.clone(), info: info.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(source: &str) -> Vec<u8> {
        Assembler::default().assemble(source).unwrap()
    }

    #[test]
    fn assembles_a_halt_to_two_bytes() {
        assert_eq!(assemble("hlt"), vec![0xFF, 0xFF]);
    }

    #[test]
    fn immediate_load_emits_opcode_then_immediate() {
        let bytes = assemble("dp=!0xabcd\nhlt\n");
        assert_eq!(bytes, vec![0x00, 0xF7, 0xAB, 0xCD, 0xFF, 0xFF]);
    }

    #[test]
    fn forward_label_reference_resolves_to_its_own_address() {
        // `loop:` sits at word 0 (prog_offset + 0); `ip=@loop` at word 1
        // jumps back to it.
        let bytes = assemble("loop: d0=!1\nip=@loop\n");
        let jump_target = u16::from_be_bytes([bytes[6], bytes[7]]);
        assert_eq!(jump_target, DEFAULT_PROG_OFFSET);
    }

    #[test]
    fn undefined_label_allocates_a_fresh_ram_slot() {
        let bytes = assemble("d0=@undefined\nhlt\n");
        let addr = u16::from_be_bytes([bytes[2], bytes[3]]);
        assert_eq!(addr, DEFAULT_RAM_OFFSET);
    }

    #[test]
    fn two_undefined_labels_get_distinct_ram_slots() {
        let bytes = assemble("d0=@a\nd1=@b\nhlt\n");
        let a = u16::from_be_bytes([bytes[2], bytes[3]]);
        let b = u16::from_be_bytes([bytes[6], bytes[7]]);
        assert_ne!(a, b);
    }

    #[test]
    fn syntax_error_reports_line_number_and_text() {
        let err = Assembler::default().assemble("garbage\n").unwrap_err();
        assert_eq!(err.line_no, 0);
        assert_eq!(err.symbol, "garbage");
        assert_eq!(err.info, "Syntax Error");
    }

    #[test]
    fn auto_labels_number_from_one_after_a_user_label() {
        // `start:` carries `d0=!1` on its own line, occupying 2 words
        // (opcode + immediate). The following line auto-labels as
        // `start+1` and sits at `prog_offset + 2`.
        let bytes = assemble("start: d0=!1\nip=@start+1\nhlt\n");
        let jump = u16::from_be_bytes([bytes[6], bytes[7]]);
        assert_eq!(jump, DEFAULT_PROG_OFFSET.wrapping_add(2));
    }

    #[test]
    fn consecutive_bare_labels_resolve_to_the_same_address_without_duplicating_the_line() {
        // Both `a:` and `b:` bind to the `hlt` line; the instruction stream
        // must still be exactly one `hlt`, not one per alias.
        let bytes = assemble("a:\nb:\nhlt\n");
        assert_eq!(bytes, vec![0xFF, 0xFF]);
    }

    /// Every well-formed mnemonic assembles to the exact same opcode word
    /// `decode_op` alone produces for it — the assembler's two-pass driver
    /// adds no further transformation to a line with no label references.
    #[test]
    fn assembling_a_line_round_trips_through_decode_op() {
        for mnemonic in ["hlt", "nop", "brk", "d0=!0xabcd", "dp=data", "d0=add d1?gt", "data=d0"] {
            let (word, imm) = decode_op(mnemonic).unwrap();
            let bytes = assemble(&format!("{mnemonic}\n"));
            assert_eq!(u16::from_be_bytes([bytes[0], bytes[1]]), word, "{mnemonic}");
            match imm {
                None => assert_eq!(bytes.len(), 2, "{mnemonic}"),
                Some(Immediate::Value(v)) => {
                    assert_eq!(bytes.len(), 4, "{mnemonic}");
                    assert_eq!(u16::from_be_bytes([bytes[2], bytes[3]]), v, "{mnemonic}");
                }
                Some(Immediate::Label(_)) => unreachable!("none of these mnemonics reference a label"),
            }
        }
    }
}
