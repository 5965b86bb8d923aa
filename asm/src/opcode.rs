//! Per-line semantic decode: turns a [`ParsedOp`] (or a special mnemonic)
//! into an opcode word plus an optional immediate, grounded on
//! `original_source/emu101asm/assembler.py`'s `_decode_dst`/`_decode_src`/
//! `_decode_cond`.

use emu101_cpu::encoding::{AddrMode, Compute, Dest, Fields, Io, Source, cond};

use crate::error::DecodeError;
use crate::grammar::{ParsedOp, parse_op};
use crate::tables::{cond_token, compute_token, dest_token};

/// The resolved immediate operand of an instruction, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Immediate {
    /// A literal value, known at decode time.
    Value(u16),
    /// An unresolved `@label` reference, fixed up once pass 1's label table
    /// (or the RAM-allocation fallback) resolves it.
    Label(String),
}

fn err(info: &'static str) -> DecodeError {
    DecodeError { info }
}

/// Decode one already-lowercased operation body into `(opcode, immediate)`.
///
/// This is pass-independent: deciding whether an instruction carries an
/// immediate word never depends on whether a referenced label has been
/// resolved yet, only on the textual form of `src`. That is what lets pass 1
/// replay this exact logic to count words without resolving anything.
pub fn decode_op(op: &str) -> Result<(u16, Option<Immediate>), DecodeError> {
    match op {
        "hlt" => return Ok((emu101_cpu::encoding::HLT, None)),
        "nop" | "noop" => return Ok((0x0000, None)),
        "brk" => return Ok((emu101_cpu::encoding::BRK, None)),
        _ => {}
    }

    let parsed = parse_op(op).ok_or(err("Syntax Error"))?;
    let (dst_io, dst_addr_mode, dst_dest) = decode_dst(&parsed)?;
    let (src_source, src_compute, immediate) = decode_src(&parsed.src)?;
    let (cond_bits, cond_compute_bits) = decode_cond(parsed.cond.as_deref(), parsed.cond_src.as_deref())?;

    let fields = Fields {
        io: dst_io,
        addr_mode: dst_addr_mode,
        compute: Compute::from_bits(src_compute.bits() | cond_compute_bits),
        source: src_source,
        dest: dst_dest,
        cond: cond_bits,
    };
    Ok((fields.encode(), immediate))
}

/// `dst[,dst2]` → `(Io, AddrMode, Dest)`. `AddrMode` is always `Dp`: the
/// mnemonic grammar has no syntax for selecting `Sp`/`DpD0`/`SpD0` (the
/// original's `address_map` entries for those are dead code — unreachable
/// from `_decode_dst`/`_decode_src`), so those modes are only reachable via
/// hand-assembled opcode words.
fn decode_dst(parsed: &ParsedOp) -> Result<(Io, AddrMode, Dest), DecodeError> {
    match (&parsed.dst[..], parsed.dst_b.as_deref()) {
        ("data", None) => Ok((Io::Write, AddrMode::Dp, Dest::N1)),
        (dst, None) => Ok((Io::Read, AddrMode::Dp, dest_token(dst).ok_or(err("Unknown Destination"))?)),
        (dst, Some(dst_b)) if dst == dst_b => Err(err("Duplicate Destination Error")),
        (dst, Some("data")) => Ok((Io::Write, AddrMode::Dp, dest_token(dst).ok_or(err("Unknown Destination"))?)),
        ("data", Some(dst_b)) => Ok((Io::Write, AddrMode::Dp, dest_token(dst_b).ok_or(err("Unknown Destination"))?)),
        _ => Err(err("Unknown Destination Error")),
    }
}

/// `src` → `(Source, Compute, immediate)`. `Compute` is meaningless unless
/// `Source == Alu`, mirroring the original's unconditional OR of
/// `compute_map[src]` into the opcode even though the CPU only consults it
/// for `Source::Alu`.
fn decode_src(src: &str) -> Result<(Source, Compute, Option<Immediate>), DecodeError> {
    if let Some(hex) = src.strip_prefix("!0x") {
        let value = u16::from_str_radix(hex, 16).map_err(|_| err("Unknown Source or Computation"))?;
        return Ok((Source::Immediate, Compute::SubD0D0, Some(Immediate::Value(value))));
    }
    if let Some(bin) = src.strip_prefix("!0b") {
        let value = u16::from_str_radix(bin, 2).map_err(|_| err("Unknown Source or Computation"))?;
        return Ok((Source::Immediate, Compute::SubD0D0, Some(Immediate::Value(value))));
    }
    if let Some(dec) = src.strip_prefix('!') {
        let value = dec.parse::<u16>().map_err(|_| err("Unknown Source or Computation"))?;
        return Ok((Source::Immediate, Compute::SubD0D0, Some(Immediate::Value(value))));
    }
    if let Some(label) = src.strip_prefix('@') {
        return Ok((Source::Immediate, Compute::SubD0D0, Some(Immediate::Label(label.to_string()))));
    }
    if src == "data" {
        return Ok((Source::Data, Compute::SubD0D0, None));
    }
    if let Some(compute) = compute_token(src) {
        return Ok((Source::Alu, compute, None));
    }
    Err(err("Unknown Source or Computation"))
}

/// `cond[,cond_src]` → `(cond mask, compute bits to OR into the opcode)`.
///
/// `cond_src`, when present, is looked up in the same compute table as
/// `src` and its bits are OR'd into the instruction's `Compute` field on top
/// of whatever `src` already selected there — mirroring
/// `original_source/emu101asm/assembler.py`'s `_decode_cond`, whose
/// `code |= compute_map[cond_src]` result the caller then ORs into the
/// opcode alongside `_decode_src`'s own compute bits.
fn decode_cond(cond_tok: Option<&str>, cond_src: Option<&str>) -> Result<(u16, u16), DecodeError> {
    let Some(cond_tok) = cond_tok else {
        return Ok((cond::TRUE, 0));
    };
    let bits = cond_token(cond_tok).ok_or(err("Unknown Conditional"))?;
    let compute_bits = match cond_src {
        None => 0,
        Some(cond_src) => compute_token(cond_src).ok_or(err("Unknown Source or Computation in Conditional"))?.bits(),
    };
    Ok((bits, compute_bits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hlt_nop_brk_are_special_opcodes() {
        assert_eq!(decode_op("hlt").unwrap().0, emu101_cpu::encoding::HLT);
        assert_eq!(decode_op("nop").unwrap().0, 0x0000);
        assert_eq!(decode_op("noop").unwrap().0, 0x0000);
        assert_eq!(decode_op("brk").unwrap().0, emu101_cpu::encoding::BRK);
    }

    #[test]
    fn dp_immediate_load_matches_scenario_a() {
        let (word, imm) = decode_op("dp=!0xabcd").unwrap();
        assert_eq!(word, 0x00F7);
        assert_eq!(imm, Some(Immediate::Value(0xABCD)));
    }

    #[test]
    fn data_write_encodes_as_immediate_store_at_dp() {
        let (word, imm) = decode_op("data=!0xbeef").unwrap();
        assert_eq!(word, 0x80DF);
        assert_eq!(imm, Some(Immediate::Value(0xBEEF)));
    }

    #[test]
    fn data_read_scenario_c() {
        let (word, imm) = decode_op("d0=data").unwrap();
        assert_eq!(word, 0x0087);
        assert_eq!(imm, None);
    }

    #[test]
    fn unresolved_label_reference_is_an_immediate_label() {
        let (_word, imm) = decode_op("ip=@loop").unwrap();
        assert_eq!(imm, Some(Immediate::Label("loop".to_string())));
    }

    #[test]
    fn duplicate_destination_is_a_decode_error() {
        assert_eq!(decode_op("d0,d0=!1"), Err(err("Duplicate Destination Error")));
    }

    #[test]
    fn two_data_destinations_is_ambiguous() {
        assert_eq!(decode_op("data,data=!1"), Err(err("Duplicate Destination Error")));
    }

    #[test]
    fn two_named_destinations_neither_of_which_is_data_is_unknown() {
        assert_eq!(decode_op("d0,d1=!1"), Err(err("Unknown Destination Error")));
    }

    #[test]
    fn unknown_mnemonic_is_a_syntax_error() {
        assert_eq!(decode_op("not a real line"), Err(err("Syntax Error")));
    }

    #[test]
    fn unknown_conditional_is_a_decode_error() {
        assert_eq!(decode_op("d0=d1?xx"), Err(err("Unknown Conditional")));
    }

    #[test]
    fn cond_src_ors_its_compute_bits_onto_the_opcode() {
        // src "add d1" selects AddD0D1 (0b00101); cond_src "d2" selects
        // OutD2 (0b01011). Neither is a subset of the other, so the OR
        // lands on a third, distinct compute selector: RollD0 (0b01111).
        let (word, _imm) = decode_op("d0=add d1?gt,d2").unwrap();
        assert_eq!(Fields::decode(word).compute, emu101_cpu::encoding::Compute::RollD0);
    }

    #[test]
    fn unknown_cond_src_is_a_decode_error() {
        assert_eq!(decode_op("d0=d1?gt,zz"), Err(err("Unknown Source or Computation in Conditional")));
    }
}
