//! Mnemonic-to-field lookup tables.
//!
//! Grounded on `original_source/emu101asm/assembler.py`'s `compute_map`/
//! `dest_map`/`condition_map` dictionaries, retyped against
//! [`emu101_cpu::encoding`] instead of raw bit values so the assembler and
//! the CPU decoder cannot drift apart.

use emu101_cpu::encoding::{Compute, Dest, cond};

/// An ALU mnemonic or bare register passthrough, e.g. `"add d1"` or `"dp"`.
#[must_use]
pub fn compute_token(token: &str) -> Option<Compute> {
    Some(match token {
        "sub d0" => Compute::SubD0D0,
        "sub d1" => Compute::SubD0D1,
        "sub d2" => Compute::SubD0D2,
        "d0" => Compute::OutD0,
        "add d0" => Compute::AddD0D0,
        "add d1" => Compute::AddD0D1,
        "add d2" => Compute::AddD0D2,
        "d1" => Compute::OutD1,
        "and d0" => Compute::AndD0D0,
        "and d1" => Compute::AndD0D1,
        "and d2" => Compute::AndD0D2,
        "d2" => Compute::OutD2,
        "or d0" => Compute::OrD0D0,
        "or d1" => Compute::OrD0D1,
        "or d2" => Compute::OrD0D2,
        "shl" => Compute::RollD0,
        "xor d0" => Compute::XorD0D0,
        "xor d1" => Compute::XorD0D1,
        "xor d2" => Compute::XorD0D2,
        "ip" => Compute::OutIp,
        "inc d0" => Compute::IncD0,
        "inc d1" => Compute::IncD1,
        "inc d2" => Compute::IncD2,
        "sp" => Compute::OutSp,
        "dec d0" => Compute::DecD0,
        "dec d1" => Compute::DecD1,
        "dec d2" => Compute::DecD2,
        "dp" => Compute::OutDp,
        "not d0" => Compute::NotD0,
        "not d1" => Compute::NotD1,
        "not d2" => Compute::NotD2,
        "shr" => Compute::RolrD0,
        _ => return None,
    })
}

/// A register destination mnemonic (`d0`/`d1`/`d2`/`ip`/`sp`/`dp`). Does not
/// accept `"data"` — that case is handled directly by the grammar layer,
/// since a bare `data` destination doesn't pick a register at all.
#[must_use]
pub fn dest_token(token: &str) -> Option<Dest> {
    Some(match token {
        "d0" => Dest::D0,
        "d1" => Dest::D1,
        "d2" => Dest::D2,
        "ip" => Dest::Ip,
        "sp" => Dest::Sp,
        "dp" => Dest::Dp,
        _ => return None,
    })
}

/// A condition mnemonic, returning the raw 3-bit cond mask.
#[must_use]
pub fn cond_token(token: &str) -> Option<u16> {
    Some(match token {
        "gt" => cond::GT,
        "ge" => cond::GE,
        "eq" | "z" => cond::EQ,
        "le" => cond::LE,
        "lt" => cond::LT,
        "ne" | "nz" => cond::NE,
        "true" => cond::TRUE,
        "false" => cond::FALSE,
        _ => return None,
    })
}
