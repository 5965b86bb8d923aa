//! Bit-field layout of a non-special EMU101 opcode.
//!
//! ```text
//! 15    14 13   12  11 10 9 8   7 6     5 4 3   2 1 0
//! IO    AddrMode  Compute       Source  Dest    Cond
//! ```
//!
//! This is the single source of truth the CPU decoder and the assembler
//! emitter both build on: the CPU extracts these fields from a fetched word,
//! the assembler composes them into one.

/// `0xFFFF` — halts the CPU.
pub const HLT: u16 = 0xFFFF;
/// `0x5555` — triggers a debug dump and halts (soft breakpoint).
pub const BRK: u16 = 0x5555;

const IO_SHIFT: u32 = 15;
const ADDR_MODE_SHIFT: u32 = 13;
const COMPUTE_SHIFT: u32 = 8;
const SOURCE_SHIFT: u32 = 6;
const DEST_SHIFT: u32 = 3;

const ADDR_MODE_MASK: u16 = 0b11;
const COMPUTE_MASK: u16 = 0b1_1111;
const SOURCE_MASK: u16 = 0b11;
const DEST_MASK: u16 = 0b111;
const COND_MASK: u16 = 0b111;

/// Bit 15: whether this instruction reads or writes memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Io {
    Read,
    Write,
}

/// Bits 14-13: which register (and optional auto-adjustment) forms the
/// effective memory address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    /// address = `dp`
    Dp,
    /// address = `sp`, post-incremented on read / pre-decremented on write
    Sp,
    /// address = `dp + d0`
    DpD0,
    /// address = `sp + d0`
    SpD0,
}

/// Bits 12-8: the 5-bit ALU operation selector (32 entries).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum Compute {
    SubD0D0, SubD0D1, SubD0D2, OutD0,
    AddD0D0, AddD0D1, AddD0D2, OutD1,
    AndD0D0, AndD0D1, AndD0D2, OutD2,
    OrD0D0,  OrD0D1,  OrD0D2,  RollD0,
    XorD0D0, XorD0D1, XorD0D2, OutIp,
    IncD0,   IncD1,   IncD2,   OutSp,
    DecD0,   DecD1,   DecD2,   OutDp,
    NotD0,   NotD1,   NotD2,   RolrD0,
}

/// Bits 7-6: where the writeback value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Zero,
    Alu,
    Data,
    Immediate,
}

/// Bits 5-3: where the writeback value goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dest {
    D0,
    D1,
    D2,
    /// Discard.
    N1,
    Ip,
    Sp,
    Dp,
    /// Discard.
    N2,
}

/// Bits 2-0: the 3-bit mask `ANDed` against the flag register to gate
/// writeback. Re-exported as raw bit values rather than an enum since the
/// assembler composes these with `|` (e.g. `LE = LT | EQ`).
pub mod cond {
    pub const FALSE: u16 = 0b000;
    pub const LT: u16 = 0b001;
    pub const EQ: u16 = 0b010;
    pub const LE: u16 = LT | EQ;
    pub const GT: u16 = 0b100;
    pub const NE: u16 = LT | GT;
    pub const GE: u16 = EQ | GT;
    pub const TRUE: u16 = LT | EQ | GT;
}

/// The decoded fields of a non-special opcode.
#[derive(Debug, Clone, Copy)]
pub struct Fields {
    pub io: Io,
    pub addr_mode: AddrMode,
    pub compute: Compute,
    pub source: Source,
    pub dest: Dest,
    pub cond: u16,
}

impl Fields {
    /// Extract all six fields from a raw opcode word.
    ///
    /// Callers are responsible for checking the two special opcodes
    /// (`HLT`, `BRK`) before calling this — it assumes a "normal" opcode.
    #[must_use]
    pub fn decode(word: u16) -> Self {
        Self {
            io: Io::decode((word >> IO_SHIFT) & 1),
            addr_mode: AddrMode::decode((word >> ADDR_MODE_SHIFT) & ADDR_MODE_MASK),
            compute: Compute::decode((word >> COMPUTE_SHIFT) & COMPUTE_MASK),
            source: Source::decode((word >> SOURCE_SHIFT) & SOURCE_MASK),
            dest: Dest::decode((word >> DEST_SHIFT) & DEST_MASK),
            cond: word & COND_MASK,
        }
    }

    /// Recompose a raw opcode word from its fields (used by the assembler).
    #[must_use]
    pub fn encode(&self) -> u16 {
        (self.io.encode() << IO_SHIFT)
            | (self.addr_mode.encode() << ADDR_MODE_SHIFT)
            | (self.compute.encode() << COMPUTE_SHIFT)
            | (self.source.encode() << SOURCE_SHIFT)
            | (self.dest.encode() << DEST_SHIFT)
            | (self.cond & COND_MASK)
    }
}

impl Io {
    fn decode(bits: u16) -> Self {
        if bits == 0 { Io::Read } else { Io::Write }
    }

    fn encode(self) -> u16 {
        match self {
            Io::Read => 0,
            Io::Write => 1,
        }
    }
}

impl AddrMode {
    fn decode(bits: u16) -> Self {
        match bits {
            0b00 => AddrMode::Dp,
            0b01 => AddrMode::Sp,
            0b10 => AddrMode::DpD0,
            0b11 => AddrMode::SpD0,
            _ => unreachable!("2-bit field"),
        }
    }

    fn encode(self) -> u16 {
        match self {
            AddrMode::Dp => 0b00,
            AddrMode::Sp => 0b01,
            AddrMode::DpD0 => 0b10,
            AddrMode::SpD0 => 0b11,
        }
    }
}

impl Compute {
    /// Decode the raw 5-bit field value (exposed so the assembler can merge
    /// two compute-bit sources, e.g. a `cond_src` mnemonic OR'd on top of
    /// `src`'s own compute selector).
    #[must_use]
    #[rustfmt::skip]
    pub fn from_bits(bits: u16) -> Self {
        Self::decode(bits)
    }

    /// The raw 5-bit field value.
    #[must_use]
    pub fn bits(self) -> u16 {
        self.encode()
    }

    #[rustfmt::skip]
    fn decode(bits: u16) -> Self {
        match bits {
            0b00000 => Compute::SubD0D0, 0b00001 => Compute::SubD0D1, 0b00010 => Compute::SubD0D2, 0b00011 => Compute::OutD0,
            0b00100 => Compute::AddD0D0, 0b00101 => Compute::AddD0D1, 0b00110 => Compute::AddD0D2, 0b00111 => Compute::OutD1,
            0b01000 => Compute::AndD0D0, 0b01001 => Compute::AndD0D1, 0b01010 => Compute::AndD0D2, 0b01011 => Compute::OutD2,
            0b01100 => Compute::OrD0D0,  0b01101 => Compute::OrD0D1,  0b01110 => Compute::OrD0D2,  0b01111 => Compute::RollD0,
            0b10000 => Compute::XorD0D0, 0b10001 => Compute::XorD0D1, 0b10010 => Compute::XorD0D2, 0b10011 => Compute::OutIp,
            0b10100 => Compute::IncD0,   0b10101 => Compute::IncD1,   0b10110 => Compute::IncD2,   0b10111 => Compute::OutSp,
            0b11000 => Compute::DecD0,   0b11001 => Compute::DecD1,   0b11010 => Compute::DecD2,   0b11011 => Compute::OutDp,
            0b11100 => Compute::NotD0,   0b11101 => Compute::NotD1,   0b11110 => Compute::NotD2,   0b11111 => Compute::RolrD0,
            _ => unreachable!("5-bit field"),
        }
    }

    #[rustfmt::skip]
    fn encode(self) -> u16 {
        match self {
            Compute::SubD0D0 => 0b00000, Compute::SubD0D1 => 0b00001, Compute::SubD0D2 => 0b00010, Compute::OutD0 => 0b00011,
            Compute::AddD0D0 => 0b00100, Compute::AddD0D1 => 0b00101, Compute::AddD0D2 => 0b00110, Compute::OutD1 => 0b00111,
            Compute::AndD0D0 => 0b01000, Compute::AndD0D1 => 0b01001, Compute::AndD0D2 => 0b01010, Compute::OutD2 => 0b01011,
            Compute::OrD0D0  => 0b01100, Compute::OrD0D1  => 0b01101, Compute::OrD0D2  => 0b01110, Compute::RollD0 => 0b01111,
            Compute::XorD0D0 => 0b10000, Compute::XorD0D1 => 0b10001, Compute::XorD0D2 => 0b10010, Compute::OutIp => 0b10011,
            Compute::IncD0   => 0b10100, Compute::IncD1   => 0b10101, Compute::IncD2   => 0b10110, Compute::OutSp => 0b10111,
            Compute::DecD0   => 0b11000, Compute::DecD1   => 0b11001, Compute::DecD2   => 0b11010, Compute::OutDp => 0b11011,
            Compute::NotD0   => 0b11100, Compute::NotD1   => 0b11101, Compute::NotD2   => 0b11110, Compute::RolrD0 => 0b11111,
        }
    }
}

impl Source {
    fn decode(bits: u16) -> Self {
        match bits {
            0b00 => Source::Zero,
            0b01 => Source::Alu,
            0b10 => Source::Data,
            0b11 => Source::Immediate,
            _ => unreachable!("2-bit field"),
        }
    }

    fn encode(self) -> u16 {
        match self {
            Source::Zero => 0b00,
            Source::Alu => 0b01,
            Source::Data => 0b10,
            Source::Immediate => 0b11,
        }
    }
}

impl Dest {
    fn decode(bits: u16) -> Self {
        match bits {
            0b000 => Dest::D0,
            0b001 => Dest::D1,
            0b010 => Dest::D2,
            0b011 => Dest::N1,
            0b100 => Dest::Ip,
            0b101 => Dest::Sp,
            0b110 => Dest::Dp,
            0b111 => Dest::N2,
            _ => unreachable!("3-bit field"),
        }
    }

    fn encode(self) -> u16 {
        match self {
            Dest::D0 => 0b000,
            Dest::D1 => 0b001,
            Dest::D2 => 0b010,
            Dest::N1 => 0b011,
            Dest::Ip => 0b100,
            Dest::Sp => 0b101,
            Dest::Dp => 0b110,
            Dest::N2 => 0b111,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_field_combination_that_can_occur() {
        for io in [Io::Read, Io::Write] {
            for addr_mode in [AddrMode::Dp, AddrMode::Sp, AddrMode::DpD0, AddrMode::SpD0] {
                let fields = Fields {
                    io,
                    addr_mode,
                    compute: Compute::AddD0D1,
                    source: Source::Immediate,
                    dest: Dest::D0,
                    cond: cond::GE,
                };
                let decoded = Fields::decode(fields.encode());
                assert_eq!(decoded.io, fields.io);
                assert_eq!(decoded.addr_mode, fields.addr_mode);
                assert_eq!(decoded.cond, fields.cond);
            }
        }
    }

    #[test]
    fn compute_table_round_trips() {
        for bits in 0u16..32 {
            let compute = Compute::decode(bits);
            assert_eq!(compute.encode(), bits);
        }
    }
}
