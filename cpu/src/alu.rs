//! The 32-operation ALU table (spec §4.4) and flag computation.

use crate::encoding::Compute;

/// The three condition-flag bits. Exactly one is ever set at a time — see
/// [`flags_for`].
pub mod flags {
    pub const LT: u16 = 0b001;
    pub const EQ: u16 = 0b010;
    pub const GT: u16 = 0b100;
}

/// The live register values the ALU can read from.
#[derive(Debug, Clone, Copy)]
pub struct Operands {
    pub d0: u16,
    pub d1: u16,
    pub d2: u16,
    pub ip: u16,
    pub sp: u16,
    pub dp: u16,
}

/// Compute the result of `op` against the given register snapshot.
///
/// All arithmetic wraps mod 2^16; shifts discard/zero-fill per spec §4.1.
#[must_use]
#[allow(clippy::eq_op)] // AND/OR/XOR-with-self are real table entries, not typos.
pub fn compute(op: Compute, regs: Operands) -> u16 {
    let Operands { d0, d1, d2, ip, sp, dp } = regs;
    match op {
        Compute::SubD0D0 => d0.wrapping_sub(d0),
        Compute::SubD0D1 => d0.wrapping_sub(d1),
        Compute::SubD0D2 => d0.wrapping_sub(d2),
        Compute::OutD0 => d0,
        Compute::AddD0D0 => d0.wrapping_add(d0),
        Compute::AddD0D1 => d0.wrapping_add(d1),
        Compute::AddD0D2 => d0.wrapping_add(d2),
        Compute::OutD1 => d1,
        Compute::AndD0D0 => d0 & d0,
        Compute::AndD0D1 => d0 & d1,
        Compute::AndD0D2 => d0 & d2,
        Compute::OutD2 => d2,
        Compute::OrD0D0 => d0 | d0,
        Compute::OrD0D1 => d0 | d1,
        Compute::OrD0D2 => d0 | d2,
        Compute::RollD0 => d0 << 1,
        Compute::XorD0D0 => d0 ^ d0,
        Compute::XorD0D1 => d0 ^ d1,
        Compute::XorD0D2 => d0 ^ d2,
        Compute::OutIp => ip,
        Compute::IncD0 => d0.wrapping_add(1),
        Compute::IncD1 => d1.wrapping_add(1),
        Compute::IncD2 => d2.wrapping_add(1),
        Compute::OutSp => sp,
        Compute::DecD0 => d0.wrapping_sub(1),
        Compute::DecD1 => d1.wrapping_sub(1),
        Compute::DecD2 => d2.wrapping_sub(1),
        Compute::OutDp => dp,
        Compute::NotD0 => !d0,
        Compute::NotD1 => !d1,
        Compute::NotD2 => !d2,
        Compute::RolrD0 => d0 >> 1,
    }
}

/// The signed-comparison-to-zero flag assignment spec §4.1 requires:
/// exactly one of LT/EQ/GT, reassigned on every ALU result.
#[must_use]
pub fn flags_for(result: u16) -> u16 {
    match (result as i16).cmp(&0) {
        std::cmp::Ordering::Greater => flags::GT,
        std::cmp::Ordering::Less => flags::LT,
        std::cmp::Ordering::Equal => flags::EQ,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regs(d0: u16, d1: u16, d2: u16) -> Operands {
        Operands { d0, d1, d2, ip: 0, sp: 0, dp: 0 }
    }

    #[test]
    fn sub_sets_lt_when_d0_less_than_d1_signed() {
        let result = compute(Compute::SubD0D1, regs(5, 10, 0));
        assert_eq!(flags_for(result) & flags::LT, flags::LT);
        assert_eq!(flags_for(result) & (flags::EQ | flags::GT), 0);
    }

    #[test]
    fn zero_result_sets_only_eq() {
        assert_eq!(flags_for(0), flags::EQ);
    }

    #[test]
    fn positive_result_sets_only_gt() {
        assert_eq!(flags_for(1), flags::GT);
    }

    #[test]
    fn shift_left_discards_top_bit_and_shift_right_is_logical() {
        assert_eq!(compute(Compute::RollD0, regs(0x8001, 0, 0)), 0x0002);
        assert_eq!(compute(Compute::RolrD0, regs(0x8001, 0, 0)), 0x4000);
    }

    #[test]
    fn not_inverts_all_16_bits() {
        assert_eq!(compute(Compute::NotD0, regs(0x0000, 0, 0)), 0xFFFF);
    }

    #[test]
    fn add_wraps_mod_2_16() {
        assert_eq!(compute(Compute::AddD0D0, regs(0x8000, 0, 0)), 0x0000);
    }
}
