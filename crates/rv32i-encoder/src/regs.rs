//! RV32I general-purpose registers.

use core::fmt;

/// Number of general-purpose registers in RV32I.
pub const GPR_COUNT: usize = 32;

/// ABI names indexed by register number.
const ABI_NAMES: [&str; GPR_COUNT] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// RV32I general-purpose register (`x0`..`x31`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Gpr(u8);

impl Gpr {
    /// Create a new GPR from register number (0-31).
    ///
    /// # Panics
    ///
    /// Panics if the register number is >= 32.
    pub fn new(num: u8) -> Self {
        assert!(num < 32, "Register number must be < 32");
        Self(num)
    }

    /// Create a GPR from a register number, rejecting anything outside 0-31.
    pub fn try_new(num: u8) -> Option<Self> {
        (num < 32).then_some(Self(num))
    }

    /// Build a GPR from the low five bits of an instruction field.
    ///
    /// Every 5-bit value names a register, so this never fails.
    pub const fn from_field(bits: u32) -> Self {
        Self((bits & 0x1f) as u8)
    }

    /// Get the register number (0-31).
    pub fn num(&self) -> u8 {
        self.0
    }

    /// Register number as an array index.
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// True for the hardwired zero register.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// ABI name of this register (`zero`, `ra`, `a0`, ...).
    pub fn abi_name(&self) -> &'static str {
        ABI_NAMES[self.index()]
    }

    /// All 32 registers in ascending order.
    pub fn all() -> impl Iterator<Item = Gpr> {
        (0..GPR_COUNT as u8).map(Gpr)
    }
}

// Named registers
impl Gpr {
    pub const ZERO: Gpr = Gpr(0);
    pub const RA: Gpr = Gpr(1);
    pub const SP: Gpr = Gpr(2);
    pub const GP: Gpr = Gpr(3);
    pub const TP: Gpr = Gpr(4);
    pub const T0: Gpr = Gpr(5);
    pub const T1: Gpr = Gpr(6);
    pub const T2: Gpr = Gpr(7);
    pub const S0: Gpr = Gpr(8);
    pub const S1: Gpr = Gpr(9);
    pub const A0: Gpr = Gpr(10);
    pub const A1: Gpr = Gpr(11);
    pub const A2: Gpr = Gpr(12);
    pub const A3: Gpr = Gpr(13);
    pub const A4: Gpr = Gpr(14);
    pub const A5: Gpr = Gpr(15);
    pub const A6: Gpr = Gpr(16);
    pub const A7: Gpr = Gpr(17);
    pub const S2: Gpr = Gpr(18);
    pub const S3: Gpr = Gpr(19);
    pub const S4: Gpr = Gpr(20);
    pub const S5: Gpr = Gpr(21);
    pub const S6: Gpr = Gpr(22);
    pub const S7: Gpr = Gpr(23);
    pub const S8: Gpr = Gpr(24);
    pub const S9: Gpr = Gpr(25);
    pub const S10: Gpr = Gpr(26);
    pub const S11: Gpr = Gpr(27);
    pub const T3: Gpr = Gpr(28);
    pub const T4: Gpr = Gpr(29);
    pub const T5: Gpr = Gpr(30);
    pub const T6: Gpr = Gpr(31);

    /// Parse a register name string into a Gpr.
    ///
    /// Accepts ABI names (`zero`, `ra`, `sp`, `a0`-`a7`, `s0`-`s11`, `t0`-`t6`,
    /// `fp`) and numeric names (`x0`-`x31`).
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "fp" {
            return Some(Gpr::S0);
        }
        if let Some(pos) = ABI_NAMES.iter().position(|abi| *abi == name) {
            return Some(Gpr(pos as u8));
        }
        name.strip_prefix('x')
            .and_then(|digits| digits.parse::<u8>().ok())
            .and_then(Gpr::try_new)
    }
}

impl fmt::Display for Gpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abi_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn test_gpr_creation() {
        let reg = Gpr::new(5);
        assert_eq!(reg.num(), 5);
        assert_eq!(reg, Gpr::T0);
    }

    #[test]
    #[should_panic(expected = "Register number must be < 32")]
    fn test_gpr_invalid() {
        Gpr::new(32);
    }

    #[test]
    fn test_try_new_rejects_out_of_range() {
        assert_eq!(Gpr::try_new(31), Some(Gpr::T6));
        assert_eq!(Gpr::try_new(32), None);
        assert_eq!(Gpr::try_new(255), None);
    }

    #[test]
    fn test_from_field_masks() {
        assert_eq!(Gpr::from_field(0b1_00001), Gpr::RA);
        assert_eq!(Gpr::from_field(0xffff_ffff), Gpr::T6);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Gpr::from_name("zero"), Some(Gpr::ZERO));
        assert_eq!(Gpr::from_name("fp"), Some(Gpr::S0));
        assert_eq!(Gpr::from_name("s11"), Some(Gpr::S11));
        assert_eq!(Gpr::from_name("x17"), Some(Gpr::A7));
        assert_eq!(Gpr::from_name("x32"), None);
        assert_eq!(Gpr::from_name("q1"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Gpr::ZERO), "zero");
        assert_eq!(format!("{}", Gpr::RA), "ra");
        assert_eq!(format!("{}", Gpr::SP), "sp");
        assert_eq!(format!("{}", Gpr::S0), "s0");
        assert_eq!(format!("{}", Gpr::A0), "a0");
        assert_eq!(format!("{}", Gpr::T6), "t6");
    }

    #[test]
    fn test_all_is_ordered() {
        let regs: alloc::vec::Vec<Gpr> = Gpr::all().collect();
        assert_eq!(regs.len(), GPR_COUNT);
        assert_eq!(regs[0], Gpr::ZERO);
        assert_eq!(regs[31], Gpr::T6);
    }
}
