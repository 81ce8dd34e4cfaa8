//! Fault flag bitmask

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

static FLAG_NAMES: [(FaultFlags, &str); 5] = [
    (FaultFlags::NO_DATA, "OFF"),
    (FaultFlags::STALE_DATA, "STALE"),
    (FaultFlags::TIMEOUT, "TIMEOUT"),
    (FaultFlags::HIGH_ERROR_COUNT, "ERR CNT"),
    (FaultFlags::HIGH_ERROR_DENSITY, "ERR DNST"),
];

/// Bit flags describing why a validator distrusts its sensor
///
/// Several reasons can hold at once; reports combine them with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FaultFlags(u8);

impl FaultFlags {
    /// Validator registered but no sample ever received
    pub const NO_DATA: Self = Self(1 << 0);
    /// Same value repeated beyond the frozen-sensor limit
    pub const STALE_DATA: Self = Self(1 << 1);
    /// No sample within the timeout window
    pub const TIMEOUT: Self = Self(1 << 2);
    /// Driver error counter above the hard limit
    pub const HIGH_ERROR_COUNT: Self = Self(1 << 3);
    /// Recent error density above the window
    pub const HIGH_ERROR_DENSITY: Self = Self(1 << 4);

    /// No fault
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every fault
    pub const fn all() -> Self {
        Self(0b1_1111)
    }

    /// Raw bit mask
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// No fault set
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// All flags of `other` are set
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Set the flags of `other`
    pub fn set(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clear every flag
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Short operator-facing names of the set flags, in bit order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        FLAG_NAMES
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
    }
}

impl BitOr for FaultFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FaultFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for FaultFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("OK");
        }

        let mut first = true;
        for name in self.names() {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FaultFlags {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "FaultFlags({=u8:b})", self.0)
    }
}
