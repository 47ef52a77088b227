use std::fmt::{Display, Formatter, Result as FmtResult};

use log::warn;
use serde::Serialize;

use swap_api::constants::{DEFAULT_SWAP_SIZE_GIB, KIB_PER_GIB};

/// Requested swap size in whole GiB. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SwapSize(u64);

impl SwapSize {
    /// Interprets the size argument of the command line.
    ///
    /// Only plain decimals (`[+]digits[.digits]`) are accepted and their
    /// fraction is truncated. Anything else, or a value below 1 GiB, yields
    /// the 1 GiB default.
    pub fn from_arg(arg: Option<&str>) -> Self {
        let Some(arg) = arg else {
            return Self::default();
        };

        match whole_part(arg.trim()) {
            Some(gib) if gib >= 1 => Self(gib),
            _ => {
                warn!(
                    "Invalid swap size '{arg}', using {DEFAULT_SWAP_SIZE_GIB} GiB instead"
                );
                Self::default()
            }
        }
    }

    pub fn gib(&self) -> u64 {
        self.0
    }

    /// Number of 1 KiB blocks making up this size.
    pub fn kib_blocks(&self) -> u64 {
        self.0.saturating_mul(KIB_PER_GIB)
    }
}

/// Integer part of a plain decimal number. Values beyond `u64::MAX`
/// saturate, the free space check rejects them later.
fn whole_part(arg: &str) -> Option<u64> {
    let unsigned = arg.strip_prefix('+').unwrap_or(arg);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !is_digits(whole) || !is_digits(fraction) {
        return None;
    }

    Some(whole.parse().unwrap_or(u64::MAX))
}

impl Default for SwapSize {
    fn default() -> Self {
        Self(DEFAULT_SWAP_SIZE_GIB)
    }
}

impl From<u64> for SwapSize {
    fn from(gib: u64) -> Self {
        Self(gib.max(DEFAULT_SWAP_SIZE_GIB))
    }
}

impl Display for SwapSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} GiB", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_arg() {
        assert_eq!(SwapSize::from_arg(Some("2")).gib(), 2);
        assert_eq!(SwapSize::from_arg(Some(" 16 ")).gib(), 16);
        assert_eq!(SwapSize::from_arg(Some("2.9")).gib(), 2);
        assert_eq!(SwapSize::from_arg(Some("1.0")).gib(), 1);
        assert_eq!(SwapSize::from_arg(Some("+3")).gib(), 3);
        assert_eq!(SwapSize::from_arg(Some("2.")).gib(), 2);
        assert_eq!(
            SwapSize::from_arg(Some("99999999999999999999999")).gib(),
            u64::MAX
        );
    }

    #[test]
    fn test_from_arg_default() {
        for arg in [
            None,
            Some(""),
            Some("abc"),
            Some("2G"),
            Some("0"),
            Some("0.5"),
            Some("-3"),
            Some("-0.5"),
            Some("NaN"),
            Some("inf"),
            Some("-inf"),
            Some("1e3"),
            Some("2e0"),
            Some("0x10"),
            Some(".5"),
            Some("1.2.3"),
            Some("+-2"),
        ] {
            assert_eq!(SwapSize::from_arg(arg), SwapSize::default(), "arg {arg:?}");
        }
        assert_eq!(SwapSize::default().gib(), 1);
    }

    #[test]
    fn test_kib_blocks() {
        assert_eq!(SwapSize::from(1).kib_blocks(), 1_048_576);
        assert_eq!(SwapSize::from(2).kib_blocks(), 2_097_152);
        assert_eq!(SwapSize::from(u64::MAX).kib_blocks(), u64::MAX);
    }

    #[test]
    fn test_from_u64() {
        assert_eq!(SwapSize::from(0).gib(), 1);
        assert_eq!(SwapSize::from(4).gib(), 4);
    }

    #[test]
    fn test_display() {
        assert_eq!(SwapSize::from(3).to_string(), "3 GiB");
    }
}
