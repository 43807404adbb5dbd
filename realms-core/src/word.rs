use core::fmt;
use core::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 256-bit unsigned storage word.
///
/// Limbs are little-endian: `limbs()[0]` holds bits 0..64. Grids never use
/// more than `word_bits` of a word, see [`Word::fits_in`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Word([u64; 4]);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordParseError {
    Empty,
    InvalidDigit { found: char },
    Overflow,
}

impl fmt::Display for WordParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty word literal"),
            Self::InvalidDigit { found } => write!(f, "invalid digit in word literal: {found:?}"),
            Self::Overflow => write!(f, "word literal does not fit 256 bits"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for WordParseError {}

impl Word {
    pub const ZERO: Self = Self([0; 4]);
    pub const ONE: Self = Self([1, 0, 0, 0]);

    pub const fn from_limbs(limbs: [u64; 4]) -> Self {
        Self(limbs)
    }

    pub const fn limbs(&self) -> [u64; 4] {
        self.0
    }

    pub const fn from_u64(value: u64) -> Self {
        Self([value, 0, 0, 0])
    }

    pub const fn from_u128(value: u128) -> Self {
        Self([value as u64, (value >> 64) as u64, 0, 0])
    }

    /// Joins a `{low, high}` pair of 128-bit halves.
    pub const fn from_halves(low: u128, high: u128) -> Self {
        Self([
            low as u64,
            (low >> 64) as u64,
            high as u64,
            (high >> 64) as u64,
        ])
    }

    pub const fn low_u128(&self) -> u128 {
        (self.0[0] as u128) | ((self.0[1] as u128) << 64)
    }

    pub const fn high_u128(&self) -> u128 {
        (self.0[2] as u128) | ((self.0[3] as u128) << 64)
    }

    pub fn to_u64(&self) -> Option<u64> {
        if self.0[1] == 0 && self.0[2] == 0 && self.0[3] == 0 {
            Some(self.0[0])
        } else {
            None
        }
    }

    pub fn to_u128(&self) -> Option<u128> {
        if self.0[2] == 0 && self.0[3] == 0 {
            Some(self.low_u128())
        } else {
            None
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 4]
    }

    /// Reads bit `offset`. Offsets must be below 256.
    #[inline]
    pub fn bit(&self, offset: u32) -> bool {
        debug_assert!(offset < 256);
        (self.0[(offset / 64) as usize] >> (offset % 64)) & 1 == 1
    }

    #[inline]
    pub fn with_bit(mut self, offset: u32) -> Self {
        debug_assert!(offset < 256);
        self.0[(offset / 64) as usize] |= 1u64 << (offset % 64);
        self
    }

    #[inline]
    pub fn without_bit(mut self, offset: u32) -> Self {
        debug_assert!(offset < 256);
        self.0[(offset / 64) as usize] &= !(1u64 << (offset % 64));
        self
    }

    /// Number of bits needed to represent the value (0 for zero).
    pub fn significant_bits(&self) -> u32 {
        for index in (0..4).rev() {
            let limb = self.0[index];
            if limb != 0 {
                return index as u32 * 64 + (64 - limb.leading_zeros());
            }
        }
        0
    }

    /// True when the value is below `2^word_bits`.
    pub fn fits_in(&self, word_bits: u32) -> bool {
        self.significant_bits() <= word_bits
    }

    pub fn count_ones(&self) -> u32 {
        self.0.iter().map(|limb| limb.count_ones()).sum()
    }

    fn mul_small_add(&mut self, mul: u64, add: u64) -> Result<(), WordParseError> {
        let mut carry = add as u128;
        for limb in self.0.iter_mut() {
            let wide = (*limb as u128) * (mul as u128) + carry;
            *limb = wide as u64;
            carry = wide >> 64;
        }
        if carry == 0 {
            Ok(())
        } else {
            Err(WordParseError::Overflow)
        }
    }

    fn div_small(&mut self, div: u64) -> u64 {
        let mut rem = 0u128;
        for limb in self.0.iter_mut().rev() {
            let cur = (rem << 64) | (*limb as u128);
            *limb = (cur / div as u128) as u64;
            rem = cur % div as u128;
        }
        rem as u64
    }
}

impl From<u64> for Word {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<u128> for Word {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

/// Parses decimal or `0x`-prefixed hexadecimal literals.
impl FromStr for Word {
    type Err = WordParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let (digits, radix) = match value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
        {
            Some(hex) => (hex, 16u32),
            None => (value, 10u32),
        };
        if digits.is_empty() {
            return Err(WordParseError::Empty);
        }

        let mut word = Self::ZERO;
        for ch in digits.chars() {
            if ch == '_' {
                continue;
            }
            let digit = ch
                .to_digit(radix)
                .ok_or(WordParseError::InvalidDigit { found: ch })?;
            word.mul_small_add(radix as u64, digit as u64)?;
        }
        Ok(word)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 2^256 has 78 decimal digits.
        let mut buf = [0u8; 78];
        let mut pos = buf.len();
        let mut rest = *self;
        loop {
            let digit = rest.div_small(10);
            pos -= 1;
            buf[pos] = b'0' + digit as u8;
            if rest.is_zero() {
                break;
            }
        }
        let digits = core::str::from_utf8(&buf[pos..]).map_err(|_| fmt::Error)?;
        f.pad_integral(true, "", digits)
    }
}

impl fmt::LowerHex for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let top = self.0.iter().rposition(|limb| *limb != 0).unwrap_or(0);
        if f.alternate() {
            f.write_str("0x")?;
        }
        write!(f, "{:x}", self.0[top])?;
        for limb in self.0[..top].iter().rev() {
            write!(f, "{limb:016x}")?;
        }
        Ok(())
    }
}

impl Serialize for Word {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct WordVisitor;

impl<'de> Visitor<'de> for WordVisitor {
    type Value = Word;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal or 0x-prefixed word literal, or an unsigned integer")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Word, E> {
        Ok(Word::from_u64(value))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> Result<Word, E> {
        Ok(Word::from_u128(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Word, E> {
        value.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Word {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(WordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::ToString;

    #[test]
    fn parses_decimal_and_hex() {
        assert_eq!("101".parse::<Word>(), Ok(Word::from_u64(101)));
        assert_eq!("0xff".parse::<Word>(), Ok(Word::from_u64(255)));
        assert_eq!(
            "340282366920938463463374607431768211456".parse::<Word>(),
            Ok(Word::from_halves(0, 1))
        );
        assert_eq!("".parse::<Word>(), Err(WordParseError::Empty));
        assert_eq!(
            "12a".parse::<Word>(),
            Err(WordParseError::InvalidDigit { found: 'a' })
        );
    }

    #[test]
    fn rejects_values_wider_than_256_bits() {
        let too_wide = format!("0x1{}", "0".repeat(64));
        assert_eq!(too_wide.parse::<Word>(), Err(WordParseError::Overflow));
        let max = format!("0x{}", "f".repeat(64));
        assert_eq!(max.parse::<Word>().map(|w| w.significant_bits()), Ok(256));
    }

    #[test]
    fn display_is_decimal_and_lower_hex_is_hex() {
        let word = Word::from_halves(0, 1);
        assert_eq!(word.to_string(), "340282366920938463463374607431768211456");
        assert_eq!(format!("{word:#x}"), "0x100000000000000000000000000000000");
        assert_eq!(Word::ZERO.to_string(), "0");
        assert_eq!(format!("{:x}", Word::ZERO), "0");
    }

    #[test]
    fn bit_operations_touch_one_bit() {
        let word = Word::ZERO.with_bit(0).with_bit(130).with_bit(250);
        assert!(word.bit(0));
        assert!(word.bit(130));
        assert!(word.bit(250));
        assert!(!word.bit(129));
        assert_eq!(word.count_ones(), 3);
        assert_eq!(word.significant_bits(), 251);
        assert!(word.fits_in(251));
        assert!(!word.fits_in(250));

        let cleared = word.without_bit(130);
        assert!(!cleared.bit(130));
        assert_eq!(cleared.count_ones(), 2);
    }

    #[test]
    fn narrows_only_when_value_fits() {
        assert_eq!(Word::from_u64(7).to_u64(), Some(7));
        assert_eq!(Word::from_u128(u128::MAX).to_u64(), None);
        assert_eq!(Word::from_u128(u128::MAX).to_u128(), Some(u128::MAX));
        assert_eq!(Word::from_halves(1, 1).to_u128(), None);
    }

    #[test]
    fn serde_uses_decimal_strings() {
        let word = Word::from_u64(625);
        let json = serde_json::to_string(&word).unwrap();
        assert_eq!(json, "\"625\"");
        let back: Word = serde_json::from_str(&json).unwrap();
        assert_eq!(back, word);
        let from_number: Word = serde_json::from_str("42").unwrap();
        assert_eq!(from_number, Word::from_u64(42));
    }
}
