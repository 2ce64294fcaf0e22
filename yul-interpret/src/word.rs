#![forbid(unsafe_code)]

use std::fmt;

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};

pub const WORD_BYTES: usize = 32;
const WORD_BITS: u64 = 256;

/// A 256-bit EVM word. Arithmetic wraps modulo 2^256.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Word(BigUint);

fn modulus() -> BigUint {
    BigUint::one() << WORD_BITS
}

fn all_ones() -> BigUint {
    modulus() - 1u32
}

impl Word {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn one() -> Self {
        Self(BigUint::one())
    }

    pub fn max() -> Self {
        Self(all_ones())
    }

    fn wrap(value: BigUint) -> Self {
        if value.bits() > WORD_BITS {
            Self(value & all_ones())
        } else {
            Self(value)
        }
    }

    pub fn from_bool(b: bool) -> Self {
        if b { Self::one() } else { Self::zero() }
    }

    /// Decimal or `0x` hexadecimal text; `None` if malformed or wider than 256 bits.
    pub fn parse_number(text: &str) -> Option<Self> {
        let value = match text.strip_prefix("0x") {
            Some(hex) => BigUint::parse_bytes(hex.as_bytes(), 16)?,
            None => BigUint::parse_bytes(text.as_bytes(), 10)?,
        };
        (value.bits() <= WORD_BITS).then_some(Self(value))
    }

    /// Left-aligned bytes of a string literal.
    ///
    /// Characters below U+0100 stand for a single byte (`\xNN` escapes); anything
    /// else contributes its UTF-8 encoding. Bytes past the word are dropped.
    pub fn from_string_literal(text: &str) -> Self {
        let mut bytes = [0u8; WORD_BYTES];
        let mut encoded = Vec::with_capacity(WORD_BYTES);
        for c in text.chars() {
            match u8::try_from(u32::from(c)) {
                Ok(b) => encoded.push(b),
                Err(_) => {
                    let mut buf = [0u8; 4];
                    encoded.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
            }
        }
        for (dst, src) in bytes.iter_mut().zip(&encoded) {
            *dst = *src;
        }
        Self::from_be_bytes(&bytes)
    }

    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        Self::wrap(BigUint::from_bytes_be(bytes))
    }

    pub fn to_be_bytes(&self) -> [u8; WORD_BYTES] {
        let raw = self.0.to_bytes_be();
        let mut out = [0u8; WORD_BYTES];
        if !self.0.is_zero() {
            out[WORD_BYTES - raw.len()..].copy_from_slice(&raw);
        }
        out
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }

    /// Sixty-four hex digits, zero padded.
    pub fn to_padded_hex(&self) -> String {
        hex::encode(self.to_be_bytes())
    }

    fn is_negative(&self) -> bool {
        self.0.bit(WORD_BITS - 1)
    }

    fn negate(&self) -> Self {
        if self.is_zero() {
            Self::zero()
        } else {
            Self(modulus() - &self.0)
        }
    }

    fn magnitude(&self) -> Self {
        if self.is_negative() { self.negate() } else { self.clone() }
    }

    pub fn add(&self, other: &Self) -> Self {
        Self::wrap(&self.0 + &other.0)
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self::wrap(&self.0 + modulus() - &other.0)
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self::wrap(&self.0 * &other.0)
    }

    pub fn div(&self, other: &Self) -> Self {
        if other.is_zero() {
            return Self::zero();
        }
        Self(&self.0 / &other.0)
    }

    pub fn sdiv(&self, other: &Self) -> Self {
        if other.is_zero() {
            return Self::zero();
        }
        let quotient = self.magnitude().div(&other.magnitude());
        if self.is_negative() != other.is_negative() {
            quotient.negate()
        } else {
            quotient
        }
    }

    pub fn rem(&self, other: &Self) -> Self {
        if other.is_zero() {
            return Self::zero();
        }
        Self(&self.0 % &other.0)
    }

    /// Signed remainder; the result takes the sign of the dividend.
    pub fn srem(&self, other: &Self) -> Self {
        if other.is_zero() {
            return Self::zero();
        }
        let remainder = self.magnitude().rem(&other.magnitude());
        if self.is_negative() {
            remainder.negate()
        } else {
            remainder
        }
    }

    pub fn exp(&self, exponent: &Self) -> Self {
        Self(self.0.modpow(&exponent.0, &modulus()))
    }

    pub fn addmod(&self, other: &Self, m: &Self) -> Self {
        if m.is_zero() {
            return Self::zero();
        }
        Self((&self.0 + &other.0) % &m.0)
    }

    pub fn mulmod(&self, other: &Self, m: &Self) -> Self {
        if m.is_zero() {
            return Self::zero();
        }
        Self((&self.0 * &other.0) % &m.0)
    }

    /// Sign-extends `value` from byte `self` (counted from the least significant end).
    pub fn signextend(&self, value: &Self) -> Self {
        let Some(byte) = self.to_u64().filter(|b| *b < 31) else {
            return value.clone();
        };
        let sign_bit = byte * 8 + 7;
        let low_mask = (BigUint::one() << (sign_bit + 1)) - 1u32;
        if value.0.bit(sign_bit) {
            Self(&value.0 | (all_ones() ^ low_mask))
        } else {
            Self(&value.0 & low_mask)
        }
    }

    pub fn not(&self) -> Self {
        Self(all_ones() ^ &self.0)
    }

    pub fn lt(&self, other: &Self) -> Self {
        Self::from_bool(self.0 < other.0)
    }

    pub fn gt(&self, other: &Self) -> Self {
        Self::from_bool(self.0 > other.0)
    }

    pub fn slt(&self, other: &Self) -> Self {
        let less = match (self.is_negative(), other.is_negative()) {
            (true, false) => true,
            (false, true) => false,
            _ => self.0 < other.0,
        };
        Self::from_bool(less)
    }

    pub fn sgt(&self, other: &Self) -> Self {
        other.slt(self)
    }

    pub fn eq_word(&self, other: &Self) -> Self {
        Self::from_bool(self == other)
    }

    pub fn iszero(&self) -> Self {
        Self::from_bool(self.is_zero())
    }

    pub fn and(&self, other: &Self) -> Self {
        Self(&self.0 & &other.0)
    }

    pub fn or(&self, other: &Self) -> Self {
        Self(&self.0 | &other.0)
    }

    pub fn xor(&self, other: &Self) -> Self {
        Self(&self.0 ^ &other.0)
    }

    /// Byte `self` of `value`, counting from the most significant end.
    pub fn byte(&self, value: &Self) -> Self {
        match self.to_u64() {
            Some(i) if i < WORD_BYTES as u64 => {
                Self::from(u64::from(value.to_be_bytes()[i as usize]))
            }
            _ => Self::zero(),
        }
    }

    /// `value << self`
    pub fn shl(&self, value: &Self) -> Self {
        match self.to_u64() {
            Some(shift) if shift < WORD_BITS => Self::wrap(&value.0 << shift),
            _ => Self::zero(),
        }
    }

    /// `value >> self`, logical
    pub fn shr(&self, value: &Self) -> Self {
        match self.to_u64() {
            Some(shift) if shift < WORD_BITS => Self(&value.0 >> shift),
            _ => Self::zero(),
        }
    }

    /// `value >> self`, arithmetic
    pub fn sar(&self, value: &Self) -> Self {
        if !value.is_negative() {
            return self.shr(value);
        }
        match self.to_u64() {
            Some(shift) if shift < WORD_BITS => {
                let shifted = &value.0 >> shift;
                let fill = all_ones() ^ (all_ones() >> shift);
                Self(shifted | fill)
            }
            _ => Self::max(),
        }
    }
}

impl From<u64> for Word {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
