// This file is part of rkdl, a KDL reader and writer.
// Copyright 2022 Jeffrey Sharp
//
// SPDX-License-Identifier: GPL-3.0-or-later
//
// rkdl is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published
// by the Free Software Foundation, either version 3 of the License,
// or (at your option) any later version.
//
// rkdl is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See
// the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with rkdl.  If not, see <http://www.gnu.org/licenses/>.

//! Minimal non-negative arbitrary-precision integer.
//!
//! Integer literals accumulate into a [`UBig`] so that values beyond the
//! signed 64-bit range survive parsing and can be re-rendered as canonical
//! decimal text.  The operations here are exactly the ones that job needs;
//! this is not a general big-integer library.

const DIGIT_BITS: u64 = 32;

/// A non-negative integer as a little-endian vector of 32-bit digits.
///
/// At least one digit is always present; leading zero digits are trimmed
/// by [`Self::div_rem`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct UBig {
    digits: Vec<u32>,
}

impl UBig {
    /// Creates a [`UBig`] with the given initial value.
    pub fn new(initial: u32) -> Self {
        Self { digits: vec![initial] }
    }

    /// Returns whether the value is zero.
    pub fn is_zero(&self) -> bool {
        self.digits.iter().all(|&d| d == 0)
    }

    /// Adds a small unsigned value in place.
    pub fn add(&mut self, b: u32) {
        let mut carry = b as u64;
        for digit in self.digits.iter_mut() {
            let tmp = *digit as u64 + carry;
            *digit = tmp as u32;
            carry  = tmp >> DIGIT_BITS;
        }
        if carry != 0 {
            self.digits.push(carry as u32);
        }
    }

    /// Multiplies by a small unsigned value in place.
    pub fn mul(&mut self, b: u32) {
        let mut carry = 0u64;
        for digit in self.digits.iter_mut() {
            let tmp = *digit as u64 * b as u64 + carry;
            *digit = tmp as u32;
            carry  = tmp >> DIGIT_BITS;
        }
        if carry != 0 {
            self.digits.push(carry as u32);
        }
    }

    /// Divides by a small unsigned value in place and returns the
    /// remainder.  Trims leading zero digits, keeping at least one.
    pub fn div_rem(&mut self, b: u32) -> u32 {
        let mut rem = 0u64;
        for digit in self.digits.iter_mut().rev() {
            let tmp = *digit as u64 + (rem << DIGIT_BITS);
            *digit = (tmp / b as u64) as u32;
            rem    = tmp % b as u64;
        }
        while self.digits.len() > 1 && self.digits.last() == Some(&0) {
            self.digits.pop();
        }
        rem as u32
    }

    /// Converts to a signed 64-bit integer if the magnitude fits with a
    /// zero top bit.
    pub fn try_to_i64(&self) -> Option<i64> {
        if self.digits.len() > 2 {
            return None;
        }
        let mut value = 0u64;
        for &digit in self.digits.iter().rev() {
            value = (value << DIGIT_BITS) | digit as u64;
        }
        if value >> 63 != 0 {
            None
        } else {
            Some(value as i64)
        }
    }

    /// Formats the value as a decimal string, with a leading `-` if
    /// `negative` is set.
    pub fn to_decimal(&self, negative: bool) -> String {
        let mut scratch = self.clone();
        let mut digits  = Vec::new();

        while !scratch.is_zero() {
            let digit = scratch.div_rem(10);
            digits.push(b'0' + digit as u8);
        }
        if digits.is_empty() {
            digits.push(b'0');
        }

        let mut out = String::with_capacity(digits.len() + 1);
        if negative {
            out.push('-');
        }
        while let Some(d) = digits.pop() {
            out.push(d as char);
        }
        out
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Accumulates a decimal literal the way the number parser does.
    fn from_decimal(s: &str) -> UBig {
        let mut n = UBig::new(0);
        for b in s.bytes() {
            n.mul(10);
            n.add((b - b'0') as u32);
        }
        n
    }

    #[test]
    fn zero() {
        let n = UBig::new(0);

        assert!(     n.is_zero() );
        assert_eq!(  n.try_to_i64(),       Some(0) );
        assert_eq!(  n.to_decimal(false),  "0"     );
    }

    #[test]
    fn add_with_carry() {
        let mut n = UBig::new(0xFFFF_FFFF);
        n.add(1);

        assert_eq!( n.try_to_i64(),      Some(0x1_0000_0000) );
        assert_eq!( n.to_decimal(false), "4294967296"        );
    }

    #[test]
    fn mul_with_carry() {
        let mut n = UBig::new(0x8000_0000);
        n.mul(4);

        assert_eq!( n.try_to_i64(), Some(0x2_0000_0000) );
    }

    #[test]
    fn div_rem() {
        let mut n = from_decimal("1000000000000000000007");

        assert_eq!( n.div_rem(10),       7 );
        assert_eq!( n.to_decimal(false), "100000000000000000000" );
    }

    #[test]
    fn div_trims_leading_zeros() {
        let mut n = UBig::new(0xFFFF_FFFF);
        n.mul(0x1000);
        n.div_rem(0x1000_0000);

        assert_eq!( n.try_to_i64(), Some(0xFFFF) );
    }

    #[test]
    fn i64_boundaries() {
        // i64::MAX fits
        assert_eq!(
            from_decimal("9223372036854775807").try_to_i64(),
            Some(i64::MAX)
        );
        // 2^63 has the top bit set and does not
        assert_eq!( from_decimal("9223372036854775808").try_to_i64(), None );
        // three digits never fit
        assert_eq!( from_decimal("18446744073709551616").try_to_i64(), None );
    }

    #[test]
    fn decimal_round_trip() {
        let text = "340282366920938463463374607431768211455"; // 2^128 - 1

        assert_eq!( from_decimal(text).to_decimal(false), text );
    }

    #[test]
    fn decimal_negative() {
        assert_eq!( from_decimal("42").to_decimal(true), "-42" );
    }
}
