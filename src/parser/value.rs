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

//! Token-to-value parsing: strings, keywords, identifiers, and numbers.

use crate::chars;
use crate::num::big::UBig;
use crate::num::Base;
use crate::text;
use crate::token::TokenKind;
use crate::Version;

use super::{Parser, Scratch};

impl<'a> Parser<'a> {
    /// Parses the current token into the value scratch.  String content
    /// lands in `val_str`.  Version-specific syntax commits the detected
    /// version; a clash with an earlier commitment is an error.
    pub(super) fn parse_token_value(&mut self, kind: TokenKind) -> Result<(), &'static str> {
        match kind {
            TokenKind::String => {
                let unescaped = match self.detected {
                    Some(Version::V1) => text::unescape_v1(&self.tok_text)
                        .map_err(|_| "error in string escapes")?,
                    Some(Version::V2) => text::unescape_v2_single(&self.tok_text)
                        .map_err(|_| "error in string escapes")?,
                    None => {
                        // escapes may settle the version
                        let v1 = text::unescape_v1(&self.tok_text);
                        let v2 = text::unescape_v2_single(&self.tok_text);
                        match (v1, v2) {
                            (Ok(s), Ok(_)) => s,
                            (Ok(s), Err(_)) => {
                                self.commit(Version::V1);
                                s
                            }
                            (Err(_), Ok(s)) => {
                                self.commit(Version::V2);
                                s
                            }
                            (Err(_), Err(_)) => return Err("error in string escapes"),
                        }
                    }
                };
                self.val_str = unescaped;
                self.value   = Scratch::Str;
                Ok(())
            }
            TokenKind::MultiLineString => {
                self.require(Version::V2, "multi-line strings are not allowed in KDL v1")?;
                self.val_str = text::unescape_v2_multi(&self.tok_text)
                    .map_err(|_| "malformed multi-line string")?;
                self.value = Scratch::Str;
                Ok(())
            }
            TokenKind::RawStringV1 => {
                self.require(Version::V1, "'r' raw strings are not allowed in KDL v2")?;
                self.val_str = std::mem::take(&mut self.tok_text);
                self.value   = Scratch::Str;
                Ok(())
            }
            TokenKind::RawStringV2 => {
                self.require(Version::V2, "'#' raw strings are not allowed in KDL v1")?;
                self.val_str = std::mem::take(&mut self.tok_text);
                self.value   = Scratch::Str;
                Ok(())
            }
            TokenKind::RawMultiLineString => {
                self.require(Version::V2, "'#' raw strings are not allowed in KDL v1")?;
                self.val_str = text::dedent(&self.tok_text)
                    .map_err(|_| "malformed multi-line string")?;
                self.value = Scratch::Str;
                Ok(())
            }
            TokenKind::Word => self.parse_word_value(),
            _ => Err("expected identifier or string"),
        }
    }

    /// Parses a word token: a keyword, a number, or an identifier.
    fn parse_word_value(&mut self) -> Result<(), &'static str> {
        let text = std::mem::take(&mut self.tok_text);
        let result = self.parse_word_value_(&text);
        self.tok_text = text;
        result
    }

    fn parse_word_value_(&mut self, text: &str) -> Result<(), &'static str> {
        // v2 keywords
        if let Some(value) = match text {
            "#null"  => Some(Scratch::Null),
            "#true"  => Some(Scratch::Bool(true)),
            "#false" => Some(Scratch::Bool(false)),
            "#inf"   => Some(Scratch::Float(f64::INFINITY)),
            "#-inf"  => Some(Scratch::Float(f64::NEG_INFINITY)),
            "#nan"   => Some(Scratch::Float(f64::NAN)),
            _        => None,
        } {
            self.require(Version::V2, "'#' keywords are not allowed in KDL v1")?;
            self.value = value;
            return Ok(());
        }

        // v1 keywords
        if let Some(value) = match text {
            "null"  => Some(Scratch::Null),
            "true"  => Some(Scratch::Bool(true)),
            "false" => Some(Scratch::Bool(false)),
            _       => None,
        } {
            self.require(Version::V1, "bare keywords are not allowed in KDL v2")?;
            self.value = value;
            return Ok(());
        }

        // A word whose first character after the sign is a digit is a
        // number
        let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
        if unsigned.as_bytes().first().is_some_and(|b| b.is_ascii_digit()) {
            return self.parse_number(text);
        }

        // … and one that merely begins with a radix point is almost one
        if unsigned.as_bytes().first() == Some(&b'.')
            && unsigned.as_bytes().get(1).is_some_and(|b| b.is_ascii_digit())
            && self.detected != Some(Version::V1)
        {
            return Err("word is almost a number");
        }

        self.parse_identifier(text)
    }

    /// Validates `text` as a bare identifier and stores it as a string
    /// value.
    fn parse_identifier(&mut self, text: &str) -> Result<(), &'static str> {
        // '#' appears in no valid v2 identifier, only in keywords and raw
        // strings, so its presence settles the version
        if text.contains('#') {
            self.require(Version::V1, "unknown keyword")?;
        }

        let version = self.detected.unwrap_or(Version::V2);

        if version == Version::V2 && matches!(text, "inf" | "-inf" | "nan") {
            return Err("reserved identifier");
        }

        let mut first = true;
        for c in text.chars() {
            let ok = if first {
                chars::is_identifier_start(version, c as u32)
            } else {
                chars::is_identifier(version, c as u32)
            };
            if !ok {
                return Err("invalid identifier");
            }
            first = false;
        }
        if first {
            return Err("invalid identifier");
        }

        self.val_str.clear();
        self.val_str.push_str(text);
        self.value = Scratch::Str;
        Ok(())
    }

    // ------------------------------------------------------------------------

    /// Parses a numeric word.  The sign, if any, is part of `text`.
    fn parse_number(&mut self, text: &str) -> Result<(), &'static str> {
        let negative = text.starts_with('-');
        let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);

        if unsigned.len() > 2 {
            match &unsigned.as_bytes()[..2] {
                b"0x" => return self.parse_radix_integer(Base::Hex, negative, &unsigned[2..]),
                b"0o" => return self.parse_radix_integer(Base::Oct, negative, &unsigned[2..]),
                b"0b" => return self.parse_radix_integer(Base::Bin, negative, &unsigned[2..]),
                _     => (),
            }
        }

        if unsigned.contains(['.', 'e', 'E']) {
            self.parse_decimal_float(text, negative, unsigned)
        } else {
            self.parse_radix_integer(Base::Dec, negative, unsigned)
        }
    }

    /// Parses the digits of an integer in the given base, accumulating
    /// into a big integer so that any magnitude survives.
    fn parse_radix_integer(
        &mut self,
        base:     Base,
        negative: bool,
        digits:   &str,
    ) -> Result<(), &'static str> {
        if digits.starts_with('_') {
            return Err("malformed number");
        }

        let mut magnitude = UBig::new(0);
        let mut count     = 0usize;

        for c in digits.chars() {
            if c == '_' {
                continue;
            }
            match base.digit(c as u32) {
                Some(d) => {
                    magnitude.mul(base.radix());
                    magnitude.add(d);
                    count += 1;
                }
                None => return Err("malformed number"),
            }
        }
        if count == 0 {
            return Err("malformed number");
        }

        self.value = match magnitude.try_to_i64() {
            Some(n) => Scratch::Int(if negative { -n } else { n }),
            None => {
                // too big for an integer: keep the canonical decimal text
                self.val_str = magnitude.to_decimal(negative);
                Scratch::Num
            }
        };
        Ok(())
    }

    /// Parses a decimal float.  Values that a double represents exactly
    /// enough are computed; anything else keeps its literal text,
    /// canonicalized.
    fn parse_decimal_float(
        &mut self,
        text:     &str,
        negative: bool,
        unsigned: &str,
    ) -> Result<(), &'static str> {
        #[derive(PartialEq)]
        enum State { BeforePoint, AfterPoint, Exponent }

        let bytes = unsigned.as_bytes();
        if bytes.first() == Some(&b'_') {
            return Err("malformed number");
        }

        let mut state         = State::BeforePoint;
        let mut mantissa      = 0u64;
        let mut digits_before = 0i32;
        let mut digits_after  = 0i32;
        let mut exponent      = 0i64;
        let mut exp_negative  = false;

        let mut i = 0;
        while i < bytes.len() {
            let c = bytes[i];
            if c == b'.' && state == State::BeforePoint {
                state = State::AfterPoint;
                if bytes.get(i + 1) == Some(&b'_') {
                    return Err("malformed number");
                }
            } else if (c == b'e' || c == b'E') && state != State::Exponent {
                state = State::Exponent;
                if let Some(&sign) = bytes.get(i + 1) {
                    if sign == b'-' || sign == b'+' {
                        exp_negative = sign == b'-';
                        i += 1;
                    }
                    if bytes.get(i + 1) == Some(&b'_') {
                        return Err("malformed number");
                    }
                }
            } else if c.is_ascii_digit() {
                let digit = (c - b'0') as u64;
                if state == State::Exponent {
                    exponent = exponent.saturating_mul(10).saturating_add(digit as i64);
                } else {
                    mantissa = mantissa.wrapping_mul(10).wrapping_add(digit);
                    if state == State::BeforePoint {
                        digits_before += 1;
                    } else {
                        digits_after += 1;
                    }
                }
            } else if c == b'_' {
                // separators are allowed
            } else {
                return Err("malformed number");
            }
            i += 1;
        }

        if exp_negative {
            exponent = -exponent;
        }

        // rough heuristic for values that fit into a double exactly
        if digits_before + digits_after <= 15 && exponent.abs() < 285 {
            let mut n = mantissa as f64;
            if negative {
                n = -n;
            }
            let mut scale = exponent - digits_after as i64;
            while scale < 0 {
                scale += 1;
                n *= 0.1;
            }
            while scale > 0 {
                scale -= 1;
                n *= 10.0;
            }
            self.value = Scratch::Float(n);
        } else {
            // canonicalize the literal: no separators, no leading plus
            let canonical: String = text
                .strip_prefix('+')
                .unwrap_or(text)
                .chars()
                .filter(|&c| c != '_')
                .collect();
            self.val_str = canonical;
            self.value   = Scratch::Num;
        }
        Ok(())
    }
}
