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

//! String escaping, unescaping, and multi-line dedenting.
//!
//! ### Escape Sequences
//!
//! Sequence | UTF-8 | Name | Versions
//! ---------|-------|:-----|:--------
//! `\n`     | `0A`  | `LF` | v1, v2
//! `\r`     | `0D`  | `CR` | v1, v2
//! `\t`     | `09`  | `HT` | v1, v2
//! `\\`     | `5C`  | `\`  | v1, v2
//! `\/`     | `2F`  | `/`  | v1 only
//! `\"`     | `22`  | `"`  | v1, v2
//! `\b`     | `08`  | `BS` | v1, v2
//! `\f`     | `0C`  | `FF` | v1, v2
//! `\s`     | `20`  | ` `  | v2 only
//! `\u{…}`  | —     | —    | v1, v2 (1–6 hex digits)
//!
//! v2 additionally treats a backslash followed by whitespace and/or
//! newlines as an escape of the entire run.

use std::ops::BitOr;

use thiserror::Error;

use crate::chars;
use crate::utf8;
use crate::Version;

// ----------------------------------------------------------------------------

/// Which characters [`escape`] rewrites as escape sequences.
///
/// `\` and `"` are always escaped; the flags add further classes on top of
/// that minimum.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EscapeMode(u32);

impl EscapeMode {
    /// Escape only what must be escaped.
    pub const MINIMAL: Self = Self(0);

    /// Escape ASCII control characters.
    pub const CONTROL: Self = Self(0x10);

    /// Escape newline characters.
    pub const NEWLINE: Self = Self(0x20);

    /// Escape tabs.
    pub const TAB: Self = Self(0x40);

    /// Escape every code point at or above U+007F, in addition to the
    /// control, newline, and tab classes.
    pub const ASCII_MODE: Self = Self(0x170);

    /// Escape tabs, newlines, and other control characters, but leave
    /// other Unicode intact.
    pub const DEFAULT: Self = Self(0x70);

    /// Returns whether every flag of `other` is set in `self`.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for EscapeMode {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl Default for EscapeMode {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ----------------------------------------------------------------------------

/// Errors in unescape and dedent operations.
#[derive(Error, Clone, Copy, PartialEq, Eq, Debug)]
pub enum TextError {
    /// A backslash sequence is not one of the recognized escapes.
    #[error("unknown escape sequence")]
    UnknownEscape,

    /// The input ends in the middle of an escape sequence.
    #[error("incomplete escape sequence")]
    IncompleteEscape,

    /// A `\u{…}` escape names a surrogate, a value above U+10FFFF, or is
    /// malformed.
    #[error("invalid \\u escape")]
    BadCodepoint,

    /// The input contains a character that is illegal in v2 documents.
    #[error("illegal character in string")]
    IllegalChar,

    /// A multi-line string does not begin with a newline.
    #[error("multi-line string must begin with a newline")]
    MissingNewline,

    /// A line of a multi-line string does not begin with the string's
    /// whitespace prefix.
    #[error("multi-line string indentation mismatch")]
    IndentMismatch,
}

// ----------------------------------------------------------------------------

/// Escapes special characters in `s` per the given version's string rules.
pub fn escape(version: Version, s: &str, mode: EscapeMode) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);

    let control = mode.contains(EscapeMode::CONTROL);
    let newline = mode.contains(EscapeMode::NEWLINE);
    let tab     = mode.contains(EscapeMode::TAB);
    let ascii   = mode.contains(EscapeMode::ASCII_MODE);

    for c in s.chars() {
        let n = c as u32;
        match n {
            0x0A if newline => out.push_str("\\n"),
            0x0D if newline => out.push_str("\\r"),
            0x09 if tab     => out.push_str("\\t"),
            0x5C            => out.push_str("\\\\"),
            0x22            => out.push_str("\\\""),
            0x08 if control => out.push_str("\\b"),
            0x0C if newline => out.push_str("\\f"),
            _ => {
                let numeric =
                    (control && (n < 0x20 && !matches!(n, 0x0A | 0x0D | 0x09 | 0x0C)
                        || n == 0x7F))
                    || chars::is_illegal(version, n)
                    || (version == Version::V2 && control && n == 0x0B)
                    || (newline && matches!(n, 0x85 | 0x2028 | 0x2029))
                    || (ascii && n >= 0x7F);
                if numeric {
                    out.push_str(&format!("\\u{{{:x}}}", n));
                } else {
                    out.push(c);
                }
            }
        }
    }
    out
}

/// Resolves the backslash escapes of a single-line string in the given
/// version.
pub fn unescape(version: Version, s: &str) -> Result<String, TextError> {
    match version {
        Version::V1 => unescape_v1(s),
        Version::V2 => unescape_v2_single(s),
    }
}

/// Resolves v1 backslash escapes.
pub fn unescape_v1(s: &str) -> Result<String, TextError> {
    let bytes   = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i   = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 1;
            match bytes.get(i).ok_or(TextError::IncompleteEscape)? {
                b'n'  => { out.push('\n');   i += 1; }
                b'r'  => { out.push('\r');   i += 1; }
                b't'  => { out.push('\t');   i += 1; }
                b'\\' => { out.push('\\');   i += 1; }
                b'/'  => { out.push('/');    i += 1; }
                b'"'  => { out.push('"');    i += 1; }
                b'b'  => { out.push('\x08'); i += 1; }
                b'f'  => { out.push('\x0C'); i += 1; }
                b'u'  => { i = unescape_u(bytes, i + 1, &mut out)?; }
                _     => return Err(TextError::UnknownEscape),
            }
        } else {
            // copy everything until the next backslash
            let start = i;
            while i < bytes.len() && bytes[i] != b'\\' {
                i += 1;
            }
            out.push_str(&s[start..i]);
        }
    }
    Ok(out)
}

/// Resolves v2 backslash escapes in a string that has already been
/// dedented (or never was multi-line).
pub fn unescape_v2_single(s: &str) -> Result<String, TextError> {
    let mut out = String::with_capacity(s.len());
    let mut it  = s.chars().peekable();

    while let Some(c) = it.next() {
        let n = c as u32;
        if chars::is_illegal(Version::V2, n) {
            return Err(TextError::IllegalChar);
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        let e = it.next().ok_or(TextError::IncompleteEscape)?;
        match e {
            'n'  => out.push('\n'),
            'r'  => out.push('\r'),
            't'  => out.push('\t'),
            's'  => out.push(' '),
            '\\' => out.push('\\'),
            '"'  => out.push('"'),
            'b'  => out.push('\x08'),
            'f'  => out.push('\x0C'),
            'u'  => {
                if it.next() != Some('{') {
                    return Err(TextError::BadCodepoint);
                }
                let mut value  = 0u32;
                let mut digits = 0;
                loop {
                    let d = it.next().ok_or(TextError::IncompleteEscape)?;
                    match d.to_digit(16) {
                        Some(h) if digits < 6 => {
                            value = (value << 4) | h;
                            digits += 1;
                        }
                        _ if d == '}' && digits > 0 => break,
                        _ => return Err(TextError::BadCodepoint),
                    }
                }
                if !utf8::push_codepoint(value, &mut out) {
                    return Err(TextError::BadCodepoint);
                }
            }
            e if chars::is_whitespace(Version::V2, e as u32)
                || chars::is_newline(e as u32) =>
            {
                // whitespace escape: the backslash consumes the whole run
                while let Some(&p) = it.peek() {
                    let p = p as u32;
                    if chars::is_whitespace(Version::V2, p) || chars::is_newline(p) {
                        it.next();
                    } else {
                        break;
                    }
                }
            }
            _ => return Err(TextError::UnknownEscape),
        }
    }
    Ok(out)
}

/// Dedents a v2 multi-line string body, then resolves its escapes.
pub fn unescape_v2_multi(s: &str) -> Result<String, TextError> {
    unescape_v2_single(&dedent(s)?)
}

fn unescape_u(bytes: &[u8], mut i: usize, out: &mut String) -> Result<usize, TextError> {
    if bytes.get(i) != Some(&b'{') {
        return Err(TextError::BadCodepoint);
    }
    i += 1;
    let mut value  = 0u32;
    let mut digits = 0;
    loop {
        let b = *bytes.get(i).ok_or(TextError::IncompleteEscape)?;
        match (b as char).to_digit(16) {
            Some(h) if digits < 6 => {
                value = (value << 4) | h;
                digits += 1;
                i += 1;
            }
            _ if b == b'}' && digits > 0 => {
                i += 1;
                break;
            }
            _ => return Err(TextError::BadCodepoint),
        }
    }
    if utf8::push_codepoint(value, out) {
        Ok(i)
    } else {
        Err(TextError::BadCodepoint)
    }
}

// ----------------------------------------------------------------------------

/// Strips the common indentation from a multi-line string body.
///
/// The text is pure content between the `"""` delimiters.  The steps, in
/// order:
///
/// 1. Normalize newlines: CRLF becomes LF, every other newline form
///    becomes LF.
/// 2. The first character must be LF; the text between the final LF and
///    the end must be entirely whitespace — that run is the indent prefix.
/// 3. Every intermediate line must begin with the prefix, except lines
///    that are entirely empty; the prefix is stripped.
/// 4. The leading LF and the trailing LF-plus-prefix are dropped.
///
/// Dedenting is pure text manipulation; escapes and content validation
/// happen during unescape.
pub fn dedent(s: &str) -> Result<String, TextError> {
    // Normalize newlines
    let mut norm = String::with_capacity(s.len());
    let mut it   = s.chars().peekable();
    while let Some(c) = it.next() {
        if chars::is_newline(c as u32) {
            if c == '\r' && it.peek() == Some(&'\n') {
                it.next();
            }
            norm.push('\n');
        } else {
            norm.push(c);
        }
    }

    if !norm.starts_with('\n') {
        return Err(TextError::MissingNewline);
    }

    // The indent prefix is whatever follows the final newline
    let final_lf = norm.rfind('\n').unwrap_or(0);
    let indent   = &norm[final_lf + 1..];
    if !indent.chars().all(|c| chars::is_whitespace(Version::V2, c as u32)) {
        return Err(TextError::IndentMismatch);
    }

    let body = if final_lf == 0 { "" } else { &norm[1..final_lf] };

    let mut out   = String::with_capacity(body.len());
    let mut first = true;
    for line in body.split('\n') {
        if !first {
            out.push('\n');
        }
        first = false;
        if line.is_empty() {
            continue;
        }
        match line.strip_prefix(indent) {
            Some(rest) => out.push_str(rest),
            None       => return Err(TextError::IndentMismatch),
        }
    }
    Ok(out)
}

// ----------------------------------------------------------------------------
