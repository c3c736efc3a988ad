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

//! Character classifier.
//!
//! Predicates over Unicode scalar values, parameterized by the active
//! [`Version`].  The two KDL versions disagree on which code points count
//! as whitespace, which are banned outright, and which may appear in
//! words and identifiers.

use crate::Version;

// ----------------------------------------------------------------------------

/// Returns whether `c` is horizontal whitespace.
///
/// The set is the Unicode space separators plus TAB.  v1 additionally
/// treats U+FEFF (BOM) as whitespace; v2 instead admits U+000B (vertical
/// tab).
pub fn is_whitespace(version: Version, c: u32) -> bool {
    match c {
        0x0009          // Character Tabulation
        | 0x0020        // Space
        | 0x00A0        // No-Break Space
        | 0x1680        // Ogham Space Mark
        | 0x2000..=0x200A
        | 0x202F        // Narrow No-Break Space
        | 0x205F        // Medium Mathematical Space
        | 0x3000        // Ideographic Space
            => true,
        0xFEFF => version == Version::V1,
        0x000B => version == Version::V2,
        _      => false,
    }
}

/// Returns whether `c` is a newline character.
///
/// CRLF is a single newline at the tokenizer layer; that pairing is the
/// tokenizer's business, not this predicate's.
pub fn is_newline(c: u32) -> bool {
    matches!(
        c,
        0x000D      // CR  Carriage Return
        | 0x000A    // LF  Line Feed
        | 0x0085    // NEL Next Line
        | 0x000C    // FF  Form Feed
        | 0x2028    // LS  Line Separator
        | 0x2029    // PS  Paragraph Separator
    )
}

/// Returns whether `c` is banned from v2 documents entirely.
///
/// v1 has no illegal-character rule at this layer.
pub fn is_illegal(version: Version, c: u32) -> bool {
    if version == Version::V1 {
        return false;
    }
    matches!(
        c,
        0x0000..=0x0008
        | 0x000E..=0x001F
        | 0x007F            // DEL
        | 0xD800..=0xDFFF   // UTF-16 surrogates
        | 0x200E | 0x200F   // directional format characters
        | 0x202A..=0x202E
        | 0x2066..=0x2069
        | 0xFEFF            // BOM anywhere but the start of a document
    ) || c > 0x10_FFFF
}

/// Returns whether `c` is an equals sign.
///
/// v2 also recognizes a few Unicode equals-like code points.
pub fn is_equals(version: Version, c: u32) -> bool {
    c == 0x003D
        || (version == Version::V2
            && matches!(c, 0xFE66 | 0xFF1D | 0x1F7F0))
}

/// Returns whether `c` may appear in a word (an identifier, number, or
/// keyword literal).
pub fn is_word(version: Version, c: u32) -> bool {
    c > 0x20
        && c <= 0x10_FFFF
        && !matches!(
            c,
            0x5C    // \
            | 0x2F  // /
            | 0x28  // (
            | 0x29  // )
            | 0x7B  // {
            | 0x7D  // }
            | 0x3B  // ;
            | 0x5B  // [
            | 0x5D  // ]
            | 0x22  // "
        )
        && !(version == Version::V1 && matches!(c, 0x3C | 0x3E | 0x2C)) // < > ,
        && !is_equals(version, c)
        && !is_whitespace(version, c)
        && !is_newline(c)
        && !is_illegal(version, c)
}

/// Returns whether `c` may appear in an identifier.
///
/// v2 additionally bans `#`, which it reserves for keywords and raw
/// strings.
pub fn is_identifier(version: Version, c: u32) -> bool {
    is_word(version, c) && !(version == Version::V2 && c == 0x23)
}

/// Returns whether `c` may start an identifier.
pub fn is_identifier_start(version: Version, c: u32) -> bool {
    is_identifier(version, c) && !(0x30..=0x39).contains(&c)
}

/// Returns whether `c` could terminate a word in some position.
pub fn is_end_of_word(version: Version, c: u32) -> bool {
    is_whitespace(version, c)
        || is_newline(c)
        || matches!(
            c,
            0x3B    // ;
            | 0x29  // )
            | 0x7D  // }
            | 0x2F  // /
            | 0x5C  // \
        )
        || is_equals(version, c)
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Version::*;

    #[test]
    fn whitespace() {
        for v in [V1, V2] {
            assert!(  is_whitespace(v, 0x09)   );
            assert!(  is_whitespace(v, 0x20)   );
            assert!(  is_whitespace(v, 0x3000) );
            assert!( !is_whitespace(v, 0x0A)   );
        }
        assert!(  is_whitespace(V1, 0xFEFF) );
        assert!( !is_whitespace(V2, 0xFEFF) );
        assert!( !is_whitespace(V1, 0x0B)   );
        assert!(  is_whitespace(V2, 0x0B)   );
    }

    #[test]
    fn newline() {
        for c in [0x0D, 0x0A, 0x85, 0x0C, 0x2028, 0x2029] {
            assert!( is_newline(c) );
        }
        assert!( !is_newline(0x20) );
    }

    #[test]
    fn illegal() {
        assert!(  is_illegal(V2, 0x07)   );
        assert!(  is_illegal(V2, 0x7F)   );
        assert!(  is_illegal(V2, 0xD800) );
        assert!(  is_illegal(V2, 0x202A) );
        assert!(  is_illegal(V2, 0xFEFF) );
        assert!( !is_illegal(V2, 0x41)   );
        assert!( !is_illegal(V1, 0x07)   );
        assert!( !is_illegal(V1, 0xFEFF) );
    }

    #[test]
    fn equals() {
        assert!(  is_equals(V1, 0x3D)    );
        assert!(  is_equals(V2, 0x3D)    );
        assert!( !is_equals(V1, 0xFF1D)  );
        assert!(  is_equals(V2, 0xFF1D)  );
        assert!(  is_equals(V2, 0xFE66)  );
        assert!(  is_equals(V2, 0x1F7F0) );
    }

    #[test]
    fn word() {
        for v in [V1, V2] {
            assert!(  is_word(v, b'a' as u32)  );
            assert!(  is_word(v, b'5' as u32)  );
            assert!(  is_word(v, b'+' as u32)  );
            assert!(  is_word(v, 0xE9)         );
            assert!( !is_word(v, b'"' as u32)  );
            assert!( !is_word(v, b'{' as u32)  );
            assert!( !is_word(v, b'=' as u32)  );
            assert!( !is_word(v, b' ' as u32)  );
        }
        // < > , are words in v2 only
        assert!( !is_word(V1, b'<' as u32) );
        assert!(  is_word(V2, b'<' as u32) );
        assert!( !is_word(V1, b',' as u32) );
        assert!(  is_word(V2, b',' as u32) );
    }

    #[test]
    fn identifier() {
        // # is a word character in both versions but an identifier
        // character only in v1
        assert!(  is_word(V1, b'#' as u32)       );
        assert!(  is_word(V2, b'#' as u32)       );
        assert!(  is_identifier(V1, b'#' as u32) );
        assert!( !is_identifier(V2, b'#' as u32) );

        assert!(  is_identifier_start(V2, b'a' as u32) );
        assert!( !is_identifier_start(V2, b'0' as u32) );
        assert!(  is_identifier(V2, b'0' as u32)       );
    }

    #[test]
    fn end_of_word() {
        for v in [V1, V2] {
            assert!(  is_end_of_word(v, b' ' as u32)  );
            assert!(  is_end_of_word(v, b'\n' as u32) );
            assert!(  is_end_of_word(v, b';' as u32)  );
            assert!(  is_end_of_word(v, b')' as u32)  );
            assert!(  is_end_of_word(v, b'}' as u32)  );
            assert!(  is_end_of_word(v, b'/' as u32)  );
            assert!(  is_end_of_word(v, b'\\' as u32) );
            assert!(  is_end_of_word(v, b'=' as u32)  );
            assert!( !is_end_of_word(v, b'a' as u32)  );
            assert!( !is_end_of_word(v, b'(' as u32)  );
        }
        assert!( is_end_of_word(V2, 0xFF1D) );
    }
}
