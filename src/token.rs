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

//! Lexical tokens.

use std::fmt::{self, Display, Formatter};

// ----------------------------------------------------------------------------

/// Lexical token kinds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum TokenKind {
    /// `(` - start of a type annotation.
    StartType,

    /// `)` - end of a type annotation.
    EndType,

    /// An identifier, number, bool, or null literal.  The parser decides
    /// which.
    Word,

    /// `"…"` - a single-line string.
    String,

    /// `"""…"""` - a multi-line string.
    MultiLineString,

    /// `r#"…"#` - a v1 raw string.
    RawStringV1,

    /// `#"…"#` - a v2 raw string.
    RawStringV2,

    /// `#"""…"""#` - a raw multi-line string.
    RawMultiLineString,

    /// `//` to end of line.
    SingleLineComment,

    /// `/-` - elides the next node, argument, property, or children block.
    Slashdash,

    /// `/* … */`, nestable.
    MultiLineComment,

    /// `=` - property assignment.
    Equals,

    /// `{` - start of a children block.
    StartChildren,

    /// `}` - end of a children block.
    EndChildren,

    /// A newline (LF, CR, CRLF, NEL, FF, LS, or PS).
    Newline,

    /// `;` - end of a node.
    Semicolon,

    /// `\` - joins two lines.
    LineContinuation,

    /// A maximal run of whitespace.
    Whitespace,
}

/// A lexical token: a kind and the text it covers.
///
/// For string kinds the text is the content between the delimiters; for
/// every other kind it is the raw source text.  The slice borrows from the
/// tokenizer and is valid until the next `pop_token` call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Token<'a> {
    /// What kind of token this is.
    pub kind: TokenKind,

    /// The text of the token.
    pub text: &'a str,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        use TokenKind::*;

        let s = match *self {
            StartType          => "(",
            EndType            => ")",
            Word               => "word",
            String             => "string",
            MultiLineString    => "multi-line string",
            RawStringV1        => "raw string (v1)",
            RawStringV2        => "raw string (v2)",
            RawMultiLineString => "raw multi-line string",
            SingleLineComment  => "line comment",
            Slashdash          => "/-",
            MultiLineComment   => "block comment",
            Equals             => "=",
            StartChildren      => "{",
            EndChildren        => "}",
            Newline            => "newline",
            Semicolon          => ";",
            LineContinuation   => "\\",
            Whitespace         => "whitespace",
        };
        s.fmt(f)
    }
}

// ----------------------------------------------------------------------------
