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

//! Comment and slashdash sublexer.

use crate::chars;
use crate::token::TokenKind;

use super::{Scan, TokenizeError, Tokenizer};

impl<'a> Tokenizer<'a> {
    /// Scans `//…`, `/*…*/`, or `/-`.  The slash is at position 0.
    ///
    /// Comment text includes the delimiters; a line comment ends before
    /// its newline.
    pub(super) fn scan_comment(&mut self) -> Result<Scan, TokenizeError> {
        let v = self.version();

        let (c2, p2) = self
            .char_at(1)?
            .ok_or(TokenizeError::UnexpectedChar)?;

        match c2 {
            // slashdash
            0x2D => Ok(Scan { kind: TokenKind::Slashdash, text: 0..p2, consume: p2 }),

            // line comment: scan to newline or end of input
            0x2F => {
                let mut pos = p2;
                loop {
                    match self.char_at(pos)? {
                        None => break,
                        Some((c, next)) => {
                            if chars::is_newline(c) {
                                break;
                            }
                            if chars::is_illegal(v, c) {
                                return Err(TokenizeError::IllegalChar);
                            }
                            pos = next;
                        }
                    }
                }
                Ok(Scan { kind: TokenKind::SingleLineComment, text: 0..pos, consume: pos })
            }

            // block comment, with nesting
            0x2A => {
                let mut depth = 1u32;
                let mut prev  = 0u32;
                let mut pos   = p2;
                while depth > 0 {
                    let (mut c, next) = self
                        .char_at(pos)?
                        .ok_or(TokenizeError::UntermComment)?;

                    if chars::is_illegal(v, c) {
                        return Err(TokenizeError::IllegalChar);
                    }

                    if c == 0x2A && prev == 0x2F {
                        // another level of nesting; "/*/" is not self-closing
                        depth += 1;
                        c = 0;
                    } else if c == 0x2F && prev == 0x2A {
                        // "*/*" is not reopening
                        depth -= 1;
                        c = 0;
                    }

                    prev = c;
                    pos  = next;
                }
                Ok(Scan { kind: TokenKind::MultiLineComment, text: 0..pos, consume: pos })
            }

            _ => Err(TokenizeError::UnexpectedChar),
        }
    }
}
