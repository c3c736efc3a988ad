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

//! String sublexers: quoted, multi-line, and raw.
//!
//! The token text of every string kind is the content between the
//! delimiters, uninterpreted; escape resolution and dedenting happen in
//! the parser.

use crate::chars;
use crate::token::TokenKind;
use crate::Version;

use super::{Scan, TokenizeError, Tokenizer};

impl<'a> Tokenizer<'a> {
    /// Scans a `"…"` or `"""…"""` string.  The opening quote is at
    /// position 0.
    pub(super) fn scan_string(&mut self) -> Result<Scan, TokenizeError> {
        let v = self.version();

        // An immediate second quote is either the empty string or the
        // start of a multi-line string
        if let Some((0x22, p2)) = self.char_at(1)? {
            return match self.char_at(p2)? {
                Some((0x22, p3)) => self.scan_string_multi(p3),
                _ => Ok(Scan { kind: TokenKind::String, text: 1..1, consume: p2 }),
            };
        }

        let mut pos  = 1;
        let mut prev = 0u32;
        loop {
            let (mut c, next) = self
                .char_at(pos)?
                .ok_or(TokenizeError::UntermString)?;

            if chars::is_illegal(v, c) {
                return Err(TokenizeError::IllegalChar);
            }
            if v == Version::V2 && chars::is_newline(c) {
                // v2 single-line strings end at the line
                return Err(TokenizeError::UntermString);
            }

            if c == 0x5C && prev == 0x5C {
                c = 0; // double backslash is no backslash
            } else if c == 0x22 && prev != 0x5C {
                // non-escaped end of string
                return Ok(Scan { kind: TokenKind::String, text: 1..pos, consume: next });
            }

            prev = c;
            pos  = next;
        }
    }

    /// Scans the remainder of a `"""…"""` string.  `body_start` is the
    /// position just after the opening delimiter.
    fn scan_string_multi(&mut self, body_start: usize) -> Result<Scan, TokenizeError> {
        let v = self.version();

        let mut pos       = body_start;
        let mut prev      = 0u32;
        let mut quotes    = 0usize;
        let mut run_start = 0usize;

        loop {
            let (mut c, next) = self
                .char_at(pos)?
                .ok_or(TokenizeError::UntermString)?;

            if chars::is_illegal(v, c) {
                return Err(TokenizeError::IllegalChar);
            }

            if c == 0x22 && prev != 0x5C {
                if quotes == 0 {
                    run_start = pos;
                }
                if quotes < 3 {
                    quotes += 1;
                } else {
                    // a longer run shifts its first quote into the content
                    run_start += 1;
                }
                if quotes == 3 {
                    match self.char_at(next)? {
                        Some((0x22, _)) => (), // run continues
                        _ => {
                            return Ok(Scan {
                                kind:    TokenKind::MultiLineString,
                                text:    body_start..run_start,
                                consume: next,
                            })
                        }
                    }
                }
            } else {
                quotes = 0;
                if c == 0x5C && prev == 0x5C {
                    c = 0;
                }
            }

            prev = c;
            pos  = next;
        }
    }

    /// Attempts to scan a v1 raw string, `r#"…"#` with any number of
    /// hashes including zero.  The `r` is at position 0.  Returns `None`
    /// if the input is not a raw string; the caller then backs off and
    /// scans a word instead.
    pub(super) fn scan_raw_v1(&mut self) -> Result<Option<Scan>, TokenizeError> {
        let mut pos    = 1;
        let mut hashes = 0usize;
        loop {
            match self.char_at(pos)? {
                Some((0x23, next)) => {
                    hashes += 1;
                    pos = next;
                }
                Some((0x22, next)) => {
                    pos = next;
                    break;
                }
                _ => return Ok(None),
            }
        }
        self.scan_raw_body(TokenKind::RawStringV1, pos, hashes, 1)
    }

    /// Attempts to scan a v2 raw string, `#"…"#` or `#"""…"""#`.  The
    /// first hash is at position 0.  Returns `None` if the input is not a
    /// raw string (e.g. the word `#true`).
    pub(super) fn scan_raw_v2(&mut self) -> Result<Option<Scan>, TokenizeError> {
        let mut pos    = 0;
        let mut hashes = 0usize;
        loop {
            match self.char_at(pos)? {
                Some((0x23, next)) => {
                    hashes += 1;
                    pos = next;
                }
                Some((0x22, next)) => {
                    pos = next;
                    break;
                }
                _ => return Ok(None),
            }
        }

        // Triple-quoted form?
        if let Some((0x22, p2)) = self.char_at(pos)? {
            if let Some((0x22, p3)) = self.char_at(p2)? {
                return self.scan_raw_body(TokenKind::RawMultiLineString, p3, hashes, 3);
            }
        }
        self.scan_raw_body(TokenKind::RawStringV2, pos, hashes, 1)
    }

    /// Scans a raw string body until a closing run of `required` quotes
    /// followed by `hashes` hashes.  Raw strings have no escapes.
    fn scan_raw_body(
        &mut self,
        kind:     TokenKind,
        body_start: usize,
        hashes:   usize,
        required: usize,
    ) -> Result<Option<Scan>, TokenizeError> {
        let v = self.version();

        let mut pos       = body_start;
        let mut run       = 0usize; // consecutive quotes
        let mut run_start = 0usize;
        let mut found     = 0usize; // hashes after a sufficient run

        loop {
            let (c, next) = match self.char_at(pos)? {
                Some(x) => x,
                None    => return Ok(None), // unterminated: back off
            };

            if chars::is_illegal(v, c) {
                return Err(TokenizeError::IllegalChar);
            }

            match c {
                0x22 => {
                    if found > 0 {
                        run = 0;
                        found = 0;
                    }
                    if run == 0 {
                        run_start = pos;
                    }
                    run += 1;
                    if hashes == 0 && run >= required {
                        // no hashes: the first sufficient run closes
                        return Ok(Some(Scan {
                            kind,
                            text:    body_start..run_start + (run - required),
                            consume: next,
                        }));
                    }
                }
                0x23 if run >= required => {
                    found += 1;
                    if found == hashes {
                        return Ok(Some(Scan {
                            kind,
                            text:    body_start..run_start + (run - required),
                            consume: next,
                        }));
                    }
                }
                _ => {
                    run = 0;
                    found = 0;
                }
            }

            pos = next;
        }
    }
}
