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

//! rkdl reads, validates, and writes documents in the KDL configuration
//! language, in both the KDL v1 and KDL v2 syntaxes, with optional
//! automatic version detection.
//!
//! The crate is built around three streaming pieces:
//!
//! - [`Tokenizer`] — a pull lexer that yields one [`Token`] at a time,
//!   borrowing its text from the input with zero copies.
//! - [`Parser`] — an event parser driven by the tokenizer; each call to
//!   [`Parser::next_event`] yields one [`Event`].
//! - [`Emitter`] — an imperative pretty-printer that produces valid KDL
//!   from a sequence of node/argument/property calls.

pub mod chars;
pub mod emit;
pub mod num;
pub mod parser;
pub mod text;
pub mod token;
pub mod tokenizer;
pub mod utf8;
pub mod value;

pub use emit::{Emitter, EmitterOptions, EmitError, FloatMode, IdentifierMode};
pub use parser::{Event, EventKind, ParseOptions, Parser};
pub use text::EscapeMode;
pub use token::{Token, TokenKind};
pub use tokenizer::{Tokenizer, TokenizeError};
pub use value::{Number, Value, ValueKind};

// ----------------------------------------------------------------------------

/// KDL language versions.
///
/// The same two values select the tokenizer's character set: the two
/// versions differ in which code points count as whitespace, which are
/// banned outright, and which may appear in identifiers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Version {
    /// KDL 1.0.
    V1,

    /// KDL 2.0.
    V2,
}

/// Version selection for the parser.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VersionSelect {
    /// Accept both versions, committing to one when a version-specific
    /// construct appears.
    Detect,

    /// Accept KDL v1 only.
    V1,

    /// Accept KDL v2 only.
    V2,
}

impl Default for VersionSelect {
    #[inline]
    fn default() -> Self {
        VersionSelect::Detect
    }
}
