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

//! Event parser.
//!
//! A [`Parser`] drives a [`Tokenizer`] and turns the token stream into a
//! stream of [`Event`]s: node starts and ends, arguments, properties, and
//! (optionally) comments.  One event is produced per
//! [`Parser::next_event`] call; the event and the strings it borrows are
//! invalidated by the next call.
//!
//! Lexical and syntactic problems surface as a single
//! [`EventKind::ParseError`] event; the parser does not recover, and
//! subsequent calls return [`EventKind::Eof`].

mod value;

use std::io::Read;

use crate::token::TokenKind;
use crate::tokenizer::Tokenizer;
use crate::value::{Number, Value, ValueKind};
use crate::{Version, VersionSelect};

// ----------------------------------------------------------------------------

/// Parser options.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ParseOptions {
    /// Which KDL version(s) to accept.
    pub version: VersionSelect,

    /// Whether comment tokens become visible events.  When set, events
    /// elided by a slashdash are emitted with [`Event::commented`] set
    /// instead of being dropped.
    pub emit_comments: bool,
}

/// One parse event.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Event<'a> {
    /// What happened.
    pub kind: EventKind<'a>,

    /// Whether this event belongs to an item elided by a slashdash.
    /// Only set when comment emission is enabled.
    pub commented: bool,
}

/// Parse event kinds.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum EventKind<'a> {
    /// The document ended.
    Eof,

    /// The document is invalid; the message says roughly why.
    ParseError(&'static str),

    /// A node began.
    StartNode {
        name: &'a str,
        type_annotation: Option<&'a str>,
    },

    /// The innermost open node ended.
    EndNode,

    /// An argument of the open node.
    Argument(Value<'a>),

    /// A property of the open node.
    Property(&'a str, Value<'a>),

    /// A comment token, emitted only when comment emission is enabled.
    Comment(&'a str),
}

// ----------------------------------------------------------------------------

/// Base parser positions.  Orthogonal flags live beside this in
/// [`Parser`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum State {
    /// At the document root or between sibling nodes inside a children
    /// block.
    Outside,

    /// After a node name, accepting arguments, properties, and child
    /// blocks.
    InNode,
}

/// The value scratch.  String payloads live in `Parser::val_str`.
#[derive(Clone, Copy, Debug)]
pub(super) enum Scratch {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str,
    Num,
}

enum Step {
    /// Keep going; no event yet.
    Continue,

    /// Emit this event, with or without the comment flag.
    Emit(Emit, bool),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Emit {
    Eof,
    StartNode,
    EndNode,
    Argument,
    Property,
    Comment,
}

// ----------------------------------------------------------------------------

/// An event parser.  Reads tokens and yields a stream of parse events.
pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    emit_comments: bool,

    /// Detected or forced version.  `None` until a version-specific
    /// construct settles it.
    pub(super) detected: Option<Version>,

    /// Count of open nodes.
    depth: usize,

    /// Depth at which the active slashdash elides, if one is active.
    slashdash_depth: Option<usize>,

    /// A slashdash has been seen whose item has not started yet.
    slashdash_armed: bool,

    /// Depth of the node whose children block is being elided whole.
    elided_block: Option<usize>,

    state: State,

    // Orthogonal position flags
    awaiting_type_id:    bool,
    awaiting_type_close: bool,
    in_property:         bool,
    maybe_property:      bool,
    pending_bare:        bool,
    newlines_are_ws:     bool,
    end_of_node:         bool,
    line_cont:           bool,
    ws_seen:             bool,
    done:                bool,
    pending_clear:       bool,

    // Scratch strings; events borrow from these
    pub(super) tok_text: String,
    pub(super) val_str:  String,
    key_str:  String,
    pend_str: String,
    type_str: Option<String>,

    pub(super) value: Scratch,

    /// One token of lookahead, pushed back for reprocessing.
    peeked: Option<(TokenKind, String)>,
}

impl<'a> Parser<'a> {
    /// Creates a parser that reads the given document.
    pub fn new(doc: &'a [u8], opt: ParseOptions) -> Self {
        Self::with_tokenizer(Tokenizer::new(doc), opt)
    }

    /// Creates a parser that pulls input from a read callback.
    /// Returning 0 signals end of input.
    pub fn from_read_fn(read: impl FnMut(&mut [u8]) -> usize + 'a, opt: ParseOptions) -> Self {
        Self::with_tokenizer(Tokenizer::from_read_fn(read), opt)
    }

    /// Creates a parser that pulls input from a [`Read`] stream.
    pub fn from_reader(reader: impl Read + 'a, opt: ParseOptions) -> Self {
        Self::with_tokenizer(Tokenizer::from_reader(reader), opt)
    }

    fn with_tokenizer(mut tokenizer: Tokenizer<'a>, opt: ParseOptions) -> Self {
        let detected = match opt.version {
            VersionSelect::Detect => None,
            VersionSelect::V1     => Some(Version::V1),
            VersionSelect::V2     => Some(Version::V2),
        };
        if let Some(v) = detected {
            tokenizer.set_version(v);
        }
        Self {
            tokenizer,
            emit_comments: opt.emit_comments,
            detected,
            depth: 0,
            slashdash_depth: None,
            slashdash_armed: false,
            elided_block: None,
            state: State::Outside,
            awaiting_type_id:    false,
            awaiting_type_close: false,
            in_property:         false,
            maybe_property:      false,
            pending_bare:        false,
            newlines_are_ws:     false,
            end_of_node:         false,
            line_cont:           false,
            ws_seen:             false,
            done:                false,
            pending_clear:       false,
            tok_text: String::new(),
            val_str:  String::new(),
            key_str:  String::new(),
            pend_str: String::new(),
            type_str: None,
            value:    Scratch::Null,
            peeked:   None,
        }
    }

    /// Returns the version the document has committed to, if it has.
    #[inline]
    pub fn detected_version(&self) -> Option<Version> {
        self.detected
    }

    /// Advances to the next event.
    ///
    /// The returned event, including the strings it borrows, is valid
    /// until the next call.
    pub fn next_event(&mut self) -> Event<'_> {
        if self.done {
            return Event { kind: EventKind::Eof, commented: false };
        }

        // Release scratch consumed by the previous event
        if self.pending_clear {
            self.pending_clear = false;
            self.type_str = None;
        }

        loop {
            match self.step() {
                Ok(Step::Continue) => continue,
                Ok(Step::Emit(emit, commented)) => return self.build_event(emit, commented),
                Err(message) => {
                    self.done = true;
                    return Event { kind: EventKind::ParseError(message), commented: false };
                }
            }
        }
    }

    // ------------------------------------------------------------------------

    /// Processes one token (or end of input).  At most one event results.
    fn step(&mut self) -> Result<Step, &'static str> {
        let mut kind = match self.take_token()? {
            Some(kind) => kind,
            None       => return self.at_eof(),
        };

        // While a slashdash is swallowing the next item, newlines must not
        // terminate anything
        if kind == TokenKind::Newline && self.newlines_are_ws {
            kind = TokenKind::Whitespace;
        }

        // Whitespace and comments
        match kind {
            TokenKind::Whitespace => return self.on_blank(false),
            TokenKind::SingleLineComment | TokenKind::MultiLineComment => {
                return self.on_blank(true)
            }
            _ => (),
        }

        // A pending identifier resolves at the next solid token: '='
        // makes it a property name, anything else makes it an argument
        if self.maybe_property {
            if kind == TokenKind::Equals {
                if self.ws_seen {
                    if !self.commit(Version::V2) {
                        return Err("whitespace before '=' is not allowed in KDL v1");
                    }
                    self.ws_seen = false;
                }
                self.maybe_property = false;
                self.pending_bare   = false;
                self.in_property    = true;
                std::mem::swap(&mut self.key_str, &mut self.pend_str);
                return Ok(Step::Continue);
            }
            return self.flush_pending_argument(Some(kind));
        }

        // After '\', only a newline (or a comment before it) may follow
        if self.line_cont {
            return if kind == TokenKind::Newline {
                self.line_cont = false;
                Ok(Step::Continue)
            } else {
                Err("illegal token after line continuation")
            };
        }
        if kind == TokenKind::LineContinuation {
            self.line_cont = true;
            return Ok(Step::Continue);
        }

        // Slashdash elides the next node, argument, property, or block.
        // One inside an already-elided item adds nothing.
        if kind == TokenKind::Slashdash {
            if self.slashdash_depth.is_none() {
                self.slashdash_depth = Some(self.depth + 1);
                self.slashdash_armed = true;
                self.newlines_are_ws = true;
            }
            return Ok(Step::Continue);
        }

        // The elided item begins with this token
        if self.slashdash_armed {
            self.slashdash_armed = false;
            self.newlines_are_ws = false;
            match kind {
                TokenKind::StartChildren
                    if self.state == State::InNode
                        && !self.awaiting_type_id
                        && !self.awaiting_type_close
                        && self.type_str.is_none()
                        && !self.in_property =>
                {
                    // the slashdash elides the whole children block; the
                    // node itself survives
                    self.elided_block = Some(self.depth);
                    self.state = State::Outside;
                    return Ok(Step::Continue);
                }
                TokenKind::EndChildren
                | TokenKind::Semicolon
                | TokenKind::EndType
                | TokenKind::Equals => return Err("dangling slashdash (/-)"),
                _ => (),
            }
        }

        // Type annotations read the same way in both base states
        if self.awaiting_type_id {
            return match kind {
                TokenKind::Word
                | TokenKind::String
                | TokenKind::RawStringV1
                | TokenKind::RawStringV2
                | TokenKind::MultiLineString
                | TokenKind::RawMultiLineString => {
                    self.parse_token_value(kind)?;
                    if matches!(self.value, Scratch::Str) {
                        self.type_str = Some(std::mem::take(&mut self.val_str));
                        self.awaiting_type_id    = false;
                        self.awaiting_type_close = true;
                        Ok(Step::Continue)
                    } else {
                        Err("expected identifier or string")
                    }
                }
                _ => Err("unexpected token, expected type"),
            };
        }
        if self.awaiting_type_close {
            return match kind {
                TokenKind::EndType => {
                    self.awaiting_type_close = false;
                    Ok(Step::Continue)
                }
                _ => Err("unexpected token, expected ')'"),
            };
        }

        match self.state {
            State::Outside => self.outside_token(kind),
            State::InNode  => self.in_node_token(kind),
        }
    }

    /// Handles a token at the document root or between sibling nodes.
    fn outside_token(&mut self, kind: TokenKind) -> Result<Step, &'static str> {
        use TokenKind::*;

        match kind {
            Newline | Semicolon => Ok(Step::Continue),

            StartType => {
                if self.type_str.is_some() {
                    Err("unexpected second type annotation")
                } else {
                    self.awaiting_type_id = true;
                    Ok(Step::Continue)
                }
            }

            Word | String | RawStringV1 | RawStringV2 | MultiLineString
            | RawMultiLineString => {
                self.parse_token_value(kind)?;
                if matches!(self.value, Scratch::Str) {
                    self.state = State::InNode;
                    self.depth += 1;
                    self.emit_structural(Emit::StartNode)
                } else {
                    Err("expected identifier or string")
                }
            }

            EndChildren => {
                if self.depth == 0 {
                    Err("unexpected '}'")
                } else if self.elided_block == Some(self.depth) {
                    // the elided children block ends here, and with it the
                    // slashdash; the node itself is still open
                    self.elided_block    = None;
                    self.slashdash_depth = None;
                    self.state = State::InNode;
                    Ok(Step::Continue)
                } else if self.slashdash_depth == Some(self.depth) {
                    // the elided node ends with its children block, so
                    // that a sibling may follow on the same line
                    self.depth -= 1;
                    self.emit_structural(Emit::EndNode)
                } else {
                    self.end_of_node = true;
                    self.state = State::InNode;
                    Ok(Step::Continue)
                }
            }

            _ => Err("unexpected token, expected node"),
        }
    }

    /// Handles a token after a node name.
    fn in_node_token(&mut self, kind: TokenKind) -> Result<Step, &'static str> {
        use TokenKind::*;

        // After a children block, only terminators may follow
        if self.end_of_node && !matches!(kind, Newline | Semicolon | EndChildren) {
            return Err("unexpected token after children block");
        }

        // After '=', only a value (or its type annotation) may follow
        if self.in_property
            && !matches!(
                kind,
                Word | String | RawStringV1 | RawStringV2 | MultiLineString
                | RawMultiLineString | StartType
            )
        {
            return Err("unexpected token, expected value");
        }

        match kind {
            Newline | Semicolon => self.end_node(None),

            EndChildren => self.end_node(Some(EndChildren)),

            StartType => {
                if self.type_str.is_some() {
                    Err("unexpected second type annotation")
                } else {
                    self.awaiting_type_id = true;
                    Ok(Step::Continue)
                }
            }

            StartChildren => {
                if self.type_str.is_some() {
                    Err("unexpected '{'")
                } else {
                    self.state = State::Outside;
                    Ok(Step::Continue)
                }
            }

            Word | String | RawStringV1 | RawStringV2 | MultiLineString
            | RawMultiLineString => {
                self.parse_token_value(kind)?;
                let is_string = matches!(self.value, Scratch::Str);

                if self.in_property {
                    self.in_property = false;
                    self.check_bare_value(kind, is_string)?;
                    self.emit_structural(Emit::Property)
                } else if is_string && self.type_str.is_none() {
                    // could be a property key; the next token decides
                    std::mem::swap(&mut self.pend_str, &mut self.val_str);
                    self.maybe_property = true;
                    self.pending_bare   = kind == Word;
                    Ok(Step::Continue)
                } else {
                    self.check_bare_value(kind, is_string)?;
                    self.emit_structural(Emit::Argument)
                }
            }

            _ => Err("unexpected token"),
        }
    }

    // ------------------------------------------------------------------------

    /// Handles end of input.
    fn at_eof(&mut self) -> Result<Step, &'static str> {
        if self.slashdash_armed {
            return Err("dangling slashdash (/-)");
        }
        if self.maybe_property {
            return self.flush_pending_argument(None);
        }
        if self.awaiting_type_id || self.awaiting_type_close || self.in_property {
            return Err("unexpected end of data");
        }
        match self.state {
            State::InNode => self.end_node(None),
            State::Outside => {
                if self.depth > 0 {
                    Err("unexpected end of data")
                } else if self.slashdash_depth.is_some() {
                    Err("dangling slashdash (/-)")
                } else {
                    Ok(Step::Emit(Emit::Eof, false))
                }
            }
        }
    }

    /// Handles a whitespace or comment token.
    fn on_blank(&mut self, comment: bool) -> Result<Step, &'static str> {
        // v1 forbids blanks inside a type annotation, between an
        // annotation and its value, and between '=' and a value
        let banned = self.awaiting_type_id
            || self.awaiting_type_close
            || self.type_str.is_some()
            || self.in_property;
        if banned && !self.commit(Version::V2) {
            return Err("whitespace not allowed here in KDL v1");
        }

        // between an identifier and a possible '=' the verdict is
        // deferred until the '=' does or does not appear
        if self.maybe_property {
            self.ws_seen = true;
        }

        if comment && self.emit_comments {
            std::mem::swap(&mut self.val_str, &mut self.tok_text);
            return Ok(Step::Emit(Emit::Comment, false));
        }
        Ok(Step::Continue)
    }

    /// Emits the pending identifier as an argument, optionally pushing
    /// the current token back for reprocessing.
    fn flush_pending_argument(&mut self, push_back: Option<TokenKind>) -> Result<Step, &'static str> {
        self.maybe_property = false;
        self.ws_seen        = false;

        if self.pending_bare {
            self.pending_bare = false;
            match self.detected {
                Some(Version::V1) => return Err("bare identifier not allowed here"),
                None              => { self.commit(Version::V2); }
                Some(Version::V2) => (),
            }
        }

        if let Some(kind) = push_back {
            self.peeked = Some((kind, std::mem::take(&mut self.tok_text)));
        }
        std::mem::swap(&mut self.val_str, &mut self.pend_str);
        self.value = Scratch::Str;
        self.emit_structural(Emit::Argument)
    }

    /// Ends the innermost open node, optionally pushing the current token
    /// back for reprocessing.
    fn end_node(&mut self, push_back: Option<TokenKind>) -> Result<Step, &'static str> {
        self.state       = State::Outside;
        self.end_of_node = false;
        self.depth -= 1;
        if let Some(kind) = push_back {
            self.peeked = Some((kind, std::mem::take(&mut self.tok_text)));
        }
        self.emit_structural(Emit::EndNode)
    }

    /// In v1, a bare word may not be an argument or property value; in
    /// detect mode its presence commits v2, where it is a string.
    fn check_bare_value(&mut self, kind: TokenKind, is_string: bool) -> Result<(), &'static str> {
        if kind == TokenKind::Word && is_string {
            match self.detected {
                Some(Version::V1) => return Err("bare identifier not allowed here"),
                None              => { self.commit(Version::V2); }
                Some(Version::V2) => (),
            }
        }
        Ok(())
    }

    /// Applies the active slashdash, if any, to a structural event:
    /// either drops it or flags it as commented.
    fn emit_structural(&mut self, emit: Emit) -> Result<Step, &'static str> {
        if let Some(sd) = self.slashdash_depth {
            // does the elided item finish with this event?
            let ends = match emit {
                Emit::Argument | Emit::Property => sd == self.depth + 1,
                Emit::EndNode => self.elided_block.is_none() && self.depth + 1 == sd,
                _ => false,
            };
            if ends {
                self.slashdash_depth = None;
            }
            return if self.emit_comments {
                self.pending_clear = true;
                Ok(Step::Emit(emit, true))
            } else {
                // the event and its attributes vanish
                self.type_str = None;
                Ok(Step::Continue)
            };
        }
        self.pending_clear = true;
        Ok(Step::Emit(emit, false))
    }

    // ------------------------------------------------------------------------

    /// Joins the detected version with `v`.  Returns `false` on a clash
    /// with an earlier commitment or a forced version.
    pub(super) fn commit(&mut self, v: Version) -> bool {
        match self.detected {
            None => {
                self.detected = Some(v);
                self.tokenizer.set_version(v);
                true
            }
            Some(d) => d == v,
        }
    }

    /// Like [`Self::commit`], but failure carries the given message.
    pub(super) fn require(&mut self, v: Version, message: &'static str) -> Result<(), &'static str> {
        if self.commit(v) {
            Ok(())
        } else {
            Err(message)
        }
    }

    /// Fetches the next token kind, filling `tok_text` with its text.
    fn take_token(&mut self) -> Result<Option<TokenKind>, &'static str> {
        if let Some((kind, text)) = self.peeked.take() {
            self.tok_text = text;
            return Ok(Some(kind));
        }
        match self.tokenizer.pop_token() {
            Ok(Some(token)) => {
                self.tok_text.clear();
                self.tok_text.push_str(token.text);
                Ok(Some(token.kind))
            }
            Ok(None) => Ok(None),
            Err(e)   => Err(e.message()),
        }
    }

    fn build_event(&mut self, emit: Emit, commented: bool) -> Event<'_> {
        if emit == Emit::Eof {
            self.done = true;
        }
        let kind = match emit {
            Emit::Eof       => EventKind::Eof,
            Emit::EndNode   => EventKind::EndNode,
            Emit::Comment   => EventKind::Comment(&self.val_str),
            Emit::StartNode => EventKind::StartNode {
                name: &self.val_str,
                type_annotation: self.type_str.as_deref(),
            },
            Emit::Argument  => EventKind::Argument(self.current_value()),
            Emit::Property  => EventKind::Property(&self.key_str, self.current_value()),
        };
        Event { kind, commented }
    }

    fn current_value(&self) -> Value<'_> {
        let kind = match self.value {
            Scratch::Null     => ValueKind::Null,
            Scratch::Bool(b)  => ValueKind::Bool(b),
            Scratch::Int(n)   => ValueKind::Number(Number::Integer(n)),
            Scratch::Float(f) => ValueKind::Number(Number::Float(f)),
            Scratch::Str      => ValueKind::String(&self.val_str),
            Scratch::Num      => ValueKind::Number(Number::StringEncoded(&self.val_str)),
        };
        Value { type_annotation: self.type_str.as_deref(), kind }
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::value::Number;

    fn run(doc: &str, opt: ParseOptions) -> Vec<String> {
        let mut parser = Parser::new(doc.as_bytes(), opt);
        let mut out    = Vec::new();
        loop {
            let event  = parser.next_event();
            let mut s  = String::new();
            if event.commented {
                s.push_str("#  ");
            }
            match event.kind {
                EventKind::Eof            => s.push_str("eof"),
                EventKind::ParseError(m)  => { s.push_str("error: "); s.push_str(m); }
                EventKind::EndNode        => s.push_str("end"),
                EventKind::Comment(c)     => s.push_str(&format!("comment {:?}", c)),
                EventKind::StartNode { name, type_annotation: Some(t) } =>
                    s.push_str(&format!("start ({}){}", t, name)),
                EventKind::StartNode { name, .. } =>
                    s.push_str(&format!("start {}", name)),
                EventKind::Argument(v)    => s.push_str(&format!("arg {}", v)),
                EventKind::Property(k, v) => s.push_str(&format!("prop {}={}", k, v)),
            }
            let finished = matches!(event.kind, EventKind::Eof | EventKind::ParseError(_));
            out.push(s);
            if finished {
                break;
            }
        }
        out
    }

    fn events(doc: &str) -> Vec<String> {
        run(doc, ParseOptions::default())
    }

    fn events_v(doc: &str, version: VersionSelect) -> Vec<String> {
        run(doc, ParseOptions { version, emit_comments: false })
    }

    fn events_c(doc: &str) -> Vec<String> {
        run(doc, ParseOptions { version: VersionSelect::Detect, emit_comments: true })
    }

    #[test]
    fn empty_document() {
        assert_eq!( events(""),     vec!["eof"] );
        assert_eq!( events("\n\n"), vec!["eof"] );
    }

    #[test]
    fn bare_node() {
        assert_eq!( events("node"),   vec!["start node", "end", "eof"] );
        assert_eq!( events("node\n"), vec!["start node", "end", "eof"] );
        assert_eq!( events("node;"),  vec!["start node", "end", "eof"] );
    }

    #[test]
    fn node_with_property_and_argument() {
        assert_eq!(
            events("node1 key=0x123 \"gar\u{E7}on\" ;"),
            vec![
                "start node1",
                "prop key=291",
                "arg \"gar\u{E7}on\"",
                "end",
                "eof",
            ]
        );
    }

    #[test]
    fn line_continuation() {
        // the comment rides on the continuation line; its newline is the
        // one the backslash cancels
        let doc = "node2 \\ // inline\n  \"abc\"\n";

        assert_eq!(
            events(doc),
            vec!["start node2", "arg \"abc\"", "end", "eof"]
        );
        assert_eq!(
            events_c(doc),
            vec!["start node2", "comment \"// inline\"", "arg \"abc\"", "end", "eof"]
        );
    }

    #[test]
    fn plain_line_continuation() {
        assert_eq!(
            events("node2 \\\n  \"abc\"\n"),
            vec!["start node2", "arg \"abc\"", "end", "eof"]
        );
    }

    #[test]
    fn line_continuation_errors() {
        assert_eq!( events("a \\ b"),  vec!["start a", "error: illegal token after line continuation"] );
        assert_eq!( events("a \\ \\"), vec!["start a", "error: illegal token after line continuation"] );
    }

    #[test]
    fn type_annotations_on_nodes() {
        assert_eq!(
            events("(t)child1; child2"),
            vec!["start (t)child1", "end", "start child2", "end", "eof"]
        );
    }

    #[test]
    fn type_annotations_on_values() {
        assert_eq!(
            events("n (u8)1 k=(t)v"),
            vec!["start n", "arg (u8)1", "prop k=(t)\"v\"", "end", "eof"]
        );
    }

    #[test]
    fn second_type_annotation_rejected() {
        assert_eq!(
            events("n (a)(b)1"),
            vec!["start n", "error: unexpected second type annotation"]
        );
    }

    #[test]
    fn v2_keywords() {
        assert_eq!(
            events("n #null #true #false"),
            vec!["start n", "arg null", "arg true", "arg false", "end", "eof"]
        );
        assert_eq!(
            events("n #inf #-inf #nan"),
            vec!["start n", "arg inf", "arg -inf", "arg NaN", "end", "eof"]
        );
    }

    #[test]
    fn v1_keywords() {
        assert_eq!(
            events_v("n null true false", VersionSelect::V1),
            vec!["start n", "arg null", "arg true", "arg false", "end", "eof"]
        );
        // detect mode: bare keywords commit v1
        assert_eq!(
            events("n null"),
            vec!["start n", "arg null", "end", "eof"]
        );
    }

    #[test]
    fn keywords_clash_with_monoglot_modes() {
        assert_eq!(
            events_v("n true", VersionSelect::V2),
            vec!["start n", "error: bare keywords are not allowed in KDL v2"]
        );
        assert_eq!(
            events_v("n #true", VersionSelect::V1),
            vec!["start n", "error: '#' keywords are not allowed in KDL v1"]
        );
    }

    #[test]
    fn mixed_version_commitments_fail() {
        assert_eq!(
            events("n #true r#\"x\"#"),
            vec!["start n", "arg true", "error: 'r' raw strings are not allowed in KDL v2"]
        );
        assert_eq!(
            events("n null #true"),
            vec!["start n", "arg null", "error: '#' keywords are not allowed in KDL v1"]
        );
    }

    #[test]
    fn raw_strings() {
        assert_eq!(
            events("s #\"abc\"#"),
            vec!["start s", "arg \"abc\"", "end", "eof"]
        );
        assert_eq!(
            events("s r#\"a\"#"),
            vec!["start s", "arg \"a\"", "end", "eof"]
        );
    }

    #[test]
    fn raw_string_commit_switches_character_set() {
        // after the v1 commitment, v2-only identifier characters fail
        assert_eq!(
            events("n r#\"x\"# ; a<b"),
            vec!["start n", "arg \"x\"", "end", "error: unexpected character"]
        );
    }

    #[test]
    fn bare_identifier_arguments() {
        // detect mode commits v2
        assert_eq!( events("n foo"), vec!["start n", "arg \"foo\"", "end", "eof"] );
        // v1 rejects
        assert_eq!(
            events_v("n foo", VersionSelect::V1),
            vec!["start n", "error: bare identifier not allowed here"]
        );
        // and a later v1-only construct clashes
        assert_eq!(
            events("n foo null"),
            vec!["start n", "arg \"foo\"", "error: bare keywords are not allowed in KDL v2"]
        );
    }

    #[test]
    fn quoted_arguments_do_not_commit() {
        assert_eq!(
            events("n \"a\" r#\"b\"#"),
            vec!["start n", "arg \"a\"", "arg \"b\"", "end", "eof"]
        );
    }

    #[test]
    fn property_with_spaces_around_equals() {
        // v2 allows whitespace on both sides of '='
        assert_eq!(
            events("n k = 1"),
            vec!["start n", "prop k=1", "end", "eof"]
        );
        assert_eq!(
            events_v("n k = 1", VersionSelect::V1),
            vec!["start n", "error: whitespace before '=' is not allowed in KDL v1"]
        );
        assert_eq!(
            events_v("n k= 1", VersionSelect::V1),
            vec!["start n", "error: whitespace not allowed here in KDL v1"]
        );
    }

    #[test]
    fn quoted_property_keys() {
        assert_eq!(
            events("n \"a key\"=1"),
            vec!["start n", "prop a key=1", "end", "eof"]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            events("n 0x123 0o17 0b101 -0x10 1_000 +3"),
            vec!["start n", "arg 291", "arg 15", "arg 5", "arg -16", "arg 1000", "arg 3", "end", "eof"]
        );
    }

    #[test]
    fn floats() {
        assert_eq!(
            events("n 1.5 1e3 -2.5e-2"),
            vec!["start n", "arg 1.5", "arg 1000", "arg -0.025", "end", "eof"]
        );
    }

    #[test]
    fn malformed_numbers() {
        assert_eq!( events("n 0x_1"),  vec!["start n", "error: malformed number"] );
        assert_eq!( events("n 1._5"),  vec!["start n", "error: malformed number"] );
        assert_eq!( events("n 1x"),    vec!["start n", "error: malformed number"] );
    }

    #[test]
    fn big_integer_becomes_string_encoded() {
        let mut parser = Parser::new(b"n 36_893_488_147_419_103_232", ParseOptions::default());

        assert!( matches!(parser.next_event().kind, EventKind::StartNode { name: "n", .. }) );
        match parser.next_event().kind {
            EventKind::Argument(v) => assert_eq!(
                v.kind,
                ValueKind::Number(Number::StringEncoded("36893488147419103232"))
            ),
            other => panic!("expected argument, got {:?}", other),
        }
    }

    #[test]
    fn big_negative_integer_keeps_sign() {
        let mut parser = Parser::new(b"n -0x1_0000_0000_0000_0000", ParseOptions::default());

        parser.next_event();
        match parser.next_event().kind {
            EventKind::Argument(v) => assert_eq!(
                v.kind,
                ValueKind::Number(Number::StringEncoded("-18446744073709551616"))
            ),
            other => panic!("expected argument, got {:?}", other),
        }
    }

    #[test]
    fn i64_min_magnitude_is_string_encoded() {
        // 2^63 has the top bit set, so even negated it stays textual
        let mut parser = Parser::new(b"n -9223372036854775808", ParseOptions::default());

        parser.next_event();
        match parser.next_event().kind {
            EventKind::Argument(v) => assert_eq!(
                v.kind,
                ValueKind::Number(Number::StringEncoded("-9223372036854775808"))
            ),
            other => panic!("expected argument, got {:?}", other),
        }
    }

    #[test]
    fn too_precise_float_is_canonicalized() {
        let mut parser = Parser::new(b"n +1.234_567_890_123_456_789e10", ParseOptions::default());

        parser.next_event();
        match parser.next_event().kind {
            EventKind::Argument(v) => assert_eq!(
                v.kind,
                ValueKind::Number(Number::StringEncoded("1.234567890123456789e10"))
            ),
            other => panic!("expected argument, got {:?}", other),
        }
    }

    #[test]
    fn huge_exponent_is_string_encoded() {
        let mut parser = Parser::new(b"n 1e999", ParseOptions::default());

        parser.next_event();
        match parser.next_event().kind {
            EventKind::Argument(v) => assert_eq!(
                v.kind,
                ValueKind::Number(Number::StringEncoded("1e999"))
            ),
            other => panic!("expected argument, got {:?}", other),
        }
    }

    #[test]
    fn children_blocks() {
        assert_eq!(
            events("a {b {c}}"),
            vec!["start a", "start b", "start c", "end", "end", "end", "eof"]
        );
        assert_eq!(
            events("a {b; c}\nd"),
            vec!["start a", "start b", "end", "start c", "end", "end", "start d", "end", "eof"]
        );
    }

    #[test]
    fn tokens_after_children_block_rejected() {
        assert_eq!(
            events("n {a} x"),
            vec!["start n", "start a", "end", "error: unexpected token after children block"]
        );
    }

    #[test]
    fn unbalanced_braces() {
        assert_eq!( events("}"),       vec!["error: unexpected '}'"] );
        assert_eq!( events("n {a"),    vec!["start n", "start a", "end", "error: unexpected end of data"] );
    }

    #[test]
    fn slashdash_node() {
        let doc = "/- node { a; b } node2";

        assert_eq!( events(doc), vec!["start node2", "end", "eof"] );
        assert_eq!(
            events_c(doc),
            vec![
                "#  start node",
                "#  start a",
                "#  end",
                "#  start b",
                "#  end",
                "#  end",
                "start node2",
                "end",
                "eof",
            ]
        );
    }

    #[test]
    fn slashdash_argument_and_property() {
        assert_eq!(
            events("n /- 1 2"),
            vec!["start n", "arg 2", "end", "eof"]
        );
        assert_eq!(
            events("n /- k=1 m=2"),
            vec!["start n", "prop m=2", "end", "eof"]
        );
    }

    #[test]
    fn slashdash_across_newline() {
        assert_eq!(
            events("/-\nnode\nnode2"),
            vec!["start node2", "end", "eof"]
        );
    }

    #[test]
    fn slashdash_children_block() {
        // the block vanishes, the node survives and may go on
        assert_eq!(
            events("n /-{ a; b } 1"),
            vec!["start n", "arg 1", "end", "eof"]
        );
        // a slashdashed block may follow a real one
        assert_eq!(
            events("n {a} /-{b}"),
            vec!["start n", "start a", "end", "end", "eof"]
        );
    }

    #[test]
    fn dangling_slashdash() {
        assert_eq!( events("/-"),   vec!["error: dangling slashdash (/-)"] );
        assert_eq!( events("n /-"), vec!["start n", "error: dangling slashdash (/-)"] );
        assert_eq!( events("n /-;"),vec!["start n", "error: dangling slashdash (/-)"] );
    }

    #[test]
    fn comment_events() {
        assert_eq!(
            events_c("n 1 // trailing\n"),
            vec!["start n", "arg 1", "comment \"// trailing\"", "end", "eof"]
        );
        assert_eq!(
            events_c("/* doc */ n"),
            vec!["comment \"/* doc */\"", "start n", "end", "eof"]
        );
    }

    #[test]
    fn multi_line_string_argument() {
        let doc = "n \"\"\"\n  hello\n  world\n  \"\"\"";

        assert_eq!(
            events(doc),
            vec!["start n", "arg \"hello\\nworld\"", "end", "eof"]
        );
    }

    #[test]
    fn multi_line_string_bad_indent() {
        let doc = "n \"\"\"\n    a\n  b\n  \"\"\"";

        assert_eq!(
            events(doc),
            vec!["start n", "error: malformed multi-line string"]
        );
    }

    #[test]
    fn multi_line_string_clashes_with_v1() {
        let doc = "n \"\"\"\n  a\n  \"\"\"";

        assert_eq!(
            events_v(doc, VersionSelect::V1),
            vec!["start n", "error: multi-line strings are not allowed in KDL v1"]
        );
    }

    #[test]
    fn multiple_newlines_are_one_separator() {
        assert_eq!(
            events("a\r\n\r\n\nb"),
            vec!["start a", "end", "start b", "end", "eof"]
        );
    }

    #[test]
    fn node_names_must_be_strings() {
        assert_eq!( events("5 x"),    vec!["error: expected identifier or string"] );
        assert_eq!( events("#true"),  vec!["error: expected identifier or string"] );
    }

    #[test]
    fn almost_a_number() {
        assert_eq!( events("n .5"), vec!["start n", "error: word is almost a number"] );
        // v1 reads .5 as an identifier, legal as a node name
        assert_eq!(
            events_v(".5 1", VersionSelect::V1),
            vec!["start .5", "arg 1", "end", "eof"]
        );
    }

    #[test]
    fn reserved_identifiers_in_v2() {
        assert_eq!(
            events_v("inf", VersionSelect::V2),
            vec!["error: reserved identifier"]
        );
        assert_eq!(
            events_v("inf 1", VersionSelect::V1),
            vec!["start inf", "arg 1", "end", "eof"]
        );
    }

    #[test]
    fn streaming_parse() {
        let doc = "node1 key=0x123 \"gar\u{E7}on\" ;".as_bytes();
        let mut at = 0;
        let parser_read = move |buf: &mut [u8]| {
            if at == doc.len() {
                0
            } else {
                // three bytes at a time
                let n = (doc.len() - at).min(3);
                buf[..n].copy_from_slice(&doc[at..at + n]);
                at += n;
                n
            }
        };

        let mut parser = Parser::from_read_fn(parser_read, ParseOptions::default());
        let mut out    = Vec::new();
        loop {
            let event = parser.next_event();
            out.push(format!("{:?}", event.kind));
            if matches!(event.kind, EventKind::Eof | EventKind::ParseError(_)) {
                break;
            }
        }

        assert_eq!( out.len(), 5 ); // start, prop, arg, end, eof
        assert!( out[1].contains("291") );
        assert!( out[2].contains("gar\u{E7}on") );
    }

    #[test]
    fn error_then_eof() {
        let mut parser = Parser::new(b"}", ParseOptions::default());

        assert!( matches!(parser.next_event().kind, EventKind::ParseError(_)) );
        assert!( matches!(parser.next_event().kind, EventKind::Eof) );
        assert!( matches!(parser.next_event().kind, EventKind::Eof) );
    }
}
