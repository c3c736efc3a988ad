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

//! Pretty-printing emitter.
//!
//! An [`Emitter`] accepts an imperative sequence of node / argument /
//! property / children calls and produces properly indented, valid KDL,
//! either into an internal buffer or through a [`Write`] stream.  The
//! output re-parses, in the emitter's version, to the same structural
//! event sequence that produced it.

mod float;

use std::io::{self, Write};

use thiserror::Error;

use crate::chars;
use crate::text::{self, EscapeMode};
use crate::value::{Number, Value, ValueKind};
use crate::Version;

// ----------------------------------------------------------------------------

/// How identifiers are written.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IdentifierMode {
    /// Write identifiers bare whenever the grammar allows it.
    PreferBare,

    /// Quote every identifier.
    QuoteAll,

    /// Write identifiers bare only if they are pure ASCII.
    AsciiOnly,
}

impl Default for IdentifierMode {
    #[inline]
    fn default() -> Self {
        IdentifierMode::PreferBare
    }
}

/// How floats are written.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct FloatMode {
    /// Always write at least `.0`.
    pub always_write_decimal_point: bool,

    /// Write at least one of a decimal point or an exponent, so the value
    /// re-reads as a float.
    pub always_write_decimal_point_or_exponent: bool,

    /// Write `E` rather than `e`.
    pub capital_e: bool,

    /// Write a `+` before a non-negative exponent.
    pub exponent_plus: bool,

    /// Write a `+` before a non-negative value.
    pub plus: bool,

    /// Minimum order of magnitude at which scientific notation is used.
    pub min_exponent: i32,
}

impl Default for FloatMode {
    fn default() -> Self {
        Self {
            always_write_decimal_point: false,
            always_write_decimal_point_or_exponent: true,
            capital_e: false,
            exponent_plus: false,
            plus: false,
            min_exponent: 4,
        }
    }
}

/// Emitter options.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct EmitterOptions {
    /// Count of spaces per indentation level.
    pub indent: usize,

    /// Which characters to escape in strings.
    pub escape_mode: EscapeMode,

    /// How identifiers are written.
    pub identifier_mode: IdentifierMode,

    /// How floats are written.
    pub float_mode: FloatMode,

    /// Which KDL version to write.  Decides keyword spellings
    /// (`null` vs `#null`) and what may be a bare identifier.
    pub version: Version,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            indent:          4,
            escape_mode:     EscapeMode::DEFAULT,
            identifier_mode: IdentifierMode::default(),
            float_mode:      FloatMode::default(),
            version:         Version::V1,
        }
    }
}

/// Emitter errors.
#[derive(Error, Debug)]
pub enum EmitError {
    /// The write callback failed or came up short.
    #[error("write error: {0}")]
    Write(#[from] io::Error),

    /// `finish_emitting_children` with no children block open.
    #[error("unbalanced children block")]
    Unbalanced,

    /// KDL v1 has no spelling for an infinite or NaN float.
    #[error("non-finite float cannot be written in KDL v1")]
    NonFinite,
}

// ----------------------------------------------------------------------------

enum Output<'a> {
    Buffer(String),
    Stream(Box<dyn Write + 'a>),
}

/// A KDL pretty-printer.
pub struct Emitter<'a> {
    opt: EmitterOptions,
    depth: usize,
    start_of_line: bool,
    out: Output<'a>,
}

impl<'a> Emitter<'a> {
    /// Creates an emitter that collects output in an internal buffer.
    pub fn new(opt: EmitterOptions) -> Self {
        Self {
            opt,
            depth: 0,
            start_of_line: true,
            out: Output::Buffer(String::with_capacity(4096)),
        }
    }

    /// Creates an emitter that writes through the given stream.
    pub fn with_writer(writer: impl Write + 'a, opt: EmitterOptions) -> Self {
        Self {
            opt,
            depth: 0,
            start_of_line: true,
            out: Output::Stream(Box::new(writer)),
        }
    }

    /// Returns the buffered output, if this emitter buffers.
    ///
    /// The slice is valid until the next mutating call.
    pub fn buffer(&self) -> Option<&str> {
        match &self.out {
            Output::Buffer(s) => Some(s),
            Output::Stream(_) => None,
        }
    }

    /// Consumes the emitter and returns the buffered output, if any.
    pub fn into_string(self) -> Option<String> {
        match self.out {
            Output::Buffer(s) => Some(s),
            Output::Stream(_) => None,
        }
    }

    // ------------------------------------------------------------------------

    /// Begins a node.
    pub fn emit_node(&mut self, name: &str) -> Result<(), EmitError> {
        self.node_preamble()?;
        self.emit_identifier(name)
    }

    /// Begins a node with a type annotation.
    pub fn emit_node_with_type(&mut self, ty: &str, name: &str) -> Result<(), EmitError> {
        self.node_preamble()?;
        self.put("(")?;
        self.emit_identifier(ty)?;
        self.put(")")?;
        self.emit_identifier(name)
    }

    /// Emits an argument of the current node.
    pub fn emit_arg(&mut self, value: &Value) -> Result<(), EmitError> {
        self.put(" ")?;
        self.emit_value(value)
    }

    /// Emits a property of the current node.
    pub fn emit_property(&mut self, name: &str, value: &Value) -> Result<(), EmitError> {
        self.put(" ")?;
        self.emit_identifier(name)?;
        self.put("=")?;
        self.emit_value(value)
    }

    /// Opens the current node's children block.
    pub fn start_emitting_children(&mut self) -> Result<(), EmitError> {
        self.put(" {\n")?;
        self.depth += 1;
        self.start_of_line = true;
        Ok(())
    }

    /// Closes the innermost children block.
    pub fn finish_emitting_children(&mut self) -> Result<(), EmitError> {
        if self.depth == 0 {
            return Err(EmitError::Unbalanced);
        }
        self.depth -= 1;
        self.node_preamble()?;
        self.start_of_line = true;
        self.put("}\n")
    }

    /// Closes any remaining children blocks and ensures a final newline.
    pub fn emit_end(&mut self) -> Result<(), EmitError> {
        while self.depth != 0 {
            self.finish_emitting_children()?;
        }
        if !self.start_of_line {
            self.put("\n")?;
            self.start_of_line = true;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------

    fn node_preamble(&mut self) -> Result<(), EmitError> {
        if !self.start_of_line {
            self.put("\n")?;
        }
        for _ in 0..self.depth * self.opt.indent {
            self.put(" ")?;
        }
        self.start_of_line = false;
        Ok(())
    }

    fn emit_value(&mut self, value: &Value) -> Result<(), EmitError> {
        if let Some(ty) = value.type_annotation {
            self.put("(")?;
            self.emit_identifier(ty)?;
            self.put(")")?;
        }
        match value.kind {
            ValueKind::Null => self.put(match self.opt.version {
                Version::V1 => "null",
                Version::V2 => "#null",
            }),
            ValueKind::Bool(b) => self.put(match (self.opt.version, b) {
                (Version::V1, true)  => "true",
                (Version::V1, false) => "false",
                (Version::V2, true)  => "#true",
                (Version::V2, false) => "#false",
            }),
            ValueKind::Number(ref n) => self.emit_number(n),
            ValueKind::String(s)     => self.emit_quoted(s),
        }
    }

    fn emit_number(&mut self, number: &Number) -> Result<(), EmitError> {
        match *number {
            Number::Integer(n) => self.put(&n.to_string()),
            Number::StringEncoded(s) => self.put(s),
            Number::Float(f) => {
                if f.is_finite() {
                    let text = float::render(f, &self.opt.float_mode);
                    self.put(&text)
                } else if self.opt.version == Version::V1 {
                    Err(EmitError::NonFinite)
                } else if f.is_nan() {
                    self.put("#nan")
                } else if f > 0.0 {
                    self.put("#inf")
                } else {
                    self.put("#-inf")
                }
            }
        }
    }

    fn emit_identifier(&mut self, name: &str) -> Result<(), EmitError> {
        if self.is_bare(name) {
            self.put(name)
        } else {
            self.emit_quoted(name)
        }
    }

    fn emit_quoted(&mut self, s: &str) -> Result<(), EmitError> {
        let escaped = text::escape(self.opt.version, s, self.opt.escape_mode);
        self.put("\"")?;
        self.put(&escaped)?;
        self.put("\"")
    }

    /// Whether `name` may be written without quotes: the identifier
    /// predicate must hold, and the text must not re-read as a number or
    /// keyword.
    fn is_bare(&self, name: &str) -> bool {
        if self.opt.identifier_mode == IdentifierMode::QuoteAll || name.is_empty() {
            return false;
        }
        if matches!(name, "null" | "true" | "false" | "inf" | "-inf" | "nan") {
            return false;
        }

        // a leading digit (after an optional sign) makes it a number
        let unsigned = name.strip_prefix(['+', '-']).unwrap_or(name);
        match unsigned.as_bytes().first() {
            Some(b) if b.is_ascii_digit() => return false,
            Some(b'.') if unsigned.as_bytes().get(1).is_some_and(|b| b.is_ascii_digit()) => {
                return false
            }
            _ => (),
        }

        let ascii_only = self.opt.identifier_mode == IdentifierMode::AsciiOnly;
        let version    = self.opt.version;

        let mut first = true;
        for c in name.chars() {
            let n = c as u32;
            let ok = if first {
                chars::is_identifier_start(version, n)
            } else {
                chars::is_identifier(version, n)
            };
            if !ok || (ascii_only && n >= 0x7F) {
                return false;
            }
            first = false;
        }
        true
    }

    fn put(&mut self, s: &str) -> Result<(), EmitError> {
        match &mut self.out {
            Output::Buffer(buffer) => {
                buffer.push_str(s);
                Ok(())
            }
            Output::Stream(writer) => Ok(writer.write_all(s.as_bytes())?),
        }
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parser::{EventKind, ParseOptions, Parser};
    use crate::value::{Number, Value, ValueKind};

    fn arg(kind: ValueKind) -> Value {
        Value::new(kind)
    }

    #[test]
    fn basic_document() {
        let mut emitter = Emitter::new(EmitterOptions::default());

        emitter.emit_node("n").unwrap();
        emitter.emit_arg(&arg(ValueKind::Number(Number::Integer(1)))).unwrap();
        emitter.emit_property("p", &arg(ValueKind::String("x"))).unwrap();
        emitter.start_emitting_children().unwrap();
        emitter.emit_node("c").unwrap();
        emitter.finish_emitting_children().unwrap();
        emitter.emit_end().unwrap();

        assert_eq!(
            emitter.buffer().unwrap(),
            "n 1 p=\"x\" {\n    c\n}\n"
        );
    }

    #[test]
    fn emit_end_closes_open_blocks() {
        let mut emitter = Emitter::new(EmitterOptions::default());

        emitter.emit_node("a").unwrap();
        emitter.start_emitting_children().unwrap();
        emitter.emit_node("b").unwrap();
        emitter.start_emitting_children().unwrap();
        emitter.emit_node("c").unwrap();
        emitter.emit_end().unwrap();

        assert_eq!(
            emitter.buffer().unwrap(),
            "a {\n    b {\n        c\n    }\n}\n"
        );
    }

    #[test]
    fn unbalanced_finish_fails() {
        let mut emitter = Emitter::new(EmitterOptions::default());

        assert!( matches!(emitter.finish_emitting_children(), Err(EmitError::Unbalanced)) );
    }

    #[test]
    fn sibling_nodes() {
        let mut emitter = Emitter::new(EmitterOptions::default());

        emitter.emit_node("a").unwrap();
        emitter.emit_node("b").unwrap();
        emitter.emit_end().unwrap();

        assert_eq!( emitter.buffer().unwrap(), "a\nb\n" );
    }

    #[test]
    fn values() {
        let mut emitter = Emitter::new(EmitterOptions::default());

        emitter.emit_node("n").unwrap();
        emitter.emit_arg(&arg(ValueKind::Null)).unwrap();
        emitter.emit_arg(&arg(ValueKind::Bool(true))).unwrap();
        emitter.emit_arg(&arg(ValueKind::Bool(false))).unwrap();
        emitter.emit_arg(&arg(ValueKind::Number(Number::Float(1.5)))).unwrap();
        emitter.emit_arg(&arg(ValueKind::Number(Number::StringEncoded("36893488147419103232")))).unwrap();
        emitter.emit_end().unwrap();

        assert_eq!(
            emitter.buffer().unwrap(),
            "n null true false 1.5 36893488147419103232\n"
        );
    }

    #[test]
    fn v2_keywords() {
        let opt = EmitterOptions { version: Version::V2, ..Default::default() };
        let mut emitter = Emitter::new(opt);

        emitter.emit_node("n").unwrap();
        emitter.emit_arg(&arg(ValueKind::Null)).unwrap();
        emitter.emit_arg(&arg(ValueKind::Bool(true))).unwrap();
        emitter.emit_arg(&arg(ValueKind::Number(Number::Float(f64::INFINITY)))).unwrap();
        emitter.emit_arg(&arg(ValueKind::Number(Number::Float(f64::NEG_INFINITY)))).unwrap();
        emitter.emit_arg(&arg(ValueKind::Number(Number::Float(f64::NAN)))).unwrap();
        emitter.emit_end().unwrap();

        assert_eq!(
            emitter.buffer().unwrap(),
            "n #null #true #inf #-inf #nan\n"
        );
    }

    #[test]
    fn non_finite_floats_fail_in_v1() {
        let mut emitter = Emitter::new(EmitterOptions::default());

        emitter.emit_node("n").unwrap();
        let result = emitter.emit_arg(&arg(ValueKind::Number(Number::Float(f64::NAN))));

        assert!( matches!(result, Err(EmitError::NonFinite)) );
    }

    #[test]
    fn type_annotations() {
        let mut emitter = Emitter::new(EmitterOptions::default());

        emitter.emit_node_with_type("t", "n").unwrap();
        let value = Value {
            type_annotation: Some("u8"),
            kind: ValueKind::Number(Number::Integer(7)),
        };
        emitter.emit_arg(&value).unwrap();
        emitter.emit_end().unwrap();

        assert_eq!( emitter.buffer().unwrap(), "(t)n (u8)7\n" );
    }

    #[test]
    fn identifier_quoting() {
        let mut emitter = Emitter::new(EmitterOptions::default());

        emitter.emit_node("plain").unwrap();
        emitter.emit_node("").unwrap();
        emitter.emit_node("two words").unwrap();
        emitter.emit_node("true").unwrap();
        emitter.emit_node("5cats").unwrap();
        emitter.emit_node("-4").unwrap();
        emitter.emit_node(".5x").unwrap();
        emitter.emit_node("say \"hi\"").unwrap();
        emitter.emit_end().unwrap();

        assert_eq!(
            emitter.buffer().unwrap(),
            "plain\n\"\"\n\"two words\"\n\"true\"\n\"5cats\"\n\"-4\"\n\".5x\"\n\"say \\\"hi\\\"\"\n"
        );
    }

    #[test]
    fn quote_all_mode() {
        let opt = EmitterOptions {
            identifier_mode: IdentifierMode::QuoteAll,
            ..Default::default()
        };
        let mut emitter = Emitter::new(opt);

        emitter.emit_node("plain").unwrap();
        emitter.emit_end().unwrap();

        assert_eq!( emitter.buffer().unwrap(), "\"plain\"\n" );
    }

    #[test]
    fn ascii_only_mode() {
        let opt = EmitterOptions {
            identifier_mode: IdentifierMode::AsciiOnly,
            escape_mode:     EscapeMode::ASCII_MODE,
            ..Default::default()
        };
        let mut emitter = Emitter::new(opt);

        emitter.emit_node("gar\u{E7}on").unwrap();
        emitter.emit_end().unwrap();

        assert_eq!( emitter.buffer().unwrap(), "\"gar\\u{e7}on\"\n" );
    }

    #[test]
    fn indent_width() {
        let opt = EmitterOptions { indent: 2, ..Default::default() };
        let mut emitter = Emitter::new(opt);

        emitter.emit_node("a").unwrap();
        emitter.start_emitting_children().unwrap();
        emitter.emit_node("b").unwrap();
        emitter.emit_end().unwrap();

        assert_eq!( emitter.buffer().unwrap(), "a {\n  b\n}\n" );
    }

    #[test]
    fn stream_output() {
        let mut bytes = Vec::new();
        {
            let mut emitter = Emitter::with_writer(&mut bytes, EmitterOptions::default());
            emitter.emit_node("n").unwrap();
            emitter.emit_arg(&arg(ValueKind::Number(Number::Integer(1)))).unwrap();
            emitter.emit_end().unwrap();
        }

        assert_eq!( bytes, b"n 1\n" );
    }

    /// The emitter's output re-parses to the event sequence that produced
    /// it.
    #[test]
    fn structural_round_trip() {
        let mut emitter = Emitter::new(EmitterOptions::default());

        emitter.emit_node("n").unwrap();
        emitter.emit_arg(&arg(ValueKind::Number(Number::Integer(1)))).unwrap();
        emitter.emit_property("p", &arg(ValueKind::String("x y"))).unwrap();
        emitter.start_emitting_children().unwrap();
        emitter.emit_node_with_type("t", "c").unwrap();
        emitter.emit_arg(&arg(ValueKind::Null)).unwrap();
        emitter.finish_emitting_children().unwrap();
        emitter.emit_node("m").unwrap();
        emitter.emit_end().unwrap();

        let doc = emitter.into_string().unwrap();
        let mut parser = Parser::new(doc.as_bytes(), ParseOptions::default());

        assert!( matches!(parser.next_event().kind, EventKind::StartNode { name: "n", type_annotation: None }) );
        match parser.next_event().kind {
            EventKind::Argument(v) => assert_eq!( v.kind, ValueKind::Number(Number::Integer(1)) ),
            other => panic!("unexpected event {:?}", other),
        }
        match parser.next_event().kind {
            EventKind::Property(k, v) => {
                assert_eq!( k, "p" );
                assert_eq!( v.kind, ValueKind::String("x y") );
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!( matches!(parser.next_event().kind, EventKind::StartNode { name: "c", type_annotation: Some("t") }) );
        match parser.next_event().kind {
            EventKind::Argument(v) => assert_eq!( v.kind, ValueKind::Null ),
            other => panic!("unexpected event {:?}", other),
        }
        assert!( matches!(parser.next_event().kind, EventKind::EndNode) );
        assert!( matches!(parser.next_event().kind, EventKind::EndNode) );
        assert!( matches!(parser.next_event().kind, EventKind::StartNode { name: "m", .. }) );
        assert!( matches!(parser.next_event().kind, EventKind::EndNode) );
        assert!( matches!(parser.next_event().kind, EventKind::Eof) );
    }
}
