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

//! Command-line driver: pretty-print a KDL document, or dump its tokens
//! or parse events.

use std::env;
use std::fs::File;
use std::io::{stdin, stdout, Read};
use std::process::exit;

use colored::Colorize;

use rkdl::{
    Emitter, EmitterOptions, EventKind, ParseOptions, Parser, Tokenizer,
};

const USAGE: &str = "\
usage: rkdl [-h] [-t | -e] [FILE]

Pretty-prints a KDL document (default), or dumps its tokens or events.

  -h, --help     show this help
  -t, --tokens   print the token stream
  -e, --events   print the parse events
  FILE           input file; '-' or absent means stdin
";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Cat,
    Tokens,
    Events,
}

fn main() {
    let mut mode = Mode::Cat;
    let mut path: Option<String> = None;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help"   => { print!("{}", USAGE); return; }
            "-t" | "--tokens" => mode = Mode::Tokens,
            "-e" | "--events" => mode = Mode::Events,
            "-"               => path = None,
            _ if arg.starts_with('-') => fail(&format!("unknown option '{}'", arg)),
            _                 => path = Some(arg),
        }
    }

    let mut content = String::new();
    let read = match &path {
        None       => stdin().read_to_string(&mut content),
        Some(path) => File::open(path).and_then(|mut file| file.read_to_string(&mut content)),
    };
    if let Err(e) = read {
        fail(&format!("cannot read {}: {}", path.as_deref().unwrap_or("stdin"), e));
    }

    let ok = match mode {
        Mode::Cat    => cat(&content),
        Mode::Tokens => print_tokens(&content),
        Mode::Events => print_events(&content),
    };
    if !ok {
        exit(1);
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{} {}", "error:".red().bold(), message);
    exit(2)
}

/// Parses the document and pretty-prints it back out.
fn cat(content: &str) -> bool {
    let mut parser  = Parser::new(content.as_bytes(), ParseOptions::default());
    let mut emitter = Emitter::with_writer(stdout(), EmitterOptions::default());

    // for each open node: whether its children block has been opened
    let mut children: Vec<bool> = Vec::new();

    loop {
        let event = parser.next_event();
        let result = match event.kind {
            EventKind::Eof => {
                return emitter.emit_end().is_ok();
            }
            EventKind::ParseError(message) => {
                let _ = emitter.emit_end();
                eprintln!("{} {}", "parse error:".red().bold(), message);
                return false;
            }
            EventKind::StartNode { name, type_annotation } => {
                let opened = match children.last_mut() {
                    Some(started) if !*started => {
                        *started = true;
                        emitter.start_emitting_children()
                    }
                    _ => Ok(()),
                };
                children.push(false);
                opened.and_then(|_| match type_annotation {
                    Some(ty) => emitter.emit_node_with_type(ty, name),
                    None     => emitter.emit_node(name),
                })
            }
            EventKind::EndNode => match children.pop() {
                Some(true) => emitter.finish_emitting_children(),
                _          => Ok(()),
            },
            EventKind::Argument(ref value)        => emitter.emit_arg(value),
            EventKind::Property(name, ref value)  => emitter.emit_property(name, value),
            EventKind::Comment(_)                 => Ok(()),
        };
        if let Err(e) = result {
            eprintln!("{} {}", "error:".red().bold(), e);
            return false;
        }
    }
}

/// Prints the token stream as a table.
fn print_tokens(content: &str) -> bool {
    let mut tokenizer = Tokenizer::new(content.as_bytes());

    //        0         1         2         3         4         5
    //        0 2 4 6 8 0 2 4 6 8 0 2 4 6 8 0 2 4 6 8 0 2 4 6 8 0
    println!("╭────────────────────────┬──────────────────────────────╮");
    println!("│ TYPE                   │ TEXT                         │");
    println!("╞════════════════════════╪══════════════════════════════╡");

    loop {
        match tokenizer.pop_token() {
            Ok(Some(token)) => {
                println!(
                    "│ {:<22.22} │ {:<28.28} │",
                    token.kind.to_string(),
                    format!("{:?}", token.text),
                );
            }
            Ok(None) => break,
            Err(e) => {
                println!("╰────────────────────────┴──────────────────────────────╯");
                eprintln!("{} {}", "lexical error:".red().bold(), e);
                return false;
            }
        }
    }
    println!("╰────────────────────────┴──────────────────────────────╯");
    true
}

/// Prints the parse events, comments included.
fn print_events(content: &str) -> bool {
    let opt = ParseOptions { emit_comments: true, ..Default::default() };
    let mut parser = Parser::new(content.as_bytes(), opt);

    loop {
        let event  = parser.next_event();
        let elided = if event.commented { "/- " } else { "" };
        match event.kind {
            EventKind::Eof => {
                println!("eof");
                return true;
            }
            EventKind::ParseError(message) => {
                eprintln!("{} {}", "parse error:".red().bold(), message);
                return false;
            }
            EventKind::StartNode { name, type_annotation: Some(ty) } => {
                println!("{}start-node ({}){}", elided, ty, name);
            }
            EventKind::StartNode { name, .. } => {
                println!("{}start-node {}", elided, name);
            }
            EventKind::EndNode => {
                println!("{}end-node", elided);
            }
            EventKind::Argument(value) => {
                println!("{}  argument {}", elided, value);
            }
            EventKind::Property(name, value) => {
                println!("{}  property {}={}", elided, name, value);
            }
            EventKind::Comment(text) => {
                println!("{}comment {:?}", elided, text);
            }
        }
    }
}
