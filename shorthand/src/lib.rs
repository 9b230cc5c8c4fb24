// shorthand. Grammar-driven parser combinators.
// Copyright (c) 2024 shorthand project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! # shorthand
//!
//! A small, self-hosting parser-combinator engine with a declarative grammar
//! front-end. A [`Grammar`] maps rule names to bodies written in a compact
//! shorthand; requesting a rule's [`Parser`] compiles the body down to the
//! seven primitive combinators, and applying the parser to an input yields a
//! concrete syntax tree ([`Node`]) labeled by rule and combinator names.
//!
//! ## The shorthand
//!
//! - `'text'` matches the quoted characters exactly (`''` matches nothing,
//!   successfully)
//! - `*'xy'` matches any single code point except `x` and `y`
//! - a lowercase identifier references another rule
//! - `a & b & c` matches a sequence, `a | b | c` the first viable
//!   alternative; one operator per expression, mixing needs `{…}` groups
//! - `[a]` matches zero or more times, `(a)` zero or one time
//! - whitespace is insignificant
//!
//! ## Example
//!
//! ```
//! use shorthand::grammar;
//!
//! let math = grammar! {
//!     "digit" => " '0'|'1'|'2'|'3'|'4'|'5'|'6'|'7'|'8'|'9' ",
//!     "digits" => " digit & [digit] ",
//! };
//!
//! let digits = math.parser("digits").unwrap();
//!
//! assert!(digits.is_valid("1729"));
//! assert!(!digits.is_valid("17a9"));
//!
//! let tree = digits.parse("29").unwrap();
//! assert_eq!(
//!     tree.to_string(),
//!     "digits(digit(Is<2>), Many(digit(Is<9>)))"
//! );
//! ```
//!
//! Rules may reference themselves and each other freely (left recursion
//! excepted): compiled parsers are cached per grammar, and a rule that is
//! still being compiled is referenced through an indirection resolved at
//! parse time.
//!
//! Parsing is single-threaded and synchronous. A grammar and its cache are
//! meant to be used from one thread; compile the rules you need up front if
//! you want to treat a grammar as read-only afterwards.

#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

mod combinator;
mod compile;
mod cursor;
mod error;
mod grammar;
mod macros;
mod meta;
mod node;

pub use combinator::Parser;
pub use cursor::Cursor;
pub use error::Error;
pub use grammar::{strip_whitespace, Grammar};
pub use node::Node;
