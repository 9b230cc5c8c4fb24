// shorthand. Grammar-driven parser combinators.
// Copyright (c) 2024 shorthand project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use std::rc::Rc;

use crate::cursor::Cursor;
use crate::error::Error;
use crate::node::Node;

type Apply = dyn Fn(&mut Cursor<'_>, Option<&str>) -> Option<Node>;

/// A composable parser value.
///
/// Semantically a pure function from a [`Cursor`] to an optional [`Node`]: a
/// returned node means the parser matched and the cursor advanced past all
/// consumed bytes; `None` means no match and, by the atomicity contract, a
/// cursor left exactly where it was on entry. Parsers are reference-counted
/// closures, so cloning is cheap and compiled grammar rules share subparsers
/// freely.
///
/// Parsers are built from the seven primitive combinators below and labeled
/// through the optional name override of [`apply`](Parser::apply): without an
/// override a node carries its combinator's canonical name (`"Is"`,
/// `"Wildcard"`, `"Or"`, `"And"`, `"Many"`, `"Optional"`).
#[derive(Clone)]
pub struct Parser {
    apply: Rc<Apply>,
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser").finish_non_exhaustive()
    }
}

impl Parser {
    pub(crate) fn from_fn<F>(f: F) -> Parser
    where
        F: Fn(&mut Cursor<'_>, Option<&str>) -> Option<Node> + 'static,
    {
        Parser { apply: Rc::new(f) }
    }

    /// Applies the parser at the cursor's position.
    ///
    /// On a match the returned node is labeled `name` when given, and the
    /// cursor rests just past the consumed bytes. On a failure the cursor is
    /// unchanged.
    pub fn apply(&self, cursor: &mut Cursor<'_>, name: Option<&str>) -> Option<Node> {
        (self.apply)(cursor, name)
    }

    /// Matches `input` in full and returns its syntax tree.
    ///
    /// Fails unless the parser matches *and* consumes the entire input. The
    /// error carries the farthest byte offset reached, a reasonable proxy for
    /// where matching got stuck.
    ///
    /// # Examples
    ///
    /// ```
    /// # use shorthand::Parser;
    /// let ab = Parser::and(vec![Parser::is("a"), Parser::is("b")]);
    ///
    /// assert_eq!(ab.parse("ab").unwrap().to_string(), "And(Is<a>, Is<b>)");
    /// assert!(ab.parse("abc").is_err());
    /// ```
    pub fn parse(&self, input: &str) -> Result<Node, Error> {
        let mut cursor = Cursor::new(input);
        match self.apply(&mut cursor, None) {
            Some(node) if cursor.done() => Ok(node),
            _ => Err(Error::Unmatched {
                pos: cursor.farthest(),
            }),
        }
    }

    /// Returns `true` iff the parser matches `input` in full.
    ///
    /// # Examples
    ///
    /// ```
    /// # use shorthand::Parser;
    /// let many_a = Parser::many(Parser::is("a"));
    ///
    /// assert!(many_a.is_valid("aaa"));
    /// assert!(!many_a.is_valid("aab"));
    /// ```
    pub fn is_valid(&self, input: &str) -> bool {
        self.parse(input).is_ok()
    }

    /// Matches iff the next bytes equal `literal`, producing a leaf that
    /// holds it.
    ///
    /// The empty literal matches everywhere without advancing.
    ///
    /// # Examples
    ///
    /// ```
    /// # use shorthand::{Cursor, Parser};
    /// let mut cursor = Cursor::new("testing");
    /// let node = Parser::is("test").apply(&mut cursor, None).unwrap();
    ///
    /// assert_eq!(node.to_string(), "Is<test>");
    /// assert_eq!(cursor.pos(), 4);
    /// ```
    pub fn is(literal: impl Into<String>) -> Parser {
        let literal = literal.into();
        Parser::from_fn(move |cursor, name| {
            if cursor.peek(literal.len()) == literal.as_bytes() {
                cursor.advance(literal.len());
                Some(Node::leaf(name.unwrap_or("Is"), literal.clone()))
            } else {
                None
            }
        })
    }

    /// Matches any single code point not contained in `except`, producing a
    /// leaf that holds it.
    ///
    /// Fails at end-of-input. With an empty exception string every code point
    /// matches.
    ///
    /// # Examples
    ///
    /// ```
    /// # use shorthand::Parser;
    /// let not_quote = Parser::wildcard("'");
    ///
    /// assert!(not_quote.is_valid("a"));
    /// assert!(!not_quote.is_valid("'"));
    /// assert!(!not_quote.is_valid(""));
    /// ```
    pub fn wildcard(except: impl Into<String>) -> Parser {
        let except = except.into();
        Parser::from_fn(move |cursor, name| match cursor.peek_rune() {
            Some((rune, width)) if !except.contains(rune) => {
                cursor.advance(width);
                Some(Node::leaf(name.unwrap_or("Wildcard"), rune.to_string()))
            }
            _ => None,
        })
    }

    /// Tries `alternatives` left to right and commits to the first match.
    ///
    /// The produced node has exactly one child, the winning alternative. The
    /// cursor is restored between attempts, so no failed try leaks
    /// consumption.
    pub fn or(alternatives: Vec<Parser>) -> Parser {
        Parser::from_fn(move |cursor, name| {
            let entry = cursor.pos();
            for alternative in &alternatives {
                match alternative.apply(cursor, None) {
                    Some(child) => {
                        let mut node = Node::new(name.unwrap_or("Or"));
                        node.push(child);
                        return Some(node);
                    }
                    None => cursor.seek(entry),
                }
            }
            None
        })
    }

    /// Matches every parser of `sequence` in order, feeding the cursor
    /// forward.
    ///
    /// If any element fails, the cursor rewinds to the entry position and the
    /// whole sequence fails; otherwise the node holds the children in order.
    pub fn and(sequence: Vec<Parser>) -> Parser {
        Parser::from_fn(move |cursor, name| {
            let entry = cursor.pos();
            let mut node = Node::new(name.unwrap_or("And"));
            for parser in &sequence {
                match parser.apply(cursor, None) {
                    Some(child) => node.push(child),
                    None => {
                        cursor.seek(entry);
                        return None;
                    }
                }
            }
            Some(node)
        })
    }

    /// Matches `parser` zero or more times; always succeeds.
    ///
    /// Iteration stops at the first failing attempt (whose consumption is
    /// rewound), at end-of-input, or after a successful attempt that consumed
    /// nothing, the guard that keeps `many(is(""))` from looping forever.
    ///
    /// # Examples
    ///
    /// ```
    /// # use shorthand::{Cursor, Parser};
    /// let mut cursor = Cursor::new("aab");
    /// let node = Parser::many(Parser::is("a")).apply(&mut cursor, None).unwrap();
    ///
    /// assert_eq!(node.children().len(), 2);
    /// assert_eq!(cursor.pos(), 2);
    /// ```
    pub fn many(parser: Parser) -> Parser {
        Parser::from_fn(move |cursor, name| {
            let mut node = Node::new(name.unwrap_or("Many"));
            while !cursor.done() {
                let attempt = cursor.pos();
                match parser.apply(cursor, None) {
                    Some(child) => {
                        let progressed = cursor.pos() > attempt;
                        node.push(child);
                        if !progressed {
                            break;
                        }
                    }
                    None => {
                        cursor.seek(attempt);
                        break;
                    }
                }
            }
            Some(node)
        })
    }

    /// Tries `parser` once; matches either way.
    ///
    /// A successful try becomes the sole child; a failed one is rewound and
    /// leaves the node childless.
    pub fn optional(parser: Parser) -> Parser {
        Parser::from_fn(move |cursor, name| {
            let entry = cursor.pos();
            let mut node = Node::new(name.unwrap_or("Optional"));
            match parser.apply(cursor, None) {
                Some(child) => node.push(child),
                None => cursor.seek(entry),
            }
            Some(node)
        })
    }

    /// Matches `parser` one or more times.
    ///
    /// Defined as `and([parser, many(parser)])`, and the produced node keeps
    /// that two-child `And` shape.
    pub fn one_or_more(parser: Parser) -> Parser {
        Parser::and(vec![parser.clone(), Parser::many(parser)])
    }

    /// A parser for a rule body that is built on each application.
    ///
    /// Deferring construction to application time is what lets mutually
    /// recursive rule functions (`component` and `expression` in the
    /// meta-grammar) reference each other without constructing an infinite
    /// parser value up front. The node is always labeled `name`.
    pub(crate) fn named(name: &'static str, build: fn() -> Parser) -> Parser {
        Parser::from_fn(move |cursor, _| build().apply(cursor, Some(name)))
    }

    /// A parser that never matches. Stands in for rules whose bodies failed
    /// to compile.
    pub(crate) fn fail() -> Parser {
        Parser::from_fn(|_, _| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply<'i>(parser: &Parser, input: &'i str) -> (Option<Node>, Cursor<'i>) {
        let mut cursor = Cursor::new(input);
        let node = parser.apply(&mut cursor, None);
        (node, cursor)
    }

    #[test]
    fn is_matches_equal_input() {
        let (node, cursor) = apply(&Parser::is("test"), "test");

        assert_eq!(node, Some(Node::leaf("Is", "test")));
        assert_eq!(cursor.pos(), 4);
    }

    #[test]
    fn is_matches_a_prefix() {
        let (node, cursor) = apply(&Parser::is("test"), "testa");

        assert!(node.is_some());
        assert_eq!(cursor.pos(), 4);
    }

    #[test]
    fn is_rejects_a_different_prefix() {
        let (node, cursor) = apply(&Parser::is("test"), "atest");

        assert_eq!(node, None);
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn is_rejects_short_input() {
        let (node, cursor) = apply(&Parser::is("test"), "te");

        assert_eq!(node, None);
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn empty_literal_matches_without_advancing() {
        let (node, cursor) = apply(&Parser::is(""), "abc");

        assert_eq!(node, Some(Node::leaf("Is", "")));
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn wildcard_rejects_empty_input() {
        let (node, cursor) = apply(&Parser::wildcard("'"), "");

        assert_eq!(node, None);
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn wildcard_rejects_excluded_code_points() {
        let (node, cursor) = apply(&Parser::wildcard("'"), "'");

        assert_eq!(node, None);
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn wildcard_matches_one_code_point() {
        let (node, cursor) = apply(&Parser::wildcard("'"), "aa");

        assert_eq!(node, Some(Node::leaf("Wildcard", "a")));
        assert_eq!(cursor.pos(), 1);
    }

    #[test]
    fn wildcard_advances_by_full_code_point_width() {
        let (node, cursor) = apply(&Parser::wildcard(""), "日a");

        assert_eq!(node, Some(Node::leaf("Wildcard", "日")));
        assert_eq!(cursor.pos(), 3);
    }

    #[test]
    fn or_wraps_the_first_winning_alternative() {
        let parser = Parser::or(vec![Parser::is("a"), Parser::is("ab")]);
        let (node, cursor) = apply(&parser, "ab");

        let node = node.unwrap();
        assert_eq!(node.kind(), "Or");
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.child(0), &Node::leaf("Is", "a"));
        assert_eq!(cursor.pos(), 1);
    }

    #[test]
    fn or_fails_without_net_advancement() {
        let parser = Parser::or(vec![Parser::is("x"), Parser::is("y")]);
        let (node, cursor) = apply(&parser, "ab");

        assert_eq!(node, None);
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn and_collects_children_in_order() {
        let parser = Parser::and(vec![Parser::is("a"), Parser::is("b")]);
        let (node, cursor) = apply(&parser, "ab");

        assert_eq!(node.unwrap().to_string(), "And(Is<a>, Is<b>)");
        assert_eq!(cursor.pos(), 2);
    }

    #[test]
    fn and_rewinds_after_a_partial_match() {
        let parser = Parser::and(vec![Parser::is("a"), Parser::is("b")]);
        let (node, cursor) = apply(&parser, "ax");

        assert_eq!(node, None);
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn many_matches_zero_occurrences() {
        let (node, cursor) = apply(&Parser::many(Parser::is("a")), "");

        assert!(node.is_some());
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn many_matches_repeated_occurrences() {
        let (node, cursor) = apply(&Parser::many(Parser::is("a")), "aaa");

        assert_eq!(node.unwrap().children().len(), 3);
        assert_eq!(cursor.pos(), 3);
    }

    #[test]
    fn many_matches_nothing_on_a_wrong_prefix() {
        let (node, cursor) = apply(&Parser::many(Parser::is("a")), "bbbaaa");

        assert_eq!(node.unwrap().children().len(), 0);
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn many_stops_at_the_first_failure() {
        let (node, cursor) = apply(&Parser::many(Parser::is("a")), "aaabbb");

        assert_eq!(node.unwrap().children().len(), 3);
        assert_eq!(cursor.pos(), 3);
    }

    #[test]
    fn many_terminates_on_a_zero_width_child() {
        let (node, cursor) = apply(&Parser::many(Parser::is("")), "ab");

        assert_eq!(node.unwrap().children().len(), 1);
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn optional_matches_an_absent_inner() {
        let (node, cursor) = apply(&Parser::optional(Parser::is("a")), "b");

        assert_eq!(node.unwrap().children().len(), 0);
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn optional_records_a_present_inner() {
        let (node, cursor) = apply(&Parser::optional(Parser::is("a")), "a");

        assert_eq!(node.unwrap().children().len(), 1);
        assert_eq!(cursor.pos(), 1);
    }

    #[test]
    fn one_or_more_keeps_the_two_child_and_shape() {
        let (node, cursor) = apply(&Parser::one_or_more(Parser::is("a")), "aaa");

        let node = node.unwrap();
        assert_eq!(node.kind(), "And");
        assert_eq!(node.children().len(), 2);
        assert_eq!(node.child(0), &Node::leaf("Is", "a"));
        assert_eq!(node.child(1).kind(), "Many");
        assert_eq!(node.child(1).children().len(), 2);
        assert_eq!(cursor.pos(), 3);
    }

    #[test]
    fn one_or_more_requires_at_least_one() {
        let (node, cursor) = apply(&Parser::one_or_more(Parser::is("a")), "b");

        assert_eq!(node, None);
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn name_override_labels_the_node() {
        let mut cursor = Cursor::new("7");
        let node = Parser::is("7").apply(&mut cursor, Some("digit")).unwrap();

        assert_eq!(node, Node::leaf("digit", "7"));
    }

    #[test]
    fn parse_requires_full_consumption() {
        let parser = Parser::is("ab");

        assert!(parser.parse("ab").is_ok());
        assert_eq!(parser.parse("abc"), Err(Error::Unmatched { pos: 2 }));
    }
}
