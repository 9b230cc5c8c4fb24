// shorthand. Grammar-driven parser combinators.
// Copyright (c) 2024 shorthand project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Turns a meta-grammar tree into a parser by direct case analysis on node
//! kinds. Shape violations are programmer errors (the meta-grammar cannot
//! produce them), so the walk panics on them instead of reporting.

use crate::combinator::Parser;
use crate::grammar::Grammar;
use crate::node::Node;

/// Compiles an `expression` node.
///
/// The sole child is either a bare `component` or the `And` produced by the
/// operator alternatives, whose children are
/// `[component, operator, Many(And(component, operator)), component]`.
pub(crate) fn expression(node: &Node, grammar: &Grammar) -> Parser {
    let head = node.child(0);
    if head.kind() == "component" {
        return component(head, grammar);
    }

    let mut parsers = vec![component(head.child(0), grammar)];
    let operator = head.child(1).kind().to_owned();
    for repetition in head.child(2).children() {
        parsers.push(component(repetition.child(0), grammar));
    }
    parsers.push(component(head.child(3), grammar));

    match operator.as_str() {
        "and" => Parser::and(parsers),
        "or" => Parser::or(parsers),
        kind => panic!("expression operator has unexpected kind `{}`", kind),
    }
}

fn component(node: &Node, grammar: &Grammar) -> Parser {
    let inner = node.child(0);
    match inner.kind() {
        "literal" => literal(inner),
        "wildcard" => wildcard(inner),
        "reference" => grammar.reference_parser(&inner.text()),
        "many" => Parser::many(expression(inner.child(1), grammar)),
        "optional" => Parser::optional(expression(inner.child(1), grammar)),
        "grouping" => expression(inner.child(1), grammar),
        kind => panic!("component holds unexpected node kind `{}`", kind),
    }
}

/// `literal` children are `['`, Many(Wildcard), `']`; the quoted text is the
/// concatenation of the repetition's leaves.
fn literal(node: &Node) -> Parser {
    Parser::is(node.child(1).text())
}

/// `wildcard` children are `[*, literal]`; the exclusion set is the quoted
/// text of that literal.
fn wildcard(node: &Node) -> Parser {
    Parser::wildcard(node.child(1).child(1).text())
}
