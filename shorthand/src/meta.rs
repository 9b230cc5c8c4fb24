// shorthand. Grammar-driven parser combinators.
// Copyright (c) 2024 shorthand project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! The meta-grammar: a hand-assembled combinator composition that recognizes
//! the shorthand surface syntax itself. The engine is self-hosting in that
//! sense: rule text is parsed by the same primitives the compiled rules are
//! made of.
//!
//! After whitespace stripping, the accepted grammar is:
//!
//! ```text
//! literal    := "'"  Many(Wildcard("'"))  "'"
//! wildcard   := "*" literal
//! reference  := OneOrMore(character)          -- character is one of a–z
//! many       := "[" expression "]"
//! optional   := "(" expression ")"
//! grouping   := "{" expression "}"
//! component  := literal | reference | many | optional | wildcard | grouping
//! expression := And(component, "&", Many(And(component, "&")), component)
//!             | And(component, "|", Many(And(component, "|")), component)
//!             | component
//! ```
//!
//! An expression uses one operator throughout: the element after the first
//! component fixes it, and every further repetition must repeat it. Mixing
//! `&` and `|` needs explicit `{…}` groups, otherwise the expression stops at
//! the foreign operator and the rule is left with trailing text.
//!
//! Every rule labels its node with the rule's own name, which is what the
//! compiler dispatches on. Rule bodies are built lazily (at application
//! time), so the `component`/`expression` recursion terminates.

use crate::combinator::Parser;

/// The entry production for rule bodies.
pub(crate) fn expression() -> Parser {
    Parser::named("expression", || {
        Parser::or(vec![
            Parser::and(vec![
                component(),
                operator_and(),
                Parser::many(Parser::and(vec![component(), operator_and()])),
                component(),
            ]),
            Parser::and(vec![
                component(),
                operator_or(),
                Parser::many(Parser::and(vec![component(), operator_or()])),
                component(),
            ]),
            component(),
        ])
    })
}

fn component() -> Parser {
    Parser::named("component", || {
        Parser::or(vec![
            literal(),
            reference(),
            many(),
            optional(),
            wildcard(),
            grouping(),
        ])
    })
}

fn literal() -> Parser {
    Parser::named("literal", || {
        Parser::and(vec![
            Parser::is("'"),
            Parser::many(Parser::wildcard("'")),
            Parser::is("'"),
        ])
    })
}

fn wildcard() -> Parser {
    Parser::named("wildcard", || Parser::and(vec![Parser::is("*"), literal()]))
}

fn character() -> Parser {
    Parser::named("character", || {
        Parser::or(('a'..='z').map(|c| Parser::is(c.to_string())).collect())
    })
}

fn reference() -> Parser {
    Parser::named("reference", || Parser::one_or_more(character()))
}

fn many() -> Parser {
    Parser::named("many", || {
        Parser::and(vec![Parser::is("["), expression(), Parser::is("]")])
    })
}

fn optional() -> Parser {
    Parser::named("optional", || {
        Parser::and(vec![Parser::is("("), expression(), Parser::is(")")])
    })
}

fn grouping() -> Parser {
    Parser::named("grouping", || {
        Parser::and(vec![Parser::is("{"), expression(), Parser::is("}")])
    })
}

fn operator_and() -> Parser {
    Parser::named("and", || Parser::is("&"))
}

fn operator_or() -> Parser {
    Parser::named("or", || Parser::is("|"))
}
