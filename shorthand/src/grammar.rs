// shorthand. Grammar-driven parser combinators.
// Copyright (c) 2024 shorthand project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::combinator::Parser;
use crate::compile;
use crate::cursor::Cursor;
use crate::error::Error;
use crate::meta;
use crate::node::Node;

/// Removes every ASCII space, tab, newline and carriage return from `text`.
///
/// Whitespace in rule text is purely cosmetic and is stripped before
/// meta-parsing. Grammars without explicit whitespace rules (like the premade
/// JSON one) commonly strip their inputs the same way.
///
/// # Examples
///
/// ```
/// # use shorthand::strip_whitespace;
/// assert_eq!(strip_whitespace("digit & \n\t [digit]"), "digit&[digit]");
/// ```
pub fn strip_whitespace(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '\n' | '\r'))
        .collect()
}

/// A parser cache slot. `Compiling` is the marker that makes self- and
/// mutually-recursive rules terminate their construction: references to a
/// rule in this state defer the lookup to parse time.
enum Slot {
    Compiling,
    Ready(Parser),
}

type Cache = Rc<RefCell<HashMap<String, Slot>>>;

/// A mapping from rule names to shorthand rule text, with a per-grammar
/// cache of compiled parsers.
///
/// Rules should all be added before the first parser is requested; compiled
/// parsers are memoized and do not observe later edits to the rule map.
/// Parsers of recursive rules resolve their self-references through the
/// grammar's cache, so keep the grammar alive while such parsers are in use.
///
/// # Examples
///
/// ```
/// use shorthand::Grammar;
///
/// let mut grammar = Grammar::new();
/// grammar.add("greeting", "'hi' | 'hey'");
///
/// let greeting = grammar.parser("greeting").unwrap();
/// assert!(greeting.is_valid("hey"));
/// assert!(!greeting.is_valid("hello"));
/// ```
#[derive(Default)]
pub struct Grammar {
    rules: IndexMap<String, String>,
    cache: Cache,
    errors: RefCell<HashMap<String, Error>>,
}

impl Grammar {
    /// Creates an empty grammar.
    pub fn new() -> Grammar {
        Grammar::default()
    }

    /// Adds a rule, replacing any previous rule of the same name.
    pub fn add(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.rules.insert(name.into(), text.into());
    }

    /// Returns the whitespace-stripped body of rule `name`.
    pub fn rule_text(&self, name: &str) -> Option<String> {
        self.rules.get(name).map(|text| strip_whitespace(text))
    }

    /// Iterates over the rule names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Returns a parser for rule `name`, compiling it on first request.
    ///
    /// The parser labels the root of every tree it produces with the rule
    /// name. A malformed rule yields an error describing the offending text
    /// and leaves an always-failing parser in the cache, so rules referencing
    /// it still compile and simply never match through that branch; the same
    /// error is returned again on repeated calls without re-parsing the rule.
    pub fn parser(&self, name: &str) -> Result<Parser, Error> {
        if let Some(error) = self.errors.borrow().get(name) {
            return Err(error.clone());
        }

        {
            let cache = self.cache.borrow();
            match cache.get(name) {
                Some(Slot::Ready(parser)) => return Ok(rule_wrapper(name, parser.clone())),
                Some(Slot::Compiling) => return Ok(deferred_wrapper(name, &self.cache)),
                None => {}
            }
        }

        self.compile_rule(name)
    }

    fn compile_rule(&self, name: &str) -> Result<Parser, Error> {
        let text = match self.rule_text(name) {
            Some(text) => text,
            None => {
                return Err(Error::UnknownRule {
                    name: name.to_owned(),
                })
            }
        };

        self.cache
            .borrow_mut()
            .insert(name.to_owned(), Slot::Compiling);
        debug!(rule = name, text = %text, "generating rule parser");

        let mut cursor = Cursor::new(&text);
        let tree = meta::expression().apply(&mut cursor, None);

        match tree {
            Some(tree) if cursor.done() => {
                let parser = compile::expression(&tree, self);
                self.finish(name, parser.clone());
                Ok(rule_wrapper(name, parser))
            }
            _ => {
                let error = Error::MalformedRule {
                    name: name.to_owned(),
                    text: text.clone(),
                    pos: cursor.farthest(),
                };
                warn!(rule = name, text = %text, pos = cursor.farthest(), "rule body failed to parse");
                self.errors
                    .borrow_mut()
                    .insert(name.to_owned(), error.clone());
                // Keep previously handed-out deferred references callable: a
                // broken rule simply never matches.
                self.finish(name, Parser::fail());
                Err(error)
            }
        }
    }

    fn finish(&self, name: &str, parser: Parser) {
        let previous = self
            .cache
            .borrow_mut()
            .insert(name.to_owned(), Slot::Ready(parser));
        assert!(
            matches!(previous, Some(Slot::Compiling)),
            "parser cache lost the compiling marker for rule `{}`",
            name
        );
    }

    /// Parser for a rule referenced from inside another rule's body. An
    /// uncompilable referent degrades to a parser that never matches rather
    /// than aborting the outer compilation.
    pub(crate) fn reference_parser(&self, name: &str) -> Parser {
        match self.parser(name) {
            Ok(parser) => parser,
            Err(error) => {
                warn!(rule = name, %error, "reference to uncompilable rule never matches");
                Parser::fail()
            }
        }
    }

    /// Meta-parses every rule and checks that all references name defined
    /// rules, without touching the parser cache.
    ///
    /// # Examples
    ///
    /// ```
    /// use shorthand::Grammar;
    ///
    /// let mut grammar = Grammar::new();
    /// grammar.add("word", "letter & [letter]");
    ///
    /// // `letter` is never defined; both references to it are reported.
    /// assert_eq!(grammar.validate().unwrap_err().len(), 2);
    /// ```
    pub fn validate(&self) -> Result<(), Vec<Error>> {
        let mut errors = Vec::new();

        for (name, _) in &self.rules {
            let text = self.rule_text(name).expect("iterated rule exists");
            let mut cursor = Cursor::new(&text);
            match meta::expression().apply(&mut cursor, None) {
                Some(tree) if cursor.done() => {
                    for reference in references(&tree) {
                        if !self.rules.contains_key(&reference) {
                            errors.push(Error::UnknownRule { name: reference });
                        }
                    }
                }
                _ => errors.push(Error::MalformedRule {
                    name: name.clone(),
                    text: text.clone(),
                    pos: cursor.farthest(),
                }),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl<N: Into<String>, T: Into<String>> FromIterator<(N, T)> for Grammar {
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Grammar {
        let mut grammar = Grammar::new();
        for (name, text) in iter {
            grammar.add(name, text);
        }
        grammar
    }
}

/// Labels trees produced by an already-compiled rule with the rule's name.
fn rule_wrapper(name: &str, parser: Parser) -> Parser {
    let name = name.to_owned();
    Parser::from_fn(move |cursor, _| parser.apply(cursor, Some(&name)))
}

/// A reference to a rule whose compilation is still in progress. The cache
/// lookup happens on every application; resolving it during compilation
/// would never finish for recursive grammars.
///
/// Holds the cache weakly, since the cache itself ends up owning these
/// wrappers through the compiled parsers stored in it. The upgrade only
/// fails when a recursive rule's parser is applied after its grammar was
/// dropped, which the cache's lifetime contract forbids.
fn deferred_wrapper(name: &str, cache: &Cache) -> Parser {
    let name = name.to_owned();
    let cache = Rc::downgrade(cache);
    Parser::from_fn(move |cursor, _| {
        let cache = cache
            .upgrade()
            .unwrap_or_else(|| panic!("parser for rule `{}` outlived its grammar", name));
        let parser = match cache.borrow().get(&name) {
            Some(Slot::Ready(parser)) => parser.clone(),
            _ => panic!("rule `{}` was never finished compiling", name),
        };
        parser.apply(cursor, Some(&name))
    })
}

fn references(node: &Node) -> Vec<String> {
    fn collect(node: &Node, found: &mut Vec<String>) {
        if node.kind() == "reference" {
            found.push(node.text());
            return;
        }
        for child in node.children() {
            collect(child, found);
        }
    }

    let mut found = Vec::new();
    collect(node, &mut found);
    found
}
