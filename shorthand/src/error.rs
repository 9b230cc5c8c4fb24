// shorthand. Grammar-driven parser combinators.
// Copyright (c) 2024 shorthand project developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use std::error;
use std::fmt;

/// An `enum` which defines the failures grammar compilation and matching can
/// report.
///
/// All three are ordinary return values; the engine reserves panics for
/// programmer errors such as walking a malformed meta-tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// A rule name was requested or referenced that the grammar does not
    /// define.
    UnknownRule {
        /// The missing rule's name.
        name: String,
    },
    /// A rule body did not parse as shorthand, or left trailing text behind.
    MalformedRule {
        /// The rule's name.
        name: String,
        /// The whitespace-stripped rule text that failed.
        text: String,
        /// Farthest byte offset the meta-parse reached inside `text`.
        pos: usize,
    },
    /// The input did not satisfy the parser.
    Unmatched {
        /// Farthest byte offset matching reached before giving up.
        pos: usize,
    },
}

fn message(error: &Error) -> String {
    match *error {
        Error::UnknownRule { ref name } => {
            format!("grammar defines no rule named `{}`", name)
        }
        Error::MalformedRule { ref name, .. } => {
            format!("rule `{}` is not valid shorthand", name)
        }
        Error::Unmatched { pos } => {
            format!("input failed to match at position {}", pos)
        }
    }
}

fn underline(offset: usize) -> String {
    let mut underline = String::new();
    for _ in 0..offset {
        underline.push(' ');
    }
    underline.push_str("^---");
    underline
}

fn format(error: &Error) -> String {
    match *error {
        Error::MalformedRule { ref text, pos, .. } => {
            let mut result = message(error);
            result.push_str("\n |\n");
            result.push_str(&format!(" | {}\n", text));
            result.push_str(&format!(" | {}", underline(pos)));
            result
        }
        _ => message(error),
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format(self))
    }
}

impl error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_malformed_rule() {
        let error = Error::MalformedRule {
            name: "digits".to_owned(),
            text: "digit&[digit".to_owned(),
            pos: 6,
        };

        assert_eq!(
            format!("{}", error),
            [
                "rule `digits` is not valid shorthand",
                " |",
                " | digit&[digit",
                " |       ^---",
            ]
            .join("\n")
        );
    }

    #[test]
    fn display_unknown_rule() {
        let error = Error::UnknownRule {
            name: "ghost".to_owned(),
        };

        assert_eq!(format!("{}", error), "grammar defines no rule named `ghost`");
    }

    #[test]
    fn display_unmatched() {
        let error = Error::Unmatched { pos: 14 };

        assert_eq!(format!("{}", error), "input failed to match at position 14");
    }
}
