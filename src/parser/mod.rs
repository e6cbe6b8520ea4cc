//! Parser module producing the raw syntax tree.
//!
//! Parsing is driven by data rather than by hand-written functions per
//! construct:
//!
//! - `rules` defines the rule vocabulary (sequences, alternatives, repetition,
//!   delimited lists, commit points)
//! - `grammar` holds the language grammar as a table of named rules
//! - `parser` interprets a rule table against the token stream
//! - `expr` and `lookups` hook operator precedence resolution in as a filter
//! - `tree` is the serializable, grammar-shaped output
//!
//! Soft failures backtrack without consuming input; hard failures abort the
//! parse with the nearby tokens and the stack of rules being parsed.

pub mod expr;
pub mod grammar;
pub mod lookups;
pub mod parser;
pub mod rules;
pub mod tree;
