use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::{errors::errors::Error, precedence::resolver::BindingPowers};

use super::{expr::parse_precedence, parser::Parser, tree::Tree};

lazy_static! {
    /// Binding powers of the language's operators.
    pub static ref BINDING_POWERS: BindingPowers = BindingPowers::new()
        // Logical
        .with_infix(&["OR"], 10, 11)
        .with_infix(&["AND"], 20, 21)
        // Relational
        .with_infix(&["<", ">", "<=", ">=", "<>", "="], 30, 31)
        // Additive and multiplicative
        .with_infix(&["+", "-"], 50, 51)
        .with_infix(&["*", "/", "%"], 60, 61)
        // Prefix
        .with_prefix(&["NOT"], 21)
        .with_prefix(&["-"], 51);
}

/// Postprocessor applied to the value of a `filter` rule. Receives the
/// cursor the filtered rule started at; `Ok(None)` is a soft failure.
pub type FilterHandler = fn(&Parser, usize, Tree) -> Result<Option<Tree>, Error>;

pub type FilterLookup = HashMap<&'static str, FilterHandler>;

pub fn create_filter_lookups(parser: &mut Parser) {
    parser.filter("precedence", parse_precedence);
}
