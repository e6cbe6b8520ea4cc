//! Operator precedence resolution.
//!
//! Expressions reach this module as a flat sequence of parsed terms and
//! operator tokens. The resolver first decides, for every operator, whether
//! it acts as an infix or a prefix operator, rejecting sequences that cannot
//! form a single expression, and then folds the sequence into one tree by
//! precedence climbing over a table of binding powers.

pub mod resolver;
