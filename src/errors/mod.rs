//! Error types and error handling for the front end.
//!
//! Every stage reports through one `Error` type pairing an `ErrorImpl`
//! variant with the source position it was raised at:
//!
//! - lexical errors (bad characters, numbers, strings, indentation)
//! - grammar construction errors (defects in the rule table)
//! - syntax errors carrying nearby tokens and the active rule stack
//! - precedence-resolution contradictions
//! - lowering errors for raw trees of an unexpected shape

pub mod errors;
