//! Lexical analysis module for the front end.
//!
//! This module contains the lexer (tokenizer) that converts pseudocode source
//! into a stream of tokens for parsing. It handles:
//!
//! - Tokenization of source code using regex patterns
//! - Classification of keywords, keyword operators, names and literals
//! - String escapes, including `\xHH` sequences
//! - Layout: NEWLINE, INDENT and DEDENT tokens derived from leading whitespace
//! - Comments and insignificant newlines inside brackets

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
