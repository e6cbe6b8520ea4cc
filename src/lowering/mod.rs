//! Tree lowering.
//!
//! Converts the grammar-shaped raw tree produced by the parser into the
//! canonical AST, one function per grammar rule. Lowering is pure: the same
//! raw tree always lowers to the same AST.

pub mod lowering;

#[cfg(test)]
mod tests;
