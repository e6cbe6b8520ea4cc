/// AST (Abstract Syntax Tree) module
/// Contains the canonical tree handed to the type checker and interpreter
///
/// Submodules:
/// - ast: Program structure (entries, procedures, blocks, declarations)
/// - expressions: Expression, suffix and atom nodes
/// - statements: Statement nodes and bodies
/// - types: Element types and array suffixes of declarations
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
