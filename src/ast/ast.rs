use serde::{Deserialize, Serialize};

use super::{
    expressions::Expr,
    statements::Stmt,
    types::{ArraySuffix, ElementType},
};

/// A whole source file: its `start ... end` entries and its procedures, each
/// in source order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub entries: Vec<ProgramEntry>,
    pub procedures: Vec<Procedure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramEntry {
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    pub name: String,
    pub parameters: Vec<Predicate>,
    pub body: Block,
}

/// The body of an entry or procedure: declarations first, then statements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    pub declarations: Vec<Declaration>,
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub predicate: Predicate,
    pub initial: Option<Expr>,
}

/// A typed name, as declared or as a procedure parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub name: String,
    pub element: ElementType,
    pub suffixes: Vec<ArraySuffix>,
}
