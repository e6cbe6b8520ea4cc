use serde::{Deserialize, Serialize};

use super::expressions::Expr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Bool,
    Num,
    Float,
    String,
    InputFile,
    OutputFile,
    /// A procedure value with the given parameter types
    Proc(Vec<ProcParameter>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcParameter {
    pub element: ElementType,
    pub suffixes: Vec<ArraySuffix>,
}

/// One `[size]` level of an array type; `[]` leaves the size open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArraySuffix {
    pub size: Option<Expr>,
}
