use serde::{Deserialize, Serialize};

use super::expressions::{Atom, Expr};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    If {
        condition: Expr,
        body: Body,
        alternative: Option<Body>,
    },
    While {
        condition: Expr,
        body: Body,
    },
    DoUntil {
        body: Body,
        condition: Expr,
    },
    /// Always carries start, stop and step, in that order
    For {
        variable: String,
        start: Expr,
        stop: Expr,
        step: Expr,
        body: Body,
    },
    Case {
        subject: Expr,
        cases: Vec<CaseArm>,
        default: Option<Body>,
    },
    Set {
        target: LValue,
        value: Expr,
    },
    Input {
        targets: Vec<String>,
        file: Option<Atom>,
    },
    Output {
        values: Vec<Expr>,
        file: Option<Atom>,
    },
    Open {
        name: String,
        path: Atom,
    },
    Close {
        name: String,
    },
    Expression {
        value: Expr,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseArm {
    pub test: Atom,
    pub body: Body,
}

/// Assignment target. Subscripts nest left to right, so `a[1][2]` is a
/// subscript of `a[1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LValue {
    Variable { name: String },
    Subscript { head: Expr, index: Expr },
}
