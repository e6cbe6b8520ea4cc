use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Infix {
        operator: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Prefix {
        operator: String,
        operand: Box<Expr>,
    },
    /// An atom followed by at least one subscript or call
    Term { head: Atom, suffixes: Vec<Suffix> },
    Atom(Atom),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suffix {
    Subscript(Expr),
    Call(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Atom {
    Name(String),
    Num(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Group(Box<Expr>),
    List(Vec<Expr>),
}

impl Expr {
    pub fn name(name: &str) -> Expr {
        Expr::Atom(Atom::Name(name.to_string()))
    }
}
