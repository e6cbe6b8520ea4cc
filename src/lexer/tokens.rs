use lazy_static::lazy_static;
use std::{collections::HashSet, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref TYPE_NAMES: HashSet<&'static str> = {
        "num string float bool InputFile OutputFile".split_whitespace().collect()
    };
    pub static ref KEYWORDS: HashSet<&'static str> = {
        let mut set: HashSet<&'static str> = TYPE_NAMES.iter().copied().collect();
        set.extend(
            "proc start Declarations end return \
             if then else endif while endwhile do until for to step endfor \
             case default endcase set input from output open close"
                .split_whitespace(),
        );
        set
    };
    pub static ref KEYOPS: HashSet<&'static str> = {
        "AND OR NOT".split_whitespace().collect()
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Name,
    Number,
    Float,
    String,
    Bool,

    /// Operator symbols and keyword operators (`AND`, `OR`, `NOT`)
    Operator,
    /// Reserved words; typed by their own text
    Keyword,
    /// Punctuation; typed by its own text
    Symbol,

    Indent,
    Dedent,
    Newline,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    /// The name the grammar matches this token by.
    ///
    /// Keywords and punctuation are matched by their text, everything else
    /// by a fixed name per kind.
    pub fn type_name(&self) -> &str {
        match self.kind {
            TokenKind::EOF => "EOF",
            TokenKind::Name => "name",
            TokenKind::Number => "literal_num",
            TokenKind::Float => "literal_float",
            TokenKind::String => "literal_string",
            TokenKind::Bool => "literal_bool",
            TokenKind::Operator => "op",
            TokenKind::Keyword | TokenKind::Symbol => &self.value,
            TokenKind::Indent => "indent",
            TokenKind::Dedent => "dedent",
            TokenKind::Newline => "newline",
        }
    }

    fn is_one_of_many(&self, tokens: &[TokenKind]) -> bool {
        tokens.contains(&self.kind)
    }

    /// Short form used in diagnostics: literal payloads are shown, synthetic
    /// tokens by their type name.
    pub fn describe(&self) -> String {
        if self.is_one_of_many(&[TokenKind::String]) {
            format!("{:?}", self.value)
        } else if self.is_one_of_many(&[
            TokenKind::Indent,
            TokenKind::Dedent,
            TokenKind::Newline,
            TokenKind::EOF,
        ]) {
            self.type_name().to_uppercase()
        } else {
            self.value.clone()
        }
    }

    pub fn debug(&self) -> String {
        if self.is_one_of_many(&[
            TokenKind::String,
            TokenKind::Name,
            TokenKind::Number,
            TokenKind::Float,
            TokenKind::Bool,
            TokenKind::Operator,
        ]) {
            format!("{} ({})", self.kind, self.value)
        } else if self.is_one_of_many(&[TokenKind::Keyword, TokenKind::Symbol]) {
            format!("{} `{}`", self.kind, self.value)
        } else {
            format!("{} ()", self.kind)
        }
    }
}
