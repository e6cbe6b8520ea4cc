use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::MalformedNumber { .. } => "MalformedNumber",
            ErrorImpl::InvalidString { .. } => "InvalidString",
            ErrorImpl::IncompatibleDedent { .. } => "IncompatibleDedent",
            ErrorImpl::TrivialCycle { .. } => "TrivialCycle",
            ErrorImpl::UnknownRule { .. } => "UnknownRule",
            ErrorImpl::UnknownFilter { .. } => "UnknownFilter",
            ErrorImpl::SyntaxError { .. } => "SyntaxError",
            ErrorImpl::NestingTooDeep { .. } => "NestingTooDeep",
            ErrorImpl::TrailingInput { .. } => "TrailingInput",
            ErrorImpl::Contradiction { .. } => "Contradiction",
            ErrorImpl::AssociationError { .. } => "AssociationError",
            ErrorImpl::UnexpectedShape { .. } => "UnexpectedShape",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::MalformedNumber { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, a number may contain at most one decimal point",
                token
            )),
            ErrorImpl::InvalidString { message } => {
                ErrorTip::Suggestion(format!("Invalid string literal: {}", message))
            }
            ErrorImpl::IncompatibleDedent { from, to } => ErrorTip::Suggestion(format!(
                "Dedent from {:?} to {:?} does not return to an enclosing indentation level",
                from, to
            )),
            ErrorImpl::TrivialCycle { .. }
            | ErrorImpl::UnknownRule { .. }
            | ErrorImpl::UnknownFilter { .. } => ErrorTip::Suggestion(String::from(
                "The grammar table itself is malformed",
            )),
            ErrorImpl::SyntaxError { message, stack, .. } => {
                if let Some(rule) = stack.last() {
                    ErrorTip::Suggestion(format!("{} (while parsing `{}`)", message, rule))
                } else {
                    ErrorTip::Suggestion(message.clone())
                }
            }
            ErrorImpl::NestingTooDeep { limit } => ErrorTip::Suggestion(format!(
                "Source nests deeper than {} rule evaluations",
                limit
            )),
            ErrorImpl::TrailingInput { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, expected `start`, a procedure or end of file",
                token
            )),
            ErrorImpl::Contradiction { message, .. } => ErrorTip::Suggestion(message.clone()),
            ErrorImpl::AssociationError { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedShape { .. } => ErrorTip::None,
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}:{}", self.internal_error, self.position.1, self.position.0)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Lexical
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("multiple decimal points in number: {token:?}")]
    MalformedNumber { token: String },
    #[error("invalid string literal: {message}")]
    InvalidString { message: String },
    #[error("incompatible dedent detected from {from:?} to {to:?}")]
    IncompatibleDedent { from: String, to: String },

    // Grammar construction
    #[error("definition of rule {rule:?} is part of a trivial cycle")]
    TrivialCycle { rule: String },
    #[error("reference to undefined rule {rule:?}")]
    UnknownRule { rule: String },
    #[error("reference to undefined filter {filter:?}")]
    UnknownFilter { filter: String },

    // Syntax
    #[error("{message} (rules: {stack:?}, before: {before:?}, after: {after:?})")]
    SyntaxError {
        message: String,
        before: Vec<String>,
        after: Vec<String>,
        stack: Vec<String>,
    },
    #[error("nesting exceeds {limit} rule evaluations")]
    NestingTooDeep { limit: usize },
    #[error("unexpected token after the last declaration: {token:?}")]
    TrailingInput { token: String },

    // Precedence resolution
    #[error("term-infix-prefix resolution failed: {message} (positions {positions:?}, masks {masks:?})")]
    Contradiction {
        message: String,
        positions: Vec<usize>,
        masks: Vec<u8>,
    },
    #[error("association error: {remaining} terms left after resolving operators")]
    AssociationError { remaining: usize },

    // Lowering
    #[error("unexpected raw tree shape for rule {rule:?}: {found}")]
    UnexpectedShape { rule: String, found: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
}
