//! Grammar-interpreting parser.
//!
//! The parser holds no grammar code of its own: it evaluates [`Rule`] values
//! from a rule table against the token stream. Every evaluation returns a
//! [`ParseResult`]:
//!
//! - `Ok(Some((cursor, tree)))` on success, with the cursor after the match
//! - `Ok(None)` on a soft failure, which consumes nothing
//! - `Err(error)` on a hard failure, which aborts the whole parse
//!
//! Filters (named postprocessors used by `filter` rules) are registered in a
//! lookup table, like the handler tables of a Pratt parser.

use std::{
    collections::HashSet,
    panic,
    sync::Arc,
    thread::{self, Builder},
};

use crate::{
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position,
};

use super::{
    grammar::GRAMMAR,
    lookups::{create_filter_lookups, FilterHandler, FilterLookup},
    rules::{HardError, Rule, RuleLookup},
    tree::Tree,
};

pub type ParseResult = Result<Option<(usize, Tree)>, Error>;

/// Nested rule evaluations allowed before parsing gives up.
pub const MAX_DEPTH: usize = 1000;

/// Stack reserved per nested evaluation; unoptimized builds need ~18 KiB.
const STACK_PER_LEVEL: usize = 64 * 1024;
/// Stack of the thread parses run on, enough for `MAX_DEPTH` evaluations.
pub const PARSE_STACK_SIZE: usize = MAX_DEPTH * STACK_PER_LEVEL;

const CONTEXT_BEFORE: usize = 5;
const CONTEXT_AFTER: usize = 6;

/// State of one in-flight parse: the names of the rules being evaluated, for
/// diagnostics, and the evaluation depth.
#[derive(Debug, Default)]
pub struct ParseContext {
    stack: Vec<&'static str>,
    depth: usize,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct Parser<'g> {
    /// The list of tokens to parse, ending in EOF
    tokens: Vec<Token>,
    /// The name of the source file being parsed
    file: Arc<String>,
    /// The rule table being interpreted
    rules: &'g RuleLookup,
    /// Postprocessors available to `filter` rules
    filter_lookup: FilterLookup,
}

impl Parser<'static> {
    /// Creates a parser over the language grammar.
    pub fn new(tokens: Vec<Token>, file: Arc<String>) -> Self {
        Parser::with_grammar(tokens, file, &GRAMMAR)
    }
}

impl<'g> Parser<'g> {
    pub fn with_grammar(tokens: Vec<Token>, file: Arc<String>, rules: &'g RuleLookup) -> Self {
        let mut parser = Parser {
            tokens,
            file,
            rules,
            filter_lookup: FilterLookup::new(),
        };
        create_filter_lookups(&mut parser);
        parser
    }

    /// Registers a filter handler.
    pub fn filter(&mut self, name: &'static str, filter_fn: FilterHandler) {
        self.filter_lookup.insert(name, filter_fn);
    }

    /// Source position of the token at `cursor`, or of the last token when
    /// the cursor is past the end.
    pub fn get_position(&self, cursor: usize) -> Position {
        self.tokens
            .get(cursor)
            .or(self.tokens.last())
            .map(|token| token.span.start.clone())
            .unwrap_or_else(|| Position(0, Arc::clone(&self.file)))
    }

    fn syntax_error(&self, context: &ParseContext, cursor: usize, message: &str) -> Error {
        let end = self.tokens.len().min(cursor + CONTEXT_AFTER);
        let begin = cursor.saturating_sub(CONTEXT_BEFORE).min(end);
        let cursor = cursor.clamp(begin, end);

        Error::new(
            ErrorImpl::SyntaxError {
                message: message.to_string(),
                before: self.tokens[begin..cursor].iter().map(Token::describe).collect(),
                after: self.tokens[cursor..end].iter().map(Token::describe).collect(),
                stack: context.stack.iter().map(|name| name.to_string()).collect(),
            },
            self.get_position(cursor),
        )
    }

    fn fail(&self, context: &ParseContext, cursor: usize, error: HardError) -> ParseResult {
        match error {
            Some(message) => Err(self.syntax_error(context, cursor, message)),
            None => Ok(None),
        }
    }

    /// Follows a chain of plain aliases to the first rule that does work.
    fn resolve(&self, name: &'static str, cursor: usize) -> Result<(Vec<&'static str>, &'g Rule), Error> {
        let mut chain = vec![name];
        let mut seen = HashSet::from([name]);
        let mut current = name;

        loop {
            let Some(rule) = self.rules.get(current) else {
                return Err(Error::new(
                    ErrorImpl::UnknownRule {
                        rule: current.to_string(),
                    },
                    self.get_position(cursor),
                ));
            };

            match rule {
                Rule::Reference(next) => {
                    if !seen.insert(*next) {
                        return Err(Error::new(
                            ErrorImpl::TrivialCycle {
                                rule: name.to_string(),
                            },
                            self.get_position(cursor),
                        ));
                    }
                    chain.push(*next);
                    current = *next;
                }
                rule => return Ok((chain, rule)),
            }
        }
    }

    /// Evaluates the named rule from `cursor`.
    pub fn parse_rule(&self, context: &mut ParseContext, cursor: usize, name: &'static str) -> ParseResult {
        self.evaluate(context, cursor, &Rule::Reference(name))
    }

    pub fn evaluate(&self, context: &mut ParseContext, cursor: usize, rule: &Rule) -> ParseResult {
        context.depth += 1;
        if context.depth > MAX_DEPTH {
            return Err(Error::new(
                ErrorImpl::NestingTooDeep { limit: MAX_DEPTH },
                self.get_position(cursor),
            ));
        }

        let result = self.evaluate_rule(context, cursor, rule);
        context.depth -= 1;
        result
    }

    fn evaluate_rule(&self, context: &mut ParseContext, cursor: usize, rule: &Rule) -> ParseResult {
        match rule {
            Rule::Reference(name) => {
                let (chain, resolved) = self.resolve(*name, cursor)?;
                let size = context.stack.len();
                context.stack.extend(chain);
                let result = self.evaluate(context, cursor, resolved);
                context.stack.truncate(size);
                result
            }

            Rule::Type { kind, error } => match self.tokens.get(cursor) {
                Some(token) if token.type_name() == *kind => Ok(Some((
                    cursor + 1,
                    Tree::token(token.type_name(), &token.value),
                ))),
                _ => self.fail(context, cursor, *error),
            },

            Rule::Filter { name, rule } => {
                let Some((end, value)) = self.evaluate(context, cursor, rule)? else {
                    return Ok(None);
                };
                let Some(filter) = self.filter_lookup.get(name) else {
                    return Err(Error::new(
                        ErrorImpl::UnknownFilter {
                            filter: name.to_string(),
                        },
                        self.get_position(cursor),
                    ));
                };
                Ok(filter(self, cursor, value)?.map(|value| (end, value)))
            }

            Rule::Maybe(rule) => match self.evaluate(context, cursor, rule)? {
                Some((end, value)) => Ok(Some((end, Tree::Seq(vec![value])))),
                None => Ok(Some((cursor, Tree::Seq(vec![])))),
            },

            Rule::Repeat(rule) => {
                let mut position = cursor;
                let mut values = vec![];

                while let Some((end, value)) = self.evaluate(context, position, rule)? {
                    if end == position {
                        break;
                    }
                    values.push(value);
                    position = end;
                }

                Ok(Some((position, Tree::Seq(values))))
            }

            Rule::Cycle(rules) => {
                let mut position = cursor;
                let mut values = vec![];

                'passes: loop {
                    let mut pass = vec![];
                    let mut end = position;

                    for rule in rules {
                        match self.evaluate(context, end, rule)? {
                            Some((next, value)) => {
                                pass.push(value);
                                end = next;
                            }
                            None => break 'passes,
                        }
                    }

                    if end == position {
                        break;
                    }
                    values.extend(pass);
                    position = end;
                }

                Ok(Some((position, Tree::Seq(values))))
            }

            Rule::Split {
                primary,
                secondary,
                error,
            } => {
                let Some((mut position, first)) = self.evaluate(context, cursor, primary)? else {
                    return self.fail(context, cursor, *error);
                };
                let mut values = vec![first];

                loop {
                    let Some((middle, separator)) = self.evaluate(context, position, secondary)? else {
                        break;
                    };
                    let Some((end, value)) = self.evaluate(context, middle, primary)? else {
                        break;
                    };
                    if end == position {
                        break;
                    }
                    values.push(separator);
                    values.push(value);
                    position = end;
                }

                Ok(Some((position, Tree::Seq(values))))
            }

            Rule::All { rules, error } => {
                let mut position = cursor;
                let mut values = Vec::with_capacity(rules.len());

                for rule in rules {
                    match self.evaluate(context, position, rule)? {
                        Some((end, value)) => {
                            values.push(value);
                            position = end;
                        }
                        None => return self.fail(context, position, *error),
                    }
                }

                Ok(Some((position, Tree::Seq(values))))
            }

            Rule::List {
                left,
                right,
                separator,
                element,
                error,
            } => {
                let Some((mut position, _)) = self.evaluate(context, cursor, left)? else {
                    return Ok(None);
                };

                let value = match separator {
                    None => {
                        let Some((end, value)) = self.evaluate(context, position, element)? else {
                            return self.fail(context, position, *error);
                        };
                        position = end;
                        value
                    }
                    Some(separator) => {
                        let mut values = vec![];

                        if let Some((end, value)) = self.evaluate(context, position, element)? {
                            values.push(value);
                            position = end;

                            loop {
                                let Some((middle, _)) = self.evaluate(context, position, separator)? else {
                                    break;
                                };
                                let Some((end, value)) = self.evaluate(context, middle, element)? else {
                                    break;
                                };
                                values.push(value);
                                position = end;
                            }
                        }

                        Tree::Seq(values)
                    }
                };

                match self.evaluate(context, position, right)? {
                    Some((end, _)) => Ok(Some((end, value))),
                    None => self.fail(context, position, *error),
                }
            }

            Rule::Options { options, error } => {
                for (tag, rule) in options {
                    if let Some((end, value)) = self.evaluate(context, cursor, rule)? {
                        return Ok(Some((end, Tree::tagged(tag, value))));
                    }
                }

                self.fail(context, cursor, *error)
            }

            Rule::Obligatory { rule, error } => match self.evaluate(context, cursor, rule)? {
                Some(result) => Ok(Some(result)),
                None => Err(self.syntax_error(context, cursor, error)),
            },

            Rule::LeftOptionalRight {
                left,
                separator,
                right,
            } => {
                let Some((position, left)) = self.evaluate(context, cursor, left)? else {
                    return Ok(self.evaluate(context, cursor, right)?.map(|(end, right)| {
                        (
                            end,
                            Tree::Pair {
                                left: None,
                                right: Some(Box::new(right)),
                            },
                        )
                    }));
                };

                let Some((middle, _)) = self.evaluate(context, position, separator)? else {
                    return Ok(Some((
                        position,
                        Tree::Pair {
                            left: Some(Box::new(left)),
                            right: None,
                        },
                    )));
                };

                Ok(self.evaluate(context, middle, right)?.map(|(end, right)| {
                    (
                        end,
                        Tree::Pair {
                            left: Some(Box::new(left)),
                            right: Some(Box::new(right)),
                        },
                    )
                }))
            }
        }
    }

    /// Parses the whole token stream with the `file` rule.
    pub fn parse_file(&self) -> Result<Tree, Error> {
        let mut context = ParseContext::new();

        let (end, tree) = match self.parse_rule(&mut context, 0, "file")? {
            Some(result) => result,
            None => (0, Tree::Seq(vec![])),
        };

        match self.tokens.get(end) {
            Some(token) if token.kind != TokenKind::EOF => Err(Error::new(
                ErrorImpl::TrailingInput {
                    token: token.describe(),
                },
                token.span.start.clone(),
            )),
            _ => Ok(tree),
        }
    }
}

/// Runs `task` on a thread with a [`PARSE_STACK_SIZE`] stack, so that rule
/// evaluation reaches [`MAX_DEPTH`] before it runs out of stack. Falls back to
/// the current thread if no such thread can be started.
pub fn with_parse_stack<R, F>(task: F) -> R
where
    F: Fn() -> R + Sync,
    R: Send,
{
    thread::scope(|scope| {
        let spawned = Builder::new()
            .name(String::from("parser"))
            .stack_size(PARSE_STACK_SIZE)
            .spawn_scoped(scope, || task());

        match spawned {
            Ok(handle) => handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)),
            Err(_) => task(),
        }
    })
}

/// Parses a token stream into a raw syntax tree.
///
/// This is the main entry point for parsing: it evaluates the `file` rule
/// of the language grammar from the first token and requires the whole
/// stream up to EOF to be consumed.
///
/// # Arguments
///
/// * `tokens` - Vector of tokens to parse, ending in EOF
/// * `file` - Shared string containing the source file name
pub fn parse(tokens: Vec<Token>, file: Arc<String>) -> Result<Tree, Error> {
    let parser = Parser::new(tokens, file);
    with_parse_stack(|| parser.parse_file())
}
