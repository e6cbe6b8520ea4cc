use std::{collections::HashSet, sync::Arc};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{errors::errors::{Error, ErrorImpl}, Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN};

use super::tokens::{Token, TokenKind, KEYOPS, KEYWORDS};

pub type RegexHandler = fn(&mut Lexer, &Regex) -> Result<(), Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

lazy_static! {
    // Tried in order; multi-character symbols come before their prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        RegexPattern { regex: Regex::new("^//[^\n]*").unwrap(), handler: skip_handler },
        RegexPattern { regex: Regex::new("^[\r\n]+").unwrap(), handler: newline_handler },
        RegexPattern { regex: Regex::new("^[ \t]+").unwrap(), handler: whitespace_handler },
        RegexPattern { regex: Regex::new("^[a-zA-Z_][a-zA-Z0-9_]*").unwrap(), handler: name_handler },
        RegexPattern { regex: Regex::new("^([0-9]+(\\.[0-9]*)?|\\.[0-9]+)").unwrap(), handler: number_handler },
        RegexPattern { regex: Regex::new("^\"").unwrap(), handler: string_handler },
        RegexPattern { regex: Regex::new("^<=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Operator, "<=") },
        RegexPattern { regex: Regex::new("^>=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Operator, ">=") },
        RegexPattern { regex: Regex::new("^<>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Operator, "<>") },
        RegexPattern { regex: Regex::new("^<").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Operator, "<") },
        RegexPattern { regex: Regex::new("^>").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Operator, ">") },
        RegexPattern { regex: Regex::new("^~").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Operator, "~") },
        RegexPattern { regex: Regex::new("^/").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Operator, "/") },
        RegexPattern { regex: Regex::new("^%").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Operator, "%") },
        RegexPattern { regex: Regex::new("^\\^").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Operator, "^") },
        RegexPattern { regex: Regex::new("^&").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Operator, "&") },
        RegexPattern { regex: Regex::new("^\\*").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Operator, "*") },
        RegexPattern { regex: Regex::new("^-").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Operator, "-") },
        RegexPattern { regex: Regex::new("^\\+").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Operator, "+") },
        RegexPattern { regex: Regex::new("^\\(").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Symbol, "(") },
        RegexPattern { regex: Regex::new("^\\)").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Symbol, ")") },
        RegexPattern { regex: Regex::new("^\\[").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Symbol, "[") },
        RegexPattern { regex: Regex::new("^\\]").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Symbol, "]") },
        RegexPattern { regex: Regex::new("^\\{").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Symbol, "{") },
        RegexPattern { regex: Regex::new("^\\}").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Symbol, "}") },
        RegexPattern { regex: Regex::new("^=").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Symbol, "=") },
        RegexPattern { regex: Regex::new("^,").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Symbol, ",") },
        RegexPattern { regex: Regex::new("^\\.").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Symbol, ".") },
        RegexPattern { regex: Regex::new("^;").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Symbol, ";") },
        RegexPattern { regex: Regex::new("^:").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Symbol, ":") },
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pub pos: usize,
    file: Arc<String>,
    keywords: HashSet<String>,
    keyops: HashSet<String>,
    /// Whitespace prefixes of the enclosing blocks; the bottom entry is always `""`
    indents: Vec<String>,
    /// Open `(`, `[` and `{` count; newlines inside are insignificant
    depth: usize,
    pending_newline: bool,
    recent_whitespace: String,
}

impl Lexer {
    pub fn new(
        source: String,
        file: Option<String>,
        keywords: &HashSet<&str>,
        keyops: &HashSet<&str>,
    ) -> Lexer {
        let file_name = if let Some(file) = file {
            Arc::new(file)
        } else {
            Arc::new(String::from("shell"))
        };

        Lexer {
            tokens: vec![],
            source,
            pos: 0,
            file: file_name,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            keyops: keyops.iter().map(|k| k.to_string()).collect(),
            indents: vec![String::new()],
            depth: 0,
            pending_newline: false,
            recent_whitespace: String::new(),
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    /// Pushes a content token, first emitting whatever NEWLINE, INDENT or
    /// DEDENT tokens the preceding line break calls for.
    pub fn push(&mut self, token: Token) -> Result<(), Error> {
        self.resolve_indentation(token.span.start.0 as usize)?;

        if token.kind == TokenKind::Symbol {
            match token.value.as_str() {
                "(" | "[" | "{" => self.depth += 1,
                ")" | "]" | "}" => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
        }

        self.tokens.push(token);
        Ok(())
    }

    fn emit(&mut self, kind: TokenKind, value: &str, at: usize) {
        let span = self.span(at, at);
        self.tokens.push(MK_TOKEN!(kind, String::from(value), span));
    }

    fn resolve_indentation(&mut self, at: usize) -> Result<(), Error> {
        if !self.pending_newline {
            return Ok(());
        }
        self.pending_newline = false;

        let candidate = std::mem::take(&mut self.recent_whitespace);
        let from = self.indents.last().cloned().unwrap_or_default();
        let mut popped = false;

        loop {
            let top = self.indents.last().cloned().unwrap_or_default();

            if top == candidate {
                self.emit(TokenKind::Newline, "\n", at);
                return Ok(());
            }

            if candidate.starts_with(&top) {
                // Dedenting into the middle of an enclosing level is never a new block.
                if popped {
                    break;
                }
                self.indents.push(candidate);
                self.emit(TokenKind::Indent, "", at);
                return Ok(());
            }

            if !top.starts_with(&candidate) {
                break;
            }

            self.indents.pop();
            popped = true;
            self.emit(TokenKind::Dedent, "", at);
        }

        Err(Error::new(
            ErrorImpl::IncompatibleDedent { from, to: candidate },
            self.position(at),
        ))
    }

    pub fn at(&self) -> Option<char> {
        self.remainder().chars().next()
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn position(&self, at: usize) -> Position {
        Position(at as u32, Arc::clone(&self.file))
    }

    pub fn span(&self, start: usize, end: usize) -> Span {
        Span {
            start: self.position(start),
            end: self.position(end),
        }
    }

    fn matched(&self, regex: &Regex) -> String {
        regex
            .find(self.remainder())
            .map_or(String::new(), |m| m.as_str().to_string())
    }
}

fn skip_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    lexer.advance_n(matched.len());
    Ok(())
}

fn newline_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    lexer.advance_n(matched.len());
    lexer.pending_newline = lexer.depth == 0;
    lexer.recent_whitespace.clear();
    Ok(())
}

fn whitespace_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    lexer.advance_n(matched.len());
    lexer.recent_whitespace = matched;
    Ok(())
}

fn name_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let value = lexer.matched(regex);
    let start = lexer.pos;

    let kind = if lexer.keyops.contains(&value) {
        TokenKind::Operator
    } else if lexer.keywords.contains(&value) {
        TokenKind::Keyword
    } else if value == "true" || value == "false" {
        TokenKind::Bool
    } else {
        TokenKind::Name
    };

    let span = lexer.span(start, start + value.len());
    lexer.advance_n(value.len());
    lexer.push(MK_TOKEN!(kind, value, span))
}

fn number_handler(lexer: &mut Lexer, regex: &Regex) -> Result<(), Error> {
    let matched = lexer.matched(regex);
    let start = lexer.pos;
    lexer.advance_n(matched.len());

    if lexer.at() == Some('.') {
        return Err(Error::new(
            ErrorImpl::MalformedNumber { token: format!("{}.", matched) },
            lexer.position(start),
        ));
    }

    let kind = if matched.contains('.') {
        TokenKind::Float
    } else {
        TokenKind::Number
    };

    let span = lexer.span(start, lexer.pos);
    lexer.push(MK_TOKEN!(kind, matched, span))
}

fn unescape(ch: char) -> char {
    match ch {
        'a' => '\x07',
        'b' => '\x08',
        'n' => '\n',
        'r' => '\r',
        's' => ' ',
        't' => '\t',
        // `"`, `'` and `\` stand for themselves, as does anything unknown
        other => other,
    }
}

fn string_handler(lexer: &mut Lexer, _regex: &Regex) -> Result<(), Error> {
    let start = lexer.pos;
    let invalid = |message: &str| {
        Error::new(
            ErrorImpl::InvalidString { message: message.to_string() },
            lexer.position(start),
        )
    };

    let mut result = String::new();
    let mut chars = lexer.remainder().char_indices().skip(1);

    let length = loop {
        let Some((offset, ch)) = chars.next() else {
            return Err(invalid("unterminated string"));
        };

        match ch {
            '"' => break offset + 1,
            '\\' => match chars.next() {
                None => return Err(invalid("cannot escape end of input")),
                Some((_, 'x')) => {
                    let high = chars.next().and_then(|(_, c)| c.to_digit(16));
                    let low = chars.next().and_then(|(_, c)| c.to_digit(16));

                    match (high, low) {
                        (Some(high), Some(low)) => result.push(char::from((high * 16 + low) as u8)),
                        _ => return Err(invalid("invalid hex sequence")),
                    }
                }
                Some((_, escaped)) => result.push(unescape(escaped)),
            },
            _ => result.push(ch),
        }
    };

    let span = lexer.span(start, start + length);
    lexer.advance_n(length);
    lexer.push(MK_TOKEN!(TokenKind::String, result, span))
}

/// Replaces typographic double quotes with plain ones, for code pasted from
/// word processors.
pub fn preprocess(source: &str) -> String {
    source.replace(['\u{201C}', '\u{201D}'], "\"")
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    tokenize_with(source, file, &KEYWORDS, &KEYOPS)
}

/// Tokenizes `source` with explicit keyword and keyword-operator sets.
///
/// The result always ends in an EOF token. Any lexical error aborts the
/// whole run.
pub fn tokenize_with(
    source: String,
    file: Option<String>,
    keywords: &HashSet<&str>,
    keyops: &HashSet<&str>,
) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file, keywords, keyops);

    while !lex.at_eof() {
        let mut matched = false;

        for pattern in PATTERNS.iter() {
            if pattern.regex.is_match(lex.remainder()) {
                (pattern.handler)(&mut lex, &pattern.regex)?;
                matched = true;
                break;
            }
        }

        if !matched {
            let token = lex.at().map(String::from).unwrap_or_default();
            return Err(Error::new(ErrorImpl::UnrecognisedToken { token }, lex.position(lex.pos)));
        }
    }

    let end = lex.pos;
    lex.emit(TokenKind::EOF, "", end);
    Ok(lex.tokens)
}
