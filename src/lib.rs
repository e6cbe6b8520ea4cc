#![allow(clippy::module_inception)]

use std::sync::Arc;

use serde::Serialize;

use crate::{
    ast::ast::Program,
    errors::errors::{Error, ErrorTip},
    lexer::lexer::tokenize,
    lowering::lowering::lower,
    parser::parser::parse,
};

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod lowering;
pub mod macros;
pub mod parser;
pub mod precedence;

extern crate regex;

#[derive(Debug, Clone)]
pub struct Position(pub u32, pub Arc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Arc::new(String::from("<null>")))
    }
}

#[derive(Debug, Clone)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Runs the whole front end over `source`: tokens, raw tree, then the
/// canonical program.
pub fn parse_program(source: String, file: Option<String>) -> Result<Program, Error> {
    let file_name = Arc::new(file.clone().unwrap_or_else(|| String::from("shell")));
    let tokens = tokenize(source, file)?;
    let tree = parse(tokens, file_name)?;
    lower(&tree)
}

/// JSON rendering of a raw tree or AST, indented unless `compact`.
pub fn to_json<T: Serialize>(value: &T, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
}

/// Line number (1-based), line text and column of a byte offset in `source`.
pub fn get_line_at_position(source: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;
    let mut start = 0;

    for (index, line) in source.split_inclusive('\n').enumerate() {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return Some((index + 1, line.to_string(), pos - start));
        }

        start = end;
    }

    // End of input sits just past the last character
    if pos == source.len() {
        let line_number = source.matches('\n').count() + 1;
        let line = source.rsplit('\n').next().unwrap_or_default();
        return Some((line_number, line.to_string(), line.len()));
    }

    None
}

pub fn display_error(error: &Error, source: &str, file: &str) {
    /*
        Error: SyntaxError (expected 'endif' closing 'if')
        -> sample.ps
           |
        20 |   output x
           |           ^
    */

    if let ErrorTip::None = error.get_tip() {
        eprintln!("Error: {}", error.get_error_name());
    } else {
        eprintln!("Error: {} ({})", error.get_error_name(), error.get_tip());
    }
    eprintln!("-> {}", file);

    let position = error.get_position();
    let Some((line, line_text, line_pos)) = get_line_at_position(source, position.0) else {
        eprintln!("   {}", error);
        return;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;
    eprintln!("{:>padding$}", "|");

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    eprintln!("{} | {}", line_string, line_text_removed.trim_end());

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    eprintln!("{:>padding$} {:->arrows$}", "|", "^");
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' || c == '\t' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_get_line_at_position() {
        let source = "Hello, world!\n\nstart\n  Testing { }\n";

        let (line_number, line, line_pos) = super::get_line_at_position(source, 10).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line, "Hello, world!\n");
        assert_eq!(line_pos, 10);

        let (line_number, line, line_pos) = super::get_line_at_position(source, 31).unwrap();
        assert_eq!(line_number, 4);
        assert_eq!(line, "  Testing { }\n");
        assert_eq!(line_pos, 10);

        assert!(super::get_line_at_position(source, 100).is_none());
    }

    #[test]
    fn test_end_of_input_position() {
        let (line_number, line, line_pos) = super::get_line_at_position("a\nend", 5).unwrap();
        assert_eq!(line_number, 2);
        assert_eq!(line, "end");
        assert_eq!(line_pos, 3);
    }

    #[test]
    fn test_remove_starting_whitespace() {
        assert_eq!(
            super::remove_starting_whitespace("  \toutput x"),
            (String::from("output x"), 3)
        );
    }

    #[test]
    fn test_to_json() {
        let program = super::parse_program(String::from("start\n  output 1 + 2\nend"), None).unwrap();

        let compact = super::to_json(&program, true).unwrap();
        let pretty = super::to_json(&program, false).unwrap();
        assert!(!compact.contains('\n'));
        assert!(pretty.contains('\n'));
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&compact).unwrap(),
            serde_json::from_str::<serde_json::Value>(&pretty).unwrap()
        );
    }

    #[test]
    fn test_parse_program() {
        let program = super::parse_program(String::from("start\n  output 1\nend\n"), None).unwrap();
        assert_eq!(program.entries.len(), 1);
        assert!(program.procedures.is_empty());
    }
}
