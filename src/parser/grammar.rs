use std::collections::HashSet;

use lazy_static::lazy_static;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::rules::*;

lazy_static! {
    pub static ref GRAMMAR: RuleLookup = create_grammar();
}

fn statement_body() -> Rule {
    options_or(
        vec![
            (
                "indented",
                list(
                    token("indent"),
                    expect("dedent", "expected the indented block to end"),
                    None,
                    split_or(rule("stmt"), token("newline"), "expected a statement"),
                ),
            ),
            ("unindented", rule("stmt")),
        ],
        "expected a statement or an indented block",
    )
}

fn atom() -> Rule {
    options(vec![
        (
            "group",
            list(token("("), expect(")", "expected ')' closing the group"), None, rule("expr")),
        ),
        (
            "list",
            list(
                token("["),
                expect("]", "expected ']' closing the list"),
                Some(token(",")),
                rule("expr"),
            ),
        ),
        ("name", token("name")),
        ("num", token("literal_num")),
        ("float", token("literal_float")),
        ("string", token("literal_string")),
        ("bool", token("literal_bool")),
    ])
}

pub fn create_grammar() -> RuleLookup {
    let mut rules = RuleLookup::new();

    // Top level
    rules.insert(
        "file",
        repeat(options(vec![
            ("start", rule("start")),
            ("procedure", rule("procedure")),
            ("newline", token("newline")),
        ])),
    );
    rules.insert(
        "start",
        all(vec![
            token("start"),
            rule("mainbody"),
            expect("end", "expected 'end' closing 'start'"),
        ]),
    );
    rules.insert(
        "procedure",
        all(vec![
            token("name"),
            list(
                token("("),
                expect(")", "expected ')' closing the parameter list"),
                Some(token(",")),
                rule("predicate"),
            ),
            rule("mainbody"),
            expect("return", "expected 'return' closing the procedure"),
        ]),
    );
    rules.insert(
        "mainbody",
        all(vec![
            expect("indent", "expected an indented block"),
            maybe(rule("declarations")),
            maybe(rule("stmt")),
            cycle(vec![token("newline"), rule("stmt")]),
            expect("dedent", "expected a statement or the end of the block"),
            expect("newline", "expected a new line after the block"),
        ]),
    );

    // Declarations
    rules.insert(
        "declarations",
        all(vec![
            token("Declarations"),
            list(
                expect("indent", "expected indented declarations"),
                expect("dedent", "expected a declaration or the end of the declarations"),
                Some(token("newline")),
                rule("decline"),
            ),
        ]),
    );
    rules.insert(
        "decline",
        all(vec![rule("predicate"), maybe(all(vec![token("="), rule("expr")]))]),
    );
    rules.insert(
        "predicate",
        all(vec![
            rule("elementtype"),
            expect("name", "expected a name after the type"),
            repeat(rule("arraytypesuffix")),
        ]),
    );
    rules.insert(
        "arraytypesuffix",
        list(
            token("["),
            expect("]", "expected ']' closing the array size"),
            None,
            maybe(rule("expr")),
        ),
    );
    rules.insert(
        "elementtype",
        options(vec![
            ("bool", token("bool")),
            ("num", token("num")),
            ("float", token("float")),
            ("string", token("string")),
            ("InputFile", token("InputFile")),
            ("OutputFile", token("OutputFile")),
            ("proc", rule("proctype")),
        ]),
    );
    rules.insert(
        "proctype",
        all(vec![
            token("proc"),
            list(
                expect("(", "expected '(' after 'proc'"),
                expect(")", "expected ')' closing the parameter types"),
                Some(token(",")),
                rule("proctypeparam"),
            ),
        ]),
    );
    rules.insert(
        "proctypeparam",
        all(vec![rule("elementtype"), repeat(rule("arraytypesuffix"))]),
    );

    // Statements
    rules.insert("body", statement_body());
    rules.insert(
        "stmt",
        options(vec![
            ("if", rule("if")),
            ("while", rule("while")),
            ("for", rule("for")),
            ("case", rule("case")),
            ("do", rule("do")),
            ("set", rule("set")),
            ("input", rule("input")),
            ("output", rule("output")),
            ("open", rule("open")),
            ("close", rule("close")),
            ("exprstmt", rule("term")),
        ]),
    );
    rules.insert(
        "if",
        all(vec![
            token("if"),
            rule("condition"),
            expect("then", "expected 'then' after the condition"),
            obligatory(rule("body"), "expected a body after 'then'"),
            maybe(rule("else")),
            maybe(token("newline")),
            expect("endif", "expected 'endif' closing 'if'"),
        ]),
    );
    rules.insert(
        "else",
        all(vec![token("newline"), token("else"), rule("body")]),
    );
    rules.insert(
        "while",
        all(vec![
            token("while"),
            rule("condition"),
            obligatory(rule("body"), "expected a body after the condition"),
            maybe(token("newline")),
            expect("endwhile", "expected 'endwhile' closing 'while'"),
        ]),
    );
    rules.insert(
        "for",
        all(vec![
            token("for"),
            expect("name", "expected a loop variable"),
            expect("=", "expected '=' after the loop variable"),
            rule("expr"),
            expect("to", "expected 'to' after the start value"),
            rule("expr"),
            expect("step", "expected 'step' after the stop value"),
            rule("expr"),
            obligatory(rule("body"), "expected a body after the step value"),
            maybe(token("newline")),
            expect("endfor", "expected 'endfor' closing 'for'"),
        ]),
    );
    rules.insert(
        "case",
        all(vec![
            token("case"),
            rule("expr"),
            expect("indent", "expected indented cases"),
            obligatory(
                left_optional_right(
                    split(rule("case_case"), token("newline")),
                    token("newline"),
                    rule("default_case"),
                ),
                "expected a case or a default case",
            ),
            expect("dedent", "expected a case or the end of the cases"),
            expect("newline", "expected a new line after the cases"),
            expect("endcase", "expected 'endcase' closing 'case'"),
        ]),
    );
    rules.insert(
        "case_case",
        all(vec![
            rule("atom"),
            expect(":", "expected ':' after the case value"),
            rule("body"),
        ]),
    );
    rules.insert(
        "default_case",
        all(vec![
            token("default"),
            expect(":", "expected ':' after 'default'"),
            rule("body"),
        ]),
    );
    rules.insert(
        "do",
        all(vec![
            token("do"),
            rule("body"),
            expect("newline", "expected a new line before 'until'"),
            expect("until", "expected 'until' closing 'do'"),
            rule("condition"),
        ]),
    );
    rules.insert(
        "set",
        all(vec![
            token("set"),
            rule("lval"),
            expect("=", "expected '=' after the assignment target"),
            obligatory(rule("expr"), "expected a value to assign"),
        ]),
    );
    rules.insert(
        "input",
        all(vec![
            token("input"),
            split_or(token("name"), token(","), "expected a variable to input into"),
            maybe(all(vec![token("from"), rule("atom")])),
        ]),
    );
    rules.insert(
        "output",
        all(vec![
            token("output"),
            split_or(rule("expr"), token(","), "expected a value to output"),
            maybe(all(vec![token("to"), rule("atom")])),
        ]),
    );
    rules.insert(
        "open",
        all(vec![
            token("open"),
            expect("name", "expected a file variable after 'open'"),
            rule("atom"),
        ]),
    );
    rules.insert(
        "close",
        all(vec![
            token("close"),
            expect("name", "expected a file variable after 'close'"),
        ]),
    );
    rules.insert(
        "lval",
        all(vec![token("name"), repeat(rule("subscript"))]),
    );

    // Expressions
    rules.insert(
        "subscript",
        list(token("["), expect("]", "expected ']' closing the subscript"), None, rule("expr")),
    );
    rules.insert("condition", rule("expr"));
    rules.insert(
        "expr",
        filter(
            "precedence",
            repeat(options(vec![
                ("term", rule("term")),
                ("op", token("op")),
                ("eq", token("=")),
            ])),
        ),
    );
    rules.insert(
        "term",
        all(vec![rule("atom"), repeat(rule("suffix"))]),
    );
    rules.insert(
        "suffix",
        options(vec![("subscript", rule("subscript")), ("call", rule("call"))]),
    );
    rules.insert(
        "call",
        list(
            token("("),
            expect(")", "expected ')' closing the argument list"),
            Some(token(",")),
            rule("expr"),
        ),
    );
    rules.insert("atom", atom());

    rules
}

/// Checks that every reference in `table` names a rule and that no chain of
/// plain aliases loops back on itself.
pub fn validate_grammar(table: &RuleLookup) -> Result<(), Error> {
    for (name, rule) in table.iter() {
        for reference in rule.references() {
            if !table.contains_key(reference) {
                return Err(Error::new(
                    ErrorImpl::UnknownRule {
                        rule: reference.to_string(),
                    },
                    Position::null(),
                ));
            }
        }

        let mut seen = HashSet::from([*name]);
        let mut current = rule;
        while let Rule::Reference(next) = current {
            if !seen.insert(*next) {
                return Err(Error::new(
                    ErrorImpl::TrivialCycle {
                        rule: name.to_string(),
                    },
                    Position::null(),
                ));
            }
            match table.get(next) {
                Some(rule) => current = rule,
                None => break,
            }
        }
    }

    Ok(())
}
