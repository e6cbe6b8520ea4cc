//! Lowering of raw syntax trees to the canonical AST.
//!
//! Each function here handles one grammar rule and trusts the exact shape the
//! grammar produces for it; anything else is an internal error. Delimiters and
//! keywords are dropped, `maybe` results become `Option`s, and `split`/`cycle`
//! results become plain sequences.

use crate::{
    ast::{
        ast::{Block, Declaration, Predicate, Procedure, Program, ProgramEntry},
        expressions::{Atom, Expr, Suffix},
        statements::{Body, CaseArm, LValue, Stmt},
        types::{ArraySuffix, ElementType, ProcParameter},
    },
    errors::errors::{Error, ErrorImpl},
    parser::{
        parser::{with_parse_stack, MAX_DEPTH},
        tree::Tree,
    },
    precedence::resolver::MAX_NESTING,
    Position,
};

/// Deepest raw tree accepted: rule nesting plus one expression's nesting,
/// the most the parser produces.
pub const MAX_TREE_DEPTH: usize = MAX_DEPTH + MAX_NESTING;

fn shape_error(rule: &str, found: &Tree) -> Error {
    Error::new(
        ErrorImpl::UnexpectedShape {
            rule: rule.to_string(),
            found: found.shape().to_string(),
        },
        Position::null(),
    )
}

fn seq<'t>(tree: &'t Tree, rule: &str) -> Result<&'t [Tree], Error> {
    match tree {
        Tree::Seq(items) => Ok(items.as_slice()),
        other => Err(shape_error(rule, other)),
    }
}

fn fixed<'t, const N: usize>(tree: &'t Tree, rule: &str) -> Result<&'t [Tree; N], Error> {
    seq(tree, rule)?
        .try_into()
        .map_err(|_| shape_error(rule, tree))
}

fn tagged<'t>(tree: &'t Tree, rule: &str) -> Result<(&'t str, &'t Tree), Error> {
    match tree {
        Tree::Tagged { tag, value } => Ok((tag.as_str(), value.as_ref())),
        other => Err(shape_error(rule, other)),
    }
}

fn token<'t>(tree: &'t Tree, rule: &str) -> Result<&'t str, Error> {
    match tree {
        Tree::Token { value, .. } => Ok(value.as_str()),
        other => Err(shape_error(rule, other)),
    }
}

/// The value of a `maybe` result, if present.
fn optional<'t>(tree: &'t Tree, rule: &str) -> Result<Option<&'t Tree>, Error> {
    match seq(tree, rule)? {
        [] => Ok(None),
        [value] => Ok(Some(value)),
        _ => Err(shape_error(rule, tree)),
    }
}

/// The primaries of a `split` result, without the separators between them.
fn primaries(items: &[Tree]) -> impl Iterator<Item = &Tree> {
    items.iter().step_by(2)
}

/// Lowers the result of the `file` rule.
///
/// Trees deeper than [`MAX_TREE_DEPTH`] are rejected up front with
/// [`ErrorImpl::NestingTooDeep`]. The rest runs on the parser's stack.
pub fn lower(tree: &Tree) -> Result<Program, Error> {
    if tree.depth() > MAX_TREE_DEPTH {
        return Err(Error::new(
            ErrorImpl::NestingTooDeep {
                limit: MAX_TREE_DEPTH,
            },
            Position::null(),
        ));
    }

    with_parse_stack(|| lower_file(tree))
}

fn lower_file(tree: &Tree) -> Result<Program, Error> {
    let mut program = Program::default();

    for item in seq(tree, "file")? {
        let (tag, value) = tagged(item, "file")?;
        match tag {
            "start" => program.entries.push(lower_entry(value)?),
            "procedure" => program.procedures.push(lower_procedure(value)?),
            "newline" => {}
            _ => return Err(shape_error("file", item)),
        }
    }

    Ok(program)
}

fn lower_entry(tree: &Tree) -> Result<ProgramEntry, Error> {
    let [_, mainbody, _] = fixed::<3>(tree, "start")?;
    Ok(ProgramEntry {
        body: lower_block(mainbody)?,
    })
}

fn lower_procedure(tree: &Tree) -> Result<Procedure, Error> {
    let [name, parameters, mainbody, _] = fixed::<4>(tree, "procedure")?;

    Ok(Procedure {
        name: token(name, "procedure")?.to_string(),
        parameters: seq(parameters, "procedure")?
            .iter()
            .map(lower_predicate)
            .collect::<Result<_, _>>()?,
        body: lower_block(mainbody)?,
    })
}

fn lower_block(tree: &Tree) -> Result<Block, Error> {
    let [_, declarations, first, rest, _, _] = fixed::<6>(tree, "mainbody")?;
    let mut block = Block::default();

    if let Some(declarations) = optional(declarations, "mainbody")? {
        let [_, lines] = fixed::<2>(declarations, "declarations")?;
        for line in seq(lines, "declarations")? {
            block.declarations.push(lower_declaration(line)?);
        }
    }

    if let Some(stmt) = optional(first, "mainbody")? {
        block.statements.push(lower_stmt(stmt)?);
    }
    // newline, stmt, newline, stmt, ...
    for stmt in seq(rest, "mainbody")?.iter().skip(1).step_by(2) {
        block.statements.push(lower_stmt(stmt)?);
    }

    Ok(block)
}

fn lower_declaration(tree: &Tree) -> Result<Declaration, Error> {
    let [predicate, initial] = fixed::<2>(tree, "decline")?;

    let initial = match optional(initial, "decline")? {
        Some(assignment) => {
            let [_, value] = fixed::<2>(assignment, "decline")?;
            Some(lower_expr(value)?)
        }
        None => None,
    };

    Ok(Declaration {
        predicate: lower_predicate(predicate)?,
        initial,
    })
}

fn lower_predicate(tree: &Tree) -> Result<Predicate, Error> {
    let [element, name, suffixes] = fixed::<3>(tree, "predicate")?;

    Ok(Predicate {
        name: token(name, "predicate")?.to_string(),
        element: lower_element_type(element)?,
        suffixes: lower_array_suffixes(suffixes)?,
    })
}

fn lower_array_suffixes(tree: &Tree) -> Result<Vec<ArraySuffix>, Error> {
    seq(tree, "arraytypesuffix")?
        .iter()
        .map(|suffix| -> Result<ArraySuffix, Error> {
            Ok(ArraySuffix {
                size: optional(suffix, "arraytypesuffix")?
                    .map(lower_expr)
                    .transpose()?,
            })
        })
        .collect()
}

fn lower_element_type(tree: &Tree) -> Result<ElementType, Error> {
    let (tag, value) = tagged(tree, "elementtype")?;

    Ok(match tag {
        "bool" => ElementType::Bool,
        "num" => ElementType::Num,
        "float" => ElementType::Float,
        "string" => ElementType::String,
        "InputFile" => ElementType::InputFile,
        "OutputFile" => ElementType::OutputFile,
        "proc" => {
            let [_, parameters] = fixed::<2>(value, "proctype")?;
            let parameters = seq(parameters, "proctype")?
                .iter()
                .map(|parameter| -> Result<ProcParameter, Error> {
                    let [element, suffixes] = fixed::<2>(parameter, "proctypeparam")?;
                    Ok(ProcParameter {
                        element: lower_element_type(element)?,
                        suffixes: lower_array_suffixes(suffixes)?,
                    })
                })
                .collect::<Result<_, Error>>()?;
            ElementType::Proc(parameters)
        }
        _ => return Err(shape_error("elementtype", tree)),
    })
}

fn lower_body(tree: &Tree) -> Result<Body, Error> {
    let (tag, value) = tagged(tree, "body")?;

    let statements: Vec<Stmt> = match tag {
        "indented" => primaries(seq(value, "body")?)
            .map(lower_stmt)
            .collect::<Result<_, _>>()?,
        "unindented" => vec![lower_stmt(value)?],
        _ => return Err(shape_error("body", tree)),
    };

    Ok(Body { statements })
}

fn lower_file_clause(tree: &Tree, rule: &str) -> Result<Option<Atom>, Error> {
    match optional(tree, rule)? {
        Some(clause) => {
            let [_, atom] = fixed::<2>(clause, rule)?;
            Ok(Some(lower_atom(atom)?))
        }
        None => Ok(None),
    }
}

fn lower_stmt(tree: &Tree) -> Result<Stmt, Error> {
    let (tag, value) = tagged(tree, "stmt")?;

    match tag {
        "if" => {
            let [_, condition, _, body, alternative, _, _] = fixed::<7>(value, "if")?;
            let alternative = match optional(alternative, "if")? {
                Some(clause) => {
                    let [_, _, body] = fixed::<3>(clause, "else")?;
                    Some(lower_body(body)?)
                }
                None => None,
            };

            Ok(Stmt::If {
                condition: lower_expr(condition)?,
                body: lower_body(body)?,
                alternative,
            })
        }
        "while" => {
            let [_, condition, body, _, _] = fixed::<5>(value, "while")?;
            Ok(Stmt::While {
                condition: lower_expr(condition)?,
                body: lower_body(body)?,
            })
        }
        "for" => {
            let [_, variable, _, start, _, stop, _, step, body, _, _] = fixed::<11>(value, "for")?;
            Ok(Stmt::For {
                variable: token(variable, "for")?.to_string(),
                start: lower_expr(start)?,
                stop: lower_expr(stop)?,
                step: lower_expr(step)?,
                body: lower_body(body)?,
            })
        }
        "case" => {
            let [_, subject, _, arms, _, _, _] = fixed::<7>(value, "case")?;
            let Tree::Pair { left, right } = arms else {
                return Err(shape_error("case", arms));
            };

            let mut cases = vec![];
            if let Some(left) = left {
                for arm in primaries(seq(left, "case")?) {
                    let [test, _, body] = fixed::<3>(arm, "case_case")?;
                    cases.push(CaseArm {
                        test: lower_atom(test)?,
                        body: lower_body(body)?,
                    });
                }
            }

            let default = match right {
                Some(default) => {
                    let [_, _, body] = fixed::<3>(default, "default_case")?;
                    Some(lower_body(body)?)
                }
                None => None,
            };

            Ok(Stmt::Case {
                subject: lower_expr(subject)?,
                cases,
                default,
            })
        }
        "do" => {
            let [_, body, _, _, condition] = fixed::<5>(value, "do")?;
            Ok(Stmt::DoUntil {
                body: lower_body(body)?,
                condition: lower_expr(condition)?,
            })
        }
        "set" => {
            let [_, target, _, expr] = fixed::<4>(value, "set")?;
            Ok(Stmt::Set {
                target: lower_lvalue(target)?,
                value: lower_expr(expr)?,
            })
        }
        "input" => {
            let [_, names, file] = fixed::<3>(value, "input")?;
            Ok(Stmt::Input {
                targets: primaries(seq(names, "input")?)
                    .map(|name| token(name, "input").map(String::from))
                    .collect::<Result<_, _>>()?,
                file: lower_file_clause(file, "input")?,
            })
        }
        "output" => {
            let [_, values, file] = fixed::<3>(value, "output")?;
            Ok(Stmt::Output {
                values: primaries(seq(values, "output")?)
                    .map(lower_expr)
                    .collect::<Result<_, _>>()?,
                file: lower_file_clause(file, "output")?,
            })
        }
        "open" => {
            let [_, name, path] = fixed::<3>(value, "open")?;
            Ok(Stmt::Open {
                name: token(name, "open")?.to_string(),
                path: lower_atom(path)?,
            })
        }
        "close" => {
            let [_, name] = fixed::<2>(value, "close")?;
            Ok(Stmt::Close {
                name: token(name, "close")?.to_string(),
            })
        }
        "exprstmt" => Ok(Stmt::Expression {
            value: lower_term(value)?,
        }),
        _ => Err(shape_error("stmt", tree)),
    }
}

fn lower_lvalue(tree: &Tree) -> Result<LValue, Error> {
    let [name, subscripts] = fixed::<2>(tree, "lval")?;
    let name = token(name, "lval")?;
    let mut subscripts = seq(subscripts, "lval")?
        .iter()
        .map(lower_expr)
        .collect::<Result<Vec<_>, _>>()?;

    let Some(index) = subscripts.pop() else {
        return Ok(LValue::Variable {
            name: name.to_string(),
        });
    };

    let head = Atom::Name(name.to_string());
    let head = if subscripts.is_empty() {
        Expr::Atom(head)
    } else {
        Expr::Term {
            head,
            suffixes: subscripts.into_iter().map(Suffix::Subscript).collect(),
        }
    };

    Ok(LValue::Subscript { head, index })
}

/// Lowers an expression: a resolved operator tree over tagged terms.
pub fn lower_expr(tree: &Tree) -> Result<Expr, Error> {
    match tree {
        Tree::Infix {
            operator,
            left,
            right,
        } => Ok(Expr::Infix {
            operator: operator.clone(),
            left: Box::new(lower_expr(left)?),
            right: Box::new(lower_expr(right)?),
        }),
        Tree::Prefix { operator, right } => Ok(Expr::Prefix {
            operator: operator.clone(),
            operand: Box::new(lower_expr(right)?),
        }),
        Tree::Tagged { tag, value } if tag == "term" => lower_term(value),
        other => Err(shape_error("expr", other)),
    }
}

fn lower_term(tree: &Tree) -> Result<Expr, Error> {
    let [atom, suffixes] = fixed::<2>(tree, "term")?;
    let head = lower_atom(atom)?;
    let suffixes = seq(suffixes, "term")?;

    if suffixes.is_empty() {
        return Ok(Expr::Atom(head));
    }

    Ok(Expr::Term {
        head,
        suffixes: suffixes.iter().map(lower_suffix).collect::<Result<_, _>>()?,
    })
}

fn lower_suffix(tree: &Tree) -> Result<Suffix, Error> {
    match tagged(tree, "suffix")? {
        ("subscript", index) => Ok(Suffix::Subscript(lower_expr(index)?)),
        ("call", arguments) => Ok(Suffix::Call(
            seq(arguments, "call")?
                .iter()
                .map(lower_expr)
                .collect::<Result<_, _>>()?,
        )),
        _ => Err(shape_error("suffix", tree)),
    }
}

fn lower_atom(tree: &Tree) -> Result<Atom, Error> {
    let (tag, value) = tagged(tree, "atom")?;

    match tag {
        "group" => Ok(Atom::Group(Box::new(lower_expr(value)?))),
        "list" => Ok(Atom::List(
            seq(value, "list")?
                .iter()
                .map(lower_expr)
                .collect::<Result<_, _>>()?,
        )),
        "name" => Ok(Atom::Name(token(value, "atom")?.to_string())),
        "num" => {
            let text = token(value, "atom")?;
            text.parse().map(Atom::Num).map_err(|_| {
                Error::new(
                    ErrorImpl::NumberParseError {
                        token: text.to_string(),
                    },
                    Position::null(),
                )
            })
        }
        "float" => {
            let text = token(value, "atom")?;
            text.parse().map(Atom::Float).map_err(|_| {
                Error::new(
                    ErrorImpl::NumberParseError {
                        token: text.to_string(),
                    },
                    Position::null(),
                )
            })
        }
        "string" => Ok(Atom::String(token(value, "atom")?.to_string())),
        "bool" => Ok(Atom::Bool(token(value, "atom")? == "true")),
        _ => Err(shape_error("atom", tree)),
    }
}
