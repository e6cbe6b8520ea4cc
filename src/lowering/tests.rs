//! Unit tests for tree lowering.

use std::sync::Arc;

use super::lowering::{lower, MAX_TREE_DEPTH};
use crate::{
    ast::{
        ast::{Predicate, Program},
        expressions::{Atom, Expr, Suffix},
        statements::{Body, CaseArm, LValue, Stmt},
        types::{ArraySuffix, ElementType, ProcParameter},
    },
    errors::errors::ErrorImpl,
    lexer::lexer::tokenize,
    parser::{parser::parse, tree::Tree},
};

fn raw(source: &str) -> Tree {
    let tokens = tokenize(source.to_string(), Some("test.ps".to_string())).unwrap();
    parse(tokens, Arc::new("test.ps".to_string())).unwrap()
}

fn program(source: &str) -> Program {
    lower(&raw(source)).unwrap()
}

fn statements(source: &str) -> Vec<Stmt> {
    program(source).entries.remove(0).body.statements
}

fn num(value: i64) -> Expr {
    Expr::Atom(Atom::Num(value))
}

fn string(value: &str) -> Expr {
    Expr::Atom(Atom::String(value.to_string()))
}

fn infix(operator: &str, left: Expr, right: Expr) -> Expr {
    Expr::Infix {
        operator: operator.to_string(),
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn output(value: Expr) -> Stmt {
    Stmt::Output {
        values: vec![value],
        file: None,
    }
}

fn body(statements: Vec<Stmt>) -> Body {
    Body { statements }
}

#[test]
fn test_lower_declarations() {
    let source = "start
  Declarations
    num a[3]
    float x = 1.5
    proc(num, string[]) f
  set a[0] = -x
end";
    let block = program(source).entries.remove(0).body;

    assert_eq!(block.declarations.len(), 3);
    assert_eq!(
        block.declarations[0].predicate,
        Predicate {
            name: "a".to_string(),
            element: ElementType::Num,
            suffixes: vec![ArraySuffix { size: Some(num(3)) }],
        }
    );
    assert_eq!(block.declarations[0].initial, None);
    assert_eq!(block.declarations[1].predicate.element, ElementType::Float);
    assert_eq!(block.declarations[1].initial, Some(Expr::Atom(Atom::Float(1.5))));
    assert_eq!(
        block.declarations[2].predicate.element,
        ElementType::Proc(vec![
            ProcParameter {
                element: ElementType::Num,
                suffixes: vec![],
            },
            ProcParameter {
                element: ElementType::String,
                suffixes: vec![ArraySuffix { size: None }],
            },
        ])
    );
    assert_eq!(
        block.statements,
        vec![Stmt::Set {
            target: LValue::Subscript {
                head: Expr::name("a"),
                index: num(0),
            },
            value: Expr::Prefix {
                operator: "-".to_string(),
                operand: Box::new(Expr::name("x")),
            },
        }]
    );
}

#[test]
fn test_lower_control_flow() {
    let source = "start
  if x > 1 then
    output \"big\"
  else
    output \"small\"
  endif
  while x > 0
    set x = x - 1
  endwhile
  for i = 1 to 10 step 2
    output i
  endfor
  do
    input x
  until x = 0
end";

    assert_eq!(
        statements(source),
        vec![
            Stmt::If {
                condition: infix(">", Expr::name("x"), num(1)),
                body: body(vec![output(string("big"))]),
                alternative: Some(body(vec![output(string("small"))])),
            },
            Stmt::While {
                condition: infix(">", Expr::name("x"), num(0)),
                body: body(vec![Stmt::Set {
                    target: LValue::Variable {
                        name: "x".to_string()
                    },
                    value: infix("-", Expr::name("x"), num(1)),
                }]),
            },
            Stmt::For {
                variable: "i".to_string(),
                start: num(1),
                stop: num(10),
                step: num(2),
                body: body(vec![output(Expr::name("i"))]),
            },
            Stmt::DoUntil {
                body: body(vec![Stmt::Input {
                    targets: vec!["x".to_string()],
                    file: None,
                }]),
                condition: infix("=", Expr::name("x"), num(0)),
            },
        ]
    );
}

#[test]
fn test_lower_single_line_if() {
    let source = "start\n  if ok then output 1\n  endif\nend";

    assert_eq!(
        statements(source),
        vec![Stmt::If {
            condition: Expr::name("ok"),
            body: body(vec![output(num(1))]),
            alternative: None,
        }]
    );
}

#[test]
fn test_lower_case() {
    let source = "start
  case x
    1: output \"one\"
    2:
      output \"two\"
    default: output \"other\"
  endcase
end";

    assert_eq!(
        statements(source),
        vec![Stmt::Case {
            subject: Expr::name("x"),
            cases: vec![
                CaseArm {
                    test: Atom::Num(1),
                    body: body(vec![output(string("one"))]),
                },
                CaseArm {
                    test: Atom::Num(2),
                    body: body(vec![output(string("two"))]),
                },
            ],
            default: Some(body(vec![output(string("other"))])),
        }]
    );
}

#[test]
fn test_lower_case_without_default() {
    let source = "start\n  case c\n    \"a\": output 1\n  endcase\nend";

    match &statements(source)[0] {
        Stmt::Case { cases, default, .. } => {
            assert_eq!(cases.len(), 1);
            assert_eq!(cases[0].test, Atom::String("a".to_string()));
            assert_eq!(default, &None);
        }
        other => panic!("unexpected statement: {:?}", other),
    }
}

#[test]
fn test_lower_file_statements() {
    let source = "start
  open f \"data.txt\"
  input a, b from f
  output a + b, \"x\" to f
  close f
end";

    assert_eq!(
        statements(source),
        vec![
            Stmt::Open {
                name: "f".to_string(),
                path: Atom::String("data.txt".to_string()),
            },
            Stmt::Input {
                targets: vec!["a".to_string(), "b".to_string()],
                file: Some(Atom::Name("f".to_string())),
            },
            Stmt::Output {
                values: vec![infix("+", Expr::name("a"), Expr::name("b")), string("x")],
                file: Some(Atom::Name("f".to_string())),
            },
            Stmt::Close {
                name: "f".to_string()
            },
        ]
    );
}

#[test]
fn test_lower_procedures() {
    let source = "add(num a, num b)
  output a + b
return

start
  add(1, 2)
end";
    let program = program(source);

    assert_eq!(program.procedures.len(), 1);
    let procedure = &program.procedures[0];
    assert_eq!(procedure.name, "add");
    assert_eq!(
        procedure.parameters.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        vec!["a", "b"]
    );
    assert_eq!(
        procedure.body.statements,
        vec![output(infix("+", Expr::name("a"), Expr::name("b")))]
    );

    assert_eq!(program.entries.len(), 1);
    assert_eq!(
        program.entries[0].body.statements,
        vec![Stmt::Expression {
            value: Expr::Term {
                head: Atom::Name("add".to_string()),
                suffixes: vec![Suffix::Call(vec![num(1), num(2)])],
            },
        }]
    );
}

#[test]
fn test_lower_atoms_and_suffixes() {
    let source = "start\n  output [1, 2][0], f(), true, 2.5, (1)\nend";

    match &statements(source)[0] {
        Stmt::Output { values, .. } => assert_eq!(
            values,
            &vec![
                Expr::Term {
                    head: Atom::List(vec![num(1), num(2)]),
                    suffixes: vec![Suffix::Subscript(num(0))],
                },
                Expr::Term {
                    head: Atom::Name("f".to_string()),
                    suffixes: vec![Suffix::Call(vec![])],
                },
                Expr::Atom(Atom::Bool(true)),
                Expr::Atom(Atom::Float(2.5)),
                Expr::Atom(Atom::Group(Box::new(num(1)))),
            ]
        ),
        other => panic!("unexpected statement: {:?}", other),
    }
}

#[test]
fn test_lower_nested_subscript_target() {
    let source = "start\n  set m[1][2] = 3\nend";

    assert_eq!(
        statements(source),
        vec![Stmt::Set {
            target: LValue::Subscript {
                head: Expr::Term {
                    head: Atom::Name("m".to_string()),
                    suffixes: vec![Suffix::Subscript(num(1))],
                },
                index: num(2),
            },
            value: num(3),
        }]
    );
}

#[test]
fn test_integer_overflow() {
    let tree = raw("start\n  output 99999999999999999999\nend");

    assert_eq!(
        lower(&tree).unwrap_err().get_internal(),
        &ErrorImpl::NumberParseError {
            token: "99999999999999999999".to_string()
        }
    );
}

#[test]
fn test_unexpected_shape() {
    let err = lower(&Tree::token("name", "x")).unwrap_err();

    assert!(matches!(
        err.get_internal(),
        ErrorImpl::UnexpectedShape { rule, found } if rule == "file" && found == "token"
    ));
}

#[test]
fn test_lowering_is_idempotent() {
    let tree = raw("start\n  output 1 + 2 * 3\nend");

    assert_eq!(lower(&tree).unwrap(), lower(&tree).unwrap());
}

#[test]
fn test_trees_deeper_than_the_limit_are_rejected() {
    let mut tree = Tree::token("name", "x");
    for _ in 0..MAX_TREE_DEPTH {
        tree = Tree::Prefix {
            operator: "NOT".to_string(),
            right: Box::new(tree),
        };
    }

    assert_eq!(
        lower(&tree).unwrap_err().get_internal(),
        &ErrorImpl::NestingTooDeep {
            limit: MAX_TREE_DEPTH
        }
    );
}

#[test]
fn test_lower_long_operator_chain() {
    let source = format!("start\n  output 1{}\nend", " + 1".repeat(200));

    match &statements(&source)[0] {
        Stmt::Output { values, .. } => {
            let mut depth = 0;
            let mut expr = &values[0];
            while let Expr::Infix { left, .. } = expr {
                depth += 1;
                expr = left.as_ref();
            }
            assert_eq!(depth, 200);
        }
        other => panic!("unexpected statement: {:?}", other),
    }
}
