//! The rule vocabulary.
//!
//! A grammar is a table of named [`Rule`] values. The free functions below
//! build rules so the table in `grammar.rs` reads close to a grammar listing.

use std::collections::HashMap;

/// Hard-error message attached to a rule; `None` means the rule fails softly.
pub type HardError = Option<&'static str>;

#[derive(Debug, Clone)]
pub enum Rule {
    /// Another rule in the table, by name
    Reference(&'static str),
    /// A single token whose type name equals `kind`
    Type { kind: &'static str, error: HardError },
    /// Runs `rule`, then pipes its value through a named filter
    Filter { name: &'static str, rule: Box<Rule> },
    Maybe(Box<Rule>),
    Repeat(Box<Rule>),
    /// Repeats the whole ordered list; a partial pass is rolled back
    Cycle(Vec<Rule>),
    /// `primary (secondary primary)*`
    Split {
        primary: Box<Rule>,
        secondary: Box<Rule>,
        error: HardError,
    },
    All { rules: Vec<Rule>, error: HardError },
    /// Delimited element(s); only the elements are kept
    List {
        left: Box<Rule>,
        right: Box<Rule>,
        separator: Option<Box<Rule>>,
        element: Box<Rule>,
        error: HardError,
    },
    /// Ordered alternatives; the first success is tagged with its name
    Options {
        options: Vec<(&'static str, Rule)>,
        error: HardError,
    },
    Obligatory { rule: Box<Rule>, error: &'static str },
    /// `left (separator right)?`, or `right` alone
    LeftOptionalRight {
        left: Box<Rule>,
        separator: Box<Rule>,
        right: Box<Rule>,
    },
}

pub type RuleLookup = HashMap<&'static str, Rule>;

pub fn rule(name: &'static str) -> Rule {
    Rule::Reference(name)
}

pub fn token(kind: &'static str) -> Rule {
    Rule::Type { kind, error: None }
}

/// A token that must be present; its absence is a syntax error.
pub fn expect(kind: &'static str, error: &'static str) -> Rule {
    Rule::Type {
        kind,
        error: Some(error),
    }
}

pub fn filter(name: &'static str, rule: Rule) -> Rule {
    Rule::Filter {
        name,
        rule: Box::new(rule),
    }
}

pub fn maybe(rule: Rule) -> Rule {
    Rule::Maybe(Box::new(rule))
}

pub fn repeat(rule: Rule) -> Rule {
    Rule::Repeat(Box::new(rule))
}

pub fn cycle(rules: Vec<Rule>) -> Rule {
    Rule::Cycle(rules)
}

pub fn split(primary: Rule, secondary: Rule) -> Rule {
    Rule::Split {
        primary: Box::new(primary),
        secondary: Box::new(secondary),
        error: None,
    }
}

pub fn split_or(primary: Rule, secondary: Rule, error: &'static str) -> Rule {
    Rule::Split {
        primary: Box::new(primary),
        secondary: Box::new(secondary),
        error: Some(error),
    }
}

pub fn all(rules: Vec<Rule>) -> Rule {
    Rule::All { rules, error: None }
}

pub fn all_or(rules: Vec<Rule>, error: &'static str) -> Rule {
    Rule::All {
        rules,
        error: Some(error),
    }
}

pub fn list(left: Rule, right: Rule, separator: Option<Rule>, element: Rule) -> Rule {
    Rule::List {
        left: Box::new(left),
        right: Box::new(right),
        separator: separator.map(Box::new),
        element: Box::new(element),
        error: None,
    }
}

pub fn options(options: Vec<(&'static str, Rule)>) -> Rule {
    Rule::Options {
        options,
        error: None,
    }
}

pub fn options_or(options: Vec<(&'static str, Rule)>, error: &'static str) -> Rule {
    Rule::Options {
        options,
        error: Some(error),
    }
}

pub fn obligatory(rule: Rule, error: &'static str) -> Rule {
    Rule::Obligatory {
        rule: Box::new(rule),
        error,
    }
}

pub fn left_optional_right(left: Rule, separator: Rule, right: Rule) -> Rule {
    Rule::LeftOptionalRight {
        left: Box::new(left),
        separator: Box::new(separator),
        right: Box::new(right),
    }
}

impl Rule {
    /// Names this rule refers to directly or through nested sub-rules.
    pub fn references(&self) -> Vec<&'static str> {
        let mut names = vec![];
        self.collect_references(&mut names);
        names
    }

    fn collect_references(&self, names: &mut Vec<&'static str>) {
        match self {
            Rule::Reference(name) => names.push(*name),
            Rule::Type { .. } => {}
            Rule::Filter { rule, .. }
            | Rule::Maybe(rule)
            | Rule::Repeat(rule)
            | Rule::Obligatory { rule, .. } => rule.collect_references(names),
            Rule::Cycle(rules) | Rule::All { rules, .. } => {
                for rule in rules {
                    rule.collect_references(names);
                }
            }
            Rule::Split {
                primary, secondary, ..
            } => {
                primary.collect_references(names);
                secondary.collect_references(names);
            }
            Rule::List {
                left,
                right,
                separator,
                element,
                ..
            } => {
                left.collect_references(names);
                right.collect_references(names);
                if let Some(separator) = separator {
                    separator.collect_references(names);
                }
                element.collect_references(names);
            }
            Rule::Options { options, .. } => {
                for (_, rule) in options {
                    rule.collect_references(names);
                }
            }
            Rule::LeftOptionalRight {
                left,
                separator,
                right,
            } => {
                left.collect_references(names);
                separator.collect_references(names);
                right.collect_references(names);
            }
        }
    }
}
