use std::{collections::HashMap, iter::Peekable, vec::IntoIter};

use crate::errors::errors::ErrorImpl;

/// Capability bits of one element of an operator/term sequence.
pub const TERM: u8 = 8;
pub const INFIX: u8 = 4;
pub const PREFIX: u8 = 2;
/// Reserved; no operator of the language is a suffix.
pub const SUFFIX: u8 = 1;

/// Deepest operator nesting a resolved expression may have.
pub const MAX_NESTING: usize = 256;

/// One element of a flat expression sequence, before association.
#[derive(Debug, Clone, PartialEq)]
pub enum Element<T> {
    Term(T),
    Operator(String),
}

/// Binding powers per operator: `(left, right)` for infix use, a right
/// power for prefix use. Left powers are even and right powers odd.
#[derive(Debug, Clone, Default)]
pub struct BindingPowers {
    pub infix: HashMap<String, (u32, u32)>,
    pub prefix: HashMap<String, u32>,
}

impl BindingPowers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_infix(mut self, operators: &[&str], left: u32, right: u32) -> Self {
        for operator in operators {
            self.infix.insert(operator.to_string(), (left, right));
        }
        self
    }

    pub fn with_prefix(mut self, operators: &[&str], right: u32) -> Self {
        for operator in operators {
            self.prefix.insert(operator.to_string(), right);
        }
        self
    }

    pub fn mask(&self, operator: &str) -> u8 {
        let infix = if self.infix.contains_key(operator) { INFIX } else { 0 };
        let prefix = if self.prefix.contains_key(operator) { PREFIX } else { 0 };
        infix | prefix
    }

    /// True when no power value can be shared between a left and a right slot.
    pub fn is_well_formed(&self) -> bool {
        self.infix.values().all(|(left, right)| left % 2 == 0 && right % 2 == 1)
            && self.prefix.values().all(|right| right % 2 == 1)
    }
}

fn contradiction(message: &str, positions: Vec<usize>, masks: &[u8]) -> ErrorImpl {
    ErrorImpl::Contradiction {
        message: message.to_string(),
        positions,
        masks: masks.to_vec(),
    }
}

/// Narrows every mask to exactly one capability, scanning right to left.
///
/// After a term an operator must act as infix; after an operator, as
/// prefix. A leading ambiguous operator is a prefix.
pub fn decide_kinds(masks: &[u8]) -> Result<Vec<u8>, ErrorImpl> {
    if masks.is_empty() {
        return Err(contradiction("empty expression", vec![], masks));
    }

    let mut keys = masks.to_vec();
    let last = keys.len() - 1;

    if keys[0] == INFIX | PREFIX {
        keys[0] = PREFIX;
    }

    if keys[0] == INFIX {
        return Err(contradiction("expression starts with an infix operator", vec![0], &keys));
    }
    if keys[last] != TERM {
        return Err(contradiction("expression ends with an operator", vec![last], &keys));
    }
    let unknown: Vec<usize> = keys
        .iter()
        .enumerate()
        .filter(|(_, key)| **key == 0)
        .map(|(i, _)| i)
        .collect();
    if !unknown.is_empty() {
        return Err(contradiction("operator is neither infix nor prefix", unknown, &keys));
    }

    for i in (0..last).rev() {
        if keys[i] == TERM {
            if keys[i + 1] & INFIX == 0 {
                return Err(contradiction(
                    "a term must be followed by an infix operator",
                    vec![i, i + 1],
                    &keys,
                ));
            }
            keys[i + 1] = INFIX;
        } else if keys[i + 1] == INFIX | PREFIX {
            keys[i + 1] = PREFIX;
        } else if keys[i + 1] == INFIX {
            return Err(contradiction(
                "an operator cannot be followed by an infix operator",
                vec![i, i + 1],
                &keys,
            ));
        }
    }

    Ok(keys)
}

enum Slot<T> {
    Term(T),
    Infix(String, u32, u32),
    Prefix(String, u32),
}

fn too_deep() -> ErrorImpl {
    ErrorImpl::NestingTooDeep { limit: MAX_NESTING }
}

/// Height of a node built over children of height `height`.
fn grow(height: usize) -> Result<usize, ErrorImpl> {
    match height + 1 {
        height if height > MAX_NESTING => Err(too_deep()),
        height => Ok(height),
    }
}

struct Associator<T, I, P>
where
    I: FnMut(String, T, T) -> T,
    P: FnMut(String, T) -> T,
{
    slots: Peekable<IntoIter<Slot<T>>>,
    infix_fn: I,
    prefix_fn: P,
}

impl<T, I, P> Associator<T, I, P>
where
    I: FnMut(String, T, T) -> T,
    P: FnMut(String, T) -> T,
{
    fn remaining(&self) -> ErrorImpl {
        ErrorImpl::AssociationError { remaining: self.slots.len() }
    }

    /// A term, or a prefix operator applied to everything binding tighter
    /// than its right power.
    fn operand(&mut self, depth: usize) -> Result<(T, usize), ErrorImpl> {
        if depth > MAX_NESTING {
            return Err(too_deep());
        }

        match self.slots.next() {
            Some(Slot::Term(term)) => Ok((term, 0)),
            Some(Slot::Prefix(operator, right)) => {
                let (operand, height) = self.expression(Some(right), depth + 1)?;
                Ok(((self.prefix_fn)(operator, operand), grow(height)?))
            }
            _ => Err(self.remaining()),
        }
    }

    /// The maximal expression whose infix operators all bind tighter than
    /// `binding`, with its height.
    fn expression(&mut self, binding: Option<u32>, depth: usize) -> Result<(T, usize), ErrorImpl> {
        let (mut lhs, mut height) = self.operand(depth)?;

        // Left and right powers never coincide, so `<` decides associativity.
        while let Some(&Slot::Infix(_, left, _)) = self.slots.peek() {
            if binding >= Some(left) {
                break;
            }
            let Some(Slot::Infix(operator, _, right)) = self.slots.next() else {
                return Err(self.remaining());
            };

            let (rhs, rhs_height) = self.expression(Some(right), depth + 1)?;
            lhs = (self.infix_fn)(operator, lhs, rhs);
            height = grow(height.max(rhs_height))?;
        }

        Ok((lhs, height))
    }
}

/// Associates a flat sequence of terms and operators into a single tree.
///
/// `infix_fn(operator, left, right)` and `prefix_fn(operator, operand)`
/// build the tree nodes. Sequences that cannot be read as one expression
/// are a [`ErrorImpl::Contradiction`]; results nested deeper than
/// [`MAX_NESTING`] operators are [`ErrorImpl::NestingTooDeep`].
pub fn resolve<T, I, P>(
    elements: Vec<Element<T>>,
    powers: &BindingPowers,
    infix_fn: I,
    prefix_fn: P,
) -> Result<T, ErrorImpl>
where
    I: FnMut(String, T, T) -> T,
    P: FnMut(String, T) -> T,
{
    let masks: Vec<u8> = elements
        .iter()
        .map(|element| match element {
            Element::Term(_) => TERM,
            Element::Operator(operator) => powers.mask(operator),
        })
        .collect();

    let keys = decide_kinds(&masks)?;

    let mut slots = Vec::with_capacity(elements.len());
    for (position, (element, key)) in elements.into_iter().zip(keys.iter()).enumerate() {
        let slot = match (element, *key) {
            (Element::Term(term), TERM) => Some(Slot::Term(term)),
            (Element::Operator(operator), INFIX) => powers
                .infix
                .get(&operator)
                .copied()
                .map(|(left, right)| Slot::Infix(operator, left, right)),
            (Element::Operator(operator), PREFIX) => powers
                .prefix
                .get(&operator)
                .copied()
                .map(|right| Slot::Prefix(operator, right)),
            _ => None,
        };

        match slot {
            Some(slot) => slots.push(slot),
            None => return Err(contradiction("inconsistent classification", vec![position], &keys)),
        }
    }

    let mut associator = Associator {
        slots: slots.into_iter().peekable(),
        infix_fn,
        prefix_fn,
    };
    let (tree, _) = associator.expression(None, 0)?;

    if associator.slots.peek().is_some() {
        return Err(associator.remaining());
    }
    Ok(tree)
}
