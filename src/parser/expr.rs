use crate::{
    errors::errors::{Error, ErrorImpl},
    precedence::resolver::{resolve, Element, MAX_NESTING},
};

use super::{lookups::BINDING_POWERS, parser::Parser, tree::Tree};

/// Folds the flat `term`/`op`/`eq` sequence matched by the `expr` rule into
/// one expression tree.
///
/// An empty sequence is a soft failure. A sequence that cannot be read as a
/// single expression is a hard error at the start of the expression, and so
/// is an expression, nested groups included, deeper than [`MAX_NESTING`].
pub fn parse_precedence(parser: &Parser, start: usize, value: Tree) -> Result<Option<Tree>, Error> {
    let Tree::Seq(items) = value else {
        return Ok(None);
    };

    if items.is_empty() {
        return Ok(None);
    }

    let elements = items
        .into_iter()
        .map(|item| match item {
            Tree::Tagged { ref tag, ref value } if tag != "term" => match value.as_ref() {
                Tree::Token { value, .. } => Element::Operator(value.clone()),
                _ => Element::Term(item.clone()),
            },
            term => Element::Term(term),
        })
        .collect();

    let tree = resolve(
        elements,
        &BINDING_POWERS,
        |operator, left, right| Tree::Infix {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        },
        |operator, right| Tree::Prefix {
            operator,
            right: Box::new(right),
        },
    )
    .map_err(|internal| Error::new(internal, parser.get_position(start)))?;

    if tree.depth() > MAX_NESTING {
        return Err(Error::new(
            ErrorImpl::NestingTooDeep { limit: MAX_NESTING },
            parser.get_position(start),
        ));
    }

    Ok(Some(tree))
}
