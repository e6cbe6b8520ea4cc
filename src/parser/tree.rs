use serde::{Deserialize, Serialize};

/// Grammar-shaped parse output.
///
/// Every combinator of the rule vocabulary produces one of these shapes, so
/// a raw tree can be written out as JSON and read back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Tree {
    /// A matched token, by grammar type name and text
    Token { kind: String, value: String },
    /// Results of `all`, `maybe`, `repeat`, `cycle`, `split` and separated `list`
    Seq(Vec<Tree>),
    /// The winning alternative of an `options` rule
    Tagged { tag: String, value: Box<Tree> },
    /// Result of `left-optional-right`
    Pair {
        left: Option<Box<Tree>>,
        right: Option<Box<Tree>>,
    },
    Infix {
        operator: String,
        left: Box<Tree>,
        right: Box<Tree>,
    },
    Prefix { operator: String, right: Box<Tree> },
}

impl Tree {
    pub fn token(kind: &str, value: &str) -> Tree {
        Tree::Token {
            kind: kind.to_string(),
            value: value.to_string(),
        }
    }

    pub fn tagged(tag: &str, value: Tree) -> Tree {
        Tree::Tagged {
            tag: tag.to_string(),
            value: Box::new(value),
        }
    }

    /// Number of nodes on the longest path from this node to a leaf.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];

        while let Some((tree, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            match tree {
                Tree::Token { .. } => {}
                Tree::Seq(items) => pending.extend(items.iter().map(|item| (item, depth + 1))),
                Tree::Tagged { value, .. } => pending.push((value.as_ref(), depth + 1)),
                Tree::Pair { left, right } => {
                    pending.extend(left.iter().chain(right.iter()).map(|side| (side.as_ref(), depth + 1)))
                }
                Tree::Infix { left, right, .. } => {
                    pending.push((left.as_ref(), depth + 1));
                    pending.push((right.as_ref(), depth + 1));
                }
                Tree::Prefix { right, .. } => pending.push((right.as_ref(), depth + 1)),
            }
        }

        deepest
    }

    /// Variant name, for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Tree::Token { .. } => "token",
            Tree::Seq(_) => "seq",
            Tree::Tagged { .. } => "tagged",
            Tree::Pair { .. } => "pair",
            Tree::Infix { .. } => "infix",
            Tree::Prefix { .. } => "prefix",
        }
    }
}
