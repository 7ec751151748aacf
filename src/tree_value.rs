//! The binary tree value that every While program computes with.

use std::sync::Arc;

use lazy_static::lazy_static;

/// A tree value: the empty tree, an opaque labeled leaf, or a pair of
/// subtrees. Children sit behind `Arc` so clones are cheap and values can be
/// shared read-only between independent runs.
///
/// Dropping and comparing trees never recurse along the right spine, so long
/// lists and large numerals are safe on small thread stacks.
#[derive(Debug, Eq, Clone)]
pub enum Tree {
    Nil,
    Atom(String),
    Pair(Arc<Tree>, Arc<Tree>),
}

lazy_static! {
    // Stands in for children detached during drop.
    static ref detached_child: Arc<Tree> = Arc::new(Tree::Nil);
}

// Moves the pair children of `tree` onto `pending`. Leaf children are left in
// place since dropping them cannot recurse.
fn detach_children(tree: &mut Tree, pending: &mut Vec<Arc<Tree>>) {
    if let Tree::Pair(left, right) = tree {
        for child in [left, right] {
            if matches!(**child, Tree::Pair(..)) {
                pending.push(std::mem::replace(child, Arc::clone(&detached_child)));
            }
        }
    }
}

impl Drop for Tree {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(self, &mut pending);

        while let Some(child) = pending.pop() {
            // Shared children only lose a reference here.
            if let Ok(mut node) = Arc::try_unwrap(child) {
                detach_children(&mut node, &mut pending);
            }
        }
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Tree) -> bool {
        let mut pending = vec![(self, other)];

        while let Some((lhs, rhs)) = pending.pop() {
            match (lhs, rhs) {
                (Tree::Nil, Tree::Nil) => {}
                (Tree::Atom(lhs_name), Tree::Atom(rhs_name)) => {
                    if lhs_name != rhs_name {
                        return false;
                    }
                }
                (Tree::Pair(lhs_left, lhs_right), Tree::Pair(rhs_left, rhs_right)) => {
                    if !Arc::ptr_eq(lhs_right, rhs_right) {
                        pending.push((&**lhs_right, &**rhs_right));
                    }
                    if !Arc::ptr_eq(lhs_left, rhs_left) {
                        pending.push((&**lhs_left, &**rhs_left));
                    }
                }
                _ => return false,
            }
        }

        return true;
    }
}

impl Tree {
    pub fn nil() -> Tree {
        return Tree::Nil;
    }

    pub fn atom(name: &str) -> Tree {
        return Tree::Atom(String::from(name));
    }

    /// Builds `Pair(left, right)`.
    pub fn cons(left: Tree, right: Tree) -> Tree {
        return Tree::Pair(Arc::new(left), Arc::new(right));
    }

    pub fn is_nil(&self) -> bool {
        return matches!(self, Tree::Nil);
    }

    /// Left child of a pair, `Nil` for anything else.
    pub fn head(&self) -> Tree {
        match self {
            Tree::Pair(left, _) => return (**left).clone(),
            _ => return Tree::Nil,
        }
    }

    /// Right child of a pair, `Nil` for anything else.
    pub fn tail(&self) -> Tree {
        match self {
            Tree::Pair(_, right) => return (**right).clone(),
            _ => return Tree::Nil,
        }
    }

    /// Walks the right spine and returns the left elements met on the way
    /// together with the first non-pair value that ends the spine.
    pub fn right_spine(&self) -> (Vec<&Tree>, &Tree) {
        let mut elements = Vec::new();
        let mut curr_node = self;

        while let Tree::Pair(left, right) = curr_node {
            elements.push(&**left);
            curr_node = &**right;
        }

        return (elements, curr_node);
    }

    /// Number of pairs on the right spine. Left children are ignored, so this
    /// is defined for every tree and inverts `unary_number` exactly.
    pub fn right_spine_length(&self) -> usize {
        let mut length = 0;
        let mut curr_node = self;

        while let Tree::Pair(_, right) = curr_node {
            length += 1;
            curr_node = &**right;
        }

        return length;
    }

    /// A proper list is a right spine that ends in `Nil`.
    pub fn is_proper_list(&self) -> bool {
        let (_, spine_end) = self.right_spine();
        return spine_end.is_nil();
    }
}

/// Unary encoding of `n`: a right spine of `n` pairs whose left children are
/// all `Nil`.
pub fn unary_number(n: usize) -> Tree {
    let mut out = Tree::Nil;

    for _ in 0..n {
        out = Tree::cons(Tree::Nil, out);
    }

    return out;
}

/// Reads a tree as a unary numeral (see `Tree::right_spine_length`).
pub fn tree_to_number(tree: &Tree) -> usize {
    return tree.right_spine_length();
}

/// Dot notation, e.g. `( nil . ( a . nil ) )`.
impl std::fmt::Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}", crate::tree_notation::print_dot(self));
    }
}
