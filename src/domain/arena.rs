use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::model::{AllocNode, AllocRule};

/// Flattened view of one allocation tree node.
#[derive(Debug)]
pub struct ArenaNode<'t> {
    /// Node in the owned tree this entry was built from
    pub node: &'t AllocNode,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in tree order
    pub children: Vec<Index>,
}

impl ArenaNode<'_> {
    pub fn id(&self) -> &str {
        &self.node.id
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    pub fn rule(&self) -> &AllocRule {
        &self.node.rule
    }
}

/// A leaf reached from the root, with the names of its ancestors.
///
/// `path` excludes both the root (which stands for "no recipient") and the
/// leaf itself.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafPath<'t> {
    pub node: &'t AllocNode,
    pub path: Vec<String>,
}

/// Arena index over a borrowed allocation tree.
///
/// Gives parent links and O(1) id lookups without changing the owned
/// tree's shape.
#[derive(Debug)]
pub struct AllocArena<'t> {
    arena: Arena<ArenaNode<'t>>,
    root: Option<Index>,
    by_id: HashMap<&'t str, Index>,
    duplicates: Vec<&'t str>,
}

impl<'t> AllocArena<'t> {
    #[instrument(level = "trace", skip(root), fields(root = %root.id))]
    pub fn from_root(root: &'t AllocNode) -> Self {
        let mut tree = Self {
            arena: Arena::new(),
            root: None,
            by_id: HashMap::new(),
            duplicates: Vec::new(),
        };
        let mut stack = vec![(root, None)];

        // Children are pushed in reverse so insertion follows preorder
        while let Some((node, parent)) = stack.pop() {
            let idx = tree.insert_node(node, parent);
            for child in node.children.iter().rev() {
                stack.push((child, Some(idx)));
            }
        }
        tree
    }

    fn insert_node(&mut self, node: &'t AllocNode, parent: Option<Index>) -> Index {
        let idx = self.arena.insert(ArenaNode {
            node,
            parent,
            children: Vec::new(),
        });

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(idx);
            }
        } else {
            self.root = Some(idx);
        }

        if self.by_id.insert(node.id.as_str(), idx).is_some() {
            self.duplicates.push(node.id.as_str());
        }
        idx
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn get_node(&self, idx: Index) -> Option<&ArenaNode<'t>> {
        self.arena.get(idx)
    }

    /// Look up a node by id. With duplicate ids the last one in preorder wins.
    pub fn find(&self, id: &str) -> Option<Index> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Ids that occur more than once, in order of their repeated occurrence.
    pub fn duplicate_ids(&self) -> &[&'t str] {
        &self.duplicates
    }

    pub fn iter(&self) -> PreOrderIterator<'_, 't> {
        PreOrderIterator::new(self)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self) -> usize {
        self.root.map(|r| self.calculate_depth(r)).unwrap_or(0)
    }

    fn calculate_depth(&self, idx: Index) -> usize {
        self.get_node(idx)
            .map(|node| {
                1 + node
                    .children
                    .iter()
                    .map(|&child| self.calculate_depth(child))
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }

    /// Ancestor names of `idx`, excluding the root and the node itself.
    pub fn path_of(&self, idx: Index) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = self.get_node(idx).and_then(|n| n.parent);
        while let Some(parent_idx) = current {
            match self.get_node(parent_idx) {
                Some(parent) if parent.parent.is_some() => {
                    path.push(parent.name().to_string());
                    current = parent.parent;
                }
                _ => break,
            }
        }
        path.reverse();
        path
    }

    /// All recipient leaves in preorder. A childless root is not a recipient.
    #[instrument(level = "debug", skip(self))]
    pub fn leaves(&self) -> Vec<LeafPath<'t>> {
        let mut leaves = Vec::new();
        if let Some(root) = self.root {
            self.collect_leaves(root, &mut Vec::new(), &mut leaves);
        }
        leaves
    }

    fn collect_leaves(&self, idx: Index, path: &mut Vec<String>, leaves: &mut Vec<LeafPath<'t>>) {
        let Some(node) = self.get_node(idx) else {
            return;
        };
        if node.children.is_empty() {
            if node.parent.is_some() {
                leaves.push(LeafPath {
                    node: node.node,
                    path: path.clone(),
                });
            }
            return;
        }

        let pushed = node.parent.is_some();
        if pushed {
            path.push(node.name().to_string());
        }
        for &child in &node.children {
            self.collect_leaves(child, path, leaves);
        }
        if pushed {
            path.pop();
        }
    }
}

pub struct PreOrderIterator<'a, 't> {
    arena: &'a AllocArena<'t>,
    stack: Vec<Index>,
}

impl<'a, 't> PreOrderIterator<'a, 't> {
    fn new(arena: &'a AllocArena<'t>) -> Self {
        let stack = arena.root().into_iter().collect();
        Self { arena, stack }
    }
}

impl<'a, 't> Iterator for PreOrderIterator<'a, 't> {
    type Item = (Index, &'a ArenaNode<'t>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
