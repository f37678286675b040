use std::collections::HashMap;

use super::MappedAccount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the account in the input the tree was built from
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub account: MappedAccount,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Mapped accounts arranged by their backend parent/child relationship.
///
/// Nodes live in a flat arena and reference each other by index. An account whose parent isn't
/// one of the mapped accounts (e.g. a backend default group) becomes a root.
#[derive(Debug, Clone, Default)]
pub struct AccountTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl AccountTree {
    pub fn build(accounts: impl IntoIterator<Item = MappedAccount>) -> Self {
        let nodes: Vec<Node> = accounts
            .into_iter()
            .map(|account| Node {
                account,
                parent: None,
                children: vec![],
            })
            .collect();

        // If several accounts map to the same target, children attach to the first one
        let mut by_target: HashMap<&str, NodeId> = HashMap::new();
        for (index, node) in nodes.iter().enumerate() {
            by_target
                .entry(node.account.target_identifier.as_str())
                .or_insert(NodeId(index));
        }
        let parents: Vec<Option<NodeId>> = nodes
            .iter()
            .map(|node| {
                by_target
                    .get(node.account.parent_target_identifier.as_str())
                    .copied()
            })
            .collect();

        let mut tree = Self {
            nodes,
            roots: vec![],
        };
        for (index, parent) in parents.into_iter().enumerate() {
            let id = NodeId(index);
            match parent {
                Some(parent) if !tree.is_ancestor_or_self(id, parent) => {
                    tree.nodes[index].parent = Some(parent);
                    tree.nodes[parent.0].children.push(id);
                }
                Some(_) => {
                    log::warn!(
                        "Account {} would be its own ancestor in the backend hierarchy, treating it as top-level",
                        tree.nodes[index].account.source_name,
                    );
                    tree.roots.push(id);
                }
                None => tree.roots.push(id),
            }
        }
        tree
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes[node.0].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in input order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.nodes[id.0].parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent.0].parent;
        }
        depth
    }

    /// Node ids grouped by depth, roots first. Within a level, nodes keep their input order.
    pub fn levels(&self) -> Vec<Vec<NodeId>> {
        let mut levels: Vec<Vec<NodeId>> = vec![];
        for index in 0..self.nodes.len() {
            let id = NodeId(index);
            let depth = self.depth(id);
            if levels.len() <= depth {
                levels.resize_with(depth + 1, Vec::new);
            }
            levels[depth].push(id);
        }
        levels
    }

    /// Depth-first walk below `root`. `visit` gets every node and its depth relative to `root`.
    pub fn walk_subtree(&self, root: NodeId, mut visit: impl FnMut(&Node, usize)) {
        self.walk_from(root, 0, &mut visit);
    }

    fn walk_from(&self, id: NodeId, depth: usize, visit: &mut impl FnMut(&Node, usize)) {
        let node = &self.nodes[id.0];
        visit(node, depth);
        for child in &node.children {
            self.walk_from(*child, depth + 1, visit);
        }
    }
}
