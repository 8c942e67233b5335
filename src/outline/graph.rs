use std::collections::HashMap;

pub const EMPTY_LABEL: &str = "(empty)";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineNode {
    pub id: usize,
    pub label: String,
    pub depth: usize,
    pub root_id: usize,
    pub parent: Option<usize>,
}

impl OutlineNode {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Directed parent -> child link between two node ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
}

/// One parsed outline block. Node ids are indices into `nodes`.
#[derive(Clone, Debug, Default)]
pub struct Outline {
    pub nodes: Vec<OutlineNode>,
    pub edges: Vec<Edge>,
    /// Nodes whose indentation pointed at a missing ancestor and were
    /// promoted to roots.
    pub demoted: usize,
}

impl Outline {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    pub fn root_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .filter(|node| node.is_root())
            .map(|node| node.id)
    }

    /// Group index for every node (groups are numbered by the document
    /// order of their root), plus the number of groups.
    pub fn group_assignment(&self) -> (Vec<usize>, usize) {
        let mut group_by_root: HashMap<usize, usize> = HashMap::new();
        let mut groups = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let next = group_by_root.len();
            let group = *group_by_root.entry(node.root_id).or_insert(next);
            groups.push(group);
        }
        (groups, group_by_root.len())
    }
}
