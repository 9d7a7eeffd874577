use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

use crate::core::split::Bipartition;
use crate::core::types::LegoNode;

/// Node of a tree or fusion graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphNode {
    /// Unnamed internal node
    Clade,
    /// Gene or fusion point
    Leaf(LegoNode),
}

impl GraphNode {
    pub fn as_leaf(&self) -> Option<LegoNode> {
        match self {
            Self::Leaf(node) => Some(*node),
            Self::Clade => None,
        }
    }
}

/// Directed graph of clades and leaves.
///
/// Trees point from the root towards the leaves. Fusion graphs may have
/// several roots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegoGraph {
    pub graph: DiGraph<GraphNode, ()>,
}

impl LegoGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_clade(&mut self) -> NodeIndex {
        self.graph.add_node(GraphNode::Clade)
    }

    /// Add a leaf node, or return the existing node for `node`
    pub fn add_leaf(&mut self, node: LegoNode) -> NodeIndex {
        match self.find_leaf(node) {
            Some(index) => index,
            None => self.graph.add_node(GraphNode::Leaf(node)),
        }
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, ());
        }
    }

    pub fn find_leaf(&self, node: LegoNode) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .find(|&i| self.graph[i] == GraphNode::Leaf(node))
    }

    /// All genes and fusion points in the graph
    pub fn leaves(&self) -> BTreeSet<LegoNode> {
        self.graph
            .node_weights()
            .filter_map(GraphNode::as_leaf)
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Nodes without incoming edges
    pub fn roots(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&i| {
                self.graph
                    .neighbors_directed(i, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect()
    }

    /// The first root, if any
    pub fn root(&self) -> Option<NodeIndex> {
        self.roots().into_iter().next()
    }

    pub fn children(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<_> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        children.sort();
        children
    }

    /// Neighbours in either direction
    pub fn neighbours(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut result: Vec<_> = self.graph.neighbors_undirected(node).collect();
        result.sort();
        result.dedup();
        result
    }

    /// Leaves reachable from `start` without passing through `blocked`
    pub fn leaves_beyond(&self, start: NodeIndex, blocked: NodeIndex) -> BTreeSet<LegoNode> {
        let mut seen = HashSet::from([blocked, start]);
        let mut stack = vec![start];
        let mut leaves = BTreeSet::new();

        while let Some(node) = stack.pop() {
            if let GraphNode::Leaf(leaf) = self.graph[node] {
                leaves.insert(leaf);
            }

            for next in self.graph.neighbors_undirected(node) {
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }

        leaves
    }

    /// Copy of a rooted tree with a bifurcating root collapsed into a
    /// single edge between its two children.
    pub fn to_unrooted(&self) -> LegoGraph {
        let mut result = self.clone();

        let Some(root) = result.root() else {
            return result;
        };

        if result.graph[root] != GraphNode::Clade {
            return result;
        }

        let children = result.children(root);
        if let [first, second] = children[..] {
            // Keep a clade at the top so the copy still has a root
            let (parent, child) = if result.graph[second] == GraphNode::Clade {
                (second, first)
            } else {
                (first, second)
            };
            result.graph.add_edge(parent, child, ());
            result.graph.remove_node(root);
        }

        result
    }

    /// Newick text for the graph, starting from its first root.
    ///
    /// Clades are unnamed; leaves are named by `namer`.
    pub fn to_newick(&self, namer: impl Fn(&LegoNode) -> String) -> String {
        let Some(root) = self.root() else {
            return ";".to_string();
        };

        let mut visited = HashSet::new();
        let mut text = String::new();
        self.write_newick(root, &namer, &mut visited, &mut text);
        text.push(';');
        text
    }

    fn write_newick(
        &self,
        node: NodeIndex,
        namer: &impl Fn(&LegoNode) -> String,
        visited: &mut HashSet<NodeIndex>,
        text: &mut String,
    ) {
        visited.insert(node);

        // Leaves first, in node order, then clades
        let mut next: Vec<_> = self
            .neighbours(node)
            .into_iter()
            .filter(|n| !visited.contains(n))
            .collect();
        next.sort_by_key(|&n| (self.graph[n] == GraphNode::Clade, self.graph[n].as_leaf(), n));

        if !next.is_empty() {
            text.push('(');
            let mut first = true;
            for child in next {
                // Fusion graphs can reach a shared leaf twice
                if visited.contains(&child) {
                    continue;
                }
                if !first {
                    text.push(',');
                }
                first = false;
                self.write_newick(child, namer, visited, text);
            }
            text.push(')');
        }

        if let GraphNode::Leaf(leaf) = self.graph[node] {
            text.push_str(&namer(&leaf));
        }
    }

    /// Tab-separated `from`/`to` edge list. Clades are named `clade<index>`.
    pub fn to_edge_list(&self, namer: impl Fn(&LegoNode) -> String) -> String {
        let name = |i: NodeIndex| match self.graph[i] {
            GraphNode::Clade => format!("clade{}", i.index()),
            GraphNode::Leaf(leaf) => namer(&leaf),
        };

        let mut text = String::from("from\tto\n");
        for edge in self.graph.edge_references() {
            text.push_str(&format!("{}\t{}\n", name(edge.source()), name(edge.target())));
        }
        text
    }

    /// Build a rooted tree over `leaves` from a set of splits.
    ///
    /// Each split is restricted to `leaves` and, unless that leaves it
    /// trivial, turned into a clade: the side without the first leaf. Leaves
    /// outside every split hang from the root. Larger clades are placed first and any clade
    /// that conflicts with one already placed is skipped. Every node hangs
    /// from the smallest clade containing it.
    pub fn from_splits<'a>(
        leaves: &BTreeSet<LegoNode>,
        splits: impl IntoIterator<Item = &'a Bipartition>,
    ) -> LegoGraph {
        let mut result = LegoGraph::new();

        let Some(reference) = leaves.iter().next().copied() else {
            return result;
        };

        let mut clades: Vec<BTreeSet<LegoNode>> = splits
            .into_iter()
            .map(|split| split.restrict(leaves))
            .filter(|split| !split.is_trivial())
            .map(|split| {
                if split.inside.contains(&reference) {
                    split.outside
                } else {
                    split.inside
                }
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        clades.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let mut accepted: Vec<BTreeSet<LegoNode>> = Vec::new();
        for clade in clades {
            let compatible = accepted
                .iter()
                .all(|other| other.is_superset(&clade) || other.is_disjoint(&clade));

            if compatible {
                accepted.push(clade);
            } else {
                debug!("Skipping clade of {} leaves incompatible with the tree", clade.len());
            }
        }

        let root = result.add_clade();

        // Accepted clades are ordered by decreasing size, so the last
        // container found is the smallest
        let mut clade_nodes = Vec::with_capacity(accepted.len());
        for (i, clade) in accepted.iter().enumerate() {
            let node = result.add_clade();
            let parent = accepted[..i]
                .iter()
                .rposition(|other| other.is_superset(clade))
                .map_or(root, |j| clade_nodes[j]);
            result.add_edge(parent, node);
            clade_nodes.push(node);
        }

        for leaf in leaves {
            let node = result.add_leaf(*leaf);
            let parent = accepted
                .iter()
                .rposition(|clade| clade.contains(leaf))
                .map_or(root, |j| clade_nodes[j]);
            result.add_edge(parent, node);
        }

        result
    }

    /// Merge several graphs, sharing leaf nodes that carry the same gene or
    /// fusion point. Clades are never merged.
    pub fn union<'a>(graphs: impl IntoIterator<Item = &'a LegoGraph>) -> LegoGraph {
        let mut result = LegoGraph::new();
        let mut leaf_nodes: HashMap<LegoNode, NodeIndex> = HashMap::new();

        for source in graphs {
            let mut mapping = HashMap::new();

            for index in source.graph.node_indices() {
                let target = match source.graph[index] {
                    GraphNode::Clade => result.add_clade(),
                    GraphNode::Leaf(leaf) => *leaf_nodes
                        .entry(leaf)
                        .or_insert_with(|| result.graph.add_node(GraphNode::Leaf(leaf))),
                };
                mapping.insert(index, target);
            }

            for edge in source.graph.edge_references() {
                result.add_edge(mapping[&edge.source()], mapping[&edge.target()]);
            }
        }

        result
    }

    /// Remove redundant clades until none remain: clades with no children,
    /// and clades with a single child and at most one parent, which are
    /// spliced out. Returns the number of nodes removed.
    pub fn clean(&mut self) -> usize {
        let mut removed = 0;

        while let Some(node) = self.find_redundant_clade() {
            let parents: Vec<_> = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .collect();
            let children: Vec<_> = self
                .graph
                .neighbors_directed(node, Direction::Outgoing)
                .collect();

            if let ([parent], [child]) = (&parents[..], &children[..]) {
                self.add_edge(*parent, *child);
            }

            self.graph.remove_node(node);
            removed += 1;
        }

        removed
    }

    fn find_redundant_clade(&self) -> Option<NodeIndex> {
        self.graph.node_indices().find(|&i| {
            if self.graph[i] != GraphNode::Clade {
                return false;
            }

            let incoming = self.graph.neighbors_directed(i, Direction::Incoming).count();
            let outgoing = self.graph.neighbors_directed(i, Direction::Outgoing).count();

            outgoing == 0 || (outgoing == 1 && incoming <= 1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SequenceId;

    fn leaf(i: u32) -> LegoNode {
        LegoNode::Sequence(SequenceId(i))
    }

    fn set(ids: &[u32]) -> BTreeSet<LegoNode> {
        ids.iter().map(|&i| leaf(i)).collect()
    }

    fn name(node: &LegoNode) -> String {
        match node {
            LegoNode::Sequence(id) => format!("s{id}"),
            LegoNode::Point(id) => format!("p{id}"),
        }
    }

    #[test]
    fn test_from_splits_builds_nested_clades() {
        let leaves = set(&[1, 2, 3, 4, 5]);
        let splits = [
            Bipartition::new(set(&[3, 4, 5]), set(&[1, 2])),
            Bipartition::new(set(&[4, 5]), set(&[1, 2, 3])),
        ];
        let graph = LegoGraph::from_splits(&leaves, &splits);

        assert_eq!(graph.leaves(), leaves);
        assert_eq!(graph.to_newick(name), "(s1,s2,(s3,(s4,s5)));");
    }

    #[test]
    fn test_from_splits_skips_conflicts() {
        let leaves = set(&[1, 2, 3, 4, 5]);
        let splits = [
            Bipartition::new(set(&[2, 3]), set(&[1, 4, 5])),
            Bipartition::new(set(&[3, 4]), set(&[1, 2, 5])),
        ];
        let graph = LegoGraph::from_splits(&leaves, &splits);

        // Root, one clade, five leaves
        assert_eq!(graph.node_count(), 7);
        assert_eq!(graph.to_newick(name), "(s1,s4,s5,(s2,s3));");
    }

    #[test]
    fn test_from_splits_ignores_splits_trivial_after_restriction() {
        // Leaf 6 is in no split; {1}|{2,3} must not become the clade {2,3}
        let leaves = set(&[1, 2, 3, 6]);
        let splits = [Bipartition::new(set(&[1]), set(&[2, 3]))];
        let graph = LegoGraph::from_splits(&leaves, &splits);

        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.to_newick(name), "(s1,s2,s3,s6);");
    }

    #[test]
    fn test_from_splits_no_leaves() {
        assert!(LegoGraph::from_splits(&BTreeSet::new(), &[]).is_empty());
    }

    #[test]
    fn test_to_unrooted_collapses_root() {
        let leaves = set(&[1, 2, 3, 4]);
        let splits = [Bipartition::new(set(&[3, 4]), set(&[1, 2]))];
        let graph = LegoGraph::from_splits(&leaves, &splits);
        // (s1,s2,(s3,s4)) has a three-way root and is left alone
        assert_eq!(graph.to_unrooted().node_count(), graph.node_count());

        let mut rooted = LegoGraph::new();
        let root = rooted.add_clade();
        let left = rooted.add_clade();
        let a = rooted.add_leaf(leaf(1));
        let b = rooted.add_leaf(leaf(2));
        let c = rooted.add_leaf(leaf(3));
        rooted.add_edge(root, left);
        rooted.add_edge(root, c);
        rooted.add_edge(left, a);
        rooted.add_edge(left, b);

        let unrooted = rooted.to_unrooted();
        assert_eq!(unrooted.node_count(), 4);
        assert_eq!(unrooted.edge_count(), 3);
        assert_eq!(unrooted.leaves(), set(&[1, 2, 3]));
    }

    #[test]
    fn test_union_shares_leaves() {
        let a = LegoGraph::from_splits(&set(&[1, 2]), &[]);
        let b = LegoGraph::from_splits(&set(&[2, 3]), &[]);
        let merged = LegoGraph::union([&a, &b]);

        assert_eq!(merged.leaves(), set(&[1, 2, 3]));
        // Two roots, three distinct leaves
        assert_eq!(merged.node_count(), 5);
        assert_eq!(merged.edge_count(), 4);
    }

    #[test]
    fn test_clean_splices_and_prunes() {
        let mut graph = LegoGraph::new();
        let root = graph.add_clade();
        let chain = graph.add_clade();
        let empty = graph.add_clade();
        let a = graph.add_leaf(leaf(1));
        let b = graph.add_leaf(leaf(2));
        graph.add_edge(root, chain);
        graph.add_edge(root, empty);
        graph.add_edge(root, b);
        graph.add_edge(chain, a);

        let removed = graph.clean();

        assert_eq!(removed, 2);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.to_newick(name), "(s1,s2);");
    }

    #[test]
    fn test_edge_list() {
        let graph = LegoGraph::from_splits(&set(&[1, 2]), &[]);
        let text = graph.to_edge_list(name);
        assert!(text.starts_with("from\tto\n"));
        assert!(text.contains("clade0\ts1\n"));
        assert!(text.contains("clade0\ts2\n"));
    }
}
