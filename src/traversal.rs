//! Depth-first traversal over a small explicit graph.
//!
//! Visit order is part of the contract: callers say which order children
//! should be visited in with [`VisitOrder`], and the recursive and
//! explicit-stack traversals both honour it.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use log::trace;

/// The order in which a node's children are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitOrder {
    /// The order the children were added to the graph.
    #[default]
    Expansion,
    Ascending,
    Descending,
}

/// A directed graph as adjacency lists. Children keep insertion order.
#[derive(Debug, Clone)]
pub struct Graph<N> {
    edges: HashMap<N, Vec<N>>,
}

impl<N> Default for Graph<N> {
    fn default() -> Self {
        Self {
            edges: HashMap::new(),
        }
    }
}

impl<N: Clone + Eq + Hash + Ord> Graph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edge(&mut self, from: N, to: N) {
        self.edges.entry(from).or_default().push(to);
    }

    pub fn with_children(mut self, node: N, children: impl IntoIterator<Item = N>) -> Self {
        for child in children {
            self.add_edge(node.clone(), child);
        }
        self
    }

    pub fn children(&self, node: &N) -> &[N] {
        self.edges.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    fn ordered_children(&self, node: &N, order: VisitOrder) -> Vec<N> {
        let mut children = self.children(node).to_vec();
        match order {
            VisitOrder::Expansion => {}
            VisitOrder::Ascending => children.sort(),
            VisitOrder::Descending => children.sort_by(|a, b| b.cmp(a)),
        }
        children
    }
}

/// Nodes reachable from `start`, in depth-first preorder.
pub fn dfs_recursive<N: Clone + Eq + Hash + Ord>(
    graph: &Graph<N>,
    start: &N,
    order: VisitOrder,
) -> Vec<N> {
    fn visit<N: Clone + Eq + Hash + Ord>(
        graph: &Graph<N>,
        node: &N,
        order: VisitOrder,
        seen: &mut HashSet<N>,
        visited: &mut Vec<N>,
    ) {
        if !seen.insert(node.clone()) {
            return;
        }
        visited.push(node.clone());
        for child in graph.ordered_children(node, order) {
            visit(graph, &child, order, seen, visited);
        }
    }

    let mut seen = HashSet::new();
    let mut visited = Vec::new();
    visit(graph, start, order, &mut seen, &mut visited);
    visited
}

/// Same visit order as [`dfs_recursive`], using an explicit stack.
pub fn dfs_stack<N: Clone + Eq + Hash + Ord>(
    graph: &Graph<N>,
    start: &N,
    order: VisitOrder,
) -> Vec<N> {
    let mut stack = vec![start.clone()];
    let mut seen = HashSet::new();
    let mut visited = Vec::new();
    while let Some(node) = stack.pop() {
        if !seen.insert(node.clone()) {
            continue;
        }
        trace!("stack depth {} after pop", stack.len());
        let children = graph.ordered_children(&node, order);
        // Last pushed is first popped, so push in reverse of the visit order.
        stack.extend(children.into_iter().rev().filter(|child| !seen.contains(child)));
        visited.push(node);
    }
    visited
}

/// Pushes children in expansion order without reversing them, which visits
/// siblings last-to-first. Kept to show how the stack flips the order.
pub fn dfs_stack_naive<N: Clone + Eq + Hash + Ord>(graph: &Graph<N>, start: &N) -> Vec<N> {
    let mut stack = vec![start.clone()];
    let mut seen = HashSet::new();
    let mut visited = Vec::new();
    while let Some(node) = stack.pop() {
        if !seen.insert(node.clone()) {
            continue;
        }
        stack.extend(
            graph
                .children(&node)
                .iter()
                .filter(|child| !seen.contains(*child))
                .cloned(),
        );
        visited.push(node);
    }
    visited
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<N> {
    /// Path from the start to the goal, both included.
    Found(Vec<N>),
    /// No goal within the limit, but some node at the limit had children.
    Cutoff,
    /// The whole reachable tree was searched without finding the goal.
    Failure,
}

/// Depth-limited tree search, visiting children in `order`. Nodes at depth
/// `limit` are goal-tested but not expanded. A child already on the current
/// path is skipped.
pub fn depth_limited_search<N: Clone + Eq + Hash + Ord>(
    graph: &Graph<N>,
    start: &N,
    goal: &N,
    limit: usize,
    order: VisitOrder,
) -> SearchOutcome<N> {
    let mut frontier = vec![vec![start.clone()]];
    let mut outcome = SearchOutcome::Failure;
    while let Some(path) = frontier.pop() {
        let Some(node) = path.last() else {
            continue;
        };
        if node == goal {
            return SearchOutcome::Found(path);
        }
        let depth = path.len() - 1;
        if depth >= limit {
            if !graph.children(node).is_empty() {
                trace!("cutoff below depth {}", depth);
                outcome = SearchOutcome::Cutoff;
            }
            continue;
        }
        for child in graph.ordered_children(node, order).into_iter().rev() {
            if path.contains(&child) {
                continue;
            }
            let mut next = path.clone();
            next.push(child);
            frontier.push(next);
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Graph<&'static str> {
        Graph::new()
            .with_children("S", ["A", "B"])
            .with_children("A", ["C", "D"])
            .with_children("B", ["E", "F"])
    }

    #[test]
    fn test_recursive_visits_left_to_right() {
        assert_eq!(
            dfs_recursive(&toy(), &"S", VisitOrder::Expansion),
            ["S", "A", "C", "D", "B", "E", "F"]
        );
    }

    #[test]
    fn test_stack_matches_recursion() {
        let graph = toy();
        for order in [VisitOrder::Expansion, VisitOrder::Ascending, VisitOrder::Descending] {
            assert_eq!(
                dfs_stack(&graph, &"S", order),
                dfs_recursive(&graph, &"S", order)
            );
        }
    }

    #[test]
    fn test_naive_stack_reverses_siblings() {
        assert_eq!(
            dfs_stack_naive(&toy(), &"S"),
            ["S", "B", "F", "E", "A", "D", "C"]
        );
        assert_eq!(
            dfs_stack_naive(&toy(), &"S"),
            dfs_recursive(&toy(), &"S", VisitOrder::Descending)
        );
    }

    #[test]
    fn test_ascending_ignores_insertion_order() {
        let graph = Graph::new()
            .with_children("S", ["B", "A"])
            .with_children("A", ["D", "C"]);
        assert_eq!(
            dfs_stack(&graph, &"S", VisitOrder::Ascending),
            ["S", "A", "C", "D", "B"]
        );
        assert_eq!(
            dfs_stack(&graph, &"S", VisitOrder::Expansion),
            ["S", "B", "A", "D", "C"]
        );
    }

    #[test]
    fn test_cycles_and_shared_children() {
        let graph = Graph::new()
            .with_children(1, [2, 3])
            .with_children(2, [1, 4])
            .with_children(3, [4])
            .with_children(4, [2]);
        let expected = vec![1, 2, 4, 3];
        assert_eq!(dfs_recursive(&graph, &1, VisitOrder::Expansion), expected);
        assert_eq!(dfs_stack(&graph, &1, VisitOrder::Expansion), expected);
    }

    #[test]
    fn test_depth_limited_search() {
        let graph = toy();
        assert_eq!(
            depth_limited_search(&graph, &"S", &"F", 2, VisitOrder::Expansion),
            SearchOutcome::Found(vec!["S", "B", "F"])
        );
        assert_eq!(
            depth_limited_search(&graph, &"S", &"F", 1, VisitOrder::Expansion),
            SearchOutcome::Cutoff
        );
        assert_eq!(
            depth_limited_search(&graph, &"S", &"Z", 5, VisitOrder::Expansion),
            SearchOutcome::Failure
        );
        assert_eq!(
            depth_limited_search(&graph, &"S", &"S", 0, VisitOrder::Expansion),
            SearchOutcome::Found(vec!["S"])
        );
    }

    #[test]
    fn test_depth_limited_search_on_a_cycle() {
        let graph = Graph::new()
            .with_children("A", ["B"])
            .with_children("B", ["A", "C"]);
        assert_eq!(
            depth_limited_search(&graph, &"A", &"C", 10, VisitOrder::Expansion),
            SearchOutcome::Found(vec!["A", "B", "C"])
        );
        assert_eq!(
            depth_limited_search(&graph, &"A", &"D", 10, VisitOrder::Expansion),
            SearchOutcome::Failure
        );
    }
}
