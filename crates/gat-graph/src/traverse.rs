//! Traversal and path search over [`GraphCore`].
//!
//! All walks use explicit stacks/queues rather than recursion, so deep
//! radial feeders cannot overflow the call stack. Depth-first order is the
//! same as the natural recursive formulation: incident edges are offered in
//! adjacency order and each accepted neighbour is fully explored before the
//! next sibling edge is considered.

use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::error::{GraphError, GraphResult};
use crate::graph_core::{AdjacencyList, GraphCore};

/// Visitor decision for one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraverseResult {
    /// Descend into the neighbour.
    Continue,
    /// Do not descend through this edge, keep exploring its siblings.
    TerminatePath,
    /// Abort the whole traversal.
    TerminateTraverser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalType {
    #[default]
    DepthFirst,
    BreadthFirst,
}

/// A path (list of edge indices) under construction.
struct PathBranch {
    edge: usize,
    vertex: usize,
    path: Vec<usize>,
    encountered: Vec<bool>,
}

impl<V, E> GraphCore<V, E> {
    /// Depth-first traversal from `start`.
    ///
    /// `traverser` is called as `(v1, e, v2)` for each edge leading from an
    /// encountered vertex `v1` to a vertex `v2` not encountered yet.
    /// Returns `Ok(false)` if it aborted with
    /// [`TraverseResult::TerminateTraverser`].
    pub fn traverse<F>(&self, start: usize, mut traverser: F) -> GraphResult<bool>
    where
        F: FnMut(usize, usize, usize) -> TraverseResult,
    {
        let mut encountered = vec![false; self.vertex_capacity()];
        self.traverse_with(start, TraversalType::DepthFirst, &mut traverser, &mut encountered)
    }

    /// Traversal from `start` sharing a caller-owned encountered set.
    ///
    /// `encountered` must hold at least [`vertex_capacity`](Self::vertex_capacity)
    /// entries; vertices already marked are never entered. A start that is
    /// already marked returns `Ok(true)` without offering any edge.
    pub fn traverse_with<F>(
        &self,
        start: usize,
        traversal_type: TraversalType,
        mut traverser: F,
        encountered: &mut [bool],
    ) -> GraphResult<bool>
    where
        F: FnMut(usize, usize, usize) -> TraverseResult,
    {
        self.check_vertex(start)?;
        let required = self.vertex_capacity();
        if encountered.len() < required {
            return Err(GraphError::EncounteredTooSmall {
                len: encountered.len(),
                required,
            });
        }
        if encountered[start] {
            return Ok(true);
        }
        let adjacency = self.adjacency_list();
        encountered[start] = true;
        let completed = match traversal_type {
            TraversalType::DepthFirst => {
                self.depth_first(start, &adjacency, &mut traverser, encountered)
            }
            TraversalType::BreadthFirst => {
                self.breadth_first(start, &adjacency, &mut traverser, encountered)
            }
        };
        Ok(completed)
    }

    /// Traverse from each start in turn, skipping starts already reached.
    pub fn traverse_many<F>(
        &self,
        starts: &[usize],
        traversal_type: TraversalType,
        mut traverser: F,
    ) -> GraphResult<bool>
    where
        F: FnMut(usize, usize, usize) -> TraverseResult,
    {
        let mut encountered = vec![false; self.vertex_capacity()];
        for &start in starts {
            if encountered.get(start).copied().unwrap_or(false) {
                continue;
            }
            if !self.traverse_with(start, traversal_type, &mut traverser, &mut encountered)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn depth_first<F>(
        &self,
        start: usize,
        adjacency: &AdjacencyList,
        traverser: &mut F,
        encountered: &mut [bool],
    ) -> bool
    where
        F: FnMut(usize, usize, usize) -> TraverseResult,
    {
        // (vertex, position of the next incident edge to offer)
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        while let Some(frame) = stack.last_mut() {
            let (v, position) = *frame;
            let incident = adjacency[v].as_deref().unwrap_or(&[]);
            let Some(&e) = incident.get(position) else {
                stack.pop();
                continue;
            };
            frame.1 += 1;
            let Some(next) = self.follow(e, v) else {
                continue;
            };
            if encountered[next] {
                continue;
            }
            match traverser(v, e, next) {
                TraverseResult::Continue => {
                    encountered[next] = true;
                    stack.push((next, 0));
                }
                TraverseResult::TerminatePath => {}
                TraverseResult::TerminateTraverser => return false,
            }
        }
        true
    }

    fn breadth_first<F>(
        &self,
        start: usize,
        adjacency: &AdjacencyList,
        traverser: &mut F,
        encountered: &mut [bool],
    ) -> bool
    where
        F: FnMut(usize, usize, usize) -> TraverseResult,
    {
        let mut queue = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            for &e in adjacency[v].as_deref().unwrap_or(&[]) {
                let Some(next) = self.follow(e, v) else {
                    continue;
                };
                if encountered[next] {
                    continue;
                }
                match traverser(v, e, next) {
                    TraverseResult::Continue => {
                        encountered[next] = true;
                        queue.push_back(next);
                    }
                    TraverseResult::TerminatePath => {}
                    TraverseResult::TerminateTraverser => return false,
                }
            }
        }
        true
    }

    /// Every path from `from` to a vertex accepted by `is_target`, never
    /// crossing an edge rejected by `is_excluded` and never visiting a vertex
    /// twice within a path. Paths are edge index lists, shortest first.
    pub fn find_all_paths<P, X>(
        &self,
        from: usize,
        is_target: P,
        is_excluded: X,
    ) -> GraphResult<Vec<Vec<usize>>>
    where
        P: Fn(Option<&V>) -> bool,
        X: Fn(Option<&E>) -> bool,
    {
        self.find_all_paths_by(from, is_target, is_excluded, |a, b| a.len().cmp(&b.len()))
    }

    /// [`find_all_paths`](Self::find_all_paths) with a caller-supplied
    /// ordering of the result. The sort is stable: equal paths keep
    /// discovery order.
    pub fn find_all_paths_by<P, X, C>(
        &self,
        from: usize,
        is_target: P,
        is_excluded: X,
        compare: C,
    ) -> GraphResult<Vec<Vec<usize>>>
    where
        P: Fn(Option<&V>) -> bool,
        X: Fn(Option<&E>) -> bool,
        C: FnMut(&Vec<usize>, &Vec<usize>) -> Ordering,
    {
        self.check_vertex(from)?;
        let adjacency = self.adjacency_list();
        let mut paths = Vec::new();
        let mut pending = Vec::new();
        self.branch_out(
            from,
            Vec::with_capacity(1),
            vec![false; self.vertex_capacity()],
            &adjacency,
            &is_excluded,
            &mut pending,
        );

        while let Some(PathBranch {
            edge,
            vertex,
            mut path,
            encountered,
        }) = pending.pop()
        {
            if encountered[vertex] {
                continue;
            }
            path.push(edge);
            let object = self
                .vertices
                .get(vertex)
                .and_then(|slot| slot.object.as_ref());
            if is_target(object) {
                paths.push(path);
            } else {
                self.branch_out(vertex, path, encountered, &adjacency, &is_excluded, &mut pending);
            }
        }

        paths.sort_by(compare);
        Ok(paths)
    }

    /// Queue one branch per viable edge leaving `v`.
    ///
    /// All branches but the last get their own copy of the path state; the
    /// last one takes over `path` and `encountered` as they are.
    fn branch_out<X>(
        &self,
        v: usize,
        path: Vec<usize>,
        mut encountered: Vec<bool>,
        adjacency: &AdjacencyList,
        is_excluded: &X,
        pending: &mut Vec<PathBranch>,
    ) where
        X: Fn(Option<&E>) -> bool,
    {
        encountered[v] = true;
        let viable: Vec<(usize, usize)> = adjacency[v]
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .filter_map(|&e| {
                let edge = self.edges.get(e)?;
                if is_excluded(edge.object.as_ref()) {
                    return None;
                }
                self.follow(e, v).map(|next| (e, next))
            })
            .collect();
        let Some((&(last_edge, last_vertex), rest)) = viable.split_last() else {
            return;
        };

        let mut branches = Vec::with_capacity(viable.len());
        for &(edge, vertex) in rest {
            branches.push(PathBranch {
                edge,
                vertex,
                path: path.clone(),
                encountered: encountered.clone(),
            });
        }
        branches.push(PathBranch {
            edge: last_edge,
            vertex: last_vertex,
            path,
            encountered,
        });
        // stack order: first incident edge explored first
        pending.extend(branches.into_iter().rev());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use crate::graph_core::Orientation;

    fn chain(orientation: Orientation, n: usize) -> GraphCore<(), ()> {
        let mut graph = GraphCore::new(orientation, &GraphConfig::default());
        for _ in 0..n {
            graph.add_vertex();
        }
        for v in 0..n - 1 {
            graph.add_edge(v, v + 1, None).unwrap();
        }
        graph
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let graph = chain(Orientation::Undirected, 200_000);
        let mut visited = 0usize;
        let completed = graph
            .traverse(0, |_, _, _| {
                visited += 1;
                TraverseResult::Continue
            })
            .unwrap();
        assert!(completed);
        assert_eq!(visited, 199_999);
    }

    #[test]
    fn depth_first_order_matches_recursive_walk() {
        //     0
        //    / \
        //   1   2
        //   |
        //   3
        let mut graph: GraphCore<(), ()> =
            GraphCore::new(Orientation::Undirected, &GraphConfig::default());
        for _ in 0..4 {
            graph.add_vertex();
        }
        graph.add_edge(0, 1, None).unwrap();
        graph.add_edge(0, 2, None).unwrap();
        graph.add_edge(1, 3, None).unwrap();

        let mut order = Vec::new();
        graph
            .traverse(0, |_, _, v2| {
                order.push(v2);
                TraverseResult::Continue
            })
            .unwrap();
        assert_eq!(order, vec![1, 3, 2]);

        let mut order = Vec::new();
        let mut encountered = vec![false; graph.vertex_capacity()];
        graph
            .traverse_with(
                0,
                TraversalType::BreadthFirst,
                |_, _, v2| {
                    order.push(v2);
                    TraverseResult::Continue
                },
                &mut encountered,
            )
            .unwrap();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn terminate_path_keeps_siblings_and_terminate_traverser_aborts() {
        let graph = {
            let mut graph: GraphCore<(), ()> =
                GraphCore::new(Orientation::Undirected, &GraphConfig::default());
            for _ in 0..4 {
                graph.add_vertex();
            }
            graph.add_edge(0, 1, None).unwrap();
            graph.add_edge(1, 2, None).unwrap();
            graph.add_edge(0, 3, None).unwrap();
            graph
        };

        let mut seen = Vec::new();
        let completed = graph
            .traverse(0, |_, _, v2| {
                seen.push(v2);
                if v2 == 1 {
                    TraverseResult::TerminatePath
                } else {
                    TraverseResult::Continue
                }
            })
            .unwrap();
        assert!(completed);
        assert_eq!(seen, vec![1, 3]);

        let mut seen = Vec::new();
        let completed = graph
            .traverse(0, |_, _, v2| {
                seen.push(v2);
                TraverseResult::TerminateTraverser
            })
            .unwrap();
        assert!(!completed);
        assert_eq!(seen, vec![1]);
    }

    #[test]
    fn undersized_encountered_buffer_is_rejected() {
        let graph = chain(Orientation::Directed, 3);
        let mut encountered = vec![false; 2];
        let err = graph
            .traverse_with(
                0,
                TraversalType::DepthFirst,
                |_, _, _| TraverseResult::Continue,
                &mut encountered,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::EncounteredTooSmall {
                len: 2,
                required: 3
            }
        ));
    }

    #[test]
    fn already_encountered_start_offers_nothing() {
        let graph = chain(Orientation::Undirected, 2);
        for traversal_type in [TraversalType::DepthFirst, TraversalType::BreadthFirst] {
            let mut encountered = vec![true, false];
            let mut offered = 0;
            let completed = graph
                .traverse_with(
                    0,
                    traversal_type,
                    |_, _, _| {
                        offered += 1;
                        TraverseResult::Continue
                    },
                    &mut encountered,
                )
                .unwrap();
            assert!(completed);
            assert_eq!(offered, 0);
            assert_eq!(encountered, vec![true, false]);
        }
    }

    #[test]
    fn find_all_paths_branches_copy_state() {
        // diamond 0-1-3 and 0-2-3 plus a dead end 0-4
        let mut graph: GraphCore<&str, ()> =
            GraphCore::new(Orientation::Undirected, &GraphConfig::default());
        for _ in 0..5 {
            graph.add_vertex();
        }
        graph.set_vertex_object(3, Some("target")).unwrap();
        let e01 = graph.add_edge(0, 1, None).unwrap();
        let e02 = graph.add_edge(0, 2, None).unwrap();
        let e13 = graph.add_edge(1, 3, None).unwrap();
        let e23 = graph.add_edge(2, 3, None).unwrap();
        graph.add_edge(0, 4, None).unwrap();

        let paths = graph
            .find_all_paths(0, |obj| obj == Some(&"target"), |_| false)
            .unwrap();
        assert_eq!(paths, vec![vec![e01, e13], vec![e02, e23]]);
    }
}
