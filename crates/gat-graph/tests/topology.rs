//! End-to-end checks of the graph layer against petgraph as an oracle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use gat_graph::{
    compute_connected_components, DirectedGraph, ErrorKind, GraphListener, TraverseResult,
    UndirectedGraph,
};
use petgraph::algo::{connected_components, is_cyclic_directed};
use petgraph::graph::{DiGraph, UnGraph};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Seeded random edge list; self-loops and parallel edges included.
fn edge_list(vertices: usize, edges: usize, seed: u64) -> Vec<(usize, usize)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..edges)
        .map(|_| (rng.gen_range(0..vertices), rng.gen_range(0..vertices)))
        .collect()
}

#[test]
fn vertex_count_follows_adds_and_successful_removes() {
    let mut graph: UndirectedGraph<(), ()> = UndirectedGraph::new();
    let mut expected = 0usize;
    let mut live = Vec::new();
    for step in 0..200 {
        if step % 3 == 2 {
            if let Some(v) = live.pop() {
                graph.remove_vertex(v).unwrap();
                expected -= 1;
            }
            // removing a freed index fails and changes nothing
            assert_eq!(
                graph.remove_vertex(10_000).unwrap_err().kind(),
                ErrorKind::NotFound
            );
        } else {
            live.push(graph.add_vertex());
            expected += 1;
        }
        assert_eq!(graph.vertex_count(), expected);
    }
}

#[test]
fn removed_index_is_reused_by_next_add() {
    let mut graph: UndirectedGraph<(), ()> = UndirectedGraph::new();
    for _ in 0..5 {
        graph.add_vertex();
    }
    graph.remove_vertex(2).unwrap();
    assert_eq!(graph.add_vertex(), 2);
    assert_eq!(graph.add_vertex(), 5);
}

#[test]
fn conflict_leaves_graph_unchanged() {
    let mut graph: UndirectedGraph<(), &str> = UndirectedGraph::new();
    let a = graph.add_vertex();
    let b = graph.add_vertex();
    graph.add_edge(a, b, Some("line")).unwrap();

    let err = graph.remove_vertex(b).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(graph.vertex_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.edge_object(0).unwrap(), Some(&"line"));
}

#[test]
fn component_counts_agree_with_petgraph() {
    for seed in 1..6u64 {
        let n = 60;
        let edges = edge_list(n, 45, seed);

        let mut graph: UndirectedGraph<(), ()> = UndirectedGraph::new();
        let mut oracle: UnGraph<(), ()> = UnGraph::new_undirected();
        for _ in 0..n {
            graph.add_vertex();
            oracle.add_node(());
        }
        for &(a, b) in &edges {
            graph.add_edge(a, b, None).unwrap();
            oracle.add_edge(
                petgraph::graph::NodeIndex::new(a),
                petgraph::graph::NodeIndex::new(b),
                (),
            );
        }

        let components = graph.connected_components();
        assert_eq!(components.component_count(), connected_components(&oracle));
        assert_eq!(components.component_sizes.iter().sum::<usize>(), n);
        assert!(components
            .component_sizes
            .windows(2)
            .all(|pair| pair[0] >= pair[1]));
        // same answer straight from the adjacency structure
        assert_eq!(
            compute_connected_components(&graph.vertex_adjacency()),
            components
        );
    }
}

#[test]
fn cyclicity_agrees_with_petgraph() {
    for seed in 1..12u64 {
        let n = 25;
        let edges = edge_list(n, 22, seed);

        let mut graph: DirectedGraph<(), ()> = DirectedGraph::new();
        let mut oracle: DiGraph<(), ()> = DiGraph::new();
        for _ in 0..n {
            graph.add_vertex();
            oracle.add_node(());
        }
        for &(tail, head) in &edges {
            graph.add_edge(tail, head, None).unwrap();
            oracle.add_edge(
                petgraph::graph::NodeIndex::new(tail),
                petgraph::graph::NodeIndex::new(head),
                (),
            );
        }
        assert_eq!(graph.is_cyclic(), is_cyclic_directed(&oracle), "seed {seed}");
    }
}

#[test]
fn concurrent_readers_share_one_adjacency_rebuild() {
    let mut graph: UndirectedGraph<(), ()> = UndirectedGraph::new();
    for _ in 0..500 {
        graph.add_vertex();
    }
    for v in 0..499 {
        graph.add_edge(v, v + 1, None).unwrap();
    }
    let graph = Arc::new(graph);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let graph = Arc::clone(&graph);
            thread::spawn(move || {
                let mut reached = 0usize;
                graph
                    .traverse(0, |_, _, _| {
                        reached += 1;
                        TraverseResult::Continue
                    })
                    .unwrap();
                (reached, graph.adjacency_list())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (reached, adjacency) in &results {
        assert_eq!(*reached, 499);
        assert!(Arc::ptr_eq(adjacency, &results[0].1));
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
    changes: AtomicUsize,
}

impl GraphListener<&'static str, &'static str> for Recorder {
    fn graph_changed(&self) {
        self.changes.fetch_add(1, Ordering::SeqCst);
    }

    fn vertex_removed(&self, v: usize, obj: Option<&&'static str>) {
        self.events
            .lock()
            .unwrap()
            .push(format!("vertex_removed {v} {obj:?}"));
    }

    fn edge_before_removal(&self, e: usize, _obj: Option<&&'static str>) {
        self.events
            .lock()
            .unwrap()
            .push(format!("edge_before_removal {e}"));
    }

    fn edge_removed(&self, e: usize, obj: Option<&&'static str>) {
        self.events
            .lock()
            .unwrap()
            .push(format!("edge_removed {e} {obj:?}"));
    }

    fn all_edges_removed(&self, objs: &[&&'static str]) {
        self.events
            .lock()
            .unwrap()
            .push(format!("all_edges_removed {}", objs.len()));
    }
}

#[test]
fn rich_listener_sees_events_in_order() {
    let mut graph: UndirectedGraph<&'static str, &'static str> = UndirectedGraph::new();
    let recorder = Arc::new(Recorder::default());
    graph.add_listener(recorder.clone());

    let a = graph.add_vertex();
    let b = graph.add_vertex();
    let c = graph.add_vertex();
    graph.set_vertex_object(c, Some("bus c")).unwrap();
    let e = graph.add_edge(a, b, Some("ab")).unwrap();
    graph.add_edge(b, c, Some("bc")).unwrap();
    graph.remove_edge(e).unwrap();
    graph.remove_all_edges();
    graph.remove_vertex(c).unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "edge_before_removal 0".to_string(),
            "edge_removed 0 Some(\"ab\")".to_string(),
            "all_edges_removed 1".to_string(),
            "vertex_removed 2 Some(\"bus c\")".to_string(),
        ]
    );
    // vertex_added x3, vertex_object_set, edge_added x2
    assert_eq!(recorder.changes.load(Ordering::SeqCst), 6);
}

#[test]
fn pruning_a_directed_graph_keeps_every_edge_endpoint() {
    for seed in 20..26u64 {
        let n = 40;
        let mut graph: DirectedGraph<(), ()> = DirectedGraph::new();
        for _ in 0..n {
            graph.add_vertex();
        }
        for (tail, head) in edge_list(n, 15, seed) {
            graph.add_edge(tail, head, None).unwrap();
        }

        let removed = graph.remove_isolated_vertices();
        for e in graph.edges() {
            let tail = graph.edge_vertex1(e).unwrap();
            let head = graph.edge_vertex2(e).unwrap();
            assert!(graph.vertex_exists(tail), "seed {seed}: tail {tail} removed");
            assert!(graph.vertex_exists(head), "seed {seed}: head {head} removed");
            assert!(!removed.contains(&head));
        }
        assert_eq!(graph.vertex_count() + removed.len(), n);
    }
}
