//! Vertex/edge storage shared by [`UndirectedGraph`](crate::UndirectedGraph)
//! and [`DirectedGraph`](crate::DirectedGraph).
//!
//! Vertices and edges live in index arenas; indices are stable and reused
//! after removal. Each vertex and edge may carry an optional payload.
//!
//! The adjacency list (vertex index -> incident edge indices) is derived
//! state. It is discarded by every structural mutation and rebuilt in full,
//! under a lock, the first time a reader asks for it again. Once built it is
//! shared through an [`Arc`], so concurrent read-only traversals are safe.
//! Mutations take `&mut self`; running one concurrently with anything else
//! on the same graph is ruled out by the borrow checker, and callers sharing
//! a graph across threads must serialize writers themselves.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace};

use crate::arena::IndexArena;
use crate::config::GraphConfig;
use crate::error::{GraphError, GraphResult};
use crate::listener::{GraphListener, ListenerId, Listeners};

/// Whether edges are followed in both directions or tail to head only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Undirected,
    Directed,
}

/// Incident edges per vertex slot; `None` for free slots.
///
/// For directed graphs only outgoing edges are listed.
pub type AdjacencyList = Vec<Option<Vec<usize>>>;

const NEIGHBORS_CAPACITY: usize = 2;

#[derive(Debug, Clone)]
pub(crate) struct VertexSlot<V> {
    pub(crate) object: Option<V>,
}

#[derive(Debug, Clone)]
pub(crate) struct EdgeSlot<E> {
    pub(crate) v1: usize,
    pub(crate) v2: usize,
    pub(crate) object: Option<E>,
}

pub struct GraphCore<V, E> {
    orientation: Orientation,
    vertex_limit: usize,
    pub(crate) vertices: IndexArena<VertexSlot<V>>,
    pub(crate) edges: IndexArena<EdgeSlot<E>>,
    adjacency: Mutex<Option<Arc<AdjacencyList>>>,
    listeners: Listeners<V, E>,
}

impl<V, E> GraphCore<V, E> {
    pub fn new(orientation: Orientation, config: &GraphConfig) -> Self {
        Self {
            orientation,
            vertex_limit: config.effective_vertex_limit().max(1),
            vertices: IndexArena::with_capacity(config.vertex_capacity),
            edges: IndexArena::with_capacity(config.edge_capacity),
            adjacency: Mutex::new(None),
            listeners: Listeners::default(),
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub(crate) fn check_vertex(&self, v: usize) -> GraphResult<&VertexSlot<V>> {
        self.vertices.get(v).ok_or(GraphError::VertexNotFound(v))
    }

    pub(crate) fn check_edge(&self, e: usize) -> GraphResult<&EdgeSlot<E>> {
        self.edges.get(e).ok_or(GraphError::EdgeNotFound(e))
    }

    // ---- vertices -------------------------------------------------------

    /// Create a vertex without payload and return its index.
    pub fn add_vertex(&mut self) -> usize {
        let v = self.vertices.insert(VertexSlot { object: None });
        self.invalidate_adjacency_list();
        self.listeners.notify(|l| l.vertex_added(v));
        v
    }

    /// Create vertex `v` unless it already exists.
    ///
    /// Returns `true` when the vertex was created.
    pub fn add_vertex_if_not_present(&mut self, v: usize) -> GraphResult<bool> {
        if v >= self.vertex_limit {
            return Err(GraphError::VertexLimitExceeded {
                vertex: v,
                limit: self.vertex_limit,
            });
        }
        if !self.vertices.insert_at(v, VertexSlot { object: None }) {
            return Ok(false);
        }
        self.invalidate_adjacency_list();
        self.listeners.notify(|l| l.vertex_added(v));
        Ok(true)
    }

    pub fn vertex_exists(&self, v: usize) -> bool {
        self.vertices.contains(v)
    }

    /// Remove vertex `v` and return its payload.
    ///
    /// Fails with [`GraphError::VertexInUse`] while an edge still references
    /// the vertex; the graph is left untouched in that case.
    pub fn remove_vertex(&mut self, v: usize) -> GraphResult<Option<V>> {
        self.check_vertex(v)?;
        if self.edges.iter().any(|(_, edge)| edge.v1 == v || edge.v2 == v) {
            return Err(GraphError::VertexInUse(v));
        }
        let slot = self
            .vertices
            .remove(v)
            .ok_or(GraphError::VertexNotFound(v))?;
        self.invalidate_adjacency_list();
        self.listeners
            .notify(|l| l.vertex_removed(v, slot.object.as_ref()));
        Ok(slot.object)
    }

    /// Remove every vertex. Fails if any edge remains.
    pub fn remove_all_vertices(&mut self) -> GraphResult<()> {
        if !self.edges.is_empty() {
            return Err(GraphError::EdgesRemaining(self.edges.len()));
        }
        self.vertices.drain();
        self.invalidate_adjacency_list();
        self.listeners.notify(|l| l.all_vertices_removed());
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// One past the highest vertex index in use; the size an "encountered"
    /// buffer must have.
    pub fn vertex_capacity(&self) -> usize {
        self.vertices.capacity()
    }

    pub fn vertices(&self) -> Vec<usize> {
        self.vertices.indices()
    }

    pub fn vertex_object(&self, v: usize) -> GraphResult<Option<&V>> {
        Ok(self.check_vertex(v)?.object.as_ref())
    }

    /// Attach `obj` to vertex `v`, returning the previous payload.
    pub fn set_vertex_object(&mut self, v: usize, obj: Option<V>) -> GraphResult<Option<V>> {
        let slot = self
            .vertices
            .get_mut(v)
            .ok_or(GraphError::VertexNotFound(v))?;
        let previous = std::mem::replace(&mut slot.object, obj);
        let current = slot.object.as_ref();
        self.listeners.notify(|l| l.vertex_object_set(v, current));
        Ok(previous)
    }

    /// Payloads of live vertices, in index order.
    pub fn vertex_objects(&self) -> impl Iterator<Item = (usize, Option<&V>)> + '_ {
        self.vertices
            .iter()
            .map(|(v, slot)| (v, slot.object.as_ref()))
    }

    // ---- edges ----------------------------------------------------------

    /// Connect `v1` and `v2` (tail and head for directed graphs).
    pub fn add_edge(&mut self, v1: usize, v2: usize, obj: Option<E>) -> GraphResult<usize> {
        self.check_vertex(v1)?;
        self.check_vertex(v2)?;
        let e = self.edges.insert(EdgeSlot {
            v1,
            v2,
            object: obj,
        });
        self.invalidate_adjacency_list();
        let object = self.edges.get(e).and_then(|edge| edge.object.as_ref());
        self.listeners.notify(|l| l.edge_added(e, object));
        Ok(e)
    }

    /// Remove edge `e` and return its payload.
    pub fn remove_edge(&mut self, e: usize) -> GraphResult<Option<E>> {
        let object = self.check_edge(e)?.object.as_ref();
        self.listeners.notify(|l| l.edge_before_removal(e, object));
        let edge = self.edges.remove(e).ok_or(GraphError::EdgeNotFound(e))?;
        self.invalidate_adjacency_list();
        self.listeners
            .notify(|l| l.edge_removed(e, edge.object.as_ref()));
        Ok(edge.object)
    }

    pub fn remove_all_edges(&mut self) {
        let objects: Vec<&E> = self
            .edges
            .iter()
            .filter_map(|(_, edge)| edge.object.as_ref())
            .collect();
        self.listeners
            .notify(|l| l.all_edges_before_removal(&objects));
        let removed = self.edges.drain();
        self.invalidate_adjacency_list();
        let objects: Vec<&E> = removed
            .iter()
            .filter_map(|edge| edge.object.as_ref())
            .collect();
        self.listeners.notify(|l| l.all_edges_removed(&objects));
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> Vec<usize> {
        self.edges.indices()
    }

    /// First end of the edge (tail for directed graphs).
    pub fn edge_vertex1(&self, e: usize) -> GraphResult<usize> {
        Ok(self.check_edge(e)?.v1)
    }

    /// Second end of the edge (head for directed graphs).
    pub fn edge_vertex2(&self, e: usize) -> GraphResult<usize> {
        Ok(self.check_edge(e)?.v2)
    }

    pub fn edge_object(&self, e: usize) -> GraphResult<Option<&E>> {
        Ok(self.check_edge(e)?.object.as_ref())
    }

    /// Payloads of live edges, in index order.
    pub fn edge_objects_iter(&self) -> impl Iterator<Item = (usize, Option<&E>)> + '_ {
        self.edges.iter().map(|(e, edge)| (e, edge.object.as_ref()))
    }

    /// Edges incident to `v` (outgoing only for directed graphs).
    pub fn edges_connected_to_vertex(&self, v: usize) -> GraphResult<Vec<usize>> {
        self.check_vertex(v)?;
        let adjacency = self.adjacency_list();
        Ok(adjacency[v].clone().unwrap_or_default())
    }

    pub fn edge_objects_connected_to_vertex(&self, v: usize) -> GraphResult<Vec<Option<&E>>> {
        Ok(self
            .edges_connected_to_vertex(v)?
            .into_iter()
            .map(|e| self.edges.get(e).and_then(|edge| edge.object.as_ref()))
            .collect())
    }

    /// Payloads of all edges joining `v1` to `v2`.
    ///
    /// Undirected graphs match either orientation, directed graphs match
    /// `v1 -> v2` only.
    pub fn edge_objects(&self, v1: usize, v2: usize) -> GraphResult<Vec<Option<&E>>> {
        self.check_vertex(v1)?;
        self.check_vertex(v2)?;
        let adjacency = self.adjacency_list();
        let incident = adjacency[v1].as_deref().unwrap_or(&[]);
        Ok(incident
            .iter()
            .filter_map(|&e| self.edges.get(e))
            .filter(|edge| {
                (edge.v1 == v1 && edge.v2 == v2)
                    || (self.orientation == Orientation::Undirected
                        && edge.v1 == v2
                        && edge.v2 == v1)
            })
            .map(|edge| edge.object.as_ref())
            .collect())
    }

    /// The vertex reached by leaving `from` through edge `e`.
    pub(crate) fn follow(&self, e: usize, from: usize) -> Option<usize> {
        let edge = self.edges.get(e)?;
        match self.orientation {
            Orientation::Directed => Some(edge.v2),
            Orientation::Undirected if edge.v1 == from => Some(edge.v2),
            Orientation::Undirected => Some(edge.v1),
        }
    }

    // ---- adjacency cache ------------------------------------------------

    /// The cached adjacency list, rebuilt first if a mutation discarded it.
    pub fn adjacency_list(&self) -> Arc<AdjacencyList> {
        let mut cache = self.adjacency.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(list) = cache.as_ref() {
            return Arc::clone(list);
        }
        let list = Arc::new(self.build_adjacency_list());
        *cache = Some(Arc::clone(&list));
        list
    }

    fn build_adjacency_list(&self) -> AdjacencyList {
        trace!(
            vertices = self.vertices.len(),
            edges = self.edges.len(),
            "rebuilding adjacency list"
        );
        let mut adjacency: AdjacencyList = vec![None; self.vertices.capacity()];
        for (v, _) in self.vertices.iter() {
            adjacency[v] = Some(Vec::with_capacity(NEIGHBORS_CAPACITY));
        }
        for (e, edge) in self.edges.iter() {
            if let Some(incident) = adjacency[edge.v1].as_mut() {
                incident.push(e);
            }
            if self.orientation == Orientation::Undirected && edge.v2 != edge.v1 {
                if let Some(incident) = adjacency[edge.v2].as_mut() {
                    incident.push(e);
                }
            }
        }
        adjacency
    }

    fn invalidate_adjacency_list(&mut self) {
        *self
            .adjacency
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Neighbour vertices per vertex slot (heads only for directed graphs);
    /// `None` for free slots.
    pub fn vertex_adjacency(&self) -> Vec<Option<Vec<usize>>> {
        let adjacency = self.adjacency_list();
        adjacency
            .iter()
            .enumerate()
            .map(|(v, incident)| {
                incident.as_ref().map(|edges| {
                    edges
                        .iter()
                        .filter_map(|&e| self.follow(e, v))
                        .collect()
                })
            })
            .collect()
    }

    /// Remove every vertex with no incident edge and no payload. Both ends
    /// count: the head of an arrow is not isolated.
    ///
    /// A vertex carrying a payload is kept even when isolated. Returns the
    /// removed indices.
    pub fn remove_isolated_vertices(&mut self) -> Vec<usize> {
        let mut degree = vec![0usize; self.vertices.capacity()];
        for (_, edge) in self.edges.iter() {
            degree[edge.v1] += 1;
            degree[edge.v2] += 1;
        }
        let isolated: Vec<usize> = self
            .vertices
            .iter()
            .filter(|(v, slot)| slot.object.is_none() && degree[*v] == 0)
            .map(|(v, _)| v)
            .collect();
        if isolated.is_empty() {
            return isolated;
        }
        for &v in &isolated {
            self.vertices.remove(v);
        }
        self.invalidate_adjacency_list();
        for &v in &isolated {
            self.listeners.notify(|l| l.vertex_removed(v, None));
        }
        debug!(removed = isolated.len(), "removed isolated vertices");
        isolated
    }

    // ---- listeners ------------------------------------------------------

    pub fn add_listener(&mut self, listener: Arc<dyn GraphListener<V, E>>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // ---- printing -------------------------------------------------------

    /// Write a plain-text listing of vertices and edges.
    pub fn write_to<W, FV, FE>(&self, out: &mut W, vertex_fmt: FV, edge_fmt: FE) -> io::Result<()>
    where
        W: io::Write,
        FV: Fn(Option<&V>) -> String,
        FE: Fn(Option<&E>) -> String,
    {
        let link = match self.orientation {
            Orientation::Undirected => "<->",
            Orientation::Directed => "-->",
        };
        writeln!(out, "Vertices:")?;
        for (v, slot) in self.vertices.iter() {
            writeln!(out, "{}: {}", v, vertex_fmt(slot.object.as_ref()))?;
        }
        writeln!(out, "Edges:")?;
        for (e, edge) in self.edges.iter() {
            writeln!(
                out,
                "{}: {}{}{} {}",
                e,
                edge.v1,
                link,
                edge.v2,
                edge_fmt(edge.object.as_ref())
            )?;
        }
        Ok(())
    }
}
