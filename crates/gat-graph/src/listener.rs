//! Observers of structural graph changes.
//!
//! Consumers that maintain derived views of a graph (bus/breaker topology
//! caches, for instance) register a [`GraphListener`]. Every callback has a
//! default implementation forwarding to [`GraphListener::graph_changed`], so
//! a listener only interested in "something changed" implements that single
//! method, while richer listeners override the per-event callbacks.
//!
//! Callbacks fire after the mutation is applied, except the explicit
//! `*_before_removal` hooks.

use std::sync::Arc;

/// Token returned by `add_listener`, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

pub trait GraphListener<V, E>: Send + Sync {
    /// Catch-all notification; the only callback simple listeners implement.
    fn graph_changed(&self) {}

    fn vertex_added(&self, _v: usize) {
        self.graph_changed();
    }

    fn vertex_object_set(&self, _v: usize, _obj: Option<&V>) {
        self.graph_changed();
    }

    fn vertex_removed(&self, _v: usize, _obj: Option<&V>) {
        self.graph_changed();
    }

    fn all_vertices_removed(&self) {
        self.graph_changed();
    }

    fn edge_added(&self, _e: usize, _obj: Option<&E>) {
        self.graph_changed();
    }

    /// Fired while the edge is still present.
    fn edge_before_removal(&self, _e: usize, _obj: Option<&E>) {}

    fn edge_removed(&self, _e: usize, _obj: Option<&E>) {
        self.graph_changed();
    }

    /// Fired while the edges are still present.
    fn all_edges_before_removal(&self, _objs: &[&E]) {}

    fn all_edges_removed(&self, _objs: &[&E]) {
        self.graph_changed();
    }
}

/// Ordered listener registry.
pub(crate) struct Listeners<V, E> {
    next_id: u64,
    entries: Vec<(ListenerId, Arc<dyn GraphListener<V, E>>)>,
}

impl<V, E> Default for Listeners<V, E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<V, E> Listeners<V, E> {
    pub(crate) fn add(&mut self, listener: Arc<dyn GraphListener<V, E>>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn notify(&self, event: impl Fn(&dyn GraphListener<V, E>)) {
        for (_, listener) in &self.entries {
            event(listener.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl GraphListener<(), ()> for Counter {
        fn graph_changed(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn default_callbacks_forward_to_graph_changed() {
        let counter = Counter::default();
        counter.vertex_added(0);
        counter.edge_added(0, None);
        counter.edge_before_removal(0, None);
        counter.edge_removed(0, None);
        counter.all_edges_removed(&[]);
        // before-removal hooks are not structural changes
        assert_eq!(counter.0.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn registry_removes_by_id() {
        let mut listeners: Listeners<(), ()> = Listeners::default();
        let first = listeners.add(Arc::new(Counter::default()));
        let second = listeners.add(Arc::new(Counter::default()));
        assert_ne!(first, second);
        assert!(listeners.remove(first));
        assert!(!listeners.remove(first));
        assert_eq!(listeners.len(), 1);
    }
}
