//! Recency list: circular doubly linked list stored in a slab.
//!
//! Nodes live in a `Vec` and link to each other by index, so splicing is
//! plain index rewriting. Slot 0 is a sentinel that never holds an entry:
//! `sentinel.next` is the most recently used node, `sentinel.prev` the least
//! recently used one. An empty list is the sentinel linked to itself.

const SENTINEL: usize = 0;

/// Link value of a node that is not in the list
const DETACHED: usize = usize::MAX;

/// Stable position of an entry in a [`RecencyList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

/// Node in the recency list
struct Node<K, V> {
    entry: Option<(K, V)>,
    prev: usize,
    next: usize,
}

/// Entries ordered from most to least recently used
pub(crate) struct RecencyList<K, V> {
    nodes: Vec<Node<K, V>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<K, V> RecencyList<K, V> {
    /// Create an empty list
    #[cfg(test)]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty list with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.saturating_add(1));
        nodes.push(Node {
            entry: None,
            prev: SENTINEL,
            next: SENTINEL,
        });

        Self {
            nodes,
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Number of entries in the list
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Least recently used node
    pub fn tail(&self) -> Option<NodeId> {
        let prev = self.nodes[SENTINEL].prev;
        (prev != SENTINEL).then_some(NodeId(prev))
    }

    /// Insert a new entry at the head
    pub fn push_front(&mut self, key: K, value: V) -> NodeId {
        let idx = self.alloc_node(key, value);
        self.insert_at_head(idx);
        self.len += 1;
        NodeId(idx)
    }

    /// Mark `id` as the most recently used entry
    pub fn move_to_front(&mut self, id: NodeId) {
        if !self.is_live(id.0) {
            return;
        }
        if self.nodes[SENTINEL].next == id.0 {
            return; // Already at front
        }

        self.unlink(id.0);
        self.insert_at_head(id.0);
    }

    /// Detach `id` and hand back its entry
    pub fn remove(&mut self, id: NodeId) -> Option<(K, V)> {
        let entry = self.nodes.get_mut(id.0)?.entry.take()?;
        self.unlink(id.0);
        self.free_list.push(id.0);
        self.len -= 1;
        Some(entry)
    }

    /// Detach the least recently used entry
    pub fn pop_back(&mut self) -> Option<(K, V)> {
        let tail = self.tail()?;
        self.remove(tail)
    }

    /// Key and value stored at `id`, if it is live
    pub fn get(&self, id: NodeId) -> Option<(&K, &V)> {
        self.nodes
            .get(id.0)
            .and_then(|node| node.entry.as_ref())
            .map(|(key, value)| (key, value))
    }

    /// Mutable value stored at `id`, if it is live
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut V> {
        self.nodes
            .get_mut(id.0)
            .and_then(|node| node.entry.as_mut())
            .map(|(_, value)| value)
    }

    /// Iterate from most to least recently used
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            cursor: self.nodes[SENTINEL].next,
        }
    }

    fn is_live(&self, idx: usize) -> bool {
        self.nodes
            .get(idx)
            .map(|node| node.entry.is_some())
            .unwrap_or(false)
    }

    // before: sentinel <-> old_head
    // after:  sentinel <-> idx <-> old_head
    fn insert_at_head(&mut self, idx: usize) {
        let next = self.nodes[SENTINEL].next;
        self.nodes[idx].prev = SENTINEL;
        self.nodes[idx].next = next;
        self.nodes[next].prev = idx;
        self.nodes[SENTINEL].next = idx;
    }

    // before: prev <-> idx <-> next
    // after:  prev <-> next, idx detached
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = &self.nodes[idx];
            (node.prev, node.next)
        };
        debug_assert!(prev != DETACHED && next != DETACHED, "unlink of detached node");

        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.nodes[idx].prev = DETACHED;
        self.nodes[idx].next = DETACHED;
    }

    fn alloc_node(&mut self, key: K, value: V) -> usize {
        if let Some(idx) = self.free_list.pop() {
            self.nodes[idx].entry = Some((key, value));
            idx
        } else {
            self.nodes.push(Node {
                entry: Some((key, value)),
                prev: DETACHED,
                next: DETACHED,
            });
            self.nodes.len() - 1
        }
    }

    /// Walk the list both ways and panic on any broken link
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let mut count = 0;
        let mut prev = SENTINEL;
        let mut cursor = self.nodes[SENTINEL].next;
        while cursor != SENTINEL {
            let node = &self.nodes[cursor];
            assert!(node.entry.is_some(), "linked node {} has no entry", cursor);
            assert_eq!(node.prev, prev, "back link of node {} is broken", cursor);
            prev = cursor;
            cursor = node.next;
            count += 1;
            assert!(count <= self.len, "list is longer than its length");
        }
        assert_eq!(self.nodes[SENTINEL].prev, prev);
        assert_eq!(count, self.len);

        for &idx in &self.free_list {
            let node = &self.nodes[idx];
            assert!(node.entry.is_none());
            assert_eq!((node.prev, node.next), (DETACHED, DETACHED));
        }
    }
}

/// Iterator over a [`RecencyList`], most recently used first
pub(crate) struct Iter<'a, K, V> {
    list: &'a RecencyList<K, V>,
    cursor: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == SENTINEL {
            return None;
        }
        let node = &self.list.nodes[self.cursor];
        self.cursor = node.next;
        node.entry.as_ref().map(|(key, value)| (key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &RecencyList<u32, &'static str>) -> Vec<u32> {
        list.iter().map(|(key, _)| *key).collect()
    }

    #[test]
    fn test_list_empty() {
        let list: RecencyList<u32, &str> = RecencyList::new();

        assert!(list.is_empty());
        assert_eq!(list.tail(), None);
        assert_eq!(list.iter().count(), 0);
        list.assert_consistent();
    }

    #[test]
    fn test_list_push_front_order() {
        let mut list = RecencyList::new();

        let a = list.push_front(1, "a");
        list.push_front(2, "b");
        list.push_front(3, "c");

        assert_eq!(keys(&list), vec![3, 2, 1]);
        assert_eq!(list.tail(), Some(a));
        assert_eq!(list.len(), 3);
        list.assert_consistent();
    }

    #[test]
    fn test_list_move_to_front() {
        let mut list = RecencyList::new();

        let a = list.push_front(1, "a");
        list.push_front(2, "b");
        list.push_front(3, "c");

        list.move_to_front(a);
        assert_eq!(keys(&list), vec![1, 3, 2]);

        // Head stays put
        list.move_to_front(a);
        assert_eq!(keys(&list), vec![1, 3, 2]);
        list.assert_consistent();
    }

    #[test]
    fn test_list_remove_middle() {
        let mut list = RecencyList::new();

        list.push_front(1, "a");
        let b = list.push_front(2, "b");
        list.push_front(3, "c");

        assert_eq!(list.remove(b), Some((2, "b")));
        assert_eq!(keys(&list), vec![3, 1]);
        assert_eq!(list.get(b), None);

        // Second removal is a no-op
        assert_eq!(list.remove(b), None);
        assert_eq!(list.len(), 2);
        list.assert_consistent();
    }

    #[test]
    fn test_list_pop_back() {
        let mut list = RecencyList::new();

        list.push_front(1, "a");
        list.push_front(2, "b");

        assert_eq!(list.pop_back(), Some((1, "a")));
        assert_eq!(list.pop_back(), Some((2, "b")));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
        list.assert_consistent();
    }

    #[test]
    fn test_list_slot_reuse() {
        let mut list = RecencyList::with_capacity(2);

        let a = list.push_front(1, "a");
        list.remove(a);
        let b = list.push_front(2, "b");

        // Freed slot is recycled for a fresh entry
        assert_eq!(a, b);
        assert_eq!(list.get(b), Some((&2, &"b")));
        list.assert_consistent();
    }

    #[test]
    fn test_list_get_mut() {
        let mut list = RecencyList::new();

        let a = list.push_front(1, "a");
        if let Some(value) = list.get_mut(a) {
            *value = "z";
        }

        assert_eq!(list.get(a), Some((&1, &"z")));
    }

    #[test]
    fn test_list_move_detached_is_ignored() {
        let mut list = RecencyList::new();

        let a = list.push_front(1, "a");
        list.push_front(2, "b");
        list.remove(a);
        list.move_to_front(a);

        assert_eq!(keys(&list), vec![2]);
        list.assert_consistent();
    }
}
