//! Recency ordering for LRU eviction.
//!
//! [`RecencyList`] is a doubly-linked list stored in a `Vec` arena, with
//! index links instead of pointers. The head is the most recently used key
//! and the tail the least recently used one. Every operation is O(1);
//! freed slots are recycled through a free list.

/// Null link.
const NIL: usize = usize::MAX;

/// Handle to a node of a [`RecencyList`].
///
/// A handle stays valid until its node is removed. After that the slot may
/// be reused by a later push, so callers must drop handles of removed nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node<K> {
    key: Option<K>,
    prev: usize,
    next: usize,
}

/// Keys ordered from most to least recently used.
///
/// # Examples
///
/// ```
/// use decorum_core::RecencyList;
///
/// let mut order = RecencyList::new();
/// let a = order.push_front("a");
/// order.push_front("b");
/// order.push_front("c");
///
/// // Touch "a": it becomes the most recently used key
/// order.move_to_front(a);
///
/// assert_eq!(order.iter().copied().collect::<Vec<_>>(), vec!["a", "c", "b"]);
/// assert_eq!(order.pop_back(), Some("b"));
/// ```
#[derive(Debug)]
pub struct RecencyList<K> {
    nodes: Vec<Node<K>>,
    head: usize,
    tail: usize,
    free: Vec<usize>,
    len: usize,
}

impl<K> Default for RecencyList<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RecencyList<K> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `key` as the most recently used entry.
    pub fn push_front(&mut self, key: K) -> NodeId {
        let node = Node {
            key: Some(key),
            prev: NIL,
            next: NIL,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.link_front(idx);
        self.len += 1;
        NodeId(idx)
    }

    /// Marks the node as most recently used.
    ///
    /// Does nothing for handles of removed nodes.
    pub fn move_to_front(&mut self, id: NodeId) {
        if !self.is_live(id) || self.head == id.0 {
            return;
        }
        self.unlink(id.0);
        self.link_front(id.0);
    }

    /// Removes and returns the least recently used key.
    pub fn pop_back(&mut self) -> Option<K> {
        if self.tail == NIL {
            return None;
        }
        self.remove(NodeId(self.tail))
    }

    /// Removes the node and returns its key.
    ///
    /// Returns `None` for handles of already removed nodes.
    pub fn remove(&mut self, id: NodeId) -> Option<K> {
        if !self.is_live(id) {
            return None;
        }
        self.unlink(id.0);
        let key = self.nodes[id.0].key.take();
        self.free.push(id.0);
        self.len -= 1;
        key
    }

    /// The most recently used key.
    pub fn front(&self) -> Option<&K> {
        self.key_at(self.head)
    }

    /// The least recently used key, i.e. the next eviction candidate.
    pub fn back(&self) -> Option<&K> {
        self.key_at(self.tail)
    }

    /// Returns the key stored in the node.
    pub fn get(&self, id: NodeId) -> Option<&K> {
        self.key_at(id.0)
    }

    /// Iterates from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
        self.len = 0;
    }

    fn is_live(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.0)
            .map(|node| node.key.is_some())
            .unwrap_or(false)
    }

    fn key_at(&self, idx: usize) -> Option<&K> {
        self.nodes.get(idx).and_then(|node| node.key.as_ref())
    }

    fn link_front(&mut self, idx: usize) {
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = self.head;
        if self.head != NIL {
            self.nodes[self.head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.tail = prev;
        }
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = NIL;
    }
}

/// Iterator over a [`RecencyList`], most recently used first.
pub struct Iter<'a, K> {
    list: &'a RecencyList<K>,
    cursor: usize,
    remaining: usize,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let list = self.list;
        let node = &list.nodes[self.cursor];
        self.cursor = node.next;
        self.remaining -= 1;
        node.key.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}
