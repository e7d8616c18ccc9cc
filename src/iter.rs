use crate::node::{Entry, Index, Node};

use slab::Slab;

/// Ascending iterator over the entries of a `SkipListMap`. Walks level 0 from
/// the first node to the last.
pub struct Iter<'a, K, V> {
    nodes_: &'a Slab<Node>,
    entries_: &'a Slab<Entry<K, V>>,
    current_: Option<Index>,
    remaining_: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(
        nodes: &'a Slab<Node>,
        entries: &'a Slab<Entry<K, V>>,
        first: Option<Index>,
        length: usize,
    ) -> Iter<'a, K, V> {
        Iter {
            nodes_: nodes,
            entries_: entries,
            current_: first,
            remaining_: length,
        }
    }
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter {
            nodes_: self.nodes_,
            entries_: self.entries_,
            current_: self.current_,
            remaining_: self.remaining_,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes: &'a Slab<Node> = self.nodes_;
        let entries: &'a Slab<Entry<K, V>> = self.entries_;

        let node = &nodes[self.current_?];
        self.current_ = node.next();
        self.remaining_ -= 1;

        let entry = &entries[node.entry()?];
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining_, Some(self.remaining_))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

/// Ascending iterator over the keys of a `SkipListMap`.
pub struct Keys<'a, K, V> {
    inner_: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Keys<'a, K, V> {
        Keys { inner_: inner }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner_.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner_.size_hint()
    }
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}
