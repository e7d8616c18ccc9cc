/// Slot of a node or entry in its `Slab`.
pub(crate) type Index = usize;

/// One key/value pair. Every level of the pair's tower refers to the same
/// `Entry`, so the value is written exactly once on update.
#[derive(Debug, Clone)]
pub(crate) struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

/// A node at one level of the tower. Sentinel nodes have no entry.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    entry_: Option<Index>,
    level_: usize,
    next_: Option<Index>,
    down_: Option<Index>,
}

impl Node {
    pub fn sentinel(level: usize, down: Option<Index>) -> Node {
        Node {
            entry_: None,
            level_: level,
            next_: None,
            down_: down,
        }
    }

    pub fn new(entry: Index, level: usize, next: Option<Index>) -> Node {
        Node {
            entry_: Some(entry),
            level_: level,
            next_: next,
            down_: None,
        }
    }

    #[inline(always)]
    pub fn entry(&self) -> Option<Index> {
        self.entry_
    }

    #[inline(always)]
    pub fn level(&self) -> usize {
        self.level_
    }

    #[inline(always)]
    pub fn next(&self) -> Option<Index> {
        self.next_
    }

    #[inline(always)]
    pub fn down(&self) -> Option<Index> {
        self.down_
    }

    pub fn link_to(&mut self, next: Option<Index>) {
        self.next_ = next;
    }

    pub fn link_down(&mut self, down: Index) {
        debug_assert!(self.down_.is_none());
        self.down_ = Some(down);
    }
}
