use crate::error::{Error, Result};
use crate::height_control::{GeometricalGenerator, HeightControl};
use crate::iter::{Iter, Keys};
use crate::key::Key;
use crate::node::{Entry, Index, Node};

use slab::Slab;

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;

/// An ordered map stored as a skip list.
///
/// Every level of the list is a singly linked chain that starts at a sentinel
/// node. Level 0 holds every key; each level above holds a random subset of
/// the level below it, and every key node above level 0 links `down` to the
/// node for the same key one level below.
///
/// Nodes live in a slab and refer to each other by index. The key and value
/// are stored once per key, in an `Entry` shared by the whole tower.
#[derive(Clone)]
pub struct SkipListMap<K, V, H = GeometricalGenerator> {
    nodes_: Slab<Node>,
    entries_: Slab<Entry<K, V>>,

    /// Sentinel of every level in use, indexed by level. The last one is the
    /// head where every search begins. Levels are never shrunk: sentinels
    /// stay even after every key that reached their level has been removed.
    heads_: Vec<Index>,

    /// Number of keys in the map, i.e. key nodes at level 0.
    length_: usize,

    /// Used to generate the level of every newly inserted key.
    controller_: H,
}

/// What a traversal should do after looking at the successor of a node.
enum Step {
    /// The successor's key is smaller than the target.
    Forward(Index),
    /// The successor holds the target key.
    Found(Index),
    /// The level has no successor, or it is past the target.
    Descend,
}

impl<K, V> SkipListMap<K, V> {
    /// Creates an empty map that promotes nodes with probability
    /// `DEFAULT_ITERATION_PROBABILITY`.
    pub fn new() -> SkipListMap<K, V> {
        Self::with_height_control(GeometricalGenerator::default())
    }

    /// Creates an empty map that promotes nodes with the given probability,
    /// which must lie in (0, 1].
    pub fn with_probability(iteration_probability: f64) -> Result<SkipListMap<K, V>> {
        GeometricalGenerator::new(iteration_probability).map(Self::with_height_control)
    }
}

impl<K, V> Default for SkipListMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H: HeightControl> SkipListMap<K, V, H> {
    pub fn with_height_control(controller: H) -> SkipListMap<K, V, H> {
        debug!(
            "creating skip list with iteration probability {}",
            controller.probability()
        );

        let mut nodes = Slab::new();
        let head = nodes.insert(Node::sentinel(0, None));

        SkipListMap {
            nodes_: nodes,
            entries_: Slab::new(),
            heads_: vec![head],
            length_: 0,
            controller_: controller,
        }
    }

    /// Probability with which the level generator promotes a node.
    pub fn probability(&self) -> f64 {
        self.controller_.probability()
    }
}

impl<K, V, H> SkipListMap<K, V, H> {
    /// Returns the number of keys stored in the map.
    pub fn len(&self) -> usize {
        self.length_
    }

    /// Returns `true` if there are no keys stored within the map.
    pub fn is_empty(&self) -> bool {
        self.length_ == 0
    }

    /// Number of levels currently in use, counting level 0. Updating an
    /// existing key never adds levels.
    pub fn height(&self) -> usize {
        self.heads_.len()
    }

    /// Removes all keys. The map goes back to a single, empty level.
    pub fn clear(&mut self) {
        trace!(
            "clearing {} keys ({} nodes over {} levels)",
            self.length_,
            self.nodes_.len(),
            self.heads_.len()
        );

        self.nodes_.clear();
        self.entries_.clear();
        self.heads_.clear();
        let head = self.nodes_.insert(Node::sentinel(0, None));
        self.heads_.push(head);
        self.length_ = 0;
    }

    /// Iterates over the entries in ascending key order.
    pub fn iter(&self) -> Iter<K, V> {
        Iter::new(
            &self.nodes_,
            &self.entries_,
            self.nodes_[self.heads_[0]].next(),
            self.length_,
        )
    }

    /// Iterates over the keys in ascending order.
    pub fn keys(&self) -> Keys<K, V> {
        Keys::new(self.iter())
    }

    /// Returns the entry with the smallest key, if any.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.iter().next()
    }

    /// Returns `true` if some key maps to `value`. Scans the whole map.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|(_, candidate)| candidate == value)
    }

    /// Snapshot of the keys.
    pub fn key_set(&self) -> HashSet<K>
    where
        K: Hash + Eq + Clone,
    {
        self.keys().cloned().collect()
    }

    /// Snapshot of the values. Values mapped from different keys are all
    /// kept, even when they compare equal.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|(_, value)| value.clone()).collect()
    }

    /// Snapshot of the key/value pairs.
    pub fn entry_set(&self) -> HashSet<(K, V)>
    where
        K: Hash + Eq + Clone,
        V: Hash + Eq + Clone,
    {
        self.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    #[inline(always)]
    fn head(&self) -> Index {
        // There is always at least the level 0 sentinel.
        self.heads_[self.heads_.len() - 1]
    }

    fn entry_of(&self, node: Index) -> Index {
        match self.nodes_[node].entry() {
            Some(entry) => entry,
            None => unreachable!("sentinel {} linked as a successor", node),
        }
    }

    fn key_at(&self, node: Index) -> &K {
        &self.entries_[self.entry_of(node)].key
    }

    fn step<Q>(&self, node: Index, key: &Q) -> Step
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.nodes_[node].next() {
            None => Step::Descend,
            Some(next) => match Borrow::<Q>::borrow(self.key_at(next)).cmp(key) {
                Ordering::Less => Step::Forward(next),
                Ordering::Equal => Step::Found(next),
                Ordering::Greater => Step::Descend,
            },
        }
    }

    /// Finds the entry holding `key`, stopping at the highest level where it
    /// shows up.
    fn find<Q>(&self, key: &Q) -> Option<Index>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = Some(self.head());

        while let Some(mut node) = current {
            loop {
                match self.step(node, key) {
                    Step::Forward(next) => node = next,
                    Step::Found(next) => return Some(self.entry_of(next)),
                    Step::Descend => break,
                }
            }

            current = self.nodes_[node].down();
        }

        None
    }

    /// Adds sentinels until `level` is in use.
    fn grow(&mut self, level: usize) {
        while self.heads_.len() <= level {
            let below = self.head();
            let height = self.heads_.len();
            let sentinel = self.nodes_.insert(Node::sentinel(height, Some(below)));
            self.heads_.push(sentinel);
            trace!("grew skip list to level {}", height);
        }
    }
}

impl<K: Key, V, H> SkipListMap<K, V, H> {
    /// Returns a reference to the value mapped to `key`, if any.
    pub fn get<Q>(&self, key: &Q) -> Result<Option<&V>>
    where
        K: Borrow<Q>,
        Q: Key + ?Sized,
    {
        if key.is_null() {
            return Err(Error::InvalidKey);
        }

        Ok(self.find(key).map(|entry| &self.entries_[entry].value))
    }

    /// Returns a mutable reference to the value mapped to `key`, if any.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<Option<&mut V>>
    where
        K: Borrow<Q>,
        Q: Key + ?Sized,
    {
        if key.is_null() {
            return Err(Error::InvalidKey);
        }

        match self.find(key) {
            Some(entry) => Ok(Some(&mut self.entries_[entry].value)),
            None => Ok(None),
        }
    }

    /// Returns `true` if `key` is in the map, whatever value it maps to.
    pub fn contains_key<Q>(&self, key: &Q) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: Key + ?Sized,
    {
        if key.is_null() {
            return Err(Error::InvalidKey);
        }

        Ok(self.find(key).is_some())
    }

    /// Removes `key` from the map, returning the value it mapped to.
    ///
    /// Every level is visited, unlinking the key wherever it is found.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: Key + ?Sized,
    {
        if key.is_null() {
            return Err(Error::InvalidKey);
        }

        let mut removed = None;
        let mut current = Some(self.head());

        while let Some(mut node) = current {
            loop {
                match self.step(node, key) {
                    Step::Forward(next) => node = next,
                    Step::Found(next) => {
                        let after = self.nodes_[next].next();
                        self.nodes_[node].link_to(after);
                        removed = self.nodes_.remove(next).entry();
                        break;
                    }
                    Step::Descend => break,
                }
            }

            current = self.nodes_[node].down();
        }

        match removed {
            None => Ok(None),
            Some(entry) => {
                self.length_ -= 1;
                Ok(Some(self.entries_.remove(entry).value))
            }
        }
    }
}

impl<K: Key, V, H: HeightControl> SkipListMap<K, V, H> {
    /// Maps `key` to `value`. Returns the value previously mapped to `key`,
    /// or `None` if the key is new.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        if key.is_null() {
            return Err(Error::InvalidKey);
        }

        // Last node before `key` on every level, top level first.
        let mut updates = Vec::with_capacity(self.heads_.len());
        let mut current = Some(self.head());

        while let Some(mut node) = current {
            loop {
                match self.step(node, &key) {
                    Step::Forward(next) => node = next,
                    Step::Found(next) => {
                        let entry = self.entry_of(next);
                        let previous = std::mem::replace(&mut self.entries_[entry].value, value);
                        return Ok(Some(previous));
                    }
                    Step::Descend => break,
                }
            }

            updates.push(node);
            current = self.nodes_[node].down();
        }

        debug_assert_eq!(updates.len(), self.heads_.len());
        updates.reverse();

        // The level is only drawn once the key is known to be new.
        let level = self.controller_.random_level(self.length_);
        self.grow(level);
        for height in updates.len()..=level {
            updates.push(self.heads_[height]);
        }

        let entry = self.entries_.insert(Entry { key, value });
        let mut above: Option<Index> = None;

        // Nodes are created top-down, each one linking down from the last.
        for height in (0..=level).rev() {
            let update = updates[height];
            debug_assert_eq!(self.nodes_[update].level(), height);
            let next = self.nodes_[update].next();
            let node = self.nodes_.insert(Node::new(entry, height, next));
            self.nodes_[update].link_to(Some(node));

            if let Some(above) = above {
                self.nodes_[above].link_down(node);
            }
            above = Some(node);
        }

        self.length_ += 1;
        Ok(None)
    }

    /// Inserts every pair in iteration order. Stops at the first null key;
    /// pairs before it stay inserted.
    pub fn insert_all<I>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in entries {
            self.insert(key, value)?;
        }

        Ok(())
    }
}

impl<'a, K, Q, V, H> std::ops::Index<&'a Q> for SkipListMap<K, V, H>
where
    K: Key + Borrow<Q>,
    Q: Key + ?Sized,
{
    type Output = V;

    fn index(&self, index: &Q) -> &Self::Output {
        match self.get(index) {
            Ok(Some(value)) => value,
            Ok(None) => panic!("key not found in skip list"),
            Err(err) => panic!("{}", err),
        }
    }
}

impl<'a, K, V, H> IntoIterator for &'a SkipListMap<K, V, H> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Two maps are equal when they hold the same key/value pairs, no matter how
/// their towers are shaped.
impl<K, V, H, H2> PartialEq<SkipListMap<K, V, H2>> for SkipListMap<K, V, H>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &SkipListMap<K, V, H2>) -> bool {
        // Both sides are sorted and keys are unique, so comparing in order is
        // the same as comparing the sets of pairs.
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, H> Eq for SkipListMap<K, V, H> {}

impl<K: std::fmt::Display, V: std::fmt::Display, H> std::fmt::Display for SkipListMap<K, V, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[")?;

        for (position, (key, value)) in self.iter().enumerate() {
            if position > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }

        write!(f, "]")
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug, H> std::fmt::Debug for SkipListMap<K, V, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
impl<K: Ord, V, H> SkipListMap<K, V, H> {
    /// Walks the whole structure and panics if it is not a well formed skip
    /// list.
    pub(crate) fn check_invariants(&self) {
        let mut key_nodes = 0;

        for (height, &sentinel) in self.heads_.iter().enumerate() {
            let head = &self.nodes_[sentinel];
            assert!(head.entry().is_none());
            assert_eq!(head.level(), height);
            assert_eq!(head.down(), height.checked_sub(1).map(|h| self.heads_[h]));

            let mut previous: Option<Index> = None;
            let mut current = head.next();
            let mut count = 0;
            while let Some(node) = current {
                assert_eq!(self.nodes_[node].level(), height);
                if let Some(previous) = previous {
                    assert!(self.key_at(previous) < self.key_at(node));
                }

                // Tower property: the node one level below holds the same key.
                match self.nodes_[node].down() {
                    Some(down) => {
                        assert!(height > 0);
                        assert_eq!(self.nodes_[down].level(), height - 1);
                        assert_eq!(self.entry_of(down), self.entry_of(node));
                    }
                    None => assert_eq!(height, 0),
                }

                previous = Some(node);
                current = self.nodes_[node].next();
                count += 1;
            }

            if height == 0 {
                assert_eq!(count, self.length_);
            }
            key_nodes += count;
        }

        assert_eq!(self.entries_.len(), self.length_);
        assert_eq!(self.nodes_.len(), key_nodes + self.heads_.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{quickcheck, Arbitrary, Gen, TestResult};
    use std::collections::BTreeMap;

    impl<K, V> Arbitrary for SkipListMap<K, V>
    where
        K: Key + Arbitrary,
        V: Arbitrary,
    {
        fn arbitrary(gen: &mut Gen) -> SkipListMap<K, V> {
            let probability = *gen.choose(&[0.1, 0.2, 0.5, 0.8, 1.0]).unwrap();
            let mut list = SkipListMap::with_probability(probability).unwrap();

            let length = usize::arbitrary(gen) % (gen.size() + 1);
            for _i in 0..length {
                let key = K::arbitrary(gen);
                if !key.is_null() {
                    list.insert(key, V::arbitrary(gen)).unwrap();
                }
            }

            list
        }
    }

    fn seeded(probability: f64) -> SkipListMap<i32, i32> {
        SkipListMap::with_height_control(GeometricalGenerator::with_seed(probability, 17).unwrap())
    }

    #[test]
    fn clear_empties() {
        fn prop(mut list: SkipListMap<i32, i32>) -> TestResult {
            list.clear();
            list.check_invariants();
            TestResult::from_bool(list.len() == 0 && list.is_empty() && list.height() == 1)
        }

        quickcheck(prop as fn(SkipListMap<i32, i32>) -> TestResult);
    }

    #[test]
    fn arbitrary_lists_are_well_formed() {
        fn prop(list: SkipListMap<i32, i32>) -> TestResult {
            list.check_invariants();
            TestResult::passed()
        }

        quickcheck(prop as fn(SkipListMap<i32, i32>) -> TestResult);
    }

    #[test]
    fn insert_adds_one_to_length() {
        fn prop(mut list: SkipListMap<i32, i32>) -> TestResult {
            let length = list.len();
            // Any key larger than every key in the list is new.
            let key = match list.keys().last() {
                Some(&i32::MAX) => return TestResult::discard(),
                Some(&last) => last + 1,
                None => 0,
            };

            assert!(list.insert(key, 3).unwrap().is_none());
            list.check_invariants();
            TestResult::from_bool(list.len() == length + 1)
        }

        quickcheck(prop as fn(SkipListMap<i32, i32>) -> TestResult);
    }

    #[test]
    fn remove_takes_one_from_length() {
        fn prop(mut list: SkipListMap<i32, i32>) -> TestResult {
            let length = list.len();
            let (key, value) = match list.first() {
                None => return TestResult::discard(),
                Some((&key, &value)) => (key, value),
            };

            assert_eq!(list.remove(&key).unwrap(), Some(value));
            list.check_invariants();
            TestResult::from_bool(list.len() == length - 1 && !list.contains_key(&key).unwrap())
        }

        quickcheck(prop as fn(SkipListMap<i32, i32>) -> TestResult);
    }

    #[test]
    fn matches_btree_map() {
        fn prop(operations: Vec<(bool, i8, i32)>) -> TestResult {
            let mut list: SkipListMap<i8, i32> = SkipListMap::new();
            let mut model = BTreeMap::new();

            for (insert, key, value) in operations {
                if insert {
                    assert_eq!(list.insert(key, value).unwrap(), model.insert(key, value));
                } else {
                    assert_eq!(list.remove(&key).unwrap(), model.remove(&key));
                }
                assert_eq!(list.len(), model.len());
            }

            list.check_invariants();
            TestResult::from_bool(list.iter().eq(model.iter()))
        }

        quickcheck(prop as fn(Vec<(bool, i8, i32)>) -> TestResult);
    }

    #[test]
    fn insertion_order_does_not_matter() {
        fn prop(pairs: Vec<(i32, i32)>) -> TestResult {
            let unique: BTreeMap<i32, i32> = pairs.into_iter().collect();

            let mut forward: SkipListMap<i32, i32> = SkipListMap::new();
            forward.insert_all(unique.iter().map(|(&k, &v)| (k, v))).unwrap();

            let mut backward = seeded(0.5);
            backward
                .insert_all(unique.iter().rev().map(|(&k, &v)| (k, v)))
                .unwrap();

            TestResult::from_bool(forward == backward && forward.entry_set() == backward.entry_set())
        }

        quickcheck(prop as fn(Vec<(i32, i32)>) -> TestResult);
    }

    #[test]
    fn update_keeps_single_tower() {
        let mut list = seeded(1.0);
        for key in 0..8 {
            assert!(list.insert(key, key).unwrap().is_none());
        }
        let nodes = list.nodes_.len();

        for key in 0..8 {
            assert_eq!(list.insert(key, key * 10).unwrap(), Some(key));
        }

        assert_eq!(list.nodes_.len(), nodes);
        assert_eq!(list.len(), 8);
        for key in 0..8 {
            assert_eq!(list.get(&key).unwrap(), Some(&(key * 10)));
        }
        list.check_invariants();
    }

    #[test]
    fn towers_grow_one_sentinel_per_level() {
        // With probability 1 every key climbs up to the current length.
        let mut list = seeded(1.0);
        for key in 0..5 {
            list.insert(key, key).unwrap();
            assert_eq!(list.height(), key as usize + 1);
        }
        list.check_invariants();
    }

    #[test]
    fn levels_are_not_shrunk() {
        let mut list = seeded(1.0);
        for key in 0..6 {
            list.insert(key, key).unwrap();
        }
        let height = list.height();

        for key in 0..6 {
            assert_eq!(list.remove(&key).unwrap(), Some(key));
            list.check_invariants();
        }

        assert!(list.is_empty());
        assert_eq!(list.height(), height);
        assert_eq!(list.nodes_.len(), height);
    }

    #[test]
    fn removed_slots_are_reused() {
        let mut list = seeded(0.5);
        for key in 0..100 {
            list.insert(key, key).unwrap();
        }
        let capacity = list.entries_.capacity();
        for key in 0..100 {
            list.remove(&key).unwrap();
        }
        assert_eq!(list.entries_.len(), 0);
        assert!(list.entries_.vacant_key() < 100);

        for key in 0..100 {
            list.insert(key, key).unwrap();
        }

        list.check_invariants();
        assert_eq!(list.len(), 100);
        assert_eq!(list.entries_.capacity(), capacity);
    }

    #[test]
    fn updates_never_grow_the_tower() {
        let mut list = seeded(1.0);
        for key in 0..4 {
            list.insert(key, key).unwrap();
        }
        let height = list.height();
        let nodes = list.nodes_.len();

        // With probability 1 a fresh key would climb to level 4.
        for key in 0..4 {
            list.insert(key, key + 1).unwrap();
        }

        assert_eq!(list.height(), height);
        assert_eq!(list.nodes_.len(), nodes);
        list.check_invariants();
    }

    #[test]
    fn first_level_draw_is_zero() {
        // The draw is capped by the length, which is zero for the first key.
        let mut list = seeded(1.0);
        list.insert(10, 10).unwrap();
        assert_eq!(list.height(), 1);
    }

    #[test]
    fn null_keys_do_not_mutate() {
        let mut list: SkipListMap<Option<i32>, i32> = SkipListMap::new();
        list.insert(Some(1), 1).unwrap();
        let nodes = list.nodes_.len();

        assert_eq!(list.insert(None, 2), Err(Error::InvalidKey));
        assert_eq!(list.remove(&None), Err(Error::InvalidKey));
        assert_eq!(list.nodes_.len(), nodes);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn clone_is_independent() {
        let mut list = seeded(0.5);
        list.insert_all((0..20).map(|k| (k, k))).unwrap();

        let mut copied = list.clone();
        assert_eq!(copied, list);

        copied.remove(&3).unwrap();
        assert_ne!(copied, list);
        assert_eq!(list.get(&3).unwrap(), Some(&3));
        copied.check_invariants();
    }
}
