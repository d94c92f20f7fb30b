use std::mem;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::iterator::StorageIterator;
use crate::types::{Key, Value};

/// Maximum height of the skip list.
pub const MAX_LEVEL: usize = 16;

/// Arena slot of the sentinel head. Never freed, never yielded as data.
const HEAD: usize = 0;

/// A single node in the skip list.
///
/// Each node has `height` forward links. Level 0 contains all nodes
/// (a regular linked list). Higher levels skip over nodes, enabling
/// O(log n) average-case search.
///
/// ```text
/// Level 3:  HEAD ──────────────────────────────► 50 ──────────► NIL
/// Level 2:  HEAD ──────────► 20 ────────────────► 50 ──────────► NIL
/// Level 1:  HEAD ──► 10 ──► 20 ────► 35 ────────► 50 ──► 60 ──► NIL
/// Level 0:  HEAD ──► 10 ──► 20 ──► 25 ──► 35 ──► 50 ──► 60 ──► 70 ► NIL
/// ```
struct SkipNode {
    key: Key,
    value: Value,
    // indices into SkipList.nodes, one per level this node is linked at
    forward: Vec<Option<usize>>,
}

/// A probabilistic sorted data structure.
///
/// Nodes live in an arena and link to each other by index, so there is no
/// `unsafe` and no shared ownership. Slots freed by `delete` are recycled
/// by later inserts.
///
/// Average case: O(log n) insert, find and delete, O(n) iteration.
/// There is no rebalancing; the geometric height distribution is what
/// keeps searches short.
pub struct SkipList {
    nodes: Vec<SkipNode>,
    free: Vec<usize>,
    /// Height of the tallest linked node, or 1 when empty.
    level: usize,
    len: usize,
    size_bytes: usize,
    rng: StdRng,
}

impl SkipList {
    /// Create a new empty skip list.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a skip list whose node heights come from a seeded generator.
    /// Two lists with the same seed and the same inserts have the same shape.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let head = SkipNode {
            key: Vec::new(),
            value: Vec::new(),
            forward: vec![None; MAX_LEVEL],
        };
        SkipList {
            nodes: vec![head],
            free: Vec::new(),
            level: 1,
            len: 0,
            size_bytes: 0,
            rng,
        }
    }

    /// Walk from the highest active level down to level 0, recording the
    /// rightmost node visited on each level (the "journey").
    ///
    /// Returns the node holding `key`, if any, plus the journey. Levels at or
    /// above `self.level` are never visited and keep the head as predecessor,
    /// which is exactly what an insert that raises the level needs.
    fn search(&self, key: &[u8]) -> (Option<usize>, [usize; MAX_LEVEL]) {
        let mut journey = [HEAD; MAX_LEVEL];
        let mut cursor = HEAD;

        for lvl in (0..self.level).rev() {
            while let Some(next) = self.nodes[cursor].forward[lvl] {
                if self.nodes[next].key.as_slice() < key {
                    cursor = next;
                } else {
                    break;
                }
            }
            journey[lvl] = cursor;
        }

        let found = self.nodes[cursor].forward[0]
            .filter(|&next| self.nodes[next].key.as_slice() == key);
        (found, journey)
    }

    /// Insert a key-value pair. Overwrites if key already exists.
    ///
    /// Algorithm:
    ///   1. Search, keeping the predecessor at each level
    ///   2. Exact match: replace the value in place, done
    ///   3. Otherwise draw a random height and splice the new node in
    ///      after the predecessor on every level up to that height
    pub fn insert(&mut self, key: Key, value: Value) {
        let (found, journey) = self.search(&key);

        if let Some(idx) = found {
            let node = &mut self.nodes[idx];
            self.size_bytes = self.size_bytes - node.value.len() + value.len();
            node.value = value;
            return;
        }

        let height = self.random_height();
        self.size_bytes += key.len() + value.len();
        let idx = self.alloc(SkipNode {
            key,
            value,
            forward: vec![None; height],
        });

        for (lvl, &prev) in journey.iter().enumerate().take(height) {
            self.nodes[idx].forward[lvl] = self.nodes[prev].forward[lvl];
            self.nodes[prev].forward[lvl] = Some(idx);
        }

        if height > self.level {
            self.level = height;
        }
        self.len += 1;
    }

    /// Look up a key. Returns the value if found.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        let (found, _) = self.search(key);
        found.map(|idx| self.nodes[idx].value.as_slice())
    }

    /// Like [`SkipList::get`], but reports absence as `Error::NotFound`.
    pub fn find(&self, key: &[u8]) -> Result<&[u8]> {
        self.get(key).ok_or(Error::NotFound)
    }

    /// Remove a key, returning its value.
    ///
    /// An absent key is `Error::NotFound` and leaves the list untouched.
    /// After unlinking, the active level is recomputed from the head's links,
    /// so it always equals the height of the tallest surviving node.
    pub fn delete(&mut self, key: &[u8]) -> Result<Value> {
        let (found, journey) = self.search(key);
        let target = found.ok_or(Error::NotFound)?;

        let height = self.nodes[target].forward.len();
        for (lvl, &prev) in journey.iter().enumerate().take(height) {
            if self.nodes[prev].forward[lvl] == Some(target) {
                self.nodes[prev].forward[lvl] = self.nodes[target].forward[lvl];
            }
        }

        let node = &mut self.nodes[target];
        node.forward.clear();
        let key = mem::take(&mut node.key);
        let value = mem::take(&mut node.value);

        self.size_bytes -= key.len() + value.len();
        self.len -= 1;
        self.free.push(target);
        self.level = self.top_level();

        Ok(value)
    }

    /// Number of entries in the skip list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the skip list is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current number of active levels.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Approximate memory usage in bytes (keys + values).
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Create an iterator over all entries in sorted order.
    /// Traverses level 0 (the bottom level contains all entries).
    pub fn iter(&self) -> SkipListIterator<'_> {
        SkipListIterator {
            list: self,
            current: self.nodes[HEAD].forward[0],
        }
    }

    /// Start at height 1, add a level per successful coin flip (p = 0.5),
    /// cap at MAX_LEVEL. Expected height is 2.
    fn random_height(&mut self) -> usize {
        let mut height = 1;
        while height < MAX_LEVEL && self.rng.gen_bool(0.5) {
            height += 1;
        }
        height
    }

    // Every node linked at level L is also linked below L, so the highest
    // non-empty head link is the tallest node's height.
    fn top_level(&self) -> usize {
        (0..MAX_LEVEL)
            .rev()
            .find(|&lvl| self.nodes[HEAD].forward[lvl].is_some())
            .map_or(1, |lvl| lvl + 1)
    }

    fn alloc(&mut self, node: SkipNode) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }
}

impl Default for SkipList {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over skip list entries in sorted order.
///
/// Simply follows level 0 forward links. Call [`SkipList::iter`] again to
/// start over.
pub struct SkipListIterator<'a> {
    list: &'a SkipList,
    current: Option<usize>,
}

impl StorageIterator for SkipListIterator<'_> {
    fn key(&self) -> &[u8] {
        match self.current {
            Some(idx) => self.list.nodes[idx].key.as_slice(),
            None => &[],
        }
    }

    fn value(&self) -> &[u8] {
        match self.current {
            Some(idx) => self.list.nodes[idx].value.as_slice(),
            None => &[],
        }
    }

    fn is_valid(&self) -> bool {
        self.current.is_some()
    }

    fn next(&mut self) -> Result<()> {
        if let Some(idx) = self.current {
            self.current = self.list.nodes[idx].forward[0];
        }
        Ok(())
    }

    fn seek(&mut self, key: &[u8]) -> Result<()> {
        let (_, journey) = self.list.search(key);
        self.current = self.list.nodes[journey[0]].forward[0];
        Ok(())
    }
}
