//! Indexed binary min-heap used as the A* open list

/// Heap entry ordered by estimate, then by insertion sequence
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    node: usize,
    estimate: f32,
    seq: u64,
}

impl OpenEntry {
    fn precedes(&self, other: &OpenEntry) -> bool {
        self.estimate < other.estimate || (self.estimate == other.estimate && self.seq < other.seq)
    }
}

/// Open list keyed by node index.
///
/// Entries with equal estimates pop in insertion order. Re-inserting a node after its
/// estimate improved counts as a fresh insertion. `positions` maps a node index to its
/// slot in `heap`, which keeps removal and key updates logarithmic.
#[derive(Debug, Default)]
pub struct OpenSet {
    heap: Vec<OpenEntry>,
    positions: Vec<Option<usize>>,
    next_seq: u64,
}

impl OpenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, node: usize) -> bool {
        self.positions.get(node).copied().flatten().is_some()
    }

    /// Insert `node`, replacing any entry it already has
    pub fn push(&mut self, node: usize, estimate: f32) {
        self.remove(node);

        if self.positions.len() <= node {
            self.positions.resize(node + 1, None);
        }

        let entry = OpenEntry {
            node,
            estimate,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        let slot = self.heap.len();
        self.heap.push(entry);
        self.positions[node] = Some(slot);
        self.sift_up(slot);
    }

    /// Remove and return the node with the lowest estimate
    pub fn pop(&mut self) -> Option<usize> {
        let first = self.heap.first()?.node;
        self.remove(first);
        Some(first)
    }

    pub fn peek(&self) -> Option<usize> {
        self.heap.first().map(|entry| entry.node)
    }

    pub fn remove(&mut self, node: usize) -> bool {
        let Some(slot) = self.positions.get(node).copied().flatten() else {
            return false;
        };

        let last = self.heap.len() - 1;
        self.swap(slot, last);
        self.heap.pop();
        self.positions[node] = None;

        if slot < self.heap.len() {
            self.sift_down(slot);
            self.sift_up(slot);
        }
        true
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.positions[self.heap[a].node] = Some(a);
        self.positions[self.heap[b].node] = Some(b);
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.heap[slot].precedes(&self.heap[parent]) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut best = slot;

            if left < self.heap.len() && self.heap[left].precedes(&self.heap[best]) {
                best = left;
            }
            if right < self.heap.len() && self.heap[right].precedes(&self.heap[best]) {
                best = right;
            }
            if best == slot {
                break;
            }
            self.swap(slot, best);
            slot = best;
        }
    }
}
