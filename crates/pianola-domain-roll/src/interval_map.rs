use crate::model::{PedalInterval, PedalSet};
use pianola_ports::types::{PedalKind, Tick};
use std::cmp::Ordering;

/// AVL tree keyed by start tick, each node carrying the greatest end tick in its subtree.
#[derive(Clone, Debug, Default)]
pub struct PedalIntervalMap {
    nodes: Vec<Node>,
    root: Option<usize>,
}

#[derive(Clone, Debug)]
struct Node {
    interval: PedalInterval,
    max_end: Tick,
    height: i32,
    left: Option<usize>,
    right: Option<usize>,
}

impl PedalIntervalMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn insert(&mut self, start_tick: Tick, end_tick: Tick, kind: PedalKind) {
        let interval = PedalInterval::new(start_tick, end_tick, kind);
        let idx = self.nodes.len();
        self.nodes.push(Node {
            interval,
            max_end: interval.end_tick,
            height: 1,
            left: None,
            right: None,
        });
        let root = self.root;
        self.root = Some(self.insert_at(root, idx));
    }

    pub fn search(&self, tick: Tick) -> PedalSet {
        let mut set = PedalSet::default();
        for interval in self.intervals_at(tick) {
            set.insert(interval.kind);
        }
        set
    }

    pub fn intervals_at(&self, tick: Tick) -> Vec<PedalInterval> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            stack.push(root);
        }
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if node.max_end < tick {
                continue;
            }
            if let Some(left) = node.left {
                stack.push(left);
            }
            if node.interval.start_tick <= tick {
                if tick <= node.interval.end_tick {
                    out.push(node.interval);
                }
                if let Some(right) = node.right {
                    stack.push(right);
                }
            }
        }
        out.sort_by_key(|interval| (interval.start_tick, interval.end_tick, interval.kind));
        out
    }

    pub fn intervals(&self) -> Vec<PedalInterval> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.collect_in_order(self.root, &mut out);
        out
    }

    fn collect_in_order(&self, node: Option<usize>, out: &mut Vec<PedalInterval>) {
        let Some(idx) = node else {
            return;
        };
        self.collect_in_order(self.nodes[idx].left, out);
        out.push(self.nodes[idx].interval);
        self.collect_in_order(self.nodes[idx].right, out);
    }

    fn insert_at(&mut self, node: Option<usize>, new: usize) -> usize {
        let Some(idx) = node else {
            return new;
        };
        if compare_intervals(&self.nodes[new].interval, &self.nodes[idx].interval)
            == Ordering::Less
        {
            let left = self.nodes[idx].left;
            let child = self.insert_at(left, new);
            self.nodes[idx].left = Some(child);
        } else {
            let right = self.nodes[idx].right;
            let child = self.insert_at(right, new);
            self.nodes[idx].right = Some(child);
        }
        self.update(idx);
        self.rebalance(idx)
    }

    fn height(&self, node: Option<usize>) -> i32 {
        node.map(|idx| self.nodes[idx].height).unwrap_or(0)
    }

    fn max_end(&self, node: Option<usize>) -> Option<Tick> {
        node.map(|idx| self.nodes[idx].max_end)
    }

    fn update(&mut self, idx: usize) {
        let left = self.nodes[idx].left;
        let right = self.nodes[idx].right;
        let height = 1 + self.height(left).max(self.height(right));
        let mut max_end = self.nodes[idx].interval.end_tick;
        for child_max in [self.max_end(left), self.max_end(right)].into_iter().flatten() {
            max_end = max_end.max(child_max);
        }
        let node = &mut self.nodes[idx];
        node.height = height;
        node.max_end = max_end;
    }

    fn balance_factor(&self, idx: usize) -> i32 {
        self.height(self.nodes[idx].left) - self.height(self.nodes[idx].right)
    }

    fn rebalance(&mut self, idx: usize) -> usize {
        let balance = self.balance_factor(idx);
        if balance > 1 {
            if let Some(left) = self.nodes[idx].left {
                if self.balance_factor(left) < 0 {
                    let rotated = self.rotate_left(left);
                    self.nodes[idx].left = Some(rotated);
                }
            }
            return self.rotate_right(idx);
        }
        if balance < -1 {
            if let Some(right) = self.nodes[idx].right {
                if self.balance_factor(right) > 0 {
                    let rotated = self.rotate_right(right);
                    self.nodes[idx].right = Some(rotated);
                }
            }
            return self.rotate_left(idx);
        }
        idx
    }

    fn rotate_right(&mut self, idx: usize) -> usize {
        let Some(pivot) = self.nodes[idx].left else {
            return idx;
        };
        self.nodes[idx].left = self.nodes[pivot].right;
        self.nodes[pivot].right = Some(idx);
        self.update(idx);
        self.update(pivot);
        pivot
    }

    fn rotate_left(&mut self, idx: usize) -> usize {
        let Some(pivot) = self.nodes[idx].right else {
            return idx;
        };
        self.nodes[idx].right = self.nodes[pivot].left;
        self.nodes[pivot].left = Some(idx);
        self.update(idx);
        self.update(pivot);
        pivot
    }

    #[doc(hidden)]
    pub fn depth(&self) -> usize {
        self.height(self.root) as usize
    }
}

fn compare_intervals(a: &PedalInterval, b: &PedalInterval) -> Ordering {
    a.start_tick
        .cmp(&b.start_tick)
        .then(a.end_tick.cmp(&b.end_tick))
        .then(a.kind.cmp(&b.kind))
}

impl FromIterator<PedalInterval> for PedalIntervalMap {
    fn from_iter<T: IntoIterator<Item = PedalInterval>>(iter: T) -> Self {
        let mut map = PedalIntervalMap::new();
        for interval in iter {
            map.insert(interval.start_tick, interval.end_tick, interval.kind);
        }
        map
    }
}
