use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use crate::common::{Cell, Direction};
use crate::map::Grid;

/// Cumulative cost as whole counts of orthogonal and diagonal moves.
///
/// Compared exactly: `a + b*SQRT_2 == c + d*SQRT_2` only when `a == c` and
/// `b == d`, so equal counts are the only ties and summation order never
/// matters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MoveCost {
    pub straight: usize,
    pub diagonal: usize,
}

impl MoveCost {
    pub fn after(self, direction: Direction) -> Self {
        if direction.is_diagonal() {
            MoveCost {
                diagonal: self.diagonal + 1,
                ..self
            }
        } else {
            MoveCost {
                straight: self.straight + 1,
                ..self
            }
        }
    }

    pub fn value(self) -> f64 {
        self.straight as f64 * Grid::step_cost(Direction::Up)
            + self.diagonal as f64 * Grid::step_cost(Direction::BottomRight)
    }
}

impl PartialOrd for MoveCost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MoveCost {
    // self - other = x - y*SQRT_2 with x, y integers; its sign is decided by
    // comparing squares once the signs of x and y are known.
    fn cmp(&self, other: &Self) -> Ordering {
        let x = self.straight as i128 - other.straight as i128;
        let y = other.diagonal as i128 - self.diagonal as i128;
        match (x.cmp(&0), y.cmp(&0)) {
            (Ordering::Equal, Ordering::Equal) => Ordering::Equal,
            (Ordering::Greater | Ordering::Equal, Ordering::Less | Ordering::Equal) => {
                Ordering::Greater
            }
            (Ordering::Less | Ordering::Equal, Ordering::Greater | Ordering::Equal) => {
                Ordering::Less
            }
            (Ordering::Greater, Ordering::Greater) => (x * x).cmp(&(2 * y * y)),
            (Ordering::Less, Ordering::Less) => (2 * y * y).cmp(&(x * x)),
        }
    }
}

/// A discovered cell waiting to be expanded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub cell: Cell,
    pub parent: Option<Cell>,
    /// Move from `parent` that produced this entry, `None` for a seed.
    pub direction: Option<Direction>,
    pub cost: MoveCost,
    pub depth: usize,
}

impl Entry {
    pub fn seed(cell: Cell) -> Self {
        Entry {
            cell,
            parent: None,
            direction: None,
            cost: MoveCost::default(),
            depth: 0,
        }
    }

    fn rank(&self) -> usize {
        self.direction.map_or(0, Direction::rank)
    }
}

/// Push/pop contract shared by every frontier discipline.
pub trait Frontier {
    /// Returns `false` if the discipline refuses the entry.
    fn push(&mut self, entry: Entry) -> bool;

    fn pop(&mut self) -> Option<Entry>;

    fn len(&self) -> usize;

    /// Cells in the order they would be popped.
    fn cells(&self) -> Vec<Cell>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pushes the children of one expansion, given in neighbour order, and
    /// returns the accepted ones in that same order.
    fn push_siblings(&mut self, siblings: Vec<Entry>) -> Vec<Entry> {
        siblings.into_iter().filter(|entry| self.push(*entry)).collect()
    }
}

/// LIFO. Siblings go in reversed so the first neighbour is popped first.
#[derive(Debug, Default)]
pub struct Stack {
    entries: Vec<Entry>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for Stack {
    fn push(&mut self, entry: Entry) -> bool {
        self.entries.push(entry);
        true
    }

    fn pop(&mut self) -> Option<Entry> {
        self.entries.pop()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn cells(&self) -> Vec<Cell> {
        self.entries.iter().rev().map(|entry| entry.cell).collect()
    }

    fn push_siblings(&mut self, siblings: Vec<Entry>) -> Vec<Entry> {
        let mut accepted: Vec<Entry> = siblings
            .into_iter()
            .rev()
            .filter(|entry| self.push(*entry))
            .collect();
        accepted.reverse();
        accepted
    }
}

/// FIFO.
#[derive(Debug, Default)]
pub struct Queue {
    entries: VecDeque<Entry>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for Queue {
    fn push(&mut self, entry: Entry) -> bool {
        self.entries.push_back(entry);
        true
    }

    fn pop(&mut self) -> Option<Entry> {
        self.entries.pop_front()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn cells(&self) -> Vec<Cell> {
        self.entries.iter().map(|entry| entry.cell).collect()
    }
}

#[derive(Debug)]
struct Keyed {
    entry: Entry,
    seq: usize,
}

impl PartialEq for Keyed {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Keyed {}

impl PartialOrd for Keyed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Keyed {
    // Reversed on every key: `BinaryHeap` is a max-heap and we pop the
    // cheapest entry, then the earliest direction, then the oldest push.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .entry
            .cost
            .cmp(&self.entry.cost)
            .then_with(|| other.entry.rank().cmp(&self.entry.rank()))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue on cumulative cost.
#[derive(Debug, Default)]
pub struct PriorityQueue {
    heap: BinaryHeap<Keyed>,
    next_seq: usize,
}

impl PriorityQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for PriorityQueue {
    fn push(&mut self, entry: Entry) -> bool {
        self.heap.push(Keyed {
            entry,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        true
    }

    fn pop(&mut self) -> Option<Entry> {
        self.heap.pop().map(|keyed| keyed.entry)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn cells(&self) -> Vec<Cell> {
        let mut keyed: Vec<&Keyed> = self.heap.iter().collect();
        keyed.sort_by(|a, b| b.cmp(a));
        keyed.into_iter().map(|keyed| keyed.entry.cell).collect()
    }
}

/// Stack that refuses entries deeper than `limit`.
#[derive(Debug)]
pub struct DepthBoundedStack {
    stack: Stack,
    limit: usize,
}

impl DepthBoundedStack {
    pub fn new(limit: usize) -> Self {
        DepthBoundedStack {
            stack: Stack::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Frontier for DepthBoundedStack {
    fn push(&mut self, entry: Entry) -> bool {
        entry.depth <= self.limit && self.stack.push(entry)
    }

    fn pop(&mut self) -> Option<Entry> {
        self.stack.pop()
    }

    fn len(&self) -> usize {
        self.stack.len()
    }

    fn cells(&self) -> Vec<Cell> {
        self.stack.cells()
    }

    fn push_siblings(&mut self, siblings: Vec<Entry>) -> Vec<Entry> {
        let limit = self.limit;
        self.stack
            .push_siblings(siblings.into_iter().filter(|entry| entry.depth <= limit).collect())
    }
}
