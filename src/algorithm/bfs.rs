use std::rc::Rc;

use super::{Discovery, SearchState, SingleRun};
use crate::frontier::Queue;
use crate::map::Grid;

/// Breadth-first search: the first path reaching the target has the fewest
/// moves.
pub type Bfs = SingleRun<Queue>;

impl Bfs {
    pub fn new(grid: Rc<Grid>) -> Self {
        SingleRun::with_frontier(
            "bfs",
            grid,
            Queue::new(),
            Discovery::FirstSeen,
            SearchState::default(),
        )
    }
}
