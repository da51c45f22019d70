mod bfs;
mod bidirectional;
mod dfs;
mod dls;
mod expansion;
mod iddfs;
mod ucs;

pub use bfs::Bfs;
pub use bidirectional::Bidirectional;
pub use dfs::Dfs;
pub use dls::Dls;
pub use iddfs::Iddfs;
pub use ucs::Ucs;

pub use expansion::SingleRun;

use expansion::{Discovery, Expansion, ExpansionCore};

use std::collections::{HashMap, HashSet};

use crate::common::{Cell, Path, RunStatus, SearchResult, StepEvent};
use crate::error::SearchError;

/// A search that yields its trace one event per call.
///
/// Every run goes `Ready -> Running -> {Succeeded, Exhausted}`; once the
/// terminal event has been returned, `step` fails with `InvalidState`.
pub trait SearchAlgorithm {
    fn name(&self) -> &'static str;

    fn status(&self) -> RunStatus;

    fn step(&mut self) -> Result<StepEvent, SearchError>;

    fn result(&self) -> Option<&SearchResult>;

    /// Bookkeeping of the (forward) search.
    fn state(&self) -> &SearchState;

    /// Frontier cells in pop order.
    fn frontier(&self) -> Vec<Cell>;

    fn backward_state(&self) -> Option<&SearchState> {
        None
    }

    fn meeting_node(&self) -> Option<Cell> {
        None
    }
}

/// Per-run bookkeeping owned by one search direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    explored: Vec<Cell>,
    explored_set: HashSet<Cell>,
    parent: HashMap<Cell, Cell>,
    current: Option<Cell>,
    depth_limit: Option<usize>,
}

impl SearchState {
    pub(crate) fn with_depth_limit(depth_limit: usize) -> Self {
        SearchState {
            depth_limit: Some(depth_limit),
            ..Default::default()
        }
    }

    /// Explored cells in the order they were first expanded.
    pub fn explored(&self) -> &[Cell] {
        &self.explored
    }

    pub fn is_explored(&self, cell: Cell) -> bool {
        self.explored_set.contains(&cell)
    }

    pub fn parent_of(&self, cell: Cell) -> Option<Cell> {
        self.parent.get(&cell).copied()
    }

    pub fn current(&self) -> Option<Cell> {
        self.current
    }

    pub fn depth_limit(&self) -> Option<usize> {
        self.depth_limit
    }

    /// Makes `cell` current and records how it was reached. Returns `false`
    /// if it had already been explored.
    pub(crate) fn expand(&mut self, cell: Cell, parent: Option<Cell>) -> bool {
        self.current = Some(cell);
        if let Some(parent) = parent {
            self.parent.insert(cell, parent);
        }
        if self.explored_set.insert(cell) {
            self.explored.push(cell);
            true
        } else {
            false
        }
    }

    /// Follows parent links from `cell` back to the seed, returned seed first.
    pub fn path_to(&self, cell: Cell) -> Path {
        let mut path = vec![cell];
        let mut current = cell;
        while let Some(parent) = self.parent_of(current) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashSet;

    use tracing_subscriber;

    use super::*;
    use crate::map::Grid;

    pub(crate) fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    }

    /// Drains `search` and returns every event, terminal one included.
    pub(crate) fn run_to_end(search: &mut dyn SearchAlgorithm) -> Vec<StepEvent> {
        let mut events = Vec::new();
        loop {
            let event = search.step().unwrap();
            let terminal = event.is_terminal();
            events.push(event);
            if terminal {
                break;
            }
        }
        assert!(matches!(search.step(), Err(SearchError::InvalidState(_))));
        events
    }

    pub(crate) fn expanded_cells(events: &[StepEvent]) -> Vec<Cell> {
        events
            .iter()
            .filter_map(|event| match event {
                StepEvent::NodeExpanded { cell } => Some(*cell),
                _ => None,
            })
            .collect()
    }

    /// Checks that `path` runs Start to Target over valid moves without
    /// repeating a cell.
    pub(crate) fn assert_valid_path(grid: &Grid, path: &[Cell]) {
        assert_eq!(path.first(), Some(&grid.start()));
        assert_eq!(path.last(), Some(&grid.target()));
        for pair in path.windows(2) {
            let neighbors: Vec<Cell> = grid
                .neighbors_in_order(pair[0])
                .into_iter()
                .map(|(_, cell)| cell)
                .collect();
            assert!(neighbors.contains(&pair[1]), "invalid move {pair:?}");
        }
        let unique: HashSet<&Cell> = path.iter().collect();
        assert_eq!(unique.len(), path.len(), "path repeats a cell: {path:?}");
    }

    /// Every explored cell was expanded before it became part of `explored`,
    /// and `explored` never lists a cell twice.
    pub(crate) fn assert_explored_matches_events(state: &SearchState, events: &[StepEvent]) {
        let mut first_expansions = Vec::new();
        for cell in expanded_cells(events) {
            if !first_expansions.contains(&cell) {
                first_expansions.push(cell);
            }
        }
        assert_eq!(state.explored(), first_expansions.as_slice());
    }

    /// Four-row grid split by a full-width wall on row 2.
    pub(crate) fn walled_grid() -> Grid {
        let wall: Vec<Cell> = (0..4).map(|col| (2, col)).collect();
        Grid::new(5, 4, &wall, (0, 1), (4, 2)).unwrap()
    }

    #[test]
    fn test_path_to_follows_parents() {
        let mut state = SearchState::default();
        state.expand((0, 0), None);
        state.expand((0, 1), Some((0, 0)));
        state.expand((1, 2), Some((0, 1)));
        assert!(!state.expand((0, 1), Some((0, 0))));

        assert_eq!(state.path_to((1, 2)), vec![(0, 0), (0, 1), (1, 2)]);
        assert_eq!(state.explored(), &[(0, 0), (0, 1), (1, 2)]);
        assert_eq!(state.current(), Some((0, 1)));
    }
}
