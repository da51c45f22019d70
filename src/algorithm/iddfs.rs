use std::rc::Rc;

use tracing::debug;

use super::dls::depth_limited_core;
use super::{Expansion, ExpansionCore, SearchAlgorithm, SearchState};
use crate::common::{Cell, RunStatus, SearchResult, StepEvent};
use crate::error::SearchError;
use crate::frontier::DepthBoundedStack;
use crate::map::Grid;

/// Iterative deepening: depth-limited searches with limits `0, 1, 2, ...`
/// until the target is found or `max_depth` has been tried. Each iteration
/// starts from an empty frontier and explored set.
pub struct Iddfs {
    grid: Rc<Grid>,
    max_depth: usize,
    iteration: ExpansionCore<DepthBoundedStack>,
    depth_limit: usize,
    iterations: usize,
    status: RunStatus,
    result: Option<SearchResult>,
}

impl Iddfs {
    /// Without `max_depth` the bound is the number of cells reachable from
    /// the start, which no simple path can reach.
    pub fn new(grid: Rc<Grid>, max_depth: Option<usize>) -> Self {
        let reachable = grid.reachable_count(grid.start());
        let max_depth = max_depth.map_or(reachable, |cap| cap.min(reachable));
        Iddfs {
            iteration: depth_limited_core(grid.clone(), 0),
            grid,
            max_depth,
            depth_limit: 0,
            iterations: 0,
            status: RunStatus::Ready,
            result: None,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Depth limit of the running (or last) iteration.
    pub fn depth_limit(&self) -> usize {
        self.depth_limit
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    fn start_iteration(&mut self, depth_limit: usize) -> StepEvent {
        debug!("iddfs iteration with depth limit {depth_limit}");
        self.depth_limit = depth_limit;
        self.iterations += 1;
        self.iteration = depth_limited_core(self.grid.clone(), depth_limit);
        self.iteration.seed();
        StepEvent::IterationStarted { depth_limit }
    }
}

impl SearchAlgorithm for Iddfs {
    fn name(&self) -> &'static str {
        "iddfs"
    }

    fn status(&self) -> RunStatus {
        self.status
    }

    fn step(&mut self) -> Result<StepEvent, SearchError> {
        match self.status {
            RunStatus::Succeeded | RunStatus::Exhausted => {
                return Err(SearchError::state("iddfs has already finished"));
            }
            RunStatus::Ready => {
                self.status = RunStatus::Running;
                return Ok(self.start_iteration(0));
            }
            RunStatus::Running => {}
        }

        loop {
            if let Some(event) = self.iteration.next_event() {
                return Ok(event);
            }
            if let Some(result) = &self.result {
                self.status = match result {
                    SearchResult::PathFound { .. } => RunStatus::Succeeded,
                    SearchResult::Exhausted => RunStatus::Exhausted,
                };
                debug!(
                    "iddfs finished after {} iterations: {result:?}",
                    self.iterations
                );
                return Ok(result.to_event());
            }
            match self.iteration.expand_next() {
                Expansion::Expanded(_) => {}
                Expansion::ReachedGoal(cell) => self.result = Some(self.iteration.found(cell)),
                Expansion::Exhausted if self.depth_limit < self.max_depth => {
                    return Ok(self.start_iteration(self.depth_limit + 1));
                }
                Expansion::Exhausted => self.result = Some(SearchResult::Exhausted),
            }
        }
    }

    fn result(&self) -> Option<&SearchResult> {
        self.result.as_ref().filter(|_| self.status.is_terminal())
    }

    fn state(&self) -> &SearchState {
        self.iteration.state()
    }

    fn frontier(&self) -> Vec<Cell> {
        self.iteration.frontier_cells()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::tests::*;
    use crate::algorithm::{Bfs, Dls};

    fn iteration_limits(events: &[StepEvent]) -> Vec<usize> {
        events
            .iter()
            .filter_map(|event| match event {
                StepEvent::IterationStarted { depth_limit } => Some(*depth_limit),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_iddfs_neighbor_goal() {
        init_tracing();
        let grid = Rc::new(Grid::new(8, 8, &[], (4, 4), (3, 4)).unwrap());
        let mut iddfs = Iddfs::new(grid, Some(5));
        let events = run_to_end(&mut iddfs);

        assert_eq!(iteration_limits(&events), vec![0, 1]);
        assert_eq!(iddfs.iterations(), 2);
        assert_eq!(
            iddfs.result(),
            Some(&SearchResult::PathFound {
                path: vec![(4, 4), (3, 4)],
                cost: 1.0
            })
        );
    }

    #[test]
    fn test_iddfs_events_restart_each_iteration() {
        init_tracing();
        let grid = Rc::new(Grid::new(3, 3, &[], (0, 0), (0, 2)).unwrap());
        let mut iddfs = Iddfs::new(grid, None);
        let events = run_to_end(&mut iddfs);

        assert_eq!(events[0], StepEvent::IterationStarted { depth_limit: 0 });
        assert_eq!(
            events[1],
            StepEvent::NodeDiscovered {
                cell: (0, 0),
                discovered_from: None
            }
        );
        assert_eq!(events[2], StepEvent::NodeExpanded { cell: (0, 0) });
        assert_eq!(events[3], StepEvent::IterationStarted { depth_limit: 1 });
        assert_eq!(iteration_limits(&events), vec![0, 1, 2]);
        // The last iteration's state only holds its own expansions.
        assert_eq!(iddfs.depth_limit(), 2);
        assert_eq!(iddfs.state().depth_limit(), Some(2));
        assert_eq!(iddfs.state().explored()[0], (0, 0));
    }

    #[test]
    fn test_iddfs_matches_dls_at_solution_depth() {
        init_tracing();
        let obstacles: Vec<Cell> = (0..5).map(|row| (row, 2)).collect();
        let grid = Rc::new(Grid::new(6, 5, &obstacles, (0, 0), (0, 4)).unwrap());

        let mut bfs = Bfs::new(grid.clone());
        run_to_end(&mut bfs);
        let depth = bfs.result().and_then(|r| r.path()).unwrap().len() - 1;

        let mut iddfs = Iddfs::new(grid.clone(), None);
        let events = run_to_end(&mut iddfs);
        let iddfs_path = iddfs.result().and_then(|r| r.path()).unwrap();
        assert_valid_path(&grid, iddfs_path);
        assert_eq!(iddfs_path.len() - 1, depth);
        assert!(iddfs.iterations() <= depth + 1);
        assert_eq!(iteration_limits(&events), (0..=depth).collect::<Vec<_>>());

        let mut dls = Dls::new(grid, depth);
        run_to_end(&mut dls);
        assert_eq!(dls.result().and_then(|r| r.path()).unwrap().len() - 1, depth);
    }

    #[test]
    fn test_iddfs_wall_exhausts() {
        init_tracing();
        let grid = Rc::new(walled_grid());
        let mut iddfs = Iddfs::new(grid, None);
        let events = run_to_end(&mut iddfs);

        assert_eq!(events.last(), Some(&StepEvent::SearchFailed));
        assert_eq!(iddfs.max_depth(), 8);
        assert_eq!(iddfs.iterations(), 9);
    }

    #[test]
    fn test_iddfs_respects_max_depth_cap() {
        init_tracing();
        let grid = Rc::new(Grid::new(12, 12, &[], (0, 0), (11, 0)).unwrap());
        let mut iddfs = Iddfs::new(grid, Some(4));
        let events = run_to_end(&mut iddfs);

        assert_eq!(iteration_limits(&events), vec![0, 1, 2, 3, 4]);
        assert_eq!(iddfs.result(), Some(&SearchResult::Exhausted));
    }
}
