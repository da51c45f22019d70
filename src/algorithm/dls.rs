use std::rc::Rc;

use super::{Discovery, ExpansionCore, SearchState, SingleRun};
use crate::frontier::DepthBoundedStack;
use crate::map::Grid;

/// Depth-first search that never pushes a cell deeper than `depth_limit`
/// moves from the start.
///
/// A cell reached again by a strictly shallower route is expanded again, so
/// a target within the limit is always found. Such a cell yields more than
/// one `NodeExpanded` event but is listed once in `explored`.
pub type Dls = SingleRun<DepthBoundedStack>;

impl Dls {
    pub fn new(grid: Rc<Grid>, depth_limit: usize) -> Self {
        SingleRun::with_frontier(
            "dls",
            grid,
            DepthBoundedStack::new(depth_limit),
            Discovery::Shallower,
            SearchState::with_depth_limit(depth_limit),
        )
    }
}

/// Bare depth-limited expansion, driven iteration by iteration by IDDFS.
pub(crate) fn depth_limited_core(
    grid: Rc<Grid>,
    depth_limit: usize,
) -> ExpansionCore<DepthBoundedStack> {
    let (start, target) = (grid.start(), grid.target());
    ExpansionCore::new(
        grid,
        start,
        Some(target),
        DepthBoundedStack::new(depth_limit),
        Discovery::Shallower,
        SearchState::with_depth_limit(depth_limit),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::tests::*;
    use crate::algorithm::SearchAlgorithm;
    use crate::common::{Cell, SearchResult, StepEvent};

    #[test]
    fn test_dls_neighbor_goal() {
        init_tracing();
        let grid = Rc::new(Grid::new(8, 8, &[], (4, 4), (3, 4)).unwrap());
        let mut dls = Dls::new(grid, 3);
        run_to_end(&mut dls);

        assert_eq!(
            dls.result(),
            Some(&SearchResult::PathFound {
                path: vec![(4, 4), (3, 4)],
                cost: 1.0
            })
        );
        assert_eq!(dls.state().depth_limit(), Some(3));
    }

    #[test]
    fn test_dls_reexpands_cell_reached_shallower() {
        init_tracing();
        // A 3x3 room walled off from the target. (2, 1) is first expanded at
        // depth 4 via (0, 1), (1, 2), (2, 2), then again at depth 2 via (1, 0).
        let wall: Vec<Cell> = (0..3).map(|row| (row, 3)).collect();
        let grid = Rc::new(Grid::new(3, 5, &wall, (0, 0), (2, 4)).unwrap());
        let mut dls = Dls::new(grid, 4);
        let events = run_to_end(&mut dls);

        let expanded = expanded_cells(&events);
        let repeats = expanded.iter().filter(|cell| **cell == (2, 1)).count();
        assert!(repeats >= 2, "expanded: {expanded:?}");
        assert_eq!(
            dls.state().explored().iter().filter(|cell| **cell == (2, 1)).count(),
            1
        );
        assert_explored_matches_events(dls.state(), &events);
        assert_eq!(dls.result(), Some(&SearchResult::Exhausted));
    }

    #[test]
    fn test_dls_goal_beyond_limit() {
        init_tracing();
        let grid = Rc::new(Grid::new(12, 12, &[], (0, 0), (10, 10)).unwrap());
        let mut dls = Dls::new(grid, 5);
        let events = run_to_end(&mut dls);

        assert_eq!(events.last(), Some(&StepEvent::SearchFailed));
        assert_eq!(dls.result(), Some(&SearchResult::Exhausted));
        // Nothing more than five moves away was ever discovered.
        for cell in dls.state().explored() {
            assert!(cell.0.max(cell.1) <= 5, "{cell:?} is beyond the limit");
        }
    }

    #[test]
    fn test_dls_limit_zero_only_expands_start() {
        init_tracing();
        let grid = Rc::new(Grid::new(3, 3, &[], (1, 1), (0, 1)).unwrap());
        let mut dls = Dls::new(grid, 0);
        let events = run_to_end(&mut dls);

        assert_eq!(expanded_cells(&events), vec![(1, 1)]);
        assert_eq!(events.last(), Some(&StepEvent::SearchFailed));
    }

    #[test]
    fn test_dls_finds_target_at_exact_limit() {
        init_tracing();
        // Only the all-diagonal route fits in three moves, and depth-first
        // order tries the Right and Bottom branches before it.
        let grid = Rc::new(Grid::new(4, 4, &[], (0, 0), (3, 3)).unwrap());

        let mut dls = Dls::new(grid.clone(), 3);
        let events = run_to_end(&mut dls);
        let path = dls.result().and_then(|r| r.path()).unwrap();

        assert_eq!(path, &vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
        assert_valid_path(&grid, path);
        assert_explored_matches_events(dls.state(), &events);

        let mut shallow = Dls::new(grid, 2);
        let events = run_to_end(&mut shallow);
        assert_eq!(events.last(), Some(&StepEvent::SearchFailed));
    }

    #[test]
    fn test_dls_path_within_limit_around_obstacles() {
        init_tracing();
        let obstacles: Vec<Cell> = vec![(1, 1), (2, 1)];
        let grid = Rc::new(Grid::new(4, 3, &obstacles, (0, 0), (3, 0)).unwrap());

        let mut dls = Dls::new(grid.clone(), 3);
        run_to_end(&mut dls);
        let path = dls.result().and_then(|r| r.path()).unwrap();

        assert_valid_path(&grid, path);
        assert_eq!(path.len() - 1, 3);
    }

    #[test]
    fn test_dls_wall_exhausts() {
        init_tracing();
        let mut dls = Dls::new(Rc::new(walled_grid()), 20);
        let events = run_to_end(&mut dls);
        assert_eq!(events.last(), Some(&StepEvent::SearchFailed));
    }
}
