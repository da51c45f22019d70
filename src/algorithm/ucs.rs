use std::rc::Rc;

use super::{Discovery, SearchState, SingleRun};
use crate::frontier::PriorityQueue;
use crate::map::Grid;

/// Uniform-cost search over unit orthogonal and `SQRT_2` diagonal moves.
///
/// A cell re-reached more cheaply before it is expanded gets a fresh queue
/// entry; the older, dearer entry is skipped when popped.
pub type Ucs = SingleRun<PriorityQueue>;

impl Ucs {
    pub fn new(grid: Rc<Grid>) -> Self {
        SingleRun::with_frontier(
            "ucs",
            grid,
            PriorityQueue::new(),
            Discovery::Cheaper,
            SearchState::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::f64::consts::SQRT_2;

    use super::*;
    use crate::algorithm::tests::*;
    use crate::algorithm::{Bfs, SearchAlgorithm};
    use crate::common::{Cell, SearchResult, StepEvent};

    // Cheapest cost over every simple path, by exhaustive enumeration.
    fn cheapest_by_enumeration(grid: &Grid) -> Option<f64> {
        fn walk(
            grid: &Grid,
            cell: Cell,
            cost: f64,
            visited: &mut HashSet<Cell>,
            best: &mut Option<f64>,
        ) {
            if cell == grid.target() {
                if best.map_or(true, |b| cost < b) {
                    *best = Some(cost);
                }
                return;
            }
            for (direction, next) in grid.neighbors_in_order(cell) {
                if visited.insert(next) {
                    walk(grid, next, cost + Grid::step_cost(direction), visited, best);
                    visited.remove(&next);
                }
            }
        }

        let mut best = None;
        let mut visited = HashSet::from([grid.start()]);
        walk(grid, grid.start(), 0.0, &mut visited, &mut best);
        best
    }

    #[test]
    fn test_ucs_right_neighbor() {
        init_tracing();
        let grid = Rc::new(Grid::new(8, 8, &[], (4, 4), (4, 5)).unwrap());
        let mut ucs = Ucs::new(grid);
        run_to_end(&mut ucs);

        assert_eq!(
            ucs.result(),
            Some(&SearchResult::PathFound {
                path: vec![(4, 4), (4, 5)],
                cost: 1.0
            })
        );
    }

    #[test]
    fn test_ucs_prefers_diagonal_over_two_steps() {
        init_tracing();
        let grid = Rc::new(Grid::new(3, 3, &[], (0, 0), (2, 2)).unwrap());
        let mut ucs = Ucs::new(grid);
        let events = run_to_end(&mut ucs);

        let Some(StepEvent::SearchSucceeded { path, cost }) = events.last() else {
            panic!("expected success, got {:?}", events.last());
        };
        assert_eq!(path, &vec![(0, 0), (1, 1), (2, 2)]);
        assert!((cost - 2.0 * SQRT_2).abs() < 1e-9);

        // Equal-cost entries pop in direction order: Right before Bottom.
        let expanded = expanded_cells(&events);
        assert_eq!(&expanded[..3], &[(0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn test_ucs_tie_break_ignores_summation_order() {
        init_tracing();
        // (0, 2) and (1, 1) both cost 1 + 2*SQRT_2, summed in different
        // orders. (0, 2) is reached by Up and must pop before (1, 1), which
        // is reached by Top-Left and was queued earlier.
        let obstacles = [(0, 3), (0, 4), (1, 3), (2, 0), (3, 2)];
        let grid = Rc::new(Grid::new(4, 5, &obstacles, (3, 4), (0, 0)).unwrap());
        let mut ucs = Ucs::new(grid.clone());
        let events = run_to_end(&mut ucs);

        let expanded = expanded_cells(&events);
        let position = |cell: Cell| expanded.iter().position(|c| *c == cell).unwrap();
        assert!(position((2, 2)) < position((1, 2)));
        assert!(position((0, 2)) < position((1, 1)), "expanded: {expanded:?}");
        assert_eq!(position((1, 1)), position((0, 2)) + 1);

        let path = ucs.result().and_then(|r| r.path()).unwrap();
        assert_valid_path(&grid, path);
    }

    #[test]
    fn test_ucs_beats_bfs_on_cost() {
        init_tracing();
        // Top-Right moves do not exist, so heading up-right costs more than
        // the hop count suggests.
        let grid = Rc::new(Grid::new(4, 4, &[(1, 1), (2, 1)], (3, 0), (0, 3)).unwrap());

        let mut ucs = Ucs::new(grid.clone());
        run_to_end(&mut ucs);
        let mut bfs = Bfs::new(grid.clone());
        run_to_end(&mut bfs);

        let ucs_cost = ucs.result().and_then(|r| r.cost()).unwrap();
        let bfs_cost = bfs.result().and_then(|r| r.cost()).unwrap();
        assert!(ucs_cost <= bfs_cost + 1e-9);
        assert_valid_path(&grid, ucs.result().and_then(|r| r.path()).unwrap());
    }

    #[test]
    fn test_ucs_cost_optimal_on_small_grids() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        init_tracing();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..25 {
            let grid = Rc::new(Grid::random(4, 4, 0.25, &mut rng).unwrap());
            let mut ucs = Ucs::new(grid.clone());
            let events = run_to_end(&mut ucs);
            assert_explored_matches_events(ucs.state(), &events);

            match (ucs.result().unwrap(), cheapest_by_enumeration(&grid)) {
                (SearchResult::PathFound { path, cost }, Some(best)) => {
                    assert_valid_path(&grid, path);
                    assert!((cost - best).abs() < 1e-9, "ucs {cost} vs best {best}");
                }
                (SearchResult::Exhausted, None) => {}
                (result, best) => panic!("ucs {result:?} disagrees with enumeration {best:?}"),
            }
        }
    }

    #[test]
    fn test_ucs_wall_exhausts() {
        init_tracing();
        let mut ucs = Ucs::new(Rc::new(walled_grid()));
        let events = run_to_end(&mut ucs);
        assert_eq!(events.last(), Some(&StepEvent::SearchFailed));
    }
}
