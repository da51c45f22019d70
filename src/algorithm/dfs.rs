use std::rc::Rc;

use super::{Discovery, SearchState, SingleRun};
use crate::frontier::Stack;
use crate::map::Grid;

/// Depth-first search. Among siblings, the earliest direction is descended
/// into first; explored cells are never pushed again.
pub type Dfs = SingleRun<Stack>;

impl Dfs {
    pub fn new(grid: Rc<Grid>) -> Self {
        SingleRun::with_frontier(
            "dfs",
            grid,
            Stack::new(),
            Discovery::Unexplored,
            SearchState::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::tests::*;
    use crate::algorithm::SearchAlgorithm;
    use crate::common::{Cell, SearchResult, StepEvent};

    #[test]
    fn test_dfs_prefers_up_then_right() {
        init_tracing();
        let grid = Rc::new(Grid::new(3, 3, &[], (0, 0), (2, 2)).unwrap());
        let mut dfs = Dfs::new(grid.clone());
        let events = run_to_end(&mut dfs);

        let expanded = expanded_cells(&events);
        assert_eq!(expanded[0], (0, 0));
        assert_eq!(expanded[1], (0, 1));

        // (0,0) discovers its children in neighbour order.
        let discovered: Vec<Cell> = events
            .iter()
            .filter_map(|event| match event {
                StepEvent::NodeDiscovered {
                    cell,
                    discovered_from: Some((0, 0)),
                } => Some(*cell),
                _ => None,
            })
            .collect();
        assert_eq!(discovered, vec![(0, 1), (1, 0), (1, 1)]);

        let path = dfs.result().and_then(|r| r.path()).unwrap();
        assert_valid_path(&grid, path);
    }

    #[test]
    fn test_dfs_straight_up() {
        init_tracing();
        let grid = Rc::new(Grid::new(8, 8, &[], (5, 4), (3, 4)).unwrap());
        let mut dfs = Dfs::new(grid);
        let events = run_to_end(&mut dfs);

        assert_eq!(expanded_cells(&events), vec![(5, 4), (4, 4), (3, 4)]);
        assert_eq!(
            dfs.result(),
            Some(&SearchResult::PathFound {
                path: vec![(5, 4), (4, 4), (3, 4)],
                cost: 2.0
            })
        );
    }

    #[test]
    fn test_dfs_explores_each_cell_once() {
        init_tracing();
        let mut obstacles: Vec<Cell> = (2..8).map(|col| (0, col)).collect();
        obstacles.extend((1..7).map(|row| (row, 1)));
        obstacles.extend((2..7).map(|col| (7, col)));
        let grid = Rc::new(Grid::new(8, 8, &obstacles, (0, 0), (7, 7)).unwrap());

        let mut dfs = Dfs::new(grid.clone());
        let events = run_to_end(&mut dfs);
        let expanded = expanded_cells(&events);

        let mut unique = expanded.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), expanded.len());
        assert_explored_matches_events(dfs.state(), &events);
        assert_valid_path(&grid, dfs.result().and_then(|r| r.path()).unwrap());
    }

    #[test]
    fn test_dfs_wall_exhausts() {
        init_tracing();
        let mut dfs = Dfs::new(Rc::new(walled_grid()));
        let events = run_to_end(&mut dfs);

        assert_eq!(events.last(), Some(&StepEvent::SearchFailed));
        assert_eq!(dfs.state().explored().len(), 8);
    }
}
