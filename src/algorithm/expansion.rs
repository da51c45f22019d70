use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use tracing::{debug, instrument, trace};

use super::{SearchAlgorithm, SearchState};
use crate::common::{Cell, RunStatus, SearchResult, StepEvent};
use crate::error::SearchError;
use crate::frontier::{Entry, Frontier};
use crate::map::Grid;

/// When a neighbour of the expanded cell may enter the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Discovery {
    /// Only the first time it is seen (BFS).
    FirstSeen,
    /// Whenever it has not been explored yet (DFS).
    Unexplored,
    /// When unexplored and reached more cheaply than before (UCS).
    Cheaper,
    /// When reached at a strictly shallower depth than before (DLS).
    Shallower,
}

pub(crate) enum Expansion {
    Expanded(Cell),
    ReachedGoal(Cell),
    Exhausted,
}

/// One frontier-driven search direction: pops an entry, marks it explored
/// and offers its neighbours back to the frontier according to `discovery`.
/// Events are buffered until the owner drains them.
pub(crate) struct ExpansionCore<F: Frontier> {
    grid: Rc<Grid>,
    origin: Cell,
    goal: Option<Cell>,
    frontier: F,
    discovery: Discovery,
    state: SearchState,
    best: HashMap<Cell, Entry>,
    events: VecDeque<StepEvent>,
}

impl<F: Frontier> ExpansionCore<F> {
    pub(crate) fn new(
        grid: Rc<Grid>,
        origin: Cell,
        goal: Option<Cell>,
        frontier: F,
        discovery: Discovery,
        state: SearchState,
    ) -> Self {
        ExpansionCore {
            grid,
            origin,
            goal,
            frontier,
            discovery,
            state,
            best: HashMap::new(),
            events: VecDeque::new(),
        }
    }

    pub(crate) fn seed(&mut self) {
        let entry = Entry::seed(self.origin);
        if self.frontier.push(entry) {
            self.best.insert(self.origin, entry);
            self.events.push_back(StepEvent::NodeDiscovered {
                cell: self.origin,
                discovered_from: None,
            });
        }
    }

    pub(crate) fn next_event(&mut self) -> Option<StepEvent> {
        self.events.pop_front()
    }

    pub(crate) fn state(&self) -> &SearchState {
        &self.state
    }

    pub(crate) fn frontier_cells(&self) -> Vec<Cell> {
        self.frontier.cells()
    }

    pub(crate) fn has_frontier(&self) -> bool {
        !self.frontier.is_empty()
    }

    /// Expands the next live frontier entry.
    #[instrument(skip_all, name = "expand_next", fields(origin = format!("{:?}", self.origin), discovery = format!("{:?}", self.discovery)), level = "trace")]
    pub(crate) fn expand_next(&mut self) -> Expansion {
        while let Some(entry) = self.frontier.pop() {
            if self.is_stale(&entry) {
                trace!("skip stale entry {:?}", entry.cell);
                continue;
            }
            return self.expand(entry);
        }
        Expansion::Exhausted
    }

    fn is_stale(&self, entry: &Entry) -> bool {
        match self.discovery {
            Discovery::FirstSeen | Discovery::Unexplored | Discovery::Cheaper => {
                self.state.is_explored(entry.cell)
            }
            Discovery::Shallower => self
                .best
                .get(&entry.cell)
                .is_some_and(|best| entry.depth > best.depth),
        }
    }

    fn expand(&mut self, entry: Entry) -> Expansion {
        let cell = entry.cell;
        trace!("expand node: {cell:?} depth {} cost {:.3}", entry.depth, entry.cost.value());

        self.state.expand(cell, entry.parent);
        self.events.push_back(StepEvent::NodeExpanded { cell });

        if self.goal == Some(cell) {
            return Expansion::ReachedGoal(cell);
        }

        let children: Vec<Entry> = self
            .grid
            .neighbors_in_order(cell)
            .into_iter()
            .map(|(direction, next)| Entry {
                cell: next,
                parent: Some(cell),
                direction: Some(direction),
                cost: entry.cost.after(direction),
                depth: entry.depth + 1,
            })
            .filter(|child| self.admits(child))
            .collect();

        for child in self.frontier.push_siblings(children) {
            self.best.insert(child.cell, child);
            self.events.push_back(StepEvent::NodeDiscovered {
                cell: child.cell,
                discovered_from: Some(cell),
            });
        }
        trace!("frontier size {}", self.frontier.len());

        Expansion::Expanded(cell)
    }

    fn admits(&self, child: &Entry) -> bool {
        let best = self.best.get(&child.cell);
        match self.discovery {
            Discovery::FirstSeen => best.is_none(),
            Discovery::Unexplored => !self.state.is_explored(child.cell),
            Discovery::Cheaper => {
                !self.state.is_explored(child.cell)
                    && best.map_or(true, |best| child.cost < best.cost)
            }
            Discovery::Shallower => best.map_or(true, |best| child.depth < best.depth),
        }
    }

    /// Start-to-`cell` path and its step cost.
    pub(crate) fn found(&self, cell: Cell) -> SearchResult {
        let path = self.state.path_to(cell);
        let cost = Grid::path_cost(&path);
        SearchResult::PathFound { path, cost }
    }
}

/// A search made of a single [`ExpansionCore`] that stops at the goal.
pub struct SingleRun<F: Frontier> {
    name: &'static str,
    core: ExpansionCore<F>,
    status: RunStatus,
    result: Option<SearchResult>,
}

impl<F: Frontier> SingleRun<F> {
    pub(crate) fn with_frontier(
        name: &'static str,
        grid: Rc<Grid>,
        frontier: F,
        discovery: Discovery,
        state: SearchState,
    ) -> Self {
        let (start, target) = (grid.start(), grid.target());
        SingleRun {
            name,
            core: ExpansionCore::new(grid, start, Some(target), frontier, discovery, state),
            status: RunStatus::Ready,
            result: None,
        }
    }
}

impl<F: Frontier> SearchAlgorithm for SingleRun<F> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn status(&self) -> RunStatus {
        self.status
    }

    fn step(&mut self) -> Result<StepEvent, SearchError> {
        match self.status {
            RunStatus::Succeeded | RunStatus::Exhausted => {
                return Err(SearchError::state(format!(
                    "{} has already finished",
                    self.name
                )));
            }
            RunStatus::Ready => {
                self.core.seed();
                self.status = RunStatus::Running;
            }
            RunStatus::Running => {}
        }

        loop {
            if let Some(event) = self.core.next_event() {
                return Ok(event);
            }
            if let Some(result) = &self.result {
                self.status = match result {
                    SearchResult::PathFound { .. } => RunStatus::Succeeded,
                    SearchResult::Exhausted => RunStatus::Exhausted,
                };
                debug!("{} finished: {result:?}", self.name);
                return Ok(result.to_event());
            }
            match self.core.expand_next() {
                Expansion::Expanded(_) => {}
                Expansion::ReachedGoal(cell) => self.result = Some(self.core.found(cell)),
                Expansion::Exhausted => self.result = Some(SearchResult::Exhausted),
            }
        }
    }

    fn result(&self) -> Option<&SearchResult> {
        self.result.as_ref().filter(|_| self.status.is_terminal())
    }

    fn state(&self) -> &SearchState {
        self.core.state()
    }

    fn frontier(&self) -> Vec<Cell> {
        self.core.frontier_cells()
    }
}
