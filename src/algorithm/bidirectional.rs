use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, trace};

use super::{Discovery, Expansion, ExpansionCore, SearchAlgorithm, SearchState};
use crate::common::{Cell, Path, RunStatus, SearchResult, Side, StepEvent};
use crate::error::SearchError;
use crate::frontier::Queue;
use crate::map::Grid;

/// Two breadth-first searches, one from the start and one from the target,
/// expanding one node each in turn. The run succeeds as soon as a freshly
/// expanded cell has already been explored by the other side.
///
/// Every move has its opposite in the neighbour set, so the backward side
/// uses the same order as the forward side.
pub struct Bidirectional {
    forward: ExpansionCore<Queue>,
    backward: ExpansionCore<Queue>,
    turn: Side,
    meeting: Option<Cell>,
    events: VecDeque<StepEvent>,
    status: RunStatus,
    result: Option<SearchResult>,
}

impl Bidirectional {
    pub fn new(grid: Rc<Grid>) -> Self {
        let (start, target) = (grid.start(), grid.target());
        Bidirectional {
            forward: ExpansionCore::new(
                grid.clone(),
                start,
                None,
                Queue::new(),
                Discovery::FirstSeen,
                SearchState::default(),
            ),
            backward: ExpansionCore::new(
                grid,
                target,
                None,
                Queue::new(),
                Discovery::FirstSeen,
                SearchState::default(),
            ),
            turn: Side::Forward,
            meeting: None,
            events: VecDeque::new(),
            status: RunStatus::Ready,
            result: None,
        }
    }

    fn side(&self, side: Side) -> &ExpansionCore<Queue> {
        match side {
            Side::Forward => &self.forward,
            Side::Backward => &self.backward,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut ExpansionCore<Queue> {
        match side {
            Side::Forward => &mut self.forward,
            Side::Backward => &mut self.backward,
        }
    }

    fn drain(&mut self, side: Side) {
        while let Some(event) = self.side_mut(side).next_event() {
            self.events.push_back(event);
        }
    }

    /// The side due this turn, or the other one if its frontier is empty.
    fn next_side(&self) -> Option<Side> {
        [self.turn, self.turn.other()]
            .into_iter()
            .find(|side| self.side(*side).has_frontier())
    }

    /// Start to `meeting` along forward parents, then on to the target along
    /// backward parents.
    fn join(&self, meeting: Cell) -> Path {
        let mut path = self.forward.state().path_to(meeting);
        let mut tail = self.backward.state().path_to(meeting);
        tail.reverse();
        path.extend(tail.into_iter().skip(1));
        path
    }
}

impl SearchAlgorithm for Bidirectional {
    fn name(&self) -> &'static str {
        "bidirectional"
    }

    fn status(&self) -> RunStatus {
        self.status
    }

    fn step(&mut self) -> Result<StepEvent, SearchError> {
        match self.status {
            RunStatus::Succeeded | RunStatus::Exhausted => {
                return Err(SearchError::state("bidirectional has already finished"));
            }
            RunStatus::Ready => {
                self.forward.seed();
                self.backward.seed();
                self.drain(Side::Forward);
                self.drain(Side::Backward);
                self.status = RunStatus::Running;
            }
            RunStatus::Running => {}
        }

        loop {
            if let Some(event) = self.events.pop_front() {
                return Ok(event);
            }
            if let Some(result) = &self.result {
                self.status = match result {
                    SearchResult::PathFound { .. } => RunStatus::Succeeded,
                    SearchResult::Exhausted => RunStatus::Exhausted,
                };
                debug!("bidirectional finished, meeting at {:?}: {result:?}", self.meeting);
                return Ok(result.to_event());
            }

            let Some(side) = self.next_side() else {
                self.result = Some(SearchResult::Exhausted);
                continue;
            };
            self.turn = side.other();
            self.events.push_back(StepEvent::FrontierSwitched { side });

            let expansion = self.side_mut(side).expand_next();
            self.drain(side);
            if let Expansion::Expanded(cell) | Expansion::ReachedGoal(cell) = expansion {
                trace!("{side:?} expanded {cell:?}");
                if self.side(side.other()).state().is_explored(cell) {
                    self.meeting = Some(cell);
                    let path = self.join(cell);
                    let cost = Grid::path_cost(&path);
                    self.result = Some(SearchResult::PathFound { path, cost });
                }
            }
        }
    }

    fn result(&self) -> Option<&SearchResult> {
        self.result.as_ref().filter(|_| self.status.is_terminal())
    }

    fn state(&self) -> &SearchState {
        self.forward.state()
    }

    fn frontier(&self) -> Vec<Cell> {
        let mut cells = self.forward.frontier_cells();
        cells.extend(self.backward.frontier_cells());
        cells
    }

    fn backward_state(&self) -> Option<&SearchState> {
        Some(self.backward.state())
    }

    fn meeting_node(&self) -> Option<Cell> {
        self.meeting
    }
}
