use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::algorithm::{
    Bfs, Bidirectional, Dfs, Dls, Iddfs, SearchAlgorithm, SearchState, Ucs,
};
use crate::common::{Cell, RunStatus, SearchResult, StepEvent};
use crate::error::SearchError;
use crate::map::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmKind {
    Bfs,
    Dfs,
    Ucs,
    Dls,
    Iddfs,
    Bidirectional,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 6] = [
        AlgorithmKind::Bfs,
        AlgorithmKind::Dfs,
        AlgorithmKind::Ucs,
        AlgorithmKind::Dls,
        AlgorithmKind::Iddfs,
        AlgorithmKind::Bidirectional,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AlgorithmKind::Bfs => "bfs",
            AlgorithmKind::Dfs => "dfs",
            AlgorithmKind::Ucs => "ucs",
            AlgorithmKind::Dls => "dls",
            AlgorithmKind::Iddfs => "iddfs",
            AlgorithmKind::Bidirectional => "bidirectional",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlgorithmKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SearchError::config(format!("unknown algorithm `{s}`")))
    }
}

/// Algorithm-specific knobs. `depth_limit` is required by DLS, `max_depth`
/// optionally caps IDDFS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmParams {
    pub depth_limit: Option<usize>,
    pub max_depth: Option<usize>,
}

/// Owns the grid and the single active run.
#[derive(Default)]
pub struct SearchController {
    grid: Option<Rc<Grid>>,
    selection: Option<(AlgorithmKind, AlgorithmParams)>,
    run: Option<Box<dyn SearchAlgorithm>>,
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&mut self, grid: Grid) -> Result<(), SearchError> {
        self.ensure_not_running("configure")?;
        debug!("configured {}x{} grid", grid.height, grid.width);
        self.grid = Some(Rc::new(grid));
        self.run = None;
        Ok(())
    }

    pub fn select_algorithm(
        &mut self,
        kind: AlgorithmKind,
        params: AlgorithmParams,
    ) -> Result<(), SearchError> {
        self.ensure_not_running("select an algorithm")?;
        if kind == AlgorithmKind::Dls && params.depth_limit.is_none() {
            return Err(SearchError::config("dls requires a depth limit"));
        }
        self.selection = Some((kind, params));
        self.run = None;
        Ok(())
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_deref()
    }

    pub fn selection(&self) -> Option<(AlgorithmKind, AlgorithmParams)> {
        self.selection
    }

    pub fn status(&self) -> RunStatus {
        self.run.as_ref().map_or(RunStatus::Ready, |run| run.status())
    }

    /// Starts a run and returns its events, terminal one included.
    pub fn run(&mut self) -> Result<Events<'_>, SearchError> {
        if self.status() != RunStatus::Ready {
            return Err(SearchError::state(format!(
                "a run is already {:?}; reset first",
                self.status()
            )));
        }
        self.start()?;
        Ok(Events {
            controller: self,
            done: false,
        })
    }

    /// Advances the run by one event, starting it if needed.
    pub fn step(&mut self) -> Result<StepEvent, SearchError> {
        if self.run.is_none() {
            self.start()?;
        }
        match self.run.as_mut() {
            Some(run) => run.step(),
            None => Err(SearchError::state("no run in progress")),
        }
    }

    pub fn run_to_completion(&mut self) -> Result<SearchResult, SearchError> {
        let events = self.run()?.count();
        debug!("run produced {events} events");
        self.result()
            .cloned()
            .ok_or_else(|| SearchError::state("run ended without a result"))
    }

    /// Drops all run state. The grid and selection are kept.
    pub fn reset(&mut self) {
        if self.run.take().is_some() {
            debug!("controller reset");
        }
    }

    pub fn result(&self) -> Option<&SearchResult> {
        self.run.as_ref().and_then(|run| run.result())
    }

    pub fn state(&self) -> Option<&SearchState> {
        self.run.as_ref().map(|run| run.state())
    }

    pub fn backward_state(&self) -> Option<&SearchState> {
        self.run.as_ref().and_then(|run| run.backward_state())
    }

    pub fn frontier(&self) -> Vec<Cell> {
        self.run.as_ref().map_or_else(Vec::new, |run| run.frontier())
    }

    pub fn meeting_node(&self) -> Option<Cell> {
        self.run.as_ref().and_then(|run| run.meeting_node())
    }

    fn ensure_not_running(&self, action: &str) -> Result<(), SearchError> {
        if self.status() == RunStatus::Running {
            return Err(SearchError::state(format!(
                "cannot {action} while a run is in progress"
            )));
        }
        Ok(())
    }

    #[instrument(skip_all, name = "start_run", fields(selection = format!("{:?}", self.selection)), level = "debug")]
    fn start(&mut self) -> Result<(), SearchError> {
        let grid = self
            .grid
            .clone()
            .ok_or_else(|| SearchError::config("no grid configured"))?;
        let (kind, params) = self
            .selection
            .ok_or_else(|| SearchError::config("no algorithm selected"))?;

        let run: Box<dyn SearchAlgorithm> = match kind {
            AlgorithmKind::Bfs => Box::new(Bfs::new(grid)),
            AlgorithmKind::Dfs => Box::new(Dfs::new(grid)),
            AlgorithmKind::Ucs => Box::new(Ucs::new(grid)),
            AlgorithmKind::Dls => {
                let depth_limit = params
                    .depth_limit
                    .ok_or_else(|| SearchError::config("dls requires a depth limit"))?;
                Box::new(Dls::new(grid, depth_limit))
            }
            AlgorithmKind::Iddfs => Box::new(Iddfs::new(grid, params.max_depth)),
            AlgorithmKind::Bidirectional => Box::new(Bidirectional::new(grid)),
        };
        info!("starting {kind} with {params:?}");
        self.run = Some(run);
        Ok(())
    }
}

/// Pull-based view of a run; dropping it early abandons nothing but the
/// remaining events.
pub struct Events<'a> {
    controller: &'a mut SearchController,
    done: bool,
}

impl Iterator for Events<'_> {
    type Item = StepEvent;

    fn next(&mut self) -> Option<StepEvent> {
        if self.done {
            return None;
        }
        match self.controller.step() {
            Ok(event) => {
                self.done = event.is_terminal();
                Some(event)
            }
            Err(_) => {
                self.done = true;
                None
            }
        }
    }
}
