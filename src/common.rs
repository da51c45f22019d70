use serde::Serialize;

/// A grid position as `(row, col)`.
pub type Cell = (usize, usize);

pub type Path = Vec<Cell>;

/// Movement directions in the fixed expansion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Direction {
    Up,
    Right,
    Bottom,
    BottomRight,
    Left,
    TopLeft,
}

impl Direction {
    pub const ORDER: [Direction; 6] = [
        Direction::Up,
        Direction::Right,
        Direction::Bottom,
        Direction::BottomRight,
        Direction::Left,
        Direction::TopLeft,
    ];

    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Bottom => (1, 0),
            Direction::BottomRight => (1, 1),
            Direction::Left => (0, -1),
            Direction::TopLeft => (-1, -1),
        }
    }

    pub fn is_diagonal(self) -> bool {
        matches!(self, Direction::BottomRight | Direction::TopLeft)
    }

    /// Rank used for tie-breaking, Up = 0 through TopLeft = 5.
    pub fn rank(self) -> usize {
        self as usize
    }
}

/// Which half of a bidirectional search is being expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Forward,
    Backward,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Forward => Side::Backward,
            Side::Backward => Side::Forward,
        }
    }
}

/// One atomic change of the search, in the order it happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum StepEvent {
    NodeDiscovered {
        cell: Cell,
        discovered_from: Option<Cell>,
    },
    NodeExpanded {
        cell: Cell,
    },
    IterationStarted {
        depth_limit: usize,
    },
    FrontierSwitched {
        side: Side,
    },
    SearchSucceeded {
        path: Path,
        cost: f64,
    },
    SearchFailed,
}

impl StepEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepEvent::SearchSucceeded { .. } | StepEvent::SearchFailed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SearchResult {
    PathFound { path: Path, cost: f64 },
    Exhausted,
}

impl SearchResult {
    pub fn path(&self) -> Option<&Path> {
        match self {
            SearchResult::PathFound { path, .. } => Some(path),
            SearchResult::Exhausted => None,
        }
    }

    pub fn cost(&self) -> Option<f64> {
        match self {
            SearchResult::PathFound { cost, .. } => Some(*cost),
            SearchResult::Exhausted => None,
        }
    }

    pub(crate) fn to_event(&self) -> StepEvent {
        match self {
            SearchResult::PathFound { path, cost } => StepEvent::SearchSucceeded {
                path: path.clone(),
                cost: *cost,
            },
            SearchResult::Exhausted => StepEvent::SearchFailed,
        }
    }
}

/// Lifecycle shared by every algorithm run and by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    Ready,
    Running,
    Succeeded,
    Exhausted,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Succeeded | RunStatus::Exhausted)
    }
}
