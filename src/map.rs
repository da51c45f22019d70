use std::collections::{HashSet, VecDeque};
use std::f64::consts::SQRT_2;
use std::fs;

use anyhow::{anyhow, Context};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::common::{Cell, Direction};
use crate::error::SearchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Empty,
    Obstacle,
    Start,
    Target,
}

/// Read-only search space. Construction enforces exactly one Start and one
/// Target, distinct and both in bounds on open cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub height: usize,
    pub width: usize,
    cells: Vec<Vec<CellKind>>,
    start: Cell,
    target: Cell,
}

impl Grid {
    pub fn new(
        height: usize,
        width: usize,
        obstacles: &[Cell],
        start: Cell,
        target: Cell,
    ) -> Result<Self, SearchError> {
        if height == 0 || width == 0 {
            return Err(SearchError::config(format!(
                "grid must not be empty, got {height}x{width}"
            )));
        }
        if height.checked_mul(width).is_none() {
            return Err(SearchError::config(format!(
                "a {height}x{width} grid is too large"
            )));
        }

        let mut cells = vec![vec![CellKind::Empty; width]; height];
        for &(row, col) in obstacles {
            if row >= height || col >= width {
                return Err(SearchError::config(format!(
                    "obstacle {:?} is outside the {height}x{width} grid",
                    (row, col)
                )));
            }
            cells[row][col] = CellKind::Obstacle;
        }

        for (name, cell) in [("start", start), ("target", target)] {
            if cell.0 >= height || cell.1 >= width {
                return Err(SearchError::config(format!(
                    "{name} {cell:?} is outside the {height}x{width} grid"
                )));
            }
            if cells[cell.0][cell.1] == CellKind::Obstacle {
                return Err(SearchError::config(format!(
                    "{name} {cell:?} is placed on an obstacle"
                )));
            }
        }
        if start == target {
            return Err(SearchError::config(format!(
                "start and target must differ, both are {start:?}"
            )));
        }

        cells[start.0][start.1] = CellKind::Start;
        cells[target.0][target.1] = CellKind::Target;

        Ok(Grid {
            height,
            width,
            cells,
            start,
            target,
        })
    }

    /// Scatters obstacles with probability `obstacle_ratio` per cell and picks
    /// distinct Start and Target cells among the open ones. If fewer than two
    /// cells stay open the obstacles are dropped.
    pub fn random<R: Rng + ?Sized>(
        height: usize,
        width: usize,
        obstacle_ratio: f64,
        rng: &mut R,
    ) -> Result<Self, SearchError> {
        let Some(area) = height.checked_mul(width) else {
            return Err(SearchError::config(format!(
                "a {height}x{width} grid is too large"
            )));
        };
        if area < 2 {
            return Err(SearchError::config(format!(
                "a {height}x{width} grid cannot hold both start and target"
            )));
        }
        if !(0.0..1.0).contains(&obstacle_ratio) {
            return Err(SearchError::config(format!(
                "obstacle ratio must be in [0, 1), got {obstacle_ratio}"
            )));
        }

        let mut obstacles = Vec::new();
        for row in 0..height {
            for col in 0..width {
                if rng.gen::<f64>() < obstacle_ratio {
                    obstacles.push((row, col));
                }
            }
        }

        let blocked: HashSet<Cell> = obstacles.iter().copied().collect();
        let mut open: Vec<Cell> = (0..height)
            .flat_map(|row| (0..width).map(move |col| (row, col)))
            .filter(|cell| !blocked.contains(cell))
            .collect();
        if open.len() < 2 {
            obstacles.clear();
            open = (0..height)
                .flat_map(|row| (0..width).map(move |col| (row, col)))
                .collect();
        }

        let mut picked = open.choose_multiple(rng, 2).copied();
        let (Some(start), Some(target)) = (picked.next(), picked.next()) else {
            return Err(SearchError::config("not enough open cells"));
        };

        Grid::new(height, width, &obstacles, start, target)
    }

    /// Parses the octile map format. `.` and `G` are open, `S` and `E` mark
    /// Start and Target, anything else is an obstacle. Explicit `start` and
    /// `target` take precedence over markers.
    pub fn from_map_str(
        text: &str,
        start: Option<Cell>,
        target: Option<Cell>,
    ) -> anyhow::Result<Self> {
        let mut lines = text.lines();

        let _type = lines.next().ok_or_else(|| anyhow!("missing type line"))?;
        let height = parse_header(lines.next(), "height")?;
        let width = parse_header(lines.next(), "width")?;
        let _map = lines.next().ok_or_else(|| anyhow!("missing map line"))?;

        let mut obstacles = Vec::new();
        let mut start_markers = Vec::new();
        let mut target_markers = Vec::new();
        let mut rows = 0;
        for (row, line) in lines.take(height).enumerate() {
            let chars: Vec<char> = line.trim_end().chars().collect();
            if chars.len() != width {
                return Err(anyhow!(
                    "row {row} has {} cells, expected {width}",
                    chars.len()
                ));
            }
            for (col, ch) in chars.into_iter().enumerate() {
                match ch {
                    '.' | 'G' => {}
                    'S' => start_markers.push((row, col)),
                    'E' => target_markers.push((row, col)),
                    _ => obstacles.push((row, col)),
                }
            }
            rows += 1;
        }
        if rows != height {
            return Err(anyhow!("expected {height} rows, found {rows}"));
        }

        let start = resolve_marker(start, &start_markers, "start")?;
        let target = resolve_marker(target, &target_markers, "target")?;
        Ok(Grid::new(height, width, &obstacles, start, target)?)
    }

    pub fn from_file(
        path: &str,
        start: Option<Cell>,
        target: Option<Cell>,
    ) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading map {path}"))?;
        Grid::from_map_str(&text, start, target).with_context(|| format!("parsing map {path}"))
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn target(&self) -> Cell {
        self.target
    }

    /// Obstacle cells in row-major order.
    pub fn obstacles(&self) -> Vec<Cell> {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(row, kinds)| {
                kinds
                    .iter()
                    .enumerate()
                    .filter(|(_, kind)| **kind == CellKind::Obstacle)
                    .map(move |(col, _)| (row, col))
            })
            .collect()
    }

    pub fn is_in_bounds(&self, cell: Cell) -> bool {
        cell.0 < self.height && cell.1 < self.width
    }

    pub fn is_obstacle(&self, cell: Cell) -> bool {
        self.classify(cell) == Some(CellKind::Obstacle)
    }

    /// `None` for out-of-bounds queries.
    pub fn classify(&self, cell: Cell) -> Option<CellKind> {
        self.cells.get(cell.0)?.get(cell.1).copied()
    }

    /// Valid neighbours of `cell` in the fixed order Up, Right, Bottom,
    /// Bottom-Right, Left, Top-Left, tagged with the move that reaches them.
    pub fn neighbors_in_order(&self, cell: Cell) -> Vec<(Direction, Cell)> {
        if !self.is_in_bounds(cell) {
            return Vec::new();
        }

        let mut neighbors = Vec::with_capacity(Direction::ORDER.len());
        for direction in Direction::ORDER {
            let (dr, dc) = direction.offset();
            let (Some(row), Some(col)) = (
                cell.0.checked_add_signed(dr),
                cell.1.checked_add_signed(dc),
            ) else {
                continue;
            };
            if self.is_in_bounds((row, col)) && !self.is_obstacle((row, col)) {
                neighbors.push((direction, (row, col)));
            }
        }
        neighbors
    }

    pub fn step_cost(direction: Direction) -> f64 {
        if direction.is_diagonal() {
            SQRT_2
        } else {
            1.0
        }
    }

    /// Summed step cost along consecutive cells of `path`.
    pub fn path_cost(path: &[Cell]) -> f64 {
        path.windows(2)
            .map(|pair| {
                let diagonal = pair[0].0 != pair[1].0 && pair[0].1 != pair[1].1;
                if diagonal {
                    SQRT_2
                } else {
                    1.0
                }
            })
            .sum()
    }

    /// Number of open cells reachable from `from`, `from` included.
    pub fn reachable_count(&self, from: Cell) -> usize {
        if !self.is_in_bounds(from) || self.is_obstacle(from) {
            return 0;
        }

        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(cell) = queue.pop_front() {
            for (_, next) in self.neighbors_in_order(cell) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen.len()
    }

    /// ASCII picture of the grid, with `path` cells drawn as `*`.
    pub fn render(&self, path: &[Cell]) -> String {
        let on_path: HashSet<&Cell> = path.iter().collect();
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for (row, kinds) in self.cells.iter().enumerate() {
            for (col, kind) in kinds.iter().enumerate() {
                out.push(match kind {
                    CellKind::Obstacle => '@',
                    CellKind::Start => 'S',
                    CellKind::Target => 'E',
                    CellKind::Empty if on_path.contains(&(row, col)) => '*',
                    CellKind::Empty => '.',
                });
            }
            out.push('\n');
        }
        out
    }
}

fn parse_header(line: Option<&str>, key: &str) -> anyhow::Result<usize> {
    let line = line.ok_or_else(|| anyhow!("missing {key} line"))?;
    let mut parts = line.split_whitespace();
    if parts.next() != Some(key) {
        return Err(anyhow!("expected `{key} <n>`, got `{line}`"));
    }
    let value = parts
        .last()
        .ok_or_else(|| anyhow!("missing value in `{line}`"))?;
    value
        .parse::<usize>()
        .with_context(|| format!("invalid {key} `{value}`"))
}

fn resolve_marker(explicit: Option<Cell>, markers: &[Cell], name: &str) -> anyhow::Result<Cell> {
    if let Some(cell) = explicit {
        return Ok(cell);
    }
    match markers {
        [cell] => Ok(*cell),
        [] => Err(SearchError::config(format!("missing {name}")).into()),
        _ => Err(SearchError::config(format!("duplicate {name}: {markers:?}")).into()),
    }
}
