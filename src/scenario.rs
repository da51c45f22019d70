use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, Write};
use tracing::info;

use crate::common::Cell;
use crate::map::Grid;

/// One obstacle entry: a single cell, or an inclusive run of cells along a
/// row or a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObstacleSpec {
    Cell([usize; 2]),
    Row { row: usize, cols: [usize; 2] },
    Col { col: usize, rows: [usize; 2] },
}

impl ObstacleSpec {
    fn cells(&self) -> Vec<Cell> {
        match self {
            ObstacleSpec::Cell([row, col]) => vec![(*row, *col)],
            ObstacleSpec::Row { row, cols: [from, to] } => {
                (*from..=*to).map(|col| (*row, col)).collect()
            }
            ObstacleSpec::Col { col, rows: [from, to] } => {
                (*from..=*to).map(|row| (row, *col)).collect()
            }
        }
    }
}

/// A hand-built grid. Either `map` names an octile map file, or `height`
/// and `width` describe an empty grid that `obstacles` are placed on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<[usize; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<[usize; 2]>,
}

impl Scenario {
    pub fn load_from_file(path: &str) -> Result<Scenario> {
        let file = File::open(path).with_context(|| format!("opening scenario {path}"))?;
        let reader = BufReader::new(file);
        let scenario = serde_yaml::from_reader(reader)
            .with_context(|| format!("parsing scenario {path}"))?;
        Ok(scenario)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Scenario> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_grid(grid: &Grid) -> Scenario {
        Scenario {
            name: None,
            map: None,
            height: Some(grid.height),
            width: Some(grid.width),
            obstacles: grid
                .obstacles()
                .into_iter()
                .map(|(row, col)| ObstacleSpec::Cell([row, col]))
                .collect(),
            start: Some([grid.start().0, grid.start().1]),
            target: Some([grid.target().0, grid.target().1]),
        }
    }

    pub fn build_grid(&self) -> Result<Grid> {
        let start = self.start.map(|[row, col]| (row, col));
        let target = self.target.map(|[row, col]| (row, col));

        if let Some(map) = &self.map {
            if !self.obstacles.is_empty() {
                return Err(anyhow!("obstacles cannot be combined with a map file"));
            }
            return Grid::from_file(map, start, target);
        }

        let (Some(height), Some(width)) = (self.height, self.width) else {
            return Err(anyhow!("scenario needs either `map` or `height` and `width`"));
        };
        let start = start.ok_or_else(|| anyhow!("scenario has no start"))?;
        let target = target.ok_or_else(|| anyhow!("scenario has no target"))?;
        let obstacles: Vec<Cell> = self.obstacles.iter().flat_map(ObstacleSpec::cells).collect();

        let grid = Grid::new(height, width, &obstacles, start, target)?;
        info!(
            "scenario {}: {height}x{width}, {} obstacles",
            self.name.as_deref().unwrap_or("<unnamed>"),
            obstacles.len()
        );
        Ok(grid)
    }

    pub fn write_to_file(&self, path: &str) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating {path}"))?;
        let mut writer = io::BufWriter::new(file);
        let yaml_data = serde_yaml::to_string(self)?;
        writer.write_all(yaml_data.as_bytes())?;

        Ok(())
    }
}
