use anyhow::anyhow;
use clap::Parser;
use serde::Deserialize;

use crate::common::Cell;
use crate::controller::{AlgorithmKind, AlgorithmParams};

#[derive(Parser, Debug, Default)]
#[command(
    name = "Grid Search",
    about = "Uninformed grid search (BFS, DFS, UCS, DLS, IDDFS, bidirectional) with step-by-step traces.",
    version = "1.0"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to a YAML scenario file")]
    pub scenario_path: Option<String>,

    #[arg(long, help = "Path to an octile map file")]
    pub map_path: Option<String>,

    #[arg(long, help = "Rows of a randomly generated grid")]
    pub rows: Option<usize>,

    #[arg(long, help = "Columns of a randomly generated grid")]
    pub cols: Option<usize>,

    #[arg(long, help = "Obstacle probability per cell of a random grid")]
    pub obstacle_ratio: Option<f64>,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,

    #[arg(long, value_parser = parse_cell, help = "Start cell as `row,col`")]
    pub start: Option<Cell>,

    #[arg(long, value_parser = parse_cell, help = "Target cell as `row,col`")]
    pub target: Option<Cell>,

    #[arg(
        long,
        help = "Algorithm to run: bfs, dfs, ucs, dls, iddfs, bidirectional or all"
    )]
    pub algorithm: Option<String>,

    #[arg(long, help = "Depth limit for DLS")]
    pub depth_limit: Option<usize>,

    #[arg(long, help = "Maximum depth tried by IDDFS")]
    pub max_depth: Option<usize>,

    #[arg(long, help = "Write step events as JSON lines to this file")]
    pub trace_path: Option<String>,

    #[arg(long, help = "Append run statistics to this CSV file")]
    pub output_path: Option<String>,

    #[arg(long, help = "Save the grid as a scenario file")]
    pub save_scenario: Option<String>,

    #[arg(long, help = "Log filter, e.g. info or grid_search_rust=trace")]
    pub log_level: Option<String>,
}

fn parse_cell(s: &str) -> Result<Cell, String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `row,col`, got `{s}`"))?;
    let row = row.trim().parse().map_err(|err| format!("row: {err}"))?;
    let col = col.trim().parse().map_err(|err| format!("col: {err}"))?;
    Ok((row, col))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scenario_path: Option<String>,
    pub map_path: Option<String>,
    pub rows: usize,
    pub cols: usize,
    pub obstacle_ratio: f64,
    pub seed: u64,
    pub start: Option<Cell>,
    pub target: Option<Cell>,
    pub algorithm: String,
    pub depth_limit: Option<usize>,
    pub max_depth: Option<usize>,
    pub trace_path: Option<String>,
    pub output_path: Option<String>,
    pub save_scenario: Option<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scenario_path: None,
            map_path: None,
            rows: 15,
            cols: 15,
            obstacle_ratio: 0.2,
            seed: 0,
            start: None,
            target: None,
            algorithm: "bfs".to_string(),
            depth_limit: None,
            max_depth: None,
            trace_path: None,
            output_path: None,
            save_scenario: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Applies every flag given on the command line, then validates.
    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(path) = &cli.scenario_path {
            self.scenario_path = Some(path.clone());
        }
        if let Some(path) = &cli.map_path {
            self.map_path = Some(path.clone());
        }
        if let Some(rows) = cli.rows {
            self.rows = rows;
        }
        if let Some(cols) = cli.cols {
            self.cols = cols;
        }
        if let Some(ratio) = cli.obstacle_ratio {
            self.obstacle_ratio = ratio;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if cli.start.is_some() {
            self.start = cli.start;
        }
        if cli.target.is_some() {
            self.target = cli.target;
        }
        if let Some(algorithm) = &cli.algorithm {
            self.algorithm = algorithm.clone();
        }
        if cli.depth_limit.is_some() {
            self.depth_limit = cli.depth_limit;
        }
        if cli.max_depth.is_some() {
            self.max_depth = cli.max_depth;
        }
        if let Some(path) = &cli.trace_path {
            self.trace_path = Some(path.clone());
        }
        if let Some(path) = &cli.output_path {
            self.output_path = Some(path.clone());
        }
        if let Some(path) = &cli.save_scenario {
            self.save_scenario = Some(path.clone());
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let algorithms = self.algorithms()?;

        if algorithms.contains(&AlgorithmKind::Dls) && self.depth_limit.is_none() {
            return Err(anyhow!("DLS needs --depth-limit"));
        }

        if self.scenario_path.is_some() && self.map_path.is_some() {
            return Err(anyhow!(
                "scenario_path and map_path are mutually exclusive"
            ));
        }

        if self.scenario_path.is_none() && self.map_path.is_none() {
            if self.rows == 0 || self.cols == 0 {
                return Err(anyhow!(
                    "Random grid needs positive dimensions, got {}x{}",
                    self.rows,
                    self.cols
                ));
            }
            if !(0.0..1.0).contains(&self.obstacle_ratio) {
                return Err(anyhow!(
                    "Obstacle ratio must be in [0, 1), got {}",
                    self.obstacle_ratio
                ));
            }
        }
        Ok(())
    }

    /// Algorithms to run, in order.
    pub fn algorithms(&self) -> anyhow::Result<Vec<AlgorithmKind>> {
        if self.algorithm.eq_ignore_ascii_case("all") {
            return Ok(AlgorithmKind::ALL.to_vec());
        }
        Ok(vec![self.algorithm.parse::<AlgorithmKind>()?])
    }

    pub fn params(&self) -> AlgorithmParams {
        AlgorithmParams {
            depth_limit: self.depth_limit,
            max_depth: self.max_depth,
        }
    }
}
