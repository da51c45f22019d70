use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tracing::info;

use crate::common::StepEvent;

const CSV_HEADER: &str = "algorithm,path_found,path_length,cost,nodes_expanded,iterations,time_us";

/// Summary of one run, built from its event stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub algorithm: String,
    pub path_found: bool,
    /// Cells on the path, start and target included.
    pub path_length: usize,
    pub cost: f64,
    pub nodes_expanded: usize,
    pub iterations: usize,
    pub time_us: usize,
}

impl Stats {
    pub fn new(algorithm: &str) -> Self {
        Stats {
            algorithm: algorithm.to_string(),
            ..Default::default()
        }
    }

    pub fn record(&mut self, event: &StepEvent) {
        match event {
            StepEvent::NodeExpanded { .. } => self.nodes_expanded += 1,
            StepEvent::IterationStarted { .. } => self.iterations += 1,
            StepEvent::SearchSucceeded { path, cost } => {
                self.path_found = true;
                self.path_length = path.len();
                self.cost = *cost;
            }
            StepEvent::NodeDiscovered { .. }
            | StepEvent::FrontierSwitched { .. }
            | StepEvent::SearchFailed => {}
        }
    }

    pub fn print(&self) {
        info!(
            "{} path found {:?} length {:?} cost {:.3} expanded nodes {:?} iterations {:?} time(microseconds) {:?}",
            self.algorithm,
            self.path_found,
            self.path_length,
            self.cost,
            self.nodes_expanded,
            self.iterations,
            self.time_us
        );
    }

    fn csv_row(&self) -> String {
        format!(
            "{},{},{},{:.6},{},{},{}",
            self.algorithm,
            self.path_found,
            self.path_length,
            self.cost,
            self.nodes_expanded,
            self.iterations,
            self.time_us
        )
    }

    /// Appends one row to `path`, writing the header if the file is new.
    pub fn append_csv(&self, path: &str) -> anyhow::Result<()> {
        if let Some(dir) = Path::new(path).parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let is_new = !Path::new(path).exists();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening {path}"))?;
        if is_new {
            writeln!(file, "{CSV_HEADER}")?;
        }
        writeln!(file, "{}", self.csv_row())?;
        Ok(())
    }
}
