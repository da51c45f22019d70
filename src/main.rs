use grid_search_rust::common::Path;
use grid_search_rust::config::{Cli, Config};
use grid_search_rust::controller::SearchController;
use grid_search_rust::map::Grid;
use grid_search_rust::scenario::Scenario;
use grid_search_rust::stat::Stats;
use grid_search_rust::trace::TraceWriter;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn load_grid(config: &Config) -> anyhow::Result<Grid> {
    if let Some(path) = &config.scenario_path {
        let mut scenario = Scenario::load_from_file(path)?;
        if let Some((row, col)) = config.start {
            scenario.start = Some([row, col]);
        }
        if let Some((row, col)) = config.target {
            scenario.target = Some([row, col]);
        }
        return scenario
            .build_grid()
            .with_context(|| format!("error with scenario file: {path}"));
    }

    if let Some(path) = &config.map_path {
        return Grid::from_file(path, config.start, config.target);
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let grid = Grid::random(config.rows, config.cols, config.obstacle_ratio, &mut rng)?;
    if config.start.is_none() && config.target.is_none() {
        return Ok(grid);
    }
    let start = config.start.unwrap_or(grid.start());
    let target = config.target.unwrap_or(grid.target());
    Ok(Grid::new(
        grid.height,
        grid.width,
        &grid.obstacles(),
        start,
        target,
    )?)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    if cli.config.is_none() {
        info!("No config file specified, using default config");
    }

    let grid = load_grid(&config)?;
    if let Some(path) = &config.save_scenario {
        Scenario::from_grid(&grid).write_to_file(path)?;
        info!("saved scenario to {path}");
    }
    info!(
        "grid {}x{}, start {:?}, target {:?}\n{}",
        grid.height,
        grid.width,
        grid.start(),
        grid.target(),
        grid.render(&[])
    );

    let mut trace = match &config.trace_path {
        Some(path) => Some(TraceWriter::create(path)?),
        None => None,
    };

    let mut controller = SearchController::new();
    controller.configure(grid)?;

    for kind in config.algorithms()? {
        controller.reset();
        controller.select_algorithm(kind, config.params())?;

        let mut stats = Stats::new(kind.name());
        let start_time = Instant::now();
        for event in controller.run()? {
            if let Some(trace) = trace.as_mut() {
                trace.write(kind.name(), &event)?;
            }
            stats.record(&event);
        }
        stats.time_us = start_time.elapsed().as_micros() as usize;

        let path: Path = controller
            .result()
            .and_then(|result| result.path())
            .cloned()
            .unwrap_or_default();
        if path.is_empty() {
            warn!("{kind} found no path");
        }
        stats.print();
        if !path.is_empty() {
            if let Some(grid) = controller.grid() {
                info!("{kind} path:\n{}", grid.render(&path));
            }
        }
        if let Some(output) = &config.output_path {
            stats.append_csv(output)?;
        }
    }

    if let Some(trace) = trace.as_mut() {
        trace.flush()?;
    }
    Ok(())
}
