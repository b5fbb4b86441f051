#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a cleaning simulation to completion.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cleaning_sim_core::StatsReport;
use cleaning_sim_simulation::Simulation;
use cleaning_sim_world::query;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Overrides;

#[derive(Parser, Debug)]
#[command(name = "cleaning-sim")]
#[command(about = "Battery-limited cleaning agents on a bounded grid")]
struct Cli {
    /// TOML file with simulation parameters; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging of every tick
    #[arg(long, short)]
    verbose: bool,
}

/// Entry point for the cleaning simulation command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = config::load(cli.config.as_deref())?;
    cli.overrides.apply(&mut config);
    let mut simulation = Simulation::new(&config).context("invalid simulation configuration")?;
    let (width, height) = query::dimensions(simulation.world());
    info!(
        agents = config.num_agents,
        width,
        height,
        seed = config.seed,
        mode = ?query::mode(simulation.world()),
        dirty_cells = query::initial_dirty_cells(simulation.world()),
        "starting simulation"
    );

    let report = simulation.run();

    if cli.json {
        let json =
            serde_json::to_string_pretty(&report).context("failed to serialize final report")?;
        println!("{json}");
    } else {
        println!("Grid: {width}x{height}");
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &StatsReport) {
    println!("Mode: {:?}", report.mode);
    println!("Agents: {}", report.num_agents);
    println!("Steps: {}", report.steps);
    println!("Completion time: {}", report.completion_time);
    match report.stop_reason {
        Some(reason) => println!("Stop reason: {reason:?}"),
        None => println!("Stop reason: still running"),
    }
    println!(
        "Dirty cells: {} remaining of {}",
        report.dirty_cells_remaining, report.initial_dirty_cells
    );
    println!("Clean percentage: {:.2}%", report.clean_percentage);
    println!("Total moves: {}", report.total_moves);
    println!("Total cleaned: {}", report.total_cleaned);

    for agent in &report.agents {
        println!(
            "  agent {:>3}: moves {:>5}, cleaned {:>4}, battery {:>3}, {:?} at ({}, {})",
            agent.agent_id.get(),
            agent.moves,
            agent.cleaned_cells,
            agent.battery,
            agent.state,
            agent.cell.column(),
            agent.cell.row()
        );
    }
}
