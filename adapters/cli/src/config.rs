//! Simulation parameters assembled from an optional TOML file and flags.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use cleaning_sim_core::{AgentMode, SimulationConfig};

/// Placement mode as spelled on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum ModeArg {
    /// Every cleaner starts on its own randomly placed station.
    Multi,
    /// All cleaners share one station near the top-left corner.
    Single,
}

impl From<ModeArg> for AgentMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Multi => AgentMode::MultiAgent,
            ModeArg::Single => AgentMode::SingleAgent,
        }
    }
}

/// Flags that override individual configuration fields.
#[derive(Args, Clone, Debug, Default)]
pub(crate) struct Overrides {
    /// Number of cleaners
    #[arg(long)]
    agents: Option<u32>,
    /// Grid width in cells, border included
    #[arg(long)]
    width: Option<u32>,
    /// Grid height in cells, border included
    #[arg(long)]
    height: Option<u32>,
    /// Percentage of free interior cells that start dirty
    #[arg(long)]
    dirty: Option<u32>,
    /// Percentage of interior cells turned into obstacles
    #[arg(long)]
    obstacles: Option<u32>,
    /// Tick cap
    #[arg(long)]
    max_time: Option<u64>,
    /// Station placement mode
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Seed for every random choice of the run
    #[arg(long)]
    seed: Option<u64>,
}

impl Overrides {
    pub(crate) fn apply(&self, config: &mut SimulationConfig) {
        if let Some(agents) = self.agents {
            config.num_agents = agents;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(dirty) = self.dirty {
            config.dirty_percentage = dirty;
        }
        if let Some(obstacles) = self.obstacles {
            config.obstacle_percentage = obstacles;
        }
        if let Some(max_time) = self.max_time {
            config.max_time = max_time;
        }
        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
    }
}

/// Loads the configuration file when given, falling back to defaults.
pub(crate) fn load(path: Option<&Path>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration at {}", path.display()))?;
    parse(&contents)
        .with_context(|| format!("invalid configuration in {}", path.display()))
}

fn parse(contents: &str) -> Result<SimulationConfig> {
    toml::from_str(contents).context("failed to parse simulation configuration toml")
}
