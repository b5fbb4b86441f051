#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the cleaning simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems inspect read-only queries
//! and submit [`Command`] values describing desired mutations, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values describing what actually changed. The simulation driver
//! applies the commands of one agent before activating the next so that every
//! agent observes the post-move state of the agents that acted before it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Battery level of a fully charged cleaner.
pub const MAX_BATTERY: u8 = 100;

/// Battery restored by a charging station on every tick.
pub const CHARGE_RATE: u8 = 5;

/// Battery level at or below which a cleaner heads back to a station.
pub const LOW_BATTERY_THRESHOLD: u8 = 20;

/// Smallest grid edge able to hold the obstacle border and one interior cell.
pub const MIN_GRID_DIMENSION: u32 = 3;

/// Fixed interior cell hosting the only station in single-station mode.
pub const SINGLE_STATION_CELL: CellCoord = CellCoord::new(1, 1);

/// Commands that express all permissible world mutations after setup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation clock by one tick.
    Tick,
    /// Replenishes the battery of a cleaner standing on a charging station.
    ChargeAgent {
        /// Cleaner receiving the charge.
        agent: AgentId,
    },
    /// Cleans the dirty cell under the cleaner.
    CleanCell {
        /// Cleaner performing the cleaning.
        agent: AgentId,
    },
    /// Replaces the cached route a cleaner follows toward a station.
    AssignRoute {
        /// Cleaner receiving the route.
        agent: AgentId,
        /// Station cell the route leads to.
        target: CellCoord,
        /// Cells from the cleaner's position (exclusive) to the target (inclusive).
        route: Vec<CellCoord>,
    },
    /// Requests that a cleaner advance a single step onto an adjacent cell.
    StepAgent {
        /// Cleaner attempting to move.
        agent: AgentId,
        /// Adjacent destination cell.
        to: CellCoord,
        /// Reason the cleaner is moving.
        purpose: StepPurpose,
    },
    /// Records that a cleaner deliberately does nothing this tick.
    RestAgent {
        /// Cleaner that stays put.
        agent: AgentId,
        /// Why the cleaner cannot act.
        reason: RestReason,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Tick counter after the advance.
        tick: u64,
    },
    /// Confirms that a cleaner drew charge from a station.
    AgentCharged {
        /// Cleaner that charged.
        agent: AgentId,
        /// Battery level after charging.
        battery: u8,
    },
    /// Announces that a cleaner reached a full battery.
    ChargeCompleted {
        /// Cleaner that finished charging.
        agent: AgentId,
    },
    /// Confirms that a dirty cell was cleaned.
    CellCleaned {
        /// Cleaner that performed the cleaning.
        agent: AgentId,
        /// Cell that became clean.
        cell: CellCoord,
    },
    /// Confirms that a cleaner accepted a new route.
    RouteAssigned {
        /// Cleaner that received the route.
        agent: AgentId,
        /// Station cell the route leads to.
        target: CellCoord,
        /// Number of steps in the route; zero when the station is unreachable.
        length: usize,
    },
    /// Confirms that a cleaner moved between two adjacent cells.
    AgentMoved {
        /// Cleaner that moved.
        agent: AgentId,
        /// Cell occupied before moving.
        from: CellCoord,
        /// Cell occupied after moving.
        to: CellCoord,
    },
    /// Reports that a cleaner spent its turn without acting.
    AgentRested {
        /// Cleaner that rested.
        agent: AgentId,
        /// Why the cleaner could not act.
        reason: RestReason,
    },
    /// Reports that the world refused a command.
    CommandRejected {
        /// Cleaner named by the rejected command.
        agent: AgentId,
        /// Specific reason the command was refused.
        reason: RejectionReason,
    },
}

/// Why a cleaner takes a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepPurpose {
    /// Searching the grid for dirt.
    Explore,
    /// Following the cached route toward a charging station.
    ReturnToCharge,
}

/// Reasons a cleaner spends a tick without acting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestReason {
    /// Battery is empty and no station is underneath.
    Depleted,
    /// No traversable route leads to any charging station.
    NoRoute,
    /// Every neighbouring cell is blocked.
    Boxed,
}

/// Reasons the world refuses a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The named cleaner does not exist.
    UnknownAgent,
    /// Charging was requested away from a charging station.
    NotOnStation,
    /// Cleaning was requested on a cell with nothing dirty.
    NothingToClean,
    /// The destination lies outside the grid.
    OutOfBounds,
    /// The destination is not one of the eight neighbouring cells.
    NotAdjacent,
    /// The destination holds an obstacle.
    Blocked,
    /// The cleaner has no battery left to spend.
    Depleted,
}

/// Behavioural state of a cleaner, updated whenever it acts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    /// Drawing charge from a station.
    Charging,
    /// Heading back to a station or stranded on the way.
    ReturningToCharge,
    /// Cleaning the cell underneath.
    Cleaning,
    /// Wandering the grid looking for dirt.
    Exploring,
}

/// Kinds of occupant that may share a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OccupantKind {
    /// Immobile wall that blocks traversal.
    Obstacle,
    /// Floor tile that may be dirty or clean.
    DirtyCell,
    /// Station that recharges cleaners standing on it.
    ChargingStation,
    /// Mobile cleaning agent.
    Cleaner,
}

/// Placement strategy for cleaners and stations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentMode {
    /// Every cleaner starts on its own randomly placed home station.
    #[default]
    MultiAgent,
    /// All cleaners share one station at [`SINGLE_STATION_CELL`].
    SingleAgent,
}

/// Why a simulation run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopReason {
    /// No dirty cells remain.
    Cleaned,
    /// The configured tick cap was reached.
    TimeLimit,
    /// Every cleaner is out of battery away from a station.
    Starvation,
}

/// Unique identifier assigned to a cleaner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new cleaner identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a charging station.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StationId(u32);

impl StationId {
    /// Creates a new station identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the station identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Computes the Chebyshev distance, the number of 8-connected steps between two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column()
            .abs_diff(other.column())
            .max(self.row().abs_diff(other.row()))
    }

    /// Reports whether `other` is one of the eight cells surrounding `self`.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.chebyshev_distance(other) == 1
    }
}

/// Immutable representation of a single cleaner's state used for queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AgentSnapshot {
    /// Unique identifier assigned to the cleaner.
    pub id: AgentId,
    /// Grid cell currently occupied by the cleaner.
    pub cell: CellCoord,
    /// Remaining battery in `[0, MAX_BATTERY]`.
    pub battery: u8,
    /// Cumulative number of accepted steps.
    pub moves: u64,
    /// Cumulative number of cells cleaned.
    pub cleaned_cells: u64,
    /// Indicates the cleaner is on its way to, or waiting at, a station.
    pub returning_to_charge: bool,
    /// Station the cleaner was created at, in multi-agent mode.
    pub home: Option<StationId>,
    /// Behaviour chosen on the cleaner's most recent turn.
    pub state: AgentState,
}

/// Read-only snapshot describing all cleaners in the world.
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AgentSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Number of cleaners captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no cleaners.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AgentSnapshot> {
        self.snapshots
    }
}

/// Read-only description of a single cell for presentation layers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CellSnapshot {
    /// Coordinate of the cell.
    pub cell: CellCoord,
    /// Kinds of occupant present, sorted by kind.
    pub occupants: Vec<OccupantKind>,
    /// Dirt state when the cell hosts a floor tile.
    pub dirty: Option<bool>,
    /// Charging station registered on the cell, if any.
    pub station: Option<StationId>,
    /// Cleaners currently standing on the cell, in identifier order.
    pub agents: Vec<AgentId>,
}

/// Everything the statistics collector reads from the world in one tick.
#[derive(Clone, Debug)]
pub struct AnalyticsInputs {
    /// Tick counter at capture time.
    pub tick: u64,
    /// Placement mode used when the world was generated.
    pub mode: AgentMode,
    /// Dirty cells present once setup finished.
    pub initial_dirty_cells: u32,
    /// Dirty cells still waiting to be cleaned.
    pub dirty_cells_remaining: u32,
    /// Cleaners in identifier order.
    pub agents: AgentView,
}

/// Per-cleaner slice of a [`StatsReport`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AgentStatistics {
    /// Identifier of the cleaner.
    pub agent_id: AgentId,
    /// Steps taken so far.
    pub moves: u64,
    /// Cells cleaned so far.
    pub cleaned_cells: u64,
    /// Remaining battery.
    pub battery: u8,
    /// Behaviour chosen on the most recent turn.
    pub state: AgentState,
    /// Cell currently occupied.
    pub cell: CellCoord,
}

/// Aggregate and per-cleaner metrics, computable at any tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatsReport {
    /// Placement mode of the run.
    pub mode: AgentMode,
    /// Number of cleaners in the world.
    pub num_agents: usize,
    /// Ticks elapsed so far.
    pub steps: u64,
    /// First tick with no dirty cells, or the current tick when not yet clean.
    pub completion_time: u64,
    /// Dirty cells still waiting to be cleaned.
    pub dirty_cells_remaining: u32,
    /// Dirty cells present once setup finished.
    pub initial_dirty_cells: u32,
    /// Sum of moves over all cleaners.
    pub total_moves: u64,
    /// Sum of cleaned cells over all cleaners.
    pub total_cleaned: u64,
    /// Share of the initial dirt that has been removed, in percent.
    pub clean_percentage: f64,
    /// Reason the run stopped, once it has.
    pub stop_reason: Option<StopReason>,
    /// Per-cleaner breakdown in identifier order.
    pub agents: Vec<AgentStatistics>,
}

/// Model-level sample recorded after every tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TickSample {
    /// Tick the sample belongs to.
    pub tick: u64,
    /// Dirty cells remaining after the tick.
    pub dirty_cells: u32,
    /// Share of the initial dirt removed, in percent.
    pub clean_percentage: f64,
    /// Sum of moves over all cleaners.
    pub total_moves: u64,
    /// Sum of cleaned cells over all cleaners.
    pub total_cleaned: u64,
    /// Battery, counters and position of every cleaner in identifier order.
    pub agents: Vec<AgentStatistics>,
}

/// Parameters that fully determine a simulation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of cleaners to create.
    pub num_agents: u32,
    /// Grid width in cells, border included.
    pub width: u32,
    /// Grid height in cells, border included.
    pub height: u32,
    /// Share of the free interior cells that start dirty, `0..=100`.
    pub dirty_percentage: u32,
    /// Share of the interior cells turned into obstacles, `0..=100`.
    pub obstacle_percentage: u32,
    /// Tick cap after which the run stops.
    pub max_time: u64,
    /// Placement strategy for cleaners and stations.
    pub mode: AgentMode,
    /// Seed for every random decision in the run.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_agents: 10,
            width: 20,
            height: 20,
            dirty_percentage: 30,
            obstacle_percentage: 10,
            max_time: 1_000,
            mode: AgentMode::MultiAgent,
            seed: 42,
        }
    }
}

impl SimulationConfig {
    /// Number of non-border cells available for stations, obstacles and dirt.
    #[must_use]
    pub fn interior_cells(&self) -> u64 {
        u64::from(self.width.saturating_sub(2)) * u64::from(self.height.saturating_sub(2))
    }

    /// Checks the parameters that do not depend on random placement.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_agents == 0 {
            return Err(ConfigError::NoAgents);
        }

        if self.width < MIN_GRID_DIMENSION || self.height < MIN_GRID_DIMENSION {
            return Err(ConfigError::GridTooSmall {
                width: self.width,
                height: self.height,
                minimum: MIN_GRID_DIMENSION,
            });
        }

        if self.dirty_percentage > 100 {
            return Err(ConfigError::PercentageOutOfRange {
                field: "dirty_percentage",
                value: self.dirty_percentage,
            });
        }

        if self.obstacle_percentage > 100 {
            return Err(ConfigError::PercentageOutOfRange {
                field: "obstacle_percentage",
                value: self.obstacle_percentage,
            });
        }

        if self.max_time == 0 {
            return Err(ConfigError::ZeroMaxTime);
        }

        if self.mode == AgentMode::MultiAgent
            && u64::from(self.num_agents) > self.interior_cells()
        {
            return Err(ConfigError::NotEnoughCellsForAgents {
                requested: self.num_agents,
                available: self.interior_cells(),
            });
        }

        Ok(())
    }
}

/// Fatal problems detected while constructing a world.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// At least one cleaner is required.
    #[error("num_agents must be positive")]
    NoAgents,
    /// The grid cannot hold the border plus an interior.
    #[error("grid {width}x{height} is smaller than the {minimum}x{minimum} minimum")]
    GridTooSmall {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Smallest allowed edge length.
        minimum: u32,
    },
    /// A percentage parameter exceeds 100.
    #[error("{field} must lie in 0..=100, got {value}")]
    PercentageOutOfRange {
        /// Name of the offending parameter.
        field: &'static str,
        /// Value supplied.
        value: u32,
    },
    /// The tick cap must allow at least one tick.
    #[error("max_time must be positive")]
    ZeroMaxTime,
    /// Multi-agent mode needs one interior cell per home station.
    #[error("not enough interior cells for {requested} agents ({available} available)")]
    NotEnoughCellsForAgents {
        /// Cleaners requested.
        requested: u32,
        /// Interior cells available.
        available: u64,
    },
    /// Placement asked for more cells of a kind than remain free.
    #[error("cannot place {requested} {kind:?} cells, only {available} free")]
    InsufficientCells {
        /// Kind of occupant being placed.
        kind: OccupantKind,
        /// Cells requested.
        requested: usize,
        /// Cells still free.
        available: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::{AgentMode, CellCoord, ConfigError, SimulationConfig};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn chebyshev_distance_counts_diagonal_steps() {
        let origin = CellCoord::new(1, 1);
        assert_eq!(origin.chebyshev_distance(CellCoord::new(4, 3)), 3);
        assert_eq!(origin.chebyshev_distance(origin), 0);
        assert!(origin.is_adjacent(CellCoord::new(2, 2)));
        assert!(!origin.is_adjacent(origin));
        assert!(!origin.is_adjacent(CellCoord::new(3, 1)));
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_tiny_grid() {
        let config = SimulationConfig {
            width: 2,
            ..SimulationConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::GridTooSmall {
                width: 2,
                height: 20,
                minimum: 3,
            })
        );
    }

    #[test]
    fn validate_rejects_percentages_above_hundred() {
        let config = SimulationConfig {
            obstacle_percentage: 101,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PercentageOutOfRange {
                field: "obstacle_percentage",
                value: 101
            })
        ));
    }

    #[test]
    fn validate_rejects_more_agents_than_interior_cells() {
        let config = SimulationConfig {
            num_agents: 10,
            width: 4,
            height: 4,
            ..SimulationConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotEnoughCellsForAgents {
                requested: 10,
                available: 4,
            })
        );
    }

    #[test]
    fn single_station_mode_accepts_crowded_station() {
        let config = SimulationConfig {
            num_agents: 10,
            width: 3,
            height: 3,
            mode: AgentMode::SingleAgent,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn config_deserializes_with_defaults_for_missing_fields() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{ "width": 12, "mode": "single-agent" }"#).expect("parse");
        assert_eq!(config.width, 12);
        assert_eq!(config.mode, AgentMode::SingleAgent);
        assert_eq!(config.height, SimulationConfig::default().height);
    }
}
