#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the cleaning simulation.
//!
//! The world owns every cell and occupant. Cleaners are referenced by handle
//! and all mutation after setup is funnelled through [`apply`], which keeps a
//! single writer per command.

mod analytics;
mod grid;
pub mod navigation;
mod setup;

use std::collections::VecDeque;

use cleaning_sim_core::{
    AgentId, AgentMode, AgentState, CellCoord, Command, ConfigError, Event, RejectionReason,
    RestReason, SimulationConfig, StationId, StepPurpose, CHARGE_RATE, MAX_BATTERY,
};
use rand::Rng;
use tracing::trace;

use crate::grid::{Grid, Occupant, OccupantId};

/// Represents the authoritative cleaning world state.
#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    mode: AgentMode,
    stations: Vec<CellCoord>,
    cleaners: Vec<Cleaner>,
    initial_dirty: u32,
    dirty_remaining: u32,
    tick_index: u64,
}

impl World {
    /// Generates a world from the configuration, drawing every random
    /// placement from `rng`.
    ///
    /// Fails without producing a partial world when the configuration cannot
    /// be satisfied.
    pub fn generate<R>(config: &SimulationConfig, rng: &mut R) -> Result<Self, ConfigError>
    where
        R: Rng + ?Sized,
    {
        setup::generate(config, rng)
    }

    /// Starts a hand-built world with no occupants.
    #[must_use]
    pub fn builder(width: u32, height: u32, mode: AgentMode) -> WorldBuilder {
        WorldBuilder::new(width, height, mode)
    }

    fn charge(&mut self, agent: AgentId, out_events: &mut Vec<Event>) {
        let Some(cleaner) = cleaner_slot(&mut self.cleaners, agent) else {
            reject(agent, RejectionReason::UnknownAgent, out_events);
            return;
        };

        if !self.grid.has_station(cleaner.cell) {
            reject(agent, RejectionReason::NotOnStation, out_events);
            return;
        }

        cleaner.battery = cleaner.battery.saturating_add(CHARGE_RATE).min(MAX_BATTERY);
        cleaner.state = AgentState::Charging;
        cleaner.route.invalidate();
        out_events.push(Event::AgentCharged {
            agent,
            battery: cleaner.battery,
        });

        if cleaner.battery == MAX_BATTERY {
            cleaner.returning_to_charge = false;
            out_events.push(Event::ChargeCompleted { agent });
        } else {
            cleaner.returning_to_charge = true;
        }
    }

    fn clean(&mut self, agent: AgentId, out_events: &mut Vec<Event>) {
        let Some(cleaner) = cleaner_slot(&mut self.cleaners, agent) else {
            reject(agent, RejectionReason::UnknownAgent, out_events);
            return;
        };

        if cleaner.battery == 0 {
            reject(agent, RejectionReason::Depleted, out_events);
            return;
        }

        if !self.grid.clean(cleaner.cell) {
            reject(agent, RejectionReason::NothingToClean, out_events);
            return;
        }

        debug_assert!(self.dirty_remaining > 0, "dirty counter underflow");
        self.dirty_remaining = self.dirty_remaining.saturating_sub(1);
        cleaner.cleaned_cells += 1;
        cleaner.battery -= 1;
        cleaner.state = AgentState::Cleaning;
        out_events.push(Event::CellCleaned {
            agent,
            cell: cleaner.cell,
        });
    }

    fn assign_route(
        &mut self,
        agent: AgentId,
        target: CellCoord,
        route: Vec<CellCoord>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(cleaner) = cleaner_slot(&mut self.cleaners, agent) else {
            reject(agent, RejectionReason::UnknownAgent, out_events);
            return;
        };

        let length = route.len();
        cleaner.route.assign(target, route);
        out_events.push(Event::RouteAssigned {
            agent,
            target,
            length,
        });
    }

    fn step_agent(
        &mut self,
        agent: AgentId,
        to: CellCoord,
        purpose: StepPurpose,
        out_events: &mut Vec<Event>,
    ) {
        let Some(cleaner) = cleaner_slot(&mut self.cleaners, agent) else {
            reject(agent, RejectionReason::UnknownAgent, out_events);
            return;
        };

        let from = cleaner.cell;
        let rejection = if !self.grid.contains(to) {
            Some(RejectionReason::OutOfBounds)
        } else if !from.is_adjacent(to) {
            Some(RejectionReason::NotAdjacent)
        } else if !self.grid.is_traversable(to) {
            Some(RejectionReason::Blocked)
        } else if cleaner.battery == 0 {
            Some(RejectionReason::Depleted)
        } else {
            None
        };

        if let Some(reason) = rejection {
            cleaner.route.invalidate();
            reject(agent, reason, out_events);
            return;
        }

        self.grid.relocate(cleaner.occupant, from, to);
        cleaner.cell = to;
        cleaner.battery -= 1;
        cleaner.moves += 1;
        cleaner.visited.insert(to);

        match purpose {
            StepPurpose::Explore => {
                cleaner.state = AgentState::Exploring;
                cleaner.route.invalidate();
            }
            StepPurpose::ReturnToCharge => {
                cleaner.state = AgentState::ReturningToCharge;
                cleaner.returning_to_charge = true;
                cleaner.route.advance(to);
            }
        }

        out_events.push(Event::AgentMoved { agent, from, to });
    }

    fn rest(&mut self, agent: AgentId, reason: RestReason, out_events: &mut Vec<Event>) {
        let Some(cleaner) = cleaner_slot(&mut self.cleaners, agent) else {
            reject(agent, RejectionReason::UnknownAgent, out_events);
            return;
        };

        match reason {
            RestReason::Depleted | RestReason::NoRoute => {
                cleaner.state = AgentState::ReturningToCharge;
                cleaner.returning_to_charge = true;
            }
            RestReason::Boxed => cleaner.state = AgentState::Exploring,
        }

        out_events.push(Event::AgentRested { agent, reason });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });
        }
        Command::ChargeAgent { agent } => world.charge(agent, out_events),
        Command::CleanCell { agent } => world.clean(agent, out_events),
        Command::AssignRoute {
            agent,
            target,
            route,
        } => world.assign_route(agent, target, route, out_events),
        Command::StepAgent { agent, to, purpose } => {
            world.step_agent(agent, to, purpose, out_events)
        }
        Command::RestAgent { agent, reason } => world.rest(agent, reason, out_events),
    }
}

/// Incrementally assembles a world, either from seeded setup or by hand.
#[derive(Debug)]
pub struct WorldBuilder {
    grid: Grid,
    mode: AgentMode,
    stations: Vec<CellCoord>,
    cleaners: Vec<Cleaner>,
    dirty: u32,
}

impl WorldBuilder {
    fn new(width: u32, height: u32, mode: AgentMode) -> Self {
        Self {
            grid: Grid::new(width, height),
            mode,
            stations: Vec::new(),
            cleaners: Vec::new(),
            dirty: 0,
        }
    }

    /// Places an obstacle. Obstacles are exclusive occupants of their cell.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the grid.
    pub fn obstacle(&mut self, cell: CellCoord) {
        debug_assert!(self.grid.is_empty(cell), "obstacle placed on occupied {cell:?}");
        let _ = self.grid.place(cell, Occupant::Obstacle);
    }

    /// Places a charging station and returns its identifier.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the grid.
    pub fn station(&mut self, cell: CellCoord) -> StationId {
        let station = StationId::new(self.stations.len() as u32);
        let _ = self.grid.place(cell, Occupant::Station(station));
        self.stations.push(cell);
        station
    }

    /// Places a floor tile that is dirty or clean.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the grid.
    pub fn floor(&mut self, cell: CellCoord, dirty: bool) {
        let _ = self.grid.place(cell, Occupant::Dirt { dirty });
        if dirty {
            self.dirty += 1;
        }
    }

    /// Places a fully charged cleaner and returns its identifier.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the grid.
    pub fn cleaner(&mut self, cell: CellCoord, home: Option<StationId>) -> AgentId {
        let agent = AgentId::new(self.cleaners.len() as u32);
        let occupant = self.grid.place(cell, Occupant::Cleaner(agent));
        let (width, height) = self.grid.dimensions();
        let mut visited = VisitedCells::new(width, height);
        visited.insert(cell);
        self.cleaners.push(Cleaner {
            occupant,
            cell,
            battery: MAX_BATTERY,
            moves: 0,
            cleaned_cells: 0,
            returning_to_charge: false,
            home,
            state: AgentState::Exploring,
            route: RouteCache::default(),
            visited,
        });
        agent
    }

    /// Overrides the starting battery of a cleaner, clamped to `MAX_BATTERY`.
    pub fn set_battery(&mut self, agent: AgentId, battery: u8) {
        if let Some(cleaner) = cleaner_slot(&mut self.cleaners, agent) {
            cleaner.battery = battery.min(MAX_BATTERY);
        }
    }

    /// Finishes construction.
    #[must_use]
    pub fn build(self) -> World {
        World {
            grid: self.grid,
            mode: self.mode,
            stations: self.stations,
            cleaners: self.cleaners,
            initial_dirty: self.dirty,
            dirty_remaining: self.dirty,
            tick_index: 0,
        }
    }
}

#[derive(Clone, Debug)]
struct Cleaner {
    occupant: OccupantId,
    cell: CellCoord,
    battery: u8,
    moves: u64,
    cleaned_cells: u64,
    returning_to_charge: bool,
    home: Option<StationId>,
    state: AgentState,
    route: RouteCache,
    visited: VisitedCells,
}

/// Route toward a station, reusable until consumed or invalidated.
#[derive(Clone, Debug, Default)]
struct RouteCache {
    target: Option<CellCoord>,
    steps: VecDeque<CellCoord>,
    valid: bool,
}

impl RouteCache {
    fn assign(&mut self, target: CellCoord, route: Vec<CellCoord>) {
        self.target = Some(target);
        self.valid = !route.is_empty();
        self.steps = route.into();
    }

    fn invalidate(&mut self) {
        self.valid = false;
        self.steps.clear();
    }

    fn advance(&mut self, reached: CellCoord) {
        if self.steps.front() != Some(&reached) {
            self.invalidate();
            return;
        }

        let _ = self.steps.pop_front();
        if self.steps.is_empty() {
            self.valid = false;
        }
    }

    fn next_step(&self, target: CellCoord) -> Option<CellCoord> {
        if !self.valid || self.target != Some(target) {
            return None;
        }
        self.steps.front().copied()
    }
}

/// Cells a cleaner has stood on. Dense, so memory is bounded by the grid.
#[derive(Clone, Debug)]
struct VisitedCells {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl VisitedCells {
    fn new(width: u32, height: u32) -> Self {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![false; capacity],
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        Some(row * width + column)
    }

    fn insert(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            self.cells[index] = true;
        }
    }

    fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).map_or(false, |index| self.cells[index])
    }
}

fn cleaner_slot(cleaners: &mut [Cleaner], agent: AgentId) -> Option<&mut Cleaner> {
    usize::try_from(agent.get())
        .ok()
        .and_then(|index| cleaners.get_mut(index))
}

fn reject(agent: AgentId, reason: RejectionReason, out_events: &mut Vec<Event>) {
    trace!(agent = agent.get(), ?reason, "command rejected");
    out_events.push(Event::CommandRejected { agent, reason });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use cleaning_sim_core::{
        AgentId, AgentMode, AgentSnapshot, AgentView, AnalyticsInputs, CellCoord, CellSnapshot,
        OccupantKind, StationId,
    };

    use super::{navigation, Cleaner, World};

    /// Grid width and height in cells.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.grid.dimensions()
    }

    /// Ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Placement mode the world was built with.
    #[must_use]
    pub fn mode(world: &World) -> AgentMode {
        world.mode
    }

    /// Cells surrounding `cell` in enumeration order, clipped at the border.
    #[must_use]
    pub fn neighbors(world: &World, cell: CellCoord) -> Vec<CellCoord> {
        world.grid.neighbors(cell).collect()
    }

    /// Kinds of occupant on the cell, sorted by kind.
    #[must_use]
    pub fn occupants(world: &World, cell: CellCoord) -> Vec<OccupantKind> {
        let mut kinds: Vec<OccupantKind> = world
            .grid
            .occupants(cell)
            .map(|occupant| occupant.kind())
            .collect();
        kinds.sort();
        kinds
    }

    /// Reports whether a cleaner may currently enter the cell.
    ///
    /// Only obstacles block; stations, floor tiles and other cleaners do not.
    #[must_use]
    pub fn is_traversable(world: &World, cell: CellCoord) -> bool {
        world.grid.is_traversable(cell)
    }

    /// Reports whether the cell hosts a floor tile that is still dirty.
    #[must_use]
    pub fn is_dirty(world: &World, cell: CellCoord) -> bool {
        world.grid.dirt(cell) == Some(true)
    }

    /// Reports whether the cell hosts a charging station.
    #[must_use]
    pub fn has_station(world: &World, cell: CellCoord) -> bool {
        world.grid.has_station(cell)
    }

    /// Describes a single cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn cell_snapshot(world: &World, cell: CellCoord) -> Option<CellSnapshot> {
        if !world.grid.contains(cell) {
            return None;
        }

        Some(CellSnapshot {
            cell,
            occupants: occupants(world, cell),
            dirty: world.grid.dirt(cell),
            station: world.grid.station_at(cell),
            agents: world.grid.cleaners_at(cell),
        })
    }

    /// Describes every cell in row-major order.
    pub fn cells(world: &World) -> impl Iterator<Item = CellSnapshot> + '_ {
        let (width, height) = world.grid.dimensions();
        (0..height)
            .flat_map(move |row| (0..width).map(move |column| CellCoord::new(column, row)))
            .filter_map(move |cell| cell_snapshot(world, cell))
    }

    /// Cells hosting charging stations, indexed by station identifier.
    #[must_use]
    pub fn stations(world: &World) -> &[CellCoord] {
        &world.stations
    }

    /// Cell of the given station.
    #[must_use]
    pub fn station_cell(world: &World, station: StationId) -> Option<CellCoord> {
        let index = usize::try_from(station.get()).ok()?;
        world.stations.get(index).copied()
    }

    /// Identifiers of every cleaner in ascending order.
    #[must_use]
    pub fn agent_ids(world: &World) -> Vec<AgentId> {
        (0..world.cleaners.len())
            .map(|index| AgentId::new(index as u32))
            .collect()
    }

    /// Snapshot of a single cleaner.
    #[must_use]
    pub fn agent(world: &World, agent: AgentId) -> Option<AgentSnapshot> {
        let index = usize::try_from(agent.get()).ok()?;
        world
            .cleaners
            .get(index)
            .map(|cleaner| snapshot(agent, cleaner))
    }

    /// Captures a read-only view of every cleaner.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        let snapshots = world
            .cleaners
            .iter()
            .enumerate()
            .map(|(index, cleaner)| snapshot(AgentId::new(index as u32), cleaner))
            .collect();
        AgentView::from_snapshots(snapshots)
    }

    /// Reports whether the cleaner has ever stood on the cell.
    #[must_use]
    pub fn has_visited(world: &World, agent: AgentId, cell: CellCoord) -> bool {
        usize::try_from(agent.get())
            .ok()
            .and_then(|index| world.cleaners.get(index))
            .map_or(false, |cleaner| cleaner.visited.contains(cell))
    }

    /// Next cached step toward `target`, provided the cache is valid for that
    /// target and the step is adjacent to the cleaner.
    #[must_use]
    pub fn route_step(world: &World, agent: AgentId, target: CellCoord) -> Option<CellCoord> {
        let index = usize::try_from(agent.get()).ok()?;
        let cleaner = world.cleaners.get(index)?;
        cleaner
            .route
            .next_step(target)
            .filter(|step| cleaner.cell.is_adjacent(*step))
    }

    /// Shortest route between two cells over the cells traversable right now.
    #[must_use]
    pub fn shortest_path(world: &World, from: CellCoord, to: CellCoord) -> Vec<CellCoord> {
        let (width, height) = world.grid.dimensions();
        navigation::shortest_path(width, height, from, to, |cell| {
            world.grid.is_traversable(cell)
        })
    }

    /// Dirty cells still waiting to be cleaned.
    #[must_use]
    pub fn dirty_cells_remaining(world: &World) -> u32 {
        world.dirty_remaining
    }

    /// Dirty cells present when setup finished.
    #[must_use]
    pub fn initial_dirty_cells(world: &World) -> u32 {
        world.initial_dirty
    }

    /// Captures everything the statistics collector needs for one tick.
    #[must_use]
    pub fn analytics_inputs(world: &World) -> AnalyticsInputs {
        super::analytics::snapshot(world)
    }

    fn snapshot(id: AgentId, cleaner: &Cleaner) -> AgentSnapshot {
        debug_assert!(cleaner.battery <= cleaning_sim_core::MAX_BATTERY);
        AgentSnapshot {
            id,
            cell: cleaner.cell,
            battery: cleaner.battery,
            moves: cleaner.moves,
            cleaned_cells: cleaner.cleaned_cells,
            returning_to_charge: cleaner.returning_to_charge,
            home: cleaner.home,
            state: cleaner.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleaning_sim_core::OccupantKind;

    fn corridor() -> (World, AgentId, StationId) {
        let mut builder = World::builder(6, 3, AgentMode::MultiAgent);
        for column in 0..6 {
            builder.obstacle(CellCoord::new(column, 0));
            builder.obstacle(CellCoord::new(column, 2));
        }
        builder.obstacle(CellCoord::new(0, 1));
        builder.obstacle(CellCoord::new(5, 1));
        let station = builder.station(CellCoord::new(1, 1));
        builder.floor(CellCoord::new(2, 1), true);
        builder.floor(CellCoord::new(3, 1), false);
        builder.floor(CellCoord::new(4, 1), true);
        let agent = builder.cleaner(CellCoord::new(2, 1), Some(station));
        (builder.build(), agent, station)
    }

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    #[test]
    fn tick_advances_counter() {
        let (mut world, _, _) = corridor();
        assert_eq!(run(&mut world, Command::Tick), vec![Event::TimeAdvanced { tick: 1 }]);
        assert_eq!(query::tick_index(&world), 1);
    }

    #[test]
    fn cleaning_consumes_battery_and_dirt() {
        let (mut world, agent, _) = corridor();
        let events = run(&mut world, Command::CleanCell { agent });

        assert_eq!(
            events,
            vec![Event::CellCleaned {
                agent,
                cell: CellCoord::new(2, 1)
            }]
        );
        let snapshot = query::agent(&world, agent).expect("agent");
        assert_eq!(snapshot.battery, 99);
        assert_eq!(snapshot.cleaned_cells, 1);
        assert_eq!(snapshot.state, AgentState::Cleaning);
        assert_eq!(query::dirty_cells_remaining(&world), 1);
        assert_eq!(query::initial_dirty_cells(&world), 2);

        let repeat = run(&mut world, Command::CleanCell { agent });
        assert_eq!(
            repeat,
            vec![Event::CommandRejected {
                agent,
                reason: RejectionReason::NothingToClean
            }]
        );
        assert_eq!(query::dirty_cells_remaining(&world), 1);
    }

    #[test]
    fn step_moves_cleaner_and_records_visit() {
        let (mut world, agent, _) = corridor();
        let to = CellCoord::new(3, 1);
        let events = run(
            &mut world,
            Command::StepAgent {
                agent,
                to,
                purpose: StepPurpose::Explore,
            },
        );

        assert_eq!(
            events,
            vec![Event::AgentMoved {
                agent,
                from: CellCoord::new(2, 1),
                to
            }]
        );
        let snapshot = query::agent(&world, agent).expect("agent");
        assert_eq!(snapshot.cell, to);
        assert_eq!(snapshot.moves, 1);
        assert_eq!(snapshot.battery, 99);
        assert!(query::has_visited(&world, agent, to));
        assert!(query::has_visited(&world, agent, CellCoord::new(2, 1)));
        assert!(!query::has_visited(&world, agent, CellCoord::new(4, 1)));
        assert_eq!(
            query::occupants(&world, to),
            vec![OccupantKind::DirtyCell, OccupantKind::Cleaner]
        );
    }

    #[test]
    fn step_into_obstacle_is_rejected() {
        let (mut world, agent, _) = corridor();
        let events = run(
            &mut world,
            Command::StepAgent {
                agent,
                to: CellCoord::new(2, 0),
                purpose: StepPurpose::Explore,
            },
        );

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                agent,
                reason: RejectionReason::Blocked
            }]
        );
        assert_eq!(query::agent(&world, agent).expect("agent").moves, 0);
    }

    #[test]
    fn step_must_be_adjacent() {
        let (mut world, agent, _) = corridor();
        let events = run(
            &mut world,
            Command::StepAgent {
                agent,
                to: CellCoord::new(4, 1),
                purpose: StepPurpose::Explore,
            },
        );
        assert_eq!(
            events,
            vec![Event::CommandRejected {
                agent,
                reason: RejectionReason::NotAdjacent
            }]
        );
    }

    #[test]
    fn route_cache_is_consumed_step_by_step() {
        let (mut world, agent, _) = corridor();
        let _ = run(
            &mut world,
            Command::StepAgent {
                agent,
                to: CellCoord::new(3, 1),
                purpose: StepPurpose::Explore,
            },
        );

        let target = CellCoord::new(1, 1);
        let route = query::shortest_path(&world, CellCoord::new(3, 1), target);
        assert_eq!(route, vec![CellCoord::new(2, 1), target]);

        let _ = run(
            &mut world,
            Command::AssignRoute {
                agent,
                target,
                route,
            },
        );
        assert_eq!(
            query::route_step(&world, agent, target),
            Some(CellCoord::new(2, 1))
        );
        assert_eq!(query::route_step(&world, agent, CellCoord::new(4, 1)), None);

        let _ = run(
            &mut world,
            Command::StepAgent {
                agent,
                to: CellCoord::new(2, 1),
                purpose: StepPurpose::ReturnToCharge,
            },
        );
        assert_eq!(query::route_step(&world, agent, target), Some(target));
        let snapshot = query::agent(&world, agent).expect("agent");
        assert!(snapshot.returning_to_charge);
        assert_eq!(snapshot.state, AgentState::ReturningToCharge);

        let _ = run(
            &mut world,
            Command::StepAgent {
                agent,
                to: target,
                purpose: StepPurpose::ReturnToCharge,
            },
        );
        assert_eq!(query::route_step(&world, agent, target), None);
    }

    #[test]
    fn exploring_step_invalidates_route() {
        let (mut world, agent, _) = corridor();
        let target = CellCoord::new(1, 1);
        let _ = run(
            &mut world,
            Command::AssignRoute {
                agent,
                target,
                route: vec![target],
            },
        );
        let _ = run(
            &mut world,
            Command::StepAgent {
                agent,
                to: CellCoord::new(3, 1),
                purpose: StepPurpose::Explore,
            },
        );
        assert_eq!(query::route_step(&world, agent, target), None);
    }

    #[test]
    fn charging_caps_battery_and_clears_flag_when_full() {
        let mut builder = World::builder(3, 3, AgentMode::SingleAgent);
        let station = builder.station(CellCoord::new(1, 1));
        let agent = builder.cleaner(CellCoord::new(1, 1), Some(station));
        builder.set_battery(agent, 93);
        let mut world = builder.build();

        let first = run(&mut world, Command::ChargeAgent { agent });
        assert_eq!(first, vec![Event::AgentCharged { agent, battery: 98 }]);
        let snapshot = query::agent(&world, agent).expect("agent");
        assert!(snapshot.returning_to_charge);
        assert_eq!(snapshot.state, AgentState::Charging);

        let second = run(&mut world, Command::ChargeAgent { agent });
        assert_eq!(
            second,
            vec![
                Event::AgentCharged {
                    agent,
                    battery: 100
                },
                Event::ChargeCompleted { agent }
            ]
        );
        assert!(!query::agent(&world, agent).expect("agent").returning_to_charge);
    }

    #[test]
    fn charging_requires_station() {
        let (mut world, agent, _) = corridor();
        let events = run(&mut world, Command::ChargeAgent { agent });
        assert_eq!(
            events,
            vec![Event::CommandRejected {
                agent,
                reason: RejectionReason::NotOnStation
            }]
        );
    }

    #[test]
    fn depleted_cleaner_cannot_move() {
        let (mut world, agent, _) = corridor();
        let mut builder = World::builder(3, 3, AgentMode::MultiAgent);
        let stranded = builder.cleaner(CellCoord::new(0, 0), None);
        builder.set_battery(stranded, 0);
        let mut empty = builder.build();
        let events = run(
            &mut empty,
            Command::StepAgent {
                agent: stranded,
                to: CellCoord::new(1, 1),
                purpose: StepPurpose::Explore,
            },
        );
        assert_eq!(
            events,
            vec![Event::CommandRejected {
                agent: stranded,
                reason: RejectionReason::Depleted
            }]
        );

        let unknown = run(
            &mut world,
            Command::CleanCell {
                agent: AgentId::new(agent.get() + 5),
            },
        );
        assert!(matches!(
            unknown.as_slice(),
            [Event::CommandRejected {
                reason: RejectionReason::UnknownAgent,
                ..
            }]
        ));
    }

    #[test]
    fn queries_report_layout_parameters() {
        let (world, _, _) = corridor();
        assert_eq!(query::dimensions(&world), (6, 3));
        assert_eq!(query::mode(&world), AgentMode::MultiAgent);

        let single = World::builder(4, 5, AgentMode::SingleAgent).build();
        assert_eq!(query::dimensions(&single), (4, 5));
        assert_eq!(query::mode(&single), AgentMode::SingleAgent);
    }

    #[test]
    fn cell_snapshot_lists_agents_and_station() {
        let (world, agent, station) = corridor();
        let home = query::cell_snapshot(&world, CellCoord::new(1, 1)).expect("cell");
        assert_eq!(home.station, Some(station));
        assert_eq!(home.dirty, None);

        let occupied = query::cell_snapshot(&world, CellCoord::new(2, 1)).expect("cell");
        assert_eq!(occupied.agents, vec![agent]);
        assert_eq!(occupied.dirty, Some(true));
        assert!(query::cell_snapshot(&world, CellCoord::new(9, 9)).is_none());
        assert_eq!(query::cells(&world).count(), 18);
    }
}
