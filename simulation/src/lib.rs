#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded, synchronous driver for the cleaning simulation.
//!
//! One tick advances the clock, activates every cleaner exactly once in a
//! freshly shuffled order, records a statistics sample and evaluates the stop
//! conditions. All randomness after construction comes from a single
//! generator owned by the driver.

use cleaning_sim_core::{
    AgentId, AnalyticsInputs, Command, ConfigError, Event, SimulationConfig, StatsReport,
    StopReason, TickSample,
};
use cleaning_sim_system_analytics::{summarize, Analytics};
use cleaning_sim_system_cleaner::CleanerController;
use cleaning_sim_world::{self as world, query, World};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Owns the world, the generator and the tick loop.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    rng: ChaCha8Rng,
    controller: CleanerController,
    analytics: Analytics,
    max_time: u64,
    running: bool,
    stop_reason: Option<StopReason>,
    activation_order: Vec<AgentId>,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Simulation {
    /// Validates the configuration and generates a seeded world.
    ///
    /// The same generator drives setup and every later tick, so a config
    /// fully determines the run.
    pub fn new(config: &SimulationConfig) -> Result<Self, ConfigError> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let world = World::generate(config, &mut rng)?;
        Ok(Self::from_parts(world, config.max_time, rng))
    }

    /// Drives a hand-built world, seeding the generator for activation order
    /// and movement ties.
    #[must_use]
    pub fn with_world(world: World, max_time: u64, seed: u64) -> Self {
        Self::from_parts(world, max_time, ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_parts(world: World, max_time: u64, rng: ChaCha8Rng) -> Self {
        Self {
            world,
            rng,
            controller: CleanerController::new(),
            analytics: Analytics::new(),
            max_time,
            running: true,
            stop_reason: None,
            activation_order: Vec::new(),
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Advances the simulation by one tick and reports whether it is still
    /// running. A stopped simulation ignores further calls.
    pub fn step(&mut self) -> bool {
        if !self.running {
            return false;
        }

        self.events.clear();
        world::apply(&mut self.world, Command::Tick, &mut self.events);

        self.activation_order.clear();
        self.activation_order
            .extend(query::agent_ids(&self.world));
        self.activation_order.shuffle(&mut self.rng);

        for &agent in &self.activation_order {
            self.commands.clear();
            self.controller
                .handle(&self.world, agent, &mut self.rng, &mut self.commands);
            for command in self.commands.drain(..) {
                world::apply(&mut self.world, command, &mut self.events);
            }
        }

        let inputs = query::analytics_inputs(&self.world);
        self.analytics.handle(&self.events, &inputs);
        debug!(
            tick = inputs.tick,
            dirty_cells = inputs.dirty_cells_remaining,
            events = self.events.len(),
            "tick completed"
        );

        if let Some(reason) = self.stop_condition(&inputs) {
            self.stop(reason, &inputs);
        }

        self.running
    }

    /// Steps until a stop condition holds and returns the final report.
    pub fn run(&mut self) -> StatsReport {
        while self.step() {}
        self.statistics()
    }

    fn stop_condition(&self, inputs: &AnalyticsInputs) -> Option<StopReason> {
        if inputs.dirty_cells_remaining == 0 {
            return Some(StopReason::Cleaned);
        }

        if inputs.tick >= self.max_time {
            return Some(StopReason::TimeLimit);
        }

        let starved = !inputs.agents.is_empty()
            && inputs
                .agents
                .iter()
                .all(|agent| agent.battery == 0 && !query::has_station(&self.world, agent.cell));
        starved.then_some(StopReason::Starvation)
    }

    fn stop(&mut self, reason: StopReason, inputs: &AnalyticsInputs) {
        self.running = false;
        self.stop_reason = Some(reason);
        let report = self.analytics.publish(inputs, Some(reason));
        info!(
            ?reason,
            steps = report.steps,
            completion_time = report.completion_time,
            clean_percentage = report.clean_percentage,
            total_moves = report.total_moves,
            total_cleaned = report.total_cleaned,
            "simulation stopped"
        );
    }

    /// Reports whether another call to [`Simulation::step`] will advance time.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Computes aggregate and per-cleaner statistics for the current tick.
    #[must_use]
    pub fn statistics(&self) -> StatsReport {
        summarize(
            &query::analytics_inputs(&self.world),
            self.analytics.completion_tick(),
            self.stop_reason,
        )
    }

    /// Report computed once when the run stopped.
    #[must_use]
    pub fn final_report(&self) -> Option<&StatsReport> {
        self.analytics.last_report()
    }

    /// One sample per elapsed tick, oldest first.
    #[must_use]
    pub fn history(&self) -> &[TickSample] {
        self.analytics.history()
    }

    /// Read-only access to the world for presentation layers.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Ticks elapsed so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        query::tick_index(&self.world)
    }

    /// First tick at which no dirty cell remained.
    #[must_use]
    pub fn completion_tick(&self) -> Option<u64> {
        self.analytics.completion_tick()
    }

    /// Reason the run stopped, once it has.
    #[must_use]
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Events emitted by the world during the most recent tick.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
