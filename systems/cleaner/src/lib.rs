#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-cleaner behaviour: charge, return home, clean, or explore.
//!
//! The controller never mutates the world. It reads the current state through
//! [`query`] and proposes commands for a single cleaner turn; the driver applies
//! them before activating the next cleaner.

use cleaning_sim_core::{
    AgentId, AgentSnapshot, CellCoord, Command, RestReason, StepPurpose, LOW_BATTERY_THRESHOLD,
    MAX_BATTERY,
};
use cleaning_sim_world::{query, World};
use rand::{seq::SliceRandom, Rng};

/// Pure system that decides one turn for a cleaner and emits commands.
#[derive(Debug, Default)]
pub struct CleanerController {
    candidates: Vec<CellCoord>,
    preferred: Vec<CellCoord>,
}

impl CleanerController {
    /// Creates a controller with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits the commands for one turn of `agent`.
    ///
    /// Exactly one behaviour is chosen per turn. Unknown agents produce no
    /// commands.
    pub fn handle<R>(&mut self, world: &World, agent: AgentId, rng: &mut R, out: &mut Vec<Command>)
    where
        R: Rng + ?Sized,
    {
        let Some(snapshot) = query::agent(world, agent) else {
            return;
        };

        if query::has_station(world, snapshot.cell) && snapshot.battery < MAX_BATTERY {
            out.push(Command::ChargeAgent { agent });
            return;
        }

        if snapshot.battery <= LOW_BATTERY_THRESHOLD {
            Self::return_to_charge(world, &snapshot, out);
            return;
        }

        if query::is_dirty(world, snapshot.cell) {
            out.push(Command::CleanCell { agent });
            return;
        }

        self.explore(world, &snapshot, rng, out);
    }

    fn return_to_charge(world: &World, snapshot: &AgentSnapshot, out: &mut Vec<Command>) {
        let agent = snapshot.id;
        if snapshot.battery == 0 {
            out.push(Command::RestAgent {
                agent,
                reason: RestReason::Depleted,
            });
            return;
        }

        let Some(target) = select_station(world, snapshot) else {
            out.push(Command::RestAgent {
                agent,
                reason: RestReason::NoRoute,
            });
            return;
        };

        let cached = query::route_step(world, agent, target)
            .filter(|step| query::is_traversable(world, *step));
        let step = match cached {
            Some(step) => step,
            None => {
                let route = query::shortest_path(world, snapshot.cell, target);
                let Some(first) = route.first().copied() else {
                    out.push(Command::RestAgent {
                        agent,
                        reason: RestReason::NoRoute,
                    });
                    return;
                };
                out.push(Command::AssignRoute {
                    agent,
                    target,
                    route,
                });
                first
            }
        };

        out.push(Command::StepAgent {
            agent,
            to: step,
            purpose: StepPurpose::ReturnToCharge,
        });
    }

    fn explore<R>(
        &mut self,
        world: &World,
        snapshot: &AgentSnapshot,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        let agent = snapshot.id;
        self.candidates.clear();
        self.candidates.extend(
            query::neighbors(world, snapshot.cell)
                .into_iter()
                .filter(|cell| query::is_traversable(world, *cell)),
        );

        let unvisited = |cell: &CellCoord| !query::has_visited(world, agent, *cell);

        self.preferred.clear();
        self.preferred.extend(
            self.candidates
                .iter()
                .copied()
                .filter(|cell| query::is_dirty(world, *cell)),
        );

        if !self.preferred.is_empty() {
            if self.preferred.iter().any(unvisited) {
                self.preferred.retain(unvisited);
            }
        } else {
            self.preferred
                .extend(self.candidates.iter().copied().filter(unvisited));
            if self.preferred.is_empty() {
                self.preferred.extend_from_slice(&self.candidates);
            }
        }

        match self.preferred.choose(rng) {
            Some(&to) => out.push(Command::StepAgent {
                agent,
                to,
                purpose: StepPurpose::Explore,
            }),
            None => out.push(Command::RestAgent {
                agent,
                reason: RestReason::Boxed,
            }),
        }
    }
}

/// Picks the charging station a cleaner heads for: its home station when it
/// still exists, otherwise the Manhattan-nearest one (lowest identifier on
/// ties).
#[must_use]
pub fn select_station(world: &World, snapshot: &AgentSnapshot) -> Option<CellCoord> {
    if let Some(home) = snapshot
        .home
        .and_then(|station| query::station_cell(world, station))
    {
        return Some(home);
    }

    query::stations(world)
        .iter()
        .copied()
        .min_by_key(|station| snapshot.cell.manhattan_distance(*station))
}
