//! Immutable analytics snapshots sourced from the authoritative world state.

use cleaning_sim_core::AnalyticsInputs;

use crate::{query, World};

/// Captures the full set of analytics inputs for the current tick.
pub(crate) fn snapshot(world: &World) -> AnalyticsInputs {
    AnalyticsInputs {
        tick: world.tick_index,
        mode: world.mode,
        initial_dirty_cells: world.initial_dirty,
        dirty_cells_remaining: world.dirty_remaining,
        agents: query::agent_view(world),
    }
}
