use cleaning_sim_core::{
    AgentStatistics, AgentView, AnalyticsInputs, StatsReport, StopReason, TickSample,
};

/// Share of the initial dirt that has been removed, in percent.
///
/// A world that started clean is reported as fully clean.
#[must_use]
pub fn clean_percentage(initial_dirty: u32, remaining_dirty: u32) -> f64 {
    if initial_dirty == 0 {
        return 100.0;
    }

    let cleaned = initial_dirty.saturating_sub(remaining_dirty);
    f64::from(cleaned) / f64::from(initial_dirty) * 100.0
}

/// Builds the aggregate and per-cleaner report for the provided inputs.
///
/// `completion_tick` is the first tick with no dirty cells; while it is
/// unknown the current tick stands in for it.
#[must_use]
pub fn summarize(
    inputs: &AnalyticsInputs,
    completion_tick: Option<u64>,
    stop_reason: Option<StopReason>,
) -> StatsReport {
    let (total_moves, total_cleaned) = totals(&inputs.agents);

    StatsReport {
        mode: inputs.mode,
        num_agents: inputs.agents.len(),
        steps: inputs.tick,
        completion_time: completion_tick.unwrap_or(inputs.tick),
        dirty_cells_remaining: inputs.dirty_cells_remaining,
        initial_dirty_cells: inputs.initial_dirty_cells,
        total_moves,
        total_cleaned,
        clean_percentage: clean_percentage(
            inputs.initial_dirty_cells,
            inputs.dirty_cells_remaining,
        ),
        stop_reason,
        agents: rows(&inputs.agents),
    }
}

pub(crate) fn sample(inputs: &AnalyticsInputs) -> TickSample {
    let (total_moves, total_cleaned) = totals(&inputs.agents);
    TickSample {
        tick: inputs.tick,
        dirty_cells: inputs.dirty_cells_remaining,
        clean_percentage: clean_percentage(
            inputs.initial_dirty_cells,
            inputs.dirty_cells_remaining,
        ),
        total_moves,
        total_cleaned,
        agents: rows(&inputs.agents),
    }
}

fn rows(agents: &AgentView) -> Vec<AgentStatistics> {
    agents
        .iter()
        .map(|agent| AgentStatistics {
            agent_id: agent.id,
            moves: agent.moves,
            cleaned_cells: agent.cleaned_cells,
            battery: agent.battery,
            state: agent.state,
            cell: agent.cell,
        })
        .collect()
}

fn totals(agents: &AgentView) -> (u64, u64) {
    agents.iter().fold((0, 0), |(moves, cleaned), agent| {
        (moves + agent.moves, cleaned + agent.cleaned_cells)
    })
}
