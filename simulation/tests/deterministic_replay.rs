use cleaning_sim_core::{AgentMode, SimulationConfig, StatsReport, TickSample};
use cleaning_sim_simulation::Simulation;
use cleaning_sim_world::query;

fn config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        num_agents: 4,
        width: 12,
        height: 12,
        dirty_percentage: 40,
        obstacle_percentage: 15,
        max_time: 400,
        mode: AgentMode::MultiAgent,
        seed,
    }
}

fn replay(config: &SimulationConfig) -> (Vec<TickSample>, StatsReport, Vec<String>) {
    let mut simulation = Simulation::new(config).expect("valid configuration");
    let mut log = Vec::new();
    while simulation.step() {
        log.extend(simulation.events().iter().map(|event| format!("{event:?}")));
    }
    log.extend(simulation.events().iter().map(|event| format!("{event:?}")));
    let report = simulation
        .final_report()
        .cloned()
        .expect("stopped run publishes a report");
    (simulation.history().to_vec(), report, log)
}

#[test]
fn identical_seeds_replay_identically() {
    let first = replay(&config(42));
    let second = replay(&config(42));

    assert_eq!(first.0, second.0, "tick history diverged between runs");
    assert_eq!(first.1, second.1, "final report diverged between runs");
    assert_eq!(first.2, second.2, "event log diverged between runs");
}

#[test]
fn identical_seeds_generate_identical_worlds() {
    let first = Simulation::new(&config(7)).expect("valid configuration");
    let second = Simulation::new(&config(7)).expect("valid configuration");

    let first_cells: Vec<_> = query::cells(first.world()).collect();
    let second_cells: Vec<_> = query::cells(second.world()).collect();
    assert_eq!(first_cells, second_cells);
}

#[test]
fn history_has_one_sample_per_tick() {
    let (history, report, _) = replay(&config(3));

    assert_eq!(history.len() as u64, report.steps);
    for (index, sample) in history.iter().enumerate() {
        assert_eq!(sample.tick, index as u64 + 1);
    }
}
