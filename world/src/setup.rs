//! Seeded world generation: border, stations, obstacles, dirt, cleaners.

use cleaning_sim_core::{
    AgentMode, CellCoord, ConfigError, OccupantKind, SimulationConfig, SINGLE_STATION_CELL,
};
use rand::{seq::index, Rng};

use crate::{World, WorldBuilder};

/// Builds a world from the configuration, drawing every placement from `rng`.
///
/// Percentages are converted against the interior cells still free at each
/// placement stage, so `100` fills every remaining cell.
pub(crate) fn generate<R>(config: &SimulationConfig, rng: &mut R) -> Result<World, ConfigError>
where
    R: Rng + ?Sized,
{
    config.validate()?;

    let (width, height) = (config.width, config.height);
    let mut builder = WorldBuilder::new(width, height, config.mode);
    let mut pool: Vec<CellCoord> = Vec::new();

    for row in 0..height {
        for column in 0..width {
            let cell = CellCoord::new(column, row);
            if column == 0 || row == 0 || column == width - 1 || row == height - 1 {
                builder.obstacle(cell);
            } else {
                pool.push(cell);
            }
        }
    }

    let agent_count = usize::try_from(config.num_agents).unwrap_or(usize::MAX);
    match config.mode {
        AgentMode::MultiAgent => {
            let cells = take_random(&mut pool, agent_count, OccupantKind::ChargingStation, rng)?;
            for cell in cells {
                let station = builder.station(cell);
                let _ = builder.cleaner(cell, Some(station));
            }
        }
        AgentMode::SingleAgent => {
            pool.retain(|cell| *cell != SINGLE_STATION_CELL);
            let _ = builder.station(SINGLE_STATION_CELL);
            for _ in 0..agent_count {
                let _ = builder.cleaner(SINGLE_STATION_CELL, None);
            }
        }
    }

    let obstacle_count = share(pool.len(), config.obstacle_percentage);
    for cell in take_random(&mut pool, obstacle_count, OccupantKind::Obstacle, rng)? {
        builder.obstacle(cell);
    }

    let dirty_count = share(pool.len(), config.dirty_percentage);
    for cell in take_random(&mut pool, dirty_count, OccupantKind::DirtyCell, rng)? {
        builder.floor(cell, true);
    }
    for cell in pool {
        builder.floor(cell, false);
    }

    Ok(builder.build())
}

fn share(available: usize, percentage: u32) -> usize {
    let percentage = usize::try_from(percentage).unwrap_or(usize::MAX);
    available.saturating_mul(percentage) / 100
}

/// Removes `count` distinct random cells from the pool, preserving the order
/// of the cells left behind.
fn take_random<R>(
    pool: &mut Vec<CellCoord>,
    count: usize,
    kind: OccupantKind,
    rng: &mut R,
) -> Result<Vec<CellCoord>, ConfigError>
where
    R: Rng + ?Sized,
{
    if count > pool.len() {
        return Err(ConfigError::InsufficientCells {
            kind,
            requested: count,
            available: pool.len(),
        });
    }

    let mut picked = vec![false; pool.len()];
    let mut chosen = Vec::with_capacity(count);
    for position in index::sample(rng, pool.len(), count).iter() {
        picked[position] = true;
        chosen.push(pool[position]);
    }

    let mut position = 0;
    pool.retain(|_| {
        let keep = !picked[position];
        position += 1;
        keep
    });

    Ok(chosen)
}
