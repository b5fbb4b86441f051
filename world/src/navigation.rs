//! Shortest-path search over the 8-connected cleaning grid.

use std::{cmp::Reverse, collections::BinaryHeap};

use cleaning_sim_core::CellCoord;

/// Column and row offsets of the eight surrounding cells, in enumeration order.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Enumerates the cells surrounding `cell`, clipped at the grid edges.
///
/// The order is fixed so that path search and movement tie-breaking stay
/// reproducible for a given grid state.
pub fn neighbors(cell: CellCoord, width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
    NEIGHBOR_OFFSETS
        .into_iter()
        .filter_map(move |(column_offset, row_offset)| {
            let column = cell.column().checked_add_signed(column_offset)?;
            let row = cell.row().checked_add_signed(row_offset)?;
            (column < width && row < height).then(|| CellCoord::new(column, row))
        })
}

/// Computes a minimum-step route from `source` to `target` using Dijkstra's
/// algorithm with unit edge weights.
///
/// `is_traversable` is consulted lazily while the frontier expands, so callers
/// pass a predicate that reflects the grid as it is right now. The returned
/// route excludes `source` and ends with `target`. It is empty when the two
/// cells coincide or when no route exists. Equal-cost frontier entries are
/// expanded in insertion order.
pub fn shortest_path<F>(
    width: u32,
    height: u32,
    source: CellCoord,
    target: CellCoord,
    mut is_traversable: F,
) -> Vec<CellCoord>
where
    F: FnMut(CellCoord) -> bool,
{
    if source == target {
        return Vec::new();
    }

    let width_usize = usize::try_from(width).unwrap_or(0);
    let height_usize = usize::try_from(height).unwrap_or(0);
    let cell_count = width_usize.checked_mul(height_usize).unwrap_or(0);

    let (Some(source_index), Some(_)) = (
        index(width_usize, height_usize, source),
        index(width_usize, height_usize, target),
    ) else {
        return Vec::new();
    };

    let mut costs = vec![u32::MAX; cell_count];
    let mut came_from: Vec<Option<CellCoord>> = vec![None; cell_count];
    let mut settled = vec![false; cell_count];
    let mut frontier = BinaryHeap::new();
    let mut sequence: u64 = 0;

    costs[source_index] = 0;
    frontier.push(Reverse((0_u32, sequence, source)));

    while let Some(Reverse((cost, _, cell))) = frontier.pop() {
        let Some(current) = index(width_usize, height_usize, cell) else {
            continue;
        };

        if settled[current] {
            continue;
        }
        settled[current] = true;

        if cell == target {
            return reconstruct(&came_from, width_usize, height_usize, source, target);
        }

        let next_cost = cost.saturating_add(1);
        for neighbor in neighbors(cell, width, height) {
            let Some(neighbor_index) = index(width_usize, height_usize, neighbor) else {
                continue;
            };

            if settled[neighbor_index] || next_cost >= costs[neighbor_index] {
                continue;
            }

            if !is_traversable(neighbor) {
                continue;
            }

            costs[neighbor_index] = next_cost;
            came_from[neighbor_index] = Some(cell);
            sequence += 1;
            frontier.push(Reverse((next_cost, sequence, neighbor)));
        }
    }

    Vec::new()
}

fn reconstruct(
    came_from: &[Option<CellCoord>],
    width: usize,
    height: usize,
    source: CellCoord,
    target: CellCoord,
) -> Vec<CellCoord> {
    let mut route = Vec::new();
    let mut current = target;

    while current != source {
        route.push(current);
        let Some(previous) =
            index(width, height, current).and_then(|offset| came_from[offset])
        else {
            return Vec::new();
        };
        current = previous;
    }

    route.reverse();
    route
}

fn index(width: usize, height: usize, cell: CellCoord) -> Option<usize> {
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    if column >= width || row >= height {
        return None;
    }
    row.checked_mul(width)?.checked_add(column)
}
