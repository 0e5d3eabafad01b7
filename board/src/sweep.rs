//! Shift sweep resolution.
//!
//! A sweep slides every tile as far as it can travel toward one cardinal
//! direction, pairing equal tiles for fusion along the way. Tiles are
//! processed nearest-destination-edge first so no tile is ever blocked by a
//! neighbour that simply has not moved yet; that ordering is a correctness
//! invariant, not an optimisation.

use tile_fusion_core::{Direction, Event, GridCoord, TileId};

use crate::{Board, MergePair};

pub(crate) fn resolve_shift(board: &mut Board, direction: Direction, out_events: &mut Vec<Event>) {
    debug_assert!(
        board.pending_merges.is_empty(),
        "sweep started with unfused merges"
    );

    let mut order: Vec<(GridCoord, TileId)> = board
        .tiles
        .iter()
        .map(|tile| (tile.cell, tile.id))
        .collect();
    order.sort_by_key(|(cell, id)| (cell.column(), cell.row(), *id));
    if direction.is_positive() {
        order.reverse();
    }

    // Targets consumed this sweep; a claimed tile never merges twice.
    let mut claimed_targets: Vec<TileId> = Vec::new();

    for (origin, tile_id) in order {
        let Some(tile) = board.tile(tile_id) else {
            continue;
        };
        let value = tile.value;
        let mut current = origin;
        let mut merge: Option<(TileId, GridCoord)> = None;

        loop {
            let Some(probe) = current.step(direction) else {
                break;
            };
            if !board.size.contains(probe) {
                break;
            }
            match board.occupancy.occupant(probe) {
                None => current = probe,
                Some(neighbour) => {
                    let neighbour_value = board.tile(neighbour).map(|other| other.value);
                    if neighbour_value == Some(value) && !claimed_targets.contains(&neighbour) {
                        merge = Some((neighbour, probe));
                    }
                    // Never probe past an occupied cell, merged or not.
                    break;
                }
            }
        }

        if let Some((target, cell)) = merge {
            // The source vacates its node immediately and shares the
            // target's cell until fusion, so tiles processed later can slide
            // into the space it leaves behind.
            claimed_targets.push(target);
            board.occupancy.vacate(origin);
            if let Some(tile) = board.tile_mut(tile_id) {
                tile.cell = cell;
            }
            board.pending_merges.push(MergePair {
                source: tile_id,
                target,
                cell,
            });
            out_events.push(Event::MergeScheduled {
                source: tile_id,
                target,
                cell,
            });
        } else if current != origin {
            board.occupancy.vacate(origin);
            board.occupancy.occupy(tile_id, current);
            if let Some(tile) = board.tile_mut(tile_id) {
                tile.cell = current;
            }
            out_events.push(Event::TileMoved {
                tile: tile_id,
                from: origin,
                to: current,
            });
        }
    }
}
