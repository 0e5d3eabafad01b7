#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for Tile Fusion.
//!
//! The board owns the fixed set of nodes, the tiles occupying them, and the
//! merges scheduled by the most recent shift sweep. All mutation flows
//! through [`apply`]; read access flows through the [`query`] module.

use tile_fusion_core::{
    BoardSize, Command, Event, GridCoord, PlacementError, TileId, TileValue,
};

mod sweep;

/// Represents the authoritative Tile Fusion board state.
#[derive(Clone, Debug)]
pub struct Board {
    size: BoardSize,
    tiles: Vec<Tile>,
    occupancy: OccupancyGrid,
    pending_merges: Vec<MergePair>,
    next_tile_id: u32,
}

impl Board {
    /// Creates an empty board with the provided dimensions.
    ///
    /// The session validates dimensions before construction, so a board
    /// always contains at least one cell.
    #[must_use]
    pub fn new(size: BoardSize) -> Self {
        Self {
            size,
            tiles: Vec::new(),
            occupancy: OccupancyGrid::new(size),
            pending_merges: Vec::new(),
            next_tile_id: 0,
        }
    }

    fn allocate_tile_id(&mut self) -> TileId {
        let id = TileId::new(self.next_tile_id);
        self.next_tile_id = self.next_tile_id.wrapping_add(1);
        id
    }

    fn tile(&self, tile_id: TileId) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.id == tile_id)
    }

    fn tile_mut(&mut self, tile_id: TileId) -> Option<&mut Tile> {
        self.tiles.iter_mut().find(|tile| tile.id == tile_id)
    }

    fn tile_index(&self, tile_id: TileId) -> Option<usize> {
        self.tiles.iter().position(|tile| tile.id == tile_id)
    }

    fn remove_tile(&mut self, tile_id: TileId) -> Option<Tile> {
        let index = self.tile_index(tile_id)?;
        Some(self.tiles.remove(index))
    }

    fn place_tile(&mut self, cell: GridCoord, value: TileValue, out_events: &mut Vec<Event>) {
        if !self.size.contains(cell) {
            out_events.push(Event::PlacementRejected {
                cell,
                reason: PlacementError::OutOfBounds,
            });
            return;
        }
        if self.occupancy.occupant(cell).is_some() {
            out_events.push(Event::PlacementRejected {
                cell,
                reason: PlacementError::Occupied,
            });
            return;
        }

        let tile = self.allocate_tile_id();
        self.tiles.push(Tile {
            id: tile,
            value,
            cell,
        });
        self.occupancy.occupy(tile, cell);
        out_events.push(Event::TilePlaced { tile, cell, value });
    }

    fn fuse_merges(&mut self, out_events: &mut Vec<Event>) {
        let pairs: Vec<MergePair> = self.pending_merges.drain(..).collect();
        for pair in pairs {
            assert_eq!(
                self.occupancy.occupant(pair.cell),
                Some(pair.target),
                "merge target does not occupy its fusion cell",
            );

            let Some(_) = self.remove_tile(pair.source) else {
                continue;
            };
            let Some(target) = self.remove_tile(pair.target) else {
                continue;
            };
            self.occupancy.vacate(pair.cell);

            let value = target.value.doubled();
            let tile = self.allocate_tile_id();
            self.tiles.push(Tile {
                id: tile,
                value,
                cell: pair.cell,
            });
            self.occupancy.occupy(tile, pair.cell);

            out_events.push(Event::TilesFused {
                source: pair.source,
                target: pair.target,
                tile,
                cell: pair.cell,
                value,
            });
        }
    }

    fn clear(&mut self, out_events: &mut Vec<Event>) {
        self.tiles.clear();
        self.occupancy.reset();
        self.pending_merges.clear();
        out_events.push(Event::BoardCleared);
    }
}

/// Applies the provided command to the board, mutating state deterministically.
pub fn apply(board: &mut Board, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceTile { cell, value } => board.place_tile(cell, value, out_events),
        Command::Shift { direction } => sweep::resolve_shift(board, direction, out_events),
        Command::FuseMerges => board.fuse_merges(out_events),
        Command::Clear => board.clear(out_events),
    }
}

/// Query functions that provide read-only access to the board state.
pub mod query {
    use super::Board;
    use tile_fusion_core::{BoardSize, GridCoord, TileId, TileValue};

    /// Provides the dimensions the board was constructed with.
    #[must_use]
    pub fn board_size(board: &Board) -> BoardSize {
        board.size
    }

    /// Captures a read-only view of the tiles occupying the board.
    #[must_use]
    pub fn tile_view(board: &Board) -> TileView {
        let mut snapshots: Vec<TileSnapshot> = board
            .tiles
            .iter()
            .map(|tile| TileSnapshot {
                id: tile.id,
                cell: tile.cell,
                value: tile.value,
                merging_into: board
                    .pending_merges
                    .iter()
                    .find(|pair| pair.source == tile.id)
                    .map(|pair| pair.target),
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        TileView { snapshots }
    }

    /// Exposes a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(board: &Board) -> OccupancyView<'_> {
        OccupancyView { board }
    }

    /// Enumerates the currently unoccupied cells in row-major order.
    ///
    /// The fixed order supports uniform sampling without replacement by the
    /// spawning system.
    #[must_use]
    pub fn free_cells(board: &Board) -> Vec<GridCoord> {
        let mut cells = Vec::new();
        for row in 0..board.size.height() {
            for column in 0..board.size.width() {
                let cell = GridCoord::new(column, row);
                if board.occupancy.occupant(cell).is_none() {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// Highest face value present on the board, if any tile exists.
    #[must_use]
    pub fn highest_value(board: &Board) -> Option<TileValue> {
        board.tiles.iter().map(|tile| tile.value).max()
    }

    /// Reports whether a sweep left merges awaiting fusion.
    #[must_use]
    pub fn has_pending_merges(board: &Board) -> bool {
        !board.pending_merges.is_empty()
    }

    /// Read-only snapshot describing all tiles on the board.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct TileView {
        snapshots: Vec<TileSnapshot>,
    }

    impl TileView {
        /// Iterator over the captured tile snapshots in deterministic order.
        pub fn iter(&self) -> impl Iterator<Item = &TileSnapshot> {
            self.snapshots.iter()
        }

        /// Number of tiles captured by the view.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether the board carried no tiles.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<TileSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single tile's state used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TileSnapshot {
        /// Unique identifier assigned to the tile.
        pub id: TileId,
        /// Board cell currently associated with the tile.
        ///
        /// For a tile scheduled to merge this is the fusion cell it shares
        /// with its target until [`FuseMerges`](tile_fusion_core::Command)
        /// resolves the pair.
        pub cell: GridCoord,
        /// Face value carried by the tile.
        pub value: TileValue,
        /// Target the tile merges into once the sweep is finalised.
        pub merging_into: Option<TileId>,
    }

    /// Read-only view into the dense occupancy grid.
    #[derive(Clone, Copy, Debug)]
    pub struct OccupancyView<'a> {
        board: &'a Board,
    }

    impl OccupancyView<'_> {
        /// Returns the tile occupying the provided cell, if any.
        ///
        /// Out-of-bounds coordinates yield `None`; callers treat that as the
        /// edge of the board.
        #[must_use]
        pub fn occupant(&self, cell: GridCoord) -> Option<TileId> {
            self.board.occupancy.occupant(cell)
        }

        /// Reports whether the cell exists and is currently free.
        #[must_use]
        pub fn is_free(&self, cell: GridCoord) -> bool {
            self.board.size.contains(cell) && self.board.occupancy.occupant(cell).is_none()
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Tile {
    id: TileId,
    value: TileValue,
    cell: GridCoord,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct MergePair {
    source: TileId,
    target: TileId,
    cell: GridCoord,
}

#[derive(Clone, Debug)]
struct OccupancyGrid {
    size: BoardSize,
    cells: Vec<Option<TileId>>,
}

impl OccupancyGrid {
    fn new(size: BoardSize) -> Self {
        let capacity = usize::try_from(size.cell_count()).unwrap_or(0);
        Self {
            size,
            cells: vec![None; capacity],
        }
    }

    fn reset(&mut self) {
        self.cells.fill(None);
    }

    fn occupant(&self, cell: GridCoord) -> Option<TileId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    fn occupy(&mut self, tile_id: TileId, cell: GridCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                debug_assert!(slot.is_none(), "occupying an already occupied cell");
                *slot = Some(tile_id);
            }
        }
    }

    fn vacate(&mut self, cell: GridCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = None;
            }
        }
    }

    fn index(&self, cell: GridCoord) -> Option<usize> {
        if !self.size.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.size.width()).ok()?;
        Some(row * width + column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_fusion_core::Direction;

    fn board_4x4() -> Board {
        Board::new(BoardSize::new(4, 4))
    }

    fn place(board: &mut Board, column: u32, row: u32, value: u32) -> TileId {
        let mut events = Vec::new();
        apply(
            board,
            Command::PlaceTile {
                cell: GridCoord::new(column, row),
                value: TileValue::new(value),
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::TilePlaced { tile, .. }] => *tile,
            other => panic!("expected a placement event, got {other:?}"),
        }
    }

    #[test]
    fn placement_fills_a_free_cell() {
        let mut board = board_4x4();
        let tile = place(&mut board, 1, 2, 2);

        let view = query::occupancy_view(&board);
        assert_eq!(view.occupant(GridCoord::new(1, 2)), Some(tile));
        assert!(!view.is_free(GridCoord::new(1, 2)));
        assert!(view.is_free(GridCoord::new(0, 0)));
        assert!(!view.is_free(GridCoord::new(4, 4)));
        assert_eq!(query::free_cells(&board).len(), 15);
    }

    #[test]
    fn placement_rejects_occupied_cells() {
        let mut board = board_4x4();
        let _ = place(&mut board, 0, 0, 2);

        let mut events = Vec::new();
        apply(
            &mut board,
            Command::PlaceTile {
                cell: GridCoord::new(0, 0),
                value: TileValue::FOUR,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::PlacementRejected {
                cell: GridCoord::new(0, 0),
                reason: PlacementError::Occupied,
            }]
        );
        assert_eq!(query::tile_view(&board).len(), 1);
    }

    #[test]
    fn placement_rejects_out_of_bounds_cells() {
        let mut board = board_4x4();
        let mut events = Vec::new();
        apply(
            &mut board,
            Command::PlaceTile {
                cell: GridCoord::new(4, 0),
                value: TileValue::TWO,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::PlacementRejected {
                cell: GridCoord::new(4, 0),
                reason: PlacementError::OutOfBounds,
            }]
        );
    }

    #[test]
    fn fusing_replaces_a_pair_with_a_doubled_tile() {
        let mut board = board_4x4();
        let target = place(&mut board, 0, 0, 2);
        let source = place(&mut board, 1, 0, 2);

        let mut events = Vec::new();
        apply(
            &mut board,
            Command::Shift {
                direction: Direction::Left,
            },
            &mut events,
        );
        assert!(query::has_pending_merges(&board));

        events.clear();
        apply(&mut board, Command::FuseMerges, &mut events);

        let [Event::TilesFused {
            source: fused_source,
            target: fused_target,
            cell,
            value,
            ..
        }] = events.as_slice()
        else {
            panic!("expected exactly one fusion event, got {events:?}");
        };
        assert_eq!(*fused_source, source);
        assert_eq!(*fused_target, target);
        assert_eq!(*cell, GridCoord::new(0, 0));
        assert_eq!(*value, TileValue::FOUR);

        let view = query::tile_view(&board);
        assert_eq!(view.len(), 1);
        assert!(!query::has_pending_merges(&board));
        assert_eq!(query::free_cells(&board).len(), 15);
    }

    #[test]
    fn tile_count_never_exceeds_cell_count() {
        let mut board = Board::new(BoardSize::new(2, 2));
        for row in 0..2 {
            for column in 0..2 {
                let _ = place(&mut board, column, row, 2);
            }
        }

        let mut events = Vec::new();
        apply(
            &mut board,
            Command::PlaceTile {
                cell: GridCoord::new(0, 0),
                value: TileValue::TWO,
            },
            &mut events,
        );
        assert!(matches!(events[0], Event::PlacementRejected { .. }));
        assert_eq!(query::tile_view(&board).len(), 4);
        assert!(query::free_cells(&board).is_empty());
    }

    #[test]
    fn clear_empties_the_board() {
        let mut board = board_4x4();
        let _ = place(&mut board, 0, 0, 2);
        let _ = place(&mut board, 3, 3, 4);

        let mut events = Vec::new();
        apply(&mut board, Command::Clear, &mut events);

        assert_eq!(events, vec![Event::BoardCleared]);
        assert!(query::tile_view(&board).is_empty());
        assert_eq!(query::free_cells(&board).len(), 16);
    }

    #[test]
    fn tile_ids_stay_unique_across_clears() {
        let mut board = board_4x4();
        let first = place(&mut board, 0, 0, 2);
        let mut events = Vec::new();
        apply(&mut board, Command::Clear, &mut events);
        let second = place(&mut board, 0, 0, 2);
        assert_ne!(first, second);
    }
}
