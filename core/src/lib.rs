#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tile Fusion engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative board, and pure systems. Systems and the session submit
//! [`Command`] values describing desired mutations, the board executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing exactly what changed. Presentation layers consume events and
//! immutable snapshots; they never mutate the board directly.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that express all permissible board mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests placement of a fresh tile on the provided cell.
    PlaceTile {
        /// Cell the tile should occupy after placement.
        cell: GridCoord,
        /// Face value assigned to the placed tile.
        value: TileValue,
    },
    /// Requests a full shift sweep toward the provided direction.
    Shift {
        /// Cardinal direction every tile slides toward.
        direction: Direction,
    },
    /// Finalises every merge scheduled by the preceding shift sweep.
    FuseMerges,
    /// Removes every tile from the board.
    Clear,
}

/// Events broadcast by the board after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a fresh tile was placed on the board.
    TilePlaced {
        /// Identifier assigned to the tile by the board.
        tile: TileId,
        /// Cell the tile occupies after placement.
        cell: GridCoord,
        /// Face value carried by the tile.
        value: TileValue,
    },
    /// Reports that a tile placement request was rejected.
    PlacementRejected {
        /// Cell provided in the placement request.
        cell: GridCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tile slid between two cells during a sweep.
    TileMoved {
        /// Identifier of the tile that moved.
        tile: TileId,
        /// Cell the tile occupied before the sweep.
        from: GridCoord,
        /// Cell the tile settled on after the sweep.
        to: GridCoord,
    },
    /// Announces that two equal tiles were paired for fusion.
    MergeScheduled {
        /// Tile that slid into the pair and will be consumed.
        source: TileId,
        /// Stationary tile the source merges into.
        target: TileId,
        /// Cell where the fused tile will appear.
        cell: GridCoord,
    },
    /// Confirms that a scheduled merge was finalised into a fresh tile.
    TilesFused {
        /// Tile consumed as the moving half of the pair.
        source: TileId,
        /// Tile consumed as the stationary half of the pair.
        target: TileId,
        /// Identifier assigned to the fused replacement tile.
        tile: TileId,
        /// Cell the fused tile occupies.
        cell: GridCoord,
        /// Doubled face value carried by the fused tile.
        value: TileValue,
    },
    /// Confirms that every tile was removed from the board.
    BoardCleared,
}

/// Cardinal directions a shift sweep can travel toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing row indices.
    Up,
    /// Movement toward decreasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in a fixed, deterministic order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Signed per-step column and row deltas for the direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Reports whether the direction points toward increasing coordinates.
    ///
    /// Positive directions require the sweep to process tiles in reverse
    /// coordinate order so the tile nearest the destination edge moves first.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Up | Self::Right)
    }
}

/// Unique identifier assigned to a tile for its lifetime on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    /// Creates a new tile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Face value carried by a tile, always a positive power of two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileValue(u32);

impl TileValue {
    /// The common spawn value.
    pub const TWO: TileValue = TileValue::new(2);
    /// The rare spawn value.
    pub const FOUR: TileValue = TileValue::new(4);

    /// Creates a new tile value wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying face value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Value produced when two tiles of this value fuse.
    #[must_use]
    pub const fn doubled(self) -> TileValue {
        TileValue(self.0.saturating_mul(2))
    }
}

/// Location of a single board cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    column: u32,
    row: u32,
}

impl GridCoord {
    /// Creates a new board cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Coordinate one cell away in the provided direction.
    ///
    /// Returns `None` when the step would cross the zero edge; crossing the
    /// upper edge is the board's bounds check, not the coordinate's.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<GridCoord> {
        let (column_delta, row_delta) = direction.offset();
        let column = self.column.checked_add_signed(column_delta)?;
        let row = self.row.checked_add_signed(row_delta)?;
        Some(GridCoord::new(column, row))
    }
}

/// Dimensions of the board measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSize {
    width: u32,
    height: u32,
}

impl BoardSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns contained in the board.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows contained in the board.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells contained in the board.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Reports whether the coordinate falls inside the board.
    #[must_use]
    pub const fn contains(&self, cell: GridCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }
}

/// Reasons a tile placement request may be rejected by the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies beyond the configured board bounds.
    OutOfBounds,
    /// The requested cell already carries a tile.
    Occupied,
}

/// Lifecycle states a game session moves through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// The board is being constructed.
    GeneratingLevel,
    /// Fresh tiles are being placed onto free cells.
    SpawningTiles,
    /// The session waits for a directional input.
    WaitingInput,
    /// A shift sweep ran and its animations have not completed yet.
    Moving,
    /// A tile reached the winning value; no further input is accepted.
    Win,
    /// The board filled up; no further input is accepted.
    Lose,
}

impl GameState {
    /// Reports whether the session has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Win | Self::Lose)
    }
}

/// Visual appearance applied to a tile face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl BlockColor {
    /// Creates a new block color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Display attributes resolved for a single tile value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockStyle {
    /// Face color drawn behind the label.
    pub color: BlockColor,
    /// Text label rendered on the tile face.
    pub label: String,
}

/// Static mapping from tile values to their display colors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockPalette {
    entries: Vec<(TileValue, BlockColor)>,
}

impl Default for BlockPalette {
    fn default() -> Self {
        Self {
            entries: vec![
                (TileValue::new(2), BlockColor::from_rgb(0xee, 0xe4, 0xda)),
                (TileValue::new(4), BlockColor::from_rgb(0xed, 0xe0, 0xc8)),
                (TileValue::new(8), BlockColor::from_rgb(0xf2, 0xb1, 0x79)),
                (TileValue::new(16), BlockColor::from_rgb(0xf5, 0x95, 0x63)),
                (TileValue::new(32), BlockColor::from_rgb(0xf6, 0x7c, 0x5f)),
                (TileValue::new(64), BlockColor::from_rgb(0xf6, 0x5e, 0x3b)),
                (TileValue::new(128), BlockColor::from_rgb(0xed, 0xcf, 0x72)),
                (TileValue::new(256), BlockColor::from_rgb(0xed, 0xcc, 0x61)),
                (TileValue::new(512), BlockColor::from_rgb(0xed, 0xc8, 0x50)),
                (TileValue::new(1024), BlockColor::from_rgb(0xed, 0xc5, 0x3f)),
                (TileValue::new(2048), BlockColor::from_rgb(0xed, 0xc2, 0x2e)),
            ],
        }
    }
}

impl BlockPalette {
    /// Creates a palette from explicit value and color pairs.
    ///
    /// Entries are sorted by value so lookups can clamp deterministically.
    #[must_use]
    pub fn from_entries(mut entries: Vec<(TileValue, BlockColor)>) -> Self {
        entries.sort_by_key(|(value, _)| *value);
        Self { entries }
    }

    /// Resolves the display style for the provided tile value.
    ///
    /// Values beyond the mapped ladder reuse the final entry's color so
    /// runaway tiles keep rendering rather than falling off the palette.
    #[must_use]
    pub fn style_for(&self, value: TileValue) -> BlockStyle {
        let color = self
            .entries
            .iter()
            .find(|(entry_value, _)| *entry_value == value)
            .or_else(|| self.entries.last())
            .map_or(BlockColor::from_rgb(0xcd, 0xc1, 0xb4), |(_, color)| *color);
        BlockStyle {
            color,
            label: value.get().to_string(),
        }
    }
}

/// Configuration supplied once when a game session starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Number of board columns.
    pub width: u32,
    /// Number of board rows.
    pub height: u32,
    /// Face value a tile must reach for the session to be won.
    pub win_value: TileValue,
    /// Duration presentation layers should spend animating one sweep.
    pub travel_time: Duration,
    /// Seed driving every random spawn decision in the session.
    pub rng_seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: 4,
            height: 4,
            win_value: TileValue::new(2048),
            travel_time: Duration::from_millis(200),
            rng_seed: 0,
        }
    }
}

impl SessionConfig {
    /// Checks the configuration for values the session cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        let win = self.win_value.get();
        if win < 4 || !win.is_power_of_two() {
            return Err(ConfigError::UnreachableWinValue { value: win });
        }
        Ok(())
    }
}

/// Errors produced by [`SessionConfig::validate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The board would contain no cells.
    #[error("board dimensions {width}x{height} contain no cells")]
    ZeroDimension {
        /// Configured number of columns.
        width: u32,
        /// Configured number of rows.
        height: u32,
    },
    /// The winning value can never be produced by doubling from two.
    #[error("win value {value} is not reachable by doubling from 2")]
    UnreachableWinValue {
        /// Configured winning value.
        value: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::{
        BlockPalette, BoardSize, ConfigError, Direction, GridCoord, PlacementError, SessionConfig,
        TileId, TileValue,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn tile_id_round_trips_through_bincode() {
        assert_round_trip(&TileId::new(42));
    }

    #[test]
    fn grid_coord_round_trips_through_bincode() {
        assert_round_trip(&GridCoord::new(3, 1));
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::Occupied);
    }

    #[test]
    fn step_crosses_cells_in_every_direction() {
        let origin = GridCoord::new(2, 2);
        assert_eq!(origin.step(Direction::Up), Some(GridCoord::new(2, 3)));
        assert_eq!(origin.step(Direction::Down), Some(GridCoord::new(2, 1)));
        assert_eq!(origin.step(Direction::Left), Some(GridCoord::new(1, 2)));
        assert_eq!(origin.step(Direction::Right), Some(GridCoord::new(3, 2)));
    }

    #[test]
    fn step_stops_at_the_zero_edge() {
        assert_eq!(GridCoord::new(0, 0).step(Direction::Left), None);
        assert_eq!(GridCoord::new(0, 0).step(Direction::Down), None);
    }

    #[test]
    fn board_size_counts_cells_and_checks_bounds() {
        let size = BoardSize::new(4, 3);
        assert_eq!(size.cell_count(), 12);
        assert!(size.contains(GridCoord::new(3, 2)));
        assert!(!size.contains(GridCoord::new(4, 0)));
        assert!(!size.contains(GridCoord::new(0, 3)));
    }

    #[test]
    fn doubling_climbs_the_value_ladder() {
        assert_eq!(TileValue::TWO.doubled(), TileValue::FOUR);
        assert_eq!(TileValue::new(1024).doubled(), TileValue::new(2048));
    }

    #[test]
    fn default_config_passes_validation() {
        SessionConfig::default().validate().expect("default config");
    }

    #[test]
    fn zero_dimension_fails_validation() {
        let config = SessionConfig {
            width: 0,
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroDimension {
                width: 0,
                height: 4
            })
        );
    }

    #[test]
    fn win_value_must_double_up_from_two() {
        for value in [0, 2, 3, 6, 100] {
            let config = SessionConfig {
                win_value: TileValue::new(value),
                ..SessionConfig::default()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigError::UnreachableWinValue { value })
            );
        }
    }

    #[test]
    fn palette_clamps_beyond_the_ladder() {
        let palette = BlockPalette::default();
        let top = palette.style_for(TileValue::new(2048));
        let beyond = palette.style_for(TileValue::new(4096));
        assert_eq!(top.color, beyond.color);
        assert_eq!(beyond.label, "4096");
    }
}
