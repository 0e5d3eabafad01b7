#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session state machine for Tile Fusion.
//!
//! A session strings the board and the spawning system together behind a
//! strict lifecycle: `GeneratingLevel` builds the board, `SpawningTiles`
//! places fresh tiles and evaluates the terminal conditions, `WaitingInput`
//! accepts exactly one directional input, and `Moving` holds the sweep open
//! until the presentation layer reports its animations finished. All of it
//! is synchronous; the only suspension point is the explicit
//! [`GameSession::animation_complete`] handshake.

use std::{collections::HashMap, time::Duration};

use tile_fusion_board::{self as board, query, Board};
use tile_fusion_core::{
    BoardSize, Command, ConfigError, Direction, Event, GameState, GridCoord, SessionConfig, TileId,
};
use tile_fusion_system_spawning::Spawning;

/// Number of tiles placed when a session first enters `SpawningTiles`.
const FIRST_SPAWN_AMOUNT: usize = 2;
/// Number of tiles placed on every later pass through `SpawningTiles`.
const REFILL_SPAWN_AMOUNT: usize = 1;

/// One complete Tile Fusion game from level generation to a terminal state.
#[derive(Clone, Debug)]
pub struct GameSession {
    config: SessionConfig,
    board: Board,
    spawning: Spawning,
    state: GameState,
    round: u32,
    pending_sweep: Option<PendingSweep>,
}

impl GameSession {
    /// Builds the board, spawns the opening tiles, and readies the session
    /// for input.
    ///
    /// Fails fast when the configuration is invalid; a constructed session
    /// never revalidates.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut session = Self {
            config,
            board: Board::new(BoardSize::new(config.width, config.height)),
            spawning: Spawning::from_seed(config.rng_seed),
            state: GameState::GeneratingLevel,
            round: 0,
            pending_sweep: None,
        };
        session.enter_spawning();
        Ok(session)
    }

    /// Current lifecycle state of the session.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Configuration the session was started with.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Read-only access to the authoritative board for presentation queries.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Runs a shift sweep for the provided direction.
    ///
    /// Returns `None` unless the session is waiting for input; terminal
    /// states and an in-flight sweep both reject the request. A sweep that
    /// moves nothing is still a complete sweep: the session enters `Moving`
    /// and expects [`GameSession::animation_complete`] before it spawns the
    /// next tile.
    pub fn submit_direction(&mut self, direction: Direction) -> Option<SweepReport> {
        if self.state != GameState::WaitingInput {
            return None;
        }

        let origins: HashMap<TileId, GridCoord> = query::tile_view(&self.board)
            .iter()
            .map(|tile| (tile.id, tile.cell))
            .collect();

        let mut events = Vec::new();
        board::apply(&mut self.board, Command::Shift { direction }, &mut events);

        let mut moves = Vec::new();
        let mut merges = Vec::new();
        for event in &events {
            match event {
                Event::TileMoved { tile, from, to } => moves.push(TileTravel {
                    tile: *tile,
                    from: *from,
                    to: *to,
                }),
                Event::MergeScheduled {
                    source,
                    target,
                    cell,
                } => {
                    let from = origins.get(source).copied().unwrap_or(*cell);
                    merges.push(MergeTravel {
                        source: *source,
                        target: *target,
                        from,
                        to: *cell,
                    });
                }
                _ => {}
            }
        }

        self.state = GameState::Moving;
        self.pending_sweep = Some(PendingSweep);
        Some(SweepReport {
            direction,
            travel_time: self.config.travel_time,
            moves,
            merges,
        })
    }

    /// Reports that every sweep animation finished.
    ///
    /// The first call per sweep fuses the scheduled merges, spawns the next
    /// tile, and re-evaluates the terminal conditions; redundant calls are
    /// ignored so a presentation layer cannot double-finalise a sweep.
    pub fn animation_complete(&mut self) -> GameState {
        if self.state != GameState::Moving || self.pending_sweep.take().is_none() {
            return self.state;
        }

        let mut events = Vec::new();
        board::apply(&mut self.board, Command::FuseMerges, &mut events);
        self.enter_spawning();
        self.state
    }

    fn enter_spawning(&mut self) {
        self.state = GameState::SpawningTiles;
        let amount = if self.round == 0 {
            FIRST_SPAWN_AMOUNT
        } else {
            REFILL_SPAWN_AMOUNT
        };
        self.round = self.round.saturating_add(1);

        let free_cells = query::free_cells(&self.board);
        let mut commands = Vec::new();
        self.spawning.plan(&free_cells, amount, &mut commands);

        let mut events = Vec::new();
        for command in commands {
            board::apply(&mut self.board, command, &mut events);
        }
        debug_assert!(
            events
                .iter()
                .all(|event| matches!(event, Event::TilePlaced { .. })),
            "spawn commands must target free cells",
        );

        self.state = self.evaluate_spawn_outcome();
    }

    fn evaluate_spawn_outcome(&self) -> GameState {
        if query::free_cells(&self.board).is_empty() {
            return GameState::Lose;
        }
        let won = query::highest_value(&self.board)
            .is_some_and(|value| value >= self.config.win_value);
        if won {
            GameState::Win
        } else {
            GameState::WaitingInput
        }
    }

    #[cfg(test)]
    fn from_layout(config: SessionConfig, tiles: &[(u32, u32, u32)]) -> Self {
        use tile_fusion_core::TileValue;

        let mut board = Board::new(BoardSize::new(config.width, config.height));
        let mut events = Vec::new();
        for (column, row, value) in tiles {
            board::apply(
                &mut board,
                Command::PlaceTile {
                    cell: GridCoord::new(*column, *row),
                    value: TileValue::new(*value),
                },
                &mut events,
            );
        }
        assert!(events
            .iter()
            .all(|event| matches!(event, Event::TilePlaced { .. })));

        Self {
            config,
            board,
            spawning: Spawning::from_seed(config.rng_seed),
            state: GameState::WaitingInput,
            round: 1,
            pending_sweep: None,
        }
    }
}

/// Marker held while a sweep waits for its completion notification.
#[derive(Clone, Copy, Debug)]
struct PendingSweep;

/// Everything a presentation layer needs to animate one sweep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepReport {
    /// Direction the sweep travelled toward.
    pub direction: Direction,
    /// Duration the presentation layer should spend on each travel.
    pub travel_time: Duration,
    /// Tiles that slid to a new cell without merging.
    pub moves: Vec<TileTravel>,
    /// Tile pairs scheduled for fusion once animations complete.
    pub merges: Vec<MergeTravel>,
}

impl SweepReport {
    /// Reports whether the sweep moved nothing and scheduled no merges.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.moves.is_empty() && self.merges.is_empty()
    }
}

/// A single tile's travel between two cells during a sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileTravel {
    /// Tile that slid.
    pub tile: TileId,
    /// Cell the tile started the sweep on.
    pub from: GridCoord,
    /// Cell the tile settled on.
    pub to: GridCoord,
}

/// A merging tile's travel onto its fusion cell during a sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeTravel {
    /// Tile consumed as the moving half of the pair.
    pub source: TileId,
    /// Stationary tile the source merges into.
    pub target: TileId,
    /// Cell the source started the sweep on.
    pub from: GridCoord,
    /// Fusion cell shared with the target.
    pub to: GridCoord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_fusion_core::TileValue;

    fn config_2x2() -> SessionConfig {
        SessionConfig {
            width: 2,
            height: 2,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn no_op_sweep_still_spawns_a_tile() {
        // Board fully packed to the left with unmergeable values: shifting
        // left moves nothing, yet the cycle still places the next tile.
        let mut session =
            GameSession::from_layout(SessionConfig::default(), &[(0, 0, 2), (0, 1, 4)]);

        let report = session
            .submit_direction(Direction::Left)
            .expect("input accepted");
        assert!(report.is_noop());
        assert_eq!(session.state(), GameState::Moving);

        assert_eq!(session.animation_complete(), GameState::WaitingInput);
        assert_eq!(query::tile_view(session.board()).len(), 3);
    }

    #[test]
    fn reaching_the_win_value_ends_the_session() {
        let config = SessionConfig::default();
        let mut session = GameSession::from_layout(config, &[(0, 0, 1024), (1, 0, 1024)]);

        let report = session
            .submit_direction(Direction::Left)
            .expect("input accepted");
        assert_eq!(report.merges.len(), 1);

        assert_eq!(session.animation_complete(), GameState::Win);
        assert_eq!(
            query::highest_value(session.board()),
            Some(TileValue::new(2048))
        );
        assert!(session.submit_direction(Direction::Right).is_none());
    }

    #[test]
    fn filling_the_board_loses_the_session() {
        // One free cell left; the refill spawn takes it and the board is full.
        let mut session =
            GameSession::from_layout(config_2x2(), &[(0, 0, 2), (1, 0, 4), (0, 1, 8)]);

        let report = session
            .submit_direction(Direction::Left)
            .expect("input accepted");
        assert!(report.is_noop());

        assert_eq!(session.animation_complete(), GameState::Lose);
        assert!(query::free_cells(session.board()).is_empty());
        assert!(session.submit_direction(Direction::Up).is_none());
    }

    #[test]
    fn moving_state_rejects_further_input() {
        let mut session =
            GameSession::from_layout(SessionConfig::default(), &[(3, 0, 2), (3, 1, 4)]);

        assert!(session.submit_direction(Direction::Left).is_some());
        assert_eq!(session.state(), GameState::Moving);
        assert!(session.submit_direction(Direction::Right).is_none());
    }

    #[test]
    fn animation_complete_fires_at_most_once_per_sweep() {
        let mut session =
            GameSession::from_layout(SessionConfig::default(), &[(0, 0, 2), (0, 1, 4)]);

        let _ = session.submit_direction(Direction::Left);
        let _ = session.animation_complete();
        let tiles_after_cycle = query::tile_view(session.board()).len();

        // A stray second notification must not spawn another tile.
        let _ = session.animation_complete();
        assert_eq!(query::tile_view(session.board()).len(), tiles_after_cycle);
    }

    #[test]
    fn sweep_report_tracks_merge_travel() {
        let mut session =
            GameSession::from_layout(SessionConfig::default(), &[(0, 0, 2), (3, 0, 2)]);

        let report = session
            .submit_direction(Direction::Left)
            .expect("input accepted");
        assert_eq!(report.moves, vec![]);
        assert_eq!(report.merges.len(), 1);
        assert_eq!(report.merges[0].from, GridCoord::new(3, 0));
        assert_eq!(report.merges[0].to, GridCoord::new(0, 0));
        assert_eq!(report.travel_time, SessionConfig::default().travel_time);
    }
}
