#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Tile Fusion in a terminal.
//!
//! The adapter owns no game logic: it feeds directions into a
//! [`GameSession`], acknowledges each sweep immediately in place of an
//! animation layer, and redraws the board from read-only queries.

use std::collections::HashMap;
use std::io::{self, BufRead};

use anyhow::Result;
use clap::Parser;
use rand::Rng;
use tile_fusion_board::query;
use tile_fusion_core::{
    BlockPalette, Direction, GameState, GridCoord, SessionConfig, TileValue,
};
use tile_fusion_session::GameSession;

#[derive(Debug, Parser)]
#[command(
    name = "tile-fusion",
    about = "Slide and fuse numbered tiles until one reaches the winning value."
)]
struct Args {
    /// Number of board columns.
    #[arg(long, default_value_t = 4)]
    width: u32,

    /// Number of board rows.
    #[arg(long, default_value_t = 4)]
    height: u32,

    /// Face value that wins the game.
    #[arg(long, default_value_t = 2048)]
    win_value: u32,

    /// Seed for a reproducible session; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Disable colored tile rendering.
    #[arg(long)]
    plain: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let config = SessionConfig {
        width: args.width,
        height: args.height,
        win_value: TileValue::new(args.win_value),
        rng_seed: seed,
        ..SessionConfig::default()
    };
    let mut session = GameSession::new(config)?;
    let palette = BlockPalette::default();

    println!("tile-fusion (seed {seed}) - move with w/a/s/d, quit with q");
    render(&session, &palette, args.plain);

    if announce_terminal(session.state()) {
        return Ok(());
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        if input == "q" {
            break;
        }
        let Some(direction) = parse_direction(input) else {
            println!("unrecognised input; use w/a/s/d or q");
            continue;
        };
        if session.submit_direction(direction).is_none() {
            continue;
        }

        // No tween layer here, so the sweep completes immediately.
        let state = session.animation_complete();
        render(&session, &palette, args.plain);
        if announce_terminal(state) {
            break;
        }
    }

    Ok(())
}

fn parse_direction(input: &str) -> Option<Direction> {
    match input {
        "w" => Some(Direction::Up),
        "s" => Some(Direction::Down),
        "a" => Some(Direction::Left),
        "d" => Some(Direction::Right),
        _ => None,
    }
}

fn announce_terminal(state: GameState) -> bool {
    match state {
        GameState::Win => {
            println!("you win");
            true
        }
        GameState::Lose => {
            println!("board full - you lose");
            true
        }
        _ => false,
    }
}

fn render(session: &GameSession, palette: &BlockPalette, plain: bool) {
    let size = query::board_size(session.board());
    let tiles: HashMap<GridCoord, TileValue> = query::tile_view(session.board())
        .iter()
        .map(|tile| (tile.cell, tile.value))
        .collect();

    // Row zero sits at the bottom of the board, so draw top-down.
    for row in (0..size.height()).rev() {
        let mut line = String::new();
        for column in 0..size.width() {
            match tiles.get(&GridCoord::new(column, row)) {
                Some(value) => {
                    let style = palette.style_for(*value);
                    if plain {
                        line.push_str(&format!("{:>6}", style.label));
                    } else {
                        let color = style.color;
                        line.push_str(&format!(
                            "\x1b[48;2;{};{};{}m\x1b[30m{:>6}\x1b[0m",
                            color.red(),
                            color.green(),
                            color.blue(),
                            style.label,
                        ));
                    }
                }
                None => line.push_str("     ."),
            }
        }
        println!("{line}");
    }
    println!();
}
