//! The 4x4 grid, its move engine, fill policy and game-state transitions.
//!
//! Cells live in a fixed arena of 16 slots addressed by row-major index;
//! neighbours are computed arithmetically (see [`Position::neighbor`]).
//! Every move direction is expressed as four lines parametrized
//! by a start index and a step, so a single slide/merge routine serves all
//! four directions.

mod cell;
mod line;

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::serialization::Snapshot;

pub use cell::{Cell, Direction, Position, CELLS, SIDE};
pub use line::Move;

use cell::neighbor_index;
use line::shift_line;

/// Goal of a fresh game.
pub const DEFAULT_GOAL: u32 = 2048;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid move: {0}")]
    InvalidMove(String),
    #[error("grid has ended; start or load a game first")]
    Ended,
}

/// Where a game stands.
///
/// `Playing -> Won` when a merge produces the goal, `Won -> Playing` (with
/// the goal doubled) on [`Grid::continue_game`], `Playing -> Over` once no
/// move can change the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Playing,
    Won,
    Over,
}

/// The game grid and all game-level state.
///
/// `R` is the random source used by the fill policy; seed it for
/// reproducible games.
#[derive(Clone)]
pub struct Grid<R = StdRng> {
    cells: Option<[Cell; CELLS]>,
    values: [u32; CELLS],
    goal: u32,
    moves: u64,
    score: u64,
    is_won: bool,
    game_time: Duration,
    start_time: Option<SystemTime>,
    rng: R,
}

impl Grid<StdRng> {
    /// A fresh grid filled from an entropy-seeded `StdRng`.
    pub fn new() -> Self { Grid::with_rng(StdRng::from_entropy()) }

    /// A fresh grid with a deterministic fill sequence.
    pub fn seeded(seed: u64) -> Self { Grid::with_rng(StdRng::seed_from_u64(seed)) }
}

impl Default for Grid<StdRng> {
    fn default() -> Self { Grid::new() }
}

impl<R: Rng> Grid<R> {
    pub fn with_rng(rng: R) -> Self {
        let mut grid = Grid {
            cells: None,
            values: [0; CELLS],
            goal: DEFAULT_GOAL,
            moves: 0,
            score: 0,
            is_won: false,
            game_time: Duration::ZERO,
            start_time: None,
            rng,
        };
        grid.initialize();
        grid
    }

    /// Recreate all 16 cells empty and reset every game field. Idempotent.
    pub fn initialize(&mut self) {
        self.cells = Some([Cell::EMPTY; CELLS]);
        self.values = [0; CELLS];
        self.goal = DEFAULT_GOAL;
        self.moves = 0;
        self.score = 0;
        self.is_won = false;
        self.game_time = Duration::ZERO;
        self.start_time = None;
    }

    /// Fill two random cells. Re-initializes first if the grid was ended.
    pub fn start(&mut self) -> bool {
        if self.cells.is_none() {
            self.initialize();
        }
        self.fill(2);
        true
    }

    /// Restore a saved game. Values are taken row-major; scalars are trusted
    /// verbatim.
    pub fn load(&mut self, values: [u32; CELLS], goal: u32, moves: u64, score: u64, is_won: bool, game_time: Duration) {
        let cells = self.cells.get_or_insert([Cell::EMPTY; CELLS]);
        for (cell, &value) in cells.iter_mut().zip(values.iter()) {
            cell.value = value;
        }
        self.values = values;
        self.goal = goal;
        self.moves = moves;
        self.score = score;
        self.is_won = is_won;
        self.game_time = game_time;
        debug!("loaded grid: goal={goal} moves={moves} score={score} won={is_won}");
    }

    pub fn load_snapshot(&mut self, snapshot: &Snapshot) {
        self.load(
            snapshot.values,
            snapshot.goal,
            snapshot.moves,
            snapshot.score,
            snapshot.is_won,
            snapshot.game_time,
        );
    }

    /// Sync the flat array, then capture it with the scalar fields.
    pub fn snapshot(&mut self) -> Snapshot {
        self.sync_values();
        Snapshot {
            values: self.values,
            goal: self.goal,
            moves: self.moves,
            score: self.score,
            is_won: self.is_won,
            game_time: self.game_time,
        }
    }

    /// Put a 2 (90%) or 4 (10%) into up to `count` distinct empty cells,
    /// chosen uniformly. No-op when the grid is full.
    pub fn fill(&mut self, count: usize) {
        if let Some(cells) = self.cells.as_mut() {
            let mut empty: Vec<usize> = (0..CELLS).filter(|&idx| cells[idx].is_empty()).collect();
            for _ in 0..count {
                if empty.is_empty() {
                    break;
                }
                let pick = empty.swap_remove(self.rng.gen_range(0..empty.len()));
                cells[pick].value = random_tile(&mut self.rng);
            }
        }
        self.sync_values();
    }

    /// Copy the cell values into the flat row-major array.
    pub fn sync_values(&mut self) {
        if let Some(cells) = &self.cells {
            for (value, cell) in self.values.iter_mut().zip(cells.iter()) {
                *value = cell.value;
            }
        }
    }

    /// Slide and merge every line towards the edge named by `dir`.
    ///
    /// Returns `Ok(true)` if any cell changed, in which case `moves` is
    /// incremented and one new tile is filled in. `Ok(false)` leaves the
    /// grid untouched. A missing direction is rejected before anything is
    /// mutated.
    ///
    /// ```
    /// use grid_2048::engine::{Grid, Move};
    /// use std::time::Duration;
    ///
    /// let mut grid = Grid::seeded(1);
    /// let mut values = [0; 16];
    /// values[..4].copy_from_slice(&[2, 2, 4, 4]);
    /// grid.load(values, 2048, 0, 0, false, Duration::ZERO);
    /// assert!(grid.make_move(Move::Left).unwrap());
    /// assert_eq!(grid.value(0, 0), Some(4));
    /// assert_eq!(grid.value(0, 1), Some(8));
    /// assert!(grid.make_move(None::<Move>).is_err());
    /// ```
    pub fn make_move(&mut self, dir: impl Into<Option<Move>>) -> Result<bool, EngineError> {
        let dir = dir.into().ok_or_else(|| EngineError::InvalidMove("no direction".to_string()))?;
        let cells = self.cells.as_mut().ok_or(EngineError::Ended)?;

        let goal = self.goal;
        let mut moved = false;
        let mut gained = 0;
        let mut reached_goal = false;
        for line in dir.lines() {
            let indices = line.indices();
            let before = indices.map(|idx| cells[idx].value);
            let shifted = shift_line(before, goal);
            if shifted.line != before {
                moved = true;
                for (&idx, &value) in indices.iter().zip(shifted.line.iter()) {
                    cells[idx].value = value;
                }
            }
            gained += shifted.gained;
            reached_goal |= shifted.reached_goal;
        }

        self.score += gained;
        if reached_goal {
            self.is_won = true;
            info!("goal {goal} reached after {} moves, score {}", self.moves + 1, self.score);
            self.calculate_game_time();
        }
        if moved {
            self.moves += 1;
            self.fill(1);
            debug!("moved {dir}: moves={} score={}", self.moves, self.score);
        }
        Ok(moved)
    }

    /// After a win, double the goal and clear the won flag. Always returns
    /// `true`: the player may keep going. The goal saturates at `u32::MAX`.
    pub fn continue_game(&mut self) -> bool {
        if self.is_won {
            self.goal = self.goal.saturating_mul(2);
            self.is_won = false;
            info!("continuing with goal {}", self.goal);
        }
        true
    }

    /// True if the grid is full and no two adjacent cells are equal. Closes
    /// the clock checkpoint when it reports true.
    pub fn is_game_over(&mut self) -> bool {
        let over = !self.has_moves();
        if over {
            self.calculate_game_time();
            info!("game over: moves={} score={}", self.moves, self.score);
        }
        over
    }

    /// Release the cells. Scalar fields stay readable.
    pub fn end(&mut self) {
        self.values = [0; CELLS];
        self.cells = None;
        debug!("grid ended: moves={} score={}", self.moves, self.score);
    }
}

impl<R> Grid<R> {
    /// Whether some move can still change the grid. Side-effect free.
    ///
    /// An ended grid has no moves.
    pub fn has_moves(&self) -> bool {
        let Some(cells) = &self.cells else { return false };
        (0..CELLS).any(|idx| {
            let value = cells[idx].value;
            value == 0
                || Direction::ALL
                    .iter()
                    .filter_map(|&dir| neighbor_index(idx, dir))
                    .any(|n| cells[n].value == value)
        })
    }

    pub fn status(&self) -> Status {
        if self.is_won {
            Status::Won
        } else if self.has_moves() {
            Status::Playing
        } else {
            Status::Over
        }
    }

    /// Open the clock checkpoint at the current time.
    pub fn start_clock(&mut self) { self.start_time = Some(SystemTime::now()); }

    pub fn set_start_time(&mut self, start_time: Option<SystemTime>) { self.start_time = start_time; }

    /// Fold the open checkpoint into `game_time` using the current time.
    pub fn calculate_game_time(&mut self) { self.calculate_game_time_at(SystemTime::now()); }

    /// Fold the open checkpoint into `game_time`, then close it.
    ///
    /// Both endpoints are truncated to whole seconds before subtracting, so
    /// `game_time` only ever advances in whole seconds.
    pub fn calculate_game_time_at(&mut self, now: SystemTime) {
        if let Some(start) = self.start_time.take() {
            let elapsed = whole_secs(now).saturating_sub(whole_secs(start));
            self.game_time += Duration::from_secs(elapsed);
        }
    }

    /// `None` once the grid has been ended or for out-of-range coordinates.
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        let pos = Position::new(row, col)?;
        self.cells.as_ref().map(|cells| cells[pos.index()])
    }

    pub fn value(&self, row: usize, col: usize) -> Option<u32> { self.cell(row, col).map(|c| c.value) }

    /// The flat row-major mirror, as of the last sync.
    pub fn values(&self) -> &[u32; CELLS] { &self.values }

    pub fn goal(&self) -> u32 { self.goal }

    pub fn moves(&self) -> u64 { self.moves }

    pub fn score(&self) -> u64 { self.score }

    pub fn is_won(&self) -> bool { self.is_won }

    pub fn game_time(&self) -> Duration { self.game_time }

    pub fn start_time(&self) -> Option<SystemTime> { self.start_time }

    pub fn is_ended(&self) -> bool { self.cells.is_none() }

    pub fn highest_tile(&self) -> u32 {
        self.cells.as_ref().and_then(|cells| cells.iter().map(|c| c.value).max()).unwrap_or(0)
    }

    pub fn count_empty(&self) -> usize {
        self.cells.as_ref().map_or(0, |cells| cells.iter().filter(|c| c.is_empty()).count())
    }
}

impl<R> fmt::Debug for Grid<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("values", &self.values)
            .field("goal", &self.goal)
            .field("moves", &self.moves)
            .field("score", &self.score)
            .field("is_won", &self.is_won)
            .field("game_time", &self.game_time)
            .field("ended", &self.cells.is_none())
            .finish()
    }
}

impl<R> fmt::Display for Grid<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const RULE: &str = "---------------------------------";
        for row in 0..SIDE {
            writeln!(f, "{RULE}")?;
            write!(f, "|")?;
            for col in 0..SIDE {
                write!(f, "{}|", format_val(self.value(row, col).unwrap_or(0)))?;
            }
            writeln!(f)?;
        }
        write!(f, "{RULE}")
    }
}

fn format_val(value: u32) -> String {
    match value {
        0 => " ".repeat(7),
        v => format!("{v:^7}"),
    }
}

fn random_tile<R: Rng + ?Sized>(rng: &mut R) -> u32 { if rng.gen_range(0..10) < 9 { 2 } else { 4 } }

fn whole_secs(t: SystemTime) -> u64 { t.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default() }
