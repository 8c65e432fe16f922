//! grid-2048: rules engine for the 4x4 sliding-tile merge puzzle
//!
//! This crate provides:
//! - A `Grid` owning 16 cells plus the game state (goal, moves, score, won flag, game time)
//! - The move engine (`Grid::make_move`): slide + merge along rows or columns, at most one merge per tile
//! - A seedable fill policy (2 with 90%, 4 with 10%) driven by any `rand::Rng`
//! - Game-over detection, continue-after-win, and whole-second game-time accounting
//! - Snapshots and save files (`serialization` module), plus best-score stats
//!
//! Quick start:
//! ```
//! use grid_2048::engine::{Grid, Move, Status};
//!
//! // Deterministic fills with a seeded RNG
//! let mut grid = Grid::seeded(42);
//! assert!(grid.start());
//! assert_eq!(grid.values().iter().filter(|&&v| v != 0).count(), 2);
//!
//! for dir in [Move::Left, Move::Up, Move::Right, Move::Down] {
//!     grid.make_move(dir).unwrap();
//! }
//! assert_eq!(grid.status(), Status::Playing);
//! ```
//!
//! Saving and resuming:
//! ```
//! use grid_2048::engine::Grid;
//! use grid_2048::serialization::SaveFormat;
//!
//! let mut grid = Grid::seeded(7);
//! grid.start();
//! let bytes = SaveFormat::Binary.encode(&grid.snapshot()).unwrap();
//!
//! let mut resumed = Grid::seeded(8);
//! resumed.load_snapshot(&SaveFormat::Binary.decode(&bytes).unwrap());
//! assert_eq!(resumed.values(), grid.values());
//! ```
//!
pub mod engine;
pub mod serialization;
