use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cell::SIDE;
use super::EngineError;

/// A direction to slide/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Up,
    Right,
    Left,
    Down,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Up, Move::Right, Move::Left, Move::Down];

    /// 0=Up, 1=Right, 2=Left, 3=Down.
    pub fn from_u8(value: u8) -> Result<Move, EngineError> {
        match value {
            0 => Ok(Move::Up),
            1 => Ok(Move::Right),
            2 => Ok(Move::Left),
            3 => Ok(Move::Down),
            other => Err(EngineError::InvalidMove(format!("code {other}"))),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Move::Up => 0,
            Move::Right => 1,
            Move::Left => 2,
            Move::Down => 3,
        }
    }

    /// The four lines this move processes, each ordered from the edge
    /// the tiles slide towards.
    pub(crate) fn lines(self) -> [Line; SIDE] {
        let mut lines = [Line { start: 0, step: 0 }; SIDE];
        for (i, line) in lines.iter_mut().enumerate() {
            *line = Line::new(self, i);
        }
        lines
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "up",
            Move::Right => "right",
            Move::Left => "left",
            Move::Down => "down",
        };
        f.write_str(name)
    }
}

impl FromStr for Move {
    type Err = EngineError;

    /// Accepts full names, `wasd` and vi-style `hjkl`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "u" | "w" | "k" => Ok(Move::Up),
            "right" | "r" | "d" | "l" => Ok(Move::Right),
            "left" | "a" | "h" => Ok(Move::Left),
            "down" | "s" | "j" => Ok(Move::Down),
            other => Err(EngineError::InvalidMove(other.to_string())),
        }
    }
}

impl TryFrom<u8> for Move {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> { Move::from_u8(value) }
}

/// One row or column, read from `start` in steps of `step`.
///
/// left `(4r, +1)`, right `(4r+3, -1)`, up `(c, +4)`, down `(12+c, -4)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line {
    start: usize,
    step: isize,
}

impl Line {
    fn new(dir: Move, i: usize) -> Self {
        let side = SIDE as isize;
        let (start, step) = match dir {
            Move::Left => (i * SIDE, 1),
            Move::Right => (i * SIDE + SIDE - 1, -1),
            Move::Up => (i, side),
            Move::Down => (SIDE * (SIDE - 1) + i, -side),
        };
        Line { start, step }
    }

    /// Linear cell indices, front (destination edge) first.
    pub(crate) fn indices(self) -> [usize; SIDE] {
        let mut out = [0; SIDE];
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = (self.start as isize + self.step * k as isize) as usize;
        }
        out
    }
}

/// Outcome of sliding a single line towards its front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineShift {
    pub line: [u32; SIDE],
    /// Sum of the values created by merges.
    pub gained: u64,
    /// Some merge produced exactly `goal`.
    pub reached_goal: bool,
}

/// Slide and merge one line towards index 0.
///
/// Non-zero values are compacted to the front, then each equal adjacent
/// pair merges once, front to back, then the gaps left by merges close.
/// A freshly merged value never merges again in the same call, and a pair
/// whose sum does not fit in a `u32` stays apart.
pub(crate) fn shift_line(mut line: [u32; SIDE], goal: u32) -> LineShift {
    compact(&mut line);
    let mut gained = 0;
    let mut reached_goal = false;
    let mut i = 0;
    while i + 1 < SIDE {
        let merged = match line[i] {
            0 => None,
            v if v == line[i + 1] => v.checked_add(v),
            _ => None,
        };
        if let Some(merged) = merged {
            line[i] = merged;
            line[i + 1] = 0;
            gained += u64::from(merged);
            reached_goal |= merged == goal;
            i += 2;
        } else {
            i += 1;
        }
    }
    compact(&mut line);
    LineShift { line, gained, reached_goal }
}

fn compact(line: &mut [u32; SIDE]) {
    let mut out = [0; SIDE];
    for (slot, v) in out.iter_mut().zip(line.iter().copied().filter(|&v| v != 0)) {
        *slot = v;
    }
    *line = out;
}
