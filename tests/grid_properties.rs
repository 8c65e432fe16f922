use std::collections::BTreeMap;
use std::time::Duration;

use grid_2048::engine::{EngineError, Grid, Move, Status, CELLS};
use grid_2048::serialization::{SaveFormat, Snapshot};

const WIN_ROW: [u32; CELLS] = [1024, 1024, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
const WIN_COLUMN: [u32; CELLS] = [1024, 0, 0, 0, 1024, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0];
const WON_ROW: [u32; CELLS] = [2048, 4, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
const GAME_OVER: [u32; CELLS] = [2, 4, 8, 16, 32, 64, 128, 256, 256, 128, 64, 32, 16, 8, 4, 2];

fn loaded(values: [u32; CELLS], seed: u64) -> Grid {
    let mut grid = Grid::seeded(seed);
    grid.load(values, 2048, 1, 1, false, Duration::from_secs(15 * 60));
    grid
}

fn zeros(grid: &Grid) -> usize { grid.values().iter().filter(|&&v| v == 0).count() }

fn non_zero_multiset(values: &[u32]) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for &v in values.iter().filter(|&&v| v != 0) {
        *counts.entry(v).or_default() += 1;
    }
    counts
}

#[test]
fn start_fills_two_cells_with_two_or_four() {
    for seed in 0..50 {
        let mut grid = Grid::seeded(seed);
        assert!(grid.start());
        let filled: Vec<u32> = grid.values().iter().copied().filter(|&v| v != 0).collect();
        assert_eq!(filled.len(), 2, "seed {seed}");
        assert!(filled.iter().all(|&v| v == 2 || v == 4), "seed {seed}: {filled:?}");
        assert_eq!(zeros(&grid), 14);
    }
}

#[test]
fn fill_split_is_roughly_ninety_ten() {
    let mut grid = Grid::seeded(2024);
    let (mut twos, mut fours) = (0u32, 0u32);
    for _ in 0..2_000 {
        grid.initialize();
        grid.fill(CELLS);
        for &v in grid.values() {
            match v {
                2 => twos += 1,
                4 => fours += 1,
                other => panic!("unexpected tile {other}"),
            }
        }
    }
    let ratio = f64::from(twos) / f64::from(twos + fours);
    assert!((0.88..0.92).contains(&ratio), "ratio {ratio}");
}

#[test]
fn left_move_reaches_goal() {
    let mut grid = Grid::seeded(3);
    grid.load(WIN_ROW, 2048, 0, 0, false, Duration::ZERO);
    assert!(grid.make_move(Move::Left).unwrap());
    assert_eq!(grid.value(0, 0), Some(2048));
    assert_eq!(grid.value(0, 1), Some(4));
    assert!(grid.is_won());
    assert_eq!(grid.score(), 2048 + 4);
    assert_eq!(grid.moves(), 1);
    assert_eq!(zeros(&grid), 13);
    assert_eq!(grid.status(), Status::Won);
}

#[test]
fn each_direction_reaches_goal() {
    let cases = [
        (WIN_COLUMN, Move::Up, [(0, 0, 2048), (1, 0, 4)]),
        (WIN_ROW, Move::Right, [(0, 2, 2048), (0, 3, 4)]),
        (WIN_ROW, Move::Left, [(0, 0, 2048), (0, 1, 4)]),
        (WIN_COLUMN, Move::Down, [(2, 0, 2048), (3, 0, 4)]),
    ];
    for (values, dir, expected) in cases {
        let mut grid = loaded(values, 17);
        assert!(grid.make_move(dir).unwrap(), "{dir}");
        for (row, col, value) in expected {
            assert_eq!(grid.value(row, col), Some(value), "{dir} at ({row}, {col})");
        }
        assert_eq!(grid.moves(), 2);
        assert_eq!(grid.score(), 2053);
        assert!(grid.is_won());
        assert_eq!(zeros(&grid), 13);
    }
}

#[test]
fn game_over_grid() {
    let mut grid = loaded(GAME_OVER, 1);
    for dir in Move::ALL {
        assert!(!grid.make_move(dir).unwrap(), "{dir}");
    }
    assert_eq!(grid.values(), &GAME_OVER);
    assert_eq!((grid.moves(), grid.score()), (1, 1));
    assert!(!grid.has_moves());
    assert_eq!(grid.status(), Status::Over);
    assert!(grid.is_game_over());
}

#[test]
fn game_over_needs_full_grid_and_no_pairs() {
    let mut with_gap = GAME_OVER;
    with_gap[5] = 0;
    assert!(!loaded(with_gap, 1).is_game_over());

    let mut with_pair = GAME_OVER;
    with_pair[1] = 2; // equal to its west neighbour
    assert!(!loaded(with_pair, 1).is_game_over());

    let mut with_column_pair = GAME_OVER;
    with_column_pair[4] = 2; // equal to its north neighbour
    assert!(!loaded(with_column_pair, 1).is_game_over());
}

#[test]
fn game_over_closes_clock() {
    let mut grid = loaded(GAME_OVER, 1);
    grid.start_clock();
    assert!(grid.is_game_over());
    assert_eq!(grid.start_time(), None);
    assert!(grid.game_time() >= Duration::from_secs(15 * 60));
}

#[test]
fn fresh_start_is_not_game_over() {
    let mut grid = Grid::seeded(12);
    grid.start();
    assert!(!grid.is_game_over());
}

#[test]
fn unchanged_move_conserves_everything() {
    let mut values = [0; CELLS];
    values[0] = 2;
    values[1] = 4;
    values[4] = 8;
    let mut grid = loaded(values, 5);
    let before = grid.snapshot();
    assert!(!grid.make_move(Move::Left).unwrap());
    assert!(!grid.make_move(Move::Up).unwrap());
    assert_eq!(grid.snapshot(), before);
}

#[test]
fn invalid_direction_is_rejected_without_mutation() {
    let mut grid = loaded(WIN_ROW, 5);
    let before = grid.snapshot();
    assert!(matches!(grid.make_move(None::<Move>), Err(EngineError::InvalidMove(_))));
    let err = "sideways".parse::<Move>().unwrap_err();
    assert!(matches!(err, EngineError::InvalidMove(_)));
    assert_eq!(grid.snapshot(), before);
}

#[test]
fn merges_happen_once_per_move() {
    let mut values = [0; CELLS];
    values[..4].copy_from_slice(&[2, 2, 2, 2]);
    values[4..8].copy_from_slice(&[4, 4, 8, 0]);
    let mut grid = loaded(values, 6);
    assert!(grid.make_move(Move::Left).unwrap());
    assert_eq!(&grid.values()[..2], &[4, 4]);
    assert_eq!(&grid.values()[4..6], &[8, 8]);
    assert_eq!(grid.score(), 1 + 4 + 4 + 8);
}

#[test]
fn slide_without_pairs_preserves_tiles() {
    let mut values = [0; CELLS];
    values[3] = 2;
    values[6] = 4;
    values[9] = 8;
    values[12] = 16;
    for dir in Move::ALL {
        let mut grid = loaded(values, 21);
        grid.make_move(dir).unwrap();
        let after = grid.snapshot().values;
        // Everything beyond the original tiles is the single filled cell.
        let original = non_zero_multiset(&values);
        let mut extra = non_zero_multiset(&after);
        for (v, n) in &original {
            let left = extra.get(v).copied().unwrap_or(0);
            assert!(left >= *n, "{dir}: lost {v}");
            extra.insert(*v, left - n);
        }
        assert_eq!(extra.values().sum::<usize>(), 1, "{dir}");
        assert_eq!(grid.score(), 1, "{dir}");
    }
}

#[test]
fn continue_after_win() {
    let mut grid = Grid::seeded(0);
    grid.load(WON_ROW, 2048, 1, 1, true, Duration::from_secs(15 * 60));
    assert!(grid.continue_game());
    assert_eq!(grid.goal(), 4096);
    assert!(!grid.is_won());
}

#[test]
fn continue_when_not_won_is_a_no_op() {
    let mut grid = Grid::seeded(0);
    grid.start();
    let before = grid.snapshot();
    assert!(grid.continue_game());
    assert!(grid.continue_game());
    assert_eq!(grid.snapshot(), before);
    assert_eq!(grid.goal(), 2048);
}

#[test]
fn load_then_sync_round_trip() {
    let values = [0, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 2, 0, 4];
    let mut grid = Grid::seeded(0);
    grid.load(values, 4096, 77, 31337, true, Duration::from_secs(93));
    grid.sync_values();
    assert_eq!(grid.values(), &values);
    for (idx, &v) in values.iter().enumerate() {
        assert_eq!(grid.value(idx / 4, idx % 4), Some(v));
    }
    let snapshot = grid.snapshot();
    assert_eq!(
        snapshot,
        Snapshot { values, goal: 4096, moves: 77, score: 31337, is_won: true, game_time: Duration::from_secs(93) }
    );
}

#[test]
fn saved_game_resumes_identically() {
    let mut grid = Grid::seeded(99);
    grid.start();
    for dir in [Move::Left, Move::Down, Move::Right, Move::Up, Move::Left] {
        grid.make_move(dir).unwrap();
    }
    let snapshot = grid.snapshot();
    for format in [SaveFormat::Json, SaveFormat::Binary] {
        let bytes = format.encode(&snapshot).unwrap();
        let mut resumed = Grid::seeded(1);
        resumed.load_snapshot(&format.decode(&bytes).unwrap());
        assert_eq!(resumed.snapshot(), snapshot, "{format:?}");
    }
}

#[test]
fn score_never_decreases_during_play() {
    let mut grid = Grid::seeded(31);
    grid.start();
    let mut last = 0;
    let seq = [Move::Left, Move::Down, Move::Right, Move::Down];
    for i in 0..500 {
        if grid.is_game_over() {
            break;
        }
        grid.make_move(seq[i % seq.len()]).unwrap();
        assert!(grid.score() >= last);
        last = grid.score();
        assert!(grid.values().iter().all(|&v| v == 0 || v.is_power_of_two()));
    }
}

#[test]
fn end_clears_values() {
    let mut grid = Grid::seeded(4);
    grid.start();
    grid.end();
    assert_eq!(grid.values(), &[0; CELLS]);
    assert_eq!(grid.make_move(Move::Left), Err(EngineError::Ended));
}
