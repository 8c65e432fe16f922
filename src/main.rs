use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use flexi_logger::Logger;
use grid_2048::engine::{Grid, Move};
use grid_2048::serialization::{self, SaveFormat, Stats};

#[derive(Debug, Parser)]
#[command(name = "grid-2048", about = "Play the 4x4 sliding-tile merge puzzle in the terminal")]
struct Args {
    /// Directory holding the saved game and the best-score file
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Seed the tile generator for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// Ignore (and keep) any saved game and start fresh
    #[arg(long)]
    new: bool,

    /// Encoding used when saving a game on quit
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Verbose logging to stderr (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Bin,
}

impl From<Format> for SaveFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Json => SaveFormat::Json,
            Format::Bin => SaveFormat::Binary,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _logger = Logger::try_with_env_or_str(if args.verbose { "debug" } else { "warn" })?.start()?;

    fs::create_dir_all(&args.data_dir)?;
    let format = SaveFormat::from(args.format);
    let grid = match args.seed {
        Some(seed) => Grid::seeded(seed),
        None => Grid::new(),
    };
    let stats_path = args.data_dir.join("grid-2048.stats.json");
    let stats = serialization::read_stats(&stats_path)?.unwrap_or_default();

    splash();
    let stdin = io::stdin();
    let mut session = Session::new(
        grid,
        stats,
        stats_path,
        args.data_dir.join(format!("grid-2048.game.{}", format.extension())),
        stdin.lock().lines(),
    );
    session.run(args.new)
}

fn splash() {
    println!("grid-2048 {}", env!("CARGO_PKG_VERSION"));
    println!("Slide with w/a/s/d (or h/j/k/l, or up/left/down/right), then Enter.");
    println!("Type q to save and quit.");
    println!();
}

/// How a single game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// Won and declined, or no moves left. Another game may follow.
    Finished,
    /// Saved to disk on request or at end of input. The program exits.
    Saved,
}

/// Answer to the goal prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Continue,
    Stop,
    Quit,
}

struct Session<I> {
    grid: Grid,
    stats: Stats,
    saved_stats: Stats,
    stats_path: PathBuf,
    game_path: PathBuf,
    input: I,
}

impl<I: Iterator<Item = io::Result<String>>> Session<I> {
    fn new(grid: Grid, stats: Stats, stats_path: PathBuf, game_path: PathBuf, input: I) -> Self {
        Self { grid, stats, saved_stats: stats, stats_path, game_path, input }
    }

    /// Play games until one is saved or the player declines another. The
    /// grid and its generator carry over from game to game, as do the stats.
    fn run(&mut self, fresh: bool) -> anyhow::Result<()> {
        loop {
            println!("Press [Enter] to start playing...");
            let Some(line) = self.input.next() else {
                return Ok(());
            };
            if is_quit(&line?) {
                return Ok(());
            }
            if self.play(fresh)? == Outcome::Saved {
                return Ok(());
            }
            println!();
        }
    }

    fn play(&mut self, fresh: bool) -> anyhow::Result<Outcome> {
        self.resume_or_start(fresh)?;
        self.render();
        self.grid.start_clock();

        loop {
            match self.prompt_continue()? {
                Choice::Continue => {}
                Choice::Stop => break,
                Choice::Quit => return self.save_and_quit(),
            }
            if self.grid.is_game_over() {
                break;
            }
            if !self.read_move()? {
                return self.save_and_quit();
            }
        }
        self.finish()
    }

    /// Read lines until one moves the grid. `false` on end of input or `q`.
    fn read_move(&mut self) -> anyhow::Result<bool> {
        loop {
            prompt("Move: ")?;
            let Some(line) = self.input.next() else {
                return Ok(false);
            };
            let line = line?;
            if is_quit(&line) {
                return Ok(false);
            }
            let dir = match line.parse::<Move>() {
                Ok(dir) => dir,
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            };
            if self.grid.make_move(dir)? {
                self.render();
                return Ok(true);
            }
        }
    }

    fn resume_or_start(&mut self, fresh: bool) -> anyhow::Result<()> {
        if !fresh {
            if let Some(snapshot) = serialization::read_snapshot(&self.game_path)? {
                self.grid.load_snapshot(&snapshot);
                // The save is consumed once loaded
                fs::remove_file(&self.game_path)?;
                println!("Resumed saved game from {}", self.game_path.display());
                return Ok(());
            }
        }
        self.grid.start();
        Ok(())
    }

    fn render(&mut self) {
        let score = self.grid.score();
        println!("Goal: {}\tBest: {}", self.grid.goal(), self.stats.evaluate(score));
        println!("Moves: {}\tScore: {}\tTop tile: {}", self.grid.moves(), score, self.grid.highest_tile());
        println!("{}", self.grid);
    }

    /// Ask whether to go on once the goal is reached. `Continue` if the game
    /// is not won; end of input counts as `q`.
    fn prompt_continue(&mut self) -> anyhow::Result<Choice> {
        if !self.grid.is_won() {
            return Ok(Choice::Continue);
        }
        println!();
        println!("Goal! In {} of game time.", format_game_time(self.grid.game_time()));
        loop {
            prompt("Continue? (y/n, q to save and quit): ")?;
            let answer = match self.input.next() {
                Some(line) => line?,
                None => return Ok(Choice::Quit),
            };
            match answer.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => {
                    self.save_stats()?;
                    self.grid.continue_game();
                    self.render();
                    self.grid.start_clock();
                    return Ok(Choice::Continue);
                }
                "n" | "no" => return Ok(Choice::Stop),
                "q" | "quit" => return Ok(Choice::Quit),
                _ => continue,
            }
        }
    }

    fn save_and_quit(&mut self) -> anyhow::Result<Outcome> {
        self.grid.calculate_game_time();
        serialization::write_snapshot(&self.game_path, &self.grid.snapshot())?;
        self.save_stats()?;
        println!();
        println!("Game saved to {}", self.game_path.display());
        Ok(Outcome::Saved)
    }

    fn finish(&mut self) -> anyhow::Result<Outcome> {
        let top = self.grid.highest_tile();
        self.grid.end();
        println!();
        if self.grid.is_won() {
            println!("You win!");
        } else {
            println!("Game over! In {} of game time.", format_game_time(self.grid.game_time()));
        }
        println!("Top tile: {top}\tScore: {}", self.grid.score());
        if self.save_stats()? {
            println!();
            println!("New best score: {}!", self.stats.best_score);
        }
        Ok(Outcome::Finished)
    }

    /// Write stats only if the best score changed since the last write.
    fn save_stats(&mut self) -> anyhow::Result<bool> {
        if self.stats == self.saved_stats {
            return Ok(false);
        }
        serialization::write_stats(&self.stats_path, &self.stats)?;
        self.saved_stats = self.stats;
        Ok(true)
    }
}

fn is_quit(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "q" | "quit")
}

fn prompt(text: &str) -> io::Result<()> {
    print!("{text}");
    io::stdout().flush()
}

fn format_game_time(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}
