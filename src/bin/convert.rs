use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use flexi_logger::Logger;
use grid_2048::serialization::{self, SaveFormat};

#[derive(Debug, Parser)]
#[command(name = "convert", about = "Convert a saved game between the JSON (.json) and binary (.g2s) formats")]
struct Args {
    /// Saved game to read (.json or .g2s)
    input: PathBuf,

    /// Output file; defaults to the input path with the other extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(long)]
    force: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _logger = Logger::try_with_env_or_str(if args.verbose { "debug" } else { "warn" })?.start()?;

    let input_format = SaveFormat::from_path(&args.input)?;
    let output_path = match &args.output {
        Some(out) => out.clone(),
        None => args.input.with_extension(other(input_format).extension()),
    };
    convert(&args.input, &output_path, &args)
}

fn other(format: SaveFormat) -> SaveFormat {
    match format {
        SaveFormat::Json => SaveFormat::Binary,
        SaveFormat::Binary => SaveFormat::Json,
    }
}

fn convert(input_path: &Path, output_path: &Path, args: &Args) -> anyhow::Result<()> {
    if output_path.exists() && !args.force {
        anyhow::bail!("Output file already exists: {} (use --force to overwrite)", output_path.display());
    }

    let snapshot = serialization::read_snapshot(input_path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", input_path.display(), e))?
        .ok_or_else(|| anyhow::anyhow!("No such file: {}", input_path.display()))?;

    if args.verbose {
        println!(
            "Read {}: goal {}, {} moves, score {}",
            input_path.display(),
            snapshot.goal,
            snapshot.moves,
            snapshot.score
        );
    }

    serialization::write_snapshot(output_path, &snapshot)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", output_path.display(), e))?;

    if args.verbose {
        let in_size = fs::metadata(input_path)?.len();
        let out_size = fs::metadata(output_path)?.len();
        println!("Size comparison: input={} bytes, output={} bytes", in_size, out_size);
    }
    println!("Converted {} -> {}", input_path.display(), output_path.display());
    Ok(())
}
