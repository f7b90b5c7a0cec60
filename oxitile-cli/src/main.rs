//! OxiTile CLI - Mega Drive tile graphics codec
//!
//! A Pure Rust tool for packing and unpacking Nemesis-compressed tile art.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use oxitile_core::Result;
use oxitile_nemesis::{CompressionMode, compress, decompress};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "oxitile")]
#[command(
    author,
    version,
    about = "Pure Rust Nemesis codec for Mega Drive tile graphics"
)]
#[command(long_about = "
OxiTile packs and unpacks Nemesis-compressed 8x8 tile graphics as used on
the Sega Mega Drive. Input to the compressor must be raw tile data: a whole
number of 32-byte tiles, at most 0x7FFF of them.

Examples:
  oxitile compress tiles.bin tiles.nem
  oxitile compress --accurate tiles.bin tiles.nem
  oxitile decompress tiles.nem tiles.bin
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress raw tile data into a Nemesis stream
    #[command(alias = "c")]
    Compress {
        /// Raw tile data to compress
        input: PathBuf,

        /// Where to write the Nemesis stream
        output: PathBuf,

        /// Reproduce Sega's original compressor byte-for-byte instead of
        /// producing the smallest output
        #[arg(short, long)]
        accurate: bool,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Decompress a Nemesis stream into raw tile data
    #[command(alias = "d")]
    Decompress {
        /// Nemesis stream to decompress
        input: PathBuf,

        /// Where to write the raw tile data
        output: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            accurate,
            verbose,
        } => cmd_compress(&input, &output, accurate, verbose),
        Commands::Decompress {
            input,
            output,
            verbose,
        } => cmd_decompress(&input, &output, verbose),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "oxitile", &mut io::stdout());
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_compress(input: &Path, output: &Path, accurate: bool, verbose: bool) -> Result<()> {
    let mode = if accurate {
        CompressionMode::Accurate
    } else {
        CompressionMode::Optimal
    };

    let data = fs::read(input)?;
    let packed = compress(&data, mode)?;
    fs::write(output, &packed)?;

    if verbose {
        println!(
            "{}: {} tiles, {} -> {} bytes ({:.1}%)",
            output.display(),
            data.len() / oxitile_nemesis::TILE_SIZE,
            data.len(),
            packed.len(),
            packed.len() as f64 / data.len() as f64 * 100.0
        );
    }

    Ok(())
}

fn cmd_decompress(input: &Path, output: &Path, verbose: bool) -> Result<()> {
    let data = fs::read(input)?;
    let tiles = decompress(&data)?;
    fs::write(output, &tiles)?;

    if verbose {
        println!(
            "{}: {} -> {} bytes, {} tiles",
            output.display(),
            data.len(),
            tiles.len(),
            tiles.len() / oxitile_nemesis::TILE_SIZE
        );
    }

    Ok(())
}
