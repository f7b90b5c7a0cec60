//! oxitile-unpack - standalone Nemesis decompressor
//!
//! A minimal tool for build pipelines that only ever unpack: no subcommands,
//! just an input and an output path.

use clap::Parser;
use oxitile_nemesis::decompress;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oxitile-unpack")]
#[command(author, version, about = "Decompress a Nemesis stream into raw tile data")]
struct Args {
    /// Nemesis stream to decompress
    input: PathBuf,

    /// Where to write the raw tile data
    output: PathBuf,
}

fn main() {
    let args = Args::parse();

    let result = fs::read(&args.input)
        .map_err(Into::into)
        .and_then(|data| decompress(&data))
        .and_then(|tiles| fs::write(&args.output, tiles).map_err(Into::into));

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
